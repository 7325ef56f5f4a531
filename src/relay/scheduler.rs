use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle};

use crate::config::Intervals;
use crate::error::ExitError;
use crate::fizzy::NotificationSource;
use crate::webhook::WebhookSink;

use super::agent::Agent;
use super::breadcrumbs::Breadcrumbs;
use super::dispatcher::Dispatcher;
use super::queue::DeliveryQueue;
use super::registry::BotUserRegistry;
use super::shutdown::Shutdown;

/// Owns the agents and the dispatcher and drives both cadences.
///
/// Polling runs on the calling thread; the dispatcher gets its own thread.
/// They only meet at the delivery queue.
pub struct Scheduler<S, W> {
    agents: Vec<Agent<S>>,
    dispatcher: Option<Dispatcher<W>>,
    queue: DeliveryQueue,
    crumbs: Breadcrumbs,
    intervals: Intervals,
    bots: BotUserRegistry,
}

impl<S, W> Scheduler<S, W>
where
    S: NotificationSource,
    W: WebhookSink + Send + 'static,
{
    pub fn new(agents: Vec<Agent<S>>, sink: W, intervals: Intervals, dry_run: bool) -> Self {
        let queue = DeliveryQueue::new();
        let crumbs = Breadcrumbs::new();
        let dispatcher = Dispatcher::new(sink, queue.clone(), crumbs.clone(), dry_run);
        Self {
            agents,
            dispatcher: Some(dispatcher),
            queue,
            crumbs,
            intervals,
            bots: BotUserRegistry::default(),
        }
    }

    pub fn agents(&self) -> &[Agent<S>] {
        &self.agents
    }

    pub const fn bots(&self) -> &BotUserRegistry {
        &self.bots
    }

    pub const fn queue(&self) -> &DeliveryQueue {
        &self.queue
    }

    pub const fn breadcrumbs(&self) -> &Breadcrumbs {
        &self.crumbs
    }

    /// Resolve every identity, then build the bot registry from the active
    /// agents and drop the rest. The registry must be complete before any
    /// agent polls, so this runs to the end before anything else starts.
    pub fn resolve_identities(&mut self) -> Result<(), ExitError> {
        for agent in &mut self.agents {
            agent.fetch_identity(&self.crumbs);
        }

        self.bots = BotUserRegistry::new(
            self.agents
                .iter()
                .filter(|a| a.is_active())
                .filter_map(|a| a.user_id().cloned()),
        );

        let configured = self.agents.len();
        self.agents.retain(|agent| {
            if !agent.is_active() {
                tracing::warn!(agent = %agent.name(), "no accounts resolved, agent disabled for this run");
            }
            agent.is_active()
        });

        if self.agents.is_empty() {
            tracing::error!(breadcrumbs = %self.crumbs, "no active agents");
            return Err(ExitError::NoActiveAgents);
        }

        let names: Vec<_> = self.agents.iter().map(Agent::name).collect();
        tracing::info!(
            "{}/{configured} agent(s) active: {} ({} bot user id(s))",
            self.agents.len(),
            names.join(", "),
            self.bots.len()
        );
        Ok(())
    }

    /// One full pass over every active agent. Returns the number of
    /// messages queued.
    pub fn poll_pass(&self, shutdown: &Shutdown) -> usize {
        self.crumbs.reset();
        let mut queued = 0;

        for (i, agent) in self.agents.iter().enumerate() {
            if i > 0 && shutdown.wait(self.intervals.agent_poll) {
                break;
            }
            if shutdown.is_triggered() {
                break;
            }

            let cycle = panic::catch_unwind(AssertUnwindSafe(|| {
                agent.poll_cycle(&self.bots, &self.queue, &self.crumbs)
            }));
            match cycle {
                Ok(n) => queued += n,
                Err(payload) => tracing::error!(
                    agent = %agent.name(),
                    breadcrumbs = %self.crumbs,
                    "poll cycle aborted: {}",
                    panic_message(payload.as_ref())
                ),
            }
        }
        queued
    }

    /// Resolve identities, then poll and dispatch until `shutdown` fires.
    pub fn run(mut self, shutdown: &Shutdown) -> Result<(), ExitError> {
        self.resolve_identities()?;

        let dispatcher = self.spawn_dispatcher(shutdown)?;
        tracing::info!(
            "polling every {:?} ({:?} between agents), delivering every {:?}. Ctrl+C to stop",
            self.intervals.polling,
            self.intervals.agent_poll,
            self.intervals.webhook
        );

        while !shutdown.is_triggered() {
            self.poll_pass(shutdown);
            if shutdown.wait(self.intervals.polling) {
                break;
            }
        }

        tracing::info!(breadcrumbs = %self.crumbs, "shutting down");
        shutdown.trigger();
        if dispatcher.join().is_err() {
            tracing::error!(breadcrumbs = %self.crumbs, "dispatcher thread panicked");
        }

        let pending = self.queue.len();
        if pending > 0 {
            tracing::info!("discarding {pending} undelivered message(s)");
        }
        Ok(())
    }

    fn spawn_dispatcher(&mut self, shutdown: &Shutdown) -> Result<JoinHandle<()>, ExitError> {
        let dispatcher = self
            .dispatcher
            .take()
            .ok_or_else(|| ExitError::Other("dispatcher already started".into()))?;
        let interval = self.intervals.webhook;
        let crumbs = self.crumbs.clone();
        let shutdown = shutdown.clone();

        thread::Builder::new()
            .name("dispatcher".into())
            .spawn(move || {
                loop {
                    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| dispatcher.tick())) {
                        tracing::error!(
                            breadcrumbs = %crumbs,
                            "delivery aborted: {}",
                            panic_message(payload.as_ref())
                        );
                    }
                    if shutdown.wait(interval) {
                        break;
                    }
                }
            })
            .map_err(|e| ExitError::Other(format!("spawning dispatcher thread: {e}")))
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
