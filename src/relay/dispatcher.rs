use crate::webhook::{AgentHookPayload, WebhookSink};

use super::breadcrumbs::{Breadcrumbs, Step};
use super::queue::DeliveryQueue;

/// Counts from one drain of the delivery queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    pub delivered: usize,
    pub failed: usize,
    pub dry_run: usize,
}

/// Sole consumer of the delivery queue.
pub struct Dispatcher<W> {
    sink: W,
    queue: DeliveryQueue,
    crumbs: Breadcrumbs,
    dry_run: bool,
}

impl<W: WebhookSink> Dispatcher<W> {
    pub const fn new(sink: W, queue: DeliveryQueue, crumbs: Breadcrumbs, dry_run: bool) -> Self {
        Self {
            sink,
            queue,
            crumbs,
            dry_run,
        }
    }

    /// Deliver everything currently queued, oldest first. Failed items are
    /// logged and dropped.
    pub fn tick(&self) -> DrainReport {
        let mut report = DrainReport::default();

        for item in self.queue.drain() {
            if self.dry_run {
                let payload = AgentHookPayload::now(&item.agent_name, &item.message).to_json();
                tracing::info!(
                    agent = %item.agent_name,
                    "--dry-run: would POST to {}\nBody: {payload}",
                    self.sink.endpoint()
                );
                report.dry_run += 1;
                continue;
            }

            self.crumbs.record(Step::SendWebhook, &item.agent_name);
            match self.sink.send(&item.agent_name, &item.message) {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    tracing::warn!(
                        agent = %item.agent_name,
                        step = %Step::SendWebhook.tag(&item.agent_name),
                        seq = item.seq,
                        enqueued_at = %item.enqueued_at.to_rfc3339(),
                        "dropping message after failed delivery: {e}"
                    );
                    report.failed += 1;
                }
            }
        }

        if report != DrainReport::default() {
            tracing::debug!(
                delivered = report.delivered,
                failed = report.failed,
                dry_run = report.dry_run,
                "delivery queue drained"
            );
        }
        report
    }
}
