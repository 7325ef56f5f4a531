use crate::fizzy::{Account, Id, Notification, NotificationSource};
use crate::template::render_message;

use super::breadcrumbs::{Breadcrumbs, Step};
use super::queue::DeliveryQueue;
use super::registry::BotUserRegistry;

/// Outcome of the bot-loop check for one notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Creator is not a configured agent.
    Human,
    /// Creator is a configured agent that explicitly @mentioned us.
    Mentioned,
    /// Creator is a configured agent and did not mention us.
    Suppressed,
}

impl Verdict {
    pub const fn forwards(self) -> bool {
        !matches!(self, Self::Suppressed)
    }
}

/// Decide whether a notification may be forwarded to `agent_name`.
///
/// Notifications written by another configured agent are dropped unless the
/// body contains `@<agent_name>`, compared case-insensitively. This lets
/// agents escalate to each other on purpose without every bot comment
/// waking every other bot.
pub fn screen(creator_id: &Id, body: &str, agent_name: &str, bots: &BotUserRegistry) -> Verdict {
    if !bots.contains(creator_id) {
        return Verdict::Human;
    }
    let mention = format!("@{}", agent_name.to_lowercase());
    if body.to_lowercase().contains(&mention) {
        Verdict::Mentioned
    } else {
        Verdict::Suppressed
    }
}

/// The oldest unread notification, trusting the source's ordering.
pub fn first_unread(notifications: Vec<Notification>) -> Option<Notification> {
    notifications.into_iter().find(|n| !n.read)
}

/// One Fizzy identity polled on behalf of an OpenClaw agent.
pub struct Agent<S> {
    name: String,
    source: S,
    accounts: Vec<Account>,
    user_id: Option<Id>,
    dry_run: bool,
}

impl<S: NotificationSource> Agent<S> {
    pub fn new(name: &str, source: S, dry_run: bool) -> Self {
        Self {
            name: name.to_string(),
            source,
            accounts: Vec::new(),
            user_id: None,
            dry_run,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    /// User id of the first account, used to recognize this agent's own posts.
    pub fn user_id(&self) -> Option<&Id> {
        self.user_id.as_ref()
    }

    pub fn is_active(&self) -> bool {
        !self.accounts.is_empty()
    }

    /// Resolve accounts for this token. Called once at startup; a failure
    /// leaves the agent inactive for the rest of the run.
    pub fn fetch_identity(&mut self, crumbs: &Breadcrumbs) {
        crumbs.record(Step::GetIdentity, &self.name);
        tracing::info!(agent = %self.name, "fetching identity");

        match self.source.fetch_identity() {
            Ok(identity) => {
                self.accounts = identity.accounts;
                self.user_id = self
                    .accounts
                    .first()
                    .and_then(|a| a.user.as_ref())
                    .map(|u| u.id.clone());
                tracing::info!(
                    agent = %self.name,
                    user = %self.user_id.as_ref().map_or("-", Id::as_str),
                    "found {} account(s)",
                    self.accounts.len()
                );
            }
            Err(e) => {
                self.accounts.clear();
                tracing::error!(
                    agent = %self.name,
                    step = %Step::GetIdentity.tag(&self.name),
                    "failed to fetch identity: {e}"
                );
            }
        }
    }

    /// Handle at most one unread notification per account. Returns how many
    /// messages were queued.
    pub fn poll_cycle(
        &self,
        bots: &BotUserRegistry,
        queue: &DeliveryQueue,
        crumbs: &Breadcrumbs,
    ) -> usize {
        let mut queued = 0;
        for account in &self.accounts {
            if self.poll_account(account, bots, queue, crumbs) {
                queued += 1;
            }
        }
        queued
    }

    fn poll_account(
        &self,
        account: &Account,
        bots: &BotUserRegistry,
        queue: &DeliveryQueue,
        crumbs: &Breadcrumbs,
    ) -> bool {
        let slug = account.slug.as_str();

        crumbs.record(Step::GetNotifications, &self.name);
        let notifications = match self.source.fetch_notifications(slug) {
            Ok(list) => list,
            Err(e) => {
                tracing::warn!(
                    agent = %self.name,
                    step = %Step::GetNotifications.tag(&self.name),
                    slug,
                    "skipping account: {e}"
                );
                return false;
            }
        };

        let Some(unread) = first_unread(notifications) else {
            return false;
        };

        if self.dry_run {
            tracing::info!(agent = %self.name, "will mark notification {} as read", unread.id);
        } else {
            crumbs.record(Step::ReadNotification, &self.name);
            match self.source.mark_read(slug, &unread.id) {
                Ok(()) => tracing::info!(agent = %self.name, "marked notification {} as read", unread.id),
                // Still forwarded: it has been observed, and the next poll
                // would otherwise pick it up again.
                Err(e) => tracing::warn!(
                    agent = %self.name,
                    step = %Step::ReadNotification.tag(&self.name),
                    "failed to mark notification {} as read: {e}",
                    unread.id
                ),
            }
        }

        let Some(creator) = unread.creator.as_ref() else {
            tracing::debug!(agent = %self.name, "notification {} is a system notification", unread.id);
            return false;
        };

        let verdict = screen(&creator.id, &unread.body, &self.name, bots);
        match verdict {
            Verdict::Suppressed => tracing::info!(
                agent = %self.name,
                "skipping notification from bot agent {} ({})",
                creator.name,
                creator.id
            ),
            Verdict::Mentioned => tracing::info!(
                agent = %self.name,
                "bot agent {} mentioned @{}, delivering anyway",
                creator.name,
                self.name
            ),
            Verdict::Human => {}
        }
        if !verdict.forwards() {
            return false;
        }

        match render_message(&unread, creator) {
            Ok(message) => {
                tracing::debug!(agent = %self.name, "queued message:\n{message}");
                queue.push(&self.name, message);
                true
            }
            Err(e) => {
                tracing::error!(
                    agent = %self.name,
                    step = %Step::ReadNotification.tag(&self.name),
                    "failed to render notification {}: {e:#}",
                    unread.id
                );
                false
            }
        }
    }
}
