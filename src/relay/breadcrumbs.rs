use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

const BEGIN: &str = "begin";

/// Named steps recorded on the trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    GetIdentity,
    GetNotifications,
    ReadNotification,
    SendWebhook,
}

impl Step {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GetIdentity => "get_identity",
            Self::GetNotifications => "get_notifications",
            Self::ReadNotification => "read_notification",
            Self::SendWebhook => "send_webhook",
        }
    }

    /// Tag as it appears on the trail, e.g. `get_notifications:alice`.
    pub fn tag(self, agent: &str) -> String {
        format!("{}:{agent}", self.as_str())
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record of the steps attempted since the start of the current poll pass.
///
/// Cloning shares the same trail. Owned by the scheduler and handed to the
/// agents and the dispatcher; only read back when something goes wrong.
///
/// The dispatcher thread appends to the same trail the poll loop resets, so
/// a `send_webhook:*` tag can be cleared by a pass that starts mid-drain.
/// Delivery failures therefore carry their own `step` field instead of
/// relying on the trail.
#[derive(Debug, Clone)]
pub struct Breadcrumbs {
    trail: Arc<Mutex<Vec<String>>>,
}

impl Default for Breadcrumbs {
    fn default() -> Self {
        Self::new()
    }
}

impl Breadcrumbs {
    pub fn new() -> Self {
        Self {
            trail: Arc::new(Mutex::new(vec![BEGIN.to_string()])),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<String>> {
        // A panic while holding the lock leaves a still-usable Vec.
        self.trail.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn reset(&self) {
        let mut trail = self.lock();
        trail.clear();
        trail.push(BEGIN.to_string());
    }

    pub fn record(&self, step: Step, agent: &str) {
        self.lock().push(step.tag(agent));
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.lock().clone()
    }

    /// The most recent tag, i.e. the step that was being attempted.
    pub fn last(&self) -> String {
        self.lock().last().cloned().unwrap_or_else(|| BEGIN.to_string())
    }
}

impl fmt::Display for Breadcrumbs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.snapshot().join(" -> "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_begin() {
        let crumbs = Breadcrumbs::new();
        assert_eq!(crumbs.snapshot(), vec!["begin"]);
        assert_eq!(crumbs.last(), "begin");
    }

    #[test]
    fn records_tags_in_order() {
        let crumbs = Breadcrumbs::new();
        crumbs.record(Step::GetIdentity, "alice");
        crumbs.record(Step::GetNotifications, "alice");
        crumbs.record(Step::ReadNotification, "alice");
        assert_eq!(
            crumbs.to_string(),
            "begin -> get_identity:alice -> get_notifications:alice -> read_notification:alice"
        );
        assert_eq!(crumbs.last(), "read_notification:alice");
    }

    #[test]
    fn reset_returns_to_begin() {
        let crumbs = Breadcrumbs::new();
        crumbs.record(Step::SendWebhook, "bob");
        crumbs.reset();
        assert_eq!(crumbs.snapshot(), vec!["begin"]);
    }

    #[test]
    fn clones_share_one_trail() {
        let crumbs = Breadcrumbs::new();
        let other = crumbs.clone();
        other.record(Step::SendWebhook, "bob");
        assert_eq!(crumbs.last(), "send_webhook:bob");
    }
}
