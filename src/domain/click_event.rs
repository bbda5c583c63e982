//! Click event model for asynchronous click accounting.

use chrono::{DateTime, Utc};

/// A click on a short code, queued for background accounting.
///
/// Passed from the redirect handler to the click worker through a bounded
/// channel so the redirect response never waits on counter writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickEvent {
    pub code: String,
    pub clicked_at: DateTime<Utc>,
}

impl ClickEvent {
    /// Creates a click event stamped with the current time.
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            clicked_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_event_creation() {
        let before = Utc::now();
        let event = ClickEvent::new("abc1234");

        assert_eq!(event.code, "abc1234");
        assert!(event.clicked_at >= before);
    }

    #[test]
    fn test_click_event_clone() {
        let event = ClickEvent::new("code1".to_string());
        let cloned = event.clone();

        assert_eq!(cloned, event);
    }
}
