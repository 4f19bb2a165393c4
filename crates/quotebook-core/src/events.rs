//! Events published to whatever presents the quote book.

use std::time::Duration;

use tokio::sync::broadcast;

use crate::models::Quote;

/// How long a conflict notification stays visible.
pub const CONFLICT_NOTICE_DURATION: Duration = Duration::from_secs(3);

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Something a presenter should react to.
#[derive(Debug, Clone, PartialEq)]
pub enum QuoteEvent {
    /// A quote should be (re)rendered
    QuoteChanged(Quote),
    /// The category list changed
    CategoriesChanged(Vec<String>),
    /// Remote data overwrote local quotes
    Conflict {
        message: String,
        dismiss_after: Duration,
    },
    /// Informational status message
    Notice(String),
}

/// Fan-out of [`QuoteEvent`]s to any number of subscribers.
///
/// Publishing never fails; events sent with no subscribers are dropped.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<QuoteEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<QuoteEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: QuoteEvent) {
        if self.sender.send(event).is_err() {
            tracing::trace!("No event subscribers");
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_without_subscribers_is_ignored() {
        let bus = EventBus::new();
        bus.publish(QuoteEvent::Notice("nobody listening".to_string()));
    }

    #[test]
    fn subscribers_receive_events_in_order() {
        let bus = EventBus::new();
        let mut receiver = bus.subscribe();

        bus.publish(QuoteEvent::Notice("one".to_string()));
        bus.publish(QuoteEvent::CategoriesChanged(vec!["Life".to_string()]));

        assert_eq!(
            receiver.try_recv().unwrap(),
            QuoteEvent::Notice("one".to_string())
        );
        assert_eq!(
            receiver.try_recv().unwrap(),
            QuoteEvent::CategoriesChanged(vec!["Life".to_string()])
        );
        assert!(receiver.try_recv().is_err());
    }
}
