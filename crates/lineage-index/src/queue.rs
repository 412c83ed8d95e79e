//! Channel-backed work queue
//!
//! Publishing never blocks: events go onto an unbounded tokio channel and a
//! downstream consumer drains the receiver at its own pace.

use lineage_domain::traits::WorkQueue;
use lineage_domain::GraphPropertyEvent;
use thiserror::Error;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// The receiving side has gone away
#[derive(Debug, Error)]
#[error("Work queue closed; dropped event for {element_id}")]
pub struct QueueClosed {
    /// Element of the dropped event
    pub element_id: String,
}

/// [`WorkQueue`] over a `tokio::sync::mpsc` unbounded channel
#[derive(Debug, Clone)]
pub struct ChannelWorkQueue {
    sender: UnboundedSender<GraphPropertyEvent>,
}

impl ChannelWorkQueue {
    /// Create a queue and the receiver its events arrive on
    ///
    /// # Examples
    ///
    /// ```
    /// use lineage_domain::traits::WorkQueue;
    /// use lineage_domain::{GraphPropertyEvent, Priority};
    /// use lineage_index::ChannelWorkQueue;
    ///
    /// let (queue, mut events) = ChannelWorkQueue::new();
    /// queue.publish(GraphPropertyEvent {
    ///     element_id: "e1".to_string(),
    ///     property_key: None,
    ///     property_name: "http://visallo.org#visibilityJson".to_string(),
    ///     workspace_id: None,
    ///     visibility_source: Some("".to_string()),
    ///     priority: Priority::High,
    /// }).unwrap();
    ///
    /// assert_eq!(events.try_recv().unwrap().element_id, "e1");
    /// ```
    pub fn new() -> (Self, UnboundedReceiver<GraphPropertyEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl WorkQueue for ChannelWorkQueue {
    type Error = QueueClosed;

    fn publish(&self, event: GraphPropertyEvent) -> Result<(), Self::Error> {
        self.sender.send(event).map_err(|e| QueueClosed {
            element_id: e.0.element_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lineage_domain::Priority;

    fn event(id: &str) -> GraphPropertyEvent {
        GraphPropertyEvent {
            element_id: id.to_string(),
            property_key: None,
            property_name: "p".to_string(),
            workspace_id: Some("ws1".to_string()),
            visibility_source: None,
            priority: Priority::Normal,
        }
    }

    #[tokio::test]
    async fn test_events_arrive_in_order() {
        let (queue, mut events) = ChannelWorkQueue::new();
        queue.publish(event("a")).unwrap();
        queue.publish(event("b")).unwrap();
        drop(queue);

        assert_eq!(events.recv().await.unwrap().element_id, "a");
        assert_eq!(events.recv().await.unwrap().element_id, "b");
        assert!(events.recv().await.is_none());
    }

    #[test]
    fn test_closed_receiver_is_an_error() {
        let (queue, events) = ChannelWorkQueue::new();
        drop(events);
        let err = queue.publish(event("a")).unwrap_err();
        assert_eq!(err.element_id, "a");
    }
}
