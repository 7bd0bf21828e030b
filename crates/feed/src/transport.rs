//! Publish/subscribe transport
//!
//! Pipelines only see the [`Publisher`] and [`Subscriber`] traits. The
//! in-process implementation is a named `tokio::sync::broadcast` channel
//! carrying JSON frames. A topic closes once every [`Topic`] handle for it
//! has been dropped; subscribers then drain what is buffered and see `None`.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::warn;

use crate::error::{FeedError, FeedResult};

/// Topic carrying every inbound trade
pub const TRADES_TOPIC: &str = "trades";
/// Topic carrying every published window
pub const WINDOWS_TOPIC: &str = "windows";

/// Sends frames on a topic
#[async_trait]
pub trait Publisher: Send + Sync {
    fn topic(&self) -> &str;

    /// Send `frame`, returning how many subscribers it reached.
    async fn publish(&self, frame: String) -> FeedResult<usize>;
}

/// Receives frames from a topic
#[async_trait]
pub trait Subscriber: Send {
    fn topic(&self) -> &str;

    /// Next frame; `Ok(None)` once the topic is closed and drained.
    async fn recv(&mut self) -> FeedResult<Option<String>>;
}

/// In-process broadcast topic. Cloning shares the same channel.
#[derive(Debug, Clone)]
pub struct Topic {
    name: Arc<str>,
    sender: broadcast::Sender<String>,
}

impl Topic {
    /// Create a topic buffering up to `capacity` frames per subscriber.
    pub fn new(name: &str, capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            name: Arc::from(name),
            sender,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// New subscriber that sees frames published from now on.
    pub fn subscribe(&self) -> TopicSubscriber {
        TopicSubscriber {
            name: Arc::clone(&self.name),
            receiver: self.sender.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[async_trait]
impl Publisher for Topic {
    fn topic(&self) -> &str {
        &self.name
    }

    async fn publish(&self, frame: String) -> FeedResult<usize> {
        self.sender
            .send(frame)
            .map_err(|_| FeedError::NoSubscribers(self.name.to_string()))
    }
}

/// Receiving end of a [`Topic`]
#[derive(Debug)]
pub struct TopicSubscriber {
    name: Arc<str>,
    receiver: broadcast::Receiver<String>,
}

#[async_trait]
impl Subscriber for TopicSubscriber {
    fn topic(&self) -> &str {
        &self.name
    }

    async fn recv(&mut self) -> FeedResult<Option<String>> {
        loop {
            match self.receiver.recv().await {
                Ok(frame) => return Ok(Some(frame)),
                Err(RecvError::Closed) => return Ok(None),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(topic = %self.name, skipped, "Subscriber lagged, frames skipped");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn test_publish_and_receive() {
        let topic = Topic::new(TRADES_TOPIC, 8);
        let mut a = topic.subscribe();
        let mut b = topic.subscribe();

        assert_eq!(assert_ok!(topic.publish("one".into()).await), 2);
        assert_eq!(a.recv().await.unwrap(), Some("one".to_string()));
        assert_eq!(b.recv().await.unwrap(), Some("one".to_string()));
        assert_eq!(a.topic(), "trades");
    }

    #[tokio::test]
    async fn test_publish_without_subscribers() {
        let topic = Topic::new(WINDOWS_TOPIC, 8);
        let err = assert_err!(topic.publish("frame".into()).await);
        assert!(matches!(err, FeedError::NoSubscribers(name) if name == "windows"));
    }

    #[tokio::test]
    async fn test_closed_after_drain() {
        let topic = Topic::new(TRADES_TOPIC, 8);
        let mut sub = topic.subscribe();
        topic.publish("last".into()).await.unwrap();
        drop(topic);

        assert_eq!(sub.recv().await.unwrap(), Some("last".to_string()));
        assert_eq!(sub.recv().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_lagging_subscriber_keeps_receiving() {
        let topic = Topic::new(TRADES_TOPIC, 2);
        let mut sub = topic.subscribe();
        for i in 0..5 {
            topic.publish(format!("f{i}")).await.unwrap();
        }
        assert_eq!(sub.recv().await.unwrap(), Some("f3".to_string()));
        assert_eq!(sub.recv().await.unwrap(), Some("f4".to_string()));
    }
}
