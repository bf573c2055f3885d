//! Bounded, backpressured fan-out from one publisher to many subscribers.

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

/// A bounded multi-consumer event stream.
///
/// `publish` fans a value out to every live subscriber's channel. A slow
/// subscriber backpressures the publisher (the `send` for that
/// subscriber awaits until the subscriber drains its queue or the
/// publisher's own caller gives up) rather than dropping the event or
/// disconnecting the subscriber — "events never dropped" is the
/// contract the SSE gateway layer relies on. A subscriber whose receiver
/// has been dropped is pruned on the next publish; it does not affect
/// delivery to anyone else, and does not affect the publisher at all.
pub struct EventBus<T> {
    capacity: usize,
    subscribers: Mutex<Vec<mpsc::Sender<T>>>,
}

impl<T: Clone + Send + 'static> EventBus<T> {
    /// Create a bus whose subscriber channels each hold up to `capacity`
    /// unconsumed events before backpressuring the publisher.
    pub fn new(capacity: usize) -> Self {
        Self { capacity, subscribers: Mutex::new(Vec::new()) }
    }

    /// Register a new subscriber. The returned stream only sees events
    /// published after this call.
    pub fn subscribe(&self) -> ReceiverStream<T> {
        let (tx, rx) = mpsc::channel(self.capacity);
        self.subscribers.lock().push(tx);
        ReceiverStream::new(rx)
    }

    /// Current number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }

    /// Publish a value to every live subscriber, backpressuring on each
    /// full channel in turn. Subscribers whose receiver has already been
    /// dropped are pruned rather than causing an error.
    pub async fn publish(&self, value: T) {
        let senders = self.subscribers.lock().clone();
        let mut dead = Vec::new();
        for (index, sender) in senders.iter().enumerate() {
            if sender.send(value.clone()).await.is_err() {
                dead.push(index);
            }
        }
        if !dead.is_empty() {
            let mut subscribers = self.subscribers.lock();
            for index in dead.into_iter().rev() {
                subscribers.remove(index);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio_stream::StreamExt;

    use super::*;

    #[tokio::test]
    async fn each_subscriber_receives_every_published_value() {
        let bus: EventBus<u32> = EventBus::new(4);
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();

        bus.publish(1).await;
        bus.publish(2).await;

        assert_eq!(a.next().await, Some(1));
        assert_eq!(a.next().await, Some(2));
        assert_eq!(b.next().await, Some(1));
        assert_eq!(b.next().await, Some(2));
    }

    #[tokio::test]
    async fn publish_backpressures_on_a_full_channel_instead_of_dropping() {
        let bus: EventBus<u32> = EventBus::new(1);
        let mut rx = bus.subscribe();

        bus.publish(1).await;

        let publish_second = tokio::spawn(async move {
            bus.publish(2).await;
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!publish_second.is_finished());

        assert_eq!(rx.next().await, Some(1));
        publish_second.await.unwrap();
        assert_eq!(rx.next().await, Some(2));
    }

    #[tokio::test]
    async fn dropped_subscriber_is_pruned_without_affecting_others() {
        let bus: EventBus<u32> = EventBus::new(4);
        let mut keep = bus.subscribe();
        drop(bus.subscribe());

        bus.publish(7).await;
        assert_eq!(bus.subscriber_count(), 1);
        assert_eq!(keep.next().await, Some(7));
    }

    #[test]
    fn subscribing_starts_with_zero_subscribers() {
        let bus: EventBus<u32> = EventBus::new(4);
        assert_eq!(bus.subscriber_count(), 0);
    }
}
