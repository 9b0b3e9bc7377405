use crate::domain::events::{EventListener, OptimizerEvent};
use crossbeam_channel::{Receiver, Sender};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

/// Event bus for publishing optimizer events to multiple listeners
pub struct EventBus {
    listeners: Arc<RwLock<Vec<Arc<dyn EventListener>>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Subscribe a listener to events
    pub fn subscribe(&self, listener: Arc<dyn EventListener>) {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }

    /// Publish an event to all listeners, in subscription order.
    ///
    /// Dispatch runs on a snapshot of the listener list, so a listener may
    /// publish or subscribe from inside `on_event`.
    pub fn publish(&self, event: OptimizerEvent) {
        let listeners = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for listener in listeners.iter() {
            listener.on_event(&event);
        }
    }

    /// Get count of subscribers (for testing)
    pub fn subscriber_count(&self) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            listeners: Arc::clone(&self.listeners),
        }
    }
}

/// Forwards events into a channel so another thread can consume them
pub struct ChannelListener {
    sender: Sender<OptimizerEvent>,
}

impl ChannelListener {
    /// Unbounded listener plus the receiving end
    pub fn unbounded() -> (Self, Receiver<OptimizerEvent>) {
        let (sender, receiver) = crossbeam_channel::unbounded();
        (Self { sender }, receiver)
    }
}

impl EventListener for ChannelListener {
    fn on_event(&self, event: &OptimizerEvent) {
        if self.sender.send(event.clone()).is_err() {
            debug!("ChannelListener: receiver dropped, event discarded");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::events::LoggingListener;
    use crate::domain::optimization::ParameterSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingListener {
        count: Arc<AtomicUsize>,
    }

    impl EventListener for CountingListener {
        fn on_event(&self, _event: &OptimizerEvent) {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn backup_event() -> OptimizerEvent {
        OptimizerEvent::BackupCreated {
            parameters: ParameterSet::default(),
        }
    }

    #[test]
    fn test_event_bus_subscribe() {
        let bus = EventBus::new();
        assert_eq!(bus.subscriber_count(), 0);

        bus.subscribe(Arc::new(LoggingListener));
        assert_eq!(bus.subscriber_count(), 1);

        bus.subscribe(Arc::new(LoggingListener));
        assert_eq!(bus.subscriber_count(), 2);
    }

    #[test]
    fn test_event_bus_multiple_listeners() {
        let bus = EventBus::new();
        let count1 = Arc::new(AtomicUsize::new(0));
        let count2 = Arc::new(AtomicUsize::new(0));

        bus.subscribe(Arc::new(CountingListener {
            count: Arc::clone(&count1),
        }));
        bus.subscribe(Arc::new(CountingListener {
            count: Arc::clone(&count2),
        }));

        bus.publish(backup_event());
        bus.publish(backup_event());

        assert_eq!(count1.load(Ordering::SeqCst), 2);
        assert_eq!(count2.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_clone_shares_listeners() {
        let bus = EventBus::new();
        let clone = bus.clone();
        clone.subscribe(Arc::new(LoggingListener));
        assert_eq!(bus.subscriber_count(), 1);
    }

    #[test]
    fn test_channel_listener_forwards() {
        let bus = EventBus::new();
        let (listener, receiver) = ChannelListener::unbounded();
        bus.subscribe(Arc::new(listener));

        bus.publish(backup_event());

        assert_eq!(receiver.try_recv().unwrap(), backup_event());
        assert!(receiver.try_recv().is_err());
    }

    /// Subscribes a counter the first time it hears an event
    struct SubscribingListener {
        bus: EventBus,
        count: Arc<AtomicUsize>,
    }

    impl EventListener for SubscribingListener {
        fn on_event(&self, _event: &OptimizerEvent) {
            if self.bus.subscriber_count() == 1 {
                self.bus.subscribe(Arc::new(CountingListener {
                    count: Arc::clone(&self.count),
                }));
            }
        }
    }

    #[test]
    fn test_listener_may_subscribe_during_publish() {
        let bus = EventBus::new();
        let count = Arc::new(AtomicUsize::new(0));
        bus.subscribe(Arc::new(SubscribingListener {
            bus: bus.clone(),
            count: Arc::clone(&count),
        }));

        bus.publish(backup_event());
        assert_eq!(bus.subscriber_count(), 2);
        // New subscribers only see later events
        assert_eq!(count.load(Ordering::SeqCst), 0);

        bus.publish(backup_event());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_channel_listener_survives_dropped_receiver() {
        let (listener, receiver) = ChannelListener::unbounded();
        drop(receiver);
        listener.on_event(&backup_event());
    }
}
