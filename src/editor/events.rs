/// Broadcast after every editor mutation, once its snapshot has been committed.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct StateChanged {
    pub reason: String,
    pub undo_available: bool,
    pub redo_available: bool,
    pub is_rendering: bool,
    /// A render failed since the previous event.
    pub render_failed: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&StateChanged) + Send>;

/// Synchronous fan-out of [`StateChanged`] events, in subscription order.
#[derive(Default)]
pub struct EventBus {
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_id: u64,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl EventBus {
    pub fn subscribe<F>(&mut self, f: F) -> SubscriptionId
    where
        F: FnMut(&StateChanged) + Send + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(f)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    pub fn emit(&mut self, event: &StateChanged) {
        tracing::debug!(reason = %event.reason, "state changed");
        for (_, f) in &mut self.subscribers {
            f(event);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/editor/events.rs"]
mod tests;
