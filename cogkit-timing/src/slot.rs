/// A single cancellable scheduled event.
///
/// Engines keep exactly one slot, so there is never more than one pending
/// callback per instance. Scheduling replaces whatever was pending.
#[derive(Debug, Clone)]
pub struct TaskSlot<E> {
    pending: Option<(u64, E)>,
}

impl<E> TaskSlot<E> {
    pub fn new() -> Self {
        Self { pending: None }
    }

    pub fn schedule(&mut self, due_ns: u64, event: E) {
        self.pending = Some((due_ns, event));
    }

    /// Drop the pending event. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn due(&self) -> Option<u64> {
        self.pending.as_ref().map(|(due, _)| *due)
    }

    /// Take the event if its deadline has passed. Yields `(due, event)` so
    /// handlers can chain the next deadline off the scheduled one.
    pub fn poll(&mut self, now_ns: u64) -> Option<(u64, E)> {
        match &self.pending {
            Some((due, _)) if *due <= now_ns => self.pending.take(),
            _ => None,
        }
    }
}

impl<E> Default for TaskSlot<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_only_after_deadline() {
        let mut slot = TaskSlot::new();
        slot.schedule(100, "tick");
        assert_eq!(slot.poll(99), None);
        assert_eq!(slot.poll(100), Some((100, "tick")));
        assert_eq!(slot.poll(1_000), None);
    }

    #[test]
    fn cancel_prevents_firing() {
        let mut slot = TaskSlot::new();
        slot.schedule(10, 1);
        assert!(slot.cancel());
        assert!(!slot.cancel());
        assert_eq!(slot.poll(u64::MAX), None);
    }

    #[test]
    fn reschedule_replaces_pending() {
        let mut slot = TaskSlot::new();
        slot.schedule(10, 'a');
        slot.schedule(50, 'b');
        assert_eq!(slot.due(), Some(50));
        assert_eq!(slot.poll(20), None);
        assert_eq!(slot.poll(50), Some((50, 'b')));
    }
}
