use crate::session::SessionState;
use std::fmt;

/// Controller contract shared by every assessment engine.
///
/// The host owns the event loop: it forwards input to the engine's own
/// interaction methods, calls [`Task::tick`] once per frame, and draws
/// whatever [`Task::scene`] returns. Nothing here blocks.
pub trait Task {
    type Outcome: Clone + fmt::Debug;
    type Scene;

    /// Cancel pending scheduled work, regenerate content, return to Idle.
    fn reset(&mut self);

    /// Advance time-driven state against the engine's timer.
    fn tick(&mut self);

    fn session_state(&self) -> SessionState;

    /// Current metrics, final once the session is completed.
    fn result(&self) -> Self::Outcome;

    /// Immutable snapshot for the presentation layer.
    fn scene(&self) -> Self::Scene;
}

/// Completion callback, fired at most once per session.
pub struct CompletionHook<O> {
    callback: Option<Box<dyn FnMut(&O)>>,
    fired: bool,
}

impl<O> CompletionHook<O> {
    pub fn none() -> Self {
        Self {
            callback: None,
            fired: false,
        }
    }

    pub fn new(callback: impl FnMut(&O) + 'static) -> Self {
        Self {
            callback: Some(Box::new(callback)),
            fired: false,
        }
    }

    /// Invoke the callback unless it already fired for this session.
    pub fn fire(&mut self, outcome: &O) -> bool {
        if self.fired {
            return false;
        }
        self.fired = true;
        if let Some(cb) = self.callback.as_mut() {
            cb(outcome);
        }
        true
    }

    /// Arm the hook for a fresh session.
    pub fn rearm(&mut self) {
        self.fired = false;
    }

    pub fn has_fired(&self) -> bool {
        self.fired
    }
}

impl<O> Default for CompletionHook<O> {
    fn default() -> Self {
        Self::none()
    }
}

impl<O> fmt::Debug for CompletionHook<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionHook")
            .field("installed", &self.callback.is_some())
            .field("fired", &self.fired)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn fires_once_until_rearmed() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut hook = CompletionHook::new(move |v: &u32| sink.borrow_mut().push(*v));

        assert!(hook.fire(&1));
        assert!(!hook.fire(&2));
        hook.rearm();
        assert!(hook.fire(&3));
        assert_eq!(*seen.borrow(), vec![1, 3]);
    }

    #[test]
    fn empty_hook_still_tracks_firing() {
        let mut hook = CompletionHook::<u32>::none();
        assert!(!hook.has_fired());
        assert!(hook.fire(&7));
        assert!(hook.has_fired());
    }
}
