use super::types::{InputEvent, Key, KeyState};

/// Handle returned by [`KeyDispatcher::subscribe`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct SubscriptionId(u64);

type KeyCallback = Box<dyn FnMut(Key)>;

/// Key-press subscribers, called in registration order.
///
/// Every press is dispatched, auto-repeats included. Releases are not.
#[derive(Default)]
pub struct KeyDispatcher {
    subscribers: Vec<(SubscriptionId, KeyCallback)>,
    next_id: u64,
}

impl KeyDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, callback: impl FnMut(Key) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Runs every subscriber if `ev` is a key press.
    pub fn dispatch(&mut self, ev: &InputEvent) {
        if let InputEvent::Key {
            key,
            state: KeyState::Pressed,
            ..
        } = ev
        {
            for (_, cb) in &mut self.subscribers {
                cb(*key);
            }
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

impl std::fmt::Debug for KeyDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyDispatcher")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::input::Modifiers;

    fn key(key: Key, state: KeyState, repeat: bool) -> InputEvent {
        InputEvent::Key {
            key,
            state,
            modifiers: Modifiers::default(),
            code: 0,
            repeat,
        }
    }

    #[test]
    fn subscribers_run_in_registration_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut d = KeyDispatcher::new();

        let s = Rc::clone(&seen);
        d.subscribe(move |k| s.borrow_mut().push(("first", k)));
        let s = Rc::clone(&seen);
        d.subscribe(move |k| s.borrow_mut().push(("second", k)));

        d.dispatch(&key(Key::Q, KeyState::Pressed, false));
        assert_eq!(*seen.borrow(), vec![("first", Key::Q), ("second", Key::Q)]);
    }

    #[test]
    fn repeats_dispatch_and_releases_do_not() {
        let count = Rc::new(RefCell::new(0));
        let mut d = KeyDispatcher::new();
        let c = Rc::clone(&count);
        d.subscribe(move |_| *c.borrow_mut() += 1);

        d.dispatch(&key(Key::Z, KeyState::Pressed, false));
        d.dispatch(&key(Key::Z, KeyState::Pressed, true));
        d.dispatch(&key(Key::Z, KeyState::Released, false));
        d.dispatch(&InputEvent::Focused(true));

        assert_eq!(*count.borrow(), 2);
    }

    #[test]
    fn unsubscribed_callback_stops_running() {
        let count = Rc::new(RefCell::new(0));
        let mut d = KeyDispatcher::new();
        let c = Rc::clone(&count);
        let id = d.subscribe(move |_| *c.borrow_mut() += 1);

        assert!(d.unsubscribe(id));
        assert!(!d.unsubscribe(id));
        d.dispatch(&key(Key::Enter, KeyState::Pressed, false));

        assert_eq!(*count.borrow(), 0);
        assert!(d.is_empty());
    }
}
