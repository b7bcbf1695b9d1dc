//! events::bus
//!
//! Synchronous publish/subscribe with per-view-group navigation locks.
//!
//! # Delivery
//!
//! `post` invokes every matching handler, in subscription order, before it
//! returns. A handler subscribed with a view group whose lock is engaged only
//! receives `Lock` events and structural changes.

use std::collections::HashSet;

use crate::core::types::{FacadeId, ViewGroupId};

use super::event::{DexEvent, EventKind};
use super::history::NavigationHistory;

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Event handler callback.
pub type Handler = Box<dyn FnMut(&DexEvent)>;

struct Subscription {
    id: SubscriptionId,
    /// Empty means every kind.
    kinds: Vec<EventKind>,
    group: Option<ViewGroupId>,
    handler: Handler,
}

impl Subscription {
    fn wants(&self, kind: EventKind) -> bool {
        self.kinds.is_empty() || self.kinds.contains(&kind)
    }
}

/// The event bus.
pub struct EventBus {
    subscriptions: Vec<Subscription>,
    next_id: u64,
    locked: HashSet<ViewGroupId>,
    history: NavigationHistory,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(NavigationHistory::default())
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriptions", &self.subscriptions.len())
            .field("locked", &self.locked)
            .field("history", &self.history)
            .finish()
    }
}

impl EventBus {
    pub fn new(history: NavigationHistory) -> Self {
        Self {
            subscriptions: Vec::new(),
            next_id: 0,
            locked: HashSet::new(),
            history,
        }
    }

    /// Register `handler` for `kinds` (all kinds if empty).
    ///
    /// A handler in a view group is subject to that group's lock.
    pub fn subscribe<F>(
        &mut self,
        kinds: &[EventKind],
        group: Option<ViewGroupId>,
        handler: F,
    ) -> SubscriptionId
    where
        F: FnMut(&DexEvent) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscriptions.push(Subscription {
            id,
            kinds: kinds.to_vec(),
            group,
            handler: Box::new(handler),
        });
        id
    }

    /// Remove a subscription. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != id);
        self.subscriptions.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Publish an event. Returns the number of handlers invoked.
    ///
    /// New navigation events are recorded in the history; replayed ones are
    /// not.
    pub fn post(&mut self, event: &DexEvent) -> usize {
        if event.kind == EventKind::Navigation && !event.replayed {
            if let Some(target) = event.target {
                self.history.push(target);
            }
        }

        let mut delivered = 0;
        for subscription in &mut self.subscriptions {
            if !subscription.wants(event.kind) {
                continue;
            }
            let suppressed = subscription
                .group
                .as_ref()
                .is_some_and(|g| self.locked.contains(g))
                && !(event.kind == EventKind::Lock || event.kind.is_structural());
            if suppressed {
                tracing::debug!(
                    subscription = subscription.id.0,
                    kind = %event.kind,
                    "delivery suppressed by view-group lock"
                );
                continue;
            }
            (subscription.handler)(event);
            delivered += 1;
        }
        delivered
    }

    /// Engage the lock of `group` and announce it.
    pub fn lock(&mut self, group: ViewGroupId) -> DexEvent {
        self.locked.insert(group.clone());
        let event = DexEvent::lock(group, true);
        self.post(&event);
        event
    }

    /// Release the lock of `group` and announce it.
    pub fn unlock(&mut self, group: ViewGroupId) -> DexEvent {
        self.locked.remove(&group);
        let event = DexEvent::lock(group, false);
        self.post(&event);
        event
    }

    pub fn is_locked(&self, group: &ViewGroupId) -> bool {
        self.locked.contains(group)
    }

    /// Publish a new navigation to `target`.
    pub fn navigate(&mut self, target: FacadeId) -> DexEvent {
        let event = DexEvent::navigation(target);
        self.post(&event);
        event
    }

    /// Replay the previous navigation, if any.
    pub fn back(&mut self) -> Option<DexEvent> {
        let target = self.history.back()?;
        Some(self.replay(target))
    }

    /// Replay the next navigation, if any.
    pub fn forward(&mut self) -> Option<DexEvent> {
        let target = self.history.forward()?;
        Some(self.replay(target))
    }

    fn replay(&mut self, target: FacadeId) -> DexEvent {
        let event = DexEvent::navigation(target).replayed();
        self.post(&event);
        event
    }

    pub fn history(&self) -> &NavigationHistory {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder() -> (Rc<RefCell<Vec<EventKind>>>, impl FnMut(&DexEvent) + 'static) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        (seen, move |e: &DexEvent| sink.borrow_mut().push(e.kind))
    }

    #[test]
    fn delivers_in_subscription_order() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::default();
        for n in 0..3 {
            let order = Rc::clone(&order);
            bus.subscribe(&[], None, move |_| order.borrow_mut().push(n));
        }
        bus.post(&DexEvent::new(EventKind::NameChange));
        assert_eq!(*order.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn filters_by_kind_and_unsubscribes() {
        let (seen, handler) = recorder();
        let mut bus = EventBus::default();
        let id = bus.subscribe(&[EventKind::ChildAdded], None, handler);

        bus.post(&DexEvent::new(EventKind::NameChange));
        bus.post(&DexEvent::new(EventKind::ChildAdded));
        assert_eq!(*seen.borrow(), vec![EventKind::ChildAdded]);

        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        assert_eq!(bus.post(&DexEvent::new(EventKind::ChildAdded)), 0);
    }

    #[test]
    fn locked_group_only_sees_lock_and_structure() {
        let group = ViewGroupId::new("details").unwrap();
        let (locked_seen, locked_handler) = recorder();
        let (free_seen, free_handler) = recorder();
        let mut bus = EventBus::default();
        bus.subscribe(&[], Some(group.clone()), locked_handler);
        bus.subscribe(&[], None, free_handler);

        bus.lock(group.clone());
        bus.navigate(FacadeId::from_index(1));
        bus.post(&DexEvent::new(EventKind::NameChange));
        bus.post(&DexEvent::new(EventKind::ChildDeleted));
        bus.unlock(group.clone());
        bus.navigate(FacadeId::from_index(2));

        assert_eq!(
            *locked_seen.borrow(),
            vec![EventKind::Lock, EventKind::ChildDeleted, EventKind::Lock, EventKind::Navigation]
        );
        assert_eq!(free_seen.borrow().len(), 6);
        assert!(!bus.is_locked(&group));
    }

    #[test]
    fn back_and_forward_replay_without_recording() {
        let (a, b) = (FacadeId::from_index(1), FacadeId::from_index(2));
        let mut bus = EventBus::default();
        bus.navigate(a);
        bus.navigate(b);

        let back = bus.back().unwrap();
        assert!(back.replayed);
        assert_eq!(back.target, Some(a));
        assert_eq!(bus.forward().unwrap().target, Some(b));
        assert!(bus.forward().is_none());
        assert_eq!(bus.history().back_entries().count(), 2);
    }
}
