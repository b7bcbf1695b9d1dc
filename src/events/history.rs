//! events::history
//!
//! Bounded back/forward navigation history.
//!
//! The back stack holds visited targets with the current one on top. Going
//! back moves the current target to the forward stack; going forward moves it
//! back. A new navigation clears the forward stack.
//!
//! # Example
//!
//! ```
//! use dexedit::core::types::FacadeId;
//! use dexedit::events::NavigationHistory;
//!
//! let (a, b) = (FacadeId::from_index(1), FacadeId::from_index(2));
//! let mut history = NavigationHistory::new(10);
//! history.push(a);
//! history.push(b);
//!
//! assert_eq!(history.back(), Some(a));
//! assert_eq!(history.forward(), Some(b));
//! assert_eq!(history.current(), Some(b));
//! ```

use std::collections::VecDeque;

use crate::core::types::FacadeId;

/// Default bound on the back stack.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

#[derive(Debug, Clone)]
pub struct NavigationHistory {
    back: VecDeque<FacadeId>,
    forward: Vec<FacadeId>,
    limit: usize,
}

impl Default for NavigationHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl NavigationHistory {
    /// History keeping at most `limit` back entries (at least one).
    pub fn new(limit: usize) -> Self {
        Self {
            back: VecDeque::new(),
            forward: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Record a new navigation. The forward stack is always cleared.
    ///
    /// Returns false if `target` was already current, in which case the back
    /// stack is left as it was.
    pub fn push(&mut self, target: FacadeId) -> bool {
        self.forward.clear();
        if self.current() == Some(target) {
            return false;
        }
        self.push_back(target);
        true
    }

    /// Step back; returns the new current target.
    pub fn back(&mut self) -> Option<FacadeId> {
        if self.back.len() < 2 {
            return None;
        }
        let left = self.back.pop_back()?;
        self.forward.push(left);
        self.current()
    }

    /// Step forward; returns the new current target.
    pub fn forward(&mut self) -> Option<FacadeId> {
        let target = self.forward.pop()?;
        self.push_back(target);
        Some(target)
    }

    pub fn current(&self) -> Option<FacadeId> {
        self.back.back().copied()
    }

    pub fn can_go_back(&self) -> bool {
        self.back.len() > 1
    }

    pub fn can_go_forward(&self) -> bool {
        !self.forward.is_empty()
    }

    /// Back-stack entries, oldest first, current last.
    pub fn back_entries(&self) -> impl Iterator<Item = FacadeId> + '_ {
        self.back.iter().copied()
    }

    /// Forward-stack entries, next first.
    pub fn forward_entries(&self) -> impl Iterator<Item = FacadeId> + '_ {
        self.forward.iter().rev().copied()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn clear(&mut self) {
        self.back.clear();
        self.forward.clear();
    }

    fn push_back(&mut self, target: FacadeId) {
        if self.back.len() == self.limit {
            self.back.pop_front();
        }
        self.back.push_back(target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<FacadeId> {
        (1..=n).map(FacadeId::from_index).collect()
    }

    #[test]
    fn round_trip_returns_to_latest() {
        let t = ids(3);
        let mut history = NavigationHistory::default();
        for id in &t {
            history.push(*id);
        }
        assert_eq!(history.back(), Some(t[1]));
        assert_eq!(history.back(), Some(t[0]));
        assert_eq!(history.back(), None);
        assert_eq!(history.forward(), Some(t[1]));
        assert_eq!(history.forward(), Some(t[2]));
        assert_eq!(history.forward(), None);
        assert_eq!(history.current(), Some(t[2]));
    }

    #[test]
    fn new_navigation_clears_forward() {
        let t = ids(4);
        let mut history = NavigationHistory::default();
        history.push(t[0]);
        history.push(t[1]);
        history.push(t[2]);
        history.back();
        assert!(history.can_go_forward());

        history.push(t[3]);
        assert!(!history.can_go_forward());
        assert_eq!(history.back_entries().collect::<Vec<_>>(), vec![t[0], t[1], t[3]]);
    }

    #[test]
    fn repeating_current_keeps_back_stack_but_clears_forward() {
        let t = ids(3);
        let mut history = NavigationHistory::default();
        history.push(t[0]);
        history.push(t[1]);
        history.push(t[2]);
        history.back();
        assert!(history.can_go_forward());

        assert!(!history.push(t[1]));
        assert!(!history.can_go_forward());
        assert_eq!(history.forward(), None);
        assert_eq!(history.back_entries().collect::<Vec<_>>(), vec![t[0], t[1]]);
    }

    #[test]
    fn back_stack_is_bounded() {
        let t = ids(5);
        let mut history = NavigationHistory::new(3);
        for id in &t {
            history.push(*id);
        }
        assert_eq!(history.back_entries().collect::<Vec<_>>(), vec![t[2], t[3], t[4]]);
        assert_eq!(NavigationHistory::new(0).limit(), 1);
    }
}
