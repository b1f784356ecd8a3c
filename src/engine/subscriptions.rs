//! Subscription registry
//!
//! Tracks every listener, frame callback and timer the engine holds on the
//! host. Teardown releases them all in one call; releasing again finds
//! nothing and is harmless.

use serde::Serialize;
use tracing::{debug, trace};

/// Kind of host subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionKind {
    /// `pointermove` on the document
    PointerMove,
    /// `mouseover` (element enter and viewport enter)
    PointerOver,
    /// `mouseout` (viewport leave)
    PointerOut,
    /// `pointerdown`
    PointerDown,
    /// `pointerup`
    PointerUp,
    /// `scroll`
    Scroll,
    /// `resize`
    Resize,
    /// `visibilitychange`
    VisibilityChange,
    /// Per-frame callback
    AnimationFrame,
    /// Classifier rescan timer
    RescanTimer,
}

impl SubscriptionKind {
    /// Event listeners are registered passive; callbacks and timers are not
    /// listeners at all
    pub fn is_passive_listener(&self) -> bool {
        !matches!(self, Self::AnimationFrame | Self::RescanTimer)
    }
}

/// One live subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Subscription {
    /// Registry-unique id
    pub id: u64,
    /// What was subscribed
    pub kind: SubscriptionKind,
    /// Registered as a passive listener
    pub passive: bool,
}

/// Registry of live subscriptions
#[derive(Debug, Default)]
pub struct SubscriptionRegistry {
    active: Vec<Subscription>,
    next_id: u64,
    released_total: u64,
}

impl SubscriptionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscription; duplicates of the same kind are ignored
    pub fn subscribe(&mut self, kind: SubscriptionKind) -> u64 {
        if let Some(existing) = self.active.iter().find(|s| s.kind == kind) {
            return existing.id;
        }
        let id = self.next_id;
        self.next_id += 1;
        let subscription = Subscription {
            id,
            kind,
            passive: kind.is_passive_listener(),
        };
        trace!("Subscribed {:?} (id={}, passive={})", kind, id, subscription.passive);
        self.active.push(subscription);
        id
    }

    /// Release every subscription, returning how many were live
    pub fn release_all(&mut self) -> usize {
        let released = self.active.len();
        if released > 0 {
            debug!("Released {} subscriptions", released);
        }
        self.active.clear();
        self.released_total += released as u64;
        released
    }

    /// Subscription of a kind is live
    pub fn is_subscribed(&self, kind: SubscriptionKind) -> bool {
        self.active.iter().any(|s| s.kind == kind)
    }

    /// Live subscriptions
    pub fn active(&self) -> &[Subscription] {
        &self.active
    }

    /// Number of live subscriptions
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// No live subscriptions
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Subscriptions released over the registry's lifetime
    pub fn released_total(&self) -> u64 {
        self.released_total
    }
}
