/// User interaction listeners
///
/// Audio can only be unlocked from inside a genuine user interaction. The
/// engine keeps its own registry of which handlers are attached to which
/// interaction type and checks it before attaching, so a handler is never
/// attached twice.
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Interaction types that count as a user gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InteractionKind {
    Click,
    TouchStart,
    KeyDown,
}

impl InteractionKind {
    pub const ALL: [InteractionKind; 3] = [
        InteractionKind::Click,
        InteractionKind::TouchStart,
        InteractionKind::KeyDown,
    ];

    /// Platform event name
    pub fn event_name(&self) -> &'static str {
        match self {
            InteractionKind::Click => "click",
            InteractionKind::TouchStart => "touchstart",
            InteractionKind::KeyDown => "keydown",
        }
    }
}

impl fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.event_name())
    }
}

/// Identity of an attached handler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(pub &'static str);

/// Event type -> attached handler identities
#[derive(Debug, Default)]
pub struct ListenerRegistry {
    handlers: HashMap<InteractionKind, HashSet<HandlerId>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach unless already attached. Returns true if newly attached.
    pub fn register(&mut self, kind: InteractionKind, handler: HandlerId) -> bool {
        self.handlers.entry(kind).or_default().insert(handler)
    }

    /// Detach. Returns true if it was attached.
    pub fn remove(&mut self, kind: InteractionKind, handler: HandlerId) -> bool {
        let Some(set) = self.handlers.get_mut(&kind) else {
            return false;
        };
        let removed = set.remove(&handler);
        if set.is_empty() {
            self.handlers.remove(&kind);
        }
        removed
    }

    pub fn is_registered(&self, kind: InteractionKind, handler: HandlerId) -> bool {
        self.handlers
            .get(&kind)
            .is_some_and(|set| set.contains(&handler))
    }

    /// Number of handlers attached to an event type
    pub fn count(&self, kind: InteractionKind) -> usize {
        self.handlers.get(&kind).map_or(0, HashSet::len)
    }

    pub fn clear(&mut self) {
        self.handlers.clear();
    }
}
