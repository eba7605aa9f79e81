/// Game-state store
///
/// Holds the latest snapshot and notifies watchers with `(new, old)` pairs
/// on every update.
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use super::snapshot::GameData;

/// Called with `(new, old)` on every update
pub type WatchCallback = Box<dyn Fn(&GameData, &GameData) + Send + Sync>;

/// Source of game-state updates
pub trait GameStateStore: Send + Sync {
    /// Subscribe to updates; dropping the subscription unsubscribes
    fn watch(&self, callback: WatchCallback) -> Subscription;
}

/// Unsubscribe handle
#[must_use = "dropping a subscription unsubscribes immediately"]
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(unsubscribe: impl FnOnce() + Send + 'static) -> Self {
        Self {
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }

    /// Stop receiving updates
    pub fn unsubscribe(mut self) {
        self.detach();
    }

    fn detach(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach();
    }
}

/// Subscriber ID for tracking subscriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct SubscriberId(usize);

struct Subscriber {
    id: SubscriberId,
    callback: Arc<dyn Fn(&GameData, &GameData) + Send + Sync>,
}

#[derive(Default)]
struct Watchers {
    subscribers: Vec<Subscriber>,
    next_id: usize,
}

/// In-process game-state store
pub struct GameDataStore {
    current: RwLock<GameData>,
    watchers: Arc<RwLock<Watchers>>,
}

impl GameDataStore {
    pub fn new() -> Self {
        Self {
            current: RwLock::new(GameData::default()),
            watchers: Arc::new(RwLock::new(Watchers::default())),
        }
    }

    /// Latest snapshot
    pub fn get_value(&self) -> GameData {
        self.current.read().clone()
    }

    /// Replace the snapshot and notify watchers
    pub fn set_value(&self, value: GameData) {
        let old = std::mem::replace(&mut *self.current.write(), value.clone());

        // Call outside the lock so callbacks may unsubscribe
        let callbacks: Vec<_> = self
            .watchers
            .read()
            .subscribers
            .iter()
            .map(|s| Arc::clone(&s.callback))
            .collect();

        for callback in callbacks {
            callback(&value, &old);
        }
    }

    /// Get number of active watchers
    pub fn watcher_count(&self) -> usize {
        self.watchers.read().subscribers.len()
    }
}

impl Default for GameDataStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GameStateStore for GameDataStore {
    fn watch(&self, callback: WatchCallback) -> Subscription {
        let mut watchers = self.watchers.write();
        let id = SubscriberId(watchers.next_id);
        watchers.next_id += 1;
        watchers.subscribers.push(Subscriber {
            id,
            callback: Arc::from(callback),
        });
        drop(watchers);

        let weak: Weak<RwLock<Watchers>> = Arc::downgrade(&self.watchers);
        Subscription::new(move || {
            if let Some(watchers) = weak.upgrade() {
                watchers.write().subscribers.retain(|s| s.id != id);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::snapshot::{MatchState, Throw, Turn};
    use crossbeam_channel::unbounded;

    fn with_throw(segment: &str) -> GameData {
        GameData {
            match_state: Some(MatchState {
                activated: None,
                player: 0,
                turns: vec![Turn {
                    throws: vec![Throw::new(segment)],
                    busted: false,
                    points: 0,
                }],
                winner: -1,
                variant: String::new(),
                game_scores: Vec::new(),
                players: Vec::new(),
            }),
        }
    }

    #[test]
    fn test_watch_receives_new_and_old() {
        let store = GameDataStore::new();
        let (tx, rx) = unbounded();
        let _subscription = store.watch(Box::new(move |new: &GameData, old: &GameData| {
            let _ = tx.send((new.clone(), old.clone()));
        }));

        store.set_value(with_throw("S1"));
        store.set_value(with_throw("S2"));

        let (new, old) = rx.try_recv().unwrap();
        assert_eq!(new, with_throw("S1"));
        assert_eq!(old, GameData::default());

        let (new, old) = rx.try_recv().unwrap();
        assert_eq!(new, with_throw("S2"));
        assert_eq!(old, with_throw("S1"));
        assert_eq!(store.get_value(), with_throw("S2"));
    }

    #[test]
    fn test_unsubscribe() {
        let store = GameDataStore::new();
        let (tx, rx) = unbounded::<()>();
        let subscription = store.watch(Box::new(move |_: &GameData, _: &GameData| {
            let _ = tx.send(());
        }));
        assert_eq!(store.watcher_count(), 1);

        subscription.unsubscribe();
        assert_eq!(store.watcher_count(), 0);

        store.set_value(with_throw("S1"));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_drop_unsubscribes() {
        let store = GameDataStore::new();
        {
            let _a = store.watch(Box::new(|_: &GameData, _: &GameData| {}));
            let _b = store.watch(Box::new(|_: &GameData, _: &GameData| {}));
            assert_eq!(store.watcher_count(), 2);
        }
        assert_eq!(store.watcher_count(), 0);
    }

    #[test]
    fn test_subscription_outlives_store() {
        let store = GameDataStore::new();
        let subscription = store.watch(Box::new(|_: &GameData, _: &GameData| {}));
        drop(store);
        subscription.unsubscribe();
    }
}
