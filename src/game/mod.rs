/// Game module
///
/// Game-state snapshots from the scoring application, the store that
/// publishes them, and the classifier that turns a new snapshot into
/// trigger names.
///
/// ## Usage
///
/// ```rust,ignore
/// let store = GameDataStore::new();
/// let subscription = store.watch(Box::new(|new, old| {
///     for trigger in classify(new, old, &catalog) {
///         engine.play_trigger(&trigger);
///     }
/// }));
///
/// store.set_value(snapshot);
/// ```
pub mod classifier;
pub mod snapshot;
pub mod store;

pub use classifier::{classify, player_trigger_suffix};
pub use snapshot::{GameData, MatchState, Player, Segment, Throw, Turn};
pub use store::{GameDataStore, GameStateStore, Subscription, WatchCallback};
