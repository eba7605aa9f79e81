/// Sound effects engine
///
/// Owns the playback queue, the audio pool, the blob registry and the
/// unlock state. Every method runs on the thread that owns the engine;
/// the service wraps it in a worker thread and feeds it messages.
use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::Rng;

use crate::blob::BlobRegistry;
use crate::catalog::{PlaybackRequest, SoundAsset, SourceKind};
use crate::config::ConfigStore;
use crate::error::PlaybackError;
use crate::game::{classify, GameData};
use crate::interaction::{HandlerId, InteractionKind, ListenerRegistry};
use crate::notify::InteractionNotifier;
use crate::playback::pool::DEFAULT_POOL_SIZE;
use crate::playback::{
    AudioBackend, AudioHandle, AudioPool, BoundSource, CompletionSender, GesturePolicy, InFlight,
    PlaybackEvent, PlaybackQueue,
};
use crate::trigger::{pick, resolve};

const LOG_TARGET: &str = "darts_sound_fx::engine";

/// Handler attached to every interaction kind until audio is unlocked
pub const UNLOCK_HANDLER: HandlerId = HandlerId("sound-fx-unlock");

/// Engine tunables
#[derive(Debug, Clone)]
pub struct SoundFxOptions {
    /// Number of reusable playback handles
    pub pool_size: usize,
    /// Quiet period before a game-state update is classified
    pub debounce: Duration,
    /// How often the blob registry is swept
    pub sweep_interval: Duration,
    /// Sweep trims once more than this many blobs are pending
    pub blob_high_water: usize,
    /// Blobs kept by a sweep
    pub blob_keep: usize,
    pub gesture_policy: GesturePolicy,
}

impl Default for SoundFxOptions {
    fn default() -> Self {
        Self {
            pool_size: DEFAULT_POOL_SIZE,
            debounce: Duration::from_millis(200),
            sweep_interval: Duration::from_secs(60),
            blob_high_water: 20,
            blob_keep: 5,
            gesture_policy: GesturePolicy::default(),
        }
    }
}

pub struct SoundFx<B: AudioBackend, R: Rng = StdRng> {
    backend: B,
    pool: AudioPool<B::Handle>,
    queue: PlaybackQueue,
    blobs: BlobRegistry,
    config: Arc<dyn ConfigStore>,
    notifier: Box<dyn InteractionNotifier>,
    rng: R,
    completion: CompletionSender,
    gesture_policy: GesturePolicy,
    listeners: ListenerRegistry,
    unlocked: bool,
    prompt_shown: bool,
}

impl<B: AudioBackend, R: Rng> SoundFx<B, R> {
    /// Create the engine and its pool, and arm the unlock listeners
    pub fn new(
        mut backend: B,
        config: Arc<dyn ConfigStore>,
        notifier: Box<dyn InteractionNotifier>,
        rng: R,
        completion: CompletionSender,
        options: SoundFxOptions,
    ) -> Result<Self, PlaybackError> {
        let pool = AudioPool::from_backend(&mut backend, options.pool_size)?;

        let mut engine = Self {
            backend,
            pool,
            queue: PlaybackQueue::new(),
            blobs: BlobRegistry::new(options.blob_high_water, options.blob_keep),
            config,
            notifier,
            rng,
            completion,
            gesture_policy: options.gesture_policy,
            listeners: ListenerRegistry::new(),
            unlocked: false,
            prompt_shown: false,
        };
        engine.arm_unlock_listeners();

        tracing::info!(target: LOG_TARGET, "Sound FX engine ready ({} handles)", engine.pool.len());
        Ok(engine)
    }

    /// Resolve a trigger and enqueue one request per candidate tier.
    /// Returns the number of requests enqueued.
    pub fn play_trigger(&mut self, trigger: &str) -> usize {
        let Some(catalog) = self.load_catalog() else {
            return 0;
        };

        let resolution = resolve(trigger, &catalog);
        if resolution.is_empty() {
            tracing::info!(target: LOG_TARGET, "No sound found for trigger \"{}\"", trigger);
            return 0;
        }

        let mut requests = Vec::new();
        for tier in resolution.tiers() {
            let Some(asset) = pick(tier, &mut self.rng) else {
                continue;
            };
            tracing::debug!(
                target: LOG_TARGET,
                "Found matching sound \"{}\" for \"{}\"",
                asset.name,
                tier.matched
            );

            match PlaybackRequest::from_asset(asset) {
                Some(request) => requests.push(request),
                None => tracing::error!(
                    target: LOG_TARGET,
                    "Sound \"{}\" has neither URL nor embedded data",
                    asset.name
                ),
            }
        }

        let count = requests.len();
        for request in requests {
            self.enqueue(request);
        }
        count
    }

    /// Classify a game-state update and play the resulting triggers.
    /// Returns the triggers in play order.
    pub fn handle_snapshot(&mut self, new: &GameData, old: &GameData) -> Vec<String> {
        let catalog = self.load_catalog().unwrap_or_default();
        let triggers = classify(new, old, &catalog);

        for trigger in &triggers {
            self.play_trigger(trigger);
        }
        triggers
    }

    /// Append to the queue, starting playback when idle
    pub fn enqueue(&mut self, request: PlaybackRequest) {
        tracing::debug!(target: LOG_TARGET, "Queueing {}", request);
        if self.queue.enqueue(request) {
            self.drain();
        }
        tracing::debug!(target: LOG_TARGET, "Queue length after adding: {}", self.queue.len());
    }

    /// Start queued requests until one is playing or the queue is empty
    pub fn drain(&mut self) {
        while self.queue.is_idle() {
            let Some(request) = self.queue.next_request() else {
                tracing::debug!(target: LOG_TARGET, "Sound queue is empty");
                return;
            };
            self.start_request(request);
        }
    }

    /// Completion from a handle; stale tokens are ignored
    pub fn on_playback_event(&mut self, event: PlaybackEvent) {
        let Some(finished) = self.queue.finish(event.token()) else {
            tracing::debug!(target: LOG_TARGET, "Ignoring stale playback event {:?}", event);
            return;
        };

        match event {
            PlaybackEvent::Ended(_) => {
                tracing::debug!(target: LOG_TARGET, "Finished {}", finished.request);
            }
            PlaybackEvent::Failed { reason, .. } => {
                tracing::error!(
                    target: LOG_TARGET,
                    "Audio playback error for {}: {}",
                    finished.request,
                    reason
                );
            }
        }

        self.drain();
    }

    /// A user interaction reached an attached unlock listener.
    /// Returns false when no unlock listener was attached for `kind`.
    pub fn on_user_interaction(&mut self, kind: InteractionKind) -> bool {
        if !self.listeners.remove(kind, UNLOCK_HANDLER) {
            return false;
        }

        tracing::debug!(target: LOG_TARGET, "User interaction ({}), unlocking audio", kind);
        if self.try_unlock() {
            self.drain();
        }
        true
    }

    /// The user closed the interaction prompt
    pub fn on_prompt_closed(&mut self) {
        self.hide_prompt();
    }

    /// Trim the blob registry; returns the number released
    pub fn sweep_blobs(&mut self) -> usize {
        self.blobs.sweep()
    }

    /// Stop everything and release every resource
    pub fn teardown(&mut self) {
        self.pool.release_all();
        let dropped = self.queue.clear();
        let revoked = self.blobs.revoke_all();
        self.hide_prompt();
        self.listeners.clear();

        tracing::info!(
            target: LOG_TARGET,
            "Sound FX torn down ({} queued dropped, {} blobs revoked)",
            dropped,
            revoked
        );
    }

    /// Requests waiting behind the in-flight one
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn in_flight(&self) -> Option<&InFlight> {
        self.queue.in_flight()
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_idle() && self.queue.is_empty()
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    pub fn prompt_visible(&self) -> bool {
        self.prompt_shown
    }

    pub fn pending_blobs(&self) -> usize {
        self.blobs.pending().len()
    }

    /// Pool slot the next request binds to
    pub fn pool_cursor(&self) -> usize {
        self.pool.cursor()
    }

    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    /// Fresh catalog, or `None` when sound effects are off or unconfigured
    fn load_catalog(&self) -> Option<Vec<SoundAsset>> {
        let config = match self.config.get_value() {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(target: LOG_TARGET, "Failed to read sound configuration: {}", e);
                return None;
            }
        };

        if !config.sound_fx.enabled {
            tracing::debug!(target: LOG_TARGET, "Sound effects disabled");
            return None;
        }
        if config.sound_fx.sounds.is_empty() {
            tracing::info!(target: LOG_TARGET, "No sounds configured");
            return None;
        }
        Some(config.sound_fx.sounds)
    }

    fn start_request(&mut self, request: PlaybackRequest) {
        tracing::info!(target: LOG_TARGET, "Playing {}", request);

        match request.source_kind {
            SourceKind::Url => {
                let source = BoundSource::Url(request.payload.clone());
                let Some((token, handle)) = self.pool.next() else {
                    tracing::error!(target: LOG_TARGET, "No audio handle available");
                    return;
                };

                match handle.start(&source, token, self.completion.clone()) {
                    Ok(()) => self.queue.begin(token, request, None),
                    Err(e) => {
                        tracing::error!(target: LOG_TARGET, "Error playing URL sound {}: {}", request, e);
                        self.report_rejection(&e);

                        if let Some(payload) = request.embedded_fallback.clone() {
                            tracing::info!(target: LOG_TARGET, "Falling back to embedded data after URL failure");
                            self.start_embedded(request, &payload);
                        }
                    }
                }
            }
            SourceKind::EmbeddedPayload => {
                let payload = request.payload.clone();
                self.start_embedded(request, &payload);
            }
        }
    }

    fn start_embedded(&mut self, request: PlaybackRequest, payload: &str) {
        let (url, blob) = match self.blobs.materialize(payload) {
            Ok(materialized) => materialized,
            Err(e) => {
                tracing::error!(target: LOG_TARGET, "Failed to create audio blob for {}: {}", request, e);
                return;
            }
        };

        let Some((token, handle)) = self.pool.next() else {
            tracing::error!(target: LOG_TARGET, "No audio handle available for embedded sound");
            self.blobs.revoke(&url);
            return;
        };

        let source = BoundSource::Blob {
            url: url.clone(),
            blob,
        };
        match handle.start(&source, token, self.completion.clone()) {
            Ok(()) => self.queue.begin(token, request, Some(url)),
            Err(e) => {
                tracing::error!(target: LOG_TARGET, "Embedded sound playback failed for {}: {}", request, e);
                self.blobs.revoke(&url);
                self.report_rejection(&e);
            }
        }
    }

    /// Gesture rejections bring up the prompt and retry the unlock
    fn report_rejection(&mut self, error: &PlaybackError) {
        let reason = error.reason();
        let Some(platform) = self.gesture_policy.gesture_rejection(&reason) else {
            return;
        };

        tracing::warn!(target: LOG_TARGET, "Playback blocked until user interaction ({})", platform);
        self.show_prompt();
        self.try_unlock();
        if !self.unlocked {
            self.arm_unlock_listeners();
        }
    }

    fn try_unlock(&mut self) -> bool {
        if self.unlocked {
            return true;
        }

        tracing::info!(target: LOG_TARGET, "Attempting to unlock audio");
        match self.backend.unlock() {
            Ok(()) => {
                tracing::info!(target: LOG_TARGET, "Audio unlocked successfully");
                self.unlocked = true;
                self.hide_prompt();
                self.disarm_unlock_listeners();
                true
            }
            Err(e) => {
                tracing::error!(target: LOG_TARGET, "Failed to unlock audio: {}", e);
                false
            }
        }
    }

    fn arm_unlock_listeners(&mut self) {
        for kind in InteractionKind::ALL {
            if self.listeners.register(kind, UNLOCK_HANDLER) {
                tracing::debug!(target: LOG_TARGET, "Listening for {} to unlock audio", kind);
            }
        }
    }

    fn disarm_unlock_listeners(&mut self) {
        for kind in InteractionKind::ALL {
            self.listeners.remove(kind, UNLOCK_HANDLER);
        }
    }

    fn show_prompt(&mut self) {
        if !self.prompt_shown {
            self.prompt_shown = true;
            self.notifier.show_interaction_prompt();
        }
    }

    fn hide_prompt(&mut self) {
        if self.prompt_shown {
            self.prompt_shown = false;
            self.notifier.hide_interaction_prompt();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, MemoryConfigStore, SoundFxConfig};
    use crate::game::{MatchState, Player, Throw, Turn};
    use crate::playback::PlaybackToken;
    use crossbeam_channel::unbounded;
    use parking_lot::Mutex;
    use rand::SeedableRng;

    const CHROME_REJECTION: &str =
        "NotAllowedError: play() failed because the user didn't interact with the document first.";

    #[derive(Default)]
    struct Script {
        binds: Vec<(usize, String)>,
        pauses: usize,
        releases: usize,
        unlock_attempts: usize,
        unlock_ok: bool,
        /// Location prefix -> rejection reason
        failures: Vec<(String, String)>,
    }

    #[derive(Clone, Default)]
    struct MockBackend {
        script: Arc<Mutex<Script>>,
    }

    struct MockHandle {
        script: Arc<Mutex<Script>>,
    }

    impl AudioHandle for MockHandle {
        fn pause(&mut self) {
            self.script.lock().pauses += 1;
        }

        fn start(
            &mut self,
            source: &BoundSource,
            token: PlaybackToken,
            _completion: CompletionSender,
        ) -> Result<(), PlaybackError> {
            let mut script = self.script.lock();
            let location = source.location().to_string();
            script.binds.push((token.slot, location.clone()));

            let failure = script
                .failures
                .iter()
                .find(|(prefix, _)| location.starts_with(prefix.as_str()))
                .map(|(_, reason)| reason.clone());
            match failure {
                Some(reason) => Err(PlaybackError::Rejected { reason }),
                None => Ok(()),
            }
        }

        fn release(&mut self) {
            self.script.lock().releases += 1;
        }
    }

    impl AudioBackend for MockBackend {
        type Handle = MockHandle;

        fn create_handle(&mut self) -> Result<MockHandle, PlaybackError> {
            Ok(MockHandle {
                script: Arc::clone(&self.script),
            })
        }

        fn unlock(&mut self) -> Result<(), PlaybackError> {
            let mut script = self.script.lock();
            script.unlock_attempts += 1;
            if script.unlock_ok {
                Ok(())
            } else {
                Err(PlaybackError::Rejected {
                    reason: CHROME_REJECTION.to_string(),
                })
            }
        }
    }

    #[derive(Clone, Default)]
    struct RecordingNotifier {
        events: Arc<Mutex<Vec<&'static str>>>,
    }

    impl InteractionNotifier for RecordingNotifier {
        fn show_interaction_prompt(&mut self) {
            self.events.lock().push("show");
        }

        fn hide_interaction_prompt(&mut self) {
            self.events.lock().push("hide");
        }
    }

    struct Fixture {
        engine: SoundFx<MockBackend, StdRng>,
        script: Arc<Mutex<Script>>,
        prompts: Arc<Mutex<Vec<&'static str>>>,
    }

    fn fixture_with_config(config: Config) -> Fixture {
        let backend = MockBackend::default();
        let script = Arc::clone(&backend.script);
        let notifier = RecordingNotifier::default();
        let prompts = Arc::clone(&notifier.events);
        let (tx, _rx) = unbounded();

        let engine = SoundFx::new(
            backend,
            Arc::new(MemoryConfigStore::new(config)),
            Box::new(notifier),
            StdRng::seed_from_u64(7),
            CompletionSender::new(tx),
            SoundFxOptions::default(),
        )
        .unwrap();

        Fixture {
            engine,
            script,
            prompts,
        }
    }

    fn fixture(sounds: Vec<SoundAsset>) -> Fixture {
        fixture_with_config(Config {
            sound_fx: SoundFxConfig {
                enabled: true,
                sounds,
            },
            ..Config::default()
        })
    }

    fn url_sound(name: &str, trigger: &str) -> SoundAsset {
        SoundAsset::with_url(name, &[trigger], format!("https://sounds.test/{name}.mp3"))
    }

    fn finish_current(engine: &mut SoundFx<MockBackend, StdRng>) {
        let token = engine.in_flight().unwrap().token;
        engine.on_playback_event(PlaybackEvent::Ended(token));
    }

    fn bound(script: &Arc<Mutex<Script>>) -> Vec<(usize, String)> {
        script.lock().binds.clone()
    }

    #[test]
    fn test_one_request_in_flight() {
        let mut f = fixture(vec![url_sound("a", "a"), url_sound("b", "b")]);

        assert_eq!(f.engine.play_trigger("a"), 1);
        assert_eq!(f.engine.play_trigger("b"), 1);

        assert_eq!(bound(&f.script).len(), 1);
        assert_eq!(f.engine.queue_len(), 1);
        assert_eq!(f.engine.in_flight().unwrap().request.display_name, "a");
    }

    #[test]
    fn test_fifo_round_robin() {
        let names = ["a", "b", "c", "d", "e"];
        let mut f = fixture(names.iter().map(|n| url_sound(n, n)).collect());

        for name in names {
            f.engine.play_trigger(name);
        }
        for _ in names {
            finish_current(&mut f.engine);
        }

        let binds = bound(&f.script);
        let slots: Vec<usize> = binds.iter().map(|(slot, _)| *slot).collect();
        assert_eq!(slots, vec![0, 1, 2, 0, 1]);
        let played: Vec<&str> = binds.iter().map(|(_, location)| location.as_str()).collect();
        assert_eq!(
            played,
            names
                .iter()
                .map(|n| format!("https://sounds.test/{n}.mp3"))
                .collect::<Vec<_>>()
        );
        assert!(f.engine.is_idle());
    }

    #[test]
    fn test_handle_paused_before_rebind() {
        let mut f = fixture(vec![url_sound("a", "a")]);
        f.engine.play_trigger("a");
        assert_eq!(f.script.lock().pauses, 1);
    }

    #[test]
    fn test_stale_event_ignored() {
        let mut f = fixture(vec![url_sound("a", "a"), url_sound("b", "b")]);
        f.engine.play_trigger("a");
        f.engine.play_trigger("b");

        let current = f.engine.in_flight().unwrap().token;
        let stale = PlaybackToken {
            slot: current.slot,
            generation: current.generation + 10,
        };
        f.engine.on_playback_event(PlaybackEvent::Ended(stale));

        assert_eq!(f.engine.in_flight().unwrap().token, current);
        assert_eq!(f.engine.queue_len(), 1);
    }

    #[test]
    fn test_async_failure_advances_queue() {
        let mut f = fixture(vec![url_sound("a", "a"), url_sound("b", "b")]);
        f.engine.play_trigger("a");
        f.engine.play_trigger("b");

        let token = f.engine.in_flight().unwrap().token;
        f.engine.on_playback_event(PlaybackEvent::Failed {
            token,
            reason: "MEDIA_ERR_DECODE".to_string(),
        });

        assert_eq!(f.engine.in_flight().unwrap().request.display_name, "b");
    }

    #[test]
    fn test_double_enqueues_word_then_number() {
        let mut f = fixture(vec![url_sound("twenty", "20"), url_sound("double", "ambient_double")]);

        assert_eq!(f.engine.play_trigger("ambient_d20"), 2);
        finish_current(&mut f.engine);

        let binds = bound(&f.script);
        assert_eq!(binds[0].1, "https://sounds.test/double.mp3");
        assert_eq!(binds[1].1, "https://sounds.test/twenty.mp3");
    }

    #[test]
    fn test_invalid_asset_skipped() {
        let invalid = SoundAsset {
            name: "broken".to_string(),
            triggers: vec!["ambient_bull".to_string()],
            enabled: true,
            url: None,
            base64: None,
        };
        let mut f = fixture(vec![invalid]);

        assert_eq!(f.engine.play_trigger("ambient_bull"), 0);
        assert!(bound(&f.script).is_empty());
    }

    #[test]
    fn test_disabled_sound_fx_plays_nothing() {
        let mut f = fixture_with_config(Config {
            sound_fx: SoundFxConfig {
                enabled: false,
                sounds: vec![url_sound("a", "a")],
            },
            ..Config::default()
        });

        assert_eq!(f.engine.play_trigger("a"), 0);
        assert!(f.engine.is_idle());
    }

    #[test]
    fn test_url_failure_falls_back_to_embedded() {
        let mut asset = url_sound("both", "ambient_bull");
        asset.base64 = Some("SUQz".to_string());
        let mut f = fixture(vec![asset]);
        f.script
            .lock()
            .failures
            .push(("https://".to_string(), "NetworkError".to_string()));

        f.engine.play_trigger("ambient_bull");

        let binds = bound(&f.script);
        assert_eq!(binds.len(), 2);
        assert_eq!((binds[0].0, binds[1].0), (0, 1));
        assert!(binds[1].1.starts_with("blob:"));
        assert!(f.engine.in_flight().unwrap().blob.is_some());
        assert_eq!(f.engine.pending_blobs(), 1);
        assert!(!f.engine.prompt_visible());
    }

    #[test]
    fn test_decode_failure_abandons_request() {
        let broken = SoundAsset::with_payload("broken", &["a"], "data:audio/mpeg;base64");
        let mut f = fixture(vec![broken, url_sound("b", "b")]);

        assert_eq!(f.engine.play_trigger("a"), 1);
        assert!(f.engine.is_idle());

        f.engine.play_trigger("b");
        let binds = bound(&f.script);
        assert_eq!(binds, vec![(0, "https://sounds.test/b.mp3".to_string())]);
    }

    #[test]
    fn test_failed_embedded_start_revokes_blob() {
        let mut f = fixture(vec![SoundAsset::with_payload("beep", &["a"], "SUQz")]);
        f.script
            .lock()
            .failures
            .push(("blob:".to_string(), "NotSupportedError".to_string()));

        f.engine.play_trigger("a");

        assert_eq!(bound(&f.script).len(), 1);
        assert_eq!(f.engine.pending_blobs(), 0);
        assert!(f.engine.is_idle());
        assert!(!f.engine.prompt_visible());
    }

    #[test]
    fn test_gesture_rejection_prompts_once() {
        let mut f = fixture(vec![url_sound("a", "a"), url_sound("b", "b")]);
        f.script
            .lock()
            .failures
            .push(("https://".to_string(), CHROME_REJECTION.to_string()));

        f.engine.play_trigger("a");
        f.engine.play_trigger("b");

        assert!(f.engine.prompt_visible());
        assert_eq!(*f.prompts.lock(), vec!["show"]);
        assert_eq!(f.script.lock().unlock_attempts, 2);
        assert!(!f.engine.is_unlocked());
        assert!(f.engine.is_idle());
        for kind in InteractionKind::ALL {
            assert!(f.engine.listeners().is_registered(kind, UNLOCK_HANDLER));
        }
    }

    #[test]
    fn test_user_interaction_unlocks() {
        let mut f = fixture(vec![url_sound("a", "a")]);
        f.script
            .lock()
            .failures
            .push(("https://".to_string(), CHROME_REJECTION.to_string()));
        f.engine.play_trigger("a");
        assert!(f.engine.prompt_visible());

        {
            let mut script = f.script.lock();
            script.unlock_ok = true;
            script.failures.clear();
        }

        assert!(f.engine.on_user_interaction(InteractionKind::Click));
        assert!(f.engine.is_unlocked());
        assert!(!f.engine.prompt_visible());
        assert_eq!(*f.prompts.lock(), vec!["show", "hide"]);

        // Every unlock listener is gone once audio is unlocked
        assert!(!f.engine.on_user_interaction(InteractionKind::KeyDown));
        assert_eq!(f.engine.listeners().count(InteractionKind::TouchStart), 0);
    }

    #[test]
    fn test_failed_unlock_keeps_other_listeners() {
        let mut f = fixture(vec![url_sound("a", "a")]);

        assert!(f.engine.on_user_interaction(InteractionKind::TouchStart));
        assert!(!f.engine.is_unlocked());

        assert!(!f.engine.on_user_interaction(InteractionKind::TouchStart));
        assert!(f.engine.on_user_interaction(InteractionKind::Click));
    }

    #[test]
    fn test_prompt_closed_by_user() {
        let mut f = fixture(vec![url_sound("a", "a")]);
        f.script
            .lock()
            .failures
            .push(("https://".to_string(), CHROME_REJECTION.to_string()));
        f.engine.play_trigger("a");

        f.engine.on_prompt_closed();
        assert!(!f.engine.prompt_visible());
        assert!(!f.engine.is_unlocked());
    }

    #[test]
    fn test_handle_snapshot_plays_triggers() {
        let mut f = fixture(vec![url_sound("t20", "ambient_t20")]);
        let new = GameData {
            match_state: Some(MatchState {
                activated: None,
                player: 0,
                turns: vec![Turn {
                    throws: vec![Throw::new("T20")],
                    busted: false,
                    points: 60,
                }],
                winner: -1,
                variant: "X01".to_string(),
                game_scores: vec![441],
                players: vec![Player {
                    name: "John".to_string(),
                }],
            }),
        };

        let triggers = f.engine.handle_snapshot(&new, &GameData::default());

        assert_eq!(triggers, vec!["ambient_t20"]);
        assert_eq!(f.engine.in_flight().unwrap().request.display_name, "t20");
    }

    #[test]
    fn test_teardown_releases_everything() {
        let mut f = fixture(vec![
            SoundAsset::with_payload("beep", &["a"], "SUQz"),
            url_sound("b", "b"),
        ]);
        f.engine.play_trigger("a");
        f.engine.play_trigger("b");
        assert_eq!(f.engine.pending_blobs(), 1);

        f.engine.teardown();

        assert!(f.engine.is_idle());
        assert!(f.engine.in_flight().is_none());
        assert_eq!(f.engine.pending_blobs(), 0);
        assert_eq!(f.script.lock().releases, DEFAULT_POOL_SIZE);
        assert_eq!(f.engine.listeners().count(InteractionKind::Click), 0);
    }
}
