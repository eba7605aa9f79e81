/// Sound FX service
///
/// Runs the engine on its own thread. Callers and the game-state store
/// talk to it through a command channel; handles report completion on a
/// second channel. The loop wakes for whichever comes first: a message,
/// the debounce deadline, or the next blob sweep.
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, select, unbounded, Receiver, Sender};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::ConfigStore;
use crate::engine::{SoundFx, SoundFxOptions};
use crate::error::{PlaybackError, ServiceError};
use crate::game::{GameData, GameStateStore, Subscription};
use crate::interaction::InteractionKind;
use crate::notify::InteractionNotifier;
use crate::playback::{AudioBackend, CompletionSender, PlaybackEvent};
use crate::utils::Debouncer;

const LOG_TARGET: &str = "darts_sound_fx::service";

/// How often `wait_idle` polls the worker
const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Messages handled by the worker thread
enum Command {
    Snapshot { new: GameData, old: GameData },
    Trigger(String),
    Interaction(InteractionKind),
    PromptClosed,
    Status(Sender<ServiceStatus>),
    Stop,
}

/// Point-in-time view of the worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceStatus {
    /// Requests waiting behind the playing one
    pub queued: usize,
    pub playing: bool,
    pub unlocked: bool,
    pub prompt_visible: bool,
    pub pending_blobs: usize,
    /// A game-state update is waiting out the debounce period
    pub snapshot_pending: bool,
}

impl ServiceStatus {
    pub fn is_idle(&self) -> bool {
        self.queued == 0 && !self.playing && !self.snapshot_pending
    }
}

pub struct SoundFxService {
    commands: Sender<Command>,
    worker: Option<JoinHandle<()>>,
    subscription: Option<Subscription>,
}

impl SoundFxService {
    /// Start the worker and subscribe to game-state updates.
    ///
    /// The backend is created on the worker thread since audio outputs
    /// usually cannot move between threads.
    pub fn start<B, F>(
        config: Arc<dyn ConfigStore>,
        game: &dyn GameStateStore,
        notifier: Box<dyn InteractionNotifier>,
        options: SoundFxOptions,
        make_backend: F,
    ) -> Result<Self, ServiceError>
    where
        B: AudioBackend + 'static,
        F: FnOnce() -> Result<B, PlaybackError> + Send + 'static,
    {
        let (command_tx, command_rx) = unbounded();
        let (ready_tx, ready_rx) = bounded::<Result<(), PlaybackError>>(1);

        let worker = thread::Builder::new()
            .name("sound-fx".to_string())
            .spawn(move || {
                tracing::info!(target: LOG_TARGET, "Sound FX thread started");

                let (event_tx, event_rx) = unbounded();
                let engine = make_backend().and_then(|backend| {
                    SoundFx::new(
                        backend,
                        config,
                        notifier,
                        StdRng::from_entropy(),
                        CompletionSender::new(event_tx),
                        options.clone(),
                    )
                });

                match engine {
                    Ok(engine) => {
                        let _ = ready_tx.send(Ok(()));
                        run(engine, command_rx, event_rx, &options);
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                    }
                }

                tracing::info!(target: LOG_TARGET, "Sound FX thread stopped");
            })
            .map_err(ServiceError::ThreadSpawnFailed)?;

        match ready_rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                let _ = worker.join();
                return Err(ServiceError::BackendInit(e));
            }
            Err(_) => {
                let _ = worker.join();
                return Err(ServiceError::WorkerExited);
            }
        }

        let tx = command_tx.clone();
        let subscription = game.watch(Box::new(move |new: &GameData, old: &GameData| {
            tracing::debug!(target: LOG_TARGET, "Game data updated");
            let _ = tx.send(Command::Snapshot {
                new: new.clone(),
                old: old.clone(),
            });
        }));

        Ok(Self {
            commands: command_tx,
            worker: Some(worker),
            subscription: Some(subscription),
        })
    }

    /// Resolve and play a trigger right away, bypassing the classifier
    pub fn play_trigger(&self, trigger: impl Into<String>) -> Result<(), ServiceError> {
        self.send(Command::Trigger(trigger.into()))
    }

    /// Forward a user interaction (click, tap, key press)
    pub fn user_interaction(&self, kind: InteractionKind) -> Result<(), ServiceError> {
        self.send(Command::Interaction(kind))
    }

    /// The user dismissed the interaction prompt
    pub fn close_prompt(&self) -> Result<(), ServiceError> {
        self.send(Command::PromptClosed)
    }

    pub fn status(&self) -> Result<ServiceStatus, ServiceError> {
        let (reply_tx, reply_rx) = bounded(1);
        self.send(Command::Status(reply_tx))?;
        reply_rx.recv().map_err(|_| ServiceError::WorkerExited)
    }

    /// Block until nothing is queued, playing or waiting for the debounce.
    /// Returns false on timeout.
    pub fn wait_idle(&self, timeout: Duration) -> Result<bool, ServiceError> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.status()?.is_idle() {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            thread::sleep(IDLE_POLL_INTERVAL);
        }
    }

    /// Detach from the game-state store, stop the worker and release
    /// everything it holds. Queued requests are dropped.
    pub fn stop(&mut self) -> Result<(), ServiceError> {
        let worker = self.worker.take().ok_or(ServiceError::AlreadyStopped)?;

        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }

        let _ = self.commands.send(Command::Stop);
        if worker.join().is_err() {
            tracing::error!(target: LOG_TARGET, "Sound FX thread panicked");
            return Err(ServiceError::WorkerExited);
        }
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    fn send(&self, command: Command) -> Result<(), ServiceError> {
        if self.worker.is_none() {
            return Err(ServiceError::AlreadyStopped);
        }
        self.commands
            .send(command)
            .map_err(|_| ServiceError::WorkerExited)
    }
}

impl Drop for SoundFxService {
    fn drop(&mut self) {
        if self.worker.is_some() {
            let _ = self.stop();
        }
    }
}

fn run<B: AudioBackend>(
    mut engine: SoundFx<B>,
    commands: Receiver<Command>,
    events: Receiver<PlaybackEvent>,
    options: &SoundFxOptions,
) {
    let mut debouncer: Debouncer<(GameData, GameData)> = Debouncer::new(options.debounce);
    let mut next_sweep = Instant::now() + options.sweep_interval;
    let mut running = true;

    while running {
        let wake_at = debouncer
            .deadline()
            .map_or(next_sweep, |deadline| deadline.min(next_sweep));
        let timeout = wake_at.saturating_duration_since(Instant::now());

        select! {
            recv(commands) -> command => match command {
                Ok(Command::Snapshot { new, old }) => debouncer.push((new, old), Instant::now()),
                Ok(Command::Trigger(trigger)) => {
                    engine.play_trigger(&trigger);
                }
                Ok(Command::Interaction(kind)) => {
                    engine.on_user_interaction(kind);
                }
                Ok(Command::PromptClosed) => engine.on_prompt_closed(),
                Ok(Command::Status(reply)) => {
                    let _ = reply.send(ServiceStatus {
                        queued: engine.queue_len(),
                        playing: engine.in_flight().is_some(),
                        unlocked: engine.is_unlocked(),
                        prompt_visible: engine.prompt_visible(),
                        pending_blobs: engine.pending_blobs(),
                        snapshot_pending: debouncer.is_pending(),
                    });
                }
                Ok(Command::Stop) | Err(_) => running = false,
            },
            recv(events) -> event => {
                if let Ok(event) = event {
                    engine.on_playback_event(event);
                }
            },
            default(timeout) => {},
        }

        let now = Instant::now();
        if let Some((new, old)) = debouncer.poll(now) {
            let triggers = engine.handle_snapshot(&new, &old);
            if !triggers.is_empty() {
                tracing::debug!(target: LOG_TARGET, "Snapshot triggers: {:?}", triggers);
            }
        }
        if now >= next_sweep {
            let released = engine.sweep_blobs();
            if released > 0 {
                tracing::debug!(target: LOG_TARGET, "Sweep released {} blobs", released);
            }
            next_sweep = now + options.sweep_interval;
        }
    }

    debouncer.cancel();
    engine.teardown();
}
