/// Interaction prompt
///
/// Surface that asks the user to click, tap or press a key when playback is
/// blocked until a user gesture.

/// Text shown while audio is locked
pub const INTERACTION_PROMPT: &str =
    "Please interact with the page (click, tap, or press a key) to enable audio for sound effects.";

pub trait InteractionNotifier: Send {
    /// Show the prompt (called once until it is hidden again)
    fn show_interaction_prompt(&mut self);

    /// Remove the prompt
    fn hide_interaction_prompt(&mut self);
}

/// Notifier that reports the prompt through the log
#[derive(Debug, Default)]
pub struct LogNotifier;

impl InteractionNotifier for LogNotifier {
    fn show_interaction_prompt(&mut self) {
        tracing::warn!("{}", INTERACTION_PROMPT);
    }

    fn hide_interaction_prompt(&mut self) {
        tracing::info!("Audio unlocked, interaction prompt dismissed");
    }
}
