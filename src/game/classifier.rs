/// Game-event classifier
///
/// Derives the trigger names to play for a new game-state snapshot.
use super::snapshot::{GameData, MatchState};
use crate::catalog::{SoundCatalog, AMBIENT_PREFIX};
use crate::trigger::catalog_responds_to;

const LOG_TARGET: &str = "darts_sound_fx::classifier";

pub const GAMESHOT_TRIGGER: &str = "ambient_gameshot";
pub const BUSTED_TRIGGER: &str = "ambient_busted";

/// Darts per turn
const DARTS_PER_TURN: usize = 3;

/// Lowercase a player name and replace each whitespace run with `_`
pub fn player_trigger_suffix(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut last_was_whitespace = false;

    for ch in name.chars() {
        if ch.is_whitespace() {
            if !last_was_whitespace {
                result.push('_');
                last_was_whitespace = true;
            }
        } else {
            result.extend(ch.to_lowercase());
            last_was_whitespace = false;
        }
    }

    result
}

/// Trigger names for a snapshot update, in the order they should play.
///
/// Only `new` decides what plays. `catalog` is only consulted to decide
/// whether a player-specific gameshot sound exists.
pub fn classify(new: &GameData, _old: &GameData, catalog: &SoundCatalog) -> Vec<String> {
    let Some(state) = new.match_state.as_ref() else {
        return Vec::new();
    };
    if state.is_editing() {
        tracing::debug!(target: LOG_TARGET, "Edit in progress, skipping snapshot");
        return Vec::new();
    }
    let Some(turn) = state.current_turn() else {
        return Vec::new();
    };
    let Some(current) = turn.last_throw() else {
        tracing::debug!(target: LOG_TARGET, "No completed throw in snapshot");
        return Vec::new();
    };

    let throw_name = current.segment.name.to_lowercase();

    if state.has_winner() {
        return vec![gameshot_trigger(state, catalog)];
    }

    if turn.busted {
        return vec![BUSTED_TRIGGER.to_string()];
    }

    if turn.throws.len() >= DARTS_PER_TURN {
        let combined = turn
            .throws
            .iter()
            .map(|t| t.segment.name.to_lowercase())
            .collect::<Vec<_>>()
            .join("_");

        return vec![
            format!("{AMBIENT_PREFIX}{throw_name}"),
            format!("{AMBIENT_PREFIX}{}", turn.points),
            format!("{AMBIENT_PREFIX}{combined}"),
        ];
    }

    vec![format!("{AMBIENT_PREFIX}{throw_name}")]
}

/// Player-specific gameshot when the catalog has one, generic otherwise
fn gameshot_trigger(state: &MatchState, catalog: &SoundCatalog) -> String {
    let Some(name) = state.winner_name() else {
        return GAMESHOT_TRIGGER.to_string();
    };

    let specific = format!("{GAMESHOT_TRIGGER}_{}", player_trigger_suffix(name));
    tracing::debug!(target: LOG_TARGET, "Trying player-specific gameshot sound \"{}\"", specific);

    if catalog_responds_to(catalog, &specific) {
        specific
    } else {
        tracing::info!(
            target: LOG_TARGET,
            "No player-specific gameshot sound found for \"{}\", falling back to standard gameshot",
            name
        );
        GAMESHOT_TRIGGER.to_string()
    }
}
