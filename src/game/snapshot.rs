/// Game-state snapshot
///
/// Only the parts of the scoring application's match state that sound
/// effects care about. Unknown fields are ignored.
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GameData {
    #[serde(rename = "match", default, skip_serializing_if = "Option::is_none")]
    pub match_state: Option<MatchState>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchState {
    /// Present while a throw is being edited, even when set to `null`
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub activated: Option<serde_json::Value>,

    /// Index of the player currently throwing
    #[serde(default)]
    pub player: usize,

    /// Turns, most recent first
    #[serde(default)]
    pub turns: Vec<Turn>,

    /// Index of the winning player, negative while nobody has won
    #[serde(default = "no_winner")]
    pub winner: i32,

    /// Game variant, e.g. "X01"
    #[serde(default)]
    pub variant: String,

    /// Remaining score per player
    #[serde(default)]
    pub game_scores: Vec<i64>,

    #[serde(default)]
    pub players: Vec<Player>,
}

fn no_winner() -> i32 {
    -1
}

/// `Some` for any value the field carries, `null` included
fn present<'de, D>(deserializer: D) -> Result<Option<serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    serde_json::Value::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Turn {
    #[serde(default)]
    pub throws: Vec<Throw>,
    #[serde(default)]
    pub busted: bool,
    /// Points scored in this turn
    #[serde(default)]
    pub points: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Throw {
    pub segment: Segment,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// Segment label such as "S20", "T19", "D16", "M5", "Bull"
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
}

impl MatchState {
    /// Whether a throw is being edited
    pub fn is_editing(&self) -> bool {
        self.activated.is_some()
    }

    pub fn current_turn(&self) -> Option<&Turn> {
        self.turns.first()
    }

    /// Whether the match is over. X01 matches also count as won as soon as
    /// the current player's score hits zero, before `winner` is set.
    pub fn has_winner(&self) -> bool {
        self.winner >= 0
            || (self.variant == "X01" && self.game_scores.get(self.player) == Some(&0))
    }

    /// Display name of the winning player, when known
    pub fn winner_name(&self) -> Option<&str> {
        let index = usize::try_from(self.winner).ok()?;
        self.players
            .get(index)
            .map(|p| p.name.as_str())
            .filter(|name| !name.is_empty())
    }
}

impl Turn {
    pub fn last_throw(&self) -> Option<&Throw> {
        self.throws.last()
    }
}

impl Throw {
    pub fn new(segment: impl Into<String>) -> Self {
        Self {
            segment: Segment {
                name: segment.into(),
            },
        }
    }
}
