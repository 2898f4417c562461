use serde::{Deserialize, Serialize};
use std::fmt;

/// The player's moral stance, as declared by their most recent choice.
///
/// Alignment is never accumulated: every choice overwrites it, so a player
/// can change their mind at any point in the story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Pacifist,
    #[default]
    Neutral,
    Genocide,
}

impl Alignment {
    /// Human-readable label for status lines.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pacifist => "Pacifist",
            Self::Neutral => "Neutral",
            Self::Genocide => "Genocide",
        }
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
