use serde::{Deserialize, Serialize};
use std::fmt;

use super::alignment::Alignment;

/// Newtype wrapper for scene IDs.
///
/// `SceneId::EXIT` (-1) is not a node: a choice pointing there leaves the
/// dialogue graph entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SceneId(pub i32);

impl SceneId {
    /// The dialogue-exit sentinel.
    pub const EXIT: SceneId = SceneId(-1);

    pub fn is_exit(&self) -> bool {
        *self == Self::EXIT
    }
}

impl fmt::Display for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Explicit transition for an exit choice.
///
/// When absent, the choice text is compared against the battle trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitAction {
    StartBattle,
    ReturnToMenu,
}

/// One outgoing edge of a scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub text: String,
    pub next: SceneId,
    pub alignment: Alignment,
    #[serde(default)]
    pub action: Option<ExitAction>,
}

impl Choice {
    pub fn new(text: impl Into<String>, next: SceneId, alignment: Alignment) -> Self {
        Self {
            text: text.into(),
            next,
            alignment,
            action: None,
        }
    }

    pub fn with_action(mut self, action: ExitAction) -> Self {
        self.action = Some(action);
        self
    }

    pub fn is_exit(&self) -> bool {
        self.next.is_exit()
    }
}

/// A single dialogue node: who speaks, what they say, and where the
/// player can go from here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneNode {
    pub id: SceneId,
    pub speaker: String,
    pub text: String,
    pub choices: Vec<Choice>,
}

impl SceneNode {
    /// Returns true if `choice` is one of this node's outgoing choices.
    pub fn offers(&self, choice: &Choice) -> bool {
        self.choices.iter().any(|c| c == choice)
    }
}
