use serde::{Deserialize, Serialize};

use super::alignment::Alignment;
use super::scene::SceneId;
use crate::core::rules::GameRules;

/// Everything that persists about one player's run.
///
/// The session is a single owned record: engines take it by value and hand
/// back the updated copy, so nothing else holds a reference to it between
/// calls. Field names follow the save snapshot format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSession {
    pub player_name: String,
    pub hp: u32,
    pub max_hp: u32,
    pub level: u32,
    pub gold: u32,
    pub alignment: Alignment,
    pub inventory: Vec<String>,
    pub choice_history: Vec<String>,
    pub current_scene_id: SceneId,
}

impl GameSession {
    /// A fresh session at full health, level 1, holding `items`.
    pub fn new(
        player_name: impl Into<String>,
        max_hp: u32,
        items: &[String],
        start: SceneId,
    ) -> Self {
        Self {
            player_name: player_name.into(),
            hp: max_hp,
            max_hp,
            level: 1,
            gold: 0,
            alignment: Alignment::Neutral,
            inventory: items.to_vec(),
            choice_history: Vec::new(),
            current_scene_id: start,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    pub fn has_item(&self, item: &str) -> bool {
        self.inventory.iter().any(|i| i == item)
    }

    /// Remove the first copy of `item`. Returns false if none was held.
    pub fn remove_item(&mut self, item: &str) -> bool {
        match self.inventory.iter().position(|i| i == item) {
            Some(index) => {
                self.inventory.remove(index);
                true
            }
            None => false,
        }
    }

    /// Restore up to `amount` hp without exceeding `max_hp`.
    /// Returns the hp actually restored.
    pub fn restore_hp(&mut self, amount: u32) -> u32 {
        let restored = amount.min(self.max_hp.saturating_sub(self.hp));
        self.hp += restored;
        restored
    }

    /// Subtract `amount` hp, floored at zero. Returns the hp actually lost.
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        let lost = amount.min(self.hp);
        self.hp -= lost;
        lost
    }
}

impl Default for GameSession {
    fn default() -> Self {
        GameRules::default().new_session()
    }
}
