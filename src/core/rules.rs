//! Game rules: every tunable number and string the engines consult.
//!
//! Rules are authored in RON. Any field left out of the file keeps its
//! built-in default, so a rules file only needs to list what it changes.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::schema::scene::SceneId;
use crate::schema::session::GameSession;

#[derive(Debug, Error)]
pub enum RulesError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("invalid rules: {0}")]
    Invalid(String),
}

/// A closed integer interval `[min, max]` for damage rolls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageRange {
    pub min: u32,
    pub max: u32,
}

impl DamageRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Uniform draw over the closed interval.
    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        rng.gen_range(self.min..=self.max)
    }

    pub fn contains(&self, value: u32) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameRules {
    pub player_name: String,
    pub starting_hp: u32,
    pub starting_items: Vec<String>,
    pub enemy_max_hp: u32,
    pub player_damage: DamageRange,
    pub enemy_damage: DamageRange,
    pub heal_amount: u32,
    pub healing_item: String,
    pub victory_gold: u32,
    pub victory_levels: u32,
    pub pacifist_exit_gold: u32,
    /// Exit choices whose text equals this enter battle.
    pub battle_trigger: String,
    pub riposte_delay_ms: u64,
    pub teardown_delay_ms: u64,
    /// How many trailing battle log lines the presentation layer sees.
    pub log_window: usize,
    pub save_key: String,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            player_name: "Hero".to_string(),
            starting_hp: 20,
            starting_items: vec!["Stick".to_string(), "Bandage".to_string()],
            enemy_max_hp: 30,
            player_damage: DamageRange::new(5, 9),
            enemy_damage: DamageRange::new(3, 6),
            heal_amount: 10,
            healing_item: "Bandage".to_string(),
            victory_gold: 15,
            victory_levels: 1,
            pacifist_exit_gold: 10,
            battle_trigger: "Start battle".to_string(),
            riposte_delay_ms: 1000,
            teardown_delay_ms: 2000,
            log_window: 5,
            save_key: "rpg-save".to_string(),
        }
    }
}

impl GameRules {
    /// Load rules from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<GameRules, RulesError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse rules from a RON string and validate them.
    pub fn parse_ron(input: &str) -> Result<GameRules, RulesError> {
        let rules: GameRules = ron::from_str(input)?;
        rules.validate()?;
        Ok(rules)
    }

    pub fn validate(&self) -> Result<(), RulesError> {
        for (name, range) in [
            ("player_damage", self.player_damage),
            ("enemy_damage", self.enemy_damage),
        ] {
            if range.min > range.max {
                return Err(RulesError::Invalid(format!(
                    "{} range is inverted: {}..={}",
                    name, range.min, range.max
                )));
            }
        }
        if self.starting_hp == 0 {
            return Err(RulesError::Invalid("starting_hp must be positive".to_string()));
        }
        if self.enemy_max_hp == 0 {
            return Err(RulesError::Invalid("enemy_max_hp must be positive".to_string()));
        }
        if self.healing_item.is_empty() {
            return Err(RulesError::Invalid("healing_item must be named".to_string()));
        }
        Ok(())
    }

    /// A fresh session positioned on scene 0.
    pub fn new_session(&self) -> GameSession {
        self.new_session_at(SceneId(0))
    }

    pub fn new_session_at(&self, start: SceneId) -> GameSession {
        GameSession::new(
            self.player_name.clone(),
            self.starting_hp,
            &self.starting_items,
            start,
        )
    }

    pub fn riposte_delay(&self) -> Duration {
        Duration::from_millis(self.riposte_delay_ms)
    }

    pub fn teardown_delay(&self) -> Duration {
        Duration::from_millis(self.teardown_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn defaults_match_bundled_file() {
        let path = std::path::PathBuf::from("game_data/rules.ron");
        let loaded = GameRules::load_from_ron(&path).unwrap();
        assert_eq!(loaded, GameRules::default());
    }

    #[test]
    fn partial_ron_keeps_defaults() {
        let rules = GameRules::parse_ron("(enemy_max_hp: 50, healing_item: \"Potion\")").unwrap();
        assert_eq!(rules.enemy_max_hp, 50);
        assert_eq!(rules.healing_item, "Potion");
        assert_eq!(rules.player_damage, DamageRange::new(5, 9));
        assert_eq!(rules.battle_trigger, "Start battle");
    }

    #[test]
    fn inverted_range_rejected() {
        let err = GameRules::parse_ron("(enemy_damage: (min: 6, max: 3))").unwrap_err();
        assert!(matches!(err, RulesError::Invalid(_)));
    }

    #[test]
    fn zero_enemy_hp_rejected() {
        assert!(GameRules::parse_ron("(enemy_max_hp: 0)").is_err());
    }

    #[test]
    fn roll_stays_in_range() {
        let range = DamageRange::new(5, 9);
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = [false; 5];
        for _ in 0..500 {
            let d = range.roll(&mut rng);
            assert!(range.contains(d), "rolled {}", d);
            seen[(d - 5) as usize] = true;
        }
        assert!(seen.iter().all(|s| *s), "every value should come up");
    }

    #[test]
    fn degenerate_range_always_rolls_min() {
        let range = DamageRange::new(4, 4);
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..20 {
            assert_eq!(range.roll(&mut rng), 4);
        }
    }

    #[test]
    fn delays() {
        let rules = GameRules::default();
        assert_eq!(rules.riposte_delay(), Duration::from_secs(1));
        assert_eq!(rules.teardown_delay(), Duration::from_secs(2));
    }
}
