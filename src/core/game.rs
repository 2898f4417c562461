//! The game facade: the only type a presentation layer needs.
//!
//! `Game` owns the session, the current mode, the battle in progress, the
//! RNG and the save store. The UI sends it commands, reads `view()` back,
//! and drives the deferred battle phases through `pending_delay()` and
//! `advance()`.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use crate::core::battle::{BattleEngine, BattlePhase, BattleState};
use crate::core::dialogue::{DialogueEngine, DialogueError, NextAction};
use crate::core::persistence::{
    decode_snapshot, encode_snapshot, LoadError, MemoryStore, SaveError, SaveStore,
};
use crate::core::rules::{GameRules, RulesError};
use crate::core::scene_graph::{SceneGraph, SceneGraphError};
use crate::schema::scene::{SceneId, SceneNode};
use crate::schema::session::GameSession;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("scene graph error: {0}")]
    Scenes(#[from] SceneGraphError),
    #[error("rules error: {0}")]
    Rules(#[from] RulesError),
    #[error("dialogue error: {0}")]
    Dialogue(#[from] DialogueError),
    #[error("save error: {0}")]
    Save(#[from] SaveError),
    #[error("save corrupted: {0}")]
    Load(#[from] LoadError),
    #[error("no save found")]
    NoSaveFound,
    #[error("scene {scene} has no choice {index}")]
    InvalidChoice { scene: SceneId, index: usize },
    #[error("no dialogue is in progress")]
    NotInDialogue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameMode {
    Menu,
    Dialogue,
    Battle,
    Inventory,
}

/// Read-only projection of a battle for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BattleView<'a> {
    pub enemy_hp: u32,
    pub enemy_max_hp: u32,
    pub phase: BattlePhase,
    pub is_player_turn: bool,
    /// Only the trailing window of the log.
    pub log: &'a [String],
}

/// Everything the presentation layer renders for one frame.
#[derive(Debug, Clone, Copy)]
pub struct GameView<'a> {
    pub mode: GameMode,
    pub session: &'a GameSession,
    pub scene: Option<&'a SceneNode>,
    pub battle: Option<BattleView<'a>>,
}

pub struct Game {
    rules: GameRules,
    scenes: SceneGraph,
    session: GameSession,
    mode: GameMode,
    battle: Option<BattleState>,
    store: Box<dyn SaveStore>,
    rng: StdRng,
}

/// Builder for constructing a `Game`.
pub struct GameBuilder {
    rules_path: Option<String>,
    scenes_path: Option<String>,
    seed: Option<u64>,
    autoload: bool,
    /// Directly provided rules (for testing without files).
    rules: Option<GameRules>,
    /// Directly provided scenes (for testing without files).
    scenes: Option<SceneGraph>,
    store: Option<Box<dyn SaveStore>>,
}

impl Game {
    pub fn builder() -> GameBuilder {
        GameBuilder {
            rules_path: None,
            scenes_path: None,
            seed: None,
            autoload: false,
            rules: None,
            scenes: None,
            store: None,
        }
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    pub fn scenes(&self) -> &SceneGraph {
        &self.scenes
    }

    pub fn battle(&self) -> Option<&BattleState> {
        self.battle.as_ref()
    }

    /// The scene on screen, if a dialogue is in progress.
    pub fn current_scene(&self) -> Option<&SceneNode> {
        if self.mode != GameMode::Dialogue {
            return None;
        }
        self.scenes.lookup(self.session.current_scene_id)
    }

    pub fn view(&self) -> GameView<'_> {
        let battle = match (self.mode, &self.battle) {
            (GameMode::Battle, Some(battle)) => Some(BattleView {
                enemy_hp: battle.enemy_hp,
                enemy_max_hp: battle.enemy_max_hp,
                phase: battle.phase,
                is_player_turn: battle.is_player_turn(),
                log: battle.recent_log(self.rules.log_window),
            }),
            _ => None,
        };

        GameView {
            mode: self.mode,
            session: &self.session,
            scene: self.current_scene(),
            battle,
        }
    }

    /// Reset the session and open the first scene.
    pub fn start_new_game(&mut self) {
        self.session = self.rules.new_session_at(self.scenes.start());
        self.battle = None;
        self.mode = GameMode::Dialogue;
        info!(player = %self.session.player_name, "new game started");
    }

    /// Resume the dialogue at the session's scene, or at the start if that
    /// scene no longer exists.
    pub fn continue_game(&mut self) {
        if !self.scenes.contains(self.session.current_scene_id) {
            warn!(
                scene = %self.session.current_scene_id,
                "saved scene is missing; resuming from the start"
            );
            self.session.current_scene_id = self.scenes.start();
        }
        self.battle = None;
        self.mode = GameMode::Dialogue;
    }

    /// Pick choice `index` of the current scene.
    ///
    /// An out-of-range index is rejected before anything changes.
    pub fn select_choice(&mut self, index: usize) -> Result<(), GameError> {
        if self.mode != GameMode::Dialogue {
            return Err(GameError::NotInDialogue);
        }
        let scene_id = self.session.current_scene_id;
        let node = self
            .scenes
            .lookup(scene_id)
            .ok_or(GameError::NotInDialogue)?;
        let choice = node.choices.get(index).ok_or(GameError::InvalidChoice {
            scene: scene_id,
            index,
        })?;

        let engine = DialogueEngine::new(&self.scenes, &self.rules);
        match engine.apply_choice(&mut self.session, node, choice)? {
            NextAction::ContinueDialogue(_) | NextAction::Stay { .. } => {}
            NextAction::EnterBattle => {
                self.battle = Some(BattleEngine::new(&self.rules).start());
                self.mode = GameMode::Battle;
            }
            NextAction::ReturnToMenu => {
                self.mode = GameMode::Menu;
            }
        }
        Ok(())
    }

    pub fn attack(&mut self) -> Option<BattlePhase> {
        if self.mode != GameMode::Battle {
            return None;
        }
        let battle = self.battle.as_mut()?;
        BattleEngine::new(&self.rules).attack(&mut self.session, battle, &mut self.rng)
    }

    pub fn heal(&mut self) -> Option<BattlePhase> {
        if self.mode != GameMode::Battle {
            return None;
        }
        let battle = self.battle.as_mut()?;
        BattleEngine::new(&self.rules).heal(&mut self.session, battle)
    }

    /// Leave the battle at once. No penalty.
    pub fn flee(&mut self) {
        if self.mode == GameMode::Battle {
            info!("player fled");
            self.battle = None;
            self.mode = GameMode::Menu;
        }
    }

    /// Ignored mid-battle; use `flee` to leave a fight.
    pub fn open_inventory(&mut self) {
        if self.mode != GameMode::Battle {
            self.mode = GameMode::Inventory;
        }
    }

    pub fn return_to_menu(&mut self) {
        self.battle = None;
        self.mode = GameMode::Menu;
    }

    /// How long the host should wait before calling `advance`, if there is
    /// anything to advance.
    pub fn pending_delay(&self) -> Option<Duration> {
        let battle = self.battle.as_ref()?;
        match battle.phase {
            BattlePhase::EnemyTurn => Some(self.rules.riposte_delay()),
            BattlePhase::Victory | BattlePhase::Defeat => Some(self.rules.teardown_delay()),
            BattlePhase::PlayerTurn => None,
        }
    }

    /// Apply the next deferred step: the enemy's riposte, or tearing down a
    /// finished battle. Returns false if there was nothing to do.
    pub fn advance(&mut self) -> bool {
        let Some(battle) = self.battle.as_mut() else {
            return false;
        };

        let phase = battle.phase;
        match phase {
            BattlePhase::EnemyTurn => BattleEngine::new(&self.rules)
                .enemy_turn(&mut self.session, battle, &mut self.rng)
                .is_some(),
            BattlePhase::Victory | BattlePhase::Defeat => {
                info!(outcome = ?phase, "battle over");
                self.battle = None;
                self.mode = GameMode::Menu;
                true
            }
            BattlePhase::PlayerTurn => false,
        }
    }

    pub fn save_game(&mut self) -> Result<(), GameError> {
        let snapshot = encode_snapshot(&self.session)?;
        self.store.save(&self.rules.save_key, &snapshot)?;
        info!(key = %self.rules.save_key, "game saved");
        Ok(())
    }

    /// Restore the saved session.
    ///
    /// A missing save leaves everything as it was. A corrupt save resets
    /// the session to a fresh one before the error is returned.
    pub fn load_game(&mut self) -> Result<(), GameError> {
        let snapshot = self
            .store
            .load(&self.rules.save_key)?
            .ok_or(GameError::NoSaveFound)?;

        self.battle = None;
        self.mode = GameMode::Menu;
        match decode_snapshot(&snapshot) {
            Ok(session) => {
                self.session = session;
                info!(key = %self.rules.save_key, "game loaded");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "save corrupted; starting fresh");
                self.session = self.rules.new_session_at(self.scenes.start());
                Err(e.into())
            }
        }
    }
}

impl GameBuilder {
    pub fn rules_path(mut self, path: &str) -> Self {
        self.rules_path = Some(path.to_string());
        self
    }

    pub fn scenes_path(mut self, path: &str) -> Self {
        self.scenes_path = Some(path.to_string());
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Restore the saved session, if any, when the game is built.
    pub fn autoload(mut self, autoload: bool) -> Self {
        self.autoload = autoload;
        self
    }

    /// Provide rules directly (for testing without files).
    pub fn with_rules(mut self, rules: GameRules) -> Self {
        self.rules = Some(rules);
        self
    }

    /// Provide scenes directly (for testing without files).
    pub fn with_scenes(mut self, scenes: SceneGraph) -> Self {
        self.scenes = Some(scenes);
        self
    }

    pub fn with_store(mut self, store: impl SaveStore + 'static) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    pub fn build(self) -> Result<Game, GameError> {
        // Files override directly provided values.
        let rules = match self.rules_path {
            Some(ref path) => GameRules::load_from_ron(Path::new(path))?,
            None => {
                let rules = self.rules.unwrap_or_default();
                rules.validate()?;
                rules
            }
        };

        let scenes = match (self.scenes_path, self.scenes) {
            (Some(ref path), _) => SceneGraph::load_from_ron(Path::new(path))?,
            (None, Some(scenes)) => scenes,
            (None, None) => SceneGraph::builtin()?,
        };

        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let store: Box<dyn SaveStore> = match self.store {
            Some(store) => store,
            None => Box::new(MemoryStore::new()),
        };

        let mut game = Game {
            session: rules.new_session_at(scenes.start()),
            rules,
            scenes,
            mode: GameMode::Menu,
            battle: None,
            store,
            rng,
        };

        if self.autoload {
            match game.load_game() {
                Ok(()) | Err(GameError::NoSaveFound) => {}
                Err(e) => warn!(error = %e, "autoload failed"),
            }
        }

        Ok(game)
    }
}
