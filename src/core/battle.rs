//! Battle engine: one encounter against a single enemy.
//!
//! A turn has two phases. The player acts (`attack` or `heal`), which moves
//! the battle to `EnemyTurn`; some time later the host calls `enemy_turn` to
//! resolve the riposte. The engine never waits on its own, so the delay
//! between the phases belongs entirely to the caller.
//!
//! Every action is a silent no-op when it is not allowed: outside its phase,
//! after a terminal outcome, or with nobody left standing.

use rand::Rng;
use tracing::debug;

use crate::core::rules::GameRules;
use crate::schema::session::GameSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BattlePhase {
    PlayerTurn,
    EnemyTurn,
    Victory,
    Defeat,
}

impl BattlePhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Victory | Self::Defeat)
    }
}

/// State of the encounter in progress. Discarded when the battle ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BattleState {
    pub enemy_hp: u32,
    pub enemy_max_hp: u32,
    pub phase: BattlePhase,
    pub log: Vec<String>,
}

impl BattleState {
    pub fn new(enemy_max_hp: u32) -> Self {
        Self {
            enemy_hp: enemy_max_hp,
            enemy_max_hp,
            phase: BattlePhase::PlayerTurn,
            log: vec!["A monster appeared!".to_string()],
        }
    }

    pub fn is_player_turn(&self) -> bool {
        self.phase == BattlePhase::PlayerTurn
    }

    pub fn is_over(&self) -> bool {
        self.phase.is_terminal()
    }

    /// The last `window` log lines, oldest first.
    pub fn recent_log(&self, window: usize) -> &[String] {
        let start = self.log.len().saturating_sub(window);
        &self.log[start..]
    }
}

pub struct BattleEngine<'r> {
    rules: &'r GameRules,
}

impl<'r> BattleEngine<'r> {
    pub fn new(rules: &'r GameRules) -> Self {
        Self { rules }
    }

    /// A fresh encounter, player to move.
    pub fn start(&self) -> BattleState {
        BattleState::new(self.rules.enemy_max_hp)
    }

    fn player_may_act(session: &GameSession, battle: &BattleState) -> bool {
        battle.is_player_turn() && session.is_alive() && battle.enemy_hp > 0
    }

    /// Strike the enemy. A killing blow ends the battle before the enemy can
    /// answer. Returns the phase the battle is left in, or `None` if the
    /// action was not allowed.
    pub fn attack<R: Rng + ?Sized>(
        &self,
        session: &mut GameSession,
        battle: &mut BattleState,
        rng: &mut R,
    ) -> Option<BattlePhase> {
        if !Self::player_may_act(session, battle) {
            return None;
        }

        let damage = self.rules.player_damage.roll(rng);
        battle.enemy_hp = battle.enemy_hp.saturating_sub(damage);
        battle.log.push(format!("You dealt {} damage!", damage));
        debug!(damage, enemy_hp = battle.enemy_hp, "player attacked");

        if battle.enemy_hp == 0 {
            battle.log.push("Victory! The enemy is defeated!".to_string());
            session.gold = session.gold.saturating_add(self.rules.victory_gold);
            session.level = session.level.saturating_add(self.rules.victory_levels);
            battle.phase = BattlePhase::Victory;
        } else {
            battle.phase = BattlePhase::EnemyTurn;
        }
        Some(battle.phase)
    }

    /// Use one healing item. The enemy still gets its turn afterwards.
    pub fn heal(&self, session: &mut GameSession, battle: &mut BattleState) -> Option<BattlePhase> {
        if !Self::player_may_act(session, battle) || !session.remove_item(&self.rules.healing_item)
        {
            return None;
        }

        let restored = session.restore_hp(self.rules.heal_amount);
        battle.log.push(format!("You restored {} HP!", restored));
        debug!(restored, hp = session.hp, "player healed");

        battle.phase = BattlePhase::EnemyTurn;
        Some(battle.phase)
    }

    /// Resolve the enemy's riposte.
    pub fn enemy_turn<R: Rng + ?Sized>(
        &self,
        session: &mut GameSession,
        battle: &mut BattleState,
        rng: &mut R,
    ) -> Option<BattlePhase> {
        if battle.phase != BattlePhase::EnemyTurn {
            return None;
        }

        let damage = self.rules.enemy_damage.roll(rng);
        session.take_damage(damage);
        battle.log.push(format!("The enemy dealt {} damage!", damage));
        debug!(damage, hp = session.hp, "enemy struck back");

        if session.hp == 0 {
            battle.log.push("Defeat... Game over.".to_string());
            battle.phase = BattlePhase::Defeat;
        } else {
            battle.phase = BattlePhase::PlayerTurn;
        }
        Some(battle.phase)
    }
}
