//! Dialogue engine: applies a player's choice to the session and decides
//! where the story goes next.

use thiserror::Error;
use tracing::{debug, warn};

use crate::core::rules::GameRules;
use crate::core::scene_graph::SceneGraph;
use crate::schema::alignment::Alignment;
use crate::schema::scene::{Choice, ExitAction, SceneId, SceneNode};
use crate::schema::session::GameSession;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DialogueError {
    #[error("choice '{choice}' is not offered by scene {scene}")]
    InvalidChoice { scene: SceneId, choice: String },
}

/// What the caller should do after a choice has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextAction<'g> {
    /// Show the next scene. The session already points at it.
    ContinueDialogue(&'g SceneNode),
    /// The choice pointed at a scene that does not exist; stay put.
    Stay { unresolved: SceneId },
    EnterBattle,
    ReturnToMenu,
}

pub struct DialogueEngine<'g> {
    scenes: &'g SceneGraph,
    rules: &'g GameRules,
}

impl<'g> DialogueEngine<'g> {
    pub fn new(scenes: &'g SceneGraph, rules: &'g GameRules) -> Self {
        Self { scenes, rules }
    }

    /// Apply `choice`, taken from `current`, to the session.
    ///
    /// The choice text is logged and the alignment is overwritten with the
    /// choice's alignment, whatever came before. Nothing is mutated when
    /// `choice` does not belong to `current`.
    pub fn apply_choice(
        &self,
        session: &mut GameSession,
        current: &SceneNode,
        choice: &Choice,
    ) -> Result<NextAction<'g>, DialogueError> {
        if !current.offers(choice) {
            return Err(DialogueError::InvalidChoice {
                scene: current.id,
                choice: choice.text.clone(),
            });
        }

        session.choice_history.push(choice.text.clone());
        session.alignment = choice.alignment;

        if choice.is_exit() {
            return Ok(self.exit_dialogue(session, choice));
        }

        match self.scenes.lookup(choice.next) {
            Some(next) => {
                debug!(from = %current.id, to = %next.id, "dialogue advanced");
                session.current_scene_id = next.id;
                Ok(NextAction::ContinueDialogue(next))
            }
            None => {
                warn!(
                    scene = %current.id,
                    target = %choice.next,
                    "choice points at a missing scene; staying on the current one"
                );
                session.current_scene_id = current.id;
                Ok(NextAction::Stay {
                    unresolved: choice.next,
                })
            }
        }
    }

    fn exit_dialogue(&self, session: &mut GameSession, choice: &Choice) -> NextAction<'g> {
        if choice.alignment == Alignment::Pacifist {
            session.gold = session.gold.saturating_add(self.rules.pacifist_exit_gold);
        }

        let action = choice.action.unwrap_or(if choice.text == self.rules.battle_trigger {
            ExitAction::StartBattle
        } else {
            ExitAction::ReturnToMenu
        });

        debug!(choice = %choice.text, ?action, "dialogue exited");
        match action {
            ExitAction::StartBattle => NextAction::EnterBattle,
            ExitAction::ReturnToMenu => NextAction::ReturnToMenu,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (SceneGraph, GameRules) {
        (SceneGraph::builtin().unwrap(), GameRules::default())
    }

    #[test]
    fn continue_moves_session_to_next_scene() {
        let (scenes, rules) = setup();
        let engine = DialogueEngine::new(&scenes, &rules);
        let mut session = rules.new_session();
        let start = scenes.start_node().unwrap();

        let next = engine
            .apply_choice(&mut session, start, &start.choices[0])
            .unwrap();

        match next {
            NextAction::ContinueDialogue(node) => assert_eq!(node.id, SceneId(1)),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(session.current_scene_id, SceneId(1));
        assert_eq!(session.alignment, Alignment::Pacifist);
        assert_eq!(session.choice_history, vec!["With kindness and mercy"]);
    }

    #[test]
    fn alignment_is_last_write_wins() {
        let (scenes, rules) = setup();
        let engine = DialogueEngine::new(&scenes, &rules);
        let mut session = rules.new_session();

        // Pacifist, pacifist, then one neutral change of heart.
        let start = scenes.start_node().unwrap();
        engine.apply_choice(&mut session, start, &start.choices[0]).unwrap();
        let one = scenes.lookup(SceneId(1)).unwrap();
        engine.apply_choice(&mut session, one, &one.choices[1]).unwrap();

        assert_eq!(session.alignment, Alignment::Neutral);
        assert_eq!(session.choice_history.len(), 2);
    }

    #[test]
    fn foreign_choice_rejected_without_mutation() {
        let (scenes, rules) = setup();
        let engine = DialogueEngine::new(&scenes, &rules);
        let mut session = rules.new_session();
        let before = session.clone();
        let start = scenes.start_node().unwrap();
        let foreign = Choice::new("Dance", SceneId(2), Alignment::Genocide);

        let err = engine.apply_choice(&mut session, start, &foreign).unwrap_err();
        assert_eq!(
            err,
            DialogueError::InvalidChoice {
                scene: SceneId(0),
                choice: "Dance".to_string(),
            }
        );
        assert_eq!(session, before);
    }

    #[test]
    fn pacifist_exit_awards_gold_and_returns_to_menu() {
        let (scenes, rules) = setup();
        let engine = DialogueEngine::new(&scenes, &rules);
        let mut session = rules.new_session();
        let seven = scenes.lookup(SceneId(7)).unwrap();

        let next = engine.apply_choice(&mut session, seven, &seven.choices[0]).unwrap();
        assert_eq!(next, NextAction::ReturnToMenu);
        assert_eq!(session.gold, 10);
    }

    #[test]
    fn trigger_text_enters_battle() {
        let (scenes, rules) = setup();
        let engine = DialogueEngine::new(&scenes, &rules);
        let mut session = rules.new_session();
        let eight = scenes.lookup(SceneId(8)).unwrap();

        let next = engine.apply_choice(&mut session, eight, &eight.choices[0]).unwrap();
        assert_eq!(next, NextAction::EnterBattle);
        assert_eq!(session.gold, 0);
    }

    #[test]
    fn pacifist_battle_exit_still_pays() {
        let (_, rules) = setup();
        let node = SceneNode {
            id: SceneId(0),
            speaker: "Monster".to_string(),
            text: "Well?".to_string(),
            choices: vec![Choice::new("Start battle", SceneId::EXIT, Alignment::Pacifist)],
        };
        let scenes = SceneGraph::from_scenes(vec![node.clone()]).unwrap();
        let engine = DialogueEngine::new(&scenes, &rules);
        let mut session = rules.new_session();

        let next = engine.apply_choice(&mut session, &node, &node.choices[0]).unwrap();
        assert_eq!(next, NextAction::EnterBattle);
        assert_eq!(session.gold, 10);
    }

    #[test]
    fn structured_action_overrides_text() {
        let (_, rules) = setup();
        let node = SceneNode {
            id: SceneId(0),
            speaker: "System".to_string(),
            text: "Choose.".to_string(),
            choices: vec![
                Choice::new("Draw your sword", SceneId::EXIT, Alignment::Genocide)
                    .with_action(ExitAction::StartBattle),
                Choice::new("Start battle", SceneId::EXIT, Alignment::Neutral)
                    .with_action(ExitAction::ReturnToMenu),
            ],
        };
        let scenes = SceneGraph::from_scenes(vec![node.clone()]).unwrap();
        let engine = DialogueEngine::new(&scenes, &rules);
        let mut session = rules.new_session();

        assert_eq!(
            engine.apply_choice(&mut session, &node, &node.choices[0]).unwrap(),
            NextAction::EnterBattle
        );
        assert_eq!(
            engine.apply_choice(&mut session, &node, &node.choices[1]).unwrap(),
            NextAction::ReturnToMenu
        );
    }

    #[test]
    fn trigger_match_is_verbatim() {
        let (_, rules) = setup();
        let node = SceneNode {
            id: SceneId(0),
            speaker: "System".to_string(),
            text: "Choose.".to_string(),
            choices: vec![Choice::new("start battle", SceneId::EXIT, Alignment::Neutral)],
        };
        let scenes = SceneGraph::from_scenes(vec![node.clone()]).unwrap();
        let engine = DialogueEngine::new(&scenes, &rules);
        let mut session = rules.new_session();

        assert_eq!(
            engine.apply_choice(&mut session, &node, &node.choices[0]).unwrap(),
            NextAction::ReturnToMenu
        );
    }

    #[test]
    fn unresolved_target_stays_on_current_scene() {
        let (_, rules) = setup();
        let node = SceneNode {
            id: SceneId(3),
            speaker: "Narrator".to_string(),
            text: "A door.".to_string(),
            choices: vec![Choice::new("Open it", SceneId(99), Alignment::Genocide)],
        };
        let scenes = SceneGraph::from_scenes(vec![node.clone()]).unwrap();
        let engine = DialogueEngine::new(&scenes, &rules);
        let mut session = rules.new_session_at(SceneId(3));

        let next = engine.apply_choice(&mut session, &node, &node.choices[0]).unwrap();
        assert_eq!(
            next,
            NextAction::Stay {
                unresolved: SceneId(99)
            }
        );
        assert_eq!(session.current_scene_id, SceneId(3));
        // The choice itself still counts.
        assert_eq!(session.alignment, Alignment::Genocide);
        assert_eq!(session.choice_history, vec!["Open it"]);
    }

    #[test]
    fn revisiting_a_scene_is_allowed() {
        let (scenes, rules) = setup();
        let engine = DialogueEngine::new(&scenes, &rules);
        let mut session = rules.new_session();

        // 0 -> 3 -> 2 and 0 -> 1 -> 2 both land on scene 2.
        let start = scenes.start_node().unwrap();
        engine.apply_choice(&mut session, start, &start.choices[2]).unwrap();
        let three = scenes.lookup(SceneId(3)).unwrap();
        engine.apply_choice(&mut session, three, &three.choices[1]).unwrap();
        assert_eq!(session.current_scene_id, SceneId(2));

        let two = scenes.lookup(SceneId(2)).unwrap();
        let next = engine.apply_choice(&mut session, two, &two.choices[0]).unwrap();
        assert!(matches!(next, NextAction::ContinueDialogue(n) if n.id == SceneId(5)));
        assert_eq!(session.choice_history.len(), 3);
    }
}
