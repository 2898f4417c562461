//! Scene graph: the static set of dialogue nodes, indexed by id.

use rustc_hash::{FxHashMap, FxHashSet};
use std::path::Path;
use thiserror::Error;

use crate::schema::scene::{SceneId, SceneNode};

const BUILTIN_SCENES: &str = include_str!("../../game_data/scenes.ron");

#[derive(Debug, Error)]
pub enum SceneGraphError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("duplicate scene id: {0}")]
    DuplicateScene(SceneId),
    #[error("scene id {0} is reserved for the dialogue exit")]
    ReservedId(SceneId),
    #[error("scene graph has no scenes")]
    Empty,
}

/// A choice whose target scene does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DanglingChoice {
    pub scene: SceneId,
    pub choice_index: usize,
    pub target: SceneId,
}

/// Immutable lookup table of scenes. The first scene loaded is the start.
///
/// Cycles are allowed: traversal follows whatever choice the player picks,
/// so a scene may be visited any number of times.
#[derive(Debug, Clone)]
pub struct SceneGraph {
    scenes: FxHashMap<SceneId, SceneNode>,
    order: Vec<SceneId>,
    start: SceneId,
}

impl SceneGraph {
    /// Build a graph from scenes in authoring order.
    pub fn from_scenes(nodes: Vec<SceneNode>) -> Result<SceneGraph, SceneGraphError> {
        let start = nodes.first().map(|node| node.id).ok_or(SceneGraphError::Empty)?;

        let mut scenes = FxHashMap::default();
        let mut order = Vec::with_capacity(nodes.len());
        for node in nodes {
            if node.id.is_exit() {
                return Err(SceneGraphError::ReservedId(node.id));
            }
            if scenes.contains_key(&node.id) {
                return Err(SceneGraphError::DuplicateScene(node.id));
            }
            order.push(node.id);
            scenes.insert(node.id, node);
        }

        Ok(SceneGraph {
            scenes,
            order,
            start,
        })
    }

    /// Load a scene graph from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<SceneGraph, SceneGraphError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse a scene graph from a RON list of scenes.
    pub fn parse_ron(input: &str) -> Result<SceneGraph, SceneGraphError> {
        let nodes: Vec<SceneNode> = ron::from_str(input)?;
        Self::from_scenes(nodes)
    }

    /// The adventure that ships with the crate.
    pub fn builtin() -> Result<SceneGraph, SceneGraphError> {
        Self::parse_ron(BUILTIN_SCENES)
    }

    pub fn lookup(&self, id: SceneId) -> Option<&SceneNode> {
        self.scenes.get(&id)
    }

    pub fn contains(&self, id: SceneId) -> bool {
        self.scenes.contains_key(&id)
    }

    pub fn start(&self) -> SceneId {
        self.start
    }

    pub fn start_node(&self) -> Option<&SceneNode> {
        self.lookup(self.start)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Scenes in authoring order.
    pub fn iter(&self) -> impl Iterator<Item = &SceneNode> {
        self.order.iter().filter_map(|id| self.scenes.get(id))
    }

    /// Every non-exit choice that points at a missing scene.
    pub fn unresolved_references(&self) -> Vec<DanglingChoice> {
        let mut dangling = Vec::new();
        for node in self.iter() {
            for (choice_index, choice) in node.choices.iter().enumerate() {
                if !choice.is_exit() && !self.contains(choice.next) {
                    dangling.push(DanglingChoice {
                        scene: node.id,
                        choice_index,
                        target: choice.next,
                    });
                }
            }
        }
        dangling
    }

    /// Scenes that no sequence of choices from the start can reach.
    pub fn unreachable_scenes(&self) -> Vec<SceneId> {
        let mut visited = FxHashSet::default();
        let mut stack = vec![self.start()];

        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            if let Some(node) = self.lookup(id) {
                for choice in &node.choices {
                    if self.contains(choice.next) && !visited.contains(&choice.next) {
                        stack.push(choice.next);
                    }
                }
            }
        }

        self.order
            .iter()
            .copied()
            .filter(|id| !visited.contains(id))
            .collect()
    }
}
