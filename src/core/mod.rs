pub mod battle;
pub mod dialogue;
pub mod game;
pub mod persistence;
pub mod rules;
pub mod scene_graph;
