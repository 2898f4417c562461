//! RPG Adventure: the state machine behind a small dialogue-and-battle game.
//!
//! A player walks a branching scene graph, declaring an alignment with every
//! choice, and may end up in a turn-based fight with hit points, bandages,
//! gold and levels. Rendering is left to the caller: [`core::game::Game`]
//! takes commands and hands back a read-only view of the state.

pub mod core;
pub mod schema;
