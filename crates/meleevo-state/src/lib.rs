//! Observable game state for a live Melee process.
//!
//! This crate holds the process-wide [`GameState`] record (frame counter,
//! current menu, per-player attributes) and the [`StateManager`] that maps
//! watched memory addresses to state mutations. The state is only ever
//! advanced by applying [`RawEvent`]s in the order the memory watcher
//! produced them; nothing else writes to it.

pub use self::{
    event::RawEvent,
    manager::{EventApplyError, StateManager},
    state::{GameState, Menu, PLAYER_COUNT, Player},
};

pub mod event;
pub mod manager;
pub mod state;
