//! Neural-network controlled agents and menu navigation.
//!
//! An [`Agent`] binds one genome to the fixed [`NetworkShape`] and turns the
//! observable game state into one controller action per frame while keeping
//! score of damage taken and dealt. A [`Squad`] rotates through the agents of
//! one episode and reports how many have finished, which is what ends the
//! episode. [`MenuManager`] handles everything outside active play.

pub use self::{
    action::ControlAction,
    agent::{Agent, encode_inputs},
    menu::MenuManager,
    network::{Network, NetworkShape, ShapeError},
    squad::Squad,
};

pub mod action;
pub mod agent;
pub mod menu;
pub mod network;
pub mod squad;
