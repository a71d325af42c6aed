//! A 2D body of water with a spring-chain surface that reacts to bodies
//! splashing into it and pushes floating bodies back up.
//!
//! [`sim::WaterSimulation`] is the entry point: feed it a [`hecs::World`]
//! and frame times, read back [`sim::SimEvent`]s and the surface heights.

pub mod components;
pub mod config;
pub mod error;
pub mod fsm;
pub mod pollution;
pub mod scene;
pub mod sim;
pub mod systems;
pub mod water;

pub use config::WaterConfig;
pub use error::{SimError, SimResult};
pub use sim::{SimEvent, WaterSimulation};
