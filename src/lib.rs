//! Procedural world generation library
//!
//! Turns a seed into a layered 2D world: noise elevation and moisture, eroded
//! terrain with rivers, biomes, placed structures, and an automaton mask with
//! auto-tile classes. Re-exports modules for use by binaries and tools.

pub mod automata;
pub mod biomes;
pub mod config;
pub mod erosion;
pub mod error;
pub mod grid;
pub mod noise_field;
pub mod preview;
pub mod seeds;
pub mod structures;
pub mod tiles;
pub mod world;

pub use config::WorldConfig;
pub use error::{Result, WorldGenError};
pub use grid::Grid;
pub use world::{generate_world, generate_world_with_cancel, WorldData};
