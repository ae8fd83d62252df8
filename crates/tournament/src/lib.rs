//! Ratings and series for the guess-the-action arena
//!
//! This crate provides infrastructure for:
//! - Folding finished games into pairwise Elo ratings per model label
//! - Persisting the rating store and exporting/importing match history
//! - Running series of games that rotate through model pairs
//!
//! # Usage
//!
//! ```bash
//! # Play one game from a run file and update the ratings
//! cargo run -p tournament -- play --config configs/arena.toml
//!
//! # Ten games rotating through every pair of roster models
//! cargo run -p tournament -- series --config configs/arena.toml --games 10
//!
//! # Show the current ratings
//! cargo run -p tournament -- leaderboard
//! ```

pub mod config;
pub mod csv;
mod elo;
mod error;
mod manager;
mod results;
mod series;

pub use config::RunConfig;
pub use elo::*;
pub use error::*;
pub use manager::*;
pub use results::*;
pub use series::*;
