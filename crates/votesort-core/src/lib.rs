//! votesort-core — the puzzle engine.
//!
//! Filters question/answer datasets, deals matching and ranking puzzles,
//! applies player intents under the locking rules, and scores the result.
//! Rendering and input handling are left to the caller.

pub mod dataset;
pub mod engine;
pub mod error;
pub mod generator;
pub mod model;
pub mod moves;
pub mod scorer;
pub mod state;
pub mod traits;

pub use engine::{EngineConfig, GameEngine, Session};
pub use error::EngineError;
pub use moves::{Intent, MoveOutcome};
pub use scorer::ScoreResult;
