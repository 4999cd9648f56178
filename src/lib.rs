//! Data-driven WvW counter-composition engine.
//!
//! Ingests parsed fight records, deduplicates them by encounter
//! fingerprint, and recommends counter-compositions backed by empirical
//! win-rate evidence over similar historical fights.

pub mod analysis;
pub mod composition;
pub mod config;
pub mod display;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod model;
pub mod roles;
pub mod store;

pub use analysis::recommender::Recommendation;
pub use composition::Composition;
pub use config::Config;
pub use engine::{CounterEngine, EngineStatus};
pub use error::EngineError;
pub use model::{FightContext, FightData, Outcome, PlayerRecord};
