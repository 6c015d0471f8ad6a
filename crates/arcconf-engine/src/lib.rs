//! arcconf Engine - Orchestration layer
//!
//! Provides high-level command orchestration that coordinates between
//! core reconciliation logic and the persistence layer, plus the engine
//! configuration.

pub mod commands;
pub mod config;

pub use config::EngineConfig;
