#![forbid(unsafe_code)]

//! Core domain model and planning logic for the Taper training calendar.
//!
//! This crate provides:
//! - Calendar math on plain Y/M/D dates
//! - The fixed periodization template and plan generator
//! - The workout store and adaptive rebalancer
//! - Aggregates (weekly mileage, GAP, dashboard widgets)
//! - Provider payload models (weather, activity import)
//! - Persistence and CSV export

pub mod types;
pub mod error;
pub mod calendar;
pub mod template;
pub mod pace;
pub mod generator;
pub mod store;
pub mod rebalance;
pub mod aggregate;
pub mod weather;
pub mod import;
pub mod config;
pub mod logging;
pub mod state;
pub mod export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use pace::{grade_adjusted_pace, Pace};
pub use generator::generate;
pub use store::WorkoutStore;
pub use rebalance::{parse_score, rebalance, RebalanceDecision, RebalanceReport};
pub use aggregate::{weekly_mileage, widgets, WeeklyMileage, Widgets};
pub use state::{load_or_generate, JsonFileRepository, PlanRepository};
