pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod report;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;
pub use crate::config::{Settings, TomlConfig};

pub use crate::adapters::{storage::LocalStorage, stripe::StripeCustomerSource};
pub use crate::core::{aggregator::Aggregator, engine::TallyEngine, run_guard::RunCoordinator};
pub use crate::domain::model::{AggregationResult, CountryTally, Progress};
pub use crate::utils::error::{Result, TallyError};
