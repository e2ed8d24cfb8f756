pub mod aggregator;
pub mod engine;
pub mod run_guard;
pub mod tally;

pub use crate::domain::model::{AggregationResult, CountryTally, Customer, CustomerPage, PageRequest, Progress};
pub use crate::domain::ports::{ConfigProvider, CustomerSource, ProgressObserver, Storage};
pub use crate::utils::error::Result;
