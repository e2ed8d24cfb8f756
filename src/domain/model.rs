use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Country code assigned when a customer carries no country information.
pub const UNKNOWN_COUNTRY: &str = "Unknown";

/// Metadata key consulted before the address country.
pub const METADATA_COUNTRY_KEY: &str = "country_code";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Address {
    #[serde(default)]
    pub country: Option<String>,
}

/// A customer as returned by the provider's list endpoint. Only the fields the
/// tally needs are decoded; everything else in the payload is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Customer {
    pub id: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    #[serde(default)]
    pub address: Option<Address>,
}

impl Customer {
    /// Metadata country first, then address country, then [`UNKNOWN_COUNTRY`].
    /// Blank values count as absent.
    pub fn country_code(&self) -> &str {
        let from_metadata = self
            .metadata
            .get(METADATA_COUNTRY_KEY)
            .map(|c| c.trim())
            .filter(|c| !c.is_empty());

        let from_address = self
            .address
            .as_ref()
            .and_then(|a| a.country.as_deref())
            .map(str::trim)
            .filter(|c| !c.is_empty());

        from_metadata.or(from_address).unwrap_or(UNKNOWN_COUNTRY)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CustomerPage {
    pub data: Vec<Customer>,
    pub has_more: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: u32,
    pub starting_after: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CountryTally {
    pub country: String,
    pub count: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregationResult {
    pub total: u64,
    pub requested_limit: u64,
    pub pages_fetched: u32,
    pub generated_at: DateTime<Utc>,
    /// Count descending, ties by country code ascending.
    pub tallies: Vec<CountryTally>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub processed: u64,
    pub limit: u64,
}

impl Progress {
    /// Whole percentage in 0..=100.
    pub fn percent(&self) -> u8 {
        if self.limit == 0 {
            return 100;
        }
        ((self.processed.min(self.limit) * 100) / self.limit) as u8
    }
}
