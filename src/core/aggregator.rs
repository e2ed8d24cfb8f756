use crate::core::run_guard::RunTicket;
use crate::core::tally;
use crate::domain::model::{AggregationResult, CustomerPage, PageRequest, Progress};
use crate::domain::ports::{CustomerSource, ProgressObserver};
use crate::utils::error::{Result, TallyError};
use crate::utils::validation::validate_range;
use chrono::Utc;
use std::collections::HashMap;

pub const MIN_LIMIT: u64 = 10;
pub const MAX_LIMIT: u64 = 10_000;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Pagination states. `Done` and `Failed` are terminal.
#[derive(Debug)]
pub enum RunState {
    Fetching,
    Accumulating(CustomerPage),
    Done,
    Failed(TallyError),
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Done | RunState::Failed(_))
    }
}

/// Walks the provider's customer list page by page until `limit` customers
/// have been counted or the provider runs out, tallying them by country.
pub struct Aggregator<'a, S: CustomerSource + ?Sized> {
    source: &'a S,
    observer: Option<&'a dyn ProgressObserver>,
    ticket: Option<RunTicket>,
    limit: u64,
    page_size: u32,
    counts: HashMap<String, u64>,
    total: u64,
    cursor: Option<String>,
    pages_fetched: u32,
    state: RunState,
}

impl<'a, S: CustomerSource + ?Sized> Aggregator<'a, S> {
    pub fn new(source: &'a S, limit: u64, page_size: u32) -> Result<Self> {
        validate_range("limit", limit, MIN_LIMIT, MAX_LIMIT)?;
        validate_range("page_size", page_size, 1, MAX_PAGE_SIZE)?;

        Ok(Self {
            source,
            observer: None,
            ticket: None,
            limit,
            page_size,
            counts: HashMap::new(),
            total: 0,
            cursor: None,
            pages_fetched: 0,
            state: RunState::Fetching,
        })
    }

    pub fn with_observer(mut self, observer: &'a dyn ProgressObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Once the ticket goes stale no further page is requested.
    pub fn with_ticket(mut self, ticket: RunTicket) -> Self {
        self.ticket = Some(ticket);
        self
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    pub fn pages_fetched(&self) -> u32 {
        self.pages_fetched
    }

    /// Performs a single state transition.
    pub async fn step(&mut self) -> &RunState {
        let state = std::mem::replace(&mut self.state, RunState::Done);
        self.state = match state {
            RunState::Fetching => self.fetch().await,
            RunState::Accumulating(page) => self.accumulate(page),
            terminal => terminal,
        };
        &self.state
    }

    /// Drives the run to a terminal state. Partial counts are dropped on failure.
    pub async fn run(mut self) -> Result<AggregationResult> {
        while !self.step().await.is_terminal() {}

        match std::mem::replace(&mut self.state, RunState::Done) {
            RunState::Failed(e) => Err(e),
            _ => Ok(self.into_result()),
        }
    }

    async fn fetch(&mut self) -> RunState {
        if let Some(ticket) = &self.ticket {
            if !ticket.is_current() {
                tracing::warn!(
                    "Run generation {} is stale, stopping after {} customers",
                    ticket.generation(),
                    self.total
                );
                let reason = if ticket.is_cancelled() {
                    TallyError::Cancelled
                } else {
                    TallyError::Superseded
                };
                return RunState::Failed(reason);
            }
        }

        let remaining = self.limit.saturating_sub(self.total);
        if remaining == 0 {
            return RunState::Done;
        }

        let request = PageRequest {
            limit: remaining.min(u64::from(self.page_size)) as u32,
            starting_after: self.cursor.clone(),
        };
        tracing::debug!(
            "Requesting page {} (limit={}, starting_after={:?})",
            self.pages_fetched + 1,
            request.limit,
            request.starting_after
        );

        match self.source.list_customers(&request).await {
            Ok(page) => {
                self.pages_fetched += 1;
                RunState::Accumulating(page)
            }
            Err(e) => {
                tracing::warn!("Customer list request failed: {}", e);
                RunState::Failed(e)
            }
        }
    }

    fn accumulate(&mut self, page: CustomerPage) -> RunState {
        for customer in &page.data {
            if self.total >= self.limit {
                break;
            }

            *self
                .counts
                .entry(customer.country_code().to_string())
                .or_insert(0) += 1;
            self.total += 1;

            if let Some(observer) = self.observer {
                observer.on_progress(Progress {
                    processed: self.total,
                    limit: self.limit,
                });
            }
        }

        match page.data.last() {
            Some(last) => self.cursor = Some(last.id.clone()),
            None => {
                // 空頁無法推進游標
                tracing::debug!("Provider returned an empty page, stopping");
                return RunState::Done;
            }
        }

        if page.has_more && self.total < self.limit {
            RunState::Fetching
        } else {
            RunState::Done
        }
    }

    fn into_result(self) -> AggregationResult {
        tracing::info!(
            "Tallied {} customers across {} countries in {} page(s)",
            self.total,
            self.counts.len(),
            self.pages_fetched
        );

        AggregationResult {
            total: self.total,
            requested_limit: self.limit,
            pages_fetched: self.pages_fetched,
            generated_at: Utc::now(),
            tallies: tally::rank(self.counts, self.total),
        }
    }
}
