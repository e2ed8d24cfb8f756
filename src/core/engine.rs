use crate::core::aggregator::Aggregator;
use crate::core::run_guard::RunCoordinator;
use crate::domain::model::AggregationResult;
use crate::domain::ports::{ConfigProvider, CustomerSource, ProgressObserver};
use crate::utils::error::{Result, TallyError};
use std::future::Future;

pub struct TallyEngine<S: CustomerSource> {
    source: S,
    limit: u64,
    page_size: u32,
    coordinator: RunCoordinator,
}

impl<S: CustomerSource> TallyEngine<S> {
    pub fn new(source: S, limit: u64, page_size: u32) -> Self {
        Self {
            source,
            limit,
            page_size,
            coordinator: RunCoordinator::new(),
        }
    }

    pub fn from_config<C: ConfigProvider>(source: S, config: &C) -> Self {
        Self::new(source, config.limit(), config.page_size())
    }

    /// Shares the coordinator so a signal handler can cancel the run.
    pub fn coordinator(&self) -> RunCoordinator {
        self.coordinator.clone()
    }

    /// Starts a new generation; any run still in flight becomes stale and its
    /// completion is reported as [`TallyError::Superseded`]. A run retired by
    /// [`RunCoordinator::cancel`] reports [`TallyError::Cancelled`] instead.
    pub async fn run(&self, observer: &dyn ProgressObserver) -> Result<AggregationResult> {
        let ticket = self.coordinator.begin();
        tracing::info!(
            "Tallying up to {} customers (page size {})",
            self.limit,
            self.page_size
        );

        let result = Aggregator::new(&self.source, self.limit, self.page_size)?
            .with_observer(observer)
            .with_ticket(ticket.clone())
            .run()
            .await;

        if !ticket.is_current() {
            tracing::debug!(
                "Discarding completion of stale run generation {}",
                ticket.generation()
            );
            let stale = if ticket.is_cancelled() {
                TallyError::Cancelled
            } else {
                TallyError::Superseded
            };
            return match result {
                Ok(_) | Err(TallyError::Cancelled) | Err(TallyError::Superseded) => Err(stale),
                Err(e) => Err(e),
            };
        }

        result
    }

    /// Like [`TallyEngine::run`], but drops the in-flight request as soon as
    /// `shutdown` resolves and reports [`TallyError::Cancelled`].
    pub async fn run_until<F>(
        &self,
        observer: &dyn ProgressObserver,
        shutdown: F,
    ) -> Result<AggregationResult>
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            result = self.run(observer) => result,
            _ = shutdown => {
                self.coordinator.cancel();
                tracing::warn!("Shutdown requested, abandoning the in-flight request");
                Err(TallyError::Cancelled)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Customer, CustomerPage, PageRequest, Progress};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Clone, Copy)]
    enum Interference {
        Cancel,
        Restart,
    }

    /// Touches the engine's coordinator while the first request is in flight.
    struct InterferingSource {
        coordinator: Mutex<Option<RunCoordinator>>,
        interference: Interference,
        has_more: bool,
    }

    impl InterferingSource {
        fn new(interference: Interference, has_more: bool) -> Self {
            Self {
                coordinator: Mutex::new(None),
                interference,
                has_more,
            }
        }
    }

    #[async_trait]
    impl CustomerSource for InterferingSource {
        async fn list_customers(&self, _request: &PageRequest) -> Result<CustomerPage> {
            if let Some(coordinator) = self.coordinator.lock().unwrap().take() {
                match self.interference {
                    Interference::Cancel => coordinator.cancel(),
                    Interference::Restart => {
                        coordinator.begin();
                    }
                }
            }
            Ok(CustomerPage {
                data: (1..=10)
                    .map(|i| Customer {
                        id: format!("cus_{}", i),
                        ..Default::default()
                    })
                    .collect(),
                has_more: self.has_more,
            })
        }
    }

    struct HangingSource;

    #[async_trait]
    impl CustomerSource for HangingSource {
        async fn list_customers(&self, _request: &PageRequest) -> Result<CustomerPage> {
            std::future::pending::<Result<CustomerPage>>().await
        }
    }

    fn engine_with(source: InterferingSource) -> TallyEngine<InterferingSource> {
        let engine = TallyEngine::new(source, 50, 10);
        *engine.source.coordinator.lock().unwrap() = Some(engine.coordinator());
        engine
    }

    #[tokio::test]
    async fn test_cancel_mid_run_reports_cancelled() {
        let engine = engine_with(InterferingSource::new(Interference::Cancel, true));

        let result = engine.run(&|_: Progress| {}).await;

        assert!(matches!(result, Err(TallyError::Cancelled)));
    }

    #[tokio::test]
    async fn test_cancel_before_completion_is_not_superseded() {
        let engine = engine_with(InterferingSource::new(Interference::Cancel, false));

        let result = engine.run(&|_: Progress| {}).await;

        assert!(matches!(result, Err(TallyError::Cancelled)));
    }

    #[tokio::test]
    async fn test_newer_run_supersedes_stale_completion() {
        let engine = engine_with(InterferingSource::new(Interference::Restart, false));

        let result = engine.run(&|_: Progress| {}).await;

        assert!(matches!(result, Err(TallyError::Superseded)));
    }

    #[tokio::test]
    async fn test_newer_run_stops_stale_pagination() {
        let engine = engine_with(InterferingSource::new(Interference::Restart, true));

        let result = engine.run(&|_: Progress| {}).await;

        assert!(matches!(result, Err(TallyError::Superseded)));
    }

    #[tokio::test]
    async fn test_shutdown_abandons_hanging_request() {
        let engine = TallyEngine::new(HangingSource, 10, 100);

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            engine.run_until(
                &|_: Progress| {},
                tokio::time::sleep(Duration::from_millis(20)),
            ),
        )
        .await
        .expect("shutdown should end the run promptly");

        assert!(matches!(result, Err(TallyError::Cancelled)));
    }

    #[tokio::test]
    async fn test_invalid_limit_is_rejected_before_any_request() {
        let engine = TallyEngine::new(HangingSource, 5, 100);

        let result = engine.run(&|_: Progress| {}).await;

        assert!(matches!(
            result,
            Err(TallyError::InvalidConfigValueError { .. })
        ));
    }
}
