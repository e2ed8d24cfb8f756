use crate::domain::model::{CustomerPage, PageRequest, Progress};
use crate::utils::error::Result;
use async_trait::async_trait;

/// The provider's paginated "list customers" operation.
#[async_trait]
pub trait CustomerSource: Send + Sync {
    async fn list_customers(&self, request: &PageRequest) -> Result<CustomerPage>;
}

/// Receives one update per processed record.
pub trait ProgressObserver: Send + Sync {
    fn on_progress(&self, progress: Progress);
}

impl<F> ProgressObserver for F
where
    F: Fn(Progress) + Send + Sync,
{
    fn on_progress(&self, progress: Progress) {
        self(progress)
    }
}

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn api_key(&self) -> &str;
    fn base_url(&self) -> &str;
    fn timeout_seconds(&self) -> u64;
    fn limit(&self) -> u64;
    fn page_size(&self) -> u32;
}
