use crate::core::filter::Thresholds;
use crate::domain::model::{
    DiscoveryMode, Extraction, Feed, Platform, TargetOutcome, TransformResult,
};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Destination for export files. `write_file` returns where the data landed.
pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

/// One paginated endpoint. `fetch` returns the raw JSON page for a cursor.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    fn platform(&self) -> Platform;
    fn endpoint(&self) -> &str;
    async fn fetch(&self, cursor: Option<&str>) -> Result<serde_json::Value>;
}

/// Limits applied while paging through one feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub max_posts: usize,
    pub max_requests: usize,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            max_posts: 50,
            max_requests: 10,
        }
    }
}

/// What a media source needs to know to collect one target.
#[derive(Debug, Clone)]
pub struct CollectPlan {
    pub mode: DiscoveryMode,
    pub feed: Feed,
    pub limits: PageLimits,
    pub thresholds: Thresholds,
    /// Unix seconds the age threshold is measured from.
    pub now: i64,
}

#[async_trait]
pub trait MediaSource: Send + Sync {
    fn platform(&self) -> Platform;
    async fn collect(&self, target: &str, plan: &CollectPlan) -> Result<TargetOutcome>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Extraction>;
    async fn transform(&self, data: Extraction) -> Result<TransformResult>;
    async fn load(&self, result: &TransformResult) -> Result<Vec<String>>;
}
