//! Lamatok client and the TikTok media source built on it.
use crate::clients::http::{ApiAuth, ApiClient};
use crate::core::collector::collect_pages;
use crate::core::filter::RecordFilter;
use crate::core::normalize::NormalizeContext;
use crate::domain::model::{DiscoveryMode, Feed, Platform, TargetOutcome};
use crate::domain::ports::{CollectPlan, MediaSource, PageFetcher};
use crate::utils::error::{Result, ScoutError};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.lamatok.com/v1";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(40);
pub const PAGE_SIZE: u32 = 30;

const HASHTAG_INFO: &str = "/hashtag/info";
const HASHTAG_MEDIAS: &str = "/hashtag/medias";

#[derive(Debug, Clone)]
pub struct LamatokClient {
    api: ApiClient,
}

impl LamatokClient {
    pub fn new(base_url: &str, access_key: &str, timeout: Duration) -> Result<Self> {
        let api = ApiClient::new(
            base_url,
            ApiAuth::Query("access_key", access_key.trim().to_string()),
            timeout,
        )?;
        Ok(Self { api })
    }

    /// Challenge id for a hashtag, `None` when the API does not know it.
    pub async fn resolve_hashtag_id(&self, hashtag: &str) -> Result<Option<String>> {
        let data = self
            .api
            .get_json(HASHTAG_INFO, &[("hashtag", hashtag.to_string())])
            .await?;

        let id = data
            .pointer("/challengeInfo/challenge/id")
            .and_then(|v| match v {
                Value::String(s) if !s.is_empty() => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            });
        Ok(id)
    }

    pub async fn hashtag_medias(&self, hashtag_id: &str, cursor: Option<&str>) -> Result<Value> {
        let mut params = vec![
            ("id", hashtag_id.to_string()),
            ("count", PAGE_SIZE.to_string()),
        ];
        if let Some(cursor) = cursor {
            params.push(("cursor", cursor.to_string()));
        }
        self.api.get_json(HASHTAG_MEDIAS, &params).await
    }
}

struct HashtagMedias<'a> {
    client: &'a LamatokClient,
    hashtag_id: &'a str,
}

#[async_trait]
impl PageFetcher for HashtagMedias<'_> {
    fn platform(&self) -> Platform {
        Platform::TikTok
    }

    fn endpoint(&self) -> &str {
        HASHTAG_MEDIAS
    }

    async fn fetch(&self, cursor: Option<&str>) -> Result<Value> {
        self.client.hashtag_medias(self.hashtag_id, cursor).await
    }
}

pub struct TikTokSource {
    client: LamatokClient,
}

impl TikTokSource {
    pub fn new(client: LamatokClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MediaSource for TikTokSource {
    fn platform(&self) -> Platform {
        Platform::TikTok
    }

    async fn collect(&self, target: &str, plan: &CollectPlan) -> Result<TargetOutcome> {
        if plan.mode != DiscoveryMode::Hashtag || plan.feed != Feed::TikTokHashtag {
            return Err(ScoutError::InvalidConfigValueError {
                field: "mode".to_string(),
                value: plan.mode.as_str().to_string(),
                reason: "TikTok supports hashtag discovery only".to_string(),
            });
        }

        let tag = target.to_lowercase();
        let hashtag_id = self
            .client
            .resolve_hashtag_id(&tag)
            .await?
            .ok_or_else(|| ScoutError::NotFound {
                what: format!("TikTok hashtag #{}", tag),
            })?;
        tracing::info!(%tag, %hashtag_id, "Resolved TikTok hashtag");

        let fetcher = HashtagMedias {
            client: &self.client,
            hashtag_id: &hashtag_id,
        };
        let filter = RecordFilter::new(plan.thresholds, plan.now);
        let ctx = NormalizeContext::for_hashtag(&tag, plan.feed.source_label());
        let (records, stats) = collect_pages(&fetcher, &plan.limits, &filter, &ctx).await?;

        Ok(TargetOutcome {
            target: tag,
            records,
            stats,
            effective_feed: plan.feed.as_str().to_string(),
            fallback_used: false,
            profile: None,
        })
    }
}
