use crate::utils::error::ScoutError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A raw item object as returned by either API, after flattening.
pub type RawItem = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Instagram,
    TikTok,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Instagram => "instagram",
            Platform::TikTok => "tiktok",
        }
    }

    /// Key holding the item array inside an object payload.
    pub fn items_key(&self) -> &'static str {
        match self {
            Platform::Instagram => "items",
            Platform::TikTok => "itemList",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = ScoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "instagram" | "ig" => Ok(Platform::Instagram),
            "tiktok" | "tt" => Ok(Platform::TikTok),
            other => Err(ScoutError::InvalidConfigValueError {
                field: "platform".to_string(),
                value: other.to_string(),
                reason: "Expected instagram or tiktok".to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscoveryMode {
    Hashtag,
    Username,
}

impl DiscoveryMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscoveryMode::Hashtag => "hashtag",
            DiscoveryMode::Username => "username",
        }
    }
}

impl FromStr for DiscoveryMode {
    type Err = ScoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hashtag" | "tag" => Ok(DiscoveryMode::Hashtag),
            "username" | "user" => Ok(DiscoveryMode::Username),
            other => Err(ScoutError::InvalidConfigValueError {
                field: "mode".to_string(),
                value: other.to_string(),
                reason: "Expected hashtag or username".to_string(),
            }),
        }
    }
}

/// Which listing of a target is paged through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feed {
    Top,
    Recent,
    Clips,
    /// Top first, then recent for whatever is still missing.
    Auto,
    Posts,
    UserClips,
    TikTokHashtag,
}

impl Feed {
    pub fn default_for(platform: Platform, mode: DiscoveryMode) -> Self {
        match (platform, mode) {
            (Platform::TikTok, _) => Feed::TikTokHashtag,
            (Platform::Instagram, DiscoveryMode::Hashtag) => Feed::Top,
            (Platform::Instagram, DiscoveryMode::Username) => Feed::Posts,
        }
    }

    /// Parses a feed name in the context of a platform and discovery mode.
    pub fn parse(platform: Platform, mode: DiscoveryMode, raw: &str) -> Result<Self, ScoutError> {
        let name = raw.trim().to_ascii_lowercase();
        let feed = match (platform, mode, name.as_str()) {
            (Platform::Instagram, DiscoveryMode::Hashtag, "top") => Some(Feed::Top),
            (Platform::Instagram, DiscoveryMode::Hashtag, "recent") => Some(Feed::Recent),
            (Platform::Instagram, DiscoveryMode::Hashtag, "clips" | "reels") => Some(Feed::Clips),
            (Platform::Instagram, DiscoveryMode::Hashtag, "auto") => Some(Feed::Auto),
            (Platform::Instagram, DiscoveryMode::Username, "posts") => Some(Feed::Posts),
            (Platform::Instagram, DiscoveryMode::Username, "clips" | "reels") => {
                Some(Feed::UserClips)
            }
            (Platform::TikTok, DiscoveryMode::Hashtag, "hashtag" | "default") => {
                Some(Feed::TikTokHashtag)
            }
            _ => None,
        };

        feed.ok_or_else(|| ScoutError::InvalidConfigValueError {
            field: "feed".to_string(),
            value: raw.to_string(),
            reason: format!(
                "Not a {} {} feed. Valid feeds: {}",
                platform,
                mode.as_str(),
                Self::names_for(platform, mode).join(", ")
            ),
        })
    }

    pub fn names_for(platform: Platform, mode: DiscoveryMode) -> &'static [&'static str] {
        match (platform, mode) {
            (Platform::Instagram, DiscoveryMode::Hashtag) => &["top", "recent", "clips", "auto"],
            (Platform::Instagram, DiscoveryMode::Username) => &["posts", "clips"],
            (Platform::TikTok, DiscoveryMode::Hashtag) => &["hashtag"],
            (Platform::TikTok, DiscoveryMode::Username) => &[],
        }
    }

    /// Label stored in `MediaRecord::source`.
    pub fn source_label(&self) -> &'static str {
        match self {
            Feed::Top => "hashtag_top",
            Feed::Recent => "hashtag_recent",
            Feed::Clips => "hashtag_clips",
            Feed::Auto => "hashtag_auto",
            Feed::Posts => "user_posts",
            Feed::UserClips => "user_clips",
            Feed::TikTokHashtag => "tiktok_hashtag",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Feed::Top => "top",
            Feed::Recent => "recent",
            Feed::Clips | Feed::UserClips => "clips",
            Feed::Auto => "auto",
            Feed::Posts => "posts",
            Feed::TikTokHashtag => "hashtag",
        }
    }
}

/// Unified record produced by normalization, one per post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaRecord {
    pub platform: Platform,
    pub hashtag: Option<String>,
    pub username: Option<String>,
    pub view_count: u64,
    pub like_count: u64,
    pub comment_count: u64,
    pub post_url: Option<String>,
    pub profile_url: Option<String>,
    pub region: Option<String>,
    pub follower_count: u64,
    pub post_id: Option<String>,
    /// Unix seconds.
    pub created_at: Option<i64>,
    pub metrics_disabled: bool,
    pub source: String,
}

impl MediaRecord {
    pub fn empty(platform: Platform, source: &str) -> Self {
        Self {
            platform,
            hashtag: None,
            username: None,
            view_count: 0,
            like_count: 0,
            comment_count: 0,
            post_url: None,
            profile_url: None,
            region: None,
            follower_count: 0,
            post_id: None,
            created_at: None,
            metrics_disabled: false,
            source: source.to_string(),
        }
    }

    pub fn engagement(&self) -> u64 {
        self.view_count
            .saturating_add(self.like_count)
            .saturating_add(self.comment_count)
    }

    pub fn date_label(&self) -> String {
        self.created_at
            .and_then(|ts| chrono::DateTime::from_timestamp(ts, 0))
            .map(|dt| dt.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "Unknown".to_string())
    }
}

/// Profile facts resolved in username mode and copied onto every record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub username: String,
    pub user_id: String,
    pub follower_count: u64,
    pub profile_url: String,
}

/// Detailed profile used by user inspection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserDetails {
    pub profile: Vec<(String, String)>,
    pub posts_count: usize,
    pub reels_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Engagement,
    Views,
    Likes,
    Comments,
    Followers,
    Date,
}

impl FromStr for SortKey {
    type Err = ScoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "engagement" => Ok(SortKey::Engagement),
            "views" | "plays" => Ok(SortKey::Views),
            "likes" => Ok(SortKey::Likes),
            "comments" => Ok(SortKey::Comments),
            "followers" => Ok(SortKey::Followers),
            "date" => Ok(SortKey::Date),
            other => Err(ScoutError::InvalidConfigValueError {
                field: "sort_by".to_string(),
                value: other.to_string(),
                reason: "Expected engagement, views, likes, comments, followers or date"
                    .to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub key: SortKey,
    pub descending: bool,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self {
            key: SortKey::Engagement,
            descending: true,
        }
    }
}

impl SortSpec {
    /// Stable sort, so records with equal keys keep their fetch order.
    pub fn apply(&self, records: &mut [MediaRecord]) {
        let key = self.key;
        records.sort_by(|a, b| {
            let ord = match key {
                SortKey::Engagement => a.engagement().cmp(&b.engagement()),
                SortKey::Views => a.view_count.cmp(&b.view_count),
                SortKey::Likes => a.like_count.cmp(&b.like_count),
                SortKey::Comments => a.comment_count.cmp(&b.comment_count),
                SortKey::Followers => a.follower_count.cmp(&b.follower_count),
                SortKey::Date => a.created_at.unwrap_or(0).cmp(&b.created_at.unwrap_or(0)),
            };
            if self.descending {
                ord.reverse()
            } else {
                ord
            }
        });
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Tsv,
    Json,
    Zip,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Tsv => "tsv",
            ExportFormat::Json => "json",
            ExportFormat::Zip => "zip",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ScoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "tsv" => Ok(ExportFormat::Tsv),
            "json" => Ok(ExportFormat::Json),
            "zip" => Ok(ExportFormat::Zip),
            other => Err(ScoutError::InvalidConfigValueError {
                field: "formats".to_string(),
                value: other.to_string(),
                reason: "Unsupported format. Valid formats: csv, tsv, json, zip".to_string(),
            }),
        }
    }
}

/// Pagination counters for one feed of one target.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeedStats {
    pub endpoint: String,
    pub fetched: usize,
    pub kept: usize,
    pub requests: usize,
    pub cursor: Option<String>,
}

impl FeedStats {
    pub fn merge(self, other: FeedStats) -> FeedStats {
        FeedStats {
            endpoint: format!("{} + {}", self.endpoint, other.endpoint),
            fetched: self.fetched + other.fetched,
            kept: self.kept + other.kept,
            requests: self.requests + other.requests,
            cursor: other.cursor.or(self.cursor),
        }
    }
}

/// Everything collected for a single target.
#[derive(Debug, Clone)]
pub struct TargetOutcome {
    pub target: String,
    pub records: Vec<MediaRecord>,
    pub stats: FeedStats,
    pub effective_feed: String,
    pub fallback_used: bool,
    pub profile: Option<ProfileSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetFailure {
    pub target: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunMeta {
    pub platform: String,
    pub method: String,
    pub targets: Vec<String>,
    pub effective_feed: String,
    pub requested: usize,
    pub total_fetched: usize,
    pub total_kept: usize,
    pub total_requests: usize,
    pub endpoints: Vec<String>,
    pub fallback_used: bool,
    pub failures: Vec<TargetFailure>,
}

impl RunMeta {
    /// Once any target fell back, the effective feed stays the fallback one.
    pub fn absorb(&mut self, outcome: &TargetOutcome) {
        self.total_fetched += outcome.stats.fetched;
        self.total_kept += outcome.records.len();
        self.total_requests += outcome.stats.requests;
        if !outcome.stats.endpoint.is_empty() && !self.endpoints.contains(&outcome.stats.endpoint)
        {
            self.endpoints.push(outcome.stats.endpoint.clone());
        }
        if outcome.fallback_used || !self.fallback_used {
            self.effective_feed = outcome.effective_feed.clone();
        }
        self.fallback_used |= outcome.fallback_used;
    }
}

#[derive(Debug, Clone)]
pub struct Extraction {
    pub records: Vec<MediaRecord>,
    pub meta: RunMeta,
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub records: Vec<MediaRecord>,
    pub table: String,
    pub csv_output: String,
    pub tsv_output: String,
    pub json_output: String,
    pub meta: RunMeta,
}
