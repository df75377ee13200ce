use crate::config::request::{parse_targets, ScrapeRequest};
use crate::core::filter::Thresholds;
use crate::domain::model::{DiscoveryMode, ExportFormat, Feed, Platform, SortKey, SortSpec};
use crate::domain::ports::PageLimits;
use crate::utils::error::Result;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "social-scout")]
#[command(about = "Scrape Instagram and TikTok posts by hashtag or user, filter them and export a table")]
pub struct CliConfig {
    #[arg(long, default_value = "instagram", help = "instagram or tiktok")]
    pub platform: Platform,

    #[arg(long, default_value = "hashtag", help = "hashtag or username")]
    pub mode: DiscoveryMode,

    #[arg(long, default_value = "", help = "Comma-separated hashtags, or one username")]
    pub targets: String,

    #[arg(long, help = "Instagram: top, recent, clips, auto (hashtag) or posts, clips (username)")]
    pub feed: Option<String>,

    #[arg(long, default_value = "50", help = "Posts to keep per target")]
    pub max_posts: usize,

    #[arg(long, default_value = "10", help = "API pages to request per feed")]
    pub max_requests: usize,

    #[arg(long, default_value = "365", help = "Only keep posts from the last N days")]
    pub days: u32,

    #[arg(long, default_value = "0")]
    pub min_views: u64,

    #[arg(long, default_value = "0")]
    pub min_likes: u64,

    #[arg(long, default_value = "0")]
    pub min_comments: u64,

    #[arg(long, help = "Drop posts that carry no timestamp")]
    pub exclude_missing_dates: bool,

    #[arg(long, default_value = "engagement", help = "engagement, views, likes, comments, followers or date")]
    pub sort_by: SortKey,

    #[arg(long)]
    pub ascending: bool,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, value_delimiter = ',', default_value = "csv", help = "csv, tsv, json, zip")]
    pub formats: Vec<ExportFormat>,

    #[arg(long, help = "TOML file with API endpoints and credentials")]
    pub profile: Option<String>,

    #[arg(long, help = "Show an Instagram user's profile instead of scraping")]
    pub inspect_user: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,
}

impl CliConfig {
    pub fn to_request(&self) -> Result<ScrapeRequest> {
        let feed = match &self.feed {
            Some(raw) => Feed::parse(self.platform, self.mode, raw)?,
            None => Feed::default_for(self.platform, self.mode),
        };
        let (targets, invalid_targets) = parse_targets(self.platform, self.mode, &self.targets);

        Ok(ScrapeRequest {
            platform: self.platform,
            mode: self.mode,
            targets,
            invalid_targets,
            feed,
            limits: PageLimits {
                max_posts: self.max_posts,
                max_requests: self.max_requests,
            },
            thresholds: Thresholds {
                min_views: self.min_views,
                min_likes: self.min_likes,
                min_comments: self.min_comments,
                max_age_days: self.days,
                exclude_missing_timestamp: self.exclude_missing_dates,
            },
            sort: SortSpec {
                key: self.sort_by,
                descending: !self.ascending,
            },
            formats: self.formats.clone(),
            output_path: self.output_path.clone(),
        })
    }
}
