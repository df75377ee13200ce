use crate::core::filter::Thresholds;
use crate::domain::model::{DiscoveryMode, ExportFormat, Feed, Platform, SortSpec};
use crate::domain::ports::{CollectPlan, PageLimits};
use crate::utils::error::{Result, ScoutError};
use crate::utils::validation::{validate_path, validate_range, Validate};
use regex::Regex;
use std::sync::OnceLock;

pub const MAX_POSTS_RANGE: (usize, usize) = (1, 1000);
pub const MAX_REQUESTS_RANGE: (usize, usize) = (1, 100);
pub const DAYS_RANGE: (u32, u32) = (1, 3650);

/// Everything one run needs, collected from the command line.
#[derive(Debug, Clone)]
pub struct ScrapeRequest {
    pub platform: Platform,
    pub mode: DiscoveryMode,
    pub targets: Vec<String>,
    /// Raw inputs dropped by target parsing.
    pub invalid_targets: Vec<String>,
    pub feed: Feed,
    pub limits: PageLimits,
    pub thresholds: Thresholds,
    pub sort: SortSpec,
    pub formats: Vec<ExportFormat>,
    pub output_path: String,
}

impl ScrapeRequest {
    pub fn plan(&self, now: i64) -> CollectPlan {
        CollectPlan {
            mode: self.mode,
            feed: self.feed,
            limits: self.limits,
            thresholds: self.thresholds,
            now,
        }
    }
}

impl Validate for ScrapeRequest {
    fn validate(&self) -> Result<()> {
        if self.platform == Platform::TikTok && self.mode == DiscoveryMode::Username {
            return Err(ScoutError::InvalidConfigValueError {
                field: "mode".to_string(),
                value: self.mode.as_str().to_string(),
                reason: "TikTok supports hashtag discovery only".to_string(),
            });
        }

        if self.targets.is_empty() {
            return Err(ScoutError::InvalidConfigValueError {
                field: "targets".to_string(),
                value: self.invalid_targets.join(","),
                reason: "No valid targets found".to_string(),
            });
        }

        validate_range(
            "max_posts",
            self.limits.max_posts,
            MAX_POSTS_RANGE.0,
            MAX_POSTS_RANGE.1,
        )?;
        validate_range(
            "max_requests",
            self.limits.max_requests,
            MAX_REQUESTS_RANGE.0,
            MAX_REQUESTS_RANGE.1,
        )?;
        validate_range("days", self.thresholds.max_age_days, DAYS_RANGE.0, DAYS_RANGE.1)?;
        validate_path("output_path", &self.output_path)?;
        Ok(())
    }
}

fn hashtag_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("static regex"))
}

/// Splits raw target input into valid targets and rejected entries.
///
/// Hashtag mode takes a comma-separated list, strips `#` and keeps only
/// `[A-Za-z0-9_]+` names. Username mode takes one name and strips `@`.
pub fn parse_targets(platform: Platform, mode: DiscoveryMode, raw: &str) -> (Vec<String>, Vec<String>) {
    let raw = raw.trim();
    match mode {
        DiscoveryMode::Hashtag => {
            let mut targets: Vec<String> = Vec::new();
            let mut invalid = Vec::new();
            for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
                let tag = entry.trim_start_matches('#').trim();
                if !hashtag_pattern().is_match(tag) {
                    invalid.push(entry.to_string());
                    continue;
                }
                let tag = match platform {
                    Platform::TikTok => tag.to_lowercase(),
                    Platform::Instagram => tag.to_string(),
                };
                if !targets.contains(&tag) {
                    targets.push(tag);
                }
            }
            (targets, invalid)
        }
        DiscoveryMode::Username => {
            let name = raw.trim_start_matches('@').trim();
            if name.is_empty() {
                (Vec::new(), Vec::new())
            } else {
                (vec![name.to_string()], Vec::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(platform: Platform, mode: DiscoveryMode, raw: &str) -> ScrapeRequest {
        let (targets, invalid_targets) = parse_targets(platform, mode, raw);
        ScrapeRequest {
            platform,
            mode,
            targets,
            invalid_targets,
            feed: Feed::default_for(platform, mode),
            limits: PageLimits::default(),
            thresholds: Thresholds::default(),
            sort: SortSpec::default(),
            formats: vec![ExportFormat::Csv],
            output_path: "./output".to_string(),
        }
    }

    #[test]
    fn test_parse_hashtags() {
        let (targets, invalid) =
            parse_targets(Platform::Instagram, DiscoveryMode::Hashtag, " #dog, cat ,, bad-tag, #, Dog_2 ");
        assert_eq!(targets, vec!["dog", "cat", "Dog_2"]);
        assert_eq!(invalid, vec!["bad-tag", "#"]);
    }

    #[test]
    fn test_tiktok_hashtags_lowercased_and_deduplicated() {
        let (targets, invalid) =
            parse_targets(Platform::TikTok, DiscoveryMode::Hashtag, "Bitcoin, bitcoin, Crypto");
        assert_eq!(targets, vec!["bitcoin", "crypto"]);
        assert!(invalid.is_empty());
    }

    #[test]
    fn test_parse_username() {
        let (targets, _) = parse_targets(Platform::Instagram, DiscoveryMode::Username, " @nasa ");
        assert_eq!(targets, vec!["nasa"]);
        let (targets, _) = parse_targets(Platform::Instagram, DiscoveryMode::Username, "@");
        assert!(targets.is_empty());
    }

    #[test]
    fn test_validate_request() {
        assert!(request(Platform::Instagram, DiscoveryMode::Hashtag, "dog").validate().is_ok());
        assert!(request(Platform::Instagram, DiscoveryMode::Hashtag, "bad-tag")
            .validate()
            .is_err());
        assert!(request(Platform::TikTok, DiscoveryMode::Username, "someone")
            .validate()
            .is_err());

        let mut req = request(Platform::TikTok, DiscoveryMode::Hashtag, "bitcoin");
        req.limits.max_requests = 0;
        assert!(req.validate().is_err());

        let mut req = request(Platform::TikTok, DiscoveryMode::Hashtag, "bitcoin");
        req.thresholds.max_age_days = 5000;
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_plan_carries_request_settings() {
        let req = request(Platform::Instagram, DiscoveryMode::Username, "nasa");
        let plan = req.plan(42);
        assert_eq!(plan.feed, Feed::Posts);
        assert_eq!(plan.mode, DiscoveryMode::Username);
        assert_eq!(plan.now, 42);
        assert_eq!(plan.limits, PageLimits::default());
    }
}
