//! HikerAPI client and the Instagram media source built on it.
//!
//! Hashtag feeds page with `max_id`, user feeds with `end_cursor`. Chunk
//! endpoints may answer either an object with `items` or a `[items, cursor]`
//! pair; the flattener handles both.
use crate::clients::http::{ApiAuth, ApiClient};
use crate::core::collector::collect_pages;
use crate::core::filter::RecordFilter;
use crate::core::flatten::flatten_items;
use crate::core::normalize::NormalizeContext;
use crate::domain::model::{
    DiscoveryMode, Feed, Platform, ProfileSummary, TargetOutcome, UserDetails,
};
use crate::domain::ports::{CollectPlan, MediaSource, PageFetcher, PageLimits};
use crate::utils::error::{Result, ScoutError};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.hikerapi.com";

const USER_BY_USERNAME: &str = "/v1/user/by/username";
const USER_MEDIAS_CHUNK: &str = "/v1/user/medias/chunk";
const USER_CLIPS_CHUNK: &str = "/v1/user/clips/chunk";
const HASHTAG_TOP_CHUNK: &str = "/v1/hashtag/medias/top/chunk";
const HASHTAG_RECENT_CHUNK: &str = "/v1/hashtag/medias/top/recent/chunk";
const HASHTAG_CLIPS_CHUNK: &str = "/v1/hashtag/medias/clips/chunk";

#[derive(Debug, Clone)]
pub struct HikerClient {
    api: ApiClient,
}

impl HikerClient {
    pub fn new(base_url: &str, token: &str, timeout: Duration) -> Result<Self> {
        let api = ApiClient::new(
            base_url,
            ApiAuth::Header("x-access-key", token.trim().to_string()),
            timeout,
        )?;
        Ok(Self { api })
    }

    /// Raw user object, unwrapped from the `user` envelope when present.
    pub async fn user_by_username(&self, username: &str) -> Result<Map<String, Value>> {
        let resp = self
            .api
            .get_json(USER_BY_USERNAME, &[("username", username.to_string())])
            .await?;

        let user = match resp {
            Value::Object(mut obj) => match obj.remove("user") {
                Some(Value::Object(user)) => user,
                Some(other) => {
                    obj.insert("user".to_string(), other);
                    obj
                }
                None => obj,
            },
            Value::Array(mut list) if !list.is_empty() => match list.swap_remove(0) {
                Value::Object(user) => user,
                _ => return Err(unexpected(USER_BY_USERNAME, "user list holds no object")),
            },
            _ => return Err(unexpected(USER_BY_USERNAME, "expected a user object")),
        };

        if user.is_empty() {
            return Err(ScoutError::NotFound {
                what: format!("Instagram user @{}", username),
            });
        }
        Ok(user)
    }

    pub async fn resolve_profile(&self, username: &str) -> Result<ProfileSummary> {
        let user = self.user_by_username(username).await?;
        profile_from_user(username, &user)
    }

    pub async fn user_medias_chunk(&self, user_id: &str, end_cursor: Option<&str>) -> Result<Value> {
        self.api
            .get_json(USER_MEDIAS_CHUNK, &user_params(user_id, end_cursor))
            .await
    }

    pub async fn user_clips_chunk(&self, user_id: &str, end_cursor: Option<&str>) -> Result<Value> {
        self.api
            .get_json(USER_CLIPS_CHUNK, &user_params(user_id, end_cursor))
            .await
    }

    pub async fn hashtag_chunk(&self, feed: Feed, name: &str, max_id: Option<&str>) -> Result<Value> {
        let path = hashtag_endpoint(feed)?;
        let mut params = vec![("name", name.to_string())];
        if let Some(max_id) = max_id {
            params.push(("max_id", max_id.to_string()));
        }
        self.api.get_json(path, &params).await
    }

    /// Profile facts plus one chunk each of posts and clips.
    pub async fn user_details(&self, username: &str) -> Result<UserDetails> {
        let user = self.user_by_username(username).await?;
        let profile = profile_from_user(username, &user)?;

        let posts = self.user_medias_chunk(&profile.user_id, None).await?;
        let reels = self.user_clips_chunk(&profile.user_id, None).await?;

        let field = |key: &str| match user.get(key) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => "N/A".to_string(),
            Some(other) => other.to_string(),
        };

        Ok(UserDetails {
            profile: vec![
                ("Username".to_string(), field("username")),
                ("Full Name".to_string(), field("full_name")),
                ("Followers".to_string(), field("follower_count")),
                ("Following".to_string(), field("following_count")),
                ("Posts".to_string(), field("media_count")),
                ("Verified".to_string(), field("is_verified")),
                ("Private".to_string(), field("is_private")),
                ("Bio".to_string(), field("biography")),
                ("Profile URL".to_string(), profile.profile_url.clone()),
            ],
            posts_count: flatten_items(&posts, Platform::Instagram.items_key()).len(),
            reels_count: flatten_items(&reels, Platform::Instagram.items_key()).len(),
        })
    }
}

fn profile_from_user(username: &str, user: &Map<String, Value>) -> Result<ProfileSummary> {
    let user_id = ["pk", "id", "user_id"]
        .iter()
        .find_map(|key| match user.get(*key) {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        })
        .ok_or_else(|| ScoutError::NotFound {
            what: format!("user id for @{}", username),
        })?;

    Ok(ProfileSummary {
        username: username.to_string(),
        user_id,
        follower_count: user
            .get("follower_count")
            .and_then(Value::as_u64)
            .unwrap_or(0),
        profile_url: format!("https://www.instagram.com/{}/", username),
    })
}

fn user_params(user_id: &str, end_cursor: Option<&str>) -> Vec<(&'static str, String)> {
    let mut params = vec![("user_id", user_id.to_string())];
    if let Some(cursor) = end_cursor {
        params.push(("end_cursor", cursor.to_string()));
    }
    params
}

fn hashtag_endpoint(feed: Feed) -> Result<&'static str> {
    match feed {
        Feed::Top => Ok(HASHTAG_TOP_CHUNK),
        Feed::Recent => Ok(HASHTAG_RECENT_CHUNK),
        Feed::Clips => Ok(HASHTAG_CLIPS_CHUNK),
        other => Err(ScoutError::InvalidConfigValueError {
            field: "feed".to_string(),
            value: other.as_str().to_string(),
            reason: "Not a single Instagram hashtag feed".to_string(),
        }),
    }
}

fn unexpected(endpoint: &str, message: &str) -> ScoutError {
    ScoutError::UnexpectedResponse {
        endpoint: endpoint.to_string(),
        message: message.to_string(),
    }
}

struct HashtagFeed<'a> {
    client: &'a HikerClient,
    feed: Feed,
    name: &'a str,
    endpoint: &'static str,
}

#[async_trait]
impl PageFetcher for HashtagFeed<'_> {
    fn platform(&self) -> Platform {
        Platform::Instagram
    }

    fn endpoint(&self) -> &str {
        self.endpoint
    }

    async fn fetch(&self, cursor: Option<&str>) -> Result<Value> {
        self.client.hashtag_chunk(self.feed, self.name, cursor).await
    }
}

struct UserFeed<'a> {
    client: &'a HikerClient,
    clips: bool,
    user_id: &'a str,
}

#[async_trait]
impl PageFetcher for UserFeed<'_> {
    fn platform(&self) -> Platform {
        Platform::Instagram
    }

    fn endpoint(&self) -> &str {
        if self.clips {
            USER_CLIPS_CHUNK
        } else {
            USER_MEDIAS_CHUNK
        }
    }

    async fn fetch(&self, cursor: Option<&str>) -> Result<Value> {
        if self.clips {
            self.client.user_clips_chunk(self.user_id, cursor).await
        } else {
            self.client.user_medias_chunk(self.user_id, cursor).await
        }
    }
}

pub struct InstagramSource {
    client: HikerClient,
}

impl InstagramSource {
    pub fn new(client: HikerClient) -> Self {
        Self { client }
    }

    async fn collect_hashtag_feed(
        &self,
        tag: &str,
        feed: Feed,
        limits: &PageLimits,
        filter: &RecordFilter,
    ) -> Result<TargetOutcome> {
        let fetcher = HashtagFeed {
            client: &self.client,
            feed,
            name: tag,
            endpoint: hashtag_endpoint(feed)?,
        };
        let ctx = NormalizeContext::for_hashtag(tag, feed.source_label());
        let (records, stats) = collect_pages(&fetcher, limits, filter, &ctx).await?;

        Ok(TargetOutcome {
            target: tag.to_string(),
            records,
            stats,
            effective_feed: feed.as_str().to_string(),
            fallback_used: false,
            profile: None,
        })
    }

    async fn collect_auto(
        &self,
        tag: &str,
        limits: &PageLimits,
        filter: &RecordFilter,
    ) -> Result<TargetOutcome> {
        let mut outcome = self.collect_hashtag_feed(tag, Feed::Top, limits, filter).await?;
        if outcome.records.len() >= limits.max_posts {
            return Ok(outcome);
        }

        let remaining = PageLimits {
            max_posts: limits.max_posts - outcome.records.len(),
            ..*limits
        };
        tracing::info!(
            tag,
            kept = outcome.records.len(),
            remaining = remaining.max_posts,
            "Top feed short, falling back to recent"
        );
        let recent = self
            .collect_hashtag_feed(tag, Feed::Recent, &remaining, filter)
            .await?;

        outcome.records.extend(recent.records);
        outcome.stats = outcome.stats.merge(recent.stats);
        outcome.effective_feed = "top+recent".to_string();
        outcome.fallback_used = true;
        Ok(outcome)
    }

    async fn collect_user(
        &self,
        username: &str,
        feed: Feed,
        limits: &PageLimits,
        filter: &RecordFilter,
    ) -> Result<TargetOutcome> {
        let profile = self.client.resolve_profile(username).await?;
        tracing::info!(
            username,
            user_id = %profile.user_id,
            followers = profile.follower_count,
            "Resolved Instagram profile"
        );

        let fetcher = UserFeed {
            client: &self.client,
            clips: feed == Feed::UserClips,
            user_id: &profile.user_id,
        };
        let ctx = NormalizeContext::for_profile(profile.clone(), feed.source_label());
        let (records, stats) = collect_pages(&fetcher, limits, filter, &ctx).await?;

        Ok(TargetOutcome {
            target: username.to_string(),
            records,
            stats,
            effective_feed: feed.as_str().to_string(),
            fallback_used: false,
            profile: Some(profile),
        })
    }
}

#[async_trait]
impl MediaSource for InstagramSource {
    fn platform(&self) -> Platform {
        Platform::Instagram
    }

    async fn collect(&self, target: &str, plan: &CollectPlan) -> Result<TargetOutcome> {
        let filter = RecordFilter::new(plan.thresholds, plan.now);
        match (plan.mode, plan.feed) {
            (DiscoveryMode::Hashtag, Feed::Auto) => self.collect_auto(target, &plan.limits, &filter).await,
            (DiscoveryMode::Hashtag, feed @ (Feed::Top | Feed::Recent | Feed::Clips)) => {
                self.collect_hashtag_feed(target, feed, &plan.limits, &filter)
                    .await
            }
            (DiscoveryMode::Username, feed @ (Feed::Posts | Feed::UserClips)) => {
                self.collect_user(target, feed, &plan.limits, &filter).await
            }
            (mode, feed) => Err(ScoutError::InvalidConfigValueError {
                field: "feed".to_string(),
                value: feed.as_str().to_string(),
                reason: format!("Not an Instagram {} feed", mode.as_str()),
            }),
        }
    }
}
