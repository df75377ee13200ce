use crate::domain::model::{MediaRecord, Platform, ProfileSummary, RawItem};
use serde_json::Value;

/// Per-feed facts that are not part of the item itself.
#[derive(Debug, Clone, Default)]
pub struct NormalizeContext {
    /// Stored as `#tag`.
    pub hashtag: Option<String>,
    pub source: String,
    pub profile: Option<ProfileSummary>,
}

impl NormalizeContext {
    pub fn for_hashtag(tag: &str, source: &str) -> Self {
        Self {
            hashtag: Some(format!("#{}", tag.trim_start_matches('#'))),
            source: source.to_string(),
            profile: None,
        }
    }

    pub fn for_profile(profile: ProfileSummary, source: &str) -> Self {
        Self {
            hashtag: None,
            source: source.to_string(),
            profile: Some(profile),
        }
    }
}

pub fn normalize(platform: Platform, item: &RawItem, ctx: &NormalizeContext) -> MediaRecord {
    match platform {
        Platform::Instagram => normalize_instagram(item, ctx),
        Platform::TikTok => normalize_tiktok(item, ctx),
    }
}

pub fn normalize_instagram(item: &RawItem, ctx: &NormalizeContext) -> MediaRecord {
    let user = item.get("user").and_then(Value::as_object);
    let username = user
        .and_then(|u| text(u.get("username")))
        .or_else(|| ctx.profile.as_ref().map(|p| p.username.clone()));
    let code = text(item.get("code"));

    // play_count covers reels; view_count is often 0 or disabled
    let view_count = ["play_count", "view_count"]
        .iter()
        .find_map(|key| item.get(*key).and_then(count_opt))
        .unwrap_or(0);

    let follower_count = user
        .and_then(|u| u.get("follower_count"))
        .and_then(count_opt)
        .or_else(|| ctx.profile.as_ref().map(|p| p.follower_count))
        .unwrap_or(0);

    MediaRecord {
        platform: Platform::Instagram,
        hashtag: ctx.hashtag.clone(),
        profile_url: username
            .as_ref()
            .map(|u| format!("https://www.instagram.com/{}/", u)),
        username,
        view_count,
        like_count: count(item.get("like_count")),
        comment_count: count(item.get("comment_count")),
        post_url: code
            .as_ref()
            .map(|c| format!("https://www.instagram.com/p/{}/", c)),
        region: item
            .get("location")
            .and_then(Value::as_object)
            .and_then(|loc| text(loc.get("name"))),
        follower_count,
        post_id: text(item.get("pk")).or_else(|| text(item.get("id"))),
        created_at: ["taken_at_ts", "taken_at_timestamp", "taken_at"]
            .iter()
            .find_map(|key| item.get(*key).and_then(timestamp)),
        metrics_disabled: item
            .get("like_and_view_counts_disabled")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        source: ctx.source.clone(),
    }
}

pub fn normalize_tiktok(item: &RawItem, ctx: &NormalizeContext) -> MediaRecord {
    let author = item.get("author").and_then(Value::as_object);
    let stats = item.get("stats").and_then(Value::as_object);
    let author_stats = item.get("authorStats").and_then(Value::as_object);

    let username = author.and_then(|a| text(a.get("uniqueId")));
    let post_id = text(item.get("id"));
    let stat = |key: &str| count(stats.and_then(|s| s.get(key)));

    MediaRecord {
        platform: Platform::TikTok,
        hashtag: ctx.hashtag.clone(),
        post_url: match (&username, &post_id) {
            (Some(u), Some(id)) => Some(format!("https://www.tiktok.com/@{}/video/{}", u, id)),
            _ => None,
        },
        profile_url: username
            .as_ref()
            .map(|u| format!("https://www.tiktok.com/@{}", u)),
        username,
        view_count: stat("playCount"),
        like_count: stat("diggCount"),
        comment_count: stat("commentCount"),
        region: item
            .get("poi")
            .and_then(Value::as_object)
            .and_then(|poi| text(poi.get("name"))),
        follower_count: count(author_stats.and_then(|s| s.get("followerCount"))),
        post_id,
        created_at: item.get("createTime").and_then(timestamp),
        metrics_disabled: false,
        source: ctx.source.clone(),
    }
}

fn text(v: Option<&Value>) -> Option<String> {
    match v? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Non-negative integer from a number or a numeric string.
fn count_opt(v: &Value) -> Option<u64> {
    match v {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
}

fn count(v: Option<&Value>) -> u64 {
    v.and_then(count_opt).unwrap_or(0)
}

/// Unix seconds from an integer, numeric string or RFC 3339 string. Zero and
/// negative values count as missing.
fn timestamp(v: &Value) -> Option<i64> {
    let ts = match v {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok().or_else(|| {
            chrono::DateTime::parse_from_rfc3339(s.trim())
                .ok()
                .map(|dt| dt.timestamp())
        }),
        _ => None,
    }?;
    (ts > 0).then_some(ts)
}
