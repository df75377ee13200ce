use crate::domain::model::MediaRecord;

const SECONDS_PER_DAY: i64 = 86_400;

/// User thresholds. A record is kept only if it clears all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub min_views: u64,
    pub min_likes: u64,
    pub min_comments: u64,
    pub max_age_days: u32,
    /// Records without a timestamp pass unless this is set.
    pub exclude_missing_timestamp: bool,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_views: 0,
            min_likes: 0,
            min_comments: 0,
            max_age_days: 365,
            exclude_missing_timestamp: false,
        }
    }
}

/// Thresholds bound to a fixed cutoff time.
#[derive(Debug, Clone, Copy)]
pub struct RecordFilter {
    thresholds: Thresholds,
    cutoff_ts: i64,
}

impl RecordFilter {
    pub fn new(thresholds: Thresholds, now: i64) -> Self {
        Self {
            thresholds,
            cutoff_ts: now - i64::from(thresholds.max_age_days) * SECONDS_PER_DAY,
        }
    }

    pub fn cutoff_ts(&self) -> i64 {
        self.cutoff_ts
    }

    pub fn keep(&self, record: &MediaRecord) -> bool {
        let t = &self.thresholds;
        let recent_enough = match record.created_at {
            Some(ts) => ts >= self.cutoff_ts,
            None => !t.exclude_missing_timestamp,
        };

        recent_enough
            && record.view_count >= t.min_views
            && record.like_count >= t.min_likes
            && record.comment_count >= t.min_comments
    }
}
