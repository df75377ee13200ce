use crate::core::filter::RecordFilter;
use crate::core::flatten::{flatten_items, next_cursor};
use crate::core::normalize::{normalize, NormalizeContext};
use crate::domain::model::{FeedStats, MediaRecord};
use crate::domain::ports::{PageFetcher, PageLimits};
use crate::utils::error::{Result, ScoutError};

/// Pages through one feed: fetch, flatten, normalize, filter.
///
/// Stops when `max_posts` records were kept, after `max_requests` pages, when
/// a page comes back empty or without a cursor, or when a page is malformed.
/// HTTP and transport errors are returned to the caller.
pub async fn collect_pages<F>(
    fetcher: &F,
    limits: &PageLimits,
    filter: &RecordFilter,
    ctx: &NormalizeContext,
) -> Result<(Vec<MediaRecord>, FeedStats)>
where
    F: PageFetcher + ?Sized,
{
    let platform = fetcher.platform();
    let mut kept_rows = Vec::new();
    let mut stats = FeedStats {
        endpoint: fetcher.endpoint().to_string(),
        ..FeedStats::default()
    };
    let mut cursor: Option<String> = None;

    while stats.kept < limits.max_posts && stats.requests < limits.max_requests {
        let page = fetcher.fetch(cursor.as_deref()).await;
        stats.requests += 1;

        let payload = match page {
            Ok(payload) => payload,
            Err(ScoutError::MalformedPayload { endpoint, message }) => {
                tracing::warn!(
                    page = stats.requests,
                    %endpoint,
                    %message,
                    "Skipping malformed page"
                );
                break;
            }
            Err(e) => return Err(e),
        };

        let items = flatten_items(&payload, platform.items_key());
        stats.fetched += items.len();

        tracing::info!(
            page = stats.requests,
            source = %ctx.source,
            items = items.len(),
            cursor_in = cursor.is_some(),
            "Fetched page"
        );

        for item in &items {
            if stats.kept >= limits.max_posts {
                break;
            }
            let record = normalize(platform, item, ctx);
            if filter.keep(&record) {
                kept_rows.push(record);
                stats.kept += 1;
            }
        }

        cursor = next_cursor(platform, &payload);
        if cursor.is_none() || items.is_empty() {
            break;
        }
    }

    stats.cursor = cursor;
    Ok((kept_rows, stats))
}
