use crate::config::request::ScrapeRequest;
use crate::domain::model::{ExportFormat, Extraction, RunMeta, TargetFailure, TransformResult};
use crate::domain::ports::{MediaSource, Pipeline, Storage};
use crate::render::{export_file_name, render_table, to_csv, to_json, to_tsv, to_zip_bundle};
use crate::utils::error::Result;

/// Scrapes every target of a request through one media source, then sorts,
/// renders and exports the combined records.
pub struct ScrapePipeline<S: Storage, M: MediaSource> {
    storage: S,
    source: M,
    request: ScrapeRequest,
    now: i64,
}

impl<S: Storage, M: MediaSource> ScrapePipeline<S, M> {
    pub fn new(storage: S, source: M, request: ScrapeRequest) -> Self {
        Self {
            storage,
            source,
            request,
            now: chrono::Utc::now().timestamp(),
        }
    }

    /// Pins the clock the age threshold is measured from.
    pub fn with_now(mut self, now: i64) -> Self {
        self.now = now;
        self
    }

    fn initial_meta(&self) -> RunMeta {
        RunMeta {
            platform: self.source.platform().to_string(),
            method: self.request.mode.as_str().to_string(),
            targets: self.request.targets.clone(),
            effective_feed: self.request.feed.as_str().to_string(),
            requested: self.request.limits.max_posts,
            ..RunMeta::default()
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, M: MediaSource> Pipeline for ScrapePipeline<S, M> {
    async fn extract(&self) -> Result<Extraction> {
        let plan = self.request.plan(self.now);
        let mut meta = self.initial_meta();
        let mut records = Vec::new();

        for target in &self.request.targets {
            tracing::info!(
                platform = %self.source.platform(),
                target_name = %target,
                feed = plan.feed.as_str(),
                "Collecting target"
            );

            match self.source.collect(target, &plan).await {
                Ok(outcome) => {
                    tracing::info!(
                        target_name = %target,
                        fetched = outcome.stats.fetched,
                        kept = outcome.records.len(),
                        requests = outcome.stats.requests,
                        "Target done"
                    );
                    meta.absorb(&outcome);
                    records.extend(outcome.records);
                }
                Err(e) => {
                    tracing::warn!(
                        target_name = %target,
                        category = ?e.category(),
                        "Target failed: {}",
                        e
                    );
                    eprintln!("⚠️  {}: {}", target, e.user_friendly_message());
                    meta.failures.push(TargetFailure {
                        target: target.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }

        Ok(Extraction { records, meta })
    }

    async fn transform(&self, data: Extraction) -> Result<TransformResult> {
        let Extraction { mut records, meta } = data;
        self.request.sort.apply(&mut records);

        Ok(TransformResult {
            table: render_table(&records),
            csv_output: to_csv(&records)?,
            tsv_output: to_tsv(&records)?,
            json_output: to_json(&records)?,
            records,
            meta,
        })
    }

    async fn load(&self, result: &TransformResult) -> Result<Vec<String>> {
        if result.records.is_empty() {
            tracing::info!("Nothing to export");
            return Ok(Vec::new());
        }

        let mut written = Vec::new();
        for format in &self.request.formats {
            let file_name =
                export_file_name(self.source.platform(), &self.request.targets, format.extension());
            let data = match format {
                ExportFormat::Csv => result.csv_output.clone().into_bytes(),
                ExportFormat::Tsv => result.tsv_output.clone().into_bytes(),
                ExportFormat::Json => result.json_output.clone().into_bytes(),
                ExportFormat::Zip => {
                    to_zip_bundle(&result.csv_output, &result.json_output, &result.meta)?
                }
            };

            tracing::debug!(file = %file_name, bytes = data.len(), "Writing export");
            written.push(self.storage.write_file(&file_name, &data).await?);
        }

        Ok(written)
    }
}
