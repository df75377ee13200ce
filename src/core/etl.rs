use crate::domain::model::RunMeta;
use crate::domain::ports::Pipeline;
use crate::utils::error::Result;

pub const NO_MATCHES: &str = "No results matched your filters.";

/// What a finished run produced.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub meta: RunMeta,
    /// Rendered table, or `NO_MATCHES` when nothing passed the filters.
    pub table: String,
    pub outputs: Vec<String>,
    pub rows: usize,
}

impl RunReport {
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }
}

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub async fn run(&self) -> Result<RunReport> {
        tracing::info!("Starting scrape");

        let extraction = self.pipeline.extract().await?;
        tracing::info!(
            records = extraction.records.len(),
            fetched = extraction.meta.total_fetched,
            requests = extraction.meta.total_requests,
            failures = extraction.meta.failures.len(),
            "Extracted records"
        );

        let result = self.pipeline.transform(extraction).await?;
        let rows = result.records.len();

        if rows == 0 {
            tracing::info!("No records passed the filters, skipping export");
            return Ok(RunReport {
                meta: result.meta,
                table: NO_MATCHES.to_string(),
                outputs: Vec::new(),
                rows,
            });
        }

        let outputs = self.pipeline.load(&result).await?;
        for path in &outputs {
            tracing::info!(%path, "Export saved");
        }

        Ok(RunReport {
            meta: result.meta,
            table: result.table,
            outputs,
            rows,
        })
    }
}
