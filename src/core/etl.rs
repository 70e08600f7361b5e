use crate::core::Pipeline;
use crate::domain::model::ClassificationSummary;
use crate::utils::error::Result;

/// Outcome of one engine run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub output_path: String,
    pub summary: ClassificationSummary,
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
        tracing::info!("🚀 Starting classification run");

        // Extract
        let raw_data = self.pipeline.extract().await?;
        tracing::info!("📥 Extracted {} rows", raw_data.len());

        // Transform
        let transformed = self.pipeline.transform(raw_data).await?;
        let summary = transformed.summary.clone();
        tracing::info!(
            "🔄 Classified {} rows ({} skipped, {} unassigned, {} mismatched)",
            summary.classified_rows,
            summary.skipped_rows,
            summary.unassigned_rows,
            summary.mismatched_rows
        );
        if summary.dataset_entries == 0 {
            tracing::warn!("⚠️ Reference dataset is empty; known-site rules never matched");
        }

        // Load
        let output_path = self.pipeline.load(transformed).await?;
        tracing::info!("💾 Output saved to: {}", output_path);

        Ok(RunReport {
            output_path,
            summary,
        })
    }
}
