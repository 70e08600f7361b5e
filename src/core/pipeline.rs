use crate::core::campaign_url::{check_alignment, extract_utm};
use crate::core::classifier::ChannelClassifier;
use crate::core::{ConfigProvider, Pipeline, Storage, TransformResult};
use crate::domain::model::{
    Alignment, Channel, ClassificationSummary, ClassifiedRecord, ColumnMapping, VisitRecord,
};
use crate::utils::error::{EtlError, Result};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use zip::write::{FileOptions, ZipWriter};

pub const CLASSIFIED_FILE: &str = "classified.csv";
pub const SUMMARY_FILE: &str = "summary.json";
pub const ARCHIVE_FILE: &str = "classification_output.zip";

const OUTPUT_HEADER: [&str; 7] = [
    "row",
    "source",
    "medium",
    "campaign",
    "channel",
    "expected_channel",
    "alignment",
];

/// Column positions resolved from the CSV header row.
struct ColumnIndex {
    source: Option<usize>,
    medium: Option<usize>,
    campaign: Option<usize>,
    url: Option<usize>,
    expected_channel: Option<usize>,
}

impl ColumnIndex {
    fn resolve(headers: &csv::StringRecord, mapping: &ColumnMapping) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name.trim()))
        };
        let index = Self {
            source: find(&mapping.source),
            medium: find(&mapping.medium),
            campaign: find(&mapping.campaign),
            url: find(&mapping.url),
            expected_channel: find(&mapping.expected_channel),
        };

        if index.source.is_none() && index.medium.is_none() && index.url.is_none() {
            return Err(EtlError::ProcessingError {
                message: format!(
                    "input has none of the columns '{}', '{}' or '{}'",
                    mapping.source, mapping.medium, mapping.url
                ),
            });
        }
        Ok(index)
    }

    fn field(record: &csv::StringRecord, index: Option<usize>) -> String {
        index
            .and_then(|i| record.get(i))
            .map(|v| v.trim().to_string())
            .unwrap_or_default()
    }

    fn optional(record: &csv::StringRecord, index: Option<usize>) -> Option<String> {
        Some(Self::field(record, index)).filter(|v| !v.is_empty())
    }
}

/// Reads visits from a CSV file, assigns each a channel and writes the
/// classified rows plus a summary.
pub struct CsvClassificationPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    classifier: Arc<ChannelClassifier>,
}

impl<S: Storage, C: ConfigProvider> CsvClassificationPipeline<S, C> {
    pub fn new(storage: S, config: C, classifier: Arc<ChannelClassifier>) -> Self {
        Self {
            storage,
            config,
            classifier,
        }
    }

    pub fn classifier(&self) -> &ChannelClassifier {
        &self.classifier
    }

    fn output_file(&self, name: &str) -> String {
        Path::new(self.config.output_path())
            .join(name)
            .to_string_lossy()
            .into_owned()
    }

    /// UTM values for a record: its own columns, or the tags on its URL
    /// when both source and medium are blank.
    fn resolve_attributes(&self, record: &VisitRecord) -> Result<(String, String, String)> {
        let blank = record.source.is_empty() && record.medium.is_empty();
        match record.url.as_deref() {
            Some(url) if blank => {
                let utm = extract_utm(url)?;
                Ok((utm.source, utm.medium, utm.campaign))
            }
            _ => Ok((
                record.source.clone(),
                record.medium.clone(),
                record.campaign.clone(),
            )),
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for CsvClassificationPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<VisitRecord>> {
        let input_path = self.config.input_path();
        tracing::debug!("📥 Reading visits from: {}", input_path);

        let data = self.storage.read_file(input_path).await?;
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(data.as_slice());

        let headers = reader.headers()?.clone();
        let index = ColumnIndex::resolve(&headers, self.config.columns())?;

        let mut records = Vec::new();
        for (i, row) in reader.records().enumerate() {
            let row = row?;
            records.push(VisitRecord {
                row: i + 1,
                source: ColumnIndex::field(&row, index.source),
                medium: ColumnIndex::field(&row, index.medium),
                campaign: ColumnIndex::field(&row, index.campaign),
                url: ColumnIndex::optional(&row, index.url),
                expected_channel: ColumnIndex::optional(&row, index.expected_channel),
            });
        }

        tracing::debug!("Parsed {} rows (columns: {:?})", records.len(), headers);
        Ok(records)
    }

    async fn transform(&self, data: Vec<VisitRecord>) -> Result<TransformResult> {
        let mut summary = ClassificationSummary {
            generated_at: chrono::Utc::now().to_rfc3339(),
            total_rows: data.len(),
            dataset_entries: self.classifier.dataset().len(),
            ..ClassificationSummary::default()
        };
        let mut channel_counts: BTreeMap<String, usize> = BTreeMap::new();
        let mut classified_records = Vec::with_capacity(data.len());

        for record in data {
            let (source, medium, campaign) = match self.resolve_attributes(&record) {
                Ok(attributes) => attributes,
                Err(e) => {
                    tracing::warn!("⚠️ Skipping row {}: {}", record.row, e);
                    summary.skipped_rows += 1;
                    continue;
                }
            };

            let channel = self.classifier.classify(&source, &medium, &campaign);

            // 無法辨識的預期渠道視為沒有預期
            let expected = record
                .expected_channel
                .as_deref()
                .and_then(|label| match label.parse::<Channel>() {
                    Ok(channel) => Some(channel),
                    Err(e) => {
                        tracing::debug!("Row {}: {}", record.row, e);
                        None
                    }
                });
            let alignment = check_alignment(channel, expected);

            *channel_counts.entry(channel.to_string()).or_insert(0) += 1;
            if channel == Channel::Unassigned {
                summary.unassigned_rows += 1;
            }
            if matches!(alignment, Alignment::Mismatch | Alignment::Unassigned) {
                summary.mismatched_rows += 1;
            }

            classified_records.push(ClassifiedRecord {
                row: record.row,
                source,
                medium,
                campaign,
                channel,
                expected_channel: record.expected_channel,
                alignment,
            });
        }

        summary.classified_rows = classified_records.len();
        summary.channel_counts = channel_counts;

        // 產生 CSV 輸出
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        writer.write_record(OUTPUT_HEADER)?;
        for record in &classified_records {
            writer.serialize(record)?;
        }
        let bytes = writer.into_inner().map_err(|e| EtlError::ProcessingError {
            message: format!("failed to flush CSV output: {}", e),
        })?;
        let csv_output = String::from_utf8(bytes).map_err(|e| EtlError::ProcessingError {
            message: format!("CSV output is not valid UTF-8: {}", e),
        })?;

        Ok(TransformResult {
            classified_records,
            summary,
            csv_output,
        })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let summary_json = serde_json::to_string_pretty(&result.summary)?;

        if !self.config.compress_output() {
            self.storage
                .write_file(&self.output_file(CLASSIFIED_FILE), result.csv_output.as_bytes())
                .await?;
            self.storage
                .write_file(&self.output_file(SUMMARY_FILE), summary_json.as_bytes())
                .await?;
            tracing::debug!("Wrote {} and {}", CLASSIFIED_FILE, SUMMARY_FILE);
            return Ok(self.config.output_path().to_string());
        }

        // 打包成 ZIP
        let zip_data = {
            let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

            zip.start_file::<_, ()>(CLASSIFIED_FILE, FileOptions::default())?;
            zip.write_all(result.csv_output.as_bytes())?;

            zip.start_file::<_, ()>(SUMMARY_FILE, FileOptions::default())?;
            zip.write_all(summary_json.as_bytes())?;

            let cursor = zip.finish()?;
            cursor.into_inner()
        };

        let archive_path = self.output_file(ARCHIVE_FILE);
        tracing::debug!("Writing ZIP file ({} bytes) to {}", zip_data.len(), archive_path);
        self.storage.write_file(&archive_path, &zip_data).await?;

        Ok(archive_path)
    }
}
