pub mod cli;
pub mod toml_config;

use crate::core::ConfigProvider;
use crate::domain::model::ColumnMapping;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_file_extensions, validate_non_empty_string, validate_path, Validate,
};

#[cfg(feature = "cli")]
use crate::core::dataset::DatasetSource;
#[cfg(feature = "cli")]
use crate::domain::model::Channel;
#[cfg(feature = "cli")]
use crate::utils::validation::validate_dataset_location;
#[cfg(feature = "cli")]
use clap::{Args, Parser, Subcommand};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "channel-etl")]
#[command(about = "Assign GA4 default channel groups to traffic attributes")]
pub struct CliConfig {
    /// Reference dataset: a JSON file path or an http(s) URL (default: bundled)
    #[arg(long, global = true)]
    pub dataset: Option<String>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Classify one source / medium / campaign triple
    Classify {
        #[arg(long, default_value = "")]
        source: String,
        #[arg(long, default_value = "")]
        medium: String,
        #[arg(long, default_value = "")]
        campaign: String,
        /// Channel you expected; reports whether the prediction agrees
        #[arg(long)]
        expected: Option<Channel>,
        /// Print the matching rule's description and condition
        #[arg(long)]
        explain: bool,
    },
    /// Read the UTM tags off a landing URL and classify them
    AnalyzeUrl {
        url: String,
        #[arg(long)]
        expected: Option<Channel>,
    },
    /// List candidate sources, optionally for one channel
    SuggestSources {
        #[arg(long)]
        channel: Option<Channel>,
        #[arg(long, default_value = "")]
        filter: String,
    },
    /// List candidate mediums for a source or a channel
    SuggestMediums {
        #[arg(long, default_value = "")]
        source: String,
        #[arg(long)]
        channel: Option<Channel>,
        #[arg(long, default_value = "")]
        filter: String,
    },
    /// Build a UTM-tagged campaign URL
    BuildUrl(BuildUrlArgs),
    /// List every channel with its description and condition
    Channels,
    /// Classify every row of a CSV file
    Batch(BatchArgs),
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Args)]
pub struct BuildUrlArgs {
    pub base_url: String,
    #[arg(long, default_value = "")]
    pub source: String,
    #[arg(long, default_value = "")]
    pub medium: String,
    #[arg(long, default_value = "")]
    pub campaign: String,
    #[arg(long)]
    pub content: Option<String>,
    #[arg(long)]
    pub term: Option<String>,
    #[arg(long)]
    pub id: Option<String>,
    #[arg(long)]
    pub source_platform: Option<String>,
    #[arg(long)]
    pub creative_format: Option<String>,
    #[arg(long)]
    pub marketing_tactic: Option<String>,
    /// Lowercase every value before encoding
    #[arg(long)]
    pub lowercase: bool,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Args)]
pub struct BatchArgs {
    #[arg(long)]
    pub input: String,
    #[arg(long, default_value = "./output")]
    pub output: String,
    /// Bundle the results into a ZIP archive
    #[arg(long)]
    pub compress: bool,
    #[arg(long, default_value = "source")]
    pub source_column: String,
    #[arg(long, default_value = "medium")]
    pub medium_column: String,
    #[arg(long, default_value = "campaign")]
    pub campaign_column: String,
    #[arg(long, default_value = "url")]
    pub url_column: String,
    #[arg(long, default_value = "expected_channel")]
    pub expected_column: String,
}

#[cfg(feature = "cli")]
impl BatchArgs {
    pub fn into_job(self) -> BatchJob {
        BatchJob {
            input_path: self.input,
            output_path: self.output,
            columns: ColumnMapping {
                source: self.source_column,
                medium: self.medium_column,
                campaign: self.campaign_column,
                url: self.url_column,
                expected_channel: self.expected_column,
            },
            compress: self.compress,
        }
    }
}

#[cfg(feature = "cli")]
impl CliConfig {
    pub fn dataset_source(&self) -> DatasetSource {
        match self.dataset.as_deref().map(str::trim) {
            Some(location) if !location.is_empty() => DatasetSource::from_location(location),
            _ => DatasetSource::Bundled,
        }
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if let Some(location) = &self.dataset {
            validate_dataset_location("dataset", location)?;
        }
        if let Command::Batch(args) = &self.command {
            args.clone().into_job().validate()?;
        }
        Ok(())
    }
}

/// A resolved batch run: where to read, where to write, which columns to use.
#[derive(Debug, Clone)]
pub struct BatchJob {
    pub input_path: String,
    pub output_path: String,
    pub columns: ColumnMapping,
    pub compress: bool,
}

impl ConfigProvider for BatchJob {
    fn input_path(&self) -> &str {
        &self.input_path
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn columns(&self) -> &ColumnMapping {
        &self.columns
    }

    fn compress_output(&self) -> bool {
        self.compress
    }
}

impl Validate for BatchJob {
    fn validate(&self) -> Result<()> {
        validate_path("input", &self.input_path)?;
        validate_file_extensions("input", &[self.input_path.clone()], &["csv"])?;
        validate_path("output", &self.output_path)?;
        validate_non_empty_string("source_column", &self.columns.source)?;
        validate_non_empty_string("medium_column", &self.columns.medium)?;
        Ok(())
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_parse_classify() {
        let config = CliConfig::parse_from([
            "channel-etl",
            "classify",
            "--source",
            "google",
            "--medium",
            "cpc",
            "--expected",
            "paid search",
            "--explain",
        ]);
        assert_eq!(config.dataset_source(), DatasetSource::Bundled);

        match config.command {
            Command::Classify {
                source,
                medium,
                campaign,
                expected,
                explain,
            } => {
                assert_eq!(source, "google");
                assert_eq!(medium, "cpc");
                assert_eq!(campaign, "");
                assert_eq!(expected, Some(Channel::PaidSearch));
                assert!(explain);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_channel_is_rejected() {
        let result = CliConfig::try_parse_from([
            "channel-etl",
            "suggest-sources",
            "--channel",
            "Carrier Pigeon",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_dataset_flag_after_subcommand() {
        let config = CliConfig::parse_from([
            "channel-etl",
            "suggest-mediums",
            "--source",
            "bing",
            "--dataset",
            "https://cdn.example.com/map.json",
        ]);
        assert_eq!(
            config.dataset_source(),
            DatasetSource::Url("https://cdn.example.com/map.json".to_string())
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_batch_job_from_args() {
        let config = CliConfig::parse_from([
            "channel-etl",
            "batch",
            "--input",
            "visits.csv",
            "--source-column",
            "utm_source",
            "--compress",
        ]);
        assert!(config.validate().is_ok());

        let Command::Batch(args) = config.command else {
            panic!("expected batch command");
        };
        let job = args.into_job();
        assert_eq!(job.input_path(), "visits.csv");
        assert_eq!(job.output_path(), "./output");
        assert_eq!(job.columns().source, "utm_source");
        assert_eq!(job.columns().medium, "medium");
        assert!(job.compress_output());
    }

    #[test]
    fn test_batch_requires_csv_input() {
        let config = CliConfig::parse_from(["channel-etl", "batch", "--input", "visits.xlsx"]);
        assert!(config.validate().is_err());
    }
}
