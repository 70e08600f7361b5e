use crate::core::dataset::DatasetSource;
use crate::core::ConfigProvider;
use crate::domain::model::ColumnMapping;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{
    validate_dataset_location, validate_file_extensions, validate_non_empty_string, validate_path,
    Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is a valid regex"));

/// Batch job description, read by `batch-classify`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub job: JobConfig,
    #[serde(default)]
    pub dataset: DatasetConfig,
    pub input: InputConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub columns: ColumnMapping,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// File path or http(s) URL. Absent means the bundled dataset.
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: String,
    pub compress: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATASET_URL})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn dataset_source(&self) -> DatasetSource {
        match self.dataset.location.as_deref().map(str::trim) {
            Some(location) if !location.is_empty() => DatasetSource::from_location(location),
            _ => DatasetSource::Bundled,
        }
    }

    pub fn is_compressed(&self) -> bool {
        self.output.compress.unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn input_path(&self) -> &str {
        &self.input.path
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn columns(&self) -> &ColumnMapping {
        &self.columns
    }

    fn compress_output(&self) -> bool {
        self.is_compressed()
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("job.name", &self.job.name)?;

        validate_path("input.path", &self.input.path)?;
        validate_file_extensions("input.path", &[self.input.path.clone()], &["csv"])?;

        validate_path("output.path", &self.output.path)?;

        if let Some(location) = &self.dataset.location {
            validate_dataset_location("dataset.location", location)?;
        }

        let columns = [
            ("columns.source", &self.columns.source),
            ("columns.medium", &self.columns.medium),
            ("columns.campaign", &self.columns.campaign),
            ("columns.url", &self.columns.url),
            ("columns.expected_channel", &self.columns.expected_channel),
        ];
        for (field, name) in columns {
            validate_non_empty_string(field, name)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const BASIC: &str = r#"
[job]
name = "weekly-visits"

[input]
path = "data/visits.csv"

[output]
path = "./output"
"#;

    #[test]
    fn test_parse_basic_toml_config() {
        let config = TomlConfig::from_toml_str(BASIC).unwrap();

        assert_eq!(config.job.name, "weekly-visits");
        assert_eq!(config.input_path(), "data/visits.csv");
        assert_eq!(config.output_path(), "./output");
        assert!(!config.compress_output());
        assert_eq!(config.columns(), &ColumnMapping::default());
        assert_eq!(config.dataset_source(), DatasetSource::Bundled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_column_overrides() {
        let toml_content = format!("{BASIC}\n[columns]\nsource = \"utm_source\"\n");
        let config = TomlConfig::from_toml_str(&toml_content).unwrap();

        assert_eq!(config.columns.source, "utm_source");
        assert_eq!(config.columns.medium, "medium");
        assert_eq!(config.columns.expected_channel, "expected_channel");
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("CHANNEL_ETL_TEST_DATASET", "https://cdn.example.com/map.json");

        let toml_content = r#"
[job]
name = "env"

[dataset]
location = "${CHANNEL_ETL_TEST_DATASET}"

[input]
path = "visits.csv"

[output]
path = "./output"
compress = true
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(
            config.dataset_source(),
            DatasetSource::Url("https://cdn.example.com/map.json".to_string())
        );
        assert!(config.compress_output());

        std::env::remove_var("CHANNEL_ETL_TEST_DATASET");
    }

    #[test]
    fn test_unset_env_var_is_left_in_place() {
        let toml_content = BASIC.replace("weekly-visits", "${CHANNEL_ETL_SURELY_UNSET_VAR}");
        let config = TomlConfig::from_toml_str(&toml_content).unwrap();
        assert_eq!(config.job.name, "${CHANNEL_ETL_SURELY_UNSET_VAR}");
    }

    #[test]
    fn test_config_validation() {
        let wrong_extension = BASIC.replace("data/visits.csv", "data/visits.json");
        let config = TomlConfig::from_toml_str(&wrong_extension).unwrap();
        assert!(config.validate().is_err());

        let bad_dataset = format!("{BASIC}\n[dataset]\nlocation = \"https://\"\n");
        let config = TomlConfig::from_toml_str(&bad_dataset).unwrap();
        assert!(config.validate().is_err());

        let blank_column = format!("{BASIC}\n[columns]\nmedium = \"  \"\n");
        let config = TomlConfig::from_toml_str(&blank_column).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("columns.medium"));
    }

    #[test]
    fn test_missing_section_is_a_parse_error() {
        let err = TomlConfig::from_toml_str("[job]\nname = \"x\"\n").unwrap_err();
        assert!(matches!(err, EtlError::ConfigError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(BASIC.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.job.name, "weekly-visits");
    }
}
