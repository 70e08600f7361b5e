//! UTM helpers around the classifier: read the tags off a landing URL,
//! compare a prediction with what the marketer intended, and build tagged
//! campaign URLs.

use crate::core::classifier::ChannelClassifier;
use crate::domain::model::{Alignment, Channel};
use crate::utils::error::{EtlError, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use url::Url;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UtmParams {
    pub source: String,
    pub medium: String,
    pub campaign: String,
}

impl UtmParams {
    pub fn is_untagged(&self) -> bool {
        self.source.trim().is_empty() && self.medium.trim().is_empty()
    }
}

/// Read `utm_source`, `utm_medium` and `utm_campaign` from an absolute URL.
/// Absent parameters come back empty; repeated ones keep the first value.
pub fn extract_utm(raw: &str) -> Result<UtmParams> {
    let url = Url::parse(raw.trim())?;
    let mut params = UtmParams::default();
    let mut seen = [false; 3];

    for (key, value) in url.query_pairs() {
        let slot = match key.as_ref() {
            "utm_source" => 0,
            "utm_medium" => 1,
            "utm_campaign" => 2,
            _ => continue,
        };
        if seen[slot] {
            continue;
        }
        seen[slot] = true;
        let target = match slot {
            0 => &mut params.source,
            1 => &mut params.medium,
            _ => &mut params.campaign,
        };
        *target = value.into_owned();
    }

    Ok(params)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnalysisOutcome {
    /// Neither `utm_source` nor `utm_medium` is present.
    MissingParameters,
    Classified { channel: Channel },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UrlAnalysis {
    pub url: String,
    pub utm: UtmParams,
    pub outcome: AnalysisOutcome,
}

impl UrlAnalysis {
    pub fn channel(&self) -> Option<Channel> {
        match self.outcome {
            AnalysisOutcome::Classified { channel } => Some(channel),
            AnalysisOutcome::MissingParameters => None,
        }
    }

    pub fn is_unassigned(&self) -> bool {
        self.channel() == Some(Channel::Unassigned)
    }
}

pub fn analyze_url(classifier: &ChannelClassifier, raw: &str) -> Result<UrlAnalysis> {
    let utm = extract_utm(raw)?;
    let outcome = if utm.is_untagged() {
        AnalysisOutcome::MissingParameters
    } else {
        AnalysisOutcome::Classified {
            channel: classifier.classify(&utm.source, &utm.medium, &utm.campaign),
        }
    };

    Ok(UrlAnalysis {
        url: raw.trim().to_string(),
        utm,
        outcome,
    })
}

pub fn check_alignment(predicted: Channel, expected: Option<Channel>) -> Alignment {
    match expected {
        None => Alignment::NoExpectation,
        Some(expected) if expected == predicted => Alignment::Aligned,
        Some(_) if predicted == Channel::Unassigned => Alignment::Unassigned,
        Some(_) => Alignment::Mismatch,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UtmField {
    Source,
    Medium,
    Campaign,
    Content,
    Term,
    Id,
    SourcePlatform,
    CreativeFormat,
    MarketingTactic,
}

impl UtmField {
    /// Query order of a built URL.
    pub const ALL: [UtmField; 9] = [
        UtmField::Source,
        UtmField::Medium,
        UtmField::Campaign,
        UtmField::Content,
        UtmField::Term,
        UtmField::Id,
        UtmField::SourcePlatform,
        UtmField::CreativeFormat,
        UtmField::MarketingTactic,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            UtmField::Source => "utm_source",
            UtmField::Medium => "utm_medium",
            UtmField::Campaign => "utm_campaign",
            UtmField::Content => "utm_content",
            UtmField::Term => "utm_term",
            UtmField::Id => "utm_id",
            UtmField::SourcePlatform => "utm_source_platform",
            UtmField::CreativeFormat => "utm_creative_format",
            UtmField::MarketingTactic => "utm_marketing_tactic",
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(self, UtmField::Source | UtmField::Medium | UtmField::Campaign)
    }
}

impl fmt::Display for UtmField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, Default)]
pub struct CampaignUrlBuilder {
    base_url: String,
    values: HashMap<UtmField, String>,
    force_lowercase: bool,
}

impl CampaignUrlBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn param(mut self, field: UtmField, value: impl Into<String>) -> Self {
        self.values.insert(field, value.into());
        self
    }

    pub fn source(self, value: impl Into<String>) -> Self {
        self.param(UtmField::Source, value)
    }

    pub fn medium(self, value: impl Into<String>) -> Self {
        self.param(UtmField::Medium, value)
    }

    pub fn campaign(self, value: impl Into<String>) -> Self {
        self.param(UtmField::Campaign, value)
    }

    pub fn force_lowercase(mut self, enabled: bool) -> Self {
        self.force_lowercase = enabled;
        self
    }

    fn value(&self, field: UtmField) -> &str {
        self.values.get(&field).map(|v| v.trim()).unwrap_or("")
    }

    /// Fields whose value still contains whitespace after trimming. Such
    /// values are encoded as `%20`, which analytics tools report verbatim.
    pub fn space_warnings(&self) -> Vec<UtmField> {
        UtmField::ALL
            .into_iter()
            .filter(|field| self.value(*field).chars().any(char::is_whitespace))
            .collect()
    }

    pub fn build(&self) -> Result<String> {
        let base = self.base_url.trim();
        if base.is_empty() {
            return Err(EtlError::ValidationError {
                message: "base URL is required".to_string(),
            });
        }
        let lowered = base.to_ascii_lowercase();
        if !lowered.starts_with("http://") && !lowered.starts_with("https://") {
            return Err(EtlError::ValidationError {
                message: format!("base URL must start with http:// or https://, got '{base}'"),
            });
        }

        let missing: Vec<&str> = UtmField::ALL
            .iter()
            .filter(|field| field.is_required() && self.value(**field).is_empty())
            .map(|field| field.key())
            .collect();
        if !missing.is_empty() {
            return Err(EtlError::ValidationError {
                message: format!("missing required parameters: {}", missing.join(", ")),
            });
        }

        let query = UtmField::ALL
            .iter()
            .filter_map(|field| {
                let value = self.value(*field);
                if value.is_empty() {
                    return None;
                }
                let value = if self.force_lowercase {
                    value.to_lowercase()
                } else {
                    value.to_string()
                };
                Some(format!("{}={}", field.key(), urlencoding::encode(&value)))
            })
            .collect::<Vec<_>>()
            .join("&");

        let separator = if base.ends_with('?') || base.ends_with('&') {
            ""
        } else if base.contains('?') {
            "&"
        } else {
            "?"
        };

        Ok(format!("{base}{separator}{query}"))
    }
}
