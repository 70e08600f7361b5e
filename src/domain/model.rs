use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Content category of a known traffic origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "SOURCE_CATEGORY_SEARCH")]
    Search,
    #[serde(rename = "SOURCE_CATEGORY_SOCIAL")]
    Social,
    #[serde(rename = "SOURCE_CATEGORY_SHOPPING")]
    Shopping,
    #[serde(rename = "SOURCE_CATEGORY_VIDEO")]
    Video,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Search,
        Category::Social,
        Category::Shopping,
        Category::Video,
    ];

    /// 資料集檔案中使用的常數名稱
    pub fn as_constant(&self) -> &'static str {
        match self {
            Category::Search => "SOURCE_CATEGORY_SEARCH",
            Category::Social => "SOURCE_CATEGORY_SOCIAL",
            Category::Shopping => "SOURCE_CATEGORY_SHOPPING",
            Category::Video => "SOURCE_CATEGORY_VIDEO",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_constant())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_constant() == s)
            .ok_or_else(|| format!("unknown source category: {}", s))
    }
}

/// Acquisition channel. Variant order is evaluation priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Channel {
    #[serde(rename = "Direct")]
    Direct,
    #[serde(rename = "Cross-network")]
    CrossNetwork,
    #[serde(rename = "Paid Shopping")]
    PaidShopping,
    #[serde(rename = "Paid Search")]
    PaidSearch,
    #[serde(rename = "Paid Social")]
    PaidSocial,
    #[serde(rename = "Paid Video")]
    PaidVideo,
    #[serde(rename = "Paid Other")]
    PaidOther,
    #[serde(rename = "Display")]
    Display,
    #[serde(rename = "Organic Shopping")]
    OrganicShopping,
    #[serde(rename = "Organic Social")]
    OrganicSocial,
    #[serde(rename = "Organic Video")]
    OrganicVideo,
    #[serde(rename = "Organic Search")]
    OrganicSearch,
    #[serde(rename = "Email")]
    Email,
    #[serde(rename = "Affiliates")]
    Affiliates,
    #[serde(rename = "Referral")]
    Referral,
    #[serde(rename = "Audio")]
    Audio,
    #[serde(rename = "SMS")]
    Sms,
    #[serde(rename = "Mobile Push Notifications")]
    MobilePushNotifications,
    #[serde(rename = "Unassigned")]
    Unassigned,
}

impl Channel {
    pub const ALL: [Channel; 19] = [
        Channel::Direct,
        Channel::CrossNetwork,
        Channel::PaidShopping,
        Channel::PaidSearch,
        Channel::PaidSocial,
        Channel::PaidVideo,
        Channel::PaidOther,
        Channel::Display,
        Channel::OrganicShopping,
        Channel::OrganicSocial,
        Channel::OrganicVideo,
        Channel::OrganicSearch,
        Channel::Email,
        Channel::Affiliates,
        Channel::Referral,
        Channel::Audio,
        Channel::Sms,
        Channel::MobilePushNotifications,
        Channel::Unassigned,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Direct => "Direct",
            Channel::CrossNetwork => "Cross-network",
            Channel::PaidShopping => "Paid Shopping",
            Channel::PaidSearch => "Paid Search",
            Channel::PaidSocial => "Paid Social",
            Channel::PaidVideo => "Paid Video",
            Channel::PaidOther => "Paid Other",
            Channel::Display => "Display",
            Channel::OrganicShopping => "Organic Shopping",
            Channel::OrganicSocial => "Organic Social",
            Channel::OrganicVideo => "Organic Video",
            Channel::OrganicSearch => "Organic Search",
            Channel::Email => "Email",
            Channel::Affiliates => "Affiliates",
            Channel::Referral => "Referral",
            Channel::Audio => "Audio",
            Channel::Sms => "SMS",
            Channel::MobilePushNotifications => "Mobile Push Notifications",
            Channel::Unassigned => "Unassigned",
        }
    }

    /// Channels ordered by label, the way a selection list shows them.
    pub fn sorted_by_label() -> Vec<Channel> {
        let mut channels = Channel::ALL.to_vec();
        channels.sort_by_key(|c| c.as_str());
        channels
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Channel::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown channel: {}", s))
    }
}

/// Raw visit attributes as supplied by a form or a tagged URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationInput {
    pub source: String,
    pub medium: String,
    pub campaign: String,
}

impl ClassificationInput {
    pub fn new(
        source: impl Into<String>,
        medium: impl Into<String>,
        campaign: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            medium: medium.into(),
            campaign: campaign.into(),
        }
    }
}

/// How a predicted channel compares with the channel the user expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    Aligned,
    Mismatch,
    Unassigned,
    NoExpectation,
}

/// CSV column names used by the batch pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    pub source: String,
    pub medium: String,
    pub campaign: String,
    pub url: String,
    pub expected_channel: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            source: "source".to_string(),
            medium: "medium".to_string(),
            campaign: "campaign".to_string(),
            url: "url".to_string(),
            expected_channel: "expected_channel".to_string(),
        }
    }
}

/// One input row of a batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitRecord {
    pub row: usize,
    pub source: String,
    pub medium: String,
    pub campaign: String,
    pub url: Option<String>,
    pub expected_channel: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedRecord {
    pub row: usize,
    pub source: String,
    pub medium: String,
    pub campaign: String,
    pub channel: Channel,
    pub expected_channel: Option<String>,
    pub alignment: Alignment,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationSummary {
    pub generated_at: String,
    pub total_rows: usize,
    pub classified_rows: usize,
    pub skipped_rows: usize,
    pub unassigned_rows: usize,
    pub mismatched_rows: usize,
    pub dataset_entries: usize,
    pub channel_counts: BTreeMap<String, usize>,
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub classified_records: Vec<ClassifiedRecord>,
    pub summary: ClassificationSummary,
    pub csv_output: String,
}
