//! Candidate source/medium values for a selected channel or a typed source.
//!
//! Read-only over the same [`ReferenceDataset`] the classifier uses. Not part
//! of the classification contract: nothing here influences a channel label.

use crate::core::classifier::channel_rule;
use crate::core::dataset::ReferenceDataset;
use crate::core::text::normalize;
use crate::domain::model::{Category, Channel};
use std::collections::HashSet;

pub const DEFAULT_SOURCES: [&str; 5] = ["(direct)", "google", "facebook", "bing", "newsletter"];

pub const DEFAULT_MEDIUMS: &[&str] = &[
    "cpc", "ppc", "paid", "email", "e-mail", "e_mail", "e mail", "social", "referral", "link",
    "app", "display", "banner", "expandable", "interstitial", "cpm", "organic", "qr_code", "push",
    "notification", "mobile", "mobile_push", "app_notification", "partner", "podcast", "audio",
    "sms", "retargeting", "video", "shopping", "affiliate", "cross-network", "demand gen",
    "performance max", "smart shopping", "(not set)", "(none)",
];

const SEARCH_MEDIUMS: &[&str] = &[
    "cpc", "cpa", "cpv", "cpl", "cpp", "cpd", "cpn", "ecpc", "ppc", "retargeting", "paid",
    "paidsearch", "paid_search", "paid-search", "paidsearches", "paidmedia", "paid_media",
    "paid-media", "organic",
];

const SOCIAL_MEDIUMS: &[&str] = &[
    "cpc", "cpa", "cpv", "cpl", "cpp", "cpd", "cpn", "ecpc", "ppc", "retargeting", "paid",
    "paidsocial", "paid_social", "paid-social", "paidmedia", "paid_media", "paid-media",
    "organic-social", "social-paid", "social-organic", "post", "story", "boost", "social_ad", "sm",
    "social-network", "social-media", "promoted_post", "social_ads", "social", "social network",
    "social media",
];

const VIDEO_MEDIUMS: &[&str] = &[
    "cpc", "cpa", "cpv", "cpl", "cpp", "cpd", "cpn", "ecpc", "ppc", "retargeting", "paid",
    "paidvideo", "paid_video", "paid-video", "video", "video_ad", "instream", "outstream",
    "trueview", "bumper_ad", "video_ads", "organic-video", "video_organic", "user_generated_video",
];

const SHOPPING_MEDIUMS: &[&str] = &[
    "cpc", "cpa", "cpv", "cpl", "cpp", "cpd", "cpn", "ecpc", "ppc", "retargeting", "paid",
    "paidshopping", "paid_shopping", "paid-shopping", "shopping", "product_listing_ad", "pla",
    "feed", "merchant_center", "shopping_ads", "organic-shopping", "product_listing_organic",
    "shop",
];

const GOOGLE: &[&str] = &[
    "cpc", "organic", "display", "video", "shopping", "youtube_ad", "discovery_ad",
    "performance_max", "feed", "paidsearch", "ppc", "paid", "search_ads", "video_ads",
    "shopping_ads",
];
const FACEBOOK: &[&str] = &[
    "cpc", "social", "paid-social", "paidsocial", "post", "story", "boost", "lead_ad",
    "messenger_ad", "ppc", "paid", "social_ads",
];
const INSTAGRAM: &[&str] = &[
    "cpc", "social", "paid-social", "paidsocial", "post", "story", "ig_shopping_ad", "ppc", "paid",
    "social_ads",
];
const LINKEDIN: &[&str] = &[
    "cpc", "social", "paid-social", "paidsocial", "sponsored_content", "sponsored_inmail",
    "text_ad", "ppc", "paid", "social_ads",
];
const YOUTUBE: &[&str] = &[
    "video", "cpc", "display", "social", "video_ad", "instream", "outstream", "masthead",
    "organic-video", "paid-video", "trueview_in-stream_ad", "trueview_discovery_ad", "bumper_ad",
    "ppc", "paid", "video_ads",
];
const NEWSLETTER: &[&str] = &["email", "newsletter_link", "e-mail", "e_mail", "e-newsletter"];
const EMAIL: &[&str] = &[
    "email", "blast", "automated_email", "transactional_email", "e-mail", "e_mail", "e-blast",
];
const BING: &[&str] = &["cpc", "organic", "paidsearch", "ppc", "paid", "search_ads"];
const DUCKDUCKGO: &[&str] = &["organic", "cpc", "paidsearch", "ppc", "paid", "search_ads"];
const TWITTER: &[&str] = &[
    "social", "cpc", "tweet", "paidsocial", "promoted_tweet", "ppc", "paid", "social_ads",
];
const PINTEREST: &[&str] = &[
    "social", "cpc", "pin", "promoted_pin", "paidsocial", "ppc", "paid", "social_ads",
];
const TIKTOK: &[&str] = &["social", "cpc", "video", "paidsocial", "video_ad", "ppc", "paid", "social_ads"];
const REDDIT: &[&str] = &[
    "social", "cpc", "post", "paidsocial", "promoted_post", "ppc", "paid", "social_ads",
];
const AMAZON: &[&str] = &[
    "cpc", "sponsored_products", "display", "shopping", "marketplace", "pla", "ppc", "paid",
    "shopping_ads",
];

/// Per-source medium overrides, keyed by the exact normalized source.
fn source_override(source: &str) -> Option<&'static [&'static str]> {
    let mediums = match source {
        "google" => GOOGLE,
        "facebook" | "facebook.com" => FACEBOOK,
        "instagram" | "instagram.com" => INSTAGRAM,
        "linkedin" | "linkedin.com" => LINKEDIN,
        "youtube" | "youtube.com" => YOUTUBE,
        "newsletter" => NEWSLETTER,
        "email" => EMAIL,
        "bing" => BING,
        "duckduckgo" => DUCKDUCKGO,
        "twitter" | "twitter.com" => TWITTER,
        "pinterest" | "pinterest.com" => PINTEREST,
        "tiktok" | "tiktok.com" => TIKTOK,
        "reddit" | "reddit.com" => REDDIT,
        "amazon" | "amazon.com" => AMAZON,
        _ => return None,
    };
    Some(mediums)
}

fn category_mediums(category: Category) -> &'static [&'static str] {
    match category {
        Category::Search => SEARCH_MEDIUMS,
        Category::Social => SOCIAL_MEDIUMS,
        Category::Video => VIDEO_MEDIUMS,
        Category::Shopping => SHOPPING_MEDIUMS,
    }
}

/// Where a medium suggestion list came from. Exposed so the fallback order
/// can be asserted directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediumSource {
    Channel(Channel),
    SourceOverride,
    SourceCategory(Category),
    Default,
}

pub struct SuggestionProvider<'a> {
    dataset: &'a ReferenceDataset,
}

impl<'a> SuggestionProvider<'a> {
    pub fn new(dataset: &'a ReferenceDataset) -> Self {
        Self { dataset }
    }

    pub fn suggest_sources(&self, channel: Option<Channel>, filter: &str) -> Vec<String> {
        let candidates: Vec<&str> = match channel.map(channel_rule) {
            Some(rule) => match (rule.recommended_sources, rule.target_category) {
                (Some(sources), _) => sources.to_vec(),
                (None, Some(category)) if !self.dataset.is_empty() => {
                    self.dataset.keys_in_category(category)
                }
                _ => self.all_sources(),
            },
            None => self.all_sources(),
        };
        dedup_and_filter(candidates, filter)
    }

    pub fn suggest_mediums(&self, source: &str, channel: Option<Channel>, filter: &str) -> Vec<String> {
        let (_, candidates) = self.medium_candidates(source, channel);
        let mut mediums = dedup_and_filter(candidates.iter().copied(), filter);
        mediums.sort();
        mediums
    }

    /// Resolve which list feeds [`Self::suggest_mediums`]: channel first, then
    /// the per-source override, then the source's dataset category, then defaults.
    pub fn medium_candidates(
        &self,
        source: &str,
        channel: Option<Channel>,
    ) -> (MediumSource, &'static [&'static str]) {
        if let Some(channel) = channel {
            return (MediumSource::Channel(channel), channel_rule(channel).recommended_mediums);
        }

        let source = normalize(source);
        if source.is_empty() {
            return (MediumSource::Default, DEFAULT_MEDIUMS);
        }
        if let Some(mediums) = source_override(&source) {
            return (MediumSource::SourceOverride, mediums);
        }
        if let Some(category) = self.dataset.category_of(&source) {
            return (MediumSource::SourceCategory(category), category_mediums(category));
        }
        (MediumSource::Default, DEFAULT_MEDIUMS)
    }

    fn all_sources(&self) -> Vec<&'a str> {
        if self.dataset.is_empty() {
            DEFAULT_SOURCES.to_vec()
        } else {
            self.dataset.sorted_keys()
        }
    }
}

fn dedup_and_filter<'s>(candidates: impl IntoIterator<Item = &'s str>, filter: &str) -> Vec<String> {
    let filter = normalize(filter);
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|value| filter.is_empty() || value.to_lowercase().contains(&filter))
        .filter(|value| seen.insert(*value))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> ReferenceDataset {
        ReferenceDataset::from_entries([
            ("google", Category::Search),
            ("ecosia", Category::Search),
            ("bing", Category::Search),
            ("mastodon", Category::Social),
            ("facebook.com", Category::Social),
            ("etsy", Category::Shopping),
            ("vimeo", Category::Video),
        ])
    }

    #[test]
    fn test_channel_mediums_round_trip() {
        let dataset = dataset();
        let provider = SuggestionProvider::new(&dataset);
        for channel in Channel::ALL {
            let recommended: HashSet<&str> =
                channel_rule(channel).recommended_mediums.iter().copied().collect();
            let suggested = provider.suggest_mediums("", Some(channel), "");
            assert_eq!(suggested.len(), recommended.len(), "{channel}");
            for medium in &suggested {
                assert!(recommended.contains(medium.as_str()), "{channel}: {medium}");
            }
        }
    }

    #[test]
    fn test_medium_fallback_precedence() {
        let dataset = dataset();
        let provider = SuggestionProvider::new(&dataset);

        // channel wins over a source that has an override
        assert_eq!(
            provider.medium_candidates("google", Some(Channel::Email)).0,
            MediumSource::Channel(Channel::Email)
        );
        // override wins over the dataset category
        assert_eq!(provider.medium_candidates("google", None).0, MediumSource::SourceOverride);
        assert_eq!(provider.medium_candidates("Facebook.com ", None).0, MediumSource::SourceOverride);
        // dataset category when there is no override
        assert_eq!(
            provider.medium_candidates("ecosia", None).0,
            MediumSource::SourceCategory(Category::Search)
        );
        assert_eq!(
            provider.medium_candidates("www.mastodon", None).0,
            MediumSource::SourceCategory(Category::Social)
        );
        // generic list last
        assert_eq!(provider.medium_candidates("my-crm", None).0, MediumSource::Default);
        assert_eq!(provider.medium_candidates("", None).0, MediumSource::Default);
    }

    #[test]
    fn test_override_is_exact_match_only() {
        let dataset = ReferenceDataset::empty();
        let provider = SuggestionProvider::new(&dataset);
        assert_eq!(provider.medium_candidates("googles", None).0, MediumSource::Default);
        assert_eq!(provider.medium_candidates("www.google", None).0, MediumSource::Default);
    }

    #[test]
    fn test_mediums_are_sorted_and_filtered() {
        let dataset = dataset();
        let provider = SuggestionProvider::new(&dataset);
        let mediums = provider.suggest_mediums("bing", None, "");
        assert_eq!(mediums, ["cpc", "organic", "paid", "paidsearch", "ppc", "search_ads"]);

        let filtered = provider.suggest_mediums("bing", None, "PAID");
        assert_eq!(filtered, ["paid", "paidsearch"]);
    }

    #[test]
    fn test_sources_for_channel_with_recommendations() {
        let dataset = dataset();
        let provider = SuggestionProvider::new(&dataset);
        let sources = provider.suggest_sources(Some(Channel::Direct), "");
        assert_eq!(sources, ["(direct)"]);

        let email = provider.suggest_sources(Some(Channel::Email), "mail");
        assert_eq!(email, ["email", "mailchimp"]);
    }

    #[test]
    fn test_sources_for_channel_use_dataset_category_in_file_order() {
        let dataset = dataset();
        let provider = SuggestionProvider::new(&dataset);
        let sources = provider.suggest_sources(Some(Channel::PaidSearch), "");
        assert_eq!(sources, ["google", "ecosia", "bing"]);
    }

    #[test]
    fn test_sources_without_channel_are_sorted() {
        let dataset = dataset();
        let provider = SuggestionProvider::new(&dataset);
        let sources = provider.suggest_sources(None, "");
        let mut expected = sources.clone();
        expected.sort();
        assert_eq!(sources, expected);
        assert_eq!(sources.len(), dataset.len());
    }

    #[test]
    fn test_empty_dataset_falls_back_to_default_sources() {
        let dataset = ReferenceDataset::empty();
        let provider = SuggestionProvider::new(&dataset);
        assert_eq!(provider.suggest_sources(None, ""), DEFAULT_SOURCES);
        assert_eq!(provider.suggest_sources(Some(Channel::OrganicSocial), ""), DEFAULT_SOURCES);
        assert_eq!(provider.suggest_sources(Some(Channel::PaidOther), "g"), ["google", "bing"]);
    }

    #[test]
    fn test_default_mediums_are_deduplicated() {
        let dataset = ReferenceDataset::empty();
        let provider = SuggestionProvider::new(&dataset);
        let mediums = provider.suggest_mediums("nobody", None, "");
        let unique: HashSet<&String> = mediums.iter().collect();
        assert_eq!(unique.len(), mediums.len());
        assert!(mediums.contains(&"(none)".to_string()));
    }
}
