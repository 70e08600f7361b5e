//! Fixed medium/campaign signals. Nothing here depends on the reference dataset.
//!
//! Callers pass normalized (trimmed, lowercased) values; the regexes are
//! case-insensitive anyway so raw values behave the same.

use regex::Regex;
use std::sync::LazyLock;

static PAID_MEDIUM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^(cpc|cpa|cpv|cpl|cpp|cpd|cpn|ecpc|ppc|retargeting|.*paid.*)$")
        .expect("paid medium pattern is a valid regex")
});

static EMAIL_SIGNAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(email|e[-_\s]?mail)$").expect("email pattern is a valid regex")
});

// A "shop" preceded by a-d or f-z does not count ("workshop" is not shopping,
// "eshop" is). Known to misfire on names like "shopper-survey".
static SHOPPING_CAMPAIGN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)^(.*(([^a-df-z]|^)shop|shopping).*|organic-shopping|product_listing_organic|feed)$",
    )
    .expect("shopping campaign pattern is a valid regex")
});

static ORGANIC_VIDEO_MEDIUM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^(.*video.*|organic-video|video_organic|user_generated_video)$")
        .expect("organic video pattern is a valid regex")
});

pub const ORGANIC_SOCIAL_MEDIUMS: [&str; 8] = [
    "social",
    "social-network",
    "social-media",
    "sm",
    "social network",
    "social media",
    "social_organic",
    "organic_social",
];

pub const REFERRAL_MEDIUMS: [&str; 3] = ["referral", "app", "link"];

pub const DISPLAY_MEDIUMS: [&str; 5] = ["display", "banner", "expandable", "interstitial", "cpm"];

pub const CROSS_NETWORK_MEDIUMS: [&str; 4] = [
    "cross-network",
    "demand gen",
    "performance max",
    "smart shopping",
];

pub const AFFILIATE_MEDIUMS: [&str; 3] = ["affiliate", "affiliates", "partner"];

pub const AUDIO_MEDIUMS: [&str; 3] = ["audio", "podcast_ad", "streaming_audio_ad"];

pub const SMS_MEDIUMS: [&str; 2] = ["sms", "text_message"];

pub fn is_paid_medium(medium: &str) -> bool {
    PAID_MEDIUM.is_match(medium)
}

pub fn is_email_signal(value: &str) -> bool {
    EMAIL_SIGNAL.is_match(value)
}

pub fn is_shopping_campaign_signal(campaign: &str) -> bool {
    SHOPPING_CAMPAIGN.is_match(campaign)
}

pub fn is_organic_video_medium(medium: &str) -> bool {
    ORGANIC_VIDEO_MEDIUM.is_match(medium)
}

pub fn is_cross_network_campaign(campaign: &str) -> bool {
    campaign.contains("cross-network")
}

pub fn is_push_notification_medium(medium: &str) -> bool {
    medium.ends_with("push")
        || medium.contains("mobile")
        || medium.contains("notification")
        || medium == "web_push"
}

/// Exact membership in one of the literal medium sets.
pub fn in_set(set: &[&str], value: &str) -> bool {
    set.contains(&value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paid_medium() {
        for medium in [
            "cpc", "cpa", "cpv", "cpl", "cpp", "cpd", "cpn", "ecpc", "ppc", "retargeting",
        ] {
            assert!(is_paid_medium(medium), "{medium} should be paid");
        }
        assert!(is_paid_medium("CPC"));
        assert!(is_paid_medium("paid"));
        assert!(is_paid_medium("paid_social"));
        assert!(is_paid_medium("social-paid"));
        assert!(is_paid_medium("unpaid"));

        assert!(!is_paid_medium("cpm"));
        assert!(!is_paid_medium("cpc2"));
        assert!(!is_paid_medium("xcpc"));
        assert!(!is_paid_medium("organic"));
        assert!(!is_paid_medium(""));
    }

    #[test]
    fn test_email_signal() {
        for value in ["email", "e-mail", "e_mail", "e mail", "EMAIL", "E-Mail"] {
            assert!(is_email_signal(value), "{value} should be email");
        }
        assert!(!is_email_signal("newsletter"));
        assert!(!is_email_signal("emails"));
        assert!(!is_email_signal("e--mail"));
        assert!(!is_email_signal("my email"));
    }

    #[test]
    fn test_shopping_campaign_signal() {
        assert!(is_shopping_campaign_signal("shop"));
        assert!(is_shopping_campaign_signal("shopping"));
        assert!(is_shopping_campaign_signal("summer_shop_sale"));
        assert!(is_shopping_campaign_signal("eshop"));
        assert!(is_shopping_campaign_signal("black-friday-shopping"));
        assert!(is_shopping_campaign_signal("2024shop"));
        assert!(is_shopping_campaign_signal("organic-shopping"));
        assert!(is_shopping_campaign_signal("product_listing_organic"));
        assert!(is_shopping_campaign_signal("feed"));
        // "shopper" still starts with a bare "shop"
        assert!(is_shopping_campaign_signal("shopper-survey"));

        assert!(!is_shopping_campaign_signal("workshop"));
        assert!(!is_shopping_campaign_signal("bishop"));
        assert!(!is_shopping_campaign_signal("newsfeed"));
        assert!(!is_shopping_campaign_signal("spring_sale"));
        assert!(!is_shopping_campaign_signal(""));
    }

    #[test]
    fn test_organic_video_medium() {
        assert!(is_organic_video_medium("video"));
        assert!(is_organic_video_medium("paid-video"));
        assert!(is_organic_video_medium("organic-video"));
        assert!(is_organic_video_medium("user_generated_video"));
        assert!(!is_organic_video_medium("vid"));
        assert!(!is_organic_video_medium(""));
    }

    #[test]
    fn test_push_notification_medium() {
        assert!(is_push_notification_medium("push"));
        assert!(is_push_notification_medium("mobile_push"));
        assert!(is_push_notification_medium("mobile"));
        assert!(is_push_notification_medium("app_notification"));
        assert!(is_push_notification_medium("web_push"));
        assert!(!is_push_notification_medium("pushy"));
    }

    #[test]
    fn test_literal_sets_are_exact() {
        assert!(in_set(&REFERRAL_MEDIUMS, "referral"));
        assert!(!in_set(&REFERRAL_MEDIUMS, "referral_partner_xyz"));
        assert!(in_set(&CROSS_NETWORK_MEDIUMS, "performance max"));
        assert!(!in_set(&DISPLAY_MEDIUMS, "display_ad"));
        assert!(in_set(&ORGANIC_SOCIAL_MEDIUMS, "social media"));
    }
}
