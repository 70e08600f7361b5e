//! Channel classifier: an ordered rule list evaluated first-match-wins.
//!
//! Rule order is the whole contract. A paid click from a known shopping site
//! satisfies Paid Shopping and Paid Other at once, and only the position in
//! [`RULES`] decides which label comes back. The last rule, Unassigned, has no
//! predicate and always matches.

use crate::core::dataset::ReferenceDataset;
use crate::core::matchers::CategoryMatchers;
use crate::core::patterns::{
    in_set, is_cross_network_campaign, is_email_signal, is_organic_video_medium, is_paid_medium,
    is_push_notification_medium, is_shopping_campaign_signal, AFFILIATE_MEDIUMS, AUDIO_MEDIUMS,
    CROSS_NETWORK_MEDIUMS, DISPLAY_MEDIUMS, ORGANIC_SOCIAL_MEDIUMS, REFERRAL_MEDIUMS, SMS_MEDIUMS,
};
use crate::core::suggestions::SuggestionProvider;
use crate::core::text::normalize;
use crate::domain::model::{Category, Channel, ClassificationInput};

/// Normalized view of one visit, handed to every rule predicate.
pub struct Signals<'a> {
    pub source: &'a str,
    pub medium: &'a str,
    pub campaign: &'a str,
    pub paid: bool,
    matchers: &'a CategoryMatchers,
}

impl Signals<'_> {
    pub fn is_known(&self, category: Category) -> bool {
        self.matchers.is_known(category, self.source)
    }

    fn shopping_intent(&self) -> bool {
        self.is_known(Category::Shopping) || is_shopping_campaign_signal(self.campaign)
    }
}

type Predicate = fn(&Signals<'_>) -> bool;

pub struct ChannelRule {
    pub channel: Channel,
    pub description: &'static str,
    pub condition: &'static str,
    pub recommended_mediums: &'static [&'static str],
    pub recommended_sources: Option<&'static [&'static str]>,
    pub target_category: Option<Category>,
    predicate: Option<Predicate>,
}

impl ChannelRule {
    pub fn matches(&self, signals: &Signals<'_>) -> bool {
        match self.predicate {
            Some(predicate) => predicate(signals),
            None => true,
        }
    }
}

impl std::fmt::Debug for ChannelRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelRule")
            .field("channel", &self.channel)
            .field("condition", &self.condition)
            .finish()
    }
}

/// Generic paid mediums followed by the channel-specific extras.
macro_rules! paid_mediums {
    ($($extra:literal),* $(,)?) => {
        &[
            "cpc", "cpa", "cpv", "cpl", "cpp", "cpd", "cpn", "ecpc", "ppc", "retargeting", "paid",
            $($extra),*
        ]
    };
}

const PAID_CONDITION: &str = "Medium matches ^(cpc|cpa|cpv|cpl|cpp|cpd|cpn|ecpc|ppc|retargeting|.*paid.*)$";

pub static RULES: [ChannelRule; 19] = [
    ChannelRule {
        channel: Channel::Direct,
        description: "Users who typed your site's URL directly or used bookmarks.",
        condition: "Source exactly matches \"(direct)\" AND Medium is one of (\"(not set)\", \"(none)\")",
        recommended_mediums: &["(not set)", "(none)"],
        recommended_sources: Some(&["(direct)"]),
        target_category: None,
        predicate: Some(|s| s.source == "(direct)" && matches!(s.medium, "(not set)" | "(none)")),
    },
    ChannelRule {
        channel: Channel::CrossNetwork,
        description: "Users from ads on various networks (e.g. Performance Max, Smart Shopping, Demand Gen).",
        condition: "Campaign Name contains 'cross-network' OR Medium is one of ('cross-network', 'demand gen', 'performance max', 'smart shopping')",
        recommended_mediums: &["cross-network", "demand gen", "performance max", "smart shopping"],
        recommended_sources: Some(&[
            "google", "microsoft", "facebook", "instagram", "youtube", "demandbase", "linkedin",
            "criteo", "taboola", "outbrain",
        ]),
        target_category: None,
        predicate: Some(|s| {
            is_cross_network_campaign(s.campaign) || in_set(&CROSS_NETWORK_MEDIUMS, s.medium)
        }),
    },
    ChannelRule {
        channel: Channel::PaidShopping,
        description: "Users from paid ads on shopping platforms.",
        condition: "(Source is a known shopping site OR Campaign Name matches ^(.*(([^a-df-z]|^)shop|shopping).*)$) AND paid Medium",
        recommended_mediums: paid_mediums!["paidshopping", "paid_shopping", "paid-shopping"],
        recommended_sources: None,
        target_category: Some(Category::Shopping),
        predicate: Some(|s| s.paid && s.shopping_intent()),
    },
    ChannelRule {
        channel: Channel::PaidSearch,
        description: "Users from paid search engine ads.",
        condition: "Source is a known search site AND paid Medium",
        recommended_mediums: paid_mediums!["paidsearch", "paid_search", "paid-search", "paidsearches"],
        recommended_sources: None,
        target_category: Some(Category::Search),
        predicate: Some(|s| s.paid && s.is_known(Category::Search)),
    },
    ChannelRule {
        channel: Channel::PaidSocial,
        description: "Users from paid ads on social media.",
        condition: "Source is a known social site AND paid Medium",
        recommended_mediums: paid_mediums!["paidsocial", "paid_social", "paid-social"],
        recommended_sources: None,
        target_category: Some(Category::Social),
        predicate: Some(|s| s.paid && s.is_known(Category::Social)),
    },
    ChannelRule {
        channel: Channel::PaidVideo,
        description: "Users from paid video ads.",
        condition: "Source is a known video site AND paid Medium",
        recommended_mediums: paid_mediums![
            "paidmedia", "paid_media", "paid-media", "paidvideo", "paid_video", "paid-video"
        ],
        recommended_sources: None,
        target_category: Some(Category::Video),
        predicate: Some(|s| s.paid && s.is_known(Category::Video)),
    },
    ChannelRule {
        channel: Channel::PaidOther,
        description: "Users from other paid ads not fitting other categories.",
        condition: PAID_CONDITION,
        recommended_mediums: paid_mediums!["paid_other", "paid-other"],
        recommended_sources: None,
        target_category: None,
        predicate: Some(|s| s.paid),
    },
    ChannelRule {
        channel: Channel::Display,
        description: "Users from display ads.",
        condition: "Medium is one of ('display', 'banner', 'expandable', 'interstitial', 'cpm')",
        recommended_mediums: &["display", "banner", "expandable", "interstitial", "cpm"],
        recommended_sources: Some(&[
            "google", "criteo", "adroll", "taboola", "outbrain", "linkedin", "facebook",
            "instagram", "twitter", "bing", "yahoo",
        ]),
        target_category: None,
        predicate: Some(|s| in_set(&DISPLAY_MEDIUMS, s.medium)),
    },
    ChannelRule {
        channel: Channel::OrganicShopping,
        description: "Users from unpaid links on shopping platforms.",
        condition: "Source is a known shopping site OR Campaign Name matches ^(.*(([^a-df-z]|^)shop|shopping).*)$",
        recommended_mediums: &["shop", "shopping", "organic-shopping", "feed", "product_listing_organic"],
        recommended_sources: None,
        target_category: Some(Category::Shopping),
        predicate: Some(|s| !s.paid && s.shopping_intent()),
    },
    ChannelRule {
        channel: Channel::OrganicSocial,
        description: "Users from unpaid links on social media.",
        condition: "Source is a known social site OR Medium is one of ('social', 'social-network', 'social-media', 'sm', 'social network', 'social media', 'social_organic', 'organic_social')",
        recommended_mediums: &[
            "social", "social-network", "social-media", "sm", "social network", "social media",
            "social_organic", "organic_social",
        ],
        recommended_sources: None,
        target_category: Some(Category::Social),
        predicate: Some(|s| {
            !s.paid && (s.is_known(Category::Social) || in_set(&ORGANIC_SOCIAL_MEDIUMS, s.medium))
        }),
    },
    ChannelRule {
        channel: Channel::OrganicVideo,
        description: "Users from unpaid links on video platforms.",
        condition: "Source is a known video site OR Medium matches ^(.*video.*)$",
        recommended_mediums: &["video", "organic-video", "video_organic", "user_generated_video"],
        recommended_sources: None,
        target_category: Some(Category::Video),
        predicate: Some(|s| {
            !s.paid && (s.is_known(Category::Video) || is_organic_video_medium(s.medium))
        }),
    },
    ChannelRule {
        channel: Channel::OrganicSearch,
        description: "Users from unpaid search engine results.",
        condition: "Source is a known search site OR Medium exactly matches 'organic'",
        recommended_mediums: &["organic"],
        recommended_sources: None,
        target_category: Some(Category::Search),
        predicate: Some(|s| !s.paid && (s.is_known(Category::Search) || s.medium == "organic")),
    },
    ChannelRule {
        channel: Channel::Email,
        description: "Users from links in emails.",
        condition: "Source or Medium matches ^(email|e[-_\\s]?mail)$",
        recommended_mediums: &["email", "e-mail", "e_mail", "e mail", "newsletter"],
        recommended_sources: Some(&[
            "email", "newsletter", "klaviyo", "mailchimp", "hubspot", "activecampaign", "pardot",
            "sendgrid", "constantcontact",
        ]),
        target_category: None,
        predicate: Some(|s| is_email_signal(s.source) || is_email_signal(s.medium)),
    },
    ChannelRule {
        channel: Channel::Affiliates,
        description: "Users from links on affiliate websites.",
        condition: "Medium is one of ('affiliate', 'affiliates', 'partner')",
        recommended_mediums: &["affiliate", "affiliates", "partner"],
        recommended_sources: Some(&[
            "shareasale", "impact", "cj", "rakutenadvertising", "partnerstack", "awin", "pepperjam",
        ]),
        target_category: None,
        predicate: Some(|s| in_set(&AFFILIATE_MEDIUMS, s.medium)),
    },
    ChannelRule {
        channel: Channel::Referral,
        description: "Users from links on other websites.",
        condition: "Medium is one of ('referral', 'app', 'link')",
        recommended_mediums: &["referral", "link", "app"],
        recommended_sources: None,
        target_category: None,
        predicate: Some(|s| in_set(&REFERRAL_MEDIUMS, s.medium)),
    },
    ChannelRule {
        channel: Channel::Audio,
        description: "Users from audio ads or content.",
        condition: "Medium is one of ('audio', 'podcast_ad', 'streaming_audio_ad')",
        recommended_mediums: &["audio", "podcast_ad", "streaming_audio_ad"],
        recommended_sources: Some(&[
            "spotify", "pandora", "iheartradio", "soundcloud", "tunein", "google_audio_ads",
        ]),
        target_category: None,
        predicate: Some(|s| in_set(&AUDIO_MEDIUMS, s.medium)),
    },
    ChannelRule {
        channel: Channel::Sms,
        description: "Users from links in text messages.",
        condition: "Source exactly matches 'sms' OR Medium is one of ('sms', 'text_message')",
        recommended_mediums: &["sms", "text_message"],
        recommended_sources: Some(&[
            "sms", "attentive", "postscript", "twilio", "voyage", "klaviyo_sms", "manychat_sms",
        ]),
        target_category: None,
        predicate: Some(|s| s.source == "sms" || in_set(&SMS_MEDIUMS, s.medium)),
    },
    ChannelRule {
        channel: Channel::MobilePushNotifications,
        description: "Users from mobile app push notifications.",
        condition: "Medium ends with 'push' OR Medium contains 'mobile' or 'notification' OR Source exactly matches 'firebase' OR Medium is 'web_push'",
        recommended_mediums: &["push", "mobile", "notification", "mobile_push", "app_notification", "web_push"],
        recommended_sources: Some(&[
            "firebase", "onesignal", "clevertap", "iterable", "braze", "urbanairship",
        ]),
        target_category: None,
        predicate: Some(|s| is_push_notification_medium(s.medium) || s.source == "firebase"),
    },
    ChannelRule {
        channel: Channel::Unassigned,
        description: "Traffic that doesn't match any other channel definition.",
        condition: "None of the other rules match.",
        recommended_mediums: &[],
        recommended_sources: None,
        target_category: None,
        predicate: None,
    },
];

pub fn rules() -> &'static [ChannelRule] {
    &RULES
}

pub fn channel_rule(channel: Channel) -> &'static ChannelRule {
    // RULES is laid out in Channel declaration order
    &RULES[channel as usize]
}

/// Classifier over an immutable reference dataset. Build it once, share it
/// freely; nothing is mutated while classifying.
#[derive(Debug, Clone, Default)]
pub struct ChannelClassifier {
    dataset: ReferenceDataset,
    matchers: CategoryMatchers,
}

impl ChannelClassifier {
    pub fn new(dataset: ReferenceDataset) -> Self {
        let matchers = CategoryMatchers::from_dataset(&dataset);
        Self { dataset, matchers }
    }

    /// Pattern rules only, for use before (or without) a dataset.
    pub fn without_dataset() -> Self {
        Self::default()
    }

    pub fn dataset(&self) -> &ReferenceDataset {
        &self.dataset
    }

    pub fn is_degraded(&self) -> bool {
        self.dataset.is_empty()
    }

    pub fn suggestions(&self) -> SuggestionProvider<'_> {
        SuggestionProvider::new(&self.dataset)
    }

    pub fn classify(&self, source: &str, medium: &str, campaign: &str) -> Channel {
        self.matching_rule(source, medium, campaign).channel
    }

    pub fn classify_input(&self, input: &ClassificationInput) -> Channel {
        self.classify(&input.source, &input.medium, &input.campaign)
    }

    /// The first rule that fires, for callers that want to show why.
    pub fn matching_rule(&self, source: &str, medium: &str, campaign: &str) -> &'static ChannelRule {
        let source = normalize(source);
        let medium = normalize(medium);
        let campaign = normalize(campaign);

        let signals = Signals {
            source: &source,
            medium: &medium,
            campaign: &campaign,
            paid: is_paid_medium(&medium),
            matchers: &self.matchers,
        };

        RULES
            .iter()
            .find(|rule| rule.matches(&signals))
            .unwrap_or(&RULES[RULES.len() - 1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> ChannelClassifier {
        ChannelClassifier::new(ReferenceDataset::from_entries([
            ("google", Category::Search),
            ("bing", Category::Search),
            ("facebook.com", Category::Social),
            ("amazon", Category::Shopping),
            ("youtube", Category::Video),
        ]))
    }

    #[test]
    fn test_rules_follow_channel_order() {
        assert_eq!(RULES.len(), Channel::ALL.len());
        for (rule, channel) in RULES.iter().zip(Channel::ALL) {
            assert_eq!(rule.channel, channel);
            assert!(std::ptr::eq(channel_rule(channel), rule));
        }
    }

    #[test]
    fn test_only_unassigned_is_predicate_free() {
        for rule in &RULES[..RULES.len() - 1] {
            assert!(rule.predicate.is_some(), "{} needs a predicate", rule.channel);
        }
        let last = &RULES[RULES.len() - 1];
        assert_eq!(last.channel, Channel::Unassigned);
        assert!(last.predicate.is_none());
    }

    #[test]
    fn test_each_rule_has_a_reachable_example() {
        let c = classifier();
        let cases = [
            ("(direct)", "(none)", "", Channel::Direct),
            ("(direct)", "(not set)", "", Channel::Direct),
            ("google", "performance max", "", Channel::CrossNetwork),
            ("newsletter", "email", "q3-cross-network", Channel::CrossNetwork),
            ("amazon", "cpc", "", Channel::PaidShopping),
            ("unknown", "ppc", "summer_shop", Channel::PaidShopping),
            ("google", "cpc", "spring_sale", Channel::PaidSearch),
            ("facebook.com", "paid_social", "", Channel::PaidSocial),
            ("youtube", "cpv", "", Channel::PaidVideo),
            ("someone", "retargeting", "", Channel::PaidOther),
            ("criteo", "banner", "", Channel::Display),
            ("amazon", "referral", "", Channel::OrganicShopping),
            ("blog", "social", "", Channel::OrganicSocial),
            ("facebook.com", "referral", "", Channel::OrganicSocial),
            ("youtube", "", "", Channel::OrganicVideo),
            ("vlog", "organic-video", "", Channel::OrganicVideo),
            ("bing", "organic", "", Channel::OrganicSearch),
            ("ecosia", "organic", "", Channel::OrganicSearch),
            ("newsletter", "email", "", Channel::Email),
            ("e-mail", "", "", Channel::Email),
            ("awin", "affiliate", "", Channel::Affiliates),
            ("partner-site", "link", "", Channel::Referral),
            ("spotify", "podcast_ad", "", Channel::Audio),
            ("sms", "", "", Channel::Sms),
            ("attentive", "text_message", "", Channel::Sms),
            ("braze", "mobile_push", "", Channel::MobilePushNotifications),
            ("firebase", "", "", Channel::MobilePushNotifications),
            ("onesignal", "web_push", "", Channel::MobilePushNotifications),
            ("my-custom-crm", "referral_partner_xyz", "", Channel::Unassigned),
        ];
        for (source, medium, campaign, expected) in cases {
            assert_eq!(
                c.classify(source, medium, campaign),
                expected,
                "classify({source:?}, {medium:?}, {campaign:?})"
            );
        }
    }

    #[test]
    fn test_paid_rules_recommend_the_generic_paid_mediums() {
        let paid = [
            Channel::PaidShopping,
            Channel::PaidSearch,
            Channel::PaidSocial,
            Channel::PaidVideo,
            Channel::PaidOther,
        ];
        for channel in paid {
            let mediums = channel_rule(channel).recommended_mediums;
            assert_eq!(&mediums[..3], &["cpc", "cpa", "cpv"]);
            assert!(mediums.contains(&"retargeting"), "{channel}");
            assert!(mediums[..11].iter().all(|m| is_paid_medium(m)), "{channel}");
        }
        assert_eq!(
            channel_rule(Channel::PaidOther).recommended_mediums.last(),
            Some(&"paid-other")
        );
    }

    #[test]
    fn test_paid_social_beats_paid_other() {
        let c = classifier();
        assert_eq!(c.classify("facebook.com", "cpc", ""), Channel::PaidSocial);
        assert_eq!(c.classify("www.facebook.com", "cpc", ""), Channel::PaidSocial);
    }

    #[test]
    fn test_paid_shopping_beats_paid_search_on_shopping_campaign() {
        let c = classifier();
        assert_eq!(c.classify("google", "cpc", "holiday-shopping"), Channel::PaidShopping);
    }

    #[test]
    fn test_cross_network_beats_paid() {
        let c = classifier();
        assert_eq!(c.classify("google", "cpc", "pmax-cross-network"), Channel::CrossNetwork);
    }

    #[test]
    fn test_direct_ignores_campaign() {
        let c = classifier();
        assert_eq!(c.classify("(direct)", "(none)", "anything"), Channel::Direct);
        assert_eq!(c.classify("(direct)", "(none)", "cross-network"), Channel::Direct);
    }

    #[test]
    fn test_direct_requires_literal_source() {
        let c = classifier();
        assert_eq!(c.classify("direct", "(none)", ""), Channel::Unassigned);
        assert_eq!(c.classify("(direct)", "none", ""), Channel::Unassigned);
    }

    #[test]
    fn test_case_and_whitespace_insensitive() {
        let c = classifier();
        assert_eq!(c.classify(" Google ", "CPC", ""), c.classify("google", "cpc", ""));
        assert_eq!(c.classify(" (DIRECT) ", " (None) ", ""), Channel::Direct);
    }

    #[test]
    fn test_www_is_not_stripped_for_literals() {
        let c = classifier();
        assert_eq!(c.classify("www.sms", "", ""), Channel::Unassigned);
        assert_eq!(c.classify("www.firebase", "", ""), Channel::Unassigned);
    }

    #[test]
    fn test_workshop_campaign_is_not_shopping() {
        let c = classifier();
        assert_eq!(c.classify("partner-site", "cpc", "spring_workshop"), Channel::PaidOther);
        assert_eq!(c.classify("partner-site", "referral", "spring_workshop"), Channel::Referral);
    }

    #[test]
    fn test_degraded_mode_uses_pattern_rules() {
        let c = ChannelClassifier::without_dataset();
        assert!(c.is_degraded());
        assert_eq!(c.classify("unknownsite.tld", "cpc", ""), Channel::PaidOther);
        assert_eq!(c.classify("google", "cpc", ""), Channel::PaidOther);
        assert_eq!(c.classify("google", "organic", ""), Channel::OrganicSearch);
        assert_eq!(c.classify("facebook.com", "", ""), Channel::Unassigned);
    }

    #[test]
    fn test_empty_inputs_fall_through() {
        let c = classifier();
        assert_eq!(c.classify("", "", ""), Channel::Unassigned);
        assert_eq!(c.classify("", "", "cross-network-q1"), Channel::CrossNetwork);
    }

    #[test]
    fn test_matching_rule_exposes_condition() {
        let c = classifier();
        let rule = c.matching_rule("bing", "organic", "");
        assert_eq!(rule.channel, Channel::OrganicSearch);
        assert!(rule.condition.contains("organic"));
    }
}
