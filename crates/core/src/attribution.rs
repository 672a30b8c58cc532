//! Multi-touch attribution resolution.
//!
//! A lead's attribution chain is rebuilt at creation time from the
//! acquisition fields accumulated on its session, merged field-by-field with
//! whatever the submission itself carried (submission wins). In the current
//! session model the chain has at most one entry, populated from the
//! session's first-touch fields; the resolver accepts a full ordered touch
//! list so a real touch log can be adopted without changing its contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::channel::Channel;

/// Weight assigned to the first touch in a chain.
pub const FIRST_TOUCH_WEIGHT: f64 = 1.0;

/// Weight assigned to every touch after the first.
///
/// Weights are not normalized; a chain's weights do not sum to 1. Downstream
/// reporting consumes them as-is.
pub const LATER_TOUCH_WEIGHT: f64 = 0.5;

/// Source recorded when no acquisition information exists.
pub const DIRECT_SOURCE: &str = "direct";

/// UTM parameters plus per-network ad click identifiers.
///
/// Field names follow the query parameters each ad network appends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AcquisitionFields {
    #[validate(length(max = 255))]
    pub utm_source: Option<String>,
    #[validate(length(max = 255))]
    pub utm_medium: Option<String>,
    #[validate(length(max = 255))]
    pub utm_campaign: Option<String>,
    #[validate(length(max = 255))]
    pub utm_term: Option<String>,
    #[validate(length(max = 255))]
    pub utm_content: Option<String>,

    /// Google Ads
    #[validate(length(max = 255))]
    pub gclid: Option<String>,
    /// Google Display & Video
    #[validate(length(max = 255))]
    pub dclid: Option<String>,
    /// Meta (Facebook/Instagram)
    #[validate(length(max = 255))]
    pub fbclid: Option<String>,
    /// Microsoft Ads
    #[validate(length(max = 255))]
    pub msclkid: Option<String>,
    /// TikTok Ads
    #[validate(length(max = 255))]
    pub ttclid: Option<String>,
    /// X/Twitter Ads
    #[validate(length(max = 255))]
    pub twclid: Option<String>,
    /// LinkedIn Ads
    #[validate(length(max = 255))]
    pub li_fat_id: Option<String>,
    /// Snapchat Ads
    #[validate(length(max = 255))]
    pub sccid: Option<String>,
}

fn has_value(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|v| !v.trim().is_empty())
}

impl AcquisitionFields {
    /// True when no UTM parameter or click identifier carries a value.
    pub fn is_empty(&self) -> bool {
        ![
            &self.utm_source,
            &self.utm_medium,
            &self.utm_campaign,
            &self.utm_term,
            &self.utm_content,
            &self.gclid,
            &self.dclid,
            &self.fbclid,
            &self.msclkid,
            &self.ttclid,
            &self.twclid,
            &self.li_fat_id,
            &self.sccid,
        ]
        .into_iter()
        .any(has_value)
    }

    /// True when a Google Ads click identifier is present (search or display).
    pub fn has_google_click_id(&self) -> bool {
        has_value(&self.gclid) || has_value(&self.dclid)
    }

    /// Merges `self` over `fallback`, field by field. Values present on
    /// `self` take precedence; absent fields fall back.
    pub fn merged_over(&self, fallback: &Self) -> Self {
        fn pick(primary: &Option<String>, fallback: &Option<String>) -> Option<String> {
            if has_value(primary) {
                primary.clone()
            } else {
                fallback.clone()
            }
        }

        Self {
            utm_source: pick(&self.utm_source, &fallback.utm_source),
            utm_medium: pick(&self.utm_medium, &fallback.utm_medium),
            utm_campaign: pick(&self.utm_campaign, &fallback.utm_campaign),
            utm_term: pick(&self.utm_term, &fallback.utm_term),
            utm_content: pick(&self.utm_content, &fallback.utm_content),
            gclid: pick(&self.gclid, &fallback.gclid),
            dclid: pick(&self.dclid, &fallback.dclid),
            fbclid: pick(&self.fbclid, &fallback.fbclid),
            msclkid: pick(&self.msclkid, &fallback.msclkid),
            ttclid: pick(&self.ttclid, &fallback.ttclid),
            twclid: pick(&self.twclid, &fallback.twclid),
            li_fat_id: pick(&self.li_fat_id, &fallback.li_fat_id),
            sccid: pick(&self.sccid, &fallback.sccid),
        }
    }

    /// Best-effort source name: the UTM source when tagged, otherwise the
    /// ad network inferred from whichever click identifier is present.
    pub fn inferred_source(&self) -> Option<String> {
        if has_value(&self.utm_source) {
            return self.utm_source.clone();
        }

        let networks: [(&Option<String>, &str); 8] = [
            (&self.gclid, "google"),
            (&self.dclid, "google"),
            (&self.fbclid, "facebook"),
            (&self.msclkid, "microsoft"),
            (&self.ttclid, "tiktok"),
            (&self.twclid, "twitter"),
            (&self.li_fat_id, "linkedin"),
            (&self.sccid, "snapchat"),
        ];
        networks
            .into_iter()
            .find(|(id, _)| has_value(id))
            .map(|(_, network)| network.to_string())
    }

    /// Builds the ordered touch list for attribution.
    ///
    /// At most one entry in the current session model: the session only
    /// records its first-touch fields, so first and last source coincide.
    pub fn to_source_touches(&self, observed_at: DateTime<Utc>) -> Vec<SourceTouch> {
        if self.is_empty() {
            return Vec::new();
        }

        vec![SourceTouch {
            source: self
                .inferred_source()
                .unwrap_or_else(|| DIRECT_SOURCE.to_string()),
            medium: self.utm_medium.clone(),
            campaign: self.utm_campaign.clone(),
            observed_at,
        }]
    }
}

/// One UTM-tagged touch observed during a session's lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceTouch {
    pub source: String,
    pub medium: Option<String>,
    pub campaign: Option<String>,
    pub observed_at: DateTime<Utc>,
}

/// Position of a touch within the attribution chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TouchType {
    FirstTouch,
    MiddleTouch,
    ConversionTouch,
}

impl TouchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FirstTouch => "FIRST_TOUCH",
            Self::MiddleTouch => "MIDDLE_TOUCH",
            Self::ConversionTouch => "CONVERSION_TOUCH",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "FIRST_TOUCH" => Some(Self::FirstTouch),
            "MIDDLE_TOUCH" => Some(Self::MiddleTouch),
            "CONVERSION_TOUCH" => Some(Self::ConversionTouch),
            _ => None,
        }
    }
}

/// Attribution model tag recorded on every touchpoint.
///
/// Every touch is tagged `FIRST_TOUCH` regardless of its position or weight.
/// The per-touch `touch_type` carries the real position; this tag is what
/// downstream reporting keys on today, so it is kept as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttributionModel {
    FirstTouch,
}

impl AttributionModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FirstTouch => "FIRST_TOUCH",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "FIRST_TOUCH" => Some(Self::FirstTouch),
            _ => None,
        }
    }
}

/// One attributed marketing touch contributing to a lead's conversion.
///
/// Created once at lead-creation time; immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Touchpoint {
    pub id: Uuid,
    pub lead_id: Uuid,
    pub session_id: Option<Uuid>,
    pub touch_type: TouchType,
    pub channel: Channel,
    pub source: String,
    pub medium: Option<String>,
    pub campaign: Option<String>,
    pub occurred_at: DateTime<Utc>,
    pub model: AttributionModel,
    pub weight: f64,
}

/// Resolved attribution for a new lead.
#[derive(Debug, Clone)]
pub struct Attribution {
    pub original_source: String,
    pub last_source: String,
    pub touchpoints: Vec<Touchpoint>,
}

/// Derives original/last source and the weighted touchpoint chain from an
/// ordered touch list.
///
/// An empty list yields `original == last == "direct"` and no touchpoints.
pub fn resolve_attribution(
    touches: &[SourceTouch],
    lead_id: Uuid,
    session_id: Option<Uuid>,
) -> Attribution {
    if touches.is_empty() {
        return Attribution {
            original_source: DIRECT_SOURCE.to_string(),
            last_source: DIRECT_SOURCE.to_string(),
            touchpoints: Vec::new(),
        };
    }

    let last = touches.len() - 1;
    let touchpoints = touches
        .iter()
        .enumerate()
        .map(|(i, touch)| {
            let touch_type = if i == 0 {
                TouchType::FirstTouch
            } else if i == last {
                TouchType::ConversionTouch
            } else {
                TouchType::MiddleTouch
            };
            let weight = if i == 0 {
                FIRST_TOUCH_WEIGHT
            } else {
                LATER_TOUCH_WEIGHT
            };

            Touchpoint {
                id: Uuid::new_v4(),
                lead_id,
                session_id,
                touch_type,
                channel: Channel::from_medium(touch.medium.as_deref()),
                source: touch.source.clone(),
                medium: touch.medium.clone(),
                campaign: touch.campaign.clone(),
                occurred_at: touch.observed_at,
                model: AttributionModel::FirstTouch,
                weight,
            }
        })
        .collect();

    Attribution {
        original_source: touches[0].source.clone(),
        last_source: touches[last].source.clone(),
        touchpoints,
    }
}
