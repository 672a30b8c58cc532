//! Lead and client-profile score calculation.
//!
//! Two independent additive point models, both deterministic and clamped to
//! [0, 100]:
//! - `score_lead` rates a raw form submission from contact completeness,
//!   behavioral engagement, and acquisition quality.
//! - `score_client_profile` rates a CRM client record from investment
//!   profile fields.
//!
//! The tables are intentionally separate; they answer different questions
//! and must not be merged.

use serde::{Deserialize, Serialize};

use crate::attribution::AcquisitionFields;
use crate::lead::BehavioralSnapshot;
use crate::submission::LeadSubmission;

/// Upper bound for every score this module produces.
pub const MAX_SCORE: u32 = 100;

/// Points for an unrecognized or missing form type.
pub const DEFAULT_FORM_TYPE_POINTS: u32 = 10;

fn present(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|v| !v.trim().is_empty())
}

/// Known form/record submission types, highest-intent first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormType {
    Consultation,
    Valuation,
    Viewing,
    Contact,
    Brochure,
    Newsletter,
}

impl FormType {
    /// Case-insensitive parse of the submission's type discriminator.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "consultation" => Some(Self::Consultation),
            "valuation" => Some(Self::Valuation),
            "viewing" => Some(Self::Viewing),
            "contact" => Some(Self::Contact),
            "brochure" => Some(Self::Brochure),
            "newsletter" => Some(Self::Newsletter),
            _ => None,
        }
    }

    /// Point value of this submission type. A consultation request is the
    /// strongest intent signal; a newsletter signup the weakest.
    pub fn points(&self) -> u32 {
        match self {
            Self::Consultation => 25,
            Self::Valuation => 20,
            Self::Viewing => 15,
            Self::Contact => 10,
            Self::Brochure => 10,
            Self::Newsletter => 5,
        }
    }
}

/// Points for a raw form-type discriminator, defaulting when unrecognized.
pub fn form_type_points(raw: Option<&str>) -> u32 {
    raw.and_then(FormType::parse)
        .map(|t| t.points())
        .unwrap_or(DEFAULT_FORM_TYPE_POINTS)
}

/// Scores a lead submission in [0, 100].
///
/// Additive model:
/// - Contact completeness: name +10, email +20, phone +15, company +10.
/// - Behavior, each capped independently: pages * 3 (max 30),
///   minutes-on-site * 2 (max 20), events * 2 (max 20).
/// - Acquisition quality, stacking: utm_source "google" +10,
///   utm_medium "cpc" +5, Google click id present +5.
/// - Form type table (exactly one applies), see [`FormType::points`].
///
/// All terms are non-negative; the sum is clamped to 100. Total for any
/// well-typed input; missing optional fields contribute zero.
pub fn score_lead(
    submission: &LeadSubmission,
    behavior: &BehavioralSnapshot,
    acquisition: &AcquisitionFields,
) -> u8 {
    let mut score: u32 = 0;

    // Contact completeness
    if present(&submission.name) {
        score += 10;
    }
    if present(&submission.email) {
        score += 20;
    }
    if present(&submission.phone) {
        score += 15;
    }
    if present(&submission.company) {
        score += 10;
    }

    // Behavioral signals, each independently capped
    score += behavior.pages_visited.saturating_mul(3).min(30);
    score += (behavior.time_on_site_secs / 60).saturating_mul(2).min(20);
    score += behavior.events_triggered.saturating_mul(2).min(20);

    // Acquisition-quality bonus; the three signals are independent and stack
    if acquisition.utm_source.as_deref() == Some("google") {
        score += 10;
    }
    if acquisition.utm_medium.as_deref() == Some("cpc") {
        score += 5;
    }
    if acquisition.has_google_click_id() {
        score += 5;
    }

    score += form_type_points(submission.form_type.as_deref());

    score.min(MAX_SCORE) as u8
}

/// Investment budget tier declared on a client profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BudgetTier {
    #[serde(rename = "under_250k")]
    Under250k,
    #[serde(rename = "250k_500k")]
    From250kTo500k,
    #[serde(rename = "500k_1m")]
    From500kTo1m,
    #[serde(rename = "1m_5m")]
    From1mTo5m,
    #[serde(rename = "over_5m")]
    Over5m,
}

impl BudgetTier {
    pub fn points(&self) -> u32 {
        match self {
            Self::Under250k => 5,
            Self::From250kTo500k => 10,
            Self::From500kTo1m => 15,
            Self::From1mTo5m => 20,
            Self::Over5m => 25,
        }
    }
}

/// How the client originally reached the agency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadSource {
    Referral,
    Website,
    SocialMedia,
    Advertising,
    ColdCall,
    Other,
}

impl LeadSource {
    pub fn points(&self) -> u32 {
        match self {
            Self::Referral => 20,
            Self::Website => 12,
            Self::SocialMedia => 8,
            Self::Advertising => 6,
            Self::ColdCall => 4,
            Self::Other => 5,
        }
    }
}

/// Declared investment goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvestmentGoal {
    CapitalGrowth,
    RentalIncome,
    Relocation,
    VacationHome,
    Other,
}

impl InvestmentGoal {
    pub fn points(&self) -> u32 {
        match self {
            Self::CapitalGrowth => 15,
            Self::RentalIncome => 12,
            Self::Relocation => 10,
            Self::VacationHome => 8,
            Self::Other => 5,
        }
    }
}

/// Declared risk tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTolerance {
    High,
    Medium,
    Low,
}

impl RiskTolerance {
    pub fn points(&self) -> u32 {
        match self {
            Self::High => 10,
            Self::Medium => 7,
            Self::Low => 5,
        }
    }
}

/// A CRM client profile as submitted for scoring.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientProfile {
    pub budget: Option<BudgetTier>,
    pub lead_source: Option<LeadSource>,
    pub investment_goal: Option<InvestmentGoal>,
    pub risk_tolerance: Option<RiskTolerance>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub nationality: Option<String>,
    pub profession: Option<String>,
    #[serde(default)]
    pub preferred_areas: Vec<String>,
}

/// Scores a CRM client profile in [0, 100].
///
/// Additive model over budget tier, lead source, investment goal, risk
/// tolerance, plus a profile-completeness bonus: phone +5, company +4,
/// nationality +3, profession +3, any preferred areas +5. Missing fields
/// contribute zero; the sum is clamped to 100.
pub fn score_client_profile(profile: &ClientProfile) -> u8 {
    let mut score: u32 = 0;

    score += profile.budget.map(|t| t.points()).unwrap_or(0);
    score += profile.lead_source.map(|s| s.points()).unwrap_or(0);
    score += profile.investment_goal.map(|g| g.points()).unwrap_or(0);
    score += profile.risk_tolerance.map(|r| r.points()).unwrap_or(0);

    // Profile completeness
    if present(&profile.phone) {
        score += 5;
    }
    if present(&profile.company) {
        score += 4;
    }
    if present(&profile.nationality) {
        score += 3;
    }
    if present(&profile.profession) {
        score += 3;
    }
    if !profile.preferred_areas.is_empty() {
        score += 5;
    }

    score.min(MAX_SCORE) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_submission() -> LeadSubmission {
        LeadSubmission::default()
    }

    #[test]
    fn test_score_is_clamped_under_extreme_input() {
        let submission = LeadSubmission {
            name: Some("Ana Ferreira".into()),
            email: Some("ana@example.com".into()),
            phone: Some("+351910000000".into()),
            company: Some("Ferreira Holdings".into()),
            form_type: Some("consultation".into()),
            ..Default::default()
        };
        let behavior = BehavioralSnapshot {
            pages_visited: u32::MAX,
            time_on_site_secs: u32::MAX,
            events_triggered: u32::MAX,
            visits_before_conversion: 1,
        };
        let acquisition = AcquisitionFields {
            utm_source: Some("google".into()),
            utm_medium: Some("cpc".into()),
            gclid: Some("Cj0KCQ".into()),
            ..Default::default()
        };

        assert_eq!(score_lead(&submission, &behavior, &acquisition), 100);
    }

    #[test]
    fn test_behavioral_caps() {
        let behavior = BehavioralSnapshot {
            pages_visited: 100,
            time_on_site_secs: 3600,
            events_triggered: 50,
            visits_before_conversion: 1,
        };
        // 30 + 20 + 20 behavioral points, plus the default form-type value.
        let score = score_lead(
            &empty_submission(),
            &behavior,
            &AcquisitionFields::default(),
        );
        assert_eq!(score as u32, 30 + 20 + 20 + DEFAULT_FORM_TYPE_POINTS);
    }

    #[test]
    fn test_contact_fields_are_monotonic() {
        let behavior = BehavioralSnapshot::default();
        let acquisition = AcquisitionFields::default();
        let base = score_lead(&empty_submission(), &behavior, &acquisition);

        for field in ["name", "email", "phone", "company"] {
            let mut submission = empty_submission();
            match field {
                "name" => submission.name = Some("A".into()),
                "email" => submission.email = Some("a@x.com".into()),
                "phone" => submission.phone = Some("+1555".into()),
                _ => submission.company = Some("Acme".into()),
            }
            let score = score_lead(&submission, &behavior, &acquisition);
            assert!(score >= base, "adding {} decreased the score", field);
        }
    }

    #[test]
    fn test_consultation_submission_literal_score() {
        // name (10) + email (20) + consultation (25), nothing else.
        let submission = LeadSubmission {
            name: Some("A".into()),
            email: Some("a@x.com".into()),
            form_type: Some("consultation".into()),
            ..Default::default()
        };
        let score = score_lead(
            &submission,
            &BehavioralSnapshot::default(),
            &AcquisitionFields::default(),
        );
        assert_eq!(score, 55);
    }

    #[test]
    fn test_acquisition_bonuses_stack() {
        // google (10) + cpc (5) + gclid (5) + default form type (10).
        let acquisition = AcquisitionFields {
            utm_source: Some("google".into()),
            utm_medium: Some("cpc".into()),
            gclid: Some("Cj0KCQ".into()),
            ..Default::default()
        };
        let score = score_lead(
            &empty_submission(),
            &BehavioralSnapshot::default(),
            &acquisition,
        );
        assert_eq!(score as u32, 20 + DEFAULT_FORM_TYPE_POINTS);
    }

    #[test]
    fn test_whitespace_fields_contribute_zero() {
        let submission = LeadSubmission {
            name: Some("   ".into()),
            ..Default::default()
        };
        let score = score_lead(
            &submission,
            &BehavioralSnapshot::default(),
            &AcquisitionFields::default(),
        );
        assert_eq!(score as u32, DEFAULT_FORM_TYPE_POINTS);
    }

    #[test]
    fn test_form_type_table() {
        assert_eq!(form_type_points(Some("consultation")), 25);
        assert_eq!(form_type_points(Some("valuation")), 20);
        assert_eq!(form_type_points(Some("viewing")), 15);
        assert_eq!(form_type_points(Some("contact")), 10);
        assert_eq!(form_type_points(Some("brochure")), 10);
        assert_eq!(form_type_points(Some("newsletter")), 5);
        assert_eq!(form_type_points(Some("CONSULTATION")), 25);
        assert_eq!(
            form_type_points(Some("webinar")),
            DEFAULT_FORM_TYPE_POINTS
        );
        assert_eq!(form_type_points(None), DEFAULT_FORM_TYPE_POINTS);
    }

    #[test]
    fn test_client_profile_empty_scores_zero() {
        assert_eq!(score_client_profile(&ClientProfile::default()), 0);
    }

    #[test]
    fn test_client_profile_full_table() {
        let profile = ClientProfile {
            budget: Some(BudgetTier::From1mTo5m),
            lead_source: Some(LeadSource::Referral),
            investment_goal: Some(InvestmentGoal::CapitalGrowth),
            risk_tolerance: Some(RiskTolerance::Medium),
            phone: Some("+351910000000".into()),
            company: Some("Atl Capital".into()),
            nationality: Some("PT".into()),
            profession: Some("Engineer".into()),
            preferred_areas: vec!["Chiado".into(), "Alfama".into()],
        };
        // 20 + 20 + 15 + 7 + (5 + 4 + 3 + 3 + 5) = 82
        assert_eq!(score_client_profile(&profile), 82);
    }

    #[test]
    fn test_client_profile_clamped() {
        let profile = ClientProfile {
            budget: Some(BudgetTier::Over5m),
            lead_source: Some(LeadSource::Referral),
            investment_goal: Some(InvestmentGoal::CapitalGrowth),
            risk_tolerance: Some(RiskTolerance::High),
            phone: Some("+1".into()),
            company: Some("C".into()),
            nationality: Some("US".into()),
            profession: Some("CEO".into()),
            preferred_areas: vec!["Belem".into()],
        };
        // 25 + 20 + 15 + 10 + 20 = 90; stays within bounds.
        let score = score_client_profile(&profile);
        assert_eq!(score, 90);
        assert!(score as u32 <= MAX_SCORE);
    }
}
