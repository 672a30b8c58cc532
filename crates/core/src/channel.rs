//! Marketing channel classification.

use serde::{Deserialize, Serialize};

/// Normalized marketing channel category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Paid,
    Social,
    Email,
    Organic,
    Referral,
    Direct,
    Other,
}

impl Channel {
    /// Returns the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Paid => "paid",
            Self::Social => "social",
            Self::Email => "email",
            Self::Organic => "organic",
            Self::Referral => "referral",
            Self::Direct => "direct",
            Self::Other => "other",
        }
    }

    /// Parses a stored channel string back into the enum.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "paid" => Some(Self::Paid),
            "social" => Some(Self::Social),
            "email" => Some(Self::Email),
            "organic" => Some(Self::Organic),
            "referral" => Some(Self::Referral),
            "direct" => Some(Self::Direct),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    /// Classifies a raw UTM medium into a channel category.
    ///
    /// Missing or empty medium means the visitor arrived with no campaign
    /// tagging at all, which we treat as direct traffic. Matching is
    /// case-insensitive and exact; any unrecognized non-empty medium falls
    /// into `Other` rather than failing.
    pub fn from_medium(medium: Option<&str>) -> Self {
        let medium = match medium {
            Some(m) if !m.trim().is_empty() => m.trim().to_ascii_lowercase(),
            _ => return Self::Direct,
        };

        match medium.as_str() {
            "cpc" | "ppc" | "display" => Self::Paid,
            "social" => Self::Social,
            "email" => Self::Email,
            "organic" => Self::Organic,
            "referral" => Self::Referral,
            _ => Self::Other,
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_mediums() {
        assert_eq!(Channel::from_medium(Some("cpc")), Channel::Paid);
        assert_eq!(Channel::from_medium(Some("ppc")), Channel::Paid);
        assert_eq!(Channel::from_medium(Some("display")), Channel::Paid);
        assert_eq!(Channel::from_medium(Some("social")), Channel::Social);
        assert_eq!(Channel::from_medium(Some("email")), Channel::Email);
        assert_eq!(Channel::from_medium(Some("organic")), Channel::Organic);
        assert_eq!(Channel::from_medium(Some("referral")), Channel::Referral);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(Channel::from_medium(Some("CPC")), Channel::Paid);
        assert_eq!(Channel::from_medium(Some("Cpc")), Channel::Paid);
        assert_eq!(
            Channel::from_medium(Some("CPC")),
            Channel::from_medium(Some("cpc"))
        );
        assert_eq!(Channel::from_medium(Some("EMAIL")), Channel::Email);
    }

    #[test]
    fn test_missing_or_empty_is_direct() {
        assert_eq!(Channel::from_medium(None), Channel::Direct);
        assert_eq!(Channel::from_medium(Some("")), Channel::Direct);
        assert_eq!(Channel::from_medium(Some("   ")), Channel::Direct);
    }

    #[test]
    fn test_unrecognized_is_other() {
        assert_eq!(Channel::from_medium(Some("banner-ads")), Channel::Other);
        assert_eq!(Channel::from_medium(Some("affiliate")), Channel::Other);
        assert_eq!(Channel::from_medium(Some("qr-code")), Channel::Other);
    }

    #[test]
    fn test_parse_round_trip() {
        for ch in [
            Channel::Paid,
            Channel::Social,
            Channel::Email,
            Channel::Organic,
            Channel::Referral,
            Channel::Direct,
            Channel::Other,
        ] {
            assert_eq!(Channel::parse(ch.as_str()), Some(ch));
        }
        assert_eq!(Channel::parse("banner"), None);
    }
}
