//! Subscription and entitlement models.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Length of a premium billing period.
pub const PREMIUM_PERIOD_DAYS: i64 = 30;

/// Subscription level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    #[default]
    Free,
    Premium,
}

impl SubscriptionTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Premium => "premium",
        }
    }

    /// Parse from string, defaulting to `Free`.
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "premium" => Self::Premium,
            _ => Self::Free,
        }
    }
}

/// Subscription status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    #[default]
    Active,
    Inactive,
    Expired,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Expired => "expired",
        }
    }

    /// Parse from string, defaulting to `Active`.
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "inactive" => Self::Inactive,
            "expired" => Self::Expired,
            _ => Self::Active,
        }
    }
}

/// A user's subscription. Users without a stored subscription are free/active.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub tier: SubscriptionTier,
    pub status: SubscriptionStatus,
    pub expiry_date: Option<DateTime<Utc>>,
}

impl Subscription {
    /// The free plan.
    pub fn free() -> Self {
        Self::default()
    }

    /// A premium plan activated at `now`, valid for one billing period.
    pub fn premium_from(now: DateTime<Utc>) -> Self {
        Self {
            tier: SubscriptionTier::Premium,
            status: SubscriptionStatus::Active,
            expiry_date: Some(now + Duration::days(PREMIUM_PERIOD_DAYS)),
        }
    }

    /// Whether premium content is unlocked at `now`.
    pub fn has_premium_access(&self, now: DateTime<Utc>) -> bool {
        if self.tier != SubscriptionTier::Premium || self.status != SubscriptionStatus::Active {
            return false;
        }
        match self.expiry_date {
            Some(expiry) => expiry >= now,
            None => true,
        }
    }

    /// Resolve the entitlement in effect at `now`.
    pub fn entitlement(&self, now: DateTime<Utc>) -> Entitlement {
        if self.has_premium_access(now) {
            Entitlement::Premium
        } else {
            Entitlement::Free
        }
    }

    /// Whole days until expiry, rounded up. Zero when there is no expiry date.
    pub fn days_until_expiry(&self, now: DateTime<Utc>) -> i64 {
        let Some(expiry) = self.expiry_date else {
            return 0;
        };
        let millis = (expiry - now).num_milliseconds();
        let day = Duration::days(1).num_milliseconds();
        // ceiling division that also works for negative spans
        -((-millis).div_euclid(day))
    }

    /// Expiry date formatted for display, e.g. "November 16, 2026".
    pub fn format_expiry(&self) -> String {
        self.expiry_date.map(|d| d.format("%B %-d, %Y").to_string()).unwrap_or_default()
    }
}

/// What content the current user may see.
///
/// Passed explicitly into report rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Entitlement {
    Free,
    Premium,
}

impl Entitlement {
    pub fn is_premium(&self) -> bool {
        matches!(self, Self::Premium)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, day, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_free_has_no_premium_access() {
        let sub = Subscription::free();
        assert!(!sub.has_premium_access(at(1)));
        assert_eq!(sub.entitlement(at(1)), Entitlement::Free);
        assert_eq!(sub.days_until_expiry(at(1)), 0);
    }

    #[test]
    fn test_premium_expires_after_period() {
        let sub = Subscription::premium_from(at(1));
        assert!(sub.has_premium_access(at(1)));
        assert!(sub.has_premium_access(at(31)));
        assert!(!sub.has_premium_access(at(31) + Duration::seconds(1)));
        assert_eq!(sub.entitlement(at(15)), Entitlement::Premium);
    }

    #[test]
    fn test_inactive_premium_is_free() {
        let sub = Subscription { status: SubscriptionStatus::Inactive, ..Subscription::premium_from(at(1)) };
        assert_eq!(sub.entitlement(at(2)), Entitlement::Free);
    }

    #[test]
    fn test_premium_without_expiry_never_lapses() {
        let sub = Subscription {
            tier: SubscriptionTier::Premium,
            status: SubscriptionStatus::Active,
            expiry_date: None,
        };
        assert!(sub.has_premium_access(at(28)));
    }

    #[test]
    fn test_days_until_expiry_rounds_up() {
        let sub = Subscription::premium_from(at(1));
        assert_eq!(sub.days_until_expiry(at(1)), 30);
        assert_eq!(sub.days_until_expiry(at(1) + Duration::hours(1)), 30);
        assert_eq!(sub.days_until_expiry(at(30)), 1);
        assert_eq!(sub.days_until_expiry(at(31) + Duration::days(2)), -2);
    }

    #[test]
    fn test_format_expiry() {
        let sub = Subscription::premium_from(at(1));
        assert_eq!(sub.format_expiry(), "October 31, 2026");
    }
}
