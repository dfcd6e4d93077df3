//! Community outbreak reports.
//!
//! Growers report disease outbreaks they see in the field. A new report is
//! pending until a reviewer approves or rejects it. Its author may revise or
//! withdraw it for a short while after submitting.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::knowledge::Severity;
use crate::error::CropGuardError;

/// How long after submitting the author may still edit or delete a report.
pub const EDIT_WINDOW_MINUTES: i64 = 30;

/// Review state of an outbreak report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Parse from string, defaulting to `Pending`.
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "approved" => Self::Approved,
            "rejected" => Self::Rejected,
            _ => Self::Pending,
        }
    }

    /// Statuses that still appear in the review queue.
    pub fn review_queue() -> [Self; 2] {
        [Self::Pending, Self::Rejected]
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an outbreak was seen, in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CropGuardError> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(CropGuardError::invalid_input(format!(
                "coordinates out of range: {latitude}, {longitude}"
            )));
        }
        Ok(Self { latitude, longitude })
    }
}

/// The author-supplied part of a report, used both to submit and to revise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutbreakDetails {
    pub crop_type: String,
    pub disease_name: String,
    /// Low, medium or high
    pub severity: Severity,
    pub location: String,
    pub description: String,
    pub image_url: Option<String>,
    pub coordinates: Option<Coordinates>,
}

impl OutbreakDetails {
    pub fn new(
        crop_type: impl Into<String>,
        disease_name: impl Into<String>,
        severity: Severity,
    ) -> Self {
        Self {
            crop_type: crop_type.into(),
            disease_name: disease_name.into(),
            severity,
            location: String::new(),
            description: String::new(),
            image_url: None,
            coordinates: None,
        }
    }

    /// Trim text fields and drop a blank image URL.
    pub fn normalized(mut self) -> Self {
        for field in [
            &mut self.crop_type,
            &mut self.disease_name,
            &mut self.location,
            &mut self.description,
        ] {
            *field = field.trim().to_string();
        }
        self.image_url = self.image_url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty());
        self
    }

    /// Checks for a new report: crop, disease and a field-level severity.
    pub fn validate(&self) -> Result<(), CropGuardError> {
        require("crop type", &self.crop_type)?;
        require("disease name", &self.disease_name)?;
        if self.severity == Severity::Critical {
            return Err(CropGuardError::invalid_input(
                "outbreak severity must be low, medium or high",
            ));
        }
        Ok(())
    }

    /// Checks for a revision, which must also say where and what was seen.
    pub fn validate_revision(&self) -> Result<(), CropGuardError> {
        self.validate()?;
        require("location", &self.location)?;
        require("description", &self.description)
    }
}

fn require(field: &str, value: &str) -> Result<(), CropGuardError> {
    if value.trim().is_empty() {
        return Err(CropGuardError::invalid_input(format!("{field} is required")));
    }
    Ok(())
}

/// A stored outbreak report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutbreakReport {
    pub id: Uuid,
    /// User who submitted the report
    pub author_id: String,
    pub details: OutbreakDetails,
    pub status: ReportStatus,
    /// Reviewer behind the latest approve or reject
    pub reviewed_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OutbreakReport {
    pub fn is_author(&self, user_id: &str) -> bool {
        self.author_id == user_id
    }

    /// Last moment the author may edit or delete the report.
    pub fn edit_deadline(&self) -> DateTime<Utc> {
        self.created_at + Duration::minutes(EDIT_WINDOW_MINUTES)
    }

    /// Whether `user_id` may edit or delete the report at `now`.
    ///
    /// Only the author, only inside the edit window, and never once rejected.
    pub fn can_edit(&self, user_id: &str, now: DateTime<Utc>) -> bool {
        self.is_author(user_id) && self.status != ReportStatus::Rejected && now <= self.edit_deadline()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn report(status: ReportStatus) -> OutbreakReport {
        let created = Utc.with_ymd_and_hms(2026, 6, 1, 9, 0, 0).unwrap();
        OutbreakReport {
            id: Uuid::new_v4(),
            author_id: "alice".to_string(),
            details: OutbreakDetails::new("Tomato", "Late Blight", Severity::High),
            status,
            reviewed_by: None,
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(ReportStatus::parse("APPROVED"), ReportStatus::Approved);
        assert_eq!(ReportStatus::parse("rejected"), ReportStatus::Rejected);
        assert_eq!(ReportStatus::parse("unknown"), ReportStatus::Pending);
    }

    #[test]
    fn test_new_report_requires_crop_and_disease() {
        assert!(OutbreakDetails::new("Tomato", "Late Blight", Severity::Medium).validate().is_ok());

        let err = OutbreakDetails::new("  ", "Late Blight", Severity::Low).validate().unwrap_err();
        assert!(err.to_string().contains("crop type"));
        let err = OutbreakDetails::new("Tomato", "", Severity::Low).validate().unwrap_err();
        assert!(err.to_string().contains("disease name"));
        assert!(OutbreakDetails::new("Tomato", "Blight", Severity::Critical).validate().is_err());
    }

    #[test]
    fn test_revision_also_requires_location_and_description() {
        let mut details = OutbreakDetails::new("Tomato", "Late Blight", Severity::High);
        let err = details.validate_revision().unwrap_err();
        assert!(err.to_string().contains("location"));

        details.location = "North field".to_string();
        assert!(details.validate_revision().unwrap_err().to_string().contains("description"));

        details.description = "Dark lesions on most lower leaves".to_string();
        assert!(details.validate_revision().is_ok());
    }

    #[test]
    fn test_normalized_trims_and_drops_blank_image() {
        let mut details = OutbreakDetails::new(" Tomato ", "Late Blight\n", Severity::Low);
        details.image_url = Some("   ".to_string());
        let details = details.normalized();
        assert_eq!(details.crop_type, "Tomato");
        assert_eq!(details.disease_name, "Late Blight");
        assert_eq!(details.image_url, None);
    }

    #[test]
    fn test_coordinates_range() {
        assert!(Coordinates::new(-1.2921, 36.8219).is_ok());
        assert!(Coordinates::new(91.0, 0.0).is_err());
        assert!(Coordinates::new(0.0, -180.5).is_err());
    }

    #[test]
    fn test_edit_window() {
        let pending = report(ReportStatus::Pending);
        let at_deadline = pending.created_at + Duration::minutes(EDIT_WINDOW_MINUTES);

        assert!(pending.can_edit("alice", pending.created_at));
        assert!(pending.can_edit("alice", at_deadline));
        assert!(!pending.can_edit("alice", at_deadline + Duration::seconds(1)));
        assert!(!pending.can_edit("bob", pending.created_at));

        assert!(report(ReportStatus::Approved).can_edit("alice", pending.created_at));
        assert!(!report(ReportStatus::Rejected).can_edit("alice", pending.created_at));
    }
}
