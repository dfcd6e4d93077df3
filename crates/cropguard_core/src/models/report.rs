//! Health report produced by one plant scan.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::knowledge::{DiseaseRecord, PestRecord, Prevention, Severity, Treatment};
use super::subscription::Entitlement;

/// Structured output of one plant scan.
///
/// Built by the report assembler; `is_healthy` and `overall_health` are derived
/// there and never set independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    /// Client-generated id, also the persistence key
    pub scan_id: Uuid,
    /// Class label the selector picked (e.g. "Tomato___Late_blight")
    pub label: String,
    pub plant_name: String,
    pub scientific_name: String,
    /// 0.0-1.0
    pub confidence: f64,
    pub is_healthy: bool,
    pub diseases: Vec<DiseaseRecord>,
    pub pests: Vec<PestRecord>,
    /// 0-100
    pub overall_health: u8,
    pub recommendations: Vec<String>,
    pub next_steps: Vec<String>,
    pub scan_date: DateTime<Utc>,
    /// URL or path of the scanned image
    pub image_reference: String,
}

impl HealthReport {
    /// Coarse health band used for display colors and filtering.
    pub fn band(&self) -> HealthBand {
        HealthBand::from_score(self.overall_health)
    }

    /// Worst severity among the detected diseases and pests.
    pub fn worst_severity(&self) -> Option<Severity> {
        self.diseases
            .iter()
            .map(|d| d.severity)
            .chain(self.pests.iter().map(|p| p.severity))
            .max()
    }

    /// Disease names, or "No disease detected".
    pub fn disease_summary(&self) -> String {
        if self.diseases.is_empty() {
            "No disease detected".to_string()
        } else {
            self.diseases.iter().map(|d| d.name.as_str()).collect::<Vec<_>>().join(", ")
        }
    }

    /// Pest names, or "No pest detected".
    pub fn pest_summary(&self) -> String {
        if self.pests.is_empty() {
            "No pest detected".to_string()
        } else {
            self.pests.iter().map(|p| p.name.as_str()).collect::<Vec<_>>().join(", ")
        }
    }

    /// Plain-text summary suitable for sharing.
    pub fn share_message(&self) -> String {
        let status = if self.is_healthy { "Healthy" } else { "Unhealthy" };
        format!(
            "My Plant Health Scan Results from Crop Guard\n\n\
             Just scanned my {} using Crop Guard! Here's what I found:\n\n\
             Status: {}\n\
             Disease Detected: {}\n\
             Pest Detected: {}\n\
             Overall Health: {}%\n\n\
             View the scan image: {}",
            self.plant_name,
            status,
            self.disease_summary(),
            self.pest_summary(),
            self.overall_health,
            self.image_reference,
        )
    }

    /// Render the report for a user with the given entitlement.
    ///
    /// Descriptions, treatments, prevention and next steps are premium content.
    pub fn view(&self, entitlement: Entitlement) -> ReportView {
        let premium = entitlement.is_premium();

        let diseases = self
            .diseases
            .iter()
            .map(|d| FindingView {
                id: d.id.clone(),
                name: d.name.clone(),
                scientific_name: d.scientific_name.clone(),
                severity: d.severity,
                symptoms: d.symptoms.clone(),
                description: premium.then(|| d.description.clone()),
                treatments: premium.then(|| d.treatments.clone()),
                prevention: premium.then(|| d.prevention.clone()),
            })
            .collect();

        let pests = self
            .pests
            .iter()
            .map(|p| FindingView {
                id: p.id.clone(),
                name: p.name.clone(),
                scientific_name: p.scientific_name.clone(),
                severity: p.severity,
                symptoms: p.symptoms.clone(),
                description: premium.then(|| p.description.clone()),
                treatments: premium.then(|| p.treatments.clone()),
                prevention: premium.then(|| p.prevention.clone()),
            })
            .collect();

        ReportView {
            scan_id: self.scan_id,
            plant_name: self.plant_name.clone(),
            scientific_name: self.scientific_name.clone(),
            confidence: self.confidence,
            is_healthy: self.is_healthy,
            overall_health: self.overall_health,
            band: self.band(),
            worst_severity: self.worst_severity(),
            diseases,
            pests,
            recommendations: self.recommendations.clone(),
            next_steps: premium.then(|| self.next_steps.clone()),
            scan_date: self.scan_date,
            image_reference: self.image_reference.clone(),
            premium,
        }
    }
}

/// Coarse grouping of the 0-100 health score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthBand {
    /// 80 and above
    Good,
    /// 60-79
    Fair,
    /// 40-59
    Poor,
    /// Below 40
    Critical,
}

impl HealthBand {
    pub fn from_score(score: u8) -> Self {
        match score {
            80.. => Self::Good,
            60..=79 => Self::Fair,
            40..=59 => Self::Poor,
            _ => Self::Critical,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Fair => "fair",
            Self::Poor => "poor",
            Self::Critical => "critical",
        }
    }
}

/// A disease or pest as shown to a user. Premium-only fields are `None` for free users.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FindingView {
    pub id: String,
    pub name: String,
    pub scientific_name: String,
    pub severity: Severity,
    pub symptoms: Vec<String>,
    pub description: Option<String>,
    pub treatments: Option<Vec<Treatment>>,
    pub prevention: Option<Vec<Prevention>>,
}

/// Entitlement-filtered rendering of a [`HealthReport`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportView {
    pub scan_id: Uuid,
    pub plant_name: String,
    pub scientific_name: String,
    pub confidence: f64,
    pub is_healthy: bool,
    pub overall_health: u8,
    pub band: HealthBand,
    /// `None` for a healthy plant
    pub worst_severity: Option<Severity>,
    pub diseases: Vec<FindingView>,
    pub pests: Vec<FindingView>,
    pub recommendations: Vec<String>,
    pub next_steps: Option<Vec<String>>,
    pub scan_date: DateTime<Utc>,
    pub image_reference: String,
    /// Whether premium content was included
    pub premium: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_band_boundaries() {
        assert_eq!(HealthBand::from_score(100), HealthBand::Good);
        assert_eq!(HealthBand::from_score(80), HealthBand::Good);
        assert_eq!(HealthBand::from_score(79), HealthBand::Fair);
        assert_eq!(HealthBand::from_score(60), HealthBand::Fair);
        assert_eq!(HealthBand::from_score(59), HealthBand::Poor);
        assert_eq!(HealthBand::from_score(40), HealthBand::Poor);
        assert_eq!(HealthBand::from_score(39), HealthBand::Critical);
        assert_eq!(HealthBand::from_score(0), HealthBand::Critical);
    }
}
