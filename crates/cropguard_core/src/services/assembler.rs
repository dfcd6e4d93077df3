//! Report assembly: turns a selected label into a [`HealthReport`].

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::classifier::{mapping_for, LabelMapping};
use super::features::FeatureVector;
use super::knowledge_base::KnowledgeBase;
use crate::error::CropGuardError;
use crate::models::{HealthReport, Severity};

/// Lowest confidence a report will carry.
pub const MIN_CONFIDENCE: f64 = 0.70;
/// Highest confidence a report will carry.
pub const MAX_CONFIDENCE: f64 = 0.99;

/// Score for a plant with nothing detected.
const HEALTHY_BASE_SCORE: f64 = 95.0;
/// Deducted for every finding beyond the worst one.
const EXTRA_FINDING_PENALTY: f64 = 5.0;

const DISEASE_RECOMMENDATIONS: [&str; 3] = [
    "Improve air circulation around plants",
    "Avoid overhead watering",
    "Remove affected plant parts",
];

const PEST_RECOMMENDATIONS: [&str; 3] = [
    "Monitor plants regularly for pest activity",
    "Encourage beneficial insects",
    "Maintain plant health to resist pest damage",
];

const HEALTHY_RECOMMENDATIONS: [&str; 3] = [
    "Plant appears healthy - continue good care practices",
    "Monitor regularly for early signs of problems",
    "Maintain proper watering and nutrition",
];

const DISEASE_NEXT_STEPS: [&str; 4] = [
    "Apply first treatment within 24-48 hours",
    "Monitor plant response over next 7 days",
    "Take follow-up photos to track progress",
    "Adjust treatment if no improvement seen",
];

const PEST_NEXT_STEPS: [&str; 4] = [
    "Begin pest control measures immediately",
    "Check nearby plants for similar issues",
    "Reapply treatments as per schedule",
    "Evaluate effectiveness after 1 week",
];

const FINAL_NEXT_STEP: &str = "Document findings for future reference";

/// Confidence derived from feature spread: tighter features, higher confidence.
pub fn confidence(features: &FeatureVector) -> f64 {
    (MAX_CONFIDENCE - features.variance()).clamp(MIN_CONFIDENCE, MAX_CONFIDENCE)
}

/// Overall health score (0-100) from the severities of detected diseases and pests.
///
/// Nothing detected scores 95. Otherwise the worst severity across both
/// lists sets the base (low 80, medium 65, high 50, critical 30) and every
/// further finding costs 5. A single finding therefore lands in the band
/// that [`severity_level`](super::advice::severity_level) maps back to its
/// own severity.
pub fn health_score(disease_severities: &[Severity], pest_severities: &[Severity]) -> u8 {
    let findings = disease_severities.iter().chain(pest_severities);
    let Some(worst) = findings.clone().max() else {
        return HEALTHY_BASE_SCORE as u8;
    };

    let extra = findings.count().saturating_sub(1) as f64;
    let score = severity_base(*worst) - extra * EXTRA_FINDING_PENALTY;
    score.round().clamp(0.0, 100.0) as u8
}

fn severity_base(severity: Severity) -> f64 {
    match severity {
        Severity::Low => 80.0,
        Severity::Medium => 65.0,
        Severity::High => 50.0,
        Severity::Critical => 30.0,
    }
}

/// Builds health reports from classification labels.
#[derive(Debug, Clone, Copy)]
pub struct ReportAssembler {
    knowledge: &'static KnowledgeBase,
}

impl Default for ReportAssembler {
    fn default() -> Self {
        Self::new(KnowledgeBase::builtin())
    }
}

impl ReportAssembler {
    pub fn new(knowledge: &'static KnowledgeBase) -> Self {
        Self { knowledge }
    }

    pub fn knowledge(&self) -> &'static KnowledgeBase {
        self.knowledge
    }

    /// Assemble a report for `label`, stamped with the current time.
    pub fn assemble(
        &self,
        scan_id: Uuid,
        label: &str,
        features: &FeatureVector,
        image_reference: &str,
    ) -> Result<HealthReport, CropGuardError> {
        self.assemble_at(scan_id, label, features, image_reference, Utc::now())
    }

    /// Assemble a report for `label` with an explicit scan date.
    ///
    /// Fails when the label is not supported or names a disease or pest
    /// missing from the knowledge base.
    pub fn assemble_at(
        &self,
        scan_id: Uuid,
        label: &str,
        features: &FeatureVector,
        image_reference: &str,
        scan_date: DateTime<Utc>,
    ) -> Result<HealthReport, CropGuardError> {
        let mapping = mapping_for(label).ok_or_else(|| CropGuardError::classification(label))?;
        self.assemble_mapping(scan_id, mapping, features, image_reference, scan_date)
    }

    pub(crate) fn assemble_mapping(
        &self,
        scan_id: Uuid,
        mapping: &LabelMapping,
        features: &FeatureVector,
        image_reference: &str,
        scan_date: DateTime<Utc>,
    ) -> Result<HealthReport, CropGuardError> {
        let diseases = match mapping.disease {
            Some(id) => vec![self
                .knowledge
                .disease(id)
                .cloned()
                .ok_or_else(|| CropGuardError::unknown_disease(id))?],
            None => Vec::new(),
        };
        let pests = match mapping.pest {
            Some(id) => vec![self
                .knowledge
                .pest(id)
                .cloned()
                .ok_or_else(|| CropGuardError::unknown_pest(id))?],
            None => Vec::new(),
        };

        let disease_severities: Vec<Severity> = diseases.iter().map(|d| d.severity).collect();
        let pest_severities: Vec<Severity> = pests.iter().map(|p| p.severity).collect();
        let overall_health = health_score(&disease_severities, &pest_severities);
        let is_healthy = diseases.is_empty() && pests.is_empty();

        let disease_names: Vec<&str> = diseases.iter().map(|d| d.name.as_str()).collect();
        let pest_names: Vec<&str> = pests.iter().map(|p| p.name.as_str()).collect();
        let recommendations = recommendations(&disease_names, &pest_names);
        let next_steps = next_steps(!diseases.is_empty(), !pests.is_empty());

        let report = HealthReport {
            scan_id,
            label: mapping.label.to_string(),
            plant_name: mapping.plant_name.to_string(),
            scientific_name: mapping.scientific_name.to_string(),
            confidence: confidence(features),
            is_healthy,
            diseases,
            pests,
            overall_health,
            recommendations,
            next_steps,
            scan_date,
            image_reference: image_reference.to_string(),
        };

        tracing::info!(
            scan_id = %scan_id,
            label = %report.label,
            overall_health = report.overall_health,
            is_healthy = report.is_healthy,
            "Report assembled"
        );

        Ok(report)
    }
}

fn recommendations(diseases: &[&str], pests: &[&str]) -> Vec<String> {
    if diseases.is_empty() && pests.is_empty() {
        return HEALTHY_RECOMMENDATIONS.iter().map(|s| s.to_string()).collect();
    }

    let mut out = Vec::new();
    if !diseases.is_empty() {
        out.extend(diseases.iter().map(|name| format!("Apply appropriate treatment for {}", name)));
        out.extend(DISEASE_RECOMMENDATIONS.iter().map(|s| s.to_string()));
    }
    if !pests.is_empty() {
        out.extend(pests.iter().map(|name| format!("Control {} using recommended methods", name)));
        out.extend(PEST_RECOMMENDATIONS.iter().map(|s| s.to_string()));
    }
    out
}

fn next_steps(has_disease: bool, has_pest: bool) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    if has_disease {
        out.extend(DISEASE_NEXT_STEPS.iter().map(|s| s.to_string()));
    }
    if has_pest {
        out.extend(PEST_NEXT_STEPS.iter().map(|s| s.to_string()));
    }
    out.push(FINAL_NEXT_STEP.to_string());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features() -> FeatureVector {
        FeatureVector::from_reference("file:///leaf.jpg")
    }

    #[test]
    fn test_health_score_table() {
        assert_eq!(health_score(&[], &[]), 95);
        assert_eq!(health_score(&[Severity::Low], &[]), 80);
        assert_eq!(health_score(&[Severity::Medium], &[]), 65);
        assert_eq!(health_score(&[Severity::High], &[]), 50);
        assert_eq!(health_score(&[Severity::Critical], &[]), 30);
    }

    #[test]
    fn test_health_score_extra_findings() {
        assert_eq!(health_score(&[Severity::Low, Severity::High], &[]), 45);
        assert_eq!(health_score(&[Severity::Critical], &[Severity::High]), 25);
        assert_eq!(health_score(&[Severity::Low], &[Severity::High]), 45);
        let many = vec![Severity::Critical; 10];
        assert_eq!(health_score(&many, &[Severity::Low; 3]), 0);
    }

    #[test]
    fn test_pest_severity_drives_score() {
        let medium = health_score(&[], &[Severity::Medium]);
        let high = health_score(&[], &[Severity::High]);
        assert_eq!(medium, 65);
        assert_eq!(high, 50);
        assert!(high < medium);
        assert_eq!(health_score(&[], &[Severity::Critical]), health_score(&[Severity::Critical], &[]));
    }

    #[test]
    fn test_single_finding_score_matches_its_severity() {
        use crate::services::advice::severity_level;

        for label in ["Pepper___Aphids", "Tomato___Spider_mites", "Potato___Late_blight"] {
            let report =
                ReportAssembler::default().assemble(Uuid::new_v4(), label, &features(), "img").unwrap();
            assert_eq!(Some(severity_level(report.overall_health)), report.worst_severity(), "{label}");
        }
    }

    #[test]
    fn test_confidence_bounds() {
        let flat = FeatureVector::from_values([0.5; 10]);
        assert_eq!(confidence(&flat), MAX_CONFIDENCE);

        let mut spread = [0.0; 10];
        for v in spread.iter_mut().step_by(2) {
            *v = 1.0;
        }
        // variance 0.25
        assert!((confidence(&FeatureVector::from_values(spread)) - 0.74).abs() < 1e-9);

        let c = confidence(&features());
        assert!((MIN_CONFIDENCE..=MAX_CONFIDENCE).contains(&c));
    }

    #[test]
    fn test_healthy_report() {
        let report = ReportAssembler::default()
            .assemble(Uuid::new_v4(), "Tomato___healthy", &features(), "file:///leaf.jpg")
            .unwrap();
        assert!(report.is_healthy);
        assert_eq!(report.overall_health, 95);
        assert_eq!(report.plant_name, "Tomato");
        assert_eq!(report.scientific_name, "Solanum lycopersicum");
        assert_eq!(report.recommendations.len(), 3);
        assert_eq!(report.next_steps, vec![FINAL_NEXT_STEP.to_string()]);
    }

    #[test]
    fn test_disease_report() {
        let report = ReportAssembler::default()
            .assemble(Uuid::new_v4(), "Potato___Late_blight", &features(), "img")
            .unwrap();
        assert!(!report.is_healthy);
        assert_eq!(report.diseases[0].id, "late_blight");
        assert_eq!(report.overall_health, 50);
        assert_eq!(report.recommendations[0], "Apply appropriate treatment for Late Blight");
        assert_eq!(report.next_steps.len(), 5);
        assert_eq!(report.next_steps.last().map(String::as_str), Some(FINAL_NEXT_STEP));
    }

    #[test]
    fn test_pest_only_report_is_not_healthy() {
        let report = ReportAssembler::default()
            .assemble(Uuid::new_v4(), "Pepper___Aphids", &features(), "img")
            .unwrap();
        assert!(report.diseases.is_empty());
        assert_eq!(report.pests.len(), 1);
        assert!(!report.is_healthy);
        assert_eq!(report.overall_health, 65);
        assert_eq!(report.recommendations[0], "Control Aphids using recommended methods");
    }

    #[test]
    fn test_disease_and_pest_report() {
        let report = ReportAssembler::default()
            .assemble(Uuid::new_v4(), "Tomato___Yellow_Leaf_Curl_Virus", &features(), "img")
            .unwrap();
        assert_eq!(report.diseases.len(), 1);
        assert_eq!(report.pests[0].id, "whiteflies");
        assert_eq!(report.overall_health, 25);
        assert_eq!(report.next_steps.len(), 9);
    }

    #[test]
    fn test_unknown_label_is_an_error() {
        let err = ReportAssembler::default()
            .assemble(Uuid::new_v4(), "Banana___Panama_disease", &features(), "img")
            .unwrap_err();
        assert!(err.is_analysis_failure());
    }

    #[test]
    fn test_every_label_assembles() {
        let assembler = ReportAssembler::default();
        for mapping in super::super::classifier::LABELS.iter() {
            let report = assembler
                .assemble(Uuid::new_v4(), mapping.label, &features(), "img")
                .unwrap_or_else(|e| panic!("{}: {}", mapping.label, e));
            assert_eq!(report.is_healthy, report.diseases.is_empty() && report.pests.is_empty());
        }
    }
}
