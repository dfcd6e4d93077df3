//! Treatment planning for a finished health report.

use serde::Serialize;
use std::collections::HashSet;

use crate::models::{HealthReport, Prevention, Severity, Treatment};

const IMMEDIATE_ACTIONS: [&str; 3] = [
    "Isolate affected plants to prevent spread",
    "Remove severely damaged leaves or fruits",
    "Apply appropriate treatment immediately",
];

const SHORT_TERM_PLAN: [&str; 4] = [
    "Monitor plant daily for changes",
    "Apply treatments as scheduled",
    "Adjust watering and nutrition",
    "Check environmental conditions",
];

const LONG_TERM_STRATEGY: [&str; 6] = [
    "Implement crop rotation",
    "Improve soil health",
    "Select disease-resistant varieties",
    "Establish integrated pest management",
    "Maintain proper plant spacing",
    "Regular monitoring and maintenance",
];

const URGENT_ACTIONS: [&str; 3] = [
    "URGENT: Immediate treatment required",
    "Isolate affected plants",
    "Contact local extension service if needed",
];

/// Health below this triggers immediate actions in the treatment plan.
const IMMEDIATE_THRESHOLD: u8 = 50;
/// Health below this triggers urgent priority actions.
const URGENT_THRESHOLD: u8 = 30;

/// Treatment plan for one report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreatmentPlan {
    pub immediate_actions: Vec<String>,
    /// Next 1-2 weeks
    pub short_term_plan: Vec<String>,
    /// Seasonal
    pub long_term_strategy: Vec<String>,
    pub treatments: Vec<Treatment>,
    pub prevention: Vec<Prevention>,
}

/// Action schedule for the month after a scan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreatmentTimeline {
    pub day1: Vec<String>,
    pub week1: Vec<String>,
    pub week2: Vec<String>,
    pub month1: Vec<String>,
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Build the treatment plan for a report.
///
/// Treatments and prevention are gathered from every disease, then every
/// pest; an id that appears more than once is kept at its first position.
pub fn treatment_plan(report: &HealthReport) -> TreatmentPlan {
    let immediate_actions = if report.overall_health < IMMEDIATE_THRESHOLD {
        owned(&IMMEDIATE_ACTIONS)
    } else {
        Vec::new()
    };

    let treatments = dedup_by_id(
        report
            .diseases
            .iter()
            .flat_map(|d| d.treatments.iter())
            .chain(report.pests.iter().flat_map(|p| p.treatments.iter())),
        |t| t.id.as_str(),
    );
    let prevention = dedup_by_id(
        report
            .diseases
            .iter()
            .flat_map(|d| d.prevention.iter())
            .chain(report.pests.iter().flat_map(|p| p.prevention.iter())),
        |p| p.id.as_str(),
    );

    TreatmentPlan {
        immediate_actions,
        short_term_plan: owned(&SHORT_TERM_PLAN),
        long_term_strategy: owned(&LONG_TERM_STRATEGY),
        treatments,
        prevention,
    }
}

fn dedup_by_id<'a, T: Clone + 'a>(
    items: impl Iterator<Item = &'a T>,
    id: impl Fn(&T) -> &str,
) -> Vec<T> {
    let mut seen = HashSet::new();
    items.filter(|item| seen.insert(id(*item).to_string())).cloned().collect()
}

/// Map a 0-100 health score to a severity level.
pub fn severity_level(score: u8) -> Severity {
    match score {
        80.. => Severity::Low,
        60..=79 => Severity::Medium,
        40..=59 => Severity::High,
        _ => Severity::Critical,
    }
}

/// Actions to take first, most urgent at the top.
pub fn priority_actions(report: &HealthReport) -> Vec<String> {
    let mut actions = Vec::new();

    if report.overall_health < URGENT_THRESHOLD {
        actions.extend(owned(&URGENT_ACTIONS));
    }

    actions.extend(
        report
            .diseases
            .iter()
            .filter(|d| d.severity == Severity::Critical)
            .map(|d| format!("Critical: {} requires immediate attention", d.name)),
    );
    actions.extend(report.pests.iter().map(|p| format!("Address {} infestation", p.name)));

    actions
}

/// Fixed month-long treatment schedule.
pub fn timeline() -> TreatmentTimeline {
    TreatmentTimeline {
        day1: owned(&[
            "Apply first treatment",
            "Remove affected plant parts",
            "Adjust watering schedule",
            "Improve air circulation",
        ]),
        week1: owned(&[
            "Monitor plant response",
            "Reapply treatments as needed",
            "Check for new symptoms",
            "Adjust environmental conditions",
        ]),
        week2: owned(&[
            "Evaluate treatment effectiveness",
            "Continue maintenance treatments",
            "Document progress",
            "Plan next steps",
        ]),
        month1: owned(&[
            "Complete treatment cycle",
            "Implement prevention measures",
            "Plan for next growing season",
            "Update monitoring schedule",
        ]),
    }
}
