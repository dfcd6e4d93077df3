//! Plain-text rendering of reports, history and advice for the terminal.

use chrono::Utc;
use cropguard_core::models::{
    DiseaseRecord, FindingView, OutbreakReport, ReportView, ScanRecord, Severity, Subscription,
};
use cropguard_core::services::advice::{TreatmentPlan, TreatmentTimeline};
use std::fmt::Write;

const UPSELL: &str = "Upgrade to premium for treatments, prevention and next steps: \
                      cropguard subscription activate";

fn section(out: &mut String, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out, "\n{title}:");
    for item in items {
        let _ = writeln!(out, "  - {item}");
    }
}

fn finding(out: &mut String, finding: &FindingView) {
    let _ = writeln!(
        out,
        "  * {} ({}) [{}]",
        finding.name,
        finding.scientific_name,
        finding.severity.as_str()
    );
    if let Some(description) = &finding.description {
        let _ = writeln!(out, "    {description}");
    }
    if !finding.symptoms.is_empty() {
        let _ = writeln!(out, "    Symptoms: {}", finding.symptoms.join("; "));
    }
    if let Some(treatments) = &finding.treatments {
        for t in treatments {
            let _ = writeln!(out, "    Treatment: {} ({}, {}% effective)", t.name, t.method.as_str(), t.effectiveness);
        }
    }
    if let Some(prevention) = &finding.prevention {
        for p in prevention {
            let _ = writeln!(out, "    Prevention: {}", p.name);
        }
    }
}

/// Full report as shown after a scan or by `show`.
pub fn report(view: &ReportView) -> String {
    let mut out = String::new();
    let status = if view.is_healthy { "Healthy" } else { "Needs attention" };

    let _ = writeln!(out, "{} ({})", view.plant_name, view.scientific_name);
    let _ = writeln!(out, "Scan:       {}", view.scan_id);
    let _ = writeln!(out, "Date:       {}", view.scan_date.format("%Y-%m-%d %H:%M UTC"));
    let _ = writeln!(out, "Image:      {}", view.image_reference);
    let _ = writeln!(out, "Status:     {status}");
    let _ = writeln!(out, "Health:     {}% ({})", view.overall_health, view.band.as_str());
    if let Some(severity) = view.worst_severity {
        let _ = writeln!(out, "Severity:   {severity}");
    }
    let _ = writeln!(out, "Confidence: {:.0}%", view.confidence * 100.0);

    if !view.diseases.is_empty() {
        let _ = writeln!(out, "\nDiseases:");
        view.diseases.iter().for_each(|d| finding(&mut out, d));
    }
    if !view.pests.is_empty() {
        let _ = writeln!(out, "\nPests:");
        view.pests.iter().for_each(|p| finding(&mut out, p));
    }

    section(&mut out, "Recommendations", &view.recommendations);
    match &view.next_steps {
        Some(steps) => section(&mut out, "Next steps", steps),
        None if !view.is_healthy => {
            let _ = writeln!(out, "\n{UPSELL}");
        }
        None => {}
    }
    out
}

/// One line per scan.
pub fn history(records: &[ScanRecord]) -> String {
    if records.is_empty() {
        return "No scans yet.\n".to_string();
    }
    let mut out = String::new();
    for record in records {
        let report = &record.report;
        let findings = match (report.diseases.is_empty(), report.pests.is_empty()) {
            (true, true) => "healthy".to_string(),
            (false, true) => report.disease_summary(),
            (true, false) => report.pest_summary(),
            (false, false) => format!("{}, {}", report.disease_summary(), report.pest_summary()),
        };
        let _ = writeln!(
            out,
            "{}  {}  {:>3}%  {:<12} {}",
            record.scan_id,
            record.client_created_at.format("%Y-%m-%d"),
            report.overall_health,
            report.plant_name,
            findings
        );
    }
    out
}

pub fn advice(
    level: Severity,
    plan: &TreatmentPlan,
    priorities: &[String],
    timeline: &TreatmentTimeline,
) -> String {
    let mut out = format!("Severity level: {level}\n");
    section(&mut out, "Priority actions", priorities);
    section(&mut out, "Immediate actions", &plan.immediate_actions);
    section(&mut out, "Short-term plan (1-2 weeks)", &plan.short_term_plan);
    section(&mut out, "Long-term strategy", &plan.long_term_strategy);

    let treatments: Vec<String> = plan
        .treatments
        .iter()
        .map(|t| format!("{}: {} ({}, {})", t.name, t.application, t.frequency, t.duration))
        .collect();
    section(&mut out, "Treatments", &treatments);

    let prevention: Vec<String> =
        plan.prevention.iter().map(|p| format!("{} ({})", p.name, p.timing)).collect();
    section(&mut out, "Prevention", &prevention);

    section(&mut out, "Day 1", &timeline.day1);
    section(&mut out, "Week 1", &timeline.week1);
    section(&mut out, "Week 2", &timeline.week2);
    section(&mut out, "Month 1", &timeline.month1);
    out
}

pub fn guide(diseases: &[&DiseaseRecord]) -> String {
    if diseases.is_empty() {
        return "No matching diseases.\n".to_string();
    }
    let mut out = String::new();
    for disease in diseases {
        let _ = writeln!(
            out,
            "{} ({}) [{}]\n  {}\n  Symptoms: {}\n",
            disease.name,
            disease.scientific_name,
            disease.severity.as_str(),
            disease.description,
            disease.symptoms.join("; ")
        );
    }
    out
}

pub fn subscription(subscription: &Subscription) -> String {
    let now = Utc::now();
    let mut out = format!(
        "Plan:   {}\nStatus: {}\n",
        subscription.tier.as_str(),
        subscription.status.as_str()
    );
    if subscription.expiry_date.is_some() {
        let _ = writeln!(
            out,
            "Expiry: {} ({} days)",
            subscription.format_expiry(),
            subscription.days_until_expiry(now)
        );
    }
    let access = if subscription.has_premium_access(now) { "yes" } else { "no" };
    let _ = writeln!(out, "Premium content: {access}");
    out
}

pub fn outbreak(report: &OutbreakReport) -> String {
    let d = &report.details;
    let mut out = format!("{} on {} [{}]\n", d.disease_name, d.crop_type, d.severity);
    let _ = writeln!(out, "Report:    {}", report.id);
    let _ = writeln!(out, "Status:    {}", report.status);
    let _ = writeln!(
        out,
        "Submitted: {} by {}",
        report.created_at.format("%Y-%m-%d %H:%M UTC"),
        report.author_id
    );
    if let Some(reviewer) = &report.reviewed_by {
        let _ = writeln!(out, "Reviewed:  by {reviewer}");
    }
    match (d.location.is_empty(), d.coordinates) {
        (false, Some(c)) => {
            let _ = writeln!(out, "Location:  {} ({:.4}, {:.4})", d.location, c.latitude, c.longitude);
        }
        (true, Some(c)) => {
            let _ = writeln!(out, "Location:  {:.4}, {:.4}", c.latitude, c.longitude);
        }
        (false, None) => {
            let _ = writeln!(out, "Location:  {}", d.location);
        }
        (true, None) => {}
    }
    if let Some(url) = &d.image_url {
        let _ = writeln!(out, "Image:     {url}");
    }
    if !d.description.is_empty() {
        let _ = writeln!(out, "\n{}", d.description);
    }
    out
}

/// One line per outbreak report.
pub fn outbreak_list(reports: &[OutbreakReport]) -> String {
    if reports.is_empty() {
        return "No outbreak reports.\n".to_string();
    }
    let mut out = String::new();
    for report in reports {
        let d = &report.details;
        let _ = writeln!(
            out,
            "{}  {}  {:<8} {:<6} {} on {}{}",
            report.id,
            report.created_at.format("%Y-%m-%d"),
            report.status.as_str(),
            d.severity.as_str(),
            d.disease_name,
            d.crop_type,
            if d.location.is_empty() { String::new() } else { format!(" ({})", d.location) }
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use cropguard_core::models::{Coordinates, Entitlement, OutbreakDetails, ReportStatus};
    use cropguard_core::services::advice;
    use cropguard_core::services::{FeatureVector, ReportAssembler};
    use uuid::Uuid;

    fn late_blight() -> cropguard_core::HealthReport {
        ReportAssembler::default()
            .assemble(
                Uuid::new_v4(),
                "Potato___Late_blight",
                &FeatureVector::from_reference("potato.jpg"),
                "potato.jpg",
            )
            .unwrap()
    }

    #[test]
    fn test_free_report_shows_upsell() {
        let text = report(&late_blight().view(Entitlement::Free));
        assert!(text.contains("Health:     50% (poor)"));
        assert!(text.contains("Severity:   high"));
        assert!(text.contains("Late Blight"));
        assert!(text.contains("Upgrade to premium"));
        assert!(!text.contains("Treatment:"));
    }

    #[test]
    fn test_premium_report_shows_treatments() {
        let text = report(&late_blight().view(Entitlement::Premium));
        assert!(text.contains("Treatment:"));
        assert!(text.contains("Next steps:"));
        assert!(!text.contains("Upgrade to premium"));
    }

    #[test]
    fn test_advice_lists_timeline() {
        let report = late_blight();
        let text = advice(
            advice::severity_level(report.overall_health),
            &advice::treatment_plan(&report),
            &advice::priority_actions(&report),
            &advice::timeline(),
        );
        assert!(text.starts_with("Severity level: high\n"));
        assert!(text.contains("Day 1:"));
        assert!(text.contains("Month 1:"));
        assert!(text.contains("Treatments:"));
    }

    #[test]
    fn test_healthy_report_has_no_severity() {
        let healthy = ReportAssembler::default()
            .assemble(
                Uuid::new_v4(),
                "Apple___healthy",
                &FeatureVector::from_reference("apple.jpg"),
                "apple.jpg",
            )
            .unwrap();
        let text = report(&healthy.view(Entitlement::Free));
        assert!(text.contains("Status:     Healthy"));
        assert!(!text.contains("Severity:"));
    }

    #[test]
    fn test_empty_history() {
        assert_eq!(history(&[]), "No scans yet.\n");
    }

    #[test]
    fn test_free_subscription() {
        let text = subscription(&Subscription::free());
        assert!(text.contains("Premium content: no"));
        assert!(!text.contains("Expiry:"));
    }

    fn blight_report() -> OutbreakReport {
        let now = Utc::now();
        let mut details = OutbreakDetails::new("Potato", "Late Blight", Severity::High);
        details.location = "Nyandarua".to_string();
        details.coordinates = Some(Coordinates { latitude: -0.18, longitude: 36.52 });
        OutbreakReport {
            id: Uuid::new_v4(),
            author_id: "alice".to_string(),
            details,
            status: ReportStatus::Pending,
            reviewed_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_outbreak_detail() {
        let text = outbreak(&blight_report());
        assert!(text.starts_with("Late Blight on Potato [high]\n"));
        assert!(text.contains("Status:    pending"));
        assert!(text.contains("Location:  Nyandarua (-0.1800, 36.5200)"));
        assert!(!text.contains("Reviewed:"));
    }

    #[test]
    fn test_outbreak_list() {
        assert_eq!(outbreak_list(&[]), "No outbreak reports.\n");
        let mut report = blight_report();
        report.status = ReportStatus::Rejected;
        let text = outbreak_list(&[report]);
        assert!(text.contains("rejected high   Late Blight on Potato (Nyandarua)"));
    }
}
