//! Disease and pest reference records.
//!
//! These are static data: they are built once by the knowledge base and never
//! mutated at runtime.

use serde::{Deserialize, Serialize};

/// How serious a disease or pest problem is.
///
/// Variants are ordered from least to most severe, so `max()` over a set of
/// severities yields the worst one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Convert to string for storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    /// Parse from string, defaulting to `Medium` for unknown values.
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "low" => Self::Low,
            "high" => Self::High,
            "critical" => Self::Critical,
            _ => Self::Medium,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Treatment approach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreatmentMethod {
    Chemical,
    Organic,
    Cultural,
    Biological,
}

impl TreatmentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chemical => "chemical",
            Self::Organic => "organic",
            Self::Cultural => "cultural",
            Self::Biological => "biological",
        }
    }
}

/// Broad classification of a pest organism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PestKind {
    Insect,
    Mite,
    Fungus,
    Bacteria,
    Virus,
    Nematode,
}

/// A way to treat a disease or pest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Treatment {
    pub id: String,
    pub name: String,
    pub description: String,
    pub method: TreatmentMethod,
    /// How to apply it
    pub application: String,
    pub frequency: String,
    pub duration: String,
    pub precautions: Vec<String>,
    /// Expected effectiveness, 0-100
    pub effectiveness: u8,
}

/// A preventive practice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prevention {
    pub id: String,
    pub name: String,
    pub description: String,
    pub methods: Vec<String>,
    /// When to apply it (e.g. "Before planting season")
    pub timing: String,
    pub frequency: String,
}

/// Reference record for a plant disease.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseRecord {
    pub id: String,
    pub name: String,
    pub scientific_name: String,
    pub common_names: Vec<String>,
    pub description: String,
    pub symptoms: Vec<String>,
    pub causes: Vec<String>,
    pub treatments: Vec<Treatment>,
    pub prevention: Vec<Prevention>,
    pub severity: Severity,
}

/// Reference record for a pest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PestRecord {
    pub id: String,
    pub name: String,
    pub scientific_name: String,
    pub kind: PestKind,
    pub common_names: Vec<String>,
    pub description: String,
    pub symptoms: Vec<String>,
    /// Damage the pest causes to the plant
    pub damage: Vec<String>,
    pub treatments: Vec<Treatment>,
    pub prevention: Vec<Prevention>,
    pub severity: Severity,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
        let worst = [Severity::Low, Severity::High, Severity::Medium].into_iter().max();
        assert_eq!(worst, Some(Severity::High));
    }

    #[test]
    fn test_severity_round_trip_through_str() {
        for severity in [Severity::Low, Severity::Medium, Severity::High, Severity::Critical] {
            assert_eq!(Severity::parse(severity.as_str()), severity);
        }
        assert_eq!(Severity::parse("unheard-of"), Severity::Medium);
    }

    #[test]
    fn test_severity_serializes_lowercase() {
        let json = serde_json::to_string(&Severity::Critical).unwrap();
        assert_eq!(json, "\"critical\"");
    }
}
