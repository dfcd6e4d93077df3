//! Data models for Crop Guard.
//!
//! - `knowledge` - DiseaseRecord, PestRecord, Treatment, Prevention, Severity
//! - `outbreak` - OutbreakReport and its review status
//! - `report` - HealthReport and its entitlement-filtered ReportView
//! - `scan` - ScanHandle, ScanRecord, ScanFilter
//! - `subscription` - Subscription, Entitlement

pub mod knowledge;
pub mod outbreak;
pub mod report;
pub mod scan;
pub mod subscription;

pub use knowledge::{
    DiseaseRecord, PestKind, PestRecord, Prevention, Severity, Treatment, TreatmentMethod,
};
pub use outbreak::{Coordinates, OutbreakDetails, OutbreakReport, ReportStatus};
pub use report::{FindingView, HealthBand, HealthReport, ReportView};
pub use scan::{SaveOutcome, ScanFilter, ScanHandle, ScanRecord, ScanSource};
pub use subscription::{Entitlement, Subscription, SubscriptionStatus, SubscriptionTier};
