//! Core types and services for the Crop Guard plant health scanner.
//!
//! - **error**: Error taxonomy with user-facing hints
//! - **models**: Knowledge records, health reports, scans, subscriptions,
//!   outbreak reports
//! - **services**: Feature extraction, class selection, report assembly,
//!   treatment advice, image hosting, credentials, storage, scan orchestration
//! - **state**: Application state management
//! - **config**: TOML configuration
//! - **logging**: Structured logging setup

pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod services;
pub mod state;


pub use config::AppConfig;
pub use error::{CropGuardError, ErrorInfo};
pub use models::{
    DiseaseRecord, Entitlement, HealthBand, HealthReport, OutbreakDetails, OutbreakReport,
    PestRecord, ReportStatus, ReportView, SaveOutcome, ScanFilter, ScanHandle, ScanRecord,
    ScanSource, Severity, Subscription,
};
pub use services::{
    ClassSelector, CredentialService, FeatureVector, ImageHost, KnowledgeBase, LocalStorage,
    ReportAssembler, ScanService, SeedMode,
};
pub use state::CropGuardState;
