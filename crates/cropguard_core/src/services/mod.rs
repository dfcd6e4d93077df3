//! Backend services for Crop Guard.
//!
//! - `features` - Feature extraction from an image reference or bytes
//! - `classifier` - Label table and class selection
//! - `knowledge_base` - Disease and pest reference data
//! - `assembler` - Health report assembly and scoring
//! - `advice` - Treatment plans, priorities and timelines
//! - `image_host` - Image upload client
//! - `credentials` - API key storage (OS keychain or dev file)
//! - `storage` - Local SQLite storage for scan history and subscriptions
//! - `scan` - Scan orchestration with cancellation support

pub mod advice;
pub mod assembler;
pub mod classifier;
pub mod credentials;
pub mod features;
pub mod image_host;
pub mod knowledge_base;
pub mod scan;
pub mod storage;

pub use assembler::{confidence, health_score, ReportAssembler};
pub use classifier::{ClassSelector, Clock, LabelMapping, SeedMode, SystemClock};
pub use credentials::CredentialService;
pub use features::FeatureVector;
pub use image_host::{ImageHost, ImgBbClient};
pub use knowledge_base::KnowledgeBase;
pub use scan::ScanService;
pub use storage::LocalStorage;
