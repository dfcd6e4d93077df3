//! Application state management.
//!
//! Holds the long-lived services (storage, credentials, scan pipeline), the
//! loaded configuration, the tokio runtime and the set of in-flight scans.

use crate::config::AppConfig;
use crate::error::CropGuardError;
use crate::models::{
    Entitlement, HealthReport, OutbreakDetails, OutbreakReport, ReportStatus, ScanHandle,
    ScanSource, Subscription, SubscriptionStatus,
};
use crate::services::credentials::IMAGE_HOST_SERVICE;
use crate::services::{CredentialService, ImageHost, ImgBbClient, LocalStorage, ScanService};

use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

/// Central application state.
///
/// Thread-safe via `parking_lot::RwLock`.
pub struct CropGuardState {
    /// In-flight scans with cancellation support
    active_scans: RwLock<HashMap<Uuid, Arc<ScanHandle>>>,
    /// Local SQLite storage
    storage: LocalStorage,
    /// Application data directory
    data_dir: PathBuf,
    config: AppConfig,
    /// API key storage
    credential_service: CredentialService,
    scan_service: ScanService,
    /// Tokio runtime for uploads and scans
    tokio_runtime: tokio::runtime::Runtime,
}

impl CropGuardState {
    /// Create state using the data directory the configuration resolves to.
    pub fn new(config: AppConfig) -> Result<Self, CropGuardError> {
        let data_dir = config.resolve_data_dir(None);
        Self::with_data_dir(data_dir, config)
    }

    /// Create state with an explicit data directory.
    pub fn with_data_dir(data_dir: PathBuf, config: AppConfig) -> Result<Self, CropGuardError> {
        Self::with_services(data_dir, config, CredentialService::new())
    }

    /// Create state with an explicit data directory and credential service.
    pub fn with_services(
        data_dir: PathBuf,
        config: AppConfig,
        credential_service: CredentialService,
    ) -> Result<Self, CropGuardError> {
        crate::services::storage::init_data_dir(&data_dir)?;

        let tokio_runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .map_err(|e| CropGuardError::internal(format!("Failed to create tokio runtime: {e}")))?;

        let storage = LocalStorage::open(data_dir.clone())?;
        let scan_service = ScanService::new(config.analysis.seed_mode);

        tracing::info!(
            data_dir = %data_dir.display(),
            seed_mode = config.analysis.seed_mode.as_str(),
            "CropGuardState initialized"
        );

        Ok(Self {
            active_scans: RwLock::new(HashMap::new()),
            storage,
            data_dir,
            config,
            credential_service,
            scan_service,
            tokio_runtime,
        })
    }

    // ========== Scan Tracking ==========

    /// Register a scan for tracking.
    pub fn register_scan(&self, handle: ScanHandle) -> Arc<ScanHandle> {
        let id = handle.id();
        let handle = Arc::new(handle);
        self.active_scans.write().insert(id, handle.clone());
        tracing::trace!(scan_id = %id, "Scan registered");
        handle
    }

    pub fn get_scan(&self, id: &Uuid) -> Option<Arc<ScanHandle>> {
        self.active_scans.read().get(id).cloned()
    }

    /// Unregister a completed or cancelled scan.
    pub fn unregister_scan(&self, id: &Uuid) -> Option<Arc<ScanHandle>> {
        let handle = self.active_scans.write().remove(id);
        if handle.is_some() {
            tracing::trace!(scan_id = %id, "Scan unregistered");
        }
        handle
    }

    /// Cancel a running scan. Returns true if the scan was found.
    pub fn cancel_scan(&self, id: &Uuid) -> bool {
        if let Some(handle) = self.active_scans.read().get(id) {
            handle.cancel();
            true
        } else {
            false
        }
    }

    /// Cancel every running scan, e.g. on shutdown.
    pub fn cancel_all_scans(&self) -> usize {
        let scans = self.active_scans.read();
        for handle in scans.values() {
            handle.cancel();
        }
        scans.len()
    }

    pub fn active_scan_ids(&self) -> Vec<Uuid> {
        self.active_scans.read().keys().copied().collect()
    }

    /// Run a tracked scan to completion on the state's runtime.
    ///
    /// Uploads use the configured image host and the stored API key.
    pub fn run_scan(&self, user_id: &str, source: ScanSource) -> Result<HealthReport, CropGuardError> {
        let handle = self.register_scan(ScanHandle::new(user_id));
        let needs_upload = matches!(source, ScanSource::Image { .. });
        let result = if needs_upload {
            self.image_host().and_then(|host| {
                self.block_on(self.scan_service.run_scan(source, &handle, &host, &self.storage))
            })
        } else {
            self.block_on(self.scan_service.run_scan(source, &handle, &NoUpload, &self.storage))
        };
        self.unregister_scan(&handle.id());
        result
    }

    // ========== Subscriptions ==========

    pub fn subscription(&self, user_id: &str) -> Result<Subscription, CropGuardError> {
        self.storage.load_subscription(user_id)
    }

    /// Entitlement in effect for `user_id` right now.
    pub fn entitlement(&self, user_id: &str) -> Result<Entitlement, CropGuardError> {
        Ok(self.subscription(user_id)?.entitlement(Utc::now()))
    }

    /// Start a premium billing period from now.
    pub fn activate_premium(&self, user_id: &str) -> Result<Subscription, CropGuardError> {
        let subscription = Subscription::premium_from(Utc::now());
        self.storage.save_subscription(user_id, &subscription)?;
        tracing::info!(expires = %subscription.format_expiry(), "Premium activated");
        Ok(subscription)
    }

    /// Mark the current subscription inactive. Tier and expiry are kept.
    pub fn cancel_subscription(&self, user_id: &str) -> Result<Subscription, CropGuardError> {
        let subscription =
            Subscription { status: SubscriptionStatus::Inactive, ..self.subscription(user_id)? };
        self.storage.save_subscription(user_id, &subscription)?;
        tracing::info!("Subscription cancelled");
        Ok(subscription)
    }

    // ========== Outbreak Reports ==========

    /// Submit an outbreak report for review.
    pub fn report_outbreak(
        &self,
        user_id: &str,
        details: OutbreakDetails,
    ) -> Result<OutbreakReport, CropGuardError> {
        let details = details.normalized();
        details.validate()?;
        let report = self.storage.create_outbreak_report(user_id, &details)?;
        tracing::info!(report_id = %report.id, disease = %details.disease_name, "Outbreak reported");
        Ok(report)
    }

    pub fn outbreak_report(&self, id: Uuid) -> Result<OutbreakReport, CropGuardError> {
        self.storage
            .load_outbreak_report(id)?
            .ok_or_else(|| CropGuardError::not_found(format!("Outbreak report {id}")))
    }

    /// Reports awaiting a decision (pending or previously rejected), newest first.
    pub fn review_queue(
        &self,
        reviewer_id: &str,
        limit: usize,
    ) -> Result<Vec<OutbreakReport>, CropGuardError> {
        self.require_reviewer(reviewer_id)?;
        self.storage.list_outbreak_reports(&ReportStatus::review_queue(), None, limit)
    }

    /// Approve or reject a report that has not been approved yet.
    pub fn review_outbreak(
        &self,
        reviewer_id: &str,
        id: Uuid,
        decision: ReportStatus,
    ) -> Result<OutbreakReport, CropGuardError> {
        if decision == ReportStatus::Pending {
            return Err(CropGuardError::invalid_input("a review must approve or reject"));
        }
        self.require_reviewer(reviewer_id)?;

        let report = self.outbreak_report(id)?;
        if report.status == ReportStatus::Approved {
            return Err(CropGuardError::invalid_input(format!(
                "outbreak report {id} is already approved"
            )));
        }
        self.storage.set_outbreak_status(id, decision, reviewer_id)?;
        tracing::info!(report_id = %id, status = decision.as_str(), "Outbreak report reviewed");
        self.outbreak_report(id)
    }

    /// Revise one of the user's reports while its edit window is open.
    pub fn edit_outbreak(
        &self,
        user_id: &str,
        id: Uuid,
        details: OutbreakDetails,
    ) -> Result<OutbreakReport, CropGuardError> {
        let report = self.outbreak_report(id)?;
        Self::require_editable(&report, user_id)?;

        let details = details.normalized();
        details.validate_revision()?;
        self.storage.update_outbreak_details(id, &details)?;
        tracing::info!(report_id = %id, "Outbreak report edited");
        self.outbreak_report(id)
    }

    /// Withdraw one of the user's reports while its edit window is open.
    pub fn delete_outbreak(&self, user_id: &str, id: Uuid) -> Result<(), CropGuardError> {
        let report = self.outbreak_report(id)?;
        Self::require_editable(&report, user_id)?;
        self.storage.delete_outbreak_report(user_id, id)?;
        tracing::info!(report_id = %id, "Outbreak report deleted");
        Ok(())
    }

    fn require_reviewer(&self, user_id: &str) -> Result<(), CropGuardError> {
        if self.config.outbreaks.is_reviewer(user_id) {
            Ok(())
        } else {
            Err(CropGuardError::permission_denied(format!(
                "{user_id} is not an outbreak reviewer"
            )))
        }
    }

    fn require_editable(report: &OutbreakReport, user_id: &str) -> Result<(), CropGuardError> {
        if report.can_edit(user_id, Utc::now()) {
            return Ok(());
        }
        let reason = if !report.is_author(user_id) {
            "only the author can change this report"
        } else if report.status == ReportStatus::Rejected {
            "rejected reports cannot be changed"
        } else {
            "the edit window for this report has closed"
        };
        Err(CropGuardError::permission_denied(reason))
    }

    // ========== Service Accessors ==========

    pub fn storage(&self) -> &LocalStorage {
        &self.storage
    }

    pub fn credentials(&self) -> &CredentialService {
        &self.credential_service
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn scan_service(&self) -> &ScanService {
        &self.scan_service
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Image host client using the stored API key.
    pub fn image_host(&self) -> Result<ImgBbClient, CropGuardError> {
        let api_key = self.credential_service.require_api_key(IMAGE_HOST_SERVICE)?;
        ImgBbClient::new(&self.config.image_host, api_key)
    }

    /// Upload an image with the configured host and return its URL.
    pub fn upload_image(&self, data: &[u8]) -> Result<String, CropGuardError> {
        let host = self.image_host()?;
        self.block_on(host.upload(data))
    }

    pub fn runtime(&self) -> &tokio::runtime::Runtime {
        &self.tokio_runtime
    }

    /// Spawn a future on the tokio runtime.
    pub fn spawn<F, T>(&self, future: F) -> tokio::task::JoinHandle<T>
    where
        F: std::future::Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        self.tokio_runtime.spawn(future)
    }

    /// Block on a future using the tokio runtime.
    pub fn block_on<F, T>(&self, future: F) -> T
    where
        F: std::future::Future<Output = T>,
    {
        self.tokio_runtime.block_on(future)
    }
}

/// Host used for scans that already have a URL; never called.
struct NoUpload;

impl ImageHost for NoUpload {
    async fn upload(&self, _data: &[u8]) -> Result<String, CropGuardError> {
        Err(CropGuardError::internal("Hosted scans do not upload"))
    }
}
