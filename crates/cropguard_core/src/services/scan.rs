//! Scan orchestration: upload, analyze, persist.

use tokio::select;
use uuid::Uuid;

use super::assembler::ReportAssembler;
use super::classifier::{ClassSelector, SeedMode};
use super::features::FeatureVector;
use super::image_host::ImageHost;
use super::storage::LocalStorage;
use crate::error::CropGuardError;
use crate::models::{HealthReport, ScanHandle, ScanSource};

/// Runs the scan pipeline.
#[derive(Debug, Default)]
pub struct ScanService {
    selector: ClassSelector,
    assembler: ReportAssembler,
}

impl ScanService {
    pub fn new(mode: SeedMode) -> Self {
        Self::with_selector(ClassSelector::new(mode))
    }

    pub fn with_selector(selector: ClassSelector) -> Self {
        Self { selector, assembler: ReportAssembler::default() }
    }

    pub fn assembler(&self) -> &ReportAssembler {
        &self.assembler
    }

    /// Analyze an image identified by URL or path. Nothing is uploaded or saved.
    pub fn analyze_reference(
        &self,
        scan_id: Uuid,
        image_reference: &str,
    ) -> Result<HealthReport, CropGuardError> {
        let features = FeatureVector::from_reference(image_reference);
        self.analyze(scan_id, &features, image_reference)
    }

    /// Analyze raw image bytes, recording `image_reference` on the report.
    pub fn analyze_bytes(
        &self,
        scan_id: Uuid,
        data: &[u8],
        image_reference: &str,
    ) -> Result<HealthReport, CropGuardError> {
        let features = FeatureVector::from_bytes(data);
        self.analyze(scan_id, &features, image_reference)
    }

    fn analyze(
        &self,
        scan_id: Uuid,
        features: &FeatureVector,
        image_reference: &str,
    ) -> Result<HealthReport, CropGuardError> {
        let mapping = self.selector.select(features);
        self.assembler.assemble_mapping(
            scan_id,
            mapping,
            features,
            image_reference,
            chrono::Utc::now(),
        )
    }

    /// Run a full scan for the handle's user and save the report.
    ///
    /// Raw image bytes are uploaded first and the hosted URL becomes the image
    /// reference. The upload races the handle's cancellation; a scan cancelled
    /// at any point before the save writes nothing.
    pub async fn run_scan<H: ImageHost>(
        &self,
        source: ScanSource,
        handle: &ScanHandle,
        host: &H,
        storage: &LocalStorage,
    ) -> Result<HealthReport, CropGuardError> {
        let scan_id = handle.id();
        if handle.is_cancelled() {
            return Err(CropGuardError::scan_cancelled(scan_id));
        }

        tracing::debug!(scan_id = %scan_id, user_id = handle.user_id(), "Starting scan");

        let report = match source {
            ScanSource::Image { data } => {
                let url = select! {
                    result = host.upload(&data) => result?,
                    _ = handle.cancelled() => {
                        tracing::debug!(scan_id = %scan_id, "Scan cancelled during upload");
                        return Err(CropGuardError::scan_cancelled(scan_id));
                    }
                };
                self.analyze_bytes(scan_id, &data, &url)?
            }
            ScanSource::Hosted { url } => self.analyze_reference(scan_id, &url)?,
        };

        if handle.is_cancelled() {
            tracing::debug!(scan_id = %scan_id, "Scan cancelled before save");
            return Err(CropGuardError::scan_cancelled(scan_id));
        }

        if handle.is_saved() {
            tracing::debug!(scan_id = %scan_id, "Scan already saved");
        } else {
            storage.save_scan(handle.user_id(), &report)?;
            handle.mark_saved();
        }

        tracing::info!(
            scan_id = %scan_id,
            label = %report.label,
            overall_health = report.overall_health,
            elapsed_ms = handle.elapsed_ms(),
            "Scan complete"
        );

        Ok(report)
    }
}
