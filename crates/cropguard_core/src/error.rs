//! Error types for Crop Guard.
//!
//! Every failure in the scan pipeline is terminal for the current user action:
//! nothing here is retried automatically. Each variant carries enough context
//! to render an actionable message via [`CropGuardError::to_error_info`].

use thiserror::Error;
use uuid::Uuid;

/// Main error type for Crop Guard.
#[derive(Debug, Error)]
pub enum CropGuardError {
    /// The class selector produced a label that has no mapping entry.
    #[error("Classification error: no mapping for label '{label}'")]
    Classification {
        /// The label that could not be resolved.
        label: String,
    },

    /// A mapping entry references a disease or pest the knowledge base does not know.
    #[error("Unknown {kind} '{id}'")]
    UnknownRecord {
        /// Record kind ("disease" or "pest").
        kind: &'static str,
        /// Identifier that was looked up.
        id: String,
    },

    /// Local SQLite storage error.
    #[error("Storage error: {message}")]
    Storage {
        /// Human-readable error message.
        message: String,
        /// Actionable hint for the user.
        hint: Option<String>,
        /// Optional underlying error source.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// OS keychain error.
    #[error("Keyring error: {message}")]
    Keyring {
        /// Human-readable error message.
        message: String,
        /// Actionable hint for the user.
        hint: Option<String>,
    },

    /// A required API key is not configured.
    #[error("Missing API key for {service}")]
    MissingApiKey {
        /// Service the key belongs to.
        service: String,
    },

    /// The image hosting service rejected the upload.
    #[error("Image upload failed: {message}")]
    ImageHost {
        /// Human-readable error message.
        message: String,
        /// HTTP status returned by the service, if any.
        status: Option<u16>,
    },

    /// Transport-level failure talking to an external service.
    #[error("Network error: {message}")]
    Network {
        /// Human-readable error message.
        message: String,
        /// Optional underlying error source.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The scan was cancelled before it completed.
    #[error("Scan cancelled")]
    ScanCancelled {
        /// ID of the cancelled scan.
        scan_id: Uuid,
    },

    /// A requested record does not exist.
    #[error("Not found: {message}")]
    NotFound {
        /// Human-readable error message.
        message: String,
    },

    /// User input failed validation.
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Human-readable error message.
        message: String,
    },

    /// The user may not perform this action on the record.
    #[error("Not permitted: {message}")]
    PermissionDenied {
        /// Human-readable error message.
        message: String,
    },

    /// Configuration error.
    #[error("Config error: {message}")]
    Config {
        /// Human-readable error message.
        message: String,
    },

    /// Unexpected internal error.
    #[error("Internal error: {message}")]
    Internal {
        /// Human-readable error message.
        message: String,
        /// Optional underlying error source.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl CropGuardError {
    // ========== Constructors ==========

    /// Create a classification error for an unmapped label.
    pub fn classification(label: impl Into<String>) -> Self {
        Self::Classification { label: label.into() }
    }

    /// Create an unknown disease error.
    pub fn unknown_disease(id: impl Into<String>) -> Self {
        Self::UnknownRecord { kind: "disease", id: id.into() }
    }

    /// Create an unknown pest error.
    pub fn unknown_pest(id: impl Into<String>) -> Self {
        Self::UnknownRecord { kind: "pest", id: id.into() }
    }

    /// Create a new storage error.
    pub fn storage(message: impl Into<String>, hint: Option<&str>) -> Self {
        Self::Storage { message: message.into(), hint: hint.map(String::from), source: None }
    }

    /// Create a new storage error with source.
    pub fn storage_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Storage { message: message.into(), hint: None, source: Some(Box::new(source)) }
    }

    /// Create a new keyring error.
    pub fn keyring(message: impl Into<String>, hint: Option<&str>) -> Self {
        Self::Keyring { message: message.into(), hint: hint.map(String::from) }
    }

    /// Create a missing API key error.
    pub fn missing_api_key(service: impl Into<String>) -> Self {
        Self::MissingApiKey { service: service.into() }
    }

    /// Create an image host error.
    pub fn image_host(message: impl Into<String>, status: Option<u16>) -> Self {
        Self::ImageHost { message: message.into(), status }
    }

    /// Create a new network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network { message: message.into(), source: None }
    }

    /// Create a scan cancelled error.
    pub fn scan_cancelled(scan_id: Uuid) -> Self {
        Self::ScanCancelled { scan_id }
    }

    /// Create a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound { message: message.into() }
    }

    /// Create a validation error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput { message: message.into() }
    }

    /// Create a permission error.
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::PermissionDenied { message: message.into() }
    }

    /// Create a new config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }

    /// Create a new internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into(), source: None }
    }

    // ========== Methods ==========

    /// Check if this error represents a cancelled scan.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::ScanCancelled { .. })
    }

    /// Check if the analysis itself failed (as opposed to upload or storage).
    pub fn is_analysis_failure(&self) -> bool {
        matches!(self, Self::Classification { .. } | Self::UnknownRecord { .. })
    }

    /// Get the error category name.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Classification { .. } => "Analysis",
            Self::UnknownRecord { .. } => "Analysis",
            Self::Storage { .. } => "Storage",
            Self::Keyring { .. } => "Keyring",
            Self::MissingApiKey { .. } => "Credentials",
            Self::ImageHost { .. } => "Upload",
            Self::Network { .. } => "Network",
            Self::ScanCancelled { .. } => "Scan",
            Self::NotFound { .. } => "Not Found",
            Self::InvalidInput { .. } => "Validation",
            Self::PermissionDenied { .. } => "Permission",
            Self::Config { .. } => "Config",
            Self::Internal { .. } => "Internal",
        }
    }

    /// Get actionable hint for the user.
    pub fn hint(&self) -> Option<&str> {
        match self {
            Self::Classification { .. } => Some("Failed to analyze the image. Try scanning again"),
            Self::UnknownRecord { .. } => Some("Please report this issue"),
            Self::Storage { hint, .. } => hint.as_deref(),
            Self::Keyring { hint, .. } => hint.as_deref(),
            Self::MissingApiKey { .. } => Some("Run `cropguard api-key set` to configure it"),
            Self::ImageHost { .. } => Some("Failed to upload image. Please try again"),
            Self::Network { .. } => Some("Check your internet connection"),
            Self::ScanCancelled { .. } => None,
            Self::NotFound { .. } => None,
            Self::InvalidInput { .. } => Some("Check the values and try again"),
            Self::PermissionDenied { .. } => None,
            Self::Config { .. } => Some("Check the configuration file"),
            Self::Internal { .. } => Some("Please report this issue"),
        }
    }

    /// Convert to user-displayable error info.
    pub fn to_error_info(&self) -> ErrorInfo {
        let error_type = format!("{} Error", self.category());
        let message = self.to_string();
        let hint = self.hint().map(String::from);

        let technical_detail = match self {
            Self::ImageHost { status: Some(status), .. } => Some(format!("HTTP status: {status}")),
            Self::ScanCancelled { scan_id } => Some(format!("Scan: {scan_id}")),
            Self::UnknownRecord { kind, id } => Some(format!("Missing {kind} record: {id}")),
            _ => None,
        };

        ErrorInfo { error_type, message, hint, technical_detail }
    }
}

/// User-displayable error information.
#[derive(Debug, Clone)]
pub struct ErrorInfo {
    /// Category name (e.g., "Storage Error").
    pub error_type: String,
    /// User-friendly message.
    pub message: String,
    /// Actionable suggestion.
    pub hint: Option<String>,
    /// Technical detail for "Show Details" expansion.
    pub technical_detail: Option<String>,
}

// ========== Error Conversions ==========

/// Convert from rusqlite::Error to CropGuardError.
impl From<rusqlite::Error> for CropGuardError {
    fn from(err: rusqlite::Error) -> Self {
        CropGuardError::Storage {
            message: err.to_string(),
            hint: Some("The local database may be corrupted".to_string()),
            source: Some(Box::new(err)),
        }
    }
}

/// Convert from std::io::Error to CropGuardError.
impl From<std::io::Error> for CropGuardError {
    fn from(err: std::io::Error) -> Self {
        CropGuardError::Storage {
            message: err.to_string(),
            hint: Some("Check file permissions and disk space".to_string()),
            source: Some(Box::new(err)),
        }
    }
}

/// Convert from serde_json::Error to CropGuardError.
impl From<serde_json::Error> for CropGuardError {
    fn from(err: serde_json::Error) -> Self {
        CropGuardError::Storage {
            message: format!("JSON error: {err}"),
            hint: Some("Data may be corrupted".to_string()),
            source: Some(Box::new(err)),
        }
    }
}

/// Convert from keyring::Error to CropGuardError.
impl From<keyring::Error> for CropGuardError {
    fn from(err: keyring::Error) -> Self {
        CropGuardError::Keyring {
            message: err.to_string(),
            hint: Some("Grant Crop Guard access in system preferences".to_string()),
        }
    }
}

/// Convert from reqwest::Error to CropGuardError.
impl From<reqwest::Error> for CropGuardError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return CropGuardError::ImageHost {
                message: err.to_string(),
                status: Some(status.as_u16()),
            };
        }

        CropGuardError::Network { message: err.to_string(), source: Some(Box::new(err)) }
    }
}

/// Convert from toml::de::Error to CropGuardError.
impl From<toml::de::Error> for CropGuardError {
    fn from(err: toml::de::Error) -> Self {
        CropGuardError::Config { message: err.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_error_is_analysis_failure() {
        let err = CropGuardError::classification("Banana___Panama");
        assert!(err.is_analysis_failure());
        assert!(!err.is_cancelled());
        assert_eq!(err.category(), "Analysis");
        assert!(err.to_string().contains("Banana___Panama"));
    }

    #[test]
    fn test_error_info_carries_http_status() {
        let info = CropGuardError::image_host("upload rejected", Some(400)).to_error_info();
        assert_eq!(info.error_type, "Upload Error");
        assert_eq!(info.technical_detail.as_deref(), Some("HTTP status: 400"));
        assert!(info.hint.is_some());
    }

    #[test]
    fn test_cancelled_error() {
        let scan_id = Uuid::new_v4();
        let err = CropGuardError::scan_cancelled(scan_id);
        assert!(err.is_cancelled());
        assert_eq!(err.hint(), None);
        assert_eq!(err.to_error_info().technical_detail, Some(format!("Scan: {scan_id}")));
    }

    #[test]
    fn test_validation_and_permission_categories() {
        let err = CropGuardError::invalid_input("crop type is required");
        assert_eq!(err.to_error_info().error_type, "Validation Error");
        assert!(err.hint().is_some());

        let err = CropGuardError::permission_denied("only the author can edit this report");
        assert_eq!(err.category(), "Permission");
        assert_eq!(err.hint(), None);
    }

    #[test]
    fn test_toml_error_maps_to_config() {
        let err: CropGuardError = toml::from_str::<toml::Value>("= broken").unwrap_err().into();
        assert_eq!(err.category(), "Config");
    }
}
