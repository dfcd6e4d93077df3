//! Local SQLite storage for scan history, subscriptions and outbreak reports.
//!
//! API keys are NOT stored here; they use the OS keychain via CredentialService.
//!
//! # Data Directory Locations
//!
//! - **macOS**: `~/Library/Application Support/dev.cropguard.CropGuard`
//! - **Windows**: `%APPDATA%\cropguard\CropGuard`
//! - **Linux**: `~/.local/share/cropguard`
//! - **Debug builds**: `./cropguard_data` in current directory

use crate::error::CropGuardError;
use crate::models::{
    Coordinates, HealthReport, OutbreakDetails, OutbreakReport, ReportStatus, SaveOutcome,
    ScanFilter, ScanRecord, Severity, Subscription, SubscriptionStatus, SubscriptionTier,
};

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use parking_lot::Mutex;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use uuid::Uuid;

const DATABASE_FILE: &str = "cropguard.db";

const SCAN_COLUMNS: &str =
    "scan_id, user_id, report_json, client_created_at, created_at, updated_at";

const OUTBREAK_COLUMNS: &str = "id, author_id, crop_type, disease_name, severity, location, \
     description, image_url, latitude, longitude, status, reviewed_by, created_at, updated_at";

/// Get the default data directory for the application.
///
/// Debug builds use `./cropguard_data` in the current directory.
pub fn default_data_dir() -> PathBuf {
    #[cfg(debug_assertions)]
    {
        PathBuf::from("./cropguard_data")
    }

    #[cfg(not(debug_assertions))]
    {
        dirs::data_dir()
            .map(|d| {
                #[cfg(target_os = "macos")]
                {
                    d.join("dev.cropguard.CropGuard")
                }
                #[cfg(target_os = "windows")]
                {
                    d.join("cropguard").join("CropGuard")
                }
                #[cfg(not(any(target_os = "macos", target_os = "windows")))]
                {
                    d.join("cropguard")
                }
            })
            .unwrap_or_else(|| PathBuf::from("./cropguard_data"))
    }
}

/// Initialize the data directory, creating it if needed.
pub fn init_data_dir(path: &Path) -> Result<(), CropGuardError> {
    if path.exists() {
        if !path.is_dir() {
            return Err(CropGuardError::storage(
                format!("Data path exists but is not a directory: {}", path.display()),
                Some("Select a different location or remove the existing file"),
            ));
        }
        return Ok(());
    }

    std::fs::create_dir_all(path).map_err(|e| {
        CropGuardError::storage(
            format!("Failed to create data directory '{}': {}", path.display(), e),
            Some("Check permissions or select a different location"),
        )
    })?;

    tracing::info!(path = %path.display(), "Created data directory");
    Ok(())
}

fn timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Escape `LIKE` wildcards so user text only matches literally. Pair with `ESCAPE '\'`.
fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for c in query.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, CropGuardError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| CropGuardError::storage(format!("Invalid timestamp '{value}': {e}"), None))
}

/// SQLite-based local storage for scan history.
///
/// Thread-safe via internal Mutex. Uses WAL mode for concurrent reads.
/// Every write happens under the mutex, so two saves of the same scan id
/// serialize and leave exactly one record.
pub struct LocalStorage {
    /// Thread-safe SQLite connection
    connection: Mutex<Connection>,
    /// Data directory path
    data_dir: PathBuf,
}

impl LocalStorage {
    /// Open or create local storage in the given data directory.
    pub fn open(data_dir: PathBuf) -> Result<Self, CropGuardError> {
        init_data_dir(&data_dir)?;
        let db_path = data_dir.join(DATABASE_FILE);
        Self::open_with_path(db_path, data_dir)
    }

    /// Open storage with a specific database path.
    pub fn open_with_path(db_path: PathBuf, data_dir: PathBuf) -> Result<Self, CropGuardError> {
        let connection = Connection::open(&db_path).map_err(|e| {
            CropGuardError::storage(
                format!("Failed to open database '{}': {}", db_path.display(), e),
                Some("The database file may be corrupted. Try deleting it to start fresh."),
            )
        })?;

        Self::configure_connection(&connection)?;

        let storage = Self { connection: Mutex::new(connection), data_dir };
        storage.run_migrations()?;

        tracing::info!(path = %db_path.display(), "Local storage opened");
        Ok(storage)
    }

    fn configure_connection(conn: &Connection) -> Result<(), CropGuardError> {
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA busy_timeout = 5000;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
            ",
        )
        .map_err(|e| CropGuardError::storage(format!("Failed to configure database: {e}"), None))
    }

    fn run_migrations(&self) -> Result<(), CropGuardError> {
        let conn = self.connection.lock();

        conn.execute(
            "CREATE TABLE IF NOT EXISTS migrations (
                domain TEXT NOT NULL,
                step INTEGER NOT NULL,
                migration TEXT NOT NULL,
                PRIMARY KEY(domain, step)
            ) STRICT",
            [],
        )
        .map_err(|e| {
            CropGuardError::storage(format!("Failed to create migrations table: {e}"), None)
        })?;

        self.migrate_schema(&conn)
    }

    fn migrate_schema(&self, conn: &Connection) -> Result<(), CropGuardError> {
        const DOMAIN: &str = "core";

        let current_step: i32 = conn
            .query_row(
                "SELECT COALESCE(MAX(step), 0) FROM migrations WHERE domain = ?",
                [DOMAIN],
                |row| row.get(0),
            )
            .map_err(|e| {
                CropGuardError::storage(format!("Failed to read migration level: {e}"), None)
            })?;

        // Migration 1: Initial schema
        if current_step < 1 {
            conn.execute_batch(
                "
                -- Scan history, one row per scan id
                CREATE TABLE scans (
                    scan_id TEXT PRIMARY KEY,
                    user_id TEXT NOT NULL,
                    label TEXT NOT NULL,
                    plant_name TEXT NOT NULL,
                    disease_names TEXT NOT NULL DEFAULT '',
                    pest_names TEXT NOT NULL DEFAULT '',
                    is_healthy INTEGER NOT NULL,
                    has_pests INTEGER NOT NULL,
                    overall_health INTEGER NOT NULL,
                    image_reference TEXT NOT NULL,
                    report_json TEXT NOT NULL,
                    client_created_at TEXT NOT NULL,
                    created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
                    updated_at TEXT NOT NULL
                ) STRICT;

                -- Subscription per user
                CREATE TABLE subscriptions (
                    user_id TEXT PRIMARY KEY,
                    tier TEXT NOT NULL DEFAULT 'free',
                    status TEXT NOT NULL DEFAULT 'active',
                    expiry_date TEXT,
                    updated_at TEXT NOT NULL
                ) STRICT;

                -- Indexes
                CREATE INDEX idx_scans_user_created ON scans(user_id, client_created_at DESC);
                ",
            )
            .map_err(|e| CropGuardError::storage(format!("Migration 1 failed: {e}"), None))?;

            conn.execute(
                "INSERT INTO migrations (domain, step, migration) VALUES (?, 1, 'initial_schema')",
                [DOMAIN],
            )
            .map_err(|e| CropGuardError::storage(format!("Failed to record migration: {e}"), None))?;

            tracing::info!("Applied migration 1: initial_schema");
        }

        // Migration 2: Community outbreak reports
        if current_step < 2 {
            conn.execute_batch(
                "
                CREATE TABLE outbreak_reports (
                    id TEXT PRIMARY KEY,
                    author_id TEXT NOT NULL,
                    crop_type TEXT NOT NULL,
                    disease_name TEXT NOT NULL,
                    severity TEXT NOT NULL,
                    location TEXT NOT NULL DEFAULT '',
                    description TEXT NOT NULL DEFAULT '',
                    image_url TEXT,
                    latitude REAL,
                    longitude REAL,
                    status TEXT NOT NULL DEFAULT 'pending',
                    reviewed_by TEXT,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                ) STRICT;

                CREATE INDEX idx_outbreak_status_created ON outbreak_reports(status, created_at DESC);
                CREATE INDEX idx_outbreak_author ON outbreak_reports(author_id);
                ",
            )
            .map_err(|e| CropGuardError::storage(format!("Migration 2 failed: {e}"), None))?;

            conn.execute(
                "INSERT INTO migrations (domain, step, migration) VALUES (?, 2, 'outbreak_reports')",
                [DOMAIN],
            )
            .map_err(|e| CropGuardError::storage(format!("Failed to record migration: {e}"), None))?;

            tracing::info!("Applied migration 2: outbreak_reports");
        }

        Ok(())
    }

    /// Get the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    // ========== Scan Operations ==========

    /// Save a report to the user's history, keyed by its scan id.
    ///
    /// Saving the same scan id again overwrites the stored report and keeps the
    /// original creation timestamps. A scan id owned by a different user is
    /// rejected.
    pub fn save_scan(
        &self,
        user_id: &str,
        report: &HealthReport,
    ) -> Result<SaveOutcome, CropGuardError> {
        let report_json = serde_json::to_string(report)?;
        let disease_names =
            report.diseases.iter().map(|d| d.name.as_str()).collect::<Vec<_>>().join(", ");
        let pest_names =
            report.pests.iter().map(|p| p.name.as_str()).collect::<Vec<_>>().join(", ");
        let scan_id = report.scan_id.to_string();
        let now = timestamp(Utc::now());

        let conn = self.connection.lock();

        let owner: Option<String> = conn
            .query_row("SELECT user_id FROM scans WHERE scan_id = ?", [&scan_id], |row| row.get(0))
            .optional()
            .map_err(|e| CropGuardError::storage(format!("Failed to look up scan: {e}"), None))?;

        if let Some(owner) = &owner {
            if owner != user_id {
                tracing::warn!(scan_id = %report.scan_id, "Refusing to overwrite scan owned by another user");
                return Err(CropGuardError::storage(
                    format!("Scan {} belongs to another user", report.scan_id),
                    None,
                ));
            }
        }

        conn.execute(
            "INSERT INTO scans (
                scan_id, user_id, label, plant_name, disease_names, pest_names,
                is_healthy, has_pests, overall_health, image_reference, report_json,
                client_created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            ON CONFLICT(scan_id) DO UPDATE SET
                label = excluded.label,
                plant_name = excluded.plant_name,
                disease_names = excluded.disease_names,
                pest_names = excluded.pest_names,
                is_healthy = excluded.is_healthy,
                has_pests = excluded.has_pests,
                overall_health = excluded.overall_health,
                image_reference = excluded.image_reference,
                report_json = excluded.report_json,
                updated_at = excluded.updated_at
            WHERE scans.user_id = excluded.user_id",
            params![
                scan_id,
                user_id,
                report.label,
                report.plant_name,
                disease_names,
                pest_names,
                report.is_healthy,
                !report.pests.is_empty(),
                report.overall_health,
                report.image_reference,
                report_json,
                timestamp(report.scan_date),
                now,
            ],
        )
        .map_err(|e| CropGuardError::storage(format!("Failed to save scan: {e}"), None))?;

        let outcome = if owner.is_some() { SaveOutcome::Replaced } else { SaveOutcome::Inserted };
        tracing::debug!(scan_id = %report.scan_id, outcome = ?outcome, "Scan saved");
        Ok(outcome)
    }

    /// Load one scan from a user's history.
    pub fn load_scan(
        &self,
        user_id: &str,
        scan_id: Uuid,
    ) -> Result<Option<ScanRecord>, CropGuardError> {
        let conn = self.connection.lock();

        let row = conn
            .query_row(
                &format!("SELECT {SCAN_COLUMNS} FROM scans WHERE scan_id = ? AND user_id = ?"),
                params![scan_id.to_string(), user_id],
                ScanRow::from_row,
            )
            .optional()
            .map_err(|e| CropGuardError::storage(format!("Failed to load scan: {e}"), None))?;

        row.map(ScanRow::into_record).transpose()
    }

    /// Load a user's most recent scans, newest first.
    pub fn load_history(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<ScanRecord>, CropGuardError> {
        self.search_history(user_id, "", ScanFilter::All, limit)
    }

    /// Search a user's history by plant, disease or pest name, newest first.
    ///
    /// An empty query matches every scan; `filter` narrows by outcome. The
    /// query is matched literally, so `%` and `_` are not wildcards.
    pub fn search_history(
        &self,
        user_id: &str,
        query: &str,
        filter: ScanFilter,
        limit: usize,
    ) -> Result<Vec<ScanRecord>, CropGuardError> {
        let conn = self.connection.lock();
        let search_pattern = format!("%{}%", escape_like(query.trim()));

        let filter_clause = match filter {
            ScanFilter::All => "",
            ScanFilter::Healthy => "AND is_healthy = 1",
            ScanFilter::Unhealthy => "AND disease_names != ''",
            ScanFilter::Pest => "AND has_pests = 1",
        };

        let mut stmt = conn
            .prepare(&format!(
                "SELECT {SCAN_COLUMNS}
                 FROM scans
                 WHERE user_id = ?1
                   AND (plant_name LIKE ?2 ESCAPE '\\'
                        OR disease_names LIKE ?2 ESCAPE '\\'
                        OR pest_names LIKE ?2 ESCAPE '\\')
                   {filter_clause}
                 ORDER BY client_created_at DESC
                 LIMIT ?3"
            ))
            .map_err(|e| CropGuardError::storage(format!("Failed to prepare query: {e}"), None))?;

        let rows = stmt
            .query_map(params![user_id, search_pattern, limit as i64], ScanRow::from_row)
            .map_err(|e| CropGuardError::storage(format!("Failed to query history: {e}"), None))?;

        rows.map(|row| {
            row.map_err(|e| CropGuardError::storage(format!("Failed to read history: {e}"), None))
                .and_then(ScanRow::into_record)
        })
        .collect()
    }

    /// Number of scans in a user's history.
    pub fn count_scans(&self, user_id: &str) -> Result<usize, CropGuardError> {
        let conn = self.connection.lock();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM scans WHERE user_id = ?", [user_id], |row| row.get(0))
            .map_err(|e| CropGuardError::storage(format!("Failed to count scans: {e}"), None))?;

        Ok(count as usize)
    }

    /// Delete one scan. Returns whether a record was removed.
    pub fn delete_scan(&self, user_id: &str, scan_id: Uuid) -> Result<bool, CropGuardError> {
        let conn = self.connection.lock();

        let removed = conn
            .execute(
                "DELETE FROM scans WHERE scan_id = ? AND user_id = ?",
                params![scan_id.to_string(), user_id],
            )
            .map_err(|e| CropGuardError::storage(format!("Failed to delete scan: {e}"), None))?;

        tracing::debug!(scan_id = %scan_id, removed = removed > 0, "Scan deleted");
        Ok(removed > 0)
    }

    /// Delete a user's whole history. Returns the number of records removed.
    pub fn clear_history(&self, user_id: &str) -> Result<usize, CropGuardError> {
        let conn = self.connection.lock();

        let removed = conn
            .execute("DELETE FROM scans WHERE user_id = ?", [user_id])
            .map_err(|e| CropGuardError::storage(format!("Failed to clear history: {e}"), None))?;

        tracing::debug!(removed = removed, "Scan history cleared");
        Ok(removed)
    }

    // ========== Subscription Operations ==========

    /// Save a user's subscription.
    pub fn save_subscription(
        &self,
        user_id: &str,
        subscription: &Subscription,
    ) -> Result<(), CropGuardError> {
        let conn = self.connection.lock();

        conn.execute(
            "INSERT INTO subscriptions (user_id, tier, status, expiry_date, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(user_id) DO UPDATE SET
                tier = excluded.tier,
                status = excluded.status,
                expiry_date = excluded.expiry_date,
                updated_at = excluded.updated_at",
            params![
                user_id,
                subscription.tier.as_str(),
                subscription.status.as_str(),
                subscription.expiry_date.map(timestamp),
                timestamp(Utc::now()),
            ],
        )
        .map_err(|e| CropGuardError::storage(format!("Failed to save subscription: {e}"), None))?;

        tracing::debug!(tier = subscription.tier.as_str(), status = subscription.status.as_str(), "Subscription saved");
        Ok(())
    }

    /// Load a user's subscription. Users with no stored row are on the free plan.
    pub fn load_subscription(&self, user_id: &str) -> Result<Subscription, CropGuardError> {
        let conn = self.connection.lock();

        let row: Option<(String, String, Option<String>)> = conn
            .query_row(
                "SELECT tier, status, expiry_date FROM subscriptions WHERE user_id = ?",
                [user_id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()
            .map_err(|e| {
                CropGuardError::storage(format!("Failed to load subscription: {e}"), None)
            })?;

        match row {
            Some((tier, status, expiry)) => Ok(Subscription {
                tier: SubscriptionTier::parse(&tier),
                status: SubscriptionStatus::parse(&status),
                expiry_date: expiry.as_deref().map(parse_timestamp).transpose()?,
            }),
            None => Ok(Subscription::free()),
        }
    }

    // ========== Outbreak Report Operations ==========

    /// Store a new outbreak report as pending review.
    pub fn create_outbreak_report(
        &self,
        author_id: &str,
        details: &OutbreakDetails,
    ) -> Result<OutbreakReport, CropGuardError> {
        // stored timestamps keep microseconds
        let now = Utc::now().trunc_subsecs(6);
        let report = OutbreakReport {
            id: Uuid::new_v4(),
            author_id: author_id.to_string(),
            details: details.clone(),
            status: ReportStatus::Pending,
            reviewed_by: None,
            created_at: now,
            updated_at: now,
        };

        let conn = self.connection.lock();
        conn.execute(
            &format!(
                "INSERT INTO outbreak_reports ({OUTBREAK_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)"
            ),
            params![
                report.id.to_string(),
                report.author_id,
                details.crop_type,
                details.disease_name,
                details.severity.as_str(),
                details.location,
                details.description,
                details.image_url,
                details.coordinates.map(|c| c.latitude),
                details.coordinates.map(|c| c.longitude),
                report.status.as_str(),
                report.reviewed_by,
                timestamp(report.created_at),
                timestamp(report.updated_at),
            ],
        )
        .map_err(|e| {
            CropGuardError::storage(format!("Failed to save outbreak report: {e}"), None)
        })?;

        tracing::debug!(report_id = %report.id, crop = %details.crop_type, "Outbreak report created");
        Ok(report)
    }

    pub fn load_outbreak_report(&self, id: Uuid) -> Result<Option<OutbreakReport>, CropGuardError> {
        let conn = self.connection.lock();

        let row = conn
            .query_row(
                &format!("SELECT {OUTBREAK_COLUMNS} FROM outbreak_reports WHERE id = ?"),
                [id.to_string()],
                OutbreakRow::from_row,
            )
            .optional()
            .map_err(|e| {
                CropGuardError::storage(format!("Failed to load outbreak report: {e}"), None)
            })?;

        row.map(OutbreakRow::into_report).transpose()
    }

    /// List outbreak reports, newest first.
    ///
    /// An empty `statuses` slice lists every status; `author_id` limits the
    /// list to one user's reports.
    pub fn list_outbreak_reports(
        &self,
        statuses: &[ReportStatus],
        author_id: Option<&str>,
        limit: usize,
    ) -> Result<Vec<OutbreakReport>, CropGuardError> {
        let conn = self.connection.lock();

        let mut values = vec![
            author_id.map_or(Value::Null, |a| Value::Text(a.to_string())),
            Value::Integer(limit as i64),
        ];
        values.extend(statuses.iter().map(|s| Value::Text(s.as_str().to_string())));

        let status_clause = if statuses.is_empty() {
            String::new()
        } else {
            let placeholders: Vec<String> = (3..3 + statuses.len()).map(|i| format!("?{i}")).collect();
            format!("AND status IN ({})", placeholders.join(", "))
        };

        let mut stmt = conn
            .prepare(&format!(
                "SELECT {OUTBREAK_COLUMNS}
                 FROM outbreak_reports
                 WHERE (?1 IS NULL OR author_id = ?1)
                   {status_clause}
                 ORDER BY created_at DESC, rowid DESC
                 LIMIT ?2"
            ))
            .map_err(|e| CropGuardError::storage(format!("Failed to prepare query: {e}"), None))?;

        let rows = stmt.query_map(params_from_iter(values), OutbreakRow::from_row).map_err(|e| {
            CropGuardError::storage(format!("Failed to query outbreak reports: {e}"), None)
        })?;

        rows.map(|row| {
            row.map_err(|e| {
                CropGuardError::storage(format!("Failed to read outbreak report: {e}"), None)
            })
            .and_then(OutbreakRow::into_report)
        })
        .collect()
    }

    /// Replace the author-supplied fields of a report. Returns whether it existed.
    pub fn update_outbreak_details(
        &self,
        id: Uuid,
        details: &OutbreakDetails,
    ) -> Result<bool, CropGuardError> {
        let conn = self.connection.lock();

        let updated = conn
            .execute(
                "UPDATE outbreak_reports SET
                    crop_type = ?2,
                    disease_name = ?3,
                    severity = ?4,
                    location = ?5,
                    description = ?6,
                    image_url = ?7,
                    latitude = ?8,
                    longitude = ?9,
                    updated_at = ?10
                 WHERE id = ?1",
                params![
                    id.to_string(),
                    details.crop_type,
                    details.disease_name,
                    details.severity.as_str(),
                    details.location,
                    details.description,
                    details.image_url,
                    details.coordinates.map(|c| c.latitude),
                    details.coordinates.map(|c| c.longitude),
                    timestamp(Utc::now()),
                ],
            )
            .map_err(|e| {
                CropGuardError::storage(format!("Failed to update outbreak report: {e}"), None)
            })?;

        tracing::debug!(report_id = %id, updated = updated > 0, "Outbreak report updated");
        Ok(updated > 0)
    }

    /// Record a review decision. Returns whether the report existed.
    pub fn set_outbreak_status(
        &self,
        id: Uuid,
        status: ReportStatus,
        reviewer_id: &str,
    ) -> Result<bool, CropGuardError> {
        let conn = self.connection.lock();

        let updated = conn
            .execute(
                "UPDATE outbreak_reports SET status = ?2, reviewed_by = ?3, updated_at = ?4
                 WHERE id = ?1",
                params![id.to_string(), status.as_str(), reviewer_id, timestamp(Utc::now())],
            )
            .map_err(|e| {
                CropGuardError::storage(format!("Failed to review outbreak report: {e}"), None)
            })?;

        tracing::debug!(report_id = %id, status = status.as_str(), "Outbreak report reviewed");
        Ok(updated > 0)
    }

    /// Delete one of the author's reports. Returns whether a record was removed.
    pub fn delete_outbreak_report(&self, author_id: &str, id: Uuid) -> Result<bool, CropGuardError> {
        let conn = self.connection.lock();

        let removed = conn
            .execute(
                "DELETE FROM outbreak_reports WHERE id = ? AND author_id = ?",
                params![id.to_string(), author_id],
            )
            .map_err(|e| {
                CropGuardError::storage(format!("Failed to delete outbreak report: {e}"), None)
            })?;

        tracing::debug!(report_id = %id, removed = removed > 0, "Outbreak report deleted");
        Ok(removed > 0)
    }
}

/// Internal struct for reading scan rows.
struct ScanRow {
    scan_id: String,
    user_id: String,
    report_json: String,
    client_created_at: String,
    created_at: String,
    updated_at: String,
}

impl ScanRow {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            scan_id: row.get(0)?,
            user_id: row.get(1)?,
            report_json: row.get(2)?,
            client_created_at: row.get(3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
        })
    }

    fn into_record(self) -> Result<ScanRecord, CropGuardError> {
        let scan_id = Uuid::parse_str(&self.scan_id)
            .map_err(|e| CropGuardError::storage(format!("Invalid scan ID: {e}"), None))?;
        let report: HealthReport = serde_json::from_str(&self.report_json).map_err(|e| {
            CropGuardError::storage(format!("Invalid report JSON for scan {scan_id}: {e}"), None)
        })?;

        Ok(ScanRecord {
            scan_id,
            user_id: self.user_id,
            report,
            client_created_at: parse_timestamp(&self.client_created_at)?,
            server_created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

/// Internal struct for reading outbreak report rows.
struct OutbreakRow {
    id: String,
    author_id: String,
    crop_type: String,
    disease_name: String,
    severity: String,
    location: String,
    description: String,
    image_url: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    status: String,
    reviewed_by: Option<String>,
    created_at: String,
    updated_at: String,
}

impl OutbreakRow {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            author_id: row.get(1)?,
            crop_type: row.get(2)?,
            disease_name: row.get(3)?,
            severity: row.get(4)?,
            location: row.get(5)?,
            description: row.get(6)?,
            image_url: row.get(7)?,
            latitude: row.get(8)?,
            longitude: row.get(9)?,
            status: row.get(10)?,
            reviewed_by: row.get(11)?,
            created_at: row.get(12)?,
            updated_at: row.get(13)?,
        })
    }

    fn into_report(self) -> Result<OutbreakReport, CropGuardError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| CropGuardError::storage(format!("Invalid outbreak report ID: {e}"), None))?;
        let coordinates = match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinates { latitude, longitude }),
            _ => None,
        };

        Ok(OutbreakReport {
            id,
            author_id: self.author_id,
            details: OutbreakDetails {
                crop_type: self.crop_type,
                disease_name: self.disease_name,
                severity: Severity::parse(&self.severity),
                location: self.location,
                description: self.description,
                image_url: self.image_url,
                coordinates,
            },
            status: ReportStatus::parse(&self.status),
            reviewed_by: self.reviewed_by,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::assembler::ReportAssembler;
    use crate::services::features::FeatureVector;
    use chrono::Duration;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn open_temp() -> (TempDir, LocalStorage) {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::open(dir.path().to_path_buf()).unwrap();
        (dir, storage)
    }

    fn report(label: &str) -> HealthReport {
        ReportAssembler::default()
            .assemble(Uuid::new_v4(), label, &FeatureVector::from_reference(label), "https://i.ibb.co/x.jpg")
            .unwrap()
    }

    #[test]
    fn test_open_creates_database() {
        let (dir, storage) = open_temp();
        assert!(dir.path().join(DATABASE_FILE).exists());
        assert_eq!(storage.data_dir(), dir.path());
    }

    #[test]
    fn test_reopen_keeps_data() {
        let dir = TempDir::new().unwrap();
        let report = report("Tomato___healthy");
        {
            let storage = LocalStorage::open(dir.path().to_path_buf()).unwrap();
            storage.save_scan("alice", &report).unwrap();
        }
        let storage = LocalStorage::open(dir.path().to_path_buf()).unwrap();
        assert_eq!(storage.count_scans("alice").unwrap(), 1);
    }

    #[test]
    fn test_init_data_dir_rejects_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("not_a_dir");
        std::fs::write(&file, b"x").unwrap();
        assert!(init_data_dir(&file).is_err());
    }

    #[test]
    fn test_save_and_load_scan() {
        let (_dir, storage) = open_temp();
        let report = report("Potato___Late_blight");

        assert_eq!(storage.save_scan("alice", &report).unwrap(), SaveOutcome::Inserted);

        let record = storage.load_scan("alice", report.scan_id).unwrap().unwrap();
        assert_eq!(record.scan_id, report.scan_id);
        assert_eq!(record.report.label, report.label);
        assert_eq!(record.report.diseases, report.diseases);
        assert_eq!(record.report.overall_health, 50);
        assert_eq!(record.user_id, "alice");
        assert!(storage.load_scan("bob", report.scan_id).unwrap().is_none());
    }

    #[test]
    fn test_resave_replaces_and_keeps_created_at() {
        let (_dir, storage) = open_temp();
        let mut report = report("Tomato___Early_blight");
        storage.save_scan("alice", &report).unwrap();
        let first = storage.load_scan("alice", report.scan_id).unwrap().unwrap();

        report.image_reference = "https://i.ibb.co/y.jpg".to_string();
        assert_eq!(storage.save_scan("alice", &report).unwrap(), SaveOutcome::Replaced);

        let second = storage.load_scan("alice", report.scan_id).unwrap().unwrap();
        assert_eq!(storage.count_scans("alice").unwrap(), 1);
        assert_eq!(second.report.image_reference, "https://i.ibb.co/y.jpg");
        assert_eq!(second.server_created_at, first.server_created_at);
        assert!(second.updated_at >= first.updated_at);
    }

    #[test]
    fn test_save_rejects_other_users_scan() {
        let (_dir, storage) = open_temp();
        let report = report("Tomato___healthy");
        storage.save_scan("alice", &report).unwrap();

        assert!(storage.save_scan("mallory", &report).is_err());
        let record = storage.load_scan("alice", report.scan_id).unwrap().unwrap();
        assert_eq!(record.user_id, "alice");
    }

    #[test]
    fn test_concurrent_double_save_leaves_one_record() {
        let (_dir, storage) = open_temp();
        let storage = Arc::new(storage);
        let report = Arc::new(report("Grape___Esca"));

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let storage = storage.clone();
                let report = report.clone();
                std::thread::spawn(move || storage.save_scan("alice", &report).unwrap())
            })
            .collect();
        let mut outcomes: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        outcomes.sort_by_key(|o| matches!(o, SaveOutcome::Replaced));

        assert_eq!(outcomes, vec![SaveOutcome::Inserted, SaveOutcome::Replaced]);
        assert_eq!(storage.count_scans("alice").unwrap(), 1);
    }

    #[test]
    fn test_history_is_newest_first_and_limited() {
        let (_dir, storage) = open_temp();
        let base = Utc::now();
        for (i, label) in ["Apple___healthy", "Corn___Common_rust", "Pepper___Aphids"].iter().enumerate() {
            let mut r = report(label);
            r.scan_date = base + Duration::minutes(i as i64);
            storage.save_scan("alice", &r).unwrap();
        }

        let history = storage.load_history("alice", 10).unwrap();
        let labels: Vec<_> = history.iter().map(|r| r.report.label.as_str()).collect();
        assert_eq!(labels, vec!["Pepper___Aphids", "Corn___Common_rust", "Apple___healthy"]);
        assert_eq!(storage.load_history("alice", 2).unwrap().len(), 2);
        assert!(storage.load_history("bob", 10).unwrap().is_empty());
    }

    #[test]
    fn test_search_and_filter() {
        let (_dir, storage) = open_temp();
        for label in ["Apple___healthy", "Tomato___Late_blight", "Pepper___Aphids", "Potato___Late_blight"] {
            storage.save_scan("alice", &report(label)).unwrap();
        }

        assert_eq!(storage.search_history("alice", "late blight", ScanFilter::All, 10).unwrap().len(), 2);
        assert_eq!(storage.search_history("alice", "TOMATO", ScanFilter::All, 10).unwrap().len(), 1);
        assert_eq!(storage.search_history("alice", "", ScanFilter::Healthy, 10).unwrap().len(), 1);
        assert_eq!(storage.search_history("alice", "", ScanFilter::Unhealthy, 10).unwrap().len(), 2);

        let pests = storage.search_history("alice", "", ScanFilter::Pest, 10).unwrap();
        assert_eq!(pests.len(), 1);
        assert_eq!(pests[0].report.label, "Pepper___Aphids");
    }

    #[test]
    fn test_search_treats_wildcards_literally() {
        let (_dir, storage) = open_temp();
        for label in ["Tomato___Late_blight", "Pepper___Aphids"] {
            storage.save_scan("alice", &report(label)).unwrap();
        }

        assert!(storage.search_history("alice", "%", ScanFilter::All, 10).unwrap().is_empty());
        assert!(storage.search_history("alice", "T_mato", ScanFilter::All, 10).unwrap().is_empty());
        assert!(storage.search_history("alice", "\\", ScanFilter::All, 10).unwrap().is_empty());
        assert_eq!(storage.search_history("alice", "tomato", ScanFilter::All, 10).unwrap().len(), 1);
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("late blight"), "late blight");
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    }

    fn outbreak(crop: &str) -> OutbreakDetails {
        let mut details = OutbreakDetails::new(crop, "Late Blight", Severity::High);
        details.location = "Kiambu".to_string();
        details.coordinates = Some(Coordinates { latitude: -1.17, longitude: 36.83 });
        details
    }

    #[test]
    fn test_outbreak_report_round_trip() {
        let (_dir, storage) = open_temp();
        let created = storage.create_outbreak_report("alice", &outbreak("Potato")).unwrap();
        assert_eq!(created.status, ReportStatus::Pending);

        let loaded = storage.load_outbreak_report(created.id).unwrap().unwrap();
        assert_eq!(loaded.author_id, "alice");
        assert_eq!(loaded.details, created.details);
        assert_eq!(loaded.reviewed_by, None);
        assert_eq!(loaded.created_at, created.created_at);
        assert!(storage.load_outbreak_report(Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn test_review_queue_lists_pending_and_rejected_newest_first() {
        let (_dir, storage) = open_temp();
        let first = storage.create_outbreak_report("alice", &outbreak("Potato")).unwrap();
        let second = storage.create_outbreak_report("bob", &outbreak("Tomato")).unwrap();
        let third = storage.create_outbreak_report("alice", &outbreak("Maize")).unwrap();

        assert!(storage.set_outbreak_status(first.id, ReportStatus::Rejected, "rev").unwrap());
        assert!(storage.set_outbreak_status(second.id, ReportStatus::Approved, "rev").unwrap());

        let queue =
            storage.list_outbreak_reports(&ReportStatus::review_queue(), None, 10).unwrap();
        let ids: Vec<Uuid> = queue.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![third.id, first.id]);
        assert_eq!(queue[1].reviewed_by.as_deref(), Some("rev"));

        assert_eq!(storage.list_outbreak_reports(&[], None, 10).unwrap().len(), 3);
        assert_eq!(storage.list_outbreak_reports(&[], Some("alice"), 10).unwrap().len(), 2);
        assert_eq!(storage.list_outbreak_reports(&[], None, 1).unwrap().len(), 1);
        assert!(!storage.set_outbreak_status(Uuid::new_v4(), ReportStatus::Approved, "rev").unwrap());
    }

    #[test]
    fn test_update_and_delete_outbreak_report() {
        let (_dir, storage) = open_temp();
        let created = storage.create_outbreak_report("alice", &outbreak("Potato")).unwrap();

        let mut revised = created.details.clone();
        revised.description = "Spreading after rain".to_string();
        revised.coordinates = None;
        assert!(storage.update_outbreak_details(created.id, &revised).unwrap());

        let loaded = storage.load_outbreak_report(created.id).unwrap().unwrap();
        assert_eq!(loaded.details, revised);
        assert!(loaded.updated_at >= created.updated_at);

        assert!(!storage.delete_outbreak_report("bob", created.id).unwrap());
        assert!(storage.delete_outbreak_report("alice", created.id).unwrap());
        assert!(storage.load_outbreak_report(created.id).unwrap().is_none());
    }

    #[test]
    fn test_delete_and_clear() {
        let (_dir, storage) = open_temp();
        let a = report("Apple___healthy");
        let b = report("Corn___healthy");
        storage.save_scan("alice", &a).unwrap();
        storage.save_scan("alice", &b).unwrap();
        storage.save_scan("bob", &report("Grape___healthy")).unwrap();

        assert!(!storage.delete_scan("bob", a.scan_id).unwrap());
        assert!(storage.delete_scan("alice", a.scan_id).unwrap());
        assert!(!storage.delete_scan("alice", a.scan_id).unwrap());

        assert_eq!(storage.clear_history("alice").unwrap(), 1);
        assert_eq!(storage.count_scans("alice").unwrap(), 0);
        assert_eq!(storage.count_scans("bob").unwrap(), 1);
    }

    #[test]
    fn test_subscription_round_trip() {
        let (_dir, storage) = open_temp();
        assert_eq!(storage.load_subscription("alice").unwrap(), Subscription::free());

        let now = Utc::now();
        let premium = Subscription::premium_from(now);
        storage.save_subscription("alice", &premium).unwrap();

        let loaded = storage.load_subscription("alice").unwrap();
        assert_eq!(loaded.tier, SubscriptionTier::Premium);
        assert!(loaded.has_premium_access(now));
        assert_eq!(storage.load_subscription("bob").unwrap(), Subscription::free());
    }
}
