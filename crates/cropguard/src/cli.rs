use clap::{Args, Parser, Subcommand, ValueEnum};
use cropguard_core::{ReportStatus, Severity};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "cropguard")]
#[command(about = "Scan plant photos for diseases and pests and keep a scan history")]
#[command(version)]
pub struct Cli {
    /// Data directory (database, logs, dev credentials)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// User whose history and subscription are used
    #[arg(long, global = true, env = "CROPGUARD_USER", default_value = "local")]
    pub user: String,

    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log filter, e.g. "debug" or "cropguard_core=trace"
    #[arg(long, global = true)]
    pub log_filter: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan a plant photo and save the report
    Scan(ScanArgs),
    /// List past scans, newest first
    History(HistoryArgs),
    /// Show one saved report
    Show {
        /// Scan id
        id: Uuid,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete one saved scan, or the whole history with --all
    Delete {
        /// Scan id
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        id: Option<Uuid>,
        /// Delete every scan for the user
        #[arg(long)]
        all: bool,
    },
    /// Treatment plan, priorities and timeline for a saved scan (premium)
    Advice {
        /// Scan id
        id: Uuid,
    },
    /// Browse the disease guide
    Guide {
        /// Match disease names, common names or symptoms
        query: Option<String>,
    },
    /// Manage the premium subscription
    #[command(subcommand)]
    Subscription(SubscriptionCommand),
    /// Manage the image host API key
    #[command(subcommand)]
    ApiKey(ApiKeyCommand),
    /// Report disease outbreaks and review community reports
    #[command(subcommand)]
    Outbreak(OutbreakCommand),
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct ScanSourceArgs {
    /// Local image file; uploaded to the image host first
    #[arg(long)]
    pub image: Option<PathBuf>,
    /// Already hosted image URL; nothing is uploaded
    #[arg(long)]
    pub url: Option<String>,
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    #[command(flatten)]
    pub source: ScanSourceArgs,
    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
    /// Also print a shareable summary
    #[arg(long)]
    pub share: bool,
}

#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Plant, disease or pest name to search for
    #[arg(short, long, default_value = "")]
    pub search: String,
    /// all, healthy, unhealthy or pest
    #[arg(short, long, default_value = "all")]
    pub filter: String,
    /// Maximum number of scans to list
    #[arg(short, long, default_value_t = 50)]
    pub limit: usize,
}

#[derive(Subcommand, Debug)]
pub enum SubscriptionCommand {
    /// Show the current plan
    Show,
    /// Start a premium billing period
    Activate,
    /// Cancel the current plan
    Cancel,
}

#[derive(Subcommand, Debug)]
pub enum ApiKeyCommand {
    /// Store the image host API key
    Set {
        key: String,
    },
    /// Remove the stored API key
    Clear,
    /// Report whether a key is available
    Status,
}

#[derive(Subcommand, Debug)]
pub enum OutbreakCommand {
    /// Submit an outbreak report for review
    Report(OutbreakReportArgs),
    /// List outbreak reports, newest first
    List {
        /// Only reports you submitted
        #[arg(long)]
        mine: bool,
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
        #[arg(short, long, default_value_t = 50)]
        limit: usize,
    },
    /// Pending and rejected reports awaiting a decision (reviewers only)
    Pending {
        #[arg(short, long, default_value_t = 50)]
        limit: usize,
    },
    /// Show one report
    Show {
        id: Uuid,
    },
    /// Change your report within 30 minutes of submitting it
    Edit(OutbreakEditArgs),
    /// Approve a report (reviewers only)
    Approve {
        id: Uuid,
    },
    /// Reject a report (reviewers only)
    Reject {
        id: Uuid,
    },
    /// Delete your report within 30 minutes of submitting it
    Delete {
        id: Uuid,
    },
}

#[derive(Args, Debug)]
pub struct OutbreakReportArgs {
    /// Affected crop, e.g. "Tomato"
    #[arg(long)]
    pub crop: String,
    /// Disease seen in the field
    #[arg(long)]
    pub disease: String,
    #[arg(long, value_enum)]
    pub severity: SeverityArg,
    #[command(flatten)]
    pub extra: OutbreakExtraArgs,
}

#[derive(Args, Debug)]
pub struct OutbreakEditArgs {
    pub id: Uuid,
    #[arg(long)]
    pub crop: Option<String>,
    #[arg(long)]
    pub disease: Option<String>,
    #[arg(long, value_enum)]
    pub severity: Option<SeverityArg>,
    #[command(flatten)]
    pub extra: OutbreakExtraArgs,
}

#[derive(Args, Debug)]
pub struct OutbreakExtraArgs {
    /// Farm, village or region
    #[arg(long)]
    pub location: Option<String>,
    /// What was observed
    #[arg(long)]
    pub description: Option<String>,
    /// Photo to upload with the report
    #[arg(long, conflicts_with = "image_url")]
    pub image: Option<PathBuf>,
    /// Already hosted photo URL
    #[arg(long)]
    pub image_url: Option<String>,
    #[arg(long, allow_negative_numbers = true, requires = "longitude")]
    pub latitude: Option<f64>,
    #[arg(long, allow_negative_numbers = true, requires = "latitude")]
    pub longitude: Option<f64>,
}

/// Outbreak severity as entered on the command line.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeverityArg {
    Low,
    Medium,
    High,
}

impl From<SeverityArg> for Severity {
    fn from(arg: SeverityArg) -> Self {
        match arg {
            SeverityArg::Low => Severity::Low,
            SeverityArg::Medium => Severity::Medium,
            SeverityArg::High => Severity::High,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusArg {
    Pending,
    Approved,
    Rejected,
}

impl From<StatusArg> for ReportStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Pending => ReportStatus::Pending,
            StatusArg::Approved => ReportStatus::Approved,
            StatusArg::Rejected => ReportStatus::Rejected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_requires_one_source() {
        assert!(Cli::try_parse_from(["cropguard", "scan"]).is_err());
        assert!(Cli::try_parse_from([
            "cropguard", "scan", "--image", "leaf.jpg", "--url", "https://i.ibb.co/x.jpg"
        ])
        .is_err());

        let cli = Cli::try_parse_from(["cropguard", "scan", "--url", "https://i.ibb.co/x.jpg"])
            .unwrap();
        match cli.command {
            Commands::Scan(args) => {
                assert_eq!(args.source.url.as_deref(), Some("https://i.ibb.co/x.jpg"));
                assert!(args.source.image.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let cli = Cli::try_parse_from([
            "cropguard", "history", "--user", "grower", "--filter", "pest", "-l", "5",
        ])
        .unwrap();
        assert_eq!(cli.user, "grower");
        match cli.command {
            Commands::History(args) => {
                assert_eq!(args.filter, "pest");
                assert_eq!(args.limit, 5);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_delete_needs_id_or_all() {
        assert!(Cli::try_parse_from(["cropguard", "delete"]).is_err());
        assert!(Cli::try_parse_from(["cropguard", "delete", "--all"]).is_ok());
        assert!(Cli::try_parse_from(["cropguard", "delete", "not-a-uuid"]).is_err());
    }

    #[test]
    fn test_nested_subcommands() {
        let cli = Cli::try_parse_from(["cropguard", "api-key", "set", "abc123"]).unwrap();
        assert!(matches!(cli.command, Commands::ApiKey(ApiKeyCommand::Set { key }) if key == "abc123"));

        let cli = Cli::try_parse_from(["cropguard", "subscription", "activate"]).unwrap();
        assert!(matches!(cli.command, Commands::Subscription(SubscriptionCommand::Activate)));
    }

    #[test]
    fn test_outbreak_report_args() {
        let cli = Cli::try_parse_from([
            "cropguard", "outbreak", "report", "--crop", "Maize", "--disease", "Common Rust",
            "--severity", "high", "--latitude", "-0.42", "--longitude", "36.95",
        ])
        .unwrap();
        match cli.command {
            Commands::Outbreak(OutbreakCommand::Report(args)) => {
                assert_eq!(args.crop, "Maize");
                assert_eq!(Severity::from(args.severity), Severity::High);
                assert_eq!(args.extra.latitude, Some(-0.42));
                assert_eq!(args.extra.longitude, Some(36.95));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_outbreak_report_rejects_bad_input() {
        // critical is not a field-level severity
        assert!(Cli::try_parse_from([
            "cropguard", "outbreak", "report", "--crop", "Maize", "--disease", "Rust",
            "--severity", "critical",
        ])
        .is_err());
        assert!(Cli::try_parse_from([
            "cropguard", "outbreak", "report", "--crop", "Maize", "--disease", "Rust",
            "--severity", "low", "--latitude", "1.0",
        ])
        .is_err());
        assert!(Cli::try_parse_from([
            "cropguard", "outbreak", "report", "--crop", "Maize", "--disease", "Rust",
            "--severity", "low", "--image", "a.jpg", "--image-url", "https://i.ibb.co/a.jpg",
        ])
        .is_err());
    }

    #[test]
    fn test_outbreak_list_and_review_commands() {
        let cli =
            Cli::try_parse_from(["cropguard", "outbreak", "list", "--mine", "--status", "rejected"])
                .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Outbreak(OutbreakCommand::List { mine: true, status: Some(StatusArg::Rejected), limit: 50 })
        ));

        let id = Uuid::new_v4().to_string();
        let cli = Cli::try_parse_from(["cropguard", "outbreak", "approve", &id]).unwrap();
        assert!(matches!(cli.command, Commands::Outbreak(OutbreakCommand::Approve { .. })));

        let cli = Cli::try_parse_from(["cropguard", "outbreak", "edit", &id, "--severity", "low"])
            .unwrap();
        match cli.command {
            Commands::Outbreak(OutbreakCommand::Edit(args)) => {
                assert_eq!(args.severity, Some(SeverityArg::Low));
                assert!(args.crop.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
