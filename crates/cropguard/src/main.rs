//! Crop Guard - scan plant photos for diseases and pests.

mod cli;
mod render;

use clap::Parser;
use cli::{
    ApiKeyCommand, Cli, Commands, HistoryArgs, OutbreakCommand, OutbreakExtraArgs, ScanArgs,
    SubscriptionCommand,
};
use cropguard_core::logging::{init_logging, LogConfig};
use cropguard_core::services::advice;
use cropguard_core::models::Coordinates;
use cropguard_core::services::credentials::IMAGE_HOST_SERVICE;
use cropguard_core::{
    AppConfig, CropGuardError, CropGuardState, KnowledgeBase, OutbreakDetails, ReportStatus,
    ScanFilter, ScanSource,
};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use uuid::Uuid;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load(path),
        None => AppConfig::load_default(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => return report_error(&e),
    };

    let data_dir = config.resolve_data_dir(cli.data_dir.as_deref());
    let log_config = LogConfig::for_app(&config, &data_dir).with_cli_filter(cli.log_filter.clone());
    let _logging_guard = init_logging(log_config);

    tracing::debug!(user_id = %cli.user, "Starting Crop Guard");

    let state = match CropGuardState::with_data_dir(data_dir, config) {
        Ok(state) => Arc::new(state),
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialize CropGuardState");
            return report_error(&e);
        }
    };

    // weak so the runtime is never dropped from one of its own workers
    let signal_state = Arc::downgrade(&state);
    state.spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            if let Some(state) = signal_state.upgrade() {
                let cancelled = state.cancel_all_scans();
                tracing::info!(cancelled, "Interrupted, cancelling scans");
            }
        }
    });

    match run(&state, &cli.user, cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report_error(&e),
    }
}

fn report_error(error: &CropGuardError) -> ExitCode {
    let info = error.to_error_info();
    eprintln!("{}: {}", info.error_type, info.message);
    if let Some(hint) = info.hint {
        eprintln!("  hint: {hint}");
    }
    if let Some(detail) = info.technical_detail {
        eprintln!("  detail: {detail}");
    }
    ExitCode::FAILURE
}

fn run(state: &CropGuardState, user_id: &str, command: Commands) -> Result<(), CropGuardError> {
    match command {
        Commands::Scan(args) => scan(state, user_id, args),
        Commands::History(args) => history(state, user_id, args),
        Commands::Show { id, json } => show(state, user_id, id, json),
        Commands::Delete { id, all } => delete(state, user_id, id, all),
        Commands::Advice { id } => show_advice(state, user_id, id),
        Commands::Guide { query } => {
            let kb = KnowledgeBase::builtin();
            let diseases = match query.as_deref() {
                Some(q) => kb.search_diseases(q),
                None => kb.diseases().collect(),
            };
            print!("{}", render::guide(&diseases));
            Ok(())
        }
        Commands::Subscription(command) => subscription(state, user_id, command),
        Commands::ApiKey(command) => api_key(state, command),
        Commands::Outbreak(command) => outbreak(state, user_id, command),
    }
}

fn read_image(path: &Path) -> Result<Vec<u8>, CropGuardError> {
    std::fs::read(path).map_err(|e| {
        CropGuardError::not_found(format!("Cannot read image '{}': {e}", path.display()))
    })
}

fn scan(state: &CropGuardState, user_id: &str, args: ScanArgs) -> Result<(), CropGuardError> {
    let source = match (args.source.image, args.source.url) {
        (Some(path), _) => ScanSource::Image { data: read_image(&path)? },
        (None, Some(url)) => ScanSource::Hosted { url },
        (None, None) => return Err(CropGuardError::config("Either --image or --url is required")),
    };

    let report = state.run_scan(user_id, source)?;
    let view = report.view(state.entitlement(user_id)?);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print!("{}", render::report(&view));
    }
    if args.share {
        println!("\n{}", report.share_message());
    }
    Ok(())
}

fn history(state: &CropGuardState, user_id: &str, args: HistoryArgs) -> Result<(), CropGuardError> {
    let filter = ScanFilter::parse(&args.filter).ok_or_else(|| {
        CropGuardError::config(format!(
            "Unknown filter '{}'; use all, healthy, unhealthy or pest",
            args.filter
        ))
    })?;
    let records = state.storage().search_history(user_id, &args.search, filter, args.limit)?;
    print!("{}", render::history(&records));
    Ok(())
}

fn show(state: &CropGuardState, user_id: &str, id: Uuid, json: bool) -> Result<(), CropGuardError> {
    let record = state
        .storage()
        .load_scan(user_id, id)?
        .ok_or_else(|| CropGuardError::not_found(format!("Scan {id}")))?;
    let view = record.report.view(state.entitlement(user_id)?);

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print!("{}", render::report(&view));
    }
    Ok(())
}

fn delete(
    state: &CropGuardState,
    user_id: &str,
    id: Option<Uuid>,
    all: bool,
) -> Result<(), CropGuardError> {
    if all {
        let removed = state.storage().clear_history(user_id)?;
        println!("Deleted {removed} scan(s)");
        return Ok(());
    }
    let Some(id) = id else {
        return Err(CropGuardError::config("A scan id or --all is required"));
    };
    if !state.storage().delete_scan(user_id, id)? {
        return Err(CropGuardError::not_found(format!("Scan {id}")));
    }
    println!("Deleted scan {id}");
    Ok(())
}

fn show_advice(state: &CropGuardState, user_id: &str, id: Uuid) -> Result<(), CropGuardError> {
    let record = state
        .storage()
        .load_scan(user_id, id)?
        .ok_or_else(|| CropGuardError::not_found(format!("Scan {id}")))?;

    if !state.entitlement(user_id)?.is_premium() {
        println!("Treatment plans are a premium feature: cropguard subscription activate");
        return Ok(());
    }

    let report = &record.report;
    print!(
        "{}",
        render::advice(
            advice::severity_level(report.overall_health),
            &advice::treatment_plan(report),
            &advice::priority_actions(report),
            &advice::timeline(),
        )
    );
    Ok(())
}

fn subscription(
    state: &CropGuardState,
    user_id: &str,
    command: SubscriptionCommand,
) -> Result<(), CropGuardError> {
    let subscription = match command {
        SubscriptionCommand::Show => state.subscription(user_id)?,
        SubscriptionCommand::Activate => state.activate_premium(user_id)?,
        SubscriptionCommand::Cancel => state.cancel_subscription(user_id)?,
    };
    print!("{}", render::subscription(&subscription));
    Ok(())
}

fn api_key(state: &CropGuardState, command: ApiKeyCommand) -> Result<(), CropGuardError> {
    let credentials = state.credentials();
    match command {
        ApiKeyCommand::Set { key } => {
            credentials.store_api_key(IMAGE_HOST_SERVICE, &key)?;
            println!("API key stored ({})", credentials.provider_name());
        }
        ApiKeyCommand::Clear => {
            credentials.delete_api_key(IMAGE_HOST_SERVICE)?;
            println!("API key removed");
        }
        ApiKeyCommand::Status => {
            let status = if credentials.has_api_key(IMAGE_HOST_SERVICE)? { "set" } else { "not set" };
            println!("Image host API key: {status} ({})", credentials.provider_name());
        }
    }
    Ok(())
}

fn outbreak(
    state: &CropGuardState,
    user_id: &str,
    command: OutbreakCommand,
) -> Result<(), CropGuardError> {
    match command {
        OutbreakCommand::Report(args) => {
            let mut details = OutbreakDetails::new(args.crop, args.disease, args.severity.into());
            apply_outbreak_extras(state, &mut details, args.extra)?;
            let report = state.report_outbreak(user_id, details)?;
            print!("{}", render::outbreak(&report));
            println!(
                "\nSubmitted for review. You can edit or delete it until {}.",
                report.edit_deadline().format("%H:%M UTC")
            );
        }
        OutbreakCommand::List { mine, status, limit } => {
            let statuses: Vec<ReportStatus> = status.map(Into::into).into_iter().collect();
            let author = mine.then_some(user_id);
            let reports = state.storage().list_outbreak_reports(&statuses, author, limit)?;
            print!("{}", render::outbreak_list(&reports));
        }
        OutbreakCommand::Pending { limit } => {
            print!("{}", render::outbreak_list(&state.review_queue(user_id, limit)?));
        }
        OutbreakCommand::Show { id } => print!("{}", render::outbreak(&state.outbreak_report(id)?)),
        OutbreakCommand::Edit(args) => {
            let mut details = state.outbreak_report(args.id)?.details;
            if let Some(crop) = args.crop {
                details.crop_type = crop;
            }
            if let Some(disease) = args.disease {
                details.disease_name = disease;
            }
            if let Some(severity) = args.severity {
                details.severity = severity.into();
            }
            apply_outbreak_extras(state, &mut details, args.extra)?;
            print!("{}", render::outbreak(&state.edit_outbreak(user_id, args.id, details)?));
        }
        OutbreakCommand::Approve { id } => {
            let report = state.review_outbreak(user_id, id, ReportStatus::Approved)?;
            println!("Approved outbreak report {}", report.id);
        }
        OutbreakCommand::Reject { id } => {
            let report = state.review_outbreak(user_id, id, ReportStatus::Rejected)?;
            println!("Rejected outbreak report {}", report.id);
        }
        OutbreakCommand::Delete { id } => {
            state.delete_outbreak(user_id, id)?;
            println!("Deleted outbreak report {id}");
        }
    }
    Ok(())
}

fn apply_outbreak_extras(
    state: &CropGuardState,
    details: &mut OutbreakDetails,
    extra: OutbreakExtraArgs,
) -> Result<(), CropGuardError> {
    if let Some(location) = extra.location {
        details.location = location;
    }
    if let Some(description) = extra.description {
        details.description = description;
    }
    if let Some(path) = extra.image {
        details.image_url = Some(state.upload_image(&read_image(&path)?)?);
    } else if let Some(url) = extra.image_url {
        details.image_url = Some(url);
    }
    if let (Some(latitude), Some(longitude)) = (extra.latitude, extra.longitude) {
        details.coordinates = Some(Coordinates::new(latitude, longitude)?);
    }
    Ok(())
}
