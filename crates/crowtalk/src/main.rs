//! `crowtalk` - CLI for the corvid field companion
//!
//! This binary composes the sound catalog, logs field observations, and
//! produces next-action suggestions from the communication guide.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use clap::Parser;

use crowtalk::catalog::{load_curated_manifest, synthetic_demos, CatalogBuilder};
use crowtalk::cli::{
    Cli, Command, ConfigCommand, ExportCommand, LogCommand, RecordCommand, SoundsCommand,
    SuggestCommand,
};
use crowtalk::export::{ExportBundle, FieldRecording, GpsFix};
use crowtalk::model::{CatalogItem, Location, SessionEvent};
use crowtalk::registry::CategoryRegistry;
use crowtalk::storage::Storage;
use crowtalk::suggest::SuggestionEngine;
use crowtalk::{init_logging, Config};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    // The registry is constructed once and passed by reference everywhere;
    // category ids must stay stable for the lifetime of exported data.
    let registry = match &config.catalog.categories_path {
        Some(path) => CategoryRegistry::load(path)?,
        None => CategoryRegistry::builtin(),
    };

    match cli.command {
        Command::Sounds(cmd) => handle_sounds(&config, &registry, &cmd),
        Command::Categories(cmd) => handle_categories(&registry, cmd.json),
        Command::Log(cmd) => handle_log(&config, &registry, &cmd),
        Command::Suggest(cmd) => handle_suggest(&config, &registry, &cmd),
        Command::Record(cmd) => handle_record(&config, &registry, cmd),
        Command::Export(cmd) => handle_export(&config, &cmd),
        Command::Status(cmd) => handle_status(&config, cmd.json),
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn open_storage(config: &Config) -> Result<Storage, Box<dyn std::error::Error>> {
    Ok(Storage::open(config.database_path())?)
}

fn handle_sounds(
    config: &Config,
    registry: &CategoryRegistry,
    cmd: &SoundsCommand,
) -> Result<(), Box<dyn std::error::Error>> {
    let viewer = match (cmd.lat, cmd.lon) {
        (Some(lat), Some(lon)) => Some(Location::new(lat, lon)),
        _ => config.home_location(),
    };

    let curated = match &config.catalog.curated_manifest {
        Some(path) => load_curated_manifest(path)?,
        None => vec![],
    };
    let field = open_storage(config)?.field_catalog_items()?;

    let builder = CatalogBuilder::new(registry);
    let catalog = builder.build(synthetic_demos(), curated, field, viewer)?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&catalog)?);
    } else {
        print_catalog(&catalog, registry);
    }
    Ok(())
}

fn print_catalog(catalog: &[CatalogItem], registry: &CategoryRegistry) {
    if catalog.is_empty() {
        println!("No sounds available.");
        return;
    }
    for item in catalog {
        let label = registry
            .lookup(&item.category_id)
            .map_or("", |c| c.label.as_str());
        let danger = if item.danger { "  [confirm before playing]" } else { "" };
        let title = if item.title.is_empty() {
            item.id.as_str()
        } else {
            item.title.as_str()
        };
        println!(
            "{:<14} {:<24} {:<14} {}{}",
            item.source.to_string(),
            title,
            label,
            item.phonetic,
            danger
        );
    }
}

fn handle_categories(
    registry: &CategoryRegistry,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(registry.all())?);
    } else {
        for category in registry.all() {
            println!("{:<12} {:<14} {}", category.id, category.label, category.description);
        }
    }
    Ok(())
}

fn handle_log(
    config: &Config,
    registry: &CategoryRegistry,
    cmd: &LogCommand,
) -> Result<(), Box<dyn std::error::Error>> {
    // Reject unknown codes up front; an exported log must never carry a
    // category id the registry cannot resolve.
    let category = registry.lookup(&cmd.category)?;

    let storage = open_storage(config)?;
    let event = SessionEvent::new(&category.id, &cmd.response);
    storage.append_event(&event)?;

    println!("Logged: {} -> {}", category.label, cmd.response);
    Ok(())
}

fn handle_suggest(
    config: &Config,
    registry: &CategoryRegistry,
    cmd: &SuggestCommand,
) -> Result<(), Box<dyn std::error::Error>> {
    let category = registry.lookup(&cmd.category)?;

    let storage = open_storage(config)?;
    let recent = storage.recent_events(config.session.recent_window)?;

    let engine = SuggestionEngine::new(registry);
    let suggestion = engine.suggest_next(category, &cmd.response, &recent)?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&suggestion)?);
    } else {
        println!("{}", suggestion.note);
        if suggestion.suggested_category_ids.is_empty() {
            println!("  (play nothing)");
        }
        for id in &suggestion.suggested_category_ids {
            let label = registry.lookup(id).map_or(id.as_str(), |c| c.label.as_str());
            println!("  try next: {label} ({id})");
        }
    }
    Ok(())
}

#[allow(clippy::too_many_lines)]
fn handle_record(
    config: &Config,
    registry: &CategoryRegistry,
    cmd: RecordCommand,
) -> Result<(), Box<dyn std::error::Error>> {
    let storage = open_storage(config)?;
    match cmd {
        RecordCommand::Add {
            audio,
            category,
            phonetic,
            interpretation,
            response,
            place,
            notes,
            lat,
            lon,
            acc,
            duration,
        } => {
            // An empty category means "not yet labelled"; anything else
            // must resolve.
            if !category.is_empty() {
                registry.lookup(&category)?;
            }
            let gps = match (lat, lon) {
                (Some(lat), Some(lon)) => Some(GpsFix { lat, lon, acc }),
                _ => None,
            };
            let record = FieldRecording {
                category,
                phonetic,
                interpretation,
                response,
                place,
                notes,
                gps,
                rec_time: Some(chrono::Utc::now()),
                duration,
            };
            let id = storage.insert_recording(&record, &audio)?;
            println!("Saved recording {id}");

            let pruned = storage.prune_keep_recent(config.storage.max_recordings)?;
            if pruned > 0 {
                println!(
                    "Pruned {pruned} old recordings (keeping {})",
                    config.storage.max_recordings
                );
            }
        }
        RecordCommand::List { json } => {
            let recordings = storage.recordings()?;
            if json {
                let records: Vec<&FieldRecording> =
                    recordings.iter().map(|r| &r.record).collect();
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else if recordings.is_empty() {
                println!("No recordings yet.");
            } else {
                for stored in &recordings {
                    let rec = &stored.record;
                    let label = if rec.category.is_empty() {
                        "Unlabelled"
                    } else {
                        registry
                            .lookup(&rec.category)
                            .map_or(rec.category.as_str(), |c| c.label.as_str())
                    };
                    let home = match (&config.catalog.home_place, rec.place.is_empty()) {
                        (Some(hq), false)
                            if hq.trim().eq_ignore_ascii_case(rec.place.trim()) =>
                        {
                            " [home territory]"
                        }
                        _ => "",
                    };
                    println!(
                        "{:<5} {:<14} {:<16} {}{}",
                        stored.id, label, rec.place, rec.response, home
                    );
                }
            }
        }
        RecordCommand::Delete { id } => {
            if storage.delete_recording(id)? {
                println!("Deleted recording {id}");
            } else {
                println!("No recording with id {id}");
            }
        }
    }
    Ok(())
}

fn handle_export(
    config: &Config,
    cmd: &ExportCommand,
) -> Result<(), Box<dyn std::error::Error>> {
    let storage = open_storage(config)?;
    let field_recordings = storage
        .recordings()?
        .into_iter()
        .map(|stored| stored.record)
        .collect();
    let events = storage.events()?;

    let bundle = ExportBundle::new(field_recordings, events);
    let json = bundle.to_json_pretty()?;

    match &cmd.output {
        Some(path) => {
            std::fs::write(path, &json)?;
            println!("Exported to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn handle_status(config: &Config, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let storage = open_storage(config)?;
    let recordings = storage.recording_count()?;
    let events = storage.event_count()?;

    if json {
        let status = serde_json::json!({
            "database_path": config.database_path(),
            "recordings": recordings,
            "session_events": events,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("crowtalk status");
        println!("---------------");
        println!("Database:       {}", config.database_path().display());
        println!("Recordings:     {recordings}");
        println!("Session events: {events}");
    }
    Ok(())
}

fn handle_config(
    config: &Config,
    cmd: ConfigCommand,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:    {}", config.database_path().display());
                println!();
                println!("[Catalog]");
                println!(
                    "  Categories file:  {}",
                    config
                        .catalog
                        .categories_path
                        .as_ref()
                        .map_or("(built-in)".to_string(), |p| p.display().to_string())
                );
                println!(
                    "  Curated manifest: {}",
                    config
                        .catalog
                        .curated_manifest
                        .as_ref()
                        .map_or("(none)".to_string(), |p| p.display().to_string())
                );
                println!(
                    "  Home position:    {}",
                    config.home_location().map_or("(unset)".to_string(), |l| {
                        format!("{}, {}", l.lat, l.lon)
                    })
                );
                println!();
                println!("[Session]");
                println!("  Recent window:    {}", config.session.recent_window);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
