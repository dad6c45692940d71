use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context;
use colored::Colorize;
use rovernet_log::{AdminLog, LogEntry, LogEntryRequest, LockPolicy};
use rovernet_server::{RoverServer, ServerConfig};
use rovernet_store::{Collection, FileDocumentStore, KeyValueStore, StorageLayout};
use serde_json::{json, Value};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let layout = StorageLayout::new(
        cli.data_root
            .clone()
            .unwrap_or_else(|| ServerConfig::default().data_root),
    );
    match cli.command {
        Command::Serve(args) => cmd_serve(args, cli.data_root),
        Command::Player(RecordCommand::Show { id }) => {
            let store = FileDocumentStore::in_layout(&layout, Collection::players());
            println!("{}", show_record(&store, &id, cli.format)?);
            Ok(())
        }
        Command::Company(RecordCommand::Show { id }) => {
            let store = FileDocumentStore::in_layout(&layout, Collection::companies());
            println!("{}", show_record(&store, &id, cli.format)?);
            Ok(())
        }
        Command::Log(LogCommand::Append(args)) => {
            let log = AdminLog::in_layout(&layout, LockPolicy::default());
            println!("{}", append_entry(&log, args, cli.format)?);
            Ok(())
        }
        Command::Log(LogCommand::List { limit }) => {
            let log = AdminLog::in_layout(&layout, LockPolicy::default());
            println!("{}", list_entries(&log, limit, cli.format)?);
            Ok(())
        }
    }
}

fn cmd_serve(args: ServeArgs, data_root: Option<PathBuf>) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::from_toml_file(path)?,
        None => ServerConfig::default(),
    };
    if let Some(root) = data_root {
        config.data_root = root;
    }
    if let Some(bind) = &args.bind {
        config.bind_addr = bind
            .parse()
            .with_context(|| format!("invalid bind address {bind:?}"))?;
    }

    tracing::info!(root = %config.data_root.display(), "serving game data");
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(RoverServer::new(config).serve())?;
    Ok(())
}

fn show_record(store: &dyn KeyValueStore, id: &str, format: OutputFormat) -> anyhow::Result<String> {
    let collection = &store.collection().name;
    let document = store
        .load(id)
        .with_context(|| format!("failed to load {collection} record {id:?}"))?;

    Ok(match (format, document) {
        (OutputFormat::Json, document) => {
            serde_json::to_string_pretty(&document.map(Value::Object).unwrap_or(Value::Null))?
        }
        (OutputFormat::Text, Some(document)) => {
            let mut out = format!("{} {}", collection.bold(), id.yellow());
            for (field, value) in &document {
                out.push_str(&format!("\n  {}: {}", field.cyan(), value));
            }
            out
        }
        (OutputFormat::Text, None) => format!("{} {} {}", collection.bold(), id.yellow(), "not found".dimmed()),
    })
}

fn append_entry(log: &AdminLog, args: AppendArgs, format: OutputFormat) -> anyhow::Result<String> {
    let timestamp = match args.timestamp {
        Some(ts) => ts,
        None => SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as i64,
    };
    let mut entry = LogEntry::new(args.actor, args.action, timestamp).with_details(args.details);
    if let Some(target) = args.target {
        entry = entry.with_target(target);
    }

    let receipt = log.append(&LogEntryRequest::from(entry))?;
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(&json!({
            "totalLogs": receipt.total_entries,
            "bytesWritten": receipt.bytes_written,
        }))?,
        OutputFormat::Text => format!(
            "{} Logged admin action ({} entries, {} bytes)",
            "✓".green().bold(),
            receipt.total_entries.to_string().bold(),
            receipt.bytes_written
        ),
    })
}

fn list_entries(log: &AdminLog, limit: usize, format: OutputFormat) -> anyhow::Result<String> {
    let entries = log.entries();
    let recent = &entries[entries.len().saturating_sub(limit)..];

    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(recent)?,
        OutputFormat::Text if recent.is_empty() => "Admin log: no entries.".to_string(),
        OutputFormat::Text => recent
            .iter()
            .map(|e| {
                let target = e
                    .target_user_id
                    .map(|t| format!(" -> {t}"))
                    .unwrap_or_default();
                let details = if e.details.is_empty() {
                    String::new()
                } else {
                    format!("  {}", e.details.dimmed())
                };
                format!(
                    "{}  {}{}  {}{}",
                    e.timestamp.to_string().dimmed(),
                    e.actor_user_id.to_string().bold(),
                    target,
                    e.action.yellow(),
                    details
                )
            })
            .collect::<Vec<_>>()
            .join("\n"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_color() {
        colored::control::set_override(false);
    }

    fn append_args(actor: i64, action: &str, timestamp: i64) -> AppendArgs {
        AppendArgs {
            actor,
            action: action.to_string(),
            target: None,
            details: String::new(),
            timestamp: Some(timestamp),
        }
    }

    #[test]
    fn show_missing_and_present_records() {
        no_color();
        let dir = tempfile::tempdir().unwrap();
        let store = FileDocumentStore::in_layout(&StorageLayout::new(dir.path()), Collection::players());

        assert_eq!(show_record(&store, "42", OutputFormat::Json).unwrap(), "null");
        assert!(show_record(&store, "42", OutputFormat::Text)
            .unwrap()
            .ends_with("not found"));

        let document = json!({"UserId": 42, "Gold": 100}).as_object().cloned().unwrap();
        store.save("42", &document).unwrap();
        let text = show_record(&store, "42", OutputFormat::Text).unwrap();
        assert!(text.contains("Gold: 100"));
    }

    #[test]
    fn show_rejects_bad_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileDocumentStore::in_layout(&StorageLayout::new(dir.path()), Collection::companies());
        assert!(show_record(&store, "../etc", OutputFormat::Text).is_err());
    }

    #[test]
    fn append_then_list() {
        no_color();
        let dir = tempfile::tempdir().unwrap();
        let log = AdminLog::in_layout(&StorageLayout::new(dir.path()), LockPolicy::default());

        append_entry(&log, append_args(7, "ban", 1000), OutputFormat::Text).unwrap();
        let out = append_entry(&log, append_args(8, "kick", 1001), OutputFormat::Json).unwrap();
        let receipt: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(receipt["totalLogs"], json!(2));

        let listed = list_entries(&log, 1, OutputFormat::Text).unwrap();
        assert!(listed.contains("kick"));
        assert!(!listed.contains("ban"));

        let all: Vec<LogEntry> =
            serde_json::from_str(&list_entries(&log, 20, OutputFormat::Json).unwrap()).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].action, "ban");
    }

    #[test]
    fn empty_log_lists_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let log = AdminLog::in_layout(&StorageLayout::new(dir.path()), LockPolicy::default());
        assert_eq!(
            list_entries(&log, 5, OutputFormat::Text).unwrap(),
            "Admin log: no entries."
        );
    }
}
