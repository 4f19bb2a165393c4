use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use quotebook_core::clock::SystemClock;
use quotebook_core::config::{QuotebookConfig, CONFIG_FILE_NAME};
use quotebook_core::db::Database;
use quotebook_core::export::suggested_export_file_name;
use quotebook_core::services::QuoteBook;
use quotebook_core::sync::{HttpRemoteSource, SyncEngine};
use quotebook_core::{Quote, SyncConflict};
use serde::Serialize;

use crate::error::CliError;

/// Resolved runtime settings shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    pub config: QuotebookConfig,
    pub config_path: PathBuf,
    pub db_path: PathBuf,
}

impl Context {
    pub fn resolve(
        cli_config_path: Option<PathBuf>,
        cli_db_path: Option<PathBuf>,
    ) -> Result<Self, CliError> {
        let config_path = cli_config_path.unwrap_or_else(default_config_path);
        let mut config = QuotebookConfig::load_from_path(&config_path).map_err(CliError::Config)?;
        config.apply_env().map_err(CliError::Config)?;
        let db_path = resolve_db_path(cli_db_path, &config);

        Ok(Self {
            config,
            config_path,
            db_path,
        })
    }

    pub fn open_book(&self) -> Result<QuoteBook<Database>, CliError> {
        let db = Database::open(&self.db_path)?;
        Ok(QuoteBook::open(db))
    }

    /// Sync engine for the configured remote, or `None` when remote traffic is off.
    pub fn sync_engine(&self) -> Result<Option<SyncEngine<HttpRemoteSource>>, CliError> {
        if !self.config.remote.enabled {
            return Ok(None);
        }

        let remote = HttpRemoteSource::with_timeout(
            self.config.fetch_url(),
            self.config.push_url(),
            self.config.request_timeout(),
        )?;
        Ok(Some(SyncEngine::new(remote, Arc::new(SystemClock))))
    }
}

#[derive(Debug, Serialize)]
pub struct QuoteListItem {
    pub id: Option<String>,
    pub text: String,
    pub author: String,
    pub category: Option<String>,
    pub updated_at: Option<i64>,
    pub updated_at_iso: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SyncConflictItem {
    pub quote_id: String,
    pub local_updated_at: i64,
    pub incoming_updated_at: i64,
    pub resolved_at: i64,
    pub resolved_at_iso: String,
    pub strategy: String,
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("quotebook")
        .join(CONFIG_FILE_NAME)
}

pub fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("quotebook")
        .join("quotebook.db")
}

pub fn resolve_db_path(cli_db_path: Option<PathBuf>, config: &QuotebookConfig) -> PathBuf {
    cli_db_path
        .or_else(|| config.db_path.clone())
        .unwrap_or_else(default_db_path)
}

/// Where `export` writes: an explicit file, a timestamped file in `dir`, or stdout.
pub fn resolve_export_target(
    output: Option<PathBuf>,
    dir: Option<&Path>,
    now: DateTime<Utc>,
) -> Option<PathBuf> {
    output.or_else(|| dir.map(|dir| dir.join(suggested_export_file_name(now))))
}

pub fn format_quote_lines(quotes: &[&Quote]) -> Vec<String> {
    quotes
        .iter()
        .map(|quote| {
            let id = quote
                .id
                .as_ref()
                .map_or_else(|| "-".to_string(), ToString::to_string);
            let short_id = id.chars().take(13).collect::<String>();
            let preview = quote_preview(quote, 50);
            let author = quote.display_author();
            match quote.category_name() {
                Some(category) => {
                    format!("{short_id:<13}  {preview:<50}  {author:<20}  [{category}]")
                }
                None => format!("{short_id:<13}  {preview:<50}  {author}"),
            }
        })
        .collect()
}

pub fn quote_to_list_item(quote: &Quote) -> QuoteListItem {
    QuoteListItem {
        id: quote.id.as_ref().map(ToString::to_string),
        text: quote.text.clone(),
        author: quote.display_author().to_string(),
        category: quote.category_name().map(ToString::to_string),
        updated_at: quote.updated_at,
        updated_at_iso: quote.updated_at.map(format_sync_timestamp),
    }
}

pub fn sync_conflict_to_item(conflict: &SyncConflict) -> SyncConflictItem {
    SyncConflictItem {
        quote_id: conflict.quote_id.to_string(),
        local_updated_at: conflict.local_updated_at,
        incoming_updated_at: conflict.incoming_updated_at,
        resolved_at: conflict.resolved_at,
        resolved_at_iso: format_sync_timestamp(conflict.resolved_at),
        strategy: conflict.strategy.clone(),
    }
}

pub fn quote_preview(quote: &Quote, max_chars: usize) -> String {
    let collapsed = quote.text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let take_len = max_chars.saturating_sub(3);
        let mut truncated = collapsed.chars().take(take_len).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

pub fn format_sync_conflict_lines(conflicts: &[SyncConflict]) -> Vec<String> {
    conflicts
        .iter()
        .map(|conflict| {
            format!(
                "{}  {:<4}  quote={}  local={} incoming={}",
                format_sync_timestamp(conflict.resolved_at),
                conflict.strategy,
                conflict.quote_id,
                conflict.local_updated_at,
                conflict.incoming_updated_at
            )
        })
        .collect()
}

pub fn format_sync_timestamp(timestamp_ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(timestamp_ms).map_or_else(
        || timestamp_ms.to_string(),
        |date_time| date_time.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    )
}

pub fn resolve_quote_text(text_parts: &[String]) -> Result<String, CliError> {
    if let Some(text) = normalize_text(&text_parts.join(" ")) {
        return Ok(text);
    }

    if let Some(text) = read_piped_stdin()? {
        return Ok(text);
    }

    Err(CliError::EmptyQuoteText)
}

pub fn normalize_text(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn read_piped_stdin() -> Result<Option<String>, CliError> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer)?;
    Ok(normalize_text(&buffer))
}
