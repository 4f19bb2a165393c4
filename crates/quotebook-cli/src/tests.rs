use std::path::{Path, PathBuf};

use chrono::{TimeZone, Utc};
use clap::Parser;
use pretty_assertions::assert_eq;
use quotebook_core::categories::CategoryFilter;
use quotebook_core::config::QuotebookConfig;
use quotebook_core::sync::{MergeReport, SyncError, SyncOutcome};
use quotebook_core::{Quote, QuoteId, SyncConflict};

use crate::cli::{Cli, Commands, CompletionShell, ConfigCommands};
use crate::commands::common::{
    format_quote_lines, format_sync_conflict_lines, format_sync_timestamp, normalize_text,
    quote_preview, quote_to_list_item, resolve_db_path, resolve_export_target,
    sync_conflict_to_item, Context,
};
use crate::commands::completions::render_completions;
use crate::commands::config::{apply_config_update, ConfigUpdate};
use crate::commands::export::run_export;
use crate::commands::import::run_import;
use crate::commands::list::{format_category_lines, run_filter};
use crate::commands::sync::{run_sync, run_watch, sync_outcome_lines};
use crate::error::CliError;

fn test_context(dir: &Path) -> Context {
    Context {
        config: QuotebookConfig::default(),
        config_path: dir.join("config.json"),
        db_path: dir.join("quotes.db"),
    }
}

#[test]
fn normalize_text_trims_and_rejects_empty() {
    assert_eq!(normalize_text("  hello  "), Some("hello".to_string()));
    assert_eq!(normalize_text(" \n\t "), None);
}

#[test]
fn add_command_collects_words_and_flags() {
    let cli = Cli::try_parse_from([
        "quotebook",
        "add",
        "Stay",
        "hungry",
        "--author",
        "Steve Jobs",
        "-c",
        "Life",
    ])
    .unwrap();

    match cli.command {
        Some(Commands::Add {
            text,
            author,
            category,
        }) => {
            assert_eq!(text, vec!["Stay", "hungry"]);
            assert_eq!(author.as_deref(), Some("Steve Jobs"));
            assert_eq!(category.as_deref(), Some("Life"));
        }
        _ => panic!("expected add command"),
    }
}

#[test]
fn export_output_and_dir_are_mutually_exclusive() {
    assert!(Cli::try_parse_from(["quotebook", "export", "-o", "a.json", "--dir", "out"]).is_err());
    assert!(Cli::try_parse_from(["quotebook", "export", "--dir", "out"]).is_ok());
}

#[test]
fn global_db_path_is_accepted_after_subcommand() {
    let cli = Cli::try_parse_from(["quotebook", "list", "--db-path", "/tmp/q.db"]).unwrap();
    assert_eq!(cli.db_path, Some(PathBuf::from("/tmp/q.db")));
}

#[test]
fn config_init_flags_conflict() {
    assert!(Cli::try_parse_from([
        "quotebook",
        "config",
        "init",
        "--disable-remote",
        "--enable-remote"
    ])
    .is_err());

    let cli = Cli::try_parse_from(["quotebook", "config", "init", "--sync-interval", "60"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Config {
            command: ConfigCommands::Init {
                sync_interval: Some(60),
                ..
            }
        })
    ));
}

#[test]
fn db_path_prefers_flag_then_config() {
    let config = QuotebookConfig {
        db_path: Some(PathBuf::from("/from/config.db")),
        ..QuotebookConfig::default()
    };

    assert_eq!(
        resolve_db_path(Some(PathBuf::from("/from/flag.db")), &config),
        PathBuf::from("/from/flag.db")
    );
    assert_eq!(
        resolve_db_path(None, &config),
        PathBuf::from("/from/config.db")
    );
    assert!(resolve_db_path(None, &QuotebookConfig::default()).ends_with("quotebook/quotebook.db"));
}

#[test]
fn export_target_uses_timestamped_name_in_dir() {
    let now = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();

    assert_eq!(
        resolve_export_target(None, Some(Path::new("out")), now),
        Some(PathBuf::from("out/quotes-2024-01-02T03-04-05-000Z.json"))
    );
    assert_eq!(
        resolve_export_target(Some(PathBuf::from("a.json")), None, now),
        Some(PathBuf::from("a.json"))
    );
    assert_eq!(resolve_export_target(None, None, now), None);
}

#[test]
fn quote_preview_truncates_long_text() {
    let quote = Quote::new("The   only way to do great work\nis to love what you do.");
    assert_eq!(quote_preview(&quote, 80), "The only way to do great work is to love what you do.");
    assert_eq!(quote_preview(&quote, 12), "The only ...");
}

#[test]
fn quote_lines_show_author_and_category() {
    let with_category = Quote::new("Be curious.")
        .with_id(7)
        .with_author("Anon")
        .with_category("Life");
    let bare = Quote::new("No id here");

    let lines = format_quote_lines(&[&with_category, &bare]);
    assert!(lines[0].starts_with("7 "));
    assert!(lines[0].contains("Anon"));
    assert!(lines[0].ends_with("[Life]"));
    assert!(lines[1].starts_with("- "));
    assert!(lines[1].ends_with("Unknown"));
}

#[test]
fn list_item_falls_back_to_unknown_author() {
    let quote = Quote::new("Text").with_id("abc").with_updated_at(0);
    let item = quote_to_list_item(&quote);

    assert_eq!(item.id.as_deref(), Some("abc"));
    assert_eq!(item.author, "Unknown");
    assert_eq!(item.category, None);
    assert_eq!(item.updated_at_iso.as_deref(), Some("1970-01-01 00:00:00 UTC"));
}

#[test]
fn category_lines_mark_selected_filter() {
    let categories = vec!["Life".to_string(), "Server".to_string()];

    assert_eq!(
        format_category_lines(&categories, &CategoryFilter::Category("Server".to_string())),
        vec!["  all", "  Life", "* Server"]
    );
    assert_eq!(
        format_category_lines(&[], &CategoryFilter::All),
        vec!["* all"]
    );
}

#[test]
fn sync_conflict_lines_include_quote_id() {
    let conflict = SyncConflict {
        quote_id: QuoteId::Int(3),
        local_updated_at: 10,
        incoming_updated_at: 20,
        resolved_at: 1_700_000_000_000,
        strategy: "lww".to_string(),
    };

    assert_eq!(
        format_sync_conflict_lines(std::slice::from_ref(&conflict)),
        vec!["2023-11-14 22:13:20 UTC  lww   quote=3  local=10 incoming=20"]
    );
    let item = sync_conflict_to_item(&conflict);
    assert_eq!(item.quote_id, "3");
    assert_eq!(item.resolved_at_iso, format_sync_timestamp(1_700_000_000_000));
}

#[test]
fn config_update_keeps_unset_fields() {
    let mut config = QuotebookConfig::default();
    apply_config_update(
        &mut config,
        ConfigUpdate {
            fetch_url: Some(" https://quotes.example.com/api ".to_string()),
            remote_enabled: Some(false),
            ..ConfigUpdate::default()
        },
    )
    .unwrap();

    assert_eq!(config.fetch_url(), "https://quotes.example.com/api");
    assert!(!config.remote.enabled);
    assert_eq!(config.sync_interval_secs, 30);
}

#[test]
fn config_update_rejects_invalid_url() {
    let mut config = QuotebookConfig::default();
    let error = apply_config_update(
        &mut config,
        ConfigUpdate {
            push_url: Some("quotes.example.com".to_string()),
            ..ConfigUpdate::default()
        },
    )
    .unwrap_err();
    assert!(matches!(error, CliError::Config(_)));
}

#[test]
fn import_then_export_to_directory() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = test_context(dir.path());
    let import_file = dir.path().join("in.json");
    std::fs::write(
        &import_file,
        r#"[{"id":1,"text":"X"},{"id":2},{"id":3,"text":"Y","category":"Life"}]"#,
    )
    .unwrap();

    run_import(&import_file, &ctx).unwrap();

    let export_dir = dir.path().join("exports");
    run_export(None, Some(&export_dir), &ctx).unwrap();

    let exported = std::fs::read_dir(&export_dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect::<Vec<_>>();
    assert_eq!(exported.len(), 1);
    let file_name = exported[0].file_name().unwrap().to_string_lossy().to_string();
    assert!(file_name.starts_with("quotes-"));
    assert!(file_name.ends_with(".json"));

    let quotes: Vec<Quote> =
        serde_json::from_str(&std::fs::read_to_string(&exported[0]).unwrap()).unwrap();
    let texts = quotes.iter().map(|quote| quote.text.as_str()).collect::<Vec<_>>();
    // Ten built-in quotes, then the two valid imports.
    assert_eq!(texts.len(), 12);
    assert_eq!(&texts[10..], ["X", "Y"]);
}

#[test]
fn import_rejects_non_array_file() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = test_context(dir.path());
    let import_file = dir.path().join("in.json");
    std::fs::write(&import_file, r#"{"text":"X"}"#).unwrap();

    let error = run_import(&import_file, &ctx).unwrap_err();
    assert!(matches!(
        error,
        CliError::Core(quotebook_core::Error::ImportFormat(_))
    ));
}

#[test]
fn filter_selection_is_remembered() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = test_context(dir.path());

    run_filter(Some("Life"), &ctx).unwrap();
    let book = ctx.open_book().unwrap();
    assert_eq!(
        book.selected_filter(),
        &CategoryFilter::Category("Life".to_string())
    );
    drop(book);

    run_filter(Some("all"), &ctx).unwrap();
    assert_eq!(ctx.open_book().unwrap().selected_filter(), &CategoryFilter::All);
}

#[tokio::test]
async fn sync_commands_require_enabled_remote() {
    let dir = tempfile::tempdir().unwrap();
    let mut ctx = test_context(dir.path());
    ctx.config.remote.enabled = false;

    assert!(matches!(
        run_sync(&ctx).await,
        Err(CliError::RemoteDisabled)
    ));
    assert!(matches!(
        run_watch(None, &ctx).await,
        Err(CliError::RemoteDisabled)
    ));
    assert!(matches!(
        run_watch(Some(0), &ctx).await,
        Err(CliError::Config(_))
    ));
}

#[test]
fn completions_name_the_binary() {
    for shell in [CompletionShell::Bash, CompletionShell::Zsh, CompletionShell::Fish] {
        let script = String::from_utf8(render_completions(shell)).unwrap();
        assert!(script.contains("quotebook"), "{shell:?} completions");
    }
}

#[test]
fn sync_remote_failure_is_a_notice_not_an_error() {
    let lines = sync_outcome_lines(SyncOutcome::Failed(SyncError::RemoteFetch(
        "connection refused".to_string(),
    )))
    .unwrap();
    assert_eq!(
        lines,
        vec!["Sync failed, local quotes unchanged: Remote fetch failed: connection refused"]
    );

    assert!(matches!(
        sync_outcome_lines(SyncOutcome::Failed(SyncError::Store(
            quotebook_core::Error::Storage("disk full".to_string())
        ))),
        Err(CliError::Sync(SyncError::Store(_)))
    ));
    assert!(matches!(
        sync_outcome_lines(SyncOutcome::Failed(SyncError::InvalidConfiguration(
            "endpoint must not be empty".to_string()
        ))),
        Err(CliError::Sync(SyncError::InvalidConfiguration(_)))
    ));
}

#[test]
fn sync_completed_lists_conflicts() {
    let report = MergeReport {
        added: 1,
        overwritten: 1,
        skipped: 0,
        conflicts: vec![SyncConflict {
            quote_id: QuoteId::Int(3),
            local_updated_at: 10,
            incoming_updated_at: 20,
            resolved_at: 1_700_000_000_000,
            strategy: "lww".to_string(),
        }],
    };

    assert_eq!(
        sync_outcome_lines(SyncOutcome::Completed(report)).unwrap(),
        vec![
            "Sync completed: 1 added, 1 updated, 0 unchanged",
            "    2023-11-14 22:13:20 UTC  lww   quote=3  local=10 incoming=20",
        ]
    );
    assert_eq!(
        sync_outcome_lines(SyncOutcome::Skipped).unwrap(),
        vec!["Sync did not run"]
    );
}
