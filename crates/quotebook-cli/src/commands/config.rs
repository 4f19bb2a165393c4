use quotebook_core::config::QuotebookConfig;
use quotebook_core::util::normalize_text_option;

use crate::cli::ConfigCommands;
use crate::commands::common::Context;
use crate::error::CliError;

/// Values passed to `config init`; `None` keeps what the file already has.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigUpdate {
    pub fetch_url: Option<String>,
    pub push_url: Option<String>,
    pub sync_interval_secs: Option<u64>,
    pub remote_enabled: Option<bool>,
}

pub fn run_config(command: ConfigCommands, ctx: &Context) -> Result<(), CliError> {
    match command {
        ConfigCommands::Show => run_config_show(ctx),
        ConfigCommands::Init {
            fetch_url,
            push_url,
            sync_interval,
            disable_remote,
            enable_remote,
        } => {
            let remote_enabled = if disable_remote {
                Some(false)
            } else if enable_remote {
                Some(true)
            } else {
                None
            };
            run_config_init(
                ConfigUpdate {
                    fetch_url,
                    push_url,
                    sync_interval_secs: sync_interval,
                    remote_enabled,
                },
                ctx,
            )
        }
    }
}

fn run_config_show(ctx: &Context) -> Result<(), CliError> {
    println!("# {}", ctx.config_path.display());
    println!("{}", serde_json::to_string_pretty(&ctx.config)?);
    println!("# database: {}", ctx.db_path.display());
    println!("# fetch url: {}", ctx.config.fetch_url());
    println!("# push url: {}", ctx.config.push_url());
    Ok(())
}

fn run_config_init(update: ConfigUpdate, ctx: &Context) -> Result<(), CliError> {
    // Start from the file rather than ctx.config so env overrides are not persisted.
    let mut config =
        QuotebookConfig::load_from_path(&ctx.config_path).map_err(CliError::Config)?;
    apply_config_update(&mut config, update)?;
    config
        .save_to_path(&ctx.config_path)
        .map_err(CliError::Config)?;

    println!("Config written to {}", ctx.config_path.display());
    if !config.remote.enabled {
        println!("Remote sync is disabled.");
    }
    Ok(())
}

pub fn apply_config_update(
    config: &mut QuotebookConfig,
    update: ConfigUpdate,
) -> Result<(), CliError> {
    if let Some(url) = normalize_text_option(update.fetch_url) {
        config.remote.fetch_url = Some(url);
    }
    if let Some(url) = normalize_text_option(update.push_url) {
        config.remote.push_url = Some(url);
    }
    if let Some(secs) = update.sync_interval_secs {
        config.sync_interval_secs = secs;
    }
    if let Some(enabled) = update.remote_enabled {
        config.remote.enabled = enabled;
    }

    config.validate().map_err(CliError::Config)
}
