//! Config command - show or edit configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager};
use crate::error::{PreviewError, PreviewResult};
use crate::ui::{self, UiContext};

const VALID_KEYS: &[&str] = &[
    "general.verbose",
    "general.log_format",
    "cache.capacity",
    "document.restricted",
    "document.max_restricted_size_mb",
    "save.timeout_secs",
    "viewer.default_zoom_level",
    "viewer.default_spread_mode",
    "viewer.tab_bar",
];

/// Execute the config command
pub async fn execute(args: ConfigArgs, manager: &ConfigManager, config: &Config) -> PreviewResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => show_config(config)?,
        Some(ConfigAction::Path) => println!("{}", manager.path().display()),
        Some(ConfigAction::Init { force }) => init_config(manager, force).await?,
        Some(ConfigAction::Set { key, value }) => {
            let ctx = UiContext::detect();
            let mut config = config.clone();
            if let Err(e) = apply_value(&mut config, &key, &value) {
                if matches!(e, PreviewError::User(ref m) if m.starts_with("Unknown config key")) {
                    ui::step_error_detail(&ctx, "Unknown config key", &key);
                    ui::remark(&ctx, "Valid keys:");
                    for key in VALID_KEYS {
                        eprintln!("  {}", key);
                    }
                }
                return Err(e);
            }
            manager.save(&config).await?;
            ui::step_ok(&ctx, &format!("Set {} = {}", key, value));
        }
    }

    Ok(())
}

fn show_config(config: &Config) -> PreviewResult<()> {
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

async fn init_config(manager: &ConfigManager, force: bool) -> PreviewResult<()> {
    let ctx = UiContext::detect();
    let path = manager.path();

    if path.exists() && !force {
        ui::step_warn_hint(
            &ctx,
            &format!("Config already exists at {}", path.display()),
            "Use --force to overwrite",
        );
        return Ok(());
    }

    manager.save(&Config::default()).await?;
    ui::step_ok_detail(&ctx, "Configuration initialized", &path.display().to_string());

    Ok(())
}

/// Set one dot-separated key on `config`
fn apply_value(config: &mut Config, key: &str, value: &str) -> PreviewResult<()> {
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["general", "verbose"] => config.general.verbose = parse_bool(value)?,
        ["general", "log_format"] => match value {
            "text" | "json" => config.general.log_format = value.to_string(),
            _ => {
                return Err(PreviewError::User(format!(
                    "Invalid log format: {}. Use text or json",
                    value
                )))
            }
        },

        ["cache", "capacity"] => {
            let capacity = parse_u32(value)?;
            if capacity == 0 {
                return Err(PreviewError::User(
                    "cache.capacity must be at least 1".to_string(),
                ));
            }
            config.cache.capacity = capacity as usize;
        }

        ["document", "restricted"] => config.document.restricted = parse_bool(value)?,
        ["document", "max_restricted_size_mb"] => {
            config.document.max_restricted_size_mb = parse_u32(value)?.into()
        }

        ["save", "timeout_secs"] => config.save.timeout_secs = parse_u32(value)?.into(),

        ["viewer", "default_zoom_level"] => config.viewer.default_zoom_level = value.to_string(),
        ["viewer", "default_spread_mode"] => config.viewer.default_spread_mode = value.to_string(),
        ["viewer", "tab_bar"] => config.viewer.tab_bar = value.to_string(),

        _ => return Err(PreviewError::User(format!("Unknown config key: {}", key))),
    }

    Ok(())
}

fn parse_bool(value: &str) -> PreviewResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(PreviewError::User(format!(
            "Invalid boolean value: {}. Use true/false",
            value
        ))),
    }
}

fn parse_u32(value: &str) -> PreviewResult<u32> {
    value
        .parse()
        .map_err(|_| PreviewError::User(format!("Invalid number: {}", value)))
}
