use super::load_config;
use crate::output::print_json;
use autoblog_core::config::{Credentials, WarnLevel};
use clap::Subcommand;
use std::path::Path;

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Validate autoblog.yaml for common mistakes
    Validate,

    /// Show which credentials are set (values are never printed)
    Credentials,
}

pub fn run(root: &Path, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Validate => validate(root, json),
        ConfigSubcommand::Credentials => credentials(json),
    }
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

fn validate(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = load_config(root)?;
    let warnings = config.validate();

    if json {
        print_json(&serde_json::json!({ "warnings": warnings }))?;
    } else if warnings.is_empty() {
        println!("Config is valid. No warnings.");
    } else {
        for w in &warnings {
            let prefix = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("[{prefix}] {}", w.message);
        }
    }

    if warnings.iter().any(|w| w.level == WarnLevel::Error) {
        anyhow::bail!("config validation found errors");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// credentials
// ---------------------------------------------------------------------------

fn credentials(json: bool) -> anyhow::Result<()> {
    let creds = Credentials::from_env();
    let entries = [
        ("anthropic_api_key", creds.anthropic_api_key.is_some()),
        ("twitter_consumer_key", creds.consumer_key.is_some()),
        ("twitter_consumer_secret", creds.consumer_secret.is_some()),
        ("twitter_access_token", creds.access_token.is_some()),
        ("twitter_access_token_secret", creds.access_token_secret.is_some()),
        ("twitter_bearer_token", creds.bearer_token.is_some()),
    ];

    if json {
        let map: serde_json::Map<String, serde_json::Value> = entries
            .iter()
            .map(|(k, set)| (k.to_string(), serde_json::Value::Bool(*set)))
            .collect();
        return print_json(&map);
    }
    for (name, set) in entries {
        println!("{:<28} {}", name, if set { "set" } else { "unset" });
    }
    Ok(())
}
