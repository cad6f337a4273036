//! Config command handler
//!
//! View and modify configuration settings.

use crate::config::Config;
use crate::error::{Error, Result};
use clap::Args;

/// Config command arguments
#[derive(Args)]
pub struct ConfigArgs {
    /// Configuration key (e.g., "routing.api_key")
    pub key: Option<String>,

    /// Value to set (if not provided, shows current value)
    pub value: Option<String>,

    /// Show config file path
    #[arg(long, conflicts_with_all = ["key", "reset"])]
    pub path: bool,

    /// Reset config to defaults
    #[arg(long, conflicts_with = "key")]
    pub reset: bool,
}

/// Run the config command
pub fn run(args: ConfigArgs) -> Result<()> {
    if args.path {
        println!("{}", Config::config_path()?.display());
        return Ok(());
    }

    if args.reset {
        Config::default().save()?;
        println!("Configuration reset to defaults");
        return Ok(());
    }

    let mut config = Config::load()?;

    let Some(key) = args.key else {
        print!("{}", render_all(&config));
        return Ok(());
    };

    match args.value {
        Some(value) => {
            config.set(&key, &value)?;
            config.save()?;
            println!("{} = {}", key, value);
        }
        None => {
            let value = config.get(&key).ok_or_else(|| {
                Error::Config(format!(
                    "Unknown config key: {}\n\nAvailable keys:\n  {}",
                    key,
                    Config::available_keys().join("\n  ")
                ))
            })?;
            println!("{}", value);
        }
    }

    Ok(())
}

/// Render every setting as TOML-like text, hiding the API key
fn render_all(config: &Config) -> String {
    let mut out = String::new();
    let mut section = "";

    for key in Config::available_keys() {
        let Some((name, field)) = key.split_once('.') else {
            continue;
        };
        if name != section {
            if !section.is_empty() {
                out.push('\n');
            }
            out.push_str(&format!("[{}]\n", name));
            section = name;
        }

        let value = config.get(key).unwrap_or_default();
        let line = if key == "routing.api_key" {
            match config.routing.resolved_api_key() {
                Some(_) => format!("{} = \"***\" # configured", field),
                None => format!("{} = \"\" # not configured", field),
            }
        } else if value.parse::<f64>().is_ok() || value == "true" || value == "false" {
            format!("{} = {}", field, value)
        } else {
            format!("{} = \"{}\"", field, value)
        };
        out.push_str(&line);
        out.push('\n');
    }

    out.push_str("\n[url.providers]\n");
    let mut providers: Vec<_> = config.url.providers.iter().collect();
    providers.sort();
    for (name, template) in providers {
        out.push_str(&format!("{} = \"{}\"\n", name, template));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_all_groups_sections() {
        let mut config = Config::default();
        config.routing.api_key = "secret".to_string();
        let out = render_all(&config);

        assert!(out.starts_with("[defaults]\nformat = \"text\"\nlimit = 10\n"));
        assert!(out.contains("[routing]"));
        assert!(out.contains("port = 7878"));
        assert!(out.contains("api_key = \"***\" # configured"));
        assert!(!out.contains("secret"));
        assert!(out.contains("[url.providers]\napple = "));
    }
}
