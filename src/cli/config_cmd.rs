//! Configuration management commands.

use std::path::Path;

use console::style;

use resumescan::config::{Settings, LOCAL_CONFIG_FILE};

use super::icons::{error, success};

/// Print the effective settings as TOML.
pub fn cmd_config_show(settings: &Settings, source: Option<&Path>) -> anyhow::Result<()> {
    match source {
        Some(path) => eprintln!("{} {}", style("# Source:").dim(), path.display()),
        None => eprintln!("{}", style("# Source: built-in defaults").dim()),
    }
    print!("{}", settings.to_toml()?);
    Ok(())
}

/// Print the config file in use.
pub fn cmd_config_path(source: Option<&Path>) -> anyhow::Result<()> {
    match source {
        Some(path) => println!("{}", path.display()),
        None => eprintln!("{} No config file found, using defaults", error()),
    }
    Ok(())
}

/// Write the default settings to the local config file.
pub fn cmd_config_init(force: bool) -> anyhow::Result<()> {
    let path = Path::new(LOCAL_CONFIG_FILE);
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            path.display()
        );
    }

    std::fs::write(path, Settings::default().to_toml()?)?;
    eprintln!("{} Wrote {}", success(), path.display());
    Ok(())
}
