//! Config command handlers

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use phonebook_core::Config;

use crate::output::{Output, OutputFormat};

/// Load configuration from the CLI-specified path or the default one
pub fn load(config_path: Option<&Path>) -> Result<Config> {
    let config = match config_path {
        Some(path) => Config::load_from_path(path),
        None => Config::load(),
    };
    config.context("Failed to load configuration")
}

/// Show current configuration
pub fn show(config_path: Option<&Path>, output: &Output) -> Result<()> {
    let config = load(config_path)?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "file_name": config.file_name,
                    "table_name": config.table_name,
                    "page_size": config.page_size,
                    "table_path": config.table_path()
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.table_path().display());
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .map(Path::to_path_buf)
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  data_dir:   {}", config.data_dir.display());
            println!("  file_name:  {}", config.file_name);
            println!("  table_name: {}", config.table_name);
            println!("  page_size:  {}", config.page_size);
            println!();
            println!("Table file:  {}", config.table_path().display());
            println!("Config file: {}", effective_path.display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(key: String, value: String, config_path: Option<&Path>, output: &Output) -> Result<()> {
    let mut config = load(config_path)?;
    apply(&mut config, &key, &value)?;

    let save_path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(Config::config_file_path);
    config
        .save_to_path(&save_path)
        .context("Failed to save configuration")?;

    output.success(&format!("Set {} = {}", key, value));

    Ok(())
}

fn apply(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "data_dir" => {
            config.data_dir = PathBuf::from(value);
        }
        "file_name" => {
            if value.is_empty() {
                bail!("file_name cannot be empty");
            }
            config.file_name = value.to_string();
        }
        "table_name" => {
            config.table_name = value.to_string();
        }
        "page_size" => {
            let size: usize = value
                .parse()
                .context("Invalid value for page_size. Use a positive integer.")?;
            if size == 0 {
                bail!("page_size must be at least 1");
            }
            config.page_size = size;
        }
        _ => {
            bail!(
                "Unknown configuration key: '{}'\n\
                 Valid keys: data_dir, file_name, table_name, page_size",
                key
            );
        }
    }
    Ok(())
}
