use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "notepost")]
#[command(about = "Runs the notepost note-sharing service", long_about = None)]
pub struct Cli {
    #[arg(short = 'c', long = "config")]
    pub config_path: Option<String>,

    /// Overrides `app.port` from the config file
    #[arg(short = 'p', long = "port")]
    pub port: Option<u16>,
}

pub fn default_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".notepost")
}

pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.yaml")
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct App {
    database: String,
    port: u16,
    assets: String,
}

impl Default for App {
    fn default() -> Self {
        App {
            database: "database.sqlite".to_string(),
            port: 3000,
            assets: "assets".to_string(),
        }
    }
}

impl App {
    pub fn get_db(&self) -> &Path {
        Path::new(&self.database)
    }

    pub fn get_port(&self) -> u16 {
        self.port
    }

    pub fn get_assets(&self) -> &Path {
        Path::new(&self.assets)
    }

    pub fn templates_dir(&self) -> PathBuf {
        self.get_assets().join("templates")
    }
}

#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub app: App,
}

impl Config {
    pub fn new(path: &str) -> Result<Self> {
        let cfg = Config::load_config(path).with_context(|| format!("loading config {path}"))?;
        Ok(cfg)
    }

    /// Picks the config for a run: an explicit `--config` must load, the
    /// default location is used only when present, otherwise built-in
    /// defaults apply. `--port` wins over any file.
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let mut cfg = match &cli.config_path {
            Some(path) => Config::new(path)?,
            None => {
                let path = default_config_path();
                if path.is_file() {
                    Config::new(&path.to_string_lossy())?
                } else {
                    tracing::info!(path = ?path, "no config file found, using defaults");
                    Config::default()
                }
            }
        };

        if let Some(port) = cli.port {
            cfg.app.port = port;
        }

        Ok(cfg)
    }

    fn load_config(path: &str) -> Result<Config> {
        let yaml_str = fs::read_to_string(path)?;
        let yaml_with_env = Config::substitute_env_vars(&yaml_str)?;
        let config: Config = serde_yaml::from_str(&yaml_with_env)?;
        Ok(config)
    }

    fn substitute_env_vars(yaml_str: &str) -> Result<String> {
        let mut result = yaml_str.to_string();
        let mut offset = 0;

        while let Some(start) = result[offset..].find("${") {
            let actual_start = offset + start;
            if let Some(end) = result[actual_start..].find("}") {
                let var_name = &result[actual_start + 2..actual_start + end];

                // ${VAR:-default}
                let env_value = if let Some(default_start) = var_name.find(":-") {
                    let actual_var = &var_name[..default_start];
                    let default_val = &var_name[default_start + 2..];
                    env::var(actual_var).unwrap_or_else(|_| default_val.to_string())
                } else {
                    env::var(var_name).unwrap_or_else(|_| {
                        tracing::warn!("environment variable '{}' not found", var_name);
                        String::new()
                    })
                };

                result.replace_range(actual_start..actual_start + end + 1, &env_value);
                offset = actual_start + env_value.len();
            } else {
                break;
            }
        }

        Ok(result)
    }
}
