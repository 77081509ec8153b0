// oltctl - CLI dashboard for ZTE OLT monitoring via the snmp-zte query API
// Copyright (C) 2025 oltctl contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "http://localhost:8080";
pub const DEFAULT_SNMP_PORT: u16 = 161;
pub const DEFAULT_COMMUNITY: &str = "public";

/// Persisted, non-secret defaults. API credentials are deliberately not
/// part of this file: they come from flags or environment per invocation
/// and never touch disk.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_url: Option<String>,
    pub port: Option<u16>,
    pub community: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Local,
    User,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not locate a writable config directory for the current user")]
    MissingConfigDir,
    #[error(
        "API credentials are required; pass --username/--password or set OLTCTL_USERNAME/OLTCTL_PASSWORD"
    )]
    MissingCredentials,
}

#[derive(Debug)]
pub struct EffectiveConfig {
    pub api_url: String,
    pub port: u16,
    pub community: String,
    pub model: Option<String>,
}

pub fn config_path(scope: Scope, cwd: &Path) -> Result<PathBuf> {
    match scope {
        Scope::Local => Ok(cwd.join(".oltctl.yaml")),
        Scope::User => {
            if let Ok(custom) = env::var("OLTCTL_CONFIG_DIR") {
                return Ok(PathBuf::from(custom).join("config.yaml"));
            }
            let base = config_dir().ok_or(ConfigError::MissingConfigDir)?;
            Ok(base.join("oltctl").join("config.yaml"))
        }
    }
}

pub fn load(cwd: &Path) -> Result<Config> {
    let user = read_if_exists(&config_path(Scope::User, cwd)?)?.unwrap_or_default();
    let local = read_if_exists(&config_path(Scope::Local, cwd)?)?.unwrap_or_default();
    Ok(merge(user, local))
}

pub fn load_scope(scope: Scope, cwd: &Path) -> Result<Config> {
    Ok(read_if_exists(&config_path(scope, cwd)?)?.unwrap_or_default())
}

pub fn save(scope: Scope, config: &Config, cwd: &Path) -> Result<PathBuf> {
    let path = config_path(scope, cwd)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("creating {:?}", parent))?;
    }
    let serialized = serde_yaml::to_string(config).context("serializing config")?;
    fs::write(&path, serialized).with_context(|| format!("writing {:?}", path))?;
    Ok(path)
}

/// Merges both scopes and applies CLI overrides and hard defaults.
pub fn resolve(cwd: &Path, api_url_override: Option<String>) -> Result<EffectiveConfig> {
    let mut merged = load(cwd)?;

    if let Some(url) = api_url_override {
        merged.api_url = Some(url);
    }

    Ok(EffectiveConfig {
        api_url: merged
            .api_url
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
        port: merged.port.unwrap_or(DEFAULT_SNMP_PORT),
        community: merged
            .community
            .unwrap_or_else(|| DEFAULT_COMMUNITY.to_string()),
        model: merged.model,
    })
}

/// Resolves API credentials from flags, then environment. Nothing is ever
/// read from or written to the config files.
pub fn resolve_credentials(
    username_override: Option<String>,
    password_override: Option<String>,
) -> Result<(String, String), ConfigError> {
    let username = username_override
        .or_else(|| env::var("OLTCTL_USERNAME").ok())
        .filter(|u| !u.is_empty());
    let password = password_override
        .or_else(|| env::var("OLTCTL_PASSWORD").ok())
        .filter(|p| !p.is_empty());

    match (username, password) {
        (Some(u), Some(p)) => Ok((u, p)),
        _ => Err(ConfigError::MissingCredentials),
    }
}

fn read_if_exists(path: &Path) -> Result<Option<Config>> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
    let config = serde_yaml::from_str(&contents).with_context(|| format!("parsing {:?}", path))?;
    Ok(Some(config))
}

fn merge(user: Config, local: Config) -> Config {
    Config {
        api_url: local.api_url.or(user.api_url),
        port: local.port.or(user.port),
        community: local.community.or(user.community),
        model: local.model.or(user.model),
    }
}
