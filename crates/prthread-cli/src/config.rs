//! Project to channel mapping loaded from the JSON config file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use prthread_tracker::ProjectChannels;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("config file {path} maps project '{project}' to an empty ChannelId")]
    EmptyChannel { path: PathBuf, project: String },
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ConfigFile {
    #[serde(default)]
    automatic_pr_messages: BTreeMap<String, ProjectEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ProjectEntry {
    #[serde(default)]
    channel_id: String,
}

pub(crate) fn load_project_channels(path: &Path) -> Result<ProjectChannels, ConfigError> {
    let raw = std::fs::read(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: ConfigFile = serde_json::from_slice(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let mut channels = BTreeMap::new();
    for (project, entry) in parsed.automatic_pr_messages {
        let channel = entry.channel_id.trim();
        if channel.is_empty() {
            return Err(ConfigError::EmptyChannel {
                path: path.to_path_buf(),
                project,
            });
        }
        channels.insert(project, channel.to_string());
    }
    Ok(ProjectChannels::new(channels))
}
