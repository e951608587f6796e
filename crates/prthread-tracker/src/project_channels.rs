//! Static project name to chat channel mapping.

use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Destination channels keyed by Azure DevOps project name.
pub struct ProjectChannels {
    channels: BTreeMap<String, String>,
}

impl ProjectChannels {
    pub fn new(channels: BTreeMap<String, String>) -> Self {
        Self { channels }
    }

    pub fn channel_for(&self, project: &str) -> Option<&str> {
        self.channels.get(project).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.channels
            .iter()
            .map(|(project, channel)| (project.as_str(), channel.as_str()))
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

impl<P, C> FromIterator<(P, C)> for ProjectChannels
where
    P: Into<String>,
    C: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (P, C)>>(iter: I) -> Self {
        Self {
            channels: iter
                .into_iter()
                .map(|(project, channel)| (project.into(), channel.into()))
                .collect(),
        }
    }
}
