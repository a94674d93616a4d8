use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One plugin descriptor file: the plugin's name and its metadata-declared
/// version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginDescriptor {
    pub name: String,
    pub version: String,
}

/// Metadata-declared versions of every known plugin, keyed by full plugin
/// name, loaded once from descriptor files at run start.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PluginCatalog {
    versions: BTreeMap<String, String>,
}

impl PluginCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, version: impl Into<String>) {
        self.versions.insert(name.into(), version.into());
    }

    /// The version declared in the plugin's metadata, if any.
    pub fn declared_version(&self, plugin: &str) -> Option<&str> {
        self.versions.get(plugin).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.versions.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for PluginCatalog {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self {
            versions: iter.into_iter().collect(),
        }
    }
}

impl From<Vec<PluginDescriptor>> for PluginCatalog {
    fn from(descriptors: Vec<PluginDescriptor>) -> Self {
        descriptors
            .into_iter()
            .map(|d| (d.name, d.version))
            .collect()
    }
}
