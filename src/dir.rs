use serde::Deserialize;
use serde::Serialize;

use crate::ScriptPath;
use crate::resource::SCRIPTS_PREFIX;
use crate::resource::resource_url;

/// One immediate child of a directory as read from disk.
#[derive(Debug, Clone, PartialEq, Hash, Eq)]
pub struct DirectoryItem {
    /// Name of the file or directory.
    pub name: String,
    /// Whether this entry is a directory.
    pub is_directory: bool,
}

/// A projected file or directory in a listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Hash, Eq)]
pub struct ScriptEntry {
    /// Name of the file or directory.
    pub name: String,
    /// Escaped resource URL of the entry.
    pub url: String,
    /// Present and empty for directories, absent for files. Children are
    /// fetched with a separate request on the entry's `url`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<ScriptEntry>>,
}

impl ScriptEntry {
    /// Returns true if the entry stands for a directory.
    pub fn is_directory(&self) -> bool {
        self.children.is_some()
    }
}

/// Represents the contents of a directory, including the current path and its
/// entries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Hash, Eq)]
pub struct DirectoryListing {
    /// Logical, unescaped path of the directory. Empty for the scripts root.
    pub path: String,
    /// The files and directories directly under `path`.
    pub entries: Vec<ScriptEntry>,
}

impl DirectoryListing {
    /// Projects the immediate children of the directory at `path`.
    ///
    /// Items keep the order they are given in; callers reading from disk
    /// sort them first. Every entry url is built under the escaped url of
    /// `path` itself.
    pub fn project(path: &ScriptPath, items: Vec<DirectoryItem>) -> Self {
        let prefix = resource_url(SCRIPTS_PREFIX, path.components());
        let entries = items
            .into_iter()
            .map(|item| ScriptEntry {
                url: resource_url(&prefix, &[&item.name]),
                children: item.is_directory.then(Vec::new),
                name: item.name,
            })
            .collect();
        DirectoryListing {
            path: path.to_string(),
            entries,
        }
    }
}
