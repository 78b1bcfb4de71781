use std::fmt::Display;
use std::path::Path as StdPath;
use std::path::PathBuf;

use crate::errors::Error;

/// A script resource path relative to the scripts root, stored as its
/// validated components.
///
/// A `ScriptPath` can never address anything above the root it is later
/// appended to: components are never empty, `.` or `..`, and never contain
/// a separator.
#[derive(Debug, Clone, PartialEq, Hash, Eq, Default)]
pub struct ScriptPath {
    components: Vec<String>,
}

fn check_component(s: &str) -> Result<(), Error> {
    if s.is_empty() || s == "." || s == ".." {
        return Err(Error::InvalidPath {
            what: format!("invalid path component: {s:?}"),
        });
    }
    if s.contains('/') || s.contains('\\') || s.contains('\0') {
        return Err(Error::InvalidPath {
            what: format!("invalid path component: {s:?}"),
        });
    }
    Ok(())
}

impl Display for ScriptPath {
    /// Formats the logical, unescaped path with `/` separators. The root
    /// formats as the empty string.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.components.join("/"))
    }
}

impl ScriptPath {
    /// Creates the path of the scripts root.
    pub fn root() -> Self {
        Self { components: vec![] }
    }

    /// Builds a path from unescaped segments, normalizing as it goes.
    ///
    /// Empty and `.` segments are dropped and `..` removes the preceding
    /// segment. A `..` that would climb above the root is rejected with
    /// `Error::InvalidPath`, as is any segment carrying a separator or NUL.
    pub fn from_segments<I, S>(segments: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut path = Self::root();
        for segment in segments {
            match segment.as_ref() {
                "" | "." => {}
                ".." => {
                    if path.components.pop().is_none() {
                        return Err(Error::InvalidPath {
                            what: "path escapes the scripts root".to_owned(),
                        });
                    }
                }
                s => path.push(s)?,
            }
        }
        Ok(path)
    }

    /// Returns true for the scripts root itself.
    pub fn is_root(&self) -> bool {
        self.components.is_empty()
    }

    /// The individual, unescaped path components.
    pub fn components(&self) -> &[String] {
        &self.components
    }

    /// Returns the parent path, or `None` for the root.
    pub fn parent(&self) -> Option<ScriptPath> {
        if self.components.is_empty() {
            None
        } else {
            let mut parent_components = self.components.clone();
            parent_components.pop();
            Some(ScriptPath {
                components: parent_components,
            })
        }
    }

    /// Appends a single validated component.
    pub fn push(&mut self, component: &str) -> Result<(), Error> {
        check_component(component)?;
        self.components.push(component.to_owned());
        Ok(())
    }

    /// Returns a sibling of this path: same parent, different last
    /// component.
    ///
    /// `leaf` must be a single component. Renaming the root is rejected.
    pub fn with_basename(&self, leaf: &str) -> Result<ScriptPath, Error> {
        let mut sibling = self.parent().ok_or_else(|| Error::InvalidPath {
            what: "the scripts root cannot be renamed".to_owned(),
        })?;
        sibling.push(leaf)?;
        Ok(sibling)
    }

    /// Converts the script path into a platform `PathBuf` under `base_dir`.
    pub fn append_to(&self, base_dir: &StdPath) -> PathBuf {
        let mut ret = base_dir.to_owned();
        for comp in &self.components {
            ret.push(comp);
        }
        ret
    }
}
