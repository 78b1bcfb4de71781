use std::path::Path as StdPath;
use std::path::PathBuf;

use tempdir::TempDir;
use tokio::fs;

use crate::Config;
use crate::Error;
use crate::ScriptFs;

// Script paths and contents to create under the scripts directory. `None`
// contents create a directory.
pub(crate) static TEMP_FILES: &[(&str, Option<&str>)] = &[
    ("test.lua", Some("print('test')\n")),
    ("my script.lua", Some("")),
    ("dir1", None),
    ("dir1/a.lua", Some("-- a\n")),
    ("dir1/sub", None),
    ("empty", None),
];

/// Utility structure for managing a temporary data directory holding a
/// small script tree.
#[derive(Debug)]
pub struct TestRoot {
    /// Root of the temporary data directory.
    pub root: TempDir,
}

impl TestRoot {
    /// Creates a new `TestRoot` populated with the fixture script tree.
    pub async fn new() -> Result<Self, Error> {
        let ret = Self::empty().await?;
        for (relative_path, contents) in TEMP_FILES {
            match contents {
                Some(contents) => ret.create_file(relative_path, contents).await?,
                None => ret.create_dir(relative_path).await?,
            }
        }
        Ok(ret)
    }

    /// Creates a new `TestRoot` whose scripts directory exists but is empty.
    pub async fn empty() -> Result<Self, Error> {
        let root = TempDir::new("maiden").map_err(|e| Error::Create {
            what: "temporary directory".into(),
            how: e.to_string(),
        })?;
        let ret = Self { root };
        ret.create_dir("").await?;
        Ok(ret)
    }

    /// The data directory, as it would be passed with `--data`.
    pub fn data_dir(&self) -> &StdPath {
        self.root.path()
    }

    /// The directory holding the script tree.
    pub fn scripts_dir(&self) -> PathBuf {
        self.config().scripts_dir()
    }

    /// A configuration pointing at this data directory.
    pub fn config(&self) -> Config {
        Config {
            data: self.data_dir().to_path_buf(),
            ..Config::default()
        }
    }

    /// A `ScriptFs` rooted at the scripts directory.
    pub fn script_fs(&self) -> ScriptFs {
        ScriptFs::new(self.scripts_dir())
    }

    /// Writes `contents` to the script at `relative_path`, creating parent
    /// directories as needed.
    pub async fn create_file(&self, relative_path: &str, contents: &str) -> Result<(), Error> {
        let full_path = self.scripts_dir().join(relative_path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| Error::Create {
                what: format!("directory {}", parent.display()),
                how: e.to_string(),
            })?;
        }
        fs::write(&full_path, contents)
            .await
            .map_err(|e| Error::Write {
                what: relative_path.into(),
                how: e.to_string(),
            })
    }

    /// Creates the directory at `relative_path` under the scripts directory.
    pub async fn create_dir(&self, relative_path: &str) -> Result<(), Error> {
        let full_path = self.scripts_dir().join(relative_path);
        fs::create_dir_all(&full_path)
            .await
            .map_err(|e| Error::Create {
                what: format!("directory {}", full_path.display()),
                how: e.to_string(),
            })
    }

    /// Reads back the script at `relative_path`; panics if it is missing.
    pub fn read(&self, relative_path: &str) -> Vec<u8> {
        std::fs::read(self.scripts_dir().join(relative_path)).unwrap()
    }

    /// Returns true if anything exists at `relative_path`.
    pub fn exists(&self, relative_path: &str) -> bool {
        self.scripts_dir().join(relative_path).exists()
    }
}
