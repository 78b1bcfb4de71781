use std::io::ErrorKind as IoErrorKind;
use std::path::Path as StdPath;
use std::path::PathBuf;

use futures_lite::StreamExt;
use log::debug;
use log::warn;
use tokio::fs;
use tokio::io::AsyncRead;
use tokio::io::AsyncWriteExt;

use crate::DirectoryItem;
use crate::DirectoryListing;
use crate::Error;
use crate::ScriptPath;

/// What a script path resolved to.
#[derive(Debug)]
pub enum Resource {
    /// The path is a directory; its one level listing.
    Directory(DirectoryListing),
    /// The path is a regular file, opened for reading.
    File(fs::File),
}

/// The script tree rooted at a base directory, and the operations the
/// API performs on it.
///
/// Holds no state other than the root, so clones are cheap and every call
/// stands on its own.
#[derive(Debug, Clone)]
pub struct ScriptFs {
    base_dir: PathBuf,
}

impl ScriptFs {
    /// Creates a script tree rooted at `base_dir`.
    pub fn new<P: AsRef<StdPath>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    /// Converts a script path to the absolute path it addresses on disk.
    pub fn resolve(&self, path: &ScriptPath) -> PathBuf {
        path.append_to(&self.base_dir)
    }

    /// Lists the immediate children of the directory at `path`, sorted by
    /// name.
    ///
    /// Any failure to enumerate the directory is reported as
    /// `Error::Read`.
    pub async fn list(&self, path: &ScriptPath) -> Result<DirectoryListing, Error> {
        let dir_path = self.resolve(path);
        let mut entries = async_fs::read_dir(&dir_path)
            .await
            .map_err(|e| Error::Read {
                what: path.to_string(),
                how: e.to_string(),
            })?;

        let mut items = Vec::new();
        while let Some(entry) = entries.next().await {
            let entry = entry.map_err(|e| Error::Read {
                what: path.to_string(),
                how: e.to_string(),
            })?;
            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(name) => {
                    warn!("skipping non utf-8 entry {name:?} in {}", dir_path.display());
                    continue;
                }
            };
            // Symlinks are not followed; a link, dangling or not, lists as a
            // file.
            let file_type = entry.file_type().await.map_err(|e| Error::Read {
                what: format!("file type of {name}"),
                how: e.to_string(),
            })?;
            items.push(DirectoryItem {
                name,
                is_directory: file_type.is_dir(),
            });
        }
        items.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(DirectoryListing::project(path, items))
    }

    /// Looks up `path` and returns either its listing or the opened file.
    pub async fn get(&self, path: &ScriptPath) -> Result<Resource, Error> {
        let full_path = self.resolve(path);
        let metadata = fs::metadata(&full_path).await.map_err(|e| not_found(path, e))?;
        if metadata.is_dir() {
            return Ok(Resource::Directory(self.list(path).await?));
        }
        let file = fs::File::open(&full_path)
            .await
            .map_err(|e| not_found(path, e))?;
        Ok(Resource::File(file))
    }

    /// Creates or replaces the file at `path` with everything read from
    /// `contents`. Returns the number of bytes written.
    ///
    /// Parent directories are not created.
    pub async fn put<R>(&self, path: &ScriptPath, contents: &mut R) -> Result<u64, Error>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        if path.is_root() {
            return Err(Error::InvalidPath {
                what: "the scripts root is not a file".to_owned(),
            });
        }
        let full_path = self.resolve(path);
        debug!("save path: {}", full_path.display());

        let mut out = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&full_path)
            .await
            .map_err(|e| Error::Create {
                what: path.to_string(),
                how: e.to_string(),
            })?;
        let size = tokio::io::copy(contents, &mut out)
            .await
            .map_err(|e| Error::Write {
                what: path.to_string(),
                how: e.to_string(),
            })?;
        out.flush().await.map_err(|e| Error::Write {
            what: path.to_string(),
            how: e.to_string(),
        })?;

        debug!("wrote {size} bytes to {}", full_path.display());
        Ok(size)
    }

    /// Creates the directory at `path` along with any missing parents.
    /// Succeeds if it already exists.
    pub async fn make_dir(&self, path: &ScriptPath) -> Result<(), Error> {
        if path.is_root() {
            return Err(Error::InvalidPath {
                what: "the scripts root already exists".to_owned(),
            });
        }
        let full_path = self.resolve(path);
        debug!("creating directory: {}", full_path.display());
        fs::create_dir_all(&full_path)
            .await
            .map_err(|e| Error::Create {
                what: path.to_string(),
                how: e.to_string(),
            })
    }

    /// Renames the entry at `path` to `new_name` inside the same parent
    /// directory and returns the new script path.
    ///
    /// An existing destination is never replaced.
    pub async fn rename(&self, path: &ScriptPath, new_name: &str) -> Result<ScriptPath, Error> {
        let full_path = self.resolve(path);
        fs::metadata(&full_path)
            .await
            .map_err(|e| not_found(path, e))?;

        let renamed = path.with_basename(new_name)?;
        let rename_path = self.resolve(&renamed);
        debug!(
            "going to rename: {} to: {}",
            full_path.display(),
            rename_path.display()
        );

        if renamed != *path && fs::symlink_metadata(&rename_path).await.is_ok() {
            return Err(Error::Rename {
                what: path.to_string(),
                how: format!("{renamed} already exists"),
            });
        }
        fs::rename(&full_path, &rename_path)
            .await
            .map_err(|e| Error::Rename {
                what: path.to_string(),
                how: e.to_string(),
            })?;
        Ok(renamed)
    }

    /// Removes the file or empty directory at `path`.
    pub async fn delete(&self, path: &ScriptPath) -> Result<(), Error> {
        if path.is_root() {
            return Err(Error::InvalidPath {
                what: "the scripts root cannot be deleted".to_owned(),
            });
        }
        let full_path = self.resolve(path);
        debug!("going to delete: {}", full_path.display());

        let metadata = match fs::symlink_metadata(&full_path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == IoErrorKind::NotFound => return Err(not_found(path, e)),
            Err(e) => {
                return Err(Error::Delete {
                    what: path.to_string(),
                    how: e.to_string(),
                });
            }
        };
        let removed = if metadata.is_dir() {
            fs::remove_dir(&full_path).await
        } else {
            fs::remove_file(&full_path).await
        };
        removed.map_err(|e| Error::Delete {
            what: path.to_string(),
            how: e.to_string(),
        })
    }
}

fn not_found(path: &ScriptPath, e: std::io::Error) -> Error {
    Error::NotFound {
        what: path.to_string(),
        how: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::AsyncReadExt;

    use super::*;
    use crate::TestRoot;

    fn path(s: &str) -> ScriptPath {
        ScriptPath::from_segments(s.split('/')).unwrap()
    }

    fn names(listing: &DirectoryListing) -> Vec<(&str, bool)> {
        listing
            .entries
            .iter()
            .map(|e| (e.name.as_str(), e.is_directory()))
            .collect()
    }

    #[tokio::test]
    async fn list_root_is_sorted_and_one_level() {
        let root = TestRoot::new().await.unwrap();
        let listing = root.script_fs().list(&ScriptPath::root()).await.unwrap();
        assert_eq!(listing.path, "");
        assert_eq!(
            names(&listing),
            [
                ("dir1", true),
                ("empty", true),
                ("my script.lua", false),
                ("test.lua", false)
            ]
        );
        for entry in &listing.entries {
            if let Some(children) = &entry.children {
                assert!(children.is_empty());
            }
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn list_keeps_dangling_symlink_as_file() {
        let root = TestRoot::new().await.unwrap();
        std::os::unix::fs::symlink("/nonexistent/target", root.scripts_dir().join("dir1/broken"))
            .unwrap();
        let listing = root.script_fs().list(&path("dir1")).await.unwrap();
        assert_eq!(
            names(&listing),
            [("a.lua", false), ("broken", false), ("sub", true)]
        );
    }

    #[tokio::test]
    async fn list_missing_root_is_read_error() {
        let root = TestRoot::new().await.unwrap();
        let fs = ScriptFs::new(root.scripts_dir().join("missing"));
        assert!(matches!(
            fs.list(&ScriptPath::root()).await,
            Err(Error::Read { .. })
        ));
    }

    #[tokio::test]
    async fn get_directory_lists_with_sub_prefix() {
        let root = TestRoot::new().await.unwrap();
        let Resource::Directory(listing) = root.script_fs().get(&path("dir1")).await.unwrap() else {
            panic!("expected a directory");
        };
        assert_eq!(listing.path, "dir1");
        assert_eq!(names(&listing), [("a.lua", false), ("sub", true)]);
        assert_eq!(listing.entries[1].url, "/api/v1/scripts/dir1/sub");
    }

    #[tokio::test]
    async fn get_file_reads_contents() {
        let root = TestRoot::new().await.unwrap();
        let Resource::File(mut file) = root.script_fs().get(&path("test.lua")).await.unwrap() else {
            panic!("expected a file");
        };
        let mut contents = String::new();
        file.read_to_string(&mut contents).await.unwrap();
        assert_eq!(contents, "print('test')\n");
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let root = TestRoot::new().await.unwrap();
        assert!(matches!(
            root.script_fs().get(&path("nope.lua")).await,
            Err(Error::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn put_creates_and_truncates() {
        let root = TestRoot::new().await.unwrap();
        let fs = root.script_fs();
        let written = fs.put(&path("new.lua"), &mut &b"print(1)"[..]).await.unwrap();
        assert_eq!(written, 8);
        assert_eq!(root.read("new.lua"), b"print(1)");

        fs.put(&path("test.lua"), &mut &b"x"[..]).await.unwrap();
        assert_eq!(root.read("test.lua"), b"x");
    }

    #[tokio::test]
    async fn put_without_parent_fails_to_create() {
        let root = TestRoot::new().await.unwrap();
        assert!(matches!(
            root.script_fs()
                .put(&path("no/such/dir.lua"), &mut &b""[..])
                .await,
            Err(Error::Create { .. })
        ));
    }

    #[tokio::test]
    async fn put_root_is_invalid() {
        let root = TestRoot::new().await.unwrap();
        assert!(matches!(
            root.script_fs()
                .put(&ScriptPath::root(), &mut &b""[..])
                .await,
            Err(Error::InvalidPath { .. })
        ));
    }

    #[tokio::test]
    async fn make_dir_creates_parents() {
        let root = TestRoot::new().await.unwrap();
        root.script_fs().make_dir(&path("x/y")).await.unwrap();
        assert!(root.scripts_dir().join("x/y").is_dir());
    }

    #[tokio::test]
    async fn rename_preserves_parent() {
        let root = TestRoot::new().await.unwrap();
        let fs = root.script_fs();
        let renamed = fs.rename(&path("dir1/a.lua"), "b.lua").await.unwrap();
        assert_eq!(renamed.to_string(), "dir1/b.lua");
        assert!(root.exists("dir1/b.lua"));
        assert!(!root.exists("dir1/a.lua"));
        assert!(matches!(
            fs.get(&path("dir1/a.lua")).await,
            Err(Error::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn rename_missing_source_is_not_found() {
        let root = TestRoot::new().await.unwrap();
        assert!(matches!(
            root.script_fs().rename(&path("nope.lua"), "x.lua").await,
            Err(Error::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn rename_onto_existing_fails() {
        let root = TestRoot::new().await.unwrap();
        assert!(matches!(
            root.script_fs().rename(&path("test.lua"), "my script.lua").await,
            Err(Error::Rename { .. })
        ));
        assert_eq!(root.read("test.lua"), b"print('test')\n");
    }

    #[tokio::test]
    async fn rename_rejects_path_as_name() {
        let root = TestRoot::new().await.unwrap();
        assert!(matches!(
            root.script_fs().rename(&path("test.lua"), "../x.lua").await,
            Err(Error::InvalidPath { .. })
        ));
    }

    #[tokio::test]
    async fn delete_file_and_empty_dir() {
        let root = TestRoot::new().await.unwrap();
        let fs = root.script_fs();
        fs.delete(&path("test.lua")).await.unwrap();
        fs.delete(&path("empty")).await.unwrap();
        assert!(!root.exists("test.lua"));
        assert!(!root.exists("empty"));
    }

    #[tokio::test]
    async fn delete_non_empty_dir_fails() {
        let root = TestRoot::new().await.unwrap();
        assert!(matches!(
            root.script_fs().delete(&path("dir1")).await,
            Err(Error::Delete { .. })
        ));
        assert!(root.exists("dir1/a.lua"));
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let root = TestRoot::new().await.unwrap();
        assert!(matches!(
            root.script_fs().delete(&path("nope")).await,
            Err(Error::NotFound { .. })
        ));
    }
}
