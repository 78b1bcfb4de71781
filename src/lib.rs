//! Serves a directory tree of user scripts as a hierarchical REST resource
//! namespace.
//!
//! Every file and directory under `{data}/lua` is a resource under
//! `/api/v1/scripts`, addressed by its escaped path. Directories are listed
//! one level at a time:
//!
//! ```rust
//! # tokio_test::block_on(async {
//! # use maiden::ScriptFs;
//! # use maiden::ScriptPath;
//! let root = maiden::TestRoot::new().await.unwrap();
//! let scripts = ScriptFs::new(root.scripts_dir());
//! let listing = scripts.list(&ScriptPath::root()).await.unwrap();
//! assert_eq!(listing.entries[0].url, "/api/v1/scripts/dir1");
//! println!("{}", serde_json::to_string_pretty(&listing).unwrap());
//! # })
//! ```
//!
//! The output looks like
//! ```json
//! {
//!   "path": "",
//!   "entries": [
//!     { "name": "dir1", "url": "/api/v1/scripts/dir1", "children": [] },
//!     { "name": "empty", "url": "/api/v1/scripts/empty", "children": [] },
//!     { "name": "my script.lua", "url": "/api/v1/scripts/my%20script.lua" },
//!     { "name": "test.lua", "url": "/api/v1/scripts/test.lua" }
//!   ]
//! }
//! ```

pub mod api;
mod config;
mod dir;
mod errors;
mod path;
pub mod resource;
mod script_fs;

pub use config::Config;
pub use config::SCRIPT_DIR;
pub use dir::DirectoryItem;
pub use dir::DirectoryListing;
pub use dir::ScriptEntry;
pub use errors::Error;
pub use errors::ErrorKind;
pub use path::ScriptPath;
pub use script_fs::Resource;
pub use script_fs::ScriptFs;

#[cfg(feature = "test_utils")]
pub(crate) mod test_utils;
#[cfg(feature = "test_utils")]
pub use test_utils::TestRoot;
