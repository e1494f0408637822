//! twig - minimal content-addressed version control
//!
//! a small client for the git repository format: content-addressed objects
//! on disk, directory snapshots, commits, and cloning over the smart-HTTP
//! protocol.
//!
//! # Core concepts
//!
//! - **Blob**: file bytes, stored zlib-compressed under their SHA-1 address
//! - **Tree**: a directory snapshot listing `(mode, name, id)` entries
//! - **Commit**: a tree id plus parent and message
//! - **Ref**: a named pointer to a commit under `refs/heads/`
//!
//! every object is immutable and named by the SHA-1 of
//! `"<kind> <len>\0"` followed by its payload; the digest doubles as the
//! on-disk location.
//!
//! # Example usage
//!
//! ```no_run
//! use std::path::Path;
//! use twig::{ops, transport, Repo};
//!
//! // snapshot a directory and commit it
//! let repo = Repo::init(Path::new("."))?;
//! let tree = ops::write_tree(&repo, Path::new("."))?;
//! let commit = ops::commit_tree(&repo, &tree, &twig::ObjectId::ZERO, "initial", None)?;
//!
//! // clone a remote repository
//! transport::clone("https://example.com/repo", Path::new("copy"))?;
//! # Ok::<(), twig::Error>(())
//! ```

mod error;
mod hash;
mod repo;

pub mod object;
pub mod ops;
pub mod refs;
pub mod transport;

pub use error::{Error, IoResultExt, Result};
pub use hash::{compute_object_id, sha1_digest, ObjectId};
pub use object::{read_object, write_object, Kind, Object};
pub use repo::{Repo, DEFAULT_BRANCH};
