use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use crate::error::{Error, IoResultExt, Result};
use crate::hash::ObjectId;
use crate::object::{commit_tree_id, parse_tree, read_object, Kind};
use crate::repo::Repo;

/// materialize a commit onto the filesystem
///
/// walks commit -> tree -> blobs, writing files under the repository's
/// working directory. only the baseline modes are understood: regular files
/// (permission bits taken from the mode's trailing octal digits) and
/// subdirectories. anything else aborts the restore.
pub fn restore(repo: &Repo, commit_id: &ObjectId) -> Result<()> {
    let commit = read_object(repo, commit_id)?;
    if commit.kind != Kind::Commit {
        return Err(Error::InvalidObjectType(format!(
            "expected commit, found {}",
            commit.kind
        )));
    }

    let tree_id = commit_tree_id(&commit.payload)?;
    restore_tree(repo, &tree_id, repo.work_dir())
}

/// recursive helper: write one tree's entries under `target`
fn restore_tree(repo: &Repo, tree_id: &ObjectId, target: &Path) -> Result<()> {
    let tree = read_object(repo, tree_id)?;
    if tree.kind != Kind::Tree {
        return Err(Error::InvalidObjectType(format!(
            "expected tree, found {}",
            tree.kind
        )));
    }

    fs::create_dir_all(target).with_path(target)?;

    for entry in parse_tree(&tree.payload)? {
        let entry_path = target.join(&entry.name);

        if entry.is_regular() {
            let blob = read_object(repo, &entry.id)?;
            if blob.kind != Kind::Blob {
                return Err(Error::InvalidObjectType(format!(
                    "expected blob, found {}",
                    blob.kind
                )));
            }

            fs::write(&entry_path, &blob.payload).with_path(&entry_path)?;
            fs::set_permissions(&entry_path, fs::Permissions::from_mode(entry.permissions()))
                .with_path(&entry_path)?;
        } else if entry.is_dir() {
            restore_tree(repo, &entry.id, &entry_path)?;
        } else {
            return Err(Error::UnsupportedEntryMode {
                mode: entry.mode_octal(),
                name: entry.name,
            });
        }
    }

    Ok(())
}
