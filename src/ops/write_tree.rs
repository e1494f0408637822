use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use crate::error::{Error, IoResultExt, Result};
use crate::hash::ObjectId;
use crate::object::{
    serialize_tree, write_object, Kind, Object, TreeEntry, MODE_DIR, MODE_REGULAR,
};
use crate::repo::Repo;

/// snapshot a directory into tree and blob objects
///
/// every regular file becomes a blob, every subdirectory a nested tree; the
/// returned id addresses the tree for `dir` itself. `.git` entries are
/// skipped wherever they appear. symlinks, executables, and other special
/// files are not part of the baseline format and abort the snapshot.
pub fn write_tree(repo: &Repo, dir: &Path) -> Result<ObjectId> {
    let mut entries = Vec::new();

    for dir_entry in fs::read_dir(dir).with_path(dir)? {
        let dir_entry = dir_entry.with_path(dir)?;
        let path = dir_entry.path();
        let name = dir_entry.file_name().to_string_lossy().to_string();

        if name == ".git" {
            continue;
        }
        if name.contains('\0') {
            return Err(Error::InvalidEntryName(name));
        }

        let file_type = dir_entry.file_type().with_path(&path)?;

        if file_type.is_dir() {
            let subtree = write_tree(repo, &path)?;
            entries.push(TreeEntry::new(MODE_DIR, name, subtree));
        } else if file_type.is_file() {
            // executables are outside the baseline format, same as symlinks
            let mode = dir_entry.metadata().with_path(&path)?.permissions().mode();
            if mode & 0o111 != 0 {
                return Err(Error::UnsupportedMode { path });
            }

            let content = fs::read(&path).with_path(&path)?;
            let blob = write_object(repo, &Object::blob(content))?;
            entries.push(TreeEntry::new(MODE_REGULAR, name, blob));
        } else {
            // symlink, fifo, socket, device
            return Err(Error::UnsupportedMode { path });
        }
    }

    write_object(repo, &Object::new(Kind::Tree, serialize_tree(&entries)))
}
