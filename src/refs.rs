use std::fs;
use std::io::Write;
use std::path::PathBuf;

use crate::error::{Error, IoResultExt, Result};
use crate::hash::ObjectId;
use crate::repo::Repo;

/// write a branch ref (create or update)
///
/// the ref file holds the 40-hex id followed by a newline. the write goes
/// through a temp file and a rename so a crash never leaves a torn ref.
pub fn write_ref(repo: &Repo, name: &str, id: &ObjectId) -> Result<()> {
    validate_ref_name(name)?;

    let ref_path = ref_path(repo, name);

    if let Some(parent) = ref_path.parent() {
        fs::create_dir_all(parent).with_path(parent)?;
    }

    // temp file lives next to the refs so the rename stays on one filesystem
    let refs_dir = repo.refs_path();
    let mut tmp = tempfile::NamedTempFile::new_in(&refs_dir).with_path(&refs_dir)?;
    writeln!(tmp, "{}", id.to_hex()).with_path(&ref_path)?;
    tmp.persist(&ref_path).map_err(|e| Error::Io {
        path: ref_path.clone(),
        source: e.error,
    })?;

    Ok(())
}

/// read a branch ref
///
/// a trailing newline is tolerated.
pub fn read_ref(repo: &Repo, name: &str) -> Result<ObjectId> {
    let ref_path = ref_path(repo, name);

    let content = fs::read_to_string(&ref_path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::RefNotFound(name.to_string())
        } else {
            Error::Io {
                path: ref_path.clone(),
                source: e,
            }
        }
    })?;

    ObjectId::from_hex(content.trim())
}

/// check if a ref exists
pub fn ref_exists(repo: &Repo, name: &str) -> bool {
    ref_path(repo, name).exists()
}

/// branch name HEAD currently points at
///
/// HEAD is a symbolic ref of the form `ref: refs/heads/<name>\n`.
pub fn current_branch(repo: &Repo) -> Result<String> {
    let head_path = repo.head_path();
    let content = fs::read_to_string(&head_path).with_path(&head_path)?;

    let target = content.trim();
    match target.strip_prefix("ref: refs/heads/") {
        Some(branch) if !branch.is_empty() => Ok(branch.to_string()),
        _ => Err(Error::InvalidRef(format!("HEAD is not symbolic: {target}"))),
    }
}

/// resolve a ref name or hex id string to an object id
///
/// if the string is 40 hex chars it is parsed directly, otherwise it is
/// looked up as a branch name.
pub fn resolve_ref(repo: &Repo, ref_or_id: &str) -> Result<ObjectId> {
    if ref_or_id.len() == 40 && ref_or_id.chars().all(|c| c.is_ascii_hexdigit()) {
        return ObjectId::from_hex(ref_or_id);
    }

    read_ref(repo, ref_or_id)
}

/// get filesystem path for a ref
fn ref_path(repo: &Repo, name: &str) -> PathBuf {
    repo.refs_path().join(name)
}

/// validate ref name
fn validate_ref_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidRef("empty ref name".to_string()));
    }

    if name.contains('\0') {
        return Err(Error::InvalidRef(format!(
            "ref name cannot contain null byte: {}",
            name
        )));
    }

    // reject path traversal out of refs/heads
    for component in name.split('/') {
        if component.is_empty() || component == "." || component == ".." {
            return Err(Error::InvalidRef(name.to_string()));
        }
    }

    Ok(())
}
