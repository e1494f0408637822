use crate::error::Result;
use crate::hash::ObjectId;
use crate::object::{build_commit, write_object, Kind, Object};
use crate::refs::{current_branch, write_ref};
use crate::repo::Repo;

/// write a commit object for a tree and advance the current branch to it
///
/// the branch comes from HEAD, so the ref update lands wherever the
/// repository currently points. the object write happens before the ref
/// update: a crash in between leaves a valid but unnamed commit.
pub fn commit_tree(
    repo: &Repo,
    tree: &ObjectId,
    parent: &ObjectId,
    message: &str,
    author: Option<&str>,
) -> Result<ObjectId> {
    let payload = build_commit(tree, parent, message, author);
    let id = write_object(repo, &Object::new(Kind::Commit, payload))?;

    let branch = current_branch(repo)?;
    write_ref(repo, &branch, &id)?;

    Ok(id)
}
