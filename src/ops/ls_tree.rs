use crate::error::{Error, Result};
use crate::hash::ObjectId;
use crate::object::{parse_tree, read_object, Kind, TreeEntry};
use crate::repo::Repo;

/// list the entries of a tree object
pub fn ls_tree(repo: &Repo, id: &ObjectId) -> Result<Vec<TreeEntry>> {
    let obj = read_object(repo, id)?;
    if obj.kind != Kind::Tree {
        return Err(Error::InvalidObjectType(format!(
            "expected tree, found {}",
            obj.kind
        )));
    }

    parse_tree(&obj.payload)
}
