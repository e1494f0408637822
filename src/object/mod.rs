use std::fmt;

use crate::error::Error;
use crate::hash::{compute_object_id, ObjectId};

pub mod commit;
pub mod loose;
pub mod tree;

pub use commit::{build_commit, commit_tree_id};
pub use loose::{object_exists, object_path, read_object, write_object};
pub use tree::{parse_tree, serialize_tree, TreeEntry, MODE_DIR, MODE_REGULAR};

/// object kind stored in the repository
///
/// tags are accepted when parsing packfiles but never produced locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Blob,
    Tree,
    Commit,
    Tag,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Blob => "blob",
            Kind::Tree => "tree",
            Kind::Commit => "commit",
            Kind::Tag => "tag",
        }
    }

    pub fn from_str(s: &str) -> crate::Result<Self> {
        match s {
            "blob" => Ok(Kind::Blob),
            "tree" => Ok(Kind::Tree),
            "commit" => Ok(Kind::Commit),
            "tag" => Ok(Kind::Tag),
            other => Err(Error::InvalidObjectType(other.to_string())),
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// an immutable object: a kind tag and its payload bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Object {
    pub kind: Kind,
    pub payload: Vec<u8>,
}

impl Object {
    pub fn new(kind: Kind, payload: Vec<u8>) -> Self {
        Self { kind, payload }
    }

    pub fn blob(payload: Vec<u8>) -> Self {
        Self::new(Kind::Blob, payload)
    }

    /// content address of this object
    pub fn id(&self) -> ObjectId {
        compute_object_id(self.kind.as_str(), &self.payload)
    }

    /// serialized form stored on disk: `"<kind> <len>\0"` followed by the payload
    pub fn to_loose_bytes(&self) -> Vec<u8> {
        let header = format!("{} {}\0", self.kind.as_str(), self.payload.len());
        let mut data = header.into_bytes();
        data.extend_from_slice(&self.payload);
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_roundtrip() {
        for kind in [Kind::Blob, Kind::Tree, Kind::Commit, Kind::Tag] {
            assert_eq!(Kind::from_str(kind.as_str()).unwrap(), kind);
        }
        assert!(Kind::from_str("banana").is_err());
    }

    #[test]
    fn test_loose_bytes_header() {
        let obj = Object::blob(b"hello".to_vec());
        assert_eq!(obj.to_loose_bytes(), b"blob 5\0hello");
    }

    #[test]
    fn test_object_id_matches_known_vector() {
        let obj = Object::blob(b"hello".to_vec());
        assert_eq!(obj.id().to_hex(), "b6fc4c620b67d95f953a5c1c1230aaab5db5a1b0");
    }
}
