use crate::error::{Error, Result};
use crate::hash::ObjectId;

/// build a commit payload
///
/// the layout is fixed: tree line, parent line, optional author line passed
/// through verbatim, a blank line, then the message with a trailing newline.
pub fn build_commit(
    tree: &ObjectId,
    parent: &ObjectId,
    message: &str,
    author: Option<&str>,
) -> Vec<u8> {
    let mut payload = String::new();
    payload.push_str(&format!("tree {}\n", tree.to_hex()));
    payload.push_str(&format!("parent {}\n", parent.to_hex()));
    if let Some(author) = author {
        payload.push_str(&format!("author {author}\n"));
    }
    payload.push('\n');
    payload.push_str(message);
    payload.push('\n');
    payload.into_bytes()
}

/// extract the root tree id from a commit payload
///
/// only the leading `tree <40hex>\n` line is significant here; the rest of
/// the payload (parents, author, message) is ignored.
pub fn commit_tree_id(payload: &[u8]) -> Result<ObjectId> {
    let line_end = payload
        .iter()
        .position(|&b| b == b'\n')
        .ok_or_else(|| malformed("missing newline"))?;
    let line = std::str::from_utf8(&payload[..line_end])
        .map_err(|_| malformed("first line not utf-8"))?;

    let hex = line
        .strip_prefix("tree ")
        .ok_or_else(|| malformed(&format!("expected tree line, got: {line}")))?;

    ObjectId::from_hex(hex)
}

fn malformed(reason: &str) -> Error {
    Error::CorruptObject {
        id: ObjectId::ZERO,
        reason: format!("commit: {reason}"),
    }
}
