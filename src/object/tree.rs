use crate::error::{Error, Result};
use crate::hash::ObjectId;

/// mode recorded for subdirectories
pub const MODE_DIR: u32 = 0o40000;
/// mode recorded for regular files
pub const MODE_REGULAR: u32 = 0o100644;

/// one entry of a tree payload: `<mode-octal> SP <name> NUL <20-byte-id>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub mode: u32,
    pub name: String,
    pub id: ObjectId,
}

impl TreeEntry {
    pub fn new(mode: u32, name: impl Into<String>, id: ObjectId) -> Self {
        Self {
            mode,
            name: name.into(),
            id,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.mode == MODE_DIR
    }

    /// regular-file family: mode whose octal form starts with 100
    pub fn is_regular(&self) -> bool {
        self.mode & !0o777 == 0o100000
    }

    /// unix permission bits, the trailing octal digits of the mode
    pub fn permissions(&self) -> u32 {
        self.mode & 0o777
    }

    /// mode as octal text, no leading zeros
    pub fn mode_octal(&self) -> String {
        format!("{:o}", self.mode)
    }

    /// canonical sort key: directories compare as if their name ended in `/`
    fn sort_key(&self) -> Vec<u8> {
        let mut key = self.name.as_bytes().to_vec();
        if self.is_dir() {
            key.push(b'/');
        }
        key
    }
}

/// serialize entries into a tree payload
///
/// entries are emitted in canonical order regardless of input order, so the
/// same set of entries always produces the same payload.
pub fn serialize_tree(entries: &[TreeEntry]) -> Vec<u8> {
    let mut sorted: Vec<&TreeEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

    let mut payload = Vec::new();
    for entry in sorted {
        payload.extend_from_slice(entry.mode_octal().as_bytes());
        payload.push(b' ');
        payload.extend_from_slice(entry.name.as_bytes());
        payload.push(0);
        payload.extend_from_slice(entry.id.as_bytes());
    }
    payload
}

/// parse a tree payload into entries
pub fn parse_tree(payload: &[u8]) -> Result<Vec<TreeEntry>> {
    let mut entries = Vec::new();
    let mut pos = 0;

    while pos < payload.len() {
        let space = payload[pos..]
            .iter()
            .position(|&b| b == b' ')
            .ok_or_else(|| malformed("missing space after mode"))?;
        let mode_str = std::str::from_utf8(&payload[pos..pos + space])
            .map_err(|_| malformed("mode not utf-8"))?;
        let mode = u32::from_str_radix(mode_str, 8)
            .map_err(|_| malformed(&format!("bad octal mode: {mode_str}")))?;
        pos += space + 1;

        let nul = payload[pos..]
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| malformed("missing nul after name"))?;
        let name = std::str::from_utf8(&payload[pos..pos + nul])
            .map_err(|_| Error::InvalidEntryName("name not utf-8".to_string()))?
            .to_string();
        if name.is_empty() || name == "." || name == ".." || name.contains('/') {
            // a hostile tree must not be able to escape the checkout root
            return Err(Error::InvalidEntryName(name));
        }
        pos += nul + 1;

        if pos + 20 > payload.len() {
            return Err(malformed("truncated entry id"));
        }
        let id = ObjectId::from_slice(&payload[pos..pos + 20])?;
        pos += 20;

        entries.push(TreeEntry { mode, name, id });
    }

    Ok(entries)
}

fn malformed(reason: &str) -> Error {
    Error::CorruptObject {
        id: ObjectId::ZERO,
        reason: format!("tree: {reason}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u8) -> ObjectId {
        ObjectId::from_bytes([n; 20])
    }

    #[test]
    fn test_serialize_single_entry() {
        let entries = vec![TreeEntry::new(MODE_REGULAR, "a", id(1))];
        let payload = serialize_tree(&entries);

        let mut expected = b"100644 a\0".to_vec();
        expected.extend_from_slice(&[1u8; 20]);
        assert_eq!(payload, expected);
    }

    #[test]
    fn test_dir_mode_has_no_leading_zero() {
        let entries = vec![TreeEntry::new(MODE_DIR, "sub", id(1))];
        let payload = serialize_tree(&entries);
        assert!(payload.starts_with(b"40000 sub\0"));
    }

    #[test]
    fn test_parse_roundtrip() {
        let entries = vec![
            TreeEntry::new(MODE_REGULAR, "a.txt", id(1)),
            TreeEntry::new(MODE_DIR, "sub", id(2)),
        ];
        let payload = serialize_tree(&entries);
        let parsed = parse_tree(&payload).unwrap();
        assert_eq!(parsed, entries);
    }

    #[test]
    fn test_canonical_sort_is_bytewise() {
        let entries = vec![
            TreeEntry::new(MODE_REGULAR, "zebra", id(1)),
            TreeEntry::new(MODE_REGULAR, "apple", id(2)),
            TreeEntry::new(MODE_REGULAR, "Mango", id(3)),
        ];
        let parsed = parse_tree(&serialize_tree(&entries)).unwrap();
        let names: Vec<&str> = parsed.iter().map(|e| e.name.as_str()).collect();
        // uppercase sorts before lowercase in byte order
        assert_eq!(names, vec!["Mango", "apple", "zebra"]);
    }

    #[test]
    fn test_directory_sorts_as_if_slash_suffixed() {
        // "foo" the file vs "foo" the directory vs "foo.txt":
        // as bytes, "foo.txt" < "foo/" so the file with the longer name
        // comes before the directory of the shared prefix
        let entries = vec![
            TreeEntry::new(MODE_DIR, "foo", id(1)),
            TreeEntry::new(MODE_REGULAR, "foo.txt", id(2)),
        ];
        let parsed = parse_tree(&serialize_tree(&entries)).unwrap();
        assert_eq!(parsed[0].name, "foo.txt");
        assert_eq!(parsed[1].name, "foo");
    }

    #[test]
    fn test_serialize_is_order_independent() {
        let a = vec![
            TreeEntry::new(MODE_REGULAR, "one", id(1)),
            TreeEntry::new(MODE_DIR, "two", id(2)),
        ];
        let b = vec![a[1].clone(), a[0].clone()];
        assert_eq!(serialize_tree(&a), serialize_tree(&b));
    }

    #[test]
    fn test_empty_tree() {
        assert!(serialize_tree(&[]).is_empty());
        assert!(parse_tree(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_parse_truncated_id() {
        let mut payload = b"100644 a\0".to_vec();
        payload.extend_from_slice(&[1u8; 10]); // only half an id
        assert!(parse_tree(&payload).is_err());
    }

    #[test]
    fn test_parse_rejects_traversal_names() {
        for name in ["..", ".", "a/b"] {
            let mut payload = format!("100644 {name}\0").into_bytes();
            payload.extend_from_slice(&[1u8; 20]);
            assert!(matches!(
                parse_tree(&payload),
                Err(Error::InvalidEntryName(_))
            ));
        }
    }

    #[test]
    fn test_parse_bad_mode() {
        let mut payload = b"10x644 a\0".to_vec();
        payload.extend_from_slice(&[1u8; 20]);
        assert!(parse_tree(&payload).is_err());
    }

    #[test]
    fn test_mode_predicates() {
        let file = TreeEntry::new(MODE_REGULAR, "f", id(1));
        assert!(file.is_regular());
        assert!(!file.is_dir());
        assert_eq!(file.permissions(), 0o644);

        let dir = TreeEntry::new(MODE_DIR, "d", id(2));
        assert!(dir.is_dir());
        assert!(!dir.is_regular());
    }
}
