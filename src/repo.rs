use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, IoResultExt, Result};

/// name of the branch a fresh repository points at
pub const DEFAULT_BRANCH: &str = "master";

/// a twig repository: a working directory with a `.git` store inside it
pub struct Repo {
    work_dir: PathBuf,
}

impl Repo {
    /// initialize a repository at the given path
    ///
    /// creates the `.git` layout and points HEAD at the default branch.
    /// idempotent on pre-existing directories.
    pub fn init(path: &Path) -> Result<Self> {
        let git_dir = path.join(".git");

        for dir in [
            git_dir.clone(),
            git_dir.join("objects"),
            git_dir.join("refs"),
            git_dir.join("refs/heads"),
        ] {
            fs::create_dir_all(&dir).with_path(&dir)?;
        }

        let head_path = git_dir.join("HEAD");
        let head = format!("ref: refs/heads/{}\n", DEFAULT_BRANCH);
        fs::write(&head_path, head).with_path(&head_path)?;

        Ok(Self {
            work_dir: path.to_path_buf(),
        })
    }

    /// open an existing repository
    pub fn open(path: &Path) -> Result<Self> {
        if !path.join(".git").is_dir() {
            return Err(Error::NoRepo(path.to_path_buf()));
        }

        Ok(Self {
            work_dir: path.to_path_buf(),
        })
    }

    /// working directory root
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// path to the `.git` directory
    pub fn git_dir(&self) -> PathBuf {
        self.work_dir.join(".git")
    }

    /// path to the objects directory
    pub fn objects_path(&self) -> PathBuf {
        self.git_dir().join("objects")
    }

    /// path to the branch refs directory
    pub fn refs_path(&self) -> PathBuf {
        self.git_dir().join("refs/heads")
    }

    /// path to the HEAD file
    pub fn head_path(&self) -> PathBuf {
        self.git_dir().join("HEAD")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_repo_init() {
        let dir = tempdir().unwrap();
        let repo = Repo::init(dir.path()).unwrap();

        // verify structure
        assert!(dir.path().join(".git/objects").is_dir());
        assert!(dir.path().join(".git/refs/heads").is_dir());
        assert!(dir.path().join(".git/HEAD").is_file());

        let head = fs::read_to_string(repo.head_path()).unwrap();
        assert_eq!(head, "ref: refs/heads/master\n");
    }

    #[test]
    fn test_repo_init_idempotent() {
        let dir = tempdir().unwrap();

        Repo::init(dir.path()).unwrap();
        Repo::init(dir.path()).unwrap();

        let head = fs::read_to_string(dir.path().join(".git/HEAD")).unwrap();
        assert_eq!(head, "ref: refs/heads/master\n");
    }

    #[test]
    fn test_repo_open() {
        let dir = tempdir().unwrap();

        Repo::init(dir.path()).unwrap();
        let repo = Repo::open(dir.path()).unwrap();

        assert_eq!(repo.work_dir(), dir.path());
    }

    #[test]
    fn test_repo_open_not_found() {
        let dir = tempdir().unwrap();

        let result = Repo::open(dir.path());
        assert!(matches!(result, Err(Error::NoRepo(_))));
    }

    #[test]
    fn test_repo_paths() {
        let dir = tempdir().unwrap();
        let repo = Repo::init(dir.path()).unwrap();

        assert_eq!(repo.objects_path(), dir.path().join(".git/objects"));
        assert_eq!(repo.refs_path(), dir.path().join(".git/refs/heads"));
        assert_eq!(repo.head_path(), dir.path().join(".git/HEAD"));
    }
}
