//! Resource trees provide the limited file access that materializing needs.
//!
//! The writer only ever asks whether something exists, creates folders, and creates or replaces
//! whole files. [`LocalFileSystem`] does this on disk, and [`InMemoryResourceTree`] keeps
//! everything in memory so behavior can be checked without touching the disk.

use parking_lot::RwLock;
use std::collections::{BTreeMap, HashSet};
use std::fs::File;
#[cfg(unix)]
use std::fs::Permissions;
use std::io;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::{Builder, NamedTempFile};

/// The file operations needed to materialize generated files
pub trait ResourceTree {
    /// Checks if a file or folder exists at the given path
    fn exists(&self, path: &Path) -> bool;

    /// Creates a folder and all of its missing parents. Succeeds if the folder already exists.
    fn create_folder_recursive(&self, path: &Path) -> io::Result<()>;

    /// Creates a file with the given contents, or replaces the entire contents if the file
    /// already exists. The parent folder must exist.
    ///
    /// Returns the number of bytes written.
    fn create_or_replace_file(&self, path: &Path, contents: &mut dyn Read) -> io::Result<u64>;
}

impl<R: ResourceTree + ?Sized> ResourceTree for &R {
    fn exists(&self, path: &Path) -> bool {
        (**self).exists(path)
    }

    fn create_folder_recursive(&self, path: &Path) -> io::Result<()> {
        (**self).create_folder_recursive(path)
    }

    fn create_or_replace_file(&self, path: &Path, contents: &mut dyn Read) -> io::Result<u64> {
        (**self).create_or_replace_file(path, contents)
    }
}

/// The real file system.
#[derive(Debug, Default, Clone)]
pub struct LocalFileSystem {
    atomic: bool,
}

impl LocalFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// A file system where files are first written to a temporary file in the same folder, then
    /// renamed over the target. An interrupted write never leaves a partial file behind.
    pub fn atomic() -> Self {
        Self { atomic: true }
    }

    pub fn is_atomic(&self) -> bool {
        self.atomic
    }
}

impl ResourceTree for LocalFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create_folder_recursive(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn create_or_replace_file(&self, path: &Path, contents: &mut dyn Read) -> io::Result<u64> {
        if self.atomic {
            let parent = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let previous = std::fs::metadata(path).ok().map(|m| m.permissions());
            let mut temp = temp_file_in(parent)?;
            let written = io::copy(contents, temp.as_file_mut())?;
            if let Some(permissions) = previous {
                temp.as_file().set_permissions(permissions)?;
            }
            temp.as_file_mut().sync_all()?;
            temp.persist(path).map_err(|e| e.error)?;
            Ok(written)
        } else {
            let mut file = File::create(path)?;
            let written = io::copy(contents, &mut file)?;
            file.flush()?;
            Ok(written)
        }
    }
}

/// Creates a temporary file with the permissions [`File::create`] would give, instead of the
/// owner only permissions temporary files default to.
fn temp_file_in(parent: &Path) -> io::Result<NamedTempFile> {
    #[allow(unused_mut)]
    let mut builder = Builder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        // narrowed by the umask when the file is opened
        builder.permissions(Permissions::from_mode(0o666));
    }
    builder.tempfile_in(parent)
}

#[derive(Debug, Clone, Eq, PartialEq)]
enum Node {
    Folder,
    File(Vec<u8>),
}

/// A resource tree that only exists in memory.
///
/// Paths are used as given, no normalization is done.
#[derive(Debug, Default)]
pub struct InMemoryResourceTree {
    nodes: RwLock<BTreeMap<PathBuf, Node>>,
    failing: RwLock<HashSet<PathBuf>>,
}

impl InMemoryResourceTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Puts a file into the tree, creating its parent folders.
    pub fn insert_file(&self, path: impl AsRef<Path>, contents: impl AsRef<[u8]>) {
        let path = path.as_ref();
        let mut nodes = self.nodes.write();
        if let Some(parent) = path.parent() {
            for ancestor in parent.ancestors().filter(|p| !p.as_os_str().is_empty()) {
                nodes.insert(ancestor.to_path_buf(), Node::Folder);
            }
        }
        nodes.insert(path.to_path_buf(), Node::File(contents.as_ref().to_vec()));
    }

    /// Gets the contents of a file, if a file exists at the path
    pub fn read(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        match self.nodes.read().get(path.as_ref()) {
            Some(Node::File(contents)) => Some(contents.clone()),
            _ => None,
        }
    }

    /// Checks if a folder exists at the path
    pub fn is_folder(&self, path: impl AsRef<Path>) -> bool {
        matches!(self.nodes.read().get(path.as_ref()), Some(Node::Folder))
    }

    /// Gets the paths of all files in the tree, in sorted order
    pub fn files(&self) -> Vec<PathBuf> {
        self.nodes
            .read()
            .iter()
            .filter(|(_, node)| matches!(node, Node::File(_)))
            .map(|(path, _)| path.clone())
            .collect()
    }

    /// Any further writes to this path fail with a permission denied error
    pub fn fail_writes_to(&self, path: impl AsRef<Path>) {
        self.failing.write().insert(path.as_ref().to_path_buf());
    }
}

impl ResourceTree for InMemoryResourceTree {
    fn exists(&self, path: &Path) -> bool {
        self.nodes.read().contains_key(path)
    }

    fn create_folder_recursive(&self, path: &Path) -> io::Result<()> {
        let mut nodes = self.nodes.write();
        let mut ancestors: Vec<&Path> = path
            .ancestors()
            .filter(|p| !p.as_os_str().is_empty())
            .collect();
        ancestors.reverse();

        for ancestor in &ancestors {
            if let Some(Node::File(_)) = nodes.get(*ancestor) {
                return Err(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("{:?} is a file", ancestor),
                ));
            }
        }
        if self.failing.read().contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("can not create {:?}", path),
            ));
        }
        for ancestor in ancestors {
            nodes.entry(ancestor.to_path_buf()).or_insert(Node::Folder);
        }
        Ok(())
    }

    fn create_or_replace_file(&self, path: &Path, contents: &mut dyn Read) -> io::Result<u64> {
        if self.failing.read().contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("can not write to {:?}", path),
            ));
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !self.is_folder(parent) {
                return Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("parent folder {:?} does not exist", parent),
                ));
            }
        }
        if self.is_folder(path) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{:?} is a folder", path),
            ));
        }

        let mut buffer = vec![];
        let written = contents.read_to_end(&mut buffer)? as u64;
        self.nodes
            .write()
            .insert(path.to_path_buf(), Node::File(buffer));
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn in_memory_folders_are_idempotent() {
        let tree = InMemoryResourceTree::new();
        let folder = Path::new("/out/META-INF/maven");
        tree.create_folder_recursive(folder).unwrap();
        tree.create_folder_recursive(folder).unwrap();
        assert!(tree.is_folder("/out"));
        assert!(tree.is_folder("/out/META-INF"));
        assert!(tree.is_folder(folder));
    }

    #[test]
    fn in_memory_folder_through_file_fails() {
        let tree = InMemoryResourceTree::new();
        tree.insert_file("/out/META-INF", b"not a folder");
        let error = tree
            .create_folder_recursive(Path::new("/out/META-INF/maven"))
            .unwrap_err();
        assert_eq!(error.kind(), io::ErrorKind::AlreadyExists);
        assert!(!tree.exists(Path::new("/out/META-INF/maven")));
    }

    #[test]
    fn in_memory_file_needs_parent() {
        let tree = InMemoryResourceTree::new();
        let error = tree
            .create_or_replace_file(Path::new("/missing/file"), &mut &b"data"[..])
            .unwrap_err();
        assert_eq!(error.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn in_memory_replace_overwrites() {
        let tree = InMemoryResourceTree::new();
        tree.insert_file("/out/file", b"a much longer piece of content");
        let written = tree
            .create_or_replace_file(Path::new("/out/file"), &mut &b"short"[..])
            .unwrap();
        assert_eq!(written, 5);
        assert_eq!(tree.read("/out/file").unwrap(), b"short");
    }

    #[test]
    fn local_replace_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("file");
        std::fs::write(&path, "a much longer piece of content").unwrap();

        for fs in [LocalFileSystem::new(), LocalFileSystem::atomic()] {
            let written = fs
                .create_or_replace_file(&path, &mut &b"short"[..])
                .unwrap();
            assert_eq!(written, 5);
            assert_eq!(std::fs::read_to_string(&path).unwrap(), "short");
        }
        let leftovers = std::fs::read_dir(temp_dir.path()).unwrap().count();
        assert_eq!(leftovers, 1, "atomic writes should not leave temporary files");
    }

    #[cfg(unix)]
    #[test]
    fn atomic_writes_keep_normal_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let mode = |path: &Path| std::fs::metadata(path).unwrap().permissions().mode() & 0o777;

        let plain = temp_dir.path().join("plain");
        let atomic = temp_dir.path().join("atomic");
        LocalFileSystem::new()
            .create_or_replace_file(&plain, &mut &b"data"[..])
            .unwrap();
        LocalFileSystem::atomic()
            .create_or_replace_file(&atomic, &mut &b"data"[..])
            .unwrap();
        assert_eq!(mode(&atomic), mode(&plain));

        std::fs::set_permissions(&atomic, std::fs::Permissions::from_mode(0o640)).unwrap();
        LocalFileSystem::atomic()
            .create_or_replace_file(&atomic, &mut &b"replaced"[..])
            .unwrap();
        assert_eq!(mode(&atomic), 0o640);
        assert_eq!(std::fs::read_to_string(&atomic).unwrap(), "replaced");
    }

    #[test]
    fn local_folders_are_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let folder = temp_dir.path().join("a").join("b").join("c");
        let fs = LocalFileSystem::new();
        fs.create_folder_recursive(&folder).unwrap();
        fs.create_folder_recursive(&folder).unwrap();
        assert!(fs.exists(&folder));
        assert!(folder.is_dir());
    }
}
