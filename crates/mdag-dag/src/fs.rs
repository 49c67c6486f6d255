//! Loading a [`Node`] tree from the local filesystem.
//!
//! A directory is read with a single `walkdir` traversal. Entries are sorted
//! by file name so that the same directory contents always produce the same
//! digest. Symlinks and special files below the root are skipped.

use std::io;
use std::path::Path;

use tracing::debug;
use walkdir::WalkDir;

use crate::error::{DagError, DagResult};
use crate::node::{DirNode, Node};

/// Read `path` into a node tree.
///
/// A file becomes a [`Node::File`], a directory becomes a [`Node::Directory`]
/// with its children loaded recursively. The root directory counts as depth
/// 1; nesting beyond `max_depth` fails with [`DagError::DepthExceeded`].
pub fn load_path(path: &Path, max_depth: usize) -> DagResult<Node> {
    let meta = std::fs::metadata(path).map_err(|e| io_err(path, e))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    if meta.is_dir() {
        Ok(Node::Directory(load_dir(path, name, max_depth)?))
    } else {
        let data = std::fs::read(path).map_err(|e| io_err(path, e))?;
        Ok(Node::file(name, data))
    }
}

/// One sorted, depth-first walk below `path`.
///
/// `open` holds the directories entered but not yet finished, outermost
/// first; the root is kept apart. An entry at walk depth `k` belongs to the
/// root when `k` is 1 and to `open[k - 2]` otherwise, so anything deeper is
/// finished and attached to its parent before the entry is added.
fn load_dir(path: &Path, name: String, max_depth: usize) -> DagResult<DirNode> {
    if max_depth == 0 {
        return Err(DagError::DepthExceeded { depth: 1, max: 0 });
    }

    let mut root = DirNode::new(name, Vec::new());
    let mut open: Vec<DirNode> = Vec::new();
    let entries = WalkDir::new(path)
        .min_depth(1)
        .max_depth(max_depth)
        .follow_links(false)
        .sort_by_file_name();

    for entry in entries {
        let entry = entry.map_err(|e| walk_err(path, e))?;
        close_until(&mut root, &mut open, entry.depth() - 1);

        let child_name = entry.file_name().to_string_lossy().into_owned();
        let file_type = entry.file_type();

        if file_type.is_dir() {
            // The root is depth 1, so a directory at walk depth k is k + 1.
            let depth = entry.depth() + 1;
            if depth > max_depth {
                return Err(DagError::DepthExceeded {
                    depth,
                    max: max_depth,
                });
            }
            open.push(DirNode::new(child_name, Vec::new()));
        } else if file_type.is_file() {
            let data = std::fs::read(entry.path()).map_err(|e| io_err(entry.path(), e))?;
            let file = Node::file(child_name, data);
            match open.last_mut() {
                Some(parent) => parent.push(file),
                None => root.push(file),
            }
        } else {
            debug!(path = %entry.path().display(), "skipping non-regular entry");
        }
    }

    close_until(&mut root, &mut open, 0);
    Ok(root)
}

/// Finish open directories until only `height` remain.
fn close_until(root: &mut DirNode, open: &mut Vec<DirNode>, height: usize) {
    while open.len() > height {
        let Some(done) = open.pop() else { break };
        match open.last_mut() {
            Some(parent) => parent.push(Node::Directory(done)),
            None => root.push(Node::Directory(done)),
        }
    }
}

fn io_err(path: &Path, source: io::Error) -> DagError {
    DagError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn walk_err(dir: &Path, e: walkdir::Error) -> DagError {
    let path = e.path().unwrap_or(dir).to_path_buf();
    let source = e
        .into_io_error()
        .unwrap_or_else(|| io::Error::other("filesystem loop"));
    DagError::Io { path, source }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeKind;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn loads_single_file() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("hello.txt");
        fs::write(&file, b"hello world").unwrap();

        let node = load_path(&file, 8).unwrap();
        assert_eq!(node.kind(), NodeKind::File);
        assert_eq!(node.name(), "hello.txt");
        assert_eq!(node.size(), 11);
    }

    #[test]
    fn children_are_sorted_by_name() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("zeta"), b"z").unwrap();
        fs::write(dir.path().join("alpha"), b"aa").unwrap();
        fs::create_dir(dir.path().join("mid")).unwrap();
        fs::write(dir.path().join("mid").join("inner"), b"iii").unwrap();

        let Node::Directory(root) = load_path(dir.path(), 8).unwrap() else {
            panic!("expected a directory");
        };
        let names: Vec<&str> = root.children().map(Node::name).collect();
        assert_eq!(names, vec!["alpha", "mid", "zeta"]);
        assert_eq!(root.size(), 6);
    }

    #[test]
    fn empty_directory() {
        let dir = tempdir().unwrap();
        let Node::Directory(root) = load_path(dir.path(), 8).unwrap() else {
            panic!("expected a directory");
        };
        assert!(root.is_empty());
    }

    #[test]
    fn depth_limit_applies() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a").join("b")).unwrap();

        assert!(load_path(dir.path(), 3).is_ok());
        assert!(matches!(
            load_path(dir.path(), 2),
            Err(DagError::DepthExceeded { depth: 3, max: 2 })
        ));
    }

    #[test]
    fn nested_directories_keep_their_own_children() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a").join("deep")).unwrap();
        fs::create_dir(dir.path().join("b")).unwrap();
        fs::write(dir.path().join("a").join("deep").join("x"), b"xxxx").unwrap();
        fs::write(dir.path().join("a").join("y"), b"yy").unwrap();
        fs::write(dir.path().join("b").join("z"), b"z").unwrap();
        fs::write(dir.path().join("top"), b"ttt").unwrap();

        let expected = Node::directory(
            "",
            vec![
                Node::directory(
                    "a",
                    vec![
                        Node::directory("deep", vec![Node::file("x", b"xxxx".to_vec())]),
                        Node::file("y", b"yy".to_vec()),
                    ],
                ),
                Node::directory("b", vec![Node::file("z", b"z".to_vec())]),
                Node::file("top", b"ttt".to_vec()),
            ],
        );

        let Node::Directory(root) = load_path(dir.path(), 8).unwrap() else {
            panic!("expected a directory");
        };
        let Node::Directory(expected) = expected else {
            unreachable!()
        };
        let loaded: Vec<&Node> = root.children().collect();
        let wanted: Vec<&Node> = expected.children().collect();
        assert_eq!(loaded, wanted);
        assert_eq!(root.size(), 10);
    }

    #[test]
    fn zero_depth_rejects_any_directory() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            load_path(dir.path(), 0),
            Err(DagError::DepthExceeded { depth: 1, max: 0 })
        ));
    }

    #[test]
    fn missing_path_is_io_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            load_path(&missing, 8),
            Err(DagError::Io { path, .. }) if path == missing
        ));
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_below_root_are_skipped() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("real"), b"data").unwrap();
        std::os::unix::fs::symlink(dir.path().join("real"), dir.path().join("link")).unwrap();

        let Node::Directory(root) = load_path(dir.path(), 8).unwrap() else {
            panic!("expected a directory");
        };
        let names: Vec<&str> = root.children().map(Node::name).collect();
        assert_eq!(names, vec!["real"]);
    }

    #[test]
    fn same_contents_same_digest() {
        use crate::builder::DagBuilder;
        use crate::config::DagConfig;
        use mdag_store::InMemoryKvStore;
        use std::sync::Arc;

        let build = |order: &[(&str, &[u8])]| {
            let dir = tempdir().unwrap();
            for (name, data) in order {
                fs::write(dir.path().join(name), data).unwrap();
            }
            let node = load_path(dir.path(), 8).unwrap();
            let builder =
                DagBuilder::new(Arc::new(InMemoryKvStore::new()), &DagConfig::default()).unwrap();
            builder.add(&node).unwrap()
        };

        let a = build(&[("x", &b"1"[..]), ("y", &b"2"[..])]);
        let b = build(&[("y", &b"2"[..]), ("x", &b"1"[..])]);
        assert_eq!(a, b);
    }
}
