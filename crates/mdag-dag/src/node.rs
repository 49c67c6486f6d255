//! The caller-facing node tree.
//!
//! A [`Node`] is either a file with its bytes or a directory with ordered
//! children. The builder matches on it exhaustively at every level.

/// Which variant a [`Node`] is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    File,
    Directory,
}

/// A file or directory to be encoded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    File(FileNode),
    Directory(DirNode),
}

impl Node {
    /// Shorthand for a file node.
    pub fn file(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self::File(FileNode::new(name, data))
    }

    /// Shorthand for a directory node whose size is the sum of its children.
    pub fn directory(name: impl Into<String>, children: Vec<Node>) -> Self {
        Self::Directory(DirNode::new(name, children))
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Self::File(_) => NodeKind::File,
            Self::Directory(_) => NodeKind::Directory,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::File(f) => f.name(),
            Self::Directory(d) => d.name(),
        }
    }

    pub fn size(&self) -> u64 {
        match self {
            Self::File(f) => f.size(),
            Self::Directory(d) => d.size(),
        }
    }
}

/// A file: a name and its full contents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileNode {
    name: String,
    data: Vec<u8>,
}

impl FileNode {
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Length of the contents in bytes.
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// A directory: a name, a size, and children in insertion order.
///
/// The children are yielded exactly in the order they were given. Nothing
/// here sorts them, so reordering children changes the directory digest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirNode {
    name: String,
    size: u64,
    children: Vec<Node>,
}

impl DirNode {
    /// Directory whose size is the sum of its children's sizes, saturating at
    /// `u64::MAX`.
    pub fn new(name: impl Into<String>, children: Vec<Node>) -> Self {
        let size = children
            .iter()
            .fold(0u64, |acc, child| acc.saturating_add(child.size()));
        Self {
            name: name.into(),
            size,
            children,
        }
    }

    /// Override the reported size.
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    /// Append a child, growing the size by the child's size.
    pub fn push(&mut self, child: Node) {
        self.size = self.size.saturating_add(child.size());
        self.children.push(child);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Children in insertion order.
    pub fn children(&self) -> std::slice::Iter<'_, Node> {
        self.children.iter()
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_size_is_byte_length() {
        let node = Node::file("a", b"hello".to_vec());
        assert_eq!(node.kind(), NodeKind::File);
        assert_eq!(node.name(), "a");
        assert_eq!(node.size(), 5);
    }

    #[test]
    fn directory_size_sums_children() {
        let node = Node::directory(
            "root",
            vec![
                Node::file("a", vec![0u8; 3]),
                Node::directory("sub", vec![Node::file("b", vec![0u8; 4])]),
            ],
        );
        assert_eq!(node.kind(), NodeKind::Directory);
        assert_eq!(node.size(), 7);
    }

    #[test]
    fn children_keep_insertion_order() {
        let mut dir = DirNode::new("d", Vec::new());
        dir.push(Node::file("z", b"1".to_vec()));
        dir.push(Node::file("a", b"22".to_vec()));
        let names: Vec<&str> = dir.children().map(Node::name).collect();
        assert_eq!(names, vec!["z", "a"]);
        assert_eq!(dir.size(), 3);
        assert_eq!(dir.len(), 2);
    }

    #[test]
    fn huge_sizes_saturate() {
        let big = Node::Directory(DirNode::new("big", Vec::new()).with_size(u64::MAX));
        let mut dir = DirNode::new("d", vec![big.clone(), Node::file("a", b"1".to_vec())]);
        assert_eq!(dir.size(), u64::MAX);
        dir.push(big);
        assert_eq!(dir.size(), u64::MAX);
    }

    #[test]
    fn size_can_be_overridden() {
        let dir = DirNode::new("d", Vec::new()).with_size(4096);
        assert!(dir.is_empty());
        assert_eq!(dir.size(), 4096);
    }
}
