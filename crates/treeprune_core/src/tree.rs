use hashlink::LinkedHashMap;
use log::trace;

/// Separator used both to split incoming path strings and to rebuild them.
pub const SEPARATOR: char = '/';

/// Index of a node inside its [`PathTree`].
///
/// Ids are only meaningful for the tree that handed them out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// One path segment (a directory or file name).
#[derive(Debug, Clone)]
pub struct PathTreeNode {
    name: String,
    reserved: bool,
    children: LinkedHashMap<String, NodeId>,
    // Back reference used for upward walks only. The tree owns every node.
    parent: Option<NodeId>,
}

impl PathTreeNode {
    fn new(name: &str, parent: Option<NodeId>) -> Self {
        Self { name: name.to_string(), reserved: false, children: LinkedHashMap::new(), parent }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_reserved(&self) -> bool {
        self.reserved
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in the order they were first inserted.
    pub fn children(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.children.values().copied()
    }

    pub fn child(&self, name: &str) -> Option<NodeId> {
        self.children.get(name).copied()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// A rooted, ordered tree of path segments with a reservation flag per node.
///
/// Nodes live in an arena owned by the tree; dropping the tree drops every
/// node. Sibling lookup is hashed so directories with many thousands of
/// entries do not degrade insertion.
#[derive(Debug, Clone)]
pub struct PathTree {
    nodes: Vec<PathTreeNode>,
}

impl PathTree {
    pub fn new(root_name: impl Into<String>) -> Self {
        let root_name = root_name.into();
        Self { nodes: vec![PathTreeNode::new(&root_name, None)] }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn root_name(&self) -> &str {
        &self.nodes[0].name
    }

    pub fn node(&self, id: NodeId) -> &PathTreeNode {
        &self.nodes[id.0]
    }

    pub fn is_reserved(&self, id: NodeId) -> bool {
        self.nodes[id.0].reserved
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the tree holds nothing but its root.
    pub fn is_empty(&self) -> bool {
        self.nodes[0].children.is_empty()
    }

    /// Walks from the root, creating every missing segment, and returns the
    /// terminal node. Re-inserting an existing path returns the existing node.
    pub fn ensure_path<'a, I>(&mut self, segments: I) -> NodeId
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut current = self.root();
        for segment in segments.into_iter().filter(|s| !s.is_empty()) {
            let existing = self.nodes[current.0].child(segment);
            current = match existing {
                Some(child) => child,
                None => {
                    let child = NodeId(self.nodes.len());
                    self.nodes.push(PathTreeNode::new(segment, Some(current)));
                    self.nodes[current.0].children.insert(segment.to_string(), child);
                    child
                }
            };
        }
        current
    }

    /// Walks existing children only. Returns `None` as soon as a segment is
    /// missing; nothing is created.
    pub fn find_path<'a, I>(&self, segments: I) -> Option<NodeId>
    where
        I: IntoIterator<Item = &'a str>,
    {
        segments
            .into_iter()
            .filter(|s| !s.is_empty())
            .try_fold(self.root(), |node, segment| self.nodes[node.0].child(segment))
    }

    /// Reserves `id` and every ancestor up to the root.
    ///
    /// The walk stops at the first node that is already reserved, since its
    /// ancestors must be reserved too. Returns how many nodes changed state.
    pub fn mark_reserved_upward(&mut self, id: NodeId) -> usize {
        let mut newly_reserved = 0;
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = &mut self.nodes[node_id.0];
            if node.reserved {
                break;
            }
            node.reserved = true;
            newly_reserved += 1;
            current = node.parent;
        }
        trace!("Reserved {} new node(s) from {:?}", newly_reserved, id);
        newly_reserved
    }

    /// Root-to-node path, root name included.
    pub fn full_path(&self, id: NodeId) -> String {
        let root_name = self.root_name();
        let relative = self.relative_path(id);
        if relative.is_empty() {
            root_name.to_string()
        } else if root_name.is_empty() || root_name.ends_with(SEPARATOR) {
            format!("{root_name}{relative}")
        } else {
            format!("{root_name}{SEPARATOR}{relative}")
        }
    }

    /// Path below the root, without the root name. Empty for the root itself.
    pub fn relative_path(&self, id: NodeId) -> String {
        let mut names = Vec::new();
        let mut current = id;
        while let Some(parent) = self.nodes[current.0].parent {
            names.push(self.nodes[current.0].name.as_str());
            current = parent;
        }
        let mut path = String::new();
        for name in names.iter().rev() {
            if !path.is_empty() {
                path.push(SEPARATOR);
            }
            path.push_str(name);
        }
        path
    }

    /// Splits `path` into segments relative to this tree's root.
    ///
    /// When the root name is absolute (`/...` or a drive such as `C:/...`),
    /// an absolute `path` must lie beneath it and `None` is returned
    /// otherwise. Relative paths are always taken as root-relative. Empty and
    /// `.` segments are dropped.
    pub fn segments_of<'a>(&self, path: &'a str) -> Option<Vec<&'a str>> {
        let root_name = self.root_name();
        let rest = if is_absolute(path) && is_absolute(root_name) {
            strip_root(path, root_name)?
        } else {
            path
        };
        Some(rest.split(SEPARATOR).filter(|s| !s.is_empty() && *s != ".").collect())
    }

    /// Node ids in pre-order, children visited in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.descendants(self.root())
    }

    /// `id` followed by its whole subtree in pre-order.
    pub fn descendants(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let mut stack = vec![id];
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            let children: Vec<NodeId> = self.nodes[next.0].children().collect();
            stack.extend(children.into_iter().rev());
            Some(next)
        })
    }

    /// Nodes without children, the root excluded.
    pub fn leaves(&self) -> impl Iterator<Item = NodeId> + '_ {
        let root = self.root();
        self.iter().filter(move |&id| id != root && self.nodes[id.0].is_leaf())
    }

    pub fn reserved_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.reserved).count()
    }
}

fn is_absolute(path: &str) -> bool {
    if path.starts_with(SEPARATOR) {
        return true;
    }
    let mut chars = path.chars();
    matches!(
        (chars.next(), chars.next(), chars.next()),
        (Some(drive), Some(':'), Some(SEPARATOR)) if drive.is_ascii_alphabetic()
    )
}

fn strip_root<'a>(path: &'a str, root_name: &str) -> Option<&'a str> {
    let root = root_name.trim_end_matches(SEPARATOR);
    if root.is_empty() {
        return Some(path);
    }
    let rest = path.strip_prefix(root)?;
    if rest.is_empty() || rest.starts_with(SEPARATOR) { Some(rest) } else { None }
}
