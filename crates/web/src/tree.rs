//! Segment based route tree.
//!
//! Every HTTP method owns one tree. A registered pattern such as
//! `/users/:id/files/*path` is split into segments and stored one segment per
//! level, the node reached by the last segment remembers the full pattern and
//! becomes a terminal node.
//!
//! Matching is greedy: at every level the first child that either equals the
//! request segment or is a `:param`/`*wildcard` node is taken, and a failed
//! descent is never retried on a sibling. Insertion order therefore decides
//! overlapping routes. For example, once `/a/:x` is registered, a later
//! `/a/b` is merged into the `:x` branch instead of getting its own node.
//!
//! # Example
//! ```
//! use nano_web::tree::{split_path, Node};
//!
//! let mut root = Node::root();
//! root.insert("/hello/:name", &split_path("/hello/:name"), 0);
//!
//! let node = root.find(&split_path("/hello/world"), 0).unwrap();
//! assert_eq!(node.pattern(), Some("/hello/:name"));
//! ```

/// Marker of a named parameter segment, e.g. `:id`.
pub const PARAM_MARKER: char = ':';

/// Marker of a trailing wildcard segment, e.g. `*path`.
pub const WILDCARD_MARKER: char = '*';

/// Splits a path or a pattern into its segments.
///
/// Empty segments are dropped, so leading, trailing and repeated slashes are
/// insignificant. Collection stops right after the first segment starting with
/// `*`; the wildcard absorbs the rest of the path at match time.
pub fn split_path(path: &str) -> Vec<&str> {
    let mut segments = Vec::new();

    for segment in path.split('/').filter(|segment| !segment.is_empty()) {
        segments.push(segment);

        if segment.starts_with(WILDCARD_MARKER) {
            break;
        }
    }

    segments
}

/// One level of the route tree.
#[derive(Debug, Default)]
pub struct Node {
    segment: String,
    is_wild: bool,
    pattern: Option<String>,
    children: Vec<Node>,
}

impl Node {
    /// Creates an empty root node.
    pub fn root() -> Self {
        Self::default()
    }

    fn with_segment(segment: &str) -> Self {
        let is_wild = segment.starts_with(PARAM_MARKER) || segment.starts_with(WILDCARD_MARKER);
        Self { segment: segment.to_owned(), is_wild, pattern: None, children: Vec::new() }
    }

    /// The literal segment text this node matches, empty for the root.
    pub fn segment(&self) -> &str {
        &self.segment
    }

    /// Returns true for `:param` and `*wildcard` nodes.
    pub fn is_wild(&self) -> bool {
        self.is_wild
    }

    /// The full registered pattern if this node terminates a route.
    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_deref()
    }

    /// Child nodes in insertion order.
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Inserts `segments[level..]` below this node and marks the last node as
    /// the terminal of `pattern`.
    ///
    /// An existing wild child captures any segment inserted at its level.
    /// Inserting the same pattern again reaches the same terminal node.
    pub fn insert(&mut self, pattern: &str, segments: &[&str], level: usize) {
        let Some(segment) = segments.get(level) else {
            self.pattern = Some(pattern.to_owned());
            return;
        };

        let index = if let Some(index) = self.children.iter().position(|child| child.accepts(segment)) {
            index
        } else {
            self.children.push(Self::with_segment(segment));
            self.children.len() - 1
        };

        self.children[index].insert(pattern, segments, level + 1);
    }

    /// Finds the terminal node matching `segments[level..]`.
    ///
    /// Only the first accepting child of each level is explored.
    pub fn find(&self, segments: &[&str], level: usize) -> Option<&Node> {
        let segment = match segments.get(level) {
            Some(_) if self.segment.starts_with(WILDCARD_MARKER) => return self.terminal(),
            Some(segment) => segment,
            None => return self.terminal(),
        };

        let child = self.children.iter().find(|child| child.accepts(segment))?;
        child.find(segments, level + 1)
    }

    #[inline]
    fn accepts(&self, segment: &str) -> bool {
        self.is_wild || self.segment == segment
    }

    #[inline]
    fn terminal(&self) -> Option<&Node> {
        self.pattern.as_ref().map(|_| self)
    }
}

#[cfg(test)]
mod tests {
    use super::{split_path, Node};

    fn tree(patterns: &[&str]) -> Node {
        let mut root = Node::root();
        for pattern in patterns {
            root.insert(pattern, &split_path(pattern), 0);
        }
        root
    }

    fn find<'a>(root: &'a Node, path: &str) -> Option<&'a str> {
        root.find(&split_path(path), 0).and_then(Node::pattern)
    }

    #[test]
    fn test_split_path() {
        let cases: &[(&str, &[&str])] = &[
            ("/", &[]),
            ("", &[]),
            ("/home", &["home"]),
            ("home", &["home"]),
            ("home/", &["home"]),
            ("/home/services", &["home", "services"]),
            ("home/services", &["home", "services"]),
            ("home/services/", &["home", "services"]),
            ("//home///services", &["home", "services"]),
            ("/downloads/*file", &["downloads", "*file"]),
            ("/downloads/*file/ignored/tail", &["downloads", "*file"]),
        ];

        for (path, expected) in cases {
            assert_eq!(split_path(path), *expected, "split {path:?}");
        }
    }

    #[test]
    fn test_insert_marks_wild_nodes() {
        let root = tree(&["/users/:id", "/files/*path"]);

        let children = root.children();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].segment(), "users");
        assert!(!children[0].is_wild());
        assert!(children[0].children()[0].is_wild());
        assert!(children[1].children()[0].is_wild());
        assert_eq!(children[1].children()[0].pattern(), Some("/files/*path"));
    }

    #[test]
    fn test_find_static_and_params() {
        let root = tree(&["/", "/users/:id", "/users/:id/about", "/users/:id/about/:section"]);

        assert_eq!(find(&root, "/"), Some("/"));
        assert_eq!(find(&root, "users/1"), Some("/users/:id"));
        assert_eq!(find(&root, "/users/1/"), Some("/users/:id"));
        assert_eq!(find(&root, "/users/1/about"), Some("/users/:id/about"));
        assert_eq!(find(&root, "/users/1/about/jobs"), Some("/users/:id/about/:section"));
        assert_eq!(find(&root, "/users"), None);
        assert_eq!(find(&root, "/users/1/other"), None);
    }

    #[test]
    fn test_find_wildcard_absorbs_rest() {
        let root = tree(&["/files/*path"]);

        assert_eq!(find(&root, "/files/a"), Some("/files/*path"));
        assert_eq!(find(&root, "/files/a/b/c.txt"), Some("/files/*path"));
        assert_eq!(find(&root, "/files"), None);
    }

    #[test]
    fn test_insert_same_pattern_twice() {
        let once = tree(&["/a/:b/c"]);
        let twice = tree(&["/a/:b/c", "/a/:b/c"]);

        assert_eq!(once.children().len(), twice.children().len());
        assert_eq!(twice.children()[0].children().len(), 1);
        assert_eq!(find(&twice, "/a/x/c"), Some("/a/:b/c"));
    }

    #[test]
    fn test_param_captures_later_literal() {
        let root = tree(&["/a/:x", "/a/b"]);

        // `b` was merged into the `:x` node, which now terminates `/a/b`
        assert_eq!(root.children()[0].children().len(), 1);
        assert_eq!(find(&root, "/a/b"), Some("/a/b"));
        assert_eq!(find(&root, "/a/zzz"), Some("/a/b"));
    }

    #[test]
    fn test_find_does_not_backtrack() {
        let root = tree(&["/a/b", "/a/:x/c"]);

        assert_eq!(find(&root, "/a/b"), Some("/a/b"));
        assert_eq!(find(&root, "/a/z/c"), Some("/a/:x/c"));
        // the literal `b` branch is taken first and has no `c` child
        assert_eq!(find(&root, "/a/b/c"), None);
    }
}
