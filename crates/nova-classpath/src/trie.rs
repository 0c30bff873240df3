use std::collections::BTreeMap;

/// Path-segment trie mapping classpath-relative resource paths to the index
/// of the entry that owns them.
#[derive(Debug, Default)]
pub(crate) struct PathTrie {
    root: Node,
    len: usize,
}

#[derive(Debug, Default)]
struct Node {
    children: BTreeMap<String, Node>,
    owner: Option<usize>,
}

impl PathTrie {
    /// Records `path` as owned by `entry` unless an earlier entry already
    /// owns it. Returns whether the path was newly inserted.
    pub(crate) fn insert(&mut self, path: &str, entry: usize) -> bool {
        let mut node = &mut self.root;
        for segment in segments(path) {
            node = node.children.entry(segment.to_string()).or_default();
        }
        if node.owner.is_some() {
            return false;
        }
        node.owner = Some(entry);
        self.len += 1;
        true
    }

    pub(crate) fn owner(&self, path: &str) -> Option<usize> {
        self.node(path)?.owner
    }

    /// Names of the resources stored directly below `dir`.
    pub(crate) fn files_in(&self, dir: &str) -> Vec<String> {
        let Some(node) = self.node(dir) else {
            return Vec::new();
        };
        node.children
            .iter()
            .filter(|(_, child)| child.owner.is_some())
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Whether any resource lives at or below `dir`.
    pub(crate) fn contains_dir(&self, dir: &str) -> bool {
        self.node(dir).is_some_and(|node| !node.children.is_empty())
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    fn node(&self, path: &str) -> Option<&Node> {
        let mut node = &self.root;
        for segment in segments(path) {
            node = node.children.get(segment)?;
        }
        Some(node)
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_owner_wins() {
        let mut trie = PathTrie::default();
        assert!(trie.insert("a/B.class", 0));
        assert!(!trie.insert("a/B.class", 1));
        assert_eq!(trie.owner("a/B.class"), Some(0));
        assert_eq!(trie.owner("a"), None);
        assert_eq!(trie.len(), 1);
    }

    #[test]
    fn lists_only_direct_files() {
        let mut trie = PathTrie::default();
        trie.insert("a/B.class", 0);
        trie.insert("a/C$D.class", 0);
        trie.insert("a/sub/E.class", 1);
        assert_eq!(trie.files_in("a"), vec!["B.class", "C$D.class"]);
        assert!(trie.contains_dir("a/sub"));
        assert!(!trie.contains_dir("b"));
    }
}
