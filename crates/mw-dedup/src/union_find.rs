//! Disjoint-set union over item positions.

use std::collections::HashMap;

/// Union-find with an explicit parent map and path compression.
///
/// Items are added lazily on first use; an item never seen is its own root.
#[derive(Debug, Default, Clone)]
pub struct DisjointSet {
    parent: HashMap<usize, usize>,
}

impl DisjointSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find(&mut self, item: usize) -> usize {
        let mut root = item;
        while let Some(&p) = self.parent.get(&root) {
            if p == root {
                break;
            }
            root = p;
        }
        let mut cur = item;
        while cur != root {
            let next = self.parent.get(&cur).copied().unwrap_or(root);
            self.parent.insert(cur, root);
            cur = next;
        }
        self.parent.entry(root).or_insert(root);
        root
    }

    /// Merge the sets holding `a` and `b`. Returns false if already joined.
    pub fn union(&mut self, a: usize, b: usize) -> bool {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return false;
        }
        // Smaller root wins so cluster roots are stable across runs.
        let (root, child) = if ra < rb { (ra, rb) } else { (rb, ra) };
        self.parent.insert(child, root);
        true
    }

    pub fn connected(&mut self, a: usize, b: usize) -> bool {
        self.find(a) == self.find(b)
    }

    /// Every known set, members ascending, sets ordered by smallest member.
    pub fn groups(&mut self) -> Vec<Vec<usize>> {
        let mut items: Vec<usize> = self.parent.keys().copied().collect();
        items.sort_unstable();
        let mut by_root: HashMap<usize, usize> = HashMap::new();
        let mut groups: Vec<Vec<usize>> = Vec::new();
        for item in items {
            let root = self.find(item);
            let slot = *by_root.entry(root).or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
            groups[slot].push(item);
        }
        groups
    }
}
