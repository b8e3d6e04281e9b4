//! Probabilistic ordered multimap used as the name index.
//!
//! Nodes live in an arena and link to each other by slot index. Each node
//! carries one forward link per level it participates in; the head holds one
//! link per level in use and only ever grows.
//!
//! ```text
//! Level 2:  HEAD ─────────────────────► 5 ──────────────────► NIL
//! Level 1:  HEAD ──────────► 3 ───────► 5 ──────────────────► NIL
//! Level 0:  HEAD ──► 3 ────► 3 ───────► 5 ───────► 8 ───────► NIL
//! ```
//!
//! Duplicate keys are allowed. A new entry is linked in front of any entries
//! already holding an equal key, so a run of equal keys reads most recent
//! first.
//!
//! # Example
//!
//! ```rust
//! use quadskip::compute::skiplist::SkipList;
//!
//! let mut list = SkipList::with_seed(7);
//! list.insert(5, "five");
//! list.insert(3, "three");
//! list.insert(3, "drei");
//!
//! let threes: Vec<_> = list.search(&3).iter().map(|e| e.value).collect();
//! assert_eq!(threes, vec!["drei", "three"]);
//!
//! assert_eq!(list.remove(&3).map(|e| e.value), Some("drei"));
//! assert_eq!(list.len(), 2);
//! ```

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use smallvec::{SmallVec, smallvec};
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::iter::FusedIterator;

/// Forward links (or predecessors) indexed by level. `None` is the end of the
/// list for a link, or the head for a predecessor.
type Links = SmallVec<[Option<usize>; 4]>;

/// A key/value pair stored in the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry<K, V> {
    pub key: K,
    pub value: V,
}

impl<K, V> Entry<K, V> {
    pub fn new(key: K, value: V) -> Self {
        Self { key, value }
    }
}

#[derive(Debug, Clone)]
struct SkipNode<K, V> {
    entry: Entry<K, V>,
    forward: Links,
}

impl<K, V> SkipNode<K, V> {
    fn level(&self) -> usize {
        self.forward.len() - 1
    }
}

/// One line of a [`SkipListDump`]: a node's level and its value. The head
/// comes first and has no value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DumpLevel<'a, V> {
    pub level: usize,
    pub value: Option<&'a V>,
}

impl<V> DumpLevel<'_, V> {
    /// Number of forward links the node carries.
    pub fn links(&self) -> usize {
        self.level + 1
    }
}

/// Snapshot of the list structure in level-0 order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkipListDump<'a, V> {
    pub nodes: Vec<DumpLevel<'a, V>>,
    pub len: usize,
}

/// Ordered multimap with randomized levels.
///
/// `R` is the source of the geometric level draw. Tests inject a
/// deterministic generator; everything else uses [`StdRng`].
#[derive(Debug, Clone)]
pub struct SkipList<K, V, R = StdRng> {
    head: Links,
    nodes: Vec<Option<SkipNode<K, V>>>,
    free: Vec<usize>,
    len: usize,
    rng: R,
}

impl<K: Ord, V> SkipList<K, V, StdRng> {
    /// Create an empty list seeded from system entropy.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Create an empty list whose level draws are reproducible.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl<K: Ord, V> Default for SkipList<K, V, StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord, V, R: Rng> SkipList<K, V, R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            head: smallvec![None],
            nodes: Vec::new(),
            free: Vec::new(),
            len: 0,
            rng,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Highest level linked from the head.
    pub fn max_level(&self) -> usize {
        self.head.len() - 1
    }

    /// Geometric draw: `P(level >= L) = 2^-L`, unbounded.
    fn random_level(&mut self) -> usize {
        let mut level = 0;
        while self.rng.r#gen::<bool>() {
            level += 1;
        }
        level
    }

    /// Insert an entry. Equal keys are kept; the new entry goes in front of
    /// the existing run.
    pub fn insert(&mut self, key: K, value: V) {
        let level = self.random_level();
        if level > self.max_level() {
            log::trace!(
                "skip list head grows from level {} to {}",
                self.max_level(),
                level
            );
            self.head.resize(level + 1, None);
        }

        let trail = self.trail(&key, level);
        let forward: Links = (0..=level).map(|i| self.next(trail[i], i)).collect();
        let idx = self.alloc(SkipNode {
            entry: Entry::new(key, value),
            forward,
        });
        for (i, pred) in trail.into_iter().enumerate() {
            self.set_next(pred, i, Some(idx));
        }
        self.len += 1;
    }

    /// All entries whose key equals `key`, in list order.
    pub fn search<Q>(&self, key: &Q) -> Vec<&Entry<K, V>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let trail = self.trail(key, self.max_level());
        let mut found = Vec::new();
        let mut cursor = self.next(trail[0], 0);
        while let Some(idx) = cursor {
            if self.compare(idx, key) != Ordering::Equal {
                break;
            }
            let node = self.node(idx);
            found.push(&node.entry);
            cursor = node.forward[0];
        }
        found
    }

    /// Remove the first entry (in list order) with the given key.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<Entry<K, V>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.remove_where(key, |_| true)
    }

    /// Remove the first entry with the given key whose value satisfies
    /// `matches`. Entries ahead of it in the run of equal keys stay linked.
    pub fn remove_where<Q, F>(&mut self, key: &Q, mut matches: F) -> Option<Entry<K, V>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
        F: FnMut(&V) -> bool,
    {
        let trail = self.trail(key, self.max_level());

        let mut cursor = self.next(trail[0], 0);
        let target = loop {
            let idx = cursor?;
            if self.compare(idx, key) != Ordering::Equal {
                return None;
            }
            let node = self.node(idx);
            if matches(&node.entry.value) {
                break idx;
            }
            cursor = node.forward[0];
        };

        // The trail stops before the run of equal keys; the target may sit
        // further along that run on every level it occupies.
        let level = self.node(target).level();
        for (i, start) in trail.into_iter().enumerate().take(level + 1) {
            let mut pred = start;
            while let Some(next) = self.next(pred, i) {
                if next == target {
                    break;
                }
                pred = Some(next);
            }
            debug_assert_eq!(self.next(pred, i), Some(target));
            let after = self.node(target).forward[i];
            self.set_next(pred, i, after);
        }

        self.len -= 1;
        self.free.push(target);
        self.nodes[target].take().map(|node| node.entry)
    }

    /// Smallest entry, if any.
    pub fn first(&self) -> Option<&Entry<K, V>> {
        self.head[0].map(|idx| &self.node(idx).entry)
    }

    /// Forward iteration in key order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            nodes: &self.nodes,
            next: self.head[0],
            remaining: self.len,
        }
    }

    /// Drop every entry. The head level is kept.
    pub fn clear(&mut self) {
        self.head.iter_mut().for_each(|link| *link = None);
        self.nodes.clear();
        self.free.clear();
        self.len = 0;
    }

    /// Level and value of every node, head first.
    pub fn dump(&self) -> SkipListDump<'_, V> {
        let mut nodes = Vec::with_capacity(self.len + 1);
        nodes.push(DumpLevel {
            level: self.max_level(),
            value: None,
        });
        let mut cursor = self.head[0];
        while let Some(idx) = cursor {
            let node = self.node(idx);
            nodes.push(DumpLevel {
                level: node.level(),
                value: Some(&node.entry.value),
            });
            cursor = node.forward[0];
        }
        SkipListDump {
            nodes,
            len: self.len,
        }
    }

    /// Check ordering, level and length invariants.
    pub fn validate(&self) -> Result<(), String> {
        for level in 0..=self.max_level() {
            let mut seen = 0;
            let mut prev: Option<&K> = None;
            let mut cursor = self.head[level];
            while let Some(idx) = cursor {
                let node = self
                    .nodes
                    .get(idx)
                    .and_then(Option::as_ref)
                    .ok_or_else(|| format!("level {} links to vacant slot {}", level, idx))?;
                if node.level() < level || node.level() > self.max_level() {
                    return Err(format!(
                        "node in slot {} has level {} but is linked at level {} (head level {})",
                        idx,
                        node.level(),
                        level,
                        self.max_level()
                    ));
                }
                if let Some(prev) = prev
                    && prev > &node.entry.key
                {
                    return Err(format!("keys out of order at level {}", level));
                }
                seen += 1;
                if seen > self.len {
                    return Err(format!("level {} holds more nodes than the list", level));
                }
                prev = Some(&node.entry.key);
                cursor = node.forward[level];
            }
            if level == 0 && seen != self.len {
                return Err(format!("level 0 holds {} nodes, length is {}", seen, self.len));
            }
        }
        Ok(())
    }

    /// Predecessors of the first entry not less than `key`, on levels
    /// `0..=top`.
    fn trail<Q>(&self, key: &Q, top: usize) -> Links
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut trail: Links = smallvec![None; top + 1];
        let mut cursor = None;
        for i in (0..=top).rev() {
            while let Some(next) = self.next(cursor, i) {
                if self.compare(next, key) != Ordering::Less {
                    break;
                }
                cursor = Some(next);
            }
            trail[i] = cursor;
        }
        trail
    }

    fn compare<Q>(&self, idx: usize, key: &Q) -> Ordering
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        Ord::cmp(self.node(idx).entry.key.borrow(), key)
    }

    fn next(&self, from: Option<usize>, level: usize) -> Option<usize> {
        match from {
            None => self.head[level],
            Some(idx) => self.node(idx).forward[level],
        }
    }

    fn set_next(&mut self, from: Option<usize>, level: usize, to: Option<usize>) {
        match from {
            None => self.head[level] = to,
            Some(idx) => self.node_mut(idx).forward[level] = to,
        }
    }

    fn alloc(&mut self, node: SkipNode<K, V>) -> usize {
        match self.free.pop() {
            Some(idx) => {
                self.nodes[idx] = Some(node);
                idx
            }
            None => {
                self.nodes.push(Some(node));
                self.nodes.len() - 1
            }
        }
    }

    fn node(&self, idx: usize) -> &SkipNode<K, V> {
        match &self.nodes[idx] {
            Some(node) => node,
            None => unreachable!("skip list link to vacant slot {}", idx),
        }
    }

    fn node_mut(&mut self, idx: usize) -> &mut SkipNode<K, V> {
        match &mut self.nodes[idx] {
            Some(node) => node,
            None => unreachable!("skip list link to vacant slot {}", idx),
        }
    }
}

/// Level-0 iterator over a [`SkipList`].
pub struct Iter<'a, K, V> {
    nodes: &'a [Option<SkipNode<K, V>>],
    next: Option<usize>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = &'a Entry<K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.nodes[self.next?].as_ref()?;
        self.next = node.forward[0];
        self.remaining -= 1;
        Some(&node.entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<'a, K: Ord, V, R: Rng> IntoIterator for &'a SkipList<K, V, R> {
    type Item = &'a Entry<K, V>;
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
