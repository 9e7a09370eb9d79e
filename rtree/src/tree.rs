use crate::primitives::Rect;
use std::cmp::Ordering;
use tracing::{debug, info};

/// Anything that can be stored in an [`RTree`] must expose a stable bounding rectangle.
pub trait RTreeItem {
    fn bounds(&self) -> Rect;
}

#[derive(Clone)]
enum RTreeEntry<T> {
    Leaf { bounds: Rect, item: T },
    Node { bounds: Rect, child: Box<RTreeNode<T>> },
}

impl<T> RTreeEntry<T> {
    fn bounds(&self) -> &Rect {
        match self {
            RTreeEntry::Leaf { bounds, .. } => bounds,
            RTreeEntry::Node { bounds, .. } => bounds,
        }
    }
}

#[derive(Clone)]
struct RTreeNode<T> {
    entries: Vec<RTreeEntry<T>>,
    is_leaf: bool,
}

/// A dynamic, mutable R-tree over axis-aligned bounding boxes.
///
/// Supports insertion, deletion and bounding-box intersection search. The only
/// external contract is completeness: [`RTree::search_intersect`] returns a
/// superset of every stored item whose bounds intersect the query rectangle.
pub struct RTree<T> {
    root: RTreeNode<T>,
    max_entries: usize,
    min_entries: usize,
}

impl<T: RTreeItem + Clone> RTree<T> {
    /// Creates an empty tree with the given branching factor.
    ///
    /// # Panics
    ///
    /// Panics if `max_entries` is less than 2 — a tree can't usefully split
    /// nodes with a smaller fanout.
    pub fn new(max_entries: usize) -> Self {
        assert!(max_entries >= 2, "max_entries must be at least 2");
        info!(max_entries, "creating new RTree");
        RTree {
            root: RTreeNode {
                entries: Vec::new(),
                is_leaf: true,
            },
            max_entries,
            min_entries: (max_entries as f64 * 0.4).ceil() as usize,
        }
    }

    pub fn len(&self) -> usize {
        count_leaves(&self.root)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Inserts an item, splitting nodes along the way as needed.
    pub fn insert(&mut self, item: T) {
        let entry = RTreeEntry::Leaf {
            bounds: item.bounds(),
            item,
        };
        self.insert_entry(entry);
    }

    fn insert_entry(&mut self, entry: RTreeEntry<T>) {
        insert_into_node(&mut self.root, entry, self.max_entries);
        if self.root.entries.len() > self.max_entries {
            self.split_root();
        }
    }

    fn split_root(&mut self) {
        debug!("splitting root node");
        let old_entries = std::mem::take(&mut self.root.entries);
        let (group1, group2) = split_entries(old_entries, self.min_entries);
        let child1 = RTreeNode {
            entries: group1,
            is_leaf: self.root.is_leaf,
        };
        let child2 = RTreeNode {
            entries: group2,
            is_leaf: self.root.is_leaf,
        };
        let bounds1 = compute_group_bounds(&child1.entries);
        let bounds2 = compute_group_bounds(&child2.entries);
        self.root.is_leaf = false;
        self.root.entries.push(RTreeEntry::Node {
            bounds: bounds1,
            child: Box::new(child1),
        });
        self.root.entries.push(RTreeEntry::Node {
            bounds: bounds2,
            child: Box::new(child2),
        });
    }

    /// Bulk-loads items via a simple STR-like chunked build. Existing entries are kept.
    pub fn insert_bulk(&mut self, items: Vec<T>) {
        if items.is_empty() {
            return;
        }
        let mut entries: Vec<RTreeEntry<T>> = items
            .into_iter()
            .map(|item| RTreeEntry::Leaf {
                bounds: item.bounds(),
                item,
            })
            .collect();

        while entries.len() > self.max_entries {
            let mut next_level = Vec::new();
            for chunk in entries.chunks(self.max_entries) {
                let child = RTreeNode {
                    entries: chunk.to_vec(),
                    is_leaf: self.root.is_leaf,
                };
                let bounds = compute_group_bounds(&child.entries);
                next_level.push(RTreeEntry::Node {
                    bounds,
                    child: Box::new(child),
                });
            }
            entries = next_level;
            self.root.is_leaf = false;
        }
        self.root.entries.extend(entries);
    }

    /// Returns every stored item whose bounds intersect `rect`.
    pub fn search_intersect(&self, rect: &Rect) -> Vec<&T> {
        let mut result = Vec::new();
        search_node(&self.root, rect, &mut result);
        result
    }

    /// Removes every item whose bounds intersect `bounds` and for which `matches` holds.
    ///
    /// Returns `true` if at least one item was removed.
    pub fn delete(&mut self, bounds: &Rect, matches: &dyn Fn(&T) -> bool) -> bool {
        let mut orphans = Vec::new();
        let deleted = delete_from_node(&mut self.root, bounds, matches, self.min_entries, &mut orphans);

        if deleted {
            for entry in orphans {
                self.insert_entry(entry);
            }
            if !self.root.is_leaf && self.root.entries.len() == 1 {
                if let RTreeEntry::Node { child, .. } = self.root.entries.pop().unwrap() {
                    self.root = *child;
                }
            }
        }
        deleted
    }
}

fn count_leaves<T>(node: &RTreeNode<T>) -> usize {
    if node.is_leaf {
        node.entries.len()
    } else {
        node.entries
            .iter()
            .map(|e| match e {
                RTreeEntry::Node { child, .. } => count_leaves(child),
                RTreeEntry::Leaf { .. } => 1,
            })
            .sum()
    }
}

fn insert_into_node<T: RTreeItem + Clone>(node: &mut RTreeNode<T>, entry: RTreeEntry<T>, max_entries: usize) {
    if node.is_leaf {
        node.entries.push(entry);
        return;
    }

    let best = choose_subtree(node, entry.bounds());
    if let RTreeEntry::Node { bounds, child } = &mut node.entries[best] {
        insert_into_node(child, entry, max_entries);
        if child.entries.len() > max_entries {
            let old_entries = std::mem::take(&mut child.entries);
            let min_entries = (max_entries as f64 * 0.4).ceil() as usize;
            let (group1, group2) = split_entries(old_entries, min_entries);
            let is_leaf = child.is_leaf;
            child.entries = group1;
            *bounds = compute_group_bounds(&child.entries);
            let sibling = RTreeNode {
                entries: group2,
                is_leaf,
            };
            let sibling_bounds = compute_group_bounds(&sibling.entries);
            node.entries.push(RTreeEntry::Node {
                bounds: sibling_bounds,
                child: Box::new(sibling),
            });
        } else {
            *bounds = compute_group_bounds(&child.entries);
        }
    }
}

fn choose_subtree<T>(node: &RTreeNode<T>, bounds: &Rect) -> usize {
    let mut best_index = 0;
    let mut best_enlargement = f64::INFINITY;
    let mut best_area = f64::INFINITY;
    for (i, entry) in node.entries.iter().enumerate() {
        let entry_bounds = entry.bounds();
        let enlargement = entry_bounds.enlargement(bounds);
        let area = entry_bounds.area();
        if enlargement < best_enlargement || (enlargement == best_enlargement && area < best_area) {
            best_enlargement = enlargement;
            best_area = area;
            best_index = i;
        }
    }
    best_index
}

/// Quadratic split: seed two groups with the pair of entries whose combined
/// bounds waste the most area, then place the rest by least enlargement.
fn split_entries<T>(mut entries: Vec<RTreeEntry<T>>, _min_entries: usize) -> (Vec<RTreeEntry<T>>, Vec<RTreeEntry<T>>) {
    if entries.len() < 2 {
        return (entries, Vec::new());
    }

    let (i, j) = pick_seeds(&entries);
    let seed2 = entries.remove(j);
    let seed1 = entries.remove(i);
    let mut group1 = vec![seed1];
    let mut group2 = vec![seed2];
    for entry in entries {
        let bounds1 = compute_group_bounds(&group1);
        let bounds2 = compute_group_bounds(&group2);
        let enlargement1 = bounds1.enlargement(entry.bounds());
        let enlargement2 = bounds2.enlargement(entry.bounds());
        if enlargement1 < enlargement2 {
            group1.push(entry);
        } else {
            group2.push(entry);
        }
    }
    (group1, group2)
}

/// Picks the pair of entries whose shared bounding rectangle wastes the most
/// area relative to the two rectangles taken separately (Guttman's `PickSeeds`).
fn pick_seeds<T>(entries: &[RTreeEntry<T>]) -> (usize, usize) {
    let mut best = (0, 1);
    let mut worst_waste = f64::NEG_INFINITY;
    for i in 0..entries.len() {
        for j in (i + 1)..entries.len() {
            let union = entries[i].bounds().union(entries[j].bounds());
            let waste = union.area() - entries[i].bounds().area() - entries[j].bounds().area();
            if waste > worst_waste {
                worst_waste = waste;
                best = (i, j);
            }
        }
    }
    // Remove the larger index first so the smaller index remains valid.
    if best.0 < best.1 {
        (best.0, best.1)
    } else {
        (best.1, best.0)
    }
}

fn compute_group_bounds<T>(entries: &[RTreeEntry<T>]) -> Rect {
    let mut iter = entries.iter();
    let first = iter.next().expect("group must be non-empty").bounds().clone();
    iter.fold(first, |acc, e| acc.union(e.bounds()))
}

fn search_node<'a, T>(node: &'a RTreeNode<T>, rect: &Rect, result: &mut Vec<&'a T>) {
    if node.is_leaf {
        for entry in &node.entries {
            if let RTreeEntry::Leaf { bounds, item } = entry {
                if bounds.intersects(rect) {
                    result.push(item);
                }
            }
        }
    } else {
        for entry in &node.entries {
            if let RTreeEntry::Node { bounds, child } = entry {
                if bounds.intersects(rect) {
                    search_node(child, rect, result);
                }
            }
        }
    }
}

fn delete_from_node<T: RTreeItem + Clone>(
    node: &mut RTreeNode<T>,
    bounds: &Rect,
    matches: &dyn Fn(&T) -> bool,
    min_entries: usize,
    orphans: &mut Vec<RTreeEntry<T>>,
) -> bool {
    if node.is_leaf {
        let before = node.entries.len();
        node.entries.retain(|entry| match entry {
            RTreeEntry::Leaf { item, .. } => !matches(item),
            RTreeEntry::Node { .. } => true,
        });
        return node.entries.len() < before;
    }

    let mut deleted = false;
    let mut shrink = Vec::new();
    for (i, entry) in node.entries.iter_mut().enumerate() {
        if let RTreeEntry::Node { bounds: child_bounds, child } = entry {
            if child_bounds.intersects(bounds) && delete_from_node(child, bounds, matches, min_entries, orphans) {
                deleted = true;
                if child.entries.len() < min_entries {
                    shrink.push(i);
                } else {
                    *child_bounds = compute_group_bounds(&child.entries);
                }
            }
        }
    }
    for i in shrink.into_iter().rev() {
        if let RTreeEntry::Node { child, .. } = node.entries.remove(i) {
            orphans.extend(child.entries);
        }
    }
    deleted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::Point;

    #[derive(Clone, Debug, PartialEq)]
    struct Item {
        id: u32,
        bounds: Rect,
    }
    impl RTreeItem for Item {
        fn bounds(&self) -> Rect {
            self.bounds
        }
    }

    fn item(id: u32, x: f64, y: f64, w: f64, h: f64) -> Item {
        Item {
            id,
            bounds: Rect::new(Point::new(x, y), w, h).unwrap(),
        }
    }

    #[test]
    fn search_is_complete() {
        let mut tree = RTree::new(4);
        for i in 0..50 {
            tree.insert(item(i, i as f64, i as f64, 1.0, 1.0));
        }
        let query = Rect::new(Point::new(10.0, 10.0), 5.0, 5.0).unwrap();
        let found: Vec<u32> = tree.search_intersect(&query).iter().map(|i| i.id).collect();
        let expected: Vec<u32> = (10..=15).collect();
        for e in expected {
            assert!(found.contains(&e), "missing {e} in {found:?}");
        }
    }

    #[test]
    fn delete_removes_matching_items() {
        let mut tree = RTree::new(4);
        for i in 0..20 {
            tree.insert(item(i, i as f64, 0.0, 1.0, 1.0));
        }
        let target = item(5, 5.0, 0.0, 1.0, 1.0);
        assert!(tree.delete(&target.bounds, &|it: &Item| it.id == 5));
        let query = Rect::new(Point::new(0.0, 0.0), 20.0, 1.0).unwrap();
        let found: Vec<u32> = tree.search_intersect(&query).iter().map(|i| i.id).collect();
        assert!(!found.contains(&5));
        assert_eq!(found.len(), 19);
    }

    #[test]
    fn delete_missing_item_returns_false() {
        let mut tree = RTree::new(4);
        tree.insert(item(1, 0.0, 0.0, 1.0, 1.0));
        let bounds = Rect::new(Point::new(100.0, 100.0), 1.0, 1.0).unwrap();
        assert!(!tree.delete(&bounds, &|it: &Item| it.id == 99));
    }

    #[test]
    fn bulk_insert_matches_incremental() {
        let items: Vec<Item> = (0..30).map(|i| item(i, i as f64, 0.0, 1.0, 1.0)).collect();
        let mut tree = RTree::new(4);
        tree.insert_bulk(items);
        let query = Rect::new(Point::new(0.0, 0.0), 30.0, 1.0).unwrap();
        assert_eq!(tree.search_intersect(&query).len(), 30);
    }

    #[test]
    fn search_is_complete_over_random_rectangles() {
        use rand::Rng;
        use std::collections::HashSet;

        let mut rng = rand::thread_rng();
        let items: Vec<Item> = (0..300)
            .map(|i| {
                let x = rng.gen_range(0.0..100.0);
                let y = rng.gen_range(0.0..100.0);
                let w = rng.gen_range(0.1..5.0);
                let h = rng.gen_range(0.1..5.0);
                item(i, x, y, w, h)
            })
            .collect();

        let mut tree = RTree::new(6);
        for it in items.clone() {
            tree.insert(it);
        }

        for _ in 0..20 {
            let qx = rng.gen_range(0.0..100.0);
            let qy = rng.gen_range(0.0..100.0);
            let query = Rect::new(Point::new(qx, qy), 10.0, 10.0).unwrap();
            let found: HashSet<u32> = tree.search_intersect(&query).iter().map(|it| it.id).collect();
            for it in &items {
                if it.bounds.intersects(&query) {
                    assert!(found.contains(&it.id), "missing {} in {found:?}", it.id);
                }
            }
        }
    }
}
