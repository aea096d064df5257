/// BoundingVolumeTree - dynamic AABB tree for broad-phase queries.
///
/// Binary tree stored in a slot-map arena:
/// - Leaves hold a payload and no children
/// - Internal nodes hold exactly two children and the merge of their volumes
///
/// Insertion descends towards the child whose center is closest (Manhattan
/// distance) to the new volume and pairs the new leaf with the leaf it
/// reaches. There is no global rebalancing: structure only changes locally
/// at the insertion or removal point.
///
/// Leaf handles (`VolumeNodeKey`) stay valid across `update` and become
/// stale after `remove` or `clear`.

use std::collections::VecDeque;
use std::ops::ControlFlow;
use slotmap::{new_key_type, SlotMap};
use super::aabb::{BoundingVolume, AABB};

new_key_type! {
    /// Stable handle to a node of a BoundingVolumeTree.
    pub struct VolumeNodeKey;
}

struct VolumeNode<T, V> {
    volume: V,
    parent: Option<VolumeNodeKey>,
    /// `None` for leaves; internal nodes always have both children.
    children: Option<[VolumeNodeKey; 2]>,
    /// Only leaves carry a payload.
    payload: Option<T>,
}

/// Leaf contents captured by `BoundingVolumeTree::snapshot`.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeSnapshot<T, V = AABB> {
    pub entries: Vec<(V, T)>,
}

/// Dynamic bounding volume hierarchy over payloads `T`.
pub struct BoundingVolumeTree<T, V = AABB> {
    nodes: SlotMap<VolumeNodeKey, VolumeNode<T, V>>,
    root: Option<VolumeNodeKey>,
    leaf_count: usize,
}

impl<T, V: BoundingVolume> BoundingVolumeTree<T, V> {
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            root: None,
            leaf_count: 0,
        }
    }

    /// Number of leaves.
    pub fn len(&self) -> usize {
        self.leaf_count
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Root volume, or the empty sentinel for an empty tree.
    pub fn bounds(&self) -> V {
        match self.root {
            Some(root) => self.nodes[root].volume,
            None => V::empty(),
        }
    }

    pub fn is_leaf(&self, key: VolumeNodeKey) -> bool {
        self.nodes.get(key).is_some_and(|node| node.children.is_none())
    }

    /// Stored volume of a node (leaf or internal).
    pub fn volume(&self, key: VolumeNodeKey) -> Option<&V> {
        self.nodes.get(key).map(|node| &node.volume)
    }

    pub fn payload(&self, leaf: VolumeNodeKey) -> Option<&T> {
        self.nodes.get(leaf).and_then(|node| node.payload.as_ref())
    }

    /// All leaves, in arena order.
    pub fn leaves(&self) -> impl Iterator<Item = (VolumeNodeKey, &V, &T)> + '_ {
        self.nodes
            .iter()
            .filter_map(|(key, node)| node.payload.as_ref().map(|payload| (key, &node.volume, payload)))
    }

    /// Insert a new leaf and return its handle.
    pub fn insert(&mut self, volume: V, payload: T) -> VolumeNodeKey {
        let leaf = self.nodes.insert(VolumeNode {
            volume,
            parent: None,
            children: None,
            payload: Some(payload),
        });
        self.leaf_count += 1;
        self.insert_leaf(leaf);
        leaf
    }

    /// Remove a leaf, returning its payload.
    ///
    /// `leaf` must be a live leaf handle of this tree; anything else is a
    /// caller bug (asserted in debug builds, ignored in release).
    pub fn remove(&mut self, leaf: VolumeNodeKey) -> Option<T> {
        debug_assert!(self.is_leaf(leaf), "remove: {:?} is not a leaf of this tree", leaf);
        if !self.is_leaf(leaf) {
            return None;
        }

        self.detach_leaf(leaf);
        self.leaf_count -= 1;
        self.nodes.remove(leaf).and_then(|node| node.payload)
    }

    /// Move a leaf to a new volume: full removal, then reinsertion.
    ///
    /// The same node is reinserted, so the returned handle equals `leaf`.
    pub fn update(&mut self, leaf: VolumeNodeKey, volume: V) -> VolumeNodeKey {
        debug_assert!(self.is_leaf(leaf), "update: {:?} is not a leaf of this tree", leaf);
        if !self.is_leaf(leaf) {
            return leaf;
        }

        self.detach_leaf(leaf);
        self.nodes[leaf].volume = volume;
        self.insert_leaf(leaf);
        leaf
    }

    /// Fat-box refit: reinsert only if `volume` escaped the stored leaf volume.
    ///
    /// On reinsertion the leaf is stored inflated by `margin`.
    /// Returns whether the tree changed.
    pub fn refit(&mut self, leaf: VolumeNodeKey, volume: V, margin: V::Scalar) -> bool {
        debug_assert!(self.is_leaf(leaf), "refit: {:?} is not a leaf of this tree", leaf);
        match self.nodes.get(leaf) {
            Some(node) if node.children.is_none() => {
                if node.volume.contains(&volume) {
                    return false;
                }
            }
            _ => return false,
        }

        self.update(leaf, volume.inflate(margin));
        true
    }

    /// Drop every node (and with them the payload references).
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.leaf_count = 0;
    }

    /// Visit every payload whose leaf volume intersects `volume`.
    pub fn for_each_leaf_intersecting<F>(&self, volume: &V, visitor: F) -> ControlFlow<()>
    where
        F: FnMut(&T) -> ControlFlow<()>,
    {
        self.for_each_leaf_where(|node_volume| node_volume.intersects(volume), visitor)
    }

    /// Breadth-first traversal pruned by `test`.
    ///
    /// `test` is applied to the root, then to each child before it is
    /// enqueued; leaves that pass are handed to `visitor`. A `Break` from
    /// the visitor stops the traversal at once and is returned.
    pub fn for_each_leaf_where<P, F>(&self, mut test: P, mut visitor: F) -> ControlFlow<()>
    where
        P: FnMut(&V) -> bool,
        F: FnMut(&T) -> ControlFlow<()>,
    {
        let Some(root) = self.root else {
            return ControlFlow::Continue(());
        };
        if !test(&self.nodes[root].volume) {
            return ControlFlow::Continue(());
        }

        let mut queue = VecDeque::new();
        queue.push_back(root);

        while let Some(key) = queue.pop_front() {
            let node = &self.nodes[key];
            match node.children {
                Some(children) => {
                    for child in children {
                        if test(&self.nodes[child].volume) {
                            queue.push_back(child);
                        }
                    }
                }
                None => {
                    if let Some(payload) = &node.payload {
                        if visitor(payload).is_break() {
                            return ControlFlow::Break(());
                        }
                    }
                }
            }
        }

        ControlFlow::Continue(())
    }

    /// Capture every leaf's volume and payload.
    pub fn snapshot(&self) -> TreeSnapshot<T, V>
    where
        T: Clone,
    {
        TreeSnapshot {
            entries: self
                .leaves()
                .map(|(_, volume, payload)| (*volume, payload.clone()))
                .collect(),
        }
    }

    /// Replace the contents with a snapshot; returns the new handles in entry order.
    pub fn restore(&mut self, snapshot: TreeSnapshot<T, V>) -> Vec<VolumeNodeKey> {
        self.clear();
        snapshot
            .entries
            .into_iter()
            .map(|(volume, payload)| self.insert(volume, payload))
            .collect()
    }

    // ===== INTERNAL =====

    /// Link an allocated, detached leaf into the tree.
    fn insert_leaf(&mut self, leaf: VolumeNodeKey) {
        let Some(root) = self.root else {
            self.nodes[leaf].parent = None;
            self.root = Some(leaf);
            return;
        };

        let volume = self.nodes[leaf].volume;

        // Descend to the nearest leaf
        let mut sibling = root;
        while let Some([first, second]) = self.nodes[sibling].children {
            let to_first = volume.proximity(&self.nodes[first].volume);
            let to_second = volume.proximity(&self.nodes[second].volume);
            sibling = if to_first < to_second { first } else { second };
        }

        let previous_parent = self.nodes[sibling].parent;
        let merged = self.nodes[sibling].volume.merge(&volume);
        let internal = self.nodes.insert(VolumeNode {
            volume: merged,
            parent: previous_parent,
            children: Some([sibling, leaf]),
            payload: None,
        });
        self.nodes[sibling].parent = Some(internal);
        self.nodes[leaf].parent = Some(internal);

        let Some(parent) = previous_parent else {
            self.root = Some(internal);
            return;
        };
        self.replace_child(parent, sibling, internal);

        // Grow ancestors until one already encloses the subtree below it
        let mut node = internal;
        let mut ancestor = Some(parent);
        while let Some(current) = ancestor {
            let below = self.nodes[node].volume;
            if self.nodes[current].volume.contains(&below) {
                break;
            }
            self.nodes[current].volume = self.merged_children(current);
            node = current;
            ancestor = self.nodes[current].parent;
        }
    }

    /// Unlink a leaf without freeing it: its sibling takes the parent's place.
    fn detach_leaf(&mut self, leaf: VolumeNodeKey) {
        let Some(parent) = self.nodes[leaf].parent.take() else {
            self.root = None;
            return;
        };

        let sibling = match self.nodes[parent].children {
            Some([first, second]) => if first == leaf { second } else { first },
            None => return,
        };
        let grandparent = self.nodes[parent].parent;

        self.nodes.remove(parent);
        self.nodes[sibling].parent = grandparent;

        let Some(grandparent) = grandparent else {
            self.root = Some(sibling);
            return;
        };
        self.replace_child(grandparent, parent, sibling);

        // Shrink ancestors; stop at the first one whose volume did not change
        let mut ancestor = Some(grandparent);
        while let Some(current) = ancestor {
            let previous = self.nodes[current].volume;
            let refit = self.merged_children(current);
            self.nodes[current].volume = refit;
            if refit == previous {
                break;
            }
            ancestor = self.nodes[current].parent;
        }
    }

    fn replace_child(&mut self, parent: VolumeNodeKey, old: VolumeNodeKey, new: VolumeNodeKey) {
        if let Some(children) = self.nodes[parent].children.as_mut() {
            if children[0] == old {
                children[0] = new;
            } else {
                children[1] = new;
            }
        }
    }

    fn merged_children(&self, key: VolumeNodeKey) -> V {
        match self.nodes[key].children {
            Some([first, second]) => self.nodes[first].volume.merge(&self.nodes[second].volume),
            None => self.nodes[key].volume,
        }
    }
}

impl<T, V: BoundingVolume> Default for BoundingVolumeTree<T, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "bounding_volume_tree_tests.rs"]
mod tests;
