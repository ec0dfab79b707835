// ============================================================================
// Price Tree
// Red-black tree keyed by price, nodes stored in a slab arena
// ============================================================================
//
// Parent/child links are arena indices, so the back-links never form
// reference cycles. Insert and delete repair run as explicit loops over
// index lookups rather than recursion.
//
// Invariants between any two public calls:
// - the root is black
// - a red node never has a red child
// - every root-to-leaf path holds the same number of black nodes
// - in-order traversal yields strictly increasing prices

use crate::numeric::Price;
use slab::Slab;
use std::cmp::Ordering;
use std::mem;

type NodeId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    Red,
    Black,
}

#[derive(Debug)]
struct Node<V> {
    price: Price,
    value: V,
    left: Option<NodeId>,
    right: Option<NodeId>,
    parent: Option<NodeId>,
    color: Color,
}

/// Ordered price index with O(log n) insert, delete and neighbour queries.
#[derive(Debug)]
pub struct PriceTree<V> {
    nodes: Slab<Node<V>>,
    root: Option<NodeId>,
}

impl<V> Default for PriceTree<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> PriceTree<V> {
    pub fn new() -> Self {
        Self {
            nodes: Slab::new(),
            root: None,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn get(&self, price: Price) -> Option<&V> {
        self.lookup(price).map(|id| &self.nodes[id].value)
    }

    pub fn contains(&self, price: Price) -> bool {
        self.lookup(price).is_some()
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Lowest price in the tree
    pub fn min(&self) -> Option<(Price, &V)> {
        self.root.map(|root| self.entry(self.min_from(root)))
    }

    /// Highest price in the tree
    pub fn max(&self) -> Option<(Price, &V)> {
        self.root.map(|root| self.entry(self.max_from(root)))
    }

    /// Nearest entry with a price strictly below `price`.
    pub fn less_than(&self, price: Price) -> Option<(Price, &V)> {
        let mut cursor = self.root;
        let mut best = None;

        while let Some(id) = cursor {
            if price > self.nodes[id].price {
                best = Some(id);
                cursor = self.nodes[id].right;
            } else {
                cursor = self.nodes[id].left;
            }
        }

        best.map(|id| self.entry(id))
    }

    /// Nearest entry with a price strictly above `price`.
    pub fn greater_than(&self, price: Price) -> Option<(Price, &V)> {
        let mut cursor = self.root;
        let mut best = None;

        while let Some(id) = cursor {
            if price < self.nodes[id].price {
                best = Some(id);
                cursor = self.nodes[id].left;
            } else {
                cursor = self.nodes[id].right;
            }
        }

        best.map(|id| self.entry(id))
    }

    /// Number of nodes on the longest root-to-leaf path.
    pub fn height(&self) -> usize {
        fn walk<V>(tree: &PriceTree<V>, node: Option<NodeId>) -> usize {
            match node {
                None => 0,
                Some(id) => {
                    let n = &tree.nodes[id];
                    1 + walk(tree, n.left).max(walk(tree, n.right))
                },
            }
        }
        walk(self, self.root)
    }

    // ========================================================================
    // Insert
    // ========================================================================

    /// Insert `value` at `price`, returning the previous value if the price
    /// was already present.
    pub fn put(&mut self, price: Price, value: V) -> Option<V> {
        let mut parent = None;
        let mut cursor = self.root;
        let mut attach_left = false;

        while let Some(id) = cursor {
            match price.cmp(&self.nodes[id].price) {
                Ordering::Equal => {
                    return Some(mem::replace(&mut self.nodes[id].value, value));
                },
                Ordering::Less => {
                    attach_left = true;
                    cursor = self.nodes[id].left;
                },
                Ordering::Greater => {
                    attach_left = false;
                    cursor = self.nodes[id].right;
                },
            }
            parent = Some(id);
        }

        let id = self.nodes.insert(Node {
            price,
            value,
            left: None,
            right: None,
            parent,
            color: Color::Red,
        });

        match parent {
            None => self.root = Some(id),
            Some(p) if attach_left => self.nodes[p].left = Some(id),
            Some(p) => self.nodes[p].right = Some(id),
        }

        self.insert_fixup(id);
        None
    }

    fn insert_fixup(&mut self, mut node: NodeId) {
        loop {
            let Some(mut parent) = self.nodes[node].parent else {
                self.nodes[node].color = Color::Black;
                return;
            };

            if self.nodes[parent].color == Color::Black {
                return;
            }

            // A red parent is never the root, so the grandparent exists.
            let Some(grandparent) = self.nodes[parent].parent else {
                self.nodes[parent].color = Color::Black;
                return;
            };

            let parent_is_left = self.nodes[grandparent].left == Some(parent);
            let uncle = if parent_is_left {
                self.nodes[grandparent].right
            } else {
                self.nodes[grandparent].left
            };

            if let Some(uncle) = uncle.filter(|&u| self.nodes[u].color == Color::Red) {
                self.nodes[parent].color = Color::Black;
                self.nodes[uncle].color = Color::Black;
                self.nodes[grandparent].color = Color::Red;
                node = grandparent;
                continue;
            }

            // Straighten a zig-zag so node, parent and grandparent line up.
            if parent_is_left && self.nodes[parent].right == Some(node) {
                self.rotate_left(parent);
                mem::swap(&mut node, &mut parent);
            } else if !parent_is_left && self.nodes[parent].left == Some(node) {
                self.rotate_right(parent);
                mem::swap(&mut node, &mut parent);
            }

            self.nodes[parent].color = Color::Black;
            self.nodes[grandparent].color = Color::Red;
            if parent_is_left {
                self.rotate_right(grandparent);
            } else {
                self.rotate_left(grandparent);
            }
            return;
        }
    }

    // ========================================================================
    // Delete
    // ========================================================================

    /// Remove `price` from the tree, returning its value.
    pub fn remove(&mut self, price: Price) -> Option<V> {
        let mut node = self.lookup(price)?;

        // Two children: take over the in-order predecessor's entry and
        // physically unlink the predecessor instead.
        if let (Some(left), Some(_)) = (self.nodes[node].left, self.nodes[node].right) {
            let predecessor = self.max_from(left);
            if let Some((target, source)) = self.nodes.get2_mut(node, predecessor) {
                mem::swap(&mut target.price, &mut source.price);
                mem::swap(&mut target.value, &mut source.value);
            }
            node = predecessor;
        }

        let child = self.nodes[node].left.or(self.nodes[node].right);

        if self.nodes[node].color == Color::Black {
            match child.filter(|&c| self.nodes[c].color == Color::Red) {
                Some(red_child) => self.nodes[red_child].color = Color::Black,
                // The node is still linked and stands in for the missing
                // black while the repair runs.
                None => self.delete_fixup(node),
            }
        }

        self.replace_node(node, child);
        if let Some(root) = self.root {
            self.nodes[root].color = Color::Black;
        }

        Some(self.nodes.remove(node).value)
    }

    /// Repair a path that is one black node short at `node`.
    fn delete_fixup(&mut self, mut node: NodeId) {
        // Case 1: the deficiency reached the root and vanishes.
        while let Some(parent) = self.nodes[node].parent {
            let node_is_left = self.nodes[parent].left == Some(node);
            let mut sibling = self.sibling(node, parent);

            // Case 2: red sibling, rotate it above the parent.
            if self.nodes[sibling].color == Color::Red {
                self.nodes[parent].color = Color::Red;
                self.nodes[sibling].color = Color::Black;
                if node_is_left {
                    self.rotate_left(parent);
                } else {
                    self.rotate_right(parent);
                }
                sibling = self.sibling(node, parent);
            }

            let (near, far) = if node_is_left {
                (self.nodes[sibling].left, self.nodes[sibling].right)
            } else {
                (self.nodes[sibling].right, self.nodes[sibling].left)
            };

            if self.color(near) == Color::Black && self.color(far) == Color::Black {
                self.nodes[sibling].color = Color::Red;

                if self.nodes[parent].color == Color::Black {
                    // Case 3: push the deficiency up one level.
                    node = parent;
                    continue;
                }

                // Case 4: a red parent absorbs it.
                self.nodes[parent].color = Color::Black;
                return;
            }

            // Case 5: only the near nephew is red, rotate it into the
            // sibling position so the far nephew becomes red.
            if self.color(far) == Color::Black {
                if let Some(near) = near {
                    self.nodes[sibling].color = Color::Red;
                    self.nodes[near].color = Color::Black;
                    if node_is_left {
                        self.rotate_right(sibling);
                    } else {
                        self.rotate_left(sibling);
                    }
                    sibling = near;
                }
            }

            // Case 6: far nephew is red, rotate at the parent.
            let far = if node_is_left {
                self.nodes[sibling].right
            } else {
                self.nodes[sibling].left
            };
            self.nodes[sibling].color = self.nodes[parent].color;
            self.nodes[parent].color = Color::Black;
            if let Some(far) = far {
                self.nodes[far].color = Color::Black;
            }
            if node_is_left {
                self.rotate_left(parent);
            } else {
                self.rotate_right(parent);
            }
            return;
        }
    }

    // ========================================================================
    // Structural helpers
    // ========================================================================

    fn entry(&self, id: NodeId) -> (Price, &V) {
        let node = &self.nodes[id];
        (node.price, &node.value)
    }

    fn lookup(&self, price: Price) -> Option<NodeId> {
        let mut cursor = self.root;
        while let Some(id) = cursor {
            cursor = match price.cmp(&self.nodes[id].price) {
                Ordering::Equal => return Some(id),
                Ordering::Less => self.nodes[id].left,
                Ordering::Greater => self.nodes[id].right,
            };
        }
        None
    }

    fn min_from(&self, mut id: NodeId) -> NodeId {
        while let Some(left) = self.nodes[id].left {
            id = left;
        }
        id
    }

    fn max_from(&self, mut id: NodeId) -> NodeId {
        while let Some(right) = self.nodes[id].right {
            id = right;
        }
        id
    }

    /// Missing nodes count as black.
    fn color(&self, node: Option<NodeId>) -> Color {
        node.map_or(Color::Black, |id| self.nodes[id].color)
    }

    fn sibling(&self, node: NodeId, parent: NodeId) -> NodeId {
        let sibling = if self.nodes[parent].left == Some(node) {
            self.nodes[parent].right
        } else {
            self.nodes[parent].left
        };
        match sibling {
            Some(sibling) => sibling,
            // A black non-root node always has a sibling holding the
            // matching black height.
            None => unreachable!("red-black tree: black node without sibling"),
        }
    }

    /// Put `new` where `old` hangs from its parent (or at the root).
    fn replace_node(&mut self, old: NodeId, new: Option<NodeId>) {
        let parent = self.nodes[old].parent;
        match parent {
            None => self.root = new,
            Some(p) if self.nodes[p].left == Some(old) => self.nodes[p].left = new,
            Some(p) => self.nodes[p].right = new,
        }
        if let Some(new) = new {
            self.nodes[new].parent = parent;
        }
    }

    fn rotate_left(&mut self, node: NodeId) {
        let Some(right) = self.nodes[node].right else {
            return;
        };
        self.replace_node(node, Some(right));

        let inner = self.nodes[right].left;
        self.nodes[node].right = inner;
        if let Some(inner) = inner {
            self.nodes[inner].parent = Some(node);
        }

        self.nodes[right].left = Some(node);
        self.nodes[node].parent = Some(right);
    }

    fn rotate_right(&mut self, node: NodeId) {
        let Some(left) = self.nodes[node].left else {
            return;
        };
        self.replace_node(node, Some(left));

        let inner = self.nodes[left].right;
        self.nodes[node].left = inner;
        if let Some(inner) = inner {
            self.nodes[inner].parent = Some(node);
        }

        self.nodes[left].right = Some(node);
        self.nodes[node].parent = Some(left);
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Check every structural invariant, returning the black height.
    pub fn validate(&self) -> Result<usize, String> {
        let Some(root) = self.root else {
            return if self.nodes.is_empty() {
                Ok(0)
            } else {
                Err(format!("empty tree holds {} orphaned nodes", self.nodes.len()))
            };
        };

        if self.nodes[root].parent.is_some() {
            return Err("root has a parent link".to_string());
        }
        if self.nodes[root].color != Color::Black {
            return Err("root is red".to_string());
        }

        let mut visited = 0;
        let black_height = self.validate_node(root, None, None, &mut visited)?;

        if visited != self.nodes.len() {
            return Err(format!(
                "{} nodes reachable but {} allocated",
                visited,
                self.nodes.len()
            ));
        }
        Ok(black_height)
    }

    fn validate_node(
        &self,
        id: NodeId,
        lower: Option<Price>,
        upper: Option<Price>,
        visited: &mut usize,
    ) -> Result<usize, String> {
        *visited += 1;
        let node = &self.nodes[id];

        if lower.is_some_and(|low| node.price <= low) || upper.is_some_and(|up| node.price >= up) {
            return Err(format!("price {} out of order", node.price));
        }

        for child in [node.left, node.right].into_iter().flatten() {
            if self.nodes[child].parent != Some(id) {
                return Err(format!("broken parent link below {}", node.price));
            }
            if node.color == Color::Red && self.nodes[child].color == Color::Red {
                return Err(format!("red node {} has a red child", node.price));
            }
        }

        let left = match node.left {
            Some(left) => self.validate_node(left, lower, Some(node.price), visited)?,
            None => 1,
        };
        let right = match node.right {
            Some(right) => self.validate_node(right, Some(node.price), upper, visited)?,
            None => 1,
        };

        if left != right {
            return Err(format!(
                "black height mismatch at {}: {} vs {}",
                node.price, left, right
            ));
        }

        Ok(left + usize::from(node.color == Color::Black))
    }
}
