//! Region quadtree over colliders
//!
//! Rebuilt from scratch every tick: `clear` drops every entry and every child,
//! then the driver re-inserts all live colliders. Items stay at the node that
//! first accepted them. A full node subdivides into four quadrants and later
//! items go to the first quadrant that overlaps them, so nothing is ever moved
//! down the tree.

use glam::Vec2;

use super::collider::Collider;

/// Quadrant order: NW, NE, SW, SE
const QUADRANTS: [Vec2; 4] = [
    Vec2::new(-1.0, 1.0),
    Vec2::new(1.0, 1.0),
    Vec2::new(-1.0, -1.0),
    Vec2::new(1.0, -1.0),
];

/// A quadtree node and, recursively, its children
#[derive(Debug, Clone)]
pub struct QuadTree<T: Copy> {
    /// Region covered by this node (always a box)
    bounds: Collider,
    capacity: usize,
    items: Vec<(T, Collider)>,
    children: Option<Box<[QuadTree<T>; 4]>>,
}

impl<T: Copy> QuadTree<T> {
    /// Build an empty tree covering `bounds` (treated as a box)
    pub fn new(bounds: Collider, capacity: usize) -> Self {
        let half = bounds.half_extents();
        let bounds = Collider::aabb(bounds.position, half.x * 2.0, half.y * 2.0);
        Self {
            bounds,
            capacity: capacity.max(1),
            items: Vec::with_capacity(capacity.max(1)),
            children: None,
        }
    }

    /// Region covered by this node
    pub fn bounds(&self) -> &Collider {
        &self.bounds
    }

    /// Store `item` under its collider
    ///
    /// Fails when the collider does not touch this node's region.
    pub fn insert(&mut self, item: T, collider: Collider) -> bool {
        if !self.bounds.intersects(&collider) {
            return false;
        }

        if self.items.len() < self.capacity {
            self.items.push((item, collider));
            return true;
        }

        let children = self.subdivide();
        children
            .iter_mut()
            .any(|child| child.insert(item, collider))
    }

    /// Every stored item whose collider overlaps `range`
    pub fn query(&self, range: &Collider) -> Vec<T> {
        let mut found = Vec::new();
        self.query_into(range, &mut found);
        found
    }

    /// Like `query` but appends into a caller-owned buffer
    pub fn query_into(&self, range: &Collider, found: &mut Vec<T>) {
        if !self.bounds.intersects(range) {
            return;
        }

        found.extend(
            self.items
                .iter()
                .filter(|(_, collider)| range.intersects(collider))
                .map(|(item, _)| *item),
        );

        if let Some(children) = &self.children {
            for child in children.iter() {
                child.query_into(range, found);
            }
        }
    }

    /// Drop all items and all children
    pub fn clear(&mut self) {
        self.items.clear();
        self.children = None;
    }

    /// Total stored items, including children
    pub fn len(&self) -> usize {
        self.items.len()
            + self
                .children
                .as_ref()
                .map_or(0, |c| c.iter().map(QuadTree::len).sum())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Levels below and including this node
    pub fn depth(&self) -> usize {
        1 + self
            .children
            .as_ref()
            .map_or(0, |c| c.iter().map(QuadTree::depth).max().unwrap_or(0))
    }

    /// Create the four quadrants if missing
    fn subdivide(&mut self) -> &mut [QuadTree<T>; 4] {
        let bounds = self.bounds;
        let capacity = self.capacity;
        self.children.get_or_insert_with(|| {
            let half = bounds.half_extents();
            let quarter = half * 0.5;
            Box::new(QUADRANTS.map(|sign| {
                QuadTree::new(
                    Collider::aabb(bounds.position + sign * quarter, half.x, half.y),
                    capacity,
                )
            }))
        })
    }
}
