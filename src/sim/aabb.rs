//! Axis-aligned bounding boxes
//!
//! Every hitbox in the game is a rectangle with a top-left origin (screen
//! coordinates, y grows downward).

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Top-left corner
    pub pos: Vec2,
    /// Width and height
    pub size: Vec2,
}

impl Aabb {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self { pos, size }
    }

    pub fn from_xywh(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self::new(Vec2::new(x, y), Vec2::new(w, h))
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// Strict overlap test; rectangles that only share an edge do not touch
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_overlap_basic() {
        let a = Aabb::from_xywh(0.0, 0.0, 10.0, 10.0);
        let b = Aabb::from_xywh(5.0, 5.0, 10.0, 10.0);
        let c = Aabb::from_xywh(20.0, 0.0, 10.0, 10.0);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_shared_edge_is_not_overlap() {
        let a = Aabb::from_xywh(0.0, 0.0, 10.0, 10.0);
        let right = Aabb::from_xywh(10.0, 0.0, 10.0, 10.0);
        let below = Aabb::from_xywh(0.0, 10.0, 10.0, 10.0);
        assert!(!a.overlaps(&right));
        assert!(!a.overlaps(&below));
    }

    #[test]
    fn test_containment_overlaps() {
        let outer = Aabb::from_xywh(0.0, 0.0, 100.0, 100.0);
        let inner = Aabb::from_xywh(40.0, 40.0, 5.0, 15.0);
        assert!(outer.overlaps(&inner));
        assert!(inner.overlaps(&outer));
    }

    #[test]
    fn test_center() {
        let a = Aabb::from_xywh(10.0, 20.0, 30.0, 40.0);
        assert_eq!(a.center(), Vec2::new(25.0, 40.0));
    }

    fn rect() -> impl Strategy<Value = Aabb> {
        (-500.0f32..500.0, -500.0f32..500.0, 0.0f32..100.0, 0.0f32..100.0)
            .prop_map(|(x, y, w, h)| Aabb::from_xywh(x, y, w, h))
    }

    proptest! {
        #[test]
        fn overlap_is_symmetric(a in rect(), b in rect()) {
            prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
        }

        #[test]
        fn separated_on_x_never_overlaps(a in rect(), gap in 0.0f32..50.0, y in -500.0f32..500.0) {
            let b = Aabb::from_xywh(a.right() + gap, y, 10.0, 10.0);
            prop_assert!(!a.overlaps(&b));
        }
    }
}
