//! Playfield border
//!
//! A rectangle derived from the camera viewport plus a margin. Entities ask
//! it whether they are still inside, where to reappear when they wrap, and
//! where hazards should enter from.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::tuning::BorderConfig;
use crate::uniform;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Borders {
    pub min: Vec2,
    pub max: Vec2,
}

impl Borders {
    /// Border around a viewport centred on the origin
    pub fn from_viewport(half_extents: Vec2, margin: f32) -> Self {
        Self {
            min: -half_extents - Vec2::splat(margin),
            max: half_extents + Vec2::splat(margin),
        }
    }

    pub fn from_config(config: &BorderConfig) -> Self {
        Self::from_viewport(
            Vec2::new(config.viewport_half_width, config.viewport_half_height),
            config.margin,
        )
    }

    /// True iff `pos` lies inside the border grown by `offset` (edges included)
    pub fn within(&self, pos: Vec2, offset: f32) -> bool {
        let x_ok = pos.x >= self.min.x - offset && pos.x <= self.max.x + offset;
        let y_ok = pos.y >= self.min.y - offset && pos.y <= self.max.y + offset;
        x_ok && y_ok
    }

    /// Mirror `pos` to the opposite edge. Left, right, top, bottom are checked
    /// in that order; a corner exit resolves horizontally.
    pub fn opposite_position(&self, pos: Vec2, offset: f32) -> Vec2 {
        if pos.x <= self.min.x - offset {
            Vec2::new(self.max.x + offset, pos.y)
        } else if pos.x >= self.max.x + offset {
            Vec2::new(self.min.x - offset, pos.y)
        } else if pos.y >= self.max.y + offset {
            Vec2::new(pos.x, self.min.y - offset)
        } else if pos.y <= self.min.y - offset {
            Vec2::new(pos.x, self.max.y + offset)
        } else {
            pos
        }
    }

    /// Uniformly pick a side, then a point along it inset by `offset`
    /// (negative offsets place the point outside the border)
    pub fn random_point_on_border(&self, offset: f32, rng: &mut impl Rng) -> Vec2 {
        match rng.random_range(0..4u32) {
            // Left
            0 => Vec2::new(self.min.x + offset, uniform(rng, self.min.y, self.max.y)),
            // Top
            1 => Vec2::new(uniform(rng, self.min.x, self.max.x), self.max.y - offset),
            // Right
            2 => Vec2::new(self.max.x - offset, uniform(rng, self.min.y, self.max.y)),
            // Bottom
            _ => Vec2::new(uniform(rng, self.min.x, self.max.x), self.min.y + offset),
        }
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn borders() -> Borders {
        Borders::from_viewport(Vec2::new(10.0, 5.0), 1.0)
    }

    #[test]
    fn test_within_includes_edges_and_offset() {
        let b = borders();
        assert!(b.within(Vec2::ZERO, 0.0));
        assert!(b.within(Vec2::new(11.0, 0.0), 0.0));
        assert!(!b.within(Vec2::new(11.5, 0.0), 0.0));
        assert!(b.within(Vec2::new(11.5, 0.0), 1.0));
        assert!(!b.within(Vec2::new(0.0, -6.5), 1.0));
    }

    #[test]
    fn test_opposite_each_side() {
        let b = borders();
        assert_eq!(b.opposite_position(Vec2::new(-12.0, 2.0), 0.0), Vec2::new(11.0, 2.0));
        assert_eq!(b.opposite_position(Vec2::new(12.0, 2.0), 0.0), Vec2::new(-11.0, 2.0));
        assert_eq!(b.opposite_position(Vec2::new(3.0, 7.0), 0.0), Vec2::new(3.0, -6.0));
        assert_eq!(b.opposite_position(Vec2::new(3.0, -7.0), 0.0), Vec2::new(3.0, 6.0));
    }

    #[test]
    fn test_opposite_corner_prefers_horizontal() {
        let b = borders();
        let p = b.opposite_position(Vec2::new(-12.0, 9.0), 0.0);
        assert_eq!(p, Vec2::new(11.0, 9.0));
    }

    #[test]
    fn test_wrapped_point_is_inside() {
        let b = borders();
        let p = b.opposite_position(Vec2::new(-11.5, 0.0), 0.5);
        assert!(b.within(p, 0.5));
    }

    #[test]
    fn test_zero_offset_point_lies_on_edge() {
        let b = borders();
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..64 {
            let p = b.random_point_on_border(0.0, &mut rng);
            let on_edge = p.x == b.min.x || p.x == b.max.x || p.y == b.min.y || p.y == b.max.y;
            assert!(on_edge, "{p:?} not on an edge");
            assert!(b.within(p, 0.0));
        }
    }

    proptest! {
        #[test]
        fn prop_random_border_point_contained(seed in any::<u64>(), offset in 0.0f32..3.0) {
            let b = borders();
            let mut rng = Pcg32::seed_from_u64(seed);
            let p = b.random_point_on_border(offset, &mut rng);
            prop_assert!(b.within(p, offset));
        }
    }
}
