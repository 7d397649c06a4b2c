//! Subdivision of the open space left around the presets
//!
//! The presets are cut out of the full area, leaving a set of disjoint
//! rectangles. The largest of those is then split in two, perpendicular to its
//! longer side, until the requested number of regions exists.

use glam::Vec2;
use rand::Rng;
use tracing::{debug, warn};

use crate::config::SizeRange;
use crate::geometry::Rect;
use crate::region::PlacedRegion;

/// Rectangles whose longer side is below this are not split any further.
const MIN_SPLIT_EXTENT: f32 = 1.0;

/// Cover `full_area` minus every preset with disjoint rectangles
pub fn open_space(full_area: &Rect, presets: &[PlacedRegion]) -> Vec<Rect> {
    presets.iter().fold(vec![*full_area], |remaining, preset| {
        remaining
            .iter()
            .flat_map(|rect| rect.subtract(&preset.rect))
            .collect()
    })
}

/// Split the open space into `target` regions
///
/// Starts from [`open_space`] and repeatedly splits the largest rectangle
/// (the first one on ties) whose longer side is at least `MIN_SPLIT_EXTENT`. Tall rectangles are cut across y with an offset
/// from `split_height`, wide ones across x with an offset from `split_width`.
/// A side shorter than twice the range minimum is cut in half instead.
///
/// # Returns
///
/// The open regions. There are more than `target` when subtracting the
/// presets already produced more pieces, and fewer when the space ran out
/// (no open space, or only slivers left); the latter is logged and returned
/// as is.
pub fn subdivide<R: Rng + ?Sized>(
    full_area: &Rect,
    presets: &[PlacedRegion],
    target: usize,
    split_width: &SizeRange,
    split_height: &SizeRange,
    rng: &mut R,
) -> Vec<Rect> {
    let mut regions = open_space(full_area, presets);
    debug!(
        target: "region_partition",
        "open space has {} rectangles around {} presets",
        regions.len(),
        presets.len()
    );

    while regions.len() < target {
        let Some(index) = largest_splittable_index(&regions) else {
            break;
        };
        let largest = regions[index];

        let (first, second) = split_rect(&largest, split_width, split_height, rng);
        regions.remove(index);
        regions.push(first);
        regions.push(second);
    }

    if regions.len() < target {
        warn!(
            target: "region_partition",
            "open space could only be divided into {} of {} requested regions",
            regions.len(),
            target
        );
    }
    regions
}

/// Cut `rect` in two perpendicular to its longer side
///
/// Returns the lower/left part first.
pub fn split_rect<R: Rng + ?Sized>(
    rect: &Rect,
    split_width: &SizeRange,
    split_height: &SizeRange,
    rng: &mut R,
) -> (Rect, Rect) {
    if rect.height() >= rect.width() {
        let y = rect.min.y + split_offset(rect.height(), split_height, rng);
        (
            Rect {
                min: rect.min,
                max: Vec2::new(rect.max.x, y),
            },
            Rect {
                min: Vec2::new(rect.min.x, y),
                max: rect.max,
            },
        )
    } else {
        let x = rect.min.x + split_offset(rect.width(), split_width, rng);
        (
            Rect {
                min: rect.min,
                max: Vec2::new(x, rect.max.y),
            },
            Rect {
                min: Vec2::new(x, rect.min.y),
                max: rect.max,
            },
        )
    }
}

fn split_offset<R: Rng + ?Sized>(total: f32, range: &SizeRange, rng: &mut R) -> f32 {
    if total < 2.0 * range.min {
        return total * 0.5;
    }
    let upper = range.max.min(total - range.min);
    rng.gen_range(range.min..=upper)
}

fn is_splittable(rect: &Rect) -> bool {
    rect.width().max(rect.height()) >= MIN_SPLIT_EXTENT && rect.area() > 0.0
}

/// Largest rectangle that can still be split, the first one on ties
fn largest_splittable_index(regions: &[Rect]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, rect) in regions.iter().enumerate().filter(|(_, r)| is_splittable(r)) {
        let area = rect.area();
        if best.map_or(true, |(_, best_area)| area > best_area) {
            best = Some((i, area));
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::RegionType;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn square(size: f32) -> Rect {
        Rect::new(Vec2::ZERO, Vec2::splat(size))
    }

    fn preset(x0: f32, y0: f32, x1: f32, y1: f32) -> PlacedRegion {
        PlacedRegion::new(Rect::new(Vec2::new(x0, y0), Vec2::new(x1, y1)), RegionType::PlayerStart)
    }

    fn assert_disjoint(rects: &[Rect]) {
        for (i, a) in rects.iter().enumerate() {
            for b in &rects[i + 1..] {
                assert!(!a.intersects(b), "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn test_empty_area_split_into_four() {
        let full = square(800.0);
        let range = SizeRange::new(100.0, 500.0);
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let regions = subdivide(&full, &[], 4, &range, &range, &mut rng);

        assert_eq!(regions.len(), 4);
        let total: f32 = regions.iter().map(Rect::area).sum();
        assert!((total - 640_000.0).abs() < 2.0, "area sum {total}");
        assert_disjoint(&regions);
        assert!(regions.iter().all(|r| full.contains_rect(r)));
    }

    #[test]
    fn test_open_space_excludes_presets() {
        let full = square(1000.0);
        let presets = [preset(100.0, 100.0, 300.0, 300.0), preset(600.0, 500.0, 900.0, 1000.0)];

        let open = open_space(&full, &presets);
        let total: f32 = open.iter().map(Rect::area).sum();
        assert_eq!(total, 1_000_000.0 - 40_000.0 - 150_000.0);
        assert_disjoint(&open);
        for rect in &open {
            assert!(presets.iter().all(|p| !p.rect.intersects(rect)));
        }
    }

    #[test]
    fn test_subdivision_tiles_area_with_presets() {
        let full = square(1000.0);
        let presets = [preset(0.0, 0.0, 200.0, 200.0), preset(500.0, 400.0, 700.0, 600.0)];
        let range = SizeRange::new(50.0, 400.0);
        let mut rng = ChaCha8Rng::seed_from_u64(9);

        let regions = subdivide(&full, &presets, 12, &range, &range, &mut rng);
        assert_eq!(regions.len(), 12);

        let mut all: Vec<Rect> = regions.clone();
        all.extend(presets.iter().map(|p| p.rect));
        assert_disjoint(&all);
        let total: f32 = all.iter().map(Rect::area).sum();
        assert!((total - full.area()).abs() < 5.0);
    }

    #[test]
    fn test_target_below_open_pieces_keeps_pieces() {
        let full = square(1000.0);
        let presets = [preset(400.0, 400.0, 600.0, 600.0)];
        let range = SizeRange::new(50.0, 400.0);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let regions = subdivide(&full, &presets, 2, &range, &range, &mut rng);
        assert_eq!(regions.len(), 4);
    }

    #[test]
    fn test_fully_covered_area_is_underfilled() {
        let full = square(100.0);
        let presets = [preset(0.0, 0.0, 100.0, 100.0)];
        let range = SizeRange::new(10.0, 50.0);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        assert!(subdivide(&full, &presets, 5, &range, &range, &mut rng).is_empty());
    }

    #[test]
    fn test_slivers_stop_subdivision() {
        let full = Rect::new(Vec2::ZERO, Vec2::new(1.5, 1.5));
        let range = SizeRange::new(10.0, 50.0);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let regions = subdivide(&full, &[], 64, &range, &range, &mut rng);
        assert!(regions.len() < 64);
        let total: f32 = regions.iter().map(Rect::area).sum();
        assert!((total - 2.25).abs() < 1e-4);
    }

    #[test]
    fn test_split_orientation_and_midpoint_fallback() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let range = SizeRange::new(80.0, 200.0);

        // tall: cut across y, too short for two minimums so halves
        let tall = Rect::new(Vec2::ZERO, Vec2::new(50.0, 100.0));
        let (low, high) = split_rect(&tall, &range, &range, &mut rng);
        assert_eq!(low.max, Vec2::new(50.0, 50.0));
        assert_eq!(high.min, Vec2::new(0.0, 50.0));

        // wide: cut across x at an offset inside the range
        let wide = Rect::new(Vec2::ZERO, Vec2::new(1000.0, 100.0));
        let (left, right) = split_rect(&wide, &range, &range, &mut rng);
        assert!(left.width() >= 80.0 && left.width() <= 200.0);
        assert_eq!(left.height(), 100.0);
        assert_eq!(left.max.x, right.min.x);
        assert_eq!(right.max, wide.max);
    }

    #[test]
    fn test_split_leaves_room_for_minimum() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let range = SizeRange::new(100.0, 1000.0);
        let rect = Rect::new(Vec2::ZERO, Vec2::new(250.0, 10.0));
        for _ in 0..50 {
            let (left, right) = split_rect(&rect, &range, &range, &mut rng);
            assert!(left.width() >= 100.0);
            assert!(right.width() >= 100.0 - 1e-3);
        }
    }

    #[test]
    fn test_largest_splittable_prefers_first_on_ties() {
        let rects = [square(10.0), square(20.0), square(20.0)];
        assert_eq!(largest_splittable_index(&rects), Some(1));
        assert_eq!(largest_splittable_index(&[]), None);
    }

    #[test]
    fn test_long_sliver_is_split_past_small_square() {
        let sliver = Rect::new(Vec2::ZERO, Vec2::new(3.0, 0.1));
        assert_eq!(largest_splittable_index(&[square(0.9), sliver]), Some(1));
        assert_eq!(largest_splittable_index(&[square(0.9)]), None);

        // open space: a 3.0 x 0.1 sliver below a 0.9 x 0.9 square
        let full = Rect::new(Vec2::ZERO, Vec2::new(3.0, 1.0));
        let presets = [preset(0.9, 0.1, 3.0, 1.0)];
        let range = SizeRange::new(0.5, 2.0);
        let mut rng = ChaCha8Rng::seed_from_u64(4);

        let regions = subdivide(&full, &presets, 3, &range, &range, &mut rng);
        assert_eq!(regions.len(), 3);
    }
}
