//! Backtracking placement of preset regions
//!
//! Presets are placed one at a time in configuration order. Each preset tries
//! a few random sizes, and for every size walks the grid-aligned positions
//! where it fits. A position is accepted when it keeps the configured minimum
//! gap to every preset placed so far; the search then recurses into the next
//! preset and backtracks when that recursion fails.
//!
//! The first preset walks its positions in shuffled order so different seeds
//! give different layouts. Later presets walk them row by row, which keeps
//! their placement stable once the first preset is fixed.

use std::collections::BTreeMap;

use glam::Vec2;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::{MinDistanceTable, PresetRegionSpec, SizeRange};
use crate::error::{PartitionError, Result};
use crate::geometry::Rect;
use crate::region::{PlacedRegion, RegionType};

/// Slack when counting grid positions, so `free / step` landing a hair below
/// an integer still yields the last position.
const GRID_EPSILON: f32 = 1e-4;

/// Search limits for preset placement
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementOptions {
    /// Number of random sizes tried per preset before giving up on it
    pub max_dimension_attempts: usize,
    /// Upper bound on candidate positions evaluated over the whole search
    ///
    /// `None` bounds the search only by the attempt and grid limits, which
    /// can be exponential in the number of presets.
    pub max_candidate_checks: Option<u64>,
}

impl Default for PlacementOptions {
    fn default() -> Self {
        Self {
            max_dimension_attempts: 10,
            max_candidate_checks: None,
        }
    }
}

/// Place every preset inside `full_area` honoring the distance table
///
/// # Arguments
///
/// * `specs` - Presets to place, in order
/// * `full_area` - Area the presets must fit in
/// * `min_distances` - Required gaps between preset types
/// * `grid_step` - Grid spacing for sizes and positions
/// * `options` - Search limits
/// * `rng` - Random stream for sizes and the first preset's position order
///
/// # Returns
///
/// All placed presets in spec order, or `Infeasible` when the search could not
/// place all of them. Nothing is returned for partial placements.
pub fn place_presets<R: Rng + ?Sized>(
    specs: &[PresetRegionSpec],
    full_area: &Rect,
    min_distances: &MinDistanceTable,
    grid_step: f32,
    options: &PlacementOptions,
    rng: &mut R,
) -> Result<Vec<PlacedRegion>> {
    let mut search = PresetSearch {
        specs,
        full_area,
        min_distances,
        grid_step,
        options,
        rng,
        placed: Vec::with_capacity(specs.len()),
        checks: 0,
        deepest: 0,
    };

    match search.place_from(0) {
        SearchOutcome::Complete => {
            debug!(
                target: "region_partition",
                "placed {} presets after {} candidate checks",
                search.placed.len(),
                search.checks
            );
            Ok(search.placed)
        }
        outcome => {
            debug!(
                target: "region_partition",
                "preset placement failed ({:?}) after {} candidate checks, deepest {}/{}",
                outcome,
                search.checks,
                search.deepest,
                specs.len()
            );
            Err(PartitionError::Infeasible {
                placed: search.deepest,
                total: specs.len(),
            })
        }
    }
}

/// Attach the configured tag to each placed preset whose type has one
pub fn apply_preset_tags(placed: &mut [PlacedRegion], tags: &BTreeMap<RegionType, String>) {
    for region in placed {
        region.tag = tags.get(&region.region_type).cloned();
    }
}

/// Sample a dimension from `range`, floored to a multiple of `step` and at
/// least one step.
pub fn sample_dimension<R: Rng + ?Sized>(range: &SizeRange, step: f32, rng: &mut R) -> f32 {
    let raw = rng.gen_range(range.min..=range.max);
    ((raw / step).floor() * step).max(step)
}

/// Bottom-left corners, on the grid anchored at `full_area.min`, where a
/// region of `size` fits inside `full_area`
///
/// Positions are produced lazily, row by row (increasing y, then increasing x
/// within a row).
pub fn grid_positions(size: Vec2, full_area: Rect, grid_step: f32) -> impl Iterator<Item = Vec2> {
    let free = full_area.size() - size;
    let (columns, rows) = if free.x < 0.0 || free.y < 0.0 {
        (0, 0)
    } else {
        (
            (free.x / grid_step + GRID_EPSILON).floor() as usize + 1,
            (free.y / grid_step + GRID_EPSILON).floor() as usize + 1,
        )
    };

    (0..rows).flat_map(move |row| {
        (0..columns)
            .map(move |column| full_area.min + Vec2::new(column as f32, row as f32) * grid_step)
    })
}

/// [`grid_positions`] collected, and shuffled when `shuffle` is set
pub fn candidate_positions<R: Rng + ?Sized>(
    size: Vec2,
    full_area: &Rect,
    grid_step: f32,
    shuffle: bool,
    rng: &mut R,
) -> Vec<Vec2> {
    let mut positions: Vec<Vec2> = grid_positions(size, *full_area, grid_step).collect();
    if shuffle {
        positions.shuffle(rng);
    }
    positions
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SearchOutcome {
    /// Every remaining preset was placed
    Complete,
    /// This branch cannot be completed; try the next alternative
    Backtrack,
    /// The candidate budget ran out; abort the whole search
    OutOfBudget,
}

struct PresetSearch<'a, R: ?Sized> {
    specs: &'a [PresetRegionSpec],
    full_area: &'a Rect,
    min_distances: &'a MinDistanceTable,
    grid_step: f32,
    options: &'a PlacementOptions,
    rng: &'a mut R,
    placed: Vec<PlacedRegion>,
    checks: u64,
    deepest: usize,
}

impl<R: Rng + ?Sized> PresetSearch<'_, R> {
    fn place_from(&mut self, index: usize) -> SearchOutcome {
        let specs = self.specs;
        let Some(spec) = specs.get(index) else {
            return SearchOutcome::Complete;
        };

        for _ in 0..self.options.max_dimension_attempts {
            let size = Vec2::new(
                sample_dimension(&spec.width, self.grid_step, self.rng),
                sample_dimension(&spec.height, self.grid_step, self.rng),
            );
            // only the first preset needs the whole grid in memory
            let positions: Box<dyn Iterator<Item = Vec2>> = if index == 0 {
                Box::new(
                    candidate_positions(size, self.full_area, self.grid_step, true, self.rng)
                        .into_iter(),
                )
            } else {
                Box::new(grid_positions(size, *self.full_area, self.grid_step))
            };

            for origin in positions {
                if self.budget_spent() {
                    return SearchOutcome::OutOfBudget;
                }
                self.checks += 1;

                let candidate = Rect::from_origin_size(origin, size);
                if !self.full_area.contains_rect(&candidate) || !self.keeps_distance(spec, &candidate) {
                    continue;
                }

                self.placed
                    .push(PlacedRegion::new(candidate, spec.region_type.clone()));
                self.deepest = self.deepest.max(self.placed.len());

                match self.place_from(index + 1) {
                    SearchOutcome::Backtrack => {
                        self.placed.pop();
                    }
                    done => return done,
                }
            }
        }

        SearchOutcome::Backtrack
    }

    fn keeps_distance(&self, spec: &PresetRegionSpec, candidate: &Rect) -> bool {
        self.placed.iter().all(|placed| {
            let required = self
                .min_distances
                .required_between(&spec.region_type, &placed.region_type);
            candidate.gap_distance(&placed.rect) >= required
        })
    }

    fn budget_spent(&self) -> bool {
        self.options
            .max_candidate_checks
            .is_some_and(|limit| self.checks >= limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn area(size: f32) -> Rect {
        Rect::new(Vec2::ZERO, Vec2::splat(size))
    }

    fn place(
        specs: &[PresetRegionSpec],
        full_area: &Rect,
        table: &MinDistanceTable,
        step: f32,
        seed: u64,
    ) -> Result<Vec<PlacedRegion>> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        place_presets(specs, full_area, table, step, &PlacementOptions::default(), &mut rng)
    }

    #[test]
    fn test_single_fixed_preset_fits() {
        let full = area(1000.0);
        let specs = [PresetRegionSpec::fixed(RegionType::PlayerStart, 200.0, 200.0)];

        let placed = place(&specs, &full, &MinDistanceTable::new(), 100.0, 42).unwrap();

        assert_eq!(placed.len(), 1);
        assert_eq!(placed[0].rect.area(), 40_000.0);
        assert_eq!(placed[0].region_type, RegionType::PlayerStart);
        assert!(full.contains_rect(&placed[0].rect));
    }

    #[test]
    fn test_unreachable_distance_is_infeasible() {
        let full = area(1000.0);
        let specs = [
            PresetRegionSpec::fixed(RegionType::PlayerStart, 100.0, 100.0),
            PresetRegionSpec::fixed(RegionType::EnemyStart, 100.0, 100.0),
        ];
        let table = MinDistanceTable::new()
            .with(RegionType::PlayerStart, RegionType::EnemyStart, 5000.0)
            .with(RegionType::EnemyStart, RegionType::PlayerStart, 5000.0);

        let result = place(&specs, &full, &table, 100.0, 42);
        assert_eq!(
            result,
            Err(PartitionError::Infeasible {
                placed: 1,
                total: 2
            })
        );
    }

    #[test]
    fn test_one_sided_distance_applies_to_both_orders() {
        let full = area(1000.0);
        let player_first = [
            PresetRegionSpec::fixed(RegionType::PlayerStart, 100.0, 100.0),
            PresetRegionSpec::fixed(RegionType::EnemyStart, 100.0, 100.0),
        ];
        let enemy_first = [player_first[1].clone(), player_first[0].clone()];
        let table = MinDistanceTable::new().with(RegionType::PlayerStart, RegionType::EnemyStart, 5000.0);

        for specs in [&player_first, &enemy_first] {
            let result = place(specs, &full, &table, 100.0, 42);
            assert!(matches!(result, Err(PartitionError::Infeasible { placed: 1, total: 2 })));
        }
    }

    #[test]
    fn test_one_sided_distance_holds_for_every_pair() {
        let full = area(1000.0);
        let specs = [
            PresetRegionSpec::fixed(RegionType::PlayerStart, 200.0, 200.0),
            PresetRegionSpec::fixed(RegionType::EnemyStart, 200.0, 200.0),
        ];
        let table = MinDistanceTable::new().with(RegionType::PlayerStart, RegionType::EnemyStart, 500.0);

        for seed in 0..8 {
            let placed = place(&specs, &full, &table, 100.0, seed).unwrap();
            assert!(placed[0].rect.gap_distance(&placed[1].rect) >= 500.0);
        }
    }

    #[test]
    fn test_no_presets_places_nothing() {
        let placed = place(&[], &area(100.0), &MinDistanceTable::new(), 10.0, 1).unwrap();
        assert!(placed.is_empty());
    }

    #[test]
    fn test_preset_larger_than_area_is_infeasible() {
        let specs = [PresetRegionSpec::fixed(RegionType::PlayerStart, 300.0, 100.0)];
        let result = place(&specs, &area(200.0), &MinDistanceTable::new(), 50.0, 1);
        assert!(matches!(result, Err(PartitionError::Infeasible { placed: 0, total: 1 })));
    }

    #[test]
    fn test_distance_constraints_hold_after_backtracking() {
        // Only corner-ish placements of the first preset leave room for the
        // second, so most shuffled starts have to be undone.
        let full = area(1000.0);
        let specs = [
            PresetRegionSpec::fixed(RegionType::PlayerStart, 300.0, 300.0),
            PresetRegionSpec::fixed(RegionType::EnemyStart, 300.0, 300.0),
        ];
        let table = MinDistanceTable::new().with(RegionType::EnemyStart, RegionType::PlayerStart, 400.0);

        for seed in 0..8 {
            let placed = place(&specs, &full, &table, 100.0, seed).unwrap();
            assert_eq!(placed.len(), 2);
            assert!(placed[1].rect.gap_distance(&placed[0].rect) >= 400.0);
            assert!(placed.iter().all(|p| full.contains_rect(&p.rect)));
        }
    }

    #[test]
    fn test_many_presets_respect_pairwise_distances() {
        let full = area(2000.0);
        let specs = [
            PresetRegionSpec::fixed(RegionType::PlayerStart, 200.0, 200.0),
            PresetRegionSpec::new(
                RegionType::EnemyStart,
                SizeRange::new(100.0, 300.0),
                SizeRange::new(100.0, 300.0),
            ),
            PresetRegionSpec::fixed(RegionType::EnemyStart, 200.0, 200.0),
            PresetRegionSpec::fixed(RegionType::named("Outpost"), 100.0, 100.0),
        ];
        let mut table = MinDistanceTable::new();
        table.set_symmetric(RegionType::PlayerStart, RegionType::EnemyStart, 600.0);
        table.set(RegionType::EnemyStart, RegionType::EnemyStart, 150.0);
        table.set(RegionType::named("Outpost"), RegionType::PlayerStart, 100.0);

        let placed = place(&specs, &full, &table, 100.0, 7).unwrap();
        assert_eq!(placed.len(), specs.len());

        for (i, later) in placed.iter().enumerate() {
            for earlier in &placed[..i] {
                let required = table.get(&later.region_type, &earlier.region_type);
                assert!(later.rect.gap_distance(&earlier.rect) >= required);
                assert!(!later.rect.intersects(&earlier.rect) || required == 0.0);
            }
        }
    }

    #[test]
    fn test_placement_is_grid_aligned() {
        let full = Rect::new(Vec2::splat(-500.0), Vec2::splat(500.0));
        let specs = [PresetRegionSpec::new(
            RegionType::PlayerStart,
            SizeRange::new(120.0, 380.0),
            SizeRange::new(120.0, 380.0),
        )];

        let placed = place(&specs, &full, &MinDistanceTable::new(), 100.0, 3).unwrap();
        let rect = placed[0].rect;
        for value in [rect.min.x, rect.min.y, rect.max.x, rect.max.y] {
            let offset = (value - full.min.x) / 100.0;
            assert!((offset - offset.round()).abs() < 1e-4, "{value} is off the grid");
        }
    }

    #[test]
    fn test_same_seed_same_layout() {
        let full = area(1000.0);
        let specs = [
            PresetRegionSpec::new(RegionType::PlayerStart, SizeRange::new(100.0, 300.0), SizeRange::new(100.0, 300.0)),
            PresetRegionSpec::fixed(RegionType::EnemyStart, 200.0, 200.0),
        ];
        let table = MinDistanceTable::new().with(RegionType::EnemyStart, RegionType::PlayerStart, 200.0);

        let a = place(&specs, &full, &table, 50.0, 99).unwrap();
        let b = place(&specs, &full, &table, 50.0, 99).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_candidate_budget_aborts_search() {
        let full = area(1000.0);
        let specs = [
            PresetRegionSpec::fixed(RegionType::PlayerStart, 100.0, 100.0),
            PresetRegionSpec::fixed(RegionType::EnemyStart, 100.0, 100.0),
        ];
        let table = MinDistanceTable::new().with(RegionType::EnemyStart, RegionType::PlayerStart, 5000.0);
        let options = PlacementOptions {
            max_candidate_checks: Some(25),
            ..Default::default()
        };

        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let result = place_presets(&specs, &full, &table, 100.0, &options, &mut rng);
        assert!(matches!(result, Err(PartitionError::Infeasible { .. })));
    }

    #[test]
    fn test_sample_dimension_floors_to_grid() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for _ in 0..100 {
            let value = sample_dimension(&SizeRange::new(150.0, 480.0), 100.0, &mut rng);
            assert!([100.0, 200.0, 300.0, 400.0].contains(&value));
        }
        // never below one step
        assert_eq!(sample_dimension(&SizeRange::new(0.0, 20.0), 100.0, &mut rng), 100.0);
    }

    #[test]
    fn test_candidate_positions_row_major() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let positions = candidate_positions(Vec2::splat(100.0), &area(300.0), 100.0, false, &mut rng);
        assert_eq!(positions.len(), 9);
        assert_eq!(positions[0], Vec2::new(0.0, 0.0));
        assert_eq!(positions[1], Vec2::new(100.0, 0.0));
        assert_eq!(positions[3], Vec2::new(0.0, 100.0));
        assert_eq!(positions[8], Vec2::new(200.0, 200.0));
    }

    #[test]
    fn test_grid_positions_are_lazy() {
        // a 10^10 grid would not fit in memory if it were collected
        let huge = Rect::new(Vec2::ZERO, Vec2::splat(100_000.0));
        let first: Vec<Vec2> = grid_positions(Vec2::splat(1.0), huge, 1.0).take(3).collect();
        assert_eq!(first, vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(2.0, 0.0)]);

        assert_eq!(grid_positions(Vec2::splat(20.0), area(10.0), 1.0).count(), 0);
    }

    #[test]
    fn test_candidate_positions_shuffled_is_permutation() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut ordered = candidate_positions(Vec2::splat(100.0), &area(500.0), 100.0, false, &mut rng);
        let mut shuffled = candidate_positions(Vec2::splat(100.0), &area(500.0), 100.0, true, &mut rng);
        assert_ne!(ordered, shuffled);

        let key = |v: &Vec2| (v.y as i32, v.x as i32);
        ordered.sort_by_key(key);
        shuffled.sort_by_key(key);
        assert_eq!(ordered, shuffled);
    }

    #[test]
    fn test_apply_preset_tags() {
        let mut placed = vec![
            PlacedRegion::new(area(10.0), RegionType::PlayerStart),
            PlacedRegion::new(area(10.0), RegionType::EnemyStart),
        ];
        let tags = BTreeMap::from([(RegionType::PlayerStart, "PlayerBase".to_string())]);

        apply_preset_tags(&mut placed, &tags);
        assert_eq!(placed[0].tag.as_deref(), Some("PlayerBase"));
        assert_eq!(placed[1].tag, None);
    }
}
