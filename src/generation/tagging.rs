//! Biome label assignment for open regions
//!
//! Labels are handed out in two phases. The guaranteed minimums go first:
//! distributions take turns claiming one vacant region each until every
//! minimum is met or no region is left. The remaining regions are then drawn
//! by weight. A distribution whose minimum is already met keeps its weight in
//! that draw, so minimums are a floor rather than a quota.

use rand::Rng;
use tracing::debug;

use crate::config::{BiomeDistribution, SelectionPolicy};
use crate::error::{PartitionError, Result};
use crate::geometry::Rect;
use crate::region::{OpenRegion, RegionType};

/// Tag every region with a biome label
///
/// # Returns
///
/// One [`OpenRegion`] per input rectangle, in input order, all tagged.
/// Fails with `NoDistributions` when there are regions but no distributions.
pub fn assign_tags<R: Rng + ?Sized>(
    regions: &[Rect],
    biomes: &[BiomeDistribution],
    rng: &mut R,
) -> Result<Vec<OpenRegion>> {
    let mut tags: Vec<Option<RegionType>> = vec![None; regions.len()];
    let mut vacant: Vec<usize> = (0..regions.len()).collect();

    assign_minimums(regions, biomes, &mut vacant, &mut tags);
    debug!(
        target: "region_partition",
        "guaranteed biome minimums tagged {} of {} regions",
        regions.len() - vacant.len(),
        regions.len()
    );

    if !vacant.is_empty() && biomes.is_empty() {
        return Err(PartitionError::NoDistributions {
            vacant: vacant.len(),
        });
    }
    assign_weighted(regions, biomes, &mut vacant, &mut tags, rng);

    Ok(regions
        .iter()
        .zip(tags)
        .map(|(&rect, tag)| OpenRegion { rect, tag })
        .collect())
}

fn assign_minimums(
    regions: &[Rect],
    biomes: &[BiomeDistribution],
    vacant: &mut Vec<usize>,
    tags: &mut [Option<RegionType>],
) {
    let mut remaining: Vec<usize> = biomes.iter().map(|b| b.minimal_count).collect();

    let mut progressed = true;
    while progressed && !vacant.is_empty() {
        progressed = false;
        for (biome, left) in biomes.iter().zip(remaining.iter_mut()) {
            if *left == 0 || vacant.is_empty() {
                continue;
            }
            let slot = match biome.selection {
                SelectionPolicy::Any => 0,
                policy => select_by_area(regions, vacant, policy),
            };
            let region = vacant.remove(slot);
            tags[region] = Some(biome.label.clone());
            *left -= 1;
            progressed = true;
        }
    }
}

fn assign_weighted<R: Rng + ?Sized>(
    regions: &[Rect],
    biomes: &[BiomeDistribution],
    vacant: &mut Vec<usize>,
    tags: &mut [Option<RegionType>],
    rng: &mut R,
) {
    while !vacant.is_empty() {
        let biome = &biomes[pick_weighted(biomes, rng)];
        let slot = match biome.selection {
            SelectionPolicy::Any => rng.gen_range(0..vacant.len()),
            policy => select_by_area(regions, vacant, policy),
        };
        let region = vacant.remove(slot);
        tags[region] = Some(biome.label.clone());
    }
}

/// Index of the distribution chosen by a weighted draw
///
/// The roll is drawn from `[0, total)` and the first distribution whose
/// cumulative weight is strictly greater than the roll wins. Compared to a
/// `>=` test this only differs when the roll lands exactly on a cumulative
/// boundary, and it keeps zero-weight distributions from ever being chosen.
/// Falls back to the first distribution when every weight is zero.
fn pick_weighted<R: Rng + ?Sized>(biomes: &[BiomeDistribution], rng: &mut R) -> usize {
    let total: f32 = biomes.iter().map(|b| b.weight).sum();
    if total <= 0.0 {
        return 0;
    }
    let roll = rng.gen_range(0.0..total);

    let mut cumulative = 0.0;
    biomes
        .iter()
        .position(|b| {
            cumulative += b.weight;
            cumulative > roll
        })
        .unwrap_or(0)
}

/// Position in `vacant` of the largest or smallest region, first on ties
fn select_by_area(regions: &[Rect], vacant: &[usize], policy: SelectionPolicy) -> usize {
    let mut best = 0;
    for (slot, &region) in vacant.iter().enumerate().skip(1) {
        let area = regions[region].area();
        let best_area = regions[vacant[best]].area();
        let better = match policy {
            SelectionPolicy::PreferSmallest => area < best_area,
            _ => area > best_area,
        };
        if better {
            best = slot;
        }
    }
    best
}
