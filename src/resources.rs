//! Content counts for player start areas
//!
//! Downstream content placement fills every player start region with a
//! handful of resource points. The counts are split into derived sets (the
//! radixite share, the metal remainder, vehicle parts), and every set has to
//! be non-empty for the start area to be playable.

use tracing::warn;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Resource counts handed to content placement for player start areas
///
/// Call [`make_consistent`](Self::make_consistent) before use; generation
/// stores the repaired copy in its result.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartResourceParameters {
    /// Total small resource points
    pub small_points: u32,
    /// Small points holding radixite, the rest hold metal
    pub small_radixite_points: u32,
    /// Small points holding vehicle parts
    pub small_vehicle_parts_points: u32,
    /// Total medium resource points
    pub medium_points: u32,
    /// Medium points holding radixite, the rest hold metal
    pub medium_radixite_points: u32,
    /// Scavengeable objects of medium size
    pub medium_scavenge_objects: u32,
}

impl Default for StartResourceParameters {
    fn default() -> Self {
        Self {
            small_points: 5,
            small_radixite_points: 3,
            small_vehicle_parts_points: 1,
            medium_points: 3,
            medium_radixite_points: 2,
            medium_scavenge_objects: 3,
        }
    }
}

impl StartResourceParameters {
    /// Small points left for metal once radixite is taken out
    #[inline]
    pub fn small_metal_points(&self) -> u32 {
        self.small_points.saturating_sub(self.small_radixite_points)
    }

    /// Medium points left for metal once radixite is taken out
    #[inline]
    pub fn medium_metal_points(&self) -> u32 {
        self.medium_points.saturating_sub(self.medium_radixite_points)
    }

    /// Repair contradictory counts in place
    ///
    /// The rules run in order, so a later rule sees the result of earlier ones:
    ///
    /// 1. A radixite share not below its total becomes half the total, rounded up.
    /// 2. Fewer than 3 small points become 3.
    /// 3. Zero vehicle parts become 1.
    /// 4. If any small set is still empty, small counts reset to 5/3/1.
    /// 5. If any medium set is still empty, medium counts reset to 3/2.
    /// 6. Zero scavenge objects become 3.
    ///
    /// # Returns
    ///
    /// A description of every repair made, empty when the counts were fine.
    /// Each repair is also logged as a warning.
    pub fn make_consistent(&mut self) -> Vec<String> {
        let mut repairs = Vec::new();
        let defaults = Self::default();

        if self.small_radixite_points >= self.small_points {
            let fixed = self.small_points.div_ceil(2);
            repairs.push(format!(
                "small radixite points {} not below small points {}, set to {fixed}",
                self.small_radixite_points, self.small_points
            ));
            self.small_radixite_points = fixed;
        }
        if self.medium_radixite_points >= self.medium_points {
            let fixed = self.medium_points.div_ceil(2);
            repairs.push(format!(
                "medium radixite points {} not below medium points {}, set to {fixed}",
                self.medium_radixite_points, self.medium_points
            ));
            self.medium_radixite_points = fixed;
        }
        if self.small_points < 3 {
            repairs.push(format!(
                "only {} small points, need 3 to fit every resource",
                self.small_points
            ));
            self.small_points = 3;
        }
        if self.small_vehicle_parts_points == 0 {
            repairs.push("no vehicle parts points, set to 1".to_string());
            self.small_vehicle_parts_points = 1;
        }

        if self.small_radixite_points == 0
            || self.small_vehicle_parts_points == 0
            || self.small_metal_points() == 0
        {
            repairs.push(format!(
                "empty small resource set (radixite {}, vehicle parts {}, metal {}), reset to defaults",
                self.small_radixite_points,
                self.small_vehicle_parts_points,
                self.small_metal_points()
            ));
            self.small_points = defaults.small_points;
            self.small_radixite_points = defaults.small_radixite_points;
            self.small_vehicle_parts_points = defaults.small_vehicle_parts_points;
        }
        if self.medium_radixite_points == 0 || self.medium_metal_points() == 0 {
            repairs.push(format!(
                "empty medium resource set (radixite {}, metal {}), reset to defaults",
                self.medium_radixite_points,
                self.medium_metal_points()
            ));
            self.medium_points = defaults.medium_points;
            self.medium_radixite_points = defaults.medium_radixite_points;
        }
        if self.medium_scavenge_objects == 0 {
            repairs.push("no medium scavenge objects, set to 3".to_string());
            self.medium_scavenge_objects = defaults.medium_scavenge_objects;
        }

        for repair in &repairs {
            warn!(target: "region_partition", "start resources: {}", repair);
        }
        repairs
    }

    /// Copy with [`make_consistent`](Self::make_consistent) applied
    pub fn consistent(mut self) -> Self {
        self.make_consistent();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_consistent() {
        let mut params = StartResourceParameters::default();
        assert!(params.make_consistent().is_empty());
        assert_eq!(params, StartResourceParameters::default());
        assert_eq!(params.small_metal_points(), 2);
        assert_eq!(params.medium_metal_points(), 1);
    }

    #[test]
    fn test_radixite_share_halved() {
        let mut params = StartResourceParameters {
            small_points: 7,
            small_radixite_points: 7,
            medium_points: 5,
            medium_radixite_points: 9,
            ..Default::default()
        };
        let repairs = params.make_consistent();

        assert_eq!(repairs.len(), 2);
        assert_eq!(params.small_radixite_points, 4);
        assert_eq!(params.medium_radixite_points, 3);
        assert_eq!(params.small_points, 7);
        assert_eq!(params.medium_points, 5);
    }

    #[test]
    fn test_too_few_small_points() {
        let mut params = StartResourceParameters {
            small_points: 2,
            small_radixite_points: 1,
            ..Default::default()
        };
        params.make_consistent();
        assert_eq!(params.small_points, 3);
        assert_eq!(params.small_radixite_points, 1);
        assert_eq!(params.small_metal_points(), 2);
    }

    #[test]
    fn test_vehicle_parts_at_least_one() {
        let mut params = StartResourceParameters {
            small_vehicle_parts_points: 0,
            ..Default::default()
        };
        assert_eq!(params.make_consistent().len(), 1);
        assert_eq!(params.small_vehicle_parts_points, 1);
    }

    #[test]
    fn test_empty_small_set_resets() {
        let mut params = StartResourceParameters {
            small_points: 6,
            small_radixite_points: 0,
            ..Default::default()
        };
        params.make_consistent();
        assert_eq!(params.small_points, 5);
        assert_eq!(params.small_radixite_points, 3);
        assert_eq!(params.small_vehicle_parts_points, 1);
    }

    #[test]
    fn test_empty_medium_set_resets() {
        // one medium point halves to one radixite point, leaving no metal
        let mut params = StartResourceParameters {
            medium_points: 1,
            medium_radixite_points: 1,
            ..Default::default()
        };
        params.make_consistent();
        assert_eq!(params.medium_points, 3);
        assert_eq!(params.medium_radixite_points, 2);
    }

    #[test]
    fn test_scavenge_objects_repaired() {
        let params = StartResourceParameters {
            medium_scavenge_objects: 0,
            ..Default::default()
        }
        .consistent();
        assert_eq!(params.medium_scavenge_objects, 3);
    }

    #[test]
    fn test_all_zero_becomes_defaults() {
        let mut params = StartResourceParameters {
            small_points: 0,
            small_radixite_points: 0,
            small_vehicle_parts_points: 0,
            medium_points: 0,
            medium_radixite_points: 0,
            medium_scavenge_objects: 0,
        };
        assert!(!params.make_consistent().is_empty());
        assert_eq!(params, StartResourceParameters::default());
    }
}
