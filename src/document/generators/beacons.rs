use crate::config::BEACON_EFFECT_RADIUS;
use crate::geometry::cell::Cell;
use crate::utils::map_utils::CountMapUtils;
use rustc_hash::{FxHashMap, FxHashSet};
use std::cmp::Ordering;

/// Half the side of a 3x3 footprint, without the middle cell.
const RADIUS: i32 = 1;

#[derive(Clone, Debug)]
struct Candidate {
    middle: Cell,
    affected: usize,
    average_distance: f64,
    /// Candidate spots covering any cell of this one, counted once per cell.
    overlaps: usize,
}

impl Candidate {
    /// Better spots order first: more machines affected, then spots far from a lone machine or blocking few others.
    fn priority(&self, other: &Candidate) -> Ordering {
        other
            .affected
            .cmp(&self.affected)
            .then_with(|| {
                if self.affected == 1 {
                    other.average_distance.total_cmp(&self.average_distance)
                } else {
                    self.overlaps.cmp(&other.overlaps)
                }
            })
            .then_with(|| self.middle.cmp(&other.middle))
    }

    fn overlaps(&self, other: &Candidate) -> bool {
        (self.middle.x - other.middle.x).abs() <= 2 * RADIUS && (self.middle.y - other.middle.y).abs() <= 2 * RADIUS
    }
}

/// Middle cells of beacons placed greedily around the 3x3 machines. Beacons stay off the obstacles and affect at
/// least `min_affected` machines.
pub fn plan_beacons(machines: &[Cell], obstacles: &[Cell], min_affected: usize) -> Vec<Cell> {
    let machine_at = machines
        .iter()
        .enumerate()
        .flat_map(|(i, middle)| middle.square(RADIUS).map(move |cell| (cell, i)))
        .collect::<FxHashMap<_, _>>();
    let obstacles = obstacles.iter().copied().collect::<FxHashSet<_>>();

    let search_radius = RADIUS + BEACON_EFFECT_RADIUS + 2 * RADIUS;
    let free = machines
        .iter()
        .flat_map(|middle| middle.square(search_radius))
        .filter(|cell| !machine_at.contains_key(cell) && !obstacles.contains(cell))
        .collect::<FxHashSet<_>>();

    let mut middles = free
        .iter()
        .map(|cell| cell.offset(RADIUS, RADIUS))
        .filter(|middle| middle.square(RADIUS).all(|cell| free.contains(&cell)))
        .collect::<Vec<_>>();
    middles.sort();

    let mut spots_at = FxHashMap::default();
    for middle in middles.iter() {
        for cell in middle.square(RADIUS) {
            spots_at.increment(cell);
        }
    }

    let reach = RADIUS + BEACON_EFFECT_RADIUS;
    let mut candidates = middles
        .into_iter()
        .filter_map(|middle| {
            let affected = middle
                .square(reach)
                .filter_map(|cell| machine_at.get(&cell).copied())
                .collect::<FxHashSet<_>>();
            if affected.is_empty() || affected.len() < min_affected {
                return None;
            }
            let total_distance = affected
                .iter()
                .map(|&i| machines[i].manhattan_distance(middle))
                .sum::<i32>();
            let overlaps = middle
                .square(RADIUS)
                .map(|cell| spots_at.get(&cell).copied().unwrap_or(0))
                .sum();
            Some(Candidate {
                middle,
                affected: affected.len(),
                average_distance: total_distance as f64 / affected.len() as f64,
                overlaps,
            })
        })
        .collect::<Vec<_>>();

    let mut beacons = Vec::new();
    while let Some(best) = (0..candidates.len()).min_by(|&a, &b| candidates[a].priority(&candidates[b])) {
        let beacon = candidates.swap_remove(best);
        candidates.retain(|candidate| !candidate.overlaps(&beacon));
        beacons.push(beacon.middle);
    }
    beacons
}
