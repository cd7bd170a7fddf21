use crate::config::POLE_SUPPLY_RADIUS;
use crate::geometry::cell::Cell;
use crate::geometry::Point;
use log::warn;
use petgraph::unionfind::UnionFind;
use rustc_hash::{FxHashMap, FxHashSet};

/// Half the side of a 3x3 consumer, without the middle cell.
const CONSUMER_RADIUS: i32 = 1;
/// Poles a single call may add to join groups out of reach of each other.
const MAX_CONNECTING_POLES: usize = 1000;

#[derive(Clone, Debug)]
struct Candidate {
    cell: Cell,
    supplied: Vec<usize>,
    distance_to_supplied: f64,
}

/// Cells of 1x1 power poles supplying all 3x3 consumers and joined into a single network by wires of the given reach.
/// Poles supplying the most consumers not yet supplied are placed first, as close as possible to the middle of them.
pub fn plan_poles(consumers: &[Cell], obstacles: &[Cell], reach: f64) -> Vec<Cell> {
    let consumer_at = consumers
        .iter()
        .enumerate()
        .flat_map(|(i, middle)| middle.square(CONSUMER_RADIUS).map(move |cell| (cell, i)))
        .collect::<FxHashMap<_, _>>();
    let mut occupied = obstacles.iter().copied().collect::<FxHashSet<_>>();
    occupied.extend(consumer_at.keys().copied());

    let mut spots = consumers
        .iter()
        .flat_map(|middle| middle.square(CONSUMER_RADIUS + POLE_SUPPLY_RADIUS))
        .filter(|cell| !occupied.contains(cell))
        .collect::<FxHashSet<_>>()
        .into_iter()
        .collect::<Vec<_>>();
    spots.sort();

    let mut candidates = spots
        .into_iter()
        .filter_map(|cell| {
            let mut supplied = cell
                .square(POLE_SUPPLY_RADIUS)
                .filter_map(|near| consumer_at.get(&near).copied())
                .collect::<Vec<_>>();
            supplied.sort();
            supplied.dedup();
            if supplied.is_empty() {
                return None;
            }
            let count = supplied.len() as f64;
            let (x, y) = supplied.iter().fold((0.0, 0.0), |(x, y), &i| {
                (x + consumers[i].x as f64, y + consumers[i].y as f64)
            });
            Some(Candidate {
                cell,
                distance_to_supplied: (x / count - cell.x as f64).abs() + (y / count - cell.y as f64).abs(),
                supplied,
            })
        })
        .collect::<Vec<_>>();

    let mut poles = Vec::new();
    while let Some(best) = (0..candidates.len()).min_by(|&a, &b| {
        let (a, b) = (&candidates[a], &candidates[b]);
        b.supplied
            .len()
            .cmp(&a.supplied.len())
            .then_with(|| a.distance_to_supplied.total_cmp(&b.distance_to_supplied))
            .then_with(|| a.cell.cmp(&b.cell))
    }) {
        let pole = candidates.swap_remove(best);
        for candidate in candidates.iter_mut() {
            candidate.supplied.retain(|i| !pole.supplied.contains(i));
        }
        candidates.retain(|candidate| !candidate.supplied.is_empty());
        occupied.insert(pole.cell);
        poles.push(pole.cell);
    }

    connect_poles(poles, &mut occupied, reach)
}

fn in_reach(a: Cell, b: Cell, reach: f64) -> bool {
    a.center().in_circle(b.center(), reach)
}

fn distance(a: Cell, b: Cell) -> f64 {
    (((a.x - b.x).pow(2) + (a.y - b.y).pow(2)) as f64).sqrt()
}

/// Groups of poles connected through poles in reach of each other.
fn groups_in_reach(poles: &[Cell], reach: f64) -> Vec<Vec<Cell>> {
    let mut union_find = UnionFind::new(poles.len());
    for (i, &pole) in poles.iter().enumerate() {
        for (j, &other) in poles.iter().enumerate().skip(i + 1) {
            if in_reach(pole, other, reach) {
                union_find.union(i, j);
            }
        }
    }
    let mut groups = FxHashMap::<usize, Vec<Cell>>::default();
    for (i, &pole) in poles.iter().enumerate() {
        groups.entry(union_find.find(i)).or_default().push(pole);
    }
    let mut groups = groups.into_values().collect::<Vec<_>>();
    groups.sort();
    groups
}

/// Adds poles until all groups are in reach of each other. Each round extends the smallest group towards the closest
/// pole of another one, or joins them when a single pole can reach both.
fn connect_poles(mut poles: Vec<Cell>, occupied: &mut FxHashSet<Cell>, reach: f64) -> Vec<Cell> {
    let mut groups = groups_in_reach(&poles, reach);
    let radius = reach.floor() as i32;
    let mut added = 0;
    while groups.len() > 1 {
        if added == MAX_CONNECTING_POLES {
            warn!("Gave up joining {} groups of power poles.", groups.len());
            break;
        }
        groups.sort_by_key(Vec::len);
        let mut group = groups.remove(0);

        let mut closest: Option<(f64, Cell, Cell, usize)> = None;
        for &from in group.iter() {
            for (other, members) in groups.iter().enumerate() {
                for &to in members.iter() {
                    let d = distance(from, to);
                    if closest.map_or(true, |(best, _, _, _)| d < best) {
                        closest = Some((d, from, to, other));
                    }
                }
            }
        }
        let Some((d, from, to, other)) = closest else {
            break;
        };
        let target = if d > reach + 2.0 {
            to.center()
        } else {
            Point::new((from.x + to.x) as f64 / 2.0 + 0.5, (from.y + to.y) as f64 / 2.0 + 0.5)
        };

        let Some(new_pole) = from
            .square(radius)
            .filter(|&cell| in_reach(cell, from, reach) && !occupied.contains(&cell))
            .min_by(|a, b| {
                a.center()
                    .manhattan_distance(target)
                    .total_cmp(&b.center().manhattan_distance(target))
                    .then_with(|| a.cmp(b))
            })
        else {
            warn!("No free spot for a power pole near {}.", from);
            groups.push(group);
            break;
        };

        occupied.insert(new_pole);
        poles.push(new_pole);
        group.push(new_pole);
        added += 1;
        if in_reach(new_pole, to, reach) {
            groups[other].append(&mut group);
        } else {
            groups.push(group);
        }
    }
    poles
}
