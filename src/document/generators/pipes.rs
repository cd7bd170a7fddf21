use crate::config::{MAX_UNDERGROUND_PIPE_GAP, PIPE_ROUTING_MARGIN};
use crate::document::placed_object::ObjectId;
use crate::geometry::cell::{Cell, CellRect};
use crate::geometry::direction::Direction;
use crate::geometry::direction::Direction::*;
use log::warn;
use rustc_hash::{FxHashMap, FxHashSet};

/// Cells next to a pumpjack its output may open into, relative to its middle cell.
const PLUG_OFFSETS: [(i32, i32, Direction); 4] = [(1, -2, North), (2, -1, East), (-1, 2, South), (-2, 1, West)];

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Pumpjack {
    pub id: ObjectId,
    /// Middle cell of the 3x3 footprint.
    pub middle: Cell,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct Plug {
    cell: Cell,
    direction: Direction,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PipeLayout {
    pub pipes: Vec<Cell>,
    pub undergrounds: Vec<(Cell, Direction)>,
    /// Direction each connected pumpjack has to face to output into the network.
    pub outputs: Vec<(ObjectId, Direction)>,
    pub unconnected: Vec<ObjectId>,
    /// Cells of straight runs taken over by underground pairs, their ends included.
    pub replaced: usize,
}

impl PipeLayout {
    /// Cells taken by pipes of either kind.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.pipes
            .iter()
            .copied()
            .chain(self.undergrounds.iter().map(|&(cell, _)| cell))
    }
}

/// Routes a single pipe network joining one output of every pumpjack it can reach. The network starts at the pumpjack
/// nearest the middle of the field and grows by the shortest path to the closest pumpjack not yet connected.
pub fn plan_pipes(pumpjacks: &[Pumpjack], min_gap_between_undergrounds: usize) -> PipeLayout {
    let mut layout = PipeLayout::default();
    let obstacles = pumpjacks
        .iter()
        .flat_map(|pumpjack| pumpjack.middle.square(1))
        .collect::<FxHashSet<_>>();
    let Some(rect) = CellRect::enclosing(obstacles.iter().copied()) else {
        return layout;
    };
    let rect = rect.grown(PIPE_ROUTING_MARGIN);

    let mut pending = Vec::new();
    for pumpjack in pumpjacks {
        let plugs = PLUG_OFFSETS
            .iter()
            .map(|&(dx, dy, direction)| Plug {
                cell: pumpjack.middle.offset(dx, dy),
                direction,
            })
            .filter(|plug| !obstacles.contains(&plug.cell))
            .collect::<Vec<_>>();
        if plugs.is_empty() {
            warn!("Pumpjack {} has every output blocked by other pumpjacks.", pumpjack.id);
            layout.unconnected.push(pumpjack.id);
        } else {
            pending.push((*pumpjack, plugs));
        }
    }

    let middle = |pumpjacks: &[(Pumpjack, Vec<Plug>)]| {
        let count = pumpjacks.len().max(1) as f64;
        let (x, y) = pumpjacks.iter().fold((0.0, 0.0), |(x, y), (pumpjack, _)| {
            (x + pumpjack.middle.x as f64, y + pumpjack.middle.y as f64)
        });
        (x / count, y / count)
    };
    let distance_to = |cell: Cell, (x, y): (f64, f64)| (cell.x as f64 - x).abs() + (cell.y as f64 - y).abs();

    let field_middle = middle(&pending);
    let Some(seed_index) = (0..pending.len()).min_by(|&a, &b| {
        distance_to(pending[a].0.middle, field_middle).total_cmp(&distance_to(pending[b].0.middle, field_middle))
    }) else {
        return layout;
    };
    let (seed, seed_plugs) = pending.remove(seed_index);
    let others_middle = if pending.is_empty() {
        field_middle
    } else {
        middle(&pending)
    };
    let Some(seed_plug) = seed_plugs
        .iter()
        .min_by(|a, b| distance_to(a.cell, others_middle).total_cmp(&distance_to(b.cell, others_middle)))
        .copied()
    else {
        return layout;
    };

    let mut network = FxHashSet::default();
    let mut outputs = FxHashSet::default();
    network.insert(seed_plug.cell);
    outputs.insert(seed_plug.cell);
    layout.outputs.push((seed.id, seed_plug.direction));

    while !pending.is_empty() {
        let distances = distance_map(&obstacles, rect, network.iter().copied());
        let mut closest: Option<(u32, usize, Plug)> = None;
        for (i, (_, plugs)) in pending.iter().enumerate() {
            for plug in plugs {
                if let Some(&distance) = distances.get(&plug.cell) {
                    if closest.map_or(true, |(best, _, _)| distance < best) {
                        closest = Some((distance, i, *plug));
                    }
                }
            }
        }
        let Some((_, index, plug)) = closest else {
            warn!("{} pumpjacks can not be reached by pipes.", pending.len());
            layout.unconnected.extend(pending.drain(..).map(|(pumpjack, _)| pumpjack.id));
            break;
        };
        let (pumpjack, _) = pending.remove(index);
        network.extend(path_by_distance_map(&distances, plug.cell));
        outputs.insert(plug.cell);
        layout.outputs.push((pumpjack.id, plug.direction));
    }

    let (pipes, undergrounds, replaced) = place_undergrounds(&network, &outputs, min_gap_between_undergrounds);
    layout.pipes = pipes;
    layout.undergrounds = undergrounds;
    layout.replaced = replaced;
    layout
}

/// Distances from the nearest target to every cell of the rectangle reachable without crossing an obstacle.
fn distance_map<T>(obstacles: &FxHashSet<Cell>, rect: CellRect, targets: T) -> FxHashMap<Cell, u32>
where
    T: Iterator<Item = Cell>,
{
    let mut result = FxHashMap::default();
    let mut layer = Vec::new();

    for cell in targets {
        result.insert(cell, 0);
        layer.push(cell);
    }

    let mut distance = 1u32;

    while !layer.is_empty() {
        let mut next_layer = Vec::new();
        for cell in layer {
            for near in cell.around() {
                if rect.inside(near) && !obstacles.contains(&near) && !result.contains_key(&near) {
                    result.insert(near, distance);
                    next_layer.push(near);
                }
            }
        }
        layer = next_layer;
        distance += 1;
    }

    result
}

/// Follows decreasing distances from the start down to a target. Keeps going straight whenever that is as short as
/// turning, so paths have few bends.
fn path_by_distance_map(distances: &FxHashMap<Cell, u32>, start: Cell) -> Vec<Cell> {
    let mut path = vec![start];
    let mut current = start;
    let Some(mut current_distance) = distances.get(&start).copied() else {
        return path;
    };
    let mut heading: Option<(i32, i32)> = None;
    'main_loop: while current_distance > 0 {
        let ahead = heading.map(|(dx, dy)| current.offset(dx, dy));
        for near in ahead.into_iter().chain(current.around()) {
            if let Some(&near_distance) = distances.get(&near) {
                if near_distance < current_distance {
                    heading = Some((near.x - current.x, near.y - current.y));
                    current = near;
                    current_distance = near_distance;
                    path.push(near);
                    continue 'main_loop;
                }
            }
        }
        break;
    }
    path
}

/// Splits the network into regular pipes and underground pairs. A straight run is made of cells joined to the network
/// only by their two neighbours along one axis. Pumpjack outputs always stay above ground.
fn place_undergrounds(
    network: &FxHashSet<Cell>,
    outputs: &FxHashSet<Cell>,
    min_gap: usize,
) -> (Vec<Cell>, Vec<(Cell, Direction)>, usize) {
    let straight = |cell: Cell, horizontal: bool| {
        if !network.contains(&cell) || outputs.contains(&cell) {
            return false;
        }
        let [up, right, down, left] = cell.around().map(|near| network.contains(&near));
        if horizontal {
            left && right && !up && !down
        } else {
            up && down && !left && !right
        }
    };

    let mut undergrounds = Vec::new();
    let mut hidden = FxHashSet::default();
    for horizontal in [true, false] {
        let (dx, dy) = if horizontal { (1, 0) } else { (0, 1) };
        let mut starts = network
            .iter()
            .copied()
            .filter(|&cell| straight(cell, horizontal) && !straight(cell.offset(-dx, -dy), horizontal))
            .collect::<Vec<_>>();
        starts.sort();
        for start in starts {
            let mut run = vec![start];
            let mut next = start.offset(dx, dy);
            while straight(next, horizontal) {
                run.push(next);
                next = next.offset(dx, dy);
            }
            if run.len() < min_gap + 2 {
                continue;
            }
            undergrounds.extend(underground_pairs(&run, horizontal));
            hidden.extend(run);
        }
    }

    let mut pipes = network
        .iter()
        .copied()
        .filter(|cell| !hidden.contains(cell))
        .collect::<Vec<_>>();
    pipes.sort();
    (pipes, undergrounds, hidden.len())
}

/// Ends of the underground pairs covering a straight run, which is split evenly when one pair can not span it.
fn underground_pairs(run: &[Cell], horizontal: bool) -> Vec<(Cell, Direction)> {
    let (entry, exit) = if horizontal { (West, East) } else { (North, South) };
    let segments = run.len().div_ceil(MAX_UNDERGROUND_PIPE_GAP + 2);
    (0..segments)
        .flat_map(|i| {
            let start = run.len() * i / segments;
            let end = run.len() * (i + 1) / segments - 1;
            [(run[start], entry), (run[end], exit)]
        })
        .collect()
}
