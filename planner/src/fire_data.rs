use firewatch_structs::raster::{Cell, Raster};
use firewatch_structs::{positive_modulo_2pi, Segment3d};
use log::trace;

use crate::uav::Uav;

/// Time the fire front keeps traversing a cell after it ignites when
/// propagation stops there (a propagation border).
pub const TRAVERSAL_BORDER_DWELL: f64 = 180.0;

/// Ignition raster and the rasters derived from it. Immutable once built;
/// shared read-only between plans.
#[derive(Clone, Debug)]
pub struct FireData {
    /// Time at which the fire front reaches each cell. `f64::MAX` if it
    /// never ignites (not burnable, or propagation stopped early).
    pub ignitions: Raster<f64>,
    /// Time at which the fire front has entirely traversed each cell.
    pub traversal_end: Raster<f64>,
    /// Main fire propagation direction in each cell.
    pub propagation_directions: Raster<f64>,
}

impl FireData {
    pub fn new(ignitions: Raster<f64>) -> Self {
        let traversal_end = compute_traversal_ends(&ignitions);
        let propagation_directions = compute_propagation_directions(&ignitions);
        FireData { ignitions, traversal_end, propagation_directions }
    }

    pub fn eventually_ignited(&self, cell: Cell) -> bool {
        self.ignitions.get(cell) < f64::MAX / 2.0
    }

    /// Closest cell on the fire front at `time`, reached by walking up or
    /// down the propagation slope from `cell`. `None` when the walk leaves
    /// the grid, reaches an unignited cell, or the ignition gradient
    /// reverses before the front is found.
    pub fn project_on_fire_front(&self, cell: Cell, time: f64) -> Option<Cell> {
        assert!(self.ignitions.is_in(cell));
        let mut cell = cell;
        // degenerate direction fields can cycle between plateau cells
        let max_steps = self.ignitions.x_width + self.ignitions.y_height;
        for _ in 0..=max_steps {
            let ignition = self.ignitions.get(cell);
            if ignition <= time && time <= self.traversal_end.get(cell) {
                return Some(cell);
            }

            let dir = positive_modulo_2pi(self.propagation_directions.get(cell));
            // quantize to one of the eight neighbor directions
            let discrete_dir = ((dir / (std::f64::consts::PI / 4.0)).round() as i64) % 8;
            let (dx, dy): (i64, i64) = match discrete_dir {
                0 => (1, 0),
                1 => (1, 1),
                2 => (0, 1),
                3 => (-1, 1),
                4 => (-1, 0),
                5 => (-1, -1),
                6 => (0, -1),
                7 => (1, -1),
                _ => unreachable!(),
            };

            // walk with the propagation when the front has already passed,
            // against it when it has not yet arrived
            let (sx, sy) = if time > self.traversal_end.get(cell) { (dx, dy) } else { (-dx, -dy) };

            let nx = cell.x as i64 + sx;
            let ny = cell.y as i64 + sy;
            if nx < 0 || ny < 0 {
                return None;
            }
            let next = Cell { x: nx as usize, y: ny as usize };
            if !self.ignitions.is_in(next) || !self.eventually_ignited(next) {
                return None;
            }

            let next_ignition = self.ignitions.get(next);
            if time > self.traversal_end.get(cell) {
                if ignition > next_ignition {
                    // ignition times stopped growing: local maximum, abandon
                    return None;
                }
            } else if ignition < next_ignition {
                // ignition times stopped decreasing: local minimum, abandon
                return None;
            }

            cell = next;
        }
        trace!("fire front projection did not settle after {} steps", max_steps);
        None
    }

    /// Projects a segment on the fire front at `time`, keeping its heading,
    /// length and altitude: the visibility center is moved onto the front
    /// and the segment rebuilt around it.
    pub fn project_on_firefront(&self, seg: &Segment3d, uav: &Uav, time: f64) -> Option<Segment3d> {
        let center = uav.visibility_center(seg);
        if !self.ignitions.is_in_position(&center.as_position()) {
            return None;
        }
        let cell = self.ignitions.as_cell(&center.as_position());
        let projected = self.project_on_fire_front(cell, time)?;
        Some(uav.observation_segment(
            self.ignitions.x_coord(projected.x),
            self.ignitions.y_coord(projected.y),
            seg.start.z,
            seg.start.dir,
            seg.length,
        ))
    }
}

/// Times at which the fire front leaves each cell: the highest ignition time
/// among the ignited 8-neighbors, or a fixed dwell past the own ignition on
/// propagation borders.
fn compute_traversal_ends(ignitions: &Raster<f64>) -> Raster<f64> {
    let mut ends = Raster::fill_like(0.0, ignitions);
    for cell in ignitions.cells() {
        let ignition = ignitions.get(cell);
        if ignition < f64::MAX / 2.0 {
            let max_neighbor = ignitions
                .neighbor_cells(cell)
                .iter()
                .map(|n| ignitions.get(*n))
                .filter(|t| *t < f64::MAX / 2.0)
                .fold(0.0f64, f64::max);
            if max_neighbor <= ignition {
                ends.set(cell, ignition + TRAVERSAL_BORDER_DWELL);
            } else {
                ends.set(cell, max_neighbor);
            }
        } else {
            // never ignited, carry the sentinel
            ends.set(cell, ignition);
        }
    }
    ends
}

/// Local fire propagation direction: the ignition raster read as an
/// elevation field, with the main raising direction extracted by a Sobel
/// kernel. Out-of-range or unignited neighbors default to the center value.
fn compute_propagation_directions(ignitions: &Raster<f64>) -> Raster<f64> {
    let mut directions = Raster::fill_like(0.0, ignitions);
    for cell in ignitions.cells() {
        let center = ignitions.get(cell);
        if center >= f64::MAX / 2.0 {
            directions.set(cell, 0.0);
            continue;
        }

        let ign = |dx: i64, dy: i64| -> f64 {
            let nx = cell.x as i64 + dx;
            let ny = cell.y as i64 + dy;
            if nx < 0 || ny < 0 {
                return center;
            }
            let neighbor = Cell { x: nx as usize, y: ny as usize };
            if !ignitions.is_in(neighbor) {
                return center;
            }
            let t = ignitions.get(neighbor);
            if t >= f64::MAX / 2.0 {
                center
            } else {
                t
            }
        };

        let prop_dx = ign(1, -1) + 2.0 * ign(1, 0) + ign(1, 1) - ign(-1, -1) - 2.0 * ign(-1, 0) - ign(-1, 1);
        let prop_dy = ign(1, 1) + 2.0 * ign(0, 1) + ign(-1, 1) - ign(1, -1) - 2.0 * ign(0, -1) - ign(-1, -1);
        directions.set(cell, prop_dy.atan2(prop_dx));
    }
    directions
}
