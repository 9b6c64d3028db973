//! Camera swath tracing and the ghost-fire observation contract.

use std::collections::BTreeMap;
use std::sync::Arc;

use firewatch_structs::raster::{Cell, Raster};
use firewatch_structs::{Position, PositionTime, Segment3d, Waypoint3d, EPSILON};

use crate::fire_data::FireData;
use crate::uav::Uav;

/// Cells covered by the camera swath of a segment: a rectangle centered on
/// the segment axis, `view_width` across and the maneuver length plus
/// `view_depth` along. `None` when the swath is not fully inside the raster.
pub fn segment_trace<T: Copy>(
    segment: &Segment3d,
    view_width: f64,
    view_depth: f64,
    raster: &Raster<T>,
) -> Option<Vec<Cell>> {
    let dir = segment.start.dir;
    let (cos_d, sin_d) = (dir.cos(), dir.sin());
    let center = Position {
        x: (segment.start.x + segment.end.x) / 2.0,
        y: (segment.start.y + segment.end.y) / 2.0,
    };
    let half_long = (segment.length + view_depth) / 2.0;
    let half_wide = view_width / 2.0;

    // reject swaths leaving the raster
    for (su, sv) in [(1.0, 1.0), (1.0, -1.0), (-1.0, 1.0), (-1.0, -1.0)] {
        let corner = Position {
            x: center.x + su * half_long * cos_d - sv * half_wide * sin_d,
            y: center.y + su * half_long * sin_d + sv * half_wide * cos_d,
        };
        if !raster.is_in_position(&corner) {
            return None;
        }
    }

    let radius = (half_long * half_long + half_wide * half_wide).sqrt();
    let x_lo = raster.x_index((center.x - radius).max(raster.x_offset));
    let x_hi = raster.x_index((center.x + radius).min(raster.x_coord(raster.x_width - 1)));
    let y_lo = raster.y_index((center.y - radius).max(raster.y_offset));
    let y_hi = raster.y_index((center.y + radius).min(raster.y_coord(raster.y_height - 1)));

    let mut cells = Vec::new();
    for x in x_lo..=x_hi {
        for y in y_lo..=y_hi {
            let cell = Cell { x, y };
            let pos = raster.as_position(cell);
            // cell center in swath coordinates
            let rx = pos.x - center.x;
            let ry = pos.y - center.y;
            let along = rx * cos_d + ry * sin_d;
            let across = -rx * sin_d + ry * cos_d;
            // the tolerance keeps cell centers sitting exactly on the swath
            // edge from flickering in and out with heading rounding
            if along.abs() <= half_long + EPSILON && across.abs() <= half_wide + EPSILON {
                cells.push(cell);
            }
        }
    }
    Some(cells)
}

/// The ghost-fire mapping contract: which fire cells does a flight see.
///
/// Injected into the plan; the default implementation below pairs sampled
/// waypoints with the fire data, other implementations may wrap a full
/// camera model.
pub trait FireMapper {
    fn observed_fire_locations(
        &self,
        waypoints: &[Waypoint3d],
        times: &[f64],
        uav: &Uav,
    ) -> Vec<PositionTime>;
}

/// Replays a flight over the fire model: a sampled waypoint observes the
/// cells inside its instantaneous footprint whose cell is burning at that
/// instant. Duplicate sightings collapse to the earliest one.
pub struct GhostFireMapper {
    firedata: Arc<FireData>,
}

impl GhostFireMapper {
    pub fn new(firedata: Arc<FireData>) -> Self {
        GhostFireMapper { firedata }
    }
}

impl FireMapper for GhostFireMapper {
    fn observed_fire_locations(
        &self,
        waypoints: &[Waypoint3d],
        times: &[f64],
        uav: &Uav,
    ) -> Vec<PositionTime> {
        assert!(waypoints.len() == times.len());
        let mut first_seen: BTreeMap<Cell, f64> = BTreeMap::new();
        for (wp, t) in waypoints.iter().zip(times) {
            let footprint = Segment3d::from_waypoint(*wp);
            let Some(cells) = segment_trace(&footprint, uav.view_width, uav.view_depth, &self.firedata.ignitions)
            else {
                continue;
            };
            for cell in cells {
                let ignition = self.firedata.ignitions.get(cell);
                if ignition <= *t && *t <= self.firedata.traversal_end.get(cell) {
                    first_seen.entry(cell).or_insert(*t);
                }
            }
        }
        first_seen
            .into_iter()
            .map(|(cell, time)| PositionTime { pt: self.firedata.ignitions.as_position(cell), time })
            .collect()
    }
}
