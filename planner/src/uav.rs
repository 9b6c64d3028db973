use firewatch_structs::{Segment3d, Waypoint3d};
use serde::{Deserialize, Serialize};

use crate::dubins3d::Dubins3dPathLength;
use crate::PlannerError;

/// Kinematic envelope and camera footprint of a fixed-wing observation
/// aircraft. Pure geometry, no mutable state.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub struct Uav {
    /// Cruise speed, ground units per second.
    pub max_air_speed: f64,
    /// Minimum turning radius.
    pub min_turn_radius: f64,
    /// Maximum climb/descent slope, radians.
    pub max_pitch_angle: f64,
    /// Camera footprint across the flight direction, at nominal altitude.
    pub view_width: f64,
    /// Camera footprint along the flight direction, at nominal altitude.
    pub view_depth: f64,
}

impl Uav {
    pub fn new(max_air_speed: f64, min_turn_radius: f64, max_pitch_angle: f64) -> Self {
        Uav { max_air_speed, min_turn_radius, max_pitch_angle, view_width: 100.0, view_depth: 100.0 }
    }

    /// Dubins-airplane travel distance between two oriented waypoints.
    pub fn travel_distance(&self, from: &Waypoint3d, to: &Waypoint3d) -> Result<f64, PlannerError> {
        Ok(Dubins3dPathLength::new(from, to, self.min_turn_radius, self.max_pitch_angle)?.length)
    }

    pub fn travel_time(&self, from: &Waypoint3d, to: &Waypoint3d) -> Result<f64, PlannerError> {
        Ok(self.travel_distance(from, to)? / self.max_air_speed)
    }

    /// Ground swath center of a segment: the midpoint of its axis.
    pub fn visibility_center(&self, segment: &Segment3d) -> Waypoint3d {
        Waypoint3d {
            x: segment.start.x + (segment.length / 2.0) * segment.start.dir.cos(),
            y: segment.start.y + (segment.length / 2.0) * segment.start.dir.sin(),
            z: segment.start.z,
            dir: segment.start.dir,
        }
    }

    /// Segment of the given heading and length whose visibility center falls
    /// on `(x, y)`, flown at altitude `z`.
    pub fn observation_segment(&self, x: f64, y: f64, z: f64, dir: f64, length: f64) -> Segment3d {
        let start = Waypoint3d::new(
            x - (length / 2.0) * dir.cos(),
            y - (length / 2.0) * dir.sin(),
            z,
            dir,
        );
        Segment3d::new(start, length)
    }
}
