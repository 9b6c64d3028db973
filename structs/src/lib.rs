use serde::{Deserialize, Serialize};

pub mod raster;

pub const EPSILON: f64 = 1e-6;

/// Normalizes an angle into [0, 2*PI).
pub fn positive_modulo_2pi(dir: f64) -> f64 {
    let two_pi = 2.0 * std::f64::consts::PI;
    let r = dir % two_pi;
    if r < 0.0 {
        r + two_pi
    } else {
        r
    }
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn dist(&self, other: &Position) -> f64 {
        self.dist_squared(other).sqrt()
    }

    pub fn dist_squared(&self, other: &Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub struct Point3d {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3d {
    pub fn dist(&self, other: &Point3d) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    pub fn as_position(&self) -> Position {
        Position { x: self.x, y: self.y }
    }
}

/// An oriented point in the plane. `dir` is the heading in [0, 2*PI).
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub struct Waypoint2d {
    pub x: f64,
    pub y: f64,
    pub dir: f64,
}

impl Waypoint2d {
    pub fn new(x: f64, y: f64, dir: f64) -> Self {
        Waypoint2d { x, y, dir: positive_modulo_2pi(dir) }
    }
}

/// An oriented point in space. `dir` is the ground heading in [0, 2*PI).
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub struct Waypoint3d {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub dir: f64,
}

impl Waypoint3d {
    pub fn new(x: f64, y: f64, z: f64, dir: f64) -> Self {
        Waypoint3d { x, y, z, dir: positive_modulo_2pi(dir) }
    }

    pub fn as_2d(&self) -> Waypoint2d {
        Waypoint2d { x: self.x, y: self.y, dir: self.dir }
    }

    pub fn as_point(&self) -> Point3d {
        Point3d { x: self.x, y: self.y, z: self.z }
    }

    pub fn as_position(&self) -> Position {
        Position { x: self.x, y: self.y }
    }

    /// The waypoint reached by flying `distance` straight ahead at constant altitude.
    pub fn forward(&self, distance: f64) -> Waypoint3d {
        Waypoint3d {
            x: self.x + distance * self.dir.cos(),
            y: self.y + distance * self.dir.sin(),
            z: self.z,
            dir: self.dir,
        }
    }
}

/// A straight flight maneuver of a given length, flown along the start heading.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub struct Segment3d {
    pub start: Waypoint3d,
    pub end: Waypoint3d,
    pub length: f64,
}

impl Segment3d {
    pub fn new(start: Waypoint3d, length: f64) -> Self {
        debug_assert!(length >= 0.0);
        Segment3d { start, end: start.forward(length), length }
    }

    /// A zero-length segment (a single photographed point).
    pub fn from_waypoint(wp: Waypoint3d) -> Self {
        Segment3d { start: wp, end: wp, length: 0.0 }
    }
}

/// A closed time interval.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub struct TimeWindow {
    pub start: f64,
    pub end: f64,
}

impl TimeWindow {
    pub fn new(start: f64, end: f64) -> Self {
        assert!(start <= end);
        TimeWindow { start, end }
    }

    /// True iff `other` is fully nested in this window.
    pub fn contains(&self, other: &TimeWindow) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn contains_time(&self, t: f64) -> bool {
        self.start <= t && t <= self.end
    }
}

/// A ground position tagged with the time it was (or will be) observed.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub struct PositionTime {
    pub pt: Position,
    pub time: f64,
}

/// A ground position tagged with the interval during which it is observable.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub struct PointTimeWindow {
    pub pt: Position,
    pub tw: TimeWindow,
}
