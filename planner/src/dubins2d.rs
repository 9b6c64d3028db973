//! Closed-form planar Dubins shortest paths.
//!
//! Shortest path between two oriented points for a vehicle that only moves
//! forward with a bounded turning radius. At most three segments, each a
//! circular arc (L/R) or a straight line (S); the six candidate words are
//! evaluated and the shortest feasible one wins.

use firewatch_structs::{positive_modulo_2pi, Waypoint2d};

/// The six Dubins words, in canonical order.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, serde::Serialize, serde::Deserialize)]
pub enum DubinsPathType {
    Lsl,
    Rsr,
    Lsr,
    Rsl,
    Rlr,
    Lrl,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum SegmentKind {
    Left,
    Straight,
    Right,
}

impl DubinsPathType {
    pub const ALL: [DubinsPathType; 6] = [
        DubinsPathType::Lsl,
        DubinsPathType::Rsr,
        DubinsPathType::Lsr,
        DubinsPathType::Rsl,
        DubinsPathType::Rlr,
        DubinsPathType::Lrl,
    ];

    fn segments(self) -> [SegmentKind; 3] {
        use SegmentKind::*;
        match self {
            DubinsPathType::Lsl => [Left, Straight, Left],
            DubinsPathType::Rsr => [Right, Straight, Right],
            DubinsPathType::Lsr => [Left, Straight, Right],
            DubinsPathType::Rsl => [Right, Straight, Left],
            DubinsPathType::Rlr => [Right, Left, Right],
            DubinsPathType::Lrl => [Left, Right, Left],
        }
    }
}

/// A planar Dubins path of a given word at a fixed turning radius.
///
/// Segment parameters are kept in normalized units (radius 1); world lengths
/// scale by `r`.
#[derive(Clone, Copy, Debug)]
pub struct DubinsPath2d {
    start: Waypoint2d,
    /// Normalized lengths of the three segments.
    params: [f64; 3],
    pub r: f64,
    pub path_type: DubinsPathType,
}

fn mod2pi(theta: f64) -> f64 {
    positive_modulo_2pi(theta)
}

/// Normalized word computations. `d` is the center distance over the radius,
/// `alpha`/`beta` the start/end headings relative to the center line.
fn word_params(word: DubinsPathType, d: f64, alpha: f64, beta: f64) -> Option<[f64; 3]> {
    let ca = alpha.cos();
    let sa = alpha.sin();
    let cb = beta.cos();
    let sb = beta.sin();

    match word {
        DubinsPathType::Lsl => {
            let tmp = 2.0 + d * d - 2.0 * (ca * cb + sa * sb - d * (sa - sb));
            if tmp < 0.0 {
                return None;
            }
            let p = tmp.sqrt();
            let theta = (cb - ca).atan2(d + sa - sb);
            Some([mod2pi(-alpha + theta), p, mod2pi(beta - theta)])
        }
        DubinsPathType::Rsr => {
            let tmp = 2.0 + d * d - 2.0 * (ca * cb + sa * sb - d * (sb - sa));
            if tmp < 0.0 {
                return None;
            }
            let p = tmp.sqrt();
            let theta = (ca - cb).atan2(d - sa + sb);
            Some([mod2pi(alpha - theta), p, mod2pi(-beta + theta)])
        }
        DubinsPathType::Lsr => {
            let tmp = -2.0 + d * d + 2.0 * (ca * cb + sa * sb + d * (sa + sb));
            if tmp < 0.0 {
                return None;
            }
            let p = tmp.sqrt();
            let theta = (-ca - cb).atan2(d + sa + sb) - (-2.0f64).atan2(p);
            Some([mod2pi(-alpha + theta), p, mod2pi(-beta + theta)])
        }
        DubinsPathType::Rsl => {
            let tmp = -2.0 + d * d + 2.0 * (ca * cb + sa * sb - d * (sa + sb));
            if tmp < 0.0 {
                return None;
            }
            let p = tmp.sqrt();
            let theta = (ca + cb).atan2(d - sa - sb) - (2.0f64).atan2(p);
            Some([mod2pi(alpha - theta), p, mod2pi(beta - theta)])
        }
        DubinsPathType::Rlr => {
            let tmp = (6.0 - d * d + 2.0 * (ca * cb + sa * sb + d * (sa - sb))) / 8.0;
            if tmp.abs() > 1.0 {
                return None;
            }
            let p = mod2pi(2.0 * std::f64::consts::PI - tmp.acos());
            let theta = (ca - cb).atan2(d - sa + sb);
            let t = mod2pi(alpha - theta + p / 2.0);
            Some([t, p, mod2pi(alpha - beta - t + p)])
        }
        DubinsPathType::Lrl => {
            let tmp = (6.0 - d * d + 2.0 * (ca * cb + sa * sb - d * (sa - sb))) / 8.0;
            if tmp.abs() > 1.0 {
                return None;
            }
            let p = mod2pi(2.0 * std::f64::consts::PI - tmp.acos());
            let theta = (cb - ca).atan2(d + sa - sb);
            let t = mod2pi(-alpha + theta + p / 2.0);
            Some([t, p, mod2pi(beta - alpha - t + p)])
        }
    }
}

impl DubinsPath2d {
    /// Shortest Dubins path from `start` to `end` at turning radius `r`.
    ///
    /// Always succeeds for `r > 0`: at least one CSC word is feasible for any
    /// pair of configurations, and ties go to the canonical word order.
    pub fn shortest(start: &Waypoint2d, end: &Waypoint2d, r: f64) -> DubinsPath2d {
        assert!(r > 0.0);
        let dx = end.x - start.x;
        let dy = end.y - start.y;
        let d = (dx * dx + dy * dy).sqrt() / r;
        let phi = dy.atan2(dx);
        let alpha = mod2pi(start.dir - phi);
        let beta = mod2pi(end.dir - phi);

        let mut best: Option<(f64, DubinsPathType, [f64; 3])> = None;
        for word in DubinsPathType::ALL {
            if let Some(params) = word_params(word, d, alpha, beta) {
                let len = params[0] + params[1] + params[2];
                if best.map(|(l, _, _)| len < l).unwrap_or(true) {
                    best = Some((len, word, params));
                }
            }
        }

        // the six words jointly cover every configuration pair
        let (_, path_type, params) = best.unwrap();
        DubinsPath2d { start: *start, params, r, path_type }
    }

    pub fn length(&self) -> f64 {
        (self.params[0] + self.params[1] + self.params[2]) * self.r
    }

    /// Configuration reached after following the path for `s` world units.
    ///
    /// `s` is clamped to `[0, length]`.
    pub fn sample(&self, s: f64) -> Waypoint2d {
        let s_norm = (s / self.r).clamp(0.0, self.params[0] + self.params[1] + self.params[2]);

        // work in the normalized frame anchored at the start position
        let mut q = (0.0, 0.0, self.start.dir);
        let mut remaining = s_norm;
        for (kind, param) in self.path_type.segments().into_iter().zip(self.params) {
            let step = remaining.min(param);
            q = segment_end(q, step, kind);
            remaining -= step;
            if remaining <= 0.0 {
                break;
            }
        }

        Waypoint2d::new(q.0 * self.r + self.start.x, q.1 * self.r + self.start.y, q.2)
    }

    pub fn end(&self) -> Waypoint2d {
        self.sample(self.length())
    }
}

/// Advances a normalized configuration by `t` along one segment.
fn segment_end(q: (f64, f64, f64), t: f64, kind: SegmentKind) -> (f64, f64, f64) {
    let (x, y, theta) = q;
    match kind {
        SegmentKind::Left => (
            x + (theta + t).sin() - theta.sin(),
            y - (theta + t).cos() + theta.cos(),
            theta + t,
        ),
        SegmentKind::Right => (
            x - (theta - t).sin() + theta.sin(),
            y + (theta - t).cos() - theta.cos(),
            theta - t,
        ),
        SegmentKind::Straight => (x + theta.cos() * t, y + theta.sin() * t, theta),
    }
}
