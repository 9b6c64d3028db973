//! Dubins-airplane shortest path lengths.
//!
//! Extends the planar Dubins path with a bounded climb slope. Depending on
//! the altitude difference the path is the planar one flown at a shallow
//! climb (low altitude), the planar one at a widened radius (medium
//! altitude), or the planar one with full helix turns inserted to gain
//! altitude at the maximum slope (high altitude).

use firewatch_structs::Waypoint3d;
use log::trace;

use crate::dubins2d::{DubinsPath2d, DubinsPathType};
use crate::PlannerError;

/// Altitude regime of a Dubins-airplane path.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Dubins3dPathType {
    Flat,
    Low,
    Medium,
    High,
}

const MAX_BRACKET_DOUBLINGS: usize = 64;
const MAX_BISECTIONS: usize = 128;

/// Length (and shape summary) of the shortest Dubins-airplane path.
#[derive(Clone, Debug)]
pub struct Dubins3dPathLength {
    /// Planar word flown at radius `r` (helix turns excluded).
    pub path2d: DubinsPath2d,
    pub configuration: Dubins3dPathType,
    pub configuration_2d: DubinsPathType,
    /// Effective turn/helix radius, >= the minimum turning radius.
    pub r: f64,
    /// Path length in space.
    pub length: f64,
    /// Length of the ground projection, helix turns included.
    pub length_2d: f64,
    /// Number of full helix turns inserted (high altitude only).
    pub helix_turns: usize,
    /// Signed climb angle actually flown.
    pub gamma: f64,
}

impl Dubins3dPathLength {
    pub fn new(
        from: &Waypoint3d,
        to: &Waypoint3d,
        r_min: f64,
        gamma_max: f64,
    ) -> Result<Dubins3dPathLength, PlannerError> {
        assert!(r_min > 0.0 && gamma_max > 0.0);

        let start = from.as_2d();
        let end = to.as_2d();
        let delta_z = to.z - from.z;
        let abs_delta_z = delta_z.abs();
        let tan_gamma = gamma_max.tan();

        let flat = DubinsPath2d::shortest(&start, &end, r_min);
        let flat_length = flat.length();

        if abs_delta_z <= flat_length * tan_gamma {
            // the planar path climbs gently enough
            let gamma = delta_z.atan2(flat_length);
            let length = if delta_z == 0.0 { flat_length } else { flat_length / gamma.cos() };
            return Ok(Dubins3dPathLength {
                configuration: if delta_z == 0.0 { Dubins3dPathType::Flat } else { Dubins3dPathType::Low },
                configuration_2d: flat.path_type,
                r: r_min,
                length,
                length_2d: flat_length,
                helix_turns: 0,
                gamma,
                path2d: flat,
            });
        }

        let required_2d = abs_delta_z / tan_gamma;
        let turns = ((required_2d - flat_length) / (2.0 * std::f64::consts::PI * r_min)) as usize;

        if turns >= 1 {
            // climb at full slope, inserting whole helix turns
            let path2d = solve_radius(&start, &end, r_min, required_2d, turns)?;
            trace!(
                "high altitude path, {} turns at radius {:.3} (r_min {:.3})",
                turns,
                path2d.r,
                r_min
            );
            return Ok(Dubins3dPathLength {
                configuration: Dubins3dPathType::High,
                configuration_2d: path2d.path_type,
                r: path2d.r,
                length: abs_delta_z / gamma_max.sin(),
                length_2d: required_2d,
                helix_turns: turns,
                gamma: gamma_max.copysign(delta_z),
                path2d,
            });
        }

        // between the two: widen the turns until the planar path is long
        // enough to climb at full slope without any helix
        let path2d = solve_radius(&start, &end, r_min, required_2d, 0)?;
        trace!("medium altitude path at radius {:.3} (r_min {:.3})", path2d.r, r_min);
        Ok(Dubins3dPathLength {
            configuration: Dubins3dPathType::Medium,
            configuration_2d: path2d.path_type,
            r: path2d.r,
            length: abs_delta_z / gamma_max.sin(),
            length_2d: required_2d,
            helix_turns: 0,
            gamma: gamma_max.copysign(delta_z),
            path2d,
        })
    }
}

/// Finds the radius at which the planar path plus `turns` helix turns has
/// ground length `required_2d`, by bisection on the (monotone) ground length.
fn solve_radius(
    start: &firewatch_structs::Waypoint2d,
    end: &firewatch_structs::Waypoint2d,
    r_min: f64,
    required_2d: f64,
    turns: usize,
) -> Result<DubinsPath2d, PlannerError> {
    let ground_length = |r: f64| {
        DubinsPath2d::shortest(start, end, r).length() + turns as f64 * 2.0 * std::f64::consts::PI * r
    };

    let mut lo = r_min;
    if ground_length(lo) >= required_2d {
        // already long enough at the minimum radius
        return Ok(DubinsPath2d::shortest(start, end, lo));
    }

    let mut hi = 2.0 * r_min;
    let mut doublings = 0;
    while ground_length(hi) < required_2d {
        hi *= 2.0;
        doublings += 1;
        if doublings > MAX_BRACKET_DOUBLINGS {
            return Err(PlannerError::DubinsSolverFailed);
        }
    }

    for _ in 0..MAX_BISECTIONS {
        let mid = 0.5 * (lo + hi);
        if mid <= lo || mid >= hi {
            break; // bracket collapsed to machine precision
        }
        if ground_length(mid) < required_2d {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    Ok(DubinsPath2d::shortest(start, end, hi))
}
