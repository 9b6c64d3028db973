use firewatch_structs::{Segment3d, Waypoint3d, EPSILON};
use serde::{Deserialize, Serialize};

use crate::dubins3d::Dubins3dPathLength;
use crate::uav::Uav;
use crate::PlannerError;

/// Fixed parameters of one UAV sortie.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub struct TrajectoryConfig {
    pub uav: Uav,
    /// Takeoff time of the sortie.
    pub start_time: f64,
    /// Maximum flight time.
    pub max_duration: f64,
    /// Non-modifiable first maneuver (takeoff), if any.
    pub fixed_prefix: Option<Segment3d>,
    /// Non-modifiable last maneuver (landing), if any.
    pub fixed_suffix: Option<Segment3d>,
}

impl TrajectoryConfig {
    pub fn new(uav: Uav, start_time: f64, max_duration: f64) -> Self {
        TrajectoryConfig { uav, start_time, max_duration, fixed_prefix: None, fixed_suffix: None }
    }
}

/// A time-ordered sequence of observation maneuvers bound to one config.
///
/// Start times are derived data: after any mutation they are recomputed by
/// accumulating maneuver lengths and Dubins-airplane transition distances at
/// the UAV cruise speed. Mutations that would break the configuration
/// (duration budget, fixed slots) fail and leave the trajectory unchanged.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Trajectory {
    conf: TrajectoryConfig,
    maneuvers: Vec<Segment3d>,
    start_times: Vec<f64>,
}

impl Trajectory {
    pub fn new(conf: TrajectoryConfig) -> Result<Trajectory, PlannerError> {
        let mut maneuvers = Vec::new();
        if let Some(prefix) = conf.fixed_prefix {
            maneuvers.push(prefix);
        }
        if let Some(suffix) = conf.fixed_suffix {
            maneuvers.push(suffix);
        }
        let start_times = compute_start_times(&conf, &maneuvers)?;
        let traj = Trajectory { conf, maneuvers, start_times };
        if traj.duration() > traj.conf.max_duration + EPSILON {
            return Err(PlannerError::TrajectoryInfeasible);
        }
        Ok(traj)
    }

    pub fn conf(&self) -> &TrajectoryConfig {
        &self.conf
    }

    pub fn size(&self) -> usize {
        self.maneuvers.len()
    }

    pub fn maneuver(&self, at: usize) -> &Segment3d {
        &self.maneuvers[at]
    }

    pub fn maneuvers(&self) -> &[Segment3d] {
        &self.maneuvers
    }

    /// Time at which the maneuver at `at` starts.
    pub fn start_time(&self, at: usize) -> f64 {
        self.start_times[at]
    }

    /// Time at which the maneuver at `at` ends.
    pub fn end_time(&self, at: usize) -> f64 {
        self.start_times[at] + self.maneuvers[at].length / self.conf.uav.max_air_speed
    }

    /// Time at which the last maneuver ends, or the configured start time
    /// for an empty trajectory.
    pub fn end_time_total(&self) -> f64 {
        if self.maneuvers.is_empty() {
            self.conf.start_time
        } else {
            self.end_time(self.maneuvers.len() - 1)
        }
    }

    pub fn duration(&self) -> f64 {
        self.end_time_total() - self.conf.start_time
    }

    /// Index of the first maneuver that mutations may touch.
    pub fn first_modifiable_maneuver(&self) -> usize {
        usize::from(self.conf.fixed_prefix.is_some())
    }

    /// Index of the last maneuver that mutations may touch, if any.
    pub fn last_modifiable_maneuver(&self) -> Option<usize> {
        let tail = usize::from(self.conf.fixed_suffix.is_some());
        let end = self.maneuvers.len().checked_sub(tail)?;
        let first = self.first_modifiable_maneuver();
        if end > first {
            Some(end - 1)
        } else {
            None
        }
    }

    fn is_modifiable(&self, at: usize) -> bool {
        at >= self.first_modifiable_maneuver() && self.last_modifiable_maneuver().map(|l| at <= l).unwrap_or(false)
    }

    /// Inserts a maneuver so that it becomes the one at `at`.
    pub fn insert_segment(&mut self, at: usize, seg: Segment3d) -> Result<(), PlannerError> {
        let insertion_end = self.maneuvers.len() - usize::from(self.conf.fixed_suffix.is_some());
        if at < self.first_modifiable_maneuver() || at > insertion_end {
            return Err(PlannerError::TrajectoryInfeasible);
        }
        let mut maneuvers = self.maneuvers.clone();
        maneuvers.insert(at, seg);
        let start_times = compute_start_times(&self.conf, &maneuvers)?;
        if duration_of(&self.conf, &maneuvers, &start_times) > self.conf.max_duration + EPSILON {
            return Err(PlannerError::TrajectoryInfeasible);
        }
        self.maneuvers = maneuvers;
        self.start_times = start_times;
        Ok(())
    }

    /// Removes the maneuver at `at`. Shortens the path (Dubins lengths obey
    /// the triangle inequality), so only the fixed slots are checked.
    pub fn erase_segment(&mut self, at: usize) -> Result<(), PlannerError> {
        if !self.is_modifiable(at) {
            return Err(PlannerError::TrajectoryInfeasible);
        }
        let mut maneuvers = self.maneuvers.clone();
        maneuvers.remove(at);
        let start_times = compute_start_times(&self.conf, &maneuvers)?;
        self.maneuvers = maneuvers;
        self.start_times = start_times;
        Ok(())
    }

    /// Replaces the maneuver at `at`.
    pub fn replace_segment(&mut self, at: usize, seg: Segment3d) -> Result<(), PlannerError> {
        if !self.is_modifiable(at) {
            return Err(PlannerError::TrajectoryInfeasible);
        }
        let mut maneuvers = self.maneuvers.clone();
        maneuvers[at] = seg;
        let start_times = compute_start_times(&self.conf, &maneuvers)?;
        if duration_of(&self.conf, &maneuvers, &start_times) > self.conf.max_duration + EPSILON {
            return Err(PlannerError::TrajectoryInfeasible);
        }
        self.maneuvers = maneuvers;
        self.start_times = start_times;
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.duration() <= self.conf.max_duration + EPSILON
            && self.start_times.windows(2).all(|w| w[0] <= w[1])
    }

    /// Samples the continuous flight path, maneuvers and the Dubins
    /// transitions between them, roughly every `step` ground units. Each
    /// sample carries the time the aircraft passes it.
    pub fn sampled_with_time(&self, step: f64) -> (Vec<Waypoint3d>, Vec<f64>) {
        assert!(step > 0.0);
        let v = self.conf.uav.max_air_speed;
        let mut waypoints = Vec::new();
        let mut times = Vec::new();

        for i in 0..self.maneuvers.len() {
            let seg = &self.maneuvers[i];
            let t0 = self.start_times[i];

            let whole_steps = (seg.length / step).floor() as usize;
            for k in 0..=whole_steps {
                let s = k as f64 * step;
                waypoints.push(seg.start.forward(s));
                times.push(t0 + s / v);
            }
            if seg.length - whole_steps as f64 * step > EPSILON {
                waypoints.push(seg.end);
                times.push(self.end_time(i));
            }

            if i + 1 == self.maneuvers.len() {
                break;
            }
            let next = &self.maneuvers[i + 1];
            if let Ok(path) = Dubins3dPathLength::new(
                &seg.end,
                &next.start,
                self.conf.uav.min_turn_radius,
                self.conf.uav.max_pitch_angle,
            ) {
                let t_depart = self.end_time(i);
                let transition_duration = path.length / v;
                let word_length = path.path2d.length();
                let dz = next.start.z - seg.end.z;
                let mut s = step;
                while s < word_length {
                    let wp = path.path2d.sample(s);
                    let frac = s / word_length;
                    waypoints.push(Waypoint3d::new(wp.x, wp.y, seg.end.z + dz * frac, wp.dir));
                    times.push(t_depart + frac * transition_duration);
                    s += step;
                }
            }
        }

        (waypoints, times)
    }
}

fn compute_start_times(
    conf: &TrajectoryConfig,
    maneuvers: &[Segment3d],
) -> Result<Vec<f64>, PlannerError> {
    let v = conf.uav.max_air_speed;
    let mut times = Vec::with_capacity(maneuvers.len());
    let mut t = conf.start_time;
    for (i, seg) in maneuvers.iter().enumerate() {
        if i > 0 {
            let prev = &maneuvers[i - 1];
            t += prev.length / v + conf.uav.travel_time(&prev.end, &seg.start)?;
        }
        times.push(t);
    }
    Ok(times)
}

fn duration_of(conf: &TrajectoryConfig, maneuvers: &[Segment3d], start_times: &[f64]) -> f64 {
    match maneuvers.last() {
        Some(last) => {
            start_times.last().unwrap() + last.length / conf.uav.max_air_speed - conf.start_time
        }
        None => 0.0,
    }
}

/// The trajectories of a plan, one per configured sortie.
#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct Trajectories {
    pub trajectories: Vec<Trajectory>,
}

impl Trajectories {
    pub fn new(confs: Vec<TrajectoryConfig>) -> Result<Trajectories, PlannerError> {
        let trajectories = confs.into_iter().map(Trajectory::new).collect::<Result<Vec<_>, _>>()?;
        Ok(Trajectories { trajectories })
    }

    pub fn size(&self) -> usize {
        self.trajectories.len()
    }

    pub fn num_segments(&self) -> usize {
        self.trajectories.iter().map(|t| t.size()).sum()
    }

    /// Sum of all trajectory durations.
    pub fn duration(&self) -> f64 {
        self.trajectories.iter().map(|t| t.duration()).sum()
    }

    pub fn is_valid(&self) -> bool {
        self.trajectories.iter().all(|t| t.is_valid())
    }
}

impl std::ops::Index<usize> for Trajectories {
    type Output = Trajectory;
    fn index(&self, index: usize) -> &Trajectory {
        &self.trajectories[index]
    }
}

impl std::ops::IndexMut<usize> for Trajectories {
    fn index_mut(&mut self, index: usize) -> &mut Trajectory {
        &mut self.trajectories[index]
    }
}
