use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::sync::Arc;

use firewatch_structs::raster::{Cell, Raster};
use firewatch_structs::{PointTimeWindow, PositionTime, Segment3d, TimeWindow};
use log::debug;
use ordered_float::OrderedFloat;
use serde_json::json;

use crate::fire_data::FireData;
use crate::mapper::{segment_trace, FireMapper, GhostFireMapper};
use crate::trajectory::{Trajectories, TrajectoryConfig};
use crate::PlannerError;

/// Distance beyond which an observation carries no information about a point.
pub const MAX_INFORMATIVE_DISTANCE: f64 = 500.0;

/// A point closer than this to an existing observation is already in the
/// pictured area; observing it again is useless.
pub const REDUNDANT_OBS_DIST: f64 = 50.0;

pub const MAX_UTILITY: f64 = 1.0;
pub const MIN_UTILITY: f64 = 0.0;

/// Utility degradation per cell in the propagation variant.
pub const U_INC: f64 = 0.1;

/// Detour ratio above which a transition counts as a tight loop.
pub const SMOOTHING_RATIO: f64 = 2.0;

/// Ground spacing of flight path samples when harvesting observations.
pub const SAMPLING_STEP: f64 = 50.0;

/// A candidate solution: trajectories over a shared fire model, with the
/// bookkeeping needed to score them.
///
/// Plans are value-like: cloning deep-copies the trajectories and shares the
/// (immutable) fire data. Mutation operators change the plan in place; a
/// search driver clones before branching.
#[derive(Clone, Debug)]
pub struct Plan {
    /// Cells igniting outside this window are not considered.
    pub time_window: TimeWindow,
    pub trajectories: Trajectories,
    pub firedata: Arc<FireData>,
    /// Cells that may still be usefully observed, fixed at construction.
    pub possible_observations: Vec<PointTimeWindow>,
    pub observed_previously: Vec<PositionTime>,
}

impl Plan {
    pub fn new(
        confs: Vec<TrajectoryConfig>,
        firedata: Arc<FireData>,
        time_window: TimeWindow,
        observed_previously: Vec<PositionTime>,
    ) -> Result<Plan, PlannerError> {
        for conf in &confs {
            assert!(time_window.contains_time(conf.start_time));
        }
        let trajectories = Trajectories::new(confs)?;

        let prev_cells: Vec<Cell> = observed_previously
            .iter()
            .map(|pt| firedata.ignitions.as_cell(&pt.pt))
            .collect();

        let mut possible_observations = Vec::new();
        for cell in firedata.ignitions.cells() {
            let t = firedata.ignitions.get(cell);
            if firedata.eventually_ignited(cell)
                && time_window.contains_time(t)
                && !prev_cells.contains(&cell)
            {
                possible_observations.push(PointTimeWindow {
                    pt: firedata.ignitions.as_position(cell),
                    tw: TimeWindow { start: t, end: firedata.traversal_end.get(cell) },
                });
            }
        }
        debug!(
            "plan over {} trajectories, {} possible observations",
            trajectories.size(),
            possible_observations.len()
        );

        Ok(Plan { time_window, trajectories, firedata, possible_observations, observed_previously })
    }

    /// A plan is valid iff all trajectories match their configuration.
    pub fn is_valid(&self) -> bool {
        self.trajectories.is_valid()
    }

    /// Sum of all trajectory durations.
    pub fn duration(&self) -> f64 {
        self.trajectories.duration()
    }

    pub fn num_segments(&self) -> usize {
        self.trajectories.num_segments()
    }

    /// Lower is better: every possible observation left uncovered keeps its
    /// distance-based cost in the sum.
    pub fn utility(&self) -> f64 {
        self.utility_map().iter().filter(|u| u.is_finite()).sum()
    }

    pub fn utility_map(&self) -> Raster<f64> {
        self.utility_comp_radial()
    }

    /// All observations in the plan, tagged with the time they are made.
    pub fn observations(&self) -> Vec<PositionTime> {
        self.observations_full()
    }

    /// Observations assuming the camera runs during the whole flight, not
    /// only while on an observation segment.
    pub fn observations_full(&self) -> Vec<PositionTime> {
        #[cfg(feature = "prof")]
        let _p = hprof::enter("observations_full");
        let mapper = GhostFireMapper::new(self.firedata.clone());
        let mut result = Vec::new();
        for traj in &self.trajectories.trajectories {
            let (waypoints, times) = traj.sampled_with_time(SAMPLING_STEP);
            result.extend(mapper.observed_fire_locations(&waypoints, &times, &traj.conf().uav));
        }
        result
    }

    /// Observations made by segments lying entirely inside `tw`: the camera
    /// footprint of each such segment, restricted to cells burning at the
    /// segment start time. Seeded with the previously observed points.
    pub fn observations_in(&self, tw: &TimeWindow) -> Vec<PositionTime> {
        let mut obs = self.observed_previously.clone();
        for traj in &self.trajectories.trajectories {
            let uav = traj.conf().uav;
            for seg_id in 0..traj.size() {
                let seg = traj.maneuver(seg_id);
                let seg_tw = TimeWindow { start: traj.start_time(seg_id), end: traj.end_time(seg_id) };
                if !tw.contains(&seg_tw) {
                    continue;
                }
                let Some(cells) = segment_trace(seg, uav.view_width, uav.view_depth, &self.firedata.ignitions)
                else {
                    continue;
                };
                for cell in cells {
                    if self.firedata.ignitions.get(cell) <= seg_tw.start
                        && seg_tw.start <= self.firedata.traversal_end.get(cell)
                    {
                        obs.push(PositionTime {
                            pt: self.firedata.ignitions.as_position(cell),
                            time: seg_tw.start,
                        });
                    }
                }
            }
        }
        obs
    }

    /// Everything the camera sweeps over during `tw`, burning or not.
    pub fn view_trace(&self, tw: &TimeWindow) -> Vec<PositionTime> {
        let mut trace = Vec::new();
        for traj in &self.trajectories.trajectories {
            let uav = traj.conf().uav;
            for seg_id in 0..traj.size() {
                let seg = traj.maneuver(seg_id);
                let seg_tw = TimeWindow { start: traj.start_time(seg_id), end: traj.end_time(seg_id) };
                if !tw.contains(&seg_tw) {
                    continue;
                }
                let Some(cells) = segment_trace(seg, uav.view_width, uav.view_depth, &self.firedata.ignitions)
                else {
                    continue;
                };
                trace.extend(cells.into_iter().map(|cell| PositionTime {
                    pt: self.firedata.ignitions.as_position(cell),
                    time: seg_tw.start,
                }));
            }
        }
        trace
    }

    pub fn view_trace_full(&self) -> Vec<PositionTime> {
        self.view_trace(&self.time_window)
    }

    pub fn metadata(&self) -> serde_json::Value {
        json!({
            "duration": self.duration(),
            "utility": self.utility(),
            "num_segments": self.num_segments(),
            "trajectories": &self.trajectories.trajectories,
        })
    }

    pub fn insert_segment(
        &mut self,
        traj_id: usize,
        seg: Segment3d,
        at: usize,
        do_post_processing: bool,
    ) -> Result<(), PlannerError> {
        assert!(traj_id < self.trajectories.size());
        self.trajectories[traj_id].insert_segment(at, seg)?;
        if do_post_processing {
            self.post_process();
        }
        Ok(())
    }

    pub fn erase_segment(
        &mut self,
        traj_id: usize,
        at: usize,
        do_post_processing: bool,
    ) -> Result<(), PlannerError> {
        assert!(traj_id < self.trajectories.size());
        self.trajectories[traj_id].erase_segment(at)?;
        if do_post_processing {
            self.post_process();
        }
        Ok(())
    }

    /// Replaces `n_replaced` maneuvers starting at `at` with `segments`, as
    /// one atomic operation, then post-processes.
    pub fn replace_segment(
        &mut self,
        traj_id: usize,
        at: usize,
        n_replaced: usize,
        segments: &[Segment3d],
    ) -> Result<(), PlannerError> {
        assert!(n_replaced > 0);
        assert!(traj_id < self.trajectories.size());
        assert!(at + n_replaced - 1 < self.trajectories[traj_id].size());

        let saved = self.trajectories[traj_id].clone();
        let mut apply = || -> Result<(), PlannerError> {
            for _ in 0..n_replaced {
                self.trajectories[traj_id].erase_segment(at)?;
            }
            for (i, seg) in segments.iter().enumerate() {
                self.trajectories[traj_id].insert_segment(at + i, *seg)?;
            }
            Ok(())
        };
        match apply() {
            Ok(()) => {
                self.post_process();
                Ok(())
            }
            Err(e) => {
                self.trajectories[traj_id] = saved;
                Err(e)
            }
        }
    }

    pub fn post_process(&mut self) {
        self.project_on_fire_front();
        self.smooth_trajectory();
    }

    /// Makes sure every segment observes the fire: each modifiable segment
    /// is projected on the fire front at its start time. Segments with no
    /// projection (or whose projection no longer fits the duration budget)
    /// are erased.
    pub fn project_on_fire_front(&mut self) {
        let firedata = self.firedata.clone();
        for traj in self.trajectories.trajectories.iter_mut() {
            let uav = traj.conf().uav;
            let mut seg_id = traj.first_modifiable_maneuver();
            while let Some(last) = traj.last_modifiable_maneuver() {
                if seg_id > last {
                    break;
                }
                let seg = *traj.maneuver(seg_id);
                let t = traj.start_time(seg_id);
                match firedata.project_on_firefront(&seg, &uav, t) {
                    Some(projected) if projected != seg => {
                        if traj.replace_segment(seg_id, projected).is_ok() {
                            seg_id += 1;
                        } else {
                            let _ = traj.erase_segment(seg_id);
                        }
                    }
                    Some(_) => {
                        seg_id += 1;
                    }
                    None => {
                        // no projection, the segment observes nothing
                        let _ = traj.erase_segment(seg_id);
                    }
                }
            }
        }
    }

    /// Erases segments causing very tight loops: whenever reaching the next
    /// segment takes a detour much longer than the straight-line gap, the
    /// next segment goes, and the new neighbor is examined in turn.
    pub fn smooth_trajectory(&mut self) {
        for traj in self.trajectories.trajectories.iter_mut() {
            let uav = traj.conf().uav;
            let mut seg_id = traj.first_modifiable_maneuver();
            while let Some(last) = traj.last_modifiable_maneuver() {
                if seg_id >= last {
                    break;
                }
                let current_end = traj.maneuver(seg_id).end;
                let next_start = traj.maneuver(seg_id + 1).start;
                let euclidean = current_end.as_point().dist(&next_start.as_point());
                let dubins = match uav.travel_distance(&current_end, &next_start) {
                    Ok(d) => d,
                    Err(_) => {
                        let _ = traj.erase_segment(seg_id + 1);
                        continue;
                    }
                };
                if dubins / euclidean > SMOOTHING_RATIO {
                    let _ = traj.erase_segment(seg_id + 1);
                } else {
                    seg_id += 1;
                }
            }
        }
    }

    /// Distance-to-closest-observation utility. Each possible observation
    /// costs 0 when a done observation is within `REDUNDANT_OBS_DIST`, 1
    /// when none is within `MAX_INFORMATIVE_DISTANCE`, linear in between.
    /// Cells that are no possible observation stay NaN.
    fn utility_comp_radial(&self) -> Raster<f64> {
        #[cfg(feature = "prof")]
        let _p = hprof::enter("utility_comp_radial");
        let mut u_map = Raster::fill_like(f64::NAN, &self.firedata.ignitions);
        let done_obs = self.observations_full();
        for possible in &self.possible_observations {
            let mut min_dist = MAX_INFORMATIVE_DISTANCE * MAX_INFORMATIVE_DISTANCE;
            for obs in &done_obs {
                min_dist = min_dist.min(possible.pt.dist_squared(&obs.pt));
            }
            let u = (min_dist.sqrt().max(REDUNDANT_OBS_DIST) - REDUNDANT_OBS_DIST)
                / (MAX_INFORMATIVE_DISTANCE - REDUNDANT_OBS_DIST);
            u_map.set(u_map.as_cell(&possible.pt), u);
        }
        u_map
    }

    /// Experimental alternative: regressive utility gains propagated to
    /// later-igniting cells along the propagation graph, in ignition order.
    pub fn utility_comp_propagation(&self) -> Raster<f64> {
        let mut u_map = Raster::fill_like(f64::NAN, &self.firedata.ignitions);
        for possible in &self.possible_observations {
            u_map.set(u_map.as_cell(&possible.pt), MAX_UTILITY);
        }

        // min-heap on ignition time
        let mut queue: BinaryHeap<(Reverse<OrderedFloat<f64>>, Cell)> = BinaryHeap::new();
        for obs in self.observations_full() {
            let cell = u_map.as_cell(&obs.pt);
            u_map.set(cell, MIN_UTILITY);
            queue.push((Reverse(OrderedFloat(self.firedata.ignitions.get(cell))), cell));
        }

        while let Some((_, cell)) = queue.pop() {
            let u_cell = u_map.get(cell);
            for neighbor in self.firedata.ignitions.neighbor_cells(cell) {
                // not observable
                if u_map.get(neighbor).is_nan() {
                    continue;
                }
                // ignited before the current cell
                if self.firedata.ignitions.get(neighbor) < self.firedata.ignitions.get(cell) {
                    continue;
                }
                // already at least as useful to observe
                if u_map.get(neighbor) <= u_cell + U_INC {
                    continue;
                }
                let degraded = u_cell + U_INC;
                if degraded < MAX_UTILITY {
                    u_map.set(neighbor, degraded);
                    queue.push((Reverse(OrderedFloat(self.firedata.ignitions.get(neighbor))), neighbor));
                } else {
                    u_map.set(neighbor, MAX_UTILITY);
                }
            }
        }
        u_map
    }
}
