#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use firewatch_structs::raster::Raster;
    use firewatch_structs::{Position, PositionTime, Segment3d, TimeWindow, Waypoint3d};

    use crate::fire_data::FireData;
    use crate::plan::Plan;
    use crate::trajectory::{Trajectory, TrajectoryConfig};
    use crate::uav::Uav;
    use crate::PlannerError;

    const HALF_PI: f64 = std::f64::consts::FRAC_PI_2;

    fn uav() -> Uav {
        Uav::new(18.0, 25.0, 0.1)
    }

    /// 10x10 fire igniting column by column, 100 s per column, moving +x.
    fn slope_fire() -> Arc<FireData> {
        let mut ignitions = Raster::fill(0.0, 10, 10, 0.0, 0.0, 25.0);
        for cell in ignitions.cells().collect::<Vec<_>>() {
            ignitions.set(cell, cell.x as f64 * 100.0);
        }
        Arc::new(FireData::new(ignitions))
    }

    fn empty_plan(max_duration: f64) -> Plan {
        Plan::new(
            vec![TrajectoryConfig::new(uav(), 0.0, max_duration)],
            slope_fire(),
            TimeWindow::new(0.0, f64::INFINITY),
            vec![],
        )
        .unwrap()
    }

    /// A point observation over the early fire front, inside the raster.
    fn observation_over_first_column() -> Segment3d {
        Segment3d::from_waypoint(Waypoint3d::new(50.0, 125.0, 0.0, HALF_PI))
    }

    #[test]
    pub fn test_possible_observations_cover_ignited_cells() {
        let _ = env_logger::try_init();
        let plan = empty_plan(3000.0);
        assert_eq!(plan.possible_observations.len(), 100);
        // nothing observed: every possible observation costs the maximum
        assert!((plan.utility() - 100.0).abs() < 1e-9);
        assert_eq!(plan.num_segments(), 0);
        assert!(plan.is_valid());
    }

    #[test]
    pub fn test_observed_previously_shrinks_possible_observations() {
        let _ = env_logger::try_init();
        let fire = slope_fire();
        let seen = PositionTime { pt: Position { x: 0.0, y: 0.0 }, time: 0.0 };
        let plan = Plan::new(
            vec![TrajectoryConfig::new(uav(), 0.0, 3000.0)],
            fire,
            TimeWindow::new(0.0, f64::INFINITY),
            vec![seen],
        )
        .unwrap();
        assert_eq!(plan.possible_observations.len(), 99);
    }

    #[test]
    pub fn test_time_window_filters_possible_observations() {
        let _ = env_logger::try_init();
        let plan = Plan::new(
            vec![TrajectoryConfig::new(uav(), 0.0, 3000.0)],
            slope_fire(),
            TimeWindow::new(0.0, 450.0),
            vec![],
        )
        .unwrap();
        // columns igniting at 0..=400
        assert_eq!(plan.possible_observations.len(), 50);
    }

    #[test]
    pub fn test_construction_is_deterministic() {
        let _ = env_logger::try_init();
        let mut a = empty_plan(3000.0);
        let mut b = empty_plan(3000.0);
        a.insert_segment(0, observation_over_first_column(), 0, false).unwrap();
        b.insert_segment(0, observation_over_first_column(), 0, false).unwrap();
        assert_eq!(a.possible_observations, b.possible_observations);
        assert_eq!(a.observations_full(), b.observations_full());
        assert_eq!(a.utility(), b.utility());
    }

    #[test]
    pub fn test_utility_decreases_with_coverage() {
        let _ = env_logger::try_init();
        let mut plan = empty_plan(3000.0);
        let before = plan.utility();
        plan.insert_segment(0, observation_over_first_column(), 0, false).unwrap();
        assert!(!plan.observations_full().is_empty());
        assert!(plan.utility() < before);
    }

    #[test]
    pub fn test_insert_then_erase_restores_plan() {
        let _ = env_logger::try_init();
        let mut plan = empty_plan(3000.0);
        let before = plan.utility();
        plan.insert_segment(0, observation_over_first_column(), 0, false).unwrap();
        plan.erase_segment(0, 0, false).unwrap();
        assert_eq!(plan.num_segments(), 0);
        assert!((plan.utility() - before).abs() < 1e-9);
    }

    #[test]
    pub fn test_post_process_projects_on_fire_front() {
        let _ = env_logger::try_init();
        let mut plan = empty_plan(3000.0);
        // centered over a column that ignites at t = 200, observed at t = 0:
        // projection walks back to the burning first column
        plan.insert_segment(0, observation_over_first_column(), 0, true).unwrap();
        assert_eq!(plan.num_segments(), 1);
        let seg = *plan.trajectories[0].maneuver(0);
        assert!((seg.start.x - 0.0).abs() < 1e-9);
        assert!((seg.start.y - 125.0).abs() < 1e-9);
    }

    #[test]
    pub fn test_post_process_is_idempotent() {
        let _ = env_logger::try_init();
        let mut plan = empty_plan(3000.0);
        plan.insert_segment(0, observation_over_first_column(), 0, true).unwrap();
        let segments = plan.num_segments();
        let utility = plan.utility();
        let trajectories = plan.trajectories.clone();
        plan.post_process();
        assert_eq!(plan.num_segments(), segments);
        assert_eq!(plan.trajectories, trajectories);
        assert!((plan.utility() - utility).abs() < 1e-9);
    }

    #[test]
    pub fn test_infeasible_insert_leaves_plan_unchanged() {
        let _ = env_logger::try_init();
        let mut plan = empty_plan(1.0);
        plan.insert_segment(0, observation_over_first_column(), 0, false).unwrap();
        let utility = plan.utility();
        // reaching a second observation takes far longer than the budget
        let far = Segment3d::from_waypoint(Waypoint3d::new(200.0, 125.0, 0.0, HALF_PI));
        let result = plan.insert_segment(0, far, 1, false);
        assert_eq!(result, Err(PlannerError::TrajectoryInfeasible));
        assert_eq!(plan.num_segments(), 1);
        assert_eq!(plan.utility(), utility);
    }

    #[test]
    pub fn test_insert_outside_bounds_is_infeasible() {
        let _ = env_logger::try_init();
        let mut plan = empty_plan(3000.0);
        let result = plan.insert_segment(0, observation_over_first_column(), 3, false);
        assert_eq!(result, Err(PlannerError::TrajectoryInfeasible));
        assert_eq!(plan.num_segments(), 0);
    }

    #[test]
    pub fn test_fixed_slots_are_untouchable() {
        let _ = env_logger::try_init();
        let takeoff = Segment3d::new(Waypoint3d::new(100.0, 100.0, 0.0, 0.0), 30.0);
        let landing = Segment3d::new(Waypoint3d::new(150.0, 50.0, 0.0, std::f64::consts::PI), 30.0);
        let conf = TrajectoryConfig {
            uav: uav(),
            start_time: 0.0,
            max_duration: 10000.0,
            fixed_prefix: Some(takeoff),
            fixed_suffix: Some(landing),
        };
        let mut traj = Trajectory::new(conf).unwrap();

        assert_eq!(traj.size(), 2);
        assert_eq!(traj.first_modifiable_maneuver(), 1);
        assert_eq!(traj.last_modifiable_maneuver(), None);
        assert_eq!(traj.erase_segment(0), Err(PlannerError::TrajectoryInfeasible));
        assert_eq!(traj.erase_segment(1), Err(PlannerError::TrajectoryInfeasible));
        assert_eq!(traj.replace_segment(0, takeoff), Err(PlannerError::TrajectoryInfeasible));

        let obs = Segment3d::from_waypoint(Waypoint3d::new(140.0, 80.0, 0.0, 0.0));
        traj.insert_segment(1, obs).unwrap();
        assert_eq!(traj.size(), 3);
        assert_eq!(traj.last_modifiable_maneuver(), Some(1));
        assert_eq!(*traj.maneuver(0), takeoff);
        assert_eq!(*traj.maneuver(2), landing);
    }

    #[test]
    pub fn test_start_times_accumulate_travel() {
        let _ = env_logger::try_init();
        let mut plan = empty_plan(3000.0);
        let first = observation_over_first_column();
        let second = Segment3d::from_waypoint(Waypoint3d::new(150.0, 125.0, 0.0, HALF_PI));
        plan.insert_segment(0, first, 0, false).unwrap();
        plan.insert_segment(0, second, 1, false).unwrap();

        let traj = &plan.trajectories[0];
        assert_eq!(traj.start_time(0), 0.0);
        let travel = uav().travel_time(&first.end, &second.start).unwrap();
        assert!((traj.start_time(1) - travel).abs() < 1e-9);
        assert!((traj.duration() - travel).abs() < 1e-9);
    }

    #[test]
    pub fn test_observations_in_window() {
        let _ = env_logger::try_init();
        let mut plan = empty_plan(3000.0);
        plan.insert_segment(0, observation_over_first_column(), 0, false).unwrap();
        // the footprint covers five cells of the column burning at t = 0
        let obs = plan.observations_in(&TimeWindow::new(0.0, f64::INFINITY));
        assert_eq!(obs.len(), 5);
        assert!(obs.iter().all(|o| o.pt.x.abs() < 1e-9 && o.time == 0.0));
        // the view trace covers the whole footprint, burning or not
        let trace = plan.view_trace_full();
        assert_eq!(trace.len(), 25);
    }

    #[test]
    pub fn test_replace_segment_atomicity() {
        let _ = env_logger::try_init();
        let mut plan = empty_plan(3000.0);
        plan.insert_segment(0, observation_over_first_column(), 0, false).unwrap();

        // replacement reachable only far outside the duration budget fails
        // without touching the plan
        let mut tight = empty_plan(1.0);
        tight.insert_segment(0, observation_over_first_column(), 0, false).unwrap();
        let saved = tight.trajectories.clone();
        let far = Segment3d::from_waypoint(Waypoint3d::new(225.0, 200.0, 0.0, 0.0));
        let result = tight.replace_segment(0, 0, 1, &[observation_over_first_column(), far]);
        assert_eq!(result, Err(PlannerError::TrajectoryInfeasible));
        assert_eq!(tight.trajectories, saved);

        // a replacement by the same segment post-processes to the same plan
        plan.replace_segment(0, 0, 1, &[observation_over_first_column()]).unwrap();
        assert_eq!(plan.num_segments(), 1);
    }

    #[test]
    pub fn test_metadata_round_trips_trajectories() {
        let _ = env_logger::try_init();
        let mut plan = empty_plan(3000.0);
        plan.insert_segment(0, observation_over_first_column(), 0, false).unwrap();

        let meta = plan.metadata();
        assert_eq!(meta["num_segments"], 1);
        assert!(meta["duration"].is_f64());
        assert!(meta["utility"].is_f64());

        let decoded: Vec<Trajectory> = serde_json::from_value(meta["trajectories"].clone()).unwrap();
        assert_eq!(decoded, plan.trajectories.trajectories);
    }

    #[test]
    pub fn test_propagation_utility_degrades_from_observations() {
        let _ = env_logger::try_init();
        let mut plan = empty_plan(3000.0);
        plan.insert_segment(0, observation_over_first_column(), 0, false).unwrap();

        let u_map = plan.utility_comp_propagation();
        let observed = plan.observations_full();
        assert!(!observed.is_empty());
        for obs in &observed {
            assert_eq!(u_map.get(u_map.as_cell(&obs.pt)), crate::plan::MIN_UTILITY);
        }
        // cells igniting right after an observed one picked up a degraded
        // utility below the maximum
        let next_over = u_map.get(u_map.as_cell(&Position { x: 25.0, y: 125.0 }));
        assert!(next_over > crate::plan::MIN_UTILITY && next_over < crate::plan::MAX_UTILITY);
    }
}
