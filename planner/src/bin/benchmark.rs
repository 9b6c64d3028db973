use std::sync::Arc;
use std::time::Instant;

use firewatch_planner::fire_data::FireData;
use firewatch_planner::plan::Plan;
use firewatch_planner::trajectory::TrajectoryConfig;
use firewatch_planner::uav::Uav;
use firewatch_structs::raster::Raster;
use firewatch_structs::TimeWindow;

/// Exercises the plan operators on a synthetic eastward-moving fire: greedy
/// best-insertion of observation segments until no insertion improves the
/// plan utility.
pub fn main() {
    env_logger::init();

    let mut ignitions = Raster::fill(0.0, 60, 60, 0.0, 0.0, 25.0);
    for cell in ignitions.cells().collect::<Vec<_>>() {
        ignitions.set(cell, cell.x as f64 * 30.0);
    }
    let firedata = Arc::new(FireData::new(ignitions));

    let uav = Uav::new(18.0, 25.0, 0.1);
    let confs = vec![TrajectoryConfig::new(uav, 0.0, 1800.0); 2];
    let mut plan =
        Plan::new(confs, firedata.clone(), TimeWindow::new(0.0, 1800.0), vec![]).unwrap();

    let mut utility = plan.utility();
    println!(
        "initial utility {:.2} over {} possible observations",
        utility,
        plan.possible_observations.len()
    );

    let t_start = Instant::now();
    for round in 0..40 {
        let mut best: Option<(f64, Plan)> = None;
        for traj_id in 0..plan.trajectories.size() {
            let at = plan.trajectories[traj_id].size();
            for k in 0..8 {
                let pick = (round * 97 + traj_id * 31 + k * 13) % plan.possible_observations.len();
                let target = plan.possible_observations[pick];
                let cell = firedata.ignitions.as_cell(&target.pt);
                // observe across the local propagation direction
                let heading = firedata.propagation_directions.get(cell) + std::f64::consts::FRAC_PI_2;
                let seg = uav.observation_segment(target.pt.x, target.pt.y, 0.0, heading, 50.0);

                let mut candidate = plan.clone();
                if candidate.insert_segment(traj_id, seg, at, true).is_err() {
                    continue;
                }
                let u = candidate.utility();
                if u < best.as_ref().map(|(b, _)| *b).unwrap_or(utility) {
                    best = Some((u, candidate));
                }
            }
        }

        match best {
            Some((u, p)) => {
                plan = p;
                utility = u;
                println!(
                    "round {:02}: utility {:.2}, {} segments, duration {:.0} s",
                    round,
                    utility,
                    plan.num_segments(),
                    plan.duration()
                );
            }
            None => break,
        }
    }

    println!("search took {:?}", t_start.elapsed());
    println!("{}", plan.metadata());

    #[cfg(feature = "prof")]
    hprof::profiler().print_timing();
}
