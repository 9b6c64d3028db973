use thiserror::Error;

pub mod dubins2d;
pub mod dubins3d;
pub mod fire_data;
pub mod mapper;
pub mod plan;
pub mod trajectory;
pub mod uav;

pub mod fire_data_tests;
pub mod plan_tests;

#[derive(Error, Clone, Copy, PartialEq, Eq, Debug)]
pub enum PlannerError {
    /// The mutation would break the trajectory configuration (duration
    /// budget or fixed takeoff/landing slots). The trajectory is unchanged.
    #[error("trajectory mutation violates its configuration")]
    TrajectoryInfeasible,
    /// The radius root-finder did not converge.
    #[error("dubins-airplane radius search failed to converge")]
    DubinsSolverFailed,
}
