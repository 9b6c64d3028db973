#[cfg(test)]
mod tests {
    use firewatch_structs::raster::{Cell, Raster};

    use crate::fire_data::{FireData, TRAVERSAL_BORDER_DWELL};

    /// 10x10 fire igniting column by column, 100 s per column, moving +x.
    fn slope_fire() -> FireData {
        let mut ignitions = Raster::fill(0.0, 10, 10, 0.0, 0.0, 25.0);
        for cell in ignitions.cells().collect::<Vec<_>>() {
            ignitions.set(cell, cell.x as f64 * 100.0);
        }
        FireData::new(ignitions)
    }

    /// 6x6 fire where the right half never ignites.
    fn bounded_fire() -> FireData {
        let mut ignitions = Raster::fill(f64::MAX, 6, 6, 0.0, 0.0, 25.0);
        for cell in ignitions.cells().collect::<Vec<_>>() {
            if cell.x < 3 {
                ignitions.set(cell, cell.x as f64 * 100.0);
            }
        }
        FireData::new(ignitions)
    }

    #[test]
    pub fn test_traversal_end_bounds() {
        let _ = env_logger::try_init();
        let fire = slope_fire();
        for cell in fire.ignitions.cells() {
            assert!(fire.eventually_ignited(cell));
            assert!(fire.traversal_end.get(cell) >= fire.ignitions.get(cell));
        }
        // interior columns traverse until the next column ignites
        assert!((fire.traversal_end.get(Cell { x: 4, y: 5 }) - 500.0).abs() < 1e-9);
        // the last column is a propagation border and dwells
        let last = fire.traversal_end.get(Cell { x: 9, y: 5 });
        assert!((last - (900.0 + TRAVERSAL_BORDER_DWELL)).abs() < 1e-9);
    }

    #[test]
    pub fn test_unignited_cells_keep_sentinel() {
        let _ = env_logger::try_init();
        let fire = bounded_fire();
        let unignited = Cell { x: 4, y: 2 };
        assert!(!fire.eventually_ignited(unignited));
        assert!(fire.ignitions.get(unignited) >= f64::MAX / 2.0);
        assert!(fire.traversal_end.get(unignited) >= f64::MAX / 2.0);
        assert!((fire.propagation_directions.get(unignited) - 0.0).abs() < 1e-9);
    }

    #[test]
    pub fn test_propagation_directions_range() {
        let _ = env_logger::try_init();
        for fire in [slope_fire(), bounded_fire()] {
            for cell in fire.propagation_directions.cells() {
                let dir = fire.propagation_directions.get(cell);
                assert!((-std::f64::consts::PI..=std::f64::consts::PI).contains(&dir));
            }
        }
        // the slope fire propagates due east
        let fire = slope_fire();
        assert!(fire.propagation_directions.get(Cell { x: 5, y: 5 }).abs() < 1e-9);
    }

    #[test]
    pub fn test_projection_identity_inside_interval() {
        let _ = env_logger::try_init();
        let fire = slope_fire();
        let cell = Cell { x: 4, y: 4 };
        // ignites at 400, traversed until 500
        for t in [400.0, 450.0, 500.0] {
            assert_eq!(fire.project_on_fire_front(cell, t), Some(cell));
        }
    }

    #[test]
    pub fn test_projection_walks_the_slope() {
        let _ = env_logger::try_init();
        let fire = slope_fire();
        // front not yet arrived: walk back against the propagation
        assert_eq!(fire.project_on_fire_front(Cell { x: 5, y: 5 }, 0.0), Some(Cell { x: 0, y: 5 }));
        // front already past: walk with the propagation
        assert_eq!(fire.project_on_fire_front(Cell { x: 0, y: 5 }, 250.0), Some(Cell { x: 2, y: 5 }));
    }

    #[test]
    pub fn test_projection_fails_off_grid() {
        let _ = env_logger::try_init();
        let fire = slope_fire();
        // later than anything the map ever burns: the walk leaves the grid
        assert_eq!(fire.project_on_fire_front(Cell { x: 5, y: 5 }, 5000.0), None);
    }

    #[test]
    pub fn test_projection_fails_on_unignited_cells() {
        let _ = env_logger::try_init();
        let fire = bounded_fire();
        // the walk towards later ignitions runs into the unburnable half
        assert_eq!(fire.project_on_fire_front(Cell { x: 2, y: 3 }, 2000.0), None);
    }
}
