use vivaria::grid::GridDims;

/// The clamp-to-edge neighbor policy never produces an out-of-grid index,
/// on every edge and corner.
#[test]
fn clamped_neighbor_stays_in_bounds_everywhere() {
    let dims = GridDims::new(7, 5);
    let edge_cells = [
        (0, 0),
        (dims.width - 1, 0),
        (0, dims.height - 1),
        (dims.width - 1, dims.height - 1),
        (3, 0),
        (3, dims.height - 1),
        (0, 2),
        (dims.width - 1, 2),
    ];
    for (x, y) in edge_cells {
        for dy in -1..=1 {
            for dx in -1..=1 {
                let (nx, ny) = dims.clamped_neighbor(x, y, dx, dy);
                assert!(nx < dims.width, "x escaped at ({x},{y}) + ({dx},{dy})");
                assert!(ny < dims.height, "y escaped at ({x},{y}) + ({dx},{dy})");
                assert!(dims.index(nx, ny) < dims.cells());
            }
        }
    }
}

#[test]
fn clamping_is_identity_in_the_interior() {
    let dims = GridDims::new(8, 8);
    assert_eq!(dims.clamped_neighbor(4, 4, 1, -1), (5, 3));
    assert_eq!(dims.clamped_neighbor(4, 4, 0, 0), (4, 4));
}

#[test]
fn one_cell_grid_always_resolves_to_itself() {
    let dims = GridDims::new(1, 1);
    for dy in -1..=1 {
        for dx in -1..=1 {
            assert_eq!(dims.clamped_neighbor(0, 0, dx, dy), (0, 0));
        }
    }
}
