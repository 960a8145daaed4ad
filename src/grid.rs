//! Fixed simulation grid dimensions and dispatch geometry.

/// Workgroup width used by every kernel.
pub const WORKGROUP_X: u32 = 8;
/// Workgroup height used by every kernel.
pub const WORKGROUP_Y: u32 = 8;

/// Grid dimensions in cells, fixed for the lifetime of an engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridDims {
    /// Width in cells
    pub width: u32,
    /// Height in cells
    pub height: u32,
}

impl GridDims {
    /// Create grid dimensions; zero extents are clamped up to 1.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width: width.max(1), height: height.max(1) }
    }

    /// Total cell count.
    pub fn cells(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Workgroup counts for an 8x8 dispatch covering the full grid.
    pub fn dispatch_extent(&self) -> (u32, u32) {
        (
            (self.width + WORKGROUP_X - 1) / WORKGROUP_X,
            (self.height + WORKGROUP_Y - 1) / WORKGROUP_Y,
        )
    }

    /// Linear index of cell (x, y).
    pub fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Neighbor coordinate with clamp-to-edge semantics, mirroring the
    /// kernels' out-of-grid policy for continuous fields.
    pub fn clamped_neighbor(&self, x: u32, y: u32, dx: i32, dy: i32) -> (u32, u32) {
        let nx = (x as i64 + dx as i64).clamp(0, self.width as i64 - 1) as u32;
        let ny = (y as i64 + dy as i64).clamp(0, self.height as i64 - 1) as u32;
        (nx, ny)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_extent_rounds_up() {
        assert_eq!(GridDims::new(64, 64).dispatch_extent(), (8, 8));
        assert_eq!(GridDims::new(65, 63).dispatch_extent(), (9, 8));
        assert_eq!(GridDims::new(1, 1).dispatch_extent(), (1, 1));
    }

    #[test]
    fn zero_extents_clamp_to_one() {
        let g = GridDims::new(0, 0);
        assert_eq!((g.width, g.height), (1, 1));
        assert_eq!(g.cells(), 1);
    }
}
