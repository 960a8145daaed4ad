//! Double-buffered field storage on the device.

use wgpu::Buffer;

use crate::error::EngineError;
use crate::gpu::GpuContext;
use crate::grid::GridDims;
use crate::schedule::{RoleAssignment, Slot};

/// Identity of a simulated field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldId {
    /// Terrain height in [0, 1], f32 per cell
    Elevation,
    /// Temperature in [0, 1], f32 per cell
    Temperature,
    /// Humidity in [0, 1], f32 per cell
    Humidity,
    /// Discrete biome class, u32 per cell
    Biome,
}

impl FieldId {
    /// All fields, in stable binding order.
    pub const ALL: [FieldId; 4] = [
        FieldId::Elevation,
        FieldId::Temperature,
        FieldId::Humidity,
        FieldId::Biome,
    ];

    /// Index into per-field arrays.
    pub fn index(self) -> usize {
        match self {
            FieldId::Elevation => 0,
            FieldId::Temperature => 1,
            FieldId::Humidity => 2,
            FieldId::Biome => 3,
        }
    }

    /// Stable name used in buffer labels and diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            FieldId::Elevation => "elevation",
            FieldId::Temperature => "temperature",
            FieldId::Humidity => "humidity",
            FieldId::Biome => "biome",
        }
    }
}

/// Number of simulated fields.
pub const FIELD_COUNT: usize = FieldId::ALL.len();

/// The two physical halves backing one field.
struct FieldPair {
    slots: [Buffer; 2],
}

/// All field buffers plus the single-buffered display target.
///
/// Every cell is 4 bytes (f32 scalar or u32 biome class), so all buffers in
/// the store share one byte size.
pub struct FieldStore {
    dims: GridDims,
    pairs: [FieldPair; FIELD_COUNT],
    display: Buffer,
}

fn storage_buf(ctx: &GpuContext, label: &str, size: u64) -> Buffer {
    ctx.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size,
        usage: wgpu::BufferUsages::STORAGE
            | wgpu::BufferUsages::COPY_SRC
            | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

impl FieldStore {
    /// Allocate both halves of every field plus the display buffer.
    ///
    /// Allocation runs under an out-of-memory error scope; a rejected
    /// allocation surfaces as [`EngineError::Allocation`] and no partially
    /// constructed store is returned.
    pub fn allocate(ctx: &GpuContext, dims: GridDims) -> Result<Self, EngineError> {
        let size = (dims.cells() * std::mem::size_of::<u32>()) as u64;
        ctx.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        let pairs = FieldId::ALL.map(|f| FieldPair {
            slots: [
                storage_buf(ctx, &format!("field-{}-a", f.name()), size),
                storage_buf(ctx, &format!("field-{}-b", f.name()), size),
            ],
        });
        let display = storage_buf(ctx, "display-composite", size);
        if let Some(e) = pollster::block_on(ctx.device.pop_error_scope()) {
            return Err(EngineError::Allocation {
                label: "field store".to_string(),
                reason: e.to_string(),
            });
        }
        Ok(Self { dims, pairs, display })
    }

    /// Grid the store was allocated for.
    pub fn dims(&self) -> GridDims {
        self.dims
    }

    /// Size in bytes of each buffer in the store.
    pub fn byte_size(&self) -> u64 {
        (self.dims.cells() * std::mem::size_of::<u32>()) as u64
    }

    /// Buffer holding `field` in the given physical slot.
    pub fn slot(&self, field: FieldId, slot: Slot) -> &Buffer {
        &self.pairs[field.index()].slots[slot.index()]
    }

    /// Settled buffer every stage reads under `assignment`.
    pub fn read(&self, field: FieldId, assignment: RoleAssignment) -> &Buffer {
        self.slot(field, assignment.current())
    }

    /// Target buffer a writer stage produces into under `assignment`.
    pub fn write_target(&self, field: FieldId, assignment: RoleAssignment) -> &Buffer {
        self.slot(field, assignment.next())
    }

    /// The RGBA8-packed display buffer the visualization composite fills.
    pub fn display(&self) -> &Buffer {
        &self.display
    }
}
