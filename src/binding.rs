//! Declarative kernel binding sets.
//!
//! Each stage declares its reads and writes once; the set resolves into one
//! bind group layout and two parity bind groups at startup. Reads always
//! bind the current half and writes the next half (or the display buffer),
//! so a stage can never alias one physical buffer as both its own input and
//! output. Binding slot 0 is always the stage's param uniform.

use smallvec::SmallVec;
use wgpu::{BindGroup, BindGroupLayout, Buffer};

use crate::error::EngineError;
use crate::field::{FieldId, FieldStore};
use crate::gpu::GpuContext;
use crate::schedule::Slot;

/// One declared buffer binding of a kernel stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Binding {
    /// Read the settled (current) half of a field.
    ReadCurrent(FieldId),
    /// Write the in-progress (next) half of a field.
    WriteNext(FieldId),
    /// Write the single-buffered display composite.
    WriteDisplay,
}

impl Binding {
    fn is_write(self) -> bool {
        !matches!(self, Binding::ReadCurrent(_))
    }
}

/// Ordered binding declarations for one stage.
#[derive(Clone, Debug, Default)]
pub struct BindingSet {
    entries: SmallVec<[Binding; 8]>,
}

impl BindingSet {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a read of `field`'s current half.
    pub fn read(mut self, field: FieldId) -> Self {
        self.entries.push(Binding::ReadCurrent(field));
        self
    }

    /// Declare a write to `field`'s next half.
    pub fn write(mut self, field: FieldId) -> Self {
        self.entries.push(Binding::WriteNext(field));
        self
    }

    /// Declare a write to the display buffer.
    pub fn write_display(mut self) -> Self {
        self.entries.push(Binding::WriteDisplay);
        self
    }

    /// Declared bindings in bind-slot order (slot 0 is the uniform, so
    /// entry `i` occupies slot `i + 1`).
    pub fn entries(&self) -> &[Binding] {
        &self.entries
    }

    /// Fields this set writes.
    pub fn written_fields(&self) -> SmallVec<[FieldId; 4]> {
        self.entries
            .iter()
            .filter_map(|b| match b {
                Binding::WriteNext(f) => Some(*f),
                _ => None,
            })
            .collect()
    }

    /// Whether the set writes the display buffer.
    pub fn writes_display(&self) -> bool {
        self.entries.contains(&Binding::WriteDisplay)
    }

    /// Startup validation: a stage must write something, must not declare
    /// the same write twice, and must not read and write the same field
    /// role redundantly.
    pub fn validate(&self, stage: &str) -> Result<(), EngineError> {
        let invalid = |reason: String| EngineError::InvalidBindings {
            stage: stage.to_string(),
            reason,
        };
        if !self.entries.iter().any(|b| b.is_write()) {
            return Err(invalid("declares no write target".to_string()));
        }
        for (i, b) in self.entries.iter().enumerate() {
            if self.entries[..i].contains(b) {
                return Err(invalid(format!("duplicate binding {b:?}")));
            }
        }
        Ok(())
    }

    /// Resolve the set into a bind group layout. Slot 0 is the uniform
    /// param buffer; storage entries follow in declaration order.
    pub fn create_layout(&self, ctx: &GpuContext, stage: &str) -> BindGroupLayout {
        let mut entries = Vec::with_capacity(self.entries.len() + 1);
        entries.push(wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        });
        for (i, b) in self.entries.iter().enumerate() {
            entries.push(wgpu::BindGroupLayoutEntry {
                binding: (i + 1) as u32,
                visibility: wgpu::ShaderStages::COMPUTE,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Storage {
                        read_only: !b.is_write(),
                    },
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            });
        }
        ctx.device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some(&format!("{stage}-bgl")),
                entries: &entries,
            })
    }

    /// Resolve the set against the store into the two parity bind groups,
    /// indexed by the current slot's index for the tick being encoded.
    pub fn create_bind_groups(
        &self,
        ctx: &GpuContext,
        layout: &BindGroupLayout,
        store: &FieldStore,
        params: &Buffer,
        stage: &str,
    ) -> [BindGroup; 2] {
        [Slot::A, Slot::B].map(|current| {
            let mut entries = Vec::with_capacity(self.entries.len() + 1);
            entries.push(wgpu::BindGroupEntry {
                binding: 0,
                resource: params.as_entire_binding(),
            });
            for (i, b) in self.entries.iter().enumerate() {
                let buf = match b {
                    Binding::ReadCurrent(f) => store.slot(*f, current),
                    Binding::WriteNext(f) => store.slot(*f, current.other()),
                    Binding::WriteDisplay => store.display(),
                };
                entries.push(wgpu::BindGroupEntry {
                    binding: (i + 1) as u32,
                    resource: buf.as_entire_binding(),
                });
            }
            ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(&format!("{stage}-bg-{current:?}")),
                layout,
                entries: &entries,
            })
        })
    }
}
