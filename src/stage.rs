//! Compute kernel stages.
//!
//! A [`KernelStage`] bundles a compiled compute pipeline, its uniform param
//! buffer and the two parity bind groups resolved from its binding set.
//! Shader compilation runs inside a validation error scope so a broken
//! kernel aborts engine construction instead of erroring at first dispatch.

use wgpu::{BindGroup, Buffer, ComputePipeline};

use crate::binding::BindingSet;
use crate::error::EngineError;
use crate::field::FieldStore;
use crate::gpu::GpuContext;
use crate::grid::GridDims;
use crate::schedule::Slot;

/// Role name of the field-seeding kernel.
pub const NOISE_INIT: &str = "noise-init";
/// Role name of the terrain erosion kernel.
pub const EROSION: &str = "erosion";
/// Role name of the temperature/humidity diffusion kernel.
pub const CLIMATE_DIFFUSION: &str = "climate-diffusion";
/// Role name of the biome cellular-automaton kernel.
pub const BIOME_CA: &str = "biome-ca";
/// Role name of the display composite kernel.
pub const VISUALIZATION: &str = "visualization-composite";

/// One compiled kernel stage with its resolved resources.
pub struct KernelStage {
    name: &'static str,
    binding: BindingSet,
    pipeline: ComputePipeline,
    params: Buffer,
    bind_groups: [BindGroup; 2],
}

impl KernelStage {
    /// Validate the binding set, compile the WGSL source and resolve the
    /// parity bind groups. `param_size` is the byte size of the stage's
    /// uniform struct.
    pub fn new(
        ctx: &GpuContext,
        store: &FieldStore,
        name: &'static str,
        source: &str,
        binding: BindingSet,
        param_size: u64,
    ) -> Result<Self, EngineError> {
        binding.validate(name)?;

        let params = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("{name}-params")),
            size: param_size,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        ctx.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = ctx
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(name),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            });
        let bgl = binding.create_layout(ctx, name);
        let layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(&format!("{name}-pl")),
                bind_group_layouts: &[&bgl],
                push_constant_ranges: &[],
            });
        let pipeline = ctx
            .device
            .create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some(name),
                layout: Some(&layout),
                module: &module,
                entry_point: "main",
            });
        if let Some(e) = pollster::block_on(ctx.device.pop_error_scope()) {
            return Err(EngineError::KernelLoad {
                name: name.to_string(),
                reason: e.to_string(),
            });
        }

        let bind_groups = binding.create_bind_groups(ctx, &bgl, store, &params, name);
        Ok(Self { name, binding, pipeline, params, bind_groups })
    }

    /// Stable role name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The stage's declared binding set.
    pub fn binding(&self) -> &BindingSet {
        &self.binding
    }

    /// Refresh the stage's uniform buffer before dispatch.
    pub fn write_params(&self, ctx: &GpuContext, bytes: &[u8]) {
        ctx.queue.write_buffer(&self.params, 0, bytes);
    }

    /// Record this stage's dispatch into an open compute pass, using the
    /// parity bind group for the given current slot.
    pub fn encode<'a>(
        &'a self,
        pass: &mut wgpu::ComputePass<'a>,
        current: Slot,
        dims: GridDims,
    ) {
        let (gx, gy) = dims.dispatch_extent();
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_groups[current.index()], &[]);
        pass.dispatch_workgroups(gx, gy, 1);
    }
}
