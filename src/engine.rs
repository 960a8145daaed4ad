//! The world engine facade.
//!
//! One [`WorldEngine`] value owns the field store, the five kernel stages,
//! the ping-pong scheduler, the simulation clock and the in-flight frame
//! throttle. The per-frame path encodes at most one simulation tick
//! followed by the visualization composite into a single command sequence,
//! submits it without blocking, and reclaims frame slots only when more
//! than [`MAX_FRAMES_IN_FLIGHT`] submissions are outstanding.

use std::collections::VecDeque;

use wgpu::Buffer;

use crate::binding::BindingSet;
use crate::clock::SimClock;
use crate::error::EngineError;
use crate::field::{FieldId, FieldStore};
use crate::gpu::GpuContext;
use crate::grid::GridDims;
use crate::hazard::{BarrierPlan, OpAccess};
use crate::params::{
    BiomeParams, BiomeUniforms, ClimateUniforms, ErosionParams, ErosionUniforms,
    NoiseUniforms, VizMode, VizUniforms,
};
use crate::schedule::{PingPongSchedule, RoleAssignment, Slot};
use crate::stage::{
    KernelStage, BIOME_CA, CLIMATE_DIFFUSION, EROSION, NOISE_INIT, VISUALIZATION,
};

/// Maximum frame submissions in flight before `frame` blocks on the oldest.
pub const MAX_FRAMES_IN_FLIGHT: usize = 3;
/// Seed used when the caller does not supply one.
pub const DEFAULT_SEED: u32 = 42;

/// What happens to the CA time counter on reseed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ReseedCounter {
    /// Reset the counter so reseeding with the same seed replays exactly.
    #[default]
    Replay,
    /// Keep the counter running, so a reseed with an old seed still
    /// produces fresh stochastic CA events.
    FreeRunning,
}

/// Consolidated mutable simulation state.
#[derive(Clone, Copy, Debug)]
pub struct SimulationState {
    /// Seed of the current world
    pub seed: u32,
    /// Hash counter fed to the stochastic biome CA, one step per tick
    pub ca_time: u32,
    /// Whether the erosion stage runs
    pub erosion_enabled: bool,
    /// Whether the climate diffusion stage runs
    pub climate_enabled: bool,
    /// Whether the biome CA stage runs
    pub biome_enabled: bool,
    /// Paused engines still composite but never tick
    pub paused: bool,
    /// Active display composite mode
    pub viz_mode: VizMode,
    /// Erosion tuning
    pub erosion: ErosionParams,
    /// Biome CA tuning
    pub biome: BiomeParams,
    /// Reseed counter policy
    pub reseed_counter: ReseedCounter,
}

impl SimulationState {
    fn new(seed: u32) -> Self {
        Self {
            seed,
            ca_time: 0,
            erosion_enabled: true,
            climate_enabled: true,
            biome_enabled: true,
            paused: false,
            viz_mode: VizMode::default(),
            erosion: ErosionParams::default(),
            biome: BiomeParams::default(),
            reseed_counter: ReseedCounter::default(),
        }
    }
}

/// What one `frame` call did.
#[derive(Clone, Copy, Debug)]
pub struct FrameReport {
    /// Whether a simulation tick was committed this frame
    pub ticked: bool,
    /// Tick counter after this frame
    pub tick: u64,
}

/// The settled generation a render collaborator may read.
pub struct FieldFrame<'a> {
    /// Tick the snapshot belongs to
    pub tick: u64,
    /// Settled elevation buffer
    pub elevation: &'a Buffer,
    /// Settled temperature buffer
    pub temperature: &'a Buffer,
    /// Settled humidity buffer
    pub humidity: &'a Buffer,
    /// Settled biome buffer
    pub biome: &'a Buffer,
    /// RGBA8-packed display composite
    pub display: &'a Buffer,
}

struct Stages {
    noise: KernelStage,
    erosion: KernelStage,
    climate: KernelStage,
    biome: KernelStage,
    viz: KernelStage,
}

/// GPU-resident world simulation over four coupled double-buffered fields.
pub struct WorldEngine {
    store: FieldStore,
    stages: Stages,
    schedule: PingPongSchedule,
    clock: SimClock,
    state: SimulationState,
    in_flight: VecDeque<wgpu::SubmissionIndex>,
}

impl WorldEngine {
    /// Build the engine: allocate fields, compile every kernel, resolve
    /// bindings, then seed both halves of every field from `seed`.
    /// Any failure aborts construction; there is no partial engine.
    pub fn new(ctx: &GpuContext, dims: GridDims, seed: u32) -> Result<Self, EngineError> {
        let store = FieldStore::allocate(ctx, dims)?;

        let noise = KernelStage::new(
            ctx,
            &store,
            NOISE_INIT,
            include_str!("../shaders/noise_init.wgsl"),
            BindingSet::new()
                .write(FieldId::Elevation)
                .write(FieldId::Temperature)
                .write(FieldId::Humidity)
                .write(FieldId::Biome),
            std::mem::size_of::<NoiseUniforms>() as u64,
        )?;
        let erosion = KernelStage::new(
            ctx,
            &store,
            EROSION,
            include_str!("../shaders/erosion.wgsl"),
            BindingSet::new()
                .read(FieldId::Elevation)
                .read(FieldId::Biome)
                .write(FieldId::Elevation),
            std::mem::size_of::<ErosionUniforms>() as u64,
        )?;
        let climate = KernelStage::new(
            ctx,
            &store,
            CLIMATE_DIFFUSION,
            include_str!("../shaders/climate.wgsl"),
            BindingSet::new()
                .read(FieldId::Elevation)
                .read(FieldId::Temperature)
                .read(FieldId::Humidity)
                .write(FieldId::Temperature)
                .write(FieldId::Humidity),
            std::mem::size_of::<ClimateUniforms>() as u64,
        )?;
        let biome = KernelStage::new(
            ctx,
            &store,
            BIOME_CA,
            include_str!("../shaders/biome_ca.wgsl"),
            BindingSet::new()
                .read(FieldId::Elevation)
                .read(FieldId::Temperature)
                .read(FieldId::Humidity)
                .read(FieldId::Biome)
                .write(FieldId::Biome),
            std::mem::size_of::<BiomeUniforms>() as u64,
        )?;
        let viz = KernelStage::new(
            ctx,
            &store,
            VISUALIZATION,
            include_str!("../shaders/viz.wgsl"),
            BindingSet::new()
                .read(FieldId::Elevation)
                .read(FieldId::Temperature)
                .read(FieldId::Humidity)
                .read(FieldId::Biome)
                .write_display(),
            std::mem::size_of::<VizUniforms>() as u64,
        )?;

        let mut engine = Self {
            store,
            stages: Stages { noise, erosion, climate, biome, viz },
            schedule: PingPongSchedule::new(),
            clock: SimClock::default(),
            state: SimulationState::new(seed),
            in_flight: VecDeque::new(),
        };
        engine.reseed(ctx, seed);
        Ok(engine)
    }

    /// Grid the engine simulates.
    pub fn dims(&self) -> GridDims {
        self.store.dims()
    }

    /// Ticks committed since construction or the last reseed.
    pub fn current_tick(&self) -> u64 {
        self.schedule.tick()
    }

    /// Read-only view of the consolidated simulation state.
    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    /// The settled buffers for the render collaborator, all from one
    /// generation.
    pub fn snapshot(&self) -> FieldFrame<'_> {
        let settled = self.schedule.settled();
        FieldFrame {
            tick: settled.tick(),
            elevation: self.store.read(FieldId::Elevation, settled),
            temperature: self.store.read(FieldId::Temperature, settled),
            humidity: self.store.read(FieldId::Humidity, settled),
            biome: self.store.read(FieldId::Biome, settled),
            display: self.store.display(),
        }
    }

    /// Advance by `dt` seconds: at most one simulation tick, then the
    /// display composite, submitted as one command sequence.
    ///
    /// A device-rejected submission aborts the tick's commit, keeps the
    /// previously settled generation intact and surfaces as
    /// [`EngineError::Dispatch`]; calling `frame` again next tick is safe.
    pub fn frame(&mut self, ctx: &GpuContext, dt: f32) -> Result<FrameReport, EngineError> {
        let ticked = !self.state.paused && self.clock.tick(dt);
        let assign = self.schedule.begin_tick();
        let dims = self.store.dims();
        // Slot the composite reads: post-commit when a tick is in this
        // submission, otherwise the settled slot.
        let viz_slot = if ticked { assign.next() } else { assign.current() };

        ctx.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame"),
            });

        let mut exec: Vec<(&KernelStage, Slot)> = Vec::with_capacity(4);
        if ticked {
            Self::encode_tick(
                &self.stages,
                &self.store,
                &self.state,
                ctx,
                &mut encoder,
                assign,
                &mut exec,
            );
        }
        self.stages.viz.write_params(
            ctx,
            bytemuck::bytes_of(&VizUniforms {
                width: dims.width,
                height: dims.height,
                mode: self.state.viz_mode as u32,
                _pad: 0,
            }),
        );
        exec.push((&self.stages.viz, viz_slot));

        let ops: Vec<OpAccess> = exec
            .iter()
            .map(|(stage, slot)| {
                let force = stage.name() == VISUALIZATION;
                OpAccess::for_stage(stage.name(), stage.binding(), *slot, force)
            })
            .collect();
        let plan = BarrierPlan::plan(&ops);

        {
            let mut start = 0;
            while start < exec.len() {
                let mut end = start + 1;
                while end < exec.len() && !plan.is_break(end) {
                    end += 1;
                }
                let mut pass = encoder.begin_compute_pass(
                    &wgpu::ComputePassDescriptor {
                        label: Some("frame-pass"),
                        timestamp_writes: None,
                    },
                );
                for (stage, slot) in &exec[start..end] {
                    stage.encode(&mut pass, *slot, dims);
                }
                start = end;
            }
        }

        let idx = ctx.queue.submit(Some(encoder.finish()));
        if let Some(e) = pollster::block_on(ctx.device.pop_error_scope()) {
            // The whole submission was dropped, so nothing ran and the
            // settled generation is untouched.
            self.schedule.abort(assign);
            log::warn!(
                "tick {} submission rejected, commit dropped: {e}",
                assign.tick()
            );
            return Err(EngineError::Dispatch {
                tick: assign.tick(),
                reason: e.to_string(),
            });
        }

        if ticked {
            self.schedule.commit(assign);
            self.state.ca_time = self.state.ca_time.wrapping_add(1);
        }

        self.in_flight.push_back(idx);
        while self.in_flight.len() > MAX_FRAMES_IN_FLIGHT {
            if let Some(oldest) = self.in_flight.pop_front() {
                ctx.device
                    .poll(wgpu::Maintain::WaitForSubmissionIndex(oldest));
            }
        }

        Ok(FrameReport { ticked, tick: self.schedule.tick() })
    }

    /// Encode one simulation tick: copy-forward for fields with no enabled
    /// writer, refresh stage uniforms and queue the enabled stages.
    fn encode_tick<'a>(
        stages: &'a Stages,
        store: &FieldStore,
        state: &SimulationState,
        ctx: &GpuContext,
        encoder: &mut wgpu::CommandEncoder,
        assign: RoleAssignment,
        exec: &mut Vec<(&'a KernelStage, Slot)>,
    ) {
        let dims = store.dims();
        let mut written = [false; crate::field::FIELD_COUNT];

        if state.erosion_enabled {
            stages.erosion.write_params(
                ctx,
                bytemuck::bytes_of(&ErosionUniforms::new(
                    dims.width,
                    dims.height,
                    &state.erosion,
                )),
            );
            exec.push((&stages.erosion, assign.current()));
            written[FieldId::Elevation.index()] = true;
        }
        if state.climate_enabled {
            stages.climate.write_params(
                ctx,
                bytemuck::bytes_of(&ClimateUniforms {
                    width: dims.width,
                    height: dims.height,
                    _pad0: 0,
                    _pad1: 0,
                }),
            );
            exec.push((&stages.climate, assign.current()));
            written[FieldId::Temperature.index()] = true;
            written[FieldId::Humidity.index()] = true;
        }
        if state.biome_enabled {
            stages.biome.write_params(
                ctx,
                bytemuck::bytes_of(&BiomeUniforms::new(
                    dims.width,
                    dims.height,
                    state.seed,
                    state.ca_time,
                    &state.biome,
                )),
            );
            exec.push((&stages.biome, assign.current()));
            written[FieldId::Biome.index()] = true;
        }

        // Fields with no writer this tick still flip roles; carry their
        // content across so the next current half is bit-identical.
        for field in FieldId::ALL {
            if !written[field.index()] {
                encoder.copy_buffer_to_buffer(
                    store.read(field, assign),
                    0,
                    store.write_target(field, assign),
                    0,
                    store.byte_size(),
                );
            }
        }
    }

    /// Re-derive the whole world from `seed`.
    ///
    /// Drains all in-flight work, runs `noise-init` against both physical
    /// halves of every field, refreshes the composite, waits for its own
    /// dispatches, then resets the clock and tick counter. The CA time
    /// counter follows the configured [`ReseedCounter`] policy.
    pub fn reseed(&mut self, ctx: &GpuContext, seed: u32) {
        ctx.device.poll(wgpu::Maintain::Wait);
        self.in_flight.clear();

        self.state.seed = seed;
        if self.state.reseed_counter == ReseedCounter::Replay {
            self.state.ca_time = 0;
        }
        self.schedule.reset();
        self.clock.reset();

        let dims = self.store.dims();
        self.stages.noise.write_params(
            ctx,
            bytemuck::bytes_of(&NoiseUniforms {
                width: dims.width,
                height: dims.height,
                seed,
                _pad: 0,
            }),
        );
        self.stages.viz.write_params(
            ctx,
            bytemuck::bytes_of(&VizUniforms {
                width: dims.width,
                height: dims.height,
                mode: self.state.viz_mode as u32,
                _pad: 0,
            }),
        );

        // Seeding with current = A writes every B half and vice versa, so
        // one dispatch per parity covers both halves with identical values.
        let exec = [
            (&self.stages.noise, Slot::A),
            (&self.stages.noise, Slot::B),
            (&self.stages.viz, self.schedule.settled().current()),
        ];
        let ops: Vec<OpAccess> = exec
            .iter()
            .map(|(stage, slot)| {
                let force = stage.name() == VISUALIZATION;
                OpAccess::for_stage(stage.name(), stage.binding(), *slot, force)
            })
            .collect();
        let plan = BarrierPlan::plan(&ops);

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("reseed"),
            });
        {
            let mut start = 0;
            while start < exec.len() {
                let mut end = start + 1;
                while end < exec.len() && !plan.is_break(end) {
                    end += 1;
                }
                let mut pass = encoder.begin_compute_pass(
                    &wgpu::ComputePassDescriptor {
                        label: Some("reseed-pass"),
                        timestamp_writes: None,
                    },
                );
                for (stage, slot) in &exec[start..end] {
                    stage.encode(&mut pass, *slot, dims);
                }
                start = end;
            }
        }
        ctx.queue.submit(Some(encoder.finish()));
        ctx.device.poll(wgpu::Maintain::Wait);
        log::debug!("reseeded with seed {seed} on {}x{}", dims.width, dims.height);
    }

    /// Change the simulation interval; returns the applied (clamped) value.
    pub fn set_sim_interval(&mut self, seconds: f32) -> f32 {
        self.clock.set_interval(seconds)
    }

    /// Enable or disable the erosion stage.
    pub fn set_erosion_enabled(&mut self, on: bool) {
        self.state.erosion_enabled = on;
    }

    /// Enable or disable the climate diffusion stage.
    pub fn set_climate_enabled(&mut self, on: bool) {
        self.state.climate_enabled = on;
    }

    /// Enable or disable the biome CA stage.
    pub fn set_biome_enabled(&mut self, on: bool) {
        self.state.biome_enabled = on;
    }

    /// Pause or resume ticking; paused engines still composite.
    pub fn set_paused(&mut self, paused: bool) {
        self.state.paused = paused;
    }

    /// Select what the display composite renders.
    pub fn set_viz_mode(&mut self, mode: VizMode) {
        self.state.viz_mode = mode;
    }

    /// Replace the erosion tuning; returns the applied (clamped) values.
    pub fn set_erosion_params(&mut self, p: ErosionParams) -> ErosionParams {
        self.state.erosion = p.clamped();
        self.state.erosion
    }

    /// Replace the biome CA tuning; returns the applied (clamped) values.
    pub fn set_biome_params(&mut self, p: BiomeParams) -> BiomeParams {
        self.state.biome = p.clamped();
        self.state.biome
    }

    /// Choose the reseed CA counter policy.
    pub fn set_reseed_counter(&mut self, policy: ReseedCounter) {
        self.state.reseed_counter = policy;
    }

    /// Diagnostic uniform fill of a scalar field, applied to both halves.
    /// Drains in-flight work first; the host never races the device.
    pub fn splat_scalar(&mut self, ctx: &GpuContext, field: FieldId, value: f32) {
        debug_assert_ne!(field, FieldId::Biome, "biome is not a scalar field");
        let data = vec![value; self.store.dims().cells()];
        self.splat_bytes(ctx, field, bytemuck::cast_slice(&data));
    }

    /// Diagnostic uniform fill of the biome field, applied to both halves.
    pub fn splat_biome(&mut self, ctx: &GpuContext, biome: crate::biome::Biome) {
        let data = vec![biome.raw(); self.store.dims().cells()];
        self.splat_bytes(ctx, FieldId::Biome, bytemuck::cast_slice(&data));
    }

    fn splat_bytes(&mut self, ctx: &GpuContext, field: FieldId, bytes: &[u8]) {
        ctx.device.poll(wgpu::Maintain::Wait);
        self.in_flight.clear();
        for slot in [Slot::A, Slot::B] {
            ctx.queue.write_buffer(self.store.slot(field, slot), 0, bytes);
        }
    }

    /// Blocking readback of a scalar field's settled half, for tests and
    /// diagnostics.
    pub fn read_scalar(&self, ctx: &GpuContext, field: FieldId) -> Vec<f32> {
        self.read_settled(ctx, field)
            .into_iter()
            .map(f32::from_bits)
            .collect()
    }

    /// Blocking readback of the biome field's settled half.
    pub fn read_biome(&self, ctx: &GpuContext) -> Vec<u32> {
        self.read_settled(ctx, FieldId::Biome)
    }

    /// Blocking readback of the RGBA8-packed display composite.
    pub fn read_display(&self, ctx: &GpuContext) -> Vec<u32> {
        blocking_read(ctx, self.store.display(), self.store.dims().cells())
    }

    fn read_settled(&self, ctx: &GpuContext, field: FieldId) -> Vec<u32> {
        let buf = self.store.read(field, self.schedule.settled());
        blocking_read(ctx, buf, self.store.dims().cells())
    }
}

/// Copy a storage buffer into a mappable staging buffer and read it back.
fn blocking_read(ctx: &GpuContext, buf: &Buffer, n: usize) -> Vec<u32> {
    let size = (n * std::mem::size_of::<u32>()) as u64;
    let read_buf = ctx.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("readback"),
        size,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });
    let mut encoder = ctx
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("enc.read"),
        });
    encoder.copy_buffer_to_buffer(buf, 0, &read_buf, 0, size);
    ctx.queue.submit(Some(encoder.finish()));
    read_buf.slice(..).map_async(wgpu::MapMode::Read, |_| {});
    ctx.device.poll(wgpu::Maintain::Wait);
    let data = read_buf.slice(..).get_mapped_range();
    let mut out = vec![0u32; n];
    out.copy_from_slice(bytemuck::cast_slice(&data));
    drop(data);
    read_buf.unmap();
    out
}
