//! Kernel parameter types and their GPU uniform mirrors.
//!
//! Host-facing parameter structs carry the tunable values with clamping;
//! the `#[repr(C)]` mirrors are the exact layouts the WGSL kernels read.
//! wgpu has no portable push constants, so each stage owns a small uniform
//! buffer refreshed with `queue.write_buffer` before dispatch.

use bytemuck::{Pod, Zeroable};

/// Elevation below which a cell is classified as water.
pub const WATER_LEVEL: f32 = 0.30;

/// Tunable erosion parameters. Defaults match the original tuning.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ErosionParams {
    /// Base relaxation rate toward the neighborhood mean
    pub rate: f32,
    /// Erosion multiplier under forest cover
    pub forest_mult: f32,
    /// Erosion multiplier in desert
    pub desert_mult: f32,
    /// Erosion multiplier on sand
    pub sand_mult: f32,
    /// Extra erosion factor for cells adjacent to water
    pub coastal_bonus: f32,
    /// Whether biome cover modulates the rate at all
    pub biome_modulated: bool,
}

impl Default for ErosionParams {
    fn default() -> Self {
        Self {
            rate: 0.9,
            forest_mult: 0.3,
            desert_mult: 1.5,
            sand_mult: 2.5,
            coastal_bonus: 1.5,
            biome_modulated: true,
        }
    }
}

impl ErosionParams {
    /// Clamp every value into its supported range and return the result.
    pub fn clamped(self) -> Self {
        Self {
            rate: self.rate.clamp(0.0, 1.0),
            forest_mult: self.forest_mult.clamp(0.0, 10.0),
            desert_mult: self.desert_mult.clamp(0.0, 10.0),
            sand_mult: self.sand_mult.clamp(0.0, 10.0),
            coastal_bonus: self.coastal_bonus.clamp(0.0, 10.0),
            biome_modulated: self.biome_modulated,
        }
    }
}

/// Tunable biome cellular-automaton parameters. Defaults match the
/// original tuning.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BiomeParams {
    /// Stochastic forest seeding chance per eligible cell
    pub forest_chance: f32,
    /// Stochastic desert seeding chance per eligible cell
    pub desert_chance: f32,
    /// Forest neighbors required for deterministic spread
    pub forest_threshold: u32,
    /// Desert neighbors required for deterministic spread
    pub desert_threshold: u32,
    /// Wetland formation rate next to water
    pub wetland_form_rate: f32,
    /// Wetland spread rate from wetland neighbors
    pub wetland_spread_rate: f32,
    /// Maximum elevation at which wetland can exist
    pub wetland_max_height: f32,
    /// Snow melt rate below the snow band
    pub snow_melt_rate: f32,
    /// Snow spread rate within the snow band
    pub snow_spread_rate: f32,
    /// Tundra spread rate within the tundra band
    pub tundra_spread_rate: f32,
    /// Elevation of the tree line
    pub tree_line_height: f32,
}

impl Default for BiomeParams {
    fn default() -> Self {
        Self {
            forest_chance: 0.3,
            desert_chance: 0.3,
            forest_threshold: 3,
            desert_threshold: 3,
            wetland_form_rate: 0.08,
            wetland_spread_rate: 0.10,
            wetland_max_height: 0.50,
            snow_melt_rate: 0.01,
            snow_spread_rate: 0.02,
            tundra_spread_rate: 0.03,
            tree_line_height: 0.70,
        }
    }
}

impl BiomeParams {
    /// Clamp every value into its supported range and return the result.
    pub fn clamped(self) -> Self {
        Self {
            forest_chance: self.forest_chance.clamp(0.0, 1.0),
            desert_chance: self.desert_chance.clamp(0.0, 1.0),
            forest_threshold: self.forest_threshold.min(8),
            desert_threshold: self.desert_threshold.min(8),
            wetland_form_rate: self.wetland_form_rate.clamp(0.0, 1.0),
            wetland_spread_rate: self.wetland_spread_rate.clamp(0.0, 1.0),
            wetland_max_height: self.wetland_max_height.clamp(0.0, 1.0),
            snow_melt_rate: self.snow_melt_rate.clamp(0.0, 1.0),
            snow_spread_rate: self.snow_spread_rate.clamp(0.0, 1.0),
            tundra_spread_rate: self.tundra_spread_rate.clamp(0.0, 1.0),
            tree_line_height: self.tree_line_height.clamp(0.0, 1.0),
        }
    }
}

/// What the visualization composite renders into the display buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[repr(u32)]
pub enum VizMode {
    /// Biome colors shaded by elevation
    #[default]
    Terrain = 0,
    /// Temperature heat map
    Temperature = 1,
    /// Humidity map
    Humidity = 2,
}

/// Uniforms for the `noise-init` kernel.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub(crate) struct NoiseUniforms {
    pub width: u32,
    pub height: u32,
    pub seed: u32,
    pub _pad: u32,
}

/// Uniforms for the `erosion` kernel.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub(crate) struct ErosionUniforms {
    pub width: u32,
    pub height: u32,
    pub rate: f32,
    pub forest_mult: f32,
    pub desert_mult: f32,
    pub sand_mult: f32,
    pub coastal_bonus: f32,
    pub biome_modulated: u32,
}

impl ErosionUniforms {
    pub fn new(width: u32, height: u32, p: &ErosionParams) -> Self {
        Self {
            width,
            height,
            rate: p.rate,
            forest_mult: p.forest_mult,
            desert_mult: p.desert_mult,
            sand_mult: p.sand_mult,
            coastal_bonus: p.coastal_bonus,
            biome_modulated: p.biome_modulated as u32,
        }
    }
}

/// Uniforms for the `climate-diffusion` kernel.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub(crate) struct ClimateUniforms {
    pub width: u32,
    pub height: u32,
    pub _pad0: u32,
    pub _pad1: u32,
}

/// Uniforms for the `biome-ca` kernel.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub(crate) struct BiomeUniforms {
    pub width: u32,
    pub height: u32,
    pub seed: u32,
    pub ca_time: u32,
    pub forest_chance: f32,
    pub desert_chance: f32,
    pub forest_threshold: u32,
    pub desert_threshold: u32,
    pub wetland_form_rate: f32,
    pub wetland_spread_rate: f32,
    pub wetland_max_height: f32,
    pub snow_melt_rate: f32,
    pub snow_spread_rate: f32,
    pub tundra_spread_rate: f32,
    pub tree_line_height: f32,
    pub _pad: u32,
}

impl BiomeUniforms {
    pub fn new(width: u32, height: u32, seed: u32, ca_time: u32, p: &BiomeParams) -> Self {
        Self {
            width,
            height,
            seed,
            ca_time,
            forest_chance: p.forest_chance,
            desert_chance: p.desert_chance,
            forest_threshold: p.forest_threshold,
            desert_threshold: p.desert_threshold,
            wetland_form_rate: p.wetland_form_rate,
            wetland_spread_rate: p.wetland_spread_rate,
            wetland_max_height: p.wetland_max_height,
            snow_melt_rate: p.snow_melt_rate,
            snow_spread_rate: p.snow_spread_rate,
            tundra_spread_rate: p.tundra_spread_rate,
            tree_line_height: p.tree_line_height,
            _pad: 0,
        }
    }
}

/// Uniforms for the `visualization-composite` kernel.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub(crate) struct VizUniforms {
    pub width: u32,
    pub height: u32,
    pub mode: u32,
    pub _pad: u32,
}
