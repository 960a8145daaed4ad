//! Discrete biome classes shared between host code and the WGSL kernels.

/// Biome class stored per cell in the biome field. The `u32` discriminants
/// match the values the kernels read and write.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Biome {
    /// Open water
    Water = 0,
    /// Beach/coastal sand
    Sand = 1,
    /// Grassland
    Grass = 2,
    /// Forest
    Forest = 3,
    /// Desert
    Desert = 4,
    /// Wetland near water
    Wetland = 5,
    /// High-elevation tundra
    Tundra = 6,
    /// Snow cap
    Snow = 7,
}

impl Biome {
    /// All biome classes in discriminant order.
    pub const ALL: [Biome; 8] = [
        Biome::Water,
        Biome::Sand,
        Biome::Grass,
        Biome::Forest,
        Biome::Desert,
        Biome::Wetland,
        Biome::Tundra,
        Biome::Snow,
    ];

    /// Raw cell value written to the biome buffer.
    pub fn raw(self) -> u32 {
        self as u32
    }

    /// Decode a raw cell value; out-of-range values fall back to `Water`.
    pub fn from_raw(v: u32) -> Self {
        *Self::ALL.get(v as usize).unwrap_or(&Biome::Water)
    }

    /// Human-readable name for diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Biome::Water => "water",
            Biome::Sand => "sand",
            Biome::Grass => "grass",
            Biome::Forest => "forest",
            Biome::Desert => "desert",
            Biome::Wetland => "wetland",
            Biome::Tundra => "tundra",
            Biome::Snow => "snow",
        }
    }
}
