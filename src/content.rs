//! Static effect data for weather, terrain, hazards and side conditions.
//!
//! Tables are keyed by identifier; the battle core only reads them.

use crate::types::Type;
use phf::phf_map;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherKind {
    #[default]
    None,
    Sun,
    Rain,
    Sandstorm,
    Hail,
}

impl WeatherKind {
    pub fn id(self) -> &'static str {
        match self {
            WeatherKind::None => "none",
            WeatherKind::Sun => "sun",
            WeatherKind::Rain => "rain",
            WeatherKind::Sandstorm => "sandstorm",
            WeatherKind::Hail => "hail",
        }
    }

    pub fn data(self) -> Option<&'static WeatherData> {
        WEATHER.get(self.id())
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerrainKind {
    #[default]
    None,
    Grassy,
    Electric,
    Psychic,
    Misty,
}

impl TerrainKind {
    pub fn id(self) -> &'static str {
        match self {
            TerrainKind::None => "none",
            TerrainKind::Grassy => "grassyterrain",
            TerrainKind::Electric => "electricterrain",
            TerrainKind::Psychic => "psychicterrain",
            TerrainKind::Misty => "mistyterrain",
        }
    }

    pub fn data(self) -> Option<&'static TerrainData> {
        TERRAIN.get(self.id())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HazardKind {
    Spikes,
    StealthRock,
    ToxicSpikes,
    StickyWeb,
}

impl HazardKind {
    pub const ALL: [HazardKind; 4] = [
        HazardKind::Spikes,
        HazardKind::StealthRock,
        HazardKind::ToxicSpikes,
        HazardKind::StickyWeb,
    ];

    pub fn id(self) -> &'static str {
        match self {
            HazardKind::Spikes => "spikes",
            HazardKind::StealthRock => "stealthrock",
            HazardKind::ToxicSpikes => "toxicspikes",
            HazardKind::StickyWeb => "stickyweb",
        }
    }
}

/// Timed conditions bound to one side.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SideConditionKind {
    Reflect,
    LightScreen,
    AuroraVeil,
    Tailwind,
    Safeguard,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeatherData {
    pub name: &'static str,
    pub boosted_type: Option<Type>,
    pub weakened_type: Option<Type>,
    /// End-of-turn damage as (numerator, denominator) of max HP.
    pub residual: Option<(u16, u16)>,
    pub immune_types: &'static [Type],
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TerrainData {
    pub name: &'static str,
    pub boosted_type: Option<Type>,
    pub heal: Option<(u16, u16)>,
    pub blocks_all_status: bool,
    pub blocks_sleep: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HazardData {
    pub kind: HazardKind,
    pub name: &'static str,
    pub max_layers: u8,
    /// Max-HP fraction per layer count (index 0 = one layer).
    pub layer_fractions: &'static [(u16, u16)],
    /// Damage is further scaled by this type's effectiveness on the entrant.
    pub scaling_type: Option<Type>,
    /// Entrants of this type remove every layer instead of being affected.
    pub absorbed_by: Option<Type>,
    pub affects_airborne: bool,
}

// Showdown: data/conditions.ts (sunnyday, raindance, sandstorm, hail)
pub static WEATHER: phf::Map<&'static str, WeatherData> = phf_map! {
    "sun" => WeatherData {
        name: "Sun",
        boosted_type: Some(Type::Fire),
        weakened_type: Some(Type::Water),
        residual: None,
        immune_types: &[],
    },
    "rain" => WeatherData {
        name: "Rain",
        boosted_type: Some(Type::Water),
        weakened_type: Some(Type::Fire),
        residual: None,
        immune_types: &[],
    },
    "sandstorm" => WeatherData {
        name: "Sandstorm",
        boosted_type: None,
        weakened_type: None,
        residual: Some((1, 16)),
        immune_types: &[Type::Rock, Type::Ground, Type::Steel],
    },
    "hail" => WeatherData {
        name: "Hail",
        boosted_type: None,
        weakened_type: None,
        residual: Some((1, 16)),
        immune_types: &[Type::Ice],
    },
};

// Showdown: data/conditions.ts terrain handlers (grassy heal 1/16, 1.3x boost)
pub static TERRAIN: phf::Map<&'static str, TerrainData> = phf_map! {
    "grassyterrain" => TerrainData {
        name: "Grassy Terrain",
        boosted_type: Some(Type::Grass),
        heal: Some((1, 16)),
        blocks_all_status: false,
        blocks_sleep: false,
    },
    "electricterrain" => TerrainData {
        name: "Electric Terrain",
        boosted_type: Some(Type::Electric),
        heal: None,
        blocks_all_status: false,
        blocks_sleep: true,
    },
    "psychicterrain" => TerrainData {
        name: "Psychic Terrain",
        boosted_type: Some(Type::Psychic),
        heal: None,
        blocks_all_status: false,
        blocks_sleep: false,
    },
    "mistyterrain" => TerrainData {
        name: "Misty Terrain",
        boosted_type: None,
        heal: None,
        blocks_all_status: true,
        blocks_sleep: false,
    },
};

pub static HAZARDS: phf::Map<&'static str, HazardData> = phf_map! {
    "spikes" => HazardData {
        kind: HazardKind::Spikes,
        name: "Spikes",
        max_layers: 3,
        layer_fractions: &[(1, 8), (1, 6), (1, 4)],
        scaling_type: None,
        absorbed_by: None,
        affects_airborne: false,
    },
    "stealthrock" => HazardData {
        kind: HazardKind::StealthRock,
        name: "Stealth Rock",
        max_layers: 1,
        layer_fractions: &[(1, 8)],
        scaling_type: Some(Type::Rock),
        absorbed_by: None,
        affects_airborne: true,
    },
    "toxicspikes" => HazardData {
        kind: HazardKind::ToxicSpikes,
        name: "Toxic Spikes",
        max_layers: 2,
        layer_fractions: &[],
        scaling_type: None,
        absorbed_by: Some(Type::Poison),
        affects_airborne: false,
    },
    "stickyweb" => HazardData {
        kind: HazardKind::StickyWeb,
        name: "Sticky Web",
        max_layers: 1,
        layer_fractions: &[],
        scaling_type: None,
        absorbed_by: None,
        affects_airborne: false,
    },
};

/// Read-only hazard definitions consulted on switch-in.
pub trait HazardLookup: Send + Sync {
    fn hazard(&self, kind: HazardKind) -> Option<&HazardData>;
}

/// Lookups backed by the static tables in this module.
#[derive(Clone, Copy, Debug, Default)]
pub struct StaticContent;

impl HazardLookup for StaticContent {
    fn hazard(&self, kind: HazardKind) -> Option<&HazardData> {
        HAZARDS.get(kind.id())
    }
}

/// Max-HP fraction with the "at least 1 HP" rule used by every residual effect.
pub fn fraction_of(max_hp: u16, (numerator, denominator): (u16, u16)) -> u16 {
    let value = (max_hp as u32 * numerator as u32) / denominator.max(1) as u32;
    value.clamp(1, u16::MAX as u32) as u16
}
