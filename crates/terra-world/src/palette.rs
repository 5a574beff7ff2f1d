//! Elevation bands and their colours.
//!
//! The RGB values here are a visual compatibility contract: two renders of
//! the same field must match byte for byte across versions.

/// RGB triple.
pub type Rgb = [u8; 3];

/// Void (elevation clipped to zero).
pub const VOID: Rgb = [15, 0, 40];
/// Void shine.
pub const VOID_SHINE: Rgb = [60, 20, 80];
/// Abyss.
pub const ABYSS: Rgb = [44, 9, 84];
/// Abyss shine.
pub const ABYSS_SHINE: Rgb = [80, 60, 120];
/// Deep sea.
pub const DEEP_SEA: Rgb = [60, 30, 150];
/// Deep sea shine.
pub const DEEP_SEA_SHINE: Rgb = [160, 160, 200];
/// Sea.
pub const SEA: Rgb = [80, 80, 200];
/// Shallow sea.
pub const SHALLOW_SEA: Rgb = [90, 150, 255];
/// Foam line.
pub const FOAM: Rgb = [184, 210, 255];
/// Shoreline sand.
pub const SHORELINE: Rgb = [242, 216, 189];
/// Shoreline rock outcrop.
pub const ROCK: Rgb = [97, 79, 61];
/// Meadow grass.
pub const MEADOW: Rgb = [115, 191, 99];
/// Flowers on flat meadow.
pub const FLOWER: Rgb = [153, 69, 209];
/// Scattered wildflowers.
pub const WILDFLOWER: Rgb = [106, 101, 240];
/// Forest.
pub const FOREST: Rgb = [54, 156, 83];
/// Forest hillside.
pub const FOREST_CLIFF: Rgb = [120, 70, 50];
/// Mountain.
pub const MOUNTAIN: Rgb = [18, 102, 57];
/// Mountain cliff.
pub const MOUNTAIN_CLIFF: Rgb = [92, 53, 37];
/// High mountain.
pub const HIGH_MOUNTAIN: Rgb = [7, 77, 43];
/// High mountain cliff.
pub const HIGH_MOUNTAIN_CLIFF: Rgb = [66, 38, 32];
/// Peaks.
pub const PEAKS: Rgb = [200, 200, 220];
/// Snowcap (elevation exactly one).
pub const SNOWCAP: Rgb = [230, 230, 250];

/// Elevation band, ordered from lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Band {
    /// Exactly zero
    Void,
    /// Below 0.10
    Abyss,
    /// Below 0.26
    DeepSea,
    /// Below 0.32
    Sea,
    /// Below 0.38
    ShallowSea,
    /// Below 0.40
    Foam,
    /// Below 0.50
    Shoreline,
    /// Below 0.62
    Meadow,
    /// Below 0.72
    Forest,
    /// Below 0.82
    Mountain,
    /// Below 0.95
    HighMountain,
    /// Below 1.0
    Peaks,
    /// Exactly one
    Snowcap,
}

impl Band {
    /// Classifies an elevation. Values are clamped to `[0, 1]` first.
    #[must_use]
    pub fn classify(value: f64) -> Self {
        match value.clamp(0.0, 1.0) {
            v if v == 0.0 => Self::Void,
            v if v < 0.10 => Self::Abyss,
            v if v < 0.26 => Self::DeepSea,
            v if v < 0.32 => Self::Sea,
            v if v < 0.38 => Self::ShallowSea,
            v if v < 0.40 => Self::Foam,
            v if v < 0.50 => Self::Shoreline,
            v if v < 0.62 => Self::Meadow,
            v if v < 0.72 => Self::Forest,
            v if v < 0.82 => Self::Mountain,
            v if v < 0.95 => Self::HighMountain,
            v if v < 1.0 => Self::Peaks,
            _ => Self::Snowcap,
        }
    }

    /// Base colour before decoration.
    #[must_use]
    pub const fn base_color(self) -> Rgb {
        match self {
            Self::Void => VOID,
            Self::Abyss => ABYSS,
            Self::DeepSea => DEEP_SEA,
            Self::Sea => SEA,
            Self::ShallowSea => SHALLOW_SEA,
            Self::Foam => FOAM,
            Self::Shoreline => SHORELINE,
            Self::Meadow => MEADOW,
            Self::Forest => FOREST,
            Self::Mountain => MOUNTAIN,
            Self::HighMountain => HIGH_MOUNTAIN,
            Self::Peaks => PEAKS,
            Self::Snowcap => SNOWCAP,
        }
    }

    /// Cliff colour for slope-shaded bands.
    #[must_use]
    pub const fn cliff_color(self) -> Option<Rgb> {
        match self {
            Self::Forest => Some(FOREST_CLIFF),
            Self::Mountain => Some(MOUNTAIN_CLIFF),
            Self::HighMountain => Some(HIGH_MOUNTAIN_CLIFF),
            _ => None,
        }
    }
}
