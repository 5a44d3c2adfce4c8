//! USDA soil texture classification
//!
//! Soil providers report sand, silt and clay fractions rather than a texture
//! class. The class is derived here with the NRCS texture triangle rules so
//! that it can be encoded like any other categorical feature.

use serde::{Deserialize, Serialize};

/// The 12 USDA texture classes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TextureClass {
    Sand,
    LoamySand,
    SandyLoam,
    Loam,
    SiltLoam,
    Silt,
    SandyClayLoam,
    ClayLoam,
    SiltyClayLoam,
    SandyClay,
    SiltyClay,
    Clay,
}

impl TextureClass {
    pub const ALL: [TextureClass; 12] = [
        TextureClass::Sand,
        TextureClass::LoamySand,
        TextureClass::SandyLoam,
        TextureClass::Loam,
        TextureClass::SiltLoam,
        TextureClass::Silt,
        TextureClass::SandyClayLoam,
        TextureClass::ClayLoam,
        TextureClass::SiltyClayLoam,
        TextureClass::SandyClay,
        TextureClass::SiltyClay,
        TextureClass::Clay,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TextureClass::Sand => "Sand",
            TextureClass::LoamySand => "Loamy Sand",
            TextureClass::SandyLoam => "Sandy Loam",
            TextureClass::Loam => "Loam",
            TextureClass::SiltLoam => "Silt Loam",
            TextureClass::Silt => "Silt",
            TextureClass::SandyClayLoam => "Sandy Clay Loam",
            TextureClass::ClayLoam => "Clay Loam",
            TextureClass::SiltyClayLoam => "Silty Clay Loam",
            TextureClass::SandyClay => "Sandy Clay",
            TextureClass::SiltyClay => "Silty Clay",
            TextureClass::Clay => "Clay",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(name))
    }

    /// Classify from sand, silt and clay percentages.
    ///
    /// Fractions are renormalised to sum to 100. Returns `None` when any
    /// fraction is negative or non-finite, or all are zero.
    pub fn classify(sand: f64, silt: f64, clay: f64) -> Option<Self> {
        let total = sand + silt + clay;
        if [sand, silt, clay].iter().any(|v| !v.is_finite() || *v < 0.0) || total <= 0.0 {
            return None;
        }
        let sand = sand * 100.0 / total;
        let silt = silt * 100.0 / total;
        let clay = clay * 100.0 / total;

        let class = if silt + 1.5 * clay < 15.0 {
            TextureClass::Sand
        } else if silt + 2.0 * clay < 30.0 {
            TextureClass::LoamySand
        } else if (clay >= 7.0 && clay < 20.0 && sand > 52.0)
            || (clay < 7.0 && silt < 50.0)
        {
            TextureClass::SandyLoam
        } else if clay >= 7.0 && clay < 27.0 && silt >= 28.0 && silt < 50.0 && sand <= 52.0 {
            TextureClass::Loam
        } else if silt >= 80.0 && clay < 12.0 {
            TextureClass::Silt
        } else if silt >= 50.0 && clay < 27.0 {
            TextureClass::SiltLoam
        } else if clay >= 20.0 && clay < 35.0 && silt < 28.0 && sand > 45.0 {
            TextureClass::SandyClayLoam
        } else if clay >= 27.0 && clay < 40.0 && sand > 20.0 && sand <= 45.0 {
            TextureClass::ClayLoam
        } else if clay >= 27.0 && clay < 40.0 && sand <= 20.0 {
            TextureClass::SiltyClayLoam
        } else if clay >= 35.0 && sand > 45.0 {
            TextureClass::SandyClay
        } else if clay >= 40.0 && silt >= 40.0 {
            TextureClass::SiltyClay
        } else {
            TextureClass::Clay
        };
        Some(class)
    }
}

impl std::fmt::Display for TextureClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
