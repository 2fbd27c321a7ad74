// Copyright (c) 2018-2020 Rafael Villar Burke <pachi@ietcc.csic.es>
// Distributed under the MIT License
// (See acoompanying LICENSE file or a copy at http://opensource.org/licenses/MIT)
#![allow(clippy::upper_case_acronyms)]

//! Small, closed enums shared across the model and the engine: surface
//! kind, exposure and orientation.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::utils::normalize;

/// Kind of opaque/transparent surface, used to pick surface-film
/// resistances and K-summary buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SurfaceKind {
    ExteriorWall,
    InteriorWall,
    GroundWall,
    ExteriorRoof,
    InteriorRoof,
    GroundRoof,
    GroundFloor,
    InteriorFloor,
    ExteriorFloor,
    Window,
    Door,
}

impl SurfaceKind {
    /// Whether this kind carries a solar heat gain coefficient (glazed).
    pub fn is_glazed(self) -> bool {
        matches!(self, SurfaceKind::Window)
    }

    /// Surface-category bucket used to select R_si (wall/roof/floor).
    pub fn category(self) -> SurfaceCategory {
        use SurfaceKind::*;
        match self {
            ExteriorWall | InteriorWall | GroundWall | Window | Door => SurfaceCategory::Wall,
            ExteriorRoof | InteriorRoof | GroundRoof => SurfaceCategory::Roof,
            GroundFloor | InteriorFloor | ExteriorFloor => SurfaceCategory::Floor,
        }
    }

    /// Exposure bucket used to select R_si/R_se (direct/indirect/ground).
    pub fn exposure(self) -> Exposure {
        use SurfaceKind::*;
        match self {
            ExteriorWall | ExteriorRoof | ExteriorFloor | Window | Door => Exposure::Direct,
            InteriorWall | InteriorRoof | InteriorFloor => Exposure::Indirect,
            GroundWall | GroundRoof | GroundFloor => Exposure::Ground,
        }
    }
}

/// Surface-film resistance category (UNE-EN ISO 6946 wall/roof/floor split).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SurfaceCategory {
    Wall,
    Roof,
    Floor,
}

/// Exposure of a surface, used to pick which heat-loss coefficient bucket
/// (`H_D`, `H_U`, `H_g`) it contributes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Exposure {
    /// Direct contact with outdoor air.
    Direct,
    /// Indirect: facing an unconditioned/adjacent space.
    Indirect,
    /// Ground-coupled.
    Ground,
}

/// Compass orientation (plus horizontal) of a surface's outward normal.
///
/// Follows the UNE-EN ISO 52016-1 convention used throughout this engine:
/// azimuth measured from south, positive to the east (S=0, E=+90, W=-90).
#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Orientation {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
    /// Horizontal (roofs, skylights) — no azimuth.
    Horizontal,
    /// No radiation exchange at all (interior partitions facing no sky).
    NoExposure,
}

impl Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let printable = match *self {
            Orientation::N => "N",
            Orientation::NE => "NE",
            Orientation::E => "E",
            Orientation::SE => "SE",
            Orientation::S => "S",
            Orientation::SW => "SW",
            Orientation::W => "W",
            Orientation::NW => "NW",
            Orientation::Horizontal => "Horiz.",
            Orientation::NoExposure => "-",
        };
        write!(f, "{printable}")
    }
}

/// Converts a geographic azimuth (degrees, S=0, E=+90, W=-90) to the
/// nearest of the eight compass orientations.
impl From<f32> for Orientation {
    fn from(azimuth: f32) -> Self {
        let azimuth = normalize(azimuth, 0.0, 360.0);
        if azimuth < 22.5 {
            Self::S
        } else if azimuth < 67.5 {
            Self::SE
        } else if azimuth < 112.5 {
            Self::E
        } else if azimuth < 157.5 {
            Self::NE
        } else if azimuth < 202.5 {
            Self::N
        } else if azimuth < 247.5 {
            Self::NW
        } else if azimuth < 292.5 {
            Self::W
        } else if azimuth < 337.5 {
            Self::SW
        } else {
            Self::S
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orientation_from_azimuth() {
        assert_eq!(Orientation::from(0.0), Orientation::S);
        assert_eq!(Orientation::from(90.0), Orientation::E);
        assert_eq!(Orientation::from(-90.0), Orientation::W);
        assert_eq!(Orientation::from(180.0), Orientation::N);
    }

    #[test]
    fn surface_kind_buckets() {
        assert_eq!(SurfaceKind::ExteriorWall.exposure(), Exposure::Direct);
        assert_eq!(SurfaceKind::GroundFloor.exposure(), Exposure::Ground);
        assert_eq!(SurfaceKind::InteriorRoof.category(), SurfaceCategory::Roof);
    }
}
