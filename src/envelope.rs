// Copyright (c) 2018-2020 Rafael Villar Burke <pachi@ietcc.csic.es>
// Distributed under the MIT License
// (See acoompanying LICENSE file or a copy at http://opensource.org/licenses/MIT)

//! C1 EnvelopeAggregator: per-zone transmission heat-loss coefficients
//! and solar aperture, generalizing the teacher's whole-building
//! `KData::K` summary (`energy/mod.rs`) into a per-zone, per-exposure
//! breakdown plus the aperture table C3 needs for solar gains.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::common::{Exposure, Orientation};
use crate::error::{EngineError, Warning};
use crate::materials::{film_resistances, ConstructionLibrary};
use crate::model::{Surface, Zone};

/// Per-zone transmission heat-loss coefficients, W/K, plus the envelope
/// area and per-orientation effective solar aperture area.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneEnvelope {
    /// Direct to outdoor air.
    pub h_d: f32,
    /// Ground-coupled.
    pub h_g: f32,
    /// Via an unconditioned buffer space (indirect, no adjacent zone modelled).
    pub h_u: f32,
    /// Via an adjacent modelled zone at a different setpoint.
    pub h_a: f32,
    /// Thermal-bridge surcharge, ΔU_wb · A_E.
    pub h_tb: f32,
    pub envelope_area_m2: f32,
    /// Effective solar aperture area (A·g·F_c, frame area excluded, plus
    /// the opaque term α·A·U·R_se) per orientation, m².
    pub solar_aperture_m2: HashMap<Orientation, f32>,
    /// Opaque-area-weighted mean solar absorptance α, for the audit trail.
    pub weighted_absorptance: f32,
}

impl ZoneEnvelope {
    /// Total transmission heat-loss coefficient, H_tr = H_D+H_g+H_U+H_A+H_TB.
    pub fn h_tr(&self) -> f32 {
        self.h_d + self.h_g + self.h_u + self.h_a + self.h_tb
    }
}

/// Aggregates a zone's surfaces into its envelope heat-loss coefficients
/// and solar aperture. Returns `EngineError::DegenerateZone` when the
/// zone has floor area but no envelope surfaces at all.
pub fn aggregate(
    zone: &Zone,
    surfaces: &[&Surface],
    constructions: &ConstructionLibrary,
    warnings: &mut Vec<Warning>,
) -> Result<ZoneEnvelope, EngineError> {
    let mut envelope = ZoneEnvelope {
        h_d: 0.0,
        h_g: 0.0,
        h_u: 0.0,
        h_a: 0.0,
        h_tb: 0.0,
        envelope_area_m2: 0.0,
        solar_aperture_m2: HashMap::new(),
        weighted_absorptance: 0.0,
    };
    let mut opaque_area_m2 = 0.0_f32;
    let mut opaque_absorptance_weighted = 0.0_f32;

    for surface in surfaces {
        envelope.envelope_area_m2 += surface.area_m2;

        let (u_value, aperture) = if surface.kind.is_glazed() {
            let glazed = match constructions.glazed_by_id(&surface.construction_id) {
                Some(g) => g,
                None => {
                    continue;
                }
            };
            let (u, u_warning) = glazed.u_value();
            if let Some(w) = u_warning {
                warnings.push(w);
            }
            let (shgc, g_warning) = glazed.shgc();
            if let Some(w) = g_warning {
                warnings.push(w);
            }
            let frame_fraction = glazed.frame_fraction.clamp(0.0, 1.0);
            let glass_area = surface.area_m2 * (1.0 - frame_fraction);
            let aperture = glass_area * shgc * surface.f_c;
            (u, Some(aperture))
        } else {
            let opaque = match constructions.opaque_by_id(&surface.construction_id) {
                Some(o) => o,
                None => continue,
            };
            let category = surface.kind.category();
            let exposure = surface.kind.exposure();
            match opaque.u_value(category, exposure) {
                Ok(u) => {
                    opaque_area_m2 += surface.area_m2;
                    opaque_absorptance_weighted += surface.area_m2 * opaque.absorptance;
                    // Sun-exposed opaque surfaces re-radiate a fraction of
                    // the absorbed solar flux inward through the
                    // construction (α·A·U·R_se), an "equivalent aperture"
                    // area combined with glazing gains below (spec §4.4).
                    let aperture = if exposure == Exposure::Direct {
                        let (_, r_se) = film_resistances(category, exposure);
                        Some(surface.area_m2 * opaque.absorptance * u * r_se)
                    } else {
                        None
                    };
                    (u, aperture)
                }
                Err(w) => {
                    warnings.push(w);
                    continue;
                }
            }
        };

        let ua = u_value * surface.area_m2 * surface.f_x;
        match surface.kind.exposure() {
            Exposure::Direct => envelope.h_d += ua,
            Exposure::Ground => envelope.h_g += ua,
            Exposure::Indirect => {
                if surface.adjacent_zone_id.is_some() {
                    envelope.h_a += ua;
                } else {
                    envelope.h_u += ua;
                }
            }
        }

        if let Some(aperture_m2) = aperture {
            *envelope.solar_aperture_m2.entry(surface.orientation).or_insert(0.0) += aperture_m2;
        }
    }

    envelope.h_tb = zone.thermal_bridge_surcharge * envelope.envelope_area_m2;
    envelope.weighted_absorptance =
        if opaque_area_m2 > 0.0 { opaque_absorptance_weighted / opaque_area_m2 } else { 0.0 };

    if envelope.envelope_area_m2 <= 0.0 && zone.floor_area_m2 > 0.0 {
        return Err(EngineError::DegenerateZone {
            zone_id: zone.id.clone(),
            reason: "zone has floor area but no envelope surfaces".to_string(),
        });
    }

    Ok(envelope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::SurfaceKind;
    use crate::materials::{FrameClass, GasFill, GlassClass, GlazedConstruction, Layer, OpaqueConstruction};
    use crate::model::NightMode;

    fn zone() -> Zone {
        Zone {
            id: "z1".into(),
            name: "Office".into(),
            floor_area_m2: 20.0,
            mean_height_m: 2.8,
            volume_m3: None,
            usage_profile_key: "1_office".into(),
            heating_setpoint_override: None,
            cooling_setpoint_override: None,
            thermal_bridge_surcharge: 0.05,
            thermal_capacity: 130.0,
            night_mode: NightMode::Setback,
            excluded_from_calculation: false,
            ventilation_unit_ids: vec![],
            n50: 4.0,
            shielding_class: 2,
        }
    }

    fn library() -> ConstructionLibrary {
        ConstructionLibrary {
            opaque: vec![OpaqueConstruction {
                id: "wall".into(),
                name: "ext wall".into(),
                layers: vec![Layer { name: "brick".into(), thickness_m: 0.24, conductivity_w_mk: 0.6 }],
                absorptance: 0.5,
            }],
            glazed: vec![GlazedConstruction {
                id: "win".into(),
                name: "double glazed".into(),
                panes: 2,
                gas: GasFill::Air,
                gap_mm: 12.0,
                glass_class: GlassClass::SoftLowE,
                frame_class: FrameClass::PvcOrWood,
                frame_fraction: 0.2,
            }],
        }
    }

    #[test]
    fn aggregates_wall_and_window() {
        let z = zone();
        let wall = Surface {
            id: "s1".into(), zone_id: "z1".into(), kind: SurfaceKind::ExteriorWall, area_m2: 15.0,
            orientation: Orientation::S, tilt_deg: 90.0, construction_id: "wall".into(), f_x: 1.0, f_c: 1.0,
            adjacent_zone_id: None,
        };
        let win = Surface {
            id: "s2".into(), zone_id: "z1".into(), kind: SurfaceKind::Window, area_m2: 5.0,
            orientation: Orientation::S, tilt_deg: 90.0, construction_id: "win".into(), f_x: 1.0, f_c: 0.9,
            adjacent_zone_id: None,
        };
        let mut warnings = vec![];
        let lib = library();
        let env = aggregate(&z, &[&wall, &win], &lib, &mut warnings).unwrap();
        assert!(env.h_d > 0.0);
        assert_eq!(env.h_g, 0.0);
        assert!(env.solar_aperture_m2.get(&Orientation::S).copied().unwrap_or(0.0) > 0.0);
        assert!(env.h_tb > 0.0);
        assert!((env.weighted_absorptance - 0.5).abs() < 1e-6);
    }

    #[test]
    fn sun_exposed_opaque_wall_contributes_solar_aperture() {
        let z = zone();
        let wall = Surface {
            id: "s1".into(), zone_id: "z1".into(), kind: SurfaceKind::ExteriorWall, area_m2: 15.0,
            orientation: Orientation::S, tilt_deg: 90.0, construction_id: "wall".into(), f_x: 1.0, f_c: 1.0,
            adjacent_zone_id: None,
        };
        let mut warnings = vec![];
        let lib = library();
        let env = aggregate(&z, &[&wall], &lib, &mut warnings).unwrap();
        assert!(env.solar_aperture_m2.get(&Orientation::S).copied().unwrap_or(0.0) > 0.0);
    }

    #[test]
    fn zone_with_area_but_no_surfaces_is_degenerate() {
        let z = zone();
        let mut warnings = vec![];
        let lib = library();
        let result = aggregate(&z, &[], &lib, &mut warnings);
        assert!(matches!(result, Err(EngineError::DegenerateZone { .. })));
    }
}
