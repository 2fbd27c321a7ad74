// Copyright (c) 2018-2020 Rafael Villar Burke <pachi@ietcc.csic.es>
// Distributed under the MIT License
// (See acoompanying LICENSE file or a copy at http://opensource.org/licenses/MIT)

//! The building description: zones, envelope surfaces, ventilation units
//! and HVAC/DHW/lighting/PV systems (spec §3, "Data model").
//!
//! Ownership is strictly downward — [`Project`] owns [`Zone`]s and
//! [`Surface`]s; zones and systems reference constructions and
//! ventilation units by stable `id: String`, never by pointer, following
//! the teacher crate's arena-style string-id convention
//! (`Wall.cons: String`, `Wall.space: String` in `bemodel::model`).

use serde::{Deserialize, Serialize};

use crate::catalogue::BacsClass;
use crate::common::{Orientation, SurfaceKind};

/// Top-level owner of a building description. Renamed from the teacher's
/// `Model` to avoid colliding with `UsageProfile`/catalogue terminology.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Project {
    pub meta: Meta,
    pub zones: Vec<Zone>,
    pub surfaces: Vec<Surface>,
    pub ventilation_units: Vec<VentilationUnit>,
    pub systems: Vec<System>,
}

impl Project {
    pub fn as_json(&self) -> Result<String, anyhow::Error> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(data: &str) -> Result<Self, anyhow::Error> {
        Ok(serde_json::from_str(data)?)
    }

    pub fn zone_by_id(&self, id: &str) -> Option<&Zone> {
        self.zones.iter().find(|z| z.id == id)
    }

    pub fn surfaces_of_zone<'a>(&'a self, zone_id: &'a str) -> impl Iterator<Item = &'a Surface> {
        self.surfaces.iter().filter(move |s| s.zone_id == zone_id)
    }

    pub fn ventilation_unit_by_id(&self, id: &str) -> Option<&VentilationUnit> {
        self.ventilation_units.iter().find(|v| v.id == id)
    }

    /// Heating system assigned to a zone, if any (spec invariant: at most one).
    pub fn heating_system_for_zone(&self, zone_id: &str) -> Option<&EndUseSystem> {
        self.systems.iter().find_map(|s| match s {
            System::Heating(sys) if sys.serves(zone_id) => Some(sys),
            _ => None,
        })
    }

    pub fn cooling_system_for_zone(&self, zone_id: &str) -> Option<&EndUseSystem> {
        self.systems.iter().find_map(|s| match s {
            System::Cooling(sys) if sys.serves(zone_id) => Some(sys),
            _ => None,
        })
    }

    pub fn dhw_system_for_zone(&self, zone_id: &str) -> Option<&EndUseSystem> {
        self.systems.iter().find_map(|s| match s {
            System::Dhw(sys) if sys.serves(zone_id) => Some(sys),
            _ => None,
        })
    }

    pub fn ahu_systems_for_zone<'a>(&'a self, zone_id: &'a str) -> impl Iterator<Item = &'a AhuSystem> {
        self.systems.iter().filter_map(move |s| match s {
            System::Ahu(sys) if sys.serves(zone_id) => Some(sys),
            _ => None,
        })
    }

    pub fn lighting_system_for_zone(&self, zone_id: &str) -> Option<&LightingSystem> {
        self.systems.iter().find_map(|s| match s {
            System::Lighting(sys) if sys.serves(zone_id) => Some(sys),
            _ => None,
        })
    }

    pub fn pv_systems(&self) -> impl Iterator<Item = &PvSystem> {
        self.systems.iter().filter_map(|s| match s {
            System::Pv(sys) => Some(sys),
            _ => None,
        })
    }
}

/// Building-level metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meta {
    pub name: String,
    /// Building-automation-and-control-system class, used to index the
    /// catalogue's BACS adaptation vector.
    pub automation_class: BacsClass,
}

impl Default for Meta {
    fn default() -> Self {
        Meta {
            name: "Untitled project".to_string(),
            automation_class: BacsClass::C,
        }
    }
}

/// Reduced-operation mode applied to non-usage periods (spec glossary:
/// setback/shutdown).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NightMode {
    /// Setpoint lowered by the profile's setback delta during non-usage.
    Setback,
    /// Heating/cooling switched off entirely during non-usage.
    Shutdown,
    /// Continuous operation, no reduction.
    None,
}

/// A thermal zone: one usage profile, one set of setpoints, one envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Zone {
    pub id: String,
    pub name: String,
    pub floor_area_m2: f32,
    pub mean_height_m: f32,
    /// Explicit volume override; defaults to `floor_area_m2 * mean_height_m`.
    pub volume_m3: Option<f32>,
    pub usage_profile_key: String,
    pub heating_setpoint_override: Option<f32>,
    pub cooling_setpoint_override: Option<f32>,
    /// ΔU_wb, thermal-bridge surcharge, W/(m²K). Spec-constrained to
    /// {0.03, 0.05, 0.10, 0.15} but stored as a plain value; validating
    /// against the allowed set is a collaborator's concern (input UI),
    /// not the engine's.
    pub thermal_bridge_surcharge: f32,
    /// C_m, specific thermal capacity of the zone's active mass, Wh/(m²K).
    pub thermal_capacity: f32,
    pub night_mode: NightMode,
    pub excluded_from_calculation: bool,
    pub ventilation_unit_ids: Vec<String>,
    /// n50 air-change rate at 50 Pa, h⁻¹, when measured or assumed for
    /// this zone (spec §4.5).
    pub n50: f32,
    /// Shielding class used to derive f_e (spec §4.5), 1 = sheltered .. 3 = exposed.
    pub shielding_class: u8,
}

impl Zone {
    pub fn volume(&self) -> f32 {
        self.volume_m3.unwrap_or(self.floor_area_m2 * self.mean_height_m)
    }
}

/// An envelope surface belonging to one zone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Surface {
    pub id: String,
    pub zone_id: String,
    pub kind: SurfaceKind,
    pub area_m2: f32,
    pub orientation: Orientation,
    pub tilt_deg: f32,
    pub construction_id: String,
    /// F_x, temperature-correction factor, dimensionless ∈ [0,1].
    pub f_x: f32,
    /// f_c, shading reduction factor (0 = fully shaded, 1 = unshaded).
    pub f_c: f32,
    /// Adjacent zone id, when this surface's boundary type is `Interior`.
    pub adjacent_zone_id: Option<String>,
}

/// A mechanical ventilation unit (supply/exhaust air handling, possibly
/// with heat recovery), referenced by zones via `ventilation_unit_ids`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VentilationUnit {
    pub id: String,
    pub name: String,
    /// Supply/exhaust flow rate, m³/h.
    pub flow_m3h: f32,
    /// Sensible heat-recovery efficiency for the heating balance, η_hr ∈ [0,1].
    pub heat_recovery_efficiency_heating: f32,
    /// Sensible heat-recovery efficiency for the cooling balance, if the
    /// unit declares a distinct value; defaults to the heating value.
    pub heat_recovery_efficiency_cooling: Option<f32>,
}

impl VentilationUnit {
    pub fn eta_hr_cooling(&self) -> f32 {
        self.heat_recovery_efficiency_cooling
            .unwrap_or(self.heat_recovery_efficiency_heating)
    }
}

/// Energy carrier tag used for final-energy accounting (spec §4.8/§4.9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnergyCarrier {
    Electricity,
    NaturalGas,
    DistrictHeat,
    Biomass,
    SolarThermal,
    /// No system assigned for this end-use (spec §3 invariant).
    Unspecified,
}

/// Generator stage of a heating/cooling/DHW system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Generator {
    pub kind: String,
    pub carrier: EnergyCarrier,
    /// Nominal efficiency (fuel-fired) or COP/EER (heat pumps, chillers).
    pub nominal_efficiency: f32,
    /// COP at outdoor-temperature bins, for heat pumps; empty for
    /// non-heat-pump generators (spec §4.8 "dynamic COP interpolated...").
    pub cop_bins: Vec<(f32, f32)>,
}

impl Generator {
    /// COP interpolated from `cop_bins` at the given outdoor temperature,
    /// or the nominal efficiency when no bins are declared.
    pub fn effective_efficiency(&self, outdoor_temp: f32) -> f32 {
        if self.cop_bins.is_empty() {
            return self.nominal_efficiency;
        }
        let mut bins = self.cop_bins.clone();
        bins.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());
        if outdoor_temp <= bins[0].0 {
            return bins[0].1;
        }
        if outdoor_temp >= bins[bins.len() - 1].0 {
            return bins[bins.len() - 1].1;
        }
        for w in bins.windows(2) {
            let (t0, c0) = w[0];
            let (t1, c1) = w[1];
            if outdoor_temp >= t0 && outdoor_temp <= t1 {
                let frac = (outdoor_temp - t0) / (t1 - t0);
                return c0 + frac * (c1 - c0);
            }
        }
        self.nominal_efficiency
    }
}

/// Distribution stage (pipework/ductwork between generator and terminals).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Distribution {
    pub efficiency: f32,
    /// Whether the distribution pump runs on variable-speed control,
    /// reducing auxiliary energy relative to a fixed-speed pump (spec §4.8).
    pub pump_control_variable: bool,
}

/// Emission stage (terminal units).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Emission {
    pub efficiency: f32,
    pub fan_power_w: f32,
}

/// Which zones a system serves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ServedZones {
    Shared(Vec<String>),
    Dedicated(String),
}

impl ServedZones {
    pub fn contains(&self, zone_id: &str) -> bool {
        match self {
            ServedZones::Shared(ids) => ids.iter().any(|id| id == zone_id),
            ServedZones::Dedicated(id) => id == zone_id,
        }
    }
}

/// A heating, cooling or DHW system: generator → distribution → emission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndUseSystem {
    pub id: String,
    pub name: String,
    pub generator: Generator,
    pub distribution: Distribution,
    pub emission: Emission,
    pub served: ServedZones,
    /// Operating hours per year for auxiliary pump/fan energy (spec §4.8).
    pub operating_hours_per_year: f32,
    /// Design flow rate, m³/h, and head, kPa, for auxiliary pump energy.
    pub design_flow_m3h: f32,
    pub design_head_kpa: f32,
}

impl EndUseSystem {
    pub fn serves(&self, zone_id: &str) -> bool {
        self.served.contains(zone_id)
    }
}

/// Air-handling-unit system wrapper: links a zone to a
/// [`VentilationUnit`] and carries the fan's auxiliary electricity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AhuSystem {
    pub id: String,
    pub name: String,
    pub ventilation_unit_id: String,
    /// Specific fan power, W per (m³/h).
    pub specific_fan_power_w_per_m3h: f32,
    pub served: ServedZones,
}

impl AhuSystem {
    pub fn serves(&self, zone_id: &str) -> bool {
        self.served.contains(zone_id)
    }
}

/// Occupancy/daylight lighting control strategy (spec §4.7).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum OccupancyControl {
    Manual,
    OccupancySensor,
    DualSensor,
}

impl OccupancyControl {
    pub fn f_o(self) -> f32 {
        match self {
            OccupancyControl::Manual => 1.0,
            OccupancyControl::OccupancySensor => 0.7,
            OccupancyControl::DualSensor => 0.5,
        }
    }
}

/// Lighting system: control parameters for [`crate::lighting`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LightingSystem {
    pub id: String,
    pub name: String,
    pub occupancy_control: OccupancyControl,
    pub constant_illuminance_control: bool,
    /// Luminous efficacy, lm/W; defaults to 60 when absent (spec §4.7).
    pub luminous_efficacy: Option<f32>,
    pub served: ServedZones,
}

impl LightingSystem {
    pub fn serves(&self, zone_id: &str) -> bool {
        self.served.contains(zone_id)
    }
}

/// One PV array within a [`PvSystem`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PvArray {
    pub capacity_kwp: f32,
    pub orientation: Orientation,
    pub tilt_deg: f32,
    pub performance_ratio: f32,
}

/// A PV generation system, crediting building-wide electricity demand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PvSystem {
    pub id: String,
    pub name: String,
    pub arrays: Vec<PvArray>,
}

/// Tagged variant over end-use system kinds (spec §3 "System").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum System {
    Heating(EndUseSystem),
    Cooling(EndUseSystem),
    Dhw(EndUseSystem),
    Ahu(AhuSystem),
    Pv(PvSystem),
    Lighting(LightingSystem),
}
