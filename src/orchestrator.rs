// Copyright (c) 2018-2020 Rafael Villar Burke <pachi@ietcc.csic.es>
// Distributed under the MIT License
// (See acoompanying LICENSE file or a copy at http://opensource.org/licenses/MIT)

//! C7 Orchestrator: the crate's single public entry point. Runs the
//! leaf components (L1-L3) once, then walks zones through the composite
//! components (C1-C5) and finally closes the building total (C6) —
//! analogous in shape to the teacher's `EnergyIndicators::compute(model)`.

use std::collections::BTreeMap;

use log::warn;

use crate::aggregate::{self, CarrierFlow};
use crate::balance;
use crate::catalogue;
use crate::climate::{ClimateModel, ClimateStation};
use crate::envelope;
use crate::error::EngineError;
use crate::lighting;
use crate::materials::ConstructionLibrary;
use crate::model::{EnergyCarrier, OccupancyControl, Project, System, Surface};
use crate::results::{Results, ZoneResults};
use crate::systems;
use crate::utils::DAYS_IN_MONTH;
use crate::ventilation;

/// Assumed annual operating hours for auxiliary fan/pump energy when a
/// system does not specialize it further than `operating_hours_per_year`
/// — used only for AHU fans, which carry no such field of their own.
const DEFAULT_AHU_OPERATING_HOURS: f32 = 2000.0;
/// Assumed daylight autonomy fraction for zones with operable glazing
/// (spec §4.7 does not pin an exact value; a mid-range fraction is used
/// and documented in `DESIGN.md`).
const DEFAULT_DAYLIGHT_AUTONOMY: f32 = 0.3;

/// Computes the full monthly energy balance and final-energy accounting
/// for a project. Zones in input order, months 1-12 in array order: the
/// only iteration orders used anywhere in the pipeline, keeping the
/// result deterministic.
///
/// This loop is the parallelization seam: each zone's computation reads
/// only shared, read-only inputs (`project`, `climate`, `constructions`)
/// and writes to its own `ZoneResults`, so it could become a
/// `.par_iter()` without changing a single formula — this crate does not
/// take that dependency (see `DESIGN.md`).
pub fn calculate(
    project: &Project,
    station: &ClimateStation,
    constructions: &ConstructionLibrary,
) -> Result<Results, EngineError> {
    let climate = ClimateModel::new(station);
    let mut warnings = Vec::new();
    let mut zones = BTreeMap::new();
    let mut flows: Vec<CarrierFlow> = Vec::new();

    for zone in &project.zones {
        if zone.excluded_from_calculation {
            continue;
        }

        let profile = catalogue::lookup(&zone.usage_profile_key).ok_or_else(|| EngineError::UnknownProfile {
            zone_id: zone.id.clone(),
            profile_key: zone.usage_profile_key.clone(),
        })?;

        let surfaces: Vec<&Surface> = project.surfaces_of_zone(&zone.id).collect();
        let envelope = envelope::aggregate(zone, &surfaces, constructions, &mut warnings)?;

        let units: Vec<_> = zone
            .ventilation_unit_ids
            .iter()
            .filter_map(|id| project.ventilation_unit_by_id(id))
            .collect();
        let has_operable_windows = surfaces.iter().any(|s| s.kind.is_glazed());
        let vent = ventilation::compute(zone, profile, &units, has_operable_windows);

        let bacs = profile.bacs.for_class(project.meta.automation_class);
        let balance = balance::compute(zone, &envelope, &vent, profile, &climate, bacs)?;

        let lighting_system = project.lighting_system_for_zone(&zone.id);
        let (occupancy_control, constant_illuminance, luminous_efficacy) = lighting_system
            .map(|l| (l.occupancy_control, l.constant_illuminance_control, l.luminous_efficacy))
            .unwrap_or((OccupancyControl::Manual, false, None));
        let f_d = lighting::daylight_factor(has_operable_windows, DEFAULT_DAYLIGHT_AUTONOMY);
        let zone_lighting =
            lighting::compute(profile, zone.floor_area_m2, luminous_efficacy, occupancy_control, constant_illuminance, f_d);

        let outdoor_temp = station.monthly_temp_c;
        let mut heating_demand = [0.0_f32; 12];
        let mut cooling_demand = [0.0_f32; 12];
        let mut dhw_demand = [0.0_f32; 12];
        for month in 0..12 {
            heating_demand[month] = balance.months[month].q_h;
            cooling_demand[month] = balance.months[month].q_c;
            let usage_days_this_month = profile.annual_usage_days / 365.0 * DAYS_IN_MONTH[month];
            dhw_demand[month] = profile.dhw_demand_wh_m2_day * zone.floor_area_m2 * usage_days_this_month / 1000.0;
        }

        let heating_final = systems::final_energy_for_demand(
            project.heating_system_for_zone(&zone.id), &heating_demand, &outdoor_temp, &zone.id, "heating", &mut warnings,
        );
        let cooling_final = systems::final_energy_for_demand(
            project.cooling_system_for_zone(&zone.id), &cooling_demand, &outdoor_temp, &zone.id, "cooling", &mut warnings,
        );
        let dhw_final = systems::final_energy_for_demand(
            project.dhw_system_for_zone(&zone.id), &dhw_demand, &outdoor_temp, &zone.id, "DHW", &mut warnings,
        );

        flows.push(CarrierFlow { carrier: heating_final.carrier, annual_kwh: heating_final.monthly_kwh.iter().sum() });
        flows.push(CarrierFlow { carrier: cooling_final.carrier, annual_kwh: cooling_final.monthly_kwh.iter().sum() });
        flows.push(CarrierFlow { carrier: dhw_final.carrier, annual_kwh: dhw_final.monthly_kwh.iter().sum() });
        flows.push(CarrierFlow {
            carrier: EnergyCarrier::Electricity,
            annual_kwh: zone_lighting.monthly_demand_kwh.iter().sum(),
        });

        zones.insert(zone.id.clone(), ZoneResults {
            balance,
            lighting: zone_lighting,
            heating_final,
            cooling_final,
            dhw_final,
        });
    }

    for system in &project.systems {
        match system {
            System::Heating(sys) | System::Cooling(sys) | System::Dhw(sys) => {
                flows.push(CarrierFlow { carrier: EnergyCarrier::Electricity, annual_kwh: systems::auxiliary_pump_energy_kwh(sys) });
            }
            System::Ahu(ahu) => {
                if let Some(unit) = project.ventilation_unit_by_id(&ahu.ventilation_unit_id) {
                    flows.push(CarrierFlow {
                        carrier: EnergyCarrier::Electricity,
                        annual_kwh: systems::ahu_fan_energy_kwh(ahu, unit, DEFAULT_AHU_OPERATING_HOURS),
                    });
                } else {
                    warn!("AHU {} references unknown ventilation unit {}", ahu.id, ahu.ventilation_unit_id);
                }
            }
            System::Pv(pv) => {
                let generation: f32 = systems::pv_generation_kwh(pv, &climate).iter().sum();
                flows.push(CarrierFlow { carrier: EnergyCarrier::Electricity, annual_kwh: -generation });
            }
            System::Lighting(_) => {}
        }
    }

    let building = aggregate::aggregate(&flows);
    Ok(Results { zones, building, warnings })
}
