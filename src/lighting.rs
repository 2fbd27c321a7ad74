// Copyright (c) 2018-2020 Rafael Villar Burke <pachi@ietcc.csic.es>
// Distributed under the MIT License
// (See acoompanying LICENSE file or a copy at http://opensource.org/licenses/MIT)

//! C4 LightingModel: installed lighting power from the usage profile's
//! maintained illuminance, reduced by occupancy, daylight and
//! constant-illuminance control factors (spec §4.7). No teacher
//! counterpart exists for lighting; grounded on the crate's general
//! per-month accumulation style (see `crate::climate` and
//! `crate::utils::DAYS_IN_MONTH`).

use serde::{Deserialize, Serialize};

use crate::catalogue::UsageProfile;
use crate::model::OccupancyControl;
use crate::utils::DAYS_IN_MONTH;

/// Default luminous efficacy, lm/W, used when a lighting system does not
/// declare its own (spec §4.7).
pub const DEFAULT_LUMINOUS_EFFICACY: f32 = 60.0;

/// Monthly lighting energy demand for one zone, kWh.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ZoneLighting {
    pub installed_power_density_w_m2: f32,
    pub monthly_demand_kwh: [f32; 12],
}

/// Daylight factor F_D: 1.0 (no reduction) unless the zone has
/// operable/glazed daylight openings, in which case demand is reduced by
/// the given daylight-autonomy fraction (spec §4.7 edge case: F_D must
/// be 1.0 for zones without daylight openings).
pub fn daylight_factor(has_daylight_openings: bool, daylight_autonomy: f32) -> f32 {
    if has_daylight_openings {
        (1.0 - daylight_autonomy.clamp(0.0, 1.0)).clamp(0.0, 1.0)
    } else {
        1.0
    }
}

/// Computes a zone's monthly lighting demand.
pub fn compute(
    profile: &UsageProfile,
    floor_area_m2: f32,
    luminous_efficacy: Option<f32>,
    occupancy_control: OccupancyControl,
    constant_illuminance_control: bool,
    f_d: f32,
) -> ZoneLighting {
    let eta_lm = luminous_efficacy.unwrap_or(DEFAULT_LUMINOUS_EFFICACY);
    let power_density = profile.illuminance_lux / (eta_lm * profile.lighting_depreciation.max(0.01));

    let f_o = occupancy_control.f_o();
    let f_c = if constant_illuminance_control { 0.9 } else { 1.0 };

    let mut monthly_demand_kwh = [0.0_f32; 12];
    for (month, demand) in monthly_demand_kwh.iter_mut().enumerate() {
        let usage_days_this_month = profile.annual_usage_days / 365.0 * DAYS_IN_MONTH[month];
        let wh = power_density * floor_area_m2 * profile.daily_usage_hours * usage_days_this_month * f_o * f_d * f_c;
        *demand = wh / 1000.0;
    }

    ZoneLighting { installed_power_density_w_m2: power_density, monthly_demand_kwh }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::lookup;

    #[test]
    fn daylight_reduces_lighting_demand() {
        let profile = lookup("1_office").unwrap();
        let without_daylight = compute(profile, 30.0, None, OccupancyControl::Manual, false, 1.0);
        let with_daylight = compute(
            profile, 30.0, None, OccupancyControl::Manual, false, daylight_factor(true, 0.4),
        );
        let total_without: f32 = without_daylight.monthly_demand_kwh.iter().sum();
        let total_with: f32 = with_daylight.monthly_demand_kwh.iter().sum();
        assert!(total_with < total_without);
    }

    #[test]
    fn no_daylight_openings_forces_factor_to_one() {
        assert_eq!(daylight_factor(false, 0.9), 1.0);
    }

    #[test]
    fn dual_sensor_occupancy_control_reduces_demand() {
        let profile = lookup("1_office").unwrap();
        let manual = compute(profile, 30.0, None, OccupancyControl::Manual, false, 1.0);
        let sensed = compute(profile, 30.0, None, OccupancyControl::DualSensor, false, 1.0);
        let total_manual: f32 = manual.monthly_demand_kwh.iter().sum();
        let total_sensed: f32 = sensed.monthly_demand_kwh.iter().sum();
        assert!(total_sensed < total_manual);
    }
}
