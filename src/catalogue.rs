// Copyright (c) 2018-2020 Rafael Villar Burke <pachi@ietcc.csic.es>
// Distributed under the MIT License
// (See acoompanying LICENSE file or a copy at http://opensource.org/licenses/MIT)

//! L1 ProfileCatalogue: the DIN V 18599-10 usage-profile table.
//!
//! Mirrors the teacher's static reference-data pattern in
//! `climatedata/zonesmeta.rs` (`once_cell::sync::Lazy<HashMap<String, _>>`
//! built once, looked up by key, never mutated after startup).

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Building-automation-and-control-system class (EN 15232), used to index
/// a profile's adaptation vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BacsClass {
    A,
    B,
    C,
    D,
}

/// One automation-class row of a profile's BACS adaptation vector: the
/// fractional reduction in demand (`f_adapt`) and the heating-setpoint
/// shift (`delta_theta_ems`, K) that class of controls delivers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BacsPoint {
    pub f_adapt: f32,
    pub delta_theta_ems: f32,
}

/// Per-class adaptation vector, A (best) through D (worst/none).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BacsAdaptation {
    pub a: BacsPoint,
    pub b: BacsPoint,
    pub c: BacsPoint,
    pub d: BacsPoint,
}

impl BacsAdaptation {
    pub fn for_class(&self, class: BacsClass) -> BacsPoint {
        match class {
            BacsClass::A => self.a,
            BacsClass::B => self.b,
            BacsClass::C => self.c,
            BacsClass::D => self.d,
        }
    }
}

/// A DIN V 18599-10 usage profile row (spec §3 "UsageProfile").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageProfile {
    pub key: String,
    pub name: String,
    pub daily_usage_hours: f32,
    pub annual_usage_days: f32,
    /// Hour of day (0-24) usage begins; usage runs `[usage_start, usage_start + daily_usage_hours)`.
    pub usage_start_hour: f32,
    pub hvac_daily_hours: f32,
    pub hvac_annual_days: f32,
    /// Maintained illuminance, E_m, lux.
    pub illuminance_lux: f32,
    /// Maintenance/depreciation factor, k_L, dimensionless ≤ 1.
    pub lighting_depreciation: f32,
    pub heating_setpoint: f32,
    pub cooling_setpoint: f32,
    /// Setback delta applied to the heating setpoint outside usage hours, K.
    pub setback_k: f32,
    pub min_outdoor_air_m3h_m2: f32,
    pub humidity_controlled: bool,
    pub people_gain_wh_m2_day: f32,
    pub equipment_gain_wh_m2_day: f32,
    pub dhw_demand_wh_m2_day: f32,
    pub bacs: BacsAdaptation,
}

impl UsageProfile {
    pub fn usage_fraction(&self) -> f32 {
        (self.daily_usage_hours / 24.0).clamp(0.0, 1.0) * (self.annual_usage_days / 365.0).clamp(0.0, 1.0)
    }

    pub fn internal_gain_wh_m2_day(&self) -> f32 {
        self.people_gain_wh_m2_day + self.equipment_gain_wh_m2_day
    }
}

fn bacs(a: (f32, f32), b: (f32, f32), c: (f32, f32), d: (f32, f32)) -> BacsAdaptation {
    let point = |p: (f32, f32)| BacsPoint {
        f_adapt: p.0,
        delta_theta_ems: p.1,
    };
    BacsAdaptation {
        a: point(a),
        b: point(b),
        c: point(c),
        d: point(d),
    }
}

fn profile(
    key: &str,
    name: &str,
    daily_usage_hours: f32,
    annual_usage_days: f32,
    usage_start_hour: f32,
    hvac_daily_hours: f32,
    hvac_annual_days: f32,
    illuminance_lux: f32,
    lighting_depreciation: f32,
    heating_setpoint: f32,
    cooling_setpoint: f32,
    setback_k: f32,
    min_outdoor_air_m3h_m2: f32,
    humidity_controlled: bool,
    people_gain_wh_m2_day: f32,
    equipment_gain_wh_m2_day: f32,
    dhw_demand_wh_m2_day: f32,
) -> UsageProfile {
    UsageProfile {
        key: key.to_string(),
        name: name.to_string(),
        daily_usage_hours,
        annual_usage_days,
        usage_start_hour,
        hvac_daily_hours,
        hvac_annual_days,
        illuminance_lux,
        lighting_depreciation,
        heating_setpoint,
        cooling_setpoint,
        setback_k,
        min_outdoor_air_m3h_m2,
        humidity_controlled,
        people_gain_wh_m2_day,
        equipment_gain_wh_m2_day,
        dhw_demand_wh_m2_day,
        // EN 15232 table B.2 typical class impact; class D is the no-BACS
        // reference (f_adapt = 1, no setpoint shift).
        bacs: bacs((0.88, 1.0), (0.93, 0.5), (1.0, 0.0), (1.10, -0.5)),
    }
}

/// Process-wide, read-only usage-profile table. Built once on first
/// access, never mutated afterwards, following the teacher's
/// `CLIMATEMETADATA` singleton pattern.
pub static PROFILES: Lazy<HashMap<String, UsageProfile>> = Lazy::new(|| {
    let rows = vec![
        profile(
            "1_office", "Single office", 10.0, 250.0, 7.0, 11.0, 250.0, 500.0, 0.9, 20.0, 26.0, 4.0, 4.0, false,
            80.0, 130.0, 0.0,
        ),
        profile(
            "2_group_office", "Group office", 10.0, 250.0, 7.0, 11.0, 250.0, 500.0, 0.9, 20.0, 26.0, 4.0, 6.0, false,
            80.0, 150.0, 0.0,
        ),
        profile(
            "3_meeting_room", "Meeting, conference room", 10.0, 250.0, 8.0, 11.0, 250.0, 500.0, 0.9, 20.0, 26.0, 4.0,
            12.5, false, 200.0, 60.0, 0.0,
        ),
        profile(
            "6_retail", "Retail / sales area", 12.0, 300.0, 8.0, 13.0, 300.0, 300.0, 0.8, 19.0, 26.0, 4.0, 2.3,
            false, 60.0, 120.0, 0.0,
        ),
        profile(
            "7_warehouse", "Warehouse / storage", 10.0, 260.0, 6.0, 10.0, 260.0, 100.0, 0.8, 15.0, 28.0, 6.0, 1.0,
            false, 20.0, 20.0, 0.0,
        ),
        profile(
            "9_lecture_hall", "Lecture hall, classroom", 8.0, 200.0, 8.0, 9.0, 200.0, 300.0, 0.9, 20.0, 26.0, 4.0,
            25.2, false, 410.0, 20.0, 0.0,
        ),
        profile(
            "12_restaurant", "Restaurant, canteen", 10.0, 300.0, 10.0, 11.0, 300.0, 200.0, 0.8, 20.0, 26.0, 4.0, 18.0,
            true, 250.0, 140.0, 200.0,
        ),
        profile(
            "18_hotel_room", "Hotel room", 24.0, 330.0, 0.0, 24.0, 330.0, 100.0, 0.8, 20.0, 26.0, 2.0, 4.8, false,
            60.0, 40.0, 280.0,
        ),
        profile(
            "22_server_room", "Server / IT room", 24.0, 365.0, 0.0, 24.0, 365.0, 200.0, 0.9, 18.0, 24.0, 0.0, 2.0,
            false, 20.0, 500.0, 0.0,
        ),
        profile(
            "30_sports_hall", "Sports hall", 10.0, 250.0, 9.0, 11.0, 250.0, 300.0, 0.8, 17.0, 26.0, 5.0, 30.0, true,
            300.0, 10.0, 350.0,
        ),
        profile(
            "44_res_single", "Single-family dwelling", 24.0, 365.0, 0.0, 24.0, 365.0, 100.0, 0.9, 20.0, 26.0, 2.0,
            0.7, true, 40.0, 60.0, 440.0,
        ),
        profile(
            "45_res_multi", "Multi-family dwelling", 24.0, 365.0, 0.0, 24.0, 365.0, 100.0, 0.9, 20.0, 26.0, 2.0, 0.7,
            true, 40.0, 60.0, 380.0,
        ),
    ];
    rows.into_iter().map(|p| (p.key.clone(), p)).collect()
});

/// Looks up a profile by key, returning `None` when absent. Callers
/// attach the offending zone id to build an
/// [`crate::error::EngineError::UnknownProfile`].
pub fn lookup(key: &str) -> Option<&'static UsageProfile> {
    PROFILES.get(key)
}
