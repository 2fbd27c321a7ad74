// Copyright (c) 2018-2020 Rafael Villar Burke <pachi@ietcc.csic.es>
// Distributed under the MIT License
// (See acoompanying LICENSE file or a copy at http://opensource.org/licenses/MIT)

//! L3 ClimateModel: monthly outdoor temperature/horizontal irradiation
//! records plus the Duffie–Beckman isotropic-sky transposition to an
//! arbitrary tilt/orientation.
//!
//! The trigonometric helpers (`sind`/`cosd`, declination, hour angle)
//! follow the style of the teacher's `climate::solar` module, but this
//! engine only needs a *monthly-average* beam-tilt factor, not the
//! teacher's hourly/Perez position-and-irradiance model (out of scope:
//! no sub-hourly simulation). The monthly factor is obtained the same
//! way the teacher computes instantaneous angles — by evaluating the
//! sun's position at a grid of hours across a representative day of
//! each month and ratioing the sunlit contributions — rather than by a
//! closed-form non-south R_b formula, which resolves this engine's
//! transposition open question (see `DESIGN.md`).

use std::cell::RefCell;
use std::collections::HashMap;
use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

use crate::common::Orientation;

fn sind(deg: f32) -> f32 {
    (deg * PI / 180.0).sin()
}

fn cosd(deg: f32) -> f32 {
    (deg * PI / 180.0).cos()
}

/// Representative day-of-year for each calendar month (Klein 1977), used
/// throughout solar-engineering monthly-average correlations.
const MEAN_DAY_OF_YEAR: [u16; 12] = [17, 47, 75, 105, 135, 162, 198, 228, 258, 288, 318, 344];

/// Ground reflectance (albedo) used by the isotropic-sky ground-reflected
/// term, ρ_g (spec §4.3).
pub const GROUND_REFLECTANCE: f32 = 0.2;

/// Solar declination, degrees, for day-of-year `n` (Cooper's equation).
fn declination(n: u16) -> f32 {
    23.45 * sind(360.0 * (284.0 + n as f32) / 365.0)
}

/// Sunset hour angle, degrees, on a horizontal surface at latitude `phi`.
fn sunset_hour_angle(phi_deg: f32, delta_deg: f32) -> f32 {
    (-sind(phi_deg) * sind(delta_deg) / (cosd(phi_deg) * cosd(delta_deg)))
        .clamp(-1.0, 1.0)
        .acos()
        * 180.0
        / PI
}

/// Monthly-average daily extraterrestrial irradiation on a horizontal
/// surface, kWh/(m²·day) (Duffie & Beckman eq. 1.10.3).
fn extraterrestrial_daily(n: u16, phi_deg: f32, delta_deg: f32, ws_deg: f32) -> f32 {
    const SOLAR_CONSTANT_W_M2: f32 = 1367.0;
    let ws_rad = ws_deg * PI / 180.0;
    let day_angle = 360.0 * n as f32 / 365.0;
    let eccentricity_correction = 1.0 + 0.033 * cosd(day_angle);
    let joules_per_day = (24.0 * 3600.0 / PI)
        * SOLAR_CONSTANT_W_M2
        * eccentricity_correction
        * (cosd(phi_deg) * cosd(delta_deg) * sind(ws_deg) + ws_rad * sind(phi_deg) * sind(delta_deg));
    joules_per_day / 3_600_000.0
}

/// Collares-Pereira & Rabl monthly diffuse-fraction correlation,
/// expressed from the monthly clearness index `k_t` and sunset hour
/// angle. This is the standard Duffie & Beckman textbook decomposition
/// used to split measured global horizontal radiation into its beam and
/// diffuse components before transposition to a tilted surface.
fn diffuse_fraction(k_t: f32, ws_deg: f32) -> f32 {
    let k_t = k_t.clamp(0.0, 1.0);
    let a = 0.775 + 0.00606 * (ws_deg - 90.0);
    let b = 0.505 + 0.00455 * (ws_deg - 90.0);
    (a - b * cosd(115.0 * k_t - 103.0)).clamp(0.0, 1.0)
}

/// A climate station: monthly-average outdoor air temperature and
/// monthly total global horizontal irradiation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClimateStation {
    pub id: String,
    pub name: String,
    pub latitude_deg: f32,
    /// Monthly average outdoor air temperature, °C.
    pub monthly_temp_c: [f32; 12],
    /// Monthly total global horizontal irradiation, kWh/m².
    pub monthly_global_horizontal_kwh_m2: [f32; 12],
}

/// Computes the monthly-average beam-radiation tilt factor R_b for an
/// orientation/tilt pair by numerically ratioing sunlit-hour beam
/// contributions across the month's representative day, rather than a
/// closed-form south-facing-only formula.
fn monthly_beam_tilt_factor(month_idx: usize, phi_deg: f32, orientation: Orientation, tilt_deg: f32) -> f32 {
    if matches!(orientation, Orientation::NoExposure) {
        return 0.0;
    }
    let surface_azimuth_deg = match orientation {
        Orientation::S => 0.0,
        Orientation::SE => -45.0,
        Orientation::E => -90.0,
        Orientation::NE => -135.0,
        Orientation::N => 180.0,
        Orientation::NW => 135.0,
        Orientation::W => 90.0,
        Orientation::SW => 45.0,
        Orientation::Horizontal | Orientation::NoExposure => 0.0,
    };
    let beta_deg = if matches!(orientation, Orientation::Horizontal) { 0.0 } else { tilt_deg.clamp(0.0, 180.0) };

    let n = MEAN_DAY_OF_YEAR[month_idx];
    let delta = declination(n);

    let mut sum_cos_theta = 0.0_f32;
    let mut sum_cos_theta_z = 0.0_f32;
    const STEPS_PER_DAY: i32 = 48;
    for step in 0..STEPS_PER_DAY {
        let solar_hour = step as f32 * 24.0 / STEPS_PER_DAY as f32;
        let hour_angle = 15.0 * (solar_hour - 12.0);
        let sin_altitude = sind(phi_deg) * sind(delta) + cosd(phi_deg) * cosd(delta) * cosd(hour_angle);
        if sin_altitude <= 0.0 {
            continue;
        }
        let cos_theta_z = sin_altitude;
        // Angle of incidence on the tilted surface (general form, Duffie
        // & Beckman eq. 1.6.3), with `surface_azimuth_deg` measured from
        // south, positive west, matching the sign convention above.
        let cos_theta = sind(delta) * sind(phi_deg) * cosd(beta_deg)
            - sind(delta) * cosd(phi_deg) * sind(beta_deg) * cosd(surface_azimuth_deg)
            + cosd(delta) * cosd(phi_deg) * cosd(beta_deg) * cosd(hour_angle)
            + cosd(delta) * sind(phi_deg) * sind(beta_deg) * cosd(surface_azimuth_deg) * cosd(hour_angle)
            + cosd(delta) * sind(beta_deg) * sind(surface_azimuth_deg) * sind(hour_angle);
        sum_cos_theta_z += cos_theta_z;
        if cos_theta > 0.0 {
            sum_cos_theta += cos_theta;
        }
    }
    if sum_cos_theta_z <= 0.0 {
        0.0
    } else {
        sum_cos_theta / sum_cos_theta_z
    }
}

/// Cache key: orientation plus tilt rounded to the nearest tenth of a
/// degree (reused across surfaces that share an orientation/tilt pair).
type CacheKey = (Orientation, i32);

/// Per-station solar-transposition model. Interior mutability is used
/// for the transposition cache behind a single-writer discipline (one
/// thread builds a `Project`'s results at a time; see spec §5): nothing
/// here is `Sync`-shared across threads by construction.
pub struct ClimateModel<'a> {
    pub station: &'a ClimateStation,
    cache: RefCell<HashMap<CacheKey, [f32; 12]>>,
}

impl<'a> ClimateModel<'a> {
    pub fn new(station: &'a ClimateStation) -> Self {
        ClimateModel { station, cache: RefCell::new(HashMap::new()) }
    }

    /// Monthly global irradiation on a surface of the given orientation
    /// and tilt, kWh/m², per spec §4.3's isotropic-sky decomposition:
    /// `G = G_b·R_b + G_d·(1+cosβ)/2 + G_h·ρ_g·(1-cosβ)/2`.
    pub fn insolation(&self, orientation: Orientation, tilt_deg: f32) -> [f32; 12] {
        let key: CacheKey = (orientation, (tilt_deg * 10.0).round() as i32);
        if let Some(cached) = self.cache.borrow().get(&key) {
            return *cached;
        }
        let phi = self.station.latitude_deg;
        let beta = if matches!(orientation, Orientation::Horizontal) { 0.0 } else { tilt_deg.clamp(0.0, 180.0) };
        let mut result = [0.0_f32; 12];
        if matches!(orientation, Orientation::NoExposure) {
            self.cache.borrow_mut().insert(key, result);
            return result;
        }
        for (i, &g_h) in self.station.monthly_global_horizontal_kwh_m2.iter().enumerate() {
            let n = MEAN_DAY_OF_YEAR[i];
            let delta = declination(n);
            let ws = sunset_hour_angle(phi, delta);
            let h_o = extraterrestrial_daily(n, phi, delta, ws) * crate::utils::DAYS_IN_MONTH[i];
            let k_t = if h_o > 0.0 { (g_h / h_o).clamp(0.0, 1.0) } else { 0.0 };
            let f_d = diffuse_fraction(k_t, ws);
            let g_d = g_h * f_d;
            let g_b = g_h - g_d;
            let r_b = monthly_beam_tilt_factor(i, phi, orientation, tilt_deg);
            let diffuse_term = g_d * (1.0 + cosd(beta)) / 2.0;
            let ground_term = g_h * GROUND_REFLECTANCE * (1.0 - cosd(beta)) / 2.0;
            result[i] = (g_b * r_b + diffuse_term + ground_term).max(0.0);
        }
        self.cache.borrow_mut().insert(key, result);
        result
    }
}
