// Copyright (c) 2018-2020 Rafael Villar Burke <pachi@ietcc.csic.es>
// Distributed under the MIT License
// (See acoompanying LICENSE file or a copy at http://opensource.org/licenses/MIT)

//! C6 Aggregator: building-level totals by energy carrier, plus primary
//! energy and CO₂ conversion. No direct teacher counterpart; grounded on
//! the crate's `BTreeMap<id, Props>` report-shape convention and
//! fixed-order summation for deterministic output.

use std::collections::BTreeMap;

use log::info;
use serde::{Deserialize, Serialize};

use crate::model::EnergyCarrier;
use crate::utils::fround2;

/// Primary-energy conversion factor (non-renewable), kWh_pe/kWh_final.
pub fn primary_energy_factor(carrier: EnergyCarrier) -> f32 {
    match carrier {
        EnergyCarrier::Electricity => 1.8,
        EnergyCarrier::NaturalGas => 1.1,
        EnergyCarrier::DistrictHeat => 0.6,
        EnergyCarrier::Biomass => 0.2,
        EnergyCarrier::SolarThermal => 0.0,
        EnergyCarrier::Unspecified => 0.0,
    }
}

/// CO₂ emission factor, kg CO₂/kWh_final.
pub fn co2_factor(carrier: EnergyCarrier) -> f32 {
    match carrier {
        EnergyCarrier::Electricity => 0.380,
        EnergyCarrier::NaturalGas => 0.201,
        EnergyCarrier::DistrictHeat => 0.174,
        EnergyCarrier::Biomass => 0.018,
        EnergyCarrier::SolarThermal => 0.0,
        EnergyCarrier::Unspecified => 0.0,
    }
}

fn carrier_key(carrier: EnergyCarrier) -> &'static str {
    match carrier {
        EnergyCarrier::Electricity => "ELECTRICIDAD",
        EnergyCarrier::NaturalGas => "GASNATURAL",
        EnergyCarrier::DistrictHeat => "DISTRICTHEAT",
        EnergyCarrier::Biomass => "BIOMASA",
        EnergyCarrier::SolarThermal => "SOLARTERMICA",
        EnergyCarrier::Unspecified => "SINASIGNAR",
    }
}

/// Final-energy, primary-energy and CO₂ totals for one carrier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct CarrierTotals {
    pub final_energy_kwh: f32,
    pub primary_energy_kwh: f32,
    pub co2_kg: f32,
}

/// Building-wide totals, keyed by carrier for deterministic (sorted-key)
/// iteration and serialization.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BuildingTotals {
    pub by_carrier: BTreeMap<String, CarrierTotals>,
    pub net_final_energy_kwh: f32,
    pub net_primary_energy_kwh: f32,
    pub net_co2_kg: f32,
}

/// One contribution to the building total: an energy flow (positive for
/// consumption, negative for PV credit) on a given carrier.
pub struct CarrierFlow {
    pub carrier: EnergyCarrier,
    pub annual_kwh: f32,
}

/// Sums a fixed-order sequence of carrier flows into building totals.
/// Iterates the input in the order given (never a `HashMap`), keeping
/// the summation bit-reproducible across runs (spec §5).
pub fn aggregate(flows: &[CarrierFlow]) -> BuildingTotals {
    let mut totals = BuildingTotals::default();
    for flow in flows {
        let entry = totals.by_carrier.entry(carrier_key(flow.carrier).to_string()).or_default();
        entry.final_energy_kwh += flow.annual_kwh;
        entry.primary_energy_kwh += flow.annual_kwh * primary_energy_factor(flow.carrier);
        entry.co2_kg += flow.annual_kwh * co2_factor(flow.carrier);
    }
    for totals_for_carrier in totals.by_carrier.values_mut() {
        totals_for_carrier.final_energy_kwh = fround2(totals_for_carrier.final_energy_kwh);
        totals_for_carrier.primary_energy_kwh = fround2(totals_for_carrier.primary_energy_kwh);
        totals_for_carrier.co2_kg = fround2(totals_for_carrier.co2_kg);
    }
    totals.net_final_energy_kwh = fround2(totals.by_carrier.values().map(|c| c.final_energy_kwh).sum());
    totals.net_primary_energy_kwh = fround2(totals.by_carrier.values().map(|c| c.primary_energy_kwh).sum());
    totals.net_co2_kg = fround2(totals.by_carrier.values().map(|c| c.co2_kg).sum());
    info!(
        "building totals: {:.1} kWh final, {:.1} kWh primary, {:.1} kg CO2",
        totals.net_final_energy_kwh, totals.net_primary_energy_kwh, totals.net_co2_kg
    );
    totals
}
