// Copyright (c) 2018-2020 Rafael Villar Burke <pachi@ietcc.csic.es>
// Distributed under the MIT License
// (See acoompanying LICENSE file or a copy at http://opensource.org/licenses/MIT)

//! Result-tree types returned by [`crate::calculate`], and the
//! `as_json`/`from_json` convenience pair matching the teacher's
//! `Model::as_json`/`Model::from_json`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::aggregate::BuildingTotals;
use crate::balance::ZoneBalance;
use crate::error::Warning;
use crate::lighting::ZoneLighting;
use crate::systems::FinalEnergy;

/// Per-zone results: the monthly balance, lighting demand and the
/// final-energy conversion of each end-use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneResults {
    pub balance: ZoneBalance,
    pub lighting: ZoneLighting,
    pub heating_final: FinalEnergy,
    pub cooling_final: FinalEnergy,
    pub dhw_final: FinalEnergy,
}

/// The complete output of one `calculate()` call.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Results {
    pub zones: BTreeMap<String, ZoneResults>,
    pub building: BuildingTotals,
    pub warnings: Vec<Warning>,
}

impl Results {
    pub fn as_json(&self) -> Result<String, anyhow::Error> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(data: &str) -> Result<Self, anyhow::Error> {
        Ok(serde_json::from_str(data)?)
    }
}
