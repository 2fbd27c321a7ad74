// Copyright (c) 2018-2020 Rafael Villar Burke <pachi@ietcc.csic.es>
// Distributed under the MIT License
// (See acoompanying LICENSE file or a copy at http://opensource.org/licenses/MIT)

//! Error taxonomy for the energy-balance engine.
//!
//! `EngineError` covers the fail-fast kinds: a caller sees these as a
//! `Result::Err` from [`crate::calculate`]. The recoverable kinds
//! (`InvalidAssembly`, `OutOfTable`, `MissingSystem`) are never returned
//! as errors — they are pushed onto [`crate::results::Results::warnings`]
//! as a [`Warning`] instead, so one bad surface or missing generator does
//! not abort the whole building.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fail-fast error kinds (spec §7): a zone or the whole calculation
/// cannot proceed without the missing data.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    /// A zone references a usage-profile key not present in the catalogue.
    #[error("zone {zone_id}: unknown usage profile {profile_key}")]
    UnknownProfile { zone_id: String, profile_key: String },

    /// A zone has zero area, zero envelope, or a non-positive total heat
    /// loss coefficient.
    #[error("zone {zone_id}: degenerate zone ({reason})")]
    DegenerateZone { zone_id: String, reason: String },

    /// No climate record matches the requested station.
    #[error("no climate record for station {station_id}")]
    ClimateUnavailable { station_id: String },
}

/// Severity of a [`Warning`] entry in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WarningLevel {
    Success,
    Danger,
    Warning,
    Info,
}

/// A single recoverable-anomaly entry in the audit trail, carrying the id
/// of the entity it concerns so a UI layer can highlight it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Warning {
    pub level: WarningLevel,
    pub id: Option<String>,
    pub kind: WarningKind,
    pub msg: String,
}

/// Recoverable anomaly kinds (spec §7): the calculation degrades locally
/// instead of aborting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// A window construction is missing glazing data, or resolves to U <= 0.
    InvalidAssembly,
    /// A zone has demand for an end-use but no system assigned for it.
    MissingSystem,
    /// Glazing parameters fell outside the standard-value lookup table and
    /// were resolved via nearest-match fallback.
    OutOfTable,
}

impl Warning {
    pub fn new(level: WarningLevel, kind: WarningKind, id: Option<String>, msg: impl Into<String>) -> Self {
        Warning {
            level,
            id,
            kind,
            msg: msg.into(),
        }
    }
}
