use std::fmt;

use crate::error::{EmissionError, EmissionResult};
use crate::reference::{EmissionFactorRecord, ReferenceTable};
use crate::units::UnitKind;

/// One "Calculate" request.
#[derive(Debug, Clone, PartialEq)]
pub struct EmissionEstimateInput {
    /// Activity name as listed in the reference table.
    pub activity: String,
    /// Pollutant name as listed for that activity.
    pub pollutant: String,
    /// Activity amount; its unit is implied by the matched EF (kg, J or h).
    pub amount: f64,
}

/// Result of an estimate, echoing the factor it was computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct EmissionReport {
    /// Matched activity.
    pub activity: String,
    /// Matched pollutant.
    pub pollutant: String,
    /// Activity amount as entered.
    pub amount: f64,
    /// Emission factor used.
    pub ef: f64,
    /// EF unit text as published.
    pub unit: String,
    /// Citation for the EF.
    pub source: String,
    /// Emitted mass, g.
    pub grams: f64,
}

/// Stand-in unit text when the caller only supplied a [`UnitKind`].
pub const NO_UNIT_TEXT: &str = "(no unit text available)";

/// E = Activity x EF, converted to grams according to the EF unit family.
///
/// Only the unit family is known here, so an unsupported unit reports
/// [`NO_UNIT_TEXT`]; [`estimate_record`] reports the record's own unit text.
pub fn estimate(amount: f64, factor: f64, unit_kind: UnitKind) -> EmissionResult<f64> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(EmissionError::InvalidInput(format!(
            "activity amount must be a non-negative number, got {}",
            amount
        )));
    }
    if !factor.is_finite() || factor <= 0.0 {
        return Err(EmissionError::InvalidInput(format!(
            "emission factor must be positive, got {}",
            factor
        )));
    }
    unit_kind
        .to_grams(amount, factor)
        .ok_or_else(|| EmissionError::UnsupportedUnit {
            unit: NO_UNIT_TEXT.to_string(),
        })
}

/// Estimate against a single record, reporting the record's own unit text on failure.
pub fn estimate_record(record: &EmissionFactorRecord, amount: f64) -> EmissionResult<f64> {
    match estimate(amount, record.ef, record.unit_kind) {
        Err(EmissionError::UnsupportedUnit { .. }) => {
            log::warn!(
                "unit '{}' for {} / {} is not a supported EF unit",
                record.unit,
                record.activity,
                record.pollutant
            );
            Err(EmissionError::UnsupportedUnit {
                unit: record.unit.clone(),
            })
        }
        other => other,
    }
}

/// Lookup plus estimate, as triggered by the calculator panel.
pub fn estimate_for(
    table: &ReferenceTable,
    input: &EmissionEstimateInput,
) -> EmissionResult<EmissionReport> {
    let record = table.lookup(&input.activity, &input.pollutant)?;
    let grams = estimate_record(record, input.amount)?;
    log::debug!(
        "{} / {}: {} x {} {} -> {} g",
        record.activity,
        record.pollutant,
        input.amount,
        record.ef,
        record.unit,
        grams
    );
    Ok(EmissionReport {
        activity: record.activity.clone(),
        pollutant: record.pollutant.clone(),
        amount: input.amount,
        ef: record.ef,
        unit: record.unit.clone(),
        source: record.source.clone(),
        grams,
    })
}

impl fmt::Display for EmissionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Emission Factor (EF): {} {}", self.ef, self.unit)?;
        writeln!(f, "Total Emission: {:.6} g", self.grams)?;
        write!(f, "Source: {}", self.source)
    }
}
