#![forbid(unsafe_code)]

//! Indoor pollutant emission calculator.
//!
//! Two independent, pure computations:
//! - [`estimator`]: E = Activity x EF, converted to grams by EF unit family.
//! - [`mass_balance`]: closed-form well-mixed single-zone concentration,
//!   dC/dt = E/V - (ACH + k) C, over a fixed 8 h horizon.
//!
//! Emission factors come from a read-only [`reference::ReferenceTable`].

pub mod config;
pub mod error;
pub mod estimator;
pub mod mass_balance;
pub mod reference;
pub mod units;

pub use config::AppConfig;
pub use error::{EmissionError, EmissionResult};
pub use estimator::{estimate, estimate_for, EmissionEstimateInput, EmissionReport};
pub use mass_balance::{
    simulate, ConcentrationPoint, ConcentrationTrajectory, MassBalanceInput, Removal, HORIZON_H,
    N_POINTS,
};
pub use reference::{write_records_csv, EmissionFactorRecord, ReferenceTable};
pub use units::UnitKind;

/// Shown under every simulation result.
pub const MASS_BALANCE_CAPTION: &str =
    "Assumes well-mixed room, constant emission during simulation period.";

/// Model description and data-source list for the about panel.
pub const ABOUT: &str = "This calculator estimates indoor pollutant emissions using the \
standard E = Activity x EF model, and simulates room concentration with the \
well-mixed mass balance dC/dt = E/V - (ACH + k)*C. Data sources: ESSD (2023), \
Atmosphere (2019), Tehran (2021), Tobacco (2010), PAH (2008).";
