use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::error::{EmissionError, EmissionResult};

/// Simulated horizon in hours.
pub const HORIZON_H: f64 = 8.0;
/// Samples over the horizon, both endpoints included.
pub const N_POINTS: usize = 200;

const UG_PER_G: f64 = 1e6;

/// Room and source parameters for the well-mixed single-zone model
/// dC/dt = E/V - (ACH + k) * C.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MassBalanceInput {
    /// Room volume V, m^3.
    pub volume_m3: f64,
    /// Air changes per hour, 1/h.
    pub ach_per_h: f64,
    /// Deposition/reaction loss-rate constant k, 1/h.
    pub k_per_h: f64,
    /// Constant emission rate E, g/h.
    pub emission_g_per_h: f64,
    /// Initial concentration C0, ug/m^3.
    pub c0_ug_m3: f64,
}

impl Default for MassBalanceInput {
    fn default() -> Self {
        MassBalanceInput {
            volume_m3: 50.0,
            ach_per_h: 1.0,
            k_per_h: 0.0,
            emission_g_per_h: 0.1,
            c0_ug_m3: 0.0,
        }
    }
}

/// Removal regime, from the total first-order loss rate lambda = ACH + k.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Removal {
    /// lambda = 0: pure accumulation, no equilibrium.
    NoRemoval,
    /// lambda > 0, in 1/h.
    FirstOrder(f64),
}

impl MassBalanceInput {
    /// Rejects zero volume and any negative or non-finite quantity.
    pub fn validate(&self) -> EmissionResult<()> {
        let fields = [
            ("room volume", self.volume_m3),
            ("air changes per hour", self.ach_per_h),
            ("loss-rate constant k", self.k_per_h),
            ("emission rate", self.emission_g_per_h),
            ("initial concentration", self.c0_ug_m3),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(EmissionError::InvalidInput(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        if self.volume_m3 == 0.0 {
            return Err(EmissionError::InvalidInput(
                "room volume must be greater than zero".to_string(),
            ));
        }
        if !self.lambda_per_h().is_finite() {
            return Err(EmissionError::InvalidInput(format!(
                "total removal rate ACH + k overflows: {} + {}",
                self.ach_per_h, self.k_per_h
            )));
        }
        if !self.source_g_m3_h().is_finite() {
            return Err(EmissionError::InvalidInput(format!(
                "source strength E/V overflows: {} / {}",
                self.emission_g_per_h, self.volume_m3
            )));
        }
        Ok(())
    }

    /// Total first-order removal rate lambda = ACH + k, 1/h.
    pub fn lambda_per_h(&self) -> f64 {
        self.ach_per_h + self.k_per_h
    }

    /// Removal regime selecting the solution branch.
    pub fn removal(&self) -> Removal {
        let lambda = self.lambda_per_h();
        if lambda > 0.0 {
            Removal::FirstOrder(lambda)
        } else {
            Removal::NoRemoval
        }
    }

    /// Source strength E/V in g/(m^3 h).
    fn source_g_m3_h(&self) -> f64 {
        self.emission_g_per_h / self.volume_m3
    }

    /// Equilibrium (E/V)/lambda in ug/m^3; `None` when nothing removes pollutant.
    pub fn steady_state_ug_m3(&self) -> EmissionResult<Option<f64>> {
        self.validate()?;
        let css = match self.removal() {
            Removal::NoRemoval => return Ok(None),
            Removal::FirstOrder(lambda) => self.source_g_m3_h() / lambda * UG_PER_G,
        };
        if !css.is_finite() {
            return Err(EmissionError::InvalidInput(format!(
                "steady state is not representable for lambda = {}",
                self.lambda_per_h()
            )));
        }
        Ok(Some(css))
    }

    /// Concentration in ug/m^3 at `t_h` hours. Inputs must already be validated.
    fn concentration_ug_m3(&self, t_h: f64) -> f64 {
        let c0_g = self.c0_ug_m3 / UG_PER_G;
        let s = self.source_g_m3_h();
        let c_g = match self.removal() {
            Removal::NoRemoval => c0_g + s * t_h,
            Removal::FirstOrder(lambda) => {
                // -expm1(-x) == 1 - e^-x, accurate for small lambda * t;
                // growth / lambda stays within [0, t]
                let growth = -(-lambda * t_h).exp_m1();
                s * (growth / lambda) + c0_g * (-lambda * t_h).exp()
            }
        };
        c_g * UG_PER_G
    }
}

/// Fixed sampling grid: `N_POINTS` times evenly spaced over [0, HORIZON_H].
pub fn time_grid() -> Vec<f64> {
    let last = (N_POINTS - 1) as f64;
    (0..N_POINTS)
        .map(|i| HORIZON_H * i as f64 / last)
        .collect()
}

/// One sample of the trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConcentrationPoint {
    /// Hours since the start of the simulation.
    #[serde(rename = "Time_h")]
    pub time_h: f64,
    /// Concentration, ug/m^3.
    #[serde(rename = "Concentration_ug_per_m3")]
    pub concentration_ug_m3: f64,
}

/// Concentration over the simulated horizon, time ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct ConcentrationTrajectory {
    points: Vec<ConcentrationPoint>,
}

impl ConcentrationTrajectory {
    /// All samples, time ascending.
    pub fn points(&self) -> &[ConcentrationPoint] {
        &self.points
    }

    /// Number of samples; always [`N_POINTS`] for a simulated trajectory.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when there are no samples.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Sample at the end of the horizon.
    pub fn final_point(&self) -> Option<ConcentrationPoint> {
        self.points.last().copied()
    }

    /// Highest concentration on the grid; earliest point on ties.
    pub fn peak(&self) -> Option<ConcentrationPoint> {
        self.points.iter().copied().fold(None, |best, p| match best {
            Some(b) if b.concentration_ug_m3 >= p.concentration_ug_m3 => Some(b),
            _ => Some(p),
        })
    }

    /// Write `Time_h,Concentration_ug_per_m3` rows with a header.
    pub fn write_csv<W: Write>(&self, writer: W) -> EmissionResult<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        for p in &self.points {
            wtr.serialize(p)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

/// Closed-form solution of the single-zone mass balance on the fixed grid.
///
/// For lambda > 0:
///   C(t) = (E/V)/lambda * (1 - e^(-lambda t)) + C0 e^(-lambda t)
/// For lambda = 0:
///   C(t) = C0 + (E/V) t
///
/// C0 and the returned concentrations are in ug/m^3; the arithmetic is in g/m^3.
pub fn simulate(input: &MassBalanceInput) -> EmissionResult<ConcentrationTrajectory> {
    if let Err(e) = input.validate() {
        log::warn!("mass balance rejected: {}", e);
        return Err(e);
    }
    log::debug!("mass balance removal regime: {:?}", input.removal());
    let points: Vec<ConcentrationPoint> = time_grid()
        .into_iter()
        .map(|t| ConcentrationPoint {
            time_h: t,
            concentration_ug_m3: input.concentration_ug_m3(t),
        })
        .collect();
    if let Some(bad) = points.iter().find(|p| !p.concentration_ug_m3.is_finite()) {
        let e = EmissionError::InvalidInput(format!(
            "concentration is not representable at t = {} h",
            bad.time_h
        ));
        log::warn!("mass balance rejected: {}", e);
        return Err(e);
    }
    Ok(ConcentrationTrajectory { points })
}
