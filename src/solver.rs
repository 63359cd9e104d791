use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::InputError;

/// One of the four quantities related by V = I·R and P = V·I.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quantity {
    Voltage,
    Current,
    Resistance,
    Power,
}

impl Quantity {
    pub const ALL: [Quantity; 4] = [
        Quantity::Voltage,
        Quantity::Current,
        Quantity::Resistance,
        Quantity::Power,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Quantity::Voltage => "Voltage",
            Quantity::Current => "Current",
            Quantity::Resistance => "Resistance",
            Quantity::Power => "Power",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Quantity::Voltage => "V",
            Quantity::Current => "I",
            Quantity::Resistance => "R",
            Quantity::Power => "P",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Quantity::Voltage => "V",
            Quantity::Current => "A",
            Quantity::Resistance => "Ω",
            Quantity::Power => "W",
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The values a caller knows. Unset fields are absent, not zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct KnownSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voltage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resistance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power: Option<f64>,
}

impl KnownSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter, e.g. `KnownSet::new().with(Quantity::Voltage, 5.0)`.
    pub fn with(mut self, quantity: Quantity, value: f64) -> Self {
        self.set(quantity, Some(value));
        self
    }

    pub fn set(&mut self, quantity: Quantity, value: Option<f64>) {
        match quantity {
            Quantity::Voltage => self.voltage = value,
            Quantity::Current => self.current = value,
            Quantity::Resistance => self.resistance = value,
            Quantity::Power => self.power = value,
        }
    }

    pub fn get(&self, quantity: Quantity) -> Option<f64> {
        match quantity {
            Quantity::Voltage => self.voltage,
            Quantity::Current => self.current,
            Quantity::Resistance => self.resistance,
            Quantity::Power => self.power,
        }
    }

    /// Number of fields present.
    pub fn count(&self) -> usize {
        Quantity::ALL.iter().filter(|q| self.get(**q).is_some()).count()
    }
}

/// A fully-populated (V, I, R, P) tuple satisfying V = I·R and P = V·I.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    pub voltage: f64,
    pub current: f64,
    pub resistance: f64,
    pub power: f64,
}

impl Solution {
    pub fn get(&self, quantity: Quantity) -> f64 {
        match quantity {
            Quantity::Voltage => self.voltage,
            Quantity::Current => self.current,
            Quantity::Resistance => self.resistance,
            Quantity::Power => self.power,
        }
    }

    fn is_finite(&self) -> bool {
        Quantity::ALL.iter().all(|q| self.get(*q).is_finite())
    }
}

/// Solver configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    pub relative_tolerance: f64,
    pub absolute_tolerance: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            relative_tolerance: 1e-9,
            absolute_tolerance: 1e-12,
        }
    }
}

impl SolverConfig {
    /// |a - b| <= max(absolute, relative * max(|a|, |b|))
    pub fn nearly_equal(&self, a: f64, b: f64) -> bool {
        let scale = a.abs().max(b.abs());
        (a - b).abs() <= self.absolute_tolerance.max(self.relative_tolerance * scale)
    }

    fn solutions_match(&self, a: &Solution, b: &Solution) -> bool {
        Quantity::ALL
            .iter()
            .all(|q| self.nearly_equal(a.get(*q), b.get(*q)))
    }
}

/// Near-equality with the default tolerances.
pub fn nearly_equal(a: f64, b: f64) -> bool {
    SolverConfig::default().nearly_equal(a, b)
}

/// Solve with the default configuration.
pub fn solve(known: &KnownSet) -> Result<Vec<Solution>, InputError> {
    OhmsSolver::new().solve(known)
}

/// Derives every (V, I, R, P) tuple consistent with a set of known values.
#[derive(Debug, Clone, Default)]
pub struct OhmsSolver {
    config: SolverConfig,
}

impl OhmsSolver {
    /// Create a new solver with default configuration
    pub fn new() -> Self {
        OhmsSolver {
            config: SolverConfig::default(),
        }
    }

    /// Create a new solver with custom configuration
    pub fn with_config(config: SolverConfig) -> Self {
        OhmsSolver { config }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Evaluate every pair of known values in the order V-I, V-R, I-R, V-P,
    /// I-P, R-P and collect the candidates that agree with all known values.
    ///
    /// The R-P pair does not fix the sign of V and I, so it contributes two
    /// branches. Near-equal duplicates keep their first occurrence.
    pub fn solve(&self, known: &KnownSet) -> Result<Vec<Solution>, InputError> {
        self.validate(known)?;

        let mut solutions = Vec::new();
        let KnownSet { voltage, current, resistance, power } = *known;

        if let (Some(v), Some(i)) = (voltage, current) {
            if i == 0.0 {
                return Err(if v == 0.0 {
                    InputError::ZeroVoltageAndCurrent
                } else {
                    InputError::InfiniteResistance
                });
            }
            self.admit(&mut solutions, known, "V-I", Solution {
                voltage: v,
                current: i,
                resistance: v / i,
                power: v * i,
            });
        }

        if let (Some(v), Some(r)) = (voltage, resistance) {
            let i = v / r;
            self.admit(&mut solutions, known, "V-R", Solution {
                voltage: v,
                current: i,
                resistance: r,
                power: v * i,
            });
        }

        if let (Some(i), Some(r)) = (current, resistance) {
            let v = i * r;
            self.admit(&mut solutions, known, "I-R", Solution {
                voltage: v,
                current: i,
                resistance: r,
                power: v * i,
            });
        }

        if let (Some(v), Some(p)) = (voltage, power) {
            if v == 0.0 {
                return Err(if p == 0.0 {
                    InputError::ZeroVoltageAndPower
                } else {
                    InputError::PowerWithoutVoltage
                });
            }
            if p == 0.0 {
                return Err(InputError::UndeterminedResistance);
            }
            let i = p / v;
            self.admit(&mut solutions, known, "V-P", Solution {
                voltage: v,
                current: i,
                resistance: v / i,
                power: p,
            });
        }

        if let (Some(i), Some(p)) = (current, power) {
            if i == 0.0 {
                return Err(if p == 0.0 {
                    InputError::ZeroCurrentAndPower
                } else {
                    InputError::PowerWithoutCurrent
                });
            }
            let r = p / (i * i);
            self.admit(&mut solutions, known, "I-P", Solution {
                voltage: i * r,
                current: i,
                resistance: r,
                power: p,
            });
        }

        if let (Some(r), Some(p)) = (resistance, power) {
            let magnitude = (p * r).sqrt();
            for v in [magnitude, -magnitude] {
                self.admit(&mut solutions, known, "R-P", Solution {
                    voltage: v,
                    current: v / r,
                    resistance: r,
                    power: p,
                });
            }
        }

        if solutions.is_empty() {
            debug!("No candidate survived for {:?}", known);
            return Err(InputError::Contradictory);
        }

        debug!("Solved {:?}: {} solution(s)", known, solutions.len());
        Ok(solutions)
    }

    fn validate(&self, known: &KnownSet) -> Result<(), InputError> {
        let given = known.count();
        if given < 2 {
            return Err(InputError::NotEnoughValues { given });
        }

        for quantity in Quantity::ALL {
            if let Some(value) = known.get(quantity) {
                if !value.is_finite() {
                    return Err(InputError::NonFinite { quantity: quantity.name() });
                }
            }
        }

        if matches!(known.resistance, Some(r) if r <= 0.0) {
            return Err(InputError::NonPositiveResistance);
        }
        if matches!(known.power, Some(p) if p < 0.0) {
            return Err(InputError::NegativePower);
        }

        Ok(())
    }

    /// Append `candidate` unless it is physically invalid, disagrees with a
    /// known value, or duplicates an earlier solution.
    fn admit(&self, solutions: &mut Vec<Solution>, known: &KnownSet, pair: &str, candidate: Solution) {
        if !candidate.is_finite() || candidate.resistance <= 0.0 {
            debug!("{} candidate rejected, R = {}", pair, candidate.resistance);
            return;
        }

        let disagrees = Quantity::ALL.iter().find(|q| {
            known
                .get(**q)
                .map_or(false, |value| !self.config.nearly_equal(candidate.get(**q), value))
        });
        if let Some(quantity) = disagrees {
            debug!("{} candidate rejected, disagrees with known {}", pair, quantity);
            return;
        }

        if solutions.iter().any(|s| self.config.solutions_match(s, &candidate)) {
            return;
        }

        debug!("{} candidate accepted: {:?}", pair, candidate);
        solutions.push(candidate);
    }
}
