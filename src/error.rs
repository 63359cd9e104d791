//! Error types for parsing, solving and battery estimation.
//!
//! Every failure is terminal for the call that raised it: no partial result
//! is returned and the message is meant to be shown to the user verbatim.

use thiserror::Error;

/// Malformed or empty numeric text.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Enter a value")]
    Empty,

    #[error("'{input}' is not a number")]
    NotNumeric { input: String },

    #[error("'{input}' has a unit suffix but no number")]
    MissingNumber { input: String },
}

/// Known-value sets the solver refuses.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    #[error("Enter at least two values (got {given})")]
    NotEnoughValues { given: usize },

    #[error("{quantity} must be a finite number")]
    NonFinite { quantity: &'static str },

    #[error("Resistance must be greater than zero")]
    NonPositiveResistance,

    #[error("Power cannot be negative")]
    NegativePower,

    #[error("I = 0 with V ≠ 0 implies infinite resistance — need R or P")]
    InfiniteResistance,

    #[error("V = 0 and I = 0 allow infinite solutions — need another value")]
    ZeroVoltageAndCurrent,

    #[error("V = 0 with P > 0 is impossible")]
    PowerWithoutVoltage,

    #[error("V = 0 and P = 0 allow infinite solutions — need another value")]
    ZeroVoltageAndPower,

    #[error("P = 0 with V ≠ 0 gives I = 0 but leaves R undetermined — need R or I")]
    UndeterminedResistance,

    #[error("I = 0 with P > 0 is impossible")]
    PowerWithoutCurrent,

    #[error("I = 0 and P = 0 allow infinite solutions — need another value")]
    ZeroCurrentAndPower,

    #[error("No valid solution — contradictory inputs")]
    Contradictory,
}

/// Battery runtime inputs the estimator refuses.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BatteryError {
    #[error("Capacity must be greater than zero")]
    NonPositiveCapacity,

    #[error("Load current must be greater than zero")]
    NonPositiveDraw,

    #[error("Battery voltage must be greater than zero")]
    NonPositiveVoltage,

    #[error("{quantity} must be a finite number")]
    NonFinite { quantity: &'static str },
}

/// Any failure raised by the library.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Battery(#[from] BatteryError),
}
