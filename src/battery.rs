//! Battery runtime estimation.
//!
//! Independent of the Ohm's-law solver; it only shares the number parser
//! with it on the CLI side.

use serde::{Deserialize, Serialize};

use crate::error::BatteryError;

const MILLI: f64 = 1e-3;

/// Runtime and energy for a battery under a constant load.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatteryEstimate {
    pub capacity_ah: f64,
    pub draw_a: f64,
    pub hours: f64,
    /// Only known when a nominal voltage was supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watt_hours: Option<f64>,
}

impl BatteryEstimate {
    pub fn minutes(&self) -> f64 {
        self.hours * 60.0
    }
}

/// hours = capacity (Ah) / draw (A); Wh = Ah × V when `voltage` is given.
pub fn estimate(capacity_mah: f64, draw_ma: f64, voltage: Option<f64>) -> Result<BatteryEstimate, BatteryError> {
    if !capacity_mah.is_finite() {
        return Err(BatteryError::NonFinite { quantity: "Capacity" });
    }
    if !draw_ma.is_finite() {
        return Err(BatteryError::NonFinite { quantity: "Load current" });
    }
    if capacity_mah <= 0.0 {
        return Err(BatteryError::NonPositiveCapacity);
    }
    if draw_ma <= 0.0 {
        return Err(BatteryError::NonPositiveDraw);
    }

    let nominal_voltage = match voltage {
        Some(v) if !v.is_finite() => return Err(BatteryError::NonFinite { quantity: "Battery voltage" }),
        Some(v) if v <= 0.0 => return Err(BatteryError::NonPositiveVoltage),
        other => other,
    };

    let capacity_ah = capacity_mah * MILLI;
    let draw_a = draw_ma * MILLI;

    Ok(BatteryEstimate {
        capacity_ah,
        draw_a,
        hours: capacity_ah / draw_a,
        watt_hours: nominal_voltage.map(|v| capacity_ah * v),
    })
}
