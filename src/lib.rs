pub mod battery;
pub mod cli;
pub mod error;
pub mod format;
pub mod parser;
pub mod session;
pub mod solver;

// Re-export commonly used types
pub use error::{BatteryError, Error, InputError, ParseError};
pub use format::{format_current_smart, format_engineering, format_watts_decimal, CurrentText, Engineering};
pub use parser::parse;
pub use session::{Calculation, Session, SessionConfig};
pub use solver::{solve, KnownSet, OhmsSolver, Quantity, Solution, SolverConfig};

// Error types
pub type Result<T> = anyhow::Result<T>;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
