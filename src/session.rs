use anyhow::{anyhow, Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs::File;

use crate::cli::OutputFormat;
use crate::format::{
    format_current_smart, format_engineering, format_watts_decimal, DEFAULT_SIGNIFICANT_DIGITS, NOT_A_NUMBER,
};
use crate::solver::{KnownSet, OhmsSolver, Quantity, Solution, SolverConfig};

/// One solve request and its outcome, as held by the caller between requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calculation {
    pub input: KnownSet,
    pub solutions: Vec<Solution>,
    pub selected: usize,
}

impl Calculation {
    pub fn selected_solution(&self) -> Option<&Solution> {
        self.solutions.get(self.selected)
    }
}

/// A solution rendered for display and CSV export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolutionRow {
    pub branch: usize,
    pub voltage: f64,
    pub current: f64,
    pub resistance: f64,
    pub power: f64,
    pub voltage_text: String,
    pub current_text: String,
    pub resistance_text: String,
    pub power_text: String,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub solver_config: SolverConfig,
    pub significant_digits: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            solver_config: SolverConfig::default(),
            significant_digits: DEFAULT_SIGNIFICANT_DIGITS,
        }
    }
}

/// Caller-owned state around the stateless solver: the last solution set and
/// which branch of it is selected. A failed request leaves both untouched.
pub struct Session {
    solver: OhmsSolver,
    results: Option<Calculation>,
    config: SessionConfig,
}

impl Session {
    /// Create a new session with default configuration
    pub fn new() -> Self {
        Session {
            solver: OhmsSolver::new(),
            results: None,
            config: SessionConfig::default(),
        }
    }

    /// Create a new session with custom configuration
    pub fn with_config(config: SessionConfig) -> Self {
        Session {
            solver: OhmsSolver::with_config(config.solver_config),
            results: None,
            config,
        }
    }

    /// Solve `known` and make the result current, selecting branch 0.
    pub fn solve(&mut self, known: KnownSet) -> Result<&Calculation> {
        let solutions = self.solver.solve(&known)?;
        info!("Solved {} known value(s): {} branch(es)", known.count(), solutions.len());

        Ok(&*self.results.insert(Calculation {
            input: known,
            solutions,
            selected: 0,
        }))
    }

    /// Select which branch of the current solution set is displayed and exported.
    pub fn select_branch(&mut self, index: usize) -> Result<&Solution> {
        let results = self.results.as_mut()
            .ok_or_else(|| anyhow!("Nothing solved yet"))?;

        if index >= results.solutions.len() {
            return Err(anyhow!(
                "Branch {} does not exist; {} branch(es) available",
                index,
                results.solutions.len()
            ));
        }

        results.selected = index;
        info!("Selected branch {}", index);
        Ok(&results.solutions[index])
    }

    /// Get the current calculation
    pub fn get_results(&self) -> Option<&Calculation> {
        self.results.as_ref()
    }

    pub fn selected(&self) -> Option<&Solution> {
        self.results.as_ref().and_then(Calculation::selected_solution)
    }

    /// Render one solution with the display policy of each quantity.
    pub fn format_solution(&self, branch: usize, solution: &Solution) -> SolutionRow {
        SolutionRow {
            branch,
            voltage: solution.voltage,
            current: solution.current,
            resistance: solution.resistance,
            power: solution.power,
            voltage_text: self.engineering_text(solution.voltage, Quantity::Voltage),
            current_text: format_current_smart(solution.current).to_string(),
            resistance_text: self.engineering_text(solution.resistance, Quantity::Resistance),
            power_text: watts_text(solution.power),
        }
    }

    fn engineering_text(&self, value: f64, quantity: Quantity) -> String {
        format_engineering(value, self.config.significant_digits).with_unit(quantity.unit())
    }

    fn rows(&self, results: &Calculation) -> Vec<SolutionRow> {
        results.solutions.iter()
            .enumerate()
            .map(|(branch, solution)| self.format_solution(branch, solution))
            .collect()
    }

    /// Export the current calculation to file
    pub fn export_results(&self, filename: &str, format: OutputFormat) -> Result<()> {
        let results = self.results.as_ref()
            .ok_or_else(|| anyhow!("No results available"))?;

        match format {
            OutputFormat::Csv => write_csv(filename, &self.rows(results)),
            OutputFormat::Json => write_json(filename, results),
        }
    }

    /// Summary of the current calculation, one line per entry.
    pub fn summary_lines(&self) -> Vec<String> {
        let results = match &self.results {
            Some(results) => results,
            None => return vec!["No results available".to_string()],
        };

        let mut lines = vec!["=== Ohm's Law Summary ===".to_string()];

        let given: Vec<String> = Quantity::ALL.iter()
            .filter_map(|q| results.input.get(*q).map(|value| format!("{} = {}", q.symbol(), value)))
            .collect();
        lines.push(format!("Known: {}", given.join(", ")));

        if results.solutions.len() > 1 {
            lines.push(format!(
                "{} branches (sign of V and I is not determined by R and P)",
                results.solutions.len()
            ));
        }

        for row in self.rows(results) {
            let marker = if row.branch == results.selected { '*' } else { ' ' };
            lines.push(format!(
                "{} [{}] V = {}  I = {}  R = {}  P = {}",
                marker, row.branch, row.voltage_text, row.current_text, row.resistance_text, row.power_text
            ));
        }

        if let Some(solution) = results.selected_solution() {
            lines.push(format!("Raw current: {}", format_current_smart(solution.current).raw));
        }

        lines
    }

    /// Print calculation summary
    pub fn print_summary(&self) {
        println!();
        for line in self.summary_lines() {
            println!("{}", line);
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

fn watts_text(watts: f64) -> String {
    match format_watts_decimal(watts) {
        text if text == NOT_A_NUMBER => text,
        text => format!("{} W", text),
    }
}

/// Write serializable rows as CSV with a header taken from the field names.
pub fn write_csv<T: Serialize>(filename: &str, rows: &[T]) -> Result<()> {
    let file = File::create(filename)
        .with_context(|| format!("Failed to create '{}'", filename))?;
    let mut writer = csv::Writer::from_writer(file);

    for row in rows {
        writer.serialize(row)?;
    }

    writer.flush()?;
    info!("Results exported to CSV: {}", filename);
    Ok(())
}

/// Write a serializable value as pretty-printed JSON.
pub fn write_json<T: Serialize + ?Sized>(filename: &str, value: &T) -> Result<()> {
    let file = File::create(filename)
        .with_context(|| format!("Failed to create '{}'", filename))?;
    serde_json::to_writer_pretty(file, value)?;

    info!("Results exported to JSON: {}", filename);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InputError;

    fn five_volts_ten_ohms() -> KnownSet {
        KnownSet::new()
            .with(Quantity::Voltage, 5.0)
            .with(Quantity::Resistance, 10.0)
    }

    fn ten_ohms_quarter_watt() -> KnownSet {
        KnownSet::new()
            .with(Quantity::Resistance, 10.0)
            .with(Quantity::Power, 2.5)
    }

    #[test]
    fn test_solve_selects_first_branch() {
        let mut session = Session::new();
        let calculation = session.solve(ten_ohms_quarter_watt()).unwrap();
        assert_eq!(calculation.solutions.len(), 2);
        assert_eq!(calculation.selected, 0);
        assert_eq!(session.selected().unwrap().voltage, 5.0);
    }

    #[test]
    fn test_select_branch() {
        let mut session = Session::new();
        assert!(session.select_branch(0).is_err());

        session.solve(ten_ohms_quarter_watt()).unwrap();
        let solution = session.select_branch(1).unwrap();
        assert_eq!(solution.voltage, -5.0);
        assert_eq!(session.get_results().unwrap().selected, 1);

        assert!(session.select_branch(2).is_err());
        assert_eq!(session.get_results().unwrap().selected, 1);
    }

    #[test]
    fn test_failed_solve_keeps_previous_state() {
        let mut session = Session::new();
        session.solve(five_volts_ten_ohms()).unwrap();

        let err = session.solve(KnownSet::new().with(Quantity::Voltage, 1.0)).unwrap_err();
        assert_eq!(
            err.downcast_ref::<InputError>(),
            Some(&InputError::NotEnoughValues { given: 1 })
        );
        assert_eq!(session.get_results().unwrap().input, five_volts_ten_ohms());
    }

    #[test]
    fn test_format_solution() {
        let session = Session::new();
        let row = session.format_solution(0, &Solution { voltage: 5.0, current: 0.5, resistance: 4700.0, power: 2.5 });
        assert_eq!(row.voltage_text, "5 V");
        assert_eq!(row.current_text, "500 mA");
        assert_eq!(row.resistance_text, "4.7 kΩ");
        assert_eq!(row.power_text, "2.5 W");
    }

    #[test]
    fn test_summary_marks_selected_branch() {
        let mut session = Session::new();
        assert_eq!(session.summary_lines(), vec!["No results available".to_string()]);

        session.solve(ten_ohms_quarter_watt()).unwrap();
        session.select_branch(1).unwrap();
        let lines = session.summary_lines();

        assert_eq!(lines[1], "Known: R = 10, P = 2.5");
        assert!(lines.iter().any(|l| l.starts_with("  [0] V = 5 V")));
        assert!(lines.iter().any(|l| l.starts_with("* [1] V = -5 V")));
        assert_eq!(lines.last().unwrap(), "Raw current: -5.0000000E-1 A");
    }

    #[test]
    fn test_export_json() {
        let mut session = Session::new();
        session.solve(five_volts_ten_ohms()).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("result.json");
        let path = path.to_str().unwrap();
        session.export_results(path, OutputFormat::Json).unwrap();

        let text = std::fs::read_to_string(path).unwrap();
        let read_back: Calculation = serde_json::from_str(&text).unwrap();
        assert_eq!(&read_back, session.get_results().unwrap());
        assert!(!text.contains("\"current\": null"));
    }

    #[test]
    fn test_export_csv() {
        let mut session = Session::new();
        session.solve(ten_ohms_quarter_watt()).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("result.csv");
        let path = path.to_str().unwrap();
        session.export_results(path, OutputFormat::Csv).unwrap();

        let mut reader = csv::Reader::from_path(path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(&headers[0], "branch");
        assert_eq!(&headers[5], "voltage_text");

        let rows: Vec<SolutionRow> = reader.deserialize().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].voltage_text, "-5 V");
        assert_eq!(rows[1].current_text, "-500 mA");
    }

    #[test]
    fn test_export_without_results_fails() {
        let session = Session::new();
        assert!(session.export_results("unused.json", OutputFormat::Json).is_err());
    }
}
