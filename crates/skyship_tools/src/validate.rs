//! Data validation utilities.

use std::fmt;
use std::path::{Path, PathBuf};

use skyship_core::data::VehicleData;
use skyship_headless::scenario::Scenario;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Subdirectory holding vehicle definitions.
pub const VEHICLES_DIR: &str = "vehicles";
/// Subdirectory holding flight scenarios.
pub const SCENARIOS_DIR: &str = "scenarios";

/// Errors that stop validation before any file is checked.
#[derive(Debug, Error)]
pub enum ValidateError {
    /// The data path does not exist or is not a directory.
    #[error("Not a data directory: {0}")]
    NotADirectory(PathBuf),

    /// Neither `vehicles/` nor `scenarios/` exists under the data path.
    #[error("No vehicles/ or scenarios/ directory under {0}")]
    NoDataFiles(PathBuf),

    /// A directory could not be listed.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Directory being listed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
}

/// Result type for validation.
pub type Result<T> = std::result::Result<T, ValidateError>;

/// Kind of data file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// A `VehicleData` definition.
    Vehicle,
    /// A flight scenario.
    Scenario,
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vehicle => write!(f, "vehicle"),
            Self::Scenario => write!(f, "scenario"),
        }
    }
}

/// One problem in one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationProblem {
    /// Offending file.
    pub file: PathBuf,
    /// What kind of file it was loaded as.
    pub kind: FileKind,
    /// Parse or consistency message.
    pub message: String,
}

impl fmt::Display for ValidationProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.file.display(), self.kind, self.message)
    }
}

/// Outcome of validating a data directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Vehicle files checked.
    pub vehicles_checked: usize,
    /// Scenario files checked.
    pub scenarios_checked: usize,
    /// Every problem found, in file order.
    pub problems: Vec<ValidationProblem>,
}

impl ValidationReport {
    /// True when no file had a problem.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.problems.is_empty()
    }

    /// Number of files checked.
    #[must_use]
    pub const fn files_checked(&self) -> usize {
        self.vehicles_checked + self.scenarios_checked
    }

    fn push(&mut self, file: &Path, kind: FileKind, message: String) {
        warn!(file = %file.display(), %kind, "{message}");
        self.problems.push(ValidationProblem {
            file: file.to_path_buf(),
            kind,
            message,
        });
    }
}

/// Validate all RON data files in a directory.
///
/// Every `*.ron` under `vehicles/` is parsed as a vehicle and every
/// `*.ron` under `scenarios/` as a scenario; each is then checked for
/// consistency. Problems are collected, not returned as errors.
///
/// # Errors
///
/// Returns an error if the directory is missing, holds neither
/// subdirectory, or cannot be listed.
pub fn validate_data_directory(path: &Path) -> Result<ValidationReport> {
    if !path.is_dir() {
        return Err(ValidateError::NotADirectory(path.to_path_buf()));
    }

    let vehicles = path.join(VEHICLES_DIR);
    let scenarios = path.join(SCENARIOS_DIR);
    if !vehicles.is_dir() && !scenarios.is_dir() {
        return Err(ValidateError::NoDataFiles(path.to_path_buf()));
    }

    let mut report = ValidationReport::default();

    for file in ron_files(&vehicles)? {
        debug!(file = %file.display(), "Checking vehicle");
        report.vehicles_checked += 1;
        for message in check_vehicle(&file) {
            report.push(&file, FileKind::Vehicle, message);
        }
    }

    for file in ron_files(&scenarios)? {
        debug!(file = %file.display(), "Checking scenario");
        report.scenarios_checked += 1;
        for message in check_scenario(&file) {
            report.push(&file, FileKind::Scenario, message);
        }
    }

    info!(
        vehicles = report.vehicles_checked,
        scenarios = report.scenarios_checked,
        problems = report.problems.len(),
        "Validation finished"
    );
    Ok(report)
}

/// Problems with one vehicle file.
#[must_use]
pub fn check_vehicle(file: &Path) -> Vec<String> {
    let source = match std::fs::read_to_string(file) {
        Ok(source) => source,
        Err(e) => return vec![format!("Failed to read: {e}")],
    };
    // Parse directly so the message carries the line and column.
    match ron::from_str::<VehicleData>(&source) {
        Ok(vehicle) => vehicle.validate(),
        Err(e) => vec![format!("Parse error: {e}")],
    }
}

/// Problems with one scenario file, including its vehicle.
#[must_use]
pub fn check_scenario(file: &Path) -> Vec<String> {
    match Scenario::load(file) {
        Ok(scenario) => scenario.validate(),
        Err(e) => vec![e.to_string()],
    }
}

/// Sorted `*.ron` files directly inside `dir`. A missing directory has none.
fn ron_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let io_error = |source| ValidateError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "ron") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const GOOD_VEHICLE: &str = r#"VehicleData(
        id: "frigate",
        hull: HullData(mass_tons: 30.0),
        power_plants: [PowerPlantData(name: "main")],
        lift: Some(LiftUnitData(name: "lift")),
    )"#;

    fn data_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join(VEHICLES_DIR)).unwrap();
        fs::create_dir(dir.path().join(SCENARIOS_DIR)).unwrap();
        dir
    }

    #[test]
    fn test_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            validate_data_directory(&dir.path().join("nope")),
            Err(ValidateError::NotADirectory(_))
        ));
        assert!(matches!(
            validate_data_directory(dir.path()),
            Err(ValidateError::NoDataFiles(_))
        ));
    }

    #[test]
    fn test_valid_directory() {
        let dir = data_dir();
        fs::write(dir.path().join("vehicles/frigate.ron"), GOOD_VEHICLE).unwrap();
        fs::write(dir.path().join("vehicles/notes.txt"), "ignored").unwrap();
        fs::write(
            dir.path().join("scenarios/hover.ron"),
            r#"Scenario(name: "hover", vehicle: File("../vehicles/frigate.ron"))"#,
        )
        .unwrap();

        let report = validate_data_directory(dir.path()).unwrap();
        assert!(report.is_ok(), "{:?}", report.problems);
        assert_eq!(report.vehicles_checked, 1);
        assert_eq!(report.scenarios_checked, 1);
        assert_eq!(report.files_checked(), 2);
    }

    #[test]
    fn test_problems_are_collected() {
        let dir = data_dir();
        fs::write(dir.path().join("vehicles/a_broken.ron"), "VehicleData(").unwrap();
        fs::write(
            dir.path().join("vehicles/b_heavy.ron"),
            r#"VehicleData(id: "heavy", hull: HullData(mass_tons: -1.0))"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("scenarios/lost.ron"),
            r#"Scenario(name: "lost", vehicle: File("missing.ron"))"#,
        )
        .unwrap();

        let report = validate_data_directory(dir.path()).unwrap();
        assert!(!report.is_ok());
        assert_eq!(report.files_checked(), 3);

        let files: Vec<_> = report
            .problems
            .iter()
            .map(|p| p.file.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(files[0], "a_broken.ron");
        assert!(report.problems[0].message.starts_with("Parse error"));
        assert!(files.contains(&"b_heavy.ron".to_string()));
        assert_eq!(report.problems.last().unwrap().kind, FileKind::Scenario);
    }

    #[test]
    fn test_bundled_assets_are_valid() {
        let assets = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../assets/data");
        let report = validate_data_directory(&assets).unwrap();
        assert!(report.is_ok(), "{:?}", report.problems);
        assert!(report.vehicles_checked >= 3);
        assert!(report.scenarios_checked >= 3);
    }
}
