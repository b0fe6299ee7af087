//! CSV storage for simulation snapshots
//!
//! Streams snapshots to CSV (Comma-Separated Values), which is compatible
//! with Excel, Python pandas, MATLAB and most data analysis tools. One row
//! per snapshot, one column per grid point.
//!
//! # Features
//!
//! - **Streaming**: rows are written as the solver produces them
//! - **Metadata support**: optional comment header with run parameters
//! - **Customizable**: delimiter, decimal separator, precision
//! - **Multi-domain**: the `source` column tells constituents apart
//! - **Validation**: rejects NaN/Inf and rows of the wrong width
//!
//! # Quick Examples
//!
//! ## Minimal Export
//!
//! ```rust
//! use pde_rs::output::{CsvConfig, CsvStorage, Snapshot, Storage};
//!
//! let mut storage = CsvStorage::new(Vec::new(), CsvConfig::default().precision(1)).unwrap();
//! storage.accept(&Snapshot::new(0, 0, 0.0, &[0.0, 0.5])).unwrap();
//! storage.accept(&Snapshot::new(0, 1, 0.1, &[0.4, 0.5])).unwrap();
//!
//! let text = String::from_utf8(storage.into_inner().unwrap()).unwrap();
//! assert_eq!(text, "source,step,time,u[0],u[1]\n0,0,0.0,0.0,0.5\n0,1,0.1,0.4,0.5\n");
//! ```
//!
//! ## With Metadata
//!
//! ```rust,ignore
//! use pde_rs::output::{CsvConfig, CsvMetadata, CsvStorage};
//!
//! let metadata = CsvMetadata::from_solver(&solver);
//! let config = CsvConfig::default().with_metadata(metadata);
//! let mut storage = CsvStorage::create("heat.csv", config)?;
//! solver.solve(&mut storage, &SolverConfiguration::steps(1000).output_every(100))?;
//! ```
//!
//! **Output** (`heat.csv`):
//! ```csv
//! # PDE Simulation Data
//! # Generated: 2026-02-11T15:30:00Z
//! # Equation: heat
//! # Solver: PDE Solver
//! # Integrator: Forward Euler
//! # Time Step: 0.001
//! # Grid Spacing: 0.1
//! # Points: 64
//! #
//! source,step,time,u[0],u[1],...
//! 0,0,0.000000,1.000000,0.995185,...
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::output::storage::{Snapshot, Storage, StorageError};
use crate::solver::{PdeSolver, SolverBase};

// =============================================================================
// Configuration Structures
// =============================================================================

/// Configuration for CSV export
///
/// # Fields
///
/// - `delimiter`: Column separator (default: ',')
/// - `decimal_separator`: Decimal point character (default: '.')
/// - `precision`: Number of decimal places (default: 6)
/// - `include_metadata`: Add header comments with run info
/// - `metadata`: Run metadata to include
/// - `value_header`: Prefix of the value column headers (default: "u")
///
/// # Example
///
/// ```rust
/// use pde_rs::output::CsvConfig;
///
/// let config = CsvConfig {
///     delimiter: ';',
///     precision: 10,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct CsvConfig {
    /// Column delimiter (default: ',')
    pub delimiter: char,

    /// Decimal separator (default: '.')
    pub decimal_separator: char,

    /// Number of decimal places for floating-point values (default: 6)
    pub precision: usize,

    /// Include metadata header comments (default: false)
    pub include_metadata: bool,

    /// Metadata to include in header
    pub metadata: Option<CsvMetadata>,

    /// Prefix of the value column headers (default: "u", giving `u[0]`, `u[1]`, …)
    pub value_header: String,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            decimal_separator: '.',
            precision: 6,
            include_metadata: false,
            metadata: None,
            value_header: "u".to_string(),
        }
    }
}

impl CsvConfig {
    /// Create config with European CSV format (semicolon, comma for decimal)
    pub fn european() -> Self {
        Self {
            delimiter: ';',
            decimal_separator: ',',
            ..Default::default()
        }
    }

    /// Create config with high precision (12 decimal places)
    pub fn high_precision() -> Self {
        Self {
            precision: 12,
            ..Default::default()
        }
    }

    /// Builder pattern: set delimiter
    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Builder pattern: set precision
    pub fn precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    /// Builder pattern: set value column prefix
    pub fn value_header(mut self, header: impl Into<String>) -> Self {
        self.value_header = header.into();
        self
    }

    /// Builder pattern: enable metadata
    pub fn with_metadata(mut self, metadata: CsvMetadata) -> Self {
        self.include_metadata = true;
        self.metadata = Some(metadata);
        self
    }

    /// Validate that the format is unambiguous
    pub fn validate(&self) -> Result<(), String> {
        if self.delimiter == self.decimal_separator {
            return Err(format!(
                "Delimiter and decimal separator must differ, both are '{}'",
                self.delimiter
            ));
        }
        if self.delimiter == '\n' || self.delimiter == '#' {
            return Err(format!("Delimiter '{}' is reserved", self.delimiter.escape_default()));
        }
        Ok(())
    }
}

/// Metadata for CSV header comments
///
/// All fields are optional. Only non-None fields are written.
#[derive(Debug, Clone, Default)]
pub struct CsvMetadata {
    /// Equation name (e.g., "kdv")
    pub equation_name: Option<String>,

    /// Solver name (e.g., "PDE Solver")
    pub solver_name: Option<String>,

    /// Integrator name (e.g., "Forward Euler")
    pub integrator_name: Option<String>,

    /// Time step
    pub dt: Option<f64>,

    /// Grid spacing
    pub dx: Option<f64>,

    /// Number of grid points
    pub points: Option<usize>,

    /// Additional custom parameters
    pub custom: Vec<(String, String)>,
}

impl CsvMetadata {
    /// Describe a built solver
    pub fn from_solver(solver: &PdeSolver) -> Self {
        Self {
            equation_name: Some(solver.rhs().name().to_string()),
            solver_name: Some(solver.name().to_string()),
            integrator_name: Some(solver.integrator().name().to_string()),
            dt: Some(solver.dt()),
            dx: Some(solver.dx()),
            points: Some(solver.len()),
            custom: Vec::new(),
        }
    }

    /// Add custom parameter
    pub fn add_custom(&mut self, key: impl Into<String>, value: impl ToString) {
        self.custom.push((key.into(), value.to_string()));
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Write metadata header comments
fn write_metadata_header<W: Write>(writer: &mut W, metadata: &CsvMetadata) -> std::io::Result<()> {
    writeln!(writer, "# PDE Simulation Data")?;
    writeln!(writer, "# Generated: {}", chrono::Utc::now().to_rfc3339())?;

    if let Some(equation) = &metadata.equation_name {
        writeln!(writer, "# Equation: {}", equation)?;
    }
    if let Some(solver) = &metadata.solver_name {
        writeln!(writer, "# Solver: {}", solver)?;
    }
    if let Some(integrator) = &metadata.integrator_name {
        writeln!(writer, "# Integrator: {}", integrator)?;
    }
    if let Some(dt) = metadata.dt {
        writeln!(writer, "# Time Step: {}", dt)?;
    }
    if let Some(dx) = metadata.dx {
        writeln!(writer, "# Grid Spacing: {}", dx)?;
    }
    if let Some(points) = metadata.points {
        writeln!(writer, "# Points: {}", points)?;
    }
    for (key, value) in &metadata.custom {
        writeln!(writer, "# {}: {}", key, value)?;
    }

    writeln!(writer, "#")
}

/// Format number with configured precision and decimal separator
fn format_number(value: f64, config: &CsvConfig) -> String {
    let formatted = format!("{:.prec$}", value, prec = config.precision);

    if config.decimal_separator != '.' {
        formatted.replace('.', &config.decimal_separator.to_string())
    } else {
        formatted
    }
}

/// Reject non-finite data and rows whose width differs from the table's
fn check_row(snapshot: &Snapshot<'_>, width: usize) -> Result<(), StorageError> {
    if !snapshot.time.is_finite() || snapshot.values.iter().any(|v| !v.is_finite()) {
        return Err(StorageError::Rejected(format!(
            "NaN or Inf in snapshot of step {}",
            snapshot.step
        )));
    }
    if snapshot.values.len() != width {
        return Err(StorageError::ShapeMismatch {
            expected: width,
            actual: snapshot.values.len(),
        });
    }
    Ok(())
}

// =============================================================================
// CSV Storage
// =============================================================================

/// Snapshot sink writing CSV rows to any [`Write`]
///
/// The column header is written with the first snapshot; its width fixes the
/// number of value columns, and later snapshots of another width are rejected.
pub struct CsvStorage<W: Write> {
    writer: W,
    config: CsvConfig,
    width: Option<usize>,
    rows: usize,
    closed: bool,
}

impl CsvStorage<BufWriter<File>> {
    /// Create (or truncate) a CSV file
    pub fn create(path: impl AsRef<Path>, config: CsvConfig) -> Result<Self, StorageError> {
        let file = File::create(path.as_ref())?;
        log::debug!("writing snapshots to {}", path.as_ref().display());
        Self::new(BufWriter::new(file), config)
    }
}

impl<W: Write> CsvStorage<W> {
    pub fn new(writer: W, config: CsvConfig) -> Result<Self, StorageError> {
        config.validate().map_err(StorageError::Configuration)?;
        Ok(Self {
            writer,
            config,
            width: None,
            rows: 0,
            closed: false,
        })
    }

    /// Data rows written so far
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Value columns per row, once known
    pub fn width(&self) -> Option<usize> {
        self.width
    }

    /// Flush and refuse any further snapshot
    pub fn close(&mut self) -> Result<(), StorageError> {
        self.writer.flush()?;
        self.closed = true;
        Ok(())
    }

    /// Flush and return the underlying writer
    pub fn into_inner(mut self) -> Result<W, StorageError> {
        self.writer.flush()?;
        Ok(self.writer)
    }

    fn write_header(&mut self, width: usize) -> Result<(), StorageError> {
        if self.config.include_metadata {
            if let Some(metadata) = &self.config.metadata {
                write_metadata_header(&mut self.writer, metadata)?;
            }
        }

        let delimiter = self.config.delimiter;
        let mut header = format!("source{delimiter}step{delimiter}time");
        for index in 0..width {
            header.push(delimiter);
            header.push_str(&format!("{}[{}]", self.config.value_header, index));
        }
        writeln!(self.writer, "{}", header)?;
        Ok(())
    }

    fn write_row(&mut self, snapshot: &Snapshot<'_>) -> Result<(), StorageError> {
        let delimiter = self.config.delimiter;
        let mut row = format!(
            "{}{delimiter}{}{delimiter}{}",
            snapshot.source,
            snapshot.step,
            format_number(snapshot.time, &self.config)
        );
        for value in snapshot.values {
            row.push(delimiter);
            row.push_str(&format_number(*value, &self.config));
        }
        writeln!(self.writer, "{}", row)?;

        self.rows += 1;
        Ok(())
    }
}

impl<W: Write> Storage for CsvStorage<W> {
    fn ready(&self) -> Result<(), StorageError> {
        if self.closed {
            return Err(StorageError::Closed);
        }
        Ok(())
    }

    fn accept(&mut self, snapshot: &Snapshot<'_>) -> Result<(), StorageError> {
        self.accept_step(std::slice::from_ref(snapshot))
    }

    /// Every snapshot is checked before the first row is written
    fn accept_step(&mut self, snapshots: &[Snapshot<'_>]) -> Result<(), StorageError> {
        self.ready()?;

        let Some(first) = snapshots.first() else {
            return Ok(());
        };
        let width = self.width.unwrap_or(first.values.len());
        for snapshot in snapshots {
            check_row(snapshot, width)?;
        }

        if self.width.is_none() {
            self.write_header(width)?;
            self.width = Some(width);
        }
        for snapshot in snapshots {
            self.write_row(snapshot)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), StorageError> {
        self.writer.flush()?;
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
