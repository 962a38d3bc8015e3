//! Check command implementation.
//!
//! Loads translation unit documents, runs the noexcept destructor check on
//! all of them in parallel and reports the results.

use crate::cli::{CheckArgs, OutputFormat};
use crate::commands::render;
use crate::config::NoxConfig;
use crate::error::{CliError, Result, ResultExt};
use crate::ui;
use nox_core::{
    Diagnostic, NoexceptDestructorCheck, RunStats, TranslationUnit, UnitInput, UnitReport, apply_fixes,
    check_units,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info};

/// A unit document together with the file its ranges point into.
#[derive(Debug)]
pub struct LoadedUnit {
    /// The JSON document given on the command line.
    pub document: PathBuf,
    /// Source file on disk, resolved relative to the document.
    pub source_path: PathBuf,
    pub input: UnitInput,
}

/// Read a unit document and the source file it describes.
pub fn load_unit(document: &Path) -> Result<LoadedUnit> {
    let json = std::fs::read_to_string(document).with_path(document)?;
    let unit = TranslationUnit::from_json(&json).inspect_err(|err| {
        error!(document = %document.display(), error = %err, "Invalid unit document");
    })?;

    let base = document.parent().unwrap_or_else(|| Path::new(""));
    let source_path = base.join(&unit.file);
    let text = std::fs::read_to_string(&source_path).with_path(&source_path)?;
    debug!(
        document = %document.display(),
        source = %source_path.display(),
        destructors = unit.destructors.len(),
        "Loaded unit"
    );

    Ok(LoadedUnit {
        document: document.to_path_buf(),
        source_path,
        input: UnitInput::prepare(unit, text),
    })
}

/// `widget.hpp` becomes `widget.hpp.bak`.
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".bak");
    PathBuf::from(name)
}

/// Execute the check command.
///
/// # Steps
///
/// 1. Load and validate configuration
/// 2. Load every unit document and its source file
/// 3. Check all units, in parallel
/// 4. Print diagnostics (text or JSON)
/// 5. Apply fix-its when `fix` is set
///
/// # Errors
///
/// Returns errors for invalid configuration, unreadable units, failed
/// writes, and diagnostics when `warningsAsErrors` is set.
pub fn execute(args: CheckArgs, no_color: bool) -> Result<()> {
    let started = Instant::now();

    let config = NoxConfig::load(&args, args.config.as_deref())?;
    config.validate()?;
    debug!(?config, "Resolved configuration");

    let units = args
        .units
        .iter()
        .map(|path| load_unit(path))
        .collect::<Result<Vec<_>>>()?;
    if config.format == OutputFormat::Text {
        ui::info(&format!("Checking {} unit(s)", units.len()));
    }
    let reports = run_checks(&units, &config)?;

    let mut totals = RunStats::default();
    for report in &reports {
        totals.merge(&report.stats);
    }

    match config.format {
        OutputFormat::Text => {
            let color = !no_color && ui::should_use_color();
            for (unit, report) in units.iter().zip(&reports) {
                print!("{}", render::render_text(&unit.input.source, report, color));
            }
        }
        OutputFormat::Json => println!("{}", render::render_json(&reports)?),
    }

    if config.fix {
        let written = write_fixes(&units, &reports, config.backup)?;
        if written > 0 {
            ui::success(&format!("Inserted noexcept in {} file(s)", written));
        }
        let unfixable = totals.diagnostics - totals.fixes;
        if unfixable > 0 {
            ui::warning(&format!("{} diagnostic(s) have no automatic fix", unfixable));
        }
    }

    info!(
        units = units.len(),
        diagnostics = totals.diagnostics,
        elapsed = %ui::format_duration(started.elapsed()),
        "Check finished"
    );
    if config.format == OutputFormat::Text {
        ui::print_check_summary(units.len(), &totals, started.elapsed());
    }

    if config.warnings_as_errors && totals.diagnostics > 0 {
        return Err(CliError::DiagnosticsFound {
            count: totals.diagnostics,
        });
    }
    Ok(())
}

fn run_checks(units: &[LoadedUnit], config: &NoxConfig) -> Result<Vec<UnitReport>> {
    let inputs: Vec<UnitInput> = units.iter().map(|unit| unit.input.clone()).collect();
    let options = config.analyzer_options();
    let check = NoexceptDestructorCheck::new();

    match config.jobs {
        Some(jobs) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(jobs)
                .build()
                .map_err(|e| CliError::Custom(format!("Failed to start {} workers: {}", jobs, e)))?;
            Ok(pool.install(|| check_units(&inputs, options, check)))
        }
        None => Ok(check_units(&inputs, options, check)),
    }
}

/// Rewrite every source file that has fix-its; returns how many changed.
///
/// Units that share a source file (a header included by several
/// translation units) have their fix-its merged, so each file is backed up
/// and written once.
fn write_fixes(units: &[LoadedUnit], reports: &[UnitReport], backup: bool) -> Result<usize> {
    let mut files: BTreeMap<PathBuf, (&LoadedUnit, Vec<Diagnostic>)> = BTreeMap::new();
    for (unit, report) in units.iter().zip(reports) {
        if report.stats.fixes == 0 {
            continue;
        }
        let key = std::fs::canonicalize(&unit.source_path).unwrap_or_else(|_| unit.source_path.clone());
        files
            .entry(key)
            .or_insert_with(|| (unit, Vec::new()))
            .1
            .extend(report.diagnostics.iter().cloned());
    }

    for (unit, diagnostics) in files.values() {
        let path = &unit.source_path;
        let fixed = apply_fixes(unit.input.source.text(), diagnostics)?;
        if backup {
            let backup = backup_path(path);
            std::fs::copy(path, &backup)
                .context(format!("Failed to back up {}", path.display()))?;
            debug!(backup = %backup.display(), "Wrote backup");
        }
        std::fs::write(path, fixed).with_path(path)?;
        info!(
            file = %path.display(),
            fixes = diagnostics.iter().filter(|d| d.fix.is_some()).count(),
            "Applied fix-its"
        );
    }
    Ok(files.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SOURCE: &str = "struct Bad { ~Bad() noexcept(false); };\nstruct Widget { ~Widget(); Bad bad; };\n";

    const UNIT: &str = r#"{
        "file": "widget.hpp",
        "records": [
            { "id": 0, "name": "Bad", "destructor": 0 },
            { "id": 1, "name": "Widget",
              "fields": [{ "name": "bad", "ty": { "kind": "record", "id": 0 } }],
              "destructor": 1 }
        ],
        "destructors": [
            { "id": 0, "name": "~Bad", "owner": 0, "location": 13,
              "range": { "start": 13, "end": 36 } },
            { "id": 1, "name": "~Widget", "owner": 1, "location": 56,
              "range": { "start": 56, "end": 66 } }
        ]
    }"#;

    fn project() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("build")).unwrap();
        std::fs::write(dir.path().join("build/widget.hpp"), SOURCE).unwrap();
        let document = dir.path().join("build/widget.json");
        std::fs::write(&document, UNIT).unwrap();
        (dir, document)
    }

    #[test]
    fn source_resolves_next_to_document() {
        let (dir, document) = project();
        let unit = load_unit(&document).unwrap();
        assert_eq!(unit.source_path, dir.path().join("build/widget.hpp"));
        assert_eq!(unit.input.source.text(), SOURCE);
    }

    #[test]
    fn missing_source_names_the_path() {
        let (dir, document) = project();
        std::fs::remove_file(dir.path().join("build/widget.hpp")).unwrap();
        let err = load_unit(&document).unwrap_err();
        assert!(matches!(err, CliError::FileNotFound(ref p) if p.ends_with("widget.hpp")));
    }

    #[test]
    fn fixes_are_written_with_backup() {
        let (dir, document) = project();
        let units = vec![load_unit(&document).unwrap()];
        let reports = run_checks(&units, &NoxConfig::default()).unwrap();

        assert_eq!(write_fixes(&units, &reports, true).unwrap(), 1);
        let fixed = std::fs::read_to_string(dir.path().join("build/widget.hpp")).unwrap();
        assert!(fixed.contains("~Widget() noexcept ;"));
        let backup = std::fs::read_to_string(dir.path().join("build/widget.hpp.bak")).unwrap();
        assert_eq!(backup, SOURCE);
    }

    #[test]
    fn invalid_document_is_a_core_error() {
        let (_dir, document) = project();
        std::fs::write(&document, r#"{ "records": [] }"#).unwrap();
        let err = load_unit(&document).unwrap_err();
        assert!(matches!(err, CliError::Core(nox_core::NoxError::InvalidUnit(_))));
    }

    #[test]
    fn units_sharing_a_source_are_written_once() {
        let (dir, document) = project();
        let copy = dir.path().join("build/widget-copy.json");
        std::fs::copy(&document, &copy).unwrap();
        let units = vec![load_unit(&document).unwrap(), load_unit(&copy).unwrap()];
        let reports = run_checks(&units, &NoxConfig::default()).unwrap();

        assert_eq!(write_fixes(&units, &reports, true).unwrap(), 1);
        let fixed = std::fs::read_to_string(dir.path().join("build/widget.hpp")).unwrap();
        assert_eq!(fixed.matches("noexcept ;").count(), 1);
        let backup = std::fs::read_to_string(dir.path().join("build/widget.hpp.bak")).unwrap();
        assert_eq!(backup, SOURCE);
    }

    #[test]
    fn worker_count_does_not_change_results() {
        let (_dir, document) = project();
        let units = vec![load_unit(&document).unwrap()];
        let single = run_checks(
            &units,
            &NoxConfig {
                jobs: Some(1),
                ..NoxConfig::default()
            },
        )
        .unwrap();
        let default = run_checks(&units, &NoxConfig::default()).unwrap();
        assert_eq!(single, default);
    }

    #[test]
    fn backup_path_appends_extension() {
        assert_eq!(
            backup_path(Path::new("src/widget.hpp")),
            PathBuf::from("src/widget.hpp.bak")
        );
    }
}
