//! `tripsheet merge`: normalize every matching workbook in a directory into
//! one CSV.
//!
//! Each workbook is loaded and reconciled on its own. A workbook that cannot
//! be opened is reported and skipped; the rest still merge. Records are
//! concatenated in file-name order, then profile sheet order, then row order.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tripsheet_io::discover::{discover, source_name};
use tripsheet_io::xlsx::{import_with_options, ImportOptions};
use tripsheet_reconcile::{OutputRecord, Profile, SheetReport};

use crate::exit_codes::{EXIT_NOTHING_TO_MERGE, EXIT_PARTIAL, EXIT_PROFILE_INVALID};
use crate::profile::load_profile;
use crate::CliError;

pub struct MergeArgs {
    pub dir: PathBuf,
    pub output: PathBuf,
    pub owner: Option<String>,
    pub pattern: String,
    pub profile: Option<PathBuf>,
    pub no_bom: bool,
    pub json: bool,
    pub quiet: bool,
}

#[derive(Debug, Serialize)]
pub struct MergeSummary {
    pub profile: String,
    pub owner_marker: String,
    /// `None` when nothing was written.
    pub output: Option<String>,
    pub files: Vec<FileReport>,
    pub totals: MergeTotals,
}

#[derive(Debug, Default, Serialize)]
pub struct MergeTotals {
    pub files_found: usize,
    pub files_merged: usize,
    pub files_failed: usize,
    pub records: usize,
    pub excluded: usize,
}

#[derive(Debug, Serialize)]
pub struct FileReport {
    pub file: String,
    #[serde(flatten)]
    pub status: FileStatus,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileStatus {
    Merged {
        records: usize,
        excluded: usize,
        sheets: Vec<SheetReport>,
    },
    Failed {
        error: String,
    },
}

pub fn cmd_merge(args: MergeArgs) -> Result<(), CliError> {
    let (profile, source) = load_profile(args.profile.as_deref())?;
    log::info!("using profile '{}' ({})", profile.name, source);

    let owner = args.owner.clone().unwrap_or_else(|| profile.owner_marker.clone());

    if !args.dir.is_dir() {
        return Err(CliError::io(format!("not a directory: {}", args.dir.display())));
    }
    let files = discover(&args.dir, &args.pattern, &owner).map_err(|e| {
        CliError::args(e).with_hint("--pattern takes a glob such as '*.xlsx'")
    })?;

    if files.is_empty() {
        return Err(nothing_to_merge(format!(
            "no files matching '{}' with '{}' in the name under {}",
            args.pattern,
            owner,
            args.dir.display()
        )));
    }

    let (records, mut summary) = merge_files(&profile, &files, args.quiet)?;
    summary.owner_marker = owner;

    if records.is_empty() {
        emit_json(&summary, args.json)?;
        return Err(nothing_to_merge(format!(
            "{} file(s) read, no rows passed the cost-center rule",
            summary.totals.files_found
        )));
    }

    tripsheet_io::csv::export(&args.output, &records, !args.no_bom)
        .map_err(|e| CliError::io(format!("cannot write output: {e}")))?;
    summary.output = Some(args.output.display().to_string());

    emit_json(&summary, args.json)?;

    let t = &summary.totals;
    if !args.quiet {
        eprintln!(
            "merged {} record(s) from {} of {} file(s) into {} ({} row(s) excluded)",
            t.records,
            t.files_merged,
            t.files_found,
            args.output.display(),
            t.excluded,
        );
    }

    if t.files_failed > 0 {
        return Err(CliError {
            code: EXIT_PARTIAL,
            message: format!("{} file(s) could not be read", t.files_failed),
            hint: Some("output was written without them; see errors above".into()),
        });
    }

    Ok(())
}

/// Load and reconcile each file in order. Load failures are recorded in the
/// summary and do not stop the merge.
pub fn merge_files(
    profile: &Profile,
    files: &[PathBuf],
    quiet: bool,
) -> Result<(Vec<OutputRecord>, MergeSummary), CliError> {
    let options = ImportOptions {
        only_sheets: Some(profile.sheet_order.clone()),
    };

    let mut records = Vec::new();
    let mut summary = MergeSummary {
        profile: profile.name.clone(),
        owner_marker: profile.owner_marker.clone(),
        output: None,
        files: Vec::with_capacity(files.len()),
        totals: MergeTotals {
            files_found: files.len(),
            ..Default::default()
        },
    };

    for path in files {
        let name = source_name(path);
        let status = match merge_one(profile, path, &name, &options) {
            Ok(mut outcome) => {
                let excluded = outcome.excluded_rows();
                let count = outcome.records.len();
                if !quiet {
                    eprintln!("{name}: {count} record(s), {excluded} excluded");
                }
                summary.totals.files_merged += 1;
                summary.totals.records += count;
                summary.totals.excluded += excluded;
                records.append(&mut outcome.records);
                FileStatus::Merged {
                    records: count,
                    excluded,
                    sheets: outcome.sheets,
                }
            }
            Err(LoadError::Workbook(error)) => {
                eprintln!("error: {name}: {error}");
                summary.totals.files_failed += 1;
                FileStatus::Failed { error }
            }
            Err(LoadError::Profile(message)) => {
                return Err(CliError { code: EXIT_PROFILE_INVALID, message, hint: None });
            }
        };
        summary.files.push(FileReport { file: name, status });
    }

    Ok((records, summary))
}

enum LoadError {
    /// The file itself is unreadable; skip it.
    Workbook(String),
    /// The profile cannot handle this input; abort the merge.
    Profile(String),
}

fn merge_one(
    profile: &Profile,
    path: &Path,
    name: &str,
    options: &ImportOptions,
) -> Result<tripsheet_reconcile::WorkbookOutcome, LoadError> {
    let (workbook, import) = import_with_options(path, options).map_err(LoadError::Workbook)?;
    log::info!("{name}: {}", import.summary());
    for warning in &import.warnings {
        log::warn!("{name}: {warning}");
    }

    tripsheet_reconcile::run(profile, name, &workbook).map_err(|e| LoadError::Profile(e.to_string()))
}

fn emit_json(summary: &MergeSummary, json: bool) -> Result<(), CliError> {
    if json {
        let text = serde_json::to_string_pretty(summary)
            .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?;
        println!("{text}");
    }
    Ok(())
}

fn nothing_to_merge(msg: String) -> CliError {
    CliError {
        code: EXIT_NOTHING_TO_MERGE,
        message: format!("nothing to merge: {msg}"),
        hint: None,
    }
}
