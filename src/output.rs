use std::fs;
use std::path::{Path, PathBuf};

use crate::aggregate::render_report;
use crate::error::ProcessError;
use crate::json::{bundle_to_json, json_filename};
use crate::pipeline::ProcessingRun;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputOptions {
    pub summary_file: String,
    pub json: bool,
    /// Only the summary report is written.
    pub summary_only: bool,
}

fn write_file(path: &Path, content: &str) -> Result<(), ProcessError> {
    fs::write(path, content).map_err(|source| ProcessError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes year documents, optional JSON record sets and the summary report.
/// Returns the written paths in write order.
pub fn write_outputs(
    run: &ProcessingRun,
    output_dir: &Path,
    options: &OutputOptions,
) -> Result<Vec<PathBuf>, ProcessError> {
    fs::create_dir_all(output_dir).map_err(|source| ProcessError::Io {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let mut written = Vec::new();
    if !options.summary_only {
        for bundle in run.bundles.iter().filter(|bundle| !bundle.series_files.is_empty()) {
            let path = output_dir.join(bundle.output_filename());
            write_file(&path, &bundle.rendered)?;
            written.push(path);

            if options.json {
                let path = output_dir.join(json_filename(bundle.year));
                write_file(&path, &bundle_to_json(bundle)?)?;
                written.push(path);
            }
        }
    }

    let path = output_dir.join(&options.summary_file);
    write_file(&path, &render_report(&run.bundles, &run.unassigned))?;
    written.push(path);

    Ok(written)
}
