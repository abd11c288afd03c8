use glob::{MatchOptions, Pattern};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::warn;
use zstd::stream::read::Decoder as ZstdDecoder;

use crate::error::ProcessError;

pub type DocumentInput = Box<dyn Read>;

const DOCUMENT_PATTERNS: [&str; 2] = ["**/*.md", "**/*.md.zst"];

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CompressionMode {
    Plain,
    Zstd,
}

impl CompressionMode {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("zst") => Self::Zstd,
            _ => Self::Plain,
        }
    }
}

/// Every `.md` and `.md.zst` file below `input_dir`, sorted by path.
pub fn discover_documents(input_dir: &Path) -> Result<Vec<PathBuf>, ProcessError> {
    let options = MatchOptions {
        case_sensitive: false,
        ..MatchOptions::new()
    };
    let root = Pattern::escape(&input_dir.to_string_lossy());

    let mut paths = Vec::new();
    for suffix in DOCUMENT_PATTERNS {
        let pattern = format!("{root}/{suffix}");
        for entry in glob::glob_with(&pattern, options)? {
            match entry {
                Ok(path) if path.is_file() => paths.push(path),
                Ok(_) => {}
                Err(err) => warn!(
                    path = %err.path().display(),
                    error = %err.error(),
                    "skipping unreadable path during discovery"
                ),
            }
        }
    }

    paths.sort();
    paths.dedup();
    Ok(paths)
}

pub fn open_input_stream(
    path: &Path,
    compression: CompressionMode,
) -> Result<DocumentInput, ProcessError> {
    let file = File::open(path).map_err(|source| ProcessError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    match compression {
        CompressionMode::Plain => Ok(Box::new(file)),
        CompressionMode::Zstd => ZstdDecoder::new(file)
            .map(|decoder| Box::new(decoder) as DocumentInput)
            .map_err(|source| ProcessError::Decoder {
                path: path.to_path_buf(),
                source,
            }),
    }
}

/// Reads a whole document as UTF-8, decompressing `.zst` files.
pub fn read_document(path: &Path) -> Result<String, ProcessError> {
    let mut input = open_input_stream(path, CompressionMode::from_path(path))?;
    let mut bytes = Vec::new();
    input
        .read_to_end(&mut bytes)
        .map_err(|source| ProcessError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    String::from_utf8(bytes).map_err(|_| ProcessError::InvalidUtf8 {
        path: path.to_path_buf(),
    })
}
