use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to initialize zstd decoder for '{}': {source}", path.display())]
    Decoder {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("'{}' is not valid UTF-8", path.display())]
    InvalidUtf8 { path: PathBuf },

    #[error("invalid discovery pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("invalid config '{}': {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid year mapping '{0}', expected FILENAME=YEAR")]
    Mapping(String),

    #[error("failed to serialize year {year}: {source}")]
    Json {
        year: i32,
        #[source]
        source: serde_json::Error,
    },
}

/// A recognition miss or dropped block, kept with the document it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub line: Option<usize>,
    pub message: String,
}

/// Per-document accumulator for non-fatal parse outcomes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn push(&mut self, line: Option<usize>, message: impl Into<String>) {
        self.0.push(Diagnostic {
            line,
            message: message.into(),
        });
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }

    /// Joins all messages with `; `, prefixing line numbers when known.
    pub fn summary(&self) -> Option<String> {
        if self.0.is_empty() {
            return None;
        }

        let parts: Vec<String> = self
            .0
            .iter()
            .map(|diagnostic| match diagnostic.line {
                Some(line) => format!("line {}: {}", line, diagnostic.message),
                None => diagnostic.message.clone(),
            })
            .collect();
        Some(parts.join("; "))
    }
}
