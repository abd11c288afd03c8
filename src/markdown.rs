use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static BOLD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*([^*]+)\*\*").expect("valid bold markup regex"));

static ITALIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*([^*\s][^*]*)\*").expect("valid italic markup regex"));

static CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`]*)`").expect("valid code markup regex"));

const FRONT_MATTER_DELIMITER: &str = "---";
const MAX_HEADER_LEVEL: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Header { level: u8 },
    Body,
}

/// One non-blank, trimmed line of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    pub kind: LineKind,
    pub text: String,
    /// 1-based line number in the original document.
    pub number: usize,
}

impl SourceLine {
    pub fn is_body(&self) -> bool {
        self.kind == LineKind::Body
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDocument {
    pub metadata: BTreeMap<String, String>,
    pub lines: Vec<SourceLine>,
}

impl ParsedDocument {
    pub fn body_lines(&self) -> impl Iterator<Item = &SourceLine> {
        self.lines.iter().filter(|line| line.is_body())
    }

    /// Front-matter `title`, else the first header of level 1 or 2, else `stem`.
    pub fn series_name(&self, stem: &str) -> String {
        if let Some(title) = self.metadata.get("title").filter(|title| !title.is_empty()) {
            return title.clone();
        }

        self.lines
            .iter()
            .find_map(|line| match line.kind {
                LineKind::Header { level } if level <= 2 && !line.text.is_empty() => {
                    Some(line.text.clone())
                }
                _ => None,
            })
            .unwrap_or_else(|| stem.to_string())
    }
}

fn strip_markup(text: &str) -> String {
    let text = BOLD_RE.replace_all(text, "$1");
    let text = ITALIC_RE.replace_all(&text, "$1");
    let text = CODE_RE.replace_all(&text, "$1");
    text.trim().to_string()
}

fn unquote(value: &str) -> &str {
    let value = value.trim();
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

fn header_level(line: &str) -> Option<(u8, &str)> {
    let hashes = line.chars().take_while(|c| *c == '#').count();
    if hashes == 0 || hashes > MAX_HEADER_LEVEL {
        return None;
    }

    let rest = &line[hashes..];
    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        Some((hashes as u8, rest.trim()))
    } else {
        None
    }
}

/// Index of the closing front-matter delimiter, when the document opens with one.
fn front_matter_end(lines: &[&str]) -> Option<usize> {
    if lines.first().map(|line| line.trim()) != Some(FRONT_MATTER_DELIMITER) {
        return None;
    }

    lines
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, line)| line.trim() == FRONT_MATTER_DELIMITER)
        .map(|(idx, _)| idx)
}

/// Splits raw document text into front matter and typed lines.
pub fn parse(text: &str) -> ParsedDocument {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let raw_lines: Vec<&str> = text.lines().collect();

    let mut document = ParsedDocument::default();
    let mut body_start = 0;

    if let Some(end) = front_matter_end(&raw_lines) {
        for line in &raw_lines[1..end] {
            if let Some((key, value)) = line.split_once(':') {
                let key = key.trim();
                if !key.is_empty() {
                    document
                        .metadata
                        .insert(key.to_string(), unquote(value).to_string());
                }
            }
        }
        body_start = end + 1;
    }

    for (idx, line) in raw_lines.iter().enumerate().skip(body_start) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (kind, text) = match header_level(line) {
            Some((level, rest)) => (LineKind::Header { level }, strip_markup(rest)),
            None => (LineKind::Body, strip_markup(line)),
        };
        if text.is_empty() && kind == LineKind::Body {
            continue;
        }

        document.lines.push(SourceLine {
            kind,
            text,
            number: idx + 1,
        });
    }

    document
}
