use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{AnnotateError, Result};

/// Extensions of files the engine announces with `(`.
pub const DEFAULT_EXTENSIONS: &[&str] = &[
    "tex", "ltx", "dtx", "ins", "bib", "bbl", "bcf", "aux", "toc", "lof", "lot", "out", "idx",
    "ind", "glo", "gls", "nav", "snm", "vrb", "cls", "clo", "sty", "cfg", "def", "fd", "ldf",
    "lua", "mkii",
];

/// First line of every pdfTeX run.
pub const DEFAULT_RUN_START: &str = "This is pdfTeX, Version";
/// Last line of every pdfTeX run.
pub const DEFAULT_RUN_END: &str = "Transcript written on ";

/// Options controlling annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotateOptions {
    /// Drop whitespace-only lines from the output.
    pub skip_blank: bool,
    /// Keep only the last complete compiler run.
    pub last_run_only: bool,
    /// Extensions accepted after `(` as file-open markers.
    pub extensions: Vec<String>,
    /// Prefix of the line that starts a run.
    pub run_start: String,
    /// Prefix of the line that ends a run.
    pub run_end: String,
}

impl Default for AnnotateOptions {
    fn default() -> Self {
        Self {
            skip_blank: false,
            last_run_only: false,
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            run_start: DEFAULT_RUN_START.to_string(),
            run_end: DEFAULT_RUN_END.to_string(),
        }
    }
}

impl AnnotateOptions {
    pub fn from_json(content: &str) -> Result<Self> {
        let options: Self =
            serde_json::from_str(content).map_err(|e| AnnotateError::Config(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let options = Self::from_json(&content)?;
        log::info!("Loaded options from {:?}", path);
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        if self.run_start.is_empty() || self.run_end.is_empty() {
            return Err(AnnotateError::Config(
                "run markers must not be empty".to_string(),
            ));
        }
        if let Some(ext) = self
            .extensions
            .iter()
            .find(|e| e.is_empty() || e.starts_with('.'))
        {
            return Err(AnnotateError::Config(format!(
                "extension {:?} must be non-empty and given without a leading dot",
                ext
            )));
        }
        Ok(())
    }

    /// Whether `filename` ends in one of the configured extensions.
    pub fn has_known_extension(&self, filename: &str) -> bool {
        matches_extension(&self.extensions, filename)
    }
}

pub fn matches_extension(extensions: &[String], filename: &str) -> bool {
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => extensions
            .iter()
            .any(|known| known.eq_ignore_ascii_case(ext)),
        _ => false,
    }
}
