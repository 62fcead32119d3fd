use crate::config::AnnotateOptions;
use crate::error::{AnnotateError, Result};
use crate::ir::AttributedLine;

/// Extracts the last complete compiler run from annotated output.
///
/// Build tools such as latexmk rerun the engine and concatenate the
/// transcripts; only the final run reflects the document's actual state.
#[derive(Debug, Clone)]
pub struct RunSelector {
    start: String,
    end: String,
}

impl RunSelector {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    pub fn from_options(options: &AnnotateOptions) -> Self {
        Self::new(options.run_start.clone(), options.run_end.clone())
    }

    /// Returns the lines of the last run, from its start marker through its
    /// end marker inclusive.
    pub fn select(&self, lines: Vec<AttributedLine>) -> Result<Vec<AttributedLine>> {
        let mut current: Option<(usize, Vec<AttributedLine>)> = None;
        let mut last = None;

        for (idx, line) in lines.into_iter().enumerate() {
            let content = line.content.as_bytes();
            if content.starts_with(self.start.as_bytes()) {
                if let Some((start, _)) = &current {
                    log::debug!("run starting at line {} restarted at line {}", start, idx + 1);
                }
                current = Some((idx + 1, vec![line]));
            } else if content.starts_with(self.end.as_bytes()) {
                if let Some((start, mut run)) = current.take() {
                    run.push(line);
                    log::debug!("run complete: lines {}..={}", start, idx + 1);
                    last = Some(run);
                }
            } else if let Some((_, run)) = current.as_mut() {
                run.push(line);
            }
        }

        if let Some((line, _)) = current {
            return Err(AnnotateError::UnterminatedRun { line });
        }
        last.ok_or(AnnotateError::NoRunFound)
    }
}
