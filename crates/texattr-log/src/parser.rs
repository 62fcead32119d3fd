use std::io::BufRead;

use crate::attributor::LineAttributor;
use crate::config::AnnotateOptions;
use crate::error::{AnnotateError, Result};
use crate::ir::AttributedLine;
use crate::oracle::FileOracle;
use crate::resolve::DelimiterResolver;

/// Joins an error-context line with its indented second half.
pub const CONTEXT_JOIN: &str = "<<<";

/// A logical line still waiting on the lines that follow it.
#[derive(Debug, Default)]
enum Pending {
    #[default]
    None,
    /// `Package <name> <kind>: ...` collecting `(<name>)` continuation lines.
    PackageBlock {
        name: String,
        line: usize,
        body: String,
        terminator: String,
    },
    /// The line after an over/underfull box warning, claimed unconditionally.
    BoxContinuation { label: String },
    /// `l.<n> ...` or `<argument> ...` waiting to see the next line.
    ErrorContext { text: String },
}

/// A streaming annotator for TeX transcripts.
///
/// `LogAnnotator` consumes a transcript one physical line at a time and
/// returns the lines that are ready, each prefixed with the context it is
/// attributed to. Multi-line diagnostics are merged before attribution, so a
/// call to [`feed`](Self::feed) may return nothing while a block is still
/// open.
pub struct LogAnnotator<O> {
    attributor: LineAttributor<O>,
    options: AnnotateOptions,
    pending: Pending,
    line: usize,
}

impl<O: FileOracle> LogAnnotator<O> {
    /// Creates an annotator that checks file markers against `oracle`.
    pub fn new(oracle: O, options: AnnotateOptions) -> Self {
        let resolver = DelimiterResolver::new(oracle, options.extensions.clone());
        Self {
            attributor: LineAttributor::new(resolver),
            options,
            pending: Pending::None,
            line: 0,
        }
    }

    pub fn options(&self) -> &AnnotateOptions {
        &self.options
    }

    /// Feeds one physical line, including its terminator.
    ///
    /// Lines that are not valid UTF-8 are passed through raw under the
    /// current label.
    ///
    /// # Returns
    ///
    /// The lines that became ready, in transcript order.
    pub fn feed(&mut self, raw: &[u8]) -> Result<Vec<AttributedLine>> {
        match std::str::from_utf8(raw) {
            Ok(text) => self.feed_str(text),
            Err(source) => {
                self.line += 1;
                let err = AnnotateError::Decode {
                    line: self.line,
                    source,
                };
                log::warn!("{}", err);
                // A claimed box continuation keeps the warning's label even
                // when it cannot be decoded.
                let (mut out, label) = match std::mem::take(&mut self.pending) {
                    Pending::BoxContinuation { label } => (Vec::new(), label),
                    pending => {
                        self.pending = pending;
                        let out = self.flush()?;
                        (out, self.attributor.current_label().to_string())
                    }
                };
                self.emit(&mut out, AttributedLine::raw(label, raw.to_vec()));
                Ok(out)
            }
        }
    }

    /// Feeds one decoded physical line, including its terminator.
    pub fn feed_str(&mut self, line: &str) -> Result<Vec<AttributedLine>> {
        self.line += 1;
        let mut out = Vec::new();

        match std::mem::take(&mut self.pending) {
            Pending::None => {}
            Pending::BoxContinuation { label } => {
                self.emit(&mut out, AttributedLine::text(label, line));
                return Ok(out);
            }
            Pending::ErrorContext { text } => {
                let label = self.attributor.current_label().to_string();
                if continues_context(&text, line) {
                    let (first, _) = split_terminator(&text);
                    let merged = format!("{}{}{}", first, CONTEXT_JOIN, line.trim_start());
                    self.emit(&mut out, AttributedLine::text(label, merged));
                    return Ok(out);
                }
                self.emit(&mut out, AttributedLine::text(label, text));
            }
            Pending::PackageBlock {
                name,
                line: start,
                mut body,
                terminator,
            } => {
                if let Some(rest) = strip_package_tag(line, &name) {
                    let (continuation, terminator) = split_terminator(rest);
                    body.push(' ');
                    body.push_str(continuation.trim_start());
                    self.pending = Pending::PackageBlock {
                        name,
                        line: start,
                        body,
                        terminator: terminator.to_string(),
                    };
                    return Ok(out);
                }
                body.push_str(&terminator);
                self.attribute_and_emit(&mut out, body, start)?;
            }
        }

        self.start_line(&mut out, line)?;
        Ok(out)
    }

    /// Emits whatever logical line is still pending.
    pub fn flush(&mut self) -> Result<Vec<AttributedLine>> {
        let mut out = Vec::new();
        match std::mem::take(&mut self.pending) {
            Pending::None | Pending::BoxContinuation { .. } => {}
            Pending::ErrorContext { text } => {
                let label = self.attributor.current_label().to_string();
                self.emit(&mut out, AttributedLine::text(label, text));
            }
            Pending::PackageBlock {
                line,
                mut body,
                terminator,
                ..
            } => {
                body.push_str(&terminator);
                self.attribute_and_emit(&mut out, body, line)?;
            }
        }
        Ok(out)
    }

    /// Flushes pending input and checks that every context was closed.
    pub fn finish(mut self) -> Result<Vec<AttributedLine>> {
        let out = self.flush()?;
        let stack = self.attributor.stack();
        if !stack.is_balanced() {
            return Err(AnnotateError::UnbalancedTranscript {
                open: stack.open_frames(),
            });
        }
        log::debug!("annotated {} lines", self.line);
        Ok(out)
    }

    /// Annotates a complete transcript held in memory.
    pub fn annotate_str(mut self, input: &str) -> Result<Vec<AttributedLine>> {
        let mut lines = Vec::new();
        for line in input.split_inclusive('\n') {
            lines.extend(self.feed_str(line)?);
        }
        lines.extend(self.finish()?);
        Ok(lines)
    }

    /// Annotates a transcript read line by line from `reader`.
    pub fn annotate_reader<R: BufRead>(mut self, mut reader: R) -> Result<Vec<AttributedLine>> {
        let mut lines = Vec::new();
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            lines.extend(self.feed(&buf)?);
        }
        lines.extend(self.finish()?);
        Ok(lines)
    }

    fn start_line(&mut self, out: &mut Vec<AttributedLine>, line: &str) -> Result<()> {
        if let Some(name) = package_block_name(line) {
            log::trace!("line {}: package block `{}` opened", self.line, name);
            let (body, terminator) = split_terminator(line);
            self.pending = Pending::PackageBlock {
                name: name.to_string(),
                line: self.line,
                body: body.to_string(),
                terminator: terminator.to_string(),
            };
            return Ok(());
        }
        if is_error_context(line) {
            log::trace!("line {}: error context", self.line);
            self.pending = Pending::ErrorContext {
                text: line.to_string(),
            };
            return Ok(());
        }

        let label = self.attribute_and_emit(out, line.to_string(), self.line)?;
        if is_box_warning(line) {
            self.pending = Pending::BoxContinuation { label };
        }
        Ok(())
    }

    fn attribute_and_emit(
        &mut self,
        out: &mut Vec<AttributedLine>,
        text: String,
        line: usize,
    ) -> Result<String> {
        let label = self
            .attributor
            .attribute(&text)
            .map_err(|source| AnnotateError::underflow(line, source))?;
        self.emit(out, AttributedLine::text(label.clone(), text));
        Ok(label)
    }

    fn emit(&self, out: &mut Vec<AttributedLine>, line: AttributedLine) {
        if self.options.skip_blank && line.content.is_blank() {
            return;
        }
        out.push(line);
    }
}

/// Splits a line into its body and its `\n` / `\r\n` terminator.
fn split_terminator(line: &str) -> (&str, &str) {
    if let Some(body) = line.strip_suffix("\r\n") {
        (body, &line[body.len()..])
    } else if let Some(body) = line.strip_suffix('\n') {
        (body, &line[body.len()..])
    } else {
        (line, "")
    }
}

/// `Package <name> <kind>: ...` returns `<name>`.
fn package_block_name(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("Package ")?;
    let (name, rest) = rest.split_once(' ')?;
    let (kind, rest) = rest.split_once(':')?;
    if name.is_empty() || kind.is_empty() || kind.contains(char::is_whitespace) {
        return None;
    }
    rest.starts_with(' ').then_some(name)
}

fn strip_package_tag<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    line.strip_prefix('(')?.strip_prefix(name)?.strip_prefix(')')
}

fn is_box_warning(line: &str) -> bool {
    line.starts_with("Overfull \\hbox") || line.starts_with("Underfull \\hbox")
}

/// `l.<digits> ` or `<argument> `.
fn is_error_context(line: &str) -> bool {
    if line.starts_with("<argument> ") {
        return true;
    }
    let Some(rest) = line.strip_prefix("l.") else {
        return false;
    };
    let digits = rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    digits > 0 && rest[digits..].starts_with(' ')
}

/// TeX prints the rest of an error-context line below it, indented to
/// the width of the first half.
fn continues_context(first: &str, next: &str) -> bool {
    let (next, _) = split_terminator(next);
    if next.trim().is_empty() {
        return false;
    }
    let indent = next.chars().take_while(|c| c.is_whitespace()).count();
    indent >= first.trim_end().chars().count()
}
