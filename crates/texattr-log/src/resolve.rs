//! Delimiter resolvers.
//!
//! Each delimiter family has a pure scanner returning a structured match and
//! an applying step that mutates the [`ContextStack`]. Tokens go through the
//! families in a fixed order (angle, square, round), each seeing the residual
//! of the previous one, because the engine writes closes of different
//! families back to back: `<./fig.png>])` closes a figure, a page and a file.

use crate::config::matches_extension;
use crate::error::CloseError;
use crate::ir::{Delimiter, Frame};
use crate::oracle::FileOracle;
use crate::stack::ContextStack;

/// `<filename>` with optional trailing `,` `]` `)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AngleMatch<'a> {
    pub open: bool,
    pub filename: &'a str,
    pub close: bool,
    /// Trailing `,` `]` `)` left for later resolvers.
    pub rest: &'a str,
}

/// `[<page>{...}]` with optional trailing `)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SquareMatch<'a> {
    pub open: bool,
    pub page: &'a str,
    pub close: bool,
    /// Trailing `)` left for the round resolver.
    pub rest: &'a str,
}

/// A leading run of `(` and the filename candidate that follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundMatch<'a> {
    pub opens: usize,
    pub filename: &'a str,
    /// Everything after the filename candidate.
    pub rest: &'a str,
}

fn is_angle_trailer(c: char) -> bool {
    matches!(c, ',' | ']' | ')')
}

/// Matches `<`? filename `>`? [`,` `]` `)`]*. `None` when the token has no
/// angle delimiter or has other text after it.
pub fn scan_angle(token: &str) -> Option<AngleMatch<'_>> {
    let (open, body) = match token.strip_prefix('<') {
        Some(body) => (true, body),
        None => (false, token),
    };
    let end = body
        .find(|c: char| c == '<' || c == '>' || is_angle_trailer(c))
        .unwrap_or(body.len());
    let (filename, after) = body.split_at(end);
    let (close, rest) = match after.strip_prefix('>') {
        Some(rest) => (true, rest),
        None => (false, after),
    };
    if !(open || close) || !rest.chars().all(is_angle_trailer) {
        return None;
    }
    Some(AngleMatch {
        open,
        filename,
        close,
        rest,
    })
}

/// Matches `[`? digits `{...}`* `]`? `)`*. An opening bracket needs a page
/// number.
pub fn scan_square(token: &str) -> Option<SquareMatch<'_>> {
    let (open, body) = match token.strip_prefix('[') {
        Some(body) => (true, body),
        None => (false, token),
    };
    let digits = body
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(body.len());
    let (page, mut after) = body.split_at(digits);
    while let Some(group) = after.strip_prefix('{') {
        let end = group.find('}')?;
        after = &group[end + 1..];
    }
    let (close, rest) = match after.strip_prefix(']') {
        Some(rest) => (true, rest),
        None => (false, after),
    };
    if !(open || close) || (open && page.is_empty()) || !rest.chars().all(|c| c == ')') {
        return None;
    }
    Some(SquareMatch {
        open,
        page,
        close,
        rest,
    })
}

pub fn scan_round(token: &str) -> RoundMatch<'_> {
    let body = token.trim_start_matches('(');
    let opens = token.len() - body.len();
    let end = body.find(['(', ')']).unwrap_or(body.len());
    let (filename, rest) = body.split_at(end);
    RoundMatch {
        opens,
        filename,
        rest,
    }
}

/// Applies the three resolvers to tokens, consulting `oracle` before
/// treating a delimiter as a file or figure marker.
#[derive(Debug, Clone)]
pub struct DelimiterResolver<O> {
    oracle: O,
    extensions: Vec<String>,
}

impl<O: FileOracle> DelimiterResolver<O> {
    pub fn new(oracle: O, extensions: Vec<String>) -> Self {
        Self { oracle, extensions }
    }

    /// Runs the full chain on one token and returns the final residual.
    pub fn resolve(&self, token: &str, stack: &mut ContextStack) -> Result<String, CloseError> {
        let token = self.resolve_angle(token, stack);
        let token = self.resolve_square(token, stack)?;
        self.resolve_round(token, stack)
    }

    /// Opens a figure when the oracle knows the file and closes the figure on
    /// top of the stack. A `>` with no figure open is plain text, as in
    /// `<recently read>`.
    pub fn resolve_angle<'t>(&self, token: &'t str, stack: &mut ContextStack) -> &'t str {
        let Some(m) = scan_angle(token) else {
            return token;
        };
        let opened = m.open && !m.filename.is_empty() && self.oracle.exists(m.filename);
        if m.open && !opened {
            return token;
        }
        if opened {
            stack.push(Frame::Figure(m.filename.to_string()));
        }
        let closed = m.close && stack.close(Delimiter::Angle).is_ok();
        if opened || closed { m.rest } else { token }
    }

    pub fn resolve_square<'t>(
        &self,
        token: &'t str,
        stack: &mut ContextStack,
    ) -> Result<&'t str, CloseError> {
        let Some(m) = scan_square(token) else {
            return Ok(token);
        };
        if m.open {
            let label = format!("{}:[{}]", stack.label(), m.page);
            stack.push(Frame::PageGroup(label));
        }
        if m.close {
            stack.close(Delimiter::Square)?;
        }
        Ok(m.rest)
    }

    /// Opens a file for `(` followed by a confirmed auxiliary file, then
    /// treats every remaining `(` as an anonymous group and every `)` as a
    /// close.
    pub fn resolve_round(
        &self,
        token: &str,
        stack: &mut ContextStack,
    ) -> Result<String, CloseError> {
        let m = scan_round(token);
        let mut remainder = token;
        if m.opens > 0 && self.is_file(m.filename) {
            for _ in 1..m.opens {
                stack.push(Frame::AnonymousGroup);
            }
            stack.push(Frame::File(m.filename.to_string()));
            remainder = m.rest;
        }

        let mut residual = String::with_capacity(remainder.len());
        for c in remainder.chars() {
            match c {
                '(' => stack.push(Frame::AnonymousGroup),
                ')' => {
                    stack.close(Delimiter::Round)?;
                }
                _ => residual.push(c),
            }
        }
        Ok(residual)
    }

    fn is_file(&self, filename: &str) -> bool {
        matches_extension(&self.extensions, filename) && self.oracle.exists(filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnnotateOptions;
    use crate::oracle::KnownFiles;

    fn resolver(files: &[&str]) -> DelimiterResolver<KnownFiles> {
        DelimiterResolver::new(
            files.iter().copied().collect(),
            AnnotateOptions::default().extensions,
        )
    }

    #[test]
    fn test_scan_angle_shapes() {
        assert_eq!(
            scan_angle("<./fig.png>])"),
            Some(AngleMatch {
                open: true,
                filename: "./fig.png",
                close: true,
                rest: "])"
            })
        );
        assert_eq!(
            scan_angle("<./fig.png,"),
            Some(AngleMatch {
                open: true,
                filename: "./fig.png",
                close: false,
                rest: ","
            })
        );
        assert_eq!(scan_angle("176.66pt>").map(|m| m.close), Some(true));
        assert_eq!(scan_angle("plain"), None);
        assert_eq!(scan_angle("(./main.tex)"), None);
        assert_eq!(scan_angle("a->b"), None);
    }

    #[test]
    fn test_scan_square_shapes() {
        assert_eq!(
            scan_square("[1{/texmf/fonts/map/pdftex.map}]))"),
            Some(SquareMatch {
                open: true,
                page: "1",
                close: true,
                rest: "))"
            })
        );
        assert_eq!(scan_square("[12").map(|m| (m.open, m.close)), Some((true, false)));
        assert_eq!(scan_square("]").map(|m| (m.open, m.close)), Some((false, true)));
        assert_eq!(scan_square("[]"), None);
        assert_eq!(scan_square("[h]"), None);
        assert_eq!(scan_square("[2.5pt]"), None);
        assert_eq!(scan_square("[3{unterminated"), None);
        assert_eq!(scan_square("2024"), None);
    }

    #[test]
    fn test_scan_round_shapes() {
        assert_eq!(
            scan_round("((./main.tex)"),
            RoundMatch {
                opens: 2,
                filename: "./main.tex",
                rest: ")"
            }
        );
        assert_eq!(
            scan_round("text)"),
            RoundMatch {
                opens: 0,
                filename: "text",
                rest: ")"
            }
        );
    }

    #[test]
    fn test_round_opens_and_closes_known_file() {
        let r = resolver(&["./main.tex"]);
        let mut stack = ContextStack::new();

        assert_eq!(r.resolve("(./main.tex", &mut stack).unwrap(), "");
        assert_eq!(stack.top(), &Frame::File("./main.tex".into()));
        assert_eq!(r.resolve(")", &mut stack).unwrap(), "");
        assert!(stack.is_balanced());
    }

    #[test]
    fn test_round_unknown_file_is_anonymous_group() {
        let r = resolver(&[]);
        let mut stack = ContextStack::new();

        assert_eq!(r.resolve("(notAFile", &mut stack).unwrap(), "notAFile");
        assert_eq!(stack.top(), &Frame::AnonymousGroup);
        assert_eq!(stack.label(), "ROOT");
        assert_eq!(r.resolve("text)", &mut stack).unwrap(), "text");
        assert!(stack.is_balanced());
    }

    #[test]
    fn test_round_requires_known_extension() {
        let r = resolver(&["README"]);
        let mut stack = ContextStack::new();
        r.resolve("(README", &mut stack).unwrap();
        assert_eq!(stack.top(), &Frame::AnonymousGroup);
    }

    #[test]
    fn test_round_extra_leading_parens_are_groups() {
        let r = resolver(&["a.sty"]);
        let mut stack = ContextStack::new();
        r.resolve("((a.sty", &mut stack).unwrap();
        assert_eq!(
            stack.frames(),
            &[
                Frame::Root,
                Frame::AnonymousGroup,
                Frame::File("a.sty".into())
            ]
        );
        r.resolve("))", &mut stack).unwrap();
        assert!(stack.is_balanced());
    }

    #[test]
    fn test_round_close_over_page_is_fatal() {
        let r = resolver(&[]);
        let mut stack = ContextStack::new();
        r.resolve("[1", &mut stack).unwrap();
        let err = r.resolve(")", &mut stack).unwrap_err();
        assert_eq!(err.delimiter, Delimiter::Round);
        assert_eq!(err.top, Frame::PageGroup("ROOT:[1]".into()));
    }

    #[test]
    fn test_round_close_on_root_is_fatal() {
        let r = resolver(&[]);
        let mut stack = ContextStack::new();
        let err = r.resolve(")", &mut stack).unwrap_err();
        assert_eq!(err.top, Frame::Root);
    }

    #[test]
    fn test_page_group_label_uses_enclosing_file() {
        let r = resolver(&["./main.tex"]);
        let mut stack = ContextStack::new();
        r.resolve("(./main.tex", &mut stack).unwrap();
        r.resolve("[3", &mut stack).unwrap();
        assert_eq!(stack.label(), "./main.tex:[3]");
        r.resolve("]", &mut stack).unwrap();
        assert_eq!(stack.label(), "./main.tex");
    }

    #[test]
    fn test_square_close_requires_page_group() {
        let r = resolver(&["./main.tex"]);
        let mut stack = ContextStack::new();
        r.resolve("(./main.tex", &mut stack).unwrap();
        let err = r.resolve("]", &mut stack).unwrap_err();
        assert_eq!(err.delimiter, Delimiter::Square);
        assert_eq!(err.top, Frame::File("./main.tex".into()));
    }

    #[test]
    fn test_square_passes_trailing_paren_to_round() {
        let r = resolver(&["./main.tex"]);
        let mut stack = ContextStack::new();
        r.resolve("(./main.tex", &mut stack).unwrap();
        r.resolve("[1{/texmf/pdftex.map}])", &mut stack).unwrap();
        assert!(stack.is_balanced());
    }

    #[test]
    fn test_figure_close_chain() {
        let r = resolver(&["./main.tex", "./fig.png"]);
        let mut stack = ContextStack::new();
        r.resolve("(./main.tex", &mut stack).unwrap();
        r.resolve("[1", &mut stack).unwrap();
        r.resolve("<./fig.png,", &mut stack).unwrap();
        assert_eq!(stack.top(), &Frame::Figure("./fig.png".into()));
        assert_eq!(r.resolve("id=1,", &mut stack).unwrap(), "id=1,");
        r.resolve("176.66249pt>])", &mut stack).unwrap();
        assert!(stack.is_balanced());
    }

    #[test]
    fn test_angle_text_is_inert() {
        let r = resolver(&[]);
        let mut stack = ContextStack::new();
        assert_eq!(r.resolve("<recently", &mut stack).unwrap(), "<recently");
        assert_eq!(r.resolve("read>", &mut stack).unwrap(), "read>");
        assert_eq!(r.resolve("<argument>", &mut stack).unwrap(), "<argument>");
        assert!(stack.is_balanced());
    }

    #[test]
    fn test_angle_oracle_miss_keeps_token() {
        let r = resolver(&[]);
        let mut stack = ContextStack::new();
        assert_eq!(r.resolve_angle("<./gone.png>", &mut stack), "<./gone.png>");
        assert!(stack.is_balanced());
    }
}
