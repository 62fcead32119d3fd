/// A token and the whitespace that follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Word<'a> {
    pub text: &'a str,
    pub space: &'a str,
}

/// Splits a line into (token, whitespace) pairs.
///
/// Concatenating every `text` and `space` in order reproduces the line
/// exactly. Leading whitespace comes back as a pair with an empty token.
pub fn split_words(line: &str) -> Words<'_> {
    Words { rest: line }
}

pub struct Words<'a> {
    rest: &'a str,
}

impl<'a> Iterator for Words<'a> {
    type Item = Word<'a>;

    fn next(&mut self) -> Option<Word<'a>> {
        if self.rest.is_empty() {
            return None;
        }
        let text_end = self
            .rest
            .find(char::is_whitespace)
            .unwrap_or(self.rest.len());
        let (text, after) = self.rest.split_at(text_end);
        let space_end = after
            .find(|c: char| !c.is_whitespace())
            .unwrap_or(after.len());
        let (space, rest) = after.split_at(space_end);
        self.rest = rest;
        Some(Word { text, space })
    }
}
