use crate::error::CloseError;
use crate::oracle::FileOracle;
use crate::resolve::DelimiterResolver;
use crate::stack::ContextStack;
use crate::words::split_words;

/// Drives the resolvers over whole lines and decides which context each line
/// belongs to.
///
/// A line is attributed to the shallowest point the stack reaches while the
/// line is processed, starting from the state before its first token. A line
/// like `) (./next.tex` therefore belongs to the context being returned to,
/// not to the file that was closing or the one being opened.
#[derive(Debug)]
pub struct LineAttributor<O> {
    stack: ContextStack,
    resolver: DelimiterResolver<O>,
}

impl<O: FileOracle> LineAttributor<O> {
    pub fn new(resolver: DelimiterResolver<O>) -> Self {
        Self {
            stack: ContextStack::new(),
            resolver,
        }
    }

    /// Processes every token of `line` and returns its attribution label.
    ///
    /// On error the stack keeps whatever state it reached before the
    /// offending delimiter.
    pub fn attribute(&mut self, line: &str) -> Result<String, CloseError> {
        let mut depth = self.stack.depth();
        let mut label = self.stack.label().to_string();

        for word in split_words(line) {
            if word.text.is_empty() {
                continue;
            }
            self.resolver.resolve(word.text, &mut self.stack)?;
            if self.stack.depth() < depth {
                depth = self.stack.depth();
                label = self.stack.label().to_string();
            }
        }
        Ok(label)
    }

    /// Label of the current innermost context.
    pub fn current_label(&self) -> &str {
        self.stack.label()
    }

    pub fn stack(&self) -> &ContextStack {
        &self.stack
    }
}
