use crate::error::CloseError;
use crate::ir::{Delimiter, Frame, ROOT_LABEL};

/// Stack of the contexts currently open in the transcript.
///
/// The bottom frame is always [`Frame::Root`]; it cannot be popped, so the
/// depth never drops below one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextStack {
    frames: Vec<Frame>,
}

impl Default for ContextStack {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextStack {
    pub fn new() -> Self {
        Self {
            frames: vec![Frame::Root],
        }
    }

    pub fn push(&mut self, frame: Frame) {
        log::debug!("push {} at depth {}", frame.describe(), self.depth());
        self.frames.push(frame);
    }

    /// Pops the top frame, refusing to remove the root sentinel.
    pub fn pop(&mut self, delimiter: Delimiter) -> Result<Frame, CloseError> {
        if self.frames.len() == 1 {
            return Err(CloseError {
                delimiter,
                top: Frame::Root,
            });
        }
        let frame = self.frames.pop().unwrap_or(Frame::Root);
        log::debug!("pop {} to depth {}", frame.describe(), self.depth());
        Ok(frame)
    }

    /// Pops the top frame if `delimiter` is allowed to close it.
    pub fn close(&mut self, delimiter: Delimiter) -> Result<Frame, CloseError> {
        let top = self.top();
        if !top.closed_by(delimiter) {
            return Err(CloseError {
                delimiter,
                top: top.clone(),
            });
        }
        self.pop(delimiter)
    }

    pub fn top(&self) -> &Frame {
        self.frames.last().unwrap_or(&Frame::Root)
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Label of the innermost frame that has one. Anonymous groups are skipped.
    pub fn label(&self) -> &str {
        self.frames
            .iter()
            .rev()
            .find_map(Frame::label)
            .unwrap_or(ROOT_LABEL)
    }

    pub fn is_balanced(&self) -> bool {
        self.frames.len() == 1
    }

    /// Descriptions of every frame above the sentinel, outermost first.
    pub fn open_frames(&self) -> Vec<String> {
        self.frames[1..].iter().map(Frame::describe).collect()
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }
}
