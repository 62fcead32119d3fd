use serde::{Deserialize, Serialize};

/// Label of the permanent bottom frame.
pub const ROOT_LABEL: &str = "ROOT";

/// One entry on the context stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Bottom sentinel. Never pushed or popped by the resolvers.
    Root,
    /// An input or auxiliary file opened by the engine, e.g. `(./main.tex`.
    File(String),
    /// A text parenthesis that is not a file marker. Only contributes depth.
    AnonymousGroup,
    /// A shipped-out page, labelled `<enclosing>:[<page>]`.
    PageGroup(String),
    /// An included graphic, e.g. `<./fig.png>`.
    Figure(String),
}

impl Frame {
    /// The attribution label of this frame, if it has one of its own.
    pub fn label(&self) -> Option<&str> {
        match self {
            Frame::Root => Some(ROOT_LABEL),
            Frame::File(path) | Frame::Figure(path) => Some(path.as_str()),
            Frame::PageGroup(label) => Some(label.as_str()),
            Frame::AnonymousGroup => None,
        }
    }

    /// Whether a closing delimiter of the given family may pop this frame.
    pub fn closed_by(&self, delimiter: Delimiter) -> bool {
        match delimiter {
            Delimiter::Round => matches!(
                self,
                Frame::AnonymousGroup | Frame::File(_) | Frame::Figure(_)
            ),
            Delimiter::Square => matches!(self, Frame::PageGroup(_)),
            Delimiter::Angle => matches!(self, Frame::Figure(_)),
        }
    }

    /// Short human-readable description used in diagnostics.
    pub fn describe(&self) -> String {
        match self {
            Frame::Root => "the root sentinel".to_string(),
            Frame::File(path) => format!("file `{}`", path),
            Frame::AnonymousGroup => "an anonymous group".to_string(),
            Frame::PageGroup(label) => format!("page group `{}`", label),
            Frame::Figure(path) => format!("figure `{}`", path),
        }
    }
}

/// The three delimiter families a transcript uses for nesting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    /// `(` / `)`: files and plain text groups.
    Round,
    /// `[` / `]`: pages.
    Square,
    /// `<` / `>`: figures.
    Angle,
}

impl Delimiter {
    pub fn closing_char(self) -> char {
        match self {
            Delimiter::Round => ')',
            Delimiter::Square => ']',
            Delimiter::Angle => '>',
        }
    }
}

/// Content of one emitted line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data")]
pub enum LineContent {
    /// Decoded text, including the original line terminator.
    Text(String),
    /// Bytes that failed to decode, passed through untouched.
    Raw(Vec<u8>),
}

impl LineContent {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            LineContent::Text(text) => text.as_bytes(),
            LineContent::Raw(bytes) => bytes,
        }
    }

    /// The decoded text, or `None` for raw lines.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            LineContent::Text(text) => Some(text),
            LineContent::Raw(_) => None,
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            LineContent::Text(text) => text.trim().is_empty(),
            LineContent::Raw(bytes) => bytes.iter().all(u8::is_ascii_whitespace),
        }
    }
}

/// A transcript line together with the context it is attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributedLine {
    pub label: String,
    #[serde(flatten)]
    pub content: LineContent,
}

impl AttributedLine {
    pub fn text(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            content: LineContent::Text(text.into()),
        }
    }

    pub fn raw(label: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            label: label.into(),
            content: LineContent::Raw(bytes),
        }
    }

    /// Writes `<label>:<content>` exactly as the transcript had it.
    pub fn write_to<W: std::io::Write>(&self, out: &mut W) -> std::io::Result<()> {
        out.write_all(self.label.as_bytes())?;
        out.write_all(b":")?;
        out.write_all(self.content.as_bytes())
    }

    /// The full prefixed line as text. Undecodable bytes are replaced.
    pub fn render(&self) -> String {
        match &self.content {
            LineContent::Text(text) => format!("{}:{}", self.label, text),
            LineContent::Raw(bytes) => {
                format!("{}:{}", self.label, String::from_utf8_lossy(bytes))
            }
        }
    }
}
