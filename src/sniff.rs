use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatKind {
    Srt,
    XmlTranscript,
}

impl fmt::Display for FormatKind {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FormatKind::Srt => write!(fmt, "SRT"),
            FormatKind::XmlTranscript => write!(fmt, "XML transcript"),
        }
    }
}

/// Picks a reader from the leading content. Anything without an XML
/// declaration is treated as SRT.
pub fn detect(text: &str) -> FormatKind {
    let head = text.trim_start_matches(|c: char| c == '\u{FEFF}' || c.is_whitespace());
    if head.starts_with("<?xml") {
        FormatKind::XmlTranscript
    } else {
        FormatKind::Srt
    }
}
