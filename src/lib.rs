//! Parsing of SRT and XML transcript caption files into a single, time-ordered
//! sequence of plain-text entries, with lookup by playback time.
//!
//! ```
//! use subread::SubtitleDocument;
//!
//! let doc = SubtitleDocument::load("1\n00:00:01,000 --> 00:00:02,000\n<i>Hello</i> there\n");
//! assert_eq!(doc.entry_active_at(1.5).map(|e| e.text()), Some("Hello there".to_string()));
//! ```

pub mod document;
pub mod entry;
pub mod error;
pub mod markup;
pub mod options;
pub mod sniff;
pub mod srt;
pub mod timecode;
pub mod transcript;

pub use document::SubtitleDocument;
pub use entry::CaptionEntry;
pub use error::ParseError;
pub use options::ParseOptions;
pub use sniff::FormatKind;
