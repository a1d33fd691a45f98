use crate::entry::CaptionEntry;
use crate::error::ParseError;
use crate::options::ParseOptions;
use crate::sniff::{self, FormatKind};
use crate::{srt, transcript};

use std::path::Path;

use log::{debug, warn};

/// A parsed caption file, immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleDocument {
    format: FormatKind,
    entries: Vec<CaptionEntry>,
    // Sorted by start with no overlaps, so lookups can bisect.
    disjoint: bool,
}

impl SubtitleDocument {
    pub fn load(text: &str) -> Self {
        Self::load_with(text, &ParseOptions::default())
    }

    /// Parses `text` with the reader its content calls for. A reader failure
    /// is logged and yields an empty document.
    pub fn load_with(text: &str, opts: &ParseOptions) -> Self {
        let format = sniff::detect(text);
        debug!("Detected {} input", format);

        let entries = match format {
            FormatKind::Srt => srt::parse(text, opts).unwrap_or_else(|err| {
                warn!("Failed to parse SRT subtitles, continuing without captions: {}", err);
                Vec::new()
            }),
            FormatKind::XmlTranscript => transcript::parse(text, opts),
        };
        debug!("Loaded {} caption entries", entries.len());

        Self::from_entries(format, entries)
    }

    /// Reads a UTF-8 file and loads it. Only reading can fail.
    pub fn load_path<P: AsRef<Path>>(path: P, opts: &ParseOptions) -> Result<Self, ParseError> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::load_with(&text, opts))
    }

    pub fn from_entries(format: FormatKind, entries: Vec<CaptionEntry>) -> Self {
        let disjoint = entries.windows(2).all(|pair| {
            pair[0].start_seconds <= pair[1].start_seconds
                && pair[0].end_seconds <= pair[1].start_seconds
        });
        Self {
            format,
            entries,
            disjoint,
        }
    }

    pub fn format(&self) -> FormatKind {
        self.format
    }

    pub fn entries(&self) -> &[CaptionEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The first entry whose `[start, end)` interval contains `seconds`.
    pub fn entry_active_at(&self, seconds: f64) -> Option<&CaptionEntry> {
        if self.disjoint {
            let after = self.entries.partition_point(|e| e.start_seconds <= seconds);
            let candidate = self.entries[..after].last()?;
            candidate.is_active_at(seconds).then_some(candidate)
        } else {
            self.entries.iter().find(|e| e.is_active_at(seconds))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SRT: &str = "1\n00:00:01,000 --> 00:00:02,500\nHello there\n\n\
                       2\n00:00:03,000 --> 00:00:04,000\nGeneral Kenobi\n";

    fn entry(index: usize, start: f64, end: f64, text: &str) -> CaptionEntry {
        CaptionEntry::new(index, start, end, vec![text.to_string()])
    }

    #[test]
    fn lookup_respects_gaps_and_bounds() {
        let doc = SubtitleDocument::load(SRT);

        assert_eq!(doc.format(), FormatKind::Srt);
        assert_eq!(doc.len(), 2);
        assert!(doc.entry_active_at(0.5).is_none());
        assert_eq!(doc.entry_active_at(1.0).map(|e| e.sequence_index), Some(1));
        assert_eq!(doc.entry_active_at(1.7).map(|e| e.sequence_index), Some(1));
        assert!(doc.entry_active_at(2.5).is_none());
        assert!(doc.entry_active_at(2.7).is_none());
        assert_eq!(doc.entry_active_at(3.5).map(|e| e.sequence_index), Some(2));
        assert!(doc.entry_active_at(4.0).is_none());
        assert!(doc.entry_active_at(10.0).is_none());
        assert!(doc.entry_active_at(f64::NAN).is_none());
    }

    #[test]
    fn xml_input_uses_transcript_reader() {
        let doc = SubtitleDocument::load(
            r#"<?xml version="1.0"?><transcript><text start="0" dur="1">first line</text><text start="2" dur="1">second line</text></transcript>"#,
        );

        assert_eq!(doc.format(), FormatKind::XmlTranscript);
        assert_eq!(doc.len(), 2);
        assert_eq!(doc.entry_active_at(1.5).map(|e| e.text()), Some("first line".to_string()));
        assert!(doc.entry_active_at(1.995).is_none());
    }

    #[test]
    fn failed_srt_becomes_empty_document() {
        let doc = SubtitleDocument::load("1\n00:00:01,000 --> 00:00:02,000\nFine\n\ngarbage\n");

        assert_eq!(doc.format(), FormatKind::Srt);
        assert!(doc.is_empty());
        assert!(doc.entry_active_at(1.5).is_none());
    }

    #[test]
    fn overlapping_entries_fall_back_to_first_match() {
        let doc = SubtitleDocument::from_entries(
            FormatKind::Srt,
            vec![
                entry(1, 0.0, 10.0, "long"),
                entry(2, 2.0, 3.0, "short"),
                entry(3, 12.0, 13.0, "later"),
            ],
        );

        assert!(!doc.disjoint);
        assert_eq!(doc.entry_active_at(2.5).map(|e| e.sequence_index), Some(1));
        assert_eq!(doc.entry_active_at(12.5).map(|e| e.sequence_index), Some(3));
        assert!(doc.entry_active_at(11.0).is_none());
    }

    #[test]
    fn bisecting_matches_linear_scan() {
        let entries = vec![
            entry(1, 0.0, 1.0, "a"),
            entry(2, 1.0, 1.0, "zero width"),
            entry(3, 1.0, 2.0, "b"),
            entry(4, 5.0, 6.0, "c"),
        ];
        let doc = SubtitleDocument::from_entries(FormatKind::Srt, entries.clone());
        assert!(doc.disjoint);

        for step in 0..70 {
            let t = step as f64 * 0.1;
            let expected = entries.iter().find(|e| e.is_active_at(t));
            assert_eq!(doc.entry_active_at(t), expected, "at {}", t);
        }
    }

    #[test]
    fn missing_file_is_io_error() {
        let result =
            SubtitleDocument::load_path("/definitely/not/here.srt", &ParseOptions::default());
        assert!(matches!(result, Err(ParseError::Io(_))));
    }

    #[test]
    fn loading_twice_is_identical() {
        assert_eq!(SubtitleDocument::load(SRT), SubtitleDocument::load(SRT));
    }

    #[test]
    fn document_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SubtitleDocument>();

        let doc = std::sync::Arc::new(SubtitleDocument::load(SRT));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let doc = std::sync::Arc::clone(&doc);
                std::thread::spawn(move || doc.entry_active_at(3.5).map(|e| e.sequence_index))
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), Some(2));
        }
    }
}
