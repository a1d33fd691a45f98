use crate::entry::CaptionEntry;
use crate::markup;
use crate::options::ParseOptions;

use log::{debug, warn};
use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::Reader;

/// A child of `<transcript>` as it appears in the document.
#[derive(Debug, Default, PartialEq)]
struct RawNode {
    start: Option<f64>,
    dur: Option<f64>,
    text: String,
}

impl RawNode {
    fn from_attributes(element: &BytesStart, reader: &Reader<&[u8]>) -> Self {
        let mut node = RawNode::default();
        for attr in element.attributes().flatten() {
            let slot = match attr.key.as_ref() {
                b"start" => &mut node.start,
                b"dur" => &mut node.dur,
                _ => continue,
            };
            *slot = attr
                .decode_and_unescape_value(reader.decoder())
                .ok()
                .and_then(|value| value.trim().parse::<f64>().ok())
                .filter(|seconds| seconds.is_finite() && *seconds >= 0.0);
        }
        node
    }

    // Elements nested in a node reach the stripper only as text, so their
    // word boundaries are kept here: block-level tags leave a space.
    fn separate_at(&mut self, tag_name: &[u8]) {
        if !markup::is_inline_tag(&String::from_utf8_lossy(tag_name)) {
            self.text.push(' ');
        }
    }
}

/// Parses an XML transcript (`<transcript><text start=".." dur="..">..</text>..`).
///
/// Never fails. Nodes without a usable `start` and `dur` are skipped, and a
/// syntax error ends the read with whatever was gathered before it.
pub fn parse(text: &str, opts: &ParseOptions) -> Vec<CaptionEntry> {
    let nodes = read_nodes(text);
    infer_entries(&nodes, opts)
}

fn read_nodes(xml: &str) -> Vec<RawNode> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut nodes = Vec::new();
    let mut depth = 0usize;
    let mut transcript_depth: Option<usize> = None;
    let mut current: Option<RawNode> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                depth += 1;
                match transcript_depth {
                    None if e.local_name().as_ref() == b"transcript" => {
                        transcript_depth = Some(depth);
                    }
                    Some(d) if depth == d + 1 => {
                        current = Some(RawNode::from_attributes(&e, &reader));
                    }
                    _ => {
                        if let Some(node) = current.as_mut() {
                            node.separate_at(e.local_name().as_ref());
                        }
                    }
                }
            }
            Ok(Event::Empty(e)) => {
                if transcript_depth == Some(depth) {
                    nodes.push(RawNode::from_attributes(&e, &reader));
                } else if let Some(node) = current.as_mut() {
                    node.separate_at(e.local_name().as_ref());
                }
            }
            Ok(Event::Text(e)) => {
                if let Some(node) = current.as_mut() {
                    node.text.push_str(&text_of(&e));
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(node) = current.as_mut() {
                    node.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Ok(Event::End(e)) => {
                if let Some(d) = transcript_depth {
                    if depth == d + 1 {
                        if let Some(node) = current.take() {
                            nodes.push(node);
                        }
                    } else if depth > d + 1 {
                        if let Some(node) = current.as_mut() {
                            node.separate_at(e.local_name().as_ref());
                        }
                    } else if depth == d {
                        transcript_depth = None;
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Ok(Event::Eof) => break,
            Err(err) => {
                warn!(
                    "Transcript XML error at byte {}, keeping {} node(s) read so far: {}",
                    reader.error_position(),
                    nodes.len(),
                    err
                );
                break;
            }
            Ok(_) => {}
        }
    }

    nodes
}

// Text that fails unescaping (an entity quick-xml does not know) is passed
// on raw; the markup stripper decodes what it can.
fn text_of(e: &BytesText) -> String {
    match e.unescape() {
        Ok(text) => text.into_owned(),
        Err(_) => String::from_utf8_lossy(e).into_owned(),
    }
}

fn infer_entries(nodes: &[RawNode], opts: &ParseOptions) -> Vec<CaptionEntry> {
    let mut entries = Vec::new();

    for (position, node) in nodes.iter().enumerate() {
        let (Some(start), Some(dur)) = (node.start, node.dur) else {
            warn!("Skipping transcript node {} without start/dur", position + 1);
            continue;
        };

        let mut end = start + dur;
        if let Some(next_start) = nodes.get(position + 1).and_then(|next| next.start) {
            let inferred = next_start - opts.end_epsilon;
            if inferred > start {
                end = inferred;
            }
        }

        let line = markup::strip(&node.text);
        if line.is_empty() {
            debug!("Transcript node {} has no text after stripping", position + 1);
            continue;
        }

        entries.push(CaptionEntry::new(entries.len() + 1, start, end, vec![line]));
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRANSCRIPT: &str = r#"<?xml version="1.0" encoding="utf-8" ?>
<transcript>
  <text start="0.5" dur="2.0">Hello &amp;amp; welcome</text>
  <text start="3.25" dur="1.5">it&amp;#39;s <b>fine</b></text>
  <text start="5" dur="2.5">bye</text>
</transcript>"#;

    fn parse_default(text: &str) -> Vec<CaptionEntry> {
        parse(text, &ParseOptions::default())
    }

    #[test]
    fn ends_are_inferred_from_next_start() {
        let entries = parse_default(TRANSCRIPT);

        assert_eq!(
            entries,
            vec![
                CaptionEntry::new(1, 0.5, 3.25 - 0.01, vec!["Hello & welcome".to_string()]),
                CaptionEntry::new(2, 3.25, 5.0 - 0.01, vec!["it's fine".to_string()]),
                CaptionEntry::new(3, 5.0, 7.5, vec!["bye".to_string()]),
            ]
        );
    }

    #[test]
    fn epsilon_is_configurable() {
        let opts = ParseOptions {
            end_epsilon: 0.5,
            ..ParseOptions::default()
        };

        let entries = parse(TRANSCRIPT, &opts);

        assert_eq!(entries[0].end_seconds, 3.25 - 0.5);
    }

    #[test]
    fn nodes_without_timing_are_skipped() {
        let xml = r#"<?xml version="1.0"?><transcript><text start="1" dur="1">first</text><text dur="2">no start</text><text start="4">no dur</text><text start="6" dur="1">last</text></transcript>"#;

        let entries = parse_default(xml);

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].sequence_index, 1);
        assert_eq!(entries[1].sequence_index, 2);
        // The following node has no start, so the node's own duration is used.
        assert_eq!(entries[0].end_seconds, 2.0);
        assert_eq!(entries[1].start_seconds, 6.0);
        assert_eq!(entries[1].end_seconds, 7.0);
    }

    #[test]
    fn unparsable_attributes_count_as_missing() {
        let xml = r#"<?xml version="1.0"?><transcript><text start="soon" dur="1">x marks</text><text start="2" dur="-1">negative</text></transcript>"#;
        assert!(parse_default(xml).is_empty());
    }

    #[test]
    fn inference_never_produces_inverted_intervals() {
        let xml = r#"<?xml version="1.0"?><transcript><text start="1" dur="2">same start</text><text start="1" dur="2">again</text></transcript>"#;

        let entries = parse_default(xml);

        assert_eq!(entries[0].end_seconds, 3.0);
        assert!(entries.iter().all(|e| e.end_seconds > e.start_seconds));
    }

    #[test]
    fn syntax_error_keeps_earlier_nodes() {
        let xml = r#"<?xml version="1.0"?><transcript><text start="0" dur="1">kept line</text><text start="2" dur="1">broken</transcript>"#;

        let entries = parse_default(xml);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].lines, vec!["kept line".to_string()]);
        assert_eq!(entries[0].end_seconds, 1.0);
    }

    #[test]
    fn html_entities_and_cdata_reach_the_stripper() {
        let xml = r#"<?xml version="1.0"?><transcript><text start="0" dur="1">caf&eacute;&nbsp;now</text><text start="1" dur="1"><![CDATA[<i>raw</i> text]]></text></transcript>"#;

        let entries = parse_default(xml);

        assert_eq!(entries[0].lines, vec!["café now".to_string()]);
        assert_eq!(entries[1].lines, vec!["raw text".to_string()]);
    }

    #[test]
    fn only_transcript_children_are_read() {
        let xml = r#"<?xml version="1.0"?><root><meta start="0" dur="1">ignored</meta><transcript><text start="1" dur="1">inside</text></transcript></root>"#;

        let entries = parse_default(xml);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].lines, vec!["inside".to_string()]);
    }

    #[test]
    fn nested_block_tags_separate_words() {
        let xml = r#"<?xml version="1.0"?><transcript>
<text start="0" dur="1">one<br/>two</text>
<text start="1" dur="1">first<p>second</p>third</text>
<text start="2" dur="1">do<b>n</b>'t <i>stop</i></text>
</transcript>"#;

        let entries = parse_default(xml);

        assert_eq!(entries[0].lines, vec!["one two".to_string()]);
        assert_eq!(entries[1].lines, vec!["first second third".to_string()]);
        assert_eq!(entries[2].lines, vec!["don't stop".to_string()]);
    }

    #[test]
    fn empty_transcript_yields_nothing() {
        assert!(parse_default(r#"<?xml version="1.0"?><transcript/>"#).is_empty());
        assert!(parse_default(r#"<?xml version="1.0"?>"#).is_empty());
    }
}
