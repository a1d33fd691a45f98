use crate::entry::CaptionEntry;
use crate::error::ParseError;
use crate::markup;
use crate::options::ParseOptions;
use crate::timecode;

use nom::bytes::complete::{tag, take_till, take_till1};
use nom::character::complete::{digit1, multispace0, multispace1, space0};
use nom::combinator::map_res;
use nom::multi::many0;
use nom::sequence::preceded;
use nom::IResult;

/// The fields of one block before time codes are decoded and text is cleaned.
#[derive(Debug, PartialEq)]
struct RawBlock<'a> {
    index: usize,
    start: &'a str,
    end: &'a str,
    lines: Vec<&'a str>,
}

/// Parses an SRT document.
///
/// A single block that fails to scan rejects the whole document. Blocks whose
/// text is all filtered away contribute nothing.
pub fn parse(text: &str, opts: &ParseOptions) -> Result<Vec<CaptionEntry>, ParseError> {
    let text = text.strip_prefix('\u{FEFF}').unwrap_or(text);
    let mut entries = Vec::new();

    for (position, block) in split_blocks(text).into_iter().enumerate() {
        if block.trim().is_empty() {
            continue;
        }
        let block_number = position + 1;
        let raw = scan_block(block).map_err(|reason| ParseError::InvalidFormat {
            block: block_number,
            reason: reason.to_string(),
            source: None,
        })?;

        let start = decode_in_block(raw.start, block_number)?;
        let end = decode_in_block(raw.end, block_number)?;

        let lines: Vec<String> = raw
            .lines
            .into_iter()
            .map(markup::strip)
            .filter(|line| has_enough_letters(line, opts.min_letters))
            .collect();

        if !lines.is_empty() {
            entries.push(CaptionEntry::new(raw.index, start, end, lines));
        }
    }

    Ok(entries)
}

/// Splits on CR-LF blank lines, falling back to bare LF blank lines when the
/// former does not occur at all.
fn split_blocks(text: &str) -> Vec<&str> {
    let blocks: Vec<&str> = text.split("\r\n\r\n").collect();
    if blocks.len() == 1 {
        text.split("\n\n").collect()
    } else {
        blocks
    }
}

fn decode_in_block(token: &str, block: usize) -> Result<f64, ParseError> {
    timecode::decode(token).map_err(|err| ParseError::InvalidFormat {
        block,
        reason: format!("bad time code '{}'", token),
        source: Some(Box::new(err)),
    })
}

fn has_enough_letters(line: &str, min_letters: usize) -> bool {
    line.chars().filter(|c| c.is_alphabetic()).count() > min_letters
}

fn step<'a, T>(
    result: IResult<&'a str, T>,
    reason: &'static str,
) -> Result<(&'a str, T), &'static str> {
    result.map_err(|_| reason)
}

fn scan_block(block: &str) -> Result<RawBlock<'_>, &'static str> {
    let (input, index) = step(preceded(multispace0, seq_num)(block), "missing sequence index")?;
    let (input, _) = step(multispace1(input), "missing start time code")?;
    let (input, start) = step(start_token(input), "missing start time code")?;
    let (input, _) = step(arrow(input), "missing '-->' separator")?;
    let (input, end) = step(end_token(input), "missing end time code")?;
    let (input, lines) = step(text_lines(input), "unreadable text line")?;

    if !input.trim().is_empty() {
        return Err("unreadable text line");
    }

    Ok(RawBlock {
        index,
        start,
        end,
        lines,
    })
}

fn seq_num(input: &str) -> IResult<&str, usize> {
    map_res(digit1, |s: &str| s.parse())(input)
}

fn start_token(input: &str) -> IResult<&str, &str> {
    take_till1(|c: char| c.is_whitespace() || c == '-')(input)
}

fn arrow(input: &str) -> IResult<&str, &str> {
    let (input, _) = space0(input)?;
    let (input, arrow) = tag("-->")(input)?;
    let (input, _) = space0(input)?;
    Ok((input, arrow))
}

/// The end code, with anything else on the line (cue coordinates) dropped.
fn end_token(input: &str) -> IResult<&str, &str> {
    let (input, end) = take_till1(char::is_whitespace)(input)?;
    let (input, _) = take_till(is_newline)(input)?;
    Ok((input, end))
}

fn text_lines(input: &str) -> IResult<&str, Vec<&str>> {
    many0(preceded(multispace0, take_till1(is_newline)))(input)
}

fn is_newline(c: char) -> bool {
    c == '\n' || c == '\r'
}
