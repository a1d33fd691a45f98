//! Reduces an HTML-ish caption fragment to plain text.
//!
//! The fragment is consumed one piece at a time: a whitespace run, a comment,
//! a `<script>`/`<style>` block, a tag, or a run of text. Each piece parser
//! hands back the unconsumed remainder, so the scan holds no state beyond the
//! text built so far.

use std::borrow::Cow;

use nom::branch::alt;
use nom::bytes::complete::{
    tag, tag_no_case, take, take_till1, take_until, take_while, take_while1,
};
use nom::character::complete::{alphanumeric1, digit1, hex_digit1, one_of, satisfy};
use nom::combinator::{map, map_opt, map_res, opt, peek, rest, value};
use nom::sequence::{preceded, terminated};
use nom::IResult;
use quick_xml::escape::resolve_html5_entity;

/// Closing one of these does not separate words: `don<b>'</b>t` stays `don't`.
const INLINE_TAGS: &[&str] = &[
    "a", "abbr", "acronym", "b", "cite", "em", "i", "label", "q", "span", "strong",
];

pub(crate) fn is_inline_tag(name: &str) -> bool {
    INLINE_TAGS.iter().any(|t| t.eq_ignore_ascii_case(name))
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Piece<'a> {
    Text(&'a str),
    Separator,
    Nothing,
}

/// Strips tags, comments and script blocks, decodes entities and collapses
/// whitespace. Never fails; unterminated markup ends the scan.
pub fn strip(fragment: &str) -> String {
    let mut plain = PlainText::with_capacity(fragment.len());
    let mut input = fragment;
    while !input.is_empty() {
        match piece(input) {
            Ok((remainder, piece)) => {
                plain.push(piece);
                input = remainder;
            }
            Err(_) => break,
        }
    }
    plain.finish()
}

struct PlainText {
    buf: String,
    pending_space: bool,
}

impl PlainText {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: String::with_capacity(capacity),
            pending_space: false,
        }
    }

    fn push(&mut self, piece: Piece<'_>) {
        match piece {
            Piece::Text(text) => {
                let decoded = decode_entities(text);
                for c in decoded.chars() {
                    self.push_char(c);
                }
            }
            Piece::Separator => self.separate(),
            Piece::Nothing => {}
        }
    }

    fn push_char(&mut self, c: char) {
        if c.is_whitespace() {
            self.separate();
            return;
        }
        if self.pending_space {
            self.buf.push(' ');
            self.pending_space = false;
        }
        self.buf.push(c);
    }

    // Spaces are only written in front of the next visible character, so the
    // result never starts or ends with one.
    fn separate(&mut self) {
        if !self.buf.is_empty() {
            self.pending_space = true;
        }
    }

    fn finish(self) -> String {
        self.buf
    }
}

fn is_stop(c: char) -> bool {
    c == '<' || c.is_whitespace()
}

fn piece(input: &str) -> IResult<&str, Piece<'_>> {
    alt((
        value(Piece::Separator, take_while1(char::is_whitespace)),
        comment,
        raw_text_element,
        markup_tag,
        map(take_till1(is_stop), Piece::Text),
        // A '<' that does not open a tag is just text.
        map(take(1usize), Piece::Text),
    ))(input)
}

fn comment(input: &str) -> IResult<&str, Piece<'_>> {
    let (input, _) = tag("<!--")(input)?;
    let (input, _) = alt((terminated(take_until("-->"), tag("-->")), rest))(input)?;
    Ok((input, Piece::Nothing))
}

fn raw_text_element(input: &str) -> IResult<&str, Piece<'_>> {
    let (after, _) = tag("<")(input)?;
    let (after, name) = alt((tag_no_case("script"), tag_no_case("style")))(after)?;
    let (_, _) = peek(satisfy(|c: char| c == '>' || c == '/' || c.is_whitespace()))(after)?;

    if let Some(gt) = after.find('>') {
        if after[..gt].trim_end().ends_with('/') {
            return Ok((&after[gt + 1..], Piece::Nothing));
        }
    }

    let closing = format!("</{}", name.to_ascii_lowercase());
    let remainder = match after.to_ascii_lowercase().find(&closing) {
        Some(at) => {
            let tail = &after[at..];
            tail.find('>').map_or("", |gt| &tail[gt + 1..])
        }
        None => "",
    };
    Ok((remainder, Piece::Nothing))
}

fn markup_tag(input: &str) -> IResult<&str, Piece<'_>> {
    let (input, _) = tag("<")(input)?;
    let (input, _) = peek(satisfy(|c: char| {
        c.is_ascii_alphabetic() || matches!(c, '/' | '!' | '?')
    }))(input)?;
    let (input, _) = opt(tag("/"))(input)?;
    let (input, name) = take_while(|c: char| c.is_ascii_alphanumeric())(input)?;
    let (input, _) = alt((terminated(take_until(">"), tag(">")), rest))(input)?;

    if is_inline_tag(name) {
        Ok((input, Piece::Nothing))
    } else {
        Ok((input, Piece::Separator))
    }
}

fn decode_entities(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }

    let mut decoded = String::with_capacity(text.len());
    let mut input = text;
    while let Some(at) = input.find('&') {
        decoded.push_str(&input[..at]);
        input = &input[at..];
        match entity(input) {
            Ok((remainder, text)) => {
                decoded.push_str(&text);
                input = remainder;
            }
            Err(_) => {
                decoded.push('&');
                input = &input[1..];
            }
        }
    }
    decoded.push_str(input);
    Cow::Owned(decoded)
}

fn entity(input: &str) -> IResult<&str, Cow<'static, str>> {
    preceded(
        tag("&"),
        terminated(alt((numeric_entity, named_entity)), tag(";")),
    )(input)
}

fn numeric_entity(input: &str) -> IResult<&str, Cow<'static, str>> {
    preceded(
        tag("#"),
        map(
            map_opt(
                alt((
                    preceded(
                        one_of("xX"),
                        map_res(hex_digit1, |h: &str| u32::from_str_radix(h, 16)),
                    ),
                    map_res(digit1, |d: &str| d.parse::<u32>()),
                )),
                char::from_u32,
            ),
            |c| Cow::Owned(c.to_string()),
        ),
    )(input)
}

// Some HTML5 names expand to more than one code point.
fn named_entity(input: &str) -> IResult<&str, Cow<'static, str>> {
    map(map_opt(alphanumeric1, resolve_html5_entity), Cow::Borrowed)(input)
}
