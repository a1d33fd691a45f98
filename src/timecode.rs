use crate::error::ParseError;

use nom::bytes::complete::take_while_m_n;
use nom::character::complete::{char, digit1};
use nom::combinator::{all_consuming, map_res};
use nom::IResult;

/// Decodes an `H+:MM:SS,mmm` clock token into seconds.
///
/// Hours and milliseconds may be of any width; the millisecond field is
/// always read as a count of thousandths, so `,5` is five milliseconds.
pub fn decode(token: &str) -> Result<f64, ParseError> {
    match all_consuming(clock)(token) {
        Ok((_, seconds)) => Ok(seconds),
        Err(_) => Err(ParseError::InvalidTimeCode {
            token: token.to_string(),
        }),
    }
}

fn clock(input: &str) -> IResult<&str, f64> {
    let (input, hours) = number(input)?;
    let (input, _) = char(':')(input)?;
    let (input, minutes) = two_digits(input)?;
    let (input, _) = char(':')(input)?;
    let (input, seconds) = two_digits(input)?;
    let (input, _) = char(',')(input)?;
    let (input, millis) = number(input)?;

    Ok((
        input,
        hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds as f64 + millis as f64 / 1000.0,
    ))
}

fn number(input: &str) -> IResult<&str, u64> {
    map_res(digit1, |s: &str| s.parse())(input)
}

fn two_digits(input: &str) -> IResult<&str, u64> {
    map_res(
        take_while_m_n(2, 2, |c: char| c.is_ascii_digit()),
        |s: &str| s.parse(),
    )(input)
}
