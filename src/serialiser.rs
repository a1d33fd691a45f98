use subread::CaptionEntry;

use std::io::{BufWriter, Write};

use anyhow::{Context, Result};

pub fn serialise<W: Write>(entries: &[CaptionEntry], output: W) -> Result<()> {
    let mut writer = BufWriter::new(output);
    write_entries(&mut writer, entries).context("Failed to write subtitles.")?;
    writer.flush().context("Failed to write subtitles.")?;
    Ok(())
}

fn write_entries<W: Write>(buf: &mut W, entries: &[CaptionEntry]) -> Result<()> {
    for entry in entries {
        write_entry(buf, entry)?;
    }
    Ok(())
}

fn write_entry<W: Write>(buf: &mut W, entry: &CaptionEntry) -> Result<()> {
    writeln!(buf, "{}", entry.sequence_index)?;
    write_ts(buf, entry.start_seconds)?;
    write!(buf, " --> ")?;
    write_ts(buf, entry.end_seconds)?;
    writeln!(buf)?;
    for line in &entry.lines {
        writeln!(buf, "{}", line)?;
    }
    writeln!(buf)?;
    Ok(())
}

fn write_ts<W: Write>(buf: &mut W, seconds: f64) -> Result<()> {
    // Negative and NaN offsets saturate to zero.
    let total_millis = (seconds * 1000.0).round() as u64;
    let total_secs = total_millis / 1000;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let secs = total_secs % 60;
    let millis = total_millis % 1000;
    write!(buf, "{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)?;
    Ok(())
}
