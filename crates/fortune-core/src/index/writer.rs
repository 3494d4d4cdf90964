//! Index construction for quotation files
//!
//! Builds the same table that `DataTable::parse` decodes. Only run on request:
//! the loader never writes indexes.

use byteorder::{BigEndian, WriteBytesExt};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::{index_path_for, DataTable, DEFAULT_VERSION};
use crate::error::Result;

/// Scan quotation text and describe every non-empty quotation.
///
/// A delimiter line is a line holding only the delimiter byte. Quotation
/// lengths count the quotation's own bytes (trailing newline included), not
/// the delimiter line.
pub fn build_data_table(text: &[u8], delimiter: u8) -> DataTable {
    let mut offsets = Vec::new();
    let mut lengths = Vec::new();
    let mut start = 0usize;
    let mut line_start = 0usize;

    while line_start < text.len() {
        let line_end = text[line_start..]
            .iter()
            .position(|&b| b == b'\n')
            .map(|pos| line_start + pos + 1)
            .unwrap_or(text.len());

        if is_delimiter_line(&text[line_start..line_end], delimiter) {
            record(&mut offsets, &mut lengths, start, line_start - start);
            start = line_end;
        }
        line_start = line_end;
    }
    record(&mut offsets, &mut lengths, start, text.len() - start);

    offsets.push(text.len() as u32);

    DataTable {
        version: DEFAULT_VERSION,
        number_of_strings: lengths.len() as u32,
        longest_length: lengths.iter().copied().max().unwrap_or(0),
        shortest_length: lengths.iter().copied().min().unwrap_or(0),
        flags: 0,
        delimiter,
        offsets,
    }
}

fn is_delimiter_line(line: &[u8], delimiter: u8) -> bool {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    line == [delimiter]
}

fn record(offsets: &mut Vec<u32>, lengths: &mut Vec<u32>, start: usize, length: usize) {
    if length == 0 {
        return;
    }
    offsets.push(start as u32);
    lengths.push(length as u32);
}

/// Serialize a table in the on-disk layout
pub fn write_data_table<W: Write>(table: &DataTable, mut out: W) -> Result<()> {
    out.write_u32::<BigEndian>(table.version)?;
    out.write_u32::<BigEndian>(table.number_of_strings)?;
    out.write_u32::<BigEndian>(table.longest_length)?;
    out.write_u32::<BigEndian>(table.shortest_length)?;
    out.write_u32::<BigEndian>(table.flags)?;
    out.write_all(&[table.delimiter, 0, 0, 0])?;
    for offset in &table.offsets {
        out.write_u32::<BigEndian>(*offset)?;
    }
    out.flush()?;
    Ok(())
}

/// Build `<path>.dat` for a quotation file and return the table written
pub fn write_index_for(path: &Path, delimiter: u8) -> Result<DataTable> {
    let text = std::fs::read(path)?;
    let table = build_data_table(&text, delimiter);

    let index_path = index_path_for(path);
    let file = File::create(&index_path)?;
    write_data_table(&table, BufWriter::new(file))?;

    tracing::info!(
        "📝 Wrote index {} ({} quotations)",
        index_path.display(),
        table.number_of_strings
    );

    Ok(table)
}
