// src/spreadsheets/export_csv.rs
use crate::spreadsheets::{DealRow, ExportError};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

fn needs_quotes(field: &str, sep: char) -> bool {
    field.contains(sep) || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Write one delimited row. Fields holding the separator, quotes or line
/// breaks are quoted with embedded quotes doubled.
pub fn write_row<W: Write>(mut w: W, row: &[String], sep: char) -> std::io::Result<()> {
    let mut first = true;
    for cell in row {
        if !first {
            write!(w, "{sep}")?;
        } else {
            first = false;
        }
        if needs_quotes(cell, sep) {
            write!(w, "\"{}\"", cell.replace('"', "\"\""))?;
        } else {
            write!(w, "{cell}")?;
        }
    }
    writeln!(w)
}

/// Header line plus one line per deal.
pub fn write_deals<W: Write, T: DealRow>(mut w: W, deals: &[T], sep: char) -> std::io::Result<()> {
    let headers: Vec<String> = T::headers().iter().map(|h| h.to_string()).collect();
    write_row(&mut w, &headers, sep)?;

    for deal in deals {
        let row: Vec<String> = deal.cells().iter().map(|c| c.render()).collect();
        write_row(&mut w, &row, sep)?;
    }
    Ok(())
}

#[cfg(test)]
pub fn deals_to_csv_string<T: DealRow>(deals: &[T]) -> String {
    let mut buf: Vec<u8> = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = write_deals(&mut buf, deals, ',');
    String::from_utf8_lossy(&buf).into_owned()
}

pub fn save_deals_csv<T: DealRow>(path: &Path, deals: &[T]) -> Result<(), ExportError> {
    let mut w = BufWriter::new(File::create(path)?);
    write_deals(&mut w, deals, ',')?;
    w.flush()?;
    Ok(())
}
