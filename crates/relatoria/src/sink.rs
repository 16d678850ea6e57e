use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// A single result cell, decoupled from the database driver so the
/// sink can be unit-tested against an in-memory writer.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

/// Streaming CSV writer over any `io::Write`. Rows are written one at
/// a time; nothing is buffered beyond the underlying writer, so result
/// sets larger than memory stream through unchanged.
///
/// Quoting rules: textual cells are double-quoted with internal quotes
/// doubled; everything else is emitted bare. NULL renders as an empty
/// field, not a literal `null`.
pub struct CsvSink<W: Write> {
    out: W,
}

impl CsvSink<BufWriter<File>> {
    /// Creates (truncating) the output file at `path`.
    pub fn create(path: &Path) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> CsvSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Header tokens are static identifiers from the catalog, so they
    /// are emitted without quoting.
    pub fn write_header(&mut self, columns: &[&str]) -> io::Result<()> {
        writeln!(self.out, "{}", columns.join(","))
    }

    pub fn write_row(&mut self, cells: &[CellValue]) -> io::Result<()> {
        for (i, cell) in cells.iter().enumerate() {
            if i > 0 {
                self.out.write_all(b",")?;
            }
            self.write_cell(cell)?;
        }
        self.out.write_all(b"\n")
    }

    /// In-band error line for catalog and parameter failures, visible
    /// to whoever consumes the exported artifact.
    pub fn write_diagnostic(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.out, "{message}")
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    fn write_cell(&mut self, cell: &CellValue) -> io::Result<()> {
        match cell {
            CellValue::Null => Ok(()),
            CellValue::Integer(v) => write!(self.out, "{v}"),
            CellValue::Real(v) => write!(self.out, "{}", render_real(*v)),
            CellValue::Text(s) => write!(self.out, "\"{}\"", s.replace('"', "\"\"")),
            CellValue::Blob(bytes) => self.out.write_all(String::from_utf8_lossy(bytes).as_bytes()),
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

/// Matches SQLite's text conversion of REAL values (`%!.15g`):
/// 15 significant digits, trailing zeros stripped, the decimal point
/// always kept (`1500.0`), e-notation once the exponent leaves the
/// fixed-notation range (`1.0e+16`, `1.0e-05`).
fn render_real(v: f64) -> String {
    if v == 0.0 {
        return "0.0".to_string();
    }
    if !v.is_finite() {
        return format!("{v}");
    }

    let sci = format!("{v:.14e}");
    let (mantissa, exp_str) = match sci.split_once('e') {
        Some(parts) => parts,
        None => return sci,
    };
    let exp: i32 = match exp_str.parse() {
        Ok(exp) => exp,
        Err(_) => return sci,
    };

    if (-4..15).contains(&exp) {
        let frac_digits = (14 - exp).max(0) as usize;
        strip_trailing_zeros(format!("{:.*}", frac_digits, v))
    } else {
        let mantissa = strip_trailing_zeros(mantissa.to_string());
        format!("{mantissa}e{exp:+03}")
    }
}

/// Drops trailing fraction zeros but keeps the decimal point with at
/// least one digit after it.
fn strip_trailing_zeros(mut s: String) -> String {
    if s.contains('.') {
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.push('0');
        }
    } else {
        s.push_str(".0");
    }
    s
}
