// src/summary/mod.rs
//
// Plain-text numeric summary plus the Markdown narratives built on top of
// it (see `narrative`).

pub mod narrative;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::Result;

/// Significant digits used for every reported scalar.
pub const SIG_DIGITS: usize = 6;

/// Ordered list of labeled results of one analysis.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryRecord {
    entries: Vec<(String, String)>,
}

impl SummaryRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, label: impl Into<String>, value: impl Into<String>) {
        self.entries.push((label.into(), value.into()));
    }

    /// Push a number formatted with [`SIG_DIGITS`] significant digits.
    pub fn push_scalar(&mut self, label: impl Into<String>, value: f64) {
        self.push(label, format_g(value, SIG_DIGITS));
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(l, v)| (l.as_str(), v.as_str()))
    }

    /// One ` - label = value` line per entry.
    pub fn lines(&self) -> Vec<String> {
        self.entries()
            .map(|(label, value)| format!(" - {label} = {value}"))
            .collect()
    }

    /// Write [`SummaryRecord::lines`] to `path`, replacing any previous file.
    pub fn write_text(&self, path: &Path) -> Result<()> {
        let mut w = BufWriter::new(File::create(path)?);
        for line in self.lines() {
            writeln!(w, "{}", line.trim_end())?;
        }
        w.flush()?;
        Ok(())
    }
}

/// Lines of a previously written summary, trailing blank lines dropped.
pub fn read_text(path: &Path) -> Result<Vec<String>> {
    let text = fs::read_to_string(path)?;
    Ok(text.trim_end().lines().map(str::to_string).collect())
}

/// `printf("%.{sig}g")`-style formatting.
///
/// Fixed notation for decimal exponents in `[-4, sig)`, scientific
/// otherwise; trailing zeros are removed in both cases.
pub fn format_g(value: f64, sig: usize) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }

    let sig = sig.max(1);
    // Rounding to `sig` digits can bump the exponent (9.9999996 -> 10), so
    // take it from the rounded scientific form.
    let sci = format!("{:.*e}", sig - 1, value);
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };

    if exp >= -4 && exp < sig as i32 {
        let decimals = (sig as i32 - 1 - exp).max(0) as usize;
        strip_zeros(&format!("{:.*}", decimals, value)).to_string()
    } else {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", strip_zeros(mantissa), sign, exp.abs())
    }
}

fn strip_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_g_matches_printf() {
        assert_eq!(format_g(1.0, 6), "1");
        assert_eq!(format_g(0.1, 6), "0.1");
        assert_eq!(format_g(1.23456789, 6), "1.23457");
        assert_eq!(format_g(-2.5, 6), "-2.5");
        assert_eq!(format_g(123456.0, 6), "123456");
        assert_eq!(format_g(1234567.0, 6), "1.23457e+06");
        assert_eq!(format_g(0.0001, 6), "0.0001");
        assert_eq!(format_g(0.00001234, 6), "1.234e-05");
        assert_eq!(format_g(9.9999996, 6), "10");
        assert_eq!(format_g(0.0, 6), "0");
        assert_eq!(format_g(f64::NAN, 6), "nan");
    }

    #[test]
    fn record_keeps_insertion_order() {
        let mut r = SummaryRecord::new();
        r.push_scalar("rho0 (mean at t=0)", 1.0);
        r.push_scalar("B0 (mean of Bz at t=0)", 0.5);
        r.push("regime", "sub-Alfvenic (M_A < 1)");
        assert_eq!(
            r.lines(),
            vec![
                " - rho0 (mean at t=0) = 1",
                " - B0 (mean of Bz at t=0) = 0.5",
                " - regime = sub-Alfvenic (M_A < 1)",
            ]
        );
    }

    #[test]
    fn text_round_trips_through_disk_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.txt");
        fs::write(&path, "stale\ncontent\nfrom before\n").unwrap();

        let mut r = SummaryRecord::new();
        r.push_scalar("v_A", 2.0);
        r.write_text(&path).unwrap();

        assert_eq!(read_text(&path).unwrap(), vec![" - v_A = 2"]);
    }
}
