use std::io::{self, Write};

use crate::models::solar::ProductionSample;

pub const CSV_HEADER: &str = "Timestamp,ghi,production";

/// Writes the production series as comma-separated text, one row per hour.
pub fn write_csv<W: Write>(samples: &[ProductionSample], mut out: W) -> io::Result<()> {
    writeln!(out, "{CSV_HEADER}")?;
    for s in samples {
        writeln!(
            out,
            "{},{},{}",
            s.timestamp.format("%Y-%m-%dT%H:%M:%S"),
            s.ghi,
            s.production_kwh
        )?;
    }
    out.flush()
}

pub fn to_csv_string(samples: &[ProductionSample]) -> io::Result<String> {
    let mut buf = Vec::with_capacity(32 * (samples.len() + 1));
    write_csv(samples, &mut buf)?;
    String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}
