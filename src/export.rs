//! Fixed-width statistical export.
//!
//! One event per line:
//!
//! ```text
//! YYYY MM DD HH MM SS.ss LAT LON DEPTH MAG
//! ```
//!
//! Every field is right-aligned in a fixed column, so all lines have the same
//! length. Date and time fields are space-padded rather than zero-padded.
//! Seconds are truncated to hundredths. Latitude (7 wide) and longitude (8)
//! use three decimals, depth (6) one and magnitude (5) two; a positive value
//! takes a blank where the sign would go. There is no loader for this format.

use crate::catalog::Catalog;
use crate::entry::CatalogEntry;
use crate::error::{CatalogError, Result};
use chrono::{DateTime, Datelike, Timelike};
use std::io::Write;

/// Render one entry as an export line.
///
/// ```
/// use quakecat::CatalogEntry;
/// use quakecat::export::export_line;
///
/// let entry = CatalogEntry::parse("us 1 1262304005123 6.05 -3.25 -179.5 10 1 us1 -")?;
/// assert_eq!(export_line(&entry)?, "2010  1  1  0  0  5.12  -3.250 -179.500   10.0  6.05");
/// # Ok::<(), quakecat::CatalogError>(())
/// ```
pub fn export_line(entry: &CatalogEntry) -> Result<String> {
    let time = DateTime::from_timestamp_millis(entry.time_ms()).ok_or_else(|| {
        CatalogError::InvalidArgument(format!(
            "Event {} time {} ms is outside the representable range",
            entry.primary_id(),
            entry.time_ms()
        ))
    })?;

    // Truncate rather than round so 59.999 s never prints as 60.00
    let centis = time.second() * 100 + time.timestamp_subsec_millis() / 10;

    Ok(format!(
        "{:4} {:2} {:2} {:2} {:2} {:2}.{:02} {:7.3} {:8.3} {:6.1} {:5.2}",
        time.year(),
        time.month(),
        time.day(),
        time.hour(),
        time.minute(),
        centis / 100,
        centis % 100,
        entry.latitude(),
        entry.longitude(),
        entry.depth_km(),
        entry.magnitude()
    ))
}

/// Write every catalog entry as an export line, ordered by origin time.
///
/// Returns the number of lines written.
pub fn write_export<W: Write>(catalog: &Catalog, mut writer: W) -> Result<usize> {
    let mut entries: Vec<&CatalogEntry> = catalog.entries().iter().collect();
    entries.sort_by_key(|entry| entry.time_ms());

    for entry in &entries {
        let line = export_line(entry)?;
        writeln!(writer, "{}", line).map_err(|e| CatalogError::io("export output", e))?;
    }
    writer
        .flush()
        .map_err(|e| CatalogError::io("export output", e))?;

    log::info!("Exported {} events", entries.len());
    Ok(entries.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CatalogSource;

    #[test]
    fn test_export_line_layout() {
        let entry =
            CatalogEntry::parse("ci 3 1577836799999 2.345 34.05 -118.25 7.26 1 ci3 -").unwrap();
        assert_eq!(
            export_line(&entry).unwrap(),
            "2019 12 31 23 59 59.99  34.050 -118.250    7.3  2.35"
        );
    }

    #[test]
    fn test_export_before_epoch() {
        let entry = CatalogEntry::parse("xx 1 -1000 1 0 0 0 1 xx1 -").unwrap();
        assert_eq!(
            export_line(&entry).unwrap(),
            "1969 12 31 23 59 59.00   0.000    0.000    0.0  1.00"
        );
    }

    #[test]
    fn test_export_columns_line_up() {
        let lines: Vec<String> = [
            "us 1 1262304005123 6.05 -3.25 -179.5 10 1 us1 -",
            "us 2 1262304005123 6.05 12.25 9.5 100.5 1 us2 -",
            "us 3 1577836799999 -1.5 -89.999 0 700 1 us3 -",
            "us 4 0 0 0 180 0 1 us4 -",
        ]
        .iter()
        .map(|line| export_line(&CatalogEntry::parse(line).unwrap()).unwrap())
        .collect();

        for line in &lines {
            assert_eq!(line.len(), lines[0].len(), "{:?}", line);
        }
        assert_eq!(&lines[0][22..30], "  -3.250");
        assert_eq!(&lines[1][22..30], "  12.250");
        assert_eq!(&lines[0][30..39], " -179.500");
        assert_eq!(&lines[1][30..39], "    9.500");
        assert_eq!(&lines[2][39..46], "  700.0");
        assert_eq!(&lines[2][46..], " -1.50");
        assert_eq!(&lines[3][46..], "  0.00");
    }

    #[test]
    fn test_write_export_is_time_ordered_and_deduplicated() {
        let text = "\
us 2 2000 5 1 1 10 1 us2 -
us 1 1000 4 1 1 10 1 us1 -
us 1 3000 4 1 1 10 1 us1 -
";
        let catalog = Catalog::load(10, &[CatalogSource::inline("mem", text)]).unwrap();
        let mut out = Vec::new();
        let written = write_export(&catalog, &mut out).unwrap();
        assert_eq!(written, 2);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "1970  1  1  0  0  1.00   1.000    1.000   10.0  4.00");
        assert_eq!(lines[1], "1970  1  1  0  0  2.00   1.000    1.000   10.0  5.00");
    }
}
