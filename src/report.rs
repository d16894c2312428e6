//! Offline duplicate reporting.
//!
//! Scans sources the way a load would, but without resolving conflicts: no
//! entry ever loses an alias. The result lists
//!
//! - the *skip list*: records whose primary id repeats an earlier primary id
//!   (a load silently drops these), and
//! - *cross-event collisions*: ids claimed by two different events.

use crate::catalog::for_each_record;
use crate::config::CatalogSource;
use crate::error::Result;
use crate::identity::{CollisionKind, IdCollision, IdentityIndex, Registration};
use std::fmt;

/// A record skipped because its primary id was already loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    pub id: String,
    pub source_name: String,
    /// 1-based line number within the source
    pub line: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DuplicateReport {
    /// Records read, including skipped ones
    pub records_scanned: usize,
    pub skipped: Vec<SkippedRecord>,
    pub collisions: Vec<IdCollision>,
}

impl DuplicateReport {
    /// Primary ids of skipped records, in the order they were met.
    pub fn skip_list(&self) -> impl Iterator<Item = &str> {
        self.skipped.iter().map(|record| record.id.as_str())
    }

    /// Ids claimed by more than one event.
    pub fn cross_event_collisions(&self) -> impl Iterator<Item = &IdCollision> {
        self.collisions
            .iter()
            .filter(|collision| collision.kind == CollisionKind::CrossEvent)
    }

    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty() && self.collisions.is_empty()
    }
}

impl fmt::Display for IdCollision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            CollisionKind::PrimaryDuplicate => write!(f, "{} duplicate primary id", self.id),
            CollisionKind::CrossEvent => write!(
                f,
                "{} held by {} also claimed by {}",
                self.id, self.existing_primary, self.incoming_primary
            ),
        }
    }
}

/// Scan `sources` in order and report duplicate and colliding ids.
pub fn scan_duplicates(sources: &[CatalogSource]) -> Result<DuplicateReport> {
    let mut index = IdentityIndex::new();
    let mut report = DuplicateReport::default();

    for source in sources {
        let name = source.name();
        for_each_record(source, |line, entry| {
            report.records_scanned += 1;
            if let Registration::Duplicate(id) =
                index.register_identities_report(entry, &mut report.collisions)
            {
                report.skipped.push(SkippedRecord {
                    id,
                    source_name: name.clone(),
                    line,
                });
            }
            Ok(())
        })?;
    }

    log::info!(
        "Scanned {} records: {} duplicates, {} cross-event collisions",
        report.records_scanned,
        report.skipped.len(),
        report.cross_event_collisions().count()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_reports_both_kinds() {
        let first = "\
us 1 100 4 0 0 10 2 p1 s1 -
us 2 200 4 0 0 10 1 p2 -
";
        let second = "\
us 3 300 4 0 0 10 2 p3 s1 -
us 1 400 4 0 0 10 1 p1 -
";
        let report = scan_duplicates(&[
            CatalogSource::inline("first", first),
            CatalogSource::inline("second", second),
        ])
        .unwrap();

        assert_eq!(report.records_scanned, 4);
        assert_eq!(report.skip_list().collect::<Vec<_>>(), vec!["p1"]);
        assert_eq!(
            report.skipped[0],
            SkippedRecord {
                id: "p1".to_string(),
                source_name: "second".to_string(),
                line: 2,
            }
        );

        let cross: Vec<String> = report
            .cross_event_collisions()
            .map(ToString::to_string)
            .collect();
        assert_eq!(cross, vec!["s1 held by p1 also claimed by p3"]);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_clean_scan() {
        let text = "us 1 100 4 0 0 10 1 a1 -\nus 2 200 4 0 0 10 1 a2 -\n";
        let report = scan_duplicates(&[CatalogSource::inline("mem", text)]).unwrap();
        assert!(report.is_clean());
        assert_eq!(report.records_scanned, 2);
    }
}
