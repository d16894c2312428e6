//! Local seismic event catalog with binned spatial indexing and time-sorted cells.
//!
//! ## Features
//! - **Flat-text records**: one event per line, percent-encoded place text
//! - **Identity resolution**: primary ids beat aliases, earlier aliases beat later ones,
//!   repeated primary ids are dropped
//! - **Equal-area-ish grid**: latitude rows with a sine-scaled number of longitude cells
//! - **Queries**: circle / rectangle regions (date line aware), time window, depth and
//!   magnitude filters, with a visitor that can stop early
//! - **Shared cache**: one process-wide catalog keyed by its ordered source list
//!
//! ```rust
//! use quakecat::{Catalog, CatalogQuery, CatalogSource};
//! use quakecat_types::region::Region;
//!
//! let records = "\
//! us 7000a 1600000000000 6.1 38.3 142.4 29 2 us7000a jma01 off%20Honshu
//! ci 4000b 1600000100000 3.2 34.0 -118.2 8 1 ci4000b Los%20Angeles
//! ";
//! let catalog = Catalog::load(0, &[CatalogSource::inline("mem", records)])?;
//!
//! let query = CatalogQuery::new()
//!     .region(Region::circle(38.0, 142.0, 200.0))
//!     .min_magnitude(5.0);
//! let found = catalog.fetch_list(&query)?;
//! assert_eq!(found.len(), 1);
//! assert_eq!(found[0].place(), "off Honshu");
//! assert_eq!(catalog.lookup("jma01").unwrap().primary_id(), "us7000a");
//! # Ok::<(), quakecat::CatalogError>(())
//! ```

pub mod binning;
pub mod builder;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod entry;
pub mod error;
pub mod export;
pub mod identity;
pub mod report;

pub use builder::CatalogBuilder;
pub use cache::CatalogCache;
pub use catalog::{Catalog, CatalogQuery};
pub use config::{CatalogConfig, CatalogSource};
pub use entry::CatalogEntry;
pub use error::{CatalogError, Result};
pub use identity::{CollisionKind, EntryHandle, IdCollision, IdentityIndex, Registration};
pub use report::{DuplicateReport, scan_duplicates};

pub use quakecat_types::event::EventSummary;
pub use quakecat_types::region::{Region, RegionBounds};
pub use quakecat_types::stats::CatalogStats;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{Catalog, CatalogBuilder, CatalogError, CatalogQuery, Result};

    pub use crate::{CatalogConfig, CatalogEntry, CatalogSource};

    pub use crate::CatalogCache;

    pub use crate::{EventSummary, Region};

    pub use std::ops::ControlFlow;
}
