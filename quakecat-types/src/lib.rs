//! # quakecat-types
//!
//! Plain data types shared by the quakecat seismic catalog and its callers.
//!
//! - **Regions**: `Region` (spherical circle or lat/lon rectangle) and its
//!   `RegionBounds` bounding box, used to filter catalog queries
//! - **Events**: `EventSummary`, an externally produced event description that
//!   can be turned into a catalog entry
//! - **Statistics**: `CatalogStats`, the aggregate figures collected while a
//!   catalog is loaded
//!
//! All types are serializable with Serde. Distance checks go through the `geo`
//! crate's haversine implementation.
//!
//! ## Examples
//!
//! ```rust
//! use quakecat_types::region::Region;
//!
//! // 50 km around Tokyo
//! let tokyo = Region::circle(35.68, 139.69, 50.0);
//! assert!(tokyo.contains(35.70, 139.70));
//! assert!(!tokyo.contains(34.69, 135.50)); // Osaka
//! ```

pub mod event;
pub mod region;
pub mod stats;
