use quakecat::prelude::*;
use quakecat::export::export_line;

const NOW: i64 = 1_700_000_000_000;

fn entry(id: &str, time_ms: i64, lat: f64, lon: f64) -> CatalogEntry {
    CatalogEntry::from_event(&EventSummary::new(id, time_ms, 4.0, lat, lon, 10.0))
        .expect("Failed to build entry")
}

fn ids(catalog: &Catalog, query: &CatalogQuery) -> Vec<String> {
    let mut ids: Vec<String> = catalog
        .fetch_list(query)
        .expect("Query failed")
        .iter()
        .map(|e| e.primary_id().to_string())
        .collect();
    ids.sort();
    ids
}

/// Test 1: Large dataset stress test
#[test]
fn test_large_dataset_load_and_query() {
    let catalog = Catalog::from_entries(
        0,
        (0..10_000).map(|i| {
            let lat = 40.0 + (i as f64 * 0.0001);
            let lon = -74.0 + (i as f64 * 0.0001);
            entry(&format!("ny{}", i), NOW - i, lat, lon)
        }),
    );
    assert_eq!(catalog.len(), 10_000);

    let query = CatalogQuery::new().region(Region::circle(40.0, -74.0, 1.0));
    let results = catalog.fetch_list(&query).expect("Query failed");
    assert!(!results.is_empty());
    assert!(results.len() < 10_000);
}

/// Test 2: Extreme coordinate values
#[test]
fn test_extreme_coordinates() {
    let catalog = Catalog::from_entries(
        0,
        vec![
            entry("np", NOW - 4, 90.0, 0.0),
            entry("sp", NOW - 3, -90.0, 0.0),
            entry("dw", NOW - 2, 0.0, 180.0),
            entry("de", NOW - 1, 0.0, -180.0),
        ],
    );
    // -180 normalizes onto 180
    assert_eq!(catalog.lookup("de").unwrap().longitude(), 180.0);

    let north = CatalogQuery::new().region(Region::circle(89.9, 120.0, 100.0));
    assert_eq!(ids(&catalog, &north), vec!["np"]);

    let south = CatalogQuery::new().region(Region::rectangle(-90.0, -89.0, -180.0, 180.0));
    assert_eq!(ids(&catalog, &south), vec!["sp"]);

    let date_line = CatalogQuery::new().region(Region::circle(0.0, -179.9, 50.0));
    assert_eq!(ids(&catalog, &date_line), vec!["de", "dw"]);
}

/// Test 3: Tiny grids still work
#[test]
fn test_single_row_grid() {
    let catalog = Catalog::from_entries(
        1,
        vec![entry("a1", NOW - 2, -45.0, -90.0), entry("a2", NOW - 1, 45.0, 90.0)],
    );
    assert_eq!(catalog.bin_count(), 1);
    assert_eq!(catalog.stats().cell_count, 2);

    let query = CatalogQuery::new().region(Region::rectangle(0.0, 90.0, 0.0, 180.0));
    assert_eq!(ids(&catalog, &query), vec!["a2"]);
}

/// Test 4: Empty catalog queries
#[test]
fn test_empty_catalog_queries() {
    let catalog = Catalog::load(0, &[CatalogSource::inline("empty", "\n\n")])
        .expect("Load should not fail");
    assert!(catalog.is_empty());
    assert_eq!(catalog.count(&CatalogQuery::new()).unwrap(), 0);
    assert_eq!(catalog.stats().histogram_total(), 0);
    assert_eq!(catalog.stats().time_range, None);
}

/// Test 5: Ties in time keep load order inside a cell
#[test]
fn test_equal_times_keep_load_order() {
    let catalog = Catalog::from_entries(
        20,
        vec![
            entry("t3", NOW, 5.0, 5.0),
            entry("t1", NOW - 1, 5.0, 5.0),
            entry("t2", NOW, 5.0, 5.0),
        ],
    );
    let (row, col) = catalog.scheme().cell_of(5.0, 5.0);
    let order: Vec<&str> = catalog.cell(row, col).map(|e| e.primary_id()).collect();
    assert_eq!(order, vec!["t1", "t3", "t2"]);
}

/// Test 6: Deep and far-flung events
#[test]
fn test_event_construction_limits() {
    let too_deep = EventSummary::new("dd1", 0, 5.0, 0.0, 0.0, 750.0);
    assert!(matches!(
        CatalogEntry::from_event(&too_deep),
        Err(CatalogError::InvalidArgument(_))
    ));

    let wrapped = CatalogEntry::from_event(&EventSummary::new("ww1", 0, 5.0, -91.0, 725.0, 3.0))
        .expect("Should clamp and wrap");
    assert_eq!(wrapped.latitude(), -90.0);
    assert_eq!(wrapped.longitude(), 5.0);
    assert_eq!(export_line(&wrapped).unwrap(), "1970  1  1  0  0  0.00 -90.000    5.000    3.0  5.00");
}

/// Test 7: Early stop with a visitor
#[test]
fn test_visitor_early_stop() {
    let catalog = Catalog::from_entries(0, (0..100).map(|i| entry(&format!("vv{}", i), NOW - i, 0.0, 0.0)));
    let mut seen = 0;
    let flow = catalog
        .visit(&CatalogQuery::new(), |e| {
            seen += 1;
            if seen == 10 {
                ControlFlow::Break(e.time_ms())
            } else {
                ControlFlow::Continue(())
            }
        })
        .unwrap();

    // One cell, time ascending: the tenth visit is the tenth oldest event
    assert_eq!(flow, ControlFlow::Break(NOW - 90));
    assert_eq!(seen, 10);
}
