//! Engine tests over the in-memory remote

use super::*;
use crate::catalog::find_stream;
use crate::config::Location;
use crate::sftp::MemoryFs;
use pretty_assertions::assert_eq;
use serde_json::json;

fn config(locations: &[&str]) -> TapConfig {
    TapConfig {
        sftp_host: "drops.example.com".to_string(),
        sftp_username: "extract".to_string(),
        sftp_port: 22,
        sftp_private_key: None,
        sftp_password: Some("secret".to_string()),
        locations: locations
            .iter()
            .map(|id| Location { id: id.to_string() })
            .collect(),
        start_date: None,
    }
}

fn engine(fs: &MemoryFs, locations: &[&str]) -> ExtractEngine<MemoryFs> {
    ExtractEngine::new(Arc::new(fs.clone()), config(locations))
}

const MENU_EXPORT: &str = r#"[
    {
        "guid": "m1",
        "name": "Lunch",
        "groups": [
            {"guid": "g1", "name": "Burgers", "items": [
                {"guid": "i1", "name": "Cheeseburger", "prices": [{"amount": 9.5, "currency": "USD"}]}
            ]}
        ]
    }
]"#;

#[tokio::test]
async fn test_csv_stream_end_to_end() {
    let fs = MemoryFs::new();
    fs.add_file(
        "/123456/20250601/OrderDetails.csv",
        "Order Id,Net Amount\n42,10.00\n43,\n",
    );
    fs.add_file("/654321/20250601/OrderDetails.csv", "Order Id,Net Amount\n77,5.00\n");

    let mut engine = engine(&fs, &["123456", "654321"]);
    let stream = find_stream("order_details").unwrap();
    let records = engine.extract_stream(stream).await.unwrap();

    assert_eq!(records.len(), 3);
    assert_eq!(records[0]["order_id"], json!("42"));
    assert_eq!(records[0]["location_id"], json!("123456"));
    assert_eq!(records[0]["date"], json!("20250601"));
    assert_eq!(records[1]["net_amount"], json!(null));
    assert_eq!(records[2]["location_id"], json!("654321"));

    assert_eq!(engine.stats().folders_processed, 2);
    assert_eq!(engine.stats().records_emitted, 3);
}

#[tokio::test]
async fn test_only_latest_date_folder_is_read() {
    let fs = MemoryFs::new();
    fs.add_file("/123456/20250601/OrderDetails.csv", "Order Id\nold\n");
    fs.add_file("/123456/20250602/OrderDetails.csv", "Order Id\nnew\n");

    let mut engine = engine(&fs, &["123456"]);
    let records = engine
        .extract_stream(find_stream("order_details").unwrap())
        .await
        .unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["order_id"], json!("new"));
    assert_eq!(fs.read_count("/123456/20250601/OrderDetails.csv"), 0);
}

#[tokio::test]
async fn test_start_date_cutoff_skips_stale_folder() {
    let fs = MemoryFs::new();
    fs.add_file("/123456/20250601/OrderDetails.csv", "Order Id\n42\n");

    let mut cfg = config(&["123456"]);
    cfg.start_date = chrono::NaiveDate::from_ymd_opt(2025, 7, 1);
    let mut engine = ExtractEngine::new(Arc::new(fs.clone()), cfg);

    let records = engine
        .extract_stream(find_stream("order_details").unwrap())
        .await
        .unwrap();
    assert!(records.is_empty());
    assert_eq!(engine.stats().folders_skipped, 1);
    assert_eq!(fs.read_count("/123456/20250601/OrderDetails.csv"), 0);
}

#[tokio::test]
async fn test_missing_file_degrades_to_empty() {
    let fs = MemoryFs::new();
    fs.add_dir("/123456/20250601");

    let mut engine = engine(&fs, &["123456"]);
    let records = engine
        .extract_stream(find_stream("payment_details").unwrap())
        .await
        .unwrap();

    assert!(records.is_empty());
    assert_eq!(engine.stats().files_missing, 1);
}

#[tokio::test]
async fn test_undecodable_file_is_skipped_not_fatal() {
    let fs = MemoryFs::new();
    fs.add_file("/123456/20250601/MenuExport_1.json", "not json at all");
    fs.add_file("/123456/20250601/MenuExport_2.json", MENU_EXPORT);

    let mut engine = engine(&fs, &["123456"]);
    let records = engine
        .extract_stream(find_stream("menu_menus").unwrap())
        .await
        .unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(engine.stats().files_failed, 1);
}

#[tokio::test]
async fn test_record_cache_prevents_repeat_extraction() {
    let fs = MemoryFs::new();
    fs.add_file("/123456/20250601/OrderDetails.csv", "Order Id\n42\n");

    let mut engine = engine(&fs, &["123456"]);
    let stream = find_stream("order_details").unwrap();
    engine.extract_stream(stream).await.unwrap();
    engine.extract_stream(stream).await.unwrap();

    assert_eq!(engine.stats().extractions, 1);
    assert_eq!(fs.read_count("/123456/20250601/OrderDetails.csv"), 1);
}

#[tokio::test]
async fn test_content_cache_shared_between_streams() {
    let fs = MemoryFs::new();
    fs.add_file("/123456/20250601/MenuExport_1.json", MENU_EXPORT);

    let mut engine = engine(&fs, &["123456"]);
    engine
        .extract_stream(find_stream("menu_menus").unwrap())
        .await
        .unwrap();
    engine
        .extract_stream(find_stream("menu_items").unwrap())
        .await
        .unwrap();
    engine
        .extract_stream(find_stream("menu_prices").unwrap())
        .await
        .unwrap();

    // Three streams, one transfer
    assert_eq!(fs.read_count("/123456/20250601/MenuExport_1.json"), 1);
    assert_eq!(engine.stats().extractions, 3);
}

#[tokio::test]
async fn test_flattened_streams_from_shared_export() {
    let fs = MemoryFs::new();
    fs.add_file("/123456/20250601/MenuExport_1.json", MENU_EXPORT);

    let mut engine = engine(&fs, &["123456"]);

    let menus = engine
        .extract_stream(find_stream("menu_menus").unwrap())
        .await
        .unwrap();
    assert_eq!(menus.len(), 1);
    assert!(!menus[0].contains_key("groups"));

    let items = engine
        .extract_stream(find_stream("menu_items").unwrap())
        .await
        .unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["menu_guid"], json!("m1"));
    assert_eq!(items[0]["group_guid"], json!("g1"));

    let prices = engine
        .extract_stream(find_stream("menu_prices").unwrap())
        .await
        .unwrap();
    assert_eq!(prices.len(), 1);
    assert_eq!(prices[0]["item_guid"], json!("i1"));
    assert_eq!(prices[0]["price_id"].as_str().unwrap().len(), 16);
}

#[tokio::test]
async fn test_child_contexts_scope_child_extraction() {
    let fs = MemoryFs::new();
    fs.add_file("/123456/20250601/MenuExport_1.json", MENU_EXPORT);

    let mut engine = engine(&fs, &["123456"]);
    let menus = find_stream("menu_menus").unwrap();
    let groups = find_stream("menu_groups").unwrap();

    let contexts = engine
        .child_contexts(menus, &Context::new())
        .await
        .unwrap();
    assert_eq!(contexts.len(), 1);
    assert_eq!(contexts[0].get("menu_guid").unwrap(), "m1");
    assert_eq!(contexts[0].get("location_id").unwrap(), "123456");
    // Ancestor identifiers only, never record payload
    assert!(!contexts[0].contains_key("name"));

    let records = engine
        .extract_with_context(groups, &contexts[0])
        .await
        .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["guid"], json!("g1"));

    // Non-flattened streams have no child contexts
    let orders = find_stream("order_details").unwrap();
    assert!(engine.child_contexts(orders, &Context::new()).await.is_err());
}

#[tokio::test]
async fn test_empty_file_counted_once_across_streams() {
    let fs = MemoryFs::new();
    fs.add_file("/123456/20250601/MenuExport_1.json", "");

    let mut engine = engine(&fs, &["123456"]);
    engine
        .extract_stream(find_stream("menu_menus").unwrap())
        .await
        .unwrap();
    engine
        .extract_stream(find_stream("menu_items").unwrap())
        .await
        .unwrap();

    // The second stream hits the content cache; the empty file is
    // counted and logged once
    assert_eq!(engine.stats().files_read, 1);
    assert_eq!(engine.stats().files_missing, 1);
    assert_eq!(fs.read_count("/123456/20250601/MenuExport_1.json"), 1);
}

#[test]
fn test_stats_accumulate_duration() {
    let mut stats = ExtractStats::new();
    stats.add_duration(1500);
    stats.add_duration(500);
    assert_eq!(stats.duration_ms, 2000);
}

#[tokio::test]
async fn test_latest_candidate_must_be_directory() {
    let fs = MemoryFs::new();
    fs.add_file("/123456/20250601/OrderDetails.csv", "Order Id\n42\n");
    // A stray file named like a newer date folder poisons resolution
    fs.add_file("/123456/20250602", "not a folder");

    let mut engine = engine(&fs, &["123456"]);
    let records = engine
        .extract_stream(find_stream("order_details").unwrap())
        .await
        .unwrap();

    assert!(records.is_empty());
    assert_eq!(engine.stats().folders_skipped, 1);
}
