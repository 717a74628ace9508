//! Properties of whole sessions over generated page sequences.

use std::sync::Arc;

use proptest::prelude::*;
use witsync::engine::MemorySink;
use witsync::Witsync;
use witsync_testkit::fixtures::{depth, depth_metadata, depth_page, log_ref, scripted};

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #[test]
    fn test_cursor_follows_last_row(gaps in prop::collection::vec(1u32..50, 1..12)) {
        let mut at = 1000u32;
        let depths: Vec<u32> = gaps.iter().map(|g| { at += g; at }).collect();
        let last = depths.len() - 1;
        let pages: Vec<String> = depths
            .iter()
            .enumerate()
            .map(|(i, d)| depth_page(i < last, &[&format!("{d}.0,1.0")]))
            .collect();

        let client = Arc::new(scripted(depth_metadata(1000.0, 1500.0, true), pages));
        let sink = Arc::new(MemorySink::new());
        let witsync = Witsync::new(client.clone(), sink.clone());

        let result = runtime()
            .block_on(witsync.synchronize(log_ref(), Some(depth(1000.0))))
            .unwrap();

        prop_assert!(result.is_success());
        prop_assert!(!result.requires_requery);
        prop_assert_eq!(result.queries, depths.len());
        prop_assert_eq!(result.final_cursor, Some(depth(f64::from(depths[last]))));

        let queries = runtime().block_on(client.queries());
        for pair in queries.windows(2) {
            prop_assert!(pair[0].start() < pair[1].start());
        }
        prop_assert_eq!(runtime().block_on(sink.len()), depths.len());
    }
}
