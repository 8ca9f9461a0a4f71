#![no_main]

use libfuzzer_sys::fuzz_target;
use quality_report::model::{Dimension, Issue};
use quality_report::stats::aggregate_all;
use quality_report::tracker::wire::WireIssue;

fuzz_target!(|data: &[u8]| {
    let Ok(wire) = serde_json::from_slice::<Vec<WireIssue>>(data) else {
        return;
    };
    let issues: Vec<Issue> = wire.into_iter().map(Issue::from).collect();

    for dimension in [Dimension::Type, Dimension::Priority, Dimension::Subsystem] {
        let counts = aggregate_all(&issues, dimension);
        assert!(counts.values().sum::<usize>() <= issues.len());
    }
});
