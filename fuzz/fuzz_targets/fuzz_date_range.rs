#![no_main]

use libfuzzer_sys::fuzz_target;
use quality_report::model::DateRange;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(range) = text.parse::<DateRange>() {
        assert!(range.start() <= range.end());
        if let Ok(reparsed) = range.to_string().parse::<DateRange>() {
            assert_eq!(reparsed, range);
        }
    }
});
