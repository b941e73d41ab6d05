//! Release version comparison.
//!
//! Release tags are dotted numeric strings with an optional `v` prefix.
//! Fields compare left-to-right; missing trailing fields count as zero,
//! and non-numeric fields (e.g. the `GA` in `13.1.1.GA`) also count as
//! zero.

use std::cmp::Ordering;

pub fn compare(a: &str, b: &str) -> Ordering {
    let a_fields = fields(a);
    let b_fields = fields(b);
    let len = a_fields.len().max(b_fields.len());

    for i in 0..len {
        let left = a_fields.get(i).copied().unwrap_or(0);
        let right = b_fields.get(i).copied().unwrap_or(0);
        match left.cmp(&right) {
            Ordering::Equal => {}
            other => return other,
        }
    }
    Ordering::Equal
}

/// Whether `latest` is strictly newer than `current`.
pub fn is_newer(latest: &str, current: &str) -> bool {
    compare(latest, current) == Ordering::Greater
}

fn fields(version: &str) -> Vec<u64> {
    version
        .trim()
        .trim_start_matches('v')
        .split('.')
        .map(|field| field.parse::<u64>().unwrap_or(0))
        .collect()
}
