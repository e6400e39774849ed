//! Store-level invariants that directory scans cannot enforce on their own.

use std::collections::BTreeMap;

/// Check the contiguity invariant over the chapter numbers found on disk:
/// - No duplicate numbers (e.g. `Chapter 2` and `chapter 2`)
/// - Numbers form `1..N` with no gaps
///
/// Returns human-readable violations; empty means the store is contiguous.
pub fn check_contiguity(numbers: &[u32]) -> Vec<String> {
    let mut errors = Vec::new();
    let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
    for &num in numbers {
        *counts.entry(num).or_default() += 1;
    }

    for (num, count) in &counts {
        if *count > 1 {
            errors.push(format!("chapter {num} appears {count} times"));
        }
    }

    let max = counts.keys().next_back().copied().unwrap_or(0);
    let missing: Vec<String> = (1..=max)
        .filter(|n| !counts.contains_key(n))
        .map(|n| n.to_string())
        .collect();
    if !missing.is_empty() {
        errors.push(format!(
            "chapters must be numbered 1..{max} without gaps; missing {}",
            missing.join(", ")
        ));
    }

    errors
}
