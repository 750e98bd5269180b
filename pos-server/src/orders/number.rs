//! Order number generation
//!
//! Numbers embed a millisecond timestamp that is strictly increasing within the process,
//! so two orders created in the same millisecond still get distinct numbers.

use std::sync::atomic::{AtomicI64, Ordering};

use crate::utils::time::now_millis;

static LAST_MILLIS: AtomicI64 = AtomicI64::new(0);

/// Next strictly increasing millisecond stamp (≥ wall clock)
pub fn next_millis() -> i64 {
    let now = now_millis();
    let mut prev = LAST_MILLIS.load(Ordering::Relaxed);
    loop {
        let next = now.max(prev + 1);
        match LAST_MILLIS.compare_exchange_weak(prev, next, Ordering::AcqRel, Ordering::Relaxed) {
            Ok(_) => return next,
            Err(actual) => prev = actual,
        }
    }
}

/// POS order: `ORD-<millis>`
pub fn order_number() -> (String, i64) {
    let ms = next_millis();
    (format!("ORD-{ms}"), ms)
}

/// Credit order: `CREDIT-<millis>`
pub fn credit_order_number() -> (String, i64) {
    let ms = next_millis();
    (format!("CREDIT-{ms}"), ms)
}

/// Customer self-order: `T<table>-<millis>`
pub fn client_order_number(table_number: u32) -> (String, i64) {
    let ms = next_millis();
    (format!("T{table_number}-{ms}"), ms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_numbers_are_unique_under_burst() {
        let numbers: HashSet<String> = (0..1000).map(|_| order_number().0).collect();
        assert_eq!(numbers.len(), 1000);
    }

    #[test]
    fn test_prefixes() {
        assert!(order_number().0.starts_with("ORD-"));
        assert!(credit_order_number().0.starts_with("CREDIT-"));
        let (number, ms) = client_order_number(4);
        assert_eq!(number, format!("T4-{ms}"));
    }

    #[test]
    fn test_concurrent_generation() {
        let handles: Vec<_> = (0..4)
            .map(|_| std::thread::spawn(|| (0..250).map(|_| next_millis()).collect::<Vec<_>>()))
            .collect();
        let all: HashSet<i64> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        assert_eq!(all.len(), 1000);
    }
}
