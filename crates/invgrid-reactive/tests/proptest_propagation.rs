//! Property-based tests for cell propagation.
//!
//! 1. A mapped cell equals `f(source)` before any later observer runs.
//! 2. Writing the current value notifies nobody.
//! 3. A cell combining two siblings of one root fires once per root write,
//!    with both sides settled.
//! 4. Writes to a bidirectional map land in the source through the inverse.
//! 5. Versions count exactly the value-changing writes.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use invgrid_reactive::{Observable, batch, combine2};
use proptest::prelude::*;

// ── Strategies ────────────────────────────────────────────────────────────

fn writes() -> impl Strategy<Value = Vec<i64>> {
    prop::collection::vec(-1_000i64..1_000, 1..40)
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Mapped value is settled before later observers
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn mapped_value_visible_to_later_observers(values in writes(), k in -50i64..50) {
        let source = Observable::new(0i64);
        let mapped = source.map(move |v| v * k + 1);
        let mismatches = Rc::new(Cell::new(0u32));

        let reader = mapped.clone();
        let counter = Rc::clone(&mismatches);
        let _sub = source.subscribe(move |v| {
            if reader.get() != v * k + 1 {
                counter.set(counter.get() + 1);
            }
        });

        for v in values {
            source.set(v).expect("writable");
            prop_assert_eq!(mapped.get(), v * k + 1);
        }
        prop_assert_eq!(mismatches.get(), 0);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Equal writes are silent
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn equal_write_notifies_nobody(start in any::<i64>(), repeats in 1usize..10) {
        let cell = Observable::new(start);
        let derived = cell.map(|v| v.wrapping_mul(3));
        let calls = Rc::new(Cell::new(0u32));

        let c1 = Rc::clone(&calls);
        let _a = cell.subscribe(move |_| c1.set(c1.get() + 1));
        let c2 = Rc::clone(&calls);
        let _b = derived.subscribe(move |_| c2.set(c2.get() + 1));

        for _ in 0..repeats {
            cell.set(start).expect("writable");
        }
        prop_assert_eq!(calls.get(), 0);
        prop_assert_eq!(cell.version(), 0);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Glitch-free combine
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn combine_of_siblings_fires_once(values in writes()) {
        let root = Observable::new(i64::MIN);
        let a = root.map(|v| v.wrapping_add(1));
        let b = root.map(|v| v.wrapping_mul(2));
        let combined = combine2(&a, &b, |x, y| (*x, *y));

        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        let _sub = combined.subscribe(move |pair| log.borrow_mut().push(*pair));

        let mut expected = Vec::new();
        let mut last = i64::MIN;
        for v in values {
            root.set(v).expect("writable");
            if v != last {
                expected.push((v.wrapping_add(1), v.wrapping_mul(2)));
                last = v;
            }
        }
        prop_assert_eq!(&*seen.borrow(), &expected);
    }

    #[test]
    fn batched_roots_fire_once(x in any::<i32>(), y in any::<i32>()) {
        let a = Observable::new(0i32);
        let b = Observable::new(0i32);
        let sum = combine2(&a, &b, |l, r| i64::from(*l) + i64::from(*r));
        let calls = Rc::new(Cell::new(0u32));
        let counter = Rc::clone(&calls);
        let _sub = sum.subscribe(move |_| counter.set(counter.get() + 1));

        batch(|| {
            a.set(x).expect("writable");
            b.set(y).expect("writable");
        });

        let expected_calls = u32::from(i64::from(x) + i64::from(y) != 0);
        prop_assert_eq!(calls.get(), expected_calls);
        prop_assert_eq!(sum.get(), i64::from(x) + i64::from(y));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Write-through two-way map
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn bidirectional_write_through(values in writes(), offset in -100i64..100) {
        let source = Observable::new(0i64);
        let shifted = source.map_bidirectional(move |v| v + offset, move |v| v - offset);

        for v in values {
            shifted.set(v).expect("writable");
            prop_assert_eq!(source.get(), v - offset);
            prop_assert_eq!(shifted.get(), v);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Version counting
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn version_counts_changes(values in writes()) {
        let cell = Observable::new(0i64);
        let mut changes = 0u64;
        let mut last = 0i64;
        for v in values {
            cell.set(v).expect("writable");
            if v != last {
                changes += 1;
                last = v;
            }
        }
        prop_assert_eq!(cell.version(), changes);
    }
}
