#![no_main]

use arbitrary::Arbitrary;
use invgrid_reactive::{Observable, batch, combine2};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
enum Op {
    SetA(i16),
    SetB(i16),
    SetBoth(i16, i16),
    WriteDoubled(i16),
}

fuzz_target!(|ops: Vec<Op>| {
    let a = Observable::new(0i32);
    let b = Observable::new(0i32);
    let doubled = a.map_bidirectional(|v| v * 2, |v| v / 2);
    let sum = combine2(&doubled, &b, |d, b| d + b);
    let last = std::rc::Rc::new(std::cell::Cell::new(sum.get()));
    let seen = std::rc::Rc::clone(&last);
    let _sub = sum.subscribe(move |v| seen.set(*v));

    for op in ops.into_iter().take(256) {
        match op {
            Op::SetA(v) => a.set(i32::from(v)).expect("root is writable"),
            Op::SetB(v) => b.set(i32::from(v)).expect("root is writable"),
            Op::SetBoth(x, y) => batch(|| {
                a.set(i32::from(x)).expect("root is writable");
                b.set(i32::from(y)).expect("root is writable");
            }),
            Op::WriteDoubled(v) => doubled.set(i32::from(v)).expect("mapped both ways"),
        }
        assert_eq!(doubled.get(), a.get() * 2);
        assert_eq!(sum.get(), a.get() * 2 + b.get());
        assert_eq!(last.get(), sum.get());
    }
});
