// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use std::cmp::Ordering;
use vitrine::natsort::natural_cmp;

#[derive(Arbitrary, Debug)]
struct Triple {
    a: String,
    b: String,
    c: String,
}

fuzz_target!(|t: Triple| {
    // Antisymmetry
    assert_eq!(natural_cmp(&t.a, &t.b), natural_cmp(&t.b, &t.a).reverse());
    assert_eq!(natural_cmp(&t.a, &t.a), Ordering::Equal);

    // Transitivity of <=
    if natural_cmp(&t.a, &t.b) != Ordering::Greater && natural_cmp(&t.b, &t.c) != Ordering::Greater {
        assert_ne!(natural_cmp(&t.a, &t.c), Ordering::Greater);
    }
});
