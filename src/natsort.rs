// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Natural, case-insensitive ordering of filenames
//!
//! Runs of ASCII digits compare by numeric value, everything else compares
//! character by character after lowercasing, so `img2.png` sorts before
//! `img10.png` and `Logo.svg` sits next to `logo.png`.

use std::cmp::Ordering;
use std::iter::Peekable;
use std::str::Chars;

/// Compare two strings the way a file browser would
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    match natural_cmp_loose(a, b) {
        // Break ties so the order is total and stable across runs
        Ordering::Equal => a.cmp(b),
        ord => ord,
    }
}

/// Sort a list of names in place with [`natural_cmp`]
pub fn natural_sort(names: &mut [String]) {
    names.sort_by(|a, b| natural_cmp(a, b));
}

fn natural_cmp_loose(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();

    loop {
        skip_whitespace(&mut left);
        skip_whitespace(&mut right);

        let (l, r) = match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) => (l, r),
        };

        if l.is_ascii_digit() && r.is_ascii_digit() {
            let l_run = take_digits(&mut left);
            let r_run = take_digits(&mut right);
            let ord = compare_numeric(&l_run, &r_run);
            if ord != Ordering::Equal {
                return ord;
            }
            continue;
        }

        let ord = l.to_lowercase().cmp(r.to_lowercase());
        if ord != Ordering::Equal {
            return ord;
        }
        left.next();
        right.next();
    }
}

fn skip_whitespace(it: &mut Peekable<Chars<'_>>) {
    while it.peek().is_some_and(|c| c.is_whitespace()) {
        it.next();
    }
}

fn take_digits(it: &mut Peekable<Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(c) = it.peek().copied().filter(char::is_ascii_digit) {
        run.push(c);
        it.next();
    }
    run
}

/// Compare digit runs by value without parsing, so arbitrarily long runs work
fn compare_numeric(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}
