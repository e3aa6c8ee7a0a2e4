// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    quiet = { 0, "warn" },
    verbose = { 1, "info" },
    debug = { 2, "debug" },
    trace = { 3, "trace" },
    beyond = { 9, "trace" },
)]
fn test_default_directive(verbose: u8, expected: &str) {
    assert_eq!(default_directive(verbose), expected);
}

#[test]
fn test_init_twice_is_harmless() {
    init(0);
    init(2);
}
