// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Built-in functions available to `qmap worker`

use qmap_core::{FunctionRef, Registry};

pub fn registry() -> Registry {
    let mut registry = Registry::new();
    registry
        .register_fallible(FunctionRef::new("demo", "sum"), |values: Vec<i64>| {
            values
                .iter()
                .try_fold(0i64, |acc, v| acc.checked_add(*v))
                .ok_or("sum overflows i64")
        })
        .register_fallible(FunctionRef::new("demo", "square"), |x: i64| {
            x.checked_mul(x).ok_or("square overflows i64")
        })
        .register_fallible(FunctionRef::new("demo", "fail"), |message: String| {
            Err::<(), _>(message)
        });
    registry
}

#[cfg(test)]
#[path = "demo_tests.rs"]
mod tests;
