// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `qmap functions` - list the built-in registry

use crate::demo;

pub fn functions() {
    for function in demo::registry().functions() {
        println!("{}", function);
    }
}
