//! Library wrapper around the `nova` CLI implementation.
//!
//! The binary (`src/main.rs`) is compiled as a module of this library so that
//! `cargo test -p nova-cli --lib` typechecks and unit-tests the CLI code
//! without building the integration suite.
//!
//! Note: `fn main()` inside `main.rs` is just another function when compiled as a module.

#[allow(dead_code)]
#[path = "main.rs"]
mod main_bin;
