//! Build script - adds the esp-hal and defmt linker scripts to the firmware binary.
//!
//! Host builds (`cargo test`) never see the flag, so the library and its
//! tests link with the normal host toolchain.

use std::env;

fn main() {
    if env::var_os("CARGO_FEATURE_EMBEDDED").is_some() {
        println!("cargo:rustc-link-arg-bins=-Tlinkall.x");
        println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
    }
    println!("cargo:rerun-if-changed=build.rs");
}
