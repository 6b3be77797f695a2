//! Build script for the RP2040 firmware.
//!
//! Puts memory.x on the linker search path and adds the linker scripts
//! required by cortex-m-rt, embassy-rp and defmt.

use std::env;
use std::fs;
use std::path::PathBuf;

fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR is set by cargo"));

    fs::write(out_dir.join("memory.x"), include_bytes!("memory.x"))
        .expect("failed to copy memory.x to OUT_DIR");
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
}
