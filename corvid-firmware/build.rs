//! Build script for corvid-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates board.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;

const BUS_SECTIONS: [&str; 3] = ["i2c1", "i2c2", "i2c3"];
const BUS_KEYS: [&str; 3] = ["speed", "scl", "sda"];

fn main() {
    setup_linker();
    validate_board();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Reject board files the firmware's parser would refuse at boot
fn validate_board() {
    println!("cargo:rerun-if-changed=board.toml");

    let content = fs::read_to_string("board.toml")
        .unwrap_or_else(|e| panic!("\nERROR: failed to read board.toml: {}\n", e));

    let board: toml::Value = toml::from_str(&content)
        .unwrap_or_else(|e| panic!("\nERROR: invalid TOML in board.toml:\n{}\n", e));

    let table = match board.as_table() {
        Some(t) => t,
        None => panic!("\nERROR: board.toml must be a table\n"),
    };

    let mut errors = Vec::new();

    for (name, section) in table {
        if !BUS_SECTIONS.contains(&name.as_str()) {
            errors.push(format!("[{}] is not an I2C bus (expected i2c1..i2c3)", name));
            continue;
        }
        let section = match section.as_table() {
            Some(t) => t,
            None => {
                errors.push(format!("[{}] must be a table", name));
                continue;
            }
        };

        for (key, value) in section {
            if !BUS_KEYS.contains(&key.as_str()) {
                errors.push(format!("[{}] unknown key '{}'", name, key));
                continue;
            }
            let Some(value) = value.as_str() else {
                errors.push(format!("[{}] '{}' must be a string", name, key));
                continue;
            };
            match key.as_str() {
                "speed" if !["standard", "fast"].contains(&value) => {
                    errors.push(format!("[{}] speed must be 'standard' or 'fast'", name));
                }
                "scl" | "sda" if !is_pin(value) => {
                    errors.push(format!("[{}] {} = '{}' is not a pin like PB8", name, key, value));
                }
                _ => {}
            }
        }
    }

    if !errors.is_empty() {
        panic!(
            "\nERROR: invalid board.toml\n{}\n",
            errors
                .iter()
                .map(|e| format!("  • {}", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }
}

fn is_pin(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next() == Some('P')
        && chars.next().is_some_and(|c| "ABCDEH".contains(c))
        && chars.as_str().parse::<u8>().is_ok_and(|n| n <= 15)
}
