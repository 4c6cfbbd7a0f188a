//! Write TypeScript declarations for the wire types
//!
//! Usage: cargo run --features ts-rs --bin gen_types [OUT_FILE]
//! Default output: bindings/casegen.ts

use casegen::{Feature, GenerationResult, Project, ProjectDetail, TestCase, TestCaseType, User, TS};
use std::path::PathBuf;

fn main() {
    let out = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("bindings/casegen.ts"));

    let decls = [
        TestCaseType::decl(),
        TestCase::decl(),
        Feature::decl(),
        Project::decl(),
        ProjectDetail::decl(),
        User::decl(),
        GenerationResult::decl(),
    ];

    let mut contents = String::from("// Generated by gen_types. Do not edit.\n\n");
    for decl in decls {
        contents.push_str("export ");
        contents.push_str(&decl);
        contents.push_str("\n\n");
    }

    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Failed to create {}: {}", parent.display(), e);
                std::process::exit(1);
            }
        }
    }
    if let Err(e) = std::fs::write(&out, contents) {
        eprintln!("Failed to write {}: {}", out.display(), e);
        std::process::exit(1);
    }
    eprintln!("Wrote {}", out.display());
}
