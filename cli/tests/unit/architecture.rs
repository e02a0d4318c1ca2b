//! Structural tests for architectural boundary enforcement.
//!
//! These tests scan source files to verify that the layer boundaries hold.

use std::path::{Path, PathBuf};

/// One source line, with where it came from and whether it sits in test code.
struct Line {
    file: String,
    number: usize,
    text: String,
    in_test: bool,
}

/// Every `.rs` file under `src/<layer>`, depth-first.
fn layer_files(layer: &str) -> Vec<PathBuf> {
    let mut pending = vec![Path::new(env!("CARGO_MANIFEST_DIR")).join("src").join(layer)];
    let mut files = Vec::new();
    while let Some(dir) = pending.pop() {
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };
        for path in entries.flatten().map(|e| e.path()) {
            if path.is_dir() {
                pending.push(path);
            } else if path.extension().is_some_and(|e| e == "rs") {
                files.push(path);
            }
        }
    }
    files.sort();
    files
}

/// Code lines of a layer. Comment lines are dropped; lines inside a
/// `#[cfg(test)]` item, or in a file named `tests.rs`, are flagged.
fn layer_lines(layer: &str) -> Vec<Line> {
    let root = Path::new(env!("CARGO_MANIFEST_DIR"));
    let mut lines = Vec::new();
    for path in layer_files(layer) {
        let Ok(content) = std::fs::read_to_string(&path) else {
            continue;
        };
        let file = path.strip_prefix(root).unwrap_or(&path).display().to_string();
        let test_file = path.file_name().is_some_and(|n| n == "tests.rs");
        // Brace depth at which the current `#[cfg(test)]` item started.
        let mut test_depth: Option<usize> = None;
        let mut depth = 0usize;
        for (i, raw) in content.lines().enumerate() {
            let trimmed = raw.trim();
            if trimmed.starts_with("#[cfg(test)]") && test_depth.is_none() {
                test_depth = Some(depth);
            }
            let in_test = test_file || test_depth.is_some();
            depth = (depth + raw.matches('{').count()).saturating_sub(raw.matches('}').count());
            if test_depth.is_some_and(|d| depth <= d && raw.contains('}')) {
                test_depth = None;
            }
            if trimmed.starts_with("//") || trimmed.starts_with("/*") || trimmed.starts_with('*') {
                continue;
            }
            lines.push(Line {
                file: file.clone(),
                number: i + 1,
                text: trimmed.to_string(),
                in_test,
            });
        }
    }
    lines
}

/// `file:line: text` for each code line of `layer` containing a forbidden pattern.
fn find_forbidden(layer: &str, forbidden: &[&str]) -> Vec<String> {
    layer_lines(layer)
        .into_iter()
        .filter(|l| forbidden.iter().any(|p| l.text.contains(p)))
        .map(|l| format!("{}:{}: {}", l.file, l.number, l.text))
        .collect()
}

#[test]
fn domain_performs_no_io() {
    let violations = find_forbidden(
        "domain",
        &[
            "crate::infra",
            "crate::application",
            "crate::commands",
            "crate::output",
            "tokio::",
            "std::fs::",
            "std::process::",
        ],
    );
    assert!(
        violations.is_empty(),
        "domain/ must stay pure:\n{}",
        violations.join("\n")
    );
}

#[test]
fn application_has_no_infra_or_output_imports() {
    let violations = find_forbidden(
        "application",
        &["crate::infra", "crate::output", "crate::commands"],
    );
    assert!(
        violations.is_empty(),
        "application/ must not import from infra/, output/ or commands/:\n{}",
        violations.join("\n")
    );
}

#[test]
fn application_reaches_the_host_only_through_ports() {
    let violations = find_forbidden(
        "application",
        &["std::fs::", "std::process::Command", "tokio::process", "ureq::"],
    );
    assert!(
        violations.is_empty(),
        "application/ must use port traits for I/O:\n{}",
        violations.join("\n")
    );
}

#[test]
fn infra_has_no_imports_from_commands_or_output() {
    let violations = find_forbidden("infra", &["crate::commands", "crate::output"]);
    assert!(
        violations.is_empty(),
        "infra/ must not import from commands/ or output/:\n{}",
        violations.join("\n")
    );
}

#[test]
fn infra_has_no_print_macros_outside_tests() {
    let violations: Vec<String> = layer_lines("infra")
        .into_iter()
        .filter(|l| !l.in_test && (l.text.contains("println!") || l.text.contains("eprintln!")))
        .map(|l| format!("{}:{}: {}", l.file, l.number, l.text))
        .collect();
    assert!(
        violations.is_empty(),
        "infra/ must report through tracing or ports, not print:\n{}",
        violations.join("\n")
    );
}

#[test]
fn test_modules_are_recognised() {
    // Guards the scanner itself: domain files carry in-file tests.
    let lines = layer_lines("domain");
    assert!(lines.iter().any(|l| l.in_test), "no #[cfg(test)] code found in domain/");
    assert!(lines.iter().any(|l| !l.in_test && l.text.contains("pub struct")));
}

/// No module-level `#![allow(dead_code)]` in domain/, application/, or infra/ layers.
#[test]
fn no_module_level_dead_code_allows_in_layers() {
    let mut violations = Vec::new();
    for layer in ["domain", "application", "infra"] {
        violations.extend(find_forbidden(layer, &["#![allow(dead_code)]"]));
    }
    assert!(
        violations.is_empty(),
        "layers must not blanket-allow dead code:\n{}",
        violations.join("\n")
    );
}
