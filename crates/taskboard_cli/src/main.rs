//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `taskboard_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    println!("taskboard_core ping={}", taskboard_core::ping());
    println!("taskboard_core version={}", taskboard_core::core_version());
}
