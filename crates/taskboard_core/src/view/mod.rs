//! View layer: projection of the board into renderable state.
//!
//! # Responsibility
//! - Project repository state into a view model the host UI can paint.
//! - Route form submissions and per-card affordances back into repository
//!   operations.
//!
//! # Invariants
//! - The view is always derived from the repository, never read back from
//!   rendered output.

pub mod renderer;
