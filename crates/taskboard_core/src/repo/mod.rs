//! Repository layer: board persistence contracts and the owning repository.
//!
//! # Responsibility
//! - Define the persistence adapter contract (`BoardStore`) and its SQLite
//!   implementation.
//! - Own the single in-memory board aggregate and every mutation applied to
//!   it (`BoardRepository`).
//!
//! # Invariants
//! - Every successful mutation triggers a persistence write.
//! - Mutations are all-or-nothing against the in-memory board; validation
//!   happens before anything is touched.

pub mod board_repository;
pub mod board_store;
