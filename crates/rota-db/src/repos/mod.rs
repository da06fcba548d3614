//! Repository modules implementing the core operations.
//!
//! Each module adds methods to `RotaService` via `impl RotaService` blocks.
//! Transaction-scoped building blocks (insert/delete + audit append on an
//! explicit scope) are free functions so the derivation engine can compose
//! them inside one outer transaction.

pub mod audit;
pub mod conflict;
pub mod derive;
pub mod event;
pub mod template;
