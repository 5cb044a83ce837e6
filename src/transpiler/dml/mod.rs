//! Statement-kind renderers. Each takes the translator it writes into.

pub mod delete;
pub mod insert;
pub mod select;
pub mod update;
pub mod upsert;

pub use upsert::{MutationOperation, render_upsert};
