//! Per-dialect descriptor presets.

pub mod ansi;
pub mod h2;
pub mod mysql;
pub mod oracle;
pub mod postgres;
pub mod sqlite;
pub mod sqlserver;
