//! Writers for assembled records.
//!
//! - [`genbank`]: GenBank flat files via gb-io

pub mod genbank;
