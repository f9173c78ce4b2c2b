//! Merge Decked Builder `*.coll2` collection files.
//!
//! Each file lists card identifiers with regular and foil quantities.
//! [`collection::Collection`] sums the quantities of matching cards across
//! files and renders the result back as a single `*.coll2` document.

pub mod cli;
pub mod coll2;
pub mod collection;
pub mod error;
pub mod merge;
