//! Writing OpenType tables
//!
//! This crate compiles the handful of tables that change when a variable
//! font is instanced (`glyf`, `loca`, `hmtx`, `name`, `cvt `) and assembles
//! a set of tables into a binary font with [`FontBuilder`].

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

mod error;
mod font_builder;
pub mod tables;
mod write;

pub use error::{BuilderError, Error};
pub use font_builder::{compute_checksum, FontBuilder};
pub use write::{dump_table, FontWrite, TableWriter};

/// Public re-export of the fontmill-read crate.
pub extern crate fontmill_read as read;
/// Public re-export of the fontmill-types crate.
pub extern crate fontmill_types as types;
