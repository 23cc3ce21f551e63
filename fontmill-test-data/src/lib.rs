//! test data shared between the fontmill crates.
//!
//! Nothing here reads fonts: the builders write small, self-contained fonts
//! byte by byte so the readers can be checked against known layouts.

pub mod bebuffer;
pub mod kerning;
pub mod sfnt;
pub mod tables;
pub mod variable;

pub use kerning::kerning_font;
pub use variable::variable_font;
