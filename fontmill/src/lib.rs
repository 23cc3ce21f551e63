//! Kerning extraction and static instancing for OpenType fonts.
//!
//! Fontmill sits on top of [`fontmill-read`](fontmill_read) and
//! [`fontmill-write`](fontmill_write) and does two things with a font:
//!
//! - flatten the pair adjustments of the `GPOS` `kern` feature into a map
//!   from glyph name pairs to values ([`KerningTable`]);
//! - build a static font from a TrueType variable font at any location in
//!   its design space ([`InstanceAssembler`]), storing the result so that
//!   each location is built at most once ([`CacheStore`]).
//!
//! # Example
//!
//! ```no_run
//! use fontmill::{Font, Location, Tag};
//!
//! let font = Font::open("MillSans-VF.ttf")?;
//! for (left, right, value) in font.kerning()?.iter() {
//!     println!("/{left} /{right} {value}");
//! }
//! let bold = font.instance(&Location::raw([(Tag::new(b"wght"), 700.0)]))?;
//! println!("{}", bold.path().unwrap_or_else(|| "".as_ref()).display());
//! # Ok::<_, fontmill::Error>(())
//! ```

#![forbid(unsafe_code)]

/// Expose the crates this one is built on.
pub extern crate fontmill_read as read;
pub extern crate fontmill_types as types;
pub extern crate fontmill_write as write;

mod axis;
mod cache;
mod cvt;
mod error;
mod font;
mod instance;
pub mod iup;
mod kerning;
mod location;
mod outline;
mod scalar;

pub use axis::{Axis, AxisTable};
pub use cache::{CacheKey, CacheStore, DirectoryCache, MemoryCache, INSTANCE_DIR};
pub use cvt::ControlValueInterpolator;
pub use error::{Diagnostic, Error};
pub use font::Font;
pub use instance::{InstanceAssembler, InstanceOptions, VARIATION_TABLES};
pub use kerning::{KerningTable, KerningValue, NamePair};
pub use location::{Location, Space};
pub use outline::{GlyphOutline, OutlineInterpolator};
pub use scalar::{AxisSupport, SupportRegion};

/// Type for a 4-byte tag used to identify font tables and axes.
pub type Tag = fontmill_types::Tag;

/// Type for a glyph identifier.
pub type GlyphId = fontmill_types::GlyphId;
