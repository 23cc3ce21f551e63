//! The various tables in the OpenType font format

pub mod avar;
pub mod cvar;
pub mod cvt;
pub mod fvar;
pub mod glyf;
pub mod gpos;
pub mod gvar;
pub mod head;
pub mod hhea;
pub mod hmtx;
pub mod layout;
pub mod loca;
pub mod maxp;
pub mod name;
pub mod post;
pub mod variations;
