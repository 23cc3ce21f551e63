//! The tables that are rebuilt when instancing a font

pub mod cvt;
pub mod glyf;
pub mod head;
pub mod hhea;
pub mod hmtx;
pub mod loca;
pub mod name;
