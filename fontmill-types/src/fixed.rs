//! fixed-point numerical types

use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

// shared between Fixed and F2Dot14
macro_rules! fixed_impl {
    ($name:ident, $bits:literal, $fract_bits:literal, $ty:ty, $raw:ty) => {
        #[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        #[doc = concat!(stringify!($bits), "-bit signed fixed point number with ", stringify!($fract_bits), " bits of fraction." )]
        pub struct $name($ty);

        impl $name {
            /// Minimum value.
            pub const MIN: Self = Self(<$ty>::MIN);

            /// Maximum value.
            pub const MAX: Self = Self(<$ty>::MAX);

            /// Zero.
            pub const ZERO: Self = Self(0);

            /// One.
            pub const ONE: Self = Self(1 << $fract_bits);

            const INT_MASK: $ty = !0 << $fract_bits;
            const FRACT_BITS: usize = $fract_bits;

            /// Creates a value from the raw bit pattern.
            pub const fn from_bits(bits: $ty) -> Self {
                Self(bits)
            }

            /// Returns the raw bit pattern.
            pub const fn to_bits(self) -> $ty {
                self.0
            }

            /// Returns the absolute value of the number.
            pub fn abs(self) -> Self {
                Self(self.0.abs())
            }

            /// Saturating addition.
            pub fn saturating_add(self, other: Self) -> Self {
                Self(self.0.saturating_add(other.0))
            }
        }

        impl Add for $name {
            type Output = Self;
            #[inline(always)]
            fn add(self, other: Self) -> Self {
                Self(self.0 + other.0)
            }
        }

        impl AddAssign for $name {
            fn add_assign(&mut self, other: Self) {
                *self = *self + other;
            }
        }

        impl Sub for $name {
            type Output = Self;
            #[inline(always)]
            fn sub(self, other: Self) -> Self {
                Self(self.0 - other.0)
            }
        }

        impl SubAssign for $name {
            fn sub_assign(&mut self, other: Self) {
                *self = *self - other;
            }
        }

        impl Neg for $name {
            type Output = Self;
            fn neg(self) -> Self {
                Self(-self.0)
            }
        }

        impl crate::raw::Scalar for $name {
            type Raw = $raw;

            fn to_raw(self) -> $raw {
                self.0.to_be_bytes()
            }

            #[inline(always)]
            fn from_raw(raw: $raw) -> Self {
                Self(<$ty>::from_be_bytes(raw))
            }
        }

        impl crate::raw::FixedSize for $name {
            const RAW_BYTE_LEN: usize = std::mem::size_of::<$raw>();
        }
    };
}

/// Float conversion methods.
///
/// Values go to `f64` so that every representable value round-trips.
macro_rules! float_conv {
    ($name:ident) => {
        impl $name {
            /// Creates a fixed point value from an `f64`.
            ///
            /// This operation is lossy; the float will be rounded to the nearest
            /// representable value and clamped to the representable range.
            pub fn from_f64(x: f64) -> Self {
                let scaled = (x * Self::ONE.0 as f64).round();
                Self(scaled.clamp(Self::MIN.0 as f64, Self::MAX.0 as f64) as _)
            }

            /// Returns the value as an `f64`.
            pub fn to_f64(self) -> f64 {
                let int = ((self.0 & Self::INT_MASK) >> Self::FRACT_BITS) as f64;
                let fract = (self.0 & !Self::INT_MASK) as f64 / Self::ONE.0 as f64;
                int + fract
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                self.to_f64().fmt(f)
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                self.to_f64().fmt(f)
            }
        }
    };
}

fixed_impl!(F2Dot14, 16, 14, i16, [u8; 2]);
fixed_impl!(Fixed, 32, 16, i32, [u8; 4]);
float_conv!(F2Dot14);
float_conv!(Fixed);

impl F2Dot14 {
    /// Convert to a 16.16 value.
    pub fn to_fixed(self) -> Fixed {
        Fixed(self.0 as i32 * 4)
    }
}

impl Fixed {
    /// Convert to a 2.14 value, rounding the extra fraction bits.
    pub fn to_f2dot14(self) -> F2Dot14 {
        F2Dot14(((self.0.wrapping_add(2)) >> 2).clamp(i16::MIN as i32, i16::MAX as i32) as i16)
    }
}

#[cfg(test)]
mod tests {
    #![allow(overflowing_literals)]
    use super::*;

    #[test]
    fn f2dot14_floats() {
        assert_eq!(F2Dot14(0x7fff), F2Dot14::from_f64(1.999939));
        assert_eq!(F2Dot14(0x7000), F2Dot14::from_f64(1.75));
        assert_eq!(F2Dot14(0x0001), F2Dot14::from_f64(0.0000610356));
        assert_eq!(F2Dot14(0x0000), F2Dot14::from_f64(0.0));
        assert_eq!(F2Dot14(0xffff), F2Dot14::from_f64(-0.000061));
        assert_eq!(F2Dot14(0x8000), F2Dot14::from_f64(-2.0));
    }

    #[test]
    fn roundtrip_f2dot14() {
        for i in i16::MIN..=i16::MAX {
            let val = F2Dot14(i);
            assert_eq!(val, F2Dot14::from_f64(val.to_f64()));
        }
    }

    #[test]
    fn fixed_floats() {
        assert_eq!(Fixed(0x7fff_0000), Fixed::from_f64(32767.));
        assert_eq!(Fixed(0x0001_0000), Fixed::from_f64(1.0));
        assert_eq!(Fixed(0x0000_0000), Fixed::from_f64(0.0));
        assert_eq!(Fixed(0xffff_0000), Fixed::from_f64(-1.0));
        assert_eq!(Fixed(0x7fff_ffff), Fixed::from_f64(32768.0));
    }

    #[test]
    fn fixed_f2dot14_conversion() {
        assert_eq!(F2Dot14::from_f64(0.5).to_fixed(), Fixed::from_f64(0.5));
        assert_eq!(Fixed::from_f64(-0.25).to_f2dot14(), F2Dot14::from_f64(-0.25));
    }
}
