//! OpenType font variations common tables.
//!
//! This module decodes the [tuple variation store][store] shared by the
//! `gvar` and `cvar` tables.
//!
//! [store]: https://learn.microsoft.com/en-us/typography/opentype/spec/otvarcommonformats#tuple-variation-store

use types::{BigEndian, F2Dot14, FixedSize, Scalar};

use crate::{Cursor, FontData, ReadError};

/// The 'tupleIndex' field of a [tuple variation header][header].
///
/// [header]: https://learn.microsoft.com/en-us/typography/opentype/spec/otvarcommonformats#tuplevariationheader
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TupleIndex(u16);

impl TupleIndex {
    /// Flag indicating that this tuple variation header includes an embedded
    /// peak tuple record, immediately after the tupleIndex field.
    ///
    /// If set, the low 12 bits of the tupleIndex value are ignored.
    ///
    /// Note that this must always be set within the 'cvar' table.
    pub const EMBEDDED_PEAK_TUPLE: u16 = 0x8000;

    /// Flag indicating that this tuple variation table applies to an
    /// intermediate region within the variation space.
    pub const INTERMEDIATE_REGION: u16 = 0x4000;

    /// Flag indicating that the serialized data for this tuple variation table
    /// includes packed "point" number data.
    pub const PRIVATE_POINT_NUMBERS: u16 = 0x2000;

    /// Mask for the low 12 bits to give the shared tuple records index.
    pub const TUPLE_INDEX_MASK: u16 = 0x0FFF;

    pub fn bits(self) -> u16 {
        self.0
    }

    pub fn from_bits(bits: u16) -> Self {
        TupleIndex(bits)
    }

    /// `true` if the header includes an embedded peak tuple.
    pub fn embedded_peak_tuple(self) -> bool {
        (self.0 & Self::EMBEDDED_PEAK_TUPLE) != 0
    }

    /// `true` if the header includes the two intermediate region tuple records.
    pub fn intermediate_region(self) -> bool {
        (self.0 & Self::INTERMEDIATE_REGION) != 0
    }

    /// `true` if the data for this table includes packed point number data.
    pub fn private_point_numbers(self) -> bool {
        (self.0 & Self::PRIVATE_POINT_NUMBERS) != 0
    }

    pub fn tuple_records_index(self) -> Option<u16> {
        (!self.embedded_peak_tuple()).then_some(self.0 & Self::TUPLE_INDEX_MASK)
    }
}

impl Scalar for TupleIndex {
    type Raw = <u16 as Scalar>::Raw;
    fn to_raw(self) -> Self::Raw {
        self.0.to_raw()
    }
    fn from_raw(raw: Self::Raw) -> Self {
        Self(u16::from_raw(raw))
    }
}

/// The 'tupleVariationCount' field of the [Tuple Variation Store Header][header]
///
/// The high 4 bits are flags, and the low 12 bits are the number of tuple
/// variation tables.
///
/// [header]: https://learn.microsoft.com/en-us/typography/opentype/spec/otvarcommonformats#tuple-variation-store-header
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TupleVariationCount(u16);

impl TupleVariationCount {
    /// Flag indicating that some or all tuple variation tables reference a
    /// shared set of "point" numbers.
    pub const SHARED_POINT_NUMBERS: u16 = 0x8000;

    /// Mask for the low 12 bits to give the number of tuple variation tables.
    pub const COUNT_MASK: u16 = 0x0FFF;

    pub fn bits(self) -> u16 {
        self.0
    }

    pub fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    /// `true` if any tables reference a shared set of point numbers
    pub fn shared_point_numbers(self) -> bool {
        (self.0 & Self::SHARED_POINT_NUMBERS) != 0
    }

    pub fn count(self) -> u16 {
        self.0 & Self::COUNT_MASK
    }
}

impl Scalar for TupleVariationCount {
    type Raw = <u16 as Scalar>::Raw;
    fn to_raw(self) -> Self::Raw {
        self.0.to_raw()
    }
    fn from_raw(raw: Self::Raw) -> Self {
        Self(u16::from_raw(raw))
    }
}

/// A coordinate in normalized variation space, one value per axis.
#[derive(Clone, Copy, Debug, Default)]
pub struct Tuple<'a> {
    values: &'a [BigEndian<F2Dot14>],
}

impl<'a> Tuple<'a> {
    pub fn new(values: &'a [BigEndian<F2Dot14>]) -> Self {
        Tuple { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<F2Dot14> {
        self.values.get(idx).map(BigEndian::get)
    }

    pub fn values(&self) -> impl Iterator<Item = F2Dot14> + 'a {
        self.values.iter().map(BigEndian::get)
    }
}

/// A [tuple variation header][header].
///
/// [header]: https://learn.microsoft.com/en-us/typography/opentype/spec/otvarcommonformats#tuplevariationheader
#[derive(Clone, Debug)]
pub struct TupleVariationHeader<'a> {
    variation_data_size: u16,
    tuple_index: TupleIndex,
    peak_tuple: Option<Tuple<'a>>,
    intermediate: Option<(Tuple<'a>, Tuple<'a>)>,
}

impl<'a> TupleVariationHeader<'a> {
    fn read(cursor: &mut Cursor<'a>, axis_count: u16) -> Result<Self, ReadError> {
        let variation_data_size = cursor.read()?;
        let tuple_index: TupleIndex = cursor.read()?;
        let axis_count = axis_count as usize;
        let peak_tuple = tuple_index
            .embedded_peak_tuple()
            .then(|| cursor.read_array(axis_count).map(Tuple::new))
            .transpose()?;
        let intermediate = if tuple_index.intermediate_region() {
            let start = cursor.read_array(axis_count).map(Tuple::new)?;
            let end = cursor.read_array(axis_count).map(Tuple::new)?;
            Some((start, end))
        } else {
            None
        };
        Ok(TupleVariationHeader {
            variation_data_size,
            tuple_index,
            peak_tuple,
            intermediate,
        })
    }

    /// The size in bytes of the serialized data for this tuple variation table.
    pub fn variation_data_size(&self) -> u16 {
        self.variation_data_size
    }

    pub fn tuple_index(&self) -> TupleIndex {
        self.tuple_index
    }

    /// Peak tuple record for this tuple variation table, if embedded.
    pub fn peak_tuple(&self) -> Option<Tuple<'a>> {
        self.peak_tuple
    }

    /// Intermediate start tuple record, if this is an intermediate region.
    pub fn intermediate_start_tuple(&self) -> Option<Tuple<'a>> {
        self.intermediate.map(|(start, _)| start)
    }

    /// Intermediate end tuple record, if this is an intermediate region.
    pub fn intermediate_end_tuple(&self) -> Option<Tuple<'a>> {
        self.intermediate.map(|(_, end)| end)
    }
}

/// [Packed "Point" Numbers](https://learn.microsoft.com/en-us/typography/opentype/spec/otvarcommonformats#packed-point-numbers)
#[derive(Clone, Debug, Default)]
pub struct PackedPointNumbers<'a> {
    data: FontData<'a>,
}

impl<'a> PackedPointNumbers<'a> {
    /// read point numbers off the front of this data, returning the remaining data
    pub fn split_off_front(data: FontData<'a>) -> (Self, FontData<'a>) {
        let this = PackedPointNumbers { data };
        let total_len = this.total_len();
        let remainder = data.split_off(total_len).unwrap_or_default();
        (this, remainder)
    }

    /// The number of points in this set; zero means "all points".
    pub fn count(&self) -> u16 {
        self.count_and_count_bytes().0
    }

    /// `true` if these numbers apply to every point in the glyph.
    pub fn is_all_points(&self) -> bool {
        self.count() == 0
    }

    /// compute the count, and the number of bytes used to store it
    fn count_and_count_bytes(&self) -> (u16, usize) {
        match self.data.read_at::<u8>(0).unwrap_or(0) {
            0 => (0, 1),
            count @ 1..=127 => (count as u16, 1),
            _ => {
                // the count is a big-endian u16 with the high bit masked out
                let count = self.data.read_at::<u16>(0).unwrap_or_default() & 0x7FFF;
                (count, 2)
            }
        }
    }

    /// the number of bytes to encode the packed point numbers
    fn total_len(&self) -> usize {
        let (n_points, mut n_bytes) = self.count_and_count_bytes();
        if n_points == 0 {
            return n_bytes;
        }
        let mut cursor = self.data.cursor();
        cursor.advance_by(n_bytes);

        let mut n_seen = 0;
        while n_seen < n_points {
            let Some((count, two_bytes)) = read_control_byte(&mut cursor) else {
                return n_bytes;
            };
            let word_size = 1 + usize::from(two_bytes);
            let run_size = word_size * count as usize;
            n_bytes += run_size + 1;
            cursor.advance_by(run_size);
            n_seen += count as u16;
        }

        n_bytes
    }

    /// Iterate over the packed points
    pub fn iter(&self) -> PackedPointNumbersIter<'a> {
        let (count, n_bytes) = self.count_and_count_bytes();
        let mut cursor = self.data.cursor();
        cursor.advance_by(n_bytes);
        PackedPointNumbersIter::new(count, cursor)
    }
}

/// An iterator over the packed point numbers data.
#[derive(Clone, Debug)]
pub struct PackedPointNumbersIter<'a> {
    count: u16,
    seen: u16,
    last_val: u16,
    current_run: PointRunIter<'a>,
}

impl<'a> PackedPointNumbersIter<'a> {
    fn new(count: u16, cursor: Cursor<'a>) -> Self {
        PackedPointNumbersIter {
            count,
            seen: 0,
            last_val: 0,
            current_run: PointRunIter {
                remaining: 0,
                two_bytes: false,
                cursor,
            },
        }
    }
}

#[derive(Clone, Debug)]
struct PointRunIter<'a> {
    remaining: u8,
    two_bytes: bool,
    cursor: Cursor<'a>,
}

impl Iterator for PointRunIter<'_> {
    type Item = u16;

    fn next(&mut self) -> Option<Self::Item> {
        while self.remaining == 0 {
            (self.remaining, self.two_bytes) = read_control_byte(&mut self.cursor)?;
        }

        self.remaining -= 1;
        if self.two_bytes {
            self.cursor.read().ok()
        } else {
            self.cursor.read::<u8>().ok().map(|v| v as u16)
        }
    }
}

/// returns the count and the 'uses_two_bytes' flag from the control byte
fn read_control_byte(cursor: &mut Cursor) -> Option<(u8, bool)> {
    let control: u8 = cursor.read().ok()?;
    let two_bytes = (control & 0x80) != 0;
    let count = (control & 0x7F) + 1;
    Some((count, two_bytes))
}

impl Iterator for PackedPointNumbersIter<'_> {
    type Item = u16;

    fn next(&mut self) -> Option<Self::Item> {
        // a zero count means every point, so we keep incrementing
        if self.count == 0 {
            let result = self.last_val;
            self.last_val = self.last_val.checked_add(1)?;
            return Some(result);
        }

        if self.count == self.seen {
            return None;
        }
        self.seen += 1;
        self.last_val = self.last_val.wrapping_add(self.current_run.next()?);
        Some(self.last_val)
    }
}

/// [Packed Deltas](https://learn.microsoft.com/en-us/typography/opentype/spec/otvarcommonformats#packed-deltas)
#[derive(Clone, Debug)]
pub struct PackedDeltas<'a> {
    data: FontData<'a>,
}

impl<'a> PackedDeltas<'a> {
    /// This is unbounded, and assumes all of data is deltas.
    pub fn new(data: FontData<'a>) -> Self {
        Self { data }
    }

    /// The number of deltas encoded in the data.
    pub fn count(&self) -> usize {
        self.iter().count()
    }

    pub fn iter(&self) -> DeltaRunIter<'a> {
        DeltaRunIter::new(self.data.cursor())
    }
}

/// Implements the logic for iterating over the individual runs
#[derive(Clone, Debug)]
pub struct DeltaRunIter<'a> {
    remaining: u8,
    two_bytes: bool,
    are_zero: bool,
    cursor: Cursor<'a>,
}

impl<'a> DeltaRunIter<'a> {
    fn new(cursor: Cursor<'a>) -> Self {
        DeltaRunIter {
            remaining: 0,
            two_bytes: false,
            are_zero: false,
            cursor,
        }
    }
}

impl Iterator for DeltaRunIter<'_> {
    type Item = i16;

    fn next(&mut self) -> Option<Self::Item> {
        /// Flag indicating that this run contains no data,
        /// and that the deltas for this run are all zero.
        const DELTAS_ARE_ZERO: u8 = 0x80;
        /// Flag indicating the data type for delta values in the run.
        const DELTAS_ARE_WORDS: u8 = 0x40;
        /// Mask for the low 6 bits to provide the number of delta values in the run, minus one.
        const DELTA_RUN_COUNT_MASK: u8 = 0x3F;

        while self.remaining == 0 {
            let control: u8 = self.cursor.read().ok()?;
            self.are_zero = (control & DELTAS_ARE_ZERO) != 0;
            self.two_bytes = (control & DELTAS_ARE_WORDS) != 0;
            self.remaining = (control & DELTA_RUN_COUNT_MASK) + 1;
        }

        self.remaining -= 1;
        if self.are_zero {
            Some(0)
        } else if self.two_bytes {
            self.cursor.read().ok()
        } else {
            self.cursor.read::<i8>().ok().map(|v| v as i16)
        }
    }
}

/// The serialized variation data for one glyph, or for the whole `cvar`
/// table.
#[derive(Clone, Debug)]
pub struct TupleVariationData<'a> {
    axis_count: u16,
    // flattened shared tuples from gvar, `axis_count` values each
    shared_tuples: &'a [BigEndian<F2Dot14>],
    tuple_count: TupleVariationCount,
    header_data: FontData<'a>,
    serialized_data: FontData<'a>,
}

impl<'a> TupleVariationData<'a> {
    /// Read the tuple variation store header at `header_pos`.
    ///
    /// The data offset in the header is relative to the start of `data`.
    pub fn read(
        data: FontData<'a>,
        header_pos: usize,
        axis_count: u16,
        shared_tuples: &'a [BigEndian<F2Dot14>],
    ) -> Result<Self, ReadError> {
        let tuple_count: TupleVariationCount = data.read_at(header_pos)?;
        let data_offset: u16 = data.read_at(header_pos + u16::RAW_BYTE_LEN)?;
        let header_data = data
            .split_off(header_pos + 2 * u16::RAW_BYTE_LEN)
            .ok_or(ReadError::OutOfBounds)?;
        let serialized_data = data
            .split_off(data_offset as usize)
            .ok_or(ReadError::OutOfBounds)?;
        Ok(TupleVariationData {
            axis_count,
            shared_tuples,
            tuple_count,
            header_data,
            serialized_data,
        })
    }

    pub fn tuple_count(&self) -> u16 {
        self.tuple_count.count()
    }

    pub fn axis_count(&self) -> u16 {
        self.axis_count
    }

    /// Iterate over the tuple variations.
    ///
    /// An item fails if its header or serialized data is out of bounds, or
    /// if it references a shared tuple that does not exist.
    pub fn tuples(&self) -> TupleVariationIter<'a> {
        let (shared_point_numbers, serialized_data) = if self.tuple_count.shared_point_numbers()
        {
            let (points, rest) = PackedPointNumbers::split_off_front(self.serialized_data);
            (Some(points), rest)
        } else {
            (None, self.serialized_data)
        };
        TupleVariationIter {
            axis_count: self.axis_count,
            shared_tuples: self.shared_tuples,
            remaining: self.tuple_count(),
            header_cursor: self.header_data.cursor(),
            serialized_data,
            shared_point_numbers,
        }
    }
}

/// An iterator over the [TupleVariation]s in a [TupleVariationData].
#[derive(Clone, Debug)]
pub struct TupleVariationIter<'a> {
    axis_count: u16,
    shared_tuples: &'a [BigEndian<F2Dot14>],
    remaining: u16,
    header_cursor: Cursor<'a>,
    serialized_data: FontData<'a>,
    shared_point_numbers: Option<PackedPointNumbers<'a>>,
}

impl<'a> TupleVariationIter<'a> {
    fn next_tuple(&mut self) -> Result<TupleVariation<'a>, ReadError> {
        let header = TupleVariationHeader::read(&mut self.header_cursor, self.axis_count)?;
        let peak_tuple = match (header.peak_tuple(), header.tuple_index().tuple_records_index()) {
            (Some(peak), _) => peak,
            (None, Some(idx)) => {
                let axis_count = self.axis_count as usize;
                let start = idx as usize * axis_count;
                self.shared_tuples
                    .get(start..start + axis_count)
                    .map(Tuple::new)
                    .ok_or(ReadError::MalformedData("shared tuple index out of range"))?
            }
            (None, None) => return Err(ReadError::MalformedData("missing peak tuple")),
        };
        let size = header.variation_data_size() as usize;
        let data = self
            .serialized_data
            .take_up_to(size)
            .ok_or(ReadError::OutOfBounds)?;
        let (point_numbers, delta_data) = if header.tuple_index().private_point_numbers() {
            PackedPointNumbers::split_off_front(data)
        } else {
            // without shared numbers the deltas apply to every point
            let shared = self.shared_point_numbers.clone().unwrap_or_default();
            (shared, data)
        };
        Ok(TupleVariation {
            peak_tuple,
            intermediate: header.intermediate,
            point_numbers,
            deltas: PackedDeltas::new(delta_data),
        })
    }
}

impl<'a> Iterator for TupleVariationIter<'a> {
    type Item = Result<TupleVariation<'a>, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let next = self.next_tuple();
        if next.is_err() {
            self.remaining = 0;
        }
        Some(next)
    }
}

/// A single tuple variation: a region of the variation space plus the
/// deltas that apply within it.
#[derive(Clone, Debug)]
pub struct TupleVariation<'a> {
    peak_tuple: Tuple<'a>,
    intermediate: Option<(Tuple<'a>, Tuple<'a>)>,
    point_numbers: PackedPointNumbers<'a>,
    deltas: PackedDeltas<'a>,
}

impl<'a> TupleVariation<'a> {
    pub fn peak(&self) -> Tuple<'a> {
        self.peak_tuple
    }

    pub fn intermediate_start(&self) -> Option<Tuple<'a>> {
        self.intermediate.map(|(start, _)| start)
    }

    pub fn intermediate_end(&self) -> Option<Tuple<'a>> {
        self.intermediate.map(|(_, end)| end)
    }

    /// The explicitly referenced point numbers, or `None` if the variation
    /// applies to every point.
    pub fn point_numbers(&self) -> Option<PackedPointNumbersIter<'a>> {
        (!self.point_numbers.is_all_points()).then(|| self.point_numbers.iter())
    }

    /// The packed deltas.
    ///
    /// For `gvar` this is all x deltas followed by all y deltas; for `cvar`
    /// it is one delta per point number.
    pub fn deltas(&self) -> DeltaRunIter<'a> {
        self.deltas.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fontmill_test_data::bebuffer::BeBuffer;
    use pretty_assertions::assert_eq;

    #[test]
    fn packed_points() {
        fn decode_points(bytes: &[u8]) -> Option<Vec<u16>> {
            let data = FontData::new(bytes);
            let packed = PackedPointNumbers { data };
            if packed.count() == 0 {
                None
            } else {
                Some(packed.iter().collect())
            }
        }

        assert_eq!(decode_points(&[0]), None);
        // all points, in a verbose encoding
        assert_eq!(decode_points(&[0x80, 0]), None);
        assert_eq!(decode_points(&[0x02, 0x01, 0x09, 0x06]), Some(vec![9, 15]));
        assert_eq!(
            decode_points(&[0x02, 0x81, 0xbe, 0xef, 0x0c, 0x0f]),
            Some(vec![0xbeef, 0xcafe])
        );
        assert_eq!(decode_points(&[0x01, 0, 0x07]), Some(vec![7]));
        assert_eq!(decode_points(&[0x01, 0x80, 0, 0x07]), Some(vec![7]));
        assert_eq!(decode_points(&[0x01, 0x80, 0xff, 0xff]), Some(vec![65535]));
        assert_eq!(
            decode_points(&[0x04, 1, 7, 1, 1, 0xff, 2]),
            Some(vec![7, 8, 263, 265])
        );
    }

    #[test]
    fn packed_point_byte_len() {
        static CASES: &[&[u8]] = &[
            &[0],
            &[0x80, 0],
            &[0x02, 0x01, 0x09, 0x06],
            &[0x02, 0x81, 0xbe, 0xef, 0x0c, 0x0f],
            &[0x01, 0, 0x07],
            &[0x04, 1, 7, 1, 1, 0xff, 2],
        ];

        for case in CASES {
            let packed = PackedPointNumbers {
                data: FontData::new(case),
            };
            assert_eq!(packed.total_len(), case.len(), "{case:?}");
        }
    }

    #[test]
    fn packed_deltas() {
        static INPUT: FontData = FontData::new(&[0x83, 0x40, 0x01, 0x02, 0x01, 0x81, 0x80]);

        let deltas = PackedDeltas::new(INPUT);
        assert_eq!(deltas.count(), 7);
        assert_eq!(
            deltas.iter().collect::<Vec<_>>(),
            &[0, 0, 0, 0, 258, -127, -128]
        );
    }

    #[test]
    fn packed_deltas_spec() {
        static INPUT: FontData = FontData::new(&[
            0x03, 0x0A, 0x97, 0x00, 0xC6, 0x87, 0x41, 0x10, 0x22, 0xFB, 0x34,
        ]);
        static EXPECTED: &[i16] = &[10, -105, 0, -58, 0, 0, 0, 0, 0, 0, 0, 0, 4130, -1228];

        let deltas = PackedDeltas::new(INPUT);
        assert_eq!(deltas.iter().collect::<Vec<_>>(), EXPECTED);
    }

    #[test]
    fn packed_point_split() {
        static INPUT: FontData =
            FontData::new(&[2, 1, 1, 2, 1, 205, 143, 1, 8, 0, 1, 202, 59, 1, 255, 0]);
        let (points, data) = PackedPointNumbers::split_off_front(INPUT);
        assert_eq!(points.count(), 2);
        assert_eq!(points.iter().collect::<Vec<_>>(), &[1, 3]);
        assert_eq!(data.len(), INPUT.len() - 4);
    }

    fn f2dot14(v: f64) -> F2Dot14 {
        F2Dot14::from_f64(v)
    }

    #[test]
    fn tuple_variation_data() {
        // two axes, one shared tuple; first variation uses the shared tuple
        // and all points, the second embeds an intermediate peak and names
        // points 1 and 2
        let shared = BeBuffer::new().extend([1.0, 0.0].map(f2dot14));
        let shared_tuples = FontData::new(&shared).read_array(0..4).unwrap();
        let buf = BeBuffer::new()
            .push(2u16)
            // data offset: 4 + header 1 (4) + header 2 (4 + 3 * 2 * 2)
            .push(24u16)
            .push(4u16)
            .push(TupleIndex::PRIVATE_POINT_NUMBERS)
            .push(9u16)
            .push(
                TupleIndex::EMBEDDED_PEAK_TUPLE
                    | TupleIndex::INTERMEDIATE_REGION
                    | TupleIndex::PRIVATE_POINT_NUMBERS,
            )
            .extend([0.5, 0.5, 0.0, 0.0, 1.0, 1.0].map(f2dot14))
            // first: all points, one x and one y delta
            .push(0u8)
            .push(0x01u8)
            .extend([5i8, -5])
            // second: points 1 and 2, then four deltas
            .extend([2u8, 1, 1, 1])
            .push(0x03u8)
            .extend([1i8, 2, 3, 4]);
        let data =
            TupleVariationData::read(FontData::new(&buf), 0, 2, shared_tuples).unwrap();
        assert_eq!(data.tuple_count(), 2);
        let tuples = data.tuples().collect::<Result<Vec<_>, _>>().unwrap();

        let first = &tuples[0];
        assert_eq!(first.peak().values().collect::<Vec<_>>(), vec![F2Dot14::ONE, F2Dot14::ZERO]);
        assert!(first.point_numbers().is_none());
        assert!(first.intermediate_start().is_none());
        assert_eq!(first.deltas().collect::<Vec<_>>(), vec![5, -5]);

        let second = &tuples[1];
        assert_eq!(second.peak().get(0), Some(f2dot14(0.5)));
        assert_eq!(second.intermediate_end().and_then(|t| t.get(1)), Some(F2Dot14::ONE));
        assert_eq!(second.point_numbers().unwrap().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(second.deltas().collect::<Vec<_>>(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn bad_shared_tuple_index() {
        let buf = BeBuffer::new()
            .extend([1u16, 8])
            .extend([2u16, 3])
            .extend([0x00u8, 0x00]);
        let data = TupleVariationData::read(FontData::new(&buf), 0, 1, &[]).unwrap();
        let mut tuples = data.tuples();
        assert!(tuples.next().unwrap().is_err());
        assert!(tuples.next().is_none());
    }
}
