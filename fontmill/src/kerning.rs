//! Flattening `GPOS` pair adjustment into a map of glyph pairs.
//!
//! Only the lookups of the `kern` feature are read. Pairs listed one by
//! one come first; class based subtables are then expanded into every
//! glyph pair they cover, without replacing a pair that is already known.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

use fontmill_read::{
    tables::gpos::{
        ExtensionPosFormat1, Gpos, PairPos, PairPosFormat1, PairPosFormat2, ValueFormat,
        ValueRecord,
    },
    FontData, FontRead, FontRef, ReadError, TableProvider,
};
use fontmill_types::{GlyphId, Tag};

use crate::{error::Diagnostic, Error};

const KERN: Tag = Tag::new(b"kern");

/// An ordered `(left, right)` pair of glyph or class names.
pub type NamePair = (String, String);

/// The adjustment for one pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KerningValue {
    /// A change to the advance of the left glyph.
    Advance(i16),
    /// A placement and advance change, as used for right-to-left pairs.
    RightToLeft { x_placement: i16, x_advance: i16 },
}

impl KerningValue {
    pub fn is_zero(&self) -> bool {
        match *self {
            KerningValue::Advance(value) => value == 0,
            KerningValue::RightToLeft {
                x_placement,
                x_advance,
            } => x_placement == 0 && x_advance == 0,
        }
    }
}

impl fmt::Display for KerningValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KerningValue::Advance(value) => write!(f, "{value}"),
            KerningValue::RightToLeft {
                x_placement,
                x_advance,
            } => write!(f, "<{x_placement} 0 {x_advance} 0>"),
        }
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for KerningValue {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            KerningValue::Advance(value) => serializer.serialize_i16(*value),
            KerningValue::RightToLeft { .. } => serializer.collect_str(self),
        }
    }
}

/// The flattened kerning of a font.
///
/// Class names have the form `class_<lookup>_<class>`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct KerningTable {
    pairs: BTreeMap<NamePair, KerningValue>,
    left_classes: BTreeMap<String, Vec<String>>,
    right_classes: BTreeMap<String, Vec<String>>,
    class_pairs: BTreeMap<NamePair, KerningValue>,
    diagnostics: Vec<Diagnostic>,
}

impl KerningTable {
    /// Read the kerning of a font, naming glyphs with `glyph_names`.
    ///
    /// A font without `GPOS` has no kerning.
    pub fn from_font(font: &FontRef, glyph_names: &[String]) -> Result<Self, Error> {
        match font.gpos() {
            Ok(gpos) => Self::from_gpos(&gpos, glyph_names),
            Err(ReadError::TableIsMissing(_)) => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn from_gpos(gpos: &Gpos, glyph_names: &[String]) -> Result<Self, Error> {
        if gpos.feature_list_offset() == 0 || gpos.lookup_list_offset() == 0 {
            return Ok(Self::default());
        }
        let feature_list = gpos.feature_list()?;
        let mut lookup_indices = BTreeSet::new();
        for record in feature_list.feature_records() {
            if record.feature_tag() == KERN {
                let feature = feature_list.feature(record)?;
                lookup_indices.extend(feature.lookup_list_indices().iter().map(|idx| idx.get()));
            }
        }
        let lookup_list = gpos.lookup_list()?;

        let mut reader = Reader {
            glyph_names,
            table: KerningTable::default(),
        };
        let mut class_subtables = Vec::new();
        for lookup_index in lookup_indices {
            log::debug!("reading kerning lookup {lookup_index}");
            let lookup = match lookup_list.lookup(lookup_index) {
                Ok(lookup) => lookup,
                Err(error) => {
                    reader.report(Diagnostic::MalformedSubtable {
                        lookup_index,
                        error,
                    });
                    continue;
                }
            };
            let lookup_type = lookup.lookup_type();
            if lookup_type != Gpos::PAIR_ADJUSTMENT && lookup_type != Gpos::EXTENSION {
                reader.report(Diagnostic::UnsupportedLookup {
                    lookup_index,
                    lookup_type,
                });
                continue;
            }
            for data in lookup.subtables() {
                let subtable = if lookup_type == Gpos::EXTENSION {
                    data.and_then(ExtensionPosFormat1::read)
                        .and_then(|ext| Ok((ext.extension_lookup_type(), ext.extension()?)))
                } else {
                    data.map(|data| (lookup_type, data))
                };
                match subtable {
                    Ok((Gpos::PAIR_ADJUSTMENT, data)) => match reader.pair_pos(lookup_index, data)
                    {
                        Some(PairPos::Format1(table)) => reader.add_pairs(lookup_index, &table),
                        Some(PairPos::Format2(table)) => class_subtables.push((lookup_index, table)),
                        None => (),
                    },
                    Ok((lookup_type, _)) => reader.report(Diagnostic::UnsupportedLookup {
                        lookup_index,
                        lookup_type,
                    }),
                    Err(error) => reader.report(Diagnostic::MalformedSubtable {
                        lookup_index,
                        error,
                    }),
                }
            }
        }
        for (lookup_index, table) in class_subtables {
            reader.add_class_pairs(lookup_index, &table);
        }
        Ok(reader.table)
    }

    /// Every kerned pair of glyph names.
    pub fn pairs(&self) -> &BTreeMap<NamePair, KerningValue> {
        &self.pairs
    }

    pub fn left_classes(&self) -> &BTreeMap<String, Vec<String>> {
        &self.left_classes
    }

    pub fn right_classes(&self) -> &BTreeMap<String, Vec<String>> {
        &self.right_classes
    }

    /// The non-zero values of class subtables, by class names.
    pub fn class_pairs(&self) -> &BTreeMap<NamePair, KerningValue> {
        &self.class_pairs
    }

    /// The lookups and subtables that were skipped.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn get(&self, left: &str, right: &str) -> Option<KerningValue> {
        self.pairs
            .get(&(left.to_owned(), right.to_owned()))
            .copied()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Iterate `(left, right, value)` in pair order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, KerningValue)> + '_ {
        self.pairs
            .iter()
            .map(|((left, right), value)| (left.as_str(), right.as_str(), *value))
    }

    /// Set or replace the values of some pairs.
    pub fn apply_overrides<'b>(
        &mut self,
        overrides: impl IntoIterator<Item = (&'b NamePair, &'b KerningValue)>,
    ) {
        for (pair, value) in overrides {
            self.pairs.insert(pair.clone(), *value);
        }
    }
}

/// The value formats a pair subtable may use for its first glyph.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PairValueFormat {
    Empty,
    Advance,
    PlacementAndAdvance,
}

impl PairValueFormat {
    fn new(format: ValueFormat) -> Option<Self> {
        const ADVANCE: u16 = ValueFormat::X_ADVANCE;
        const BOTH: u16 = ValueFormat::X_PLACEMENT | ValueFormat::X_ADVANCE;
        match format.bits() {
            0 => Some(PairValueFormat::Empty),
            ADVANCE => Some(PairValueFormat::Advance),
            BOTH => Some(PairValueFormat::PlacementAndAdvance),
            _ => None,
        }
    }

    fn value(self, record: &ValueRecord) -> KerningValue {
        let x_advance = record.x_advance.unwrap_or_default();
        match self {
            PairValueFormat::Advance => KerningValue::Advance(x_advance),
            PairValueFormat::Empty | PairValueFormat::PlacementAndAdvance => {
                KerningValue::RightToLeft {
                    x_placement: record.x_placement.unwrap_or_default(),
                    x_advance,
                }
            }
        }
    }
}

struct Reader<'n> {
    glyph_names: &'n [String],
    table: KerningTable,
}

impl Reader<'_> {
    fn report(&mut self, diagnostic: Diagnostic) {
        log::warn!("skipping kerning: {diagnostic}");
        self.table.diagnostics.push(diagnostic);
    }

    fn glyph_name(&self, glyph: GlyphId) -> String {
        self.glyph_names
            .get(glyph.to_usize())
            .cloned()
            .unwrap_or_else(|| format!("glyph{:05}", glyph.to_u16()))
    }

    fn pair_pos<'a>(&mut self, lookup_index: u16, data: FontData<'a>) -> Option<PairPos<'a>> {
        let table = match PairPos::read(data) {
            Ok(table) => table,
            Err(ReadError::InvalidFormat(format)) => {
                self.report(Diagnostic::CoverageFormat {
                    lookup_index,
                    format: format as u16,
                });
                return None;
            }
            Err(error) => {
                self.report(Diagnostic::MalformedSubtable {
                    lookup_index,
                    error,
                });
                return None;
            }
        };
        if table.value_format2().bits() != 0 {
            log::debug!(
                "lookup {lookup_index}: ignoring second value format {}",
                table.value_format2().bits()
            );
        }
        Some(table)
    }

    fn value_format(&mut self, lookup_index: u16, format: ValueFormat) -> Option<PairValueFormat> {
        let result = PairValueFormat::new(format);
        if result.is_none() {
            self.report(Diagnostic::UnsupportedValueFormat {
                lookup_index,
                value_format: format.bits(),
            });
        }
        result
    }

    fn add_pairs(&mut self, lookup_index: u16, table: &PairPosFormat1) {
        let Some(format) = self.value_format(lookup_index, table.value_format1()) else {
            return;
        };
        let pairs = match table.pairs() {
            Ok(pairs) => pairs,
            Err(error) => {
                return self.report(Diagnostic::MalformedSubtable {
                    lookup_index,
                    error,
                })
            }
        };
        for pair in pairs {
            match pair {
                Ok((first, record)) => {
                    let key = (self.glyph_name(first), self.glyph_name(record.second_glyph));
                    let value = format.value(&record.value_record1);
                    self.table.pairs.entry(key).or_insert(value);
                }
                Err(error) => self.report(Diagnostic::MalformedSubtable {
                    lookup_index,
                    error,
                }),
            }
        }
    }

    fn add_class_pairs(&mut self, lookup_index: u16, table: &PairPosFormat2) {
        let Some(format) = self.value_format(lookup_index, table.value_format1()) else {
            return;
        };
        if format == PairValueFormat::Empty {
            log::debug!("lookup {lookup_index}: class subtable without values");
            return;
        }
        let members = self.class_members(table);
        let (left_members, right_members) = match members {
            Ok(members) => members,
            Err(error) => {
                return self.report(Diagnostic::MalformedSubtable {
                    lookup_index,
                    error,
                })
            }
        };
        let class_name = |class: usize| format!("class_{lookup_index}_{class}");
        for (classes, members) in [
            (&mut self.table.left_classes, &left_members),
            (&mut self.table.right_classes, &right_members),
        ] {
            for (class, glyphs) in members.iter().enumerate() {
                let merged = classes.entry(class_name(class)).or_default();
                for glyph in glyphs {
                    if !merged.contains(glyph) {
                        merged.push(glyph.clone());
                    }
                }
            }
        }

        for (class1, lefts) in left_members.iter().enumerate() {
            for (class2, rights) in right_members.iter().enumerate() {
                let record = match table.values(class1 as u16, class2 as u16) {
                    Ok((record, _)) => record,
                    Err(error) => {
                        return self.report(Diagnostic::MalformedSubtable {
                            lookup_index,
                            error,
                        })
                    }
                };
                let value = format.value(&record);
                if value.is_zero() {
                    continue;
                }
                self.table
                    .class_pairs
                    .entry((class_name(class1), class_name(class2)))
                    .or_insert(value);
                for left in lefts {
                    for right in rights {
                        self.table
                            .pairs
                            .entry((left.clone(), right.clone()))
                            .or_insert(value);
                    }
                }
            }
        }
    }

    /// The glyph names in each left and each right class.
    ///
    /// Class 0 holds what no other class claims: on the left, the covered
    /// glyphs, and on the right, every glyph of the font.
    #[allow(clippy::type_complexity)]
    fn class_members(
        &self,
        table: &PairPosFormat2,
    ) -> Result<(Vec<Vec<String>>, Vec<Vec<String>>), ReadError> {
        let coverage = table.coverage()?;
        let class_def1 = table.class_def1()?;
        let class_def2 = table.class_def2()?;

        let mut left = vec![BTreeSet::new(); table.class1_count() as usize];
        for glyph in coverage.iter() {
            if let Some(class) = left.get_mut(class_def1.get(glyph) as usize) {
                class.insert(glyph);
            }
        }
        let mut right = vec![BTreeSet::new(); table.class2_count() as usize];
        let mut claimed = BTreeSet::new();
        for (glyph, class) in class_def2.iter() {
            claimed.insert(glyph);
            if let Some(class) = right.get_mut(class as usize) {
                class.insert(glyph);
            }
        }
        if let Some(class_zero) = right.first_mut() {
            class_zero.extend(
                (0..self.glyph_names.len() as u16)
                    .map(GlyphId::new)
                    .filter(|glyph| !claimed.contains(glyph)),
            );
        }
        let names = |classes: Vec<BTreeSet<GlyphId>>| -> Vec<Vec<String>> {
            classes
                .into_iter()
                .map(|glyphs| glyphs.into_iter().map(|g| self.glyph_name(g)).collect())
                .collect()
        };
        Ok((names(left), names(right)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fontmill_test_data::{
        bebuffer::BeBuffer,
        kerning::{self, extension, feature_list, lookup, lookup_list, pair_pos_format1},
    };
    use pretty_assertions::assert_eq;

    fn names(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|name| name.to_string()).collect()
    }

    fn pair(left: &str, right: &str) -> NamePair {
        (left.to_owned(), right.to_owned())
    }

    fn kerning_table() -> KerningTable {
        let data = fontmill_test_data::kerning_font();
        let font = FontRef::new(&data).unwrap();
        KerningTable::from_font(&font, &names(&kerning::GLYPH_NAMES)).unwrap()
    }

    // a GPOS table whose kern feature uses the given lookups
    fn gpos_with(lookups: Vec<BeBuffer>, kern: &[u16]) -> Vec<u8> {
        let script_list = BeBuffer::new().push(0u16);
        let features = feature_list(&[(KERN, kern)]);
        let lookups = lookup_list(lookups);
        let feature_list_offset = 10 + script_list.len() as u16;
        let lookup_list_offset = feature_list_offset + features.len() as u16;
        BeBuffer::new()
            .extend([1u16, 0])
            .extend([10, feature_list_offset, lookup_list_offset])
            .append(&script_list)
            .append(&features)
            .append(&lookups)
            .into_vec()
    }

    fn read_gpos(bytes: &[u8]) -> KerningTable {
        let gpos = Gpos::read(FontData::new(bytes)).unwrap();
        KerningTable::from_gpos(&gpos, &names(&kerning::GLYPH_NAMES)).unwrap()
    }

    #[test]
    fn flattened_pairs() {
        let _ = env_logger::builder().is_test(true).try_init();
        let table = kerning_table();
        let pairs = table
            .iter()
            .map(|(left, right, value)| format!("{left} {right} {value}"))
            .collect::<Vec<_>>();
        assert_eq!(
            pairs,
            [
                "A V -80",
                "A o 0",
                "T e -30",
                "T o -60",
                "V e -50",
                "V o -50",
                "alef beh <-20 0 -20 0>",
            ]
        );
    }

    #[test]
    fn single_pairs_win_over_classes() {
        let table = kerning_table();
        // the class matrix says -40
        assert_eq!(table.get("A", "V"), Some(KerningValue::Advance(-80)));
        assert_eq!(
            table.class_pairs().get(&pair("class_1_1", "class_1_1")),
            Some(&KerningValue::Advance(-40))
        );
        assert_eq!(table.get("T", "o"), Some(KerningValue::Advance(-60)));
    }

    #[test]
    fn class_tables() {
        let table = kerning_table();
        let left = table
            .left_classes()
            .iter()
            .map(|(name, glyphs)| (name.as_str(), glyphs.clone()))
            .collect::<Vec<_>>();
        assert_eq!(
            left,
            [
                ("class_1_0", names(&["T"])),
                ("class_1_1", names(&["A"])),
                ("class_1_2", names(&["V"])),
            ]
        );
        let right = table
            .right_classes()
            .iter()
            .map(|(name, glyphs)| (name.as_str(), glyphs.clone()))
            .collect::<Vec<_>>();
        assert_eq!(
            right,
            [
                (
                    "class_1_0",
                    names(&[".notdef", "A", "T", "alef", "beh", "period"])
                ),
                ("class_1_1", names(&["V"])),
                ("class_1_2", names(&["o", "e"])),
            ]
        );
        // zero entries of the matrix are not recorded
        let class_pairs = table.class_pairs().keys().cloned().collect::<Vec<_>>();
        assert_eq!(
            class_pairs,
            [
                pair("class_1_0", "class_1_2"),
                pair("class_1_1", "class_1_1"),
                pair("class_1_2", "class_1_2"),
            ]
        );
    }

    #[test]
    fn skipped_lookups_are_reported() {
        let table = kerning_table();
        assert_eq!(
            table.diagnostics(),
            [
                Diagnostic::UnsupportedLookup {
                    lookup_index: 2,
                    lookup_type: 8
                },
                Diagnostic::UnsupportedValueFormat {
                    lookup_index: 4,
                    value_format: 1
                },
            ]
        );
        assert_eq!(table.get("period", "A"), None);
    }

    #[test]
    fn no_gpos_no_kerning() {
        let data = fontmill_test_data::variable_font();
        let font = FontRef::new(&data).unwrap();
        let table = KerningTable::from_font(&font, &[]).unwrap();
        assert!(table.is_empty());
        assert!(table.diagnostics().is_empty());
    }

    #[test]
    fn no_kern_feature() {
        let bytes = gpos_with(
            vec![lookup(2, vec![pair_pos_format1(4, &[(1, &[(2, &[-80])])])])],
            &[],
        );
        assert!(read_gpos(&bytes).is_empty());
    }

    #[test]
    fn unknown_subtable_format() {
        let bytes = gpos_with(
            vec![
                lookup(2, vec![BeBuffer::new().extend([3u16, 0, 0, 0])]),
                lookup(9, vec![extension(4, BeBuffer::new().extend([1u16, 0]))]),
                lookup(2, vec![pair_pos_format1(4, &[(1, &[(2, &[-15])])])]),
            ],
            &[0, 1, 2],
        );
        let table = read_gpos(&bytes);
        assert_eq!(
            table.diagnostics(),
            [
                Diagnostic::CoverageFormat {
                    lookup_index: 0,
                    format: 3
                },
                Diagnostic::UnsupportedLookup {
                    lookup_index: 1,
                    lookup_type: 4
                },
            ]
        );
        assert_eq!(table.get("A", "V"), Some(KerningValue::Advance(-15)));
    }

    #[test]
    fn first_subtable_wins() {
        let bytes = gpos_with(
            vec![
                lookup(2, vec![pair_pos_format1(4, &[(1, &[(2, &[-15])])])]),
                lookup(2, vec![pair_pos_format1(4, &[(1, &[(2, &[-99])])])]),
            ],
            &[1, 0],
        );
        assert_eq!(
            read_gpos(&bytes).get("A", "V"),
            Some(KerningValue::Advance(-15))
        );
    }

    #[test]
    fn overrides() {
        let mut table = kerning_table();
        let overrides = BTreeMap::from([
            (pair("A", "V"), KerningValue::Advance(-100)),
            (pair("o", "o"), KerningValue::Advance(5)),
        ]);
        table.apply_overrides(&overrides);
        assert_eq!(table.get("A", "V"), Some(KerningValue::Advance(-100)));
        assert_eq!(table.get("o", "o"), Some(KerningValue::Advance(5)));
        assert_eq!(table.len(), 8);
    }

    #[test]
    fn display_values() {
        assert_eq!(KerningValue::Advance(-80).to_string(), "-80");
        let rtl = KerningValue::RightToLeft {
            x_placement: -20,
            x_advance: -20,
        };
        assert_eq!(rtl.to_string(), "<-20 0 -20 0>");
        assert!(!rtl.is_zero());
    }
}
