//! An open font file and what is derived from it.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::OnceLock,
};

use fontmill_read::{FontRef, ReadError, TableProvider};
use fontmill_types::{GlyphId, Tag};

use crate::{
    axis::AxisTable,
    instance::{InstanceAssembler, InstanceOptions},
    kerning::{KerningTable, KerningValue, NamePair},
    location::Location,
    outline::{GlyphOutline, OutlineInterpolator},
    Error,
};

/// A font, owning its data.
///
/// Kerning and outlines are computed on first use and kept. An instance
/// returned by [`Font::instance`] is a static font of its own, with no link
/// back to the variable font it came from.
#[derive(Debug)]
pub struct Font {
    path: Option<PathBuf>,
    data: Vec<u8>,
    axes: AxisTable,
    glyph_names: Vec<String>,
    kerning_overrides: BTreeMap<NamePair, KerningValue>,
    kerning: OnceLock<KerningTable>,
    outlines: OnceLock<Vec<GlyphOutline>>,
}

impl Font {
    /// Read the font file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| Error::io(path, e))?;
        Ok(Self::new(data)?.with_path(path))
    }

    /// A font from data in memory.
    pub fn new(data: Vec<u8>) -> Result<Self, Error> {
        let font = FontRef::new(&data)?;
        let axes = AxisTable::from_font(&font)?;
        let glyph_names = read_glyph_names(&font)?;
        Ok(Font {
            path: None,
            data,
            axes,
            glyph_names,
            kerning_overrides: BTreeMap::new(),
            kerning: OnceLock::new(),
            outlines: OnceLock::new(),
        })
    }

    /// Set the path the font is known by; instances are named after it.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Replace the kerning overrides, which are applied on top of the
    /// kerning read from `GPOS`.
    pub fn with_kerning_overrides(
        mut self,
        overrides: BTreeMap<NamePair, KerningValue>,
    ) -> Self {
        self.kerning_overrides = overrides;
        self.kerning = OnceLock::new();
        self
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn font_ref(&self) -> Result<FontRef<'_>, Error> {
        Ok(FontRef::new(&self.data)?)
    }

    pub fn axes(&self) -> &AxisTable {
        &self.axes
    }

    pub fn is_variable(&self) -> bool {
        !self.axes.is_empty()
    }

    pub fn num_glyphs(&self) -> usize {
        self.glyph_names.len()
    }

    /// Glyph names in glyph order.
    pub fn glyph_names(&self) -> &[String] {
        &self.glyph_names
    }

    pub fn glyph_name(&self, glyph_id: GlyphId) -> Option<&str> {
        self.glyph_names.get(glyph_id.to_usize()).map(String::as_str)
    }

    pub fn glyph_id(&self, name: &str) -> Option<GlyphId> {
        self.glyph_names
            .iter()
            .position(|candidate| candidate == name)
            .map(|idx| GlyphId::new(idx as u16))
    }

    /// The location of the default instance.
    pub fn location(&self) -> Location {
        self.axes.defaults()
    }

    /// The outline of every glyph, at the default location.
    pub fn outlines(&self) -> Result<&[GlyphOutline], Error> {
        if let Some(outlines) = self.outlines.get() {
            return Ok(outlines);
        }
        let coords = vec![0.0; self.axes.len()];
        let outlines = OutlineInterpolator::new(&self.font_ref()?, coords)?.interpolate_all()?;
        Ok(self.outlines.get_or_init(|| outlines))
    }

    pub fn outline(&self, glyph_id: GlyphId) -> Result<Option<&GlyphOutline>, Error> {
        Ok(self.outlines()?.get(glyph_id.to_usize()))
    }

    /// The advance width and left side bearing of a glyph.
    pub fn metrics(&self, glyph_id: GlyphId) -> Result<Option<(u16, i16)>, Error> {
        let hmtx = self.font_ref()?.hmtx()?;
        Ok(hmtx.advance(glyph_id).zip(hmtx.side_bearing(glyph_id)))
    }

    pub fn advance_width(&self, glyph_id: GlyphId) -> Result<Option<u16>, Error> {
        Ok(self.metrics(glyph_id)?.map(|(advance, _)| advance))
    }

    pub fn units_per_em(&self) -> Result<u16, Error> {
        Ok(self.font_ref()?.head()?.units_per_em())
    }

    /// The flattened `GPOS` kerning, with any overrides applied.
    pub fn kerning(&self) -> Result<&KerningTable, Error> {
        if let Some(kerning) = self.kerning.get() {
            return Ok(kerning);
        }
        let mut table = KerningTable::from_font(&self.font_ref()?, &self.glyph_names)?;
        table.apply_overrides(&self.kerning_overrides);
        Ok(self.kerning.get_or_init(|| table))
    }

    /// The static instance at `location`, stored in `_instances` next to
    /// this font.
    pub fn instance(&self, location: &Location) -> Result<Font, Error> {
        self.instance_with(location, &InstanceOptions::default())
    }

    pub fn instance_with(
        &self,
        location: &Location,
        options: &InstanceOptions,
    ) -> Result<Font, Error> {
        let source = self.path().unwrap_or_else(|| Path::new(""));
        InstanceAssembler::beside(source).make_instance(self, location, options)
    }

    /// The instances at the minimum and maximum of an axis, or `None` if the
    /// font has no such axis.
    pub fn axis_extremes(&self, tag: Tag) -> Result<Option<(Font, Font)>, Error> {
        let Some(axis) = self.axes.get(tag) else {
            return Ok(None);
        };
        let min = self.instance(&Location::raw([(tag, axis.min())]))?;
        let max = self.instance(&Location::raw([(tag, axis.max())]))?;
        Ok(Some((min, max)))
    }
}

/// Names from `post`, or `glyphNNNNN` where it has none.
fn read_glyph_names(font: &FontRef) -> Result<Vec<String>, Error> {
    let num_glyphs = font.maxp()?.num_glyphs();
    let post = match font.post() {
        Ok(post) => Some(post),
        Err(ReadError::TableIsMissing(_)) => None,
        Err(e) => return Err(e.into()),
    };
    Ok((0..num_glyphs)
        .map(GlyphId::new)
        .map(|gid| {
            match post.as_ref().and_then(|post| post.glyph_name(gid)) {
                Some(name) => name.to_owned(),
                None if gid.to_u16() == 0 => ".notdef".to_owned(),
                None => format!("glyph{:05}", gid.to_u16()),
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fontmill_test_data::{kerning, variable};
    use pretty_assertions::assert_eq;

    fn wght() -> Tag {
        Tag::new(b"wght")
    }

    #[test]
    fn glyph_names_from_post() {
        let font = Font::new(fontmill_test_data::variable_font()).unwrap();
        assert_eq!(font.glyph_names(), variable::GLYPH_NAMES);
        assert_eq!(font.glyph_id("C"), Some(GlyphId::new(3)));
        assert_eq!(font.glyph_name(GlyphId::new(2)), Some("B"));
        assert_eq!(font.glyph_id("Z"), None);
    }

    #[test]
    fn variable_font_properties() {
        let font = Font::new(fontmill_test_data::variable_font()).unwrap();
        assert!(font.is_variable());
        assert_eq!(font.location(), Location::raw([(wght(), 400.0)]));
        assert_eq!(font.units_per_em().unwrap(), 1000);
        assert_eq!(font.metrics(GlyphId::new(1)).unwrap(), Some((600, 100)));
        assert_eq!(font.advance_width(GlyphId::new(3)).unwrap(), Some(1200));
        assert_eq!(font.metrics(GlyphId::new(9)).unwrap(), None);
    }

    #[test]
    fn outlines_at_default() {
        let font = Font::new(fontmill_test_data::variable_font()).unwrap();
        let composite = font.outline(GlyphId::new(3)).unwrap().unwrap();
        assert_eq!(composite.advance, 1200);
        assert_eq!(composite.side_bearing, 100);
        let bbox = composite.glyph.bbox().unwrap();
        assert_eq!(
            (bbox.x_min, bbox.y_min, bbox.x_max, bbox.y_max),
            (100, 0, 1150, 700)
        );
        assert!(font.outline(GlyphId::new(5)).unwrap().is_none());
    }

    #[test]
    fn kerning_is_read_once() {
        let font = Font::new(fontmill_test_data::kerning_font()).unwrap();
        assert!(!font.is_variable());
        let first = font.kerning().unwrap() as *const KerningTable;
        let second = font.kerning().unwrap() as *const KerningTable;
        assert_eq!(first, second);
        assert_eq!(font.kerning().unwrap().len(), 7);
        assert_eq!(font.glyph_names(), kerning::GLYPH_NAMES);
    }

    #[test]
    fn overrides_replace_pairs() {
        let font = Font::new(fontmill_test_data::kerning_font())
            .unwrap()
            .with_kerning_overrides(BTreeMap::from([(
                ("T".to_string(), "o".to_string()),
                KerningValue::Advance(-70),
            )]));
        assert_eq!(
            font.kerning().unwrap().get("T", "o"),
            Some(KerningValue::Advance(-70))
        );
    }

    #[test]
    fn open_and_instance() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("MillSans-VF.ttf");
        std::fs::write(&path, fontmill_test_data::variable_font()).unwrap();
        let font = Font::open(&path).unwrap();
        assert_eq!(font.path(), Some(path.as_path()));

        let (light, black) = font.axis_extremes(wght()).unwrap().unwrap();
        let instances = temp.path().join("_instances");
        assert_eq!(light.path(), Some(instances.join("MillSans-VF-wght100.ttf").as_path()));
        assert_eq!(black.path(), Some(instances.join("MillSans-VF-wght900.ttf").as_path()));
        assert!(!black.is_variable());
        assert_eq!(black.metrics(GlyphId::new(1)).unwrap(), Some((700, 50)));
        // the file on disk is what the instance holds
        assert_eq!(std::fs::read(black.path().unwrap()).unwrap(), black.data());

        assert!(font.axis_extremes(Tag::new(b"wdth")).unwrap().is_none());
    }

    #[test]
    fn missing_file() {
        let temp = tempfile::tempdir().unwrap();
        let result = Font::open(temp.path().join("nothing.ttf"));
        assert!(matches!(result, Err(Error::Io { .. })));
    }
}
