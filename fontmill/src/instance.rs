//! Building static instances of a variable font.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use fontmill_read::{FontRef, ReadError, TableProvider};
use fontmill_types::{NameId, Tag};
use fontmill_write::{
    tables::{
        cvt::Cvt,
        glyf::{Bbox, GlyfLocaBuilder},
        head::Head,
        hhea::Hhea,
        hmtx::{Hmtx, LongMetric},
        name::Name,
    },
    BuilderError, FontBuilder,
};

use crate::{
    axis::AxisTable,
    cache::{CacheKey, CacheStore, DirectoryCache},
    cvt::ControlValueInterpolator,
    kerning::{KerningValue, NamePair},
    location::Location,
    outline::{GlyphOutline, OutlineInterpolator},
    Error, Font,
};

const GLYF: Tag = Tag::new(b"glyf");
const AVAR: Tag = Tag::new(b"avar");

/// Tables that only describe the variation space; an instance drops them.
pub const VARIATION_TABLES: [Tag; 8] = [
    Tag::new(b"fvar"),
    Tag::new(b"gvar"),
    Tag::new(b"cvar"),
    Tag::new(b"avar"),
    Tag::new(b"HVAR"),
    Tag::new(b"MVAR"),
    Tag::new(b"VVAR"),
    Tag::new(b"STAT"),
];

/// The `name` records that are rewritten: Macintosh Roman and Windows
/// Unicode BMP, English.
const NAME_PLATFORMS: [(u16, u16, u16); 2] = [(1, 0, 0), (3, 1, 0x409)];

/// Options for [`InstanceAssembler::make_instance`].
#[derive(Clone, Debug, PartialEq)]
pub struct InstanceOptions {
    /// Reuse an instance that is already stored instead of building it.
    pub cached: bool,
    /// Pairs to set in the kerning of the instance.
    pub kerning_overrides: BTreeMap<NamePair, KerningValue>,
}

impl Default for InstanceOptions {
    fn default() -> Self {
        InstanceOptions {
            cached: true,
            kerning_overrides: BTreeMap::new(),
        }
    }
}

impl InstanceOptions {
    pub fn uncached() -> Self {
        InstanceOptions {
            cached: false,
            ..Default::default()
        }
    }
}

/// Builds static instances and keeps them in a [`CacheStore`].
#[derive(Clone, Debug)]
pub struct InstanceAssembler<S> {
    store: S,
}

impl InstanceAssembler<DirectoryCache> {
    /// An assembler storing instances in `_instances` next to `source`.
    pub fn beside(source: &Path) -> Self {
        Self::new(DirectoryCache::beside(source))
    }
}

impl<S: CacheStore> InstanceAssembler<S> {
    pub fn new(store: S) -> Self {
        InstanceAssembler { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The key an instance of `font` at `location` is stored under.
    ///
    /// The key holds design coordinates clipped to each axis range. Axes at
    /// their default are left out.
    pub fn cache_key(&self, font: &Font, location: &Location) -> Result<CacheKey, Error> {
        let axes = font.axes();
        let raw = axes.denormalize(location)?;
        let values = raw
            .iter()
            .filter(|(tag, value)| axes.get(*tag).map(|axis| axis.default()) != Some(*value));
        Ok(CacheKey::new(source_path(font), values))
    }

    /// Produce the static font at `location`.
    ///
    /// With `options.cached`, an instance already in the store is returned
    /// as it is. Otherwise the instance is built and stored, replacing any
    /// earlier one. Nothing is stored if building fails.
    pub fn make_instance(
        &self,
        font: &Font,
        location: &Location,
        options: &InstanceOptions,
    ) -> Result<Font, Error> {
        let axes = font.axes();
        let normalized = axes.normalize(location)?;
        let key = self.cache_key(font, location)?;
        let path = self.store.path_for(&key);
        if font.path().is_some_and(|source| same_file(source, &path)) {
            return Err(Error::InstanceIsSource(path));
        }
        if options.cached && self.store.exists(&key) {
            log::info!("reusing instance {}", path.display());
            let data = self.store.read(&key)?;
            return Ok(Font::new(data)?
                .with_path(path)
                .with_kerning_overrides(options.kerning_overrides.clone()));
        }

        let font_ref = font.font_ref()?;
        let mut coords = axes.coords(&normalized);
        match font_ref.avar() {
            Ok(avar) => axes.apply_avar(&avar, &mut coords)?,
            Err(ReadError::TableIsMissing(_)) => (),
            Err(e) => return Err(Error::corrupt(AVAR, e)),
        }
        log::debug!("instancing at {coords:?}");
        let data = build_instance(&font_ref, axes, &coords, &key.suffix())?;
        let path = self.store.write(&key, &data)?;
        log::info!("wrote instance {}", path.display());
        Ok(Font::new(data)?
            .with_path(path)
            .with_kerning_overrides(options.kerning_overrides.clone()))
    }
}

/// `true` if the paths are equal or resolve to the same existing file.
fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn source_path(font: &Font) -> PathBuf {
    font.path()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("font.ttf"))
}

/// Compile the static font at the normalized, avar-mapped `coords`.
fn build_instance(
    font: &FontRef,
    axes: &AxisTable,
    coords: &[f64],
    suffix: &str,
) -> Result<Vec<u8>, Error> {
    let outlines = OutlineInterpolator::new(font, coords.to_vec())?.interpolate_all()?;

    let mut glyf_loca = GlyfLocaBuilder::new();
    for outline in &outlines {
        glyf_loca
            .add_glyph(&outline.glyph)
            .map_err(|inner| BuilderError { tag: GLYF, inner })?;
    }
    let (glyf, loca, loca_format) = glyf_loca.build();

    let hmtx = Hmtx::new(
        outlines
            .iter()
            .map(|outline| LongMetric::new(outline.advance, outline.side_bearing))
            .collect(),
    );
    let mut hhea = Hhea::from_read(&font.hhea()?)?;
    hhea.set_number_of_h_metrics(hmtx.number_of_h_metrics());
    hhea.set_advance_width_max(hmtx.advance_width_max());
    let mut head = Head::from_read(&font.head()?)?;
    head.set_bbox(font_bbox(&outlines));
    head.set_index_to_loc_format(loca_format);

    let mut builder = FontBuilder::new();
    builder
        .add_table(&glyf)?
        .add_table(&loca)?
        .add_table(&hmtx)?
        .add_table(&hhea)?
        .add_table(&head)?;

    if let Some(cvt) = ControlValueInterpolator::new(font, axes.len() as u16)? {
        builder.add_table(&Cvt::new(cvt.interpolate(coords)?))?;
    }
    match font.name() {
        Ok(name) => {
            let mut name = Name::from_read(&name)?;
            rename(&mut name, suffix);
            builder.add_table(&name)?;
        }
        Err(ReadError::TableIsMissing(_)) => (),
        Err(e) => return Err(e.into()),
    }

    builder.copy_missing_tables(font);
    for tag in VARIATION_TABLES {
        if builder.remove(tag) {
            log::info!("dropped '{tag}'");
        }
    }
    Ok(builder.build())
}

/// The union of the glyph bounding boxes; zero if every glyph is empty.
fn font_bbox(outlines: &[GlyphOutline]) -> Bbox {
    outlines
        .iter()
        .filter(|outline| !outline.glyph.is_empty())
        .filter_map(|outline| outline.glyph.bbox())
        .reduce(Bbox::union)
        .unwrap_or_default()
}

/// Append `suffix` to the style, full and PostScript names.
fn rename(name: &mut Name, suffix: &str) {
    if suffix.is_empty() {
        return;
    }
    for (platform_id, encoding_id, language_id) in NAME_PLATFORMS {
        let Some(family) = name
            .get(platform_id, encoding_id, language_id, NameId::FAMILY_NAME)
            .map(str::to_owned)
        else {
            continue;
        };
        let full_name = format!("{family} {suffix}");
        let postscript_name = full_name.replace(' ', "-");
        let ids = [
            (NameId::SUBFAMILY_NAME, suffix.to_owned()),
            (NameId::FULL_NAME, full_name),
            (NameId::POSTSCRIPT_NAME, postscript_name),
        ];
        for (name_id, text) in ids {
            name.set(platform_id, encoding_id, language_id, name_id, text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use fontmill_read::tables::glyf::Glyph as ReadGlyph;
    use fontmill_test_data::variable;
    use fontmill_types::GlyphId;
    use pretty_assertions::assert_eq;

    fn wght() -> Tag {
        Tag::new(b"wght")
    }

    fn source() -> Font {
        Font::new(fontmill_test_data::variable_font())
            .unwrap()
            .with_path("fonts/MillSans-VF.ttf")
    }

    fn points(font: &FontRef, gid: u16) -> Vec<(i16, i16)> {
        let glyf = font.glyf().unwrap();
        let loca = font.loca(None).unwrap();
        match glyf.glyph(&loca, GlyphId::new(gid)).unwrap() {
            Some(ReadGlyph::Simple(simple)) => simple
                .points()
                .unwrap()
                .iter()
                .map(|point| (point.x, point.y))
                .collect(),
            other => panic!("expected a simple glyph, found {other:?}"),
        }
    }

    fn metrics(font: &FontRef) -> Vec<(u16, i16)> {
        let hmtx = font.hmtx().unwrap();
        (0..variable::GLYPH_NAMES.len() as u16)
            .map(GlyphId::new)
            .map(|gid| (hmtx.advance(gid).unwrap(), hmtx.side_bearing(gid).unwrap()))
            .collect()
    }

    fn cvt_values(font: &FontRef) -> Vec<i16> {
        let cvt = font.cvt().unwrap();
        cvt.values().iter().map(|value| value.get()).collect()
    }

    fn names(font: &FontRef, platform: (u16, u16, u16)) -> [Option<String>; 3] {
        let name = font.name().unwrap();
        let (p, e, l) = platform;
        [
            NameId::SUBFAMILY_NAME,
            NameId::FULL_NAME,
            NameId::POSTSCRIPT_NAME,
        ]
        .map(|id| name.find(p, e, l, id))
    }

    #[test]
    fn instance_at_max() {
        let _ = env_logger::builder().is_test(true).try_init();
        let assembler = InstanceAssembler::new(MemoryCache::new());
        let location = Location::raw([(wght(), 900.0)]);
        let instance = assembler
            .make_instance(&source(), &location, &InstanceOptions::default())
            .unwrap();
        assert_eq!(instance.path(), Some(Path::new("MillSans-VF-wght900.ttf")));
        assert!(!instance.is_variable());
        let font = instance.font_ref().unwrap();
        assert_eq!(points(&font, 1), [(50, 0), (50, 800), (550, 800), (550, 0)]);
        assert_eq!(metrics(&font)[1], (700, 50));
        assert_eq!(metrics(&font)[3], (1400, 50));
        assert_eq!(cvt_values(&font), [110, 200, 279]);
        let head = font.head().unwrap();
        assert_eq!(
            (head.x_min(), head.y_min(), head.x_max(), head.y_max()),
            (50, 0, 1250, 800)
        );
        assert_eq!(font.hhea().unwrap().number_of_h_metrics(), 5);
    }

    #[test]
    fn avar_is_applied() {
        let assembler = InstanceAssembler::new(MemoryCache::new());
        let location = Location::raw([(wght(), 650.0)]);
        let instance = assembler
            .make_instance(&source(), &location, &InstanceOptions::default())
            .unwrap();
        let font = instance.font_ref().unwrap();
        assert_eq!(points(&font, 1), [(63, 0), (63, 775), (538, 775), (538, 0)]);
        assert_eq!(metrics(&font)[1], (675, 63));
        assert_eq!(cvt_values(&font), [108, 200, 284]);
    }

    #[test]
    fn variation_tables_are_dropped() {
        let assembler = InstanceAssembler::new(MemoryCache::new());
        let location = Location::normalized([(wght(), -1.0)]);
        let instance = assembler
            .make_instance(&source(), &location, &InstanceOptions::default())
            .unwrap();
        let font = instance.font_ref().unwrap();
        let tags = font.table_tags().collect::<Vec<_>>();
        for tag in VARIATION_TABLES {
            assert!(!tags.contains(&tag), "{tag} was kept");
        }
        assert!(tags.contains(&Tag::new(b"post")));
        assert_eq!(points(&font, 1), [(120, 0), (120, 600), (480, 600), (480, 0)]);
        assert_eq!(metrics(&font)[3], (1200, 120));
    }

    #[test]
    fn names_get_the_suffix() {
        let assembler = InstanceAssembler::new(MemoryCache::new());
        let location = Location::raw([(wght(), 650.0)]);
        let instance = assembler
            .make_instance(&source(), &location, &InstanceOptions::default())
            .unwrap();
        let font = instance.font_ref().unwrap();
        for platform in NAME_PLATFORMS {
            assert_eq!(
                names(&font, platform),
                [
                    Some("wght650".to_string()),
                    Some("Mill Sans wght650".to_string()),
                    Some("Mill-Sans-wght650".to_string()),
                ]
            );
        }
        // other records are kept
        let name = font.name().unwrap();
        assert_eq!(
            name.find(3, 1, 0x409, NameId::new(256)).as_deref(),
            Some("Weight")
        );
    }

    #[test]
    fn default_location_keeps_outlines_and_names() {
        let assembler = InstanceAssembler::new(MemoryCache::new());
        let source = source();
        let instance = assembler
            .make_instance(
                &source,
                &Location::raw([(wght(), 400.0)]),
                &InstanceOptions::default(),
            )
            .unwrap();
        assert_eq!(instance.path(), Some(Path::new("MillSans-VF.ttf")));
        let font = instance.font_ref().unwrap();
        let original = source.font_ref().unwrap();
        for gid in [1, 2] {
            assert_eq!(points(&font, gid), points(&original, gid));
        }
        assert_eq!(
            metrics(&font),
            [(0, 0), (600, 100), (600, 50), (1200, 100), (1200, 0)]
        );
        assert_eq!(names(&font, (3, 1, 0x409)), names(&original, (3, 1, 0x409)));
    }

    #[test]
    fn cached_instances_are_not_rebuilt() {
        let assembler = InstanceAssembler::new(MemoryCache::new());
        let source = source();
        let location = Location::raw([(wght(), 900.0)]);
        let first = assembler
            .make_instance(&source, &location, &InstanceOptions::default())
            .unwrap();
        // the same point, written another way
        let scaled = Location::scaled([(wght(), 1.0)]);
        let second = assembler
            .make_instance(&source, &scaled, &InstanceOptions::default())
            .unwrap();
        assert_eq!(assembler.store().writes(), 1);
        assert_eq!(first.data(), second.data());

        assembler
            .make_instance(&source, &location, &InstanceOptions::uncached())
            .unwrap();
        assert_eq!(assembler.store().writes(), 2);
    }

    #[test]
    fn cache_file_is_untouched() {
        let temp = tempfile::tempdir().unwrap();
        let assembler = InstanceAssembler::new(DirectoryCache::new(temp.path()));
        let source = source();
        let location = Location::raw([(wght(), 900.0)]);
        let first = assembler
            .make_instance(&source, &location, &InstanceOptions::default())
            .unwrap();
        let path = first.path().unwrap().to_path_buf();
        assert_eq!(path, temp.path().join("MillSans-VF-wght900.ttf"));
        let modified = std::fs::metadata(&path).unwrap().modified().unwrap();

        let second = assembler
            .make_instance(&source, &location, &InstanceOptions::default())
            .unwrap();
        assert_eq!(std::fs::metadata(&path).unwrap().modified().unwrap(), modified);
        assert_eq!(first.data(), second.data());
        assert_eq!(std::fs::read(&path).unwrap(), first.data());
    }

    #[test]
    fn unknown_axis_writes_nothing() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("instances");
        let assembler = InstanceAssembler::new(DirectoryCache::new(&dir));
        let location = Location::raw([(Tag::new(b"wdth"), 75.0)]);
        let result = assembler.make_instance(&source(), &location, &InstanceOptions::default());
        assert!(matches!(result, Err(Error::UnknownAxis(tag)) if tag == Tag::new(b"wdth")));
        assert!(!dir.exists());
    }

    #[test]
    fn overrides_apply_to_cached_instances() {
        let assembler = InstanceAssembler::new(MemoryCache::new());
        let source = source();
        let location = Location::raw([(wght(), 900.0)]);
        assembler
            .make_instance(&source, &location, &InstanceOptions::default())
            .unwrap();
        let options = InstanceOptions {
            kerning_overrides: BTreeMap::from([(
                ("A".to_string(), "B".to_string()),
                KerningValue::Advance(-25),
            )]),
            ..Default::default()
        };
        let instance = assembler.make_instance(&source, &location, &options).unwrap();
        assert_eq!(assembler.store().writes(), 1);
        let kerning = instance.kerning().unwrap();
        assert_eq!(kerning.get("A", "B"), Some(KerningValue::Advance(-25)));
        assert_eq!(kerning.len(), 1);
    }

    #[test]
    fn decimal_locations_keep_their_digits() {
        let assembler = InstanceAssembler::new(MemoryCache::new());
        let source = source();
        let key = assembler
            .cache_key(&source, &Location::raw([(wght(), 101.1)]))
            .unwrap();
        assert_eq!(key.file_name(), "MillSans-VF-wght101.1.ttf");
        assert_eq!(key.suffix(), "wght101.1");
        // the same point given as a normalized value shares the file
        let raw = assembler
            .cache_key(&source, &Location::raw([(wght(), 550.0)]))
            .unwrap();
        let normalized = assembler
            .cache_key(&source, &Location::normalized([(wght(), 0.3)]))
            .unwrap();
        assert_eq!(raw, normalized);

        let instance = assembler
            .make_instance(
                &source,
                &Location::raw([(wght(), 101.1)]),
                &InstanceOptions::default(),
            )
            .unwrap();
        assert_eq!(
            instance.path(),
            Some(Path::new("MillSans-VF-wght101.1.ttf"))
        );
        let font = instance.font_ref().unwrap();
        assert_eq!(
            names(&font, (3, 1, 0x409)),
            [
                Some("wght101.1".to_string()),
                Some("Mill Sans wght101.1".to_string()),
                Some("Mill-Sans-wght101.1".to_string()),
            ]
        );
    }

    #[test]
    fn source_font_is_never_replaced() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("MillSans-VF.ttf");
        let data = fontmill_test_data::variable_font();
        std::fs::write(&path, &data).unwrap();
        let source = Font::open(&path).unwrap();
        let assembler = InstanceAssembler::new(DirectoryCache::new(temp.path()));
        let default = Location::raw([(wght(), 400.0)]);

        for options in [InstanceOptions::default(), InstanceOptions::uncached()] {
            let result = assembler.make_instance(&source, &default, &options);
            assert!(matches!(result, Err(Error::InstanceIsSource(p)) if p == path));
        }
        assert_eq!(std::fs::read(&path).unwrap(), data);
        assert!(Font::open(&path).unwrap().is_variable());

        // other locations can still be stored next to the source
        let instance = assembler
            .make_instance(
                &source,
                &Location::raw([(wght(), 900.0)]),
                &InstanceOptions::default(),
            )
            .unwrap();
        assert_eq!(
            instance.path(),
            Some(temp.path().join("MillSans-VF-wght900.ttf").as_path())
        );
    }
}
