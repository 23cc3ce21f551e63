//! Applying `gvar` deltas to glyph outlines and horizontal metrics.
//!
//! Every glyph carries four phantom points after its own points: the left
//! and right side of the advance, then the top and bottom. Varying the
//! first two is how the advance width and side bearing change.

use std::collections::{BTreeMap, HashMap};

use fontmill_read::{
    tables::{
        glyf::{Glyf, Glyph as ReadGlyph},
        gvar::Gvar,
        hmtx::Hmtx,
        loca::Loca,
        variations::TupleVariation,
    },
    FontRef, ReadError, TableProvider,
};
use fontmill_types::{BoundingBox, GlyphId, Point, Tag};
use fontmill_write::tables::glyf::{
    Anchor, Bbox, CompositeGlyph, CompositeGlyphFlags, CurvePoint, Glyph, SimpleGlyph, Transform,
};
use rayon::prelude::*;

use crate::{
    iup::infer_deltas,
    scalar::{ot_round, round_i16, SupportRegion},
    Error,
};

const GVAR: Tag = Tag::new(b"gvar");
const GLYF: Tag = Tag::new(b"glyf");

/// Composite glyphs nested deeper than this are rejected.
const MAX_COMPONENT_DEPTH: usize = 64;
const PHANTOM_POINT_COUNT: usize = 4;

/// A glyph at a location in the design space, with its horizontal metrics.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlyphOutline {
    pub glyph: Glyph,
    pub advance: u16,
    pub side_bearing: i16,
}

/// Computes glyph outlines at one location.
///
/// The coordinates are normalized, in axis order, with any `avar` mapping
/// already applied.
pub struct OutlineInterpolator<'a> {
    glyf: Glyf<'a>,
    loca: Loca<'a>,
    gvar: Option<Gvar<'a>>,
    hmtx: Hmtx<'a>,
    num_glyphs: u16,
    ascender: i16,
    units_per_em: u16,
    coords: Vec<f64>,
}

impl<'a> OutlineInterpolator<'a> {
    pub fn new(font: &FontRef<'a>, coords: Vec<f64>) -> Result<Self, Error> {
        let gvar = match font.gvar() {
            Ok(gvar) => Some(gvar),
            Err(ReadError::TableIsMissing(_)) => None,
            Err(e) => return Err(Error::corrupt(GVAR, e)),
        };
        if let Some(gvar) = &gvar {
            if gvar.axis_count() as usize != coords.len() {
                return Err(Error::corrupt(
                    GVAR,
                    format!("{} axes, expected {}", gvar.axis_count(), coords.len()),
                ));
            }
        }
        let hhea = font.hhea()?;
        Ok(OutlineInterpolator {
            glyf: font.glyf()?,
            loca: font.loca(None)?,
            gvar,
            hmtx: font.hmtx()?,
            num_glyphs: font.maxp()?.num_glyphs(),
            ascender: hhea.ascender(),
            units_per_em: font.head()?.units_per_em(),
            coords,
        })
    }

    pub fn num_glyphs(&self) -> u16 {
        self.num_glyphs
    }

    pub fn coords(&self) -> &[f64] {
        &self.coords
    }

    /// The outline and metrics of a single glyph.
    ///
    /// For a composite glyph the components are computed as well, to find
    /// the bounding box.
    pub fn outline(&self, glyph_id: GlyphId) -> Result<GlyphOutline, Error> {
        let varied = self.vary(glyph_id)?;
        let mut resolved = HashMap::new();
        let points = self.flatten_nested(&varied.glyph, &mut resolved, 0)?;
        varied.finish(points)
    }

    /// The outlines and metrics of every glyph, in glyph order.
    ///
    /// Glyphs are varied in parallel. Composite bounding boxes are then
    /// computed one nesting depth at a time, so that components are always
    /// done before the glyphs that use them.
    pub fn interpolate_all(&self) -> Result<Vec<GlyphOutline>, Error> {
        let varied = (0..self.num_glyphs as usize)
            .into_par_iter()
            .map(|gid| self.vary(GlyphId::new(gid as u16)))
            .collect::<Result<Vec<_>, _>>()?;

        let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for (gid, depth) in component_depths(&varied)?.into_iter().enumerate() {
            groups.entry(depth).or_default().push(gid);
        }

        let mut flattened: Vec<Option<Vec<Point<f64>>>> = vec![None; varied.len()];
        for (depth, group) in groups {
            log::debug!("bounding {} glyphs at component depth {depth}", group.len());
            let lookup = &flattened;
            let resolved = group
                .par_iter()
                .map(|gid| {
                    flatten(&varied[*gid].glyph, move |id| {
                        lookup.get(id.to_usize())?.as_deref()
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            for (gid, points) in group.into_iter().zip(resolved) {
                flattened[gid] = Some(points);
            }
        }

        varied
            .into_iter()
            .zip(flattened)
            .map(|(glyph, points)| glyph.finish(points.unwrap_or_default()))
            .collect()
    }

    /// Apply the variations of one glyph.
    ///
    /// Composite bounding boxes are left as stored; they depend on the
    /// components and are computed afterwards.
    fn vary(&self, glyph_id: GlyphId) -> Result<VariedGlyph, Error> {
        let glyph = self.glyf.glyph(&self.loca, glyph_id)?;
        let advance = self.hmtx.advance(glyph_id).unwrap_or_default();
        let side_bearing = self.hmtx.side_bearing(glyph_id).unwrap_or_default();
        let x_min = glyph.as_ref().map(|g| g.x_min()).unwrap_or_default();
        let origin_x = x_min as f64 - side_bearing as f64;
        let phantoms = [
            Point::new(origin_x, 0.0),
            Point::new(origin_x + advance as f64, 0.0),
            Point::new(0.0, self.ascender as f64),
            Point::new(0.0, self.ascender as f64 - self.units_per_em as f64),
        ];

        let (mut original, mut contour_ends, source) = match glyph {
            None => (Vec::new(), Vec::new(), Source::Empty),
            Some(ReadGlyph::Simple(simple)) => {
                let points = simple.points()?;
                let coords = points
                    .iter()
                    .map(|pt| Point::new(pt.x as f64, pt.y as f64))
                    .collect::<Vec<_>>();
                let ends = simple
                    .end_pts_of_contours()
                    .iter()
                    .map(|end| end.get() as usize)
                    .collect::<Vec<_>>();
                let source = Source::Simple {
                    glyph: SimpleGlyph::from_read(&simple)?,
                    points,
                    overlap: simple.has_overlapping_contours(),
                };
                (coords, ends, source)
            }
            Some(ReadGlyph::Composite(composite)) => {
                // one point per component; anchoring on points has no offset
                let offsets = composite
                    .components()
                    .map(|component| match component.anchor {
                        Anchor::Offset { x, y } => Point::new(x as f64, y as f64),
                        Anchor::Point { .. } => Point::default(),
                    })
                    .collect::<Vec<_>>();
                let ends = (0..offsets.len()).collect();
                (
                    offsets,
                    ends,
                    Source::Composite(CompositeGlyph::from_read(&composite)),
                )
            }
        };
        let num_points = original.len();
        original.extend(phantoms);
        contour_ends.extend(num_points..num_points + PHANTOM_POINT_COUNT);

        let Some(deltas) = self.glyph_deltas(glyph_id, &original, &contour_ends)? else {
            return Ok(VariedGlyph {
                glyph_id,
                glyph: source.into_glyph(),
                origin_x,
                advance,
            });
        };
        let varied = original
            .iter()
            .zip(&deltas)
            .map(|(point, delta)| *point + *delta)
            .collect::<Vec<_>>();
        let (outline, phantoms) = varied.split_at(num_points);
        let out_of_range = || {
            Error::corrupt(
                GVAR,
                format!("glyph {glyph_id} moves outside the coordinate range"),
            )
        };
        let round = |point: &Point<f64>| -> Result<(i16, i16), Error> {
            Ok((
                round_i16(point.x).ok_or_else(out_of_range)?,
                round_i16(point.y).ok_or_else(out_of_range)?,
            ))
        };

        let glyph = match source {
            Source::Empty => Glyph::Empty,
            Source::Simple {
                glyph: template,
                points: read_points,
                overlap,
            } => {
                let points = read_points
                    .iter()
                    .zip(outline)
                    .map(|(read, point)| {
                        let (x, y) = round(point)?;
                        Ok(CurvePoint::new(x, y, read.on_curve))
                    })
                    .collect::<Result<Vec<_>, Error>>()?;
                let ends = contour_ends[..template.contours().len()]
                    .iter()
                    .map(|end| *end as u16);
                SimpleGlyph::from_points(&points, ends)
                    .map_err(|e| Error::corrupt(GLYF, e))?
                    .with_instructions(template.instructions())
                    .with_overlap(overlap)
                    .into()
            }
            Source::Composite(mut composite) => {
                for (component, offset) in composite.components_mut().iter_mut().zip(outline) {
                    if let Anchor::Offset { .. } = component.anchor {
                        let (x, y) = round(offset)?;
                        component.anchor = Anchor::Offset { x, y };
                    }
                }
                composite.into()
            }
        };
        let advance = ot_round(phantoms[1].x - phantoms[0].x).clamp(0.0, u16::MAX as f64) as u16;
        Ok(VariedGlyph {
            glyph_id,
            glyph,
            origin_x: phantoms[0].x,
            advance,
        })
    }

    /// The weighted sum of the deltas of every tuple variation that applies
    /// to a glyph, or `None` if none does.
    fn glyph_deltas(
        &self,
        glyph_id: GlyphId,
        original: &[Point<f64>],
        contour_ends: &[usize],
    ) -> Result<Option<Vec<Point<f64>>>, Error> {
        let Some(gvar) = &self.gvar else {
            return Ok(None);
        };
        if glyph_id.to_u16() >= gvar.glyph_count() {
            return Ok(None);
        }
        let Some(data) = gvar
            .glyph_variation_data(glyph_id)
            .map_err(|e| Error::corrupt(GVAR, e))?
        else {
            return Ok(None);
        };
        let mut total: Option<Vec<Point<f64>>> = None;
        for tuple in data.tuples() {
            let tuple = tuple.map_err(|e| Error::corrupt(GVAR, e))?;
            let scalar = SupportRegion::from_tuple(&tuple, self.coords.len()).scalar(&self.coords);
            if scalar == 0.0 {
                continue;
            }
            let explicit = tuple_deltas(&tuple, original.len())?;
            let deltas = infer_deltas(original, contour_ends, &explicit).ok_or_else(|| {
                Error::corrupt(GVAR, format!("bad contours for glyph {glyph_id}"))
            })?;
            let total = total.get_or_insert_with(|| vec![Point::default(); original.len()]);
            for (sum, delta) in total.iter_mut().zip(deltas) {
                *sum += delta * scalar;
            }
        }
        Ok(total)
    }

    fn flatten_nested(
        &self,
        glyph: &Glyph,
        resolved: &mut HashMap<GlyphId, Vec<Point<f64>>>,
        nesting: usize,
    ) -> Result<Vec<Point<f64>>, Error> {
        if let Glyph::Composite(composite) = glyph {
            if nesting >= MAX_COMPONENT_DEPTH {
                return Err(too_deep());
            }
            for component in composite.components() {
                if resolved.contains_key(&component.glyph) {
                    continue;
                }
                if component.glyph.to_u16() >= self.num_glyphs {
                    return Err(missing_component());
                }
                let child = self.vary(component.glyph)?;
                let points = self.flatten_nested(&child.glyph, resolved, nesting + 1)?;
                resolved.insert(component.glyph, points);
            }
        }
        let resolved: &HashMap<_, _> = resolved;
        flatten(glyph, move |id| resolved.get(&id).map(Vec::as_slice))
    }
}

/// What a glyph looked like before variation.
enum Source {
    Empty,
    Simple {
        glyph: SimpleGlyph,
        points: Vec<CurvePoint>,
        overlap: bool,
    },
    Composite(CompositeGlyph),
}

impl Source {
    fn into_glyph(self) -> Glyph {
        match self {
            Source::Empty => Glyph::Empty,
            Source::Simple { glyph, .. } => glyph.into(),
            Source::Composite(glyph) => glyph.into(),
        }
    }
}

struct VariedGlyph {
    glyph_id: GlyphId,
    glyph: Glyph,
    /// The x coordinate of the left phantom point.
    origin_x: f64,
    advance: u16,
}

impl VariedGlyph {
    /// Set the composite bounding box from the flattened points and compute
    /// the side bearing.
    fn finish(self, points: Vec<Point<f64>>) -> Result<GlyphOutline, Error> {
        let mut glyph = self.glyph;
        if let Glyph::Composite(composite) = &mut glyph {
            composite.bbox = bounding_box(&points).ok_or_else(|| {
                Error::corrupt(GVAR, format!("glyph {} is out of range", self.glyph_id))
            })?;
        }
        let x_min = glyph.bbox().map(|bbox| bbox.x_min).unwrap_or_default();
        let side_bearing = round_i16(x_min as f64 - self.origin_x).ok_or_else(|| {
            Error::corrupt(
                GVAR,
                format!("side bearing of glyph {} is out of range", self.glyph_id),
            )
        })?;
        Ok(GlyphOutline {
            glyph,
            advance: self.advance,
            side_bearing,
        })
    }
}

/// The deltas explicitly given by one tuple variation, by point index.
fn tuple_deltas(
    tuple: &TupleVariation,
    num_points: usize,
) -> Result<Vec<Option<Point<f64>>>, Error> {
    let mut result = vec![None; num_points];
    let point_numbers = tuple
        .point_numbers()
        .map(|points| points.collect::<Vec<_>>());
    let count = point_numbers.as_ref().map_or(num_points, Vec::len);
    let values = tuple.deltas().take(2 * count).collect::<Vec<_>>();
    if values.len() != 2 * count {
        return Err(Error::corrupt(
            GVAR,
            format!("expected {} deltas, found {}", 2 * count, values.len()),
        ));
    }
    let (xs, ys) = values.split_at(count);
    let deltas = xs
        .iter()
        .zip(ys)
        .map(|(x, y)| Point::new(*x as f64, *y as f64));
    match point_numbers {
        None => {
            for (slot, delta) in result.iter_mut().zip(deltas) {
                *slot = Some(delta);
            }
        }
        Some(points) => {
            for (point, delta) in points.into_iter().zip(deltas) {
                let slot = result.get_mut(point as usize).ok_or_else(|| {
                    Error::corrupt(GVAR, format!("point {point} is out of range"))
                })?;
                *slot.get_or_insert_with(Point::default) += delta;
            }
        }
    }
    Ok(result)
}

/// How deeply each glyph nests components; simple and empty glyphs are `0`.
fn component_depths(glyphs: &[VariedGlyph]) -> Result<Vec<usize>, Error> {
    fn depth_of(
        gid: usize,
        glyphs: &[VariedGlyph],
        depths: &mut [Option<usize>],
        nesting: usize,
    ) -> Result<usize, Error> {
        if let Some(depth) = depths.get(gid).copied().flatten() {
            return Ok(depth);
        }
        if nesting > MAX_COMPONENT_DEPTH {
            return Err(too_deep());
        }
        let glyph = glyphs.get(gid).ok_or_else(missing_component)?;
        let mut depth = 0;
        if let Glyph::Composite(composite) = &glyph.glyph {
            for component in composite.components() {
                let child = depth_of(component.glyph.to_usize(), glyphs, depths, nesting + 1)?;
                depth = depth.max(child + 1);
            }
        }
        depths[gid] = Some(depth);
        Ok(depth)
    }

    let mut depths = vec![None; glyphs.len()];
    (0..glyphs.len())
        .map(|gid| depth_of(gid, glyphs, &mut depths, 0))
        .collect()
}

/// All the points of a glyph with its components placed, given the points
/// of each component glyph.
fn flatten<'p>(
    glyph: &Glyph,
    component_points: impl Fn(GlyphId) -> Option<&'p [Point<f64>]>,
) -> Result<Vec<Point<f64>>, Error> {
    let composite = match glyph {
        Glyph::Empty => return Ok(Vec::new()),
        Glyph::Simple(simple) => {
            return Ok(simple
                .points()
                .map(|pt| Point::new(pt.x as f64, pt.y as f64))
                .collect())
        }
        Glyph::Composite(composite) => composite,
    };
    let mut points: Vec<Point<f64>> = Vec::new();
    for component in composite.components() {
        let child = component_points(component.glyph).ok_or_else(missing_component)?;
        let transformed = child
            .iter()
            .map(|point| transform(&component.transform, *point))
            .collect::<Vec<_>>();
        let offset = match component.anchor {
            Anchor::Offset { x, y } => {
                let offset = Point::new(x as f64, y as f64);
                let flags = component.flags;
                if flags.contains(CompositeGlyphFlags::SCALED_COMPONENT_OFFSET)
                    && !flags.contains(CompositeGlyphFlags::UNSCALED_COMPONENT_OFFSET)
                {
                    transform(&component.transform, offset)
                } else {
                    offset
                }
            }
            Anchor::Point { base, component } => {
                match (points.get(base as usize), transformed.get(component as usize)) {
                    (Some(base), Some(component)) => *base - *component,
                    _ => {
                        return Err(Error::Read(ReadError::MalformedData(
                            "component anchor point out of range",
                        )))
                    }
                }
            }
        };
        points.extend(transformed.into_iter().map(|point| point + offset));
    }
    Ok(points)
}

fn transform(transform: &Transform, point: Point<f64>) -> Point<f64> {
    if transform.is_identity() {
        return point;
    }
    let [xx, yx, xy, yy] = [transform.xx, transform.yx, transform.xy, transform.yy].map(|v| v.to_f64());
    Point::new(xx * point.x + xy * point.y, yx * point.x + yy * point.y)
}

/// The integer bounds of some points; no points is an empty box at the
/// origin.
fn bounding_box(points: &[Point<f64>]) -> Option<Bbox> {
    let Some(bounds) = BoundingBox::from_points(points.iter().copied()) else {
        return Some(Bbox::default());
    };
    Some(Bbox {
        x_min: round_i16(bounds.x_min)?,
        y_min: round_i16(bounds.y_min)?,
        x_max: round_i16(bounds.x_max)?,
        y_max: round_i16(bounds.y_max)?,
    })
}

fn too_deep() -> Error {
    Error::Read(ReadError::MalformedData("composite glyphs nested too deeply"))
}

fn missing_component() -> Error {
    Error::Read(ReadError::MalformedData("component glyph does not exist"))
}
