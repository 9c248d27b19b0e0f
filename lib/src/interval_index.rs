use std::collections::BTreeSet;

use roaring::RoaringBitmap;

use crate::chromosome::ChromosomeResolver;
use crate::context::MappingContext;
use crate::error::Result;
use crate::normalize::{LocationNormalizer, NormalizedInterval};
use crate::types::{Id, IdType};

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    #[default]
    Horizontal,
    Vertical,
}

impl Axis {
    /// The component of a `[width, height]` pair along this axis.
    #[inline]
    pub fn select(&self, size: [f32; 2]) -> f32 {
        match self {
            Axis::Horizontal => size[0],
            Axis::Vertical => size[1],
        }
    }
}

/// An interval in pixel (or other unit) space along an axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenInterval {
    pub offset: f32,
    pub extent: f32,
}

impl ScreenInterval {
    fn scaled(v: NormalizedInterval, total: f32) -> Self {
        Self {
            offset: total * v.lo,
            extent: total * v.extent(),
        }
    }

    pub fn end(&self) -> f32 {
        self.offset + self.extent
    }

    /// Same rule as `NormalizedInterval::overlaps`: an endpoint lies in
    /// `other`, or `self` strictly contains it.
    pub fn overlaps(&self, other: &ScreenInterval) -> bool {
        let (a, b) = (other.offset, other.end());
        let (a, b) = (a.min(b), a.max(b));
        let (lo, hi) = (self.offset, self.end());

        let in_range = |t: f32| t >= a && t <= b;
        in_range(lo) || in_range(hi) || (lo < a && hi > b)
    }
}

/// Overlap queries over an ordered list of ids, all placed on the
/// normalizer's active chromosome.
///
/// Nothing is cached; every query resolves the ids again, so changing
/// the chromosome takes effect immediately.
pub struct IntervalIndex<'a> {
    axis: Axis,
    ids: &'a [Id],
    id_type: Option<IdType>,
    normalizer: LocationNormalizer<'a>,
}

impl<'a> IntervalIndex<'a> {
    /// Without an `id_type` the index can be drawn but not selected
    /// from. Gene-based normalizers require an id type compatible with
    /// the chromosome category.
    pub fn new(
        axis: Axis,
        ids: &'a [Id],
        id_type: Option<IdType>,
        normalizer: LocationNormalizer<'a>,
    ) -> Result<Self> {
        if let LocationNormalizer::GeneBased(locator) = &normalizer {
            let id_type = id_type.unwrap_or(locator.source());
            locator.context().check_compatible(id_type)?;
        }

        Ok(Self {
            axis,
            ids,
            id_type,
            normalizer,
        })
    }

    /// A gene-based index on `requested`, or on the chromosome most of
    /// `ids` are located on if none of them are on `requested`.
    pub fn for_genes(
        ctx: &'a MappingContext,
        axis: Axis,
        ids: &'a [Id],
        id_type: IdType,
        requested: Option<&str>,
    ) -> Result<Self> {
        ctx.check_compatible(id_type)?;

        let chromosome = ChromosomeResolver::new(ctx)
            .select_chromosome(requested, ids, id_type)?;
        let normalizer =
            LocationNormalizer::gene_based(ctx, id_type, &chromosome)?;

        Self::new(axis, ids, Some(id_type), normalizer)
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn ids(&self) -> &'a [Id] {
        self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn id_type(&self) -> Option<IdType> {
        self.id_type
    }

    pub fn is_selectable(&self) -> bool {
        self.id_type.is_some()
    }

    pub fn normalizer(&self) -> &LocationNormalizer<'a> {
        &self.normalizer
    }

    pub fn chromosome(&self) -> &str {
        self.normalizer.chromosome()
    }

    pub fn set_chromosome(&mut self, chromosome: &str) {
        self.normalizer.set_chromosome(chromosome);
    }

    pub fn chromosome_choices(&self) -> Option<BTreeSet<String>> {
        self.normalizer.chromosome_choices(self.ids)
    }

    pub fn resolve(&self, id: Id) -> Option<NormalizedInterval> {
        self.normalizer
            .resolve(id)
            .filter(|v| !v.lo.is_nan() && !v.hi.is_nan())
    }

    pub fn resolve_at(&self, index: usize) -> Option<NormalizedInterval> {
        let id = *self.ids.get(index)?;
        self.resolve(id)
    }

    /// Every id that can be placed, with its position in the id list.
    pub fn resolved(
        &self,
    ) -> impl Iterator<Item = (usize, Id, NormalizedInterval)> + '_ {
        self.ids
            .iter()
            .enumerate()
            .filter_map(|(ix, &id)| Some((ix, id, self.resolve(id)?)))
    }

    /// Ids whose interval has an endpoint in `[a, b]`, or strictly
    /// contains it.
    pub fn ids_overlapping(&self, a: f32, b: f32) -> RoaringBitmap {
        let (a, b) = (a.min(b), a.max(b));

        self.resolved()
            .filter(|(_, _, v)| v.overlaps(a, b))
            .map(|(_, id, _)| id.0)
            .collect()
    }

    /// Scales the interval of the id at `index` to `size` along the
    /// index axis.
    pub fn location_of(
        &self,
        index: usize,
        size: [f32; 2],
    ) -> Option<ScreenInterval> {
        let total = self.axis.select(size);
        let v = self.resolve_at(index)?;
        Some(ScreenInterval::scaled(v, total))
    }

    /// Inverse of `location_of`. Intervals are compared after scaling
    /// to `size`, so `ids_at(location_of(i))` always contains the id
    /// at `i`, points included.
    pub fn ids_at(
        &self,
        range: ScreenInterval,
        size: [f32; 2],
    ) -> RoaringBitmap {
        let total = self.axis.select(size);
        if total <= 0.0 {
            return RoaringBitmap::new();
        }

        self.resolved()
            .filter(|(_, _, v)| {
                ScreenInterval::scaled(*v, total).overlaps(&range)
            })
            .map(|(_, id, _)| id.0)
            .collect()
    }

    /// A point in unit space mapped to `[0, 1]` along the index axis.
    pub fn normalize_point(&self, point: [f32; 2], size: [f32; 2]) -> f32 {
        let total = self.axis.select(size);
        if total <= 0.0 {
            return 0.0;
        }
        self.axis.select(point) / total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::tests::{example_context, gene_ids};
    use crate::context::DEFAULT_GENE_TYPE;
    use crate::error::Error;
    use crate::types::Bp;

    const LABELS: [&str; 7] = ["A", "B", "C", "MULTI", "G", "UNMAPPED", "D"];

    fn bitmap(ids: &[Id]) -> RoaringBitmap {
        ids.iter().map(|id| id.0).collect()
    }

    fn gene_index<'a>(
        ctx: &'a MappingContext,
        ids: &'a [Id],
        chromosome: &str,
    ) -> IntervalIndex<'a> {
        let gene = ctx.id_type(DEFAULT_GENE_TYPE).unwrap();
        let normalizer =
            LocationNormalizer::gene_based(ctx, gene, chromosome).unwrap();
        IntervalIndex::new(Axis::Horizontal, ids, Some(gene), normalizer)
            .unwrap()
    }

    #[test]
    fn overlapping_endpoints() {
        let ctx = example_context();
        let ids = gene_ids(&ctx, &LABELS);
        let (a, b, c, multi) = (ids[0], ids[1], ids[2], ids[3]);
        let index = gene_index(&ctx, &ids, "1");

        // A: 0.1-0.2, B: 0.25-0.3, C: 0.5, MULTI: 0.9-0.95
        assert_eq!(index.ids_overlapping(0.15, 0.27), bitmap(&[a, b]));
        assert_eq!(index.ids_overlapping(0.27, 0.15), bitmap(&[a, b]));
        assert_eq!(index.ids_overlapping(0.4, 0.6), bitmap(&[c]));
        assert_eq!(index.ids_overlapping(0.95, 1.0), bitmap(&[multi]));
        assert!(index.ids_overlapping(0.6, 0.8).is_empty());
    }

    #[test]
    fn point_query_inside_interval() {
        let ctx = example_context();
        let ids = gene_ids(&ctx, &LABELS);
        let index = gene_index(&ctx, &ids, "1");

        assert_eq!(index.ids_overlapping(0.15, 0.15), bitmap(&[ids[0]]));
        assert_eq!(index.ids_overlapping(0.5, 0.5), bitmap(&[ids[2]]));
    }

    #[test]
    fn full_range_is_superset() {
        let ctx = example_context();
        let ids = gene_ids(&ctx, &LABELS);
        let index = gene_index(&ctx, &ids, "1");

        let all = index.ids_overlapping(0.0, 1.0);
        assert_eq!(all.len(), 4);

        let queries = [
            (0.0, 0.0),
            (0.1, 0.3),
            (0.22, 0.23),
            (0.5, 0.92),
            (1.0, 1.0),
        ];
        for (a, b) in queries {
            let hits = index.ids_overlapping(a, b);
            assert!(hits.is_subset(&all), "{a}-{b}");
        }
    }

    #[test]
    fn unavailable_ids_are_excluded() {
        let ctx = example_context();
        let ids = gene_ids(&ctx, &LABELS);
        let index = gene_index(&ctx, &ids, "1");

        let all = index.ids_overlapping(0.0, 1.0);
        // G is on X, UNMAPPED has no locations, D is on 2
        for ix in [4, 5, 6] {
            assert!(!all.contains(ids[ix].0));
            assert!(index.location_of(ix, [100.0, 10.0]).is_none());
        }
        assert_eq!(index.resolved().count(), 4);
    }

    #[test]
    fn locations_along_axis() {
        let ctx = example_context();
        let ids = gene_ids(&ctx, &LABELS);
        let index = gene_index(&ctx, &ids, "1");

        let loc = index.location_of(0, [1000.0, 20.0]).unwrap();
        assert!((loc.offset - 100.0).abs() < 1e-3);
        assert!((loc.extent - 100.0).abs() < 1e-3);

        let gene = ctx.id_type(DEFAULT_GENE_TYPE).unwrap();
        let normalizer =
            LocationNormalizer::gene_based(&ctx, gene, "1").unwrap();
        let vertical =
            IntervalIndex::new(Axis::Vertical, &ids, Some(gene), normalizer)
                .unwrap();
        let loc = vertical.location_of(0, [1000.0, 20.0]).unwrap();
        assert!((loc.offset - 2.0).abs() < 1e-4);
        assert!((loc.extent - 2.0).abs() < 1e-4);
    }

    #[test]
    fn location_round_trip() {
        let ctx = example_context();
        let ids = gene_ids(&ctx, &LABELS);
        let index = gene_index(&ctx, &ids, "1");
        let size = [733.0, 20.0];

        for ix in 0..index.len() {
            if let Some(loc) = index.location_of(ix, size) {
                let hits = index.ids_at(loc, size);
                assert!(hits.contains(ids[ix].0), "index {ix}");
            }
        }

        let empty = ScreenInterval {
            offset: 0.0,
            extent: 10.0,
        };
        assert!(index.ids_at(empty, [0.0, 0.0]).is_empty());
    }

    #[test]
    fn point_features_round_trip() {
        let ctx = example_context();
        let ids = (0..1000).map(Id).collect::<Vec<_>>();
        let normalizer = LocationNormalizer::raw_coordinate(&ctx, "X", |id| {
            Some((Bp(id.0 as u64), Bp(id.0 as u64)))
        });
        let index =
            IntervalIndex::new(Axis::Horizontal, &ids, None, normalizer)
                .unwrap();

        for width in [733.0, 1000.0, 640.0, 1920.0, 123.0] {
            let size = [width, 1.0];
            for (ix, id) in ids.iter().enumerate() {
                let loc = index.location_of(ix, size).unwrap();
                assert_eq!(loc.extent, 0.0);
                let hits = index.ids_at(loc, size);
                assert!(hits.contains(id.0), "width {width}, index {ix}");
            }
        }
    }

    #[test]
    fn screen_overlap_rule() {
        let span = |offset, extent| ScreenInterval { offset, extent };
        let v = span(20.0, 20.0);

        assert!(v.overlaps(&span(10.0, 10.0)));
        assert!(v.overlaps(&span(30.0, 0.0)));
        assert!(v.overlaps(&span(0.0, 100.0)));
        assert!(!v.overlaps(&span(0.0, 10.0)));
        assert!(!v.overlaps(&span(45.0, 5.0)));

        // negative extents are read as the reversed range
        assert!(v.overlaps(&span(30.0, -20.0)));
    }

    #[test]
    fn switching_chromosome() {
        let ctx = example_context();
        let ids = gene_ids(&ctx, &LABELS);
        let mut index = gene_index(&ctx, &ids, "1");
        assert!(index.resolve_at(0).is_some());
        assert!(index.resolve_at(4).is_none());

        index.set_chromosome("X");
        assert_eq!(index.chromosome(), "X");
        assert!(index.resolve_at(0).is_none());
        assert!(index.resolve_at(4).is_some());

        index.set_chromosome("unknown");
        assert!(index.ids_overlapping(0.0, 1.0).is_empty());
    }

    #[test]
    fn genes_on_default_chromosome() {
        let ctx = example_context();
        let gene = ctx.id_type(DEFAULT_GENE_TYPE).unwrap();
        let ids = gene_ids(&ctx, &["A", "B", "G"]);

        let index =
            IntervalIndex::for_genes(&ctx, Axis::Horizontal, &ids, gene, None)
                .unwrap();
        assert_eq!(index.chromosome(), "1");
        assert!(index.is_selectable());

        let index = IntervalIndex::for_genes(
            &ctx,
            Axis::Horizontal,
            &ids,
            gene,
            Some("X"),
        )
        .unwrap();
        assert_eq!(index.chromosome(), "X");

        let choices = index.chromosome_choices().unwrap();
        assert_eq!(choices.len(), 2);

        let result =
            IntervalIndex::for_genes(&ctx, Axis::Horizontal, &[], gene, None);
        assert!(matches!(result, Err(Error::NoDefaultChromosome)));

        let index = IntervalIndex::for_genes(
            &ctx,
            Axis::Horizontal,
            &[],
            gene,
            Some("X"),
        )
        .unwrap();
        assert_eq!(index.chromosome(), "X");
        assert!(index.ids_overlapping(0.0, 1.0).is_empty());
    }

    #[test]
    fn incompatible_selection_type() {
        let mut builder = MappingContext::builder("GENE");
        let gene = builder.id_type(DEFAULT_GENE_TYPE);
        let samples =
            builder.mapper_mut().types_mut().register_category("SAMPLE");
        let sample = builder
            .mapper_mut()
            .types_mut()
            .register_type("SAMPLE_ID", samples);
        let ctx = builder.build();

        let ids = [Id(0)];
        let normalizer =
            LocationNormalizer::gene_based(&ctx, gene, "1").unwrap();
        let result = IntervalIndex::new(
            Axis::Horizontal,
            &ids,
            Some(sample),
            normalizer,
        );
        assert!(matches!(result, Err(Error::IncompatibleIdType { .. })));

        let result = IntervalIndex::for_genes(
            &ctx,
            Axis::Horizontal,
            &ids,
            sample,
            None,
        );
        assert!(matches!(result, Err(Error::IncompatibleIdType { .. })));
    }

    #[test]
    fn raw_coordinates_without_id_type() {
        let ctx = example_context();
        let ids = [Id(0), Id(1), Id(2)];
        let positions = [(Bp(100), Bp(300)), (Bp(600), Bp(600))];
        let normalizer = LocationNormalizer::raw_coordinate(&ctx, "X", |id| {
            positions.get(id.ix()).copied()
        });

        let index =
            IntervalIndex::new(Axis::Horizontal, &ids, None, normalizer)
                .unwrap();
        assert!(!index.is_selectable());
        assert!(index.chromosome_choices().is_none());

        assert_eq!(index.ids_overlapping(0.2, 0.6), bitmap(&[Id(0), Id(1)]));
        assert_eq!(index.normalize_point([50.0, 3.0], [200.0, 10.0]), 0.25);
    }
}
