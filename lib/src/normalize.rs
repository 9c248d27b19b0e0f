use std::collections::BTreeSet;

use crate::chromosome::ChromosomeResolver;
use crate::context::MappingContext;
use crate::error::Result;
use crate::types::{Bp, Id, IdType};

/// A base pair range scaled to `[0, 1]` by the length of its
/// chromosome. Both components are endpoints: `hi` is the scaled end
/// coordinate, not a width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedInterval {
    pub lo: f32,
    pub hi: f32,
}

impl NormalizedInterval {
    pub fn new(lo: f32, hi: f32) -> Self {
        Self { lo, hi }
    }

    pub fn from_bp(start: Bp, end: Bp, total_length: Bp) -> Self {
        let total = total_length.0 as f64;
        Self {
            lo: (start.0 as f64 / total) as f32,
            hi: (end.0 as f64 / total) as f32,
        }
    }

    /// Width of the interval, for drawing.
    pub fn extent(&self) -> f32 {
        self.hi - self.lo
    }

    pub fn contains(&self, t: f32) -> bool {
        self.lo <= t && t <= self.hi
    }

    /// True if either endpoint lies in `[a, b]`, or the interval
    /// strictly contains `[a, b]`. Expects `a <= b`.
    pub fn overlaps(&self, a: f32, b: f32) -> bool {
        let in_range = |t: f32| t >= a && t <= b;
        in_range(self.lo) || in_range(self.hi) || (self.lo < a && self.hi > b)
    }
}

fn load_total_length(ctx: &MappingContext, chromosome: &str) -> Option<Bp> {
    let total = ctx.total_length(chromosome);
    if total.is_none() {
        log::debug!("chromosome {chromosome} has no known length");
    }
    total
}

/// Places ids of a gene-like identifier type on one active chromosome,
/// by way of their location records.
#[derive(Debug, Clone)]
pub struct GeneLocator<'a> {
    ctx: &'a MappingContext,
    source: IdType,

    chromosome: String,
    chromosome_id: Option<Id>,
    total_length: Option<Bp>,
}

impl<'a> GeneLocator<'a> {
    pub fn new(
        ctx: &'a MappingContext,
        source: IdType,
        chromosome: &str,
    ) -> Result<Self> {
        ctx.check_compatible(source)?;

        Ok(Self {
            ctx,
            source,
            chromosome: chromosome.to_string(),
            chromosome_id: ctx.chromosome_id(chromosome),
            total_length: load_total_length(ctx, chromosome),
        })
    }

    pub fn source(&self) -> IdType {
        self.source
    }

    pub(crate) fn context(&self) -> &'a MappingContext {
        self.ctx
    }

    pub fn chromosome(&self) -> &str {
        &self.chromosome
    }

    pub fn total_length(&self) -> Option<Bp> {
        self.total_length
    }

    pub fn set_chromosome(&mut self, chromosome: &str) {
        if self.chromosome == chromosome {
            return;
        }

        self.chromosome = chromosome.to_string();
        self.chromosome_id = self.ctx.chromosome_id(chromosome);
        self.total_length = load_total_length(self.ctx, chromosome);
    }

    /// Of all locations of `id`, the first (by location id) that lies on
    /// the active chromosome is normalized.
    pub fn resolve(&self, id: Id) -> Option<NormalizedInterval> {
        let total_length = self.total_length?;
        let active = self.chromosome_id?;

        let genome = self.ctx.genome();
        let mapper = self.ctx.mapper();

        let locations = mapper.map_id(id, self.source, genome.location);

        let on_active = |loc: &u32| {
            mapper
                .map_id(Id(*loc), genome.location, genome.chromosome)
                .contains(active.0)
        };

        let location = locations.iter().find(on_active)?;

        if locations.len() > 1 {
            log::trace!(
                "{id:?} has {} locations, using {location} on {}",
                locations.len(),
                self.chromosome
            );
        }

        let record = self.ctx.locations().location(Id(location))?;
        Some(NormalizedInterval::from_bp(
            record.start,
            record.end,
            total_length,
        ))
    }
}

pub type PositionFn<'a> = Box<dyn Fn(Id) -> Option<(Bp, Bp)> + 'a>;

/// Normalizes coordinates supplied directly by the caller, for entities
/// such as point mutations that already carry a position.
pub struct RawCoordinateLocator<'a> {
    ctx: &'a MappingContext,
    chromosome: String,
    total_length: Option<Bp>,
    positions: PositionFn<'a>,
}

impl<'a> RawCoordinateLocator<'a> {
    pub fn new(
        ctx: &'a MappingContext,
        chromosome: &str,
        positions: impl Fn(Id) -> Option<(Bp, Bp)> + 'a,
    ) -> Self {
        Self {
            ctx,
            chromosome: chromosome.to_string(),
            total_length: load_total_length(ctx, chromosome),
            positions: Box::new(positions),
        }
    }

    pub fn chromosome(&self) -> &str {
        &self.chromosome
    }

    pub fn total_length(&self) -> Option<Bp> {
        self.total_length
    }

    pub fn set_chromosome(&mut self, chromosome: &str) {
        if self.chromosome == chromosome {
            return;
        }
        self.chromosome = chromosome.to_string();
        self.total_length = load_total_length(self.ctx, chromosome);
    }

    pub fn resolve(&self, id: Id) -> Option<NormalizedInterval> {
        let total_length = self.total_length?;
        let (start, end) = (self.positions)(id)?;
        Some(NormalizedInterval::from_bp(start, end, total_length))
    }
}

pub enum LocationNormalizer<'a> {
    GeneBased(GeneLocator<'a>),
    RawCoordinate(RawCoordinateLocator<'a>),
}

impl<'a> LocationNormalizer<'a> {
    pub fn gene_based(
        ctx: &'a MappingContext,
        source: IdType,
        chromosome: &str,
    ) -> Result<Self> {
        let locator = GeneLocator::new(ctx, source, chromosome)?;
        Ok(Self::GeneBased(locator))
    }

    pub fn raw_coordinate(
        ctx: &'a MappingContext,
        chromosome: &str,
        positions: impl Fn(Id) -> Option<(Bp, Bp)> + 'a,
    ) -> Self {
        let locator = RawCoordinateLocator::new(ctx, chromosome, positions);
        Self::RawCoordinate(locator)
    }

    pub fn resolve(&self, id: Id) -> Option<NormalizedInterval> {
        match self {
            Self::GeneBased(locator) => locator.resolve(id),
            Self::RawCoordinate(locator) => locator.resolve(id),
        }
    }

    pub fn chromosome(&self) -> &str {
        match self {
            Self::GeneBased(locator) => locator.chromosome(),
            Self::RawCoordinate(locator) => locator.chromosome(),
        }
    }

    pub fn total_length(&self) -> Option<Bp> {
        match self {
            Self::GeneBased(locator) => locator.total_length(),
            Self::RawCoordinate(locator) => locator.total_length(),
        }
    }

    pub fn set_chromosome(&mut self, chromosome: &str) {
        match self {
            Self::GeneBased(locator) => locator.set_chromosome(chromosome),
            Self::RawCoordinate(locator) => locator.set_chromosome(chromosome),
        }
    }

    pub fn source_type(&self) -> Option<IdType> {
        match self {
            Self::GeneBased(locator) => Some(locator.source()),
            Self::RawCoordinate(_) => None,
        }
    }

    /// Chromosomes a selector control should offer for `ids`. Only
    /// gene-based normalizers can switch chromosome meaningfully.
    pub fn chromosome_choices(&self, ids: &[Id]) -> Option<BTreeSet<String>> {
        match self {
            Self::GeneBased(locator) => {
                let resolver = ChromosomeResolver::new(locator.ctx);
                Some(resolver.all_chromosomes_for(ids, locator.source))
            }
            Self::RawCoordinate(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::tests::{example_context, gene_ids};
    use crate::context::DEFAULT_GENE_TYPE;
    use crate::error::Error;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-6
    }

    fn gene_normalizer<'a>(
        ctx: &'a MappingContext,
        chromosome: &str,
    ) -> LocationNormalizer<'a> {
        let gene = ctx.id_type(DEFAULT_GENE_TYPE).unwrap();
        LocationNormalizer::gene_based(ctx, gene, chromosome).unwrap()
    }

    fn resolve_label(
        ctx: &MappingContext,
        normalizer: &LocationNormalizer,
        label: &str,
    ) -> Option<NormalizedInterval> {
        normalizer.resolve(gene_ids(ctx, &[label])[0])
    }

    #[test]
    fn endpoint_convention() {
        let ctx = example_context();
        let normalizer = gene_normalizer(&ctx, "X");

        let v = resolve_label(&ctx, &normalizer, "G").unwrap();
        assert!(approx(v.lo, 0.1));
        assert!(approx(v.hi, 0.3));
        assert!(approx(v.extent(), 0.2));
    }

    #[test]
    fn overlap_rule() {
        let v = NormalizedInterval::new(0.2, 0.4);

        assert!(v.overlaps(0.1, 0.2));
        assert!(v.overlaps(0.3, 0.9));
        assert!(v.overlaps(0.25, 0.3));
        assert!(v.overlaps(0.3, 0.3));
        assert!(v.overlaps(0.0, 1.0));
        assert!(!v.overlaps(0.0, 0.1));
        assert!(!v.overlaps(0.45, 0.5));

        let point = NormalizedInterval::new(0.5, 0.5);
        assert!(point.overlaps(0.5, 0.5));
        assert!(!point.overlaps(0.51, 0.6));
    }

    #[test]
    fn wrong_or_unknown_chromosome() {
        let ctx = example_context();

        let normalizer = gene_normalizer(&ctx, "1");
        assert!(resolve_label(&ctx, &normalizer, "G").is_none());
        assert!(resolve_label(&ctx, &normalizer, "PAR").is_none());

        // "Y" has no positive length
        let normalizer = gene_normalizer(&ctx, "Y");
        assert!(resolve_label(&ctx, &normalizer, "PAR").is_none());
    }

    #[test]
    fn unknown_chromosome_poisons_everything() {
        let ctx = example_context();
        let gene = ctx.id_type(DEFAULT_GENE_TYPE).unwrap();
        let mut normalizer = gene_normalizer(&ctx, "X");
        assert!(resolve_label(&ctx, &normalizer, "G").is_some());

        normalizer.set_chromosome("unknown");
        assert_eq!(normalizer.chromosome(), "unknown");
        assert!(normalizer.total_length().is_none());

        for (_, id) in ctx.types().labels(gene) {
            assert!(normalizer.resolve(id).is_none());
        }

        normalizer.set_chromosome("X");
        assert!(resolve_label(&ctx, &normalizer, "G").is_some());
    }

    #[test]
    fn ambiguous_locations() {
        let ctx = example_context();

        let normalizer = gene_normalizer(&ctx, "X");
        let v = resolve_label(&ctx, &normalizer, "PAR").unwrap();
        assert!(approx(v.lo, 0.0));
        assert!(approx(v.hi, 0.05));

        // both locations are on "1"; the first one wins
        let normalizer = gene_normalizer(&ctx, "1");
        let v = resolve_label(&ctx, &normalizer, "MULTI").unwrap();
        assert!(approx(v.lo, 0.9));
        assert!(approx(v.hi, 0.95));
    }

    #[test]
    fn missing_data_is_unavailable() {
        let ctx = example_context();

        let normalizer = gene_normalizer(&ctx, "2");
        assert!(resolve_label(&ctx, &normalizer, "NOCOORD").is_none());
        assert!(resolve_label(&ctx, &normalizer, "UNMAPPED").is_none());
        assert!(normalizer.resolve(Id(9999)).is_none());
        assert!(resolve_label(&ctx, &normalizer, "D").is_some());
    }

    #[test]
    fn resolved_intervals_are_normalized() {
        let ctx = example_context();
        let gene = ctx.id_type(DEFAULT_GENE_TYPE).unwrap();

        for chromosome in ["1", "2", "X"] {
            let normalizer = gene_normalizer(&ctx, chromosome);
            for (_, id) in ctx.types().labels(gene) {
                if let Some(v) = normalizer.resolve(id) {
                    assert!((0.0..=1.0).contains(&v.lo));
                    assert!((0.0..=1.0).contains(&v.hi));
                    assert!(v.lo <= v.hi);
                }
            }
        }

        let normalizer = gene_normalizer(&ctx, "1");
        let v = resolve_label(&ctx, &normalizer, "C").unwrap();
        assert_eq!(v.lo, v.hi);
        assert!(v.contains(0.5));
    }

    #[test]
    fn incompatible_source_type() {
        let mut ctx_builder = MappingContext::builder("GENE");
        let samples = ctx_builder
            .mapper_mut()
            .types_mut()
            .register_category("SAMPLE");
        let sample = ctx_builder
            .mapper_mut()
            .types_mut()
            .register_type("SAMPLE_ID", samples);
        let ctx = ctx_builder.build();

        let result = LocationNormalizer::gene_based(&ctx, sample, "1");
        assert!(matches!(result, Err(Error::IncompatibleIdType { .. })));
    }

    #[test]
    fn raw_coordinates() {
        let ctx = example_context();
        let positions = [(Bp(100), Bp(300)), (Bp(500), Bp(500))];

        let mut normalizer =
            LocationNormalizer::raw_coordinate(&ctx, "X", |id| {
                positions.get(id.ix()).copied()
            });

        let v = normalizer.resolve(Id(0)).unwrap();
        assert!(approx(v.lo, 0.1));
        assert!(approx(v.hi, 0.3));

        let v = normalizer.resolve(Id(1)).unwrap();
        assert!(approx(v.lo, 0.5));
        assert!(approx(v.extent(), 0.0));

        assert!(normalizer.resolve(Id(2)).is_none());
        assert!(normalizer.source_type().is_none());
        assert!(normalizer.chromosome_choices(&[Id(0)]).is_none());

        normalizer.set_chromosome("Y");
        assert!(normalizer.resolve(Id(0)).is_none());
    }

    #[test]
    fn gene_based_choices() {
        let ctx = example_context();
        let normalizer = gene_normalizer(&ctx, "X");
        let ids = gene_ids(&ctx, &["G", "A"]);

        let choices = normalizer.chromosome_choices(&ids).unwrap();
        let expected = ["1", "X"].map(String::from);
        assert_eq!(choices, BTreeSet::from(expected));
    }
}
