use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

use crate::context::MappingContext;
use crate::error::{Error, Result};
use crate::types::{Id, IdType};

/// Display order of chromosome names: case-insensitive, with exact
/// byte order between names that differ only in case.
pub fn chromosome_order(a: &str, b: &str) -> Ordering {
    let lower_a = a.chars().flat_map(char::to_lowercase);
    let lower_b = b.chars().flat_map(char::to_lowercase);
    lower_a.cmp(lower_b).then_with(|| a.cmp(b))
}

/// Answers which chromosomes a batch of ids lives on.
#[derive(Debug, Clone, Copy)]
pub struct ChromosomeResolver<'a> {
    ctx: &'a MappingContext,
}

impl<'a> ChromosomeResolver<'a> {
    pub fn new(ctx: &'a MappingContext) -> Self {
        Self { ctx }
    }

    fn names(&self, chromosomes: &roaring::RoaringBitmap) -> Vec<&'a str> {
        chromosomes
            .iter()
            .filter_map(|c| self.ctx.chromosome_name(Id(c)))
            .collect()
    }

    pub fn all_chromosomes_for(
        &self,
        ids: &[Id],
        id_type: IdType,
    ) -> BTreeSet<String> {
        let chromosome = self.ctx.genome().chromosome;
        let union = self
            .ctx
            .mapper()
            .map_union(ids.iter().copied(), id_type, chromosome);

        self.names(&union)
            .into_iter()
            .map(String::from)
            .collect()
    }

    /// Every chromosome name known to the context, in display order.
    pub fn all_known_chromosomes(&self) -> Vec<String> {
        let chromosome = self.ctx.genome().chromosome;
        let mut names = self
            .ctx
            .types()
            .labels(chromosome)
            .map(|(name, _)| name.to_string())
            .collect::<Vec<_>>();
        names.sort_by(|a, b| chromosome_order(a, b));
        names
    }

    /// The chromosome the most ids are located on. Each occurrence of
    /// an id in `ids` counts once for every chromosome it maps to; ties
    /// go to the name that comes first in display order.
    pub fn determine_default(
        &self,
        ids: &[Id],
        id_type: IdType,
    ) -> Result<String> {
        let chromosome = self.ctx.genome().chromosome;
        let per_id = self.ctx.mapper().map_seq(ids, id_type, chromosome);

        let mut counts: HashMap<u32, usize> = HashMap::new();
        for set in per_id.iter() {
            for c in set {
                *counts.entry(c).or_default() += 1;
            }
        }

        let best = counts
            .into_iter()
            .filter_map(|(c, count)| {
                let name = self.ctx.chromosome_name(Id(c))?;
                Some((name, count))
            })
            .max_by(|(a_name, a_count), (b_name, b_count)| {
                a_count
                    .cmp(b_count)
                    .then_with(|| chromosome_order(b_name, a_name))
            });

        let (name, count) = best.ok_or(Error::NoDefaultChromosome)?;
        log::debug!(
            "default chromosome {name}: {count} of {} identifiers",
            ids.len()
        );

        Ok(name.to_string())
    }

    /// Keeps `requested` if any of the ids are located on it, otherwise
    /// falls back to the default chromosome of `ids`. If there is no
    /// default either, a known `requested` chromosome is kept anyway.
    pub fn select_chromosome(
        &self,
        requested: Option<&str>,
        ids: &[Id],
        id_type: IdType,
    ) -> Result<String> {
        let Some(requested) = requested else {
            return self.determine_default(ids, id_type);
        };

        if self.all_chromosomes_for(ids, id_type).contains(requested) {
            return Ok(requested.to_string());
        }
        log::debug!("no identifiers on chromosome {requested}");

        match self.determine_default(ids, id_type) {
            Err(Error::NoDefaultChromosome)
                if self.ctx.chromosome_id(requested).is_some() =>
            {
                Ok(requested.to_string())
            }
            result => result,
        }
    }
}
