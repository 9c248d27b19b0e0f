//! Reading gene locations straight from GAF annotation files.

use std::collections::{HashMap, HashSet};
use std::io::prelude::*;

use crate::context::ContextBuilder;
use crate::error::Result;
use crate::location::LocationRecord;
use crate::types::{IdType, Strand};

const GENE_FIELD: usize = 15;
const LOCATION_FIELD: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GafLocation {
    pub gene: String,
    pub chromosome: String,
    pub start: i64,
    pub end: i64,
    pub strand: Option<Strand>,
}

/// Parses `chr:start[-end][:strand]`; a location without an end is a
/// single base.
fn parse_location(gene: &str, location: &str) -> Option<GafLocation> {
    let mut parts = location.trim().split(':');
    let chromosome = parts.next()?;
    let range = parts.next()?;
    let strand = parts.next().and_then(Strand::parse);

    let (start, end) = match range.split_once('-') {
        Some((start, end)) => (start, end),
        None => (range, range),
    };

    let start = btoi::btoi::<i64>(start.as_bytes()).ok()?;
    let end = btoi::btoi::<i64>(end.as_bytes()).ok()?;

    Some(GafLocation {
        gene: gene.to_string(),
        chromosome: chromosome.to_string(),
        start,
        end,
        strand,
    })
}

/// All locations listed on one GAF line. Lines that are too short, and
/// locations that don't parse, produce nothing.
pub fn parse_gaf_line(line: &str) -> Vec<GafLocation> {
    let fields = line.split('\t').collect::<Vec<_>>();

    if fields.len() <= LOCATION_FIELD {
        return Vec::new();
    }

    let gene = fields[GENE_FIELD].split('|').next().unwrap_or_default();
    if gene.is_empty() {
        return Vec::new();
    }

    fields[LOCATION_FIELD]
        .split(';')
        .filter(|loc| !loc.is_empty())
        .filter_map(|loc| {
            let parsed = parse_location(gene, loc);
            if parsed.is_none() {
                log::debug!("skipping location `{loc}` of gene {gene}");
            }
            parsed
        })
        .collect()
}

/// Reads every location in a GAF file, dropping repeated records and
/// keeping the order of first appearance.
pub fn read_gaf(reader: impl BufRead) -> Result<Vec<GafLocation>> {
    let mut seen = HashSet::new();
    let mut locations = Vec::new();

    for line in reader.lines() {
        let line = line?;
        for loc in parse_gaf_line(&line) {
            if seen.insert(loc.clone()) {
                locations.push(loc);
            }
        }
    }

    Ok(locations)
}

impl ContextBuilder {
    /// Adds the GAF locations, keyed `gene@chromosome`, with `#n`
    /// appended for the n:th repeat of a gene on the same chromosome.
    pub fn add_gaf_locations(
        &mut self,
        id_type: IdType,
        locations: &[GafLocation],
    ) -> Result<()> {
        let mut repeats: HashMap<(&str, &str), usize> = HashMap::new();

        for loc in locations {
            let count = repeats
                .entry((loc.gene.as_str(), loc.chromosome.as_str()))
                .or_default();

            let key = if *count == 0 {
                format!("{}@{}", loc.gene, loc.chromosome)
            } else {
                format!("{}@{}#{}", loc.gene, loc.chromosome, count)
            };
            *count += 1;

            let record = LocationRecord::new(loc.start, loc.end, loc.strand);
            let chromosome = loc.chromosome.as_str();
            self.add_location(id_type, &loc.gene, &key, chromosome, record)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{DEFAULT_CATEGORY, DEFAULT_GENE_TYPE};
    use crate::tables::tests::DATA_DIR;
    use crate::types::Bp;

    fn sample() -> Vec<GafLocation> {
        let path = format!("{DATA_DIR}sample.gaf");
        let file = std::fs::File::open(path).unwrap();
        read_gaf(std::io::BufReader::new(file)).unwrap()
    }

    #[test]
    fn location_strings() {
        let loc = parse_location("G", "chr1:10-20:+").unwrap();
        assert_eq!((loc.start, loc.end), (10, 20));
        assert_eq!(loc.strand, Some(Strand::Forward));

        let loc = parse_location("G", "chr1:15").unwrap();
        assert_eq!((loc.start, loc.end), (15, 15));
        assert_eq!(loc.strand, None);

        assert!(parse_location("G", "chr1").is_none());
        assert!(parse_location("G", "chr1:a-b").is_none());
    }

    #[test]
    fn read_sample() {
        let locations = sample();

        let genes = locations
            .iter()
            .map(|l| (l.gene.as_str(), l.chromosome.as_str(), l.start))
            .collect::<Vec<_>>();

        assert_eq!(
            genes,
            vec![
                ("C9orf62", "chr9", 138235095),
                ("KRTAP", "chr17", 3900705),
                ("KRTAP", "chr17", 4481333),
                ("SNP1", "chrX", 500),
            ]
        );

        assert_eq!(locations[1].strand, Some(Strand::Reverse));
        assert_eq!(locations[3].end, 500);
    }

    #[test]
    fn repeated_genes_get_numbered_keys() {
        let mut builder = ContextBuilder::new(DEFAULT_CATEGORY);
        let gene = builder.id_type(DEFAULT_GENE_TYPE);
        builder.add_chromosome("chr17", 81195210);
        builder.add_gaf_locations(gene, &sample()).unwrap();

        let ctx = builder.build();
        let location = ctx.genome().location;

        let first = ctx.id_of(location, "KRTAP@chr17").unwrap();
        let second = ctx.id_of(location, "KRTAP@chr17#1").unwrap();
        assert!(ctx.id_of(location, "KRTAP@chr17#2").is_none());

        let krtap = ctx.id_of(gene, "KRTAP").unwrap();
        let mapped = ctx.mapper().map_id(krtap, gene, location);
        assert_eq!(mapped.len(), 2);
        assert!(mapped.contains(first.0) && mapped.contains(second.0));

        let record = ctx.locations().location(second).unwrap();
        assert_eq!((record.start, record.end), (Bp(4481333), Bp(4481583)));
        assert_eq!(ctx.total_length("chr17"), Some(Bp(81195210)));
    }
}
