use std::collections::HashMap;

use crate::store::DataStore;
use crate::types::{Bp, Id, Strand};

// columns of the location store, after the record key
pub const LOCATION_START_COLUMN: usize = 2;
pub const LOCATION_END_COLUMN: usize = 3;
pub const LOCATION_STRAND_COLUMN: usize = 4;

// columns of the chromosome store, after the record key
pub const CHROMOSOME_LENGTH_COLUMN: usize = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocationRecord {
    pub start: Bp,
    pub end: Bp,
    pub strand: Option<Strand>,
}

impl LocationRecord {
    /// Coordinates are reordered so that `start <= end`; negative
    /// coordinates are rejected.
    pub fn new(start: i64, end: i64, strand: Option<Strand>) -> Option<Self> {
        if start < 0 || end < 0 {
            return None;
        }
        let (start, end) = if end < start {
            (end, start)
        } else {
            (start, end)
        };

        Some(Self {
            start: Bp(start as u64),
            end: Bp(end as u64),
            strand,
        })
    }

    pub fn len(&self) -> u64 {
        self.end.0 - self.start.0
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Base pair coordinates per location record, and total length per
/// chromosome record. Keyed by the ids of the location and chromosome
/// identifier types respectively.
#[derive(Debug, Clone, Default)]
pub struct LocationTable {
    locations: HashMap<Id, LocationRecord>,
    chromosome_lengths: HashMap<Id, i64>,
}

impl LocationTable {
    pub fn from_stores(
        locations: &dyn DataStore,
        chromosomes: &dyn DataStore,
    ) -> Self {
        let mut table = Self::default();

        for record in locations.records() {
            let start = locations.raw_value(LOCATION_START_COLUMN, record);
            let end = locations.raw_value(LOCATION_END_COLUMN, record);
            let strand = locations.raw_value(LOCATION_STRAND_COLUMN, record);

            let (Some(start), Some(end)) = (start.as_i64(), end.as_i64()) else {
                log::debug!("location record {record:?} has no coordinates");
                continue;
            };

            let strand = strand.as_str().and_then(Strand::parse);

            if let Some(loc) = LocationRecord::new(start, end, strand) {
                table.locations.insert(record, loc);
            } else {
                log::warn!(
                    "location record {record:?} has negative coordinates: \
{start}-{end}"
                );
            }
        }

        for record in chromosomes.records() {
            let total = chromosomes.raw_value(CHROMOSOME_LENGTH_COLUMN, record);
            table
                .chromosome_lengths
                .insert(record, total.as_i64().unwrap_or(0));
        }

        table
    }

    pub fn insert_location(&mut self, location: Id, record: LocationRecord) {
        self.locations.insert(location, record);
    }

    pub fn insert_chromosome(&mut self, chromosome: Id, total_length: i64) {
        self.chromosome_lengths.insert(chromosome, total_length);
    }

    pub fn location(&self, location: Id) -> Option<&LocationRecord> {
        self.locations.get(&location)
    }

    /// `None` if the chromosome is missing or its length is not positive.
    pub fn total_length(&self, chromosome: Id) -> Option<Bp> {
        let len = *self.chromosome_lengths.get(&chromosome)?;
        (len > 0).then_some(Bp(len as u64))
    }

    pub fn chromosomes(&self) -> impl Iterator<Item = Id> + '_ {
        self.chromosome_lengths.keys().copied()
    }

    pub fn location_count(&self) -> usize {
        self.locations.len()
    }
}
