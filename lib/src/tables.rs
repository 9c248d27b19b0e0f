use std::fs::File;
use std::io::prelude::*;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::context::{ContextBuilder, MappingContext, DEFAULT_CATEGORY};
use crate::error::{Error, Result};
use crate::location::{LocationTable, LOCATION_END_COLUMN};
use crate::store::{RawTable, RawValue};

/// The four tab-separated tables describing where genes are located.
#[derive(Debug, Clone)]
pub struct TablePaths {
    /// `GeneLocation Gene Chromosome Start End Strand`
    pub locations: PathBuf,
    /// `Gene GeneLocation`
    pub gene2loc: PathBuf,
    /// `GeneLocation Chromosome`
    pub loc2chr: PathBuf,
    /// `Chromosome TotalLength`
    pub chromosomes: PathBuf,
}

impl TablePaths {
    /// The file names used when the tables are stored side by side.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            locations: dir.join("gene.genome.gaf.csv"),
            gene2loc: dir.join("gene.genome.gaf.gene2loc.csv"),
            loc2chr: dir.join("gene.genome.gaf.loc2chr.csv"),
            chromosomes: dir.join("chromosomeMetaData.csv"),
        }
    }
}

/// Calls `f` with the line number and fields of every line after the
/// header. Lines with fewer than `min_fields` fields are skipped.
pub(crate) fn for_each_record(
    path: &Path,
    min_fields: usize,
    mut f: impl FnMut(usize, &[&[u8]]) -> Result<()>,
) -> Result<()> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let mut line_buf = Vec::new();
    let mut line_no = 0;

    loop {
        line_buf.clear();

        let len = reader.read_until(b'\n', &mut line_buf)?;
        if len == 0 {
            break;
        }
        line_no += 1;

        if line_no == 1 {
            continue;
        }

        let mut line = &line_buf[..len];
        while let Some((b'\n' | b'\r', rest)) = line.split_last() {
            line = rest;
        }

        if line.is_empty() {
            continue;
        }

        let fields = line.split(|&c| c == b'\t').collect::<Vec<_>>();

        if fields.len() < min_fields {
            log::warn!(
                "{}:{line_no}: expected {min_fields} fields, found {}",
                path.display(),
                fields.len()
            );
            continue;
        }

        f(line_no, &fields)?;
    }

    Ok(())
}

pub(crate) fn field_str<'a>(
    path: &Path,
    line: usize,
    field: &'a [u8],
) -> Result<&'a str> {
    std::str::from_utf8(field)
        .map(str::trim)
        .map_err(|e| Error::parse(path, line, e.to_string()))
}

/// Reads the chromosome length table into (name, total length) pairs.
/// Missing or non-numeric lengths are read as 0, i.e. unknown.
pub fn read_chromosome_lengths(
    path: impl AsRef<Path>,
) -> Result<Vec<(String, i64)>> {
    let path = path.as_ref();
    let mut lengths = Vec::new();

    for_each_record(path, 1, |line, fields| {
        let name = field_str(path, line, fields[0])?;
        let total = fields
            .get(1)
            .and_then(|f| RawValue::parse(f).as_i64())
            .unwrap_or(0);
        lengths.push((name.to_string(), total));
        Ok(())
    })?;

    Ok(lengths)
}

impl MappingContext {
    /// Loads the mapping tables, with the genes in `gene2loc` read as
    /// identifiers of type `gene_type`.
    pub fn from_tsv(paths: &TablePaths, gene_type: &str) -> Result<Self> {
        let mut builder = ContextBuilder::new(DEFAULT_CATEGORY);
        let gene = builder.id_type(gene_type);
        let genome = builder.genome();

        let path = paths.gene2loc.as_path();
        for_each_record(path, 2, |line, fields| {
            let g = field_str(path, line, fields[0])?;
            let l = field_str(path, line, fields[1])?;
            builder.mapper_mut().insert_labels(gene, genome.location, g, l)?;
            Ok(())
        })?;

        let path = paths.loc2chr.as_path();
        for_each_record(path, 2, |line, fields| {
            let l = field_str(path, line, fields[0])?;
            let c = field_str(path, line, fields[1])?;
            builder
                .mapper_mut()
                .insert_labels(genome.location, genome.chromosome, l, c)?;
            Ok(())
        })?;

        let mut location_store = RawTable::default();
        let path = paths.locations.as_path();
        for_each_record(path, LOCATION_END_COLUMN + 2, |line, fields| {
            let key = field_str(path, line, fields[0])?;
            let id = builder
                .mapper_mut()
                .types_mut()
                .intern(genome.location, key);
            let row = fields[1..].iter().map(|f| RawValue::parse(f)).collect();
            location_store.insert_row(id, row);
            Ok(())
        })?;

        let mut chromosome_store = RawTable::default();
        let path = paths.chromosomes.as_path();
        for_each_record(path, 1, |line, fields| {
            let key = field_str(path, line, fields[0])?;
            let id = builder
                .mapper_mut()
                .types_mut()
                .intern(genome.chromosome, key);
            let row = fields[1..].iter().map(|f| RawValue::parse(f)).collect();
            chromosome_store.insert_row(id, row);
            Ok(())
        })?;

        *builder.locations_mut() =
            LocationTable::from_stores(&location_store, &chromosome_store);

        log::debug!(
            "loaded {} locations on {} chromosomes",
            builder.locations_mut().location_count(),
            chromosome_store.len()
        );

        Ok(builder.build())
    }
}
