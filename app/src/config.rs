use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::Result;

use genemap_core::context::{
    ContextBuilder, MappingContext, DEFAULT_CATEGORY, DEFAULT_GENE_TYPE,
};
use genemap_core::gaf;
use genemap_core::interval_index::Axis;
use genemap_core::tables::{self, TablePaths};

pub const DEFAULT_WIDTH: f32 = 1000.0;

#[derive(Debug, Default)]
pub struct Args {
    pub gaf: Option<PathBuf>,
    pub locations: Option<PathBuf>,
    pub gene2loc: Option<PathBuf>,
    pub loc2chr: Option<PathBuf>,
    pub chromosomes: PathBuf,

    pub id_type: Option<String>,
    pub chromosome: Option<String>,

    pub range: Option<(f32, f32)>,
    pub width: Option<f32>,
    pub vertical: bool,

    pub genes: Vec<String>,
}

impl Args {
    pub fn from_env() -> std::result::Result<Self, pico_args::Error> {
        Self::parse(pico_args::Arguments::from_env())
    }

    pub fn parse(
        mut pargs: pico_args::Arguments,
    ) -> std::result::Result<Self, pico_args::Error> {
        let gaf = pargs.opt_value_from_os_str("--gaf", parse_path)?;
        let locations = pargs.opt_value_from_os_str("--locations", parse_path)?;
        let gene2loc = pargs.opt_value_from_os_str("--gene2loc", parse_path)?;
        let loc2chr = pargs.opt_value_from_os_str("--loc2chr", parse_path)?;
        let chromosomes = pargs.value_from_os_str("--chromosomes", parse_path)?;

        let id_type = pargs.opt_value_from_str("--id-type")?;
        let chromosome = pargs.opt_value_from_str("--chromosome")?;

        let range = pargs.opt_value_from_fn("--range", parse_range)?;
        let width = pargs.opt_value_from_str("--width")?;
        let vertical = pargs.contains("--vertical");

        let mut genes = Vec::new();
        for arg in pargs.finish() {
            let arg = arg
                .into_string()
                .map_err(|_| pico_args::Error::NonUtf8Argument)?;
            if arg.starts_with("--") {
                return Err(pico_args::Error::ArgumentParsingFailed {
                    cause: format!("unknown option `{arg}`"),
                });
            }
            genes.push(arg);
        }

        Ok(Self {
            gaf,
            locations,
            gene2loc,
            loc2chr,
            chromosomes,
            id_type,
            chromosome,
            range,
            width,
            vertical,
            genes,
        })
    }
}

/// Where the location data is read from.
#[derive(Debug, Clone)]
pub enum Source {
    Gaf { gaf: PathBuf, chromosomes: PathBuf },
    Tables(TablePaths),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub source: Source,
    pub id_type: String,
    pub chromosome: Option<String>,

    pub axis: Axis,
    pub size: [f32; 2],
    pub range: Option<(f32, f32)>,

    pub genes: Vec<String>,
}

impl Config {
    pub fn from_args(args: Args) -> Result<Self> {
        let tables = (args.gaf, args.locations, args.gene2loc, args.loc2chr);
        let source = match tables {
            (Some(gaf), None, None, None) => Source::Gaf {
                gaf,
                chromosomes: args.chromosomes,
            },
            (None, Some(locations), Some(gene2loc), Some(loc2chr)) => {
                Source::Tables(TablePaths {
                    locations,
                    gene2loc,
                    loc2chr,
                    chromosomes: args.chromosomes,
                })
            }
            (Some(_), _, _, _) => {
                anyhow::bail!("--gaf can't be combined with the table options")
            }
            _ => anyhow::bail!(
                "either --gaf, or all of --locations, --gene2loc and \
                 --loc2chr, must be given"
            ),
        };

        let width = args.width.unwrap_or(DEFAULT_WIDTH);
        if !(width > 0.0) {
            anyhow::bail!("--width must be positive");
        }

        let (axis, size) = if args.vertical {
            (Axis::Vertical, [1.0, width])
        } else {
            (Axis::Horizontal, [width, 1.0])
        };

        Ok(Self {
            source,
            id_type: args.id_type.unwrap_or_else(|| DEFAULT_GENE_TYPE.into()),
            chromosome: args.chromosome,
            axis,
            size,
            range: args.range,
            genes: args.genes,
        })
    }

    pub fn load_context(&self) -> Result<MappingContext> {
        let ctx = match &self.source {
            Source::Tables(paths) => {
                MappingContext::from_tsv(paths, &self.id_type)?
            }
            Source::Gaf { gaf, chromosomes } => {
                let mut builder = ContextBuilder::new(DEFAULT_CATEGORY);
                let gene = builder.id_type(&self.id_type);

                let lengths = tables::read_chromosome_lengths(chromosomes)?;
                for (name, total) in lengths {
                    builder.add_chromosome(&name, total);
                }

                let reader = BufReader::new(File::open(gaf)?);
                let locations = gaf::read_gaf(reader)?;
                log::debug!("read {} locations from {gaf:?}", locations.len());

                builder.add_gaf_locations(gene, &locations)?;
                builder.build()
            }
        };

        Ok(ctx)
    }
}

fn parse_range(s: &str) -> Result<(f32, f32)> {
    const ERROR_MSG: &str = "Range must be in the format `start-end`, \
where `start` and `end` are numbers in [0, 1] and `start` <= `end`";

    let Some((start, end)) = s.trim().split_once('-') else {
        anyhow::bail!(ERROR_MSG);
    };

    let start = start.parse::<f32>()?;
    let end = end.parse::<f32>()?;

    let unit = 0.0..=1.0;
    if !unit.contains(&start) || !unit.contains(&end) || start > end {
        anyhow::bail!(ERROR_MSG);
    }

    Ok((start, end))
}

fn parse_path(
    s: &std::ffi::OsStr,
) -> std::result::Result<PathBuf, &'static str> {
    Ok(s.into())
}
