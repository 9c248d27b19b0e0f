use anyhow::Result;

use genemap::config::{Args, Config};
use genemap_core::interval_index::IntervalIndex;
use genemap_core::selection::{SelectionDelta, SelectionSet};
use genemap_core::Id;

pub fn main() -> Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Warn)
        .init();

    let args = match Args::from_env() {
        Ok(args) => args,
        Err(e) => {
            let name = std::env::args().next().unwrap_or("genemap".into());
            eprintln!("{e}");
            println!("Usage: {name} --chromosomes <tsv> [options] [genes...]");
            println!("Location data, one of:");
            println!("  --gaf <gaf>");
            println!("  --locations <tsv> --gene2loc <tsv> --loc2chr <tsv>");
            println!("Options:");
            println!("  --id-type <name> --chromosome <name>");
            println!("  --range <start-end> --width <px> --vertical");
            std::process::exit(0);
        }
    };

    let config = Config::from_args(args)?;
    run(&config)
}

fn run(config: &Config) -> Result<()> {
    let ctx = config.load_context()?;
    let id_type = ctx.id_type(&config.id_type)?;

    let mut ids: Vec<Id> = Vec::with_capacity(config.genes.len());
    for label in &config.genes {
        if let Some(id) = ctx.id_of(id_type, label) {
            ids.push(id);
        } else {
            log::warn!("unknown {} identifier `{label}`", config.id_type);
        }
    }

    let index = IntervalIndex::for_genes(
        &ctx,
        config.axis,
        &ids,
        id_type,
        config.chromosome.as_deref(),
    )?;

    let total = index
        .normalizer()
        .total_length()
        .map(|bp| bp.0.to_string())
        .unwrap_or_else(|| "unknown".into());
    println!("chromosome {} ({total} bp)", index.chromosome());

    if let Some(choices) = index.chromosome_choices() {
        let choices = choices.into_iter().collect::<Vec<_>>();
        println!("available: {}", choices.join(", "));
    }

    let label = |id: Id| ctx.label(id_type, id).unwrap_or("?");

    for (i, &id) in ids.iter().enumerate() {
        match (index.resolve_at(i), index.location_of(i, config.size)) {
            (Some(v), Some(px)) => println!(
                "{}\t{:.6}-{:.6}\t{:.1}+{:.1}",
                label(id),
                v.lo,
                v.hi,
                px.offset,
                px.extent
            ),
            _ => println!("{}\tunavailable", label(id)),
        }
    }

    if let Some((a, b)) = config.range {
        let mut selection = SelectionSet::default();
        let delta =
            SelectionDelta::replace(&selection, &index.ids_overlapping(a, b));
        selection.apply(&delta);

        let hits = selection.ids().map(label).collect::<Vec<_>>();
        println!("{a}-{b}: {}", hits.join(" "));
    }

    Ok(())
}
