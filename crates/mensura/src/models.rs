use anyhow::Result;
use clap::Args;
use colored::Colorize;
use mensura_core::model::BUILT_IN;
use mensura_core::{Dimension, DimensionalModel};

use crate::config::ContextArgs;

/// Fundamental dimensions of the SI.
const FUNDAMENTALS: [char; 7] = ['L', 'M', 'T', 'I', 'Θ', 'N', 'J'];

#[derive(Args, Debug)]
#[command(about = "List the built-in dimensional models")]
pub struct ModelsArgs {
    #[command(flatten)]
    pub context: ContextArgs,
}

fn ancestry(model: &DimensionalModel) -> String {
    let mut chain = Vec::new();
    let mut parent = model.parent();
    while let Some(p) = parent {
        chain.push(p.name());
        parent = p.parent();
    }
    chain.join(" → ")
}

pub fn execute(args: ModelsArgs) -> Result<()> {
    let (_, active) = args.context.load()?;
    for model in BUILT_IN {
        let marker = if model == active { "*" } else { " " };
        let name = format!("{:<12}", model.name());
        let name = if model == active {
            name.green().bold()
        } else {
            name.normal()
        };
        match ancestry(model) {
            chain if chain.is_empty() => println!("{marker} {name}"),
            chain => println!("{marker} {name} extends {chain}"),
        }
        for (symbol, collapse) in model.own_collapses(&FUNDAMENTALS) {
            println!(
                "      {} → {}  ({})",
                Dimension::new(symbol),
                collapse.dimension,
                collapse.transform
            );
        }
    }
    Ok(())
}
