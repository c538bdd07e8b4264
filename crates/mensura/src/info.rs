use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use mensura_core::Unit;

use crate::config::ContextArgs;
use crate::parse::parse_unit;

#[derive(Args, Debug)]
#[command(about = "Describe a unit expression")]
pub struct InfoArgs {
    /// Unit expression, e.g. kg·m^2/s^2
    pub unit: String,

    #[command(flatten)]
    pub context: ContextArgs,
}

fn kind(unit: &Unit) -> &'static str {
    match unit {
        Unit::Base(_) => "base",
        Unit::Alternate(_) => "alternate",
        Unit::Product(_) => "product",
        Unit::Transformed(_) => "transformed",
        Unit::Annotated(_) => "annotated",
    }
}

fn field(label: &str, value: impl std::fmt::Display) {
    println!("{:<22} {value}", format!("{label}:").bold());
}

pub fn execute(args: InfoArgs) -> Result<()> {
    let (registry, model) = args.context.load()?;
    let unit = parse_unit(&args.unit, &registry)
        .with_context(|| format!("Invalid unit '{}'", args.unit))?;

    println!("{}", unit.to_string().blue().bold());
    field("Kind", kind(&unit));
    if let Some(symbol) = unit.symbol() {
        field("Symbol", symbol);
    }
    if let Some(factors) = unit.product_elements().filter(|f| !f.is_empty()) {
        let listed: Vec<_> = factors
            .iter()
            .map(|f| match (f.pow(), f.root()) {
                (pow, 1) => format!("{}^{pow}", f.base()),
                (pow, root) => format!("{}^({pow}/{root})", f.base()),
            })
            .collect();
        field("Factors", listed.join(", "));
    }

    let dimension = unit.dimension()?;
    field("Dimension", &dimension);
    field("System unit", unit.to_system_unit()?);
    match unit.converter_to_system_unit() {
        Ok(converter) => {
            field("To system unit", &converter);
            field("Linear", if converter.is_linear() { "yes" } else { "no" });
        }
        Err(e) => field("To system unit", e.to_string().yellow()),
    }
    field(
        &format!("Dimension ({model})"),
        model.fundamental_dimension(&dimension)?,
    );
    Ok(())
}
