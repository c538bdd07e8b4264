use anyhow::{Context, Result};
use clap::Args;
use mensura_core::{Precision, fmt_float};

use crate::config::{ContextArgs, parse_decimal};
use crate::parse::parse_unit;

#[derive(Args, Debug)]
#[command(about = "Convert a value from one unit to another")]
pub struct ConvertArgs {
    /// Value to convert
    #[arg(allow_hyphen_values = true)]
    pub value: String,

    /// Unit expression of the value, e.g. km/h
    pub from: String,

    /// Unit expression to convert to
    pub to: String,

    /// Convert on exact decimals instead of floats
    #[arg(short, long)]
    pub exact: bool,

    /// Significant digits of an exact result (exact to the last digit if omitted)
    #[arg(short, long, value_name = "DIGITS", requires = "exact")]
    pub precision: Option<u32>,

    #[command(flatten)]
    pub context: ContextArgs,
}

pub fn execute(args: ConvertArgs) -> Result<()> {
    let (registry, model) = args.context.load()?;
    let from = parse_unit(&args.from, &registry)
        .with_context(|| format!("Invalid source unit '{}'", args.from))?;
    let to = parse_unit(&args.to, &registry)
        .with_context(|| format!("Invalid target unit '{}'", args.to))?;

    let _scope = model.enter();
    let converter = from.converter_to(&to)?;
    log::debug!("{from} -> {to}: {converter}");

    if args.exact {
        let value = parse_decimal(&args.value)?;
        let precision = args.precision.map_or(Precision::Unlimited, Precision::Digits);
        let result = converter
            .convert_exact(value, precision)
            .with_context(|| format!("Cannot convert {} exactly", args.value))?;
        println!("{} {}", result.normalize(), args.to);
    } else {
        let value: f64 = args
            .value
            .trim()
            .parse()
            .with_context(|| format!("'{}' is not a number", args.value))?;
        println!("{} {}", fmt_float(converter.convert(value)), args.to);
    }
    Ok(())
}
