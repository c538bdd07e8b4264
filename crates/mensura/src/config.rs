use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Args;
use mensura_core::numeric::decimal_to_float;
use mensura_core::{Converter, DimensionalModel};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::parse::parse_unit;
use crate::registry::Registry;

/// Environment variable naming the dimensional model when `--model` is absent.
pub const MODEL_ENV: &str = "MENSURA_MODEL";

/// Contents of a `--config` TOML file.
///
/// ```toml
/// model = "relativistic"
///
/// [[unit]]
/// symbol = "fur"
/// of = "m"
/// factor = "201.168"
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub model: Option<String>,
    #[serde(default, rename = "unit")]
    pub units: Vec<UnitDefinition>,
}

/// A value `x` of the defined unit is `(x + offset) · factor` of `of`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UnitDefinition {
    pub symbol: String,
    pub of: String,
    pub factor: Option<Factor>,
    pub offset: Option<Decimal>,
    pub annotation: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Factor {
    Number(Decimal),
    Fraction(String),
}

impl Factor {
    /// Exact `dividend / divisor` of the factor.
    fn to_converter(&self) -> Result<Option<Converter>> {
        let (dividend, divisor) = match self {
            Factor::Number(value) => (*value, Decimal::ONE),
            Factor::Fraction(text) => match text.split_once('/') {
                Some((n, d)) => (parse_decimal(n)?, parse_decimal(d)?),
                None => (parse_decimal(text)?, Decimal::ONE),
            },
        };
        if dividend == divisor {
            return Ok(None);
        }
        if divisor.is_zero() {
            bail!("factor has a zero divisor");
        }
        // n₁/10^s₁ ÷ n₂/10^s₂ = n₁·10^s₂ / (n₂·10^s₁)
        let scaled = |value: Decimal, other: Decimal| {
            value
                .mantissa()
                .checked_mul(10i128.pow(other.scale()))
                .with_context(|| format!("factor {dividend}/{divisor} is too large"))
        };
        let mut numer = scaled(dividend, divisor)?;
        let mut denom = scaled(divisor, dividend)?;
        if denom < 0 {
            numer = -numer;
            denom = -denom;
        }
        Ok(Some(Converter::rational(numer, denom)?))
    }
}

pub fn parse_decimal(text: &str) -> Result<Decimal> {
    let text = text.trim();
    text.parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(text))
        .with_context(|| format!("'{text}' is not a decimal number"))
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Add every unit definition to `registry`, in file order, so later
    /// definitions may build on earlier ones.
    pub fn apply(&self, registry: &mut Registry) -> Result<()> {
        for definition in &self.units {
            let unit = definition
                .build(registry)
                .with_context(|| format!("Invalid definition of unit '{}'", definition.symbol))?;
            registry.define(definition.symbol.clone(), unit);
        }
        Ok(())
    }
}

impl UnitDefinition {
    fn build(&self, registry: &Registry) -> Result<mensura_core::Unit> {
        let mut unit = parse_unit(&self.of, registry)?;
        if let Some(factor) = &self.factor {
            if let Some(converter) = factor.to_converter()? {
                unit = unit.transform(converter)?;
            }
        }
        if let Some(offset) = self.offset.filter(|o| !o.is_zero()) {
            unit = unit.shift(decimal_to_float(offset)?)?;
        }
        if let Some(annotation) = &self.annotation {
            unit = unit.annotate(annotation.as_str());
        }
        Ok(unit)
    }
}

/// Options shared by every command that parses units.
#[derive(Args, Debug, Default)]
pub struct ContextArgs {
    /// Dimensional model: standard, relativistic, high-energy, quantum or natural
    #[arg(short, long, value_name = "NAME")]
    pub model: Option<String>,

    /// TOML file with a default model and extra unit definitions
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl ContextArgs {
    /// The unit registry and dimensional model these options select.
    pub fn load(&self) -> Result<(Registry, &'static DimensionalModel)> {
        let config = self.config.as_deref().map(Config::load).transpose()?;
        let mut registry = Registry::with_si();
        if let Some(config) = &config {
            config.apply(&mut registry)?;
        }
        let model = resolve_model(self.model.as_deref(), config.as_ref())?;
        log::debug!("using {model} model");
        Ok((registry, model))
    }
}

/// Resolve the active model: `--model`, then `MENSURA_MODEL`, then the
/// config file, then the standard model.
pub fn resolve_model(
    flag: Option<&str>,
    config: Option<&Config>,
) -> Result<&'static DimensionalModel> {
    let env = std::env::var(MODEL_ENV).ok();
    let name = flag
        .map(str::to_string)
        .or(env)
        .or_else(|| config.and_then(|c| c.model.clone()));
    match name {
        Some(name) => Ok(name.parse()?),
        None => Ok(&mensura_core::model::STANDARD),
    }
}
