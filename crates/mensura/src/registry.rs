use std::collections::BTreeMap;

use mensura_core::Unit;
use mensura_core::si::{self, CATALOGUE, SI_PREFIXES};

/// Units known by symbol, including user-defined ones from the config file.
#[derive(Debug, Clone)]
pub struct Registry {
    units: BTreeMap<String, Unit>,
}

impl Registry {
    pub fn with_si() -> Self {
        let units = CATALOGUE
            .iter()
            .map(|(symbol, unit)| (symbol.to_string(), (*unit).clone()))
            .collect();
        Registry { units }
    }

    /// Register `unit` under `symbol`, replacing any previous definition.
    pub fn define(&mut self, symbol: impl Into<String>, unit: Unit) {
        let symbol = symbol.into();
        log::debug!("defining unit {symbol} = {unit}");
        self.units.insert(symbol, unit);
    }

    /// Resolve a single unit symbol. Exact symbols win over prefixed forms,
    /// so `min` is the minute and `Pa` the pascal.
    pub fn lookup(&self, symbol: &str) -> Option<Unit> {
        if let Some(unit) = self.units.get(symbol) {
            return Some(unit.clone());
        }
        let micro = std::iter::once((-6, "u"));
        for (exp, prefix) in SI_PREFIXES.iter().copied().chain(micro) {
            let Some(rest) = symbol.strip_prefix(prefix) else {
                continue;
            };
            let Some(unit) = self.units.get(rest) else {
                continue;
            };
            match si::prefixed(unit, exp) {
                Ok(prefixed) => return Some(prefixed),
                Err(e) => log::debug!("cannot prefix {rest} with {prefix}: {e}"),
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_symbols_win_over_prefixes() {
        let registry = Registry::with_si();
        assert_eq!(registry.lookup("min"), Some((*si::MINUTE).clone()));
        assert_eq!(registry.lookup("Pa"), Some((*si::PASCAL).clone()));
        assert_eq!(registry.lookup("cd"), Some((*si::CANDELA).clone()));
    }

    #[test]
    fn prefixes_fall_back_to_registered_units() {
        let registry = Registry::with_si();
        assert_eq!(registry.lookup("km"), Some((*si::KILOMETRE).clone()));
        assert_eq!(registry.lookup("mg"), si::prefixed(&si::GRAM, -3).ok());
        assert_eq!(registry.lookup("us"), si::prefixed(&si::SECOND, -6).ok());
        assert_eq!(registry.lookup("dam"), si::prefixed(&si::METRE, 1).ok());
        assert_eq!(registry.lookup("furlong"), None);
    }

    #[test]
    fn definitions_are_visible() {
        let mut registry = Registry::with_si();
        let furlong = si::METRE.times_ratio(201_168, 1000).unwrap();
        registry.define("fur", furlong.clone());
        assert_eq!(registry.lookup("fur"), Some(furlong));
    }
}
