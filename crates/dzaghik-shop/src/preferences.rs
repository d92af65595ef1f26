//! Display currency and language choices, remembered between runs.

use dzaghik_cache::Cache;
use dzaghik_commerce::money::{display_price, Currency};
use dzaghik_commerce::CommerceError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const CURRENCY_KEY: &str = "dzaghik_currency";
pub const LANGUAGE_KEY: &str = "dzaghik_language";

/// Read a stored preference, falling back to the default on anything
/// missing or unreadable.
fn load_or_default<T>(cache: &Cache, key: &str) -> T
where
    T: FromStr + Default,
{
    match cache.get::<String>(key) {
        Ok(Some(code)) => code.parse().unwrap_or_else(|_| {
            tracing::warn!(key, %code, "ignoring unsupported stored preference");
            T::default()
        }),
        Ok(None) => T::default(),
        Err(e) => {
            tracing::warn!(key, error = %e, "failed to read stored preference");
            T::default()
        }
    }
}

fn store(cache: &Cache, key: &str, code: &str) {
    if let Err(e) = cache.set(key, code) {
        tracing::warn!(key, error = %e, "failed to persist preference");
    }
}

/// The currency prices are shown in. Defaults to dram.
#[derive(Debug, Clone)]
pub struct CurrencyPreference {
    cache: Cache,
    current: Currency,
}

impl CurrencyPreference {
    pub fn load(cache: Cache) -> Self {
        let current = load_or_default(&cache, CURRENCY_KEY);
        Self { cache, current }
    }

    pub fn get(&self) -> Currency {
        self.current
    }

    /// Switch currency by code. Unsupported codes leave the choice as is.
    pub fn set(&mut self, code: &str) -> Result<Currency, CommerceError> {
        let currency: Currency = code.trim().to_ascii_uppercase().parse()?;
        self.current = currency;
        store(&self.cache, CURRENCY_KEY, currency.code());
        Ok(currency)
    }

    /// Format a dram amount in the chosen currency.
    pub fn display(&self, base_amount: i64) -> String {
        display_price(Decimal::from(base_amount), self.current)
    }
}

/// Interface language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Armenian.
    #[default]
    Am,
    En,
    Ru,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::Am, Language::En, Language::Ru];

    pub fn code(&self) -> &'static str {
        match self {
            Language::Am => "am",
            Language::En => "en",
            Language::Ru => "ru",
        }
    }

    pub fn native_name(&self) -> &'static str {
        match self {
            Language::Am => "Հայերեն",
            Language::En => "English",
            Language::Ru => "Русский",
        }
    }
}

impl FromStr for Language {
    type Err = CommerceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::ALL
            .into_iter()
            .find(|lang| lang.code() == s)
            .ok_or_else(|| CommerceError::UnsupportedLanguage(s.to_string()))
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone)]
pub struct LanguagePreference {
    cache: Cache,
    current: Language,
}

impl LanguagePreference {
    pub fn load(cache: Cache) -> Self {
        let current = load_or_default(&cache, LANGUAGE_KEY);
        Self { cache, current }
    }

    pub fn get(&self) -> Language {
        self.current
    }

    pub fn set(&mut self, code: &str) -> Result<Language, CommerceError> {
        let language: Language = code.trim().to_ascii_lowercase().parse()?;
        self.current = language;
        store(&self.cache, LANGUAGE_KEY, language.code());
        Ok(language)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dzaghik_cache::MemoryStore;

    #[test]
    fn test_currency_defaults_to_dram() {
        let pref = CurrencyPreference::load(Cache::new(MemoryStore::new()));
        assert_eq!(pref.get(), Currency::AMD);
        assert_eq!(pref.display(18000), "18,000 ֏");
    }

    #[test]
    fn test_currency_persists() {
        let cache = Cache::new(MemoryStore::new());
        let mut pref = CurrencyPreference::load(cache.clone());
        assert_eq!(pref.set("usd").unwrap(), Currency::USD);
        assert_eq!(pref.display(18000), "$45.00");

        let reloaded = CurrencyPreference::load(cache);
        assert_eq!(reloaded.get(), Currency::USD);
    }

    #[test]
    fn test_unsupported_currency_keeps_choice() {
        let cache = Cache::new(MemoryStore::new());
        let mut pref = CurrencyPreference::load(cache.clone());
        pref.set("RUB").unwrap();

        assert!(matches!(pref.set("EUR"), Err(CommerceError::UnsupportedCurrency(_))));
        assert_eq!(pref.get(), Currency::RUB);
        assert_eq!(cache.get::<String>(CURRENCY_KEY).unwrap().as_deref(), Some("RUB"));
    }

    #[test]
    fn test_unknown_stored_currency_falls_back() {
        let cache = Cache::new(MemoryStore::new());
        cache.set(CURRENCY_KEY, "GBP").unwrap();
        assert_eq!(CurrencyPreference::load(cache).get(), Currency::AMD);
    }

    #[test]
    fn test_language_round_trip() {
        let cache = Cache::new(MemoryStore::new());
        let mut pref = LanguagePreference::load(cache.clone());
        assert_eq!(pref.get(), Language::Am);

        pref.set("RU").unwrap();
        assert!(pref.set("de").is_err());
        assert_eq!(LanguagePreference::load(cache).get(), Language::Ru);
    }

    #[test]
    fn test_corrupted_language_falls_back() {
        let cache = Cache::new(MemoryStore::new());
        cache.set(LANGUAGE_KEY, &[1, 2, 3]).unwrap();
        assert_eq!(LanguagePreference::load(cache).get(), Language::Am);
    }
}
