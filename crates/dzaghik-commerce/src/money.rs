//! Display currencies and price conversion.
//!
//! Catalog prices are stored in Armenian dram (AMD). Every other currency is
//! a fixed exchange rate against the dram plus a set of formatting rules, all
//! kept in one table so conversion and rendering never branch per currency.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CommerceError;

/// Supported display currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Currency {
    /// Armenian dram, the base currency.
    #[default]
    AMD,
    USD,
    RUB,
}

/// Where the symbol goes relative to the number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolPosition {
    /// `$1.00`
    Prefix,
    /// `1 000,00 ₽`
    Suffix,
}

/// Conversion and formatting rules for one currency.
#[derive(Debug, Clone, Copy)]
pub struct CurrencyRules {
    pub currency: Currency,
    pub code: &'static str,
    pub symbol: &'static str,
    /// How many base units one unit of this currency is worth, as
    /// `(mantissa, scale)`.
    rate: (i64, u32),
    pub decimals: u32,
    pub position: SymbolPosition,
    pub group_separator: &'static str,
    pub decimal_separator: &'static str,
}

impl CurrencyRules {
    /// Base units per unit of this currency.
    pub fn rate(&self) -> Decimal {
        Decimal::new(self.rate.0, self.rate.1)
    }
}

const NBSP: &str = "\u{a0}";

static RULES: [CurrencyRules; 3] = [
    CurrencyRules {
        currency: Currency::AMD,
        code: "AMD",
        symbol: "\u{58f}",
        rate: (1, 0),
        decimals: 0,
        position: SymbolPosition::Suffix,
        group_separator: ",",
        decimal_separator: ".",
    },
    CurrencyRules {
        currency: Currency::USD,
        code: "USD",
        symbol: "$",
        rate: (400, 0),
        decimals: 2,
        position: SymbolPosition::Prefix,
        group_separator: ",",
        decimal_separator: ".",
    },
    CurrencyRules {
        currency: Currency::RUB,
        code: "RUB",
        symbol: "\u{20bd}",
        rate: (45, 1),
        decimals: 2,
        position: SymbolPosition::Suffix,
        group_separator: NBSP,
        decimal_separator: ",",
    },
];

impl Currency {
    /// The base currency catalog prices are stored in.
    pub const BASE: Currency = Currency::AMD;

    /// All supported currencies, base first.
    pub const ALL: [Currency; 3] = [Currency::AMD, Currency::USD, Currency::RUB];

    /// The table entry for this currency.
    pub fn rules(&self) -> &'static CurrencyRules {
        match self {
            Currency::AMD => &RULES[0],
            Currency::USD => &RULES[1],
            Currency::RUB => &RULES[2],
        }
    }

    /// Get the currency code (e.g., "USD").
    pub fn code(&self) -> &'static str {
        self.rules().code
    }

    /// Get the currency symbol (e.g., "$").
    pub fn symbol(&self) -> &'static str {
        self.rules().symbol
    }

    /// Get the number of decimal places shown for this currency.
    pub fn decimal_places(&self) -> u32 {
        self.rules().decimals
    }

    /// Parse a currency code. Codes are matched exactly, as they are stored.
    pub fn from_code(code: &str) -> Option<Self> {
        RULES.iter().find(|r| r.code == code).map(|r| r.currency)
    }
}

impl FromStr for Currency {
    type Err = CommerceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Currency::from_code(s).ok_or_else(|| CommerceError::UnsupportedCurrency(s.to_string()))
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

fn round(amount: Decimal, decimals: u32) -> Decimal {
    amount.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert a base-currency amount into `target`.
///
/// The base currency is rounded to a whole number; everything else is divided
/// by its rate and rounded to the currency's decimals.
pub fn convert(amount: Decimal, target: Currency) -> Decimal {
    let rules = target.rules();
    if target == Currency::BASE {
        return round(amount, 0);
    }
    round(amount / rules.rate(), rules.decimals)
}

/// Convert an amount in `source` back into the base currency.
pub fn convert_back(amount: Decimal, source: Currency) -> Decimal {
    amount * source.rules().rate()
}

/// Render an amount that is already in `currency`.
///
/// ```
/// use dzaghik_commerce::money::{format, Currency};
/// use rust_decimal::Decimal;
///
/// assert_eq!(format(Decimal::ONE, Currency::USD), "$1.00");
/// assert_eq!(format(Decimal::from(18000), Currency::AMD), "18,000 \u{58f}");
/// ```
pub fn format(amount: Decimal, currency: Currency) -> String {
    let rules = currency.rules();
    let rounded = round(amount, rules.decimals);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();

    // Always `<digits>` or `<digits>.<fraction>` at this point.
    let mut plain = rounded.abs();
    plain.rescale(rules.decimals);
    let text = plain.to_string();
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text.as_str(), None),
    };

    let mut number = group_digits(int_part, rules.group_separator);
    if let Some(frac) = frac_part {
        number.push_str(rules.decimal_separator);
        number.push_str(frac);
    }
    if negative {
        number.insert(0, '-');
    }

    match rules.position {
        SymbolPosition::Prefix => format!("{}{}", rules.symbol, number),
        SymbolPosition::Suffix => format!("{} {}", number, rules.symbol),
    }
}

fn group_digits(digits: &str, separator: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3 * separator.len());
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push_str(separator);
        }
        out.push(ch);
    }
    out
}

/// Convert a base-currency price and render it in `currency`.
pub fn display_price(base_amount: Decimal, currency: Currency) -> String {
    format(convert(base_amount, currency), currency)
}

/// Parse a possibly missing or malformed base-currency amount; bad input is zero.
pub fn parse_amount(raw: Option<&str>) -> Decimal {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| Decimal::from_str(s).ok())
        .unwrap_or(Decimal::ZERO)
}

/// Lenient [`convert`]: missing or non-numeric input converts to zero.
pub fn convert_raw(raw: Option<&str>, target: Currency) -> Decimal {
    convert(parse_amount(raw), target)
}

/// Lenient [`display_price`]: missing or non-numeric input renders as zero.
pub fn format_raw(raw: Option<&str>, currency: Currency) -> String {
    display_price(parse_amount(raw), currency)
}
