//! Currency and language preference commands.

use anyhow::Result;
use dzaghik_commerce::{display_price, Currency};
use dzaghik_shop::Language;

use super::{CurrencyArgs, LanguageArgs, PreferenceCommand};
use crate::context::Context;

/// Sample amount shown next to each currency, in dram.
const SAMPLE_AMOUNT: i64 = 10_000;

/// Run the currency command.
pub fn run_currency(args: CurrencyArgs, ctx: &mut Context) -> Result<()> {
    match args.command {
        Some(PreferenceCommand::Show) | None => {
            let current = ctx.shop.currency().get();
            if ctx.output.is_json() {
                ctx.output.json(&serde_json::json!({
                    "currency": current,
                    "available": Currency::ALL,
                }));
                return Ok(());
            }

            ctx.output.header("Currency");
            let base = display_price(SAMPLE_AMOUNT.into(), Currency::BASE);
            for currency in Currency::ALL {
                let sample = display_price(SAMPLE_AMOUNT.into(), currency);
                let marker = if currency == current { "*" } else { " " };
                ctx.output.info(&format!(
                    "{} {} {}  ({} = {})",
                    marker,
                    currency.code(),
                    currency.symbol(),
                    base,
                    sample
                ));
            }
            Ok(())
        }
        Some(PreferenceCommand::Set { code }) => {
            let currency = ctx.shop.currency_mut().set(&code)?;
            ctx.output.success(&format!("Prices now shown in {}", currency));
            Ok(())
        }
    }
}

/// Run the language command.
pub fn run_language(args: LanguageArgs, ctx: &mut Context) -> Result<()> {
    match args.command {
        Some(PreferenceCommand::Show) | None => {
            let current = ctx.shop.language().get();
            if ctx.output.is_json() {
                ctx.output.json(&serde_json::json!({
                    "language": current,
                    "available": Language::ALL,
                }));
                return Ok(());
            }

            ctx.output.header("Language");
            for language in Language::ALL {
                let marker = if language == current { "*" } else { " " };
                ctx.output
                    .info(&format!("{} {} {}", marker, language.code(), language.native_name()));
            }
            Ok(())
        }
        Some(PreferenceCommand::Set { code }) => {
            let language = ctx.shop.language_mut().set(&code)?;
            ctx.output
                .success(&format!("Language set to {}", language.native_name()));
            Ok(())
        }
    }
}
