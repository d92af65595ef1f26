//! Checkout command.

use anyhow::{bail, Result};
use dzaghik_commerce::checkout::{CardDetails, Checkout, CheckoutSuccess, PaymentMethod};

use super::CheckoutArgs;
use crate::context::Context;

/// Run the checkout command.
pub async fn run(args: CheckoutArgs, ctx: &mut Context) -> Result<()> {
    let mut checkout = match &args.buy_now {
        Some(id) => {
            let flower = ctx.shop.catalog().get(&id.as_str().into()).await?;
            ctx.shop.buy_now(&flower, args.quantity)
        }
        None => ctx.shop.checkout(),
    };
    fill_form(&mut checkout, &args);

    let card = match &args.card {
        Some(number) => {
            if !ctx.shop.card_payments_enabled() {
                ctx.output
                    .warn("No Stripe key configured; set DZAGHIK_STRIPE_KEY to pay by card.");
            }
            Some(card_details(number, &args)?)
        }
        None => None,
    };

    let items = checkout.items(ctx.shop.cart());
    if items.is_empty() {
        bail!("Your cart is empty. Add flowers with `dzaghik cart add <ID>`.");
    }
    let total = checkout.total(ctx.shop.cart());

    ctx.output.header("Order");
    for item in items {
        ctx.output.list_item(&format!(
            "{} × {}  {}",
            item.quantity,
            item.name,
            ctx.price(item.line_total())
        ));
    }
    ctx.output.kv("Total", &ctx.price(total));
    ctx.output.kv("Payment", checkout.form().payment_method.as_str());
    if let Some(card) = &card {
        ctx.output.kv("Card", &format!("•••• {}", card.last4()));
    }

    let spinner = ctx.output.spinner("Placing order...");
    let result = ctx.shop.place_order(&mut checkout, card.as_ref()).await;
    spinner.finish_and_clear();
    let success = result?;

    report(&success, ctx);

    if !success.redirect_after.is_zero() && !ctx.output.is_json() {
        let spinner = ctx.output.spinner("Returning to the shop...");
        tokio::time::sleep(success.redirect_after).await;
        spinner.finish_and_clear();
    }
    Ok(())
}

fn fill_form(checkout: &mut Checkout, args: &CheckoutArgs) {
    let form = checkout.form_mut();
    form.full_name = args.name.clone();
    form.phone = args.phone.clone();
    form.address = args.address.clone();
    if let Some(city) = &args.city {
        form.city = city.clone();
    }
    form.email = args.email.clone().unwrap_or_default();
    form.notes = args.notes.clone().unwrap_or_default();
    form.greeting_card = args.greeting_card.clone().unwrap_or_default();

    let method = if args.card.is_some() {
        PaymentMethod::Card
    } else {
        PaymentMethod::Cash
    };
    checkout.set_payment_method(method);
}

fn card_details(number: &str, args: &CheckoutArgs) -> Result<CardDetails> {
    let (Some(expiry), Some(cvc)) = (&args.exp, &args.cvc) else {
        bail!("--exp and --cvc are required with --card");
    };
    let (month, year) = CardDetails::parse_expiry(expiry)?;
    Ok(CardDetails::new(number, month, year, cvc.as_str())?)
}

fn report(success: &CheckoutSuccess, ctx: &Context) {
    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({
            "order_id": success.order_id,
            "total": success.total,
            "payment_intent_id": success.payment_intent_id,
            "cart_cleared": success.cart_cleared,
        }));
        return;
    }

    ctx.output.success(&format!("Order {} placed", success.order_id));
    ctx.output.kv("Charged", &ctx.price(success.total));
    if let Some(intent) = &success.payment_intent_id {
        ctx.output.kv("Payment", intent.as_str());
    }
    ctx.output.info("We will call you to confirm delivery.");
}
