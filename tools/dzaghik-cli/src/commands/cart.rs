//! Cart commands.

use anyhow::Result;
use dzaghik_commerce::CommerceError;
use dzaghik_commerce::ProductId;

use super::{CartArgs, CartCommand};
use crate::context::Context;
use crate::output::truncate;

const WIDTHS: [usize; 5] = [8, 30, 14, 5, 16];

/// Run the cart command.
pub async fn run(args: CartArgs, ctx: &mut Context) -> Result<()> {
    match args.command {
        Some(CartCommand::List) | None => list(ctx),
        Some(CartCommand::Add { id, quantity }) => add(&id, quantity, ctx).await,
        Some(CartCommand::Remove { id }) => remove(&id, ctx),
        Some(CartCommand::Set { id, quantity }) => set(&id, quantity, ctx),
        Some(CartCommand::Clear) => {
            ctx.shop.cart_mut().clear();
            ctx.output.success("Cart cleared");
            Ok(())
        }
    }
}

fn list(ctx: &Context) -> Result<()> {
    let cart = ctx.shop.cart();

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({
            "items": cart.items(),
            "count": cart.count(),
            "total": cart.total(),
            "currency": ctx.shop.currency().get(),
        }));
        return Ok(());
    }

    ctx.output.header("Cart");
    if cart.is_empty() {
        ctx.output.info("Your cart is empty.");
        return Ok(());
    }

    ctx.output.table_row(&["ID", "NAME", "PRICE", "QTY", "SUBTOTAL"], &WIDTHS);
    ctx.output.info(&"-".repeat(85));
    for item in cart.items() {
        ctx.output.table_row(
            &[
                item.id.as_str(),
                &truncate(&item.name, 28),
                &ctx.price(item.unit_price()),
                &item.quantity.to_string(),
                &ctx.price(item.line_total()),
            ],
            &WIDTHS,
        );
    }

    ctx.output.info("");
    ctx.output.kv("Items", &cart.count().to_string());
    ctx.output.kv("Total", &ctx.price(cart.total()));
    Ok(())
}

async fn add(id: &str, quantity: i64, ctx: &mut Context) -> Result<()> {
    let spinner = ctx.output.spinner("Looking up flower...");
    let flower = ctx.shop.catalog().get(&id.into()).await;
    spinner.finish_and_clear();
    let flower = flower?;

    ctx.shop.add_to_cart(&flower, quantity)?;
    ctx.output.success(&format!(
        "Added {} × {} ({} in cart)",
        quantity,
        flower.name,
        ctx.shop.cart().count()
    ));
    Ok(())
}

fn remove(id: &str, ctx: &mut Context) -> Result<()> {
    if !ctx.shop.cart_mut().remove_item(&ProductId::from(id)) {
        return Err(CommerceError::ItemNotInCart(id.to_string()).into());
    }
    ctx.output.success(&format!("Removed {}", id));
    Ok(())
}

fn set(id: &str, quantity: i64, ctx: &mut Context) -> Result<()> {
    if !ctx.shop.cart_mut().set_quantity(&ProductId::from(id), quantity)? {
        return Err(CommerceError::ItemNotInCart(id.to_string()).into());
    }
    if quantity <= 0 {
        ctx.output.success(&format!("Removed {}", id));
    } else {
        ctx.output.success(&format!("{} now × {}", id, quantity));
    }
    Ok(())
}
