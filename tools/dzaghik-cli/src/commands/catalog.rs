//! Catalog browsing commands.

use anyhow::Result;
use dzaghik_commerce::cart::CartLineItem;
use dzaghik_shop::{Flower, FlowerQuery};

use super::{CatalogArgs, CatalogCommand, FlowerFilters};
use crate::context::Context;
use crate::output::truncate;

const WIDTHS: [usize; 4] = [8, 32, 16, 16];

/// Run the catalog command.
pub async fn run(args: CatalogArgs, ctx: &mut Context) -> Result<()> {
    match args.command {
        Some(CatalogCommand::List(filters)) => list(&filters, ctx).await,
        None => list(&FlowerFilters::default(), ctx).await,
        Some(CatalogCommand::Featured) => featured(ctx).await,
        Some(CatalogCommand::Show { id }) => show(&id, ctx).await,
        Some(CatalogCommand::Home) => home(ctx).await,
    }
}

/// Build a listing query from command-line filters.
pub fn query_from(filters: &FlowerFilters) -> FlowerQuery {
    let mut query = FlowerQuery::new();
    if let Some(page) = filters.page {
        query = query.page(page);
    }
    if let Some(size) = filters.page_size {
        query = query.page_size(size);
    }
    if let Some(category) = &filters.category {
        query = query.category(category);
    }
    if let Some(color) = &filters.color {
        query = query.color(color);
    }
    if let Some(search) = &filters.search {
        query = query.search(search);
    }
    query.price_range(filters.min_price, filters.max_price)
}

async fn list(filters: &FlowerFilters, ctx: &Context) -> Result<()> {
    let spinner = ctx.output.spinner("Loading flowers...");
    let page = ctx.shop.catalog().list(&query_from(filters)).await;
    spinner.finish_and_clear();
    let page = page?;

    if ctx.output.is_json() {
        ctx.output.json(&page);
        return Ok(());
    }

    ctx.output.header("Flowers");
    if page.results.is_empty() {
        ctx.output.info("No flowers match.");
        return Ok(());
    }
    print_flowers(&page.results, ctx);

    ctx.output.info("");
    ctx.output
        .info(&format!("Showing {} of {} flower(s)", page.results.len(), page.count));
    if page.has_next() {
        let next = filters.page.unwrap_or(1) + 1;
        ctx.output.info(&format!("More with `--page {}`", next));
    }
    Ok(())
}

async fn featured(ctx: &Context) -> Result<()> {
    let spinner = ctx.output.spinner("Loading featured flowers...");
    let flowers = ctx.shop.catalog().featured().await;
    spinner.finish_and_clear();
    let flowers = flowers?;

    if ctx.output.is_json() {
        ctx.output.json(&flowers);
        return Ok(());
    }

    ctx.output.header("Featured");
    if flowers.is_empty() {
        ctx.output.info("Nothing featured right now.");
        return Ok(());
    }
    print_flowers(&flowers, ctx);
    Ok(())
}

async fn show(id: &str, ctx: &Context) -> Result<()> {
    let spinner = ctx.output.spinner("Loading flower...");
    let flower = ctx.shop.catalog().get(&id.into()).await;
    spinner.finish_and_clear();
    let flower = flower?;

    if ctx.output.is_json() {
        ctx.output.json(&flower);
        return Ok(());
    }

    let line = CartLineItem::from(&flower);
    ctx.output.header(&flower.name);
    ctx.output.kv("ID", flower.id.as_str());
    ctx.output.kv("Price", &ctx.price(line.unit_price()));
    if flower.is_on_sale() {
        ctx.output.kv("Regular price", &ctx.price(line.price));
    }
    if !flower.category.is_empty() {
        ctx.output.kv("Category", &flower.category);
    }
    if !flower.colors.is_empty() {
        ctx.output.kv("Colors", &flower.colors.join(", "));
    }
    if flower.is_free_delivery {
        ctx.output.kv("Delivery", "free");
    }
    if let Some(image) = flower.main_image() {
        ctx.output.kv("Image", image);
    }
    if !flower.description.is_empty() {
        ctx.output.info("");
        ctx.output.info(&flower.description);
    }
    Ok(())
}

async fn home(ctx: &Context) -> Result<()> {
    let content = ctx.shop.content().main_page().await?;

    if ctx.output.is_json() {
        ctx.output.json(&content);
        return Ok(());
    }

    ctx.output.header(&content.title);
    if let Some(subtitle) = &content.subtitle {
        ctx.output.info(subtitle);
    }
    for text in [&content.description, &content.special_offer, &content.extra_text]
        .into_iter()
        .flatten()
    {
        ctx.output.info("");
        ctx.output.info(text);
    }
    Ok(())
}

/// Table of flowers with prices in the display currency.
pub fn print_flowers(flowers: &[Flower], ctx: &Context) {
    ctx.output.table_row(&["ID", "NAME", "PRICE", "WAS"], &WIDTHS);
    ctx.output.info(&"-".repeat(76));

    for flower in flowers {
        let line = CartLineItem::from(flower);
        let price = ctx.price(line.unit_price());
        let was = if flower.is_on_sale() {
            ctx.price(line.price)
        } else {
            String::new()
        };
        ctx.output.table_row(
            &[flower.id.as_str(), &truncate(&flower.name, 30), &price, &was],
            &WIDTHS,
        );
    }
}
