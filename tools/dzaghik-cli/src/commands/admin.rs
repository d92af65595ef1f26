//! Admin console commands.

use std::fs;
use std::path::Path;

use anyhow::{Context as _, Result};
use dialoguer::{Confirm, Password};
use dzaghik_commerce::checkout::OrderStatus;
use dzaghik_commerce::{OrderId, ProductId};
use dzaghik_shop::{AdminConsole, Flower, FlowerInput, ImageFile, MainPageUpdate};
use secrecy::SecretString;

use super::catalog::query_from;
use super::{AdminArgs, AdminCommand, FlowerFilters};
use crate::context::Context;
use crate::output::{format_bytes, status_badge, truncate};

const FLOWER_WIDTHS: [usize; 4] = [8, 32, 16, 10];
const ORDER_WIDTHS: [usize; 6] = [8, 20, 18, 16, 6, 12];

/// Run the admin command.
pub async fn run(args: AdminArgs, ctx: &mut Context) -> Result<()> {
    let console = ctx.shop.admin().clone();

    match args.command {
        AdminCommand::Login { username, password } => login(&console, &username, password, ctx).await,
        AdminCommand::Logout => {
            console.session().logout()?;
            ctx.output.success("Logged out");
            Ok(())
        }
        AdminCommand::Flowers(filters) => list_flowers(&console, &filters, ctx).await,
        AdminCommand::Show { id } => {
            let flower = console.flower(&ProductId::from(id)).await?;
            show_flower(&flower, ctx);
            Ok(())
        }
        AdminCommand::Create { file } => {
            let input: FlowerInput = read_json(&file)?;
            let flower = console.create_flower(&input).await?;
            ctx.output.success(&format!("Created {} ({})", flower.name, flower.id));
            Ok(())
        }
        AdminCommand::Update { id, file } => {
            let input: FlowerInput = read_json(&file)?;
            let flower = console.update_flower(&ProductId::from(id), &input).await?;
            ctx.output.success(&format!("Updated {}", flower.name));
            Ok(())
        }
        AdminCommand::Patch { id, file } => {
            let fields: serde_json::Value = read_json(&file)?;
            let flower = console.patch_flower(&ProductId::from(id), &fields).await?;
            ctx.output.success(&format!("Updated {}", flower.name));
            Ok(())
        }
        AdminCommand::Toggle { id } => {
            let flower = console.toggle_active(&ProductId::from(id)).await?;
            let state = if flower.is_active { "visible" } else { "hidden" };
            ctx.output.success(&format!("{} is now {}", flower.name, state));
            Ok(())
        }
        AdminCommand::Delete { id, yes } => delete_flower(&console, &id, yes, ctx).await,
        AdminCommand::UploadImage { path, main_page } => {
            upload_image(&console, Path::new(&path), main_page, ctx).await
        }
        AdminCommand::Orders => list_orders(&console, ctx).await,
        AdminCommand::SetStatus { id, status } => {
            let status: OrderStatus = status.parse()?;
            let order = console
                .update_order_status(&OrderId::from(id), status)
                .await?;
            ctx.output.success(&format!(
                "Order {} is now {}",
                order.id,
                status_badge(order.status.as_str())
            ));
            Ok(())
        }
        AdminCommand::MainPage => {
            let content = console.main_page().await?;
            if ctx.output.is_json() {
                ctx.output.json(&content);
                return Ok(());
            }
            ctx.output.header("Home page");
            ctx.output.kv("Title", &content.title);
            let fields = [
                ("Subtitle", &content.subtitle),
                ("Description", &content.description),
                ("Special offer", &content.special_offer),
                ("Extra text", &content.extra_text),
                ("Image", &content.main_image),
            ];
            for (key, value) in fields {
                ctx.output.kv(key, value.as_deref().unwrap_or("-"));
            }
            Ok(())
        }
        AdminCommand::UpdateMainPage {
            title,
            subtitle,
            description,
            special_offer,
            extra_text,
        } => {
            let current = console.main_page().await?;
            let mut update = MainPageUpdate::from(&current);
            if let Some(title) = title {
                update.title = title;
            }
            if let Some(subtitle) = subtitle {
                update.subtitle = subtitle;
            }
            update.description = description.or(update.description);
            update.special_offer = special_offer.or(update.special_offer);
            update.extra_text = extra_text.or(update.extra_text);

            let saved = console.update_main_page(&update).await?;
            ctx.output.success(&format!("Home page saved: {}", saved.title));
            Ok(())
        }
    }
}

async fn login(
    console: &AdminConsole,
    username: &str,
    password: Option<String>,
    ctx: &Context,
) -> Result<()> {
    let password = match password {
        Some(password) => password,
        None => Password::new().with_prompt("Password").interact()?,
    };
    let profile = console
        .session()
        .login(username, &SecretString::from(password))
        .await?;
    ctx.output.success(&format!("Logged in as {}", profile.username));
    Ok(())
}

async fn list_flowers(console: &AdminConsole, filters: &FlowerFilters, ctx: &Context) -> Result<()> {
    let spinner = ctx.output.spinner("Loading flowers...");
    let page = console.flowers(&query_from(filters)).await;
    spinner.finish_and_clear();
    let page = page?;

    if ctx.output.is_json() {
        ctx.output.json(&page);
        return Ok(());
    }

    ctx.output.header("All flowers");
    ctx.output.table_row(&["ID", "NAME", "PRICE", "STATUS"], &FLOWER_WIDTHS);
    ctx.output.info(&"-".repeat(72));
    for flower in &page.results {
        let status = if flower.is_active { "active" } else { "inactive" };
        ctx.output.table_row(
            &[
                flower.id.as_str(),
                &truncate(&flower.name, 30),
                &format!("{} ֏", flower.effective_price()),
                &status_badge(status),
            ],
            &FLOWER_WIDTHS,
        );
    }
    ctx.output.info("");
    ctx.output.info(&format!("Total: {} flower(s)", page.count));
    Ok(())
}

fn show_flower(flower: &Flower, ctx: &Context) {
    if ctx.output.is_json() {
        ctx.output.json(flower);
        return;
    }

    ctx.output.header(&flower.name);
    ctx.output.kv("ID", flower.id.as_str());
    ctx.output.kv("Price", &format!("{} ֏", flower.price_amd));
    if let Some(sale) = flower.sale_price_amd {
        ctx.output.kv("Sale price", &format!("{} ֏", sale));
    }
    let status = if flower.is_active { "active" } else { "inactive" };
    ctx.output.kv("Status", &status_badge(status));
    ctx.output.kv("On home page", if flower.to_be_on_main_page { "yes" } else { "no" });
    ctx.output.kv("Category", &flower.category);
    ctx.output.kv("Colors", &flower.colors.join(", "));
    for image in &flower.images {
        let marker = if image.is_main { " (main)" } else { "" };
        ctx.output.list_item(&format!("{}{}", image.url, marker));
    }
}

async fn delete_flower(console: &AdminConsole, id: &str, yes: bool, ctx: &Context) -> Result<()> {
    let id = ProductId::from(id);
    let flower = console.flower(&id).await?;

    if !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete '{}'?", flower.name))
            .default(false)
            .interact()?;

        if !confirmed {
            ctx.output.warn("Cancelled");
            return Ok(());
        }
    }

    console.delete_flower(&id).await?;
    ctx.output.success(&format!("Deleted '{}'", flower.name));
    Ok(())
}

async fn upload_image(console: &AdminConsole, path: &Path, main_page: bool, ctx: &Context) -> Result<()> {
    let data = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image.jpg".to_string());
    ctx.output.debug(&format!("{} ({})", file_name, format_bytes(data.len() as u64)));

    let image = ImageFile::new(file_name, data);
    let spinner = ctx.output.spinner("Uploading...");
    let url = if main_page {
        console.upload_main_page_image(image).await
    } else {
        console.upload_image(image).await
    };
    spinner.finish_and_clear();
    let url = url?;

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({ "url": url }));
    } else {
        ctx.output.success(&url);
    }
    Ok(())
}

async fn list_orders(console: &AdminConsole, ctx: &Context) -> Result<()> {
    let spinner = ctx.output.spinner("Loading orders...");
    let orders = console.orders().await;
    spinner.finish_and_clear();
    let orders = orders?;

    if ctx.output.is_json() {
        ctx.output.json(&orders);
        return Ok(());
    }

    ctx.output.header("Orders");
    if orders.is_empty() {
        ctx.output.info("No orders yet.");
        return Ok(());
    }

    ctx.output.table_row(
        &["ID", "CUSTOMER", "PHONE", "TOTAL", "PAY", "STATUS"],
        &ORDER_WIDTHS,
    );
    ctx.output.info(&"-".repeat(90));
    for order in &orders {
        ctx.output.table_row(
            &[
                order.id.as_str(),
                &truncate(&order.customer_name, 18),
                &order.customer_phone,
                &format!("{} ֏", order.total()),
                order.payment_method.as_str(),
                &status_badge(order.status.as_str()),
            ],
            &ORDER_WIDTHS,
        );
    }
    ctx.output.info("");
    ctx.output.info(&format!("Total: {} order(s)", orders.len()));
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &str) -> Result<T> {
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", path))
}
