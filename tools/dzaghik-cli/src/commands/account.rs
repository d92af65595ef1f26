//! Customer account commands.

use anyhow::Result;
use dialoguer::Password;

use super::{AccountArgs, AccountCommand};
use crate::context::Context;

/// Run the account command.
pub fn run(args: AccountArgs, ctx: &mut Context) -> Result<()> {
    let customer = ctx.shop.customer();

    match args.command {
        AccountCommand::Login { email } => {
            let password = prompt_password()?;
            let profile = customer.login(&email, &password)?;
            ctx.output.success(&format!("Welcome, {}", profile.name));
        }
        AccountCommand::Signup { name, email } => {
            let password = prompt_password()?;
            let profile = customer.signup(&name, &email, &password)?;
            ctx.output.success(&format!("Welcome, {}", profile.name));
        }
        AccountCommand::Logout => {
            customer.logout()?;
            ctx.output.success("Logged out");
        }
        AccountCommand::Whoami => match customer.current() {
            Some(profile) if ctx.output.is_json() => ctx.output.json(&profile),
            Some(profile) => {
                ctx.output.kv("Name", &profile.name);
                ctx.output.kv("Email", &profile.email);
            }
            None => ctx.output.info("Not logged in."),
        },
    }
    Ok(())
}

fn prompt_password() -> Result<String> {
    Ok(Password::new()
        .with_prompt("Password")
        .allow_empty_password(true)
        .interact()?)
}
