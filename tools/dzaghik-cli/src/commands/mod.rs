//! CLI command implementations.

pub mod account;
pub mod admin;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod preferences;

use clap::{Args, Subcommand};

/// Arguments for the catalog command.
#[derive(Args)]
pub struct CatalogArgs {
    #[command(subcommand)]
    pub command: Option<CatalogCommand>,
}

/// Listing filters shared by the public and admin flower lists.
#[derive(Args, Default)]
pub struct FlowerFilters {
    /// Page number.
    #[arg(short, long)]
    pub page: Option<u32>,

    /// Results per page.
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Category filter.
    #[arg(long)]
    pub category: Option<String>,

    /// Color filter.
    #[arg(long)]
    pub color: Option<String>,

    /// Minimum price in dram.
    #[arg(long)]
    pub min_price: Option<rust_decimal::Decimal>,

    /// Maximum price in dram.
    #[arg(long)]
    pub max_price: Option<rust_decimal::Decimal>,

    /// Free-text search.
    #[arg(short, long)]
    pub search: Option<String>,
}

#[derive(Subcommand)]
pub enum CatalogCommand {
    /// List flowers.
    List(FlowerFilters),
    /// Flowers on the home page.
    Featured,
    /// Show one flower.
    Show {
        /// Flower ID.
        id: String,
    },
    /// Show the home page text.
    Home,
}

/// Arguments for the cart command.
#[derive(Args)]
pub struct CartArgs {
    #[command(subcommand)]
    pub command: Option<CartCommand>,
}

#[derive(Subcommand)]
pub enum CartCommand {
    /// Show the cart.
    List,
    /// Add a flower.
    Add {
        /// Flower ID.
        id: String,
        /// How many to add.
        #[arg(short, long, default_value = "1")]
        quantity: i64,
    },
    /// Remove a flower.
    Remove {
        /// Flower ID.
        id: String,
    },
    /// Set the quantity of a flower already in the cart; 0 removes it.
    Set {
        /// Flower ID.
        id: String,
        /// New quantity.
        quantity: i64,
    },
    /// Empty the cart.
    Clear,
}

/// Arguments for the currency command.
#[derive(Args)]
pub struct CurrencyArgs {
    #[command(subcommand)]
    pub command: Option<PreferenceCommand>,
}

/// Arguments for the language command.
#[derive(Args)]
pub struct LanguageArgs {
    #[command(subcommand)]
    pub command: Option<PreferenceCommand>,
}

#[derive(Subcommand)]
pub enum PreferenceCommand {
    /// Show the current choice and the alternatives.
    Show,
    /// Change it.
    Set {
        /// Code, e.g. `USD` or `en`.
        code: String,
    },
}

/// Arguments for the checkout command.
#[derive(Args)]
pub struct CheckoutArgs {
    /// Buy a single flower now instead of the cart.
    #[arg(long, value_name = "ID")]
    pub buy_now: Option<String>,

    /// Quantity for --buy-now.
    #[arg(long, default_value = "1", requires = "buy_now")]
    pub quantity: i64,

    /// Recipient full name.
    #[arg(long)]
    pub name: String,

    /// Contact phone.
    #[arg(long)]
    pub phone: String,

    /// Delivery address.
    #[arg(long)]
    pub address: String,

    /// Delivery city.
    #[arg(long)]
    pub city: Option<String>,

    /// Contact email.
    #[arg(long)]
    pub email: Option<String>,

    /// Delivery notes.
    #[arg(long)]
    pub notes: Option<String>,

    /// Greeting card message.
    #[arg(long)]
    pub greeting_card: Option<String>,

    /// Pay by card with this number instead of cash on delivery.
    #[arg(long, value_name = "NUMBER")]
    pub card: Option<String>,

    /// Card expiry, MM/YY.
    #[arg(long, value_name = "MM/YY")]
    pub exp: Option<String>,

    /// Card security code.
    #[arg(long)]
    pub cvc: Option<String>,
}

/// Arguments for the account command.
#[derive(Args)]
pub struct AccountArgs {
    #[command(subcommand)]
    pub command: AccountCommand,
}

#[derive(Subcommand)]
pub enum AccountCommand {
    /// Log in on this device.
    Login {
        /// Email address.
        #[arg(long)]
        email: String,
    },
    /// Create a profile on this device.
    Signup {
        /// Display name.
        #[arg(long)]
        name: String,
        /// Email address.
        #[arg(long)]
        email: String,
    },
    /// Forget the profile.
    Logout,
    /// Show who is logged in.
    Whoami,
}

/// Arguments for the admin command.
#[derive(Args)]
pub struct AdminArgs {
    #[command(subcommand)]
    pub command: AdminCommand,
}

#[derive(Subcommand)]
pub enum AdminCommand {
    /// Log in as admin.
    Login {
        /// Username.
        #[arg(short, long)]
        username: String,
        /// Password; prompted for when omitted.
        #[arg(long)]
        password: Option<String>,
    },
    /// Log out.
    Logout,
    /// List all flowers, including inactive ones.
    Flowers(FlowerFilters),
    /// Show one flower, active or not.
    Show {
        /// Flower ID.
        id: String,
    },
    /// Create a flower from a JSON file.
    Create {
        /// Path to the flower JSON.
        file: String,
    },
    /// Replace a flower with the contents of a JSON file.
    Update {
        /// Flower ID.
        id: String,
        /// Path to the flower JSON.
        file: String,
    },
    /// Change only the fields present in a JSON file.
    Patch {
        /// Flower ID.
        id: String,
        /// Path to a JSON object with the fields to change.
        file: String,
    },
    /// Show or hide a flower.
    Toggle {
        /// Flower ID.
        id: String,
    },
    /// Delete a flower.
    Delete {
        /// Flower ID.
        id: String,
        /// Skip confirmation.
        #[arg(short, long)]
        yes: bool,
    },
    /// Upload an image and print its URL.
    UploadImage {
        /// Image file.
        path: String,
        /// Use it as the home page image instead.
        #[arg(long)]
        main_page: bool,
    },
    /// List orders.
    Orders,
    /// Change an order's status.
    SetStatus {
        /// Order ID.
        id: String,
        /// pending, confirmed, processing, delivered or cancelled.
        status: String,
    },
    /// Show the home page content.
    MainPage,
    /// Change the home page content. Unset fields keep their value.
    UpdateMainPage {
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        subtitle: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        special_offer: Option<String>,
        #[arg(long)]
        extra_text: Option<String>,
    },
}
