//! `shopdesk` command-line entry point.

use clap::{Parser, Subcommand};

use shopdesk_catalog::query::display_category;
use shopdesk_catalog::{CatalogEntry, CatalogFilter, CategoryFilter, DraftForm};
use shopdesk_console::commands;
use shopdesk_console::{ConsoleConfig, ConsoleState, NotificationLevel, UpdateMode};
use shopdesk_core::EntryId;
use shopdesk_observability::LogFormat;

/// Catalog admin console.
#[derive(Parser, Debug)]
#[command(name = "shopdesk")]
#[command(about = "Manage the product catalog from the command line")]
struct Cli {
    /// Base URL of the remote catalog service
    #[arg(long, value_name = "URL")]
    api_url: Option<String>,

    /// Whether edits are sent to the remote catalog (local | remote)
    #[arg(long, value_name = "MODE")]
    update_mode: Option<UpdateMode>,

    /// Log output format (json | pretty)
    #[arg(long, value_name = "FORMAT")]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List products, optionally filtered
    List {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, default_value = "all")]
        category: String,
    },
    /// List the distinct categories
    Categories,
    /// Dashboard figures
    Summary,
    /// Add a product
    Add {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        price: String,
        #[arg(long)]
        stock: String,
        #[arg(long)]
        category: String,
    },
    /// Edit a product; omitted fields keep their current value
    Edit {
        id: EntryId,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        price: Option<String>,
        #[arg(long)]
        stock: Option<String>,
        #[arg(long)]
        category: Option<String>,
    },
    /// Delete a product
    Delete { id: EntryId },
    /// Change stock by a signed amount (never below zero)
    Adjust {
        id: EntryId,
        #[arg(allow_hyphen_values = true)]
        delta: i64,
    },
    /// Place a restock order for a product
    Restock { id: EntryId },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = ConsoleConfig::from_env()?;
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }
    if let Some(mode) = cli.update_mode {
        config.update_mode = mode;
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }

    shopdesk_observability::tracing::init(config.log_format);

    let console = ConsoleState::new(config)?;
    let toasts = console.store.subscribe();
    console.initialize().await;

    let outcome = run(&console, cli.command).await;

    for toast in toasts.drain() {
        let tag = match toast.level {
            NotificationLevel::Success => "ok",
            NotificationLevel::Error => "error",
        };
        eprintln!("[{tag}] {}", toast.message);
    }

    console.shutdown();
    outcome
}

async fn run(console: &ConsoleState, command: Command) -> anyhow::Result<()> {
    let store = &console.store;
    let handle = console.shell_handle();

    match command {
        Command::List { search, category } => {
            let filter = CatalogFilter::new(search, CategoryFilter::parse(&category));
            let products = commands::list_products(store, &filter);
            if products.is_empty() {
                println!("No products found.");
            }
            for product in &products {
                print_entry(product);
            }
        }
        Command::Categories => {
            for category in commands::list_categories(store) {
                println!("{}", display_category(&category));
            }
        }
        Command::Summary => {
            let summary = commands::dashboard_summary(store);
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Add {
            title,
            description,
            price,
            stock,
            category,
        } => {
            let form = DraftForm {
                title,
                description,
                price,
                stock,
                category,
            };
            let created = commands::add_product(store, &handle, &form).await?;
            print_entry(&created);
        }
        Command::Edit {
            id,
            title,
            description,
            price,
            stock,
            category,
        } => {
            let Some(current) = store.find(id) else {
                println!("No product with id {id}.");
                return Ok(());
            };
            let mut form = DraftForm::from_entry(&current);
            form.title = title.unwrap_or(form.title);
            form.description = description.unwrap_or(form.description);
            form.price = price.unwrap_or(form.price);
            form.stock = stock.unwrap_or(form.stock);
            form.category = category.unwrap_or(form.category);

            commands::edit_product(store, &handle, id, &form).await?;
            if let Some(edited) = store.find(id) {
                print_entry(&edited);
            }
        }
        Command::Delete { id } => {
            let removed = commands::delete_product(store, &handle, id).await?;
            println!("Removed {removed} local entr{}.", if removed == 1 { "y" } else { "ies" });
        }
        Command::Adjust { id, delta } => {
            report_stock(id, commands::adjust_stock(store, &handle, id, delta).await?)
        }
        Command::Restock { id } => report_stock(id, commands::restock(store, &handle, id).await?),
    }

    Ok(())
}

fn report_stock(id: EntryId, stock: Option<u32>) {
    match stock {
        Some(stock) => println!("{id}: {stock} in stock"),
        None => println!("No product with id {id}."),
    }
}

fn print_entry(entry: &CatalogEntry) {
    let alert = if entry.is_low_stock() { "  (low stock)" } else { "" };
    let id = entry.id.map_or_else(|| "-".to_string(), |id| id.to_string());
    println!(
        "{:>5}  {:<40} {:<20} ${:>10.2} {:>6}{}",
        id,
        entry.title,
        display_category(&entry.category),
        entry.price,
        entry.stock,
        alert
    );
}
