//! pos-admin CLI
//!
//! Command-line front-end for the POS backend:
//! - Log in and out
//! - Manage categories, products and customers
//! - Browse the sales history
//! - Enter a sale
//! - Show the report dashboard

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use pos_admin::client::{
    CategoryUpdate, Credentials, CustomerUpdate, NewCategory, NewCustomer, NewCustomerUser,
    NewProduct, PosClient, ProductQuery, ProductUpdate,
};
use pos_admin::config::{generate_default_config, Config};
use pos_admin::domain::Money;
use pos_admin::listing::{
    CustomerFilter, CustomerStats, CustomerStatus, ListView, OrderFilter, ProductFilter,
    ProductStats, StockState,
};
use pos_admin::render::{self, DisplayOptions, OutputFormat};
use pos_admin::reports::{Dashboard, Period};
use pos_admin::sales::{CheckoutOutcome, SalesSession};

#[derive(Parser)]
#[command(name = "pos-admin")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Administration client for the POS backend")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Backend URL (overrides the config file)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Output format (table, json, csv)
    #[arg(short, long, global = true)]
    pub format: Option<String>,

    /// Config file (default: search the usual locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and store the session token
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long, env = "POS_PASSWORD")]
        password: String,
    },

    /// Forget the stored session token
    Logout,

    /// Show the user behind the stored token
    Whoami,

    /// Manage categories
    #[command(subcommand)]
    Categories(CategoryCommand),

    /// Manage products
    #[command(subcommand)]
    Products(ProductCommand),

    /// Manage customers
    #[command(subcommand)]
    Customers(CustomerCommand),

    /// Browse the sales history
    #[command(subcommand)]
    Sales(SalesCommand),

    /// Enter a sale
    Sale(SaleArgs),

    /// Show the report dashboard
    Report {
        /// Time window (7d, 30d)
        #[arg(short, long, default_value = "7d")]
        period: String,
        /// Entries in ranked lists
        #[arg(short, long)]
        top: Option<usize>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum CategoryCommand {
    /// List categories
    List {
        #[arg(short, long, default_value = "1")]
        page: usize,
    },
    /// Show one category
    Get { id: i64 },
    /// Create a category
    Create {
        name: String,
        /// Image URL
        #[arg(long)]
        image: String,
    },
    /// Update a category
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        image: Option<String>,
    },
    /// Delete a category
    Delete { id: i64 },
}

#[derive(Subcommand)]
pub enum ProductCommand {
    /// List products
    List(ProductListArgs),
    /// Show one product
    Get { id: i64 },
    /// Create a product
    Create(ProductArgs),
    /// Update a product
    Update {
        id: i64,
        #[command(flatten)]
        fields: ProductUpdateArgs,
    },
    /// Delete a product
    Delete { id: i64 },
}

#[derive(Args)]
pub struct ProductListArgs {
    /// Search by name or code
    #[arg(short, long, default_value = "")]
    search: String,
    #[arg(long)]
    category: Option<i64>,
    /// Stock state (low, normal)
    #[arg(long)]
    stock: Option<String>,
    #[arg(short, long, default_value = "1")]
    page: usize,
    /// Server-side limit
    #[arg(long)]
    limit: Option<u32>,
    /// Server-side offset
    #[arg(long)]
    offset: Option<u32>,
    #[arg(long)]
    price_min: Option<i64>,
    #[arg(long)]
    price_max: Option<i64>,
}

#[derive(Args)]
pub struct ProductArgs {
    name: String,
    #[arg(long)]
    price: Decimal,
    #[arg(long)]
    description: String,
    /// Image URL
    #[arg(long)]
    image: String,
    #[arg(long)]
    category: i64,
    #[arg(long, default_value = "0")]
    stock: i64,
    #[arg(long, default_value = "0")]
    stock_min: i64,
    #[arg(long)]
    code: Option<String>,
}

#[derive(Args)]
pub struct ProductUpdateArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    price: Option<Decimal>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    image: Option<String>,
    #[arg(long)]
    category: Option<i64>,
    #[arg(long)]
    stock: Option<i64>,
    #[arg(long)]
    stock_min: Option<i64>,
    #[arg(long)]
    code: Option<String>,
}

#[derive(Subcommand)]
pub enum CustomerCommand {
    /// List customers
    List {
        /// Search by name, last name or phone
        #[arg(short, long, default_value = "")]
        search: String,
        /// Status (new, active, frequent)
        #[arg(long)]
        status: Option<String>,
        #[arg(short, long, default_value = "1")]
        page: usize,
    },
    /// Show one customer
    Get { id: i64 },
    /// Create a customer with a login account
    Create {
        name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        email: String,
        #[arg(long, env = "POS_CUSTOMER_PASSWORD")]
        password: String,
    },
    /// Update a customer
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        address: Option<String>,
    },
    /// Delete a customer
    Delete { id: i64 },
}

#[derive(Subcommand)]
pub enum SalesCommand {
    /// List sales
    List {
        /// Search by customer name, phone or order id
        #[arg(short, long, default_value = "")]
        search: String,
        /// Only sales of this customer (server-side)
        #[arg(long)]
        customer: Option<i64>,
        #[arg(short, long, default_value = "1")]
        page: usize,
    },
    /// Show one sale with its lines
    Get { id: i64 },
    /// Move a sale to another customer
    Reassign {
        id: i64,
        #[arg(long)]
        customer: i64,
    },
    /// Delete a sale
    Delete { id: i64 },
    /// Backend order statistics
    Stats {
        /// Filters in key=value format
        #[arg(long)]
        filter: Vec<String>,
    },
}

#[derive(Args)]
pub struct SaleArgs {
    /// Customer id
    #[arg(long)]
    customer: i64,
    /// Product code, barcode or id, optionally with a quantity (CODE or CODE:QTY)
    #[arg(short, long = "item", required = true)]
    items: Vec<String>,
    /// Show the cart without submitting
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }

    init_logging(&config);

    let format: OutputFormat = cli
        .format
        .as_deref()
        .unwrap_or(&config.display.format)
        .parse()
        .map_err(anyhow::Error::msg)?;
    let display = config.display_options();

    let session = config.open_session()?;
    let client = Arc::new(PosClient::new(config.client_config(), session)?);
    let page_size = config.listing.page_size.max(1);

    match cli.command {
        Commands::Login { email, password } => {
            let user = client.login(&Credentials { email, password }).await?;
            let who = user
                .and_then(|u| u.email)
                .unwrap_or_else(|| "unknown user".to_string());
            println!("Logged in as {}", who);
        }

        Commands::Logout => {
            client.logout()?;
            println!("Logged out");
        }

        Commands::Whoami => match client.verify().await? {
            Some(user) => println!("{}", render::json(&user)?),
            None => println!("Not logged in"),
        },

        Commands::Categories(cmd) => match cmd {
            CategoryCommand::List { page } => {
                let categories = client.list_categories().await?;
                let p = pos_admin::listing::paginate(categories, page, page_size);
                print!("{}", render::page(&p, format, &display)?);
            }
            CategoryCommand::Get { id } => {
                let category = client.get_category(id).await?;
                print!("{}", render::list(&[category], format, &display)?);
            }
            CategoryCommand::Create { name, image } => {
                let created = client.create_category(&NewCategory { name, image }).await?;
                println!("Category created");
                print_value(&created, format)?;
            }
            CategoryCommand::Update { id, name, image } => {
                let updated = client
                    .update_category(id, &CategoryUpdate { name, image })
                    .await?;
                println!("Category {} updated", id);
                print_value(&updated, format)?;
            }
            CategoryCommand::Delete { id } => {
                client.delete_category(id).await?;
                println!("Category {} deleted", id);
            }
        },

        Commands::Products(cmd) => run_products(&client, cmd, format, &display, page_size).await?,

        Commands::Customers(cmd) => run_customers(&client, cmd, format, &display, page_size).await?,

        Commands::Sales(cmd) => run_sales(&client, cmd, format, &display, page_size).await?,

        Commands::Sale(args) => run_sale(client, &config, args, format, &display).await?,

        Commands::Report { period, top } => {
            let period: Period = period.parse().map_err(anyhow::Error::msg)?;
            let top = top.unwrap_or(config.listing.top_n);
            let dashboard = Dashboard::load(client.as_ref(), period, chrono::Utc::now(), top).await?;
            print!("{}", render::dashboard(&dashboard, format, &display)?);
        }

        Commands::Config { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(&path, content)
                        .with_context(|| format!("writing {}", path.display()))?;
                    println!("Config written to {}", path.display());
                }
                None => print!("{}", content),
            }
        }
    }

    Ok(())
}

/// Logs go to stderr so command output stays clean
fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("pos_admin={}", config.logging.level)));

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn print_value(value: &serde_json::Value, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        println!("{}", render::json(value)?);
    }
    Ok(())
}

async fn run_products(
    client: &PosClient,
    cmd: ProductCommand,
    format: OutputFormat,
    display: &DisplayOptions,
    page_size: usize,
) -> Result<()> {
    match cmd {
        ProductCommand::List(args) => {
            let query = ProductQuery {
                limit: args.limit,
                offset: args.offset,
                price: None,
                price_min: args.price_min,
                price_max: args.price_max,
            };
            let products = client.query_products(&query).await?;
            let stock = args
                .stock
                .as_deref()
                .map(str::parse::<StockState>)
                .transpose()
                .map_err(anyhow::Error::msg)?;

            let mut view = ListView::new(
                ProductFilter {
                    search: args.search,
                    category_id: args.category,
                    stock,
                },
                page_size,
            );
            view.set_page(args.page);
            let page = view.render(&products);
            print!("{}", render::page(&page, format, display)?);

            if format == OutputFormat::Table {
                let stats = ProductStats::from_products(&products);
                println!(
                    "Products: {} | Low stock: {} | Without image: {} | Inventory value: {}",
                    stats.total,
                    stats.low_stock,
                    stats.without_image,
                    display.money(stats.inventory_value)
                );
            }
        }
        ProductCommand::Get { id } => {
            let product = client.get_product(id).await?;
            print!("{}", render::list(&[product], format, display)?);
        }
        ProductCommand::Create(args) => {
            let payload = NewProduct {
                name: args.name,
                code: args.code,
                price: Money::from_decimal(args.price),
                description: args.description,
                image: args.image,
                category_id: args.category,
                stock: args.stock,
                stock_min: args.stock_min,
            };
            let created = client.create_product(&payload).await?;
            println!("Product created");
            print_value(&created, format)?;
        }
        ProductCommand::Update { id, fields } => {
            let payload = ProductUpdate {
                name: fields.name,
                code: fields.code,
                price: fields.price.map(Money::from_decimal),
                description: fields.description,
                image: fields.image,
                category_id: fields.category,
                stock: fields.stock,
                stock_min: fields.stock_min,
            };
            let updated = client.update_product(id, &payload).await?;
            println!("Product {} updated", id);
            print_value(&updated, format)?;
        }
        ProductCommand::Delete { id } => {
            client.delete_product(id).await?;
            println!("Product {} deleted", id);
        }
    }
    Ok(())
}

async fn run_customers(
    client: &PosClient,
    cmd: CustomerCommand,
    format: OutputFormat,
    display: &DisplayOptions,
    page_size: usize,
) -> Result<()> {
    match cmd {
        CustomerCommand::List {
            search,
            status,
            page,
        } => {
            let customers = client.list_customers().await?;
            let status = status
                .as_deref()
                .map(str::parse::<CustomerStatus>)
                .transpose()
                .map_err(anyhow::Error::msg)?;

            let mut view = ListView::new(CustomerFilter { search, status }, page_size);
            view.set_page(page);
            let p = view.render(&customers);
            print!("{}", render::page(&p, format, display)?);

            if format == OutputFormat::Table {
                let stats = CustomerStats::from_customers(&customers);
                println!(
                    "Customers: {} | New: {} | Frequent: {} | Orders: {}",
                    stats.total, stats.new, stats.frequent, stats.total_orders
                );
            }
        }
        CustomerCommand::Get { id } => {
            let customer = client.get_customer(id).await?;
            print!("{}", render::list(&[customer], format, display)?);
        }
        CustomerCommand::Create {
            name,
            last_name,
            phone,
            address,
            email,
            password,
        } => {
            let payload = NewCustomer {
                name,
                last_name,
                phone,
                address,
                user: NewCustomerUser::customer(email, password),
            };
            let created = client.create_customer(&payload).await?;
            println!("Customer created");
            print_value(&created, format)?;
        }
        CustomerCommand::Update {
            id,
            name,
            last_name,
            phone,
            address,
        } => {
            let payload = CustomerUpdate {
                name,
                last_name,
                phone,
                address,
                user_id: None,
            };
            let updated = client.update_customer(id, &payload).await?;
            println!("Customer {} updated", id);
            print_value(&updated, format)?;
        }
        CustomerCommand::Delete { id } => {
            client.delete_customer(id).await?;
            println!("Customer {} deleted", id);
        }
    }
    Ok(())
}

async fn run_sales(
    client: &PosClient,
    cmd: SalesCommand,
    format: OutputFormat,
    display: &DisplayOptions,
    page_size: usize,
) -> Result<()> {
    match cmd {
        SalesCommand::List {
            search,
            customer,
            page,
        } => {
            let orders = match customer {
                Some(id) => client.orders_by_customer(id).await?,
                None => client.list_orders().await?,
            };
            let mut view = ListView::new(OrderFilter { search }, page_size);
            view.set_page(page);
            let p = view.render(&orders);
            print!("{}", render::page(&p, format, display)?);
        }
        SalesCommand::Get { id } => {
            let order = client.get_order(id).await?;
            match format {
                OutputFormat::Json => println!("{}", render::json(&order)?),
                _ => {
                    print!("{}", render::list(&[&order], format, display)?);
                    for item in &order.items {
                        println!(
                            "  {} x{} @ {} = {}",
                            item.name,
                            item.quantity(),
                            display.money(item.price),
                            display.money(item.line_total())
                        );
                    }
                }
            }
        }
        SalesCommand::Reassign { id, customer } => {
            let updated = client.update_order(id, customer).await?;
            println!("Sale {} moved to customer {}", id, customer);
            print_value(&updated, format)?;
        }
        SalesCommand::Delete { id } => {
            client.delete_order(id).await?;
            println!("Sale {} deleted", id);
        }
        SalesCommand::Stats { filter } => {
            let pairs: Vec<(&str, &str)> = filter
                .iter()
                .filter_map(|f| f.split_once('='))
                .collect();
            let stats = client.order_stats(&pairs).await?;
            println!("{}", render::json(&stats)?);
        }
    }
    Ok(())
}

/// Split `CODE` or `CODE:QTY`
fn parse_item(item: &str) -> Result<(&str, u32)> {
    match item.rsplit_once(':') {
        Some((code, qty)) => {
            let qty: u32 = qty
                .parse()
                .with_context(|| format!("invalid quantity in {:?}", item))?;
            Ok((code, qty))
        }
        None => Ok((item, 1)),
    }
}

async fn run_sale(
    client: Arc<PosClient>,
    config: &Config,
    args: SaleArgs,
    format: OutputFormat,
    display: &DisplayOptions,
) -> Result<()> {
    let mut settings = config.sales_settings();
    // items come from the command line, not from repeated clicks
    settings.add_debounce = Duration::ZERO;
    let mut session = SalesSession::new(client, settings);
    let loaded = session.refresh().await;

    let mut rejected = Vec::new();
    for item in &args.items {
        let (code, qty) = parse_item(item)?;
        // one add per product, then the quantity is set directly
        let added = session.add_by_code(code, Instant::now()).and_then(|change| {
            tracing::debug!(code, ?change, "item added");
            match session.find_by_code(code).map(|p| p.id) {
                Some(id) if qty != 1 => session.set_quantity(id, qty),
                _ => Ok(change),
            }
        });
        if added.is_err() {
            rejected.push(item.as_str());
        }
    }

    if loaded {
        session.select_customer(args.customer);
    }

    print!(
        "{}",
        render::cart(
            session.cart().lines(),
            &session.totals(),
            session.cart().surcharge_percent(),
            format,
            display
        )?
    );
    print_notices(&mut session);

    if !rejected.is_empty() {
        bail!("sale not submitted, rejected items: {}", rejected.join(", "));
    }
    if args.dry_run {
        return Ok(());
    }

    let outcome = session.submit().await;
    print_notices(&mut session);

    match outcome? {
        CheckoutOutcome::Completed { .. } => Ok(()),
        outcome => bail!(outcome.summary()),
    }
}

fn print_notices(session: &mut SalesSession<PosClient>) {
    for notice in session.notices().drain(Instant::now()) {
        eprintln!("{}", notice);
    }
}
