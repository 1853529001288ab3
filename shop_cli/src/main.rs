use clap::{Parser, Subcommand};
use serde::Serialize;
use shop_core::*;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "minishop")]
#[command(about = "Command-line client for the minishop marketplace", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Override environment (development, production)
    #[arg(long, global = true)]
    env: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in with a login code
    Login {
        #[arg(long)]
        code: String,
    },

    /// Forget the stored session
    Logout,

    /// Show the signed-in profile, refreshed when the cached copy is stale
    Whoami,

    /// Fetch the current profile from the backend
    Profile,

    /// Browse products
    Products {
        /// Title search
        #[arg(long)]
        query: Option<String>,

        /// Category id
        #[arg(long)]
        category: Option<String>,

        /// Page number, starting at 1
        #[arg(long)]
        page: Option<u32>,

        #[arg(long)]
        size: Option<u32>,
    },

    /// Show one product
    Product { id: String },

    /// List product categories
    Categories,

    /// List your orders
    Orders {
        /// TO_PAY, TO_SHIP, TO_RECEIVE, COMPLETED or CANCELED
        #[arg(long)]
        status: Option<String>,
    },

    /// Show one order
    Order { id: String },

    /// Place an order
    OrderCreate {
        #[arg(long)]
        product: String,

        #[arg(long, default_value_t = 1)]
        quantity: u32,

        /// Shipping address id
        #[arg(long)]
        address: Option<String>,
    },

    /// Cancel an order
    OrderCancel { id: String },

    /// List shipping addresses
    Addresses,

    /// Upload an image
    Upload {
        path: PathBuf,

        /// JSON metadata sent along with the file
        #[arg(long)]
        metadata: Option<String>,
    },

    /// List notifications
    Notifications {
        /// system or transaction
        #[arg(long)]
        kind: Option<String>,

        /// Page number, starting at 0
        #[arg(long)]
        page: Option<u32>,

        #[arg(long)]
        size: Option<u32>,
    },

    /// Count unread notifications
    Unread,
}

/// Surfaces login prompts on the terminal
struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify(&self, notice: Notice) {
        eprintln!("! {}", notice);
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    shop_core::logging::init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = match cli.config {
        Some(ref path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(data_dir) = cli.data_dir {
        config.data.data_dir = data_dir;
    }
    if let Some(ref env) = cli.env {
        config.environment = env.parse()?;
    }
    tracing::debug!(
        "Using {:?} environment, data in {:?}",
        config.environment,
        config.data.data_dir
    );

    let client = ShopClient::from_config(&config)?.with_notifier(Arc::new(StderrNotifier));

    match cli.command {
        Commands::Login { code } => cmd_login(&client, &code).await,
        Commands::Logout => {
            client.auth().logout()?;
            println!("Logged out");
            Ok(())
        }
        Commands::Whoami => cmd_whoami(&client).await,
        Commands::Profile => print_json(&client.users().me().await?),
        Commands::Products {
            query,
            category,
            page,
            size,
        } => {
            let query = ProductQuery {
                query,
                category_id: category,
                page,
                size,
            };
            print_json(&client.products().list(&query).await?)
        }
        Commands::Product { id } => print_json(&client.products().get(&id).await?),
        Commands::Categories => print_json(&client.products().categories().await?),
        Commands::Orders { status } => {
            let query = OrderQuery {
                status: status.map(|s| s.parse::<OrderStatus>()).transpose()?,
            };
            print_json(&client.orders().list(&query).await?)
        }
        Commands::Order { id } => print_json(&client.orders().get(&id).await?),
        Commands::OrderCreate {
            product,
            quantity,
            address,
        } => {
            let request = CreateOrderRequest {
                product_id: product,
                quantity,
                address_id: address,
                phone_number: None,
            };
            print_json(&client.orders().create(&request).await?)
        }
        Commands::OrderCancel { id } => {
            client.orders().cancel(&id).await?;
            println!("Order {} canceled", id);
            Ok(())
        }
        Commands::Addresses => print_json(&client.addresses().list().await?),
        Commands::Upload { path, metadata } => cmd_upload(&client, path, metadata).await,
        Commands::Notifications { kind, page, size } => {
            let query = NotificationQuery {
                kind: kind.map(|k| k.parse::<NotificationKind>()).transpose()?,
                page,
                size,
            };
            print_json(&client.notifications().list(&query).await?)
        }
        Commands::Unread => {
            println!("{}", client.notifications().unread_count().await?);
            Ok(())
        }
    }
}

async fn cmd_login(client: &ShopClient, code: &str) -> Result<()> {
    let response = client.auth().login(code).await?;
    print_json(&response.user)
}

async fn cmd_whoami(client: &ShopClient) -> Result<()> {
    match client.current_profile().await? {
        Some(profile) => print_json(&profile),
        None => {
            println!("not logged in");
            Ok(())
        }
    }
}

async fn cmd_upload(client: &ShopClient, path: PathBuf, metadata: Option<String>) -> Result<()> {
    let metadata: Option<serde_json::Value> = metadata
        .as_deref()
        .map(serde_json::from_str)
        .transpose()?;

    let response = client
        .files()
        .upload_image(&path, metadata.as_ref())
        .await?;
    print_json(&response)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
