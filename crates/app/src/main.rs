use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use storefront_app::{CatalogBackend, Notice, Storefront, StorefrontConfig};
use storefront_auth::SignUpForm;
use storefront_catalog::{DetailParams, ProductDetail, ProductForm};
use storefront_core::{CategoryId, ProductId};

#[derive(Parser)]
#[command(name = "storefront")]
#[command(about = "Browse and manage the storefront catalog")]
#[command(version)]
struct Cli {
    /// Override STOREFRONT_BACKEND (local or remote)
    #[arg(long, global = true)]
    backend: Option<CatalogBackend>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create any missing default categories
    Bootstrap,
    /// List products, optionally for one category id
    List {
        #[arg(long)]
        category: Option<String>,
    },
    /// Search products by name or category
    Search {
        query: String,
        #[arg(long)]
        category: Option<String>,
    },
    /// Show one product with its detail-view data
    Show {
        id: Option<String>,
        /// Detail parameters as JSON (a product or a map of string fields)
        #[arg(long, conflicts_with = "id")]
        params: Option<String>,
    },
    /// Add a product (admin)
    AddProduct(ProductArgs),
    /// Replace a product's fields (admin)
    EditProduct {
        id: String,
        #[command(flatten)]
        product: ProductArgs,
    },
    /// Delete a product (admin)
    DeleteProduct { id: String },
    /// List categories
    Categories,
    /// Add a category (admin)
    AddCategory { name: String },
    /// Delete a category (admin)
    DeleteCategory { id: String },
    /// Register a customer account
    SignUp {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm: String,
    },
    /// Sign in and remember the session
    SignIn {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// Require the admin role
        #[arg(long)]
        admin: bool,
    },
    /// Forget the current session
    Logout,
    /// Print the current session
    Whoami,
    /// Create or promote an admin account
    CreateAdmin {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
}

#[derive(Args)]
struct ProductArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    price: String,
    #[arg(long)]
    description: String,
    #[arg(long)]
    category: String,
    #[arg(long, default_value = "")]
    image: String,
}

impl From<ProductArgs> for ProductForm {
    fn from(args: ProductArgs) -> Self {
        Self {
            name: args.name,
            price: args.price,
            description: args.description,
            category: args.category,
            image: args.image,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = StorefrontConfig::from_env().context("invalid configuration")?;
    storefront_observability::init_with(config.log_format, "info");
    if let Some(backend) = cli.backend {
        config = config.with_backend(backend);
    }

    let storefront = Storefront::open(config).await?;
    run(&storefront, cli.command).await
}

async fn run(storefront: &Storefront, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Bootstrap => {
            let categories = storefront.bootstrap_categories().await.or_else(fail)?;
            print_json(&categories)
        }
        Commands::List { category } => {
            let filter = category.map(CategoryId::new).transpose()?;
            let outcome = storefront.browser().refresh(filter.as_ref()).await;
            if let Some(notice) = outcome.notice() {
                eprintln!("{notice}");
            }
            match outcome.snapshot() {
                Some(snapshot) => print_json(snapshot),
                None => Ok(()),
            }
        }
        Commands::Search { query, category } => {
            let filter = category.map(CategoryId::new).transpose()?;
            let browser = storefront.browser();
            if let Some(notice) = browser.refresh(filter.as_ref()).await.notice() {
                eprintln!("{notice}");
            }
            print_json(&browser.search(&query).await)
        }
        Commands::Show { id, params } => {
            let product = match (id, params) {
                (_, Some(raw)) => {
                    let params: DetailParams =
                        serde_json::from_str(&raw).context("detail parameters are not valid JSON")?;
                    params.into_product().map_err(|e| anyhow::anyhow!(e.user_message().to_string()))?
                }
                (Some(id), None) => storefront.catalog().get(&ProductId::new(id)?).await?,
                (None, None) => bail!("give a product id or --params"),
            };
            print_json(&ProductDetail::from(product))
        }
        Commands::AddProduct(args) => {
            let done = storefront.admin().await.or_else(fail)?.add_product(&args.into()).await.or_else(fail)?;
            println!("{}", done.notice);
            print_json(&done.value)
        }
        Commands::EditProduct { id, product } => {
            let id = ProductId::new(id)?;
            let done = storefront
                .admin()
                .await
                .or_else(fail)?
                .update_product(&id, &product.into())
                .await
                .or_else(fail)?;
            println!("{}", done.notice);
            print_json(&done.value)
        }
        Commands::DeleteProduct { id } => {
            let id = ProductId::new(id)?;
            let done = storefront.admin().await.or_else(fail)?.delete_product(&id).await.or_else(fail)?;
            println!("{}", done.notice);
            Ok(())
        }
        Commands::Categories => {
            let categories = storefront.catalog().categories().await?;
            print_json(&categories)
        }
        Commands::AddCategory { name } => {
            let done = storefront.admin().await.or_else(fail)?.add_category(&name).await.or_else(fail)?;
            println!("{}", done.notice);
            print_json(&done.value)
        }
        Commands::DeleteCategory { id } => {
            let id = CategoryId::new(id)?;
            let done = storefront.admin().await.or_else(fail)?.delete_category(&id).await.or_else(fail)?;
            println!("{}", done.notice);
            Ok(())
        }
        Commands::SignUp { email, password, confirm } => {
            let done = storefront
                .sign_up(&SignUpForm::new(email, password, confirm))
                .await
                .or_else(fail)?;
            println!("{}", done.notice);
            Ok(())
        }
        Commands::SignIn { email, password, admin } => {
            let done = if admin {
                storefront.sign_in_admin(&email, &password).await
            } else {
                storefront.sign_in(&email, &password).await
            }
            .or_else(fail)?;
            println!("{}", done.notice);
            print_json(&done.value)
        }
        Commands::Logout => {
            let done = storefront.logout().await.or_else(fail)?;
            println!("{}", done.notice);
            Ok(())
        }
        Commands::Whoami => match storefront.session() {
            Some(session) => print_json(&session),
            None => {
                println!("not signed in");
                Ok(())
            }
        },
        Commands::CreateAdmin { email, password } => {
            let done = storefront.provision_admin(&email, &password).await.or_else(fail)?;
            println!("{}", done.notice);
            Ok(())
        }
    }
}

/// Turn an error notice into the command's failure.
fn fail<T>(notice: Notice) -> anyhow::Result<T> {
    bail!("{}", notice.message)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
