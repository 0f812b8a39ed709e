//! Registers a seller account and prints a bearer token for it.

use std::error::Error;

use clap::Parser;
use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tickets_server::auth::issue_token;
use tickets_server::models::NewAdmin;
use tickets_server::store::{PgStore, TicketStore};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Login email, unique per admin.
    #[arg(long)]
    email: String,

    /// Seller's Mercado Pago access token. Sales fall back to the platform
    /// account when left empty.
    #[arg(long, default_value = "")]
    access_token: String,

    #[arg(long, default_value = "")]
    public_key: String,

    #[arg(long)]
    phone: Option<String>,

    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    jwt_secret: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();
    let email = args.email.trim().to_string();
    if !email.contains('@') {
        return Err(format!("'{email}' is not a valid email").into());
    }

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&args.database_url)
        .await?;
    sqlx::migrate!().run(&pool).await?;

    let store = PgStore::new(pool);
    let admin = store
        .insert_admin(NewAdmin {
            email,
            mercadopago_access_token: args.access_token.trim().to_string(),
            mercadopago_public_key: args.public_key.trim().to_string(),
            phone: args.phone.filter(|phone| !phone.trim().is_empty()),
        })
        .await?;
    info!(admin_id = %admin.id, email = %admin.email, "Admin created");

    println!("{}", issue_token(admin.id, &args.jwt_secret)?);
    Ok(())
}
