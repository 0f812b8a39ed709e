//! Clears check-ins on manually recorded sales, e.g. after a rehearsal at
//! the door. Provider-paid tickets are left as they are.

use std::env;
use std::error::Error;

use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tickets_server::store::{PgStore, TicketStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let database_url = env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?;
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await?;

    let store = PgStore::new(pool);
    let reset = store.reset_manual_check_ins().await?;
    info!(reset, "Manual sales marked as unverified");

    Ok(())
}
