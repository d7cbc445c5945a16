//! # Products Example
//!
//! Timestamps and client-assigned ids on a `products` collection in the
//! `products-api` database: ping, insert one product, list all products.
//!
//! Pass `--memory` to run without a server.

use dochaus::prelude::*;
use dochaus::store_object::bson::DateTime;
use tracing_subscriber::EnvFilter;

const DATABASE: &str = "products-api";
const PRODUCTS_COLLECTION: &str = "products";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: EntityId,
    pub created_at: DateTime,
    pub updated_at: DateTime,
    pub title: String,
}

impl Entity for Product {
    fn id(&self) -> Option<EntityId> {
        Some(self.id)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // `.env` and `dochaus.toml` supply the URI; the database is fixed
    let mut config = AppConfig::load()?.database;
    config.database = DATABASE.to_string();

    if std::env::args().any(|arg| arg == "--memory") {
        let provider = ConnectionProvider::with_connector(MemoryConnector::new(), config);
        run(&provider).await?;
        provider.disconnect().await;
    } else {
        let provider = ConnectionProvider::new(config);
        run(&provider).await?;
        provider.disconnect().await;
    }

    Ok(())
}

async fn run<C: Connector>(provider: &ConnectionProvider<C>) -> anyhow::Result<()> {
    let connection = provider.get_connection().await?;
    connection.ping().await?;
    println!("✅ Connected to MongoDB!");

    let products = connection.repository::<Product>(PRODUCTS_COLLECTION)?;

    let now = DateTime::now();
    let product = Product {
        id: EntityId::new(),
        created_at: now,
        updated_at: now,
        title: "Product #1".to_string(),
    };

    // A failed insert is reported, the listing still runs
    match products.insert(&product).await {
        Ok(id) => println!("✅ Created product {}", id),
        Err(err) => println!("⚠️  Insert failed: {}", err),
    }

    let all = products.find_all().await?;
    println!("📦 {} products:", all.len());
    for product in &all {
        println!(
            "   - {} {} (created {})",
            product.id,
            product.title,
            product.created_at.try_to_rfc3339_string().unwrap_or_default()
        );
    }

    Ok(())
}
