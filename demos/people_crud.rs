//! # People CRUD Example
//!
//! Walks through the full DocHaus flow on a `people` collection:
//! - Lazily connecting through the shared `ConnectionProvider`
//! - Running insert, read, update and delete concurrently with `OperationRunner`
//! - Looking documents up by id, by filter and in full
//!
//! Runs against MongoDB by default (`MONGODB_URI`, `dochaus.toml`). Pass
//! `--memory` to use the in-process backend instead.
//!
//! Set `RUST_LOG=dochaus=info,store_object=debug` to see each round trip.

use dochaus::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub name: String,
    pub age: i32,
    pub email: String,
}

impl Entity for Person {
    fn id(&self) -> Option<EntityId> {
        self.id
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("🚀 DocHaus People CRUD Example");
    println!("==============================");

    let config = AppConfig::load()?;

    if std::env::args().any(|arg| arg == "--memory") {
        let provider = ConnectionProvider::with_connector(MemoryConnector::new(), config.database);
        run(&provider).await?;
        provider.disconnect().await;
    } else {
        let provider = ConnectionProvider::new(config.database);
        run(&provider).await?;
        provider.disconnect().await;
    }

    println!("\n🎉 Done");
    Ok(())
}

async fn run<C: Connector>(provider: &ConnectionProvider<C>) -> anyhow::Result<()> {
    // 1. Connect
    println!("\n📊 Step 1: Connection");
    println!("---------------------");

    let connection = provider.get_connection().await?;
    connection.ping().await?;
    println!("✅ Connected to database '{}'", connection.database_name());

    let people = connection.repository::<Person>("people")?;

    // 2. Concurrent CRUD
    println!("\n⚡ Step 2: Concurrent operations");
    println!("-------------------------------");

    let runner = OperationRunner::new();
    let tom = || Filter::new().eq("name", "Tom Sawyer");

    let store = people.clone();
    let mut insert = runner.run(async move {
        store
            .insert(&Person {
                id: None,
                name: "Tom Sawyer".to_string(),
                age: 30,
                email: "tom.sawyer@example.com".to_string(),
            })
            .await
    });

    let store = people.clone();
    let mut read = runner.run(async move { store.find_one(&tom()).await });

    let store = people.clone();
    let mut update = runner.run(async move {
        store
            .update_one(&tom(), &UpdateSet::new().set("age", 31))
            .await
    });

    let store = people.clone();
    let mut delete = runner.run(async move { store.delete_one(&tom()).await });

    // Operations race each other; any of them may miss the inserted document
    let id = insert.wait().await?;
    println!("✅ Inserted document with ID: {}", id);

    match read.wait().await {
        Ok(person) => println!("✅ Found document: {:?}", person),
        Err(err) => println!("⚠️  Concurrent read: {}", err),
    }

    let updated = update.wait().await?;
    println!(
        "✅ Matched {} documents and modified {} documents",
        updated.matched_count, updated.modified_count
    );

    let deleted = delete.wait().await?;
    println!("✅ Deleted {} documents", deleted.deleted_count);

    // 3. Lookups
    println!("\n🔍 Step 3: Lookups");
    println!("------------------");

    let store = people.clone();
    let mut by_id = runner.run(async move { store.find_by_id(&id).await });
    match by_id.wait().await {
        Ok(person) => println!("✅ Found document by ID: {:?}", person),
        Err(err) if err.is_not_found() => println!("ℹ️  Document {} is gone", id),
        Err(err) => return Err(err.into()),
    }

    let store = people.clone();
    let mut by_hex = runner.run(async move { store.find_by_id_str(&id.to_hex()).await });
    match by_hex.wait().await {
        Ok(person) => println!("✅ Found document by hex ID: {:?}", person),
        Err(err) => println!("ℹ️  Lookup by hex ID: {}", err),
    }

    let store = people.clone();
    let mut all = runner.run(async move { store.find_all().await });
    let everyone = all.wait().await?;
    println!("✅ Found {} documents in total", everyone.len());
    for person in &everyone {
        println!("   - {:?}", person);
    }

    let store = people.clone();
    let mut many = runner.run(async move { store.find_many(&Filter::new().gt("age", 25)).await });
    let older = many.wait().await?;
    println!("✅ Found {} documents with age > 25", older.len());
    for person in &older {
        println!("   - {} ({})", person.name, person.age);
    }

    // A handle yields its result only once
    if let Err(err) = many.wait().await {
        println!("ℹ️  Second wait: {}", err);
    }

    Ok(())
}
