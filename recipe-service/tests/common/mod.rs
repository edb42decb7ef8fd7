#![allow(dead_code)]

use recipe_service::config::{MongoConfig, RecipeConfig, ServerConfig, DEFAULT_STATIC_DIR};
use recipe_service::services::RecipeDb;
use recipe_service::startup::{AppState, Application};
use service_core::config::Config as CoreConfig;

pub fn mongodb_uri() -> String {
    std::env::var("TEST_MONGODB_URI").unwrap_or_else(|_| "mongodb://localhost:27017".to_string())
}

/// Config pointing at a fresh, uniquely named database and a random port.
pub fn test_config() -> RecipeConfig {
    RecipeConfig {
        common: CoreConfig { port: 0 },
        mongodb: MongoConfig {
            uri: mongodb_uri(),
            database: format!("recipe_test_{}", uuid::Uuid::new_v4()),
        },
        server: ServerConfig {
            static_dir: DEFAULT_STATIC_DIR.to_string(),
        },
    }
}

/// State for router tests that never reach the database. The driver connects
/// lazily, so no server has to be running.
pub async fn offline_state() -> AppState {
    let config = test_config();
    let db = RecipeDb::connect(&config.mongodb.uri, &config.mongodb.database)
        .await
        .expect("Failed to build MongoDB client");
    AppState { config, db }
}

/// An isolated database with the recipe indexes in place.
pub struct TestDb {
    pub db: RecipeDb,
    pub db_name: String,
}

impl TestDb {
    pub async fn new() -> Self {
        let config = test_config();
        let db = RecipeDb::connect(&config.mongodb.uri, &config.mongodb.database)
            .await
            .expect("Failed to connect to MongoDB");
        db.initialize_indexes()
            .await
            .expect("Failed to initialize indexes");

        TestDb {
            db,
            db_name: config.mongodb.database,
        }
    }

    pub async fn cleanup(&self) {
        let _ = self.db.database().drop(None).await;
    }
}

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub db: RecipeDb,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let app = Application::build(test_config())
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let db = app.db().clone();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to accept connections
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp { address, port, db }
    }

    pub async fn cleanup(&self) {
        let _ = self.db.database().drop(None).await;
    }
}
