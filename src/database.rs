//! Thin MongoDB connection helper.
//!
//! Owns a client and a handle to one database. Schema lives with the bots that use it.

use mongodb::bson::doc;
use mongodb::{Client, Database};
use thiserror::Error;
use tracing::{error, info};

use crate::config::DatabaseSettings;

/// Errors that can occur while connecting to MongoDB.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// No database name was configured.
    #[error("No default database defined")]
    MissingDatabaseName,

    /// Failure reported by the driver (bad URI, unreachable server, command error).
    #[error("MongoDB failure: {0}")]
    Mongo(#[from] mongodb::error::Error),
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Lazily connected MongoDB handle.
pub struct MongoConnection {
    connection_string: String,
    database_name: String,
    collection: Option<String>,
    client: Option<Client>,
    db: Option<Database>,
}

impl MongoConnection {
    pub fn new(
        connection_string: impl Into<String>,
        database_name: impl Into<String>,
        collection: Option<String>,
    ) -> Self {
        Self {
            connection_string: connection_string.into(),
            database_name: database_name.into(),
            collection,
            client: None,
            db: None,
        }
    }

    pub fn from_settings(settings: &DatabaseSettings, collection: Option<String>) -> Self {
        Self::new(
            &settings.connection_string,
            &settings.database_name,
            collection,
        )
    }

    /// Builds the client, selects the database and makes sure the configured collection exists.
    pub async fn connect(&mut self) -> DatabaseResult<&Database> {
        let db = self.open().await?;
        Ok(self.db.insert(db))
    }

    async fn open(&mut self) -> DatabaseResult<Database> {
        if self.database_name.trim().is_empty() {
            error!("MongoDB configuration error: no default database defined");
            return Err(DatabaseError::MissingDatabaseName);
        }

        let client = Client::with_uri_str(&self.connection_string)
            .await
            .inspect_err(|e| error!("MongoDB connection failed: {}", e))?;
        let db = client.database(&self.database_name);

        if let Some(collection) = &self.collection {
            ensure_collection_exists(&db, collection).await?;
        }

        info!("MongoDB connection to '{}' successful", self.database_name);
        self.client = Some(client);
        Ok(db)
    }

    pub fn client(&self) -> Option<&Client> {
        self.client.as_ref()
    }

    /// Returns the database, connecting first if needed.
    pub async fn database(&mut self) -> DatabaseResult<&Database> {
        let db = match self.db.take() {
            Some(db) => db,
            None => self.open().await?,
        };
        Ok(self.db.insert(db))
    }

    /// Whether the server answers a ping.
    pub async fn exists(&self) -> bool {
        match &self.db {
            Some(db) => db.run_command(doc! { "ping": 1 }).await.is_ok(),
            None => false,
        }
    }

    pub async fn create_collection(&mut self, name: &str) -> DatabaseResult<()> {
        let db = self.database().await?;
        db.create_collection(name)
            .await
            .inspect_err(|e| error!("Collection '{}' creation failed: {}", name, e))?;
        info!("Collection '{}' created", name);
        Ok(())
    }

    /// Pings the server, connecting first if needed.
    pub async fn check_status(&mut self) -> DatabaseResult<()> {
        let db = self.database().await?;
        db.run_command(doc! { "ping": 1 })
            .await
            .inspect_err(|e| error!("MongoDB status check failed: {}", e))?;
        info!("MongoDB connection: healthy");
        Ok(())
    }
}

/// Creates `collection` unless it is already present.
pub async fn ensure_collection_exists(db: &Database, collection: &str) -> DatabaseResult<()> {
    let names = db.list_collection_names().await?;
    if !names.iter().any(|name| name == collection) {
        db.create_collection(collection).await?;
        info!("Collection '{}' created", collection);
    }
    Ok(())
}
