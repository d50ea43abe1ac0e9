//! Metadata cache for table and column pickers
//!
//! Parameter dropdowns ask for the same metadata on every render. A cache is
//! created by the caller and handed to each client that should share it; it
//! lives exactly as long as its owners. Writes are last-writer-wins.

use log::debug;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::models::{ColumnInfo, TableInfo};

#[derive(Debug, Default)]
pub struct MetadataCache {
    tables: RwLock<Option<Vec<TableInfo>>>,
    columns: RwLock<HashMap<String, Vec<ColumnInfo>>>,
}

impl MetadataCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn tables(&self) -> Option<Vec<TableInfo>> {
        let cached = self.tables.read().await.clone();
        if cached.is_some() {
            debug!("Metadata cache hit: tables");
        }
        cached
    }

    pub async fn set_tables(&self, tables: Vec<TableInfo>) {
        *self.tables.write().await = Some(tables);
    }

    pub async fn columns(&self, entity: &str) -> Option<Vec<ColumnInfo>> {
        let cached = self.columns.read().await.get(entity).cloned();
        if cached.is_some() {
            debug!("Metadata cache hit: columns of {}", entity);
        }
        cached
    }

    pub async fn set_columns(&self, entity: &str, columns: Vec<ColumnInfo>) {
        self.columns
            .write()
            .await
            .insert(entity.to_string(), columns);
    }

    pub async fn clear(&self) {
        *self.tables.write().await = None;
        self.columns.write().await.clear();
    }
}
