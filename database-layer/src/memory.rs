//! Process-local store implementations
//!
//! Used by the `memory` storage backend and by tests. Semantics mirror the
//! PostgreSQL stores: ids are assigned on create, listings are ordered by
//! creation time, updates return the pre-update record.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::analyzer_repository::AnalyzerStore;
use crate::error::DatabaseResult;
use crate::history_repository::HistoryStore;
use crate::models::{
    Analyzer, AnalyzerFilter, AnalyzerPatch, HistoryEntry, NewAnalyzer, NewHistoryEntry, Table,
};
use crate::table_repository::TableRegistry;

fn sort_by_creation(analyzers: &mut [Analyzer]) {
    analyzers.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
}

#[derive(Default)]
pub struct MemoryAnalyzerStore {
    analyzers: RwLock<HashMap<Uuid, Analyzer>>,
}

impl MemoryAnalyzerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.analyzers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.analyzers.read().is_empty()
    }
}

#[async_trait]
impl AnalyzerStore for MemoryAnalyzerStore {
    async fn create(&self, analyzer: NewAnalyzer) -> DatabaseResult<Analyzer> {
        let record = analyzer.into_analyzer(Utc::now());
        self.analyzers.write().insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<Analyzer>> {
        Ok(self.analyzers.read().get(&id).cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> DatabaseResult<Vec<Analyzer>> {
        let analyzers = self.analyzers.read();
        let mut found: Vec<Analyzer> = analyzers
            .values()
            .filter(|analyzer| ids.contains(&analyzer.id))
            .cloned()
            .collect();
        sort_by_creation(&mut found);
        Ok(found)
    }

    async fn find_all(&self, filter: AnalyzerFilter) -> DatabaseResult<Vec<Analyzer>> {
        let mut found: Vec<Analyzer> = self
            .analyzers
            .read()
            .values()
            .filter(|analyzer| filter.matches(analyzer))
            .cloned()
            .collect();
        sort_by_creation(&mut found);
        Ok(found)
    }

    async fn update_by_id(&self, id: Uuid, patch: &AnalyzerPatch) -> DatabaseResult<Option<Analyzer>> {
        let mut analyzers = self.analyzers.write();
        let Some(current) = analyzers.get_mut(&id) else {
            return Ok(None);
        };

        let previous = current.clone();
        patch.apply_to(current, Utc::now());
        Ok(Some(previous))
    }

    async fn update_by_ids(&self, ids: &[Uuid], patch: &AnalyzerPatch) -> DatabaseResult<u64> {
        let now = Utc::now();
        let mut analyzers = self.analyzers.write();
        let mut updated = 0;

        // Each row is matched once however often its id is repeated
        let unique: HashSet<&Uuid> = ids.iter().collect();
        for id in unique {
            if let Some(current) = analyzers.get_mut(id) {
                patch.apply_to(current, now);
                updated += 1;
            }
        }

        Ok(updated)
    }

    async fn delete_by_id(&self, id: Uuid) -> DatabaseResult<Option<Analyzer>> {
        Ok(self.analyzers.write().remove(&id))
    }

    async fn is_healthy(&self) -> bool {
        true
    }
}

pub struct MemoryTableRegistry {
    tables: RwLock<Vec<Table>>,
}

impl MemoryTableRegistry {
    /// Registry seeded with one table per name
    pub fn with_tables(names: &[&str]) -> Self {
        Self {
            tables: RwLock::new(names.iter().map(|name| Table::new(*name)).collect()),
        }
    }

    pub fn insert(&self, table: Table) {
        self.tables.write().push(table);
    }
}

#[async_trait]
impl TableRegistry for MemoryTableRegistry {
    async fn find_by_name(&self, name: &str) -> DatabaseResult<Option<Table>> {
        Ok(self.tables.read().iter().find(|table| table.name == name).cloned())
    }
}

#[derive(Default)]
pub struct MemoryHistoryStore {
    entries: RwLock<Vec<HistoryEntry>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every entry in append order
    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.entries.read().clone()
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn append(&self, entry: NewHistoryEntry) -> DatabaseResult<HistoryEntry> {
        let entry = entry.into_entry();
        self.entries.write().push(entry.clone());
        Ok(entry)
    }

    async fn list_for_analyzer(&self, analyzer_id: Uuid) -> DatabaseResult<Vec<HistoryEntry>> {
        Ok(self
            .entries
            .read()
            .iter()
            .filter(|entry| entry.analyzer_id == analyzer_id)
            .cloned()
            .collect())
    }
}
