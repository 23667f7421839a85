//! In-process cache for read results.
//!
//! Entries are keyed by operation and arguments. Each key belongs to a
//! namespace, and writes invalidate whole namespaces so later reads go back
//! to the backend.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::domain::student::StudentFilters;
use crate::domain::types::{PageNumber, PageSize};

pub const STUDENTS_NAMESPACE: &str = "alunas";
pub const STATS_NAMESPACE: &str = "alunas-stats";
pub const COURSES_NAMESPACE: &str = "cursos";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Students {
        filters: StudentFilters,
        page: PageNumber,
        limit: PageSize,
    },
    Stats,
    Courses,
}

impl QueryKey {
    pub fn namespace(&self) -> &'static str {
        match self {
            QueryKey::Students { .. } => STUDENTS_NAMESPACE,
            QueryKey::Stats => STATS_NAMESPACE,
            QueryKey::Courses => COURSES_NAMESPACE,
        }
    }
}

type Entry = Arc<dyn Any + Send + Sync>;

#[derive(Default)]
pub struct QueryCache {
    entries: RwLock<HashMap<QueryKey, Entry>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a clone of the cached value when present and of type `T`.
    pub fn get<T>(&self, key: &QueryKey) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        self.entries
            .read()
            .get(key)
            .and_then(|entry| entry.downcast_ref::<T>())
            .cloned()
    }

    pub fn insert<T>(&self, key: QueryKey, value: T)
    where
        T: Send + Sync + 'static,
    {
        self.entries.write().insert(key, Arc::new(value));
    }

    /// Drops every entry in `namespace`, returning how many were removed.
    pub fn invalidate(&self, namespace: &str) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|key, _| key.namespace() != namespace);
        before - entries.len()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
