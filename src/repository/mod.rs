use async_trait::async_trait;

use crate::{
    domain::{
        student::{NewStudent, StudentFilters, StudentRecord},
        types::{CourseName, PageNumber, PageSize, PurchaseDate, SearchTerm},
    },
    repository::errors::RepositoryResult,
};

pub mod errors;
#[cfg(any(test, feature = "test-mocks"))]
pub mod mock;
pub mod postgrest;
pub mod query;

pub use postgrest::PostgrestRepository;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pagination {
    pub page: PageNumber,
    pub per_page: PageSize,
}

impl Pagination {
    pub fn new(page: PageNumber, per_page: PageSize) -> Self {
        Self { page, per_page }
    }

    /// Zero-based inclusive row range covered by this page.
    pub fn range(&self) -> (usize, usize) {
        let from = (self.page.get() - 1) * self.per_page.get();
        (from, from + self.per_page.get() - 1)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct StudentListQuery {
    pub filters: StudentFilters,
    pub pagination: Option<Pagination>,
}

impl StudentListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn curso(mut self, curso: CourseName) -> Self {
        self.filters.curso = Some(curso);
        self
    }

    pub fn purchased_from(mut self, date: PurchaseDate) -> Self {
        self.filters.data_inicio = Some(date);
        self
    }

    pub fn purchased_until(mut self, date: PurchaseDate) -> Self {
        self.filters.data_fim = Some(date);
        self
    }

    pub fn search(mut self, term: SearchTerm) -> Self {
        self.filters.query = Some(term);
        self
    }

    pub fn paginate(mut self, page: PageNumber, per_page: PageSize) -> Self {
        self.pagination = Some(Pagination::new(page, per_page));
        self
    }
}

impl From<StudentFilters> for StudentListQuery {
    fn from(filters: StudentFilters) -> Self {
        Self {
            filters,
            pagination: None,
        }
    }
}

#[async_trait]
pub trait StudentReader: Send + Sync {
    /// Returns the total number of matching rows and the requested page,
    /// most recent purchase first.
    async fn list_students(
        &self,
        query: StudentListQuery,
    ) -> RepositoryResult<(usize, Vec<StudentRecord>)>;
    /// Every row projected to `discord_user_id` and `status_acesso`.
    async fn list_access_flags(&self) -> RepositoryResult<Vec<StudentRecord>>;
    /// Every row with a non-null `curso`, projected to that column.
    async fn list_courses(&self) -> RepositoryResult<Vec<StudentRecord>>;
}

#[async_trait]
pub trait StudentWriter: Send + Sync {
    async fn create_student(&self, new_student: &NewStudent) -> RepositoryResult<StudentRecord>;
}
