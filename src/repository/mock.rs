//! Mock repository implementations for isolating services in tests.

use async_trait::async_trait;
use mockall::mock;

use crate::domain::student::{NewStudent, StudentRecord};
use crate::repository::errors::RepositoryResult;
use crate::repository::{StudentListQuery, StudentReader, StudentWriter};

mock! {
    pub Repository {}

    #[async_trait]
    impl StudentReader for Repository {
        async fn list_students(
            &self,
            query: StudentListQuery,
        ) -> RepositoryResult<(usize, Vec<StudentRecord>)>;
        async fn list_access_flags(&self) -> RepositoryResult<Vec<StudentRecord>>;
        async fn list_courses(&self) -> RepositoryResult<Vec<StudentRecord>>;
    }

    #[async_trait]
    impl StudentWriter for Repository {
        async fn create_student(&self, new_student: &NewStudent) -> RepositoryResult<StudentRecord>;
    }
}
