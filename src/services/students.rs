use std::collections::HashSet;

use crate::domain::ACTIVE_ACCESS_STATUS;
use crate::domain::student::{NewStudent, StudentFilters, StudentPage, StudentRecord, StudentSummary};
use crate::domain::types::{PageNumber, PageSize};
use crate::repository::{StudentListQuery, StudentReader, StudentWriter};
use crate::services::cache::{QueryCache, QueryKey, STUDENTS_NAMESPACE};
use crate::services::{ServiceError, ServiceResult};

/// Returns one page of students matching `filters`, most recent purchase
/// first.
pub async fn list_students<R>(
    repo: &R,
    cache: &QueryCache,
    filters: StudentFilters,
    page: PageNumber,
    limit: PageSize,
) -> ServiceResult<StudentPage>
where
    R: StudentReader + ?Sized,
{
    let key = QueryKey::Students {
        filters: filters.clone(),
        page,
        limit,
    };
    if let Some(cached) = cache.get::<StudentPage>(&key) {
        return Ok(cached);
    }

    let query = StudentListQuery::from(filters).paginate(page, limit);
    let (count, data) = repo.list_students(query).await.map_err(|err| {
        log::error!("Error fetching students: {err}");
        ServiceError::from(err)
    })?;

    let result = StudentPage::new(data, count, limit);
    cache.insert(key, result.clone());
    Ok(result)
}

/// Counts students with a linked Discord account and with active access.
pub async fn student_summary<R>(repo: &R, cache: &QueryCache) -> ServiceResult<StudentSummary>
where
    R: StudentReader + ?Sized,
{
    if let Some(cached) = cache.get::<StudentSummary>(&QueryKey::Stats) {
        return Ok(cached);
    }

    let rows = repo.list_access_flags().await?;
    let summary = summarize(&rows);

    cache.insert(QueryKey::Stats, summary);
    Ok(summary)
}

/// Lists every distinct non-empty course name in first-seen order.
pub async fn list_courses<R>(repo: &R, cache: &QueryCache) -> ServiceResult<Vec<String>>
where
    R: StudentReader + ?Sized,
{
    if let Some(cached) = cache.get::<Vec<String>>(&QueryKey::Courses) {
        return Ok(cached);
    }

    let rows = repo.list_courses().await?;
    let courses = distinct_courses(&rows);

    cache.insert(QueryKey::Courses, courses.clone());
    Ok(courses)
}

/// Inserts a student and marks cached student lists as stale.
pub async fn create_student<R>(
    repo: &R,
    cache: &QueryCache,
    new_student: &NewStudent,
) -> ServiceResult<StudentRecord>
where
    R: StudentWriter + ?Sized,
{
    let created = repo.create_student(new_student).await?;

    let dropped = cache.invalidate(STUDENTS_NAMESPACE);
    log::debug!("Invalidated {dropped} cached student lists");

    Ok(created)
}

fn summarize(rows: &[StudentRecord]) -> StudentSummary {
    StudentSummary {
        discord_count: rows.iter().filter(|row| row.has_discord()).count(),
        ativas_count: rows
            .iter()
            .filter(|row| row.status_acesso() == Some(ACTIVE_ACCESS_STATUS))
            .count(),
    }
}

fn distinct_courses(rows: &[StudentRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    rows.iter()
        .filter_map(StudentRecord::curso)
        .filter(|curso| !curso.is_empty())
        .filter(|curso| seen.insert(*curso))
        .map(str::to_string)
        .collect()
}
