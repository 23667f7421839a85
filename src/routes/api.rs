use actix_web::{HttpResponse, Responder, web};

use crate::domain::student::NewStudent;
use crate::dto::students::StudentsQuery;
use crate::models::config::AppConfig;
use crate::repository::{StudentReader, StudentWriter};
use crate::routes::error_response;
use crate::services::ServiceError;
use crate::services::cache::QueryCache;
use crate::services::students as student_service;

/// Registers the `/api/v1` routes backed by repository `R`.
///
/// Expects `web::Data<R>`, `web::Data<QueryCache>` and `web::Data<AppConfig>`
/// to be registered on the application.
pub fn configure<R>(cfg: &mut web::ServiceConfig)
where
    R: StudentReader + StudentWriter + 'static,
{
    cfg.service(
        web::scope("/api/v1")
            .route("/students", web::get().to(list_students::<R>))
            .route("/students", web::post().to(create_student::<R>))
            .route("/students/summary", web::get().to(student_summary::<R>))
            .route("/courses", web::get().to(list_courses::<R>)),
    );
}

pub async fn list_students<R>(
    params: web::Query<StudentsQuery>,
    repo: web::Data<R>,
    cache: web::Data<QueryCache>,
    config: web::Data<AppConfig>,
) -> impl Responder
where
    R: StudentReader + 'static,
{
    let (filters, page, limit) = match params.into_inner().into_parts(config.default_page_size) {
        Ok(parts) => parts,
        Err(err) => return error_response(&ServiceError::from(err)),
    };

    match student_service::list_students(repo.get_ref(), &cache, filters, page, limit).await {
        Ok(result) => HttpResponse::Ok().json(result),
        Err(err) => error_response(&err),
    }
}

pub async fn student_summary<R>(
    repo: web::Data<R>,
    cache: web::Data<QueryCache>,
) -> impl Responder
where
    R: StudentReader + 'static,
{
    match student_service::student_summary(repo.get_ref(), &cache).await {
        Ok(summary) => HttpResponse::Ok().json(summary),
        Err(err) => error_response(&err),
    }
}

pub async fn list_courses<R>(repo: web::Data<R>, cache: web::Data<QueryCache>) -> impl Responder
where
    R: StudentReader + 'static,
{
    match student_service::list_courses(repo.get_ref(), &cache).await {
        Ok(courses) => HttpResponse::Ok().json(courses),
        Err(err) => error_response(&err),
    }
}

pub async fn create_student<R>(
    payload: web::Json<NewStudent>,
    repo: web::Data<R>,
    cache: web::Data<QueryCache>,
) -> impl Responder
where
    R: StudentWriter + 'static,
{
    match student_service::create_student(repo.get_ref(), &cache, &payload).await {
        Ok(created) => {
            log::info!("Created student record");
            HttpResponse::Created().json(created)
        }
        Err(err) => error_response(&err),
    }
}
