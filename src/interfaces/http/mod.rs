use std::sync::Arc;

use actix_cors::Cors;
use actix_multipart::form::{bytes::Bytes as UploadBytes, MultipartForm, MultipartFormConfig};
use actix_web::{
    dev::Server, error::InternalError, get, http::StatusCode, middleware::Logger, post, web, App,
    HttpResponse, HttpServer,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::Validate;

use crate::application::use_cases::curriculum_import::{
    builtin_test_sheet, CurriculumImportUseCase, UploadedFile,
};
use crate::application::use_cases::curriculum_query::{CurriculumQueryUseCase, SearchParams};
use crate::domain::error::AppError;
use crate::domain::import_policy::ImportPolicy;
use crate::domain::sheet::{Cell, SheetTable};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::store::CurriculumStore;

const DEFAULT_SEARCH_LIMIT: usize = 50;

pub struct HttpState {
    pub import_use_case: CurriculumImportUseCase,
    pub query_use_case: CurriculumQueryUseCase,
    pub diagnostic_row_limit: usize,
}

impl HttpState {
    pub fn new(store: Arc<dyn CurriculumStore>, config: &AppConfig) -> Self {
        Self {
            import_use_case: CurriculumImportUseCase::new(store.clone()),
            query_use_case: CurriculumQueryUseCase::new(store),
            diagnostic_row_limit: config.diagnostic_row_limit,
        }
    }
}

#[derive(MultipartForm)]
pub struct UploadForm {
    file: UploadBytes,
}

impl From<UploadForm> for UploadedFile {
    fn from(form: UploadForm) -> Self {
        UploadedFile {
            file_name: form.file.file_name,
            content_type: form.file.content_type.map(|mime| mime.to_string()),
            bytes: form.file.data.to_vec(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ImportQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct TestRowsRequest {
    pub headers: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<serde_json::Value>>,
}

impl TestRowsRequest {
    fn into_table(self) -> Result<SheetTable, AppError> {
        let mut raw: Vec<Vec<Cell>> = Vec::with_capacity(self.rows.len() + 1);
        raw.push(self.headers.iter().map(|h| Cell::from(h.as_str())).collect());
        raw.extend(
            self.rows
                .into_iter()
                .map(|row| row.into_iter().map(Cell::from).collect()),
        );
        SheetTable::from_rows("request", raw).ok_or_else(|| {
            AppError::ValidationError("rows must contain at least one data row".to_string())
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub learning_area_id: Option<String>,
    pub year_level: Option<String>,
    #[validate(range(min = 1, max = 500))]
    pub limit: Option<usize>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    success: bool,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<&'a str>,
}

fn status_for(err: &AppError) -> StatusCode {
    match err {
        AppError::ParseError(_) | AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
        AppError::PersistenceError { .. } => StatusCode::BAD_GATEWAY,
        AppError::Internal(_) | AppError::ConfigurationError(_) | AppError::IoError(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

pub fn error_response(err: &AppError) -> HttpResponse {
    let (error, details, hint) = match err {
        AppError::PersistenceError {
            message,
            details,
            hint,
            ..
        } => (message.clone(), details.as_deref(), hint.as_deref()),
        other => (other.to_string(), None, None),
    };

    HttpResponse::build(status_for(err)).json(ErrorBody {
        success: false,
        error,
        code: err.code(),
        details,
        hint,
    })
}

fn respond<T: Serialize>(result: Result<T, AppError>, action: &str) -> HttpResponse {
    match result {
        Ok(body) => HttpResponse::Ok().json(body),
        Err(e) => {
            warn!(action, code = e.code().unwrap_or("-"), error = %e, "Request failed");
            error_response(&e)
        }
    }
}

#[post("/import")]
async fn import_upload(
    data: web::Data<HttpState>,
    query: web::Query<ImportQuery>,
    MultipartForm(form): MultipartForm<UploadForm>,
) -> HttpResponse {
    let policy = match query.limit {
        Some(limit) => ImportPolicy::sample(limit),
        None => ImportPolicy::full(),
    };
    let result = data.import_use_case.import_file(form.into(), &policy).await;
    respond(result, "import")
}

#[post("/debug")]
async fn debug_upload(
    data: web::Data<HttpState>,
    MultipartForm(form): MultipartForm<UploadForm>,
) -> HttpResponse {
    let policy = ImportPolicy::diagnostic(data.diagnostic_row_limit);
    let result = data.import_use_case.import_file(form.into(), &policy).await;
    respond(result, "debug")
}

/// Diagnostic insert of caller-supplied rows, or of a built-in row when the
/// body is empty.
#[post("/test")]
async fn test_rows(data: web::Data<HttpState>, body: web::Bytes) -> HttpResponse {
    let table = if body.iter().all(u8::is_ascii_whitespace) {
        Ok(builtin_test_sheet())
    } else {
        serde_json::from_slice::<TestRowsRequest>(&body)
            .map_err(|e| AppError::ValidationError(format!("Invalid request body: {}", e)))
            .and_then(TestRowsRequest::into_table)
    };

    let table = match table {
        Ok(table) => table,
        Err(e) => return error_response(&e),
    };

    let policy = ImportPolicy::diagnostic(data.diagnostic_row_limit);
    let result = data.import_use_case.import_rows(table, &policy).await;
    respond(result, "test")
}

#[get("/validate")]
async fn validate_connection(data: web::Data<HttpState>) -> HttpResponse {
    respond(data.query_use_case.validate_connection().await, "validate")
}

#[get("/stats")]
async fn stats(data: web::Data<HttpState>) -> HttpResponse {
    respond(data.query_use_case.stats().await, "stats")
}

#[get("/search")]
async fn search(data: web::Data<HttpState>, query: web::Query<SearchQuery>) -> HttpResponse {
    let query = query.into_inner();
    if let Err(e) = query.validate() {
        return error_response(&AppError::ValidationError(e.to_string()));
    }

    let params = SearchParams {
        learning_area_id: query.learning_area_id,
        year_level: query.year_level,
        limit: query.limit.unwrap_or(DEFAULT_SEARCH_LIMIT),
    };
    respond(data.query_use_case.search(params).await, "search")
}

#[get("/health")]
async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Upload limits, with multipart failures reported in the usual error shape.
pub fn multipart_config(max_upload_bytes: usize) -> MultipartFormConfig {
    MultipartFormConfig::default()
        .total_limit(max_upload_bytes)
        .memory_limit(max_upload_bytes)
        .error_handler(|err, _req| {
            let response = error_response(&AppError::ValidationError(err.to_string()));
            InternalError::from_response(err, response).into()
        })
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(health)
            .service(
                web::scope("/curriculum")
                    .service(import_upload)
                    .service(debug_upload)
                    .service(test_rows)
                    .service(validate_connection)
                    .service(stats)
                    .service(search),
            ),
    );
}

pub fn start_server(state: HttpState, config: &AppConfig) -> std::io::Result<Server> {
    let state = web::Data::new(state);
    let max_upload_bytes = config.max_upload_bytes();

    info!(host = %config.host, port = config.port, "Starting HTTP server");

    let server = HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(state.clone())
            .app_data(multipart_config(max_upload_bytes))
            .configure(configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run();

    Ok(server)
}
