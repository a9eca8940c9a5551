use axum::{
	Json, Router,
	extract::{Path, State},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::{Deserialize, Serialize};

use crate::state::AppState;
use mpi_service::{
	CountRequest, DuplicateRequest, Error as ServiceError, IdentifierSearchRequest, SearchRequest,
	views::PatientView,
};
use mpi_storage::models::{NewPatientIdentifier, Patient};

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/patients/search", post(search))
		.route("/v1/patients/count", post(count))
		.route("/v1/patients/search_by_identifier", post(search_by_identifier))
		.route("/v1/patients/duplicates", post(duplicates))
		.route("/v1/patients/{patient_id}", get(get_patient))
		.route("/v1/identifiers/in_use", post(identifier_in_use))
		.with_state(state)
}

#[derive(Debug, Serialize)]
pub struct PatientsResponse {
	pub patients: Vec<PatientView>,
}

#[derive(Debug, Serialize)]
pub struct CountResponse {
	pub count: u64,
}

#[derive(Debug, Serialize)]
pub struct DuplicatesResponse {
	pub patients: Vec<PatientView>,
	pub unresolved: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct IdentifierInUseRequest {
	pub identifier: String,
	pub identifier_type: i64,
	pub location_id: Option<i64>,
	pub patient_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct IdentifierInUseResponse {
	pub in_use: bool,
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn search(
	State(state): State<AppState>,
	Json(payload): Json<SearchRequest>,
) -> Result<Json<PatientsResponse>, ApiError> {
	let patients = state.service.search(&payload).await?;

	Ok(Json(PatientsResponse { patients: views(&patients) }))
}

async fn count(
	State(state): State<AppState>,
	Json(payload): Json<CountRequest>,
) -> Result<Json<CountResponse>, ApiError> {
	let count = state.service.count(&payload).await?;

	Ok(Json(CountResponse { count }))
}

async fn search_by_identifier(
	State(state): State<AppState>,
	Json(payload): Json<IdentifierSearchRequest>,
) -> Result<Json<PatientsResponse>, ApiError> {
	let patients = state.service.search_by_identifier(&payload).await?;

	Ok(Json(PatientsResponse { patients: views(&patients) }))
}

async fn duplicates(
	State(state): State<AppState>,
	Json(payload): Json<DuplicateRequest>,
) -> Result<Json<DuplicatesResponse>, ApiError> {
	let report = state.service.find_duplicates(&payload).await?;

	Ok(Json(DuplicatesResponse { patients: views(&report.patients), unresolved: report.unresolved }))
}

async fn get_patient(
	State(state): State<AppState>,
	Path(patient_id): Path<i64>,
) -> Result<Json<PatientView>, ApiError> {
	let patient = state.service.get_patient(patient_id).await?;

	Ok(Json(PatientView::from(&patient)))
}

async fn identifier_in_use(
	State(state): State<AppState>,
	Json(payload): Json<IdentifierInUseRequest>,
) -> Result<Json<IdentifierInUseResponse>, ApiError> {
	let candidate = NewPatientIdentifier {
		patient_id: payload.patient_id.unwrap_or_default(),
		identifier: payload.identifier,
		identifier_type: payload.identifier_type,
		location_id: payload.location_id,
		preferred: false,
		voided: false,
	};
	let in_use =
		state.service.is_identifier_in_use_by_another_patient(&candidate, payload.patient_id).await?;

	Ok(Json(IdentifierInUseResponse { in_use }))
}

fn views(patients: &[Patient]) -> Vec<PatientView> {
	patients.iter().map(PatientView::from).collect()
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
}
impl ApiError {
	fn new(status: StatusCode, error_code: impl Into<String>, message: impl Into<String>) -> Self {
		Self { status, error_code: error_code.into(), message: message.into() }
	}
}

impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		match err {
			ServiceError::InvalidRequest { message } =>
				ApiError::new(StatusCode::BAD_REQUEST, "INVALID_REQUEST", message),
			ServiceError::NotFound { message } =>
				ApiError::new(StatusCode::NOT_FOUND, "NOT_FOUND", message),
			err @ ServiceError::Storage { .. } => {
				tracing::error!(error = %err, "Storage failure.");

				ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR", err.to_string())
			},
			err @ ServiceError::Index { .. } => {
				tracing::error!(error = %err, "Index failure.");

				ApiError::new(StatusCode::BAD_GATEWAY, "INDEX_ERROR", err.to_string())
			},
			err @ ServiceError::Integrity { .. } => {
				tracing::error!(error = %err, "Integrity failure.");

				ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "INTEGRITY_ERROR", err.to_string())
			},
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}
