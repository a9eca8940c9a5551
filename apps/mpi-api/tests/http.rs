use std::{collections::HashMap, sync::Arc};

use axum::{
	body::{self, Body},
	http::{Request, StatusCode},
};
use time::OffsetDateTime;
use tower::util::ServiceExt;
use uuid::Uuid;

use mpi_api::{routes, state::AppState};
use mpi_domain::{
	documents::{AttributeDocument, IdentifierDocument, NameDocument},
	settings::SearchSettings,
};
use mpi_service::{BoxFuture, Indexes, MpiService, PatientStore, Result, memory::MemoryIndex};
use mpi_storage::{
	duplicates::DuplicateQuery,
	models::{NewPatientIdentifier, Patient, PatientIdentifier, PatientRecord},
};

struct FixedStore {
	patients: HashMap<i64, Patient>,
	duplicate_ids: Vec<i64>,
}
impl PatientStore for FixedStore {
	fn patients_by_ids<'a>(&'a self, ids: &'a [i64]) -> BoxFuture<'a, Result<Vec<Patient>>> {
		let found: Vec<Patient> =
			ids.iter().filter_map(|id| self.patients.get(id).cloned()).collect();

		Box::pin(async move { Ok(found) })
	}

	fn get_patient<'a>(&'a self, patient_id: i64) -> BoxFuture<'a, Result<Option<Patient>>> {
		let found = self.patients.get(&patient_id).cloned();

		Box::pin(async move { Ok(found) })
	}

	fn duplicate_patient_ids<'a>(
		&'a self,
		_query: &'a DuplicateQuery,
	) -> BoxFuture<'a, Result<Vec<i64>>> {
		let ids = self.duplicate_ids.clone();

		Box::pin(async move { Ok(ids) })
	}

	fn identifier_in_use<'a>(
		&'a self,
		identifier: &'a NewPatientIdentifier,
		exclude_patient: Option<i64>,
	) -> BoxFuture<'a, Result<bool>> {
		let in_use = self.patients.values().any(|patient| {
			Some(patient.patient_id()) != exclude_patient
				&& patient.identifiers.iter().any(|held| {
					held.identifier == identifier.identifier
						&& held.identifier_type == identifier.identifier_type
				})
		});

		Box::pin(async move { Ok(in_use) })
	}
}

fn patient(patient_id: i64, identifier: &str) -> Patient {
	let created = OffsetDateTime::from_unix_timestamp(1_700_000_000).expect("Valid timestamp.");

	Patient {
		record: PatientRecord {
			patient_id,
			uuid: Uuid::new_v4(),
			gender: None,
			birthdate: None,
			birthdate_estimated: false,
			dead: false,
			death_date: None,
			cause_of_death: None,
			allergy_status: "Unknown".to_string(),
			creator: None,
			date_created: created,
			voided: false,
			voided_by: None,
			date_voided: None,
			void_reason: None,
		},
		identifiers: vec![PatientIdentifier {
			patient_identifier_id: patient_id,
			uuid: Uuid::new_v4(),
			patient_id,
			identifier: identifier.to_string(),
			identifier_type: 1,
			location_id: None,
			preferred: true,
			date_created: created,
			voided: false,
		}],
		names: Vec::new(),
		attributes: Vec::new(),
	}
}

fn app() -> axum::Router {
	let documents: Vec<IdentifierDocument> = [(1, "MRN-001"), (2, "MRN-002"), (3, "OTHER-9")]
		.into_iter()
		.map(|(id, identifier)| IdentifierDocument {
			patient_identifier_id: id,
			patient_id: id,
			identifier: identifier.to_string(),
			identifier_type_id: 1,
			voided: false,
			patient_voided: false,
			is_patient: true,
		})
		.collect();
	let store = FixedStore {
		patients: [(1, "MRN-001"), (2, "MRN-002"), (3, "OTHER-9")]
			.into_iter()
			.map(|(id, identifier)| (id, patient(id, identifier)))
			.collect(),
		duplicate_ids: vec![2, 1],
	};
	let indexes = Indexes {
		identifiers: Arc::new(MemoryIndex::new(documents)),
		names: Arc::new(MemoryIndex::<NameDocument>::default()),
		attributes: Arc::new(MemoryIndex::<AttributeDocument>::default()),
	};
	let service = MpiService::new(SearchSettings::default(), Arc::new(store), indexes);

	routes::router(AppState::from_service(service))
}

async fn call(request: Request<Body>) -> (StatusCode, serde_json::Value) {
	let response = app().oneshot(request).await.expect("Failed to call router.");
	let status = response.status();
	let body = body::to_bytes(response.into_body(), usize::MAX)
		.await
		.expect("Failed to read response body.");
	let json = if body.is_empty() {
		serde_json::Value::Null
	} else {
		serde_json::from_slice(&body).expect("Failed to parse response.")
	};

	(status, json)
}

fn post(uri: &str, payload: serde_json::Value) -> Request<Body> {
	Request::builder()
		.method("POST")
		.uri(uri)
		.header("content-type", "application/json")
		.body(Body::from(payload.to_string()))
		.expect("Failed to build request.")
}

#[tokio::test]
async fn health_ok() {
	let (status, _) = call(
		Request::builder().uri("/health").body(Body::empty()).expect("Failed to build request."),
	)
	.await;

	assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn search_returns_patients_in_rank_order() {
	let (status, json) =
		call(post("/v1/patients/search", serde_json::json!({ "query": "mrn-002" }))).await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(json["patients"][0]["patient_id"], 2);
	assert_eq!(json["patients"].as_array().map(Vec::len), Some(1));

	let (_, json) = call(post(
		"/v1/patients/search",
		serde_json::json!({ "query": "MRN", "start": 1, "length": 5 }),
	))
	.await;

	assert_eq!(json["patients"][0]["patient_id"], 2);
	assert_eq!(json["patients"][0]["identifiers"][0]["identifier"], "MRN-002");
}

#[tokio::test]
async fn count_ignores_short_queries() {
	let (_, json) = call(post("/v1/patients/count", serde_json::json!({ "query": "MRN" }))).await;

	assert_eq!(json["count"], 2);

	let (_, json) = call(post("/v1/patients/count", serde_json::json!({ "query": "MR" }))).await;

	assert_eq!(json["count"], 0);
}

#[tokio::test]
async fn duplicates_report_unresolved_names() {
	let (status, json) = call(post(
		"/v1/patients/duplicates",
		serde_json::json!({ "attributes": ["gender", "favouriteColour"] }),
	))
	.await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(json["patients"][0]["patient_id"], 2);
	assert_eq!(json["patients"][1]["patient_id"], 1);
	assert_eq!(json["unresolved"][0], "favouriteColour");
}

#[tokio::test]
async fn missing_patient_is_not_found() {
	let (status, json) = call(
		Request::builder()
			.uri("/v1/patients/404")
			.body(Body::empty())
			.expect("Failed to build request."),
	)
	.await;

	assert_eq!(status, StatusCode::NOT_FOUND);
	assert_eq!(json["error_code"], "NOT_FOUND");
}

#[tokio::test]
async fn identifier_in_use_excludes_own_patient() {
	let (_, json) = call(post(
		"/v1/identifiers/in_use",
		serde_json::json!({ "identifier": "MRN-001", "identifier_type": 1, "patient_id": 2 }),
	))
	.await;

	assert_eq!(json["in_use"], true);

	let (_, json) = call(post(
		"/v1/identifiers/in_use",
		serde_json::json!({ "identifier": "MRN-001", "identifier_type": 1, "patient_id": 1 }),
	))
	.await;

	assert_eq!(json["in_use"], false);

	let (status, json) = call(post(
		"/v1/identifiers/in_use",
		serde_json::json!({ "identifier": "  ", "identifier_type": 1 }),
	))
	.await;

	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(json["error_code"], "INVALID_REQUEST");
}
