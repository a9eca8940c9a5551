pub mod duplicates;
pub mod federated;
pub mod memory;
pub mod postgres;
pub mod predicate;
pub mod search;
pub mod time_serde;
pub mod views;

mod error;

pub use duplicates::{DuplicateReport, DuplicateRequest};
pub use error::{Error, Result};
pub use search::{CountRequest, IdentifierSearchRequest, SearchRequest};

use std::{future::Future, pin::Pin, sync::Arc};

use mpi_domain::{
	documents::{AttributeDocument, IdentifierDocument, NameDocument, Scored},
	predicate::Predicate,
	settings::SearchSettings,
};
use mpi_storage::{
	db::Db,
	duplicates::DuplicateQuery,
	index::PgIndex,
	models::{NewPatientIdentifier, Patient},
};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A searchable collection of documents of one kind.
pub trait SearchIndex<D>
where
	Self: Send + Sync,
{
	/// Matching documents in relevance order: score descending, then document id ascending.
	fn search<'a>(
		&'a self,
		predicate: &'a Predicate,
		offset: usize,
		limit: usize,
	) -> BoxFuture<'a, Result<Vec<Scored<D>>>>;

	fn count<'a>(&'a self, predicate: &'a Predicate) -> BoxFuture<'a, Result<u64>>;
}

/// Relational access to materialized patients.
pub trait PatientStore
where
	Self: Send + Sync,
{
	/// Patients for `ids` in any order; unknown ids are skipped.
	fn patients_by_ids<'a>(&'a self, ids: &'a [i64]) -> BoxFuture<'a, Result<Vec<Patient>>>;

	fn get_patient<'a>(&'a self, patient_id: i64) -> BoxFuture<'a, Result<Option<Patient>>>;

	fn duplicate_patient_ids<'a>(
		&'a self,
		query: &'a DuplicateQuery,
	) -> BoxFuture<'a, Result<Vec<i64>>>;

	fn identifier_in_use<'a>(
		&'a self,
		identifier: &'a NewPatientIdentifier,
		exclude_patient: Option<i64>,
	) -> BoxFuture<'a, Result<bool>>;
}

#[derive(Clone)]
pub struct Indexes {
	pub identifiers: Arc<dyn SearchIndex<IdentifierDocument>>,
	pub names: Arc<dyn SearchIndex<NameDocument>>,
	pub attributes: Arc<dyn SearchIndex<AttributeDocument>>,
}
impl Indexes {
	pub fn postgres(db: &Db) -> Self {
		Self {
			identifiers: Arc::new(PgIndex::<IdentifierDocument>::new(db.pool.clone())),
			names: Arc::new(PgIndex::<NameDocument>::new(db.pool.clone())),
			attributes: Arc::new(PgIndex::<AttributeDocument>::new(db.pool.clone())),
		}
	}
}

pub struct MpiService {
	pub settings: SearchSettings,
	pub store: Arc<dyn PatientStore>,
	pub indexes: Indexes,
}
impl MpiService {
	pub fn new(settings: SearchSettings, store: Arc<dyn PatientStore>, indexes: Indexes) -> Self {
		Self { settings, store, indexes }
	}

	/// Service backed entirely by PostgreSQL.
	pub fn postgres(settings: SearchSettings, db: Db) -> Self {
		let indexes = Indexes::postgres(&db);

		Self { settings, store: Arc::new(db), indexes }
	}

	pub async fn get_patient(&self, patient_id: i64) -> Result<Patient> {
		self.store
			.get_patient(patient_id)
			.await?
			.ok_or_else(|| Error::NotFound { message: format!("patient {patient_id}") })
	}

	/// Whether `identifier` collides with a live identifier of another patient.
	pub async fn is_identifier_in_use_by_another_patient(
		&self,
		identifier: &NewPatientIdentifier,
		exclude_patient: Option<i64>,
	) -> Result<bool> {
		if identifier.identifier.trim().is_empty() {
			return Err(Error::InvalidRequest {
				message: "identifier must be non-empty.".to_string(),
			});
		}

		self.store.identifier_in_use(identifier, exclude_patient).await
	}
}
