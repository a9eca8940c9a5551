//! Collaborator implementations over `mpi-storage`.

use mpi_domain::{documents::Scored, predicate::Predicate};
use mpi_storage::{
	db::Db,
	duplicates::{self, DuplicateQuery},
	index::{PgDocument, PgIndex},
	models::{NewPatientIdentifier, Patient},
	queries,
};

use crate::{BoxFuture, Error, PatientStore, Result, SearchIndex};

impl PatientStore for Db {
	fn patients_by_ids<'a>(&'a self, ids: &'a [i64]) -> BoxFuture<'a, Result<Vec<Patient>>> {
		Box::pin(async move {
			queries::patients_by_ids(self, ids)
				.await
				.map_err(|err| Error::storage("patients_by_ids", err))
		})
	}

	fn get_patient<'a>(&'a self, patient_id: i64) -> BoxFuture<'a, Result<Option<Patient>>> {
		Box::pin(async move {
			queries::get_patient(self, patient_id)
				.await
				.map_err(|err| Error::storage("get_patient", err))
		})
	}

	fn duplicate_patient_ids<'a>(
		&'a self,
		query: &'a DuplicateQuery,
	) -> BoxFuture<'a, Result<Vec<i64>>> {
		Box::pin(async move {
			duplicates::duplicate_patient_ids(&self.pool, query)
				.await
				.map_err(|err| Error::storage("duplicate_patient_ids", err))
		})
	}

	fn identifier_in_use<'a>(
		&'a self,
		identifier: &'a NewPatientIdentifier,
		exclude_patient: Option<i64>,
	) -> BoxFuture<'a, Result<bool>> {
		Box::pin(async move {
			queries::is_identifier_in_use_by_another_patient(self, identifier, exclude_patient)
				.await
				.map_err(|err| Error::storage("is_identifier_in_use_by_another_patient", err))
		})
	}
}

impl<D> SearchIndex<D> for PgIndex<D>
where
	D: PgDocument + Send + Sync + Unpin + 'static,
{
	fn search<'a>(
		&'a self,
		predicate: &'a Predicate,
		offset: usize,
		limit: usize,
	) -> BoxFuture<'a, Result<Vec<Scored<D>>>> {
		Box::pin(async move {
			PgIndex::search(self, predicate, offset, limit)
				.await
				.map_err(|err| Error::index(D::NAME, err))
		})
	}

	fn count<'a>(&'a self, predicate: &'a Predicate) -> BoxFuture<'a, Result<u64>> {
		Box::pin(async move {
			PgIndex::count(self, predicate).await.map_err(|err| Error::index(D::NAME, err))
		})
	}
}
