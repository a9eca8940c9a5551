use std::collections::HashMap;

use mpi_domain::{
	documents::{AttributeDocument, IdentifierDocument, NameDocument},
	identifier::remove_padding,
	paging::Window,
};
use mpi_storage::models::Patient;

use crate::{
	MpiService, Result,
	federated::{self, IndexQuery, OwnerSource},
	predicate,
};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SearchRequest {
	pub query: String,
	#[serde(default)]
	pub include_voided: bool,
	pub start: Option<i64>,
	pub length: Option<i64>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CountRequest {
	pub query: String,
	#[serde(default)]
	pub include_voided: bool,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct IdentifierSearchRequest {
	pub query: String,
	pub identifier_type_ids: Vec<i64>,
	#[serde(default)]
	pub match_exactly: bool,
	pub start: Option<i64>,
	pub length: Option<i64>,
}

impl MpiService {
	/// Patients matching `query` on an identifier, a name or an attribute, merged in that order.
	pub async fn search(&self, req: &SearchRequest) -> Result<Vec<Patient>> {
		let Some(query) = self.admit(&req.query) else {
			return Ok(Vec::new());
		};
		let Some(window) = Window::resolve(req.start, req.length, self.settings.max_results) else {
			return Ok(Vec::new());
		};
		let identifiers = self.identifier_source(query, req.include_voided);
		let names = self.name_source(query, req.include_voided);
		let attributes = self.attribute_source(query, req.include_voided);
		let sources: [&dyn OwnerSource; 3] = [&identifiers, &names, &attributes];
		let owners = federated::merge_owners(&sources, window.end(), window.end()).await?;
		let ids = window.apply(owners);

		tracing::debug!(query, matched = ids.len(), "Federated patient search.");

		self.load_in_order(&ids).await
	}

	/// Distinct patients `search` would return without a window.
	pub async fn count(&self, req: &CountRequest) -> Result<u64> {
		let Some(query) = self.admit(&req.query) else {
			return Ok(0);
		};
		let identifiers = self.identifier_source(query, req.include_voided);
		let names = self.name_source(query, req.include_voided);
		let attributes = self.attribute_source(query, req.include_voided);

		let sources: [&dyn OwnerSource; 3] = [&identifiers, &names, &attributes];

		federated::count_owners(&sources).await
	}

	/// Identifier-only search restricted to the given identifier types.
	pub async fn search_by_identifier(&self, req: &IdentifierSearchRequest) -> Result<Vec<Patient>> {
		if req.identifier_type_ids.is_empty() {
			return Ok(Vec::new());
		}

		let Some(query) = self.admit(&req.query) else {
			return Ok(Vec::new());
		};
		let Some(window) = Window::resolve(req.start, req.length, self.settings.max_results) else {
			return Ok(Vec::new());
		};
		let identifiers = IndexQuery {
			name: "identifier",
			index: self.indexes.identifiers.as_ref(),
			predicate: predicate::identifier_type_predicate(
				query,
				&req.identifier_type_ids,
				req.match_exactly,
				&self.settings,
			),
			owner: IdentifierDocument::owner,
		};
		let sources: [&dyn OwnerSource; 1] = [&identifiers];
		let owners = federated::merge_owners(&sources, window.end(), window.end()).await?;

		self.load_in_order(&window.apply(owners)).await
	}

	/// Trimmed query when it is non-blank and long enough once padding is removed.
	fn admit<'q>(&self, raw: &'q str) -> Option<&'q str> {
		let query = raw.trim();

		if query.is_empty() {
			return None;
		}

		let stripped = remove_padding(query, self.settings.identifier_regex.as_deref());

		if stripped.chars().count() < self.settings.min_search_characters {
			tracing::debug!(
				query,
				min = self.settings.min_search_characters,
				"Query shorter than the minimum search length."
			);

			return None;
		}

		Some(query)
	}

	fn identifier_source<'a>(
		&'a self,
		query: &str,
		include_voided: bool,
	) -> IndexQuery<'a, IdentifierDocument> {
		IndexQuery {
			name: "identifier",
			index: self.indexes.identifiers.as_ref(),
			predicate: predicate::identifier_predicate(query, include_voided, false, &self.settings),
			owner: IdentifierDocument::owner,
		}
	}

	fn name_source<'a>(&'a self, query: &str, include_voided: bool) -> IndexQuery<'a, NameDocument> {
		IndexQuery {
			name: "name",
			index: self.indexes.names.as_ref(),
			predicate: predicate::name_predicate(query, include_voided, &self.settings),
			owner: NameDocument::owner,
		}
	}

	fn attribute_source<'a>(
		&'a self,
		query: &str,
		include_voided: bool,
	) -> IndexQuery<'a, AttributeDocument> {
		IndexQuery {
			name: "attribute",
			index: self.indexes.attributes.as_ref(),
			predicate: predicate::attribute_predicate(query, include_voided, &self.settings),
			owner: AttributeDocument::owner,
		}
	}

	/// Batch-loads patients and returns them in `ids` order, skipping ids that vanished.
	async fn load_in_order(&self, ids: &[i64]) -> Result<Vec<Patient>> {
		if ids.is_empty() {
			return Ok(Vec::new());
		}

		let mut by_id: HashMap<i64, Patient> = self
			.store
			.patients_by_ids(ids)
			.await?
			.into_iter()
			.map(|patient| (patient.patient_id(), patient))
			.collect();
		let mut patients = Vec::with_capacity(ids.len());

		for id in ids {
			match by_id.remove(id) {
				Some(patient) => patients.push(patient),
				None => tracing::warn!(patient_id = id, "Matched patient could not be loaded."),
			}
		}

		Ok(patients)
	}
}
