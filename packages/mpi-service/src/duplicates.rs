use std::collections::HashMap;

use mpi_storage::{duplicates::DuplicateQuery, models::Patient};

use crate::{Error, MpiService, Result};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct DuplicateRequest {
	/// Attribute names from any of the patient, person, name and identifier records, plus the
	/// optional `includeVoided` flag.
	pub attributes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DuplicateReport {
	/// Patients in duplicate-group order.
	pub patients: Vec<Patient>,
	/// Requested names no record kind declares.
	pub unresolved: Vec<String>,
}

impl MpiService {
	pub async fn find_duplicates(&self, req: &DuplicateRequest) -> Result<DuplicateReport> {
		if req.attributes.is_empty() {
			return Ok(DuplicateReport::default());
		}

		let query = DuplicateQuery::plan(req.attributes.as_slice());

		if query.fields.is_empty() {
			return Ok(DuplicateReport { patients: Vec::new(), unresolved: query.unresolved });
		}

		let ids = self.store.duplicate_patient_ids(&query).await?;

		tracing::debug!(
			fields = query.fields.len(),
			include_voided = query.include_voided,
			patients = ids.len(),
			"Duplicate-group query finished."
		);

		let fetched = self.store.patients_by_ids(&ids).await?;
		let patients = reorder_strict(&ids, fetched)?;

		Ok(DuplicateReport { patients, unresolved: query.unresolved })
	}
}

/// Orders `patients` by `ids`; any id without a patient, or patient without an id, is an error.
pub fn reorder_strict(ids: &[i64], patients: Vec<Patient>) -> Result<Vec<Patient>> {
	let mut by_id: HashMap<i64, Patient> =
		patients.into_iter().map(|patient| (patient.patient_id(), patient)).collect();
	let mut ordered = Vec::with_capacity(ids.len());
	let mut missing = Vec::new();

	for id in ids {
		match by_id.remove(id) {
			Some(patient) => ordered.push(patient),
			None => missing.push(*id),
		}
	}

	if !missing.is_empty() {
		return Err(Error::Integrity {
			message: format!("Duplicate-group patients {missing:?} could not be loaded."),
		});
	}
	if !by_id.is_empty() {
		let mut extra: Vec<i64> = by_id.into_keys().collect();

		extra.sort_unstable();

		return Err(Error::Integrity {
			message: format!("Loaded patients {extra:?} are not part of any duplicate group."),
		});
	}

	Ok(ordered)
}
