//! JSON shapes of materialized patients.

use time::{Date, OffsetDateTime};
use uuid::Uuid;

use mpi_storage::models::{Patient, PatientIdentifier, PersonAttribute, PersonName};

#[derive(Debug, Clone, serde::Serialize)]
pub struct PatientView {
	pub patient_id: i64,
	pub uuid: Uuid,
	pub gender: Option<String>,
	#[serde(serialize_with = "crate::time_serde::serialize_date")]
	pub birthdate: Option<Date>,
	pub birthdate_estimated: bool,
	pub dead: bool,
	pub allergy_status: String,
	pub voided: bool,
	#[serde(serialize_with = "crate::time_serde::serialize")]
	pub date_created: OffsetDateTime,
	#[serde(serialize_with = "crate::time_serde::serialize_option")]
	pub date_voided: Option<OffsetDateTime>,
	pub identifiers: Vec<IdentifierView>,
	pub names: Vec<NameView>,
	pub attributes: Vec<AttributeView>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct IdentifierView {
	pub patient_identifier_id: i64,
	pub identifier: String,
	pub identifier_type: i64,
	pub location_id: Option<i64>,
	pub preferred: bool,
	pub voided: bool,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct NameView {
	pub person_name_id: i64,
	pub given_name: Option<String>,
	pub middle_name: Option<String>,
	pub family_name: Option<String>,
	pub family_name2: Option<String>,
	pub preferred: bool,
	pub voided: bool,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct AttributeView {
	pub person_attribute_id: i64,
	pub attribute_type_id: i64,
	pub value: String,
	pub voided: bool,
}

impl From<&Patient> for PatientView {
	fn from(patient: &Patient) -> Self {
		let record = &patient.record;

		Self {
			patient_id: record.patient_id,
			uuid: record.uuid,
			gender: record.gender.clone(),
			birthdate: record.birthdate,
			birthdate_estimated: record.birthdate_estimated,
			dead: record.dead,
			allergy_status: record.allergy_status.clone(),
			voided: record.voided,
			date_created: record.date_created,
			date_voided: record.date_voided,
			identifiers: patient.identifiers.iter().map(IdentifierView::from).collect(),
			names: patient.names.iter().map(NameView::from).collect(),
			attributes: patient.attributes.iter().map(AttributeView::from).collect(),
		}
	}
}

impl From<&PatientIdentifier> for IdentifierView {
	fn from(identifier: &PatientIdentifier) -> Self {
		Self {
			patient_identifier_id: identifier.patient_identifier_id,
			identifier: identifier.identifier.clone(),
			identifier_type: identifier.identifier_type,
			location_id: identifier.location_id,
			preferred: identifier.preferred,
			voided: identifier.voided,
		}
	}
}

impl From<&PersonName> for NameView {
	fn from(name: &PersonName) -> Self {
		Self {
			person_name_id: name.person_name_id,
			given_name: name.given_name.clone(),
			middle_name: name.middle_name.clone(),
			family_name: name.family_name.clone(),
			family_name2: name.family_name2.clone(),
			preferred: name.preferred,
			voided: name.voided,
		}
	}
}

impl From<&PersonAttribute> for AttributeView {
	fn from(attribute: &PersonAttribute) -> Self {
		Self {
			person_attribute_id: attribute.person_attribute_id,
			attribute_type_id: attribute.person_attribute_type_id,
			value: attribute.value.clone(),
			voided: attribute.voided,
		}
	}
}
