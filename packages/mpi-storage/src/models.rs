use time::{Date, OffsetDateTime};
use uuid::Uuid;

use mpi_domain::ordering::CollectionMember;

/// Patient row joined with the person row it extends.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct PatientRecord {
	pub patient_id: i64,
	pub uuid: Uuid,
	pub gender: Option<String>,
	pub birthdate: Option<Date>,
	pub birthdate_estimated: bool,
	pub dead: bool,
	pub death_date: Option<OffsetDateTime>,
	pub cause_of_death: Option<String>,
	pub allergy_status: String,
	pub creator: Option<i64>,
	pub date_created: OffsetDateTime,
	pub voided: bool,
	pub voided_by: Option<i64>,
	pub date_voided: Option<OffsetDateTime>,
	pub void_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct PatientIdentifier {
	pub patient_identifier_id: i64,
	pub uuid: Uuid,
	pub patient_id: i64,
	pub identifier: String,
	pub identifier_type: i64,
	pub location_id: Option<i64>,
	pub preferred: bool,
	pub date_created: OffsetDateTime,
	pub voided: bool,
}
impl CollectionMember for PatientIdentifier {
	fn member_id(&self) -> i64 {
		self.patient_identifier_id
	}

	fn voided(&self) -> bool {
		self.voided
	}

	fn preferred(&self) -> bool {
		self.preferred
	}

	fn date_created(&self) -> OffsetDateTime {
		self.date_created
	}
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct PersonName {
	pub person_name_id: i64,
	pub uuid: Uuid,
	pub person_id: i64,
	pub preferred: bool,
	pub prefix: Option<String>,
	pub given_name: Option<String>,
	pub middle_name: Option<String>,
	pub family_name_prefix: Option<String>,
	pub family_name: Option<String>,
	pub family_name2: Option<String>,
	pub family_name_suffix: Option<String>,
	pub degree: Option<String>,
	pub date_created: OffsetDateTime,
	pub voided: bool,
}
impl CollectionMember for PersonName {
	fn member_id(&self) -> i64 {
		self.person_name_id
	}

	fn voided(&self) -> bool {
		self.voided
	}

	fn preferred(&self) -> bool {
		self.preferred
	}

	fn date_created(&self) -> OffsetDateTime {
		self.date_created
	}
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct PersonAttribute {
	pub person_attribute_id: i64,
	pub uuid: Uuid,
	pub person_id: i64,
	pub person_attribute_type_id: i64,
	pub value: String,
	pub date_created: OffsetDateTime,
	pub voided: bool,
}
impl CollectionMember for PersonAttribute {
	fn member_id(&self) -> i64 {
		self.person_attribute_id
	}

	fn voided(&self) -> bool {
		self.voided
	}

	fn date_created(&self) -> OffsetDateTime {
		self.date_created
	}
}

/// A patient with its ordered identifier, name and attribute collections.
#[derive(Debug, Clone, PartialEq)]
pub struct Patient {
	pub record: PatientRecord,
	pub identifiers: Vec<PatientIdentifier>,
	pub names: Vec<PersonName>,
	pub attributes: Vec<PersonAttribute>,
}
impl Patient {
	pub fn patient_id(&self) -> i64 {
		self.record.patient_id
	}

	pub fn preferred_name(&self) -> Option<&PersonName> {
		self.names.iter().find(|name| !name.voided)
	}

	pub fn preferred_identifier(&self) -> Option<&PatientIdentifier> {
		self.identifiers.iter().find(|identifier| !identifier.voided)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniquenessBehavior {
	Unique,
	Location,
	NonUnique,
}
impl UniquenessBehavior {
	pub fn parse(raw: &str) -> Option<Self> {
		match raw {
			"UNIQUE" => Some(Self::Unique),
			"LOCATION" => Some(Self::Location),
			"NON_UNIQUE" => Some(Self::NonUnique),
			_ => None,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Unique => "UNIQUE",
			Self::Location => "LOCATION",
			Self::NonUnique => "NON_UNIQUE",
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct PatientIdentifierType {
	pub patient_identifier_type_id: i64,
	pub name: String,
	pub uniqueness_behavior: String,
	pub retired: bool,
}
impl PatientIdentifierType {
	pub fn uniqueness(&self) -> Option<UniquenessBehavior> {
		UniquenessBehavior::parse(&self.uniqueness_behavior)
	}
}

/// Columns supplied when registering a person.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewPerson {
	pub gender: Option<String>,
	pub birthdate: Option<Date>,
	pub creator: Option<i64>,
	pub voided: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewPersonName {
	pub person_id: i64,
	pub given_name: Option<String>,
	pub middle_name: Option<String>,
	pub family_name: Option<String>,
	pub family_name2: Option<String>,
	pub preferred: bool,
	pub voided: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewPatientIdentifier {
	pub patient_id: i64,
	pub identifier: String,
	pub identifier_type: i64,
	pub location_id: Option<i64>,
	pub preferred: bool,
	pub voided: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewPersonAttribute {
	pub person_id: i64,
	pub person_attribute_type_id: i64,
	pub value: String,
	pub voided: bool,
}
