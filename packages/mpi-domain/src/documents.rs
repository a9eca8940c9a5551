use crate::predicate::Document;

pub mod field {
	pub const IDENTIFIER: &str = "identifier";
	pub const IDENTIFIER_TYPE_ID: &str = "identifierTypeId";
	pub const GIVEN_NAME: &str = "givenName";
	pub const MIDDLE_NAME: &str = "middleName";
	pub const FAMILY_NAME: &str = "familyName";
	pub const FAMILY_NAME2: &str = "familyName2";
	pub const VALUE: &str = "value";
	pub const ATTRIBUTE_TYPE_ID: &str = "attributeTypeId";
	pub const VOIDED: &str = "voided";
	pub const PATIENT_VOIDED: &str = "patientVoided";
	pub const PERSON_VOIDED: &str = "personVoided";
	/// False for bare person rows without a patient extension.
	pub const IS_PATIENT: &str = "isPatient";
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierDocument {
	pub patient_identifier_id: i64,
	pub patient_id: i64,
	pub identifier: String,
	pub identifier_type_id: i64,
	pub voided: bool,
	pub patient_voided: bool,
	pub is_patient: bool,
}
impl IdentifierDocument {
	pub fn owner(&self) -> i64 {
		self.patient_id
	}
}
impl Document for IdentifierDocument {
	fn id(&self) -> i64 {
		self.patient_identifier_id
	}

	fn text(&self, name: &str) -> Option<&str> {
		match name {
			field::IDENTIFIER => Some(self.identifier.as_str()),
			_ => None,
		}
	}

	fn flag(&self, name: &str) -> Option<bool> {
		match name {
			field::VOIDED => Some(self.voided),
			field::PATIENT_VOIDED => Some(self.patient_voided),
			field::IS_PATIENT => Some(self.is_patient),
			_ => None,
		}
	}

	fn number(&self, name: &str) -> Option<i64> {
		match name {
			field::IDENTIFIER_TYPE_ID => Some(self.identifier_type_id),
			_ => None,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameDocument {
	pub person_name_id: i64,
	pub person_id: i64,
	pub given_name: Option<String>,
	pub middle_name: Option<String>,
	pub family_name: Option<String>,
	pub family_name2: Option<String>,
	pub voided: bool,
	pub person_voided: bool,
	pub patient_voided: bool,
	pub is_patient: bool,
}
impl NameDocument {
	pub fn owner(&self) -> i64 {
		self.person_id
	}
}
impl Document for NameDocument {
	fn id(&self) -> i64 {
		self.person_name_id
	}

	fn text(&self, name: &str) -> Option<&str> {
		match name {
			field::GIVEN_NAME => self.given_name.as_deref(),
			field::MIDDLE_NAME => self.middle_name.as_deref(),
			field::FAMILY_NAME => self.family_name.as_deref(),
			field::FAMILY_NAME2 => self.family_name2.as_deref(),
			_ => None,
		}
	}

	fn flag(&self, name: &str) -> Option<bool> {
		match name {
			field::VOIDED => Some(self.voided),
			field::PERSON_VOIDED => Some(self.person_voided),
			field::PATIENT_VOIDED => Some(self.patient_voided),
			field::IS_PATIENT => Some(self.is_patient),
			_ => None,
		}
	}

	fn number(&self, _name: &str) -> Option<i64> {
		None
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDocument {
	pub person_attribute_id: i64,
	pub person_id: i64,
	pub attribute_type_id: i64,
	pub value: String,
	pub voided: bool,
	pub person_voided: bool,
	pub patient_voided: bool,
	pub is_patient: bool,
}
impl AttributeDocument {
	pub fn owner(&self) -> i64 {
		self.person_id
	}
}
impl Document for AttributeDocument {
	fn id(&self) -> i64 {
		self.person_attribute_id
	}

	fn text(&self, name: &str) -> Option<&str> {
		match name {
			field::VALUE => Some(self.value.as_str()),
			_ => None,
		}
	}

	fn flag(&self, name: &str) -> Option<bool> {
		match name {
			field::VOIDED => Some(self.voided),
			field::PERSON_VOIDED => Some(self.person_voided),
			field::PATIENT_VOIDED => Some(self.patient_voided),
			field::IS_PATIENT => Some(self.is_patient),
			_ => None,
		}
	}

	fn number(&self, name: &str) -> Option<i64> {
		match name {
			field::ATTRIBUTE_TYPE_ID => Some(self.attribute_type_id),
			_ => None,
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scored<D> {
	pub document: D,
	pub score: f32,
}

/// Relevance order: score descending, then document id ascending.
pub fn relevance_order<D>(a: &Scored<D>, b: &Scored<D>) -> std::cmp::Ordering
where
	D: Document,
{
	b.score.total_cmp(&a.score).then_with(|| a.document.id().cmp(&b.document.id()))
}
