#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordKind {
	Patient,
	Person,
	PersonName,
	PatientIdentifier,
}
impl RecordKind {
	/// The first kind declaring an attribute name wins.
	pub const RESOLUTION_ORDER: [Self; 4] =
		[Self::Patient, Self::Person, Self::PersonName, Self::PatientIdentifier];

	pub fn table(self) -> &'static str {
		match self {
			Self::Patient => "patient",
			Self::Person => "person",
			Self::PersonName => "person_name",
			Self::PatientIdentifier => "patient_identifier",
		}
	}

	/// Alias in the outer query that joins grouped values back to patients.
	pub fn outer_alias(self) -> &'static str {
		match self {
			Self::Patient => "t1",
			Self::Person => "t2",
			Self::PersonName => "t3",
			Self::PatientIdentifier => "t4",
		}
	}

	pub fn inner_alias(self) -> &'static str {
		match self {
			Self::Patient => "p1",
			Self::Person => "person1",
			Self::PersonName => "pn1",
			Self::PatientIdentifier => "pi1",
		}
	}

	/// Column referencing `patient.patient_id`; `None` for the patient table itself.
	pub fn owner_column(self) -> Option<&'static str> {
		match self {
			Self::Patient => None,
			Self::Person | Self::PersonName => Some("person_id"),
			Self::PatientIdentifier => Some("patient_id"),
		}
	}

	pub fn declared_fields(self) -> &'static [(&'static str, &'static str)] {
		match self {
			Self::Patient => PATIENT_FIELDS,
			Self::Person => PERSON_FIELDS,
			Self::PersonName => PERSON_NAME_FIELDS,
			Self::PatientIdentifier => PATIENT_IDENTIFIER_FIELDS,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedField {
	pub attribute: &'static str,
	pub kind: RecordKind,
	pub column: &'static str,
}

const PATIENT_FIELDS: &[(&str, &str)] =
	&[("patientId", "patient_id"), ("allergyStatus", "allergy_status")];
const PERSON_FIELDS: &[(&str, &str)] = &[
	("personId", "person_id"),
	("gender", "gender"),
	("birthdate", "birthdate"),
	("birthdateEstimated", "birthdate_estimated"),
	("dead", "dead"),
	("deathDate", "death_date"),
	("causeOfDeath", "cause_of_death"),
	("personVoided", "voided"),
];
const PERSON_NAME_FIELDS: &[(&str, &str)] = &[
	("personNameId", "person_name_id"),
	("preferred", "preferred"),
	("prefix", "prefix"),
	("givenName", "given_name"),
	("middleName", "middle_name"),
	("familyNamePrefix", "family_name_prefix"),
	("familyName", "family_name"),
	("familyName2", "family_name2"),
	("familyNameSuffix", "family_name_suffix"),
	("degree", "degree"),
];
const PATIENT_IDENTIFIER_FIELDS: &[(&str, &str)] = &[
	("patientIdentifierId", "patient_identifier_id"),
	("identifier", "identifier"),
	("identifierType", "identifier_type"),
	("location", "location_id"),
	("preferred", "preferred"),
];

pub fn resolve(attribute: &str, kind: RecordKind) -> Option<&'static str> {
	let attribute = attribute.trim();

	kind.declared_fields().iter().find(|(name, _)| *name == attribute).map(|(_, column)| *column)
}

pub fn locate(attribute: &str) -> Option<ResolvedField> {
	let attribute = attribute.trim();

	RecordKind::RESOLUTION_ORDER.into_iter().find_map(|kind| {
		kind.declared_fields()
			.iter()
			.find(|(name, _)| *name == attribute)
			.map(|(name, column)| ResolvedField { attribute: name, kind, column })
	})
}

#[cfg(test)]
mod tests {
	use super::{RecordKind, locate, resolve};

	#[test]
	fn resolves_physical_column_per_kind() {
		assert_eq!(resolve("givenName", RecordKind::PersonName), Some("given_name"));
		assert_eq!(resolve("givenName", RecordKind::Person), None);
		assert_eq!(resolve(" gender ", RecordKind::Person), Some("gender"));
	}

	#[test]
	fn earlier_kind_wins_on_shared_names() {
		let field = locate("preferred").expect("preferred should resolve");

		assert_eq!(field.kind, RecordKind::PersonName);
	}

	#[test]
	fn unknown_names_are_unresolved() {
		assert!(locate("shoeSize").is_none());
		assert!(locate("includeVoided").is_none());
	}

	#[test]
	fn identifier_location_maps_to_foreign_key() {
		let field = locate("location").expect("location should resolve");

		assert_eq!(field.kind, RecordKind::PatientIdentifier);
		assert_eq!(field.column, "location_id");
	}
}
