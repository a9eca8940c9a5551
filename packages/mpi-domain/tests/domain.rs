use mpi_domain::{
	documents::{IdentifierDocument, NameDocument, field},
	identifier::{self, join_tokens},
	predicate::{Predicate, TextMode},
	settings::{MatchMode, SearchSettings},
};

fn identifier_doc(id: i64, identifier: &str) -> IdentifierDocument {
	IdentifierDocument {
		patient_identifier_id: id,
		patient_id: id * 10,
		identifier: identifier.to_string(),
		identifier_type_id: 1,
		voided: false,
		patient_voided: false,
		is_patient: true,
	}
}

#[test]
fn normalized_tokens_drive_identifier_matching() {
	let settings = SearchSettings {
		identifier_regex: Some("^0*[1-9][0-9]*$".to_string()),
		identifier_search_pattern: Some("@SEARCH@,@SEARCH-1@-@CHECKDIGIT@".to_string()),
		..SearchSettings::default()
	};
	let tokens = identifier::normalize("0001234", &settings);
	let query = join_tokens(&tokens);
	let predicate = Predicate::any_text(field::IDENTIFIER, TextMode::Exact, &query, 4.0);

	assert_eq!(tokens, vec!["1234".to_string(), "123-4".to_string()]);
	assert!(predicate.matches(&identifier_doc(1, "123-4")));
	assert!(predicate.matches(&identifier_doc(2, "1234")));
	assert!(!predicate.matches(&identifier_doc(3, "0001234")));
}

#[test]
fn name_document_exposes_only_present_parts() {
	let doc = NameDocument {
		person_name_id: 7,
		person_id: 3,
		given_name: Some("Amara".to_string()),
		middle_name: None,
		family_name: Some("Okafor".to_string()),
		family_name2: None,
		voided: false,
		person_voided: false,
		patient_voided: false,
		is_patient: false,
	};
	let predicate = Predicate::bool()
		.minimum_should_match(1)
		.should(Predicate::text(field::MIDDLE_NAME, TextMode::Start, "oka", 4.0))
		.should(Predicate::text(field::FAMILY_NAME, TextMode::Start, "oka", 4.0))
		.filter(Predicate::flag(field::IS_PATIENT, true))
		.build();

	assert_eq!(doc.owner(), 3);
	assert!(!predicate.matches(&doc));
	assert!(predicate.matches(&NameDocument { is_patient: true, ..doc }));
}

#[test]
fn match_mode_serializes_as_snake_case() {
	let json = serde_json::to_string(&MatchMode::Anywhere).expect("Failed to serialize mode.");

	assert_eq!(json, "\"anywhere\"");
}
