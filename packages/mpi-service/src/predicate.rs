use mpi_domain::{
	documents::field,
	identifier::{join_tokens, normalize},
	predicate::{BoolPredicate, Predicate, TextMode},
	settings::{MatchMode, SearchSettings},
};

pub const IDENTIFIER_PHRASE_BOOST: f32 = 8.0;
pub const IDENTIFIER_EXACT_BOOST: f32 = 4.0;
pub const IDENTIFIER_START_BOOST: f32 = 2.0;
pub const IDENTIFIER_ANYWHERE_BOOST: f32 = 1.0;
pub const TEXT_EXACT_BOOST: f32 = 8.0;
pub const TEXT_START_BOOST: f32 = 4.0;
pub const TEXT_ANYWHERE_BOOST: f32 = 2.0;

const NAME_FIELDS: [&str; 4] =
	[field::GIVEN_NAME, field::MIDDLE_NAME, field::FAMILY_NAME, field::FAMILY_NAME2];
const ATTRIBUTE_FIELDS: [&str; 1] = [field::VALUE];

/// Match mode applied to identifiers; `match_exactly` overrides configuration.
pub fn identifier_mode(match_exactly: bool, settings: &SearchSettings) -> TextMode {
	if match_exactly {
		return TextMode::Exact;
	}

	match settings.identifier_match_mode {
		MatchMode::Exact => TextMode::Exact,
		MatchMode::Start => TextMode::Start,
		MatchMode::Anywhere => TextMode::Anywhere,
	}
}

pub fn identifier_predicate(
	query: &str,
	include_voided: bool,
	match_exactly: bool,
	settings: &SearchSettings,
) -> Predicate {
	let mut builder = identifier_clauses(query, match_exactly, settings);

	if !include_voided {
		builder = builder
			.filter(Predicate::flag(field::VOIDED, false))
			.filter(Predicate::flag(field::PATIENT_VOIDED, false));
	}

	builder.filter(Predicate::flag(field::IS_PATIENT, true)).build()
}

/// Identifier predicate restricted to the given identifier types.
pub fn identifier_type_predicate(
	query: &str,
	identifier_type_ids: &[i64],
	match_exactly: bool,
	settings: &SearchSettings,
) -> Predicate {
	identifier_clauses(query, match_exactly, settings)
		.filter(Predicate::terms(field::IDENTIFIER_TYPE_ID, identifier_type_ids.to_vec()))
		.filter(Predicate::flag(field::IS_PATIENT, true))
		.build()
}

pub fn name_predicate(query: &str, include_voided: bool, settings: &SearchSettings) -> Predicate {
	free_text(query, &NAME_FIELDS, include_voided, settings.name_match_mode)
}

pub fn attribute_predicate(
	query: &str,
	include_voided: bool,
	settings: &SearchSettings,
) -> Predicate {
	free_text(query, &ATTRIBUTE_FIELDS, include_voided, settings.name_match_mode)
}

fn identifier_clauses(
	query: &str,
	match_exactly: bool,
	settings: &SearchSettings,
) -> BoolPredicate {
	let joined = join_tokens(&normalize(query, settings));
	let mode = identifier_mode(match_exactly, settings);
	let boost = match mode {
		TextMode::Exact => IDENTIFIER_EXACT_BOOST,
		TextMode::Start => IDENTIFIER_START_BOOST,
		_ => IDENTIFIER_ANYWHERE_BOOST,
	};

	Predicate::bool()
		.minimum_should_match(1)
		.should(Predicate::any_text(
			field::IDENTIFIER,
			TextMode::Phrase,
			&joined,
			IDENTIFIER_PHRASE_BOOST,
		))
		.should(Predicate::any_text(field::IDENTIFIER, mode, &joined, boost))
}

/// Every whitespace-separated term must match at least one of `fields`.
fn free_text(
	query: &str,
	fields: &[&'static str],
	include_voided: bool,
	mode: MatchMode,
) -> Predicate {
	let mut builder = Predicate::bool();

	for term in query.split_whitespace() {
		let mut term_clause = Predicate::bool().minimum_should_match(1);

		for field in fields.iter().copied() {
			term_clause = term_clause
				.should(Predicate::text(field, TextMode::Exact, term, TEXT_EXACT_BOOST))
				.should(Predicate::text(field, TextMode::Start, term, TEXT_START_BOOST));

			if mode == MatchMode::Anywhere {
				term_clause = term_clause.should(Predicate::text(
					field,
					TextMode::Anywhere,
					term,
					TEXT_ANYWHERE_BOOST,
				));
			}
		}

		builder = builder.must(term_clause.build());
	}

	if !include_voided {
		builder = builder
			.filter(Predicate::flag(field::VOIDED, false))
			.filter(Predicate::flag(field::PERSON_VOIDED, false))
			.filter(Predicate::flag(field::PATIENT_VOIDED, false));
	}

	builder.filter(Predicate::flag(field::IS_PATIENT, true)).build()
}
