use mpi_config::Postgres;
use mpi_domain::settings::{NoProperties, SearchSettings};
use mpi_service::{CountRequest, DuplicateRequest, MpiService, SearchRequest};
use mpi_storage::{
	db::Db,
	models::{
		NewPatientIdentifier, NewPerson, NewPersonAttribute, NewPersonName, Patient,
		UniquenessBehavior,
	},
	queries,
};
use mpi_testkit::TestDatabase;

async fn register(db: &Db, gender: &str, given: &str, family: &str) -> i64 {
	let person_id = queries::insert_person(
		&db.pool,
		&NewPerson { gender: Some(gender.to_string()), ..Default::default() },
	)
	.await
	.expect("Failed to insert person.");

	queries::ensure_patient_row(&db.pool, person_id, None)
		.await
		.expect("Failed to insert patient row.");
	queries::insert_person_name(
		&db.pool,
		&NewPersonName {
			person_id,
			given_name: Some(given.to_string()),
			family_name: Some(family.to_string()),
			preferred: true,
			..Default::default()
		},
	)
	.await
	.expect("Failed to insert name.");

	person_id
}

fn ids(patients: &[Patient]) -> Vec<i64> {
	patients.iter().map(Patient::patient_id).collect()
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set MPI_PG_DSN to run."]
async fn postgres_backed_search_and_duplicates() {
	let Some(base_dsn) = mpi_testkit::env_dsn() else {
		eprintln!("Skipping postgres_backed_search_and_duplicates; set MPI_PG_DSN to run this test.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let cfg = Postgres { dsn: test_db.dsn().to_string(), pool_max_conns: 4 };
	let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");
	queries::set_global_property(&db.pool, "minSearchCharacters", "2")
		.await
		.expect("Failed to set property.");

	let id_type = queries::insert_identifier_type(&db.pool, "MRN", UniquenessBehavior::Unique)
		.await
		.expect("Failed to insert type.");
	let first = register(&db, "F", "Jane", "Smith").await;
	let second = register(&db, "F", "Jane", "Smith").await;
	let third = register(&db, "M", "John", "Jones").await;

	for (patient_id, identifier) in [(first, "JS-100"), (third, "100")] {
		queries::insert_patient_identifier(
			&db.pool,
			&NewPatientIdentifier {
				patient_id,
				identifier: identifier.to_string(),
				identifier_type: id_type,
				..Default::default()
			},
		)
		.await
		.expect("Failed to insert identifier.");
	}

	queries::insert_person_attribute(
		&db.pool,
		&NewPersonAttribute {
			person_id: second,
			person_attribute_type_id: 1,
			value: "100 Main Street".to_string(),
			voided: false,
		},
	)
	.await
	.expect("Failed to insert attribute.");

	let properties = queries::load_global_properties(&db.pool).await.expect("properties");
	let settings = SearchSettings::resolve(&mpi_config::Search::default(), &properties);

	assert_eq!(settings.min_search_characters, 2);
	assert_eq!(
		SearchSettings::resolve(&mpi_config::Search::default(), &NoProperties)
			.min_search_characters,
		3
	);

	let service = MpiService::postgres(settings, db);
	let found = service
		.search(&SearchRequest {
			query: "100".to_string(),
			include_voided: false,
			start: None,
			length: None,
		})
		.await
		.expect("search");

	assert_eq!(ids(&found), vec![third, first, second]);
	assert_eq!(
		service
			.count(&CountRequest { query: "100".to_string(), include_voided: false })
			.await
			.expect("count"),
		3
	);

	let report = service
		.find_duplicates(&DuplicateRequest {
			attributes: vec!["givenName".to_string(), "familyName".to_string(), "gender".to_string()],
		})
		.await
		.expect("duplicates");

	assert_eq!(ids(&report.patients), vec![first, second]);
	assert!(report.unresolved.is_empty());

	let report = service
		.find_duplicates(&DuplicateRequest {
			attributes: vec!["givenName".to_string(), "gender".to_string(), "familyName2".to_string()],
		})
		.await
		.expect("duplicates");

	assert!(report.patients.is_empty());

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

async fn connect(test_db: &TestDatabase) -> Db {
	let cfg = Postgres { dsn: test_db.dsn().to_string(), pool_max_conns: 4 };
	let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");

	db
}

fn search_request(query: &str, include_voided: bool) -> SearchRequest {
	SearchRequest { query: query.to_string(), include_voided, start: None, length: None }
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set MPI_PG_DSN to run."]
async fn voided_patient_is_hidden_from_every_index() {
	let Some(base_dsn) = mpi_testkit::env_dsn() else {
		eprintln!(
			"Skipping voided_patient_is_hidden_from_every_index; set MPI_PG_DSN to run this test."
		);

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = connect(&test_db).await;
	let id_type = queries::insert_identifier_type(&db.pool, "MRN", UniquenessBehavior::Unique)
		.await
		.expect("Failed to insert type.");
	let maria = register(&db, "F", "Maria", "Lopez").await;

	queries::insert_patient_identifier(
		&db.pool,
		&NewPatientIdentifier {
			patient_id: maria,
			identifier: "MAR-1".to_string(),
			identifier_type: id_type,
			..Default::default()
		},
	)
	.await
	.expect("Failed to insert identifier.");
	queries::insert_person_attribute(
		&db.pool,
		&NewPersonAttribute {
			person_id: maria,
			person_attribute_type_id: 1,
			value: "Mariposa Road".to_string(),
			voided: false,
		},
	)
	.await
	.expect("Failed to insert attribute.");
	queries::void_patient(&db.pool, maria, "duplicate").await.expect("Failed to void patient.");

	let service = MpiService::postgres(SearchSettings::default(), db);

	for query in ["maria", "MAR-1", "mariposa"] {
		let found = service.search(&search_request(query, false)).await.expect("search");
		let count = service
			.count(&CountRequest { query: query.to_string(), include_voided: false })
			.await
			.expect("count");

		assert!(found.is_empty(), "{query} should not find a voided patient");
		assert_eq!(count, 0, "{query} should not count a voided patient");
	}

	let found = service.search(&search_request("maria", true)).await.expect("search");

	assert_eq!(ids(&found), vec![maria]);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set MPI_PG_DSN to run."]
async fn accented_names_match_as_stored() {
	let Some(base_dsn) = mpi_testkit::env_dsn() else {
		eprintln!("Skipping accented_names_match_as_stored; set MPI_PG_DSN to run this test.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = connect(&test_db).await;
	let elodie = register(&db, "F", "Élodie", "Núñez").await;

	register(&db, "F", "Odile", "Nunez").await;

	let service = MpiService::postgres(SearchSettings::default(), db);

	for query in ["Élodie", "Élod", "Élodie Núñez"] {
		let found = service.search(&search_request(query, false)).await.expect("search");

		assert_eq!(ids(&found), vec![elodie], "{query} should find the accented name");
	}

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
