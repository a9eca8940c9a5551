use std::collections::HashMap;

use sqlx::PgExecutor;
use uuid::Uuid;

use crate::{
	Error, Result,
	db::Db,
	models::{
		NewPatientIdentifier, NewPerson, NewPersonAttribute, NewPersonName, Patient,
		PatientIdentifier, PatientIdentifierType, PatientRecord, PersonAttribute, PersonName,
		UniquenessBehavior,
	},
};
use mpi_domain::ordering::sort_collection;

const PATIENT_COLUMNS: &str = "\
pt.patient_id, ps.uuid, ps.gender, ps.birthdate, ps.birthdate_estimated, ps.dead, ps.death_date, \
ps.cause_of_death, pt.allergy_status, pt.creator, pt.date_created, pt.voided, pt.voided_by, \
pt.date_voided, pt.void_reason";
const PATIENT_FROM: &str = "patient pt INNER JOIN person ps ON ps.person_id = pt.patient_id";

pub async fn get_patient(db: &Db, patient_id: i64) -> Result<Option<Patient>> {
	let mut patients = patients_by_ids(db, &[patient_id]).await?;

	Ok(patients.pop())
}

pub async fn get_patient_by_uuid(db: &Db, uuid: Uuid) -> Result<Option<Patient>> {
	let patient_id: Option<i64> =
		sqlx::query_scalar("SELECT person_id FROM person WHERE uuid = $1")
			.bind(uuid)
			.fetch_optional(&db.pool)
			.await?;

	match patient_id {
		Some(patient_id) => get_patient(db, patient_id).await,
		None => Ok(None),
	}
}

/// Patients with the given ids in ascending id order; unknown ids are skipped.
pub async fn patients_by_ids(db: &Db, ids: &[i64]) -> Result<Vec<Patient>> {
	if ids.is_empty() {
		return Ok(Vec::new());
	}

	let sql = format!(
		"SELECT {PATIENT_COLUMNS} FROM {PATIENT_FROM} WHERE pt.patient_id = ANY($1) \
		 ORDER BY pt.patient_id"
	);
	let records: Vec<PatientRecord> =
		sqlx::query_as(&sql).bind(ids).fetch_all(&db.pool).await?;

	assemble(db, records).await
}

pub async fn all_patients(db: &Db, include_voided: bool) -> Result<Vec<Patient>> {
	let sql = format!(
		"SELECT {PATIENT_COLUMNS} FROM {PATIENT_FROM} WHERE ($1 OR pt.voided = false) \
		 ORDER BY pt.patient_id"
	);
	let records: Vec<PatientRecord> =
		sqlx::query_as(&sql).bind(include_voided).fetch_all(&db.pool).await?;

	assemble(db, records).await
}

async fn assemble(db: &Db, records: Vec<PatientRecord>) -> Result<Vec<Patient>> {
	if records.is_empty() {
		return Ok(Vec::new());
	}

	let ids: Vec<i64> = records.iter().map(|record| record.patient_id).collect();
	let identifiers: Vec<PatientIdentifier> = sqlx::query_as(
		"\
SELECT patient_identifier_id, uuid, patient_id, identifier, identifier_type, location_id, preferred,
\tdate_created, voided
FROM patient_identifier
WHERE patient_id = ANY($1)",
	)
	.bind(&ids)
	.fetch_all(&db.pool)
	.await?;
	let names: Vec<PersonName> = sqlx::query_as(
		"\
SELECT person_name_id, uuid, person_id, preferred, prefix, given_name, middle_name,
\tfamily_name_prefix, family_name, family_name2, family_name_suffix, degree, date_created, voided
FROM person_name
WHERE person_id = ANY($1)",
	)
	.bind(&ids)
	.fetch_all(&db.pool)
	.await?;
	let attributes: Vec<PersonAttribute> = sqlx::query_as(
		"\
SELECT person_attribute_id, uuid, person_id, person_attribute_type_id, value, date_created, voided
FROM person_attribute
WHERE person_id = ANY($1)",
	)
	.bind(&ids)
	.fetch_all(&db.pool)
	.await?;
	let mut by_id: HashMap<i64, Patient> = records
		.into_iter()
		.map(|record| {
			let patient = Patient {
				record,
				identifiers: Vec::new(),
				names: Vec::new(),
				attributes: Vec::new(),
			};

			(patient.patient_id(), patient)
		})
		.collect();

	for identifier in identifiers {
		if let Some(patient) = by_id.get_mut(&identifier.patient_id) {
			patient.identifiers.push(identifier);
		}
	}
	for name in names {
		if let Some(patient) = by_id.get_mut(&name.person_id) {
			patient.names.push(name);
		}
	}
	for attribute in attributes {
		if let Some(patient) = by_id.get_mut(&attribute.person_id) {
			patient.attributes.push(attribute);
		}
	}

	let mut patients: Vec<Patient> = ids.iter().filter_map(|id| by_id.remove(id)).collect();

	for patient in &mut patients {
		sort_collection(&mut patient.identifiers);
		sort_collection(&mut patient.names);
		sort_collection(&mut patient.attributes);
	}

	Ok(patients)
}

pub async fn allergy_status<'e, E>(executor: E, patient_id: i64) -> Result<String>
where
	E: PgExecutor<'e>,
{
	let status: Option<String> =
		sqlx::query_scalar("SELECT allergy_status FROM patient WHERE patient_id = $1")
			.bind(patient_id)
			.fetch_optional(executor)
			.await?;

	status.ok_or_else(|| Error::NotFound(format!("patient {patient_id}")))
}

pub async fn get_identifier_type<'e, E>(
	executor: E,
	identifier_type_id: i64,
) -> Result<Option<PatientIdentifierType>>
where
	E: PgExecutor<'e>,
{
	let row = sqlx::query_as(
		"\
SELECT patient_identifier_type_id, name, uniqueness_behavior, retired
FROM patient_identifier_type
WHERE patient_identifier_type_id = $1",
	)
	.bind(identifier_type_id)
	.fetch_optional(executor)
	.await?;

	Ok(row)
}

/// Whether another non-voided patient holds a non-voided identifier with the same value and type.
///
/// The candidate's own patient is excluded when it has one. Location scoping applies only to
/// `LOCATION` types when the candidate names a location.
pub async fn is_identifier_in_use_by_another_patient(
	db: &Db,
	identifier: &NewPatientIdentifier,
	exclude_patient: Option<i64>,
) -> Result<bool> {
	let identifier_type = get_identifier_type(&db.pool, identifier.identifier_type)
		.await?
		.ok_or_else(|| {
			Error::NotFound(format!("patient identifier type {}", identifier.identifier_type))
		})?;
	let location = match identifier_type.uniqueness() {
		Some(UniquenessBehavior::Location) => identifier.location_id,
		_ => None,
	};
	let in_use: bool = sqlx::query_scalar(
		"\
SELECT EXISTS (
\tSELECT 1
\tFROM patient_identifier pi
\tINNER JOIN patient p ON p.patient_id = pi.patient_id
\tWHERE pi.identifier = $1
\t\tAND pi.identifier_type = $2
\t\tAND pi.voided = false
\t\tAND p.voided = false
\t\tAND ($3::bigint IS NULL OR pi.patient_id <> $3)
\t\tAND ($4::bigint IS NULL OR pi.location_id = $4)
)",
	)
	.bind(identifier.identifier.as_str())
	.bind(identifier.identifier_type)
	.bind(exclude_patient)
	.bind(location)
	.fetch_one(&db.pool)
	.await?;

	Ok(in_use)
}

/// Inserts the patient row extending an existing person when it is missing.
///
/// Returns whether a row was inserted.
pub async fn ensure_patient_row<'e, E>(
	executor: E,
	patient_id: i64,
	creator: Option<i64>,
) -> Result<bool>
where
	E: PgExecutor<'e>,
{
	let result = sqlx::query(
		"\
INSERT INTO patient (patient_id, creator)
SELECT person_id, $2
FROM person
WHERE person_id = $1
ON CONFLICT (patient_id) DO NOTHING",
	)
	.bind(patient_id)
	.bind(creator)
	.execute(executor)
	.await?;

	Ok(result.rows_affected() > 0)
}

pub async fn load_global_properties<'e, E>(executor: E) -> Result<HashMap<String, String>>
where
	E: PgExecutor<'e>,
{
	let rows: Vec<(String, Option<String>)> =
		sqlx::query_as("SELECT property, property_value FROM global_property")
			.fetch_all(executor)
			.await?;

	Ok(rows.into_iter().filter_map(|(key, value)| value.map(|value| (key, value))).collect())
}

pub async fn set_global_property<'e, E>(executor: E, property: &str, value: &str) -> Result<()>
where
	E: PgExecutor<'e>,
{
	sqlx::query(
		"\
INSERT INTO global_property (property, property_value)
VALUES ($1, $2)
ON CONFLICT (property) DO UPDATE SET property_value = EXCLUDED.property_value",
	)
	.bind(property)
	.bind(value)
	.execute(executor)
	.await?;

	Ok(())
}

pub async fn insert_person<'e, E>(executor: E, person: &NewPerson) -> Result<i64>
where
	E: PgExecutor<'e>,
{
	let person_id = sqlx::query_scalar(
		"\
INSERT INTO person (uuid, gender, birthdate, creator, voided)
VALUES ($1, $2, $3, $4, $5)
RETURNING person_id",
	)
	.bind(Uuid::new_v4())
	.bind(person.gender.as_deref())
	.bind(person.birthdate)
	.bind(person.creator)
	.bind(person.voided)
	.fetch_one(executor)
	.await?;

	Ok(person_id)
}

pub async fn void_patient<'e, E>(executor: E, patient_id: i64, reason: &str) -> Result<()>
where
	E: PgExecutor<'e>,
{
	let result = sqlx::query(
		"\
UPDATE patient
SET voided = true, date_voided = now(), void_reason = $2
WHERE patient_id = $1",
	)
	.bind(patient_id)
	.bind(reason)
	.execute(executor)
	.await?;

	if result.rows_affected() == 0 {
		return Err(Error::NotFound(format!("patient {patient_id}")));
	}

	Ok(())
}

pub async fn insert_identifier_type<'e, E>(
	executor: E,
	name: &str,
	uniqueness: UniquenessBehavior,
) -> Result<i64>
where
	E: PgExecutor<'e>,
{
	let id = sqlx::query_scalar(
		"\
INSERT INTO patient_identifier_type (name, uniqueness_behavior)
VALUES ($1, $2)
RETURNING patient_identifier_type_id",
	)
	.bind(name)
	.bind(uniqueness.as_str())
	.fetch_one(executor)
	.await?;

	Ok(id)
}

pub async fn insert_person_name<'e, E>(executor: E, name: &NewPersonName) -> Result<i64>
where
	E: PgExecutor<'e>,
{
	let id = sqlx::query_scalar(
		"\
INSERT INTO person_name (uuid, person_id, given_name, middle_name, family_name, family_name2,
\tpreferred, voided)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
RETURNING person_name_id",
	)
	.bind(Uuid::new_v4())
	.bind(name.person_id)
	.bind(name.given_name.as_deref())
	.bind(name.middle_name.as_deref())
	.bind(name.family_name.as_deref())
	.bind(name.family_name2.as_deref())
	.bind(name.preferred)
	.bind(name.voided)
	.fetch_one(executor)
	.await?;

	Ok(id)
}

pub async fn insert_patient_identifier<'e, E>(
	executor: E,
	identifier: &NewPatientIdentifier,
) -> Result<i64>
where
	E: PgExecutor<'e>,
{
	let id = sqlx::query_scalar(
		"\
INSERT INTO patient_identifier (uuid, patient_id, identifier, identifier_type, location_id,
\tpreferred, voided)
VALUES ($1, $2, $3, $4, $5, $6, $7)
RETURNING patient_identifier_id",
	)
	.bind(Uuid::new_v4())
	.bind(identifier.patient_id)
	.bind(identifier.identifier.as_str())
	.bind(identifier.identifier_type)
	.bind(identifier.location_id)
	.bind(identifier.preferred)
	.bind(identifier.voided)
	.fetch_one(executor)
	.await?;

	Ok(id)
}

pub async fn insert_person_attribute<'e, E>(
	executor: E,
	attribute: &NewPersonAttribute,
) -> Result<i64>
where
	E: PgExecutor<'e>,
{
	let id = sqlx::query_scalar(
		"\
INSERT INTO person_attribute (uuid, person_id, person_attribute_type_id, value, voided)
VALUES ($1, $2, $3, $4, $5)
RETURNING person_attribute_id",
	)
	.bind(Uuid::new_v4())
	.bind(attribute.person_id)
	.bind(attribute.person_attribute_type_id)
	.bind(attribute.value.as_str())
	.bind(attribute.voided)
	.fetch_one(executor)
	.await?;

	Ok(id)
}
