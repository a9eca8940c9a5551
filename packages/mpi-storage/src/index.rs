use std::marker::PhantomData;

use sqlx::{PgPool, Row, postgres::PgRow};

use crate::{Error, Result};
use mpi_domain::{
	documents::{AttributeDocument, IdentifierDocument, NameDocument, Scored, field},
	identifier::phrase_key,
	predicate::{BoolPredicate, Predicate, TextMode, TextPredicate},
};

/// Stripped from both sides of a phrase comparison.
const PHRASE_NOISE: &str = "[[:punct:][:space:]]";

pub trait PgDocument
where
	Self: Sized,
{
	const NAME: &'static str;
	/// Aliased so that `column` expressions resolve.
	const FROM: &'static str;
	const SELECT: &'static str;
	const ID: &'static str;

	fn column(field: &str) -> Option<&'static str>;

	fn decode(row: &PgRow) -> Result<Self>;
}

impl PgDocument for IdentifierDocument {
	const FROM: &'static str =
		"patient_identifier d LEFT JOIN patient p ON p.patient_id = d.patient_id";
	const ID: &'static str = "d.patient_identifier_id";
	const NAME: &'static str = "identifier";
	const SELECT: &'static str = "\
d.patient_identifier_id, d.patient_id, d.identifier, d.identifier_type AS identifier_type_id, \
d.voided, coalesce(p.voided, false) AS patient_voided, (p.patient_id IS NOT NULL) AS is_patient";

	fn column(name: &str) -> Option<&'static str> {
		match name {
			field::IDENTIFIER => Some("d.identifier"),
			field::IDENTIFIER_TYPE_ID => Some("d.identifier_type"),
			field::VOIDED => Some("d.voided"),
			field::PATIENT_VOIDED => Some("coalesce(p.voided, false)"),
			field::IS_PATIENT => Some("(p.patient_id IS NOT NULL)"),
			_ => None,
		}
	}

	fn decode(row: &PgRow) -> Result<Self> {
		Ok(Self {
			patient_identifier_id: row.try_get("patient_identifier_id")?,
			patient_id: row.try_get("patient_id")?,
			identifier: row.try_get("identifier")?,
			identifier_type_id: row.try_get("identifier_type_id")?,
			voided: row.try_get("voided")?,
			patient_voided: row.try_get("patient_voided")?,
			is_patient: row.try_get("is_patient")?,
		})
	}
}

impl PgDocument for NameDocument {
	const FROM: &'static str = "\
person_name d INNER JOIN person ps ON ps.person_id = d.person_id \
LEFT JOIN patient p ON p.patient_id = d.person_id";
	const ID: &'static str = "d.person_name_id";
	const NAME: &'static str = "name";
	const SELECT: &'static str = "\
d.person_name_id, d.person_id, d.given_name, d.middle_name, d.family_name, d.family_name2, \
d.voided, ps.voided AS person_voided, coalesce(p.voided, false) AS patient_voided, \
(p.patient_id IS NOT NULL) AS is_patient";

	fn column(name: &str) -> Option<&'static str> {
		match name {
			field::GIVEN_NAME => Some("d.given_name"),
			field::MIDDLE_NAME => Some("d.middle_name"),
			field::FAMILY_NAME => Some("d.family_name"),
			field::FAMILY_NAME2 => Some("d.family_name2"),
			field::VOIDED => Some("d.voided"),
			field::PERSON_VOIDED => Some("ps.voided"),
			field::PATIENT_VOIDED => Some("coalesce(p.voided, false)"),
			field::IS_PATIENT => Some("(p.patient_id IS NOT NULL)"),
			_ => None,
		}
	}

	fn decode(row: &PgRow) -> Result<Self> {
		Ok(Self {
			person_name_id: row.try_get("person_name_id")?,
			person_id: row.try_get("person_id")?,
			given_name: row.try_get("given_name")?,
			middle_name: row.try_get("middle_name")?,
			family_name: row.try_get("family_name")?,
			family_name2: row.try_get("family_name2")?,
			voided: row.try_get("voided")?,
			person_voided: row.try_get("person_voided")?,
			patient_voided: row.try_get("patient_voided")?,
			is_patient: row.try_get("is_patient")?,
		})
	}
}

impl PgDocument for AttributeDocument {
	const FROM: &'static str = "\
person_attribute d INNER JOIN person ps ON ps.person_id = d.person_id \
LEFT JOIN patient p ON p.patient_id = d.person_id";
	const ID: &'static str = "d.person_attribute_id";
	const NAME: &'static str = "attribute";
	const SELECT: &'static str = "\
d.person_attribute_id, d.person_id, d.person_attribute_type_id AS attribute_type_id, d.value, \
d.voided, ps.voided AS person_voided, coalesce(p.voided, false) AS patient_voided, \
(p.patient_id IS NOT NULL) AS is_patient";

	fn column(name: &str) -> Option<&'static str> {
		match name {
			field::VALUE => Some("d.value"),
			field::ATTRIBUTE_TYPE_ID => Some("d.person_attribute_type_id"),
			field::VOIDED => Some("d.voided"),
			field::PERSON_VOIDED => Some("ps.voided"),
			field::PATIENT_VOIDED => Some("coalesce(p.voided, false)"),
			field::IS_PATIENT => Some("(p.patient_id IS NOT NULL)"),
			_ => None,
		}
	}

	fn decode(row: &PgRow) -> Result<Self> {
		Ok(Self {
			person_attribute_id: row.try_get("person_attribute_id")?,
			person_id: row.try_get("person_id")?,
			attribute_type_id: row.try_get("attribute_type_id")?,
			value: row.try_get("value")?,
			voided: row.try_get("voided")?,
			person_voided: row.try_get("person_voided")?,
			patient_voided: row.try_get("patient_voided")?,
			is_patient: row.try_get("is_patient")?,
		})
	}
}

#[derive(Debug, Clone, PartialEq)]
pub enum Bind {
	Text(String),
	Ids(Vec<i64>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledPredicate {
	pub condition: String,
	pub score: String,
	pub binds: Vec<Bind>,
}

pub fn compile<D>(predicate: &Predicate) -> Result<CompiledPredicate>
where
	D: PgDocument,
{
	let mut binds = Vec::new();
	let (condition, score) = compile_node::<D>(predicate, &mut binds)?;

	Ok(CompiledPredicate { condition, score, binds })
}

fn compile_node<D>(predicate: &Predicate, binds: &mut Vec<Bind>) -> Result<(String, String)>
where
	D: PgDocument,
{
	match predicate {
		Predicate::Bool(inner) => compile_bool::<D>(inner, binds),
		Predicate::Text(inner) => {
			let condition = compile_text::<D>(inner, binds)?;
			let score = format!("(CASE WHEN {condition} THEN {:?} ELSE 0 END)", inner.boost);

			Ok((condition, score))
		},
		Predicate::Flag { field, value } => {
			let column = column::<D>(field)?;
			let test = if *value { "IS TRUE" } else { "IS FALSE" };

			Ok((format!("({column} {test})"), "0".to_string()))
		},
		Predicate::Terms { field, values } => {
			let column = column::<D>(field)?;

			if values.is_empty() {
				return Ok(("false".to_string(), "0".to_string()));
			}

			binds.push(Bind::Ids(values.clone()));

			Ok((format!("coalesce({column} = ANY(${}), false)", binds.len()), "0".to_string()))
		},
	}
}

fn compile_bool<D>(predicate: &BoolPredicate, binds: &mut Vec<Bind>) -> Result<(String, String)>
where
	D: PgDocument,
{
	let mut conditions = Vec::new();
	let mut scores = Vec::new();

	for clause in &predicate.filter {
		conditions.push(compile_node::<D>(clause, binds)?.0);
	}
	for clause in &predicate.must {
		let (condition, score) = compile_node::<D>(clause, binds)?;

		conditions.push(condition);
		scores.push(score);
	}

	let mut matched = Vec::new();

	for clause in &predicate.should {
		let (condition, score) = compile_node::<D>(clause, binds)?;

		matched.push(format!("(CASE WHEN {condition} THEN 1 ELSE 0 END)"));
		scores.push(score);
	}

	if predicate.minimum_should_match > 0 {
		if matched.is_empty() {
			conditions.push("false".to_string());
		} else {
			conditions
				.push(format!("({}) >= {}", matched.join(" + "), predicate.minimum_should_match));
		}
	}

	let condition = if conditions.is_empty() {
		"true".to_string()
	} else {
		format!("({})", conditions.join(" AND "))
	};
	let score = if scores.is_empty() { "0".to_string() } else { format!("({})", scores.join(" + ")) };

	Ok((condition, score))
}

fn compile_text<D>(predicate: &TextPredicate, binds: &mut Vec<Bind>) -> Result<String>
where
	D: PgDocument,
{
	let column = column::<D>(predicate.field)?;
	let mut alternatives = Vec::new();

	// Both sides are folded by the database so they follow the same ctype.
	for value in &predicate.values {
		let idx = binds.len() + 1;
		let (expression, bound) = match predicate.mode {
			TextMode::Exact => (format!("lower({column}) = lower(${idx})"), value.clone()),
			TextMode::Start => (
				format!("lower({column}) LIKE lower(${idx}) ESCAPE '\\'"),
				format!("{}%", escape_like(value)),
			),
			TextMode::Anywhere => (
				format!("lower({column}) LIKE lower(${idx}) ESCAPE '\\'"),
				format!("%{}%", escape_like(value)),
			),
			TextMode::Phrase => {
				if phrase_key(value).is_empty() {
					continue;
				}

				(
					format!(
						"regexp_replace(lower({column}), '{PHRASE_NOISE}', '', 'g') = \
						 regexp_replace(lower(${idx}), '{PHRASE_NOISE}', '', 'g')"
					),
					value.clone(),
				)
			},
		};

		binds.push(Bind::Text(bound));
		alternatives.push(expression);
	}

	if alternatives.is_empty() {
		return Ok("false".to_string());
	}

	Ok(format!("coalesce(({}), false)", alternatives.join(" OR ")))
}

fn column<D>(name: &str) -> Result<&'static str>
where
	D: PgDocument,
{
	D::column(name)
		.ok_or_else(|| Error::InvalidArgument(format!("{} index has no field {name}.", D::NAME)))
}

fn escape_like(raw: &str) -> String {
	let mut out = String::with_capacity(raw.len());

	for ch in raw.chars() {
		if matches!(ch, '\\' | '%' | '_') {
			out.push('\\');
		}

		out.push(ch);
	}

	out
}

pub struct PgIndex<D> {
	pool: PgPool,
	_document: PhantomData<fn() -> D>,
}
impl<D> PgIndex<D>
where
	D: PgDocument,
{
	pub fn new(pool: PgPool) -> Self {
		Self { pool, _document: PhantomData }
	}

	/// Ordered by score descending, then id ascending.
	pub async fn search(
		&self,
		predicate: &Predicate,
		offset: usize,
		limit: usize,
	) -> Result<Vec<Scored<D>>> {
		let compiled = compile::<D>(predicate)?;
		let sql = format!(
			"SELECT {select}, ({score})::real AS score FROM {from} WHERE {condition} \
			 ORDER BY score DESC, {id} ASC OFFSET ${offset_idx} LIMIT ${limit_idx}",
			select = D::SELECT,
			score = compiled.score,
			from = D::FROM,
			condition = compiled.condition,
			id = D::ID,
			offset_idx = compiled.binds.len() + 1,
			limit_idx = compiled.binds.len() + 2,
		);
		let mut query = sqlx::query(&sql);

		for bind in compiled.binds {
			query = match bind {
				Bind::Text(value) => query.bind(value),
				Bind::Ids(values) => query.bind(values),
			};
		}

		let rows = query
			.bind(i64::try_from(offset).unwrap_or(i64::MAX))
			.bind(i64::try_from(limit).unwrap_or(i64::MAX))
			.fetch_all(&self.pool)
			.await?;
		let mut out = Vec::with_capacity(rows.len());

		for row in &rows {
			let score: f32 = row.try_get("score")?;

			out.push(Scored { document: D::decode(row)?, score });
		}

		Ok(out)
	}

	pub async fn count(&self, predicate: &Predicate) -> Result<u64> {
		let compiled = compile::<D>(predicate)?;
		let sql = format!("SELECT count(*) FROM {} WHERE {}", D::FROM, compiled.condition);
		let mut query = sqlx::query_scalar::<_, i64>(&sql);

		for bind in compiled.binds {
			query = match bind {
				Bind::Text(value) => query.bind(value),
				Bind::Ids(values) => query.bind(values),
			};
		}

		let count = query.fetch_one(&self.pool).await?;

		Ok(u64::try_from(count).unwrap_or_default())
	}
}
