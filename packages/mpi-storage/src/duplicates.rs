use sqlx::PgExecutor;

use crate::{
	Result,
	fields::{self, RecordKind, ResolvedField},
};

/// Pseudo-attribute that disables the voided-patient filter.
pub const INCLUDE_VOIDED: &str = "includeVoided";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DuplicateQuery {
	pub fields: Vec<ResolvedField>,
	pub unresolved: Vec<String>,
	pub include_voided: bool,
}
impl DuplicateQuery {
	/// Resolves every name; unknown names are kept aside and logged.
	pub fn plan<S>(attributes: &[S]) -> Self
	where
		S: AsRef<str>,
	{
		let mut query = Self::default();

		for raw in attributes {
			let name = raw.as_ref().trim();

			if name.is_empty() {
				continue;
			}
			if name == INCLUDE_VOIDED {
				query.include_voided = true;

				continue;
			}

			match fields::locate(name) {
				Some(field) => {
					let seen = query
						.fields
						.iter()
						.any(|known| known.kind == field.kind && known.column == field.column);

					if !seen {
						query.fields.push(field);
					}
				},
				None => {
					tracing::warn!(attribute = name, "Unresolved duplicate-detection attribute dropped.");

					query.unresolved.push(name.to_string());
				},
			}
		}

		query
	}

	pub fn kinds(&self) -> Vec<RecordKind> {
		RecordKind::RESOLUTION_ORDER
			.into_iter()
			.filter(|kind| self.fields.iter().any(|field| field.kind == *kind))
			.collect()
	}

	pub fn to_sql(&self) -> Option<String> {
		if self.fields.is_empty() {
			return None;
		}

		let kinds = self.kinds();
		let inner_columns: Vec<String> = self
			.fields
			.iter()
			.map(|field| format!("{}.{}", field.kind.inner_alias(), field.column))
			.collect();
		let selected = inner_columns
			.iter()
			.enumerate()
			.map(|(idx, column)| format!("{column} AS c{idx}"))
			.collect::<Vec<_>>()
			.join(", ");
		let grouped = inner_columns.join(", ");
		let join_back = self
			.fields
			.iter()
			.enumerate()
			.map(|(idx, field)| format!("{}.{} = t5.c{idx}", field.kind.outer_alias(), field.column))
			.collect::<Vec<_>>()
			.join(" AND ");
		let mut sql = String::from("SELECT t1.patient_id FROM patient t1");

		sql.push_str(&joins(&kinds, |kind| kind.outer_alias(), "t1"));
		sql.push_str(" INNER JOIN (SELECT ");
		sql.push_str(&selected);
		sql.push_str(&format!(", row_number() OVER (ORDER BY {grouped}) AS group_rank"));
		sql.push_str(" FROM patient p1");
		sql.push_str(&joins(&kinds, |kind| kind.inner_alias(), "p1"));

		if !self.include_voided {
			sql.push_str(" WHERE p1.voided = false");
		}

		sql.push_str(&format!(" GROUP BY {grouped} HAVING count(*) > 1) t5 ON {join_back}"));
		sql.push_str(" GROUP BY t1.patient_id ORDER BY min(t5.group_rank), t1.patient_id");

		Some(sql)
	}
}

fn joins<F>(kinds: &[RecordKind], alias: F, patient_alias: &str) -> String
where
	F: Fn(RecordKind) -> &'static str,
{
	let mut out = String::new();

	for kind in kinds {
		let Some(owner) = kind.owner_column() else {
			continue;
		};

		out.push_str(&format!(
			" INNER JOIN {table} {alias} ON {patient_alias}.patient_id = {alias}.{owner}",
			table = kind.table(),
			alias = alias(*kind),
		));
	}

	out
}

/// Patient ids in duplicate-group order: first group rank, then id.
pub async fn duplicate_patient_ids<'e, E>(executor: E, query: &DuplicateQuery) -> Result<Vec<i64>>
where
	E: PgExecutor<'e>,
{
	let Some(sql) = query.to_sql() else {
		return Ok(Vec::new());
	};

	tracing::debug!(sql = sql.as_str(), "Running duplicate-group query.");

	let ids = sqlx::query_scalar::<_, i64>(&sql).fetch_all(executor).await?;

	Ok(ids)
}

#[cfg(test)]
mod tests {
	use super::{DuplicateQuery, RecordKind};

	#[test]
	fn plan_separates_flag_and_unknown_names() {
		let query = DuplicateQuery::plan(&["gender", " includeVoided ", "shoeSize", "givenName"]);

		assert!(query.include_voided);
		assert_eq!(query.unresolved, vec!["shoeSize".to_string()]);
		assert_eq!(query.fields.len(), 2);
		assert_eq!(query.kinds(), vec![RecordKind::Person, RecordKind::PersonName]);
	}

	#[test]
	fn repeated_names_resolve_once() {
		let query = DuplicateQuery::plan(&["gender", "gender"]);

		assert_eq!(query.fields.len(), 1);
	}

	#[test]
	fn one_join_per_kind() {
		let query = DuplicateQuery::plan(&["givenName", "familyName", "middleName"]);
		let sql = query.to_sql().expect("sql");

		assert_eq!(sql.matches("INNER JOIN person_name").count(), 2);
		assert!(!sql.contains("INNER JOIN person "));
		assert!(sql.contains(
			"GROUP BY pn1.given_name, pn1.family_name, pn1.middle_name HAVING count(*) > 1"
		));
		assert!(sql.contains(
			"t3.given_name = t5.c0 AND t3.family_name = t5.c1 AND t3.middle_name = t5.c2"
		));
	}

	#[test]
	fn voided_filter_follows_flag() {
		let filtered = DuplicateQuery::plan(&["gender"]).to_sql().expect("sql");
		let unfiltered = DuplicateQuery::plan(&["gender", "includeVoided"]).to_sql().expect("sql");

		assert!(filtered.contains("WHERE p1.voided = false"));
		assert!(!unfiltered.contains("WHERE"));
	}

	#[test]
	fn patient_columns_need_no_join() {
		let sql = DuplicateQuery::plan(&["allergyStatus"]).to_sql().expect("sql");

		assert_eq!(
			sql,
			"SELECT t1.patient_id FROM patient t1 INNER JOIN (SELECT p1.allergy_status AS c0, \
			 row_number() OVER (ORDER BY p1.allergy_status) AS group_rank FROM patient p1 WHERE \
			 p1.voided = false GROUP BY p1.allergy_status HAVING count(*) > 1) t5 ON \
			 t1.allergy_status = t5.c0 GROUP BY t1.patient_id ORDER BY min(t5.group_rank), \
			 t1.patient_id"
		);
	}

	#[test]
	fn nothing_resolved_means_no_query() {
		assert!(DuplicateQuery::plan(&["shoeSize"]).to_sql().is_none());
		assert!(DuplicateQuery::plan::<&str>(&[]).to_sql().is_none());
	}
}
