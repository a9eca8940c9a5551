//! Serializers for the timestamps and calendar dates exposed in patient views.

use serde::Serializer;
use time::{
	Date, OffsetDateTime, format_description::well_known::Rfc3339, macros::format_description,
};

pub fn serialize<S>(value: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
	S: Serializer,
{
	let formatted = value.format(&Rfc3339).map_err(serde::ser::Error::custom)?;

	serializer.serialize_str(&formatted)
}

pub fn serialize_option<S>(value: &Option<OffsetDateTime>, serializer: S) -> Result<S::Ok, S::Error>
where
	S: Serializer,
{
	match value {
		Some(value) => serialize(value, serializer),
		None => serializer.serialize_none(),
	}
}

/// Calendar dates as `YYYY-MM-DD`.
pub fn serialize_date<S>(value: &Option<Date>, serializer: S) -> Result<S::Ok, S::Error>
where
	S: Serializer,
{
	let Some(value) = value else {
		return serializer.serialize_none();
	};
	let formatted = value
		.format(format_description!("[year]-[month]-[day]"))
		.map_err(serde::ser::Error::custom)?;

	serializer.serialize_str(&formatted)
}
