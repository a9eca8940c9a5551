use std::collections::HashMap;

use tracing::warn;

pub const MIN_SEARCH_CHARACTERS_KEY: &str = "minSearchCharacters";
pub const MAX_SEARCH_RESULTS_KEY: &str = "person.searchMaxResults";
pub const IDENTIFIER_MATCH_MODE_KEY: &str = "patientIdentifierSearch.matchMode";
pub const NAME_MATCH_MODE_KEY: &str = "patientSearch.matchMode";
pub const IDENTIFIER_REGEX_KEY: &str = "patient.identifierRegex";
pub const IDENTIFIER_SEARCH_PATTERN_KEY: &str = "patient.identifierSearchPattern";

pub const DEFAULT_MIN_SEARCH_CHARACTERS: usize = 3;
pub const DEFAULT_MAX_SEARCH_RESULTS: usize = 1_000;

/// String-keyed configuration lookup, e.g. the `global_property` table.
pub trait PropertySource {
	fn property(&self, key: &str) -> Option<String>;
}
impl PropertySource for HashMap<String, String> {
	fn property(&self, key: &str) -> Option<String> {
		self.get(key).cloned()
	}
}

pub struct NoProperties;
impl PropertySource for NoProperties {
	fn property(&self, _key: &str) -> Option<String> {
		None
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
	Exact,
	Start,
	Anywhere,
}
impl MatchMode {
	pub fn parse(raw: &str) -> Option<Self> {
		match raw.trim().to_ascii_lowercase().as_str() {
			"exact" => Some(Self::Exact),
			"start" => Some(Self::Start),
			"anywhere" => Some(Self::Anywhere),
			_ => None,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Exact => "exact",
			Self::Start => "start",
			Self::Anywhere => "anywhere",
		}
	}
}

/// Search configuration resolved once and passed into every search call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSettings {
	pub min_search_characters: usize,
	pub max_results: usize,
	pub identifier_match_mode: MatchMode,
	pub name_match_mode: MatchMode,
	pub identifier_regex: Option<String>,
	pub identifier_search_pattern: Option<String>,
}
impl SearchSettings {
	pub fn from_config(cfg: &mpi_config::Search) -> Self {
		Self {
			min_search_characters: cfg.min_search_characters as usize,
			max_results: (cfg.max_results as usize).max(1),
			identifier_match_mode: MatchMode::parse(&cfg.identifier_match_mode)
				.unwrap_or(MatchMode::Anywhere),
			name_match_mode: MatchMode::parse(&cfg.name_match_mode).unwrap_or(MatchMode::Start),
			identifier_regex: non_blank(cfg.identifier_regex.as_deref()),
			identifier_search_pattern: non_blank(cfg.identifier_search_pattern.as_deref()),
		}
	}

	/// Applies runtime property overrides on top of the file configuration.
	pub fn resolve(cfg: &mpi_config::Search, properties: &dyn PropertySource) -> Self {
		let mut settings = Self::from_config(cfg);

		if let Some(raw) = properties.property(MIN_SEARCH_CHARACTERS_KEY) {
			settings.min_search_characters =
				parse_count(MIN_SEARCH_CHARACTERS_KEY, &raw, DEFAULT_MIN_SEARCH_CHARACTERS);
		}
		if let Some(raw) = properties.property(MAX_SEARCH_RESULTS_KEY) {
			settings.max_results =
				parse_count(MAX_SEARCH_RESULTS_KEY, &raw, DEFAULT_MAX_SEARCH_RESULTS).max(1);
		}
		if let Some(raw) = properties.property(IDENTIFIER_MATCH_MODE_KEY) {
			settings.identifier_match_mode = parse_mode(
				IDENTIFIER_MATCH_MODE_KEY,
				&raw,
				settings.identifier_match_mode,
			);
		}
		if let Some(raw) = properties.property(NAME_MATCH_MODE_KEY) {
			settings.name_match_mode = parse_mode(NAME_MATCH_MODE_KEY, &raw, settings.name_match_mode);
		}
		if let Some(raw) = properties.property(IDENTIFIER_REGEX_KEY) {
			settings.identifier_regex = non_blank(Some(&raw));
		}
		if let Some(raw) = properties.property(IDENTIFIER_SEARCH_PATTERN_KEY) {
			settings.identifier_search_pattern = non_blank(Some(&raw));
		}

		settings
	}
}
impl Default for SearchSettings {
	fn default() -> Self {
		Self::from_config(&mpi_config::Search::default())
	}
}

fn parse_count(key: &str, raw: &str, fallback: usize) -> usize {
	let numeric = !raw.is_empty() && raw.chars().all(|c| c.is_ascii_digit());

	match raw.parse::<usize>() {
		Ok(value) if numeric => value,
		_ => {
			warn!(key, value = raw, fallback, "Non-numeric search property; using default.");

			fallback
		},
	}
}

fn parse_mode(key: &str, raw: &str, fallback: MatchMode) -> MatchMode {
	MatchMode::parse(raw).unwrap_or_else(|| {
		warn!(key, value = raw, fallback = fallback.as_str(), "Unknown match mode property.");

		fallback
	})
}

fn non_blank(value: Option<&str>) -> Option<String> {
	value.map(str::trim).filter(|value| !value.is_empty()).map(ToString::to_string)
}
