use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub search: Search,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

/// File-level search defaults. Runtime global properties may override every field.
#[derive(Debug, Clone, Deserialize)]
pub struct Search {
	#[serde(default = "default_min_search_characters")]
	pub min_search_characters: u32,
	#[serde(default = "default_max_results")]
	pub max_results: u32,
	/// One of "exact", "start" or "anywhere".
	#[serde(default = "default_identifier_match_mode")]
	pub identifier_match_mode: String,
	#[serde(default = "default_name_match_mode")]
	pub name_match_mode: String,
	/// Identifier validation regex. A value shaped like `^0*...` also declares the padding
	/// character stripped from identifier queries.
	pub identifier_regex: Option<String>,
	/// Comma-separated templates using `@SEARCH@`, `@SEARCH-1@` and `@CHECKDIGIT@`.
	pub identifier_search_pattern: Option<String>,
}
impl Default for Search {
	fn default() -> Self {
		Self {
			min_search_characters: default_min_search_characters(),
			max_results: default_max_results(),
			identifier_match_mode: default_identifier_match_mode(),
			name_match_mode: default_name_match_mode(),
			identifier_regex: None,
			identifier_search_pattern: None,
		}
	}
}

fn default_min_search_characters() -> u32 {
	3
}

fn default_max_results() -> u32 {
	1_000
}

fn default_identifier_match_mode() -> String {
	"anywhere".to_string()
}

fn default_name_match_mode() -> String {
	"start".to_string()
}
