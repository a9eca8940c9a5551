mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, Postgres, Search, Service, Storage};

use std::{fs, path::Path};

use regex::Regex;

pub const MATCH_MODES: [&str; 3] = ["exact", "start", "anywhere"];

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;
	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.dsn.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.postgres.dsn must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if cfg.search.max_results == 0 {
		return Err(Error::Validation {
			message: "search.max_results must be greater than zero.".to_string(),
		});
	}

	for (label, mode) in [
		("search.identifier_match_mode", &cfg.search.identifier_match_mode),
		("search.name_match_mode", &cfg.search.name_match_mode),
	] {
		if !MATCH_MODES.contains(&mode.as_str()) {
			return Err(Error::Validation {
				message: format!("{label} must be one of exact, start, or anywhere."),
			});
		}
	}

	if let Some(pattern) = cfg.search.identifier_regex.as_deref()
		&& let Err(err) = Regex::new(pattern)
	{
		return Err(Error::Validation {
			message: format!("search.identifier_regex must be a valid regex: {err}."),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.search.identifier_match_mode = cfg.search.identifier_match_mode.trim().to_ascii_lowercase();
	cfg.search.name_match_mode = cfg.search.name_match_mode.trim().to_ascii_lowercase();

	if cfg.search.identifier_regex.as_deref().map(|value| value.trim().is_empty()).unwrap_or(false)
	{
		cfg.search.identifier_regex = None;
	}
	if cfg
		.search
		.identifier_search_pattern
		.as_deref()
		.map(|value| value.trim().is_empty())
		.unwrap_or(false)
	{
		cfg.search.identifier_search_pattern = None;
	}
}
