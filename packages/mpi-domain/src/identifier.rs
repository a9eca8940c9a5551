use crate::settings::SearchSettings;

pub const SEARCH_PLACEHOLDER: &str = "@SEARCH@";
pub const SEARCH_MINUS_ONE_PLACEHOLDER: &str = "@SEARCH-1@";
pub const CHECK_DIGIT_PLACEHOLDER: &str = "@CHECKDIGIT@";
/// Joins tokens into one disjunctive match string.
pub const TOKEN_SEPARATOR: &str = " | ";

pub fn normalize(raw: &str, settings: &SearchSettings) -> Vec<String> {
	let query = remove_padding(raw, settings.identifier_regex.as_deref());

	tokenize(&query, settings.identifier_search_pattern.as_deref())
}

/// Returns the padding character declared by an identifier regex shaped like `^0*...`.
pub fn padding_char(identifier_regex: &str) -> Option<char> {
	let mut chars = identifier_regex.chars();

	if chars.next()? != '^' {
		return None;
	}

	let padding = chars.next()?;

	if padding == '\n' || chars.next()? != '*' {
		return None;
	}

	Some(padding)
}

pub fn remove_padding(query: &str, identifier_regex: Option<&str>) -> String {
	match identifier_regex.and_then(padding_char) {
		Some(padding) => query.trim_start_matches(padding).to_string(),
		None => query.to_string(),
	}
}

pub fn tokenize(query: &str, search_pattern: Option<&str>) -> Vec<String> {
	let Some(pattern) = search_pattern.filter(|pattern| !pattern.trim().is_empty()) else {
		return vec![query.to_string()];
	};

	pattern.split(',').map(|template| expand_template(template.trim(), query)).collect()
}

pub fn join_tokens(tokens: &[String]) -> String {
	tokens.join(TOKEN_SEPARATOR)
}

pub fn split_alternatives(query: &str) -> impl Iterator<Item = &str> {
	query.split('|').map(str::trim).filter(|alternative| !alternative.is_empty())
}

/// Case- and punctuation-insensitive form used by phrase matching.
pub fn phrase_key(value: &str) -> String {
	value.chars().filter(|c| c.is_alphanumeric()).flat_map(char::to_lowercase).collect()
}

fn expand_template(template: &str, query: &str) -> String {
	let char_count = query.chars().count();
	let (head, check_digit) = if char_count > 1 {
		let split = query.char_indices().last().map(|(idx, _)| idx).unwrap_or(0);

		(&query[..split], &query[split..])
	} else {
		("", "")
	};
	let placeholders = [
		(SEARCH_PLACEHOLDER, query),
		(SEARCH_MINUS_ONE_PLACEHOLDER, head),
		(CHECK_DIGIT_PLACEHOLDER, check_digit),
	];
	let mut out = String::with_capacity(template.len() + query.len());
	let mut rest = template;

	'scan: while !rest.is_empty() {
		for (placeholder, value) in placeholders {
			if let Some(tail) = rest.strip_prefix(placeholder) {
				out.push_str(value);

				rest = tail;

				continue 'scan;
			}
		}

		let mut chars = rest.chars();

		if let Some(c) = chars.next() {
			out.push(c);
		}

		rest = chars.as_str();
	}

	out
}
