use crate::identifier::{phrase_key, split_alternatives};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextMode {
	Exact,
	Start,
	Anywhere,
	/// Equality after dropping punctuation, whitespace and case.
	Phrase,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextPredicate {
	pub field: &'static str,
	pub mode: TextMode,
	/// Matches when any value matches.
	pub values: Vec<String>,
	pub boost: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoolPredicate {
	pub must: Vec<Predicate>,
	pub should: Vec<Predicate>,
	pub filter: Vec<Predicate>,
	pub minimum_should_match: usize,
}
impl BoolPredicate {
	pub fn must(mut self, predicate: Predicate) -> Self {
		self.must.push(predicate);

		self
	}

	pub fn should(mut self, predicate: Predicate) -> Self {
		self.should.push(predicate);

		self
	}

	pub fn filter(mut self, predicate: Predicate) -> Self {
		self.filter.push(predicate);

		self
	}

	pub fn minimum_should_match(mut self, count: usize) -> Self {
		self.minimum_should_match = count;

		self
	}

	pub fn build(self) -> Predicate {
		Predicate::Bool(self)
	}
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
	Bool(BoolPredicate),
	Text(TextPredicate),
	Flag { field: &'static str, value: bool },
	Terms { field: &'static str, values: Vec<i64> },
}
impl Predicate {
	pub fn bool() -> BoolPredicate {
		BoolPredicate::default()
	}

	pub fn text(field: &'static str, mode: TextMode, value: impl Into<String>, boost: f32) -> Self {
		Self::Text(TextPredicate { field, mode, values: vec![value.into()], boost })
	}

	/// Text clause over the alternatives of a `|`-joined token string.
	pub fn any_text(field: &'static str, mode: TextMode, joined: &str, boost: f32) -> Self {
		let values = split_alternatives(joined).map(ToString::to_string).collect();

		Self::Text(TextPredicate { field, mode, values, boost })
	}

	pub fn flag(field: &'static str, value: bool) -> Self {
		Self::Flag { field, value }
	}

	pub fn terms(field: &'static str, values: Vec<i64>) -> Self {
		Self::Terms { field, values }
	}

	/// Returns the relevance score when `doc` matches, `None` otherwise.
	pub fn score<D>(&self, doc: &D) -> Option<f32>
	where
		D: Document + ?Sized,
	{
		match self {
			Self::Bool(inner) => score_bool(inner, doc),
			Self::Text(inner) => {
				let value = doc.text(inner.field)?;

				text_matches(value, inner.mode, &inner.values).then_some(inner.boost)
			},
			Self::Flag { field, value } => (doc.flag(field)? == *value).then_some(0.0),
			Self::Terms { field, values } => values.contains(&doc.number(field)?).then_some(0.0),
		}
	}

	pub fn matches<D>(&self, doc: &D) -> bool
	where
		D: Document + ?Sized,
	{
		self.score(doc).is_some()
	}
}

/// Field access used by in-process predicate evaluation.
pub trait Document {
	/// Stable id, used as the relevance tie breaker.
	fn id(&self) -> i64;

	fn text(&self, field: &str) -> Option<&str>;

	fn flag(&self, field: &str) -> Option<bool>;

	fn number(&self, field: &str) -> Option<i64>;
}

pub fn text_matches(value: &str, mode: TextMode, alternatives: &[String]) -> bool {
	let lowered = value.to_lowercase();
	let phrase = match mode {
		TextMode::Phrase => phrase_key(value),
		_ => String::new(),
	};

	alternatives.iter().any(|alternative| match mode {
		TextMode::Exact => lowered == alternative.to_lowercase(),
		TextMode::Start => lowered.starts_with(&alternative.to_lowercase()),
		TextMode::Anywhere => lowered.contains(&alternative.to_lowercase()),
		TextMode::Phrase => {
			let key = phrase_key(alternative);

			!key.is_empty() && phrase == key
		},
	})
}

fn score_bool<D>(predicate: &BoolPredicate, doc: &D) -> Option<f32>
where
	D: Document + ?Sized,
{
	let mut score = 0.0;

	for clause in &predicate.filter {
		clause.score(doc)?;
	}
	for clause in &predicate.must {
		score += clause.score(doc)?;
	}

	let mut matched = 0;

	for clause in &predicate.should {
		if let Some(clause_score) = clause.score(doc) {
			matched += 1;
			score += clause_score;
		}
	}

	(matched >= predicate.minimum_should_match).then_some(score)
}
