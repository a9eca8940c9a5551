use std::sync::RwLock;

use mpi_domain::{
	documents::{Scored, relevance_order},
	predicate::{Document, Predicate},
};

use crate::{BoxFuture, Result, SearchIndex};

pub struct MemoryIndex<D> {
	documents: RwLock<Vec<D>>,
}
impl<D> MemoryIndex<D>
where
	D: Document + Clone,
{
	pub fn new(documents: Vec<D>) -> Self {
		Self { documents: RwLock::new(documents) }
	}

	pub fn insert(&self, document: D) {
		self.documents.write().unwrap_or_else(|err| err.into_inner()).push(document);
	}

	pub fn len(&self) -> usize {
		self.documents.read().unwrap_or_else(|err| err.into_inner()).len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	fn matching(&self, predicate: &Predicate) -> Vec<Scored<D>> {
		let documents = self.documents.read().unwrap_or_else(|err| err.into_inner());
		let mut hits: Vec<Scored<D>> = documents
			.iter()
			.filter_map(|document| {
				predicate.score(document).map(|score| Scored { document: document.clone(), score })
			})
			.collect();

		hits.sort_by(relevance_order);

		hits
	}
}
impl<D> Default for MemoryIndex<D> {
	fn default() -> Self {
		Self { documents: RwLock::new(Vec::new()) }
	}
}

impl<D> SearchIndex<D> for MemoryIndex<D>
where
	D: Document + Clone + Send + Sync,
{
	fn search<'a>(
		&'a self,
		predicate: &'a Predicate,
		offset: usize,
		limit: usize,
	) -> BoxFuture<'a, Result<Vec<Scored<D>>>> {
		let page: Vec<Scored<D>> =
			self.matching(predicate).into_iter().skip(offset).take(limit).collect();

		Box::pin(async move { Ok(page) })
	}

	fn count<'a>(&'a self, predicate: &'a Predicate) -> BoxFuture<'a, Result<u64>> {
		let count = self.matching(predicate).len() as u64;

		Box::pin(async move { Ok(count) })
	}
}
