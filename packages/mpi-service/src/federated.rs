use std::collections::HashSet;

use futures::future;

use mpi_domain::predicate::Predicate;

use crate::{BoxFuture, Result, SearchIndex};

pub struct IndexQuery<'a, D> {
	pub name: &'static str,
	pub index: &'a dyn SearchIndex<D>,
	pub predicate: Predicate,
	pub owner: fn(&D) -> i64,
}

pub trait OwnerSource
where
	Self: Send + Sync,
{
	fn name(&self) -> &'static str;

	/// Owner of every hit in `[offset, offset + limit)`, in relevance order.
	fn owners(&self, offset: usize, limit: usize) -> BoxFuture<'_, Result<Vec<i64>>>;

	fn count(&self) -> BoxFuture<'_, Result<u64>>;
}

impl<D> OwnerSource for IndexQuery<'_, D>
where
	D: Send + Sync,
{
	fn name(&self) -> &'static str {
		self.name
	}

	fn owners(&self, offset: usize, limit: usize) -> BoxFuture<'_, Result<Vec<i64>>> {
		Box::pin(async move {
			let hits = self.index.search(&self.predicate, offset, limit).await?;

			Ok(hits.iter().map(|hit| (self.owner)(&hit.document)).collect())
		})
	}

	fn count(&self) -> BoxFuture<'_, Result<u64>> {
		self.index.count(&self.predicate)
	}
}

/// First `needed` distinct owners across `sources`.
///
/// First pages are requested concurrently; a source is paged further only while its owners are
/// still needed.
pub async fn merge_owners(
	sources: &[&dyn OwnerSource],
	needed: usize,
	page_size: usize,
) -> Result<Vec<i64>> {
	if needed == 0 || sources.is_empty() {
		return Ok(Vec::new());
	}

	let page_size = page_size.max(1);
	let first_pages =
		future::try_join_all(sources.iter().map(|source| source.owners(0, page_size))).await?;
	let mut merged = Vec::new();
	let mut seen = HashSet::new();

	for (source, first_page) in sources.iter().zip(first_pages) {
		let mut page = first_page;
		let mut offset = 0;

		loop {
			let exhausted = page.len() < page_size;

			for owner in page {
				if seen.insert(owner) {
					merged.push(owner);
				}
				if merged.len() >= needed {
					return Ok(merged);
				}
			}

			if exhausted {
				break;
			}

			offset += page_size;

			tracing::debug!(source = source.name(), offset, "Fetching next index page.");

			page = source.owners(offset, page_size).await?;
		}
	}

	Ok(merged)
}

pub async fn count_owners(sources: &[&dyn OwnerSource]) -> Result<u64> {
	let counts = future::try_join_all(sources.iter().map(|source| source.count())).await?;
	let pages = future::try_join_all(
		sources
			.iter()
			.zip(&counts)
			.filter(|(_, count)| **count > 0)
			.map(|(source, count)| source.owners(0, usize::try_from(*count).unwrap_or(usize::MAX))),
	)
	.await?;
	let owners: HashSet<i64> = pages.into_iter().flatten().collect();

	Ok(owners.len() as u64)
}
