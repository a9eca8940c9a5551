use std::cmp::Ordering;

use time::OffsetDateTime;

/// Member of an identity-owned collection (names, identifiers, attributes).
pub trait CollectionMember {
	fn member_id(&self) -> i64;

	fn voided(&self) -> bool;

	fn preferred(&self) -> bool {
		false
	}

	fn date_created(&self) -> OffsetDateTime;
}

/// Voided last, preferred first, newest first, then highest id.
pub fn collection_order<T>(a: &T, b: &T) -> Ordering
where
	T: CollectionMember,
{
	a.voided()
		.cmp(&b.voided())
		.then_with(|| b.preferred().cmp(&a.preferred()))
		.then_with(|| b.date_created().cmp(&a.date_created()))
		.then_with(|| b.member_id().cmp(&a.member_id()))
}

pub fn sort_collection<T>(items: &mut [T])
where
	T: CollectionMember,
{
	items.sort_by(collection_order);
}
