pub mod documents;
pub mod identifier;
pub mod ordering;
pub mod paging;
pub mod predicate;
pub mod settings;
