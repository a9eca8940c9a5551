pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Storage error during {operation}: {message}")]
	Storage { operation: &'static str, message: String },
	#[error("Index error in {index} index: {message}")]
	Index { index: &'static str, message: String },
	#[error("Integrity error: {message}")]
	Integrity { message: String },
}
impl Error {
	pub fn storage(operation: &'static str, err: mpi_storage::Error) -> Self {
		match err {
			mpi_storage::Error::Sqlx(inner) => Self::Storage { operation, message: inner.to_string() },
			mpi_storage::Error::InvalidArgument(message) => Self::InvalidRequest { message },
			mpi_storage::Error::NotFound(message) => Self::NotFound { message },
		}
	}

	pub fn index(index: &'static str, err: mpi_storage::Error) -> Self {
		Self::Index { index, message: err.to_string() }
	}
}
