use std::sync::Arc;

use mpi_domain::settings::SearchSettings;
use mpi_service::MpiService;
use mpi_storage::{db::Db, queries};

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<MpiService>,
}
impl AppState {
	/// Connects to PostgreSQL, bootstraps the schema and resolves search settings from the
	/// config file overlaid with global properties.
	pub async fn new(config: mpi_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema().await?;

		let properties = queries::load_global_properties(&db.pool).await?;
		let settings = SearchSettings::resolve(&config.search, &properties);

		tracing::info!(
			min_search_characters = settings.min_search_characters,
			max_results = settings.max_results,
			identifier_match_mode = settings.identifier_match_mode.as_str(),
			name_match_mode = settings.name_match_mode.as_str(),
			"Search settings resolved."
		);

		Ok(Self::from_service(MpiService::postgres(settings, db)))
	}

	pub fn from_service(service: MpiService) -> Self {
		Self { service: Arc::new(service) }
	}
}
