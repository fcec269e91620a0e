use std::sync::Arc;
use tracing::info;

use crate::clients::MetadataProvider;
use crate::clients::tmdb::TmdbClient;
use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AuthService, DefaultImportService, ImportService, MovieService, SeaOrmAuthService,
    SeaOrmMovieService, bootstrap,
};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Arc<Store>,

    pub metadata: Arc<dyn MetadataProvider>,

    pub movie_service: Arc<dyn MovieService>,

    pub import_service: Arc<dyn ImportService>,

    pub auth_service: Arc<dyn AuthService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let tmdb = TmdbClient::new(config.tmdb.clone())?;
        Self::with_metadata(config, Arc::new(tmdb)).await
    }

    /// Opens the store, runs migrations and the admin reconciler, then wires
    /// the services around `metadata`.
    pub async fn with_metadata(
        config: Config,
        metadata: Arc<dyn MetadataProvider>,
    ) -> anyhow::Result<Self> {
        let store = Arc::new(
            Store::with_pool_options(
                &config.general.database_path,
                config.general.max_db_connections,
                config.general.min_db_connections,
            )
            .await?,
        );

        let outcome = bootstrap::reconcile_admin(&store).await?;
        if let Some(user_id) = outcome.promoted {
            info!(
                user_id = %user_id,
                movies_adopted = outcome.movies_adopted,
                "Startup reconciliation promoted an admin"
            );
        }

        let movie_service: Arc<dyn MovieService> =
            Arc::new(SeaOrmMovieService::new(store.clone()));

        let import_service: Arc<dyn ImportService> =
            Arc::new(DefaultImportService::new(store.clone(), metadata.clone()));

        let auth_service: Arc<dyn AuthService> = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            config.security.clone(),
        ));

        Ok(Self {
            config: Arc::new(config),
            store,
            metadata,
            movie_service,
            import_service,
            auth_service,
        })
    }
}
