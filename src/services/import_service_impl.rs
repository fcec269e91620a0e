//! Provider-backed implementation of the `ImportService` trait.

use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

use crate::clients::{ExternalCandidate, MetadataProvider};
use crate::db::{Store, UniqueWrite};
use crate::domain::validation::{FieldError, codes};
use crate::domain::{UserId, timestamp};
use crate::services::import_service::{ImportError, ImportOutcome, ImportService, metadata_record};

fn record_outcome(outcome: &'static str) {
    metrics::counter!("movie_imports_total", "outcome" => outcome).increment(1);
}

pub struct DefaultImportService {
    store: Arc<Store>,
    provider: Arc<dyn MetadataProvider>,
}

impl DefaultImportService {
    #[must_use]
    pub fn new(store: Arc<Store>, provider: Arc<dyn MetadataProvider>) -> Self {
        Self { store, provider }
    }
}

#[async_trait::async_trait]
impl ImportService for DefaultImportService {
    async fn import_external(
        &self,
        owner: UserId,
        external_id: &str,
        watched: bool,
        favorite: bool,
    ) -> Result<ImportOutcome, ImportError> {
        let external_id = external_id.trim();
        if external_id.is_empty() {
            return Err(ImportError::Validation(vec![FieldError::new(
                "external_id",
                codes::REQUIRED,
                "External id is required",
            )]));
        }

        let repo = self.store.movie_repo();

        if let Some(existing) = repo.find_by_external(owner, external_id).await? {
            record_outcome("existing");
            return Ok(ImportOutcome {
                movie: existing,
                created: false,
            });
        }

        let metadata = self
            .provider
            .lookup(external_id)
            .await
            .map_err(|e| {
                record_outcome("provider_error");
                ImportError::External(format!("{e:#}"))
            })?
            .ok_or_else(|| {
                record_outcome("not_found");
                ImportError::NotFound(external_id.to_string())
            })?;

        let now = Utc::now();
        let mut record = metadata_record(&metadata, watched, favorite, now);
        // The row is keyed by the id the caller asked for, not the provider's form of it.
        record.external_id = Some(external_id.to_string());

        match repo.insert_unique(owner, &record, &timestamp(now)).await? {
            UniqueWrite::Written(movie) => {
                record_outcome("created");
                info!(movie_id = %movie.id, owner_id = %owner, external_id, "Imported movie");
                Ok(ImportOutcome {
                    movie,
                    created: true,
                })
            }
            UniqueWrite::Duplicate => {
                warn!(owner_id = %owner, external_id, "Lost import race, returning winner");

                let winner = repo
                    .find_by_external(owner, external_id)
                    .await?
                    .ok_or_else(|| {
                        ImportError::Database(format!(
                            "import of {external_id} hit the unique index but no row was found"
                        ))
                    })?;

                record_outcome("raced");
                Ok(ImportOutcome {
                    movie: winner,
                    created: false,
                })
            }
        }
    }

    async fn search(&self, query: &str) -> Result<Vec<ExternalCandidate>, ImportError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        self.provider
            .search(query)
            .await
            .map_err(|e| ImportError::External(format!("{e:#}")))
    }
}
