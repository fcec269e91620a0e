use anyhow::Context;
use sea_orm::sea_query::{Expr, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::{debug, info};

use super::UniqueWrite;
use crate::db::failure::FailureKind;
use crate::domain::{MovieId, UserId};
use crate::entities::{movies, prelude::*};
use crate::models::{Movie, MovieFilter, MovieRecord};

/// Result of an owner-scoped read-modify-write.
#[derive(Debug)]
pub enum UpdateOutcome<E> {
    Updated(Movie),

    /// No row with that id belongs to the owner.
    NotFound,

    /// The planner refused the change; the row was left as it was.
    Rejected(E),
}

pub struct MovieRepository {
    conn: DatabaseConnection,
}

impl MovieRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn owned(owner: UserId) -> SimpleExpr {
        movies::Column::OwnerId.eq(owner.value())
    }

    fn active_model(owner: UserId, record: &MovieRecord, now: &str) -> movies::ActiveModel {
        movies::ActiveModel {
            owner_id: Set(Some(owner.value())),
            external_id: Set(record.external_id.clone()),
            title: Set(record.title.clone()),
            year: Set(record.year),
            genre: Set(record.genre.clone()),
            rating: Set(record.rating),
            comment: Set(record.comment.clone()),
            watched: Set(record.watched),
            favorite: Set(record.favorite),
            poster_url: Set(record.poster_url.clone()),
            created_at: Set(now.to_string()),
            updated_at: Set(now.to_string()),
            last_watched_at: Set(record.last_watched_at.clone()),
            ..Default::default()
        }
    }

    async fn try_insert(
        &self,
        owner: UserId,
        record: &MovieRecord,
        now: &str,
    ) -> Result<Movie, DbErr> {
        let model = Self::active_model(owner, record, now)
            .insert(&self.conn)
            .await?;
        Ok(Movie::from(model))
    }

    /// Insert that reports a `(owner_id, external_id)` collision instead of
    /// failing. Every other storage failure is still an error.
    pub async fn insert_unique(
        &self,
        owner: UserId,
        record: &MovieRecord,
        now: &str,
    ) -> anyhow::Result<UniqueWrite<Movie>> {
        match self.try_insert(owner, record, now).await {
            Ok(movie) => {
                debug!(movie_id = %movie.id, owner_id = %owner, "Inserted movie");
                Ok(UniqueWrite::Written(movie))
            }
            Err(err) if FailureKind::classify(&err) == FailureKind::UniqueViolation => {
                debug!(
                    owner_id = %owner,
                    external_id = ?record.external_id,
                    "Insert rejected by unique index"
                );
                Ok(UniqueWrite::Duplicate)
            }
            Err(err) => Err(err).context("Failed to insert movie"),
        }
    }

    pub async fn find_scoped(&self, owner: UserId, id: MovieId) -> anyhow::Result<Option<Movie>> {
        let model = Movies::find_by_id(id.value())
            .filter(Self::owned(owner))
            .one(&self.conn)
            .await
            .context("Failed to query movie")?;

        Ok(model.map(Movie::from))
    }

    pub async fn find_by_external(
        &self,
        owner: UserId,
        external_id: &str,
    ) -> anyhow::Result<Option<Movie>> {
        let model = Movies::find()
            .filter(Self::owned(owner))
            .filter(movies::Column::ExternalId.eq(external_id))
            .one(&self.conn)
            .await
            .context("Failed to query movie by external id")?;

        Ok(model.map(Movie::from))
    }

    /// Newest first.
    pub async fn list(&self, owner: UserId, filter: &MovieFilter) -> anyhow::Result<Vec<Movie>> {
        let mut query = Movies::find().filter(Self::owned(owner));

        if let Some(q) = filter.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(movies::Column::Title.contains(q))
                    .add(movies::Column::Genre.contains(q))
                    .add(Expr::cust_with_values(
                        "CAST(\"year\" AS TEXT) LIKE ?",
                        [format!("%{q}%")],
                    )),
            );
        }

        if let Some(watched) = filter.watched {
            query = query.filter(movies::Column::Watched.eq(watched));
        }

        if let Some(favorite) = filter.favorite {
            query = query.filter(movies::Column::Favorite.eq(favorite));
        }

        let rows = query
            .order_by_desc(movies::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list movies")?;

        Ok(rows.into_iter().map(Movie::from).collect())
    }

    pub async fn recent(&self, owner: UserId, limit: u64) -> anyhow::Result<Vec<Movie>> {
        let rows = Movies::find()
            .filter(Self::owned(owner))
            .filter(movies::Column::Watched.eq(true))
            .filter(movies::Column::LastWatchedAt.is_not_null())
            .order_by_desc(movies::Column::LastWatchedAt)
            .order_by_desc(movies::Column::Id)
            .limit(limit)
            .all(&self.conn)
            .await
            .context("Failed to list recently watched movies")?;

        Ok(rows.into_iter().map(Movie::from).collect())
    }

    pub async fn favorites(&self, owner: UserId, limit: u64) -> anyhow::Result<Vec<Movie>> {
        let rows = Movies::find()
            .filter(Self::owned(owner))
            .filter(movies::Column::Favorite.eq(true))
            .order_by_desc(movies::Column::UpdatedAt)
            .order_by_desc(movies::Column::Id)
            .limit(limit)
            .all(&self.conn)
            .await
            .context("Failed to list favorite movies")?;

        Ok(rows.into_iter().map(Movie::from).collect())
    }

    /// Loads the owner's row, lets `plan` derive the next state from it and
    /// writes that state, all inside one transaction.
    pub async fn update_scoped<E, F>(
        &self,
        owner: UserId,
        id: MovieId,
        now: &str,
        plan: F,
    ) -> anyhow::Result<UpdateOutcome<E>>
    where
        F: FnOnce(&Movie) -> Result<MovieRecord, E> + Send,
        E: Send,
    {
        let txn = self.conn.begin().await?;

        let Some(model) = Movies::find_by_id(id.value())
            .filter(Self::owned(owner))
            .one(&txn)
            .await
            .context("Failed to load movie for update")?
        else {
            return Ok(UpdateOutcome::NotFound);
        };

        let next = match plan(&Movie::from(model.clone())) {
            Ok(next) => next,
            Err(rejection) => return Ok(UpdateOutcome::Rejected(rejection)),
        };

        let mut active: movies::ActiveModel = model.into();
        active.title = Set(next.title);
        active.year = Set(next.year);
        active.genre = Set(next.genre);
        active.rating = Set(next.rating);
        active.comment = Set(next.comment);
        active.watched = Set(next.watched);
        active.favorite = Set(next.favorite);
        active.poster_url = Set(next.poster_url);
        active.last_watched_at = Set(next.last_watched_at);
        active.updated_at = Set(now.to_string());

        let updated = active
            .update(&txn)
            .await
            .context("Failed to update movie")?;

        txn.commit().await?;

        Ok(UpdateOutcome::Updated(Movie::from(updated)))
    }

    /// Touches only `favorite` and `updated_at`.
    pub async fn set_favorite(
        &self,
        owner: UserId,
        id: MovieId,
        favorite: bool,
        now: &str,
    ) -> anyhow::Result<Option<Movie>> {
        let result = Movies::update_many()
            .col_expr(movies::Column::Favorite, Expr::value(favorite))
            .col_expr(movies::Column::UpdatedAt, Expr::value(now))
            .filter(movies::Column::Id.eq(id.value()))
            .filter(Self::owned(owner))
            .exec(&self.conn)
            .await
            .context("Failed to update favorite flag")?;

        if result.rows_affected == 0 {
            return Ok(None);
        }

        self.find_scoped(owner, id).await
    }

    pub async fn delete_scoped(&self, owner: UserId, id: MovieId) -> anyhow::Result<bool> {
        let result = Movies::delete_many()
            .filter(movies::Column::Id.eq(id.value()))
            .filter(Self::owned(owner))
            .exec(&self.conn)
            .await
            .context("Failed to delete movie")?;

        let removed = result.rows_affected > 0;
        if removed {
            info!(movie_id = %id, owner_id = %owner, "Deleted movie");
        }
        Ok(removed)
    }

    /// Movies of every owner whose poster is missing or blank, oldest first.
    pub async fn missing_posters(&self) -> anyhow::Result<Vec<Movie>> {
        let rows = Movies::find()
            .filter(
                Condition::any()
                    .add(movies::Column::PosterUrl.is_null())
                    .add(movies::Column::PosterUrl.eq("")),
            )
            .order_by_asc(movies::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list movies without posters")?;

        Ok(rows.into_iter().map(Movie::from).collect())
    }

    /// Sets the poster and, when the row has none yet, the external id.
    pub async fn attach_poster(
        &self,
        id: MovieId,
        poster_url: &str,
        external_id: Option<&str>,
        now: &str,
    ) -> anyhow::Result<()> {
        let mut update = Movies::update_many()
            .col_expr(movies::Column::PosterUrl, Expr::value(poster_url))
            .col_expr(movies::Column::UpdatedAt, Expr::value(now));

        if let Some(external_id) = external_id {
            update = update.col_expr(
                movies::Column::ExternalId,
                Expr::cust_with_values("COALESCE(\"external_id\", ?)", [external_id]),
            );
        }

        update
            .filter(movies::Column::Id.eq(id.value()))
            .exec(&self.conn)
            .await
            .context("Failed to attach poster")?;

        Ok(())
    }
}
