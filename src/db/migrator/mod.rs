//! Schema evolution.
//!
//! Units are applied in lexicographic order of their names on every start.
//! There is no ledger: a unit that fails because its structure is already in
//! place counts as applied, any other failure aborts the run. Columns that
//! SQLite cannot add conditionally are handled as [`ColumnRequirement`]s after
//! the units.

use sea_orm::DatabaseConnection;
use sea_orm_migration::prelude::*;
use thiserror::Error;
use tracing::{debug, info};

use super::failure::FailureKind;

mod m20240101_000001_create_movies;
mod m20240102_000002_add_last_watched_at;
mod m20240102_000003_add_poster_url;
mod m20240110_000004_index_last_watched;
mod m20250301_000005_create_users;
mod m20250301_000006_add_movie_owner;
mod m20250302_000007_unique_nickname;
mod m20250310_000008_scope_external_id;
mod m20250312_000009_index_movie_owner;

pub use m20250310_000008_scope_external_id::{LEGACY_INDEX, SCOPED_INDEX};

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("migration {unit} failed ({kind}): {source}")]
    Unit {
        unit: String,
        kind: FailureKind,
        #[source]
        source: DbErr,
    },

    #[error("failed to inspect or add column {table}.{column}: {source}")]
    Column {
        table: &'static str,
        column: &'static str,
        #[source]
        source: DbErr,
    },
}

/// What a single run did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    /// Units whose `up` completed. Units written with `IF NOT EXISTS` land
    /// here on every run, so this is not a list of changes.
    pub ran: Vec<String>,

    /// Units whose structure was already present.
    pub skipped: Vec<String>,

    /// `table.column` entries added by column requirements.
    pub columns_added: Vec<String>,
}

/// A column that must exist, added only when the live table lacks it.
pub struct ColumnRequirement {
    pub table: &'static str,
    pub column: &'static str,
    pub definition: fn() -> ColumnDef,
}

pub struct Migrator;

impl Migrator {
    #[must_use]
    pub fn units() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_movies::Migration),
            Box::new(m20240102_000002_add_last_watched_at::Migration),
            Box::new(m20240102_000003_add_poster_url::Migration),
            Box::new(m20240110_000004_index_last_watched::Migration),
            Box::new(m20250301_000005_create_users::Migration),
            Box::new(m20250301_000006_add_movie_owner::Migration),
            Box::new(m20250302_000007_unique_nickname::Migration),
            Box::new(m20250310_000008_scope_external_id::Migration),
            Box::new(m20250312_000009_index_movie_owner::Migration),
        ]
    }

    #[must_use]
    pub fn required_columns() -> Vec<ColumnRequirement> {
        vec![ColumnRequirement {
            table: "movies",
            column: "favorite",
            definition: || {
                ColumnDef::new(Alias::new("favorite"))
                    .boolean()
                    .not_null()
                    .default(false)
                    .to_owned()
            },
        }]
    }
}

/// Brings the schema up to date with the built-in units.
pub async fn run(conn: &DatabaseConnection) -> Result<MigrationReport, MigrationError> {
    run_with(conn, Migrator::units(), &Migrator::required_columns()).await
}

pub async fn run_with(
    conn: &DatabaseConnection,
    mut units: Vec<Box<dyn MigrationTrait>>,
    columns: &[ColumnRequirement],
) -> Result<MigrationReport, MigrationError> {
    units.sort_by(|a, b| a.name().cmp(b.name()));

    let manager = SchemaManager::new(conn);
    let mut report = MigrationReport::default();

    for unit in &units {
        let name = unit.name().to_string();

        match unit.up(&manager).await {
            Ok(()) => {
                debug!(unit = %name, "Migration ran");
                report.ran.push(name);
            }
            Err(err) => {
                let kind = FailureKind::classify(&err);
                if !kind.is_structure_present() {
                    return Err(MigrationError::Unit {
                        unit: name,
                        kind,
                        source: err,
                    });
                }

                info!(unit = %name, reason = %kind, "Migration already applied, skipping");
                report.skipped.push(name);
            }
        }
    }

    for requirement in columns {
        if ensure_column(&manager, requirement).await? {
            report
                .columns_added
                .push(format!("{}.{}", requirement.table, requirement.column));
        }
    }

    info!(
        ran = report.ran.len(),
        skipped = report.skipped.len(),
        columns_added = report.columns_added.len(),
        "Migrations complete"
    );

    Ok(report)
}

/// Returns `true` when the column had to be added.
async fn ensure_column(
    manager: &SchemaManager<'_>,
    requirement: &ColumnRequirement,
) -> Result<bool, MigrationError> {
    let column_error = |source| MigrationError::Column {
        table: requirement.table,
        column: requirement.column,
        source,
    };

    let present = manager
        .has_column(requirement.table, requirement.column)
        .await
        .map_err(column_error)?;

    if present {
        debug!(
            table = requirement.table,
            column = requirement.column,
            "Column already present"
        );
        return Ok(false);
    }

    let mut definition = (requirement.definition)();
    manager
        .alter_table(
            Table::alter()
                .table(Alias::new(requirement.table))
                .add_column(&mut definition)
                .to_owned(),
        )
        .await
        .map_err(column_error)?;

    info!(
        table = requirement.table,
        column = requirement.column,
        "Added missing column"
    );

    Ok(true)
}
