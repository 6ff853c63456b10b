//! Query functions over any `SeaORM` connection or transaction.
//!
//! Every function takes a [`ConnectionTrait`](sea_orm::ConnectionTrait) so
//! the same queries serve both the [`PgStore`](crate::PgStore) units of work
//! and ad-hoc tooling that holds a plain connection.

pub mod accounts;
pub mod invoices;
pub mod ledger;

use sea_orm::{DbErr, SqlErr};
use tally_core::StoreError;

/// Maps a database error onto the store taxonomy. Unique and foreign key
/// violations become [`StoreError::Constraint`].
pub fn map_db_err(err: DbErr) -> StoreError {
    if matches!(err, DbErr::RecordNotUpdated) {
        return StoreError::Constraint("updated row does not exist".to_string());
    }
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(msg) | SqlErr::ForeignKeyConstraintViolation(msg)) => {
            StoreError::Constraint(msg)
        }
        _ => StoreError::backend(err),
    }
}
