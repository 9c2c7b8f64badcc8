//! Monotonic named counters.

use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, Set};

use crate::entities::counters;

/// Increments the counter `name` on `conn` and returns the new value.
///
/// The increment is a single `UPDATE`, so concurrent callers inside their
/// own transactions serialize on the counter row and never see the same
/// value. The first call creates the row.
pub(crate) async fn next_value<C: ConnectionTrait>(conn: &C, name: &str) -> Result<i64, DbErr> {
    counters::Entity::insert(counters::ActiveModel {
        name: Set(name.to_string()),
        value: Set(0),
    })
    .on_conflict(
        OnConflict::column(counters::Column::Name)
            .do_nothing()
            .to_owned(),
    )
    .exec_without_returning(conn)
    .await?;

    counters::Entity::update_many()
        .col_expr(
            counters::Column::Value,
            Expr::col(counters::Column::Value).add(1),
        )
        .filter(counters::Column::Name.eq(name))
        .exec(conn)
        .await?;

    counters::Entity::find_by_id(name.to_string())
        .one(conn)
        .await?
        .map(|row| row.value)
        .ok_or_else(|| DbErr::RecordNotFound(format!("counter {name}")))
}
