use sea_orm::{
    sea_query::{Expr, OnConflict},
    ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set,
};

use crate::error::{AppError, Result};
use crate::models::case_counter;
use crate::models::prelude::*;

pub fn format_case_number(year: i32, seq: i32) -> String {
    format!("CASE-{}-{:03}", year, seq)
}

/// Reserve the next case number for `year`.
///
/// The counter row is created on first use and bumped with an in-place
/// increment, so two transactions can never read the same sequence value.
pub async fn next_case_number<C: ConnectionTrait>(conn: &C, year: i32) -> Result<String> {
    let seed = case_counter::ActiveModel {
        year: Set(year),
        seq: Set(0),
    };
    CaseCounter::insert(seed)
        .on_conflict(
            OnConflict::column(case_counter::Column::Year)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;

    CaseCounter::update_many()
        .col_expr(
            case_counter::Column::Seq,
            Expr::col(case_counter::Column::Seq).add(1),
        )
        .filter(case_counter::Column::Year.eq(year))
        .exec(conn)
        .await?;

    let counter = CaseCounter::find_by_id(year)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::Internal(format!("Case counter for {} missing", year)))?;

    Ok(format_case_number(year, counter.seq))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_pads_to_three_digits() {
        assert_eq!(format_case_number(2026, 7), "CASE-2026-007");
        assert_eq!(format_case_number(2026, 1234), "CASE-2026-1234");
    }

    #[tokio::test]
    async fn test_counter_is_per_year() {
        let db = crate::test_helpers::create_test_db().await;

        assert_eq!(next_case_number(&db, 2026).await.unwrap(), "CASE-2026-001");
        assert_eq!(next_case_number(&db, 2026).await.unwrap(), "CASE-2026-002");
        assert_eq!(next_case_number(&db, 2027).await.unwrap(), "CASE-2027-001");
        assert_eq!(next_case_number(&db, 2026).await.unwrap(), "CASE-2026-003");
    }
}
