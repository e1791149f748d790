use chrono::{DateTime, Utc};
use sqlx::{postgres::PgQueryResult, PgPool};
use uuid::Uuid;

use crate::domain::review::ReviewRecord;

pub async fn insert_review(
    pool: &PgPool,
    school_id: i64,
    review: &ReviewRecord,
    parsed_at: DateTime<Utc>,
) -> Result<PgQueryResult, sqlx::Error> {
    sqlx::query(
        r#"
        insert into reviews
            (id, school_id, published_at, sentiment, raw_text, parsed_at)
        values
            ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(school_id)
    .bind(review.date)
    .bind(review.rating.as_str())
    .bind(&review.text)
    .bind(parsed_at)
    .execute(pool)
    .await
}
