use sqlx::PgPool;

pub async fn find_school_id(pool: &PgPool, name: &str) -> Result<Option<i64>, sqlx::Error> {
    let pattern = format!("%{}%", name);

    sqlx::query_scalar::<_, i64>(
        r#"
        select
            id
        from
            schools
        where
            full_name like $1 or short_name like $1
        limit 1
        "#,
    )
    .bind(&pattern)
    .fetch_optional(pool)
    .await
}
