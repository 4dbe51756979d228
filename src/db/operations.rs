use chrono::{DateTime, Utc};
use sqlx::PgConnection;

pub struct DatabaseOperations;

impl DatabaseOperations {
    pub async fn current_time(conn: &mut PgConnection) -> Result<DateTime<Utc>, sqlx::Error> {
        sqlx::query_scalar::<_, DateTime<Utc>>("SELECT NOW() AS current_time")
            .fetch_one(conn)
            .await
    }
}
