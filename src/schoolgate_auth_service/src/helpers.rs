use std::sync::Arc;

use color_eyre::eyre::{Result, WrapErr};
use redis::{Client, RedisResult};
use sqlx::{PgPool, postgres::PgPoolOptions};
use tokio::sync::RwLock;

/// Connect to PostgreSQL and bring the schema up to date.
pub async fn configure_postgresql(url: &str) -> Result<PgPool> {
    let pg_pool = get_postgres_pool(url)
        .await
        .wrap_err("Failed to create Postgres connection pool")?;

    sqlx::migrate!("./migrations")
        .run(&pg_pool)
        .await
        .wrap_err("Failed to run migrations")?;

    Ok(pg_pool)
}

/// Open a Redis connection shared by the stores that need one.
pub fn configure_redis(redis_host_name: &str) -> Result<Arc<RwLock<redis::Connection>>> {
    let conn = get_redis_client(redis_host_name)
        .wrap_err("Failed to get Redis client")?
        .get_connection()
        .wrap_err("Failed to get Redis connection")?;
    Ok(Arc::new(RwLock::new(conn)))
}

pub async fn get_postgres_pool(url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new().max_connections(5).connect(url).await
}

pub fn get_redis_client(redis_hostname: &str) -> RedisResult<Client> {
    let redis_url = format!("redis://{}/", redis_hostname);
    redis::Client::open(redis_url)
}
