use anyhow::Result;
use futures_util::StreamExt;
use moka::Expiry;
use moka::future::Cache;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Revoked-token cache keyed by jti. The value is the token's expiry as a
/// unix timestamp; each entry lives exactly until its token would have
/// expired anyway, so the set never grows past one token lifetime.
static TOKEN_BLACKLIST: Lazy<Cache<String, u64>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(500_000)
        .expire_after(TokenExpiry)
        .build()
});

struct TokenExpiry;

impl Expiry<String, u64> for TokenExpiry {
    fn expire_after_create(&self, _jti: &String, exp: &u64, _created_at: Instant) -> Option<Duration> {
        Some(Duration::from_secs(exp.saturating_sub(unix_now())))
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Revoke a token in memory and persist the revocation so restarts keep it.
pub async fn revoke(pool: &MySqlPool, jti: &str, exp: usize) {
    TOKEN_BLACKLIST.insert(jti.to_string(), exp as u64).await;

    let result = sqlx::query(
        r#"
        INSERT INTO revoked_tokens (jti, expires_at)
        VALUES (?, FROM_UNIXTIME(?))
        ON DUPLICATE KEY UPDATE expires_at = expires_at
        "#,
    )
    .bind(jti)
    .bind(exp as i64)
    .execute(pool)
    .await;

    if let Err(e) = result {
        // The in-memory entry still blocks the token for this process.
        tracing::error!(error = %e, jti, "Failed to persist token revocation");
    }
}

pub async fn is_revoked(jti: &str) -> bool {
    TOKEN_BLACKLIST.get(jti).await.is_some()
}

async fn batch_insert(entries: &[(String, u64)]) {
    let futures: Vec<_> = entries
        .iter()
        .map(|(jti, exp)| TOKEN_BLACKLIST.insert(jti.clone(), *exp))
        .collect();

    futures::future::join_all(futures).await;
}

/// Load still-live revocations from the database into the cache (batched).
pub async fn warmup_blacklist(pool: &MySqlPool, batch_size: usize) -> Result<()> {
    let mut stream = sqlx::query_as::<_, (String, i64)>(
        r#"
        SELECT jti, UNIX_TIMESTAMP(expires_at)
        FROM revoked_tokens
        WHERE expires_at > NOW()
        "#,
    )
    .fetch(pool);

    let mut batch = Vec::with_capacity(batch_size);
    let mut total_count = 0usize;

    while let Some(row) = stream.next().await {
        let (jti, exp) = row?;
        batch.push((jti, exp.max(0) as u64));
        total_count += 1;

        if batch.len() >= batch_size {
            batch_insert(&batch).await;
            batch.clear();
        }
    }

    if !batch.is_empty() {
        batch_insert(&batch).await;
    }

    tracing::info!(total_count, "Token blacklist warmup complete");

    Ok(())
}
