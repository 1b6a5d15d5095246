use crate::error::PaygateError;
use async_trait::async_trait;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

/// Records which transaction hashes have already unlocked a request.
///
/// Entries only leave the store when their TTL ends, so memory grows with
/// consumption rate times TTL.
#[async_trait]
pub trait ReceiptStore: Send + Sync {
    /// Marks `transaction_hash` as spent. Returns `true` only for the first
    /// caller inside the retention window.
    async fn consume(&self, transaction_hash: &str) -> Result<bool, PaygateError>;
}

/// Single-use receipt ledger: Redis when reachable, in-process cache otherwise.
pub struct CacheReceiptStore {
    redis: Option<redis::aio::ConnectionManager>,
    memory: Arc<Cache<String, ()>>,
    ttl: Duration,
}

impl CacheReceiptStore {
    pub async fn new(redis_url: Option<&str>, ttl: Duration) -> Self {
        let redis = match redis_url {
            Some(url) => match redis::Client::open(url) {
                Ok(client) => match client.get_connection_manager().await {
                    Ok(conn) => {
                        tracing::info!("Redis connected, receipts are shared across instances");
                        Some(conn)
                    }
                    Err(e) => {
                        tracing::warn!("Redis connection failed: {}, using memory receipts only", e);
                        None
                    }
                },
                Err(e) => {
                    tracing::warn!("Redis client creation failed: {}, using memory receipts only", e);
                    None
                }
            },
            None => None,
        };

        Self {
            redis,
            memory: Arc::new(Self::memory_cache(ttl)),
            ttl,
        }
    }

    pub fn in_memory(ttl: Duration) -> Self {
        Self {
            redis: None,
            memory: Arc::new(Self::memory_cache(ttl)),
            ttl,
        }
    }

    // No size bound: evicting a live entry would let its hash replay.
    fn memory_cache(ttl: Duration) -> Cache<String, ()> {
        Cache::builder().time_to_live(ttl).build()
    }

    fn key(transaction_hash: &str) -> String {
        format!("paygate:receipt:{}", transaction_hash.to_lowercase())
    }
}

#[async_trait]
impl ReceiptStore for CacheReceiptStore {
    async fn consume(&self, transaction_hash: &str) -> Result<bool, PaygateError> {
        let key = Self::key(transaction_hash);

        if let Some(mut redis) = self.redis.clone() {
            // SET NX replies OK only for the first writer.
            let reply: Option<String> = redis::cmd("SET")
                .arg(&key)
                .arg(1)
                .arg("NX")
                .arg("EX")
                .arg(self.ttl.as_secs().max(1))
                .query_async(&mut redis)
                .await
                .map_err(|e| PaygateError::Store(e.to_string()))?;
            return Ok(reply.is_some());
        }

        let entry = self.memory.entry(key).or_insert(()).await;
        Ok(entry.is_fresh())
    }
}
