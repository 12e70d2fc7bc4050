use async_trait::async_trait;

/// Durable client-local key/value storage for small JSON records.
#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    async fn init(&self) -> anyhow::Result<()>;
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;
    async fn remove(&self, key: &str) -> anyhow::Result<()>;
}
