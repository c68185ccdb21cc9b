//! Running synchronous store calls from async tasks.

use kline_store::WindowStore;
use std::sync::Arc;

use crate::Result;

/// A store shared between pipeline tasks.
pub type SharedStore = Arc<dyn WindowStore>;

/// Runs `op` against `store` on the blocking pool and waits for it.
pub(crate) async fn with_store<T, F>(store: &SharedStore, op: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&dyn WindowStore) -> kline_store::Result<T> + Send + 'static,
{
    let store = Arc::clone(store);
    let value = tokio::task::spawn_blocking(move || op(store.as_ref())).await??;
    Ok(value)
}
