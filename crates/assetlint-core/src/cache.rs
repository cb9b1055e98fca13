//! Populate-once cache in front of a rate-limited [`RecordSource`].
//!
//! The first caller fetches; callers arriving while that fetch is in flight
//! wait for it and share its result. A failed fetch leaves the cache empty,
//! so a later caller fetches again. The cache lives as long as its owner.

use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::error::RemoteError;
use crate::metrics::METRICS;
use crate::remote::RecordSource;

pub struct CachedSource<T> {
    source: Arc<dyn RecordSource<T>>,
    cell: OnceCell<Arc<Vec<T>>>,
}

impl<T: Send + Sync + 'static> CachedSource<T> {
    pub fn new(source: Arc<dyn RecordSource<T>>) -> Self {
        Self {
            source,
            cell: OnceCell::new(),
        }
    }

    /// The cached records, fetching them on first use.
    pub async fn get(&self) -> Result<Arc<Vec<T>>, RemoteError> {
        let records = self
            .cell
            .get_or_try_init(|| async {
                let records = self.source.fetch().await?;
                METRICS.inc_remote_fetches();
                debug!(count = records.len(), "populated remote record cache");
                Ok::<_, RemoteError>(Arc::new(records))
            })
            .await?;
        Ok(Arc::clone(records))
    }

    pub fn is_populated(&self) -> bool {
        self.cell.initialized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct CountingSource {
        calls: AtomicUsize,
        fail_first: bool,
    }

    #[async_trait]
    impl RecordSource<String> for CountingSource {
        async fn fetch(&self) -> Result<Vec<String>, RemoteError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            if self.fail_first && call == 0 {
                return Err(RemoteError::Http {
                    url: "test".to_string(),
                    message: "503".to_string(),
                });
            }
            Ok(vec!["BNB".to_string(), "ONE-5F9".to_string()])
        }
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_fetch() {
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
            fail_first: false,
        });
        let cache = Arc::new(CachedSource::new(source.clone() as Arc<dyn RecordSource<String>>));

        let a = tokio::spawn({
            let cache = cache.clone();
            async move { cache.get().await }
        });
        let b = tokio::spawn({
            let cache = cache.clone();
            async move { cache.get().await }
        });
        let (a, b) = (a.await.unwrap().unwrap(), b.await.unwrap().unwrap());

        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert_eq!(a, b);
        assert!(cache.is_populated());

        cache.get().await.unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_cached() {
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
            fail_first: true,
        });
        let cache = CachedSource::new(source.clone() as Arc<dyn RecordSource<String>>);

        assert!(cache.get().await.is_err());
        assert!(!cache.is_populated());
        assert_eq!(cache.get().await.unwrap().len(), 2);
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }
}
