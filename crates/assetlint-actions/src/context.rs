//! Shared state handed to every action.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;

use assetlint_core::{
    BakingBadBaker, BakingBadBakers, BinanceAssetInfo, BinanceAssetInfoList, BinanceToken,
    BinanceTokenList, ChainRegistry, HttpClient, ImageFetcher, RecordSource, RemoteConfig,
    RemoteError, Repo,
};
use assetlint_engine::StepError;

/// Default number of per-asset tasks one step keeps in flight.
pub const DEFAULT_FAN_OUT: usize = 4;

/// Remote collaborators used by the actions.
#[derive(Clone)]
pub struct RemoteSources {
    pub binance_tokens: Arc<dyn RecordSource<BinanceToken>>,
    pub binance_asset_infos: Arc<dyn RecordSource<BinanceAssetInfo>>,
    pub tezos_bakers: Arc<dyn RecordSource<BakingBadBaker>>,
    pub images: Arc<dyn ImageFetcher>,
}

impl RemoteSources {
    /// HTTP-backed sources sharing one client.
    pub fn http(config: &RemoteConfig) -> Result<Self, RemoteError> {
        let http = Arc::new(HttpClient::new(config)?);
        Ok(Self {
            binance_tokens: Arc::new(BinanceTokenList::new(http.clone(), config)),
            binance_asset_infos: Arc::new(BinanceAssetInfoList::new(http.clone(), config)),
            tezos_bakers: Arc::new(BakingBadBakers::new(http.clone(), config)),
            images: http,
        })
    }
}

pub struct ActionContext {
    pub repo: Repo,
    pub registry: ChainRegistry,
    pub remote: RemoteSources,
    pub fan_out: usize,
}

impl ActionContext {
    pub fn new(repo: Repo, registry: ChainRegistry, remote: RemoteSources) -> Self {
        Self {
            repo,
            registry,
            remote,
            fan_out: DEFAULT_FAN_OUT,
        }
    }

    pub fn with_fan_out(mut self, fan_out: usize) -> Self {
        self.fan_out = fan_out.max(1);
        self
    }

    /// Run `task` for every item with at most `fan_out` in flight.
    ///
    /// Outputs come back in input order. The first error in that order wins
    /// and the tasks not yet collected are aborted.
    pub async fn fan_out<T, F, Fut>(&self, items: Vec<String>, task: F) -> Result<Vec<T>, StepError>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = Result<T, StepError>> + Send + 'static,
        T: Send + 'static,
    {
        let limit = Arc::new(Semaphore::new(self.fan_out.max(1)));
        let handles: Vec<_> = items
            .into_iter()
            .map(|item| {
                let limit = Arc::clone(&limit);
                let fut = task(item);
                tokio::spawn(async move {
                    let _permit = limit.acquire_owned().await.ok();
                    fut.await
                })
            })
            .collect();

        let mut outputs = Vec::with_capacity(handles.len());
        let mut pending = handles.into_iter();
        while let Some(handle) = pending.next() {
            let output = handle
                .await
                .map_err(|e| StepError::fault(format!("asset task failed: {e}")))
                .and_then(|output| output);
            match output {
                Ok(output) => outputs.push(output),
                Err(err) => {
                    pending.for_each(|rest| rest.abort());
                    return Err(err);
                }
            }
        }
        Ok(outputs)
    }
}
