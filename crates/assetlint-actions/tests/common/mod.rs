#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use assetlint_actions::{ActionContext, RemoteSources};
use assetlint_core::repo;
use assetlint_core::{
    BakingBadBaker, BinanceAssetInfo, BinanceToken, ChainRegistry, ImageFetcher, RecordSource,
    RemoteError, Repo,
};
use async_trait::async_trait;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Remote fakes
// ---------------------------------------------------------------------------

/// Returns a fixed list after a short delay, counting calls.
pub struct StaticSource<T> {
    records: Vec<T>,
    pub calls: AtomicUsize,
}

impl<T> StaticSource<T> {
    pub fn new(records: Vec<T>) -> Arc<Self> {
        Arc::new(Self {
            records,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<T: Clone + Send + Sync> RecordSource<T> for StaticSource<T> {
    async fn fetch(&self) -> Result<Vec<T>, RemoteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(25)).await;
        Ok(self.records.clone())
    }
}

/// Always fails, as if the host could not be reached.
pub struct UnreachableSource;

#[async_trait]
impl<T: Send + Sync> RecordSource<T> for UnreachableSource {
    async fn fetch(&self) -> Result<Vec<T>, RemoteError> {
        Err(RemoteError::Unreachable {
            url: "https://dex.invalid/api/v1/tokens".to_string(),
            message: "connection refused".to_string(),
        })
    }
}

/// Serves images by URL; unknown URLs answer 404.
pub struct FakeImages {
    pub images: HashMap<String, Vec<u8>>,
}

#[async_trait]
impl ImageFetcher for FakeImages {
    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, RemoteError> {
        self.images.get(url).cloned().ok_or_else(|| RemoteError::Http {
            url: url.to_string(),
            message: "404 Not Found".to_string(),
        })
    }
}

pub fn token(symbol: &str) -> BinanceToken {
    BinanceToken {
        symbol: symbol.to_string(),
        name: symbol.to_string(),
    }
}

pub fn offline_sources() -> RemoteSources {
    RemoteSources {
        binance_tokens: StaticSource::<BinanceToken>::new(Vec::new()),
        binance_asset_infos: StaticSource::<BinanceAssetInfo>::new(Vec::new()),
        tezos_bakers: StaticSource::<BakingBadBaker>::new(Vec::new()),
        images: Arc::new(FakeImages {
            images: HashMap::new(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Dataset fixtures
// ---------------------------------------------------------------------------

pub struct Fixture {
    pub dir: TempDir,
    pub repo: Repo,
}

impl Fixture {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let repo = Repo::new(dir.path());
        tokio::fs::create_dir_all(repo.chains_path())
            .await
            .expect("create chains dir");
        Self { dir, repo }
    }

    pub fn context(&self, registry: ChainRegistry, remote: RemoteSources) -> Arc<ActionContext> {
        Arc::new(ActionContext::new(self.repo.clone(), registry, remote).with_fan_out(2))
    }

    pub async fn write(&self, path: &Path, bytes: &[u8]) {
        repo::write_bytes(path, bytes).await.expect("write fixture file");
    }

    pub async fn write_json(&self, path: &Path, value: &serde_json::Value) {
        repo::write_json(path, value).await.expect("write fixture json");
    }
}

/// PNG signature and IHDR chunk for a `width` x `height` image.
pub fn png(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = vec![0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];
    bytes.extend_from_slice(&13u32.to_be_bytes());
    bytes.extend_from_slice(b"IHDR");
    bytes.extend_from_slice(&width.to_be_bytes());
    bytes.extend_from_slice(&height.to_be_bytes());
    bytes.extend_from_slice(&[8, 6, 0, 0, 0]);
    bytes
}

/// A valid base58check Tezos address with the given prefix bytes.
pub fn tezos_address(prefix: [u8; 3], seed: u8) -> String {
    let mut payload = prefix.to_vec();
    payload.extend_from_slice(&[seed; 20]);
    bs58::encode(payload).with_check().into_string()
}

pub const TZ1: [u8; 3] = [6, 161, 159];
