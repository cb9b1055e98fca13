//! Dataset layout and filesystem helpers.
//!
//! ```text
//! chains/<chain>/assets/<address>/logo.png
//! chains/<chain>/assets/<address>/info/info.json
//! chains/<chain>/whitelist.json
//! chains/<chain>/blacklist.json
//! chains/<chain>/validators/list.json
//! chains/<chain>/validators/assets/<id>/logo.png
//! ```
//!
//! Directory listings are always sorted so that checks built on top of them
//! report in a stable order.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

use crate::chain::Chain;
use crate::error::RepoError;

pub const CHAINS_DIR: &str = "chains";
pub const ASSETS_DIR: &str = "assets";
pub const INFO_DIR: &str = "info";
pub const INFO_FILE: &str = "info.json";
pub const LOGO_NAME: &str = "logo";
pub const LOGO_EXTENSION: &str = "png";
pub const LOGO_FULL_NAME: &str = "logo.png";
pub const WHITELIST_FILE: &str = "whitelist.json";
pub const BLACKLIST_FILE: &str = "blacklist.json";
pub const VALIDATORS_DIR: &str = "validators";
pub const VALIDATORS_LIST_FILE: &str = "list.json";

/// Handle on a dataset checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repo {
    root: PathBuf,
}

impl Repo {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn chains_path(&self) -> PathBuf {
        self.root.join(CHAINS_DIR)
    }

    pub fn chain_path(&self, chain: &Chain) -> PathBuf {
        self.chains_path().join(chain.as_str())
    }

    pub fn chain_assets_path(&self, chain: &Chain) -> PathBuf {
        self.chain_path(chain).join(ASSETS_DIR)
    }

    pub fn chain_asset_path(&self, chain: &Chain, asset: &str) -> PathBuf {
        self.chain_assets_path(chain).join(asset)
    }

    pub fn chain_asset_logo_path(&self, chain: &Chain, asset: &str) -> PathBuf {
        self.chain_asset_path(chain, asset).join(LOGO_FULL_NAME)
    }

    pub fn chain_asset_info_path(&self, chain: &Chain, asset: &str) -> PathBuf {
        self.chain_asset_path(chain, asset)
            .join(INFO_DIR)
            .join(INFO_FILE)
    }

    pub fn chain_whitelist_path(&self, chain: &Chain) -> PathBuf {
        self.chain_path(chain).join(WHITELIST_FILE)
    }

    pub fn chain_blacklist_path(&self, chain: &Chain) -> PathBuf {
        self.chain_path(chain).join(BLACKLIST_FILE)
    }

    pub fn chain_validators_path(&self, chain: &Chain) -> PathBuf {
        self.chain_path(chain).join(VALIDATORS_DIR)
    }

    pub fn chain_validators_list_path(&self, chain: &Chain) -> PathBuf {
        self.chain_validators_path(chain).join(VALIDATORS_LIST_FILE)
    }

    pub fn chain_validators_assets_path(&self, chain: &Chain) -> PathBuf {
        self.chain_validators_path(chain).join(ASSETS_DIR)
    }

    pub fn chain_validator_logo_path(&self, chain: &Chain, id: &str) -> PathBuf {
        self.chain_validators_assets_path(chain)
            .join(id)
            .join(LOGO_FULL_NAME)
    }

    /// Fail with [`RepoError::RootUnreadable`] unless `chains/` can be listed.
    pub async fn verify_root(&self) -> Result<(), RepoError> {
        let path = self.chains_path();
        tokio::fs::read_dir(&path)
            .await
            .map(|_| ())
            .map_err(|source| RepoError::RootUnreadable { path, source })
    }

    /// Every chain directory under `chains/`.
    pub async fn list_chains(&self) -> Result<Vec<Chain>, RepoError> {
        let path = self.chains_path();
        let names = list_dir(&path).await.map_err(|err| match err {
            RepoError::Io { path, source } => RepoError::RootUnreadable { path, source },
            other => other,
        })?;
        Ok(names.into_iter().map(Chain::new).collect())
    }

    /// Asset directory names for `chain`; empty when the chain has no assets.
    pub async fn chain_assets(&self, chain: &Chain) -> Result<Vec<String>, RepoError> {
        list_dir_or_empty(&self.chain_assets_path(chain)).await
    }

    /// Validator logo directory names for `chain`.
    pub async fn chain_validator_assets(&self, chain: &Chain) -> Result<Vec<String>, RepoError> {
        list_dir_or_empty(&self.chain_validators_assets_path(chain)).await
    }

    /// File names inside one asset directory.
    pub async fn chain_asset_files(
        &self,
        chain: &Chain,
        asset: &str,
    ) -> Result<Vec<String>, RepoError> {
        list_dir_or_empty(&self.chain_asset_path(chain, asset)).await
    }
}

/// Sorted entry names of `path`, skipping hidden entries.
pub async fn list_dir(path: &Path) -> Result<Vec<String>, RepoError> {
    let mut entries = tokio::fs::read_dir(path)
        .await
        .map_err(|e| RepoError::io(path, e))?;
    let mut names = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| RepoError::io(path, e))?
    {
        let name = entry.file_name().to_string_lossy().to_string();
        if !name.starts_with('.') {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

/// Like [`list_dir`], but a missing directory lists as empty.
pub async fn list_dir_or_empty(path: &Path) -> Result<Vec<String>, RepoError> {
    if !path_exists(path).await {
        return Ok(Vec::new());
    }
    list_dir(path).await
}

/// Whether `name` is a single plain path segment (no separators, no `..`).
///
/// Asset names from remote lists must pass this before they are joined
/// into a dataset path.
pub fn is_plain_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(segment)), None) if segment == name
    )
}

pub async fn path_exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

pub async fn is_dir(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false)
}

pub async fn read_bytes(path: &Path) -> Result<Vec<u8>, RepoError> {
    tokio::fs::read(path).await.map_err(|e| RepoError::io(path, e))
}

pub async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, RepoError> {
    let bytes = read_bytes(path).await?;
    serde_json::from_slice(&bytes).map_err(|e| RepoError::json(path, e))
}

/// Write `bytes`, creating parent directories as needed.
pub async fn write_bytes(path: &Path, bytes: &[u8]) -> Result<(), RepoError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| RepoError::io(parent, e))?;
    }
    tokio::fs::write(path, bytes)
        .await
        .map_err(|e| RepoError::io(path, e))
}

/// Serialize as 4-space indented JSON with a trailing newline.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut ser)?;
    out.push(b'\n');
    Ok(out)
}

pub async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), RepoError> {
    let bytes = to_pretty_json(value).map_err(|e| RepoError::json(path, e))?;
    write_bytes(path, &bytes).await
}

/// Rewrite a JSON file pretty-printed with sorted keys.
///
/// Returns `true` when the file content changed.
pub async fn format_json_file(path: &Path) -> Result<bool, RepoError> {
    let original = read_bytes(path).await?;
    let value: serde_json::Value =
        serde_json::from_slice(&original).map_err(|e| RepoError::json(path, e))?;
    let formatted = to_pretty_json(&value).map_err(|e| RepoError::json(path, e))?;
    if formatted == original {
        return Ok(false);
    }
    write_bytes(path, &formatted).await?;
    debug!(path = %path.display(), "formatted json file");
    Ok(true)
}

/// Rename `from` to `to`.
///
/// Case-only renames go through an intermediate name so they also work on
/// case-insensitive filesystems. Refuses to overwrite a different entry.
pub async fn move_path(from: &Path, to: &Path) -> Result<(), RepoError> {
    if from == to {
        return Ok(());
    }
    if path_exists(to).await {
        let same_entry = match (
            tokio::fs::canonicalize(from).await,
            tokio::fs::canonicalize(to).await,
        ) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        };
        if !same_entry {
            return Err(RepoError::TargetExists(to.to_path_buf()));
        }
        let mut staging = to.as_os_str().to_owned();
        staging.push(".assetlint-rename");
        let staging = PathBuf::from(staging);
        tokio::fs::rename(from, &staging)
            .await
            .map_err(|e| RepoError::io(from, e))?;
        return tokio::fs::rename(&staging, to)
            .await
            .map_err(|e| RepoError::io(&staging, e));
    }
    tokio::fs::rename(from, to)
        .await
        .map_err(|e| RepoError::io(from, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_plain_name_rejects_traversal() {
        assert!(is_plain_name("BNB"));
        assert!(is_plain_name("ONE-5F9"));
        assert!(!is_plain_name(""));
        assert!(!is_plain_name("."));
        assert!(!is_plain_name(".."));
        assert!(!is_plain_name("../../../escaped"));
        assert!(!is_plain_name("a/b"));
        assert!(!is_plain_name("/abs"));
        assert!(!is_plain_name("BNB/"));
    }

    #[test]
    fn test_layout_paths() {
        let repo = Repo::new("/data");
        let chain = Chain::from("tron");
        assert_eq!(
            repo.chain_asset_logo_path(&chain, "1002000"),
            PathBuf::from("/data/chains/tron/assets/1002000/logo.png")
        );
        assert_eq!(
            repo.chain_asset_info_path(&chain, "1002000"),
            PathBuf::from("/data/chains/tron/assets/1002000/info/info.json")
        );
        assert_eq!(
            repo.chain_validators_list_path(&chain),
            PathBuf::from("/data/chains/tron/validators/list.json")
        );
        assert_eq!(
            repo.chain_validator_logo_path(&chain, "TX"),
            PathBuf::from("/data/chains/tron/validators/assets/TX/logo.png")
        );
        assert_eq!(
            repo.chain_whitelist_path(&chain),
            PathBuf::from("/data/chains/tron/whitelist.json")
        );
    }

    #[tokio::test]
    async fn test_list_dir_sorted_and_skips_hidden() {
        let dir = tempdir().unwrap();
        for name in ["b", "a", ".DS_Store", "c"] {
            std::fs::create_dir(dir.path().join(name)).unwrap();
        }
        let names = list_dir(dir.path()).await.unwrap();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_missing_chain_assets_are_empty() {
        let dir = tempdir().unwrap();
        let repo = Repo::new(dir.path());
        let assets = repo.chain_assets(&Chain::from("nothing")).await.unwrap();
        assert!(assets.is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_root_is_fatal() {
        let dir = tempdir().unwrap();
        let repo = Repo::new(dir.path().join("missing"));
        let err = repo.verify_root().await.unwrap_err();
        assert!(err.is_fatal());
        let err = repo.list_chains().await.unwrap_err();
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn test_format_json_file_is_idempotent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("info.json");
        std::fs::write(&path, br#"{"website":"https://x.io","name":"X"}"#).unwrap();

        assert!(format_json_file(&path).await.unwrap());
        let formatted = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            formatted,
            "{\n    \"name\": \"X\",\n    \"website\": \"https://x.io\"\n}\n"
        );
        assert!(!format_json_file(&path).await.unwrap());
    }

    #[tokio::test]
    async fn test_write_then_read_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("list.json");
        write_json(&path, &json!(["b", "a"])).await.unwrap();
        let back: Vec<String> = read_json(&path).await.unwrap();
        assert_eq!(back, vec!["b", "a"]);
    }

    #[tokio::test]
    async fn test_move_path_refuses_to_overwrite() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        std::fs::create_dir(&a).unwrap();
        std::fs::create_dir(&b).unwrap();
        let err = move_path(&a, &b).await.unwrap_err();
        assert!(matches!(err, RepoError::TargetExists(_)));

        let c = dir.path().join("c");
        move_path(&a, &c).await.unwrap();
        assert!(!a.exists());
        assert!(c.exists());
    }
}
