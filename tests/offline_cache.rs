//! Integration tests for the offline cache lifecycle and fetch strategies,
//! against a mock directory server.

use pretty_assertions::assert_eq;
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use skillsprout::cache::{
  AssetStore, FetchSource, OfflineCache, RequestKey, SqliteAssetStore,
};
use skillsprout::catalog::client::DirectoryClient;

const DATA_PATH: &str = "data/resources.json";

fn open_store(dir: &TempDir) -> SqliteAssetStore {
  SqliteAssetStore::open_at(&dir.path().join("cache.db")).unwrap()
}

fn cache(
  server_url: &str,
  dir: &TempDir,
  generation: &str,
  manifest: &[&str],
) -> OfflineCache<SqliteAssetStore> {
  OfflineCache::new(
    open_store(dir),
    DirectoryClient::new(Url::parse(server_url).unwrap()),
    generation.to_string(),
    manifest.iter().map(|s| s.to_string()).collect(),
    DATA_PATH.to_string(),
  )
}

fn request_key(server_url: &str, asset: &str) -> RequestKey {
  DirectoryClient::new(Url::parse(server_url).unwrap())
    .request_key(asset)
    .unwrap()
}

async fn mount(server: &MockServer, asset: &str, body: &[u8]) {
  Mock::given(method("GET"))
    .and(path(format!("/{}", asset)))
    .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
    .mount(server)
    .await;
}

#[tokio::test]
async fn install_populates_exactly_the_manifest() {
  let server = MockServer::start().await;
  let dir = tempfile::tempdir().unwrap();

  mount(&server, DATA_PATH, b"[]").await;
  mount(&server, "styles.css", b"body { margin: 0 }").await;

  let cache = cache(&server.uri(), &dir, "skillsprout-v1", &[DATA_PATH, "styles.css"]);
  cache.install().await.unwrap();

  let store = open_store(&dir);
  assert_eq!(store.generations().unwrap(), vec!["skillsprout-v1"]);

  let catalog = store
    .get("skillsprout-v1", &request_key(&server.uri(), DATA_PATH))
    .unwrap()
    .unwrap();
  assert_eq!(catalog.body, b"[]");

  let styles = store
    .get("skillsprout-v1", &request_key(&server.uri(), "styles.css"))
    .unwrap()
    .unwrap();
  assert_eq!(styles.body, b"body { margin: 0 }");

  // Nothing beyond the manifest was stored
  assert!(store
    .get("skillsprout-v1", &request_key(&server.uri(), "app.js"))
    .unwrap()
    .is_none());
}

#[tokio::test]
async fn failed_install_leaves_previous_generations_untouched() {
  let server = MockServer::start().await;
  let dir = tempfile::tempdir().unwrap();

  // Previously active generation
  let store = open_store(&dir);
  store
    .put(
      "skillsprout-v1",
      &request_key(&server.uri(), DATA_PATH),
      b"old catalog",
    )
    .unwrap();

  // The catalog fetch succeeds but styles.css 404s, failing the install
  mount(&server, DATA_PATH, b"[]").await;

  let cache = cache(&server.uri(), &dir, "skillsprout-v2", &[DATA_PATH, "styles.css"]);
  assert!(cache.install().await.is_err());

  let store = open_store(&dir);
  assert_eq!(store.generations().unwrap(), vec!["skillsprout-v1"]);

  let old = store
    .get("skillsprout-v1", &request_key(&server.uri(), DATA_PATH))
    .unwrap()
    .unwrap();
  assert_eq!(old.body, b"old catalog");
}

#[tokio::test]
async fn activate_evicts_every_generation_but_the_current_one() {
  let server = MockServer::start().await;
  let dir = tempfile::tempdir().unwrap();

  let store = open_store(&dir);
  let key = request_key(&server.uri(), DATA_PATH);
  store.put("skillsprout-v1", &key, b"v1").unwrap();
  store.put("skillsprout-v2", &key, b"v2").unwrap();
  store.put("skillsprout-v3", &key, b"v3").unwrap();

  let cache = cache(&server.uri(), &dir, "skillsprout-v3", &[DATA_PATH]);
  cache.activate().unwrap();

  let store = open_store(&dir);
  assert_eq!(store.generations().unwrap(), vec!["skillsprout-v3"]);
}

#[tokio::test]
async fn network_first_returns_network_content_and_writes_back() {
  let server = MockServer::start().await;
  let dir = tempfile::tempdir().unwrap();

  mount(&server, DATA_PATH, b"fresh catalog").await;

  let cache = cache(&server.uri(), &dir, "skillsprout-v1", &[DATA_PATH]);
  let fetched = cache.fetch(DATA_PATH).await.unwrap();

  assert_eq!(fetched.body, b"fresh catalog");
  assert_eq!(fetched.source, FetchSource::Network);

  // The write-back is fire-and-forget; give it a moment to land
  tokio::time::sleep(std::time::Duration::from_millis(100)).await;

  let store = open_store(&dir);
  let cached = store
    .get("skillsprout-v1", &request_key(&server.uri(), DATA_PATH))
    .unwrap()
    .unwrap();
  assert_eq!(cached.body, b"fresh catalog");
}

#[tokio::test]
async fn network_first_prefers_network_over_an_existing_cached_copy() {
  let server = MockServer::start().await;
  let dir = tempfile::tempdir().unwrap();

  let store = open_store(&dir);
  store
    .put(
      "skillsprout-v1",
      &request_key(&server.uri(), DATA_PATH),
      b"stale copy",
    )
    .unwrap();

  mount(&server, DATA_PATH, b"fresh catalog").await;

  let cache = cache(&server.uri(), &dir, "skillsprout-v1", &[DATA_PATH]);
  let fetched = cache.fetch(DATA_PATH).await.unwrap();

  assert_eq!(fetched.body, b"fresh catalog");
  assert_eq!(fetched.source, FetchSource::Network);
}

#[tokio::test]
async fn network_first_falls_back_to_the_cached_copy_on_network_failure() {
  let server = MockServer::start().await;
  let dir = tempfile::tempdir().unwrap();

  let store = open_store(&dir);
  store
    .put(
      "skillsprout-v1",
      &request_key(&server.uri(), DATA_PATH),
      b"stale copy",
    )
    .unwrap();

  // No mock mounted: the catalog request 404s
  let cache = cache(&server.uri(), &dir, "skillsprout-v1", &[DATA_PATH]);
  let fetched = cache.fetch(DATA_PATH).await.unwrap();

  assert_eq!(fetched.body, b"stale copy");
  assert!(matches!(fetched.source, FetchSource::Cache { .. }));
}

#[tokio::test]
async fn network_first_without_a_cached_copy_fails() {
  let server = MockServer::start().await;
  let dir = tempfile::tempdir().unwrap();

  let cache = cache(&server.uri(), &dir, "skillsprout-v1", &[DATA_PATH]);
  assert!(cache.fetch(DATA_PATH).await.is_err());
}

#[tokio::test]
async fn cache_first_serves_installed_assets_without_network() {
  let server = MockServer::start().await;
  let dir = tempfile::tempdir().unwrap();

  mount(&server, DATA_PATH, b"[]").await;
  mount(&server, "styles.css", b"body { margin: 0 }").await;

  let uri = server.uri();
  let cache = cache(&uri, &dir, "skillsprout-v1", &[DATA_PATH, "styles.css"]);
  cache.install().await.unwrap();

  // Take the network away entirely
  drop(server);

  let fetched = cache.fetch("styles.css").await.unwrap();
  assert_eq!(fetched.body, b"body { margin: 0 }");
  assert!(matches!(fetched.source, FetchSource::Cache { .. }));
}

#[tokio::test]
async fn cache_first_miss_fetches_from_network_without_write_back() {
  let server = MockServer::start().await;
  let dir = tempfile::tempdir().unwrap();

  mount(&server, "styles.css", b"body { margin: 0 }").await;

  let cache = cache(&server.uri(), &dir, "skillsprout-v1", &[DATA_PATH, "styles.css"]);
  let fetched = cache.fetch("styles.css").await.unwrap();

  assert_eq!(fetched.body, b"body { margin: 0 }");
  assert_eq!(fetched.source, FetchSource::Network);

  // Cache-first assets are only populated during install
  let store = open_store(&dir);
  assert!(store
    .get("skillsprout-v1", &request_key(&server.uri(), "styles.css"))
    .unwrap()
    .is_none());
}

#[tokio::test]
async fn purge_deletes_every_generation() {
  let server = MockServer::start().await;
  let dir = tempfile::tempdir().unwrap();

  let store = open_store(&dir);
  let key = request_key(&server.uri(), DATA_PATH);
  store.put("skillsprout-v1", &key, b"v1").unwrap();
  store.put("skillsprout-v2", &key, b"v2").unwrap();

  let cache = cache(&server.uri(), &dir, "skillsprout-v2", &[DATA_PATH]);
  cache.purge_all().unwrap();

  let store = open_store(&dir);
  assert!(store.generations().unwrap().is_empty());
}
