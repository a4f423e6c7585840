mod common;

use std::sync::Arc;
use std::time::Duration;

use shelf_cache::{CacheGeneration, CacheStorage, Catalog, MemoryStorage};
use shelf_core::{Request, Response, StatusCode};
use shelf_worker::{Fallback, FetchError, ResponseSource, ServeError, Worker};

use common::{scope, url, worker, GatedPuts, ScriptedNetwork};

async fn installed() -> (Worker, Arc<MemoryStorage>, Arc<ScriptedNetwork>) {
    let catalog = Catalog::story_reader(scope());
    let network = Arc::new(ScriptedNetwork::serving(&catalog));
    let storage = Arc::new(MemoryStorage::new());
    let worker = worker("v1.2", storage.clone(), network.clone());
    worker.install().await.unwrap();
    worker.activate().await;
    (worker, storage, network)
}

#[tokio::test]
async fn test_cached_catalog_resource_skips_network() {
    let (worker, _storage, network) = installed().await;
    let before = network.calls();

    for path in ["index.html", "/index.html", "assets/images/s10.jpg"] {
        let served = worker
            .handle_fetch(&Request::get(url(path)))
            .await
            .unwrap();
        assert_eq!(served.source, ResponseSource::Cache);
    }

    let served = worker
        .handle_fetch(&Request::image(url("assets/images/s1.jpg")))
        .await
        .unwrap();
    assert_eq!(served.response.text().unwrap(), "./assets/images/s1.jpg");
    assert_eq!(network.calls(), before);
}

#[tokio::test]
async fn test_precached_miss_goes_to_network_without_write_through() {
    let catalog = Catalog::story_reader(scope());
    let network = Arc::new(ScriptedNetwork::serving(&catalog));
    let storage = Arc::new(MemoryStorage::new());
    let worker = worker("v1.2", storage.clone(), network.clone());

    let served = worker
        .handle_fetch(&Request::get(url("styles.css")))
        .await
        .unwrap();
    worker.settle().await;

    assert_eq!(served.source, ResponseSource::Network);
    assert_eq!(network.calls(), 1);
    assert!(storage.keys().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_runtime_response_written_to_dynamic_generation() {
    let (worker, storage, network) = installed().await;
    let feed = url("api/feed.json");
    network.respond(feed.clone(), Response::ok_with("{\"items\":[]}"));

    let served = worker.handle_fetch(&Request::get(feed.clone())).await.unwrap();
    assert_eq!(served.source, ResponseSource::Network);
    worker.settle().await;

    let dynamic = storage.generation("dynamic-v1.2").expect("dynamic generation");
    let stored = dynamic
        .match_request(&Request::get(feed.clone()))
        .await
        .unwrap()
        .expect("response stored");
    assert_eq!(stored.text().unwrap(), "{\"items\":[]}");

    let calls = network.calls();
    let again = worker.handle_fetch(&Request::get(feed)).await.unwrap();
    assert_eq!(again.source, ResponseSource::Cache);
    assert_eq!(network.calls(), calls);
}

#[tokio::test]
async fn test_write_through_does_not_delay_response() {
    let storage = Arc::new(GatedPuts::new());
    let network = Arc::new(ScriptedNetwork::new());
    let feed = url("api/feed.json");
    network.respond(feed.clone(), Response::ok_with("{\"items\":[]}"));
    let worker = worker("v1.2", storage.clone(), network);

    let served = tokio::time::timeout(
        Duration::from_secs(5),
        worker.handle_fetch(&Request::get(feed.clone())),
    )
    .await
    .expect("response returned while the cache write is pending")
    .unwrap();
    assert_eq!(served.source, ResponseSource::Network);

    tokio::task::yield_now().await;
    assert_eq!(storage.puts(), 0);
    assert!(storage
        .inner
        .match_any(&Request::get(feed.clone()))
        .await
        .unwrap()
        .is_none());

    storage.release();
    worker.settle().await;

    assert_eq!(storage.puts(), 1);
    let stored = storage
        .inner
        .match_any(&Request::get(feed))
        .await
        .unwrap()
        .expect("stored after release");
    assert_eq!(stored.text().unwrap(), "{\"items\":[]}");
}

#[tokio::test]
async fn test_non_200_runtime_response_not_stored() {
    let (worker, storage, network) = installed().await;
    let missing = url("api/missing.json");
    let created = url("api/created.json");
    network.respond(created.clone(), Response::new(StatusCode::CREATED, "{}"));

    let served = worker.handle_fetch(&Request::get(missing)).await.unwrap();
    assert_eq!(served.response.status(), StatusCode::NOT_FOUND);
    worker.handle_fetch(&Request::get(created)).await.unwrap();
    worker.settle().await;

    assert!(storage.generation("dynamic-v1.2").is_none());
}

#[tokio::test]
async fn test_offline_navigation_serves_shell() {
    let (worker, _storage, network) = installed().await;
    network.set_offline(true);

    let served = worker
        .handle_fetch(&Request::navigate(url("stories/7")))
        .await
        .unwrap();

    assert_eq!(served.source, ResponseSource::Fallback(Fallback::ShellDocument));
    assert_eq!(served.response.text().unwrap(), "./index.html");
}

#[tokio::test]
async fn test_offline_image_serves_placeholder() {
    let (worker, _storage, network) = installed().await;
    network.set_offline(true);

    let served = worker
        .handle_fetch(&Request::image(url("assets/images/s21.jpg")))
        .await
        .unwrap();

    assert_eq!(
        served.source,
        ResponseSource::Fallback(Fallback::PlaceholderImage)
    );
    assert_eq!(
        served.response.text().unwrap(),
        "./assets/images/placeholder.svg"
    );
}

#[tokio::test]
async fn test_offline_other_request_fails() {
    let (worker, _storage, network) = installed().await;
    network.set_offline(true);

    let err = worker
        .handle_fetch(&Request::get(url("api/feed.json")))
        .await
        .unwrap_err();

    let ServeError::Network { url, source } = err;
    assert!(url.ends_with("api/feed.json"));
    assert!(matches!(source, FetchError::Offline { .. }));
}

#[tokio::test]
async fn test_evicted_catalog_image_fails_offline() {
    let (worker, storage, network) = installed().await;
    let cover = Request::get(url("assets/images/s3.jpg"));
    storage
        .generation("static-v1.2")
        .unwrap()
        .delete(&cover)
        .await
        .unwrap();
    network.set_offline(true);

    assert!(worker.handle_fetch(&Request::image(url("assets/images/s3.jpg"))).await.is_err());
}
