use clearsignals_memory::{MemoryConfig, MemoryError, MetadataFilter, PineconeIndex, VectorIndex, VectorRecord};
use mockito::Matcher;
use serde_json::json;

fn config_for(server: &mockito::Server) -> MemoryConfig {
    MemoryConfig {
        control_plane_url: server.url(),
        dimension: 3,
        ready_poll_attempts: 2,
        ready_poll_interval_ms: 10,
        ..MemoryConfig::default()
    }
}

#[tokio::test]
async fn test_creates_missing_index_then_upserts() {
    let mut server = mockito::Server::new_async().await;
    let host = server.url();

    let list = server
        .mock("GET", "/indexes")
        .match_header("api-key", "pc-key")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"indexes": [{"name": "someone-else", "host": "other.pinecone.io", "status": {"ready": true}}]}"#)
        .expect(1)
        .create_async()
        .await;
    let create = server
        .mock("POST", "/indexes")
        .match_body(Matcher::PartialJson(json!({
            "name": "clearsignals-deals",
            "dimension": 3,
            "metric": "cosine",
            "spec": {"serverless": {"cloud": "aws", "region": "us-east-1"}}
        })))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(json!({"name": "clearsignals-deals", "host": host, "status": {"ready": true}}).to_string())
        .expect(1)
        .create_async()
        .await;
    let upsert = server
        .mock("POST", "/vectors/upsert")
        .match_body(Matcher::PartialJson(json!({"vectors": [{"id": "deal-1", "values": [0.1, 0.2, 0.3]}]})))
        .with_status(200)
        .with_body(r#"{"upsertedCount": 1}"#)
        .expect(2)
        .create_async()
        .await;

    let index = PineconeIndex::new("pc-key", config_for(&server)).unwrap();
    let record = VectorRecord {
        id: "deal-1".to_string(),
        values: vec![0.1, 0.2, 0.3],
        metadata: Default::default(),
    };
    index.upsert(vec![record.clone()]).await.unwrap();
    index.upsert(vec![record]).await.unwrap();

    list.assert_async().await;
    create.assert_async().await;
    upsert.assert_async().await;
}

#[tokio::test]
async fn test_existing_index_is_queried_with_filter() {
    let mut server = mockito::Server::new_async().await;
    let host = server.url();

    server
        .mock("GET", "/indexes")
        .with_status(200)
        .with_body(json!({"indexes": [{"name": "clearsignals-deals", "host": host, "status": {"ready": true}}]}).to_string())
        .expect(1)
        .create_async()
        .await;
    let create = server.mock("POST", "/indexes").expect(0).create_async().await;
    let query = server
        .mock("POST", "/query")
        .match_body(Matcher::PartialJson(json!({
            "topK": 2,
            "includeMetadata": true,
            "filter": {"kind": {"$eq": "deal"}}
        })))
        .with_status(200)
        .with_body(r#"{"matches": [{"id": "deal-1", "score": 0.98, "metadata": {"kind": "deal", "summary": "Stalled"}}, {"id": "deal-2", "score": 0.41}]}"#)
        .create_async()
        .await;

    let index = PineconeIndex::new("pc-key", config_for(&server)).unwrap();
    let matches = index
        .query(&[0.1, 0.2, 0.3], 2, Some(&MetadataFilter::eq("kind", "deal")))
        .await
        .unwrap();

    query.assert_async().await;
    create.assert_async().await;
    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0].id, "deal-1");
    assert_eq!(matches[0].metadata["summary"], "Stalled");
    assert!(matches[1].metadata.is_empty());
}

#[tokio::test]
async fn test_fetch_and_stats() {
    let mut server = mockito::Server::new_async().await;
    let host = server.url();

    server
        .mock("GET", "/indexes")
        .with_status(200)
        .with_body(json!({"indexes": [{"name": "clearsignals-deals", "host": host, "status": {"ready": true}}]}).to_string())
        .create_async()
        .await;
    server
        .mock("GET", "/vectors/fetch")
        .match_query(Matcher::UrlEncoded("ids".into(), "cpp:user-1".into()))
        .with_status(200)
        .with_body(r#"{"vectors": {"cpp:user-1": {"id": "cpp:user-1", "values": [1.0, 0.0, 0.0], "metadata": {"kind": "cpp"}}}}"#)
        .create_async()
        .await;
    server
        .mock("POST", "/describe_index_stats")
        .with_status(200)
        .with_body(r#"{"namespaces": {"": {"vectorCount": 7}}, "dimension": 3, "indexFullness": 0.0, "totalVectorCount": 7}"#)
        .create_async()
        .await;

    let index = PineconeIndex::new("pc-key", config_for(&server)).unwrap();

    let record = index.fetch("cpp:user-1").await.unwrap().unwrap();
    assert_eq!(record.values, vec![1.0, 0.0, 0.0]);

    let stats = index.stats().await.unwrap();
    assert_eq!(stats.total_vector_count, 7);
    assert_eq!(stats.dimension, Some(3));
}

#[tokio::test]
async fn test_non_success_status_is_typed() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/indexes")
        .with_status(401)
        .with_body(r#"{"error": {"code": "UNAUTHENTICATED", "message": "Invalid API Key"}}"#)
        .create_async()
        .await;

    let index = PineconeIndex::new("bad-key", config_for(&server)).unwrap();
    let err = index.stats().await.unwrap_err();

    match err {
        MemoryError::Index { status, body } => {
            assert_eq!(status, 401);
            assert!(body.contains("Invalid API Key"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_index_that_never_becomes_ready_is_an_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/indexes")
        .with_status(200)
        .with_body(r#"{"indexes": []}"#)
        .create_async()
        .await;
    server
        .mock("POST", "/indexes")
        .with_status(201)
        .with_body(r#"{"name": "clearsignals-deals", "host": "", "status": {"ready": false, "state": "Initializing"}}"#)
        .create_async()
        .await;
    let describe = server
        .mock("GET", "/indexes/clearsignals-deals")
        .with_status(200)
        .with_body(r#"{"name": "clearsignals-deals", "host": "", "status": {"ready": false, "state": "Initializing"}}"#)
        .expect(2)
        .create_async()
        .await;

    let index = PineconeIndex::new("pc-key", config_for(&server)).unwrap();
    let err = index.stats().await.unwrap_err();

    describe.assert_async().await;
    assert!(matches!(err, MemoryError::Configuration(_)));
}
