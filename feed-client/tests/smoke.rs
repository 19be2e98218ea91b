use feed_client::HttpGateway;
use feed_core::{FeedConfig, FeedController, FeedError, ItemDraft, ItemPatch, ReactionKind};

fn server_url() -> String {
    std::env::var("FEED_SERVER_URL").unwrap_or_else(|_| "http://127.0.0.1:5000".to_string())
}

#[tokio::test]
#[ignore = "requires running feed-server with upstream access"]
async fn http_smoke_flow() {
    let gateway = HttpGateway::new(server_url()).expect("client must build");
    let feed = FeedController::new(gateway, FeedConfig::default());

    feed.load_first_page()
        .await
        .expect("first page must load");
    let first = feed.items();
    assert_eq!(first.len(), 10);
    assert!(feed.has_next_page());

    feed.load_next_page().await.expect("next page must load");
    assert_eq!(feed.items().len(), 20);

    let created = feed
        .create_item(ItemDraft {
            title: "smoke title".to_string(),
            body: "smoke body".to_string(),
            tags: vec!["smoke".to_string()],
            user_id: 1,
        })
        .await
        .expect("create must succeed");
    assert!(!created.is_client_assigned());
    assert!(created.image_url.is_some());

    let target = first[0].id;
    let likes = first[0].reactions.likes;
    let reacted = feed
        .react_to_item(target, ReactionKind::Like)
        .await
        .expect("react must succeed");
    assert_eq!(reacted.reactions.likes, likes + 1);

    let patch = ItemPatch {
        title: Some("smoke update".to_string()),
        ..ItemPatch::new(target)
    };
    let updated = feed.update_item(patch).await.expect("update must succeed");
    assert_eq!(updated.title, "smoke update");

    feed.delete_item(target)
        .await
        .expect("delete must succeed");

    let err = feed
        .delete_item(i64::MAX)
        .await
        .expect_err("unknown id must fail locally");
    assert!(matches!(err, FeedError::NotFound(_)));

    let found = feed.search("love").await.expect("search must succeed");
    assert!(found.iter().all(|item| item.image_url.is_some()));
}
