use std::time::Duration;

use palaverd::{
	db::{Error, PersistenceHandle},
	test::*,
};
use tokio::time::sleep;


#[ctor::ctor]
fn initialize() { env_logger::init(); }


#[tokio::test(flavor = "multi_thread")]
async fn test_my_feed_orders_newest_first() {
	let api = load_test_api("admin", "my_feed.sqlite").await;
	api.ensure_profile("alice").await.unwrap();

	api.publish_post("alice", "first").await.unwrap();
	sleep(Duration::from_millis(5)).await;
	api.publish_post("alice", "second").await.unwrap();

	let feed = api.my_feed("alice").await.unwrap();
	let messages: Vec<&str> = feed.iter().map(|p| p.message.as_str()).collect();
	assert_eq!(messages, vec!["second", "first"]);

	// Nobody else's posts leak into the personal feed
	api.publish_post("bob", "not yours").await.unwrap();
	assert_eq!(api.my_feed("alice").await.unwrap().len(), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_friends_feed_is_filtered_by_friendship() {
	let api = load_test_api("admin", "friends_feed.sqlite").await;
	let alice = api.ensure_profile("alice").await.unwrap();
	let bob = api.ensure_profile("bob").await.unwrap();
	api.ensure_profile("carol").await.unwrap();

	api.publish_post("bob", "from bob").await.unwrap();
	api.publish_post("carol", "from carol").await.unwrap();

	// Nothing visible before the friendship exists
	assert!(api.friends_feed(&alice).await.unwrap().is_empty());

	api.send_friend_requests(&bob, &[alice.id]).await.unwrap();
	let received = api.db.fetch_received_requests(alice.id).await.unwrap();
	api.accept_friend_requests(&alice, &[received[0].relationship_id])
		.await
		.unwrap();

	let feed = api.friends_feed(&alice).await.unwrap();
	let messages: Vec<&str> = feed.iter().map(|p| p.message.as_str()).collect();
	assert_eq!(messages, vec!["from bob"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_like_is_idempotent() {
	let api = load_test_api("admin", "like.sqlite").await;
	api.ensure_profile("alice").await.unwrap();
	api.ensure_profile("bob").await.unwrap();

	let post = api.publish_post("alice", "like me").await.unwrap();

	api.like_post("bob", post.id).await.unwrap();
	api.like_post("bob", post.id).await.unwrap();
	assert_eq!(api.db.count_likes(post.id).await.unwrap(), 1);

	// A different user still counts
	api.like_post("alice", post.id).await.unwrap();
	assert_eq!(api.db.count_likes(post.id).await.unwrap(), 2);

	let feed = api.my_feed("alice").await.unwrap();
	assert_eq!(feed[0].likes, 2);
	assert!(feed[0].liked_by_me);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_like_missing_post() {
	let api = load_test_api("admin", "like_missing.sqlite").await;
	api.ensure_profile("alice").await.unwrap();

	let result = api.like_post("alice", 12345).await;
	assert!(matches!(result, Err(Error::PostNotFound(12345))));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_comments() {
	let api = load_test_api("admin", "comments.sqlite").await;
	api.ensure_profile("alice").await.unwrap();
	api.ensure_profile("bob").await.unwrap();

	let post = api.publish_post("alice", "discuss").await.unwrap();
	api.add_comment("bob", post.id, "nice post").await.unwrap();
	sleep(Duration::from_millis(5)).await;
	api.add_comment("alice", post.id, "thanks").await.unwrap();

	let (info, comments) = api.post_comments(post.id, "bob").await.unwrap();
	assert_eq!(info.comments, 2);
	let messages: Vec<&str> = comments.iter().map(|c| c.message.as_str()).collect();
	// Oldest first, like a conversation reads
	assert_eq!(messages, vec!["nice post", "thanks"]);

	let result = api.add_comment("bob", 4444, "into the void").await;
	assert!(matches!(result, Err(Error::PostNotFound(4444))));
	let result = api.post_comments(4444, "bob").await;
	assert!(matches!(result, Err(Error::PostNotFound(4444))));
}
