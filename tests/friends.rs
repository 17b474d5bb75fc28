use palaverd::{
	db::{Error, PersistenceHandle},
	entity::relationship::RelationshipStatus,
	test::*,
};


#[ctor::ctor]
fn initialize() { env_logger::init(); }


#[tokio::test(flavor = "multi_thread")]
async fn test_seed_relationship() {
	let api = load_test_api("admin", "seed.sqlite").await;

	// A brand-new account gets exactly one outgoing request, toward the seed
	// profile
	let alice = api.ensure_profile("alice").await.unwrap();
	let sent = api.db.fetch_sent_requests(alice.id).await.unwrap();
	assert_eq!(sent.len(), 1);
	assert_eq!(sent[0].other.user, "admin");
	assert_eq!(sent[0].status, RelationshipStatus::Sent);

	// A second visit doesn't seed again
	let alice2 = api.ensure_profile("alice").await.unwrap();
	assert_eq!(alice.id, alice2.id);
	assert_eq!(api.db.fetch_sent_requests(alice.id).await.unwrap().len(), 1);

	// The seed account itself starts with an empty graph
	let admin = api.ensure_profile("admin").await.unwrap();
	assert!(api
		.db
		.fetch_sent_requests(admin.id)
		.await
		.unwrap()
		.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_accept_is_bidirectional() {
	let api = load_test_api("admin", "accept.sqlite").await;
	let alice = api.ensure_profile("alice").await.unwrap();
	let bob = api.ensure_profile("bob").await.unwrap();

	api.send_friend_requests(&bob, &[alice.id]).await.unwrap();
	let received = api.db.fetch_received_requests(alice.id).await.unwrap();
	assert_eq!(received.len(), 1);
	assert_eq!(received[0].other.user, "bob");
	assert_eq!(received[0].status, RelationshipStatus::Sent);

	api.accept_friend_requests(&alice, &[received[0].relationship_id])
		.await
		.unwrap();

	// Both sides of the friend graph were updated in one step
	let alice_friends = api.db.fetch_friend_users(alice.id).await.unwrap();
	let bob_friends = api.db.fetch_friend_users(bob.id).await.unwrap();
	assert!(alice_friends.contains(&"bob".to_string()));
	assert!(bob_friends.contains(&"alice".to_string()));

	// The accepted request has left the pending list, but still shows up as
	// accepted on the sender's side
	assert!(api
		.db
		.fetch_received_requests(alice.id)
		.await
		.unwrap()
		.is_empty());
	let relationship = api
		.db
		.find_relationship(received[0].relationship_id)
		.await
		.unwrap()
		.unwrap();
	assert_eq!(relationship.status, RelationshipStatus::Accepted);
	let bob_sent = api.db.fetch_sent_requests(bob.id).await.unwrap();
	let to_alice = bob_sent.iter().find(|r| r.other.user == "alice").unwrap();
	assert_eq!(to_alice.status, RelationshipStatus::Accepted);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_accept_is_idempotent() {
	let api = load_test_api("admin", "accept_twice.sqlite").await;
	let alice = api.ensure_profile("alice").await.unwrap();
	let bob = api.ensure_profile("bob").await.unwrap();

	api.send_friend_requests(&bob, &[alice.id]).await.unwrap();
	let received = api.db.fetch_received_requests(alice.id).await.unwrap();
	let relationship_id = received[0].relationship_id;

	api.accept_friend_requests(&alice, &[relationship_id])
		.await
		.unwrap();
	api.accept_friend_requests(&alice, &[relationship_id])
		.await
		.unwrap();

	assert_eq!(api.db.fetch_friend_users(alice.id).await.unwrap(), vec![
		"bob".to_string()
	]);
	assert_eq!(api.db.fetch_friend_users(bob.id).await.unwrap(), vec![
		"alice".to_string()
	]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_accept_requires_ownership() {
	let api = load_test_api("admin", "accept_auth.sqlite").await;
	let alice = api.ensure_profile("alice").await.unwrap();
	let bob = api.ensure_profile("bob").await.unwrap();
	let carol = api.ensure_profile("carol").await.unwrap();

	api.send_friend_requests(&bob, &[alice.id]).await.unwrap();
	let received = api.db.fetch_received_requests(alice.id).await.unwrap();
	let relationship_id = received[0].relationship_id;

	// Carol can not accept a request that was addressed to Alice
	let result = api.accept_friend_requests(&carol, &[relationship_id]).await;
	assert!(matches!(result, Err(Error::NotYourRequest(_))));

	// And nothing was mutated by the refused accept
	let relationship = api
		.db
		.find_relationship(relationship_id)
		.await
		.unwrap()
		.unwrap();
	assert_eq!(relationship.status, RelationshipStatus::Sent);
	assert!(api.db.fetch_friend_users(carol.id).await.unwrap().is_empty());
	assert!(api.db.fetch_friend_users(alice.id).await.unwrap().is_empty());
	assert!(api.db.fetch_friend_users(bob.id).await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_send_request_deduplicates() {
	let api = load_test_api("admin", "send_dedup.sqlite").await;
	let alice = api.ensure_profile("alice").await.unwrap();
	let bob = api.ensure_profile("bob").await.unwrap();

	api.send_friend_requests(&alice, &[bob.id]).await.unwrap();
	api.send_friend_requests(&alice, &[bob.id]).await.unwrap();

	let sent = api.db.fetch_sent_requests(alice.id).await.unwrap();
	let to_bob = sent.iter().filter(|r| r.other.user == "bob").count();
	assert_eq!(to_bob, 1);

	// Requesting yourself is skipped entirely
	api.send_friend_requests(&alice, &[alice.id]).await.unwrap();
	let sent = api.db.fetch_sent_requests(alice.id).await.unwrap();
	assert!(sent.iter().all(|r| r.other.user != "alice"));

	// An unknown receiver terminates with a not-found condition
	let result = api.send_friend_requests(&alice, &[99999]).await;
	assert!(matches!(result, Err(Error::ProfileNotFound(99999))));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_discoverable_set() {
	let api = load_test_api("admin", "discover.sqlite").await;
	let alice = api.ensure_profile("alice").await.unwrap();
	let bob = api.ensure_profile("bob").await.unwrap();
	let carol = api.ensure_profile("carol").await.unwrap();
	api.ensure_profile("dave").await.unwrap();

	// Alice and Bob become friends, and Alice sends Carol a request
	api.send_friend_requests(&bob, &[alice.id]).await.unwrap();
	let received = api.db.fetch_received_requests(alice.id).await.unwrap();
	api.accept_friend_requests(&alice, &[received[0].relationship_id])
		.await
		.unwrap();
	api.send_friend_requests(&alice, &[carol.id]).await.unwrap();

	let overview = api.friends_overview(&alice).await.unwrap();
	let discoverable: Vec<&str> = overview
		.discoverable
		.iter()
		.map(|p| p.user.as_str())
		.collect();

	// Not herself, not her friend, not anybody she has already requested
	// (including the seeded request toward admin)
	assert!(!discoverable.contains(&"alice"));
	assert!(!discoverable.contains(&"bob"));
	assert!(!discoverable.contains(&"carol"));
	assert!(!discoverable.contains(&"admin"));
	assert_eq!(discoverable, vec!["dave"]);

	let friends: Vec<&str> = overview.friends.iter().map(|p| p.user.as_str()).collect();
	assert_eq!(friends, vec!["bob"]);
	assert_eq!(overview.received.len(), 0);

	// Bob's request was accepted, so Alice sits in his friend list and out of
	// his discoverable set as well
	let bob_overview = api.friends_overview(&bob).await.unwrap();
	assert!(bob_overview
		.discoverable
		.iter()
		.all(|p| p.user != "alice"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_update_profile() {
	let api = load_test_api("admin", "profile.sqlite").await;
	let alice = api.ensure_profile("alice").await.unwrap();
	assert_eq!(alice.display_name, None);
	assert_eq!(alice.about, None);

	api.update_profile(
		&alice,
		Some("Alice".to_string()),
		Some("I post here sometimes.".to_string()),
	)
	.await
	.unwrap();

	let alice = api.db.find_profile("alice").await.unwrap().unwrap();
	assert_eq!(alice.display_name.as_deref(), Some("Alice"));
	assert_eq!(alice.about.as_deref(), Some("I post here sometimes."));
}
