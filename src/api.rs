use log::*;
use serde::Serialize;

use crate::{
	db::{
		self, CommentInfo, Database, FriendRequestInfo, PersistenceHandle, PostInfo, ProfileInfo,
	},
	entity::{post, profile, relationship::RelationshipStatus},
};


#[derive(Clone)]
pub struct Api {
	pub db: Database,
	/// Username of the profile that newly created accounts get their first
	/// friend request sent to.
	pub seed_user: String,
}

/// Everything the friends overview shows for one acting profile.
#[derive(Debug, Serialize)]
pub struct FriendsOverview {
	pub friends: Vec<ProfileInfo>,
	pub sent: Vec<FriendRequestInfo>,
	pub received: Vec<FriendRequestInfo>,
	pub discoverable: Vec<ProfileInfo>,
}


impl Api {
	/// Looks up the acting user's profile, creating it on their first visit.
	/// Account creation is also the moment the initial seed relationship is
	/// planted, so the friends view itself stays a pure read.
	pub async fn ensure_profile(&self, user: &str) -> db::Result<profile::Model> {
		if let Some(profile) = self.db.find_profile(user).await? {
			return Ok(profile);
		}

		let profile = self.db.create_profile(user).await?;
		info!("Created profile for new user {}.", user);
		self.seed_relationship(&profile).await?;
		Ok(profile)
	}

	/// Gives a brand-new account one outgoing `sent` request toward the seed
	/// profile, so that nobody starts with an empty social graph.
	async fn seed_relationship(&self, profile: &profile::Model) -> db::Result<()> {
		if profile.user == self.seed_user {
			return Ok(());
		}
		let seed = match self.db.find_profile(&self.seed_user).await? {
			Some(s) => s,
			None => {
				warn!(
					"Seed profile {} does not exist, not seeding a relationship for {}.",
					self.seed_user, profile.user
				);
				return Ok(());
			}
		};

		if !self.db.has_sent_requests(profile.id).await? {
			self.db.create_relationship(profile.id, seed.id).await?;
			debug!(
				"Seeded first friend request from {} to {}.",
				profile.user, seed.user
			);
		}
		Ok(())
	}

	pub async fn update_profile(
		&self, profile: &profile::Model, display_name: Option<String>, about: Option<String>,
	) -> db::Result<()> {
		self.db
			.update_profile(profile.id, display_name, about)
			.await
	}

	pub async fn friends_overview(&self, acting: &profile::Model) -> db::Result<FriendsOverview> {
		let friends = self
			.db
			.fetch_friend_profiles(acting.id)
			.await?
			.into_iter()
			.map(|p| p.into())
			.collect();
		let sent = self.db.fetch_sent_requests(acting.id).await?;
		let received = self.db.fetch_received_requests(acting.id).await?;
		let discoverable = self
			.db
			.fetch_discoverable_profiles(acting)
			.await?
			.into_iter()
			.map(|p| p.into())
			.collect();

		Ok(FriendsOverview {
			friends,
			sent,
			received,
			discoverable,
		})
	}

	/// Sends a friend request to each of the given profiles. Requesting
	/// yourself is silently skipped, an unknown profile id fails the whole
	/// request, and a request that already exists is left as it is.
	pub async fn send_friend_requests(
		&self, acting: &profile::Model, receiver_ids: &[i64],
	) -> db::Result<()> {
		for &receiver_id in receiver_ids {
			if receiver_id == acting.id {
				continue;
			}
			let receiver = self
				.db
				.find_profile_by_id(receiver_id)
				.await?
				.ok_or(db::Error::ProfileNotFound(receiver_id))?;

			if self.db.create_relationship(acting.id, receiver.id).await? {
				debug!(
					"Friend request sent from {} to {}.",
					acting.user, receiver.user
				);
			}
		}
		Ok(())
	}

	/// Accepts the given friend requests on behalf of the acting profile.
	/// Each request is handled in its own transaction: the status flip and
	/// both friend-list insertions either all land or none do, so the friend
	/// graph can not end up asymmetric. A request addressed to somebody else
	/// is refused.
	pub async fn accept_friend_requests(
		&self, acting: &profile::Model, relationship_ids: &[i64],
	) -> db::Result<()> {
		for &relationship_id in relationship_ids {
			let tx = self.db.transaction().await?;

			let relationship = tx
				.find_relationship(relationship_id)
				.await?
				.ok_or(db::Error::RelationshipNotFound(relationship_id))?;
			if relationship.receiver_id != acting.id {
				return Err(db::Error::NotYourRequest(relationship_id));
			}
			if relationship.status == RelationshipStatus::Accepted {
				continue;
			}

			let sender = tx
				.find_profile_by_id(relationship.sender_id)
				.await?
				.ok_or(db::Error::ProfileNotFound(relationship.sender_id))?;

			tx.update_relationship_status(relationship_id, RelationshipStatus::Accepted)
				.await?;
			tx.add_friend(acting.id, &sender.user).await?;
			tx.add_friend(sender.id, &acting.user).await?;
			tx.commit().await?;

			info!("{} and {} are now friends.", acting.user, sender.user);
		}
		Ok(())
	}

	pub async fn publish_post(&self, user: &str, message: &str) -> db::Result<post::Model> {
		self.db.create_post(user, message).await
	}

	/// The acting user's own posts, newest first.
	pub async fn my_feed(&self, user: &str) -> db::Result<Vec<PostInfo>> {
		let posts = self.db.fetch_posts_by_author(user).await?;
		self.load_post_infos(posts, user).await
	}

	/// Posts of everybody in the acting profile's friend list, newest first.
	pub async fn friends_feed(&self, acting: &profile::Model) -> db::Result<Vec<PostInfo>> {
		let friend_users = self.db.fetch_friend_users(acting.id).await?;
		let posts = self.db.fetch_posts_by_authors(friend_users).await?;
		self.load_post_infos(posts, &acting.user).await
	}

	async fn load_post_infos(
		&self, posts: Vec<post::Model>, viewer: &str,
	) -> db::Result<Vec<PostInfo>> {
		let mut infos = Vec::with_capacity(posts.len());
		for post in posts {
			infos.push(self.db.load_post_info(post, viewer).await?);
		}
		Ok(infos)
	}

	/// Repeated likes of the same post by the same user have no effect after
	/// the first one.
	pub async fn like_post(&self, user: &str, post_id: i64) -> db::Result<()> {
		self.db
			.find_post(post_id)
			.await?
			.ok_or(db::Error::PostNotFound(post_id))?;

		if self.db.has_liked(post_id, user).await? {
			return Ok(());
		}
		self.db.create_like(post_id, user).await?;
		Ok(())
	}

	pub async fn post_comments(
		&self, post_id: i64, viewer: &str,
	) -> db::Result<(PostInfo, Vec<CommentInfo>)> {
		let post = self
			.db
			.find_post(post_id)
			.await?
			.ok_or(db::Error::PostNotFound(post_id))?;
		let info = self.db.load_post_info(post, viewer).await?;

		let comments = self
			.db
			.fetch_comments(post_id)
			.await?
			.into_iter()
			.map(|c| CommentInfo {
				id: c.id,
				author: c.author,
				message: c.message,
				created: c.created as u64,
			})
			.collect();
		Ok((info, comments))
	}

	pub async fn add_comment(&self, user: &str, post_id: i64, message: &str) -> db::Result<()> {
		self.db
			.find_post(post_id)
			.await?
			.ok_or(db::Error::PostNotFound(post_id))?;
		self.db.create_comment(post_id, user, message).await?;
		Ok(())
	}
}
