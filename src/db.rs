mod install;

use std::{path::PathBuf, time::Duration};

use ::serde::Serialize;
use async_trait::async_trait;
use log::*;
use sea_orm::{
	prelude::*, sea_query::OnConflict, ConnectOptions, ConnectionTrait, DatabaseConnection,
	DatabaseTransaction, DbBackend, NotSet, QueryOrder, Set, Statement, TransactionTrait,
};
use thiserror::Error;

use crate::{
	common::current_timestamp,
	entity::{
		comment, friend, post, post_like, profile,
		relationship::{self, RelationshipStatus},
	},
};


#[derive(Clone)]
pub struct Database {
	orm: DatabaseConnection,
}

pub struct Transaction(pub(crate) DatabaseTransaction);

#[derive(Debug, Error)]
pub enum Error {
	#[error("database error: {0}")]
	OrmError(#[from] DbErr),
	#[error("profile {0} not found")]
	ProfileNotFound(i64),
	#[error("post {0} not found")]
	PostNotFound(i64),
	#[error("friend request {0} not found")]
	RelationshipNotFound(i64),
	#[error("friend request {0} is not addressed to the acting user")]
	NotYourRequest(i64),
}

pub type Result<T> = std::result::Result<T, self::Error>;


#[derive(Clone, Debug, Serialize)]
pub struct ProfileInfo {
	pub id: i64,
	pub user: String,
	pub display_name: Option<String>,
}

/// A friend request as shown in the friends overview. `other` is the receiver
/// for outgoing requests and the sender for incoming ones.
#[derive(Debug, Serialize)]
pub struct FriendRequestInfo {
	pub relationship_id: i64,
	pub other: ProfileInfo,
	pub status: RelationshipStatus,
}

#[derive(Debug, Serialize)]
pub struct PostInfo {
	pub id: i64,
	pub author: String,
	pub message: String,
	pub created: u64,
	pub comments: u64,
	pub likes: u64,
	pub liked_by_me: bool,
}

#[derive(Debug, Serialize)]
pub struct CommentInfo {
	pub id: i64,
	pub author: String,
	pub message: String,
	pub created: u64,
}


impl From<profile::Model> for ProfileInfo {
	fn from(model: profile::Model) -> Self {
		Self {
			id: model.id,
			user: model.user,
			display_name: model.display_name,
		}
	}
}


#[async_trait]
pub trait PersistenceHandle {
	type Inner: ConnectionTrait;

	fn inner(&self) -> &Self::Inner;


	async fn find_profile(&self, user: &str) -> Result<Option<profile::Model>> {
		Ok(profile::Entity::find()
			.filter(profile::Column::User.eq(user))
			.one(self.inner())
			.await?)
	}

	async fn find_profile_by_id(&self, profile_id: i64) -> Result<Option<profile::Model>> {
		Ok(profile::Entity::find_by_id(profile_id)
			.one(self.inner())
			.await?)
	}

	async fn create_profile(&self, user: &str) -> Result<profile::Model> {
		let record = profile::ActiveModel {
			id: NotSet,
			user: Set(user.to_string()),
			display_name: NotSet,
			about: NotSet,
			created: Set(current_timestamp() as i64),
		};
		Ok(record.insert(self.inner()).await?)
	}

	async fn update_profile(
		&self, profile_id: i64, display_name: Option<String>, about: Option<String>,
	) -> Result<()> {
		let mut record = <profile::ActiveModel as std::default::Default>::default();
		record.id = Set(profile_id);
		record.display_name = Set(display_name);
		record.about = Set(about);
		profile::Entity::update(record).exec(self.inner()).await?;
		Ok(())
	}

	/// The usernames in the given profile's friend list.
	async fn fetch_friend_users(&self, profile_id: i64) -> Result<Vec<String>> {
		let rows = friend::Entity::find()
			.filter(friend::Column::ProfileId.eq(profile_id))
			.all(self.inner())
			.await?;
		Ok(rows.into_iter().map(|f| f.friend_user).collect())
	}

	async fn fetch_friend_profiles(&self, profile_id: i64) -> Result<Vec<profile::Model>> {
		let users = self.fetch_friend_users(profile_id).await?;
		Ok(profile::Entity::find()
			.filter(profile::Column::User.is_in(users))
			.order_by_asc(profile::Column::User)
			.all(self.inner())
			.await?)
	}

	/// Adds a user to a profile's friend list. Inserting an edge that is
	/// already there is a no-op, which keeps concurrent accepts harmless.
	async fn add_friend(&self, profile_id: i64, friend_user: &str) -> Result<bool> {
		let record = friend::ActiveModel {
			id: NotSet,
			profile_id: Set(profile_id),
			friend_user: Set(friend_user.to_string()),
		};
		match friend::Entity::insert(record)
			.on_conflict(
				OnConflict::columns([friend::Column::ProfileId, friend::Column::FriendUser])
					.do_nothing()
					.to_owned(),
			)
			.exec(self.inner())
			.await
		{
			Ok(_) => Ok(true),
			Err(DbErr::RecordNotInserted) => Ok(false),
			Err(e) => Err(e.into()),
		}
	}

	async fn has_sent_requests(&self, profile_id: i64) -> Result<bool> {
		let count = relationship::Entity::find()
			.filter(relationship::Column::SenderId.eq(profile_id))
			.count(self.inner())
			.await?;
		Ok(count > 0)
	}

	/// Creates a new friend request in the `sent` state. A request that
	/// already exists between the two profiles is left untouched.
	async fn create_relationship(&self, sender_id: i64, receiver_id: i64) -> Result<bool> {
		let record = relationship::ActiveModel {
			id: NotSet,
			sender_id: Set(sender_id),
			receiver_id: Set(receiver_id),
			status: Set(RelationshipStatus::Sent),
			created: Set(current_timestamp() as i64),
		};
		match relationship::Entity::insert(record)
			.on_conflict(
				OnConflict::columns([
					relationship::Column::SenderId,
					relationship::Column::ReceiverId,
				])
				.do_nothing()
				.to_owned(),
			)
			.exec(self.inner())
			.await
		{
			Ok(_) => Ok(true),
			Err(DbErr::RecordNotInserted) => Ok(false),
			Err(e) => Err(e.into()),
		}
	}

	async fn find_relationship(&self, relationship_id: i64) -> Result<Option<relationship::Model>> {
		Ok(relationship::Entity::find_by_id(relationship_id)
			.one(self.inner())
			.await?)
	}

	async fn update_relationship_status(
		&self, relationship_id: i64, status: RelationshipStatus,
	) -> Result<()> {
		let mut record = <relationship::ActiveModel as std::default::Default>::default();
		record.id = Set(relationship_id);
		record.status = Set(status);
		relationship::Entity::update(record).exec(self.inner()).await?;
		Ok(())
	}

	/// All requests this profile has sent, regardless of status.
	async fn fetch_sent_requests(&self, profile_id: i64) -> Result<Vec<FriendRequestInfo>> {
		let relationships = relationship::Entity::find()
			.filter(relationship::Column::SenderId.eq(profile_id))
			.order_by_asc(relationship::Column::Id)
			.all(self.inner())
			.await?;

		let mut requests = Vec::with_capacity(relationships.len());
		for relationship in relationships {
			let receiver = self
				.find_profile_by_id(relationship.receiver_id)
				.await?
				.ok_or(Error::ProfileNotFound(relationship.receiver_id))?;
			requests.push(FriendRequestInfo {
				relationship_id: relationship.id,
				other: receiver.into(),
				status: relationship.status,
			});
		}
		Ok(requests)
	}

	/// Requests addressed to this profile that are still waiting on an
	/// answer. Accepted ones drop out because of the status filter.
	async fn fetch_received_requests(&self, profile_id: i64) -> Result<Vec<FriendRequestInfo>> {
		let relationships = relationship::Entity::find()
			.filter(relationship::Column::ReceiverId.eq(profile_id))
			.filter(relationship::Column::Status.eq(RelationshipStatus::Sent))
			.order_by_asc(relationship::Column::Id)
			.all(self.inner())
			.await?;

		let mut requests = Vec::with_capacity(relationships.len());
		for relationship in relationships {
			let sender = self
				.find_profile_by_id(relationship.sender_id)
				.await?
				.ok_or(Error::ProfileNotFound(relationship.sender_id))?;
			requests.push(FriendRequestInfo {
				relationship_id: relationship.id,
				other: sender.into(),
				status: relationship.status,
			});
		}
		Ok(requests)
	}

	/// Everyone that can still be offered as a new friend: all profiles
	/// except the acting one, its friends, and anyone it has already sent a
	/// request to. The last exclusion covers all statuses on purpose; an
	/// accepted receiver is also in the friend list, but filtering on the
	/// relationship alone keeps the set right even mid-accept.
	async fn fetch_discoverable_profiles(
		&self, acting: &profile::Model,
	) -> Result<Vec<profile::Model>> {
		let friend_users = self.fetch_friend_users(acting.id).await?;
		let already_requested: Vec<i64> = relationship::Entity::find()
			.filter(relationship::Column::SenderId.eq(acting.id))
			.all(self.inner())
			.await?
			.into_iter()
			.map(|r| r.receiver_id)
			.collect();

		Ok(profile::Entity::find()
			.filter(profile::Column::Id.ne(acting.id))
			.filter(profile::Column::User.is_not_in(friend_users))
			.filter(profile::Column::Id.is_not_in(already_requested))
			.order_by_asc(profile::Column::User)
			.all(self.inner())
			.await?)
	}

	async fn create_post(&self, author: &str, message: &str) -> Result<post::Model> {
		let record = post::ActiveModel {
			id: NotSet,
			author: Set(author.to_string()),
			message: Set(message.to_string()),
			created: Set(current_timestamp() as i64),
		};
		Ok(record.insert(self.inner()).await?)
	}

	async fn find_post(&self, post_id: i64) -> Result<Option<post::Model>> {
		Ok(post::Entity::find_by_id(post_id).one(self.inner()).await?)
	}

	async fn fetch_posts_by_author(&self, author: &str) -> Result<Vec<post::Model>> {
		Ok(post::Entity::find()
			.filter(post::Column::Author.eq(author))
			.order_by_desc(post::Column::Created)
			.all(self.inner())
			.await?)
	}

	async fn fetch_posts_by_authors(&self, authors: Vec<String>) -> Result<Vec<post::Model>> {
		if authors.is_empty() {
			return Ok(Vec::new());
		}
		Ok(post::Entity::find()
			.filter(post::Column::Author.is_in(authors))
			.order_by_desc(post::Column::Created)
			.all(self.inner())
			.await?)
	}

	async fn create_comment(
		&self, post_id: i64, author: &str, message: &str,
	) -> Result<comment::Model> {
		let record = comment::ActiveModel {
			id: NotSet,
			post_id: Set(post_id),
			author: Set(author.to_string()),
			message: Set(message.to_string()),
			created: Set(current_timestamp() as i64),
		};
		Ok(record.insert(self.inner()).await?)
	}

	async fn fetch_comments(&self, post_id: i64) -> Result<Vec<comment::Model>> {
		Ok(comment::Entity::find()
			.filter(comment::Column::PostId.eq(post_id))
			.order_by_asc(comment::Column::Created)
			.all(self.inner())
			.await?)
	}

	async fn count_comments(&self, post_id: i64) -> Result<u64> {
		Ok(comment::Entity::find()
			.filter(comment::Column::PostId.eq(post_id))
			.count(self.inner())
			.await?)
	}

	async fn count_likes(&self, post_id: i64) -> Result<u64> {
		Ok(post_like::Entity::find()
			.filter(post_like::Column::PostId.eq(post_id))
			.count(self.inner())
			.await?)
	}

	async fn has_liked(&self, post_id: i64, user: &str) -> Result<bool> {
		let count = post_like::Entity::find()
			.filter(post_like::Column::PostId.eq(post_id))
			.filter(post_like::Column::Author.eq(user))
			.count(self.inner())
			.await?;
		Ok(count > 0)
	}

	/// The unique index over (post_id, author) backs up the caller-side
	/// existence check under concurrent submissions.
	async fn create_like(&self, post_id: i64, author: &str) -> Result<bool> {
		let record = post_like::ActiveModel {
			id: NotSet,
			post_id: Set(post_id),
			author: Set(author.to_string()),
			created: Set(current_timestamp() as i64),
		};
		match post_like::Entity::insert(record)
			.on_conflict(
				OnConflict::columns([post_like::Column::PostId, post_like::Column::Author])
					.do_nothing()
					.to_owned(),
			)
			.exec(self.inner())
			.await
		{
			Ok(_) => Ok(true),
			Err(DbErr::RecordNotInserted) => Ok(false),
			Err(e) => Err(e.into()),
		}
	}

	async fn load_post_info(&self, post: post::Model, viewer: &str) -> Result<PostInfo> {
		let comments = self.count_comments(post.id).await?;
		let likes = self.count_likes(post.id).await?;
		let liked_by_me = self.has_liked(post.id, viewer).await?;
		Ok(PostInfo {
			id: post.id,
			author: post.author,
			message: post.message,
			created: post.created as u64,
			comments,
			likes,
			liked_by_me,
		})
	}
}


impl Database {
	pub async fn load(path: PathBuf) -> Result<Self> {
		let mut opts = ConnectOptions::new(format!("sqlite://{}?mode=rwc", path.display()));
		opts.idle_timeout(Duration::from_secs(10));
		opts.acquire_timeout(Duration::from_secs(1));
		let orm = sea_orm::Database::connect(opts).await?;

		let installed = orm
			.query_one(Statement::from_string(
				DbBackend::Sqlite,
				"SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'version'",
			))
			.await?;
		if installed.is_none() {
			info!("Installing database schema at {}", path.display());
			orm.execute_unprepared(install::QUERY).await?;
		}

		Ok(Self { orm })
	}

	pub async fn transaction(&self) -> Result<Transaction> {
		let tx = self.orm.begin().await?;
		Ok(Transaction(tx))
	}
}

impl Transaction {
	pub async fn commit(self) -> Result<()> {
		self.0.commit().await?;
		Ok(())
	}
}

impl PersistenceHandle for Database {
	type Inner = DatabaseConnection;

	fn inner(&self) -> &Self::Inner { &self.orm }
}

impl PersistenceHandle for Transaction {
	type Inner = DatabaseTransaction;

	fn inner(&self) -> &Self::Inner { &self.0 }
}
