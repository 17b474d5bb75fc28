//! A directed friend request from one profile to another. The unique index
//! over (sender_id, receiver_id) keeps a resubmitted request from creating a
//! second row.

use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "relationship")]
pub struct Model {
	#[sea_orm(primary_key, auto_increment = true)]
	pub id: i64,
	pub sender_id: i64,
	pub receiver_id: i64,
	pub status: RelationshipStatus,
	pub created: i64,
}

/// Status only ever moves from `Sent` to `Accepted`. There is no cancel or
/// reject transition.
#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
#[serde(rename_all = "lowercase")]
pub enum RelationshipStatus {
	#[sea_orm(string_value = "sent")]
	Sent,
	#[sea_orm(string_value = "accepted")]
	Accepted,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
