//! One side of the symmetric friend relation. The unique index over
//! (profile_id, friend_user) is what gives the friend list its set semantics:
//! inserting the same edge twice is conflict-ignored.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "friend")]
pub struct Model {
	#[sea_orm(primary_key, auto_increment = true)]
	pub id: i64,
	pub profile_id: i64,
	pub friend_user: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
