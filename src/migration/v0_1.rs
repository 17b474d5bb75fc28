//! Adds the free-form `about` text to profiles.

use async_trait::async_trait;
use sea_orm::{ConnectionTrait, DatabaseTransaction, DbErr, ExecResult};

use super::MigrationTrait;


pub struct Migration;

#[async_trait]
impl MigrationTrait for Migration {
	async fn run(&self, tx: &DatabaseTransaction) -> Result<(), DbErr> {
		let _: ExecResult = tx
			.execute_unprepared("ALTER TABLE profile ADD COLUMN about TEXT")
			.await?;
		Ok(())
	}
}
