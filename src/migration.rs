//! Schema migrations, applied at startup.
use std::fmt;

use async_trait::async_trait;
use log::info;
use sea_orm::{
	ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbBackend, DbErr, Statement,
	TransactionTrait,
};

mod v0_1;


/// The schema version a fully migrated database is at.
pub const LATEST_VERSION: Version = Version { major: 0, minor: 1 };


#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version {
	major: u32,
	minor: u32,
}

pub struct Migrations {
	/// Available migrations, ordered at version
	list: Vec<(Version, Box<dyn MigrationTrait>)>,
}

#[async_trait]
trait MigrationTrait: Send + Sync {
	async fn run(&self, tx: &DatabaseTransaction) -> Result<(), DbErr>;
}


impl Migrations {
	pub fn load() -> Self {
		Self {
			list: vec![(Version::new(0, 1), Box::new(v0_1::Migration))],
		}
	}

	async fn load_version(&self, connection: &DatabaseConnection) -> Result<Version, DbErr> {
		let row = connection
			.query_one(Statement::from_string(
				DbBackend::Sqlite,
				"SELECT major, minor FROM version",
			))
			.await?
			.expect("no version in the database");
		Ok(Version::new(
			row.try_get_by_index(0)?,
			row.try_get_by_index(1)?,
		))
	}

	async fn store_version(
		&self, tx: &DatabaseTransaction, version: &Version,
	) -> Result<(), DbErr> {
		tx.execute(Statement::from_sql_and_values(
			DbBackend::Sqlite,
			"UPDATE version SET major = ?, minor = ?",
			[version.major.into(), version.minor.into()],
		))
		.await?;
		Ok(())
	}

	pub async fn run(&self, connection: &DatabaseConnection) -> Result<(), DbErr> {
		// Schema changes shouldn't trip over existing rows
		connection
			.execute_unprepared("PRAGMA foreign_keys=off")
			.await?;

		let mut current = self.load_version(connection).await?;
		for (version, migration) in &self.list {
			if *version <= current {
				continue;
			}
			info!("Migrating database from {} to {}...", current, version);
			let tx = connection.begin().await?;
			migration.run(&tx).await?;
			self.store_version(&tx, version).await?;
			tx.commit().await?;
			current = *version;
		}
		assert_eq!(current, LATEST_VERSION, "not migrated to latest version");

		connection
			.execute_unprepared("PRAGMA foreign_keys=on")
			.await?;
		Ok(())
	}
}

impl Version {
	pub fn new(major: u32, minor: u32) -> Self { Self { major, minor } }
}

impl fmt::Display for Version {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "v{}.{}", self.major, self.minor)
	}
}
