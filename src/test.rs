//! Helpers for setting up test databases and APIs.

use log::*;
use tempfile::NamedTempFile;

use crate::{
	api::Api,
	db::{Database, PersistenceHandle},
	migration::Migrations,
};


pub async fn load_database(filename: &str) -> Database {
	let temp_file = NamedTempFile::with_prefix(filename).unwrap();
	let db = Database::load(temp_file.path().to_owned())
		.await
		.expect("unable to load database");
	let migrations = Migrations::load();
	migrations.run(db.inner()).await.expect("migration issue");
	debug!("Loaded database at {}", temp_file.path().display());
	// Leak it on purpose so that the temp file may live until the end of all tests
	Box::into_raw(Box::new(temp_file));
	db
}

/// Sets up an API with a fresh database and an existing seed profile.
pub async fn load_test_api(seed_user: &str, filename: &str) -> Api {
	let db = load_database(filename).await;
	let api = Api {
		db,
		seed_user: seed_user.to_string(),
	};
	api.ensure_profile(seed_user)
		.await
		.expect("unable to create seed profile");
	api
}
