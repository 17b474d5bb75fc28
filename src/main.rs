mod api;
mod common;
mod config;
mod db;
mod entity;
mod migration;
#[cfg(test)]
mod test;
mod web;

use std::{
	env, fmt,
	fs::File,
	io::{self, prelude::*},
	path::{Path, PathBuf},
	str::FromStr,
	sync::{
		atomic::{AtomicBool, Ordering},
		Arc,
	},
};

use api::Api;
use config::Config;
use db::Database;
use log::*;
use signal_hook::flag;

use crate::{db::PersistenceHandle, migration::Migrations};


fn initialize_logging() {
	let result = env::var_os("SYSTEM_LOG_FILE").map(|os| PathBuf::from(os));

	if let Some(filename) = result {
		simple_logging::log_to_file(filename, LevelFilter::Debug)
			.expect("unable to initialize logger")
	} else {
		env_logger::init()
	}
}

fn config_path() -> PathBuf {
	let user_path = PathBuf::from_str(config::CONFIG_FILE_USER_PATH).unwrap();
	if user_path.exists() {
		return user_path;
	}
	PathBuf::from_str(config::CONFIG_FILE_PATH).unwrap()
}

fn load_config<P>(path: P) -> Option<Config>
where
	P: AsRef<Path> + fmt::Debug,
{
	let mut file = match File::open(&path) {
		Err(e) => match e.kind() {
			io::ErrorKind::NotFound => {
				error!("Config file {:?} not found!", path);
				return None;
			}
			_ => {
				error!("Unable to open config file {:?}: {}", path, e);
				return None;
			}
		},
		Ok(f) => f,
	};

	let mut content = String::new();
	match file.read_to_string(&mut content) {
		Err(e) => {
			error!("Unable to read config file {:?}: {}", path, e);
			return None;
		}
		Ok(_) => {}
	}

	match toml::from_str(&content) {
		Err(e) => {
			error!("Unable to parse config file {:?}: {}", path, e);
			None
		}
		Ok(c) => Some(c),
	}
}

async fn load_database(config: &Config) -> io::Result<Database> {
	// If the path doesn't exist yet, create it
	let db_path = PathBuf::from_str(&config.database_path)
		.map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
	if let Some(parent) = db_path.parent() {
		if !parent.as_os_str().is_empty() {
			tokio::fs::create_dir_all(parent).await?;
		}
	}

	let db = Database::load(db_path)
		.await
		.map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
	Ok(db)
}

#[tokio::main]
async fn main() {
	initialize_logging();

	// Load config
	let config_path = config_path();
	let config = if let Some(config) = load_config(&config_path) {
		config
	} else {
		return;
	};

	// Catch signals
	let stop_flag = Arc::new(AtomicBool::new(false));
	flag::register(signal_hook::consts::SIGINT, stop_flag.clone()).unwrap();
	flag::register(signal_hook::consts::SIGTERM, stop_flag.clone()).unwrap();
	let stop_flag2 = stop_flag.clone();
	ctrlc::set_handler(move || {
		stop_flag2.store(true, Ordering::Relaxed);
	})
	.expect("Error setting Ctrl-C handler");

	// Load database
	let db = match load_database(&config).await {
		Ok(db) => db,
		Err(e) => {
			error!("Unable to load database: {}", e);
			return;
		}
	};

	// Run migrations (does nothing if there is nothing to migrate)
	{
		let migrations = Migrations::load();
		migrations.run(db.inner()).await.expect("migration issue");
	}

	// Make sure the seed profile exists before anybody's first request gets
	// its initial relationship pointed at it
	let api = Api {
		db,
		seed_user: config.seed_user().to_string(),
	};
	if let Err(e) = api.ensure_profile(config.seed_user()).await {
		error!("Unable to ensure the seed profile: {}", e);
		return;
	}

	// Serve the web interface until a stop signal arrives
	let port = config.web_interface_port.unwrap_or(80);
	let server_info = web::ServerInfo {
		url_base: config
			.url_base
			.clone()
			.unwrap_or(format!("http://localhost:{}", port)),
	};
	info!("Serving the web interface on port {}.", port);
	if let Err(e) = web::serve(stop_flag, port, api, server_info, config).await {
		error!("Unable to serve the web interface: {}", e);
	}
	info!("Exited.");
}
