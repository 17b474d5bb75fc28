use serde::*;


/// The file path of the configuration file
#[cfg(target_family = "unix")]
pub const CONFIG_FILE_PATH: &str = "/etc/palaver/config.toml";
#[cfg(target_family = "windows")]
pub const CONFIG_FILE_PATH: &str = "C:\\Program Files\\palaver\\config.toml";
/// A config file in the working directory takes precedence, which is also
/// what development setups use.
pub const CONFIG_FILE_USER_PATH: &str = "config.toml";

pub const DEFAULT_IDENTITY_HEADER: &str = "x-remote-user";
pub const DEFAULT_SEED_USER: &str = "admin";

#[derive(Clone, Deserialize)]
pub struct Config {
	pub database_path: String,

	/// The username of the profile that every new account gets its first
	/// friend request sent to.
	pub seed_user: Option<String>,
	/// The header that the fronting proxy puts the authenticated username in.
	pub identity_header: Option<String>,

	pub web_interface_port: Option<u16>,
	pub template_dir: Option<String>,
	pub static_dir: Option<String>,
	pub url_base: Option<String>,
}


impl Default for Config {
	fn default() -> Self {
		Self {
			database_path: String::default(),
			seed_user: None,
			identity_header: None,
			web_interface_port: None,
			template_dir: None,
			static_dir: None,
			url_base: None,
		}
	}
}

impl Config {
	pub fn identity_header(&self) -> &str {
		self.identity_header
			.as_deref()
			.unwrap_or(DEFAULT_IDENTITY_HEADER)
	}

	pub fn seed_user(&self) -> &str { self.seed_user.as_deref().unwrap_or(DEFAULT_SEED_USER) }
}
