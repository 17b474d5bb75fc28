mod action;
mod common;
mod feed;
mod friends;
mod post;
mod profile;

use std::{
	net::*,
	sync::{atomic::*, Arc},
	time::Duration,
};

use ::serde::*;
use axum::{
	body::Body,
	extract::{Request, State},
	middleware::Next,
	response::Response,
	routing::get,
	Router,
};
use tera::{Context, Tera};
use tokio::time::sleep;
use tower_http::services::ServeDir;

use self::common::*;
use crate::{api::Api, config::Config, db};


pub struct Global {
	pub config: Config,
	pub server_info: ServerInfo,
	pub api: Api,
	pub template_engine: Tera,
}

#[derive(Clone, Serialize)]
pub struct ServerInfo {
	pub url_base: String,
}


impl Global {
	pub fn render(&self, template_name: &str, context: Context) -> Response {
		let mut complete_context = Context::new();
		complete_context.insert("server", &self.server_info);
		complete_context.extend(context);

		match self
			.template_engine
			.render(template_name, &complete_context)
		{
			Err(e) => server_error_response(
				e,
				&format!("Unable to render template \"{}\"", template_name),
			),
			Ok(html) => Response::builder()
				.header("Content-Type", "text/html")
				.body(Body::from(html))
				.unwrap(),
		}
	}
}

pub async fn serve(
	stop_flag: Arc<AtomicBool>, port: u16, api: Api, server_info: ServerInfo, config: Config,
) -> db::Result<()> {
	let template_dir = config
		.template_dir
		.clone()
		.unwrap_or("templates".to_string());
	let static_dir = config.static_dir.clone().unwrap_or("static".to_string());
	let global = Arc::new(Global {
		api,
		server_info,
		template_engine: Tera::new(&format!("{}/**/*.tera", template_dir)).unwrap(),
		config,
	});

	let app = Router::new()
		.route("/", get(home))
		.nest_service("/static", ServeDir::new(static_dir))
		.nest("/feed", feed::router(global.clone()))
		.nest("/friends", friends::router(global.clone()))
		.nest("/post", post::router(global.clone()))
		.nest("/profile", profile::router(global.clone()))
		.with_state(global);

	let addr = SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, port);
	let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
	axum::serve(listener, app.into_make_service())
		.with_graceful_shutdown(async move {
			while !stop_flag.load(Ordering::Relaxed) {
				sleep(Duration::from_secs(1)).await;
			}
		})
		.await
		.unwrap();
	Ok(())
}

/// Resolves the acting user from the identity header that the fronting proxy
/// sets, and puts their profile on the request. The profile is created on a
/// user's very first request, which is also when their seed relationship is
/// planted.
async fn identity_middleware(
	State(g): State<Arc<Global>>, mut request: Request, next: Next,
) -> Response {
	let user = match request.headers().get(g.config.identity_header()) {
		Some(value) => match value.to_str() {
			Ok(user) if !user.is_empty() => user.to_string(),
			_ => return error_response(400, "invalid identity header"),
		},
		None => return error_response(401, "no identity on the request"),
	};

	let acting = match g.api.ensure_profile(&user).await {
		Ok(p) => p,
		Err(e) => return db_error_response(e, "unable to load acting profile"),
	};
	request.extensions_mut().insert(acting);

	next.run(request).await
}

async fn home(State(g): State<Arc<Global>>) -> Response { g.render("home.html.tera", Context::new()) }
