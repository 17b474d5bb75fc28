use std::sync::Arc;

use axum::{
	extract::State, middleware::from_fn_with_state, response::Response, routing::get, Extension,
	Form, Router,
};
use serde::Deserialize;
use tera::Context;

use super::{common::*, identity_middleware, Global};
use crate::entity::profile;


#[derive(Deserialize)]
struct ProfileFormData {
	display_name: Option<String>,
	about: Option<String>,
}


pub fn router(g: Arc<Global>) -> Router<Arc<Global>> {
	Router::new()
		.route("/", get(profile_get).post(profile_post))
		.route_layer(from_fn_with_state(g, identity_middleware))
}


async fn profile_get(
	State(g): State<Arc<Global>>, Extension(acting): Extension<profile::Model>,
) -> Response {
	let mut context = Context::new();
	context.insert("user", &acting.user);
	context.insert("display_name", &acting.display_name);
	context.insert("about", &acting.about);
	g.render("profile.html.tera", context)
}

async fn profile_post(
	State(g): State<Arc<Global>>, Extension(acting): Extension<profile::Model>,
	Form(form): Form<ProfileFormData>,
) -> Response {
	let display_name = form.display_name.filter(|s| !s.trim().is_empty());
	let about = form.about.filter(|s| !s.trim().is_empty());

	if let Err(e) = g.api.update_profile(&acting, display_name, about).await {
		return db_error_response(e, "unable to update profile");
	}
	see_other("/profile")
}
