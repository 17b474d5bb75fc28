use std::sync::Arc;

use axum::{
	extract::{Multipart, State},
	middleware::from_fn_with_state,
	response::Response,
	routing::get,
	Extension, Router,
};
use tera::Context;

use super::{action::FormAction, common::*, identity_middleware, Global};
use crate::entity::profile;


pub fn router(g: Arc<Global>) -> Router<Arc<Global>> {
	Router::new()
		.route("/", get(overview).post(overview_post))
		.route_layer(from_fn_with_state(g, identity_middleware))
}


/// The friends listing is a pure read: friends, outgoing and incoming
/// requests, and everybody that can still be discovered.
async fn overview(
	State(g): State<Arc<Global>>, Extension(acting): Extension<profile::Model>,
) -> Response {
	let overview = match g.api.friends_overview(&acting).await {
		Ok(o) => o,
		Err(e) => return db_error_response(e, "unable to fetch the friends overview"),
	};

	let mut context = Context::new();
	context.insert("user", &acting.user);
	context.insert("friends", &overview.friends);
	context.insert("sent", &overview.sent);
	context.insert("received", &overview.received);
	context.insert("discoverable", &overview.discoverable);
	g.render("friends.html.tera", context)
}

async fn overview_post(
	State(g): State<Arc<Global>>, Extension(acting): Extension<profile::Model>, form: Multipart,
) -> Response {
	let action = match FormAction::from_form(form).await {
		Ok(a) => a,
		Err(r) => return r,
	};

	match action {
		Some(FormAction::SendRequests { receivers }) =>
			if let Err(e) = g.api.send_friend_requests(&acting, &receivers).await {
				return db_error_response(e, "unable to send friend requests");
			},
		Some(FormAction::ReceiveRequests { relationships }) =>
			if let Err(e) = g.api.accept_friend_requests(&acting, &relationships).await {
				return db_error_response(e, "unable to accept friend requests");
			},
		Some(_) => return error_response(400, "unsupported action for this view"),
		// Nothing submitted, just show the overview again
		None => return overview(State(g), Extension(acting)).await,
	}
	see_other("/friends")
}
