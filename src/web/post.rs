use std::sync::Arc;

use axum::{
	extract::{Multipart, Path, State},
	middleware::from_fn_with_state,
	response::Response,
	routing::get,
	Extension, Form, Router,
};
use serde::Deserialize;
use tera::Context;

use super::{action::FormAction, common::*, identity_middleware, Global};
use crate::entity::profile;


#[derive(Deserialize)]
struct NewPostFormData {
	message: String,
}


pub fn router(g: Arc<Global>) -> Router<Arc<Global>> {
	Router::new()
		.route("/new", get(new_post).post(new_post_post))
		.route("/:post-id/comments", get(comments).post(comments_post))
		.route_layer(from_fn_with_state(g, identity_middleware))
}


async fn new_post(
	State(g): State<Arc<Global>>, Extension(acting): Extension<profile::Model>,
) -> Response {
	let mut context = Context::new();
	context.insert("user", &acting.user);
	g.render("new_post.html.tera", context)
}

async fn new_post_post(
	State(g): State<Arc<Global>>, Extension(acting): Extension<profile::Model>,
	Form(form): Form<NewPostFormData>,
) -> Response {
	let message = form.message.trim();
	if message.is_empty() {
		// Nothing to publish, just show the form again
		return new_post(State(g), Extension(acting)).await;
	}

	match g.api.publish_post(&acting.user, message).await {
		Ok(_) => see_other("/feed"),
		Err(e) => db_error_response(e, "unable to publish post"),
	}
}

async fn comments(
	State(g): State<Arc<Global>>, Extension(acting): Extension<profile::Model>,
	Path(post_id): Path<i64>,
) -> Response {
	let (post, comments) = match g.api.post_comments(post_id, &acting.user).await {
		Ok(r) => r,
		Err(e) => return db_error_response(e, "unable to fetch post"),
	};
	let comments: Vec<CommentDisplayInfo> =
		comments.into_iter().map(into_comment_display_info).collect();

	let mut context = Context::new();
	context.insert("user", &acting.user);
	context.insert("post", &into_post_display_info(post));
	context.insert("comments", &comments);
	g.render("comments.html.tera", context)
}

async fn comments_post(
	State(g): State<Arc<Global>>, Extension(acting): Extension<profile::Model>,
	Path(post_id): Path<i64>, form: Multipart,
) -> Response {
	let action = match FormAction::from_form(form).await {
		Ok(a) => a,
		Err(r) => return r,
	};

	match action {
		Some(FormAction::AddComment { message }) => {
			let message = message.trim().to_string();
			if message.is_empty() {
				// Failed form validation, just show the post again
				return comments(State(g), Extension(acting), Path(post_id)).await;
			}
			if let Err(e) = g.api.add_comment(&acting.user, post_id, &message).await {
				return db_error_response(e, "unable to add comment");
			}
		}
		Some(_) => return error_response(400, "unsupported action for this view"),
		None => return comments(State(g), Extension(acting), Path(post_id)).await,
	}
	see_other(&format!("/post/{}/comments", post_id))
}
