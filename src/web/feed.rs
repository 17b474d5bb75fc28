use std::sync::Arc;

use axum::{
	body::Body,
	extract::{Multipart, State},
	middleware::from_fn_with_state,
	response::Response,
	routing::get,
	Extension, Router,
};
#[cfg(debug_assertions)]
use rss::validation::Validate;
use rss::{ChannelBuilder, ItemBuilder};
use tera::Context;

use super::{action::FormAction, common::*, identity_middleware, Global};
use crate::entity::profile;


pub fn router(g: Arc<Global>) -> Router<Arc<Global>> {
	Router::new()
		.route("/", get(my_feed))
		.route("/friends", get(friends_feed).post(friends_feed_post))
		.route("/rss", get(rss_feed))
		.route_layer(from_fn_with_state(g, identity_middleware))
}


async fn my_feed(
	State(g): State<Arc<Global>>, Extension(acting): Extension<profile::Model>,
) -> Response {
	let posts: Vec<PostDisplayInfo> = match g.api.my_feed(&acting.user).await {
		Ok(p) => p.into_iter().map(into_post_display_info).collect(),
		Err(e) => return db_error_response(e, "unable to fetch your feed"),
	};

	let mut context = Context::new();
	context.insert("user", &acting.user);
	context.insert("posts", &posts);
	g.render("feed.html.tera", context)
}

async fn friends_feed(
	State(g): State<Arc<Global>>, Extension(acting): Extension<profile::Model>,
) -> Response {
	let posts: Vec<PostDisplayInfo> = match g.api.friends_feed(&acting).await {
		Ok(p) => p.into_iter().map(into_post_display_info).collect(),
		Err(e) => return db_error_response(e, "unable to fetch the friends feed"),
	};

	let mut context = Context::new();
	context.insert("user", &acting.user);
	context.insert("posts", &posts);
	g.render("friends_feed.html.tera", context)
}

async fn friends_feed_post(
	State(g): State<Arc<Global>>, Extension(acting): Extension<profile::Model>, form: Multipart,
) -> Response {
	let action = match FormAction::from_form(form).await {
		Ok(a) => a,
		Err(r) => return r,
	};

	match action {
		Some(FormAction::Like { post_id }) =>
			if let Err(e) = g.api.like_post(&acting.user, post_id).await {
				return db_error_response(e, "unable to like post");
			},
		Some(_) => return error_response(400, "unsupported action for this view"),
		// Nothing submitted, just show the feed again
		None => return friends_feed(State(g), Extension(acting)).await,
	}
	see_other("/feed/friends")
}

async fn rss_feed(
	State(g): State<Arc<Global>>, Extension(acting): Extension<profile::Model>,
) -> Response {
	let posts = match g.api.friends_feed(&acting).await {
		Ok(p) => p,
		Err(e) => return db_error_response(e, "unable to fetch the friends feed"),
	};

	let mut channel_builder = ChannelBuilder::default();
	channel_builder
		.title(format!("Friends feed of {}", acting.user))
		.link(&g.server_info.url_base)
		.description("Posts from your friends.");

	let mut items = Vec::with_capacity(posts.len());
	for post in posts {
		let item = ItemBuilder::default()
			.title(format!("Post by {}", post.author))
			.link(format!(
				"{}/post/{}/comments",
				&g.server_info.url_base, post.id
			))
			.description(post.message.clone())
			.build();
		items.push(item);
	}
	channel_builder.items(items);
	let channel = channel_builder.build();

	#[cfg(debug_assertions)]
	channel.validate().expect("RSS feed validation error");

	Response::builder()
		.header("Content-Type", "application/rss+xml")
		.body(Body::from(channel.to_string()))
		.unwrap()
}
