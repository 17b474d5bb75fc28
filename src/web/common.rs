use std::fmt::{Debug, Display};

use ::serde::Serialize;
use axum::{body::Body, response::Response};
use chrono::*;
use log::*;

use crate::db::{self, CommentInfo, PostInfo};


#[derive(Debug, Serialize)]
pub struct PostDisplayInfo {
	pub id: i64,
	pub author: String,
	pub message: String,
	pub created: String,
	pub time_ago: String,
	pub comments: u64,
	pub likes: u64,
	pub liked_by_me: bool,
}

#[derive(Debug, Serialize)]
pub struct CommentDisplayInfo {
	pub id: i64,
	pub author: String,
	pub message: String,
	pub created: String,
	pub time_ago: String,
}

pub fn into_post_display_info(post: PostInfo) -> PostDisplayInfo {
	let (created, time_ago) = display_timestamp(post.created);

	PostDisplayInfo {
		id: post.id,
		author: post.author,
		message: post.message,
		created,
		time_ago,
		comments: post.comments,
		likes: post.likes,
		liked_by_me: post.liked_by_me,
	}
}

pub fn into_comment_display_info(comment: CommentInfo) -> CommentDisplayInfo {
	let (created, time_ago) = display_timestamp(comment.created);

	CommentDisplayInfo {
		id: comment.id,
		author: comment.author,
		message: comment.message,
		created,
		time_ago,
	}
}

fn display_timestamp(timestamp: u64) -> (String, String) {
	let created = Utc.timestamp_millis_opt(timestamp as i64).unwrap();
	let time_ago = human_readable_duration(&Utc::now().signed_duration_since(created));
	(
		format!("{}", created.format("%Y-%m-%d %H:%M:%S")),
		time_ago,
	)
}

pub fn human_readable_duration(duration: &Duration) -> String {
	let (amount, unit) = if duration.num_weeks() > 0 {
		(duration.num_weeks(), "week")
	} else if duration.num_days() > 0 {
		(duration.num_days(), "day")
	} else if duration.num_hours() > 0 {
		(duration.num_hours(), "hour")
	} else if duration.num_minutes() > 0 {
		(duration.num_minutes(), "minute")
	} else {
		(duration.num_seconds(), "second")
	};
	if amount == 1 {
		format!("1 {}", unit)
	} else {
		format!("{} {}s", amount, unit)
	}
}

pub fn see_other(location: &str) -> Response {
	Response::builder()
		.status(303)
		.header("Location", location)
		.body(Body::empty())
		.unwrap()
}

pub fn error_response<S>(status_code: u16, message: S) -> Response
where
	S: Into<String>,
{
	let string: String = message.into();
	if status_code >= 400 {
		warn!("HTTP {} error: {}", status_code, &string);
	}
	Response::builder()
		.status(status_code)
		.header("Content-Type", "text/plain")
		.body(Body::from(string))
		.unwrap()
}

pub fn not_found_error_response(message: &str) -> Response { error_response(404, message) }

pub fn server_error_response<E>(e: E, message: &str) -> Response
where
	E: Debug + Display,
{
	error!("{}: {:?}", message, e);
	error_response(500, format!("{}: {}", message, e))
}

/// Maps a persistence error onto the right status code: missing entities
/// terminate the request as a 404, a refused accept as a 403, anything else
/// is a plain server error.
pub fn db_error_response(e: db::Error, message: &str) -> Response {
	match &e {
		db::Error::ProfileNotFound(_)
		| db::Error::PostNotFound(_)
		| db::Error::RelationshipNotFound(_) =>
			not_found_error_response(&format!("{}: {}", message, e)),
		db::Error::NotYourRequest(_) => error_response(403, format!("{}: {}", message, e)),
		db::Error::OrmError(_) => server_error_response(e, message),
	}
}
