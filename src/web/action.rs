use axum::{
	extract::{multipart::Field, Multipart},
	response::Response,
};
use log::*;

use super::common::*;


/// One decoded form submission. Which named button carried a value decides
/// what the post request means; every handler matches on the variants it
/// serves and refuses the rest.
#[derive(Debug, PartialEq, Eq)]
pub enum FormAction {
	Like { post_id: i64 },
	SendRequests { receivers: Vec<i64> },
	ReceiveRequests { relationships: Vec<i64> },
	AddComment { message: String },
}

impl FormAction {
	/// Decodes a multipart form body into at most one action. Unrecognized
	/// fields are logged and skipped, malformed ids and conflicting actions
	/// are refused.
	pub async fn from_form(mut form: Multipart) -> Result<Option<Self>, Response> {
		let mut like = None;
		let mut send_requests = Vec::new();
		let mut receive_requests = Vec::new();
		let mut add_comment = false;
		let mut comment = String::new();

		loop {
			let field = match form.next_field().await {
				Ok(Some(f)) => f,
				Ok(None) => break,
				Err(e) =>
					return Err(error_response(
						400,
						format!("unable to read form body: {}", e),
					)),
			};
			let name = field.name().unwrap_or_default().to_string();

			match name.as_str() {
				"like" => like = Some(parse_id(&field_text(field).await?)?),
				"send_requests" => send_requests.push(parse_id(&field_text(field).await?)?),
				"receive_requests" => receive_requests.push(parse_id(&field_text(field).await?)?),
				"add_comment" => {
					field_text(field).await?;
					add_comment = true;
				}
				"comment" => comment = field_text(field).await?,
				other => warn!("Unrecognized form field: {}", other),
			}
		}

		let mut actions = Vec::new();
		if let Some(post_id) = like {
			actions.push(FormAction::Like { post_id });
		}
		if !send_requests.is_empty() {
			actions.push(FormAction::SendRequests {
				receivers: send_requests,
			});
		}
		if !receive_requests.is_empty() {
			actions.push(FormAction::ReceiveRequests {
				relationships: receive_requests,
			});
		}
		if add_comment {
			actions.push(FormAction::AddComment { message: comment });
		}

		if actions.len() > 1 {
			return Err(error_response(400, "conflicting form actions"));
		}
		Ok(actions.pop())
	}
}

async fn field_text(field: Field<'_>) -> Result<String, Response> {
	let data = field.bytes().await.map_err(|e| {
		error_response(400, format!("unable to read form field: {}", e))
	})?;
	Ok(String::from_utf8_lossy(&data).to_string())
}

fn parse_id(string: &str) -> Result<i64, Response> {
	string
		.trim()
		.parse()
		.map_err(|_| error_response(400, format!("not a valid id: {}", string)))
}
