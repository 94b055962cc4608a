//! The page to display when a submitted form is missing fields or has a
//! value that cannot be parsed.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::html::error_view;

pub struct BadRequest<'a> {
    pub description: &'a str,
    pub fix: &'a str,
}

impl IntoResponse for BadRequest<'_> {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_REQUEST,
            error_view("Bad Request", "400", self.description, self.fix),
        )
            .into_response()
    }
}
