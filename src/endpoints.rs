//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/delete/{expense_id}', use [format_endpoint].

/// The root route which lists all expenses and their total.
pub const ROOT: &str = "/";
/// The route for creating an expense from a submitted form.
pub const ADD_EXPENSE: &str = "/add";
/// The route for the edit page (GET) and for updating an expense (POST).
pub const UPDATE_EXPENSE: &str = "/update/{expense_id}";
/// The route for the delete confirmation page (GET) and for deleting an expense (POST).
pub const DELETE_EXPENSE: &str = "/delete/{expense_id}";
/// The route for the Prometheus text exposition of the app's metrics.
pub const METRICS: &str = "/metrics";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/delete/{expense_id}', '{expense_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.chars().enumerate() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
