use crate::error::AppError;

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

pub fn require_valid_id(field: &str, value: &str) -> Result<(), AppError> {
    if is_blank(value) {
        return Err(AppError::Validation(format!("{field} must be a valid ID")));
    }
    Ok(())
}

/// Inbound command fields arrive as optional strings; a blank string counts
/// as absent, under the same rule `require_valid_id` rejects.
pub fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !is_blank(v))
}
