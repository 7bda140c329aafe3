//! Custom validators

use std::borrow::Cow;
use uuid::Uuid;
use validator::ValidationError;

/// Reject strings made only of whitespace
pub fn validate_not_blank(text: &str) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        let mut e = ValidationError::new("not_blank");
        e.message = Some(Cow::from("Must not be blank"));
        return Err(e);
    }
    Ok(())
}

/// Reject the nil uuid, which clients send for "no chat selected"
pub fn validate_chat_id(id: &Uuid) -> Result<(), ValidationError> {
    if id.is_nil() {
        let mut e = ValidationError::new("chat_id");
        e.message = Some(Cow::from("Must not be the nil uuid"));
        return Err(e);
    }
    Ok(())
}

// ============================== // tests // ============================== //
