//! Item record decode/encode.

use crate::error::DecodeError;
use crate::remote::RawAttrs;
use crate::status::Status;
use crate::types::{Item, ItemId, OwnerId, Photo, Timestamp};
use serde_json::Value;

/// Decode one raw record into a typed item.
///
/// Optional fields (location, email, photo) default to absent. Required
/// text fields may be missing on legacy records; they decode to empty
/// strings and the item stays read-only until corrected. A missing or
/// unknown status, or a wrong-typed field, is a structured error; the
/// caller skips the record and keeps the rest of the snapshot.
pub fn decode(key: &str, attrs: &RawAttrs) -> Result<Item, DecodeError> {
    let status_id = match attrs.get("status_id") {
        None | Some(Value::Null) => return Err(DecodeError::MissingField("status_id")),
        Some(value) => value
            .as_i64()
            .ok_or(DecodeError::WrongType("status_id"))?,
    };
    let status = Status::from_id(status_id).ok_or(DecodeError::UnknownStatus(status_id))?;

    Ok(Item {
        id: Some(ItemId(key.to_string())),
        owner_id: OwnerId(required_text(attrs, "user_id")?),
        title: required_text(attrs, "title")?,
        description: required_text(attrs, "description")?,
        location: optional_text(attrs, "location")?,
        contact_name: required_text(attrs, "contact_name")?,
        contact_phone: required_text(attrs, "contact_phone")?,
        contact_email: optional_text(attrs, "contact_email")?,
        status,
        photo: decode_photo(attrs)?,
        created_at: timestamp(attrs, "created_at"),
        updated_at: timestamp(attrs, "updated_at"),
    })
}

/// Encode an item back into a raw record. The record key is carried outside
/// the attribute bag, so `id` is not written. Absent optional fields are
/// omitted entirely.
pub fn encode(item: &Item) -> RawAttrs {
    let mut attrs = RawAttrs::new();
    attrs.insert("user_id".to_string(), Value::from(item.owner_id.as_str()));
    attrs.insert("title".to_string(), Value::from(item.title.clone()));
    attrs.insert(
        "description".to_string(),
        Value::from(item.description.clone()),
    );
    attrs.insert(
        "contact_name".to_string(),
        Value::from(item.contact_name.clone()),
    );
    attrs.insert(
        "contact_phone".to_string(),
        Value::from(item.contact_phone.clone()),
    );
    attrs.insert("status_id".to_string(), Value::from(item.status.id()));
    attrs.insert("created_at".to_string(), Value::from(item.created_at.0));
    attrs.insert("updated_at".to_string(), Value::from(item.updated_at.0));

    if let Some(location) = &item.location {
        attrs.insert("location".to_string(), Value::from(location.clone()));
    }
    if let Some(email) = &item.contact_email {
        attrs.insert("contact_email".to_string(), Value::from(email.clone()));
    }
    if let Some(photo) = &item.photo {
        attrs.insert("image".to_string(), Value::from(photo.as_str()));
    }

    attrs
}

/// A required text field. Missing decodes to empty (legacy records);
/// non-string values are an error.
fn required_text(attrs: &RawAttrs, field: &'static str) -> Result<String, DecodeError> {
    match attrs.get(field) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(DecodeError::WrongType(field)),
    }
}

/// An optional text field. Missing or empty decodes to `None`.
fn optional_text(attrs: &RawAttrs, field: &'static str) -> Result<Option<String>, DecodeError> {
    match attrs.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(DecodeError::WrongType(field)),
    }
}

fn decode_photo(attrs: &RawAttrs) -> Result<Option<Photo>, DecodeError> {
    match attrs.get("image") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) if s.starts_with("data:image") => {
            Ok(Some(Photo::Encoded(s.clone())))
        }
        // Bare URL, passed through for remote loading.
        Some(Value::String(s)) => Ok(Some(Photo::Url(s.clone()))),
        Some(_) => Err(DecodeError::WrongType("image")),
    }
}

/// Timestamps tolerate legacy non-numeric values by defaulting to epoch 0.
fn timestamp(attrs: &RawAttrs, field: &str) -> Timestamp {
    Timestamp(attrs.get(field).and_then(Value::as_i64).unwrap_or(0))
}
