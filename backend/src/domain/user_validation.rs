//! Schema validation for user payloads.
//!
//! Inbound adapters hand over the raw JSON body; the validator either returns
//! a typed record or a [`FieldErrors`] map from field name to messages. Create
//! requests must carry every field, update requests any subset of them.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value, json};

use super::{EmailAddress, Error, User, UserId, UserPatch};

pub const MISSING_FIELD: &str = "Missing data for required field.";
pub const NULL_FIELD: &str = "Field may not be null.";
pub const NOT_AN_INTEGER: &str = "Not a valid integer.";
pub const NOT_A_STRING: &str = "Not a valid string.";
pub const NOT_AN_EMAIL: &str = "Not a valid email address.";
pub const UNKNOWN_FIELD: &str = "Unknown field.";
pub const INVALID_INPUT_TYPE: &str = "Invalid input type.";

/// Key used for errors that concern the payload as a whole.
pub const SCHEMA_KEY: &str = "_schema";

const KNOWN_FIELDS: [&str; 4] = ["id", "name", "email", "password"];

/// Field-level validation failures keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    /// Record `message` against `field`.
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    /// Return `true` when no errors were recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Messages recorded for `field`.
    pub fn messages(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    fn single(field: &str, message: &str) -> Self {
        let mut errors = Self::default();
        errors.push(field, message);
        errors
    }
}

impl From<FieldErrors> for Error {
    fn from(value: FieldErrors) -> Self {
        Error::validation_failed(json!(value))
    }
}

/// Validate a create payload: every field is required.
///
/// # Examples
/// ```
/// use backend::domain::user_validation::validate_new_user;
/// use serde_json::json;
///
/// let user = validate_new_user(&json!({
///     "id": 1, "name": "A", "email": "a@x.com", "password": "p"
/// }))
/// .expect("valid payload");
/// assert_eq!(user.id.get(), 1);
/// ```
pub fn validate_new_user(body: &Value) -> Result<User, FieldErrors> {
    let patch = validate_fields(body, true)?;
    match patch {
        UserPatch {
            id: Some(id),
            name: Some(name),
            email: Some(email),
            password: Some(password),
        } => Ok(User {
            id,
            name,
            email,
            password,
        }),
        _ => Err(FieldErrors::single(SCHEMA_KEY, MISSING_FIELD)),
    }
}

/// Validate an update payload: any subset of fields may be present.
pub fn validate_user_patch(body: &Value) -> Result<UserPatch, FieldErrors> {
    validate_fields(body, false)
}

fn validate_fields(body: &Value, required: bool) -> Result<UserPatch, FieldErrors> {
    let Value::Object(object) = body else {
        return Err(FieldErrors::single(SCHEMA_KEY, INVALID_INPUT_TYPE));
    };

    let mut errors = FieldErrors::default();
    for key in object.keys() {
        if !KNOWN_FIELDS.contains(&key.as_str()) {
            errors.push(key.as_str(), UNKNOWN_FIELD);
        }
    }

    let patch = UserPatch {
        id: field(object, "id", required, &mut errors, parse_id),
        name: field(object, "name", required, &mut errors, parse_string),
        email: field(object, "email", required, &mut errors, parse_email),
        password: field(object, "password", required, &mut errors, parse_string),
    };

    if errors.is_empty() {
        Ok(patch)
    } else {
        Err(errors)
    }
}

fn field<T>(
    object: &Map<String, Value>,
    name: &str,
    required: bool,
    errors: &mut FieldErrors,
    parse: fn(&Value) -> Result<T, &'static str>,
) -> Option<T> {
    let outcome = match object.get(name) {
        None if required => Err(MISSING_FIELD),
        None => return None,
        Some(Value::Null) => Err(NULL_FIELD),
        Some(value) => parse(value),
    };
    outcome.map_err(|message| errors.push(name, message)).ok()
}

fn parse_id(value: &Value) -> Result<UserId, &'static str> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().and_then(integral_f64))
            .map(UserId::new)
            .ok_or(NOT_AN_INTEGER),
        Value::String(text) => text
            .trim()
            .parse::<i64>()
            .map(UserId::new)
            .map_err(|_| NOT_AN_INTEGER),
        _ => Err(NOT_AN_INTEGER),
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "range and fractional part are checked before casting"
)]
fn integral_f64(value: f64) -> Option<i64> {
    // i64::MAX is not representable as f64; the exclusive bound is 2^63.
    const UPPER: f64 = 9_223_372_036_854_775_808.0;
    let in_range = value >= -UPPER && value < UPPER;
    (value.fract() == 0.0 && in_range).then_some(value as i64)
}

fn parse_string(value: &Value) -> Result<String, &'static str> {
    value.as_str().map(str::to_owned).ok_or(NOT_A_STRING)
}

fn parse_email(value: &Value) -> Result<EmailAddress, &'static str> {
    let text = value.as_str().ok_or(NOT_A_STRING)?;
    EmailAddress::new(text).map_err(|_| NOT_AN_EMAIL)
}
