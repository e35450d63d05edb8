//! User data model.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation errors raised by the user value constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// The email address does not match the accepted grammar.
    #[error("email address is not valid")]
    InvalidEmail,
}

/// Caller-assigned user identifier, unique across the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Wrap a raw integer identifier.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Raw integer value.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for UserId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier generated by the store when a record is inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StorageId(Uuid);

impl StorageId {
    /// Generate a new random storage identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an identifier read back from the store.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for StorageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

static EMAIL_USER_RE: OnceLock<Regex> = OnceLock::new();
static EMAIL_DOMAIN_RE: OnceLock<Regex> = OnceLock::new();

fn email_user_regex() -> &'static Regex {
    EMAIL_USER_RE.get_or_init(|| {
        // Dot-atom local part: RFC 5322 atext runs separated by single dots.
        let pattern = r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*$";
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("email user regex failed to compile: {error}"))
    })
}

fn email_domain_regex() -> &'static Regex {
    EMAIL_DOMAIN_RE.get_or_init(|| {
        let pattern = r"^(?:[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+[A-Za-z0-9][A-Za-z0-9-]{0,61}[A-Za-z0-9]$";
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("email domain regex failed to compile: {error}"))
    })
}

/// Syntactically valid email address.
///
/// ## Invariants
/// - Exactly one `@` separates a dot-atom local part from the domain.
/// - The domain is `localhost` or dotted LDH labels whose last label has at
///   least two characters. No label starts or ends with a hyphen.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and construct an [`EmailAddress`].
    ///
    /// # Examples
    /// ```
    /// use backend::domain::EmailAddress;
    ///
    /// assert!(EmailAddress::new("ada@example.org").is_ok());
    /// assert!(EmailAddress::new("ada@@example.org").is_err());
    /// ```
    pub fn new(email: impl Into<String>) -> Result<Self, UserValidationError> {
        let email = email.into();
        let Some((user, domain)) = email.rsplit_once('@') else {
            return Err(UserValidationError::InvalidEmail);
        };
        if !email_user_regex().is_match(user) || !is_valid_email_domain(domain) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(email))
    }
}

fn is_valid_email_domain(domain: &str) -> bool {
    if domain == "localhost" {
        return true;
    }
    email_domain_regex().is_match(domain)
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Directory user record.
///
/// Serialises as `{"id", "name", "email", "password"}`. The password is kept
/// exactly as submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: EmailAddress,
    pub password: String,
}

/// Merge-patch over a [`User`]; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub id: Option<UserId>,
    pub name: Option<String>,
    pub email: Option<EmailAddress>,
    pub password: Option<String>,
}

impl UserPatch {
    /// Return `true` when the patch sets no field at all.
    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.name.is_none() && self.email.is_none() && self.password.is_none()
    }

    /// Return `true` when applying the patch would change `user`.
    pub fn changes(&self, user: &User) -> bool {
        self.id.is_some_and(|id| id != user.id)
            || self.name.as_ref().is_some_and(|name| *name != user.name)
            || self.email.as_ref().is_some_and(|email| *email != user.email)
            || self
                .password
                .as_ref()
                .is_some_and(|password| *password != user.password)
    }

    /// Apply the patch to `user`, returning the merged record.
    pub fn apply_to(&self, user: &User) -> User {
        User {
            id: self.id.unwrap_or(user.id),
            name: self.name.clone().unwrap_or_else(|| user.name.clone()),
            email: self.email.clone().unwrap_or_else(|| user.email.clone()),
            password: self
                .password
                .clone()
                .unwrap_or_else(|| user.password.clone()),
        }
    }
}
