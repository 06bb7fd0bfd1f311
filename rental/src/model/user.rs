// autorent
// Copyright 2026 The autorent Authors
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! Users as known to the identity provider, and their preferences.

use autorent_core::model::{ModelError, ModelResult};
use serde::{de::Visitor, Deserialize, Serialize};

/// Maximum length of a user identifier as specified in the schema.
const MAX_USER_ID_LENGTH: usize = 64;

/// Maximum length of an email address as specified in the schema.
const MAX_EMAIL_LENGTH: usize = 64;

/// Identifier of a user as issued by the identity provider.
///
/// The identifier is opaque to us but we restrict the characters it can contain so that it is
/// safe to embed in URLs and logs.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Creates a new user identifier from an untrusted string `s`, making sure it is valid.
    pub fn new<S: Into<String>>(s: S) -> ModelResult<Self> {
        let s = s.into();

        if s.is_empty() {
            return Err(ModelError("User id cannot be empty".to_owned()));
        }
        if s.len() > MAX_USER_ID_LENGTH {
            return Err(ModelError("User id is too long".to_owned()));
        }

        for ch in s.chars() {
            if !(ch.is_ascii_alphanumeric() || ch == '-' || ch == '_') {
                return Err(ModelError(format!(
                    "Unsupported character '{}' in user id '{}'",
                    ch, s
                )));
            }
        }

        Ok(Self(s))
    }

    /// Returns a string view of the identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(any(test, feature = "testutils"))]
impl From<&'static str> for UserId {
    /// Creates a new user identifier from a hardcoded string, which must be valid.
    fn from(id: &'static str) -> Self {
        UserId::new(id).expect("Hardcoded user ids must be valid")
    }
}

/// A deserialization visitor for a `UserId`.
struct UserIdVisitor;

impl Visitor<'_> for UserIdVisitor {
    type Value = UserId;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("a string")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        UserId::new(v).map_err(|e| E::custom(e.to_string()))
    }

    fn visit_string<E>(self, v: String) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        UserId::new(v).map_err(|e| E::custom(e.to_string()))
    }
}

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_string(UserIdVisitor)
    }
}

/// Represents a correctly-formatted email address.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Creates a new email address from an untrusted string `s`, making sure it is valid.
    pub fn new<S: Into<String>>(s: S) -> ModelResult<Self> {
        let s = s.into();

        if s.is_empty() {
            return Err(ModelError("Email address cannot be empty".to_owned()));
        }
        if s.len() > MAX_EMAIL_LENGTH {
            return Err(ModelError("Email address is too long".to_owned()));
        }
        if !s.contains('@') {
            return Err(ModelError(format!("Email address '{}' is missing an @ sign", s)));
        }
        if s.chars().any(char::is_whitespace) {
            return Err(ModelError(format!("Email address '{}' cannot contain spaces", s)));
        }

        Ok(Self(s))
    }

    /// Returns a string view of the email address.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(any(test, feature = "testutils"))]
impl From<&'static str> for EmailAddress {
    /// Creates a new email address from a hardcoded string, which must be valid.
    fn from(email: &'static str) -> Self {
        EmailAddress::new(email).expect("Hardcoded email addresses must be valid")
    }
}

/// A deserialization visitor for an `EmailAddress`.
struct EmailAddressVisitor;

impl Visitor<'_> for EmailAddressVisitor {
    type Value = EmailAddress;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("a string")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        EmailAddress::new(v).map_err(|e| E::custom(e.to_string()))
    }

    fn visit_string<E>(self, v: String) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        EmailAddress::new(v).map_err(|e| E::custom(e.to_string()))
    }
}

impl<'de> Deserialize<'de> for EmailAddress {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_string(EmailAddressVisitor)
    }
}

/// A user of the service, mirrored from the identity provider.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct User {
    /// Identifier of the user.
    pub id: UserId,

    /// Display name of the user.
    pub name: String,

    /// Contact email of the user.
    pub email: EmailAddress,

    /// Whether the user belongs to the rental staff.
    #[serde(default)]
    pub is_staff: bool,
}

/// Presentation preferences of a user.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct UserSettings {
    /// Whether the user prefers the dark theme.
    pub dark_mode: bool,

    /// Two-letter lowercase ISO 639-1 code of the preferred language.
    pub language: String,

    /// Three-letter uppercase ISO 4217 code of the preferred display currency.
    pub currency: String,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self { dark_mode: false, language: "en".to_owned(), currency: "USD".to_owned() }
    }
}

impl UserSettings {
    /// Checks that the language and currency codes are well-formed.
    pub fn validate(&self) -> ModelResult<()> {
        if self.language.len() != 2 || !self.language.chars().all(|c| c.is_ascii_lowercase()) {
            return Err(ModelError(format!(
                "Language must be a two-letter lowercase code; got '{}'",
                self.language
            )));
        }
        if self.currency.len() != 3 || !self.currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(ModelError(format!(
                "Currency must be a three-letter uppercase code; got '{}'",
                self.currency
            )));
        }
        Ok(())
    }
}
