use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User entity - the sole record type managed by this domain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier, assigned once at creation and never reused
    pub id: Uuid,
    /// Display name, 2-100 characters after trimming
    pub name: String,
    /// Email address, stored trimmed and lower-cased; unique across live records
    pub email: String,
    /// Age in years, 0-120 inclusive
    pub age: i32,
    /// Creation timestamp, fixed at the first successful persist
    pub created_at: DateTime<Utc>,
}

/// DTO for creating a new user
///
/// Fields are optional at the wire level so that missing values surface as
/// field-scoped validation errors rather than deserialization failures.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub age: Option<i32>,
}

/// DTO for a partial update
///
/// An absent field, or a blank string, means "leave unchanged" - never
/// "clear the field".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub age: Option<i32>,
}

/// A fully validated and normalized create request
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub age: i32,
}

/// The validated, normalized subset of fields a partial update provides
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub age: Option<i32>,
}

impl User {
    /// Materialize a validated request into a persistable record
    ///
    /// The identifier and creation timestamp are fixed here, at the moment
    /// of the first persist, and never change afterwards.
    pub fn new(input: NewUser) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: input.name,
            email: input.email,
            age: input.age,
            created_at: Utc::now(),
        }
    }

    /// Merge validated changes onto this record
    ///
    /// Only provided fields overwrite; `id` and `created_at` are never
    /// touched.
    pub fn apply_update(&mut self, changes: UserChanges) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(email) = changes.email {
            self.email = email;
        }
        if let Some(age) = changes.age {
            self.age = age;
        }
    }
}
