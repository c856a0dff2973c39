//! Classification of storage-level write failures.
//!
//! The unique index on `users.email` is the authority for the uniqueness
//! invariant; when a write trips it, the raw driver error must surface as
//! `DuplicateEmail` rather than a generic storage failure. Storage engines
//! report the violation in different shapes (typed driver error, SQLSTATE
//! code, message text), so classification checks each in turn - while an
//! unrelated integrity error (foreign key, connectivity) must never be
//! mistaken for a duplicate.

use sea_orm::DbErr;
use sea_orm::error::SqlErr;

use crate::error::UserError;

/// Translate a write failure into a domain error
///
/// `email` is the normalized address the rejected write carried.
pub(crate) fn map_write_error(err: DbErr, email: &str) -> UserError {
    if is_email_unique_violation(&err) {
        return UserError::DuplicateEmail(email.to_string());
    }
    UserError::Storage(err.to_string())
}

/// Decide whether a database error is the email uniqueness constraint firing
pub(crate) fn is_email_unique_violation(err: &DbErr) -> bool {
    // Preferred signal: the driver recognized a unique-constraint violation.
    // The violation must name the email column or its key (Postgres calls
    // it `users_email_key`); any other unique key stays a storage failure.
    if let Some(sql_err) = err.sql_err() {
        return match sql_err {
            SqlErr::UniqueConstraintViolation(message) => message.to_lowercase().contains("email"),
            _ => false,
        };
    }

    // Fallback: pattern-match the flattened message. Postgres reports
    // SQLSTATE 23505 and names the violated constraint, e.g.
    // `duplicate key value violates unique constraint "users_email_key"`.
    let message = err.to_string().to_lowercase();
    let unique_violation = message.contains("duplicate key")
        || message.contains("unique constraint")
        || message.contains("23505");

    unique_violation && message.contains("email")
}
