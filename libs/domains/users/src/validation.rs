//! Field validation and normalization.
//!
//! Pure, stateless functions that canonicalize and check each field in
//! isolation. Invalid input is a first-class result, not an error path, so
//! the service layer can aggregate every failing field into one response.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{FieldError, FieldErrors};
use crate::models::{CreateUser, NewUser, UpdateUser, UserChanges};

/// Simple email shape: local part, `@`, domain with at least one dot, and a
/// TLD of two or more letters.
static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9.%+_-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").unwrap());

const NAME_MIN_LEN: usize = 2;
const NAME_MAX_LEN: usize = 100;
const AGE_MIN: i32 = 0;
const AGE_MAX: i32 = 120;

/// Outcome of validating a single field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValidation<T> {
    /// The value passed validation; carries the normalized form
    Valid(T),
    /// The value was absent (or blank) and the field is not required
    Empty,
    /// The value was present but failed validation
    Invalid(&'static str),
}

/// Validate and trim a name
///
/// Blank input counts as absent: required absence is an error, optional
/// absence is `Empty`.
pub fn validate_name(raw: Option<&str>, required: bool) -> FieldValidation<String> {
    let trimmed = match raw.map(str::trim) {
        None | Some("") => {
            return if required {
                FieldValidation::Invalid("name is required")
            } else {
                FieldValidation::Empty
            };
        }
        Some(value) => value,
    };

    let length = trimmed.chars().count();
    if !(NAME_MIN_LEN..=NAME_MAX_LEN).contains(&length) {
        return FieldValidation::Invalid("name must be between 2 and 100 characters");
    }

    FieldValidation::Valid(trimmed.to_string())
}

/// Validate an email and normalize it to trimmed, lower-cased form
pub fn validate_email(raw: Option<&str>, required: bool) -> FieldValidation<String> {
    let trimmed = match raw.map(str::trim) {
        None | Some("") => {
            return if required {
                FieldValidation::Invalid("email is required")
            } else {
                FieldValidation::Empty
            };
        }
        Some(value) => value,
    };

    if !EMAIL_PATTERN.is_match(trimmed) {
        return FieldValidation::Invalid("email must contain @ and a dot in domain");
    }

    FieldValidation::Valid(trimmed.to_lowercase())
}

/// Validate an age against the inclusive [0, 120] range
pub fn validate_age(raw: Option<i32>, required: bool) -> FieldValidation<i32> {
    let age = match raw {
        None => {
            return if required {
                FieldValidation::Invalid("age is required")
            } else {
                FieldValidation::Empty
            };
        }
        Some(value) => value,
    };

    if !(AGE_MIN..=AGE_MAX).contains(&age) {
        return FieldValidation::Invalid("age must be between 0 and 120");
    }

    FieldValidation::Valid(age)
}

/// Normalize an email the same way `validate_email` does, without checking
/// the pattern. Used on lookup paths so case or whitespace differences
/// still match stored records.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Validate a create request, collecting every field failure
///
/// All three fields are required on this path. Failures are aggregated
/// rather than short-circuited, since callers display them together.
pub fn validate_create(input: &CreateUser) -> Result<NewUser, FieldErrors> {
    let mut errors = FieldErrors::default();

    let name = collect(&mut errors, "name", validate_name(input.name.as_deref(), true));
    let email = collect(
        &mut errors,
        "email",
        validate_email(input.email.as_deref(), true),
    );
    let age = collect(&mut errors, "age", validate_age(input.age, true));

    match (name, email, age) {
        (Some(name), Some(email), Some(age)) => Ok(NewUser { name, email, age }),
        _ => Err(errors),
    }
}

/// Validate a partial update, collecting every field failure
///
/// Each field is validated as not required: an absent or blank field is
/// "leave unchanged", but a provided invalid value fails the whole update.
pub fn validate_update(input: &UpdateUser) -> Result<UserChanges, FieldErrors> {
    let mut errors = FieldErrors::default();

    let name = collect(
        &mut errors,
        "name",
        validate_name(input.name.as_deref(), false),
    );
    let email = collect(
        &mut errors,
        "email",
        validate_email(input.email.as_deref(), false),
    );
    let age = collect(&mut errors, "age", validate_age(input.age, false));

    if errors.is_empty() {
        Ok(UserChanges { name, email, age })
    } else {
        Err(errors)
    }
}

fn collect<T>(
    errors: &mut FieldErrors,
    field: &'static str,
    outcome: FieldValidation<T>,
) -> Option<T> {
    match outcome {
        FieldValidation::Valid(value) => Some(value),
        FieldValidation::Empty => None,
        FieldValidation::Invalid(message) => {
            errors.push(FieldError { field, message });
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_trimmed_and_valid() {
        assert_eq!(
            validate_name(Some("  Ann  "), true),
            FieldValidation::Valid("Ann".to_string())
        );
    }

    #[test]
    fn test_name_required() {
        assert_eq!(
            validate_name(None, true),
            FieldValidation::Invalid("name is required")
        );
        assert_eq!(
            validate_name(Some("   "), true),
            FieldValidation::Invalid("name is required")
        );
    }

    #[test]
    fn test_name_optional_blank_is_empty() {
        assert_eq!(validate_name(None, false), FieldValidation::Empty);
        assert_eq!(validate_name(Some("  "), false), FieldValidation::Empty);
    }

    #[test]
    fn test_name_length_boundaries() {
        assert_eq!(
            validate_name(Some("A"), true),
            FieldValidation::Invalid("name must be between 2 and 100 characters")
        );
        assert_eq!(
            validate_name(Some("Ab"), true),
            FieldValidation::Valid("Ab".to_string())
        );

        let hundred = "a".repeat(100);
        assert_eq!(
            validate_name(Some(&hundred), true),
            FieldValidation::Valid(hundred.clone())
        );

        let too_long = "a".repeat(101);
        assert_eq!(
            validate_name(Some(&too_long), true),
            FieldValidation::Invalid("name must be between 2 and 100 characters")
        );
    }

    #[test]
    fn test_email_normalized_to_lowercase() {
        assert_eq!(
            validate_email(Some("  Ann@Example.COM "), true),
            FieldValidation::Valid("ann@example.com".to_string())
        );
    }

    #[test]
    fn test_email_required() {
        assert_eq!(
            validate_email(None, true),
            FieldValidation::Invalid("email is required")
        );
        assert_eq!(
            validate_email(Some(""), true),
            FieldValidation::Invalid("email is required")
        );
    }

    #[test]
    fn test_email_malformed() {
        for bad in ["bad-email", "missing@dot", "no-at.example.com", "a@b.c"] {
            assert_eq!(
                validate_email(Some(bad), true),
                FieldValidation::Invalid("email must contain @ and a dot in domain"),
                "expected {bad:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_email_accepts_plus_and_dots() {
        assert_eq!(
            validate_email(Some("first.last+tag@sub.example.co"), true),
            FieldValidation::Valid("first.last+tag@sub.example.co".to_string())
        );
    }

    #[test]
    fn test_age_boundaries() {
        assert_eq!(validate_age(Some(0), true), FieldValidation::Valid(0));
        assert_eq!(validate_age(Some(120), true), FieldValidation::Valid(120));
        assert_eq!(
            validate_age(Some(-1), true),
            FieldValidation::Invalid("age must be between 0 and 120")
        );
        assert_eq!(
            validate_age(Some(121), true),
            FieldValidation::Invalid("age must be between 0 and 120")
        );
    }

    #[test]
    fn test_age_required_vs_optional() {
        assert_eq!(
            validate_age(None, true),
            FieldValidation::Invalid("age is required")
        );
        assert_eq!(validate_age(None, false), FieldValidation::Empty);
    }

    #[test]
    fn test_validate_create_aggregates_all_failures() {
        let input = CreateUser {
            name: Some("J".to_string()),
            email: Some("bad-email".to_string()),
            age: Some(150),
        };

        let errors = validate_create(&input).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["name", "email", "age"]);
    }

    #[test]
    fn test_validate_create_normalizes() {
        let input = CreateUser {
            name: Some("  John  ".to_string()),
            email: Some("  John@Example.COM ".to_string()),
            age: Some(25),
        };

        let new_user = validate_create(&input).unwrap();
        assert_eq!(new_user.name, "John");
        assert_eq!(new_user.email, "john@example.com");
        assert_eq!(new_user.age, 25);
    }

    #[test]
    fn test_validate_update_blank_means_unchanged() {
        let input = UpdateUser {
            name: Some("   ".to_string()),
            email: None,
            age: None,
        };

        let changes = validate_update(&input).unwrap();
        assert_eq!(changes, UserChanges::default());
    }

    #[test]
    fn test_validate_update_invalid_field_fails_whole_update() {
        let input = UpdateUser {
            name: None,
            email: Some("not-an-email".to_string()),
            age: Some(40),
        };

        let errors = validate_update(&input).unwrap_err();
        assert_eq!(errors.iter().count(), 1);
        assert_eq!(errors.iter().next().unwrap().field, "email");
    }
}
