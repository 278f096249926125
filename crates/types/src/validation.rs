//! Validation for certificate form fields.
//!
//! Runs before a certificate number is generated, so a rejected form never
//! consumes a sequence number.
//!
//! ## Rules
//!
//! - Required text fields have a minimum length in characters (not bytes):
//!   `id_number` 2, `trainee_name` 2, `course_name` 3, `training_provider` 2,
//!   `instructor_name` 2.
//! - `telephone`, when present and non-empty, matches
//!   `[+]?[(]?\d{3}[)]?[-\s.]?\d{3}[-\s.]?\d{4,6}` over the whole value.
//! - `expiration_date`, when present, is strictly after `completion_date`.

use std::{fmt, iter::Peekable, str::Chars};

use crate::types::CertificateForm;

/// Minimum length of `id_number`, in characters.
pub const MIN_ID_NUMBER_CHARS: usize = 2;
/// Minimum length of `trainee_name`, in characters.
pub const MIN_TRAINEE_NAME_CHARS: usize = 2;
/// Minimum length of `course_name`, in characters.
pub const MIN_COURSE_NAME_CHARS: usize = 3;
/// Minimum length of `training_provider`, in characters.
pub const MIN_TRAINING_PROVIDER_CHARS: usize = 2;
/// Minimum length of `instructor_name`, in characters.
pub const MIN_INSTRUCTOR_NAME_CHARS: usize = 2;

/// Validation error with structured context.
///
/// Contains the specific constraint that was violated and the field name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The field that failed validation, in its serialized (camelCase) form.
    pub field: String,
    /// Description of the violated constraint.
    pub constraint: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.constraint)
    }
}

impl std::error::Error for ValidationError {}

/// Validates that a text field has at least `min_chars` characters.
///
/// # Errors
///
/// Returns [`ValidationError`] if `value` is shorter than `min_chars`.
pub fn validate_min_chars(
    value: &str,
    field_name: &str,
    min_chars: usize,
) -> Result<(), ValidationError> {
    let count = value.chars().count();
    if count < min_chars {
        return Err(ValidationError {
            field: field_name.to_string(),
            constraint: format!("must be at least {min_chars} characters, got {count}"),
        });
    }
    Ok(())
}

/// Validates an optional telephone number.
///
/// An absent or empty value passes; the field is optional on the form.
///
/// # Errors
///
/// Returns [`ValidationError`] if the value is not a 10 to 12 digit number
/// in one of the accepted layouts, e.g. `555-123-4567`, `(555) 123 4567`,
/// `+555.123.456789`.
pub fn validate_telephone(telephone: Option<&str>) -> Result<(), ValidationError> {
    match telephone {
        Some(value) if !value.is_empty() && !is_telephone(value) => Err(ValidationError {
            field: "telephone".to_string(),
            constraint: format!("{value:?} is not a valid phone number"),
        }),
        _ => Ok(()),
    }
}

/// Validates that the expiration date, when present, follows completion.
///
/// # Errors
///
/// Returns [`ValidationError`] if `expiration_date` is at or before
/// `completion_date`.
pub fn validate_expiration(form: &CertificateForm) -> Result<(), ValidationError> {
    match form.expiration_date {
        Some(expiration) if expiration <= form.completion_date => Err(ValidationError {
            field: "expirationDate".to_string(),
            constraint: format!(
                "must be after completion date {}, got {}",
                form.completion_date.to_rfc3339(),
                expiration.to_rfc3339()
            ),
        }),
        _ => Ok(()),
    }
}

/// Validates a whole form, returning the first violation.
///
/// Fields are checked in form order.
///
/// # Errors
///
/// Returns the first [`ValidationError`] found.
pub fn validate_certificate_form(form: &CertificateForm) -> Result<(), ValidationError> {
    match collect_form_errors(form).into_iter().next() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Validates a whole form, returning every violation in form order.
pub fn collect_form_errors(form: &CertificateForm) -> Vec<ValidationError> {
    [
        validate_min_chars(&form.id_number, "idNumber", MIN_ID_NUMBER_CHARS),
        validate_min_chars(&form.trainee_name, "traineeName", MIN_TRAINEE_NAME_CHARS),
        validate_min_chars(&form.course_name, "courseName", MIN_COURSE_NAME_CHARS),
        validate_expiration(form),
        validate_min_chars(
            &form.training_provider,
            "trainingProvider",
            MIN_TRAINING_PROVIDER_CHARS,
        ),
        validate_telephone(form.telephone.as_deref()),
        validate_min_chars(&form.instructor_name, "instructorName", MIN_INSTRUCTOR_NAME_CHARS),
    ]
    .into_iter()
    .filter_map(Result::err)
    .collect()
}

/// Matches the accepted telephone layouts.
///
/// Every optional token is a non-digit and every required token is a digit
/// run, so consuming optional tokens greedily never needs to backtrack.
fn is_telephone(value: &str) -> bool {
    let mut chars = value.chars().peekable();

    chars.next_if_eq(&'+');
    chars.next_if_eq(&'(');
    if !take_digits(&mut chars, 3, 3) {
        return false;
    }
    chars.next_if_eq(&')');
    chars.next_if(|&c| is_separator(c));
    if !take_digits(&mut chars, 3, 3) {
        return false;
    }
    chars.next_if(|&c| is_separator(c));
    take_digits(&mut chars, 4, 6) && chars.next().is_none()
}

/// Consumes between `min` and `max` ASCII digits.
fn take_digits(chars: &mut Peekable<Chars<'_>>, min: usize, max: usize) -> bool {
    let mut taken = 0;
    while taken < max && chars.next_if(char::is_ascii_digit).is_some() {
        taken += 1;
    }
    taken >= min
}

fn is_separator(c: char) -> bool {
    c == '-' || c == '.' || c.is_whitespace()
}
