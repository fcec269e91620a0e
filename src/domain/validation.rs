//! Field rules shared by the lifecycle engine, the import reconciler and
//! registration.
//!
//! Each check returns the normalised value or a [`FieldError`] carrying a
//! stable machine-readable code. [`FieldErrors`] collects them so a request
//! reports every bad field at once.

use serde::Serialize;

use crate::constants::{account, movie};

pub mod codes {
    pub const REQUIRED: &str = "REQUIRED";
    pub const TOO_LONG: &str = "TOO_LONG";
    pub const TOO_SHORT: &str = "TOO_SHORT";
    pub const OUT_OF_RANGE: &str = "OUT_OF_RANGE";
    pub const INVALID_URL: &str = "INVALID_URL";
    pub const INVALID_FORMAT: &str = "INVALID_FORMAT";
    pub const EMPTY_UPDATE: &str = "EMPTY_UPDATE";
    pub const RATING_WITHOUT_WATCHED: &str = "RATING_WITHOUT_WATCHED";
    pub const ALREADY_TAKEN: &str = "ALREADY_TAKEN";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub code: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            code,
            message: message.into(),
        }
    }
}

/// A well-formed request that breaks a cross-field business rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleViolation {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the error, if any, and hands back the accepted value.
    pub fn take<T>(&mut self, result: Result<T, FieldError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.0.push(err);
                None
            }
        }
    }

    pub fn push(&mut self, err: FieldError) {
        self.0.push(err);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<FieldError> {
        self.0
    }

    pub fn finish(self) -> Result<(), Vec<FieldError>> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(self.0)
        }
    }
}

fn char_len(value: &str) -> usize {
    value.chars().count()
}

pub fn validate_title(raw: &str) -> Result<String, FieldError> {
    let title = raw.trim();

    if title.is_empty() {
        return Err(FieldError::new("title", codes::REQUIRED, "Title is required"));
    }

    if char_len(title) > movie::TITLE_MAX_CHARS {
        return Err(FieldError::new(
            "title",
            codes::TOO_LONG,
            format!("Title must be at most {} characters", movie::TITLE_MAX_CHARS),
        ));
    }

    Ok(title.to_string())
}

/// Accepts `MIN_YEAR..=current_year + 1`.
pub fn validate_year(year: i32, current_year: i32) -> Result<i32, FieldError> {
    let max = current_year + 1;

    if (movie::MIN_YEAR..=max).contains(&year) {
        Ok(year)
    } else {
        Err(FieldError::new(
            "year",
            codes::OUT_OF_RANGE,
            format!("Year must be between {} and {max}", movie::MIN_YEAR),
        ))
    }
}

pub fn validate_genre(raw: &str) -> Result<String, FieldError> {
    let genre = raw.trim();

    if char_len(genre) > movie::GENRE_MAX_CHARS {
        return Err(FieldError::new(
            "genre",
            codes::TOO_LONG,
            format!("Genre must be at most {} characters", movie::GENRE_MAX_CHARS),
        ));
    }

    Ok(genre.to_string())
}

pub fn validate_rating(rating: i32) -> Result<i32, FieldError> {
    if (0..=movie::RATING_MAX).contains(&rating) {
        Ok(rating)
    } else {
        Err(FieldError::new(
            "rating",
            codes::OUT_OF_RANGE,
            format!("Rating must be between 0 and {}", movie::RATING_MAX),
        ))
    }
}

pub fn validate_comment(raw: &str) -> Result<String, FieldError> {
    let comment = raw.trim();

    if char_len(comment) > movie::COMMENT_MAX_CHARS {
        return Err(FieldError::new(
            "comment",
            codes::TOO_LONG,
            format!(
                "Comment must be at most {} characters",
                movie::COMMENT_MAX_CHARS
            ),
        ));
    }

    Ok(comment.to_string())
}

/// Absent or blank means "no poster". Anything else must be an absolute
/// http(s) URL.
pub fn normalize_poster_url(raw: Option<&str>) -> Result<Option<String>, FieldError> {
    let Some(candidate) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };

    match url::Url::parse(candidate) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") && parsed.has_host() => {
            Ok(Some(candidate.to_string()))
        }
        _ => Err(FieldError::new(
            "poster_url",
            codes::INVALID_URL,
            "Poster URL must be a valid http(s) URL",
        )),
    }
}

/// `rating > 0` is only allowed on a watched movie.
pub fn check_rating_rule(rating: i32, watched: bool) -> Result<(), RuleViolation> {
    if rating > 0 && !watched {
        return Err(RuleViolation {
            code: codes::RATING_WITHOUT_WATCHED,
            message: "A movie must be marked as watched before it can be rated".to_string(),
        });
    }
    Ok(())
}

/// Trimmed and lowercased.
pub fn validate_email(raw: &str) -> Result<String, FieldError> {
    let email = raw.trim().to_lowercase();

    if email.is_empty() {
        return Err(FieldError::new("email", codes::REQUIRED, "Email is required"));
    }

    if char_len(&email) > account::EMAIL_MAX_CHARS {
        return Err(FieldError::new(
            "email",
            codes::TOO_LONG,
            format!(
                "Email must be at most {} characters",
                account::EMAIL_MAX_CHARS
            ),
        ));
    }

    let well_formed = email.split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty() && !domain.is_empty() && !domain.contains('@')
    }) && !email.chars().any(char::is_whitespace);

    if !well_formed {
        return Err(FieldError::new(
            "email",
            codes::INVALID_FORMAT,
            "Email address is not valid",
        ));
    }

    Ok(email)
}

pub fn validate_password(raw: &str) -> Result<(), FieldError> {
    if char_len(raw) < account::PASSWORD_MIN_CHARS {
        return Err(FieldError::new(
            "password",
            codes::TOO_SHORT,
            format!(
                "Password must be at least {} characters",
                account::PASSWORD_MIN_CHARS
            ),
        ));
    }
    Ok(())
}

#[must_use]
pub fn is_nickname_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')
}

pub fn validate_nickname(raw: &str) -> Result<String, FieldError> {
    let nickname = raw.trim();
    let len = char_len(nickname);

    if !(account::NICKNAME_MIN_CHARS..=account::NICKNAME_MAX_CHARS).contains(&len) {
        return Err(FieldError::new(
            "nickname",
            codes::OUT_OF_RANGE,
            format!(
                "Nickname must be {} to {} characters",
                account::NICKNAME_MIN_CHARS,
                account::NICKNAME_MAX_CHARS
            ),
        ));
    }

    if !nickname.chars().all(is_nickname_char) {
        return Err(FieldError::new(
            "nickname",
            codes::INVALID_FORMAT,
            "Nickname may only contain letters, digits, '.', '_' and '-'",
        ));
    }

    Ok(nickname.to_string())
}
