//! Movie state transitions.
//!
//! Pure planning functions: given the input (and the previous row for an
//! update) they either produce the complete next [`MovieRecord`] or explain
//! why the write must be refused. Nothing here touches storage, so every rule
//! is unit-testable with a fixed clock.
//!
//! Rules enforced on every planned state:
//! - `rating > 0` requires `watched`.
//! - `last_watched_at` is stamped on a false→true flip of `watched`, cleared on
//!   true→false, and carried over otherwise.

use chrono::{DateTime, Datelike, Utc};

use crate::domain::timestamp;
use crate::domain::validation::{
    FieldError, FieldErrors, check_rating_rule, codes, normalize_poster_url, validate_comment,
    validate_genre, validate_rating, validate_title, validate_year,
};
use crate::models::{Movie, MoviePatch, MovieRecord, NewMovie};
use crate::services::movie_service::MovieError;

/// Edge rule for `last_watched_at`.
#[must_use]
pub fn next_last_watched(
    was_watched: bool,
    is_watched: bool,
    previous: Option<&str>,
    now: &str,
) -> Option<String> {
    match (was_watched, is_watched) {
        (false, true) => Some(now.to_string()),
        (true, false) => None,
        _ => previous.map(ToString::to_string),
    }
}

pub fn plan_create(draft: NewMovie, now: DateTime<Utc>) -> Result<MovieRecord, MovieError> {
    let mut errors = FieldErrors::new();

    let title = errors.take(validate_title(&draft.title));
    let year = errors.take(
        draft
            .year
            .map(|y| validate_year(y, now.year()))
            .transpose(),
    );
    let genre = errors.take(validate_genre(&draft.genre));
    let rating = errors.take(validate_rating(draft.rating));
    let comment = errors.take(validate_comment(&draft.comment));
    let poster_url = errors.take(normalize_poster_url(draft.poster_url.as_deref()));
    let external_id = draft
        .external_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty());

    let (Some(title), Some(year), Some(genre), Some(rating), Some(comment), Some(poster_url)) =
        (title, year, genre, rating, comment, poster_url)
    else {
        return Err(MovieError::Validation(errors.into_inner()));
    };

    check_rating_rule(rating, draft.watched).map_err(MovieError::BusinessRule)?;

    Ok(MovieRecord {
        external_id,
        title,
        year,
        genre,
        rating,
        comment,
        watched: draft.watched,
        favorite: draft.favorite,
        poster_url,
        last_watched_at: draft.watched.then(|| timestamp(now)),
    })
}

/// Overlays `patch` on `previous` and checks the combined result.
pub fn plan_update(
    previous: &Movie,
    patch: &MoviePatch,
    now: DateTime<Utc>,
) -> Result<MovieRecord, MovieError> {
    if patch.is_empty() {
        return Err(MovieError::Validation(vec![FieldError::new(
            "body",
            codes::EMPTY_UPDATE,
            "At least one field must be provided",
        )]));
    }

    let mut errors = FieldErrors::new();

    let title = match &patch.title {
        Some(raw) => errors.take(validate_title(raw)),
        None => Some(previous.title.clone()),
    };

    let year = match patch.year {
        Some(Some(y)) => errors.take(validate_year(y, now.year())).map(Some),
        Some(None) => Some(None),
        None => Some(previous.year),
    };

    let genre = match &patch.genre {
        Some(raw) => errors.take(validate_genre(raw)),
        None => Some(previous.genre.clone()),
    };

    let rating = match patch.rating {
        Some(r) => errors.take(validate_rating(r)),
        None => Some(previous.rating),
    };

    let comment = match &patch.comment {
        Some(raw) => errors.take(validate_comment(raw)),
        None => Some(previous.comment.clone()),
    };

    let poster_url = match &patch.poster_url {
        Some(raw) => errors.take(normalize_poster_url(raw.as_deref())),
        None => Some(previous.poster_url.clone()),
    };

    let (Some(title), Some(year), Some(genre), Some(rating), Some(comment), Some(poster_url)) =
        (title, year, genre, rating, comment, poster_url)
    else {
        return Err(MovieError::Validation(errors.into_inner()));
    };

    let watched = patch.watched.unwrap_or(previous.watched);
    check_rating_rule(rating, watched).map_err(MovieError::BusinessRule)?;

    let last_watched_at = next_last_watched(
        previous.watched,
        watched,
        previous.last_watched_at.as_deref(),
        &timestamp(now),
    );

    Ok(MovieRecord {
        external_id: previous.external_id.clone(),
        title,
        year,
        genre,
        rating,
        comment,
        watched,
        favorite: patch.favorite.unwrap_or(previous.favorite),
        poster_url,
        last_watched_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MovieId, UserId};
    use chrono::TimeZone;

    fn clock() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap()
    }

    fn later() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, 10, 0, 0).unwrap()
    }

    fn stored(watched: bool, rating: i32) -> Movie {
        Movie {
            id: MovieId::new(1),
            owner_id: Some(UserId::new(1)),
            external_id: Some("tt0113277".to_string()),
            title: "Heat".to_string(),
            year: Some(1995),
            genre: "Crime".to_string(),
            rating,
            comment: String::new(),
            watched,
            favorite: false,
            poster_url: Some("https://example.com/heat.jpg".to_string()),
            created_at: timestamp(clock()),
            updated_at: timestamp(clock()),
            last_watched_at: watched.then(|| timestamp(clock())),
        }
    }

    #[test]
    fn test_edge_rule() {
        assert_eq!(
            next_last_watched(false, true, None, "now"),
            Some("now".to_string())
        );
        assert_eq!(next_last_watched(true, false, Some("then"), "now"), None);
        assert_eq!(
            next_last_watched(true, true, Some("then"), "now"),
            Some("then".to_string())
        );
        assert_eq!(next_last_watched(false, false, None, "now"), None);
    }

    #[test]
    fn test_create_watched_stamps_last_watched() {
        let draft = NewMovie {
            title: "  Heat ".to_string(),
            watched: true,
            rating: 5,
            ..Default::default()
        };

        let record = plan_create(draft, clock()).unwrap();
        assert_eq!(record.title, "Heat");
        assert_eq!(record.last_watched_at, Some(timestamp(clock())));
    }

    #[test]
    fn test_create_unwatched_has_no_last_watched() {
        let draft = NewMovie {
            title: "Heat".to_string(),
            ..Default::default()
        };

        let record = plan_create(draft, clock()).unwrap();
        assert!(!record.watched);
        assert!(record.last_watched_at.is_none());
    }

    #[test]
    fn test_create_rating_without_watched_is_business_rule() {
        let draft = NewMovie {
            title: "Heat".to_string(),
            rating: 3,
            ..Default::default()
        };

        match plan_create(draft, clock()) {
            Err(MovieError::BusinessRule(v)) => assert_eq!(v.code, codes::RATING_WITHOUT_WATCHED),
            other => panic!("expected business rule error, got {other:?}"),
        }
    }

    #[test]
    fn test_create_reports_every_bad_field() {
        let draft = NewMovie {
            title: String::new(),
            year: Some(1700),
            rating: 11,
            poster_url: Some("javascript:alert(1)".to_string()),
            ..Default::default()
        };

        match plan_create(draft, clock()) {
            Err(MovieError::Validation(errors)) => {
                let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["title", "year", "rating", "poster_url"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_create_accepts_next_year() {
        let draft = NewMovie {
            title: "Upcoming".to_string(),
            year: Some(2026),
            ..Default::default()
        };
        assert_eq!(plan_create(draft, clock()).unwrap().year, Some(2026));
    }

    #[test]
    fn test_blank_poster_becomes_null() {
        let draft = NewMovie {
            title: "Heat".to_string(),
            poster_url: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(plan_create(draft, clock()).unwrap().poster_url.is_none());
    }

    #[test]
    fn test_empty_patch_is_rejected() {
        match plan_update(&stored(false, 0), &MoviePatch::default(), later()) {
            Err(MovieError::Validation(errors)) => assert_eq!(errors[0].code, codes::EMPTY_UPDATE),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_unwatch_with_rating_zero_clears_last_watched() {
        let patch = MoviePatch {
            watched: Some(false),
            rating: Some(0),
            ..Default::default()
        };

        let record = plan_update(&stored(true, 4), &patch, later()).unwrap();
        assert!(!record.watched);
        assert_eq!(record.rating, 0);
        assert!(record.last_watched_at.is_none());
    }

    #[test]
    fn test_unwatch_keeping_rating_is_rejected() {
        let patch = MoviePatch {
            watched: Some(false),
            ..Default::default()
        };

        assert!(matches!(
            plan_update(&stored(true, 4), &patch, later()),
            Err(MovieError::BusinessRule(_))
        ));
    }

    #[test]
    fn test_untouched_watched_keeps_last_watched() {
        let previous = stored(true, 4);
        let patch = MoviePatch {
            genre: Some("Thriller".to_string()),
            ..Default::default()
        };

        let record = plan_update(&previous, &patch, later()).unwrap();
        assert_eq!(record.genre, "Thriller");
        assert_eq!(record.last_watched_at, previous.last_watched_at);
    }

    #[test]
    fn test_watch_flip_stamps_now() {
        let patch = MoviePatch {
            watched: Some(true),
            rating: Some(5),
            ..Default::default()
        };

        let record = plan_update(&stored(false, 0), &patch, later()).unwrap();
        assert_eq!(record.last_watched_at, Some(timestamp(later())));
    }

    #[test]
    fn test_poster_null_clears_absent_keeps() {
        let previous = stored(false, 0);

        let clear = MoviePatch {
            poster_url: Some(None),
            ..Default::default()
        };
        assert!(plan_update(&previous, &clear, later()).unwrap().poster_url.is_none());

        let keep = MoviePatch {
            comment: Some("rewatch".to_string()),
            ..Default::default()
        };
        assert_eq!(
            plan_update(&previous, &keep, later()).unwrap().poster_url,
            previous.poster_url
        );
    }

    #[test]
    fn test_external_id_is_carried_over() {
        let previous = stored(false, 0);
        let patch = MoviePatch {
            title: Some("Heat (1995)".to_string()),
            ..Default::default()
        };
        assert_eq!(
            plan_update(&previous, &patch, later()).unwrap().external_id,
            previous.external_id
        );
    }
}
