//! Sample catalog for a fresh account.

use serde::Serialize;
use tracing::info;

use crate::domain::UserId;
use crate::models::NewMovie;
use crate::services::movie_service::{MovieError, MovieService};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub inserted: usize,
    pub skipped: usize,
}

struct SampleMovie {
    title: &'static str,
    year: Option<i32>,
    genre: &'static str,
    rating: i32,
    comment: &'static str,
}

const SAMPLES: &[SampleMovie] = &[
    SampleMovie {
        title: "A Prophet",
        year: Some(2009),
        genre: "Crime, Drama",
        rating: 5,
        comment: "A masterpiece",
    },
    SampleMovie {
        title: "Catch Me If You Can",
        year: Some(2002),
        genre: "Biography, Crime",
        rating: 5,
        comment: "",
    },
    SampleMovie {
        title: "Once Upon a Time in Hollywood",
        year: Some(2019),
        genre: "Comedy, Drama",
        rating: 0,
        comment: "",
    },
    SampleMovie {
        title: "Bullet Train",
        year: Some(2022),
        genre: "Action, Comedy",
        rating: 0,
        comment: "",
    },
    SampleMovie {
        title: "Allied",
        year: Some(2016),
        genre: "Drama, War",
        rating: 0,
        comment: "",
    },
    SampleMovie {
        title: "Troy",
        year: Some(2004),
        genre: "History, Action",
        rating: 0,
        comment: "",
    },
    SampleMovie {
        title: "Groundhog Day",
        year: None,
        genre: "Comedy",
        rating: 0,
        comment: "",
    },
    SampleMovie {
        title: "Mission: Impossible - Ghost Protocol",
        year: Some(2011),
        genre: "Action, Spy",
        rating: 0,
        comment: "",
    },
];

/// Inserts the sample titles through the regular create path. Titles the
/// account already has are left alone; rated samples are stored as watched.
pub async fn seed_catalog(
    movies: &dyn MovieService,
    owner: UserId,
    existing_titles: &[String],
) -> Result<SeedReport, MovieError> {
    let mut report = SeedReport::default();

    for sample in SAMPLES {
        if existing_titles.iter().any(|t| t == sample.title) {
            report.skipped += 1;
            continue;
        }

        movies
            .create(
                owner,
                NewMovie {
                    title: sample.title.to_string(),
                    year: sample.year,
                    genre: sample.genre.to_string(),
                    rating: sample.rating,
                    comment: sample.comment.to_string(),
                    watched: sample.rating > 0,
                    ..Default::default()
                },
            )
            .await?;
        report.inserted += 1;
    }

    info!(
        owner_id = %owner,
        inserted = report.inserted,
        skipped = report.skipped,
        "Seeded sample catalog"
    );

    Ok(report)
}
