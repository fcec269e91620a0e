pub mod bootstrap;
pub mod lifecycle;
pub mod nickname;

pub mod movie_service;
pub mod movie_service_impl;
pub use movie_service::{MovieError, MovieService};
pub use movie_service_impl::SeaOrmMovieService;

pub mod import_service;
pub mod import_service_impl;
pub use import_service::{ImportError, ImportOutcome, ImportService};
pub use import_service_impl::DefaultImportService;

pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService, Registration};
pub use auth_service_impl::SeaOrmAuthService;

pub mod posters;
pub use posters::{PosterReport, backfill_posters};

pub mod seed;
pub use seed::{SeedReport, seed_catalog};
