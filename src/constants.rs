pub mod movie {

    pub const TITLE_MAX_CHARS: usize = 200;

    pub const GENRE_MAX_CHARS: usize = 200;

    pub const COMMENT_MAX_CHARS: usize = 1000;

    pub const RATING_MAX: i32 = 5;

    /// Year of the earliest surviving motion picture.
    pub const MIN_YEAR: i32 = 1888;
}

pub mod account {

    pub const EMAIL_MAX_CHARS: usize = 254;

    pub const PASSWORD_MIN_CHARS: usize = 8;

    pub const NICKNAME_MIN_CHARS: usize = 3;

    pub const NICKNAME_MAX_CHARS: usize = 32;

    /// Length cap for the generated nickname base, before any `_N` suffix.
    pub const NICKNAME_BASE_MAX_CHARS: usize = 24;

    pub const NICKNAME_FALLBACK: &str = "user";
}

pub mod limits {

    pub const RECENT_LIMIT: u64 = 10;

    pub const FAVORITES_LIMIT: u64 = 50;
}

pub mod intervals {
    use std::time::Duration;

    /// Pause between provider lookups during poster back-fill.
    pub const POSTER_LOOKUP_DELAY: Duration = Duration::from_millis(150);
}
