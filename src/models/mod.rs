pub mod account;
pub mod movie;

pub use account::Account;
pub use movie::{Movie, MovieFilter, MoviePatch, MovieRecord, NewMovie};
