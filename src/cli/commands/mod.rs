mod init;
mod migrate;
mod posters;
mod seed;

pub use init::cmd_init;
pub use migrate::cmd_migrate;
pub use posters::cmd_posters;
pub use seed::cmd_seed;
