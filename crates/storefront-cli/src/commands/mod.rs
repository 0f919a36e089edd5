pub mod migrate;
pub mod serve;

pub use migrate::{MigrateAction, MigrateCommand};
pub use serve::ServeCommand;
