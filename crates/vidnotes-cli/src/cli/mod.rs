pub mod command;
pub mod config;
pub mod handler;

pub use command::{CliCommand, RelationAction, RelationKind};
pub use config::CliConfig;
pub use handler::App;
