pub mod catalog;
pub mod config;
pub mod constants;
pub mod events;
pub mod identity;
pub mod models;
pub mod persistence;
pub mod store;
pub mod tracing_setup;

pub use catalog::{VideoCatalog, YouTubeCatalog};
pub use config::{CoreConfig, PersistMode};
pub use events::{EventBus, StoreEvent, StoreListener, SubscriptionId};
pub use identity::{IdentityProvider, SessionStorage, StaticIdentity, UserIdentity};
pub use models::{Note, UserRelations};
pub use store::{AppDataStore, NoteStore, VideoRelationStore};
