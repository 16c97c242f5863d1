pub mod app;
pub mod bars;
pub mod errors;
pub mod handlers;
pub mod ids;
pub mod models;
pub mod parse;
pub mod state;
pub mod storage;
pub mod store;
pub mod tabs;
pub mod ui;

pub use app::router;
pub use bars::LifeBarManager;
pub use ids::{IdGenerator, SequentialIds, UuidGenerator};
pub use state::SharedState;
pub use storage::{resolve_data_path, FileStorage, KeyValueStore, MemoryStorage};
pub use store::Store;
pub use tabs::{DeleteRequest, TabDeletion, TabManager};
