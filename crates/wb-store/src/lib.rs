pub mod error;
pub mod paths;
pub mod schema;
pub mod store;

pub use error::{Result, StoreError};
pub use paths::{DB_FILE_NAME, default_base_dir};
pub use store::{ModelMetrics, NewTask, Store, TaskRecord};
