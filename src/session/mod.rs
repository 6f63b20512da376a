pub mod store;

pub use store::{StateStore, StateSnapshot, SNAPSHOT_FILE};
