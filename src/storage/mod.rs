//! Durable key-value storage abstraction.
//!
//! Both the per-group event cache and the persisted application state sit on
//! this interface, so a desktop build can use files while tests use memory.
//! The interface is deliberately infallible: storage trouble is a cache
//! concern, and the cache policy is to fail safe to "no cache", never to
//! surface an error.

pub mod file;
pub mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

/// Key-value storage with localStorage-shaped semantics.
pub trait Storage: Send + Sync {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str);
    fn remove_item(&self, key: &str);
    fn keys(&self) -> Vec<String>;
}
