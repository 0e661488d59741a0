pub mod db;

mod sqlite_impl;

pub use sqlite_impl::SqliteStore;
