pub mod handlers;
pub mod service;
pub mod store;

pub use store::{DocumentStore, PgDocumentStore};
