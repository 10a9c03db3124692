// Server-side state

pub mod blob_store;
pub mod document_store;
