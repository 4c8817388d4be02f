pub mod retriever;
pub mod store;
pub mod weaviate;
