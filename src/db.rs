pub mod blob_store;
pub use blob_store::{BlobStore, FileBlobStore, MemoryBlobStore};
pub mod crm_repo;
pub use crm_repo::CrmRepository;
