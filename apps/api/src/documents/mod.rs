// Document collaborators: remote file fetch and document-to-text extraction.

pub mod blob;
pub mod extract;

pub use blob::{BlobClient, BlobFetcher};
pub use extract::{DocumentError, DocumentExtractor, TextExtractor};
