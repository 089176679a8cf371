pub mod config;
pub mod encoder;
pub mod error;
pub mod fetcher;
pub mod mime;
pub mod payload;
pub mod pipeline;
pub mod report;
pub mod result;
pub mod summary;

pub use config::Config;
pub use encoder::{EncodedFile, PayloadEncoder};
pub use error::{DigestError, Result};
pub use fetcher::{
    FileFetcher, FileSource, FolderLister, ManifestFolderLister, RemoteFileRef,
    StaticFolderLister,
};
pub use payload::ChatPayloadBuilder;
pub use pipeline::{FetchStage, Pipeline, PrepareStage, SummarizeStage};
pub use result::{SummaryReport, SummaryResult, SummaryStats};
pub use summary::SummaryClient;
