pub mod error;
pub mod openrouter;
pub mod traits;
pub mod util;

pub use error::{AiError, Result};
pub use openrouter::types::{
    ChatMessage, ChatRequest, ContentBlock, FileData, ImageUrl, PdfEngine, PdfOptions, Plugin,
    Role,
};
pub use openrouter::OpenRouter;
pub use traits::ChatTransport;
pub use util::truncate_to_char_boundary;
