// Chat payload assembly for the summary request.
//
// Turn order is document order for the model: system persona first, then one
// user turn per file in input order, then the consolidated-summary request.

use ai_client::{ChatMessage, ChatRequest, ContentBlock, PdfEngine, Plugin};

use crate::encoder::EncodedFile;

pub const MAX_TOKENS: u32 = 4000;
pub const TEMPERATURE: f32 = 0.3;
pub const DEFAULT_LANGUAGE: &str = "Russian";

#[derive(Debug, Clone)]
pub struct ChatPayloadBuilder {
    language: String,
}

impl Default for ChatPayloadBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_LANGUAGE)
    }
}

impl ChatPayloadBuilder {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn system_prompt(&self) -> String {
        format!(
            "You are a document analysis assistant. \
             Analyze the provided files and produce a single, structured summary. \
             Take information from every source into account and highlight the key points and main themes. \
             Always answer in {}.",
            self.language
        )
    }

    pub fn summary_prompt(&self) -> String {
        format!(
            "Analyze all of the provided files and write a detailed consolidated summary that covers:\n\
             1. The main themes and key ideas across all documents\n\
             2. Important details and facts\n\
             3. Overall conclusions and observations\n\
             The summary must be written in {} and help the reader understand the combined content of all files.",
            self.language
        )
    }

    /// User turn for one file: a caption followed by exactly one data block.
    pub fn file_message(index: usize, total: usize, file: &EncodedFile) -> ChatMessage {
        let caption = ContentBlock::text(format!(
            "Here is file {} of {}: {}",
            index + 1,
            total,
            file.filename
        ));

        let data = if file.is_image() {
            ContentBlock::image_url(file.data_uri())
        } else {
            ContentBlock::file(&file.filename, file.data_uri())
        };

        ChatMessage::user_blocks(vec![caption, data])
    }

    pub fn build(&self, files: &[EncodedFile]) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(files.len() + 2);
        messages.push(ChatMessage::system(self.system_prompt()));

        for (i, file) in files.iter().enumerate() {
            messages.push(Self::file_message(i, files.len(), file));
        }

        messages.push(ChatMessage::user(self.summary_prompt()));
        messages
    }

    /// PDF text extraction is requested only when a PDF is attached.
    pub fn plugins(files: &[EncodedFile]) -> Vec<Plugin> {
        if files.iter().any(EncodedFile::is_pdf) {
            vec![Plugin::file_parser(PdfEngine::PdfText)]
        } else {
            Vec::new()
        }
    }

    pub fn request(&self, model: &str, files: &[EncodedFile]) -> ChatRequest {
        let mut request = ChatRequest::new(model)
            .messages(self.build(files))
            .max_tokens(MAX_TOKENS)
            .temperature(TEMPERATURE);

        for plugin in Self::plugins(files) {
            request = request.plugin(plugin);
        }

        request
    }
}
