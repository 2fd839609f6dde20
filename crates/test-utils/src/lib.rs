use anyhow::Result;
use async_trait::async_trait;
use checkbot::errors::PromptError;
use checkbot::providers::ai::AiProvider;
use checkbot::providers::db::sqlite::SqliteProvider;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Arc, Mutex};

// --- Test Setup ---

/// A helper struct to manage database creation for each test.
pub struct TestSetup {
    pub store: SqliteProvider,
}

impl TestSetup {
    /// Creates a new, isolated in-memory database and initializes the schema.
    pub async fn new() -> Result<Self> {
        let store = SqliteProvider::new(":memory:").await?;
        store.initialize_schema().await?;
        Ok(Self { store })
    }
}

// --- Mock AI Provider ---

/// A completion service whose answers are programmed by the test.
///
/// Responses are matched by a substring of the system prompt, so the chat-turn
/// and submission personas can be answered differently within one test.
#[derive(Clone, Debug)]
pub struct MockAiProvider {
    responses: Arc<Mutex<HashMap<String, String>>>,
    calls: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockAiProvider {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Pre-programs a response for a specific prompt.
    /// The key should be a unique substring of the system prompt.
    pub fn add_response(&self, key: &str, response: &str) {
        let mut responses = self.responses.lock().unwrap();
        responses.insert(key.to_string(), response.to_string());
    }

    /// Retrieves the recorded `(system, user)` prompt pairs for assertion.
    pub fn get_calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockAiProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AiProvider for MockAiProvider {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, PromptError> {
        let mut calls = self.calls.lock().unwrap();
        calls.push((system_prompt.to_string(), user_prompt.to_string()));

        let responses = self.responses.lock().unwrap();
        for (key, response) in responses.iter() {
            if system_prompt.contains(key) {
                return Ok(response.clone());
            }
        }

        Err(PromptError::AiApi(format!(
            "MockAiProvider: No response programmed for system prompt. Got: '{system_prompt}'"
        )))
    }
}

// --- Document Fixtures ---
#[cfg(any(feature = "pdf", feature = "docx"))]
pub mod helpers {
    use anyhow::Result;

    /// Generates a single-page PDF with one text line per entry of `lines`.
    #[cfg(feature = "pdf")]
    pub fn generate_test_pdf(lines: &[&str]) -> Result<Vec<u8>> {
        use pdf_writer::{Content, Finish, Name, Pdf, Rect, Ref, Str};

        let mut pdf = Pdf::new();

        let catalog_id = Ref::new(1);
        let page_tree_id = Ref::new(2);
        let page_id = Ref::new(3);
        let font_id = Ref::new(4);
        let content_id = Ref::new(5);
        let font_name = Name(b"F1");

        pdf.catalog(catalog_id).pages(page_tree_id);
        pdf.pages(page_tree_id).kids([page_id]).count(1);

        let mut page = pdf.page(page_id);
        page.media_box(Rect::new(0.0, 0.0, 595.0, 842.0));
        page.parent(page_tree_id);
        page.contents(content_id);
        page.resources().fonts().pair(font_name, font_id);
        page.finish();

        pdf.type1_font(font_id).base_font(Name(b"Helvetica"));

        let mut content = Content::new();
        content.begin_text();
        content.set_font(font_name, 12.0);
        content.set_leading(16.0);
        content.next_line(72.0, 760.0);
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                content.next_line_using_leading();
            }
            content.show(Str(line.as_bytes()));
        }
        content.end_text();
        pdf.stream(content_id, &content.finish());

        Ok(pdf.finish())
    }

    /// Generates a minimal DOCX archive with one paragraph per entry of
    /// `paragraphs`.
    #[cfg(feature = "docx")]
    pub fn generate_test_docx(paragraphs: &[&str]) -> Result<Vec<u8>> {
        use std::io::{Cursor, Write};
        use zip::write::SimpleFileOptions;
        use zip::ZipWriter;

        let body: String = paragraphs
            .iter()
            .map(|p| {
                let escaped = p
                    .replace('&', "&amp;")
                    .replace('<', "&lt;")
                    .replace('>', "&gt;");
                format!("<w:p><w:r><w:t xml:space=\"preserve\">{escaped}</w:t></w:r></w:p>")
            })
            .collect();
        let document = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
             <w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">\
             <w:body>{body}</w:body></w:document>"
        );

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file("word/document.xml", SimpleFileOptions::default())?;
        zip.write_all(document.as_bytes())?;
        Ok(zip.finish()?.into_inner())
    }
}
