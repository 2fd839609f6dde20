//! # PDF Text Extraction

use super::IngestError;
use pdf::file::FileOptions;
use tracing::{info, warn};

/// Extracts the drawn text of every page of a PDF.
///
/// PDF parsing is CPU-bound, so the work runs on the blocking thread pool.
/// Lines are trimmed and pages are separated by a blank line.
pub async fn extract_text_from_pdf(pdf_data: &[u8]) -> Result<String, IngestError> {
    let data = pdf_data.to_vec();

    let text_result = tokio::task::spawn_blocking(move || -> Result<String, IngestError> {
        let file = FileOptions::cached()
            .load(&data[..])
            .map_err(|e| IngestError::Parse(e.to_string()))?;

        let resolver = file.resolver();
        let mut pages = Vec::new();

        for page_num in 0..file.num_pages() {
            let page = file
                .get_page(page_num)
                .map_err(|e| IngestError::Parse(e.to_string()))?;

            let Some(content) = &page.contents else {
                warn!("Page {} has no content stream.", page_num);
                continue;
            };

            let operations = content
                .operations(&resolver)
                .map_err(|e| IngestError::Parse(e.to_string()))?;
            let mut page_text = String::new();
            for op in operations.iter() {
                match op {
                    pdf::content::Op::TextDraw { text } => {
                        page_text.push_str(&text.to_string_lossy());
                    }
                    pdf::content::Op::TextDrawAdjusted { array } => {
                        for item in array.iter() {
                            if let pdf::content::TextDrawAdjusted::Text(text) = item {
                                page_text.push_str(&text.to_string_lossy());
                            }
                        }
                    }
                    pdf::content::Op::TextNewline => page_text.push('\n'),
                    _ => {}
                }
            }
            let page_text = page_text
                .lines()
                .map(str::trim)
                .collect::<Vec<_>>()
                .join("\n");
            pages.push(page_text);
        }
        Ok(pages.join("\n\n"))
    })
    .await;

    let text = text_result.map_err(|e| {
        IngestError::Internal(anyhow::anyhow!("Tokio join error during PDF parsing: {e}"))
    })??;

    info!(
        "Extracted text from PDF. Total length: {} characters.",
        text.chars().count()
    );
    Ok(text)
}
