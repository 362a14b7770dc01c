use std::sync::Arc;

use tracing::info;

use crate::errors::AppError;
use crate::models::ResumeInput;
use crate::normalize::normalize;
use crate::pdf::PdfExporter;
use crate::templates::TemplateStore;

/// normalize → render → (export), one request at a time, no state kept between calls.
#[derive(Clone)]
pub struct DocumentPipeline {
    templates: Arc<TemplateStore>,
    exporter: Arc<dyn PdfExporter>,
}

impl DocumentPipeline {
    pub fn new(templates: Arc<TemplateStore>, exporter: Arc<dyn PdfExporter>) -> Self {
        Self { templates, exporter }
    }

    pub fn exporter_name(&self) -> &'static str {
        self.exporter.name()
    }

    pub fn template_ids(&self) -> Vec<u32> {
        self.templates.ids().map(|id| id.get()).collect()
    }

    pub fn preview(&self, template_id: i64, data: &ResumeInput) -> Result<String, AppError> {
        let id = self.templates.resolve(template_id)?;
        let record = normalize(data, id);
        let html = self.templates.render(id, &record)?;
        info!("🧾 Rendered template {} ({} bytes)", id, html.len());
        Ok(html)
    }

    pub async fn generate(&self, template_id: i64, data: &ResumeInput) -> Result<Vec<u8>, AppError> {
        let html = self.preview(template_id, data)?;
        let pdf = self.exporter.export(&html).await?;
        Ok(pdf)
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::FakeExporter;
    use super::*;
    use crate::templates::RenderError;
    use serde_json::json;
    use std::sync::atomic::Ordering;

    fn pipeline(exporter: Arc<FakeExporter>) -> DocumentPipeline {
        DocumentPipeline::new(Arc::new(TemplateStore::builtin()), exporter)
    }

    #[tokio::test]
    async fn generate_returns_pdf_bytes() {
        let exporter = Arc::new(FakeExporter::default());
        let data: ResumeInput = serde_json::from_value(json!({"personal": {"fullName": "Ada"}})).unwrap();
        let pdf = pipeline(exporter.clone()).generate(3, &data).await.unwrap();
        assert!(pdf.starts_with(b"%PDF-"));
        assert_eq!(exporter.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unknown_template_never_reaches_the_exporter() {
        let exporter = Arc::new(FakeExporter::default());
        let err = pipeline(exporter.clone()).generate(12, &ResumeInput::default()).await.unwrap_err();
        assert!(matches!(err, AppError::Render(RenderError::TemplateNotFound { id: 12 })));
        assert_eq!(exporter.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn preview_is_byte_identical_across_calls() {
        let p = pipeline(Arc::new(FakeExporter::default()));
        let data: ResumeInput =
            serde_json::from_value(json!({"summary": "x & y", "skills": ["a", "b"]})).unwrap();
        assert_eq!(p.preview(1, &data).unwrap(), p.preview(1, &data).unwrap());
    }
}
