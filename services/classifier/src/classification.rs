//! Document Classification Service
//!
//! Orchestrates the two lookup rules: filename fragments first, then the
//! entities the NLU service finds in the document text.

use adc_models::{ClassificationResponse, EntityMatch, EntityRules, OutputType};
use adc_utils::{AdcError, AdcResult, ExtractionConfig};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use crate::nlu_client::EntityAnalyzer;
use crate::pdf_processor::{normalize_text, PageRange, TextExtractor};

/// Document classifier service
#[derive(Clone)]
pub struct DocumentClassifier {
    rules: Arc<EntityRules>,
    extractor: Arc<dyn TextExtractor>,
    analyzer: Arc<dyn EntityAnalyzer>,
    pages: PageRange,
    max_words: usize,
    entity_type: String,
}

impl DocumentClassifier {
    pub fn new(
        rules: Arc<EntityRules>,
        extractor: Arc<dyn TextExtractor>,
        analyzer: Arc<dyn EntityAnalyzer>,
        extraction: &ExtractionConfig,
        entity_type: impl Into<String>,
    ) -> Self {
        Self {
            rules,
            extractor,
            analyzer,
            pages: PageRange::new(extraction.first_page, extraction.last_page),
            max_words: extraction.max_words,
            entity_type: entity_type.into(),
        }
    }

    pub fn rules(&self) -> &EntityRules {
        &self.rules
    }

    /// Classify a staged PDF. `filename` is the name the client uploaded it under.
    pub async fn classify(
        &self,
        filename: &str,
        path: &Path,
        output: OutputType,
    ) -> AdcResult<ClassificationResponse> {
        if let Some(matched) = self.rules.match_filename(filename) {
            info!(filename, label = %matched.label, "Classified by filename");
            return Ok(Self::respond(filename, output, matched));
        }

        let text = self.extract_text(path).await?;
        if text.is_empty() {
            info!(filename, "No text in page window, skipping entity analysis");
            return Ok(ClassificationResponse::unmatched(filename, output));
        }

        debug!(words = text.split(' ').count(), "Sending text to NLU");
        let analysis = self.analyzer.analyze(&text).await?;

        match self.rules.match_entity(&analysis.entities, &self.entity_type) {
            Some(matched) => {
                info!(filename, label = %matched.label, "Classified by entity");
                Ok(Self::respond(filename, output, matched))
            }
            None => {
                info!(
                    filename,
                    entities = analysis.entities.len(),
                    "No entity of type {} found",
                    self.entity_type
                );
                Ok(ClassificationResponse::unmatched(filename, output))
            }
        }
    }

    /// Normalized text of the configured page window.
    async fn extract_text(&self, path: &Path) -> AdcResult<String> {
        let data = tokio::fs::read(path).await?;
        let extractor = Arc::clone(&self.extractor);
        let pages = self.pages;
        let max_words = self.max_words;

        tokio::task::spawn_blocking(move || -> AdcResult<String> {
            let all_pages = extractor.extract_pages(&data)?;
            let window = pages.select(&all_pages).join("\n");
            Ok(normalize_text(&window, max_words))
        })
        .await
        .map_err(|e| AdcError::internal(format!("text extraction task failed: {}", e)))?
    }

    fn respond(filename: &str, output: OutputType, matched: EntityMatch) -> ClassificationResponse {
        ClassificationResponse {
            filename: filename.to_string(),
            label: Some(matched.label),
            entity_key: matched.key,
            matched_by: matched.source,
            output,
            extension: output.extension().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adc_models::{AnalysisResponse, Entity, MatchSource};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FixedPages(Vec<String>);

    impl TextExtractor for FixedPages {
        fn extract_pages(&self, _data: &[u8]) -> AdcResult<Vec<String>> {
            Ok(self.0.clone())
        }
    }

    #[derive(Default)]
    struct RecordingAnalyzer {
        entities: Vec<Entity>,
        texts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl EntityAnalyzer for RecordingAnalyzer {
        async fn analyze(&self, text: &str) -> AdcResult<AnalysisResponse> {
            self.texts.lock().unwrap().push(text.to_string());
            Ok(AnalysisResponse {
                language: Some("en".to_string()),
                entities: self.entities.clone(),
                ..Default::default()
            })
        }
    }

    fn company(text: &str) -> Entity {
        Entity {
            entity_type: "Company".to_string(),
            text: text.to_string(),
            relevance: 0.9,
            count: Some(1),
            sentiment: None,
            emotion: None,
        }
    }

    fn classifier(pages: Vec<&str>, analyzer: Arc<RecordingAnalyzer>) -> DocumentClassifier {
        let rules = EntityRules::from_sources("IBM=IBM\n", "IBM=IBM Corp.\n").unwrap();
        DocumentClassifier::new(
            Arc::new(rules),
            Arc::new(FixedPages(pages.into_iter().map(String::from).collect())),
            analyzer,
            &adc_utils::AppConfig::default().extraction,
            "Company",
        )
    }

    async fn staged_file() -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upload");
        tokio::fs::write(&path, b"%PDF-1.4").await.unwrap();
        (dir, path)
    }

    #[tokio::test]
    async fn test_filename_rule_skips_analysis() {
        let analyzer = Arc::new(RecordingAnalyzer::default());
        let classifier = classifier(vec!["a", "b"], analyzer.clone());
        let (_dir, path) = staged_file().await;

        let result = classifier
            .classify("ibm-10k.pdf", &path, OutputType::Text)
            .await
            .unwrap();

        assert_eq!(result.label.as_deref(), Some("IBM Corp."));
        assert_eq!(result.matched_by, MatchSource::Filename);
        assert!(analyzer.texts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_entity_rule_uses_page_window() {
        let analyzer = Arc::new(RecordingAnalyzer {
            entities: vec![company("Initech")],
            ..Default::default()
        });
        let classifier = classifier(
            vec!["cover", "second  page", "third\npage", "fourth", "fifth"],
            analyzer.clone(),
        );
        let (_dir, path) = staged_file().await;

        let result = classifier
            .classify("report.pdf", &path, OutputType::Pdf)
            .await
            .unwrap();

        assert_eq!(result.label.as_deref(), Some("Initech"));
        assert_eq!(result.entity_key, None);
        assert_eq!(result.matched_by, MatchSource::Entity);
        assert_eq!(result.extension, "pdf");
        assert_eq!(
            analyzer.texts.lock().unwrap().as_slice(),
            ["second page third page fourth"]
        );
    }

    #[tokio::test]
    async fn test_empty_window_is_unmatched() {
        let analyzer = Arc::new(RecordingAnalyzer::default());
        let classifier = classifier(vec!["only page"], analyzer.clone());
        let (_dir, path) = staged_file().await;

        let result = classifier
            .classify("report.pdf", &path, OutputType::Text)
            .await
            .unwrap();

        assert_eq!(result.matched_by, MatchSource::None);
        assert!(analyzer.texts.lock().unwrap().is_empty());
    }
}
