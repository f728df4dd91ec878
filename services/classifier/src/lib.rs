//! ADC Document Classifier Service
//!
//! Accepts a document upload, classifies PDFs by filename fragments or by
//! the entities an NLU service finds in their text, and answers with the
//! matching label.

pub mod app;
pub mod classification;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod nlu_client;
pub mod pdf_processor;
pub mod staging;

pub use app::{create_app, AppState};
pub use classification::DocumentClassifier;
pub use nlu_client::{EntityAnalyzer, NluClient};
pub use pdf_processor::{PdfProcessor, TextExtractor};
