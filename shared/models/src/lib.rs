//! # ADC Domain Models
//!
//! Types shared by the classifier service:
//!
//! - **EntityRules**: filename/entity lookup tables loaded from `.properties` files
//! - **AnalysisResponse**: the NLU service's entity and keyword payload
//! - **ClassificationResponse**: what the upload endpoint answers with

pub mod classification;
pub mod nlu;
pub mod rules;


pub use classification::*;
pub use nlu::*;
pub use rules::*;
