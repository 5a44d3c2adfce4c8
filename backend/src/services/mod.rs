//! Business logic services for the Maize Advisor

pub mod pipeline;

pub use pipeline::{Consultation, PipelineOrchestrator, PlantingAdvice};
