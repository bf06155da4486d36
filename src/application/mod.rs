//! Application layer - Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.

pub mod handlers;

pub use handlers::{
    AIAugmentationOrchestrator, AiEnhancement, AssessmentAssembler, EnhancementConfig,
    EnhancementMode, RiskAssessmentError, RiskAssessmentService,
};
