//! Application handlers.
//!
//! Query handlers that orchestrate domain operations.

pub mod risk_assessment;

pub use risk_assessment::{
    AIAugmentationOrchestrator, AiEnhancement, AssessmentAssembler, EnhancementConfig,
    EnhancementMode, RiskAssessmentError, RiskAssessmentService,
};
