//! Risk assessment handlers.
//!
//! - `orchestrator` - bounded AI enhancement with soft degrade
//! - `assembler` - builds results from fresh computation or a cache row
//! - `service` - hash-checked cache-or-compute and forced refresh

mod assembler;
mod orchestrator;
mod service;

pub use assembler::AssessmentAssembler;
pub use orchestrator::{
    AIAugmentationOrchestrator, AiEnhancement, EnhancementConfig, EnhancementMode,
};
pub use service::{RiskAssessmentError, RiskAssessmentService};
