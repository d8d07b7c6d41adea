use std::sync::Arc;

use ao_pipeline::OptimizationOrchestrator;

pub struct AppState {
    pub orchestrator: Arc<OptimizationOrchestrator>,
}
