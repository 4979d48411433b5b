mod orchestrator;

pub use orchestrator::BatchJobOrchestrator;
