use ort::execution_providers::{CPUExecutionProvider, ExecutionProviderDispatch};

/// Execution providers registered on every model session, most preferred first.
///
/// The platform accelerator (CoreML, DirectML) is tried before the CPU
/// provider, which always closes the list.
pub fn preferred_execution_providers() -> Vec<ExecutionProviderDispatch> {
    let mut providers = Vec::with_capacity(2);
    #[cfg(target_os = "macos")]
    providers.push(ort::execution_providers::CoreMLExecutionProvider::default().build());
    #[cfg(target_os = "windows")]
    providers.push(ort::execution_providers::DirectMLExecutionProvider::default().build());
    providers.push(CPUExecutionProvider::default().build());
    providers
}
