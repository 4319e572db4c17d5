//! Inference engine abstraction and the tract-backed implementation.
//!
//! The pipeline depends only on the narrow blocking [`Engine::invoke`]
//! contract, not on any specific runtime's API surface. Engines are owned
//! resources handed to the pipeline at construction time; there is no
//! ambient or global handle.

use std::{fmt::Write, path::Path};

use log::{debug, warn};
use tract_onnx::prelude::{
    Framework, Graph, InferenceModelExt, IntoTensor, SimplePlan, Tensor, TypedFact, TypedOp, tvec,
};

use crate::error::{InspectError, Result};

type RunnableModel = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// Blocking inference boundary: one input tensor in, all output tensors out.
///
/// The call runs to completion or failure; no timeout or cancellation is
/// imposed here. Each invocation receives its own tensor and must not
/// retain state across calls.
pub trait Engine: Send + Sync + std::fmt::Debug {
    fn invoke(&self, input: Tensor) -> Result<Vec<Tensor>>;
}

/// ONNX model executed with `tract-onnx`.
#[derive(Debug)]
pub struct TractEngine {
    runnable: RunnableModel,
}

impl TractEngine {
    /// Load and optimize an ONNX graph.
    ///
    /// Falls back to a decluttered (unoptimized, ~2x slower) graph when
    /// optimization fails, so an exotic but valid model still runs.
    pub fn load<P: AsRef<Path>>(model_path: P) -> Result<Self> {
        let path = model_path.as_ref();
        if !path.exists() {
            return Err(model_load_error(path, "model file not found"));
        }

        let runnable = match load_runnable_model(path, true) {
            Ok(model) => {
                debug!("model {} optimized successfully", path.display());
                model
            }
            Err(opt_err) => {
                let mut chain_msg = String::new();
                for cause in opt_err.chain() {
                    let _ = writeln!(&mut chain_msg, "  - {cause}");
                }
                warn!(
                    "model {} failed optimized load ({opt_err}); falling back to decluttered graph.\nError chain:\n{}",
                    path.display(),
                    chain_msg.trim_end()
                );
                load_runnable_model(path, false).map_err(|fallback_err| {
                    model_load_error(
                        path,
                        &format!(
                            "optimized load failed ({opt_err}); decluttered fallback failed ({fallback_err})"
                        ),
                    )
                })?
            }
        };

        Ok(Self { runnable })
    }
}

impl Engine for TractEngine {
    fn invoke(&self, input: Tensor) -> Result<Vec<Tensor>> {
        let outputs = self
            .runnable
            .run(tvec![input.into()])
            .map_err(|e| InspectError::Inference(format!("model execution failed: {e}")))?;

        Ok(outputs
            .into_iter()
            .map(|value| value.into_tensor())
            .collect())
    }
}

/// Checked f32 view of an output tensor.
///
/// Replaces raw-buffer reinterpretation: a type or layout mismatch fails
/// with an [`InspectError::Inference`] instead of undefined behavior.
pub fn output_f32(tensor: &Tensor) -> Result<&[f32]> {
    tensor
        .as_slice::<f32>()
        .map_err(|e| InspectError::Inference(format!("output tensor is not contiguous f32: {e}")))
}

fn load_runnable_model(path: &Path, optimized: bool) -> anyhow::Result<RunnableModel> {
    let model = tract_onnx::onnx().model_for_path(path)?;

    if optimized {
        model
            .into_optimized()
            .map_err(|e| anyhow::anyhow!("unable to optimize graph: {e}"))?
            .into_runnable()
            .map_err(|e| anyhow::anyhow!("unable to make graph runnable: {e}"))
    } else {
        model
            .into_typed()
            .map_err(|e| anyhow::anyhow!("unable to type-check graph: {e}"))?
            .into_decluttered()
            .map_err(|e| anyhow::anyhow!("unable to declutter graph: {e}"))?
            .into_runnable()
            .map_err(|e| anyhow::anyhow!("unable to make graph runnable: {e}"))
    }
}

fn model_load_error(path: &Path, reason: &str) -> InspectError {
    InspectError::ModelLoad {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn loading_missing_model_fails() {
        let err = TractEngine::load("missing.onnx").expect_err("missing file should fail");
        assert!(matches!(err, InspectError::ModelLoad { .. }));
        assert!(format!("{err}").contains("missing.onnx"));
    }

    #[test]
    fn invalid_model_produces_useful_error() {
        let mut temp = NamedTempFile::new().expect("temp file");
        temp.write_all(b"not a real onnx file")
            .expect("write mock model");

        let err = TractEngine::load(temp.path()).expect_err("invalid ONNX should fail");
        assert!(matches!(err, InspectError::ModelLoad { .. }));
    }

    #[test]
    fn output_f32_rejects_non_float_tensors() {
        let tensor = Tensor::from_shape(&[2], &[1i64, 2]).unwrap();
        let err = output_f32(&tensor).unwrap_err();
        assert!(matches!(err, InspectError::Inference(_)));
    }
}
