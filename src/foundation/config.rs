use crate::foundation::error::{RasterError, RasterResult};

/// Renderer tuning knobs.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct RendererOpts {
    /// Dispatches recorded into one command buffer before it is flushed.
    pub dispatch_limit: u32,
    /// Largest single device buffer the renderer will request.
    pub max_buffer_bytes: u64,
}

impl Default for RendererOpts {
    fn default() -> Self {
        Self {
            dispatch_limit: 512,
            max_buffer_bytes: 1 << 30,
        }
    }
}

impl RendererOpts {
    /// Parse options from JSON. Missing fields take their defaults.
    pub fn from_json_str(s: &str) -> RasterResult<Self> {
        let opts: Self = serde_json::from_str(s)
            .map_err(|e| RasterError::validation(format!("renderer options: {e}")))?;
        opts.validate()?;
        Ok(opts)
    }

    /// Reject values the renderer cannot run with.
    pub fn validate(&self) -> RasterResult<()> {
        if self.dispatch_limit == 0 {
            return Err(RasterError::validation("dispatch_limit must be > 0"));
        }
        if self.max_buffer_bytes == 0 {
            return Err(RasterError::validation("max_buffer_bytes must be > 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
