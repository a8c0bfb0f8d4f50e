//! JSON configuration for [`UnfaultParams`].
//!
//! Every field is optional; missing ones take their defaults:
//!
//! ```json
//! { "sigma1": 4.0, "inner_iters": 200, "sinc": { "extrapolation": "constant" } }
//! ```
use crate::unfault::UnfaultParams;
use std::fs;
use std::path::Path;

pub fn load_params(path: &Path) -> Result<UnfaultParams, String> {
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    params_from_json(&contents)
        .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
}

/// Parse and sanity-check parameters from a JSON string.
pub fn params_from_json(json: &str) -> Result<UnfaultParams, String> {
    let params: UnfaultParams = serde_json::from_str(json).map_err(|e| e.to_string())?;
    validate(&params)?;
    Ok(params)
}

fn validate(params: &UnfaultParams) -> Result<(), String> {
    if !(params.sigma1 >= 0.0 && params.sigma2 >= 0.0) {
        return Err(format!(
            "smoothing half-widths must be non-negative, got ({}, {})",
            params.sigma1, params.sigma2
        ));
    }
    if !(params.small > 0.0 && params.small < 1.0) {
        return Err(format!("small must lie in (0, 1), got {}", params.small));
    }
    let sinc = &params.sinc;
    if sinc.length < 2 || sinc.length % 2 != 0 {
        return Err(format!("sinc length must be even and >= 2, got {}", sinc.length));
    }
    if sinc.table_size < 2 {
        return Err(format!("sinc table size must be >= 2, got {}", sinc.table_size));
    }
    Ok(())
}
