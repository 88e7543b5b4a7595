/*
 * Responsibility
 * - Shared context for the demo Router (AppState)
 *   - the token stage configs, so handlers know which fields to read
 * - Cheap to clone (Arc inside)
 */
use std::sync::Arc;

use crate::services::{extract::ExtractConfig, verify::VerifyConfig};

#[derive(Clone, Debug)]
pub struct AppState {
    pub extract: Arc<ExtractConfig>,
    pub verify: Arc<VerifyConfig>,
}

impl AppState {
    pub fn new(extract: Arc<ExtractConfig>, verify: Arc<VerifyConfig>) -> Self {
        Self { extract, verify }
    }
}
