//! Request types for the withholding engine API.
//!
//! This module defines the JSON request structure for the `/calculate` endpoint.

use serde::{Deserialize, Serialize};

use crate::models::WithholdingRequest;

/// Request body for the `/calculate` endpoint.
///
/// The withholding inputs sit at the top level of the JSON body; an optional
/// employee reference is echoed back in the response so callers can match
/// results to payroll records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationRequest {
    /// Caller's identifier for the employee, not used in the calculation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<String>,
    /// The inputs for the pay period.
    #[serde(flatten)]
    pub withholding: WithholdingRequest,
}

impl From<WithholdingRequest> for CalculationRequest {
    fn from(withholding: WithholdingRequest) -> Self {
        Self {
            employee_id: None,
            withholding,
        }
    }
}
