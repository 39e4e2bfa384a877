//! Validation errors produced while resolving a request against a contract.
//!
//! Expected mismatches (unknown path, undeclared method) are returned as
//! values so callers can aggregate them with body/parameter validation
//! failures instead of unwinding.

use http::Method;
use serde::Serialize;
use std::fmt;

/// Broad validation area an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ValidationType {
    Path,
}

impl ValidationType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ValidationType::Path => "path",
        }
    }
}

/// Distinguishes "no such path" from "path exists, method does not".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ValidationSubType {
    Missing,
    MissingOperation,
}

impl ValidationSubType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ValidationSubType::Missing => "missing",
            ValidationSubType::MissingOperation => "missingOperation",
        }
    }
}

/// Position of the offending construct in the contract source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SpecLocation {
    pub line: usize,
    pub column: usize,
}

/// A single, locatable validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    pub validation_type: ValidationType,
    pub sub_type: ValidationSubType,
    pub message: String,
    pub reason: String,
    pub how_to_fix: String,
    pub request_path: String,
    pub request_method: String,
    /// The contract template closest to the request, when one matched.
    pub spec_path: Option<String>,
    /// `None` when the failure has no position in the contract source.
    pub location: Option<SpecLocation>,
}

const HOW_TO_FIX_PATH: &str = "Check the path is correct, and check that the correct HTTP method \
    has been used (e.g. GET, POST, PUT, DELETE)";

impl ValidationError {
    /// No template in the contract matches `request_path`.
    pub fn path_not_found(method: &Method, request_path: &str) -> Self {
        ValidationError {
            validation_type: ValidationType::Path,
            sub_type: ValidationSubType::Missing,
            message: format!("{method} Path '{request_path}' not found"),
            reason: format!(
                "The {method} request contains a path of '{request_path}' however that path, \
                or the {method} method for that path does not exist in the specification"
            ),
            how_to_fix: HOW_TO_FIX_PATH.to_string(),
            request_path: request_path.to_string(),
            request_method: method.to_string(),
            spec_path: None,
            location: None,
        }
    }

    /// `template` matched, but it declares no operation for `method`.
    pub fn operation_not_found(method: &Method, request_path: &str, template: &str) -> Self {
        ValidationError {
            validation_type: ValidationType::Path,
            sub_type: ValidationSubType::MissingOperation,
            message: format!("{method} Path '{request_path}' not found"),
            reason: format!("The {method} method for that path does not exist in the specification"),
            how_to_fix: HOW_TO_FIX_PATH.to_string(),
            request_path: request_path.to_string(),
            request_method: method.to_string(),
            spec_path: Some(template.to_string()),
            location: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_path_missing(&self) -> bool {
        self.sub_type == ValidationSubType::Missing
    }

    #[inline]
    #[must_use]
    pub fn is_operation_missing(&self) -> bool {
        self.sub_type == ValidationSubType::MissingOperation
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}/{}] {}: {}",
            self.validation_type.as_str(),
            self.sub_type.as_str(),
            self.message,
            self.reason
        )
    }
}

impl std::error::Error for ValidationError {}
