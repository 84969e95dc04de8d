use thiserror::Error;

/// A common error type returned by functions throughout the crate.
///
/// Every variant carries a fully formatted message that includes the file and line where the
/// error was raised, so an error that reaches the operator can be traced back without a backtrace.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum TrajvizError {
    #[error("{0}")]
    GenericError(String),
    #[error("{0}")]
    MalformedModelDescription(String),
    #[error("{0}")]
    DimensionMismatch(String),
    #[error("{0}")]
    IdxOutOfBoundError(String),
    #[error("{0}")]
    MissingOptionalField(String),
    #[error("{0}")]
    MalformedSample(String),
    #[error("{0}")]
    RenderEngineError(String),
    #[error("{0}")]
    UnsupportedOperationError(String)
}
impl TrajvizError {
    pub fn new_generic_error_str(s: &str, file: &str, line: u32) -> Self {
        let s = format!("ERROR: {} -- File: {}, Line: {}", s, file, line);
        return Self::GenericError(s);
    }
    pub fn new_malformed_model_description_error(s: &str, file: &str, line: u32) -> Self {
        let s = format!("ERROR: Malformed robot description.  {} -- File: {}, Line: {}", s, file, line);
        return Self::MalformedModelDescription(s);
    }
    pub fn new_dimension_mismatch_error(function_name: &str, given_len: usize, expected_len: usize, file: &str, line: u32) -> Self {
        let s = format!("ERROR: Configuration vector of length {} given to {} does not match the model's {} degrees of freedom -- File: {}, Line: {}", given_len, function_name, expected_len, file, line);
        return Self::DimensionMismatch(s);
    }
    pub fn new_idx_out_of_bound_error(given_idx: usize, length_of_array: usize, file: &str, line: u32) -> Self {
        let s = format!("ERROR: Index {:?} is too large for the array of length {:?} -- File: {}, Line: {}", given_idx, length_of_array, file, line);
        return Self::IdxOutOfBoundError(s);
    }
    pub fn new_check_for_idx_out_of_bound_error(given_idx: usize, length_of_array: usize, file: &str, line: u32) -> Result<(), Self> {
        return if given_idx >= length_of_array {
            Err(Self::new_idx_out_of_bound_error(given_idx, length_of_array, file, line))
        } else {
            Ok(())
        }
    }
    pub fn new_missing_optional_field_error(field_name: &str, sample_idx: usize, file: &str, line: u32) -> Self {
        let s = format!("WARNING: Sample {} has no {} and it could not be derived -- File: {}, Line: {}", sample_idx, field_name, file, line);
        return Self::MissingOptionalField(s);
    }
    pub fn new_malformed_sample_error(s: &str, sample_idx: usize, file: &str, line: u32) -> Self {
        let s = format!("ERROR: Sample {} is malformed.  {} -- File: {}, Line: {}", sample_idx, s, file, line);
        return Self::MalformedSample(s);
    }
    pub fn new_render_engine_error(s: &str, file: &str, line: u32) -> Self {
        let s = format!("ERROR: Render engine refused operation.  {} -- File: {}, Line: {}", s, file, line);
        return Self::RenderEngineError(s);
    }
    pub fn new_unsupported_operation_error(function_name: &str, message: &str, file: &str, line: u32) -> Self {
        let s = format!("ERROR: Unsupported operation error in function {}.  {} -- File: {}, Line: {}", function_name, message, file, line);
        return Self::UnsupportedOperationError(s);
    }
    /// Returns true for errors that only invalidate a single trajectory sample.  Any other error
    /// invalidates the whole category it was raised in.
    pub fn is_sample_scoped(&self) -> bool {
        match self {
            TrajvizError::DimensionMismatch(_) => { true }
            TrajvizError::MissingOptionalField(_) => { true }
            _ => { false }
        }
    }
    pub fn message(&self) -> &str {
        match self {
            TrajvizError::GenericError(s) => { s }
            TrajvizError::MalformedModelDescription(s) => { s }
            TrajvizError::DimensionMismatch(s) => { s }
            TrajvizError::IdxOutOfBoundError(s) => { s }
            TrajvizError::MissingOptionalField(s) => { s }
            TrajvizError::MalformedSample(s) => { s }
            TrajvizError::RenderEngineError(s) => { s }
            TrajvizError::UnsupportedOperationError(s) => { s }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idx_check_only_fails_past_the_end() {
        assert!(TrajvizError::new_check_for_idx_out_of_bound_error(2, 3, file!(), line!()).is_ok());
        let err = TrajvizError::new_check_for_idx_out_of_bound_error(3, 3, file!(), line!()).unwrap_err();
        assert!(matches!(err, TrajvizError::IdxOutOfBoundError(_)));
    }

    #[test]
    fn sample_scoped_errors() {
        assert!(TrajvizError::new_dimension_mismatch_error("f", 5, 6, file!(), line!()).is_sample_scoped());
        assert!(TrajvizError::new_missing_optional_field_error("com_position", 0, file!(), line!()).is_sample_scoped());
        assert!(!TrajvizError::new_malformed_sample_error("NaN", 0, file!(), line!()).is_sample_scoped());
    }

    #[test]
    fn display_is_the_message() {
        let err = TrajvizError::new_dimension_mismatch_error("compute_com", 5, 6, "a.rs", 1);
        assert_eq!(format!("{}", err), err.message());
        assert!(err.message().contains("length 5"));
    }
}
