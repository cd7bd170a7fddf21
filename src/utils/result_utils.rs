use log::warn;
use std::fmt::Display;

pub trait ResultUtils<T> {
    /// Logs the error as a warning prefixed by the description and drops it, keeping the value if there is one.
    fn warn_if_err(self, description: &str) -> Option<T>;
}

impl<T, E: Display> ResultUtils<T> for Result<T, E> {
    fn warn_if_err(self, description: &str) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("{}: {}.", description, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::document::placed_object::ObjectId;
    use crate::errors::DocumentError;
    use crate::utils::result_utils::ResultUtils;

    #[test]
    fn test_warn_if_err() {
        let found: Result<u32, DocumentError> = Ok(4);
        assert_eq!(found.warn_if_err("Lookup failed"), Some(4));
        let missing: Result<u32, DocumentError> = Err(DocumentError::UnknownObject(ObjectId(9)));
        assert_eq!(missing.warn_if_err("Lookup failed"), None);
    }
}
