use log::error;
use std::fmt::Debug;

/// Unwraps a value whose presence is an invariant of the surrounding code. On failure, the location and the optional
/// context are logged as an error before panicking.
#[macro_export]
macro_rules! u(
    ($e:expr) => (
        $crate::unwrap::InvariantUnwrap::unwrap_invariant($e, $crate::unwrap::Location {
            module_path: module_path!(),
            file: file!(),
            line: line!(),
            context: None,
        })
    );
    ($e:expr, $context:expr) => (
        $crate::unwrap::InvariantUnwrap::unwrap_invariant($e, $crate::unwrap::Location {
            module_path: module_path!(),
            file: file!(),
            line: line!(),
            context: Some($context),
        })
    );
);

pub struct Location {
    pub module_path: &'static str,
    pub file: &'static str,
    pub line: u32,
    pub context: Option<&'static str>,
}

impl Location {
    fn fail(&self, failure: &str) -> ! {
        match self.context {
            Some(context) => error!(
                "Broken invariant ({}) at {}:{} in {}: {}.",
                context, self.file, self.line, self.module_path, failure
            ),
            None => error!(
                "Broken invariant at {}:{} in {}: {}.",
                self.file, self.line, self.module_path, failure
            ),
        }
        panic!("broken invariant at {}:{}", self.file, self.line);
    }
}

pub trait InvariantUnwrap {
    type Type;
    fn unwrap_invariant(self, location: Location) -> Self::Type;
}

impl<T, E: Debug> InvariantUnwrap for Result<T, E> {
    type Type = T;

    fn unwrap_invariant(self, location: Location) -> T {
        match self {
            Ok(x) => x,
            Err(e) => location.fail(&format!("{:?}", e)),
        }
    }
}

impl<T> InvariantUnwrap for Option<T> {
    type Type = T;

    fn unwrap_invariant(self, location: Location) -> T {
        match self {
            Some(x) => x,
            None => location.fail("missing value"),
        }
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_unwraps_present_values() {
        assert_eq!(u!(Some(3)), 3);
        assert_eq!(u!("7".parse::<u8>(), "parsing a digit"), 7);
    }

    #[test]
    #[should_panic(expected = "broken invariant")]
    fn test_panics_on_missing_value() {
        let empty: Option<u8> = None;
        u!(empty, "the value was just inserted");
    }
}
