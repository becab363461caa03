//! Internal helper macros.

/// Returns early with `Err($error)` when `$predicate` does not hold.
///
/// ```ignore
/// ensure!(lines.len() <= max_headers, ParseError::too_many_headers(max_headers));
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;
