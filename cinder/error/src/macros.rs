//! Shorthands for the most common error returns

/// Returns early with an [`EmitError`](crate::EmitError) built from the given kind
#[macro_export]
macro_rules! emit_bail {
    ($kind:expr) => {
        return ::std::result::Result::Err($crate::EmitError::new($kind).into())
    };
}

/// Returns early with an unsupported operation error
#[macro_export]
macro_rules! emit_unsupported {
    ($operation:expr, $operands:expr) => {
        $crate::emit_bail!($crate::EmitErrorKind::UnsupportedOperation {
            operation: ::std::string::ToString::to_string(&$operation),
            operands: ::std::string::ToString::to_string(&$operands),
        })
    };
}
