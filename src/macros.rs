/// Info with `format!` arguments, either on the default logger or on an explicit
/// one: `infof!("x={}", x)` / `infof!(logger => "x={}", x)`.
#[macro_export]
macro_rules! infof {
    ($logger:expr => $($arg:tt)*) => {{
        use $crate::Emit as _;
        $logger.info_formatted(format_args!($($arg)*))
    }};
    ($($arg:tt)*) => {
        $crate::info_formatted(format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! errorf {
    ($logger:expr => $($arg:tt)*) => {{
        use $crate::Emit as _;
        $logger.error_formatted(format_args!($($arg)*))
    }};
    ($($arg:tt)*) => {
        $crate::error_formatted(format_args!($($arg)*))
    };
}

/// Like [`errorf!`] but fatal: closes the logger's resources and exits with 1.
#[macro_export]
macro_rules! fatalf {
    ($logger:expr => $($arg:tt)*) => {{
        use $crate::Emit as _;
        $logger.fatal_formatted(format_args!($($arg)*))
    }};
    ($($arg:tt)*) => {
        $crate::fatal_formatted(format_args!($($arg)*))
    };
}
