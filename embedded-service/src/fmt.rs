//! Logging macro implementations
//!
//! Every level forwards to `__log!`, which is bound to `log` or `defmt` depending on the enabled feature.

#[cfg(all(feature = "log", feature = "defmt", not(doc)))]
compile_error!("features `log` and `defmt` are mutually exclusive");

#[cfg(all(not(doc), feature = "defmt"))]
mod defmt {
    /// Forwards a log record to defmt
    #[doc(hidden)]
    #[macro_export]
    #[collapse_debuginfo(yes)]
    macro_rules! __log {
        ($level:ident, $s:literal $(, $x:expr)* $(,)?) => {
            {
                ::defmt::$level!($s $(, $x)*);
            }
        };
    }
}

#[cfg(all(not(doc), feature = "log"))]
mod log {
    /// Forwards a log record to the log facade
    #[doc(hidden)]
    #[macro_export]
    #[collapse_debuginfo(yes)]
    macro_rules! __log {
        ($level:ident, $s:literal $(, $x:expr)* $(,)?) => {
            {
                ::log::$level!($s $(, $x)*);
            }
        };
    }
}

// Provide this implementation for `cargo doc`
#[cfg(any(doc, not(any(feature = "defmt", feature = "log"))))]
mod none {
    /// Evaluates and discards the arguments when no logger is enabled
    #[doc(hidden)]
    #[macro_export]
    #[collapse_debuginfo(yes)]
    macro_rules! __log {
        ($level:ident, $s:literal $(, $x:expr)* $(,)?) => {
            {
                let _ = ($( & $x ),*);
            }
        };
    }
}

/// Logs a trace message using the underlying logger
#[macro_export]
#[collapse_debuginfo(yes)]
macro_rules! trace {
    ($($arg:tt)*) => {
        $crate::__log!(trace, $($arg)*)
    };
}

/// Logs a debug message using the underlying logger
#[macro_export]
#[collapse_debuginfo(yes)]
macro_rules! debug {
    ($($arg:tt)*) => {
        $crate::__log!(debug, $($arg)*)
    };
}

/// Logs an info message using the underlying logger
#[macro_export]
#[collapse_debuginfo(yes)]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::__log!(info, $($arg)*)
    };
}

/// Logs a warning using the underlying logger
#[macro_export]
#[collapse_debuginfo(yes)]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::__log!(warn, $($arg)*)
    };
}

/// Logs an error using the underlying logger
#[macro_export]
#[collapse_debuginfo(yes)]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::__log!(error, $($arg)*)
    };
}
