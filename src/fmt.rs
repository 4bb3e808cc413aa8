//! Logging front-end.
//!
//! Routes the crate's log statements to `log` or `defmt`, whichever feature is
//! enabled (`log` wins if both are). Without either feature the arguments are
//! only borrowed so no unused-variable warnings leak out.

#![macro_use]
#![allow(unused_macros)]

macro_rules! __rcwl_log {
    ($level:ident, $s:literal $(, $x:expr)* $(,)?) => {
        {
            cfg_if::cfg_if! {
                if #[cfg(feature = "log")] {
                    ::log::$level!($s $(, $x)*);
                } else if #[cfg(feature = "defmt")] {
                    ::defmt::$level!($s $(, $x)*);
                } else {
                    let _ = ($( & $x ),*);
                }
            }
        }
    };
}

macro_rules! trace {
    ($($arg:tt)*) => {
        __rcwl_log!(trace, $($arg)*)
    };
}

macro_rules! debug {
    ($($arg:tt)*) => {
        __rcwl_log!(debug, $($arg)*)
    };
}

macro_rules! info {
    ($($arg:tt)*) => {
        __rcwl_log!(info, $($arg)*)
    };
}

macro_rules! warn {
    ($($arg:tt)*) => {
        __rcwl_log!(warn, $($arg)*)
    };
}

macro_rules! error {
    ($($arg:tt)*) => {
        __rcwl_log!(error, $($arg)*)
    };
}
