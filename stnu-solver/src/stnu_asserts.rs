//! Leveled internal assertions.
//!
//! Violations of these assertions indicate a bug in the checker itself (for
//! example a reduction rule producing a "negative" cycle with non-negative
//! weight), never a property of the input network. They therefore panic
//! instead of surfacing through the error channel used for malformed inputs.

#[cfg(all(not(test), not(feature = "debug-checks")))]
pub const STNU_ASSERT_LEVEL_DEFINITION: u8 = STNU_ASSERT_SIMPLE;

#[cfg(any(test, feature = "debug-checks"))]
pub const STNU_ASSERT_LEVEL_DEFINITION: u8 = STNU_ASSERT_EXTREME;

pub const STNU_ASSERT_SIMPLE: u8 = 1;
pub const STNU_ASSERT_MODERATE: u8 = 2;
pub const STNU_ASSERT_EXTREME: u8 = 3;

#[macro_export]
#[doc(hidden)]
macro_rules! stnu_assert_simple {
    ($($arg:tt)*) => {
        if $crate::stnu_asserts::STNU_ASSERT_LEVEL_DEFINITION >= $crate::stnu_asserts::STNU_ASSERT_SIMPLE {
            assert!($($arg)*);
        }
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! stnu_assert_moderate {
    ($($arg:tt)*) => {
        if $crate::stnu_asserts::STNU_ASSERT_LEVEL_DEFINITION >= $crate::stnu_asserts::STNU_ASSERT_MODERATE {
            assert!($($arg)*);
        }
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! stnu_assert_extreme {
    ($($arg:tt)*) => {
        if $crate::stnu_asserts::STNU_ASSERT_LEVEL_DEFINITION >= $crate::stnu_asserts::STNU_ASSERT_EXTREME {
            assert!($($arg)*);
        }
    };
}
