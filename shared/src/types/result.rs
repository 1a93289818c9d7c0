//! Outcome of a single benchmark run

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestResult {
    /// Run completed and produced samples
    Success,
    /// The compute API returned an error
    Error,
    /// Extension function was not found, test is skipped
    DriverFunctionNotFound,
    /// Device lacks some functionality the test needs
    DeviceNotCapable,
    /// The API cannot express the given parameters
    ApiNotCapable,
    /// Binary kernel was not found in the working directory
    KernelNotFound,
    /// API disabled by the user
    SkippedApi,
    /// API not built into this binary
    UnsupportedApi,
    /// Test has no body for this API
    NoImplementation,
    /// Vendor extensions are required but disabled
    IntelExtensionsRequired,
    /// Test-specific arguments were invalid
    InvalidArgs,
    /// Only the test name and measurement shape were printed
    Nooped,
    /// Rejected by a test or argument filter
    FilteredOut,
    /// Results were incorrect
    VerificationFail,
    /// Kernel could not be compiled
    KernelBuildError,
}

/// How a non-success result is reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestResultInfo {
    pub message: &'static str,
    pub print_in_single_test_mode: bool,
    pub print_in_all_tests_mode: bool,
    pub was_skipped: bool,
    pub print_in_print_all_results_mode: bool,
}

const fn info(
    message: &'static str,
    print_in_single_test_mode: bool,
    print_in_all_tests_mode: bool,
    was_skipped: bool,
) -> TestResultInfo {
    TestResultInfo {
        message,
        print_in_single_test_mode,
        print_in_all_tests_mode,
        was_skipped,
        print_in_print_all_results_mode: true,
    }
}

impl TestResult {
    pub fn info(&self) -> TestResultInfo {
        #[rustfmt::skip]
        let result = match self {
            //                                        message               single  all    skipped
            TestResult::Success => {
                warn!("Tried to get metadata for TestResult::Success. This is a benchmark framework issue.");
                info("SUCCESS",             false,  false, false)
            }
            TestResult::Error                   => info("ERROR",               true,   true,  false),
            TestResult::DriverFunctionNotFound  => info("NO_SUPPORT",          true,   true,  true),
            TestResult::DeviceNotCapable        => info("NO_SUPPORT",          true,   false, true),
            TestResult::ApiNotCapable           => info("NO_SUPPORT (API)",    true,   false, true),
            TestResult::KernelNotFound          => info("MISSING_KERNEL",      true,   true,  true),
            TestResult::SkippedApi              => info("SKIPPED",             false,  false, true),
            TestResult::UnsupportedApi          => info("SKIPPED",             false,  false, true),
            TestResult::NoImplementation        => info("NO_IMPLEMENT",        true,   false, true),
            TestResult::IntelExtensionsRequired => info("NO_SUPPORT",          true,   false, true),
            TestResult::InvalidArgs             => info("INVALID_ARGS",        true,   true,  true),
            TestResult::Nooped                  => info("NOOP",                true,   true,  true),
            TestResult::FilteredOut             => info("FILTERED_OUT",        true,   false, true),
            TestResult::VerificationFail        => info("VERIF_FAIL",          true,   true,  false),
            TestResult::KernelBuildError        => info("KERNEL_BUILD_ERROR",  true,   true,  false),
        };
        result
    }

    /// How badly a run went, 0 for anything that is not a failure
    pub fn severity(&self) -> u8 {
        match self {
            TestResult::Error => 4,
            TestResult::KernelBuildError => 3,
            TestResult::VerificationFail => 2,
            TestResult::InvalidArgs => 1,
            _ => 0,
        }
    }

    /// Results that mean the run itself went wrong, as opposed to being skipped
    pub fn is_failure(&self) -> bool {
        self.severity() > 0
    }

    /// Process exit code for a run whose worst result is `self`
    pub fn exit_code(&self) -> i32 {
        if self.is_failure() {
            1
        } else {
            0
        }
    }
}

impl fmt::Display for TestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestResult::Success => f.write_str("SUCCESS"),
            other => f.write_str(other.info().message),
        }
    }
}
