use super::{ConfigError, EventError};

impl From<&'static str> for ConfigError {
    fn from(message: &'static str) -> Self {
        ConfigError::TestExpectation { message }
    }
}

impl From<String> for ConfigError {
    fn from(value: String) -> Self {
        ConfigError::TestExpectationValue {
            message: "Test expectation failed",
            value,
        }
    }
}

impl From<&'static str> for EventError {
    fn from(message: &'static str) -> Self {
        EventError::TestExpectation { message }
    }
}

impl From<String> for EventError {
    fn from(value: String) -> Self {
        EventError::TestExpectationValue {
            message: "Test expectation failed",
            value,
        }
    }
}
