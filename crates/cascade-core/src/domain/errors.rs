use super::level::LevelKey;
use super::line::Process;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type CascadeResult<T> = Result<T, CascadeError>;
pub type ParserResult<T> = CascadeResult<T>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CascadeErrorCategory {
    Success,
    InputValidationError,
    IoSystemError,
    ComputationError,
    InternalError,
}

impl CascadeErrorCategory {
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::InputValidationError => 2,
            Self::IoSystemError => 3,
            Self::ComputationError => 4,
            Self::InternalError => 5,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::InputValidationError => "InputValidationError",
            Self::IoSystemError => "IoSystemError",
            Self::ComputationError => "ComputationError",
            Self::InternalError => "InternalError",
        }
    }

    pub const fn is_fatal(self) -> bool {
        !matches!(self, Self::Success)
    }
}

/// Faults raised by the cascade engine itself. All of them mean the cascade
/// data is inconsistent; none are retried.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CascadeFault {
    #[error("no {process} dataset matches selection key {key}")]
    MissingDataset { process: Process, key: f64 },
    #[error("unknown transition process '{0}'; expected Radiative, Auger or Photo")]
    UnknownProcess(String),
    #[error("level {0} is not present in the cascade graph")]
    LevelNotFound(LevelKey),
    #[error("level {0} has daughters but their total branching rate is zero")]
    ZeroBranchingRate(LevelKey),
}

impl CascadeFault {
    pub const fn placeholder(&self) -> &'static str {
        match self {
            Self::MissingDataset { .. } => "INPUT.MISSING_DATASET",
            Self::UnknownProcess(_) => "INPUT.UNKNOWN_PROCESS",
            Self::LevelNotFound(_) => "RUN.LEVEL_NOT_FOUND",
            Self::ZeroBranchingRate(_) => "RUN.ZERO_BRANCHING_RATE",
        }
    }

    pub const fn category(&self) -> CascadeErrorCategory {
        match self {
            Self::MissingDataset { .. } | Self::UnknownProcess(_) => {
                CascadeErrorCategory::InputValidationError
            }
            Self::LevelNotFound(_) | Self::ZeroBranchingRate(_) => {
                CascadeErrorCategory::ComputationError
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CascadeError {
    category: CascadeErrorCategory,
    placeholder: &'static str,
    message: String,
    fault: Option<CascadeFault>,
}

impl CascadeError {
    pub fn new(
        category: CascadeErrorCategory,
        placeholder: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            placeholder,
            message: message.into(),
            fault: None,
        }
    }

    pub fn input_validation(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(
            CascadeErrorCategory::InputValidationError,
            placeholder,
            message,
        )
    }

    pub fn io_system(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(CascadeErrorCategory::IoSystemError, placeholder, message)
    }

    pub fn computation(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(CascadeErrorCategory::ComputationError, placeholder, message)
    }

    pub fn internal(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(CascadeErrorCategory::InternalError, placeholder, message)
    }

    pub fn missing_dataset(process: Process, key: f64) -> Self {
        CascadeFault::MissingDataset { process, key }.into()
    }

    pub fn unknown_process(tag: impl Into<String>) -> Self {
        CascadeFault::UnknownProcess(tag.into()).into()
    }

    pub fn level_not_found(key: LevelKey) -> Self {
        CascadeFault::LevelNotFound(key).into()
    }

    pub fn zero_branching_rate(key: LevelKey) -> Self {
        CascadeFault::ZeroBranchingRate(key).into()
    }

    /// Prefixes the message with `context`, keeping category and fault.
    pub fn with_context(mut self, context: impl Display) -> Self {
        self.message = format!("{}: {}", context, self.message);
        self
    }

    pub const fn category(&self) -> CascadeErrorCategory {
        self.category
    }

    pub const fn placeholder(&self) -> &'static str {
        self.placeholder
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn fault(&self) -> Option<&CascadeFault> {
        self.fault.as_ref()
    }

    pub const fn exit_code(&self) -> i32 {
        self.category.exit_code()
    }

    pub fn diagnostic_line(&self) -> String {
        let severity = if self.category.is_fatal() {
            "ERROR"
        } else {
            "INFO"
        };
        format!("{}: [{}] {}", severity, self.placeholder, self.message)
    }

    pub fn fatal_exit_line(&self) -> Option<String> {
        self.category
            .is_fatal()
            .then(|| format!("FATAL EXIT CODE: {}", self.exit_code()))
    }
}

impl From<CascadeFault> for CascadeError {
    fn from(fault: CascadeFault) -> Self {
        Self {
            category: fault.category(),
            placeholder: fault.placeholder(),
            message: fault.to_string(),
            fault: Some(fault),
        }
    }
}

impl Display for CascadeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] {}",
            self.category.as_str(),
            self.placeholder,
            self.message
        )
    }
}

impl Error for CascadeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.fault
            .as_ref()
            .map(|fault| fault as &(dyn Error + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::{CascadeError, CascadeErrorCategory, CascadeFault};
    use crate::domain::{AngularMomentum, LevelKey, Parity, Process};

    #[test]
    fn exit_mapping_is_stable() {
        let cases = [
            (CascadeErrorCategory::Success, 0, "Success"),
            (
                CascadeErrorCategory::InputValidationError,
                2,
                "InputValidationError",
            ),
            (CascadeErrorCategory::IoSystemError, 3, "IoSystemError"),
            (
                CascadeErrorCategory::ComputationError,
                4,
                "ComputationError",
            ),
            (CascadeErrorCategory::InternalError, 5, "InternalError"),
        ];

        for (category, exit_code, name) in cases {
            assert_eq!(category.exit_code(), exit_code);
            assert_eq!(category.as_str(), name);
        }
    }

    #[test]
    fn fatal_error_renders_compatibility_lines() {
        let error = CascadeError::input_validation("INPUT.LINE_RATE", "negative rate at line 3");

        assert_eq!(error.exit_code(), 2);
        assert_eq!(
            error.diagnostic_line(),
            "ERROR: [INPUT.LINE_RATE] negative rate at line 3"
        );
        assert_eq!(
            error.fatal_exit_line().as_deref(),
            Some("FATAL EXIT CODE: 2")
        );
        assert!(error.fault().is_none());
    }

    #[test]
    fn cascade_faults_keep_their_typed_cause() {
        let key = LevelKey::new(-12.5, AngularMomentum::from_twice(3), Parity::Odd, 2);
        let error = CascadeError::level_not_found(key);

        assert_eq!(error.category(), CascadeErrorCategory::ComputationError);
        assert_eq!(error.placeholder(), "RUN.LEVEL_NOT_FOUND");
        assert_eq!(error.fault(), Some(&CascadeFault::LevelNotFound(key)));
        assert!(error.message().contains("3/2-"));

        let missing = CascadeError::missing_dataset(Process::Photo, 1.5);
        assert_eq!(missing.exit_code(), 2);
        assert!(missing.message().contains("Photo"));
    }
}
