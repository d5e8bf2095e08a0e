use crate::report::Status;
use serde::Serialize;
use serde_json;
use std::error;
use std::fmt;
use std::io;
use std::path::Path;

#[derive(Debug, Serialize, Clone)]
pub struct ServiceError {
    pub msg: String,
    pub status: Status,
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let json = serde_json::to_string_pretty(&self).map_err(|_| fmt::Error)?;
        write!(f, "{}", json)
    }
}

impl error::Error for ServiceError {}

impl ServiceError {
    pub fn input_not_found<T: fmt::Display>(msg: T) -> ServiceError {
        ServiceError {
            msg: msg.to_string(),
            status: Status::InputNotFound,
        }
    }

    pub fn input_unreadable<T: fmt::Display>(msg: T) -> ServiceError {
        ServiceError {
            msg: msg.to_string(),
            status: Status::InputUnreadable,
        }
    }

    pub fn output_write_failed<T: fmt::Display>(msg: T) -> ServiceError {
        ServiceError {
            msg: msg.to_string(),
            status: Status::OutputWriteFailed,
        }
    }

    pub fn invalid_config<T: fmt::Display>(msg: T) -> ServiceError {
        ServiceError {
            msg: msg.to_string(),
            status: Status::InvalidConfig,
        }
    }

    /// Classifies an I/O failure on an input file.
    pub fn reading(path: &Path, err: io::Error) -> ServiceError {
        let msg = format!("{}: {}", path.display(), err);
        match err.kind() {
            io::ErrorKind::NotFound => ServiceError::input_not_found(msg),
            _ => ServiceError::input_unreadable(msg),
        }
    }

    /// Classifies an I/O failure on an output file.
    pub fn writing(path: &Path, err: io::Error) -> ServiceError {
        ServiceError::output_write_failed(format!("{}: {}", path.display(), err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_input_is_not_found() {
        let err = ServiceError::reading(
            Path::new("input.csv"),
            io::Error::new(io::ErrorKind::NotFound, "gone"),
        );
        assert_eq!(err.status, Status::InputNotFound);
        assert!(err.msg.starts_with("input.csv"));
    }

    #[test]
    fn other_read_failures_are_unreadable() {
        let err = ServiceError::reading(
            Path::new("check.txt"),
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.status, Status::InputUnreadable);
    }

    #[test]
    fn display_renders_json() {
        let err = ServiceError::invalid_config("batch size must be positive");
        let rendered = err.to_string();
        assert!(rendered.contains("\"msg\": \"batch size must be positive\""));
        assert!(rendered.contains("\"status\": 5"));
    }
}
