use serde::Serialize;
use serde_json::{json, Value};

use crate::error::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    InputNotFound,
    InputUnreadable,
    OutputWriteFailed,
    InvalidConfig,
}

impl Status {
    /// Process exit code for this outcome.
    pub fn code(&self) -> i32 {
        match self {
            Status::Ok => 0,
            Status::InputNotFound => 2,
            Status::InputUnreadable => 3,
            Status::OutputWriteFailed => 4,
            Status::InvalidConfig => 5,
        }
    }
}

impl Serialize for Status {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_i32(self.code())
    }
}

/// Final outcome of a run, logged as JSON by the binary.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub status: Status,
    pub body: Value,
}

pub fn make_run_report(result: Result<Value, ServiceError>) -> RunReport {
    match result {
        Err(err) => RunReport {
            status: err.status,
            body: json!({ "error": err.msg }),
        },
        Ok(body) => RunReport {
            status: Status::Ok,
            body,
        },
    }
}
