//! Line protocol shared by [`TcpCoordinator`](super::TcpCoordinator) and
//! [`CoordinatorServer`](super::CoordinatorServer).

use crate::error::CoordinatorError;

const STATUS: &str = "STATUS";
const ABORT: &str = "ABORT";
const ABORTED: &str = "ABORTED";
const RUNNING: &str = "RUNNING";
const OK: &str = "OK";
const ERR: &str = "ERR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Request {
    Status { group: String },
    Abort { group: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Reply {
    Aborted,
    Running,
    Ok,
    Err(String),
}

impl Request {
    /// Parses one request line (without the trailing newline).
    pub(crate) fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (verb, group) = line.split_once(' ').unwrap_or((line, ""));
        let group = group.trim();
        if group.is_empty() || group.contains(char::is_whitespace) {
            return Err(format!("bad group in {line:?}"));
        }
        match verb {
            STATUS => Ok(Request::Status {
                group: group.to_string(),
            }),
            ABORT => Ok(Request::Abort {
                group: group.to_string(),
            }),
            other => Err(format!("unknown verb {other:?}")),
        }
    }

    pub(crate) fn encode(&self) -> String {
        match self {
            Request::Status { group } => format!("{STATUS} {group}\n"),
            Request::Abort { group } => format!("{ABORT} {group}\n"),
        }
    }
}

impl Reply {
    pub(crate) fn parse(line: &str) -> Result<Self, CoordinatorError> {
        let line = line.trim();
        match line {
            ABORTED => Ok(Reply::Aborted),
            RUNNING => Ok(Reply::Running),
            OK => Ok(Reply::Ok),
            _ => match line
                .strip_prefix(ERR)
                .filter(|rest| rest.is_empty() || rest.starts_with(' '))
            {
                Some(reason) => Ok(Reply::Err(reason.trim().to_string())),
                None => Err(CoordinatorError::Protocol {
                    reply: line.to_string(),
                }),
            },
        }
    }

    pub(crate) fn encode(&self) -> String {
        match self {
            Reply::Aborted => format!("{ABORTED}\n"),
            Reply::Running => format!("{RUNNING}\n"),
            Reply::Ok => format!("{OK}\n"),
            Reply::Err(reason) => format!("{ERR} {reason}\n"),
        }
    }
}
