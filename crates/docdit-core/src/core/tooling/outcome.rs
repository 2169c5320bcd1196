use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    pub status: CommandStatus,
    pub message: String,
    #[serde(default)]
    pub details: Value,
}

impl ExecutionOutcome {
    pub fn success(message: impl Into<String>, details: Value) -> Self {
        Self {
            status: CommandStatus::Ok,
            message: message.into(),
            details,
        }
    }

    pub fn failure(message: impl Into<String>, details: Value) -> Self {
        Self {
            status: CommandStatus::Failure,
            message: message.into(),
            details,
        }
    }

    pub fn user_error(message: impl Into<String>, details: Value) -> Self {
        Self {
            status: CommandStatus::UserError,
            message: message.into(),
            details,
        }
    }

    /// Process exit code for this outcome; an explicit `exit_code` detail wins.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        let fallback = match self.status {
            CommandStatus::Ok => 0,
            CommandStatus::UserError => 1,
            CommandStatus::Failure => 2,
        };
        self.details
            .get("exit_code")
            .and_then(Value::as_i64)
            .and_then(|code| i32::try_from(code).ok())
            .unwrap_or(fallback)
    }

    #[must_use]
    pub fn hint(&self) -> Option<&str> {
        self.details.get("hint").and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum CommandStatus {
    Ok,
    UserError,
    Failure,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn exit_code_follows_status() {
        assert_eq!(ExecutionOutcome::success("ok", Value::Null).exit_code(), 0);
        assert_eq!(ExecutionOutcome::user_error("bad", json!({})).exit_code(), 1);
        assert_eq!(ExecutionOutcome::failure("boom", json!({})).exit_code(), 2);
    }

    #[test]
    fn explicit_exit_code_wins() {
        let outcome = ExecutionOutcome::failure("pip", json!({ "exit_code": 7, "hint": "retry" }));
        assert_eq!(outcome.exit_code(), 7);
        assert_eq!(outcome.hint(), Some("retry"));
    }
}
