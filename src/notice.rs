use serde::{Deserialize, Serialize};

/// How a page should style the message it shows the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
    Info,
}

/// One-shot user-facing message attached to action responses and error bodies.
///
/// Pages render it as a transient toast; stacking and fade-out are theirs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self { severity: Severity::Success, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { severity: Severity::Error, message: message.into() }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self { severity: Severity::Info, message: message.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_lowercase_severity() {
        let notice = Notice::success("Job listing approved successfully!");
        assert_eq!(
            serde_json::to_value(&notice).unwrap(),
            json!({ "severity": "success", "message": "Job listing approved successfully!" })
        );
        assert_eq!(Notice::info("x").severity, Severity::Info);
    }
}
