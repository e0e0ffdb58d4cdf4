use std::cell::RefCell;

use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub level: LogLevel,
    pub message: String,
}

/// Where handlers report what happened to a message.
///
/// `info`/`error` are log records; `echo`/`echo_error` are plain console
/// lines the platform captures from the process output.
pub trait RelayLog {
    fn info(&self, message: &str);
    fn error(&self, message: &str);
    fn echo(&self, line: &str);
    fn echo_error(&self, line: &str);
}

/// Log buffer owned by a single invocation.
///
/// Records go to `tracing` immediately and are handed back to the Functions
/// host in the invocation response.
#[derive(Debug)]
pub struct InvocationLog {
    function: String,
    invocation_id: Option<String>,
    records: RefCell<Vec<LogRecord>>,
}

impl InvocationLog {
    pub fn new(function: &str, invocation_id: Option<&str>) -> Self {
        Self {
            function: function.to_string(),
            invocation_id: invocation_id.map(str::to_string),
            records: RefCell::new(Vec::new()),
        }
    }

    #[cfg(test)]
    pub fn records(&self) -> Vec<LogRecord> {
        self.records.borrow().clone()
    }

    pub fn into_lines(self) -> Vec<String> {
        self.records
            .into_inner()
            .into_iter()
            .map(|record| record.message)
            .collect()
    }

    fn push(&self, level: LogLevel, message: &str) {
        self.records.borrow_mut().push(LogRecord {
            level,
            message: message.to_string(),
        });
    }
}

impl RelayLog for InvocationLog {
    fn info(&self, message: &str) {
        info!(
            function = %self.function,
            invocation_id = self.invocation_id.as_deref().unwrap_or("-"),
            "{message}"
        );
        self.push(LogLevel::Info, message);
    }

    fn error(&self, message: &str) {
        error!(
            function = %self.function,
            invocation_id = self.invocation_id.as_deref().unwrap_or("-"),
            "{message}"
        );
        self.push(LogLevel::Error, message);
    }

    fn echo(&self, line: &str) {
        println!("{line}");
    }

    fn echo_error(&self, line: &str) {
        eprintln!("{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_records_in_emission_order() {
        let log = InvocationLog::new("QueueTriggerFunction", Some("id-1"));
        log.info("first");
        log.error("second");
        log.echo("console only");

        assert_eq!(
            log.records(),
            vec![
                LogRecord {
                    level: LogLevel::Info,
                    message: "first".to_string(),
                },
                LogRecord {
                    level: LogLevel::Error,
                    message: "second".to_string(),
                },
            ]
        );
        assert_eq!(log.into_lines(), vec!["first", "second"]);
    }
}
