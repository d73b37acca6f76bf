// SPDX-License-Identifier: GPL-3.0-only
//! `kscreen-doctor` runner
//!
//! One subprocess per call, stdout/stderr captured, killed when the timeout
//! elapses.

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use super::CommandRunner;
use crate::config::ToolConfig;
use crate::error::ToolError;

#[derive(Debug, Clone)]
pub struct KscreenDoctor {
    program: String,
    timeout: Duration,
}

impl KscreenDoctor {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    pub fn from_config(config: &ToolConfig) -> Self {
        Self::new(config.program.clone(), config.timeout())
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Run the tool and report why it failed, if it did
    pub async fn execute(&self, args: &[String]) -> Result<(), ToolError> {
        let mut command = Command::new(&self.program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| ToolError::Timeout {
                program: self.program.clone(),
                timeout: self.timeout,
            })?
            .map_err(|source| ToolError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(ToolError::Exit {
                program: self.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

impl CommandRunner for KscreenDoctor {
    async fn run(&self, args: &[String]) -> bool {
        debug!("running {} {}", self.program, args.join(" "));

        match self.execute(args).await {
            Ok(()) => true,
            Err(e) => {
                warn!("{} {} failed: {}", self.program, args.join(" "), e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_zero_exit_is_success() {
        let tool = KscreenDoctor::new("true", Duration::from_secs(10));
        assert!(tool.run(&args(&["output.HDMI-A-1.enable"])).await);
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_failure() {
        let tool = KscreenDoctor::new("false", Duration::from_secs(10));
        assert!(!tool.run(&args(&["output.HDMI-A-1.enable"])).await);
        assert!(matches!(
            tool.execute(&args(&["output.HDMI-A-1.enable"])).await,
            Err(ToolError::Exit { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_binary_is_failure() {
        let tool = KscreenDoctor::new("hdmi-manager-no-such-tool", Duration::from_secs(10));
        assert!(!tool.run(&args(&["output.HDMI-A-1.enable"])).await);
        assert!(matches!(
            tool.execute(&args(&[])).await,
            Err(ToolError::Spawn { .. })
        ));
    }

    #[tokio::test]
    async fn test_timeout_is_failure() {
        let tool = KscreenDoctor::new("sleep", Duration::from_millis(200));
        let start = std::time::Instant::now();

        assert!(matches!(
            tool.execute(&args(&["5"])).await,
            Err(ToolError::Timeout { .. })
        ));
        assert!(!tool.run(&args(&["5"])).await);
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_from_config() {
        let tool = KscreenDoctor::from_config(&ToolConfig::default());
        assert_eq!(tool.program(), "kscreen-doctor");
        assert_eq!(tool.timeout, Duration::from_secs(10));
    }
}
