//! External process execution.

use anyhow::{Context, Result};
use log::debug;
use std::process::Command;

use super::RealRuntime;

impl RealRuntime {
    #[tracing::instrument(skip(self, envs))]
    pub(crate) fn run_command_impl(
        &self,
        program: &str,
        args: &[String],
        envs: &[(String, String)],
    ) -> Result<i32> {
        debug!("Running {} {:?}", program, args);

        let status = Command::new(program)
            .args(args)
            .envs(envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .status()
            .with_context(|| format!("Failed to run {}", program))?;

        debug!("{} exited with {}", program, status);
        Ok(status.code().unwrap_or(-1))
    }
}
