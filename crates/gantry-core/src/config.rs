//! Runtime configuration read from the platform environment.
//!
//! The hosting platform describes the execution environment through a
//! fixed set of environment variables. They are read once at startup;
//! nothing here changes between invocations.

use std::env;

use crate::error::{CoreError, CoreResult};

/// Static description of the execution environment.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
    /// Host and port of the Runtime API endpoint.
    pub endpoint: String,
    /// Name of the function being executed.
    pub function_name: String,
    /// Version of the function being executed.
    pub version: String,
    /// Memory available to the function, in MB.
    pub memory_mb: i32,
    /// Log group name, when the platform provides one.
    pub log_group: Option<String>,
    /// Log stream name, when the platform provides one.
    pub log_stream: Option<String>,
}

impl RuntimeConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> CoreResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Read the configuration through a caller-supplied lookup.
    ///
    /// Lets tests build a config without touching process-global state.
    pub fn from_lookup<F>(lookup: F) -> CoreResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |name: &'static str| lookup(name).ok_or(CoreError::MissingEnv(name));

        let memory_raw = require("AWS_LAMBDA_FUNCTION_MEMORY_SIZE")?;
        let memory_mb = memory_raw
            .parse::<i32>()
            .map_err(|_| CoreError::InvalidEnv {
                name: "AWS_LAMBDA_FUNCTION_MEMORY_SIZE",
                value: memory_raw,
            })?;

        Ok(RuntimeConfig {
            endpoint: require("AWS_LAMBDA_RUNTIME_API")?,
            function_name: require("AWS_LAMBDA_FUNCTION_NAME")?,
            version: require("AWS_LAMBDA_FUNCTION_VERSION")?,
            memory_mb,
            log_group: lookup("AWS_LAMBDA_LOG_GROUP_NAME"),
            log_stream: lookup("AWS_LAMBDA_LOG_STREAM_NAME"),
        })
    }
}
