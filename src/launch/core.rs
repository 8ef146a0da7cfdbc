use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus};
use std::thread;
use std::time::{Duration, Instant};

use serde_json::Value;
use which::which;

use crate::config::LauncherConfig;
use crate::error::LaunchError;
use crate::logging::{LAUNCH_TARGET, LogLevel, Logger, event_with_fields, json_kv, json_str};

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Per-launch settings.
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    /// Block until the viewer exits.
    pub wait: bool,
    /// Working directory of the viewer process.
    pub cwd: Option<PathBuf>,
    /// Macro substitutions, passed in insertion order.
    pub macros: Vec<(String, String)>,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            wait: true,
            cwd: None,
            macros: Vec::new(),
        }
    }
}

impl LaunchOptions {
    pub fn detached() -> Self {
        Self {
            wait: false,
            ..Self::default()
        }
    }

    pub fn with_macro(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.macros.push((key.into(), value.into()));
        self
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }
}

/// What became of a launched viewer.
#[derive(Debug)]
pub enum LaunchOutcome {
    /// Started without waiting; the caller owns the process.
    Running(Child),
    Exited(ExitStatus),
}

/// Starts the EDM viewer on an EDL file.
#[derive(Debug, Clone, Default)]
pub struct Launcher {
    config: LauncherConfig,
    logger: Option<Logger>,
}

impl Launcher {
    pub fn new(config: LauncherConfig) -> Self {
        Self {
            config,
            logger: None,
        }
    }

    pub fn with_logger(mut self, logger: Option<Logger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn config(&self) -> &LauncherConfig {
        &self.config
    }

    /// Arguments passed after the program name: base flags, macros, then
    /// the file.
    pub fn arguments(&self, path: &Path, macros: &[(String, String)]) -> Vec<String> {
        let mut args = self.config.args.clone();
        if !macros.is_empty() {
            args.push("-m".to_string());
            args.push(join_macros(macros));
        }
        args.push(path.to_string_lossy().into_owned());
        args
    }

    pub fn launch(&self, path: &Path, options: &LaunchOptions) -> Result<LaunchOutcome, LaunchError> {
        if !path.exists() {
            return Err(LaunchError::FileNotFound(path.to_path_buf()));
        }
        let program = which(&self.config.program)
            .map_err(|_| LaunchError::ExecutableMissing(self.config.program.clone()))?;
        let args = self.arguments(path, &options.macros);
        self.log(
            LogLevel::Info,
            "launching",
            [
                json_str("program", program.to_string_lossy()),
                json_kv("args", args.clone()),
            ],
        );

        let mut command = Command::new(&program);
        command.args(&args);
        if let Some(cwd) = &options.cwd {
            command.current_dir(cwd);
        }
        let mut child = command.spawn().map_err(LaunchError::Spawn)?;

        if !options.wait {
            return Ok(LaunchOutcome::Running(child));
        }
        let status = match self.config.timeout() {
            Some(timeout) => self.wait_with_timeout(&mut child, timeout)?,
            None => child.wait().map_err(LaunchError::Spawn)?,
        };
        Ok(LaunchOutcome::Exited(status))
    }

    fn wait_with_timeout(&self, child: &mut Child, timeout: Duration) -> Result<ExitStatus, LaunchError> {
        let started = Instant::now();
        loop {
            if let Some(status) = child.try_wait().map_err(LaunchError::Spawn)? {
                return Ok(status);
            }
            if started.elapsed() >= timeout {
                let _ = child.kill();
                let _ = child.wait();
                self.log(
                    LogLevel::Warn,
                    "viewer_timed_out",
                    [json_kv("timeout_ms", timeout.as_millis() as u64)],
                );
                return Err(LaunchError::TimedOut(timeout));
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    fn log<const N: usize>(&self, level: LogLevel, message: &str, fields: [(String, Value); N]) {
        if let Some(logger) = &self.logger {
            let _ = logger.log_event(event_with_fields(level, LAUNCH_TARGET, message, fields));
        }
    }
}

/// `K=V,K2=V2` as EDM expects for `-m`.
pub fn join_macros(macros: &[(String, String)]) -> String {
    macros
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arguments_put_path_last() {
        let launcher = Launcher::default();
        let options = LaunchOptions::default()
            .with_macro("P", "TST:")
            .with_macro("R", "MTR:01");
        let args = launcher.arguments(Path::new("screen.edl"), &options.macros);
        assert_eq!(args, vec!["-x", "-eolc", "-m", "P=TST:,R=MTR:01", "screen.edl"]);
    }

    #[test]
    fn no_macro_flag_without_macros() {
        let args = Launcher::default().arguments(Path::new("screen.edl"), &[]);
        assert_eq!(args, vec!["-x", "-eolc", "screen.edl"]);
    }

    #[test]
    fn missing_file_is_reported_first() {
        let err = Launcher::default()
            .launch(Path::new("/no/such/screen.edl"), &LaunchOptions::default())
            .unwrap_err();
        assert!(matches!(err, LaunchError::FileNotFound(_)));
    }

    #[test]
    fn missing_executable() {
        let file = tempfile::Builder::new().suffix(".edl").tempfile().unwrap();
        let launcher = Launcher::new(LauncherConfig {
            program: "edm-viewer-that-does-not-exist".to_string(),
            ..LauncherConfig::default()
        });
        let err = launcher
            .launch(file.path(), &LaunchOptions::default())
            .unwrap_err();
        assert!(matches!(err, LaunchError::ExecutableMissing(ref name) if name == "edm-viewer-that-does-not-exist"));
    }

    #[cfg(unix)]
    #[test]
    fn slow_viewer_is_killed_after_timeout() {
        let file = tempfile::Builder::new().suffix(".edl").tempfile().unwrap();
        let launcher = Launcher::new(LauncherConfig {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), "sleep 5".to_string(), "edm".to_string()],
            timeout_ms: Some(100),
        });
        let started = Instant::now();
        let err = launcher
            .launch(file.path(), &LaunchOptions::default())
            .unwrap_err();
        assert!(matches!(err, LaunchError::TimedOut(_)));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[cfg(unix)]
    #[test]
    fn waits_for_exit_status() {
        let file = tempfile::Builder::new().suffix(".edl").tempfile().unwrap();
        let launcher = Launcher::new(LauncherConfig {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), "exit 0".to_string(), "edm".to_string()],
            timeout_ms: Some(5_000),
        });
        match launcher.launch(file.path(), &LaunchOptions::default()).unwrap() {
            LaunchOutcome::Exited(status) => assert!(status.success()),
            LaunchOutcome::Running(_) => panic!("expected the viewer to be waited on"),
        }
    }
}
