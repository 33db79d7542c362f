use std::fs::{self, File};
use std::path::Path;
use std::process::{Command, Stdio};

use log::{debug, error};

use crate::error::{ConfigError, ConfigResult};
use crate::json::tmp_path;

/// Run `command` with its stdout written to `output`.
///
/// Stdout goes to `<output>.tmp` first, which replaces `output` only when the command succeeds.
/// The temporary file is removed on failure.
pub fn run_output(output: &Path, command: &[String]) -> ConfigResult<()> {
    let Some((program, args)) = command.split_first() else {
        return Err(ConfigError::validation("command", "Command is required"));
    };

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| ConfigError::FileWrite {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let tmp = tmp_path(output);
    let result = run_to_file(&tmp, program, args).and_then(|_| {
        fs::rename(&tmp, output).map_err(|e| ConfigError::FileWrite {
            path: output.to_path_buf(),
            source: e,
        })
    });
    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

fn run_to_file(tmp: &Path, program: &str, args: &[String]) -> ConfigResult<()> {
    let stdout = File::create(tmp).map_err(|e| ConfigError::FileWrite {
        path: tmp.to_path_buf(),
        source: e,
    })?;

    debug!("Running {} {:?}", program, args);
    let result = Command::new(program)
        .args(args)
        .stdout(Stdio::from(stdout))
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| ConfigError::CommandSpawn {
            command: program.to_string(),
            source: e,
        })?;

    if result.status.success() {
        return Ok(());
    }
    // Killed by a signal
    let code = result.status.code().unwrap_or(-1);
    let stderr = String::from_utf8_lossy(&result.stderr).trim().to_string();
    if stderr.is_empty() {
        return Err(ConfigError::CommandExit(code));
    }
    error!("Command stderr: {}", stderr);
    Err(ConfigError::CommandFailed { code, stderr })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Vec<String> {
        vec!["sh".to_string(), "-c".to_string(), script.to_string()]
    }

    #[test]
    fn test_run_output_writes_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("nested/out/keymap.json");
        run_output(&output, &sh("echo hello")).unwrap();
        assert_eq!(fs::read_to_string(&output).unwrap(), "hello\n");
        assert!(!tmp_path(&output).exists());
    }

    #[test]
    fn test_run_output_failure_keeps_previous_output() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("keymap.json");
        fs::write(&output, "previous").unwrap();

        let err = run_output(&output, &sh("echo partial; echo boom >&2; exit 3")).unwrap_err();
        assert_eq!(err.to_string(), "Command failed with exit code 3: boom");
        assert_eq!(fs::read_to_string(&output).unwrap(), "previous");
        assert!(!tmp_path(&output).exists());

        let err = run_output(&output, &sh("exit 2")).unwrap_err();
        assert_eq!(err.to_string(), "Command failed with exit code 2");
    }

    #[test]
    fn test_run_output_errors() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("keymap.json");
        let err = run_output(&output, &[]).unwrap_err();
        assert!(err.to_string().contains("Command is required"));

        let missing = vec!["definitely-not-a-real-command-xyz".to_string()];
        assert!(matches!(
            run_output(&output, &missing),
            Err(ConfigError::CommandSpawn { .. })
        ));
        assert!(!output.exists());
        assert!(!tmp_path(&output).exists());
    }
}
