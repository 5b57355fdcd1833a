use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

pub struct CmdResult {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
    pub log_path: PathBuf,
}

/// Optional knobs for a single binary invocation.
#[derive(Default)]
pub struct CaseOptions<'a> {
    /// Used as `HOME` so no real user config is picked up.
    pub home: Option<&'a Path>,
    pub cwd: Option<&'a Path>,
    pub stdin: Option<&'a str>,
    pub env: &'a [(&'a str, &'a str)],
}

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis())
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

fn resolve_bin_path() -> PathBuf {
    if let Ok(path) = std::env::var("CARGO_BIN_EXE_hardsecnet") {
        return PathBuf::from(path);
    }

    let exe_name = if cfg!(windows) {
        "hardsecnet.exe"
    } else {
        "hardsecnet"
    };
    let fallback = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(PathBuf::from))
        .and_then(|deps| deps.parent().map(PathBuf::from))
        .map(|debug_dir| debug_dir.join(exe_name));

    match fallback {
        Some(path) if path.exists() => path,
        _ => panic!("unable to resolve hardsecnet binary path for integration test"),
    }
}

pub fn run_cli_case(case_name: &str, args: &[&str]) -> CmdResult {
    run_cli_case_with(case_name, args, &CaseOptions::default())
}

pub fn run_cli_case_with(case_name: &str, args: &[&str], opts: &CaseOptions<'_>) -> CmdResult {
    let root = std::env::temp_dir().join("hardsecnet-test-logs");
    fs::create_dir_all(&root).expect("create temp test log dir");

    let log_path = root.join(format!("{}-{}.log", sanitize(case_name), now_millis()));
    let bin_path = resolve_bin_path();

    let mut command = Command::new(&bin_path);
    command
        .args(args)
        .env("RUST_BACKTRACE", "1")
        .env_remove("HSN_ROOT")
        .env_remove("HSN_COLOR")
        .env_remove("HSN_RUNNER_PROGRAM")
        .env_remove("HSN_RUNNER_ARGS")
        .env_remove("HSN_LOG_JSONL")
        .env_remove("HSN_OUTPUT_FORMAT")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(home) = opts.home {
        command.env("HOME", home).env("USERPROFILE", home);
    }
    if let Some(cwd) = opts.cwd {
        command.current_dir(cwd);
    }
    for (key, value) in opts.env {
        command.env(key, value);
    }

    let mut child = command.spawn().expect("spawn hardsecnet command");
    {
        let mut stdin = child.stdin.take().expect("child stdin");
        if let Some(input) = opts.stdin {
            stdin.write_all(input.as_bytes()).expect("write child stdin");
        }
    }
    let output = child.wait_with_output().expect("execute hardsecnet command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    let mut log_content = String::new();
    log_content.push_str(&format!("case={case_name}\n"));
    log_content.push_str(&format!("bin={}\n", bin_path.display()));
    log_content.push_str(&format!("args={args:?}\n"));
    log_content.push_str(&format!("status={}\n", output.status));
    log_content.push_str("----- stdout -----\n");
    log_content.push_str(&stdout);
    log_content.push('\n');
    log_content.push_str("----- stderr -----\n");
    log_content.push_str(&stderr);
    log_content.push('\n');
    fs::write(&log_path, log_content).expect("write test log");

    CmdResult {
        status: output.status,
        stdout,
        stderr,
        log_path,
    }
}
