//! Runs embedded `PostgreSQL` lifecycle steps for the test suites when they
//! are launched as root.
//!
//! Usage:
//!
//! ```text
//! pg_worker <operation> <config-path>
//! ```
//!
//! The `operation` must be `setup`, `start`, or `stop`. The JSON file at
//! `config-path` holds a [`WorkerPayload`]: the server settings plus
//! environment overrides. The worker drops to the `nobody` account before
//! touching the data directory, because `PostgreSQL` refuses to run as root.

#[cfg(unix)]
use camino::{Utf8Path, Utf8PathBuf};
#[cfg(unix)]
use nix::unistd::{Uid, User, initgroups, setgid, setuid};
#[cfg(unix)]
use pg_embedded_setup_unpriv::ambient_dir_and_path;
#[cfg(unix)]
use pg_embedded_setup_unpriv::worker::{PlainSecret, WorkerPayload};
#[cfg(unix)]
use postgresql_embedded::{PostgreSQL, Status};
#[cfg(unix)]
use std::env;
#[cfg(unix)]
use std::ffi::CString;
#[cfg(unix)]
use std::io::Read;
#[cfg(unix)]
use thiserror::Error;
#[cfg(unix)]
use tokio::runtime::Builder;

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[cfg(unix)]
const UNPRIVILEGED_USER: &str = "nobody";

/// Errors that can occur during worker operations.
#[cfg(unix)]
#[derive(Debug, Error)]
enum WorkerError {
    #[error("invalid arguments: {0}")]
    InvalidArgs(String),
    #[error("failed to read worker config: {0}")]
    ConfigRead(#[source] BoxError),
    #[error("failed to parse worker config: {0}")]
    ConfigParse(#[source] serde_json::Error),
    #[error("settings conversion failed: {0}")]
    SettingsConversion(String),
    #[error("runtime init failed: {0}")]
    RuntimeInit(#[source] std::io::Error),
    #[error("failed to drop privileges: {0}")]
    PrivilegeDrop(String),
    #[error("postgres operation failed: {0}")]
    PostgresOperation(String),
}

#[cfg(unix)]
#[derive(Debug, Clone, Copy)]
enum Operation {
    Setup,
    Start,
    Stop,
}

#[cfg(unix)]
impl Operation {
    fn parse(arg: &str) -> Result<Self, WorkerError> {
        match arg {
            "setup" => Ok(Self::Setup),
            "start" => Ok(Self::Start),
            "stop" => Ok(Self::Stop),
            other => Err(WorkerError::InvalidArgs(format!(
                "unknown operation '{other}'; expected setup, start, or stop"
            ))),
        }
    }
}

#[cfg(unix)]
fn main() -> Result<(), BoxError> {
    run_worker(env::args_os().skip(1)).map_err(Into::into)
}

#[cfg(unix)]
fn run_worker(args: impl Iterator<Item = std::ffi::OsString>) -> Result<(), WorkerError> {
    let (operation, config_path) = parse_args(args)?;
    let payload = load_payload(&config_path)?;
    drop_privileges_if_root(UNPRIVILEGED_USER)?;
    let settings = payload
        .settings
        .into_settings()
        .map_err(|err| WorkerError::SettingsConversion(err.to_string()))?;

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(WorkerError::RuntimeInit)?;
    apply_worker_environment(&payload.environment);
    let mut postgres = PostgreSQL::new(settings);
    runtime.block_on(async {
        match operation {
            Operation::Setup => {
                postgres
                    .setup()
                    .await
                    .map_err(|err| WorkerError::PostgresOperation(err.to_string()))?;
                ensure_started(&mut postgres).await
            }
            Operation::Start => ensure_started(&mut postgres).await,
            Operation::Stop => postgres
                .stop()
                .await
                .map_err(|err| WorkerError::PostgresOperation(err.to_string())),
        }
    })?;

    if matches!(operation, Operation::Setup | Operation::Start) {
        // The server must outlive this process; dropping the handle stops it.
        std::mem::forget(postgres);
    }
    Ok(())
}

#[cfg(unix)]
fn parse_args(
    mut args: impl Iterator<Item = std::ffi::OsString>,
) -> Result<(Operation, Utf8PathBuf), WorkerError> {
    let mut next_utf8 = |missing: &str| {
        args.next()
            .ok_or_else(|| WorkerError::InvalidArgs(format!("missing {missing} argument")))?
            .into_string()
            .map_err(|_| WorkerError::InvalidArgs("argument is not valid UTF-8".into()))
    };
    let operation = Operation::parse(&next_utf8("operation")?)?;
    let config_path = Utf8PathBuf::from(next_utf8("config path")?);
    if let Some(extra) = args.next() {
        return Err(WorkerError::InvalidArgs(format!(
            "unexpected extra argument: {}",
            extra.to_string_lossy()
        )));
    }
    Ok((operation, config_path))
}

#[cfg(unix)]
fn load_payload(config_path: &Utf8Path) -> Result<WorkerPayload, WorkerError> {
    let (dir, relative) = ambient_dir_and_path(config_path)
        .map_err(|err| WorkerError::ConfigRead(err.into()))?;
    let mut file = dir
        .open(relative.as_std_path())
        .map_err(|err| WorkerError::ConfigRead(err.into()))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|err| WorkerError::ConfigRead(err.into()))?;
    serde_json::from_slice(&bytes).map_err(WorkerError::ConfigParse)
}

#[cfg(unix)]
fn drop_privileges_if_root(username: &str) -> Result<(), WorkerError> {
    if !Uid::effective().is_root() {
        return Ok(());
    }

    let user = User::from_name(username)
        .map_err(|err| WorkerError::PrivilegeDrop(err.to_string()))?
        .ok_or_else(|| WorkerError::PrivilegeDrop(format!("user '{username}' not found")))?;
    let user_name = CString::new(user.name.clone()).map_err(|err| {
        WorkerError::PrivilegeDrop(format!("invalid user name for initgroups: {err}"))
    })?;
    initgroups(&user_name, user.gid).map_err(|err| WorkerError::PrivilegeDrop(err.to_string()))?;
    setgid(user.gid).map_err(|err| WorkerError::PrivilegeDrop(err.to_string()))?;
    setuid(user.uid).map_err(|err| WorkerError::PrivilegeDrop(err.to_string()))?;

    // SAFETY: the worker is single-threaded until the runtime is built.
    unsafe {
        env::set_var("HOME", user.dir);
        env::set_var("USER", &user.name);
        env::set_var("LOGNAME", user.name);
    }
    Ok(())
}

#[cfg(unix)]
fn apply_worker_environment(environment: &[(String, Option<PlainSecret>)]) {
    for (key, value) in environment {
        // SAFETY: the current-thread runtime has not started any task yet, so
        // nothing else reads the environment concurrently.
        unsafe {
            match value {
                Some(plain) => env::set_var(key, plain.expose()),
                None => env::remove_var(key),
            }
        }
    }
}

#[cfg(unix)]
async fn ensure_started(postgres: &mut PostgreSQL) -> Result<(), WorkerError> {
    if matches!(postgres.status(), Status::Started) {
        return Ok(());
    }
    postgres
        .start()
        .await
        .map_err(|err| WorkerError::PostgresOperation(err.to_string()))
}

#[cfg(not(unix))]
fn main() -> Result<(), BoxError> {
    Err("pg_worker is not supported on non-Unix platforms".into())
}
