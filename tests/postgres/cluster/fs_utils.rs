//! Filesystem helpers for `PostgreSQL` test clusters.

use super::BoxError;
use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use postgresql_embedded::Settings;
use std::path::Path;

fn open_ambient_dir(path: &Utf8Path) -> Result<Dir, BoxError> {
    Dir::open_ambient_dir(path, ambient_authority()).map_err(|err| Box::new(err) as BoxError)
}

fn utf8(path: &Path) -> Result<&Utf8Path, BoxError> {
    Utf8Path::from_path(path).ok_or_else(|| {
        Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("path is not valid UTF-8: {}", path.display()),
        )) as BoxError
    })
}

/// Adopts the generated superuser password when bootstrap wrote one to disk.
pub(super) fn sync_password_from_file(settings: &mut Settings) -> Result<(), BoxError> {
    let password_path = utf8(&settings.password_file)?;
    let file_name = password_path.file_name().ok_or_else(|| {
        Box::new(std::io::Error::other("password path must include a file name")) as BoxError
    })?;
    let parent = password_path.parent().unwrap_or_else(|| Utf8Path::new("."));
    let contents = match open_ambient_dir(parent)?.read_to_string(file_name) {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(Box::new(err) as BoxError),
    };
    let password = contents.trim_end();
    if !password.is_empty() {
        password.clone_into(&mut settings.password);
    }
    Ok(())
}

/// Reads the port the server actually bound from `postmaster.pid`.
///
/// The fourth line of the pid file holds the port.
pub(super) fn sync_port_from_pid(settings: &mut Settings) -> Result<(), BoxError> {
    let data_dir = open_ambient_dir(utf8(&settings.data_dir)?)?;
    let contents = match data_dir.read_to_string("postmaster.pid") {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(Box::new(err) as BoxError),
    };

    let Some(port) = contents
        .lines()
        .nth(3)
        .and_then(|line| line.trim().parse::<u16>().ok())
    else {
        return Ok(());
    };
    settings.port = port;
    Ok(())
}
