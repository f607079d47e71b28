//! The two persisted session blobs: the signed-in user and the chosen society.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, SocietyError};
use crate::store::{Society, User};

const SESSION_DIR: &str = "session";
const USER_FILE: &str = "user.json";
const SOCIETY_FILE: &str = "society.json";

#[derive(Debug, Default)]
pub struct Session {
    pub user: Option<User>,
    pub society: Option<Society>,
}

fn session_dir(data_dir: &Path) -> PathBuf {
    data_dir.join(SESSION_DIR)
}

fn read_blob<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| SocietyError::DataParse {
            path: path.to_path_buf(),
            source: e,
        })
}

fn write_blob<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let content =
        serde_json::to_string_pretty(value).map_err(|e| SocietyError::DataWrite(e.to_string()))?;
    fs::write(path, content)?;
    Ok(())
}

fn remove_blob(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path)?;
    }
    Ok(())
}

/// Restore whatever session was saved; absent blobs are simply `None`.
pub fn load_session(data_dir: &Path) -> Result<Session> {
    let dir = session_dir(data_dir);
    Ok(Session {
        user: read_blob(&dir.join(USER_FILE))?,
        society: read_blob(&dir.join(SOCIETY_FILE))?,
    })
}

pub fn save_society(data_dir: &Path, society: &Society) -> Result<()> {
    let dir = session_dir(data_dir);
    fs::create_dir_all(&dir)?;
    write_blob(&dir.join(SOCIETY_FILE), society)
}

pub fn save_user(data_dir: &Path, user: &User) -> Result<()> {
    let dir = session_dir(data_dir);
    fs::create_dir_all(&dir)?;
    write_blob(&dir.join(USER_FILE), user)
}

pub fn clear_user(data_dir: &Path) -> Result<()> {
    remove_blob(&session_dir(data_dir).join(USER_FILE))
}

pub fn clear_session(data_dir: &Path) -> Result<()> {
    let dir = session_dir(data_dir);
    remove_blob(&dir.join(USER_FILE))?;
    remove_blob(&dir.join(SOCIETY_FILE))
}
