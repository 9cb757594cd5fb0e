//! JSON snapshot store for users and posts.
//!
//! The whole state lives in memory and is rewritten to a single file after
//! every mutation:
//!
//! ```json
//! { "users": [ ... ], "posts": [ ... ] }
//! ```
//!
//! Ids come from per-collection counters that only move forward, so an id
//! freed by a delete is never handed out again while the process runs.
//! After a reload the counters restart at `max(id) + 1`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use crate::core::errors::StorageError;
use crate::core::helpers::{now_after, now_iso, parse_author_id};
use crate::models::models::{Post, Record, User};

/// Field mapping accepted by the add/update operations.
pub type Fields = serde_json::Map<String, Value>;

const ID: &str = "id";
const CREATED_AT: &str = "createdAt";
const UPDATED_AT: &str = "updatedAt";
const AUTHOR_ID: &str = "author_id";

#[derive(Serialize)]
struct SnapshotRef<'a> {
    users: &'a [User],
    posts: &'a [Post],
}

/// Snapshot as read back: records stay raw so one bad entry cannot take the
/// rest of the file down with it.
#[derive(Deserialize)]
struct RawSnapshot {
    #[serde(default)]
    users: Value,
    #[serde(default)]
    posts: Value,
}

pub struct Storage {
    path: PathBuf,
    users: Vec<User>,
    posts: Vec<Post>,
    next_user_id: i64,
    next_post_id: i64,
}

impl Storage {
    /// Open the store backed by `path`, loading whatever snapshot is there.
    ///
    /// A missing or empty file starts an empty store. A file that is not
    /// valid JSON is logged and discarded; a record of the wrong shape is
    /// logged and skipped.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let mut storage = Storage {
            path: path.into(),
            users: Vec::new(),
            posts: Vec::new(),
            next_user_id: 1,
            next_post_id: 1,
        };
        storage.load_from_file()?;
        Ok(storage)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn next_user_id(&self) -> i64 {
        self.next_user_id
    }

    pub fn next_post_id(&self) -> i64 {
        self.next_post_id
    }

    // === Users ===

    pub fn add_user(&mut self, data: Fields) -> Result<User, StorageError> {
        let next = advance::<User>(self.next_user_id)?;
        let user: User = build_new(data, self.next_user_id)?;
        self.next_user_id = next;
        self.users.push(user.clone());
        tracing::debug!(id = user.id, login = %user.login, "user added");
        self.save_to_file()?;
        Ok(user)
    }

    pub fn get_user(&self, id: i64) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn update_user(&mut self, id: i64, fields: Fields) -> Result<bool, StorageError> {
        let Some(index) = self.users.iter().position(|u| u.id == id) else {
            return Ok(false);
        };
        self.users[index] = merge(&self.users[index], fields)?;
        tracing::debug!(id, "user updated");
        self.save_to_file()?;
        Ok(true)
    }

    pub fn delete_user(&mut self, id: i64) -> Result<bool, StorageError> {
        let Some(index) = self.users.iter().position(|u| u.id == id) else {
            return Ok(false);
        };
        self.users.remove(index);
        tracing::debug!(id, "user deleted");
        self.save_to_file()?;
        Ok(true)
    }

    pub fn list_users(&self) -> &[User] {
        &self.users
    }

    // === Posts ===

    pub fn add_post(&mut self, mut data: Fields) -> Result<Post, StorageError> {
        let next = advance::<Post>(self.next_post_id)?;
        let author_id = parse_author_id(data.get(AUTHOR_ID))?;
        data.insert(AUTHOR_ID.to_string(), Value::from(author_id));
        let post: Post = build_new(data, self.next_post_id)?;
        self.next_post_id = next;
        self.posts.push(post.clone());
        tracing::debug!(id = post.id, author_id, "post added");
        self.save_to_file()?;
        Ok(post)
    }

    pub fn get_post(&self, id: i64) -> Option<&Post> {
        self.posts.iter().find(|p| p.id == id)
    }

    pub fn update_post(&mut self, id: i64, mut fields: Fields) -> Result<bool, StorageError> {
        let Some(index) = self.posts.iter().position(|p| p.id == id) else {
            return Ok(false);
        };
        if fields.contains_key(AUTHOR_ID) {
            let author_id = parse_author_id(fields.get(AUTHOR_ID))?;
            fields.insert(AUTHOR_ID.to_string(), Value::from(author_id));
        }
        self.posts[index] = merge(&self.posts[index], fields)?;
        tracing::debug!(id, "post updated");
        self.save_to_file()?;
        Ok(true)
    }

    pub fn delete_post(&mut self, id: i64) -> Result<bool, StorageError> {
        let Some(index) = self.posts.iter().position(|p| p.id == id) else {
            return Ok(false);
        };
        self.posts.remove(index);
        tracing::debug!(id, "post deleted");
        self.save_to_file()?;
        Ok(true)
    }

    pub fn list_posts(&self) -> &[Post] {
        &self.posts
    }

    /// Posts written by `author_id`, in insertion order.
    pub fn posts_by_author(&self, author_id: i64) -> impl Iterator<Item = &Post> {
        self.posts.iter().filter(move |p| p.author_id == author_id)
    }

    // === Persistence ===

    /// Write the full snapshot, replacing the previous file in one rename.
    pub fn save_to_file(&self) -> Result<(), StorageError> {
        let snapshot = SnapshotRef {
            users: &self.users,
            posts: &self.posts,
        };
        let bytes = serde_json::to_vec_pretty(&snapshot)?;

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let tmp = self.tmp_path();
        fs::write(&tmp, &bytes)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "data.json".to_string());
        self.path.with_file_name(format!(".{}.tmp", name))
    }

    fn load_from_file(&mut self) -> Result<(), StorageError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "no snapshot yet, starting empty");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };
        if bytes.is_empty() {
            return Ok(());
        }

        let raw: RawSnapshot = match serde_json::from_slice(&bytes) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "failed to decode snapshot, the file may be corrupted; starting empty"
                );
                return Ok(());
            }
        };

        let users = decode_records::<User>(raw.users);
        let posts = decode_records::<Post>(raw.posts);
        self.next_user_id = next_id(&users)?;
        self.next_post_id = next_id(&posts)?;
        self.users = users;
        self.posts = posts;
        tracing::info!(
            path = %self.path.display(),
            users = self.users.len(),
            posts = self.posts.len(),
            "snapshot loaded"
        );
        Ok(())
    }
}

/// Decode one collection of the snapshot, skipping entries that do not fit.
fn decode_records<T: Record + DeserializeOwned>(raw: Value) -> Vec<T> {
    let entries = match raw {
        Value::Array(entries) => entries,
        Value::Null => return Vec::new(),
        other => {
            tracing::warn!(entity = T::ENTITY, found = %other, "collection is not a list; ignoring it");
            return Vec::new();
        }
    };

    entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value::<T>(entry) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(entity = T::ENTITY, index, error = %e, "skipping unreadable record");
                None
            }
        })
        .collect()
}

/// The counter value after `current` has been handed out.
fn advance<T: Record>(current: i64) -> Result<i64, StorageError> {
    current
        .checked_add(1)
        .ok_or(StorageError::IdSpaceExhausted { entity: T::ENTITY })
}

fn next_id<T: Record>(records: &[T]) -> Result<i64, StorageError> {
    match records.iter().map(T::id).max() {
        Some(max) => advance::<T>(max),
        None => Ok(1),
    }
}

fn validation<T: Record>(source: serde_json::Error) -> StorageError {
    StorageError::Validation {
        entity: T::ENTITY,
        source,
    }
}

/// Build a fresh record from caller fields; id and timestamps are ours.
fn build_new<T: Record + DeserializeOwned>(mut data: Fields, id: i64) -> Result<T, StorageError> {
    let now = Value::String(now_iso());
    data.insert(ID.to_string(), Value::from(id));
    data.insert(CREATED_AT.to_string(), now.clone());
    data.insert(UPDATED_AT.to_string(), now);
    serde_json::from_value(Value::Object(data)).map_err(validation::<T>)
}

/// Shallow-merge `fields` over `record`, keeping its id and creation time.
fn merge<T: Record + Serialize + DeserializeOwned>(record: &T, fields: Fields) -> Result<T, StorageError> {
    let mut merged: Fields = serde_json::from_value(serde_json::to_value(record)?)?;
    for (key, value) in fields {
        if key != ID && key != CREATED_AT {
            merged.insert(key, value);
        }
    }
    merged.insert(UPDATED_AT.to_string(), Value::String(now_after(record.updated_at())));
    serde_json::from_value(Value::Object(merged)).map_err(validation::<T>)
}
