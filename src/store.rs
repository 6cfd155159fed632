use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::auth;

const STUDENTS_FILE: &str = "students.json";
const USERS_FILE: &str = "users.json";
const LOGS_FILE: &str = "logs.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub name: String,
    pub age: u32,
    pub course: String,
    pub math: u32,
    pub science: u32,
    pub history: u32,
    pub english: u32,
    pub parent_name: String,
    pub parent_phone: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Teacher,
    Student,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    pub name: String,
    /// SHA-256 digest of the password, lowercase hex. Never the plaintext.
    pub password: String,
    #[serde(rename = "type")]
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub user_id: String,
    pub activity: String,
}

pub type Students = Vec<Student>;
pub type Users = BTreeMap<String, Credential>;
pub type Logs = Vec<LogEntry>;

/// An in-memory working copy of one whole collection. Mutations happen on
/// `rows`; nothing touches disk until `commit`, which rewrites the backing
/// file in full. There is no locking: concurrent writers race, last write
/// wins.
pub struct Working<T> {
    path: PathBuf,
    pub rows: T,
}

impl<T: Serialize> Working<T> {
    pub fn commit(&self) -> anyhow::Result<()> {
        let text = serde_json::to_string_pretty(&self.rows)
            .context("failed to serialize collection")?;
        std::fs::write(&self.path, text)
            .with_context(|| format!("failed to write {}", self.path.to_string_lossy()))?;
        Ok(())
    }
}

/// Whole-file JSON store rooted at a workspace directory. Every checkout
/// re-reads the file; there is no cross-operation cache.
pub struct Store {
    dir: PathBuf,
}

impl Store {
    /// Open (creating if needed) a workspace and seed any absent collection
    /// with the default dataset. A collection that already exists is never
    /// touched, so seeding is a one-time bootstrap rather than a reset.
    pub fn open(dir: &Path) -> anyhow::Result<Store> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create workspace {}", dir.to_string_lossy()))?;
        let store = Store {
            dir: dir.to_path_buf(),
        };
        store.seed_defaults()?;
        Ok(store)
    }

    pub fn students(&self) -> anyhow::Result<Working<Students>> {
        self.checkout(STUDENTS_FILE)
    }

    pub fn users(&self) -> anyhow::Result<Working<Users>> {
        self.checkout(USERS_FILE)
    }

    pub fn logs(&self) -> anyhow::Result<Working<Logs>> {
        self.checkout(LOGS_FILE)
    }

    /// Absent file => empty collection, never an error. A file that exists
    /// but fails to parse is a real persistence failure and propagates.
    fn checkout<T: DeserializeOwned + Default>(&self, file: &str) -> anyhow::Result<Working<T>> {
        let path = self.dir.join(file);
        let rows = if path.is_file() {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.to_string_lossy()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("invalid JSON in {}", path.to_string_lossy()))?
        } else {
            T::default()
        };
        Ok(Working { path, rows })
    }

    fn seed_defaults(&self) -> anyhow::Result<()> {
        if !self.dir.join(STUDENTS_FILE).is_file() {
            Working {
                path: self.dir.join(STUDENTS_FILE),
                rows: default_students(),
            }
            .commit()?;
        }
        if !self.dir.join(USERS_FILE).is_file() {
            Working {
                path: self.dir.join(USERS_FILE),
                rows: default_users(),
            }
            .commit()?;
        }
        if !self.dir.join(LOGS_FILE).is_file() {
            Working {
                path: self.dir.join(LOGS_FILE),
                rows: Logs::new(),
            }
            .commit()?;
        }
        Ok(())
    }
}

fn student(
    id: &str,
    name: &str,
    age: u32,
    course: &str,
    marks: [u32; 4],
    parent_name: &str,
    parent_phone: &str,
) -> Student {
    Student {
        id: id.to_string(),
        name: name.to_string(),
        age,
        course: course.to_string(),
        math: marks[0],
        science: marks[1],
        history: marks[2],
        english: marks[3],
        parent_name: parent_name.to_string(),
        parent_phone: parent_phone.to_string(),
    }
}

fn default_students() -> Students {
    vec![
        student(
            "S001",
            "Alice Johnson",
            20,
            "Computer Science",
            [85, 92, 78, 88],
            "John Johnson",
            "123-456-7890",
        ),
        student(
            "S002",
            "Bob Smith",
            21,
            "Mechanical",
            [72, 68, 85, 79],
            "Mary Smith",
            "234-567-8901",
        ),
        student(
            "S003",
            "Charlie Brown",
            22,
            "Electrical",
            [91, 94, 89, 93],
            "Tom Brown",
            "345-678-9012",
        ),
        student(
            "S004",
            "Diana Prince",
            20,
            "Civil",
            [65, 70, 75, 68],
            "Bruce Prince",
            "456-789-0123",
        ),
        student(
            "S005",
            "Ethan Hunt",
            23,
            "Computer Science",
            [78, 82, 77, 85],
            "Ethan Hunt Sr.",
            "567-890-1234",
        ),
    ]
}

fn default_users() -> Users {
    let cred = |name: &str, password: &str, role: Role| Credential {
        name: name.to_string(),
        password: auth::hash_password(password),
        role,
    };
    let mut users = Users::new();
    users.insert("T001".into(), cred("Sarah Jones", "teacher123", Role::Teacher));
    users.insert("T002".into(), cred("Michael Brown", "teacher456", Role::Teacher));
    users.insert("S001".into(), cred("Alice Johnson", "alice123", Role::Student));
    users.insert("S002".into(), cred("Bob Smith", "bob123", Role::Student));
    users.insert("S003".into(), cred("Charlie Brown", "charlie123", Role::Student));
    users.insert("S004".into(), cred("Diana Prince", "diana123", Role::Student));
    users.insert("S005".into(), cred("Ethan Hunt", "ethan123", Role::Student));
    users
}
