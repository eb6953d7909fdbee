//! User Storage
//! Mission: Securely store and manage user accounts with SQLite

use crate::auth::models::{Role, User};
use anyhow::{Context, Result};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::Utc;
use rusqlite::{params, Connection};
use tracing::{info, warn};
use uuid::Uuid;

/// User storage with SQLite backend
pub struct UserStore {
    db_path: String,
    // Verified against when a username does not exist, so failed logins
    // take the same path either way.
    dummy_hash: String,
}

impl UserStore {
    /// Create a new user store and initialize database
    pub fn new(db_path: &str) -> Result<Self> {
        let dummy_hash =
            hash("placeholder-password", DEFAULT_COST).context("Failed to hash placeholder")?;
        let store = Self {
            db_path: db_path.to_string(),
            dummy_hash,
        };
        store.init_db()?;
        Ok(store)
    }

    /// Initialize database schema
    fn init_db(&self) -> Result<()> {
        let conn = Connection::open(&self.db_path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                username TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                full_name TEXT NOT NULL,
                email TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        // Static role reference data
        conn.execute(
            "CREATE TABLE IF NOT EXISTS roles (
                name TEXT PRIMARY KEY
            )",
            [],
        )?;

        // Role membership (many-to-many)
        conn.execute(
            "CREATE TABLE IF NOT EXISTS user_roles (
                user_id TEXT NOT NULL,
                role TEXT NOT NULL,
                PRIMARY KEY (user_id, role),
                FOREIGN KEY (user_id) REFERENCES users(id),
                FOREIGN KEY (role) REFERENCES roles(name)
            )",
            [],
        )?;

        for role in [Role::Admin, Role::Customer] {
            conn.execute(
                "INSERT OR IGNORE INTO roles (name) VALUES (?1)",
                params![role.as_str()],
            )?;
        }

        self.create_default_admin(&conn)?;

        Ok(())
    }

    /// Create default admin user for initial setup
    fn create_default_admin(&self, conn: &Connection) -> Result<()> {
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM user_roles WHERE role = 'Admin'",
                [],
                |row| row.get(0),
            )
            .context("Failed to check for admin users")?;

        if count == 0 {
            let password_hash =
                hash("admin123", DEFAULT_COST).context("Failed to hash password")?;

            let id = Uuid::new_v4();
            conn.execute(
                "INSERT INTO users (id, username, password_hash, full_name, email, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    id.to_string(),
                    "admin",
                    password_hash,
                    "Administrator",
                    "admin@localhost",
                    Utc::now().to_rfc3339(),
                ],
            )
            .context("Failed to insert admin user")?;
            conn.execute(
                "INSERT INTO user_roles (user_id, role) VALUES (?1, ?2)",
                params![id.to_string(), Role::Admin.as_str()],
            )?;

            info!("Default admin user created (username: admin, password: admin123)");
            warn!("CHANGE DEFAULT PASSWORD IN PRODUCTION!");
        }

        Ok(())
    }

    fn load_roles(conn: &Connection, user_id: &str) -> rusqlite::Result<Vec<Role>> {
        let mut stmt = conn.prepare("SELECT role FROM user_roles WHERE user_id = ?1")?;
        let roles = stmt
            .query_map(params![user_id], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        // The role set is closed; a foreign row cannot grant anything.
        Ok(roles.iter().filter_map(|r| Role::from_str(r)).collect())
    }

    fn row_to_user(conn: &Connection, row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
        let id_str: String = row.get(0)?;
        let roles = Self::load_roles(conn, &id_str)?;
        Ok(User {
            id: Uuid::parse_str(&id_str).unwrap(),
            username: row.get(1)?,
            password_hash: row.get(2)?,
            full_name: row.get(3)?,
            email: row.get(4)?,
            roles,
            created_at: row.get(5)?,
        })
    }

    /// Get user by username
    pub fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(
            "SELECT id, username, password_hash, full_name, email, created_at
             FROM users WHERE username = ?1",
        )?;

        let user_result = stmt.query_row(params![username], |row| Self::row_to_user(&conn, row));

        match user_result {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Get user by id
    pub fn find_by_id(&self, user_id: &Uuid) -> Result<Option<User>> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(
            "SELECT id, username, password_hash, full_name, email, created_at
             FROM users WHERE id = ?1",
        )?;

        let user_result =
            stmt.query_row(params![user_id.to_string()], |row| Self::row_to_user(&conn, row));

        match user_result {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Verify username and password.
    ///
    /// Unknown usernames still run a bcrypt verification so the caller's
    /// observable behavior does not reveal which field was wrong.
    pub fn verify_password(&self, username: &str, password: &str) -> Result<bool> {
        match self.get_user_by_username(username)? {
            Some(user) => {
                let valid =
                    verify(password, &user.password_hash).context("Failed to verify password")?;
                Ok(valid)
            }
            None => {
                let _ = verify(password, &self.dummy_hash);
                Ok(false)
            }
        }
    }

    /// Create a new user with the given role set
    pub fn create_user(
        &self,
        username: &str,
        password: &str,
        full_name: &str,
        email: &str,
        roles: &[Role],
    ) -> Result<User> {
        let password_hash = hash(password, DEFAULT_COST).context("Failed to hash password")?;

        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash,
            full_name: full_name.to_string(),
            email: email.to_string(),
            roles: roles.to_vec(),
            created_at: Utc::now().to_rfc3339(),
        };

        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "INSERT INTO users (id, username, password_hash, full_name, email, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                user.id.to_string(),
                user.username,
                user.password_hash,
                user.full_name,
                user.email,
                user.created_at,
            ],
        )
        .context("Failed to insert user")?;

        for role in roles {
            conn.execute(
                "INSERT OR IGNORE INTO user_roles (user_id, role) VALUES (?1, ?2)",
                params![user.id.to_string(), role.as_str()],
            )?;
        }

        info!("Created user: {}", user.username);

        Ok(user)
    }

    /// Grant a role to an existing user
    pub fn assign_role(&self, user_id: &Uuid, role: Role) -> Result<()> {
        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "INSERT OR IGNORE INTO user_roles (user_id, role) VALUES (?1, ?2)",
            params![user_id.to_string(), role.as_str()],
        )
        .context("Failed to assign role")?;
        Ok(())
    }

    /// Resolve the role set for a user id
    pub fn roles_for_user(&self, user_id: &Uuid) -> Result<Vec<Role>> {
        let conn = Connection::open(&self.db_path)?;
        Ok(Self::load_roles(&conn, &user_id.to_string())?)
    }
}
