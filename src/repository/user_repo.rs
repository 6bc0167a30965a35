// ==========================================
// 工会折扣系统 - 用户数据仓储
// ==========================================

use crate::domain::user::User;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

fn map_user(row: &Row<'_>) -> SqliteResult<User> {
    Ok(User {
        id: row.get(0)?,
        gab_id: row.get(1)?,
        city_id: row.get(2)?,
    })
}

// ==========================================
// UserRepository - 用户仓储
// ==========================================
pub struct UserRepository {
    conn: Arc<Mutex<Connection>>,
}

impl UserRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 按外部账号 ID 插入用户（无城市）
    pub fn insert(&self, gab_id: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute("INSERT INTO users (gab_id) VALUES (?1)", params![gab_id])?;
        Ok(conn.last_insert_rowid())
    }

    pub fn find_by_gab_id(&self, gab_id: &str) -> RepositoryResult<Option<User>> {
        let conn = self.get_conn()?;
        let user = conn
            .query_row(
                "SELECT id, gab_id, city_id FROM users WHERE gab_id = ?1",
                params![gab_id],
                map_user,
            )
            .optional()?;
        Ok(user)
    }

    /// 更新用户所在城市
    pub fn update_city(&self, user_id: i64, city_id: Option<i64>) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE users SET city_id = ?1 WHERE id = ?2",
            params![city_id, user_id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "User".to_string(),
                id: user_id.to_string(),
            });
        }
        Ok(())
    }
}
