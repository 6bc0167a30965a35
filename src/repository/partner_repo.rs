// ==========================================
// 工会折扣系统 - 合作伙伴数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::partner::{NewPartnerRecord, Partner};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

fn map_partner(row: &Row<'_>) -> SqliteResult<Partner> {
    Ok(Partner {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
    })
}

// ==========================================
// PartnerRepository - 合作伙伴仓储
// ==========================================
/// 职责: 管理 partners 表的 CRUD 操作
pub struct PartnerRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PartnerRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 插入合作伙伴，返回自增主键
    pub fn insert(&self, partner: &NewPartnerRecord) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        Self::insert_with_conn(&conn, partner)
    }

    /// 按名称精确查询
    ///
    /// # 返回
    /// - Ok(Some(Partner)): 找到
    /// - Ok(None): 未找到
    /// - Err: 数据库错误
    pub fn find_by_name(&self, name: &str) -> RepositoryResult<Option<Partner>> {
        let conn = self.get_conn()?;
        Self::find_by_name_with_conn(&conn, name)
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Partner>> {
        let conn = self.get_conn()?;
        Self::find_by_id_with_conn(&conn, id)
    }

    /// 查询全部合作伙伴（按名称排序）
    pub fn list_all(&self) -> RepositoryResult<Vec<Partner>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT id, name, description FROM partners ORDER BY name ASC")?;
        let partners = stmt
            .query_map([], map_partner)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(partners)
    }

    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM partners", [], |row| row.get(0))?;
        Ok(count)
    }

    // ==========================================
    // 连接级操作（供持有事务的调用方使用）
    // ==========================================

    pub(crate) fn insert_with_conn(
        conn: &Connection,
        partner: &NewPartnerRecord,
    ) -> RepositoryResult<i64> {
        conn.execute(
            "INSERT INTO partners (name, description) VALUES (?1, ?2)",
            params![partner.name, partner.description],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub(crate) fn find_by_name_with_conn(
        conn: &Connection,
        name: &str,
    ) -> RepositoryResult<Option<Partner>> {
        let partner = conn
            .query_row(
                "SELECT id, name, description FROM partners WHERE name = ?1",
                params![name],
                map_partner,
            )
            .optional()?;
        Ok(partner)
    }

    pub(crate) fn find_by_id_with_conn(
        conn: &Connection,
        id: i64,
    ) -> RepositoryResult<Option<Partner>> {
        let partner = conn
            .query_row(
                "SELECT id, name, description FROM partners WHERE id = ?1",
                params![id],
                map_partner,
            )
            .optional()?;
        Ok(partner)
    }
}
