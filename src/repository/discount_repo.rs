// ==========================================
// 工会折扣系统 - 折扣数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 说明: (partner_id, city_id) 唯一性由调用方检查
// ==========================================

use crate::domain::discount::{Discount, NewDiscountRecord};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

const DISCOUNT_COLUMNS: &str = "id, partner_id, city_id, description, corpcard_discount, \
                                union_discount, start_date, end_date";

fn parse_date(raw: Option<String>) -> Option<NaiveDate> {
    raw.and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok())
}

fn map_discount(row: &Row<'_>) -> SqliteResult<Discount> {
    Ok(Discount {
        id: row.get(0)?,
        partner_id: row.get(1)?,
        city_id: row.get(2)?,
        description: row.get(3)?,
        corpcard_discount: row.get(4)?,
        union_discount: row.get(5)?,
        start_date: parse_date(row.get(6)?),
        end_date: parse_date(row.get(7)?),
    })
}

// ==========================================
// DiscountRepository - 折扣仓储
// ==========================================
pub struct DiscountRepository {
    conn: Arc<Mutex<Connection>>,
}

impl DiscountRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 插入折扣，返回自增主键
    pub fn insert(&self, discount: &NewDiscountRecord) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        Self::insert_with_conn(&conn, discount)
    }

    /// 按 (partner_id, city_id) 查询
    ///
    /// 若历史数据中存在重复对，返回 id 最小的一条
    pub fn find_by_pair(
        &self,
        partner_id: i64,
        city_id: i64,
    ) -> RepositoryResult<Option<Discount>> {
        let conn = self.get_conn()?;
        Self::find_by_pair_with_conn(&conn, partner_id, city_id)
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Discount>> {
        let conn = self.get_conn()?;
        Self::find_by_id_with_conn(&conn, id)
    }

    /// 查询某城市的全部折扣
    pub fn list_by_city(&self, city_id: i64) -> RepositoryResult<Vec<Discount>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM partners_discounts WHERE city_id = ?1 ORDER BY id ASC",
            DISCOUNT_COLUMNS
        ))?;
        let discounts = stmt
            .query_map(params![city_id], map_discount)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(discounts)
    }

    /// 查询某合作伙伴的全部折扣
    pub fn list_by_partner(&self, partner_id: i64) -> RepositoryResult<Vec<Discount>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM partners_discounts WHERE partner_id = ?1 ORDER BY id ASC",
            DISCOUNT_COLUMNS
        ))?;
        let discounts = stmt
            .query_map(params![partner_id], map_discount)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(discounts)
    }

    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count =
            conn.query_row("SELECT COUNT(*) FROM partners_discounts", [], |row| row.get(0))?;
        Ok(count)
    }

    // ===== 连接级操作 =====

    pub(crate) fn insert_with_conn(
        conn: &Connection,
        discount: &NewDiscountRecord,
    ) -> RepositoryResult<i64> {
        conn.execute(
            r#"
            INSERT INTO partners_discounts (
                partner_id, city_id, description,
                corpcard_discount, union_discount,
                start_date, end_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                discount.partner_id,
                discount.city_id,
                discount.description,
                discount.corpcard_discount,
                discount.union_discount,
                discount.start_date.map(|d| d.to_string()),
                discount.end_date.map(|d| d.to_string()),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub(crate) fn find_by_pair_with_conn(
        conn: &Connection,
        partner_id: i64,
        city_id: i64,
    ) -> RepositoryResult<Option<Discount>> {
        let discount = conn
            .query_row(
                &format!(
                    "SELECT {} FROM partners_discounts \
                     WHERE partner_id = ?1 AND city_id = ?2 ORDER BY id ASC LIMIT 1",
                    DISCOUNT_COLUMNS
                ),
                params![partner_id, city_id],
                map_discount,
            )
            .optional()?;
        Ok(discount)
    }

    pub(crate) fn find_by_id_with_conn(
        conn: &Connection,
        id: i64,
    ) -> RepositoryResult<Option<Discount>> {
        let discount = conn
            .query_row(
                &format!("SELECT {} FROM partners_discounts WHERE id = ?1", DISCOUNT_COLUMNS),
                params![id],
                map_discount,
            )
            .optional()?;
        Ok(discount)
    }
}
