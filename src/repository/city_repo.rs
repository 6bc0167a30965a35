// ==========================================
// 工会折扣系统 - 城市数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 说明: 查询一律按 name_key（规范化键）
// ==========================================

use crate::domain::city::{City, NewCityRecord};
use crate::domain::types::CityKey;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

const CITY_COLUMNS: &str = "id, name, name_key, region, latitude, longitude";

fn map_city(row: &Row<'_>) -> SqliteResult<City> {
    Ok(City {
        id: row.get(0)?,
        name: row.get(1)?,
        name_key: row.get(2)?,
        region: row.get(3)?,
        latitude: row.get(4)?,
        longitude: row.get(5)?,
    })
}

// ==========================================
// CityRepository - 城市仓储
// ==========================================
pub struct CityRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CityRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 插入城市（仅名称），返回自增主键
    pub fn insert(&self, city: &NewCityRecord) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        Self::insert_with_conn(&conn, city)
    }

    /// 按规范化键查询
    pub fn find_by_key(&self, key: &CityKey) -> RepositoryResult<Option<City>> {
        let conn = self.get_conn()?;
        Self::find_by_key_with_conn(&conn, key)
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<City>> {
        let conn = self.get_conn()?;
        Self::find_by_id_with_conn(&conn, id)
    }

    pub fn list_all(&self) -> RepositoryResult<Vec<City>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM cities ORDER BY name ASC",
            CITY_COLUMNS
        ))?;
        let cities = stmt
            .query_map([], map_city)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(cities)
    }

    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM cities", [], |row| row.get(0))?;
        Ok(count)
    }

    // ===== 连接级操作 =====

    pub(crate) fn insert_with_conn(conn: &Connection, city: &NewCityRecord) -> RepositoryResult<i64> {
        conn.execute(
            "INSERT INTO cities (name, name_key) VALUES (?1, ?2)",
            params![city.name, city.key.as_str()],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub(crate) fn find_by_key_with_conn(
        conn: &Connection,
        key: &CityKey,
    ) -> RepositoryResult<Option<City>> {
        let city = conn
            .query_row(
                &format!("SELECT {} FROM cities WHERE name_key = ?1", CITY_COLUMNS),
                params![key.as_str()],
                map_city,
            )
            .optional()?;
        Ok(city)
    }

    pub(crate) fn find_by_id_with_conn(conn: &Connection, id: i64) -> RepositoryResult<Option<City>> {
        let city = conn
            .query_row(
                &format!("SELECT {} FROM cities WHERE id = ?1", CITY_COLUMNS),
                params![id],
                map_city,
            )
            .optional()?;
        Ok(city)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;

    #[test]
    fn test_find_by_key_is_case_insensitive() {
        let repo =
            CityRepository::from_connection(Arc::new(Mutex::new(open_in_memory().unwrap())));
        let id = repo
            .insert(&NewCityRecord::from_name(" Springfield ").unwrap())
            .unwrap();

        let key = CityKey::from_name("SPRINGFIELD").unwrap();
        let city = repo.find_by_key(&key).unwrap().unwrap();
        assert_eq!(city.id, id);
        assert_eq!(city.name, "Springfield");
        assert_eq!(city.region, None);
        assert_eq!(city.latitude, None);
    }

    #[test]
    fn test_same_key_rejected() {
        let repo =
            CityRepository::from_connection(Arc::new(Mutex::new(open_in_memory().unwrap())));
        repo.insert(&NewCityRecord::from_name("Москва").unwrap())
            .unwrap();
        let err = repo
            .insert(&NewCityRecord::from_name("москва").unwrap())
            .unwrap_err();
        assert!(matches!(err, RepositoryError::UniqueConstraintViolation(_)));
    }
}
