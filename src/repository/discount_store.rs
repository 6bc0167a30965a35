// ==========================================
// 工会折扣系统 - 折扣存储接口
// ==========================================
// 职责: 导入器所需的最小存储能力
// - 按自然键查询 Partner / City / Discount
// - 创建并立即落库，返回带主键的实体
// - 工作单元: 单元内全部读写在同一事务中，成功提交、失败回滚
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::city::{City, NewCityRecord};
use crate::domain::discount::{Discount, NewDiscountRecord};
use crate::domain::partner::{NewPartnerRecord, Partner};
use crate::domain::types::CityKey;
use crate::repository::city_repo::CityRepository;
use crate::repository::discount_repo::DiscountRepository;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::partner_repo::PartnerRepository;
use rusqlite::{Connection, TransactionBehavior};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

// ==========================================
// DiscountUnit Trait - 工作单元内可用的操作
// ==========================================
pub trait DiscountUnit {
    /// 按名称精确查询合作伙伴
    fn find_partner_by_name(&self, name: &str) -> RepositoryResult<Option<Partner>>;

    /// 创建合作伙伴（同一单元内立即可被外键引用）
    fn create_partner(&mut self, record: &NewPartnerRecord) -> RepositoryResult<Partner>;

    /// 按规范化键查询城市
    fn find_city(&self, key: &CityKey) -> RepositoryResult<Option<City>>;

    /// 创建城市（仅名称）
    fn create_city(&mut self, record: &NewCityRecord) -> RepositoryResult<City>;

    /// 按 (partner_id, city_id) 查询折扣
    fn find_discount(&self, partner_id: i64, city_id: i64) -> RepositoryResult<Option<Discount>>;

    /// 创建折扣
    fn create_discount(&mut self, record: &NewDiscountRecord) -> RepositoryResult<Discount>;
}

// ==========================================
// DiscountStore Trait
// ==========================================
// 实现者: SqliteDiscountStore
pub trait DiscountStore {
    /// 在一个工作单元内执行 f
    ///
    /// # 返回
    /// - Ok(T): f 成功且已提交
    /// - Err(E): f 失败（单元内写入全部回滚）或提交失败
    fn run_unit<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn DiscountUnit) -> Result<T, E>,
        E: From<RepositoryError>;
}

// ==========================================
// SqliteDiscountStore
// ==========================================
/// 基于共享连接的存储句柄
///
/// 单元执行期间持有连接锁，同一连接上的其他调用等待单元结束
pub struct SqliteDiscountStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteDiscountStore {
    /// 打开数据库文件并创建 store
    pub fn open(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self::from_connection(Arc::new(Mutex::new(conn))))
    }

    /// 从已有连接创建 store
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }
}

impl DiscountStore for SqliteDiscountStore {
    fn run_unit<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn DiscountUnit) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let result = {
            let mut unit = SqliteUnit { conn: &tx };
            f(&mut unit as &mut dyn DiscountUnit)
        };

        match result {
            Ok(value) => {
                tx.commit()
                    .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback() {
                    warn!(error = %rollback_err, "工作单元回滚失败");
                }
                Err(e)
            }
        }
    }
}

impl Drop for SqliteDiscountStore {
    fn drop(&mut self) {
        debug!("存储句柄已释放");
    }
}

/// 事务内的操作视图（借用已加锁的连接）
struct SqliteUnit<'a> {
    conn: &'a Connection,
}

impl SqliteUnit<'_> {
    fn not_found_after_insert(entity: &str, id: i64) -> RepositoryError {
        RepositoryError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }
}

impl DiscountUnit for SqliteUnit<'_> {
    fn find_partner_by_name(&self, name: &str) -> RepositoryResult<Option<Partner>> {
        PartnerRepository::find_by_name_with_conn(self.conn, name)
    }

    fn create_partner(&mut self, record: &NewPartnerRecord) -> RepositoryResult<Partner> {
        let id = PartnerRepository::insert_with_conn(self.conn, record)?;
        PartnerRepository::find_by_id_with_conn(self.conn, id)?
            .ok_or_else(|| Self::not_found_after_insert("Partner", id))
    }

    fn find_city(&self, key: &CityKey) -> RepositoryResult<Option<City>> {
        CityRepository::find_by_key_with_conn(self.conn, key)
    }

    fn create_city(&mut self, record: &NewCityRecord) -> RepositoryResult<City> {
        let id = CityRepository::insert_with_conn(self.conn, record)?;
        CityRepository::find_by_id_with_conn(self.conn, id)?
            .ok_or_else(|| Self::not_found_after_insert("City", id))
    }

    fn find_discount(&self, partner_id: i64, city_id: i64) -> RepositoryResult<Option<Discount>> {
        DiscountRepository::find_by_pair_with_conn(self.conn, partner_id, city_id)
    }

    fn create_discount(&mut self, record: &NewDiscountRecord) -> RepositoryResult<Discount> {
        let id = DiscountRepository::insert_with_conn(self.conn, record)?;
        DiscountRepository::find_by_id_with_conn(self.conn, id)?
            .ok_or_else(|| Self::not_found_after_insert("Discount", id))
    }
}
