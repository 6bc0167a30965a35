// ==========================================
// 工会折扣系统 - 折扣对账导入器
// ==========================================
// 职责: 折扣表 → partners / cities / partners_discounts
// 流程: 映射 → 合作伙伴解析 → 城市拆分与解析 → 折扣解析
// ==========================================
// 语义:
// - 只增不改: 已存在的合作伙伴/城市/折扣均不更新
// - (partner, city) 至多一条折扣
// - 每行一个工作单元，行内失败整行回滚，已提交的行保留
// - 导入器按值持有存储句柄，任何返回路径都会释放
// ==========================================

use crate::config::import_config::ImportSettings;
use crate::domain::city::{City, NewCityRecord};
use crate::domain::discount::NewDiscountRecord;
use crate::domain::import_row::{DiscountRow, ImportSummary};
use crate::domain::partner::{NewPartnerRecord, Partner};
use crate::domain::types::MissingCityPolicy;
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::FieldMapper;
use crate::importer::table_loader::DiscountTable;
use crate::repository::discount_store::{DiscountStore, DiscountUnit};
use crate::repository::error::RepositoryError;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// 单行处理结果（仅在行提交后计入汇总）
#[derive(Debug, Default)]
struct RowStats {
    partner_created: bool,
    cities_created: usize,
    discounts_created: usize,
    discounts_existing: usize,
    empty_city_tokens: usize,
}

impl RowStats {
    fn apply_to(&self, summary: &mut ImportSummary) {
        summary.processed_rows += 1;
        if self.partner_created {
            summary.partners_created += 1;
        }
        summary.cities_created += self.cities_created;
        summary.discounts_created += self.discounts_created;
        summary.discounts_existing += self.discounts_existing;
        summary.empty_city_tokens += self.empty_city_tokens;
    }
}

// ==========================================
// DiscountImporter
// ==========================================
pub struct DiscountImporter<S: DiscountStore> {
    store: S,
    mapper: FieldMapper,
    cleaner: DataCleaner,
    missing_city_policy: MissingCityPolicy,
}

impl<S: DiscountStore> DiscountImporter<S> {
    /// 创建导入器
    ///
    /// # 参数
    /// - store: 存储句柄（导入期间独占，导入结束即释放）
    /// - settings: 列名映射与城市缺失策略
    pub fn new(store: S, settings: &ImportSettings) -> Self {
        Self {
            store,
            mapper: FieldMapper::new(settings.columns.clone()),
            cleaner: DataCleaner,
            missing_city_policy: settings.missing_city_policy,
        }
    }

    /// 导入整张表
    ///
    /// # 返回
    /// - Ok(ImportSummary): 全部行处理完成
    /// - Err: 某行失败；该行已回滚，此前的行保持提交，其余行不再处理
    #[instrument(skip_all, fields(batch_id))]
    pub fn import_table(mut self, table: &DiscountTable) -> ImportResult<ImportSummary> {
        let start_time = Instant::now();
        let batch_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("batch_id", batch_id.as_str());

        let mut summary = ImportSummary {
            batch_id,
            total_rows: table.len(),
            ..Default::default()
        };

        info!(total_rows = summary.total_rows, "开始导入折扣数据");

        for record in table.records() {
            let row = self.mapper.map_row(record);

            if row.partner_name.is_none() {
                warn!(row_number = row.row_number, "合作伙伴名称为空，跳过该行");
                summary.skipped_rows += 1;
                continue;
            }

            if row.city_field.is_none() && self.missing_city_policy == MissingCityPolicy::Strict {
                return Err(ImportError::MissingField {
                    row: row.row_number,
                    field: self.mapper.columns().city.clone(),
                });
            }

            let stats = self.import_row_in_unit(&row)?;
            stats.apply_to(&mut summary);
        }

        summary.elapsed_ms = start_time.elapsed().as_millis() as i64;

        info!(
            processed = summary.processed_rows,
            skipped = summary.skipped_rows,
            partners_created = summary.partners_created,
            cities_created = summary.cities_created,
            discounts_created = summary.discounts_created,
            discounts_existing = summary.discounts_existing,
            elapsed_ms = summary.elapsed_ms,
            "折扣导入完成"
        );

        Ok(summary)
    }

    /// 在工作单元内处理一行，失败则回滚
    fn import_row_in_unit(&mut self, row: &DiscountRow) -> ImportResult<RowStats> {
        let cleaner = &self.cleaner;
        self.store
            .run_unit(|unit| Self::import_row(unit, cleaner, row))
            .map_err(|source| ImportError::RowPersistError {
                row: row.row_number,
                source,
            })
    }

    fn import_row(
        unit: &mut dyn DiscountUnit,
        cleaner: &DataCleaner,
        row: &DiscountRow,
    ) -> Result<RowStats, RepositoryError> {
        let mut stats = RowStats::default();

        let partner_name = match &row.partner_name {
            Some(name) => name.as_str(),
            None => return Ok(stats),
        };

        // === 合作伙伴解析 ===
        let partner = Self::resolve_partner(unit, partner_name, row, &mut stats)?;

        // === 城市拆分 ===
        let split = match &row.city_field {
            Some(raw) => cleaner.split_city_field(raw),
            None => {
                warn!(
                    row_number = row.row_number,
                    partner = %partner.name,
                    "城市字段为空，仅保留合作伙伴"
                );
                return Ok(stats);
            }
        };

        if split.empty_tokens > 0 {
            warn!(
                row_number = row.row_number,
                empty_tokens = split.empty_tokens,
                "城市字段包含空片段，已忽略"
            );
        }
        stats.empty_city_tokens = split.empty_tokens;

        // === 逐城市解析城市与折扣 ===
        for city_name in &split.names {
            let city = match Self::resolve_city(unit, city_name, &mut stats)? {
                Some(city) => city,
                None => continue,
            };
            Self::resolve_discount(unit, &partner, &city, row, &mut stats)?;
        }

        Ok(stats)
    }

    fn resolve_partner(
        unit: &mut dyn DiscountUnit,
        name: &str,
        row: &DiscountRow,
        stats: &mut RowStats,
    ) -> Result<Partner, RepositoryError> {
        if let Some(existing) = unit.find_partner_by_name(name)? {
            return Ok(existing);
        }

        let partner = unit.create_partner(&NewPartnerRecord {
            name: name.to_string(),
            description: row.description.clone(),
        })?;
        stats.partner_created = true;
        debug!(partner_id = partner.id, partner = %partner.name, "创建合作伙伴");
        Ok(partner)
    }

    fn resolve_city(
        unit: &mut dyn DiscountUnit,
        name: &str,
        stats: &mut RowStats,
    ) -> Result<Option<City>, RepositoryError> {
        let record = match NewCityRecord::from_name(name) {
            Some(record) => record,
            None => return Ok(None),
        };

        if let Some(existing) = unit.find_city(&record.key)? {
            return Ok(Some(existing));
        }

        let city = unit.create_city(&record)?;
        stats.cities_created += 1;
        debug!(city_id = city.id, city = %city.name, "创建城市");
        Ok(Some(city))
    }

    fn resolve_discount(
        unit: &mut dyn DiscountUnit,
        partner: &Partner,
        city: &City,
        row: &DiscountRow,
        stats: &mut RowStats,
    ) -> Result<(), RepositoryError> {
        if unit.find_discount(partner.id, city.id)?.is_some() {
            debug!(
                row_number = row.row_number,
                partner = %partner.name,
                city = %city.name,
                "折扣已存在，跳过"
            );
            stats.discounts_existing += 1;
            return Ok(());
        }

        let discount = unit.create_discount(&NewDiscountRecord {
            partner_id: partner.id,
            city_id: city.id,
            description: row.description.clone(),
            corpcard_discount: row.corpcard_discount.clone(),
            union_discount: row.union_discount.clone(),
            start_date: None,
            end_date: None,
        })?;
        stats.discounts_created += 1;
        debug!(discount_id = discount.id, partner = %partner.name, city = %city.name, "创建折扣");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::discount::Discount;
    use crate::domain::types::CityKey;
    use crate::importer::file_parser::RawRecord;
    use crate::repository::error::RepositoryResult;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    // ==========================================
    // 内存存储（带快照回滚），用于隔离导入逻辑
    // ==========================================
    #[derive(Debug, Default, Clone)]
    struct MemoryState {
        partners: Vec<Partner>,
        cities: Vec<City>,
        discounts: Vec<Discount>,
        next_id: i64,
    }

    struct MemoryStore {
        state: Rc<RefCell<MemoryState>>,
        fail_discount_for_city: Option<String>,
        released: Rc<RefCell<bool>>,
    }

    impl MemoryStore {
        fn new(state: &Rc<RefCell<MemoryState>>) -> Self {
            Self {
                state: state.clone(),
                fail_discount_for_city: None,
                released: Rc::new(RefCell::new(false)),
            }
        }

        fn next_id(&self) -> i64 {
            let mut state = self.state.borrow_mut();
            state.next_id += 1;
            state.next_id
        }
    }

    impl Drop for MemoryStore {
        fn drop(&mut self) {
            *self.released.borrow_mut() = true;
        }
    }

    impl DiscountUnit for MemoryStore {
        fn find_partner_by_name(&self, name: &str) -> RepositoryResult<Option<Partner>> {
            Ok(self
                .state
                .borrow()
                .partners
                .iter()
                .find(|p| p.name == name)
                .cloned())
        }

        fn create_partner(&mut self, record: &NewPartnerRecord) -> RepositoryResult<Partner> {
            let partner = Partner {
                id: self.next_id(),
                name: record.name.clone(),
                description: record.description.clone(),
            };
            self.state.borrow_mut().partners.push(partner.clone());
            Ok(partner)
        }

        fn find_city(&self, key: &CityKey) -> RepositoryResult<Option<City>> {
            Ok(self
                .state
                .borrow()
                .cities
                .iter()
                .find(|c| c.name_key == key.as_str())
                .cloned())
        }

        fn create_city(&mut self, record: &NewCityRecord) -> RepositoryResult<City> {
            let city = City {
                id: self.next_id(),
                name: record.name.clone(),
                name_key: record.key.as_str().to_string(),
                region: None,
                latitude: None,
                longitude: None,
            };
            self.state.borrow_mut().cities.push(city.clone());
            Ok(city)
        }

        fn find_discount(
            &self,
            partner_id: i64,
            city_id: i64,
        ) -> RepositoryResult<Option<Discount>> {
            Ok(self
                .state
                .borrow()
                .discounts
                .iter()
                .find(|d| d.partner_id == partner_id && d.city_id == city_id)
                .cloned())
        }

        fn create_discount(&mut self, record: &NewDiscountRecord) -> RepositoryResult<Discount> {
            let city_name = self
                .state
                .borrow()
                .cities
                .iter()
                .find(|c| c.id == record.city_id)
                .map(|c| c.name.clone());
            if city_name.is_some() && city_name == self.fail_discount_for_city {
                return Err(RepositoryError::DatabaseQueryError("disk I/O error".to_string()));
            }

            let discount = Discount {
                id: self.next_id(),
                partner_id: record.partner_id,
                city_id: record.city_id,
                description: record.description.clone(),
                corpcard_discount: record.corpcard_discount.clone(),
                union_discount: record.union_discount.clone(),
                start_date: record.start_date,
                end_date: record.end_date,
            };
            self.state.borrow_mut().discounts.push(discount.clone());
            Ok(discount)
        }
    }

    impl DiscountStore for MemoryStore {
        fn run_unit<T, E, F>(&mut self, f: F) -> Result<T, E>
        where
            F: FnOnce(&mut dyn DiscountUnit) -> Result<T, E>,
            E: From<RepositoryError>,
        {
            let snapshot = self.state.borrow().clone();
            let result = f(&mut *self);
            if result.is_err() {
                *self.state.borrow_mut() = snapshot;
            }
            result
        }
    }

    fn row(
        row_number: usize,
        partner: &str,
        city: Option<&str>,
        description: &str,
    ) -> RawRecord {
        let mut cells = HashMap::new();
        cells.insert("Партнер".to_string(), partner.to_string());
        if let Some(city) = city {
            cells.insert("Город".to_string(), city.to_string());
        }
        cells.insert("Описание".to_string(), description.to_string());
        cells.insert("Корп. карта".to_string(), "10%".to_string());
        cells.insert("РосПрофЖел".to_string(), "5%".to_string());
        RawRecord { row_number, cells }
    }

    fn run(
        state: &Rc<RefCell<MemoryState>>,
        records: Vec<RawRecord>,
        settings: &ImportSettings,
    ) -> ImportResult<ImportSummary> {
        let store = MemoryStore::new(state);
        DiscountImporter::new(store, settings).import_table(&DiscountTable::new(records))
    }

    #[test]
    fn test_one_row_two_cities() {
        let state = Rc::new(RefCell::new(MemoryState::default()));
        let summary = run(
            &state,
            vec![row(2, "Acme", Some("Springfield, Shelbyville"), "10% off")],
            &ImportSettings::default(),
        )
        .unwrap();

        let state = state.borrow();
        assert_eq!(state.partners.len(), 1);
        assert_eq!(state.cities.len(), 2);
        assert_eq!(state.discounts.len(), 2);
        assert!(state
            .discounts
            .iter()
            .all(|d| d.partner_id == state.partners[0].id));
        assert_eq!(summary.discounts_created, 2);
        assert_eq!(summary.processed_rows, 1);
    }

    #[test]
    fn test_partner_description_not_updated() {
        let state = Rc::new(RefCell::new(MemoryState::default()));
        run(
            &state,
            vec![
                row(2, "Acme", Some("Springfield"), "first"),
                row(3, "Acme", Some("Shelbyville"), "second"),
            ],
            &ImportSettings::default(),
        )
        .unwrap();

        let state = state.borrow();
        assert_eq!(state.partners.len(), 1);
        assert_eq!(state.partners[0].description.as_deref(), Some("first"));
        assert_eq!(state.discounts.len(), 2);
    }

    #[test]
    fn test_repeated_city_in_one_row() {
        let state = Rc::new(RefCell::new(MemoryState::default()));
        let summary = run(
            &state,
            vec![row(2, "Acme", Some("Springfield, springfield"), "x")],
            &ImportSettings::default(),
        )
        .unwrap();

        assert_eq!(state.borrow().cities.len(), 1);
        assert_eq!(state.borrow().discounts.len(), 1);
        assert_eq!(summary.discounts_existing, 1);
    }

    #[test]
    fn test_missing_city_skip_policy_keeps_partner() {
        let state = Rc::new(RefCell::new(MemoryState::default()));
        let summary = run(
            &state,
            vec![row(2, "Acme", None, "x"), row(3, "Globex", Some("Springfield"), "y")],
            &ImportSettings::default(),
        )
        .unwrap();

        let state = state.borrow();
        assert_eq!(state.partners.len(), 2);
        assert_eq!(state.cities.len(), 1);
        assert_eq!(state.discounts.len(), 1);
        assert_eq!(summary.processed_rows, 2);
    }

    #[test]
    fn test_missing_city_strict_policy_aborts() {
        let state = Rc::new(RefCell::new(MemoryState::default()));
        let settings = ImportSettings {
            missing_city_policy: MissingCityPolicy::Strict,
            ..Default::default()
        };
        let result = run(
            &state,
            vec![
                row(2, "Acme", Some("Springfield"), "x"),
                row(3, "Globex", None, "y"),
                row(4, "Initech", Some("Shelbyville"), "z"),
            ],
            &settings,
        );

        match result {
            Err(ImportError::MissingField { row, field }) => {
                assert_eq!(row, 3);
                assert_eq!(field, "Город");
            }
            other => panic!("unexpected result: {:?}", other),
        }

        // 第一行已提交，之后的行未处理
        let state = state.borrow();
        assert_eq!(state.partners.len(), 1);
        assert_eq!(state.partners[0].name, "Acme");
    }

    #[test]
    fn test_blank_partner_row_skipped() {
        let state = Rc::new(RefCell::new(MemoryState::default()));
        let summary = run(
            &state,
            vec![row(2, "  ", Some("Springfield"), "x")],
            &ImportSettings::default(),
        )
        .unwrap();

        assert_eq!(summary.skipped_rows, 1);
        assert_eq!(summary.processed_rows, 0);
        assert!(state.borrow().cities.is_empty());
    }

    #[test]
    fn test_failed_row_rolls_back_and_releases_store() {
        let state = Rc::new(RefCell::new(MemoryState::default()));
        let mut store = MemoryStore::new(&state);
        store.fail_discount_for_city = Some("Shelbyville".to_string());
        let released = store.released.clone();

        let table = DiscountTable::new(vec![
            row(2, "Acme", Some("Springfield"), "ok"),
            row(3, "Globex", Some("Ogdenville, Shelbyville"), "boom"),
        ]);
        let result = DiscountImporter::new(store, &ImportSettings::default()).import_table(&table);

        assert!(matches!(
            result,
            Err(ImportError::RowPersistError { row: 3, .. })
        ));
        assert!(*released.borrow());

        // 第 3 行的合作伙伴、城市、折扣全部回滚
        let state = state.borrow();
        let partners: Vec<_> = state.partners.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(partners, vec!["Acme"]);
        assert_eq!(state.cities.len(), 1);
        assert_eq!(state.discounts.len(), 1);
    }
}
