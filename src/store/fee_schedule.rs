use crate::config::ScheduleConfig;
use crate::error::{AuditError, ScheduleError};
use crate::models::{
    normalize_zip, AreaType, FeeScheduleEntry, Location, ProcedureCode, ScheduleVersion, ZipArea,
};
use crate::store::loader;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::io::Read;

/// 只读费率表：进程启动时加载一次，之后只读共享
#[derive(Debug)]
pub struct FeeScheduleStore {
    entries: IndexMap<ProcedureCode, FeeScheduleEntry>,
    zip_areas: HashMap<String, ZipArea>,
    version: ScheduleVersion,
}

impl FeeScheduleStore {
    /// 按配置加载；未配置路径时使用内置数据
    pub fn load(config: &ScheduleConfig) -> Result<Self, ScheduleError> {
        let version = ScheduleVersion::parse(&config.source, &config.effective_date)?;

        let entries = match &config.fee_schedule_path {
            Some(path) => loader::read_fee_schedule(loader::open(path)?)?,
            None => loader::read_fee_schedule(loader::BUILTIN_FEE_SCHEDULE.as_bytes())?,
        };
        let zip_areas = match &config.zip_areas_path {
            Some(path) => loader::read_zip_areas(loader::open(path)?)?,
            None => loader::read_zip_areas(loader::BUILTIN_ZIP_AREAS.as_bytes())?,
        };

        Ok(Self {
            entries,
            zip_areas,
            version,
        })
    }

    /// 从任意 CSV 源构建
    pub fn from_readers<F: Read, Z: Read>(
        fees: F,
        zips: Z,
        version: ScheduleVersion,
    ) -> Result<Self, ScheduleError> {
        Ok(Self {
            entries: loader::read_fee_schedule(fees)?,
            zip_areas: loader::read_zip_areas(zips)?,
            version,
        })
    }

    pub fn lookup(&self, code: &ProcedureCode) -> Result<&FeeScheduleEntry, AuditError> {
        self.entries
            .get(code)
            .ok_or_else(|| AuditError::UnknownProcedureCode(code.to_string()))
    }

    pub fn classify_zip(&self, zip_code: &str) -> Result<AreaType, AuditError> {
        self.locate(zip_code).map(|location| location.area_type)
    }

    /// 表中没有的合法邮编默认 RURAL
    pub fn locate(&self, zip_code: &str) -> Result<Location, AuditError> {
        let zip_code = normalize_zip(zip_code)?;
        let (area_type, locality) = match self.zip_areas.get(&zip_code) {
            Some(area) => (area.area_type, area.locality.clone()),
            None => (AreaType::Rural, None),
        };
        Ok(Location {
            zip_code,
            area_type,
            locality,
        })
    }

    /// 按数据文件顺序遍历
    pub fn entries(&self) -> impl Iterator<Item = &FeeScheduleEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn zip_count(&self) -> usize {
        self.zip_areas.len()
    }

    pub fn version(&self) -> &ScheduleVersion {
        &self.version
    }

    pub fn reference(&self) -> String {
        self.version.reference()
    }
}
