use crate::error::ScheduleError;
use crate::models::{normalize_zip, AreaType, FeeScheduleEntry, ProcedureCode, ZipArea};
use bigdecimal::{BigDecimal, One};
use csv::{ReaderBuilder, StringRecord, Trim};
use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

/// 内置费率表 (NC Medicaid Dental, 2022-02-10)
pub const BUILTIN_FEE_SCHEDULE: &str = include_str!("../../data/fee_schedule.csv");

/// 内置邮编区域表
pub const BUILTIN_ZIP_AREAS: &str = include_str!("../../data/zip_areas.csv");

/// 费率表 CSV 行: code,description,base_amount,urban_multiplier
#[derive(Debug, Deserialize)]
struct FeeRow {
    code: String,
    description: String,
    base_amount: String,
    urban_multiplier: String,
}

/// 邮编表 CSV 行: zip,area_type,locality
#[derive(Debug, Deserialize)]
struct ZipRow {
    zip: String,
    area_type: String,
    #[serde(default)]
    locality: Option<String>,
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .trim(Trim::All)
        .comment(Some(b'#'))
        .from_reader(reader)
}

fn line_of(record: &StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or(0)
}

/// 打开磁盘上的数据文件
pub fn open(path: &Path) -> Result<File, ScheduleError> {
    File::open(path).map_err(|source| ScheduleError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// 读取费率表，保持文件中的顺序
pub fn read_fee_schedule<R: Read>(
    reader: R,
) -> Result<IndexMap<ProcedureCode, FeeScheduleEntry>, ScheduleError> {
    let mut rdr = csv_reader(reader);
    let headers = rdr.headers()?.clone();
    let mut entries = IndexMap::new();
    let min_amount = BigDecimal::new(1.into(), 2);

    for record in rdr.records() {
        let record = record?;
        let line = line_of(&record);
        let row: FeeRow = record.deserialize(Some(&headers))?;

        let code = ProcedureCode::parse(&row.code).map_err(|_| ScheduleError::InvalidCode {
            line,
            code: row.code.clone(),
        })?;

        // 至少一分钱，保证上限按分展示时仍大于 0
        let base_amount = match BigDecimal::from_str(&row.base_amount) {
            Ok(amount) if amount >= min_amount => amount,
            _ => {
                return Err(ScheduleError::InvalidAmount {
                    line,
                    code: code.to_string(),
                    value: row.base_amount,
                })
            }
        };

        let urban_multiplier = match BigDecimal::from_str(&row.urban_multiplier) {
            Ok(multiplier) if multiplier >= BigDecimal::one() => multiplier,
            _ => {
                return Err(ScheduleError::InvalidMultiplier {
                    line,
                    code: code.to_string(),
                    value: row.urban_multiplier,
                })
            }
        };

        if entries.contains_key(&code) {
            return Err(ScheduleError::DuplicateCode {
                line,
                code: code.to_string(),
            });
        }

        entries.insert(
            code.clone(),
            FeeScheduleEntry {
                code,
                description: row.description,
                base_amount,
                urban_multiplier,
            },
        );
    }

    if entries.is_empty() {
        return Err(ScheduleError::Empty);
    }

    Ok(entries)
}

/// 读取邮编区域表；允许为空 (此时所有邮编均按 RURAL)
pub fn read_zip_areas<R: Read>(reader: R) -> Result<HashMap<String, ZipArea>, ScheduleError> {
    let mut rdr = csv_reader(reader);
    let headers = rdr.headers()?.clone();
    let mut areas = HashMap::new();

    for record in rdr.records() {
        let record = record?;
        let line = line_of(&record);
        let row: ZipRow = record.deserialize(Some(&headers))?;

        let zip = normalize_zip(&row.zip).map_err(|_| ScheduleError::InvalidZip {
            line,
            zip: row.zip.clone(),
        })?;
        let area_type = AreaType::from_str(&row.area_type)
            .map_err(|value| ScheduleError::InvalidAreaType { line, value })?;

        if areas.contains_key(&zip) {
            return Err(ScheduleError::DuplicateZip { line, zip });
        }

        let locality = row.locality.filter(|l| !l.is_empty());
        areas.insert(zip, ZipArea { area_type, locality });
    }

    Ok(areas)
}
