pub mod audit;
pub mod procedure;
pub mod schedule;

pub use audit::{
    AuditRequest, AuditStatus, AuditVerdict, BatchAudit, BatchLine, BatchSummary, StatusCounts,
};
pub use procedure::{ProcedureCode, CODE_PREFIX};
pub use schedule::{
    normalize_zip, AreaType, FeeScheduleEntry, Location, ScheduleVersion, ZipArea,
};
