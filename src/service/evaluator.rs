use crate::config::AuditConfig;
use crate::error::AuditError;
use crate::models::{
    AreaType, AuditRequest, AuditStatus, AuditVerdict, BatchAudit, BatchLine, BatchSummary,
    StatusCounts,
};
use crate::service::analysis::{self, AnalysisContext};
use crate::service::pricing;
use crate::store::FeeScheduleStore;
use bigdecimal::{BigDecimal, Zero};
use rayon::prelude::*;
use std::sync::Arc;

/// 估价审核服务：无内部状态，对只读费率表做纯计算，可任意并发调用
pub struct AuditEvaluator {
    store: Arc<FeeScheduleStore>,
    max_batch_size: usize,
}

impl AuditEvaluator {
    pub fn new(store: Arc<FeeScheduleStore>, config: &AuditConfig) -> Self {
        Self {
            store,
            max_batch_size: config.max_batch_size,
        }
    }

    pub fn store(&self) -> &FeeScheduleStore {
        &self.store
    }

    /// 单次审核 (编码在构造 AuditRequest 时已规范化)
    pub fn evaluate(&self, request: &AuditRequest) -> Result<AuditVerdict, AuditError> {
        // 1. 查费率表
        let entry = self.store.lookup(&request.code)?;

        // 2. 邮编分类
        let location = self.store.locate(&request.zip_code)?;
        let urban = location.area_type == AreaType::Urban;

        // 3. 上限与加价
        let ceiling = pricing::fair_ceiling(&entry.base_amount, &entry.urban_multiplier, urban);
        let markup = pricing::markup_percentage(&request.quoted_price, &ceiling);
        let status = AuditStatus::classify(&markup);

        let analysis_text = analysis::render(&AnalysisContext {
            status,
            description: &entry.description,
            markup_percentage: &markup,
            ceiling: &ceiling,
            area_type: location.area_type,
        });

        tracing::info!(
            code = %entry.code,
            zip = %location.zip_code,
            locality = location.locality.as_deref().unwrap_or("-"),
            area = %location.area_type,
            status = %status,
            markup = %markup,
            "Audit evaluated"
        );

        Ok(AuditVerdict {
            status,
            code: entry.code.clone(),
            description: entry.description.clone(),
            quoted_price: request.quoted_price.clone(),
            ceiling,
            markup_percentage: markup,
            zip_code: location.zip_code,
            area_type: location.area_type,
            urban_adjustment_applied: urban,
            analysis_text,
            reference: self.store.reference(),
        })
    }

    /// 整张估价单审核：各行互不影响，结果顺序与输入一致
    pub fn evaluate_batch(
        &self,
        lines: Vec<Result<AuditRequest, AuditError>>,
    ) -> Result<BatchAudit, AuditError> {
        if lines.is_empty() {
            return Err(AuditError::EmptyBatch);
        }
        if lines.len() > self.max_batch_size {
            return Err(AuditError::BatchTooLarge {
                count: lines.len(),
                max: self.max_batch_size,
            });
        }

        let lines: Vec<BatchLine> = lines
            .into_par_iter()
            .enumerate()
            .map(|(index, line)| BatchLine {
                index,
                outcome: line.and_then(|request| self.evaluate(&request)),
            })
            .collect();

        let summary = summarize(&lines);
        tracing::info!(
            total = summary.total,
            evaluated = summary.evaluated,
            rejected = summary.rejected,
            "Batch audit completed"
        );

        Ok(BatchAudit {
            lines,
            summary,
            reference: self.store.reference(),
        })
    }
}

fn summarize(lines: &[BatchLine]) -> BatchSummary {
    let mut quoted_total = BigDecimal::zero();
    let mut ceiling_total = BigDecimal::zero();
    let mut counts = StatusCounts::default();
    let mut evaluated = 0;

    for verdict in lines.iter().filter_map(|line| line.outcome.as_ref().ok()) {
        evaluated += 1;
        quoted_total += &verdict.quoted_price;
        ceiling_total += &verdict.ceiling;
        counts.record(verdict.status);
    }

    let overall_markup_percentage = if ceiling_total > BigDecimal::zero() {
        Some(pricing::markup_percentage(&quoted_total, &ceiling_total))
    } else {
        None
    };
    let overall_status = overall_markup_percentage.as_ref().map(AuditStatus::classify);

    BatchSummary {
        total: lines.len(),
        evaluated,
        rejected: lines.len() - evaluated,
        quoted_total: pricing::round_money(&quoted_total),
        ceiling_total: pricing::round_money(&ceiling_total),
        overall_markup_percentage,
        overall_status,
        counts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScheduleVersion;
    use std::str::FromStr;

    const FEES: &str = "code,description,base_amount,urban_multiplier\n\
                        D0120,Periodic oral evaluation,40.00,1.18\n\
                        D1110,Prophylaxis adult,62.00,1.20\n\
                        D0999,Boundary fixture,100.00,1.10\n\
                        D0140,Limited oral evaluation,32.75,1.15\n";
    const ZIPS: &str = "zip,area_type,locality\n27601,URBAN,Raleigh\n28906,RURAL,Murphy\n";

    fn evaluator(max_batch_size: usize) -> AuditEvaluator {
        let version = ScheduleVersion::parse("NC Medicaid Dental Fee Schedule", "2022-02-10").unwrap();
        let store = FeeScheduleStore::from_readers(FEES.as_bytes(), ZIPS.as_bytes(), version).unwrap();
        AuditEvaluator::new(Arc::new(store), &AuditConfig { max_batch_size })
    }

    fn d(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn request(code: &str, price: &str, zip: &str) -> AuditRequest {
        AuditRequest::new(code, d(price), zip).unwrap()
    }

    #[test]
    fn urban_red_flag_scenario() {
        let verdict = evaluator(10).evaluate(&request("D0120", "85.00", "27601")).unwrap();
        assert_eq!(verdict.ceiling, d("47.20"));
        assert_eq!(verdict.markup_percentage, d("80.1"));
        assert_eq!(verdict.status, AuditStatus::RedFlag);
        assert_eq!(verdict.area_type, AreaType::Urban);
        assert!(verdict.urban_adjustment_applied);
        assert_eq!(verdict.procedure_label(), "D0120 - Periodic oral evaluation");
        assert_eq!(
            verdict.reference,
            "NC Medicaid Dental Fee Schedule (Effective February 10, 2022)"
        );
    }

    #[test]
    fn rural_fair_scenario() {
        let verdict = evaluator(10).evaluate(&request("D0120", "40.00", "28906")).unwrap();
        assert_eq!(verdict.ceiling, d("40.00"));
        assert_eq!(verdict.markup_percentage, d("0.0"));
        assert_eq!(verdict.status, AuditStatus::Fair);
        assert_eq!(verdict.area_type, AreaType::Rural);
        assert!(!verdict.urban_adjustment_applied);
    }

    #[test]
    fn unlisted_zip_is_rural() {
        let verdict = evaluator(10).evaluate(&request("D1110", "62.00", "27299")).unwrap();
        assert_eq!(verdict.area_type, AreaType::Rural);
        assert_eq!(verdict.ceiling, d("62.00"));
    }

    #[test]
    fn unknown_code_fails() {
        let err = evaluator(10).evaluate(&request("D9999", "10", "27601")).unwrap_err();
        assert_eq!(err, AuditError::UnknownProcedureCode("D9999".into()));
    }

    #[test]
    fn malformed_zip_fails() {
        let err = evaluator(10).evaluate(&request("D0120", "10", "ABCDE")).unwrap_err();
        assert_eq!(err, AuditError::InvalidZip("ABCDE".into()));
    }

    #[test]
    fn unknown_code_is_reported_before_bad_zip() {
        let err = evaluator(10).evaluate(&request("D9999", "10", "ABCDE")).unwrap_err();
        assert_eq!(err.code(), "UNKNOWN_PROCEDURE_CODE");
    }

    #[test]
    fn band_boundaries_through_evaluate() {
        let evaluator = evaluator(10);
        let cases = [
            ("99.90", "-0.1", AuditStatus::BelowCeiling),
            ("110.00", "10.0", AuditStatus::Fair),
            ("110.10", "10.1", AuditStatus::High),
            ("130.00", "30.0", AuditStatus::High),
            ("130.10", "30.1", AuditStatus::RedFlag),
        ];
        for (price, markup, status) in cases {
            let verdict = evaluator.evaluate(&request("D0999", price, "28906")).unwrap();
            assert_eq!(verdict.markup_percentage, d(markup), "price {price}");
            assert_eq!(verdict.status, status, "price {price}");
        }
    }

    #[test]
    fn ceiling_is_base_times_resolved_multiplier() {
        let evaluator = evaluator(10);
        for entry in evaluator.store().entries() {
            let urban = evaluator.evaluate(&request(entry.code.as_str(), "1", "27601")).unwrap();
            let rural = evaluator.evaluate(&request(entry.code.as_str(), "1", "28906")).unwrap();
            assert_eq!(urban.ceiling, &entry.base_amount * &entry.urban_multiplier);
            assert_eq!(rural.ceiling, entry.base_amount);
        }
    }

    #[test]
    fn sub_cent_ceiling_is_kept_exact() {
        let verdict = evaluator(10).evaluate(&request("D0140", "37.68", "27601")).unwrap();
        assert_eq!(verdict.ceiling, d("37.6625"));
        assert_eq!(verdict.markup_percentage, d("0.0"));
        assert_eq!(verdict.status, AuditStatus::Fair);
        assert!(verdict.analysis_text.contains("$37.66"));
    }

    #[test]
    fn quote_just_under_ceiling_rounds_to_fair() {
        // -0.01% 取整为 0.0，分档按取整后的加价
        let verdict = evaluator(10).evaluate(&request("D0999", "99.99", "28906")).unwrap();
        assert!(verdict.quoted_price < verdict.ceiling);
        assert_eq!(verdict.markup_percentage, d("0.0"));
        assert_eq!(verdict.status, AuditStatus::Fair);
    }

    #[test]
    fn evaluate_is_idempotent() {
        let evaluator = evaluator(10);
        let req = request("0120", "55.55", "27601");
        assert_eq!(evaluator.evaluate(&req).unwrap(), evaluator.evaluate(&req).unwrap());
    }

    #[test]
    fn prefixed_and_bare_codes_resolve_identically() {
        let evaluator = evaluator(10);
        let bare = evaluator.evaluate(&request("0120", "50", "27601")).unwrap();
        let prefixed = evaluator.evaluate(&request("D0120", "50", "27601")).unwrap();
        assert_eq!(bare, prefixed);
    }

    #[test]
    fn batch_preserves_order_and_isolates_failures() {
        let evaluator = evaluator(10);
        let audit = evaluator
            .evaluate_batch(vec![
                Ok(request("D0120", "85.00", "27601")),
                Ok(request("D9999", "10", "27601")),
                Err(AuditError::InvalidPrice("abc".into())),
                Ok(request("D1110", "62.00", "28906")),
            ])
            .unwrap();

        let indices: Vec<usize> = audit.lines.iter().map(|l| l.index).collect();
        assert_eq!(indices, [0, 1, 2, 3]);
        assert_eq!(audit.lines[0].outcome.as_ref().unwrap().status, AuditStatus::RedFlag);
        assert_eq!(audit.lines[1].outcome.as_ref().unwrap_err().code(), "UNKNOWN_PROCEDURE_CODE");
        assert_eq!(audit.lines[2].outcome.as_ref().unwrap_err().code(), "INVALID_PRICE");
        assert_eq!(audit.lines[3].outcome.as_ref().unwrap().status, AuditStatus::Fair);

        let summary = &audit.summary;
        assert_eq!((summary.total, summary.evaluated, summary.rejected), (4, 2, 2));
        assert_eq!(summary.quoted_total, d("147.00"));
        assert_eq!(summary.ceiling_total, d("109.20"));
        // (147 - 109.2) / 109.2 * 100 = 34.615...
        assert_eq!(summary.overall_markup_percentage, Some(d("34.6")));
        assert_eq!(summary.overall_status, Some(AuditStatus::RedFlag));
        assert_eq!(summary.counts.red_flag, 1);
        assert_eq!(summary.counts.fair, 1);
    }

    #[test]
    fn batch_with_only_failures_has_no_overall_markup() {
        let audit = evaluator(10)
            .evaluate_batch(vec![Ok(request("D9999", "10", "27601"))])
            .unwrap();
        assert_eq!(audit.summary.evaluated, 0);
        assert_eq!(audit.summary.overall_markup_percentage, None);
        assert_eq!(audit.summary.overall_status, None);
    }

    #[test]
    fn batch_size_limits() {
        let evaluator = evaluator(2);
        assert_eq!(evaluator.evaluate_batch(Vec::new()).unwrap_err(), AuditError::EmptyBatch);

        let lines = (0..3).map(|_| Ok(request("D0120", "40", "27601"))).collect();
        assert_eq!(
            evaluator.evaluate_batch(lines).unwrap_err(),
            AuditError::BatchTooLarge { count: 3, max: 2 }
        );
    }
}
