// ==========================================
// 项目成本挣值管理系统 - EVM API
// ==========================================
// 职责: 读取台账快照 → 执行引擎 → 组装报告
// 架构: API 层 → Repository (LedgerReader) + Engine 层
// 红线: API 层不含计算公式; 评估日由调用方注入
// ==========================================

use crate::api::dto::{EvmOptions, EvmReport, PortfolioReport, ProjectDashboard};
use crate::api::error::{ApiError, ApiResult};
use crate::config::config_reader::EvmConfigReader;
use crate::config::evm_config::EvmConfig;
use crate::domain::evm::EvmInput;
use crate::domain::project::{LedgerSnapshot, ProjectFinancials};
use crate::domain::summary::ProjectSummary;
use crate::domain::timeline::EvmTimeline;
use crate::engine::{
    safe_ratio, ConfidenceWeightingEngine, EvmCalculator, ProjectSummaryEngine, TimelineProjector,
};
use crate::repository::ledger_repo::LedgerReader;
use chrono::NaiveDate;
use futures::future::try_join_all;
use std::sync::Arc;
use tracing::instrument;

// ==========================================
// EvmApi - 挣值分析 API
// ==========================================
pub struct EvmApi {
    ledger: Arc<dyn LedgerReader>,
    config: EvmConfig,
    weighting: ConfidenceWeightingEngine,
    calculator: EvmCalculator,
    projector: TimelineProjector,
    summary_engine: ProjectSummaryEngine,
}

impl EvmApi {
    /// 创建新的 EvmApi 实例
    ///
    /// # 参数
    /// - ledger: 台账读取接口
    /// - config: EVM 参数 (构造时校验)
    pub fn new(ledger: Arc<dyn LedgerReader>, config: EvmConfig) -> ApiResult<Self> {
        config.validate()?;

        Ok(Self {
            ledger,
            config,
            weighting: ConfidenceWeightingEngine::new(config.confidence),
            calculator: EvmCalculator::new(config),
            projector: TimelineProjector::new(config),
            summary_engine: ProjectSummaryEngine::new(),
        })
    }

    /// 从配置读取器加载参数后创建
    pub async fn from_config_reader(
        ledger: Arc<dyn LedgerReader>,
        reader: &dyn EvmConfigReader,
    ) -> ApiResult<Self> {
        let config = reader
            .load_evm_config()
            .await
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;
        Self::new(ledger, config)
    }

    pub fn config(&self) -> &EvmConfig {
        &self.config
    }

    // ==========================================
    // 单项目查询
    // ==========================================

    /// 单时点 EVM 报告 (默认选项: 承付款参与调整)
    pub async fn project_evm(&self, project_id: &str, today: NaiveDate) -> ApiResult<EvmReport> {
        self.project_evm_with(project_id, today, EvmOptions::default())
            .await
    }

    /// 单时点 EVM 报告
    ///
    /// # 返回
    /// - Ok(EvmReport)
    /// - Err(NotFound): 项目不存在
    /// - Err(Engine): 台账数据非法
    #[instrument(skip(self, options), fields(project_id = %project_id, today = %today))]
    pub async fn project_evm_with(
        &self,
        project_id: &str,
        today: NaiveDate,
        options: EvmOptions,
    ) -> ApiResult<EvmReport> {
        let snapshot = self.load(project_id).await?;
        self.build_report(&snapshot, today, options)
    }

    /// 月度时间轴
    #[instrument(skip(self), fields(project_id = %project_id, today = %today))]
    pub async fn project_timeline(
        &self,
        project_id: &str,
        today: NaiveDate,
    ) -> ApiResult<EvmTimeline> {
        let snapshot = self.load(project_id).await?;
        Ok(self.projector.project(&snapshot, today)?)
    }

    /// 项目汇总 (预算使用 / 分解 / 付款时间表)
    #[instrument(skip(self), fields(project_id = %project_id, today = %today))]
    pub async fn project_summary(
        &self,
        project_id: &str,
        today: NaiveDate,
    ) -> ApiResult<ProjectSummary> {
        let snapshot = self.load(project_id).await?;
        Ok(self.summary_engine.summarize(&snapshot, today)?)
    }

    /// 驾驶舱聚合: 一次读取,报告/汇总/时间轴同源
    #[instrument(skip(self), fields(project_id = %project_id, today = %today))]
    pub async fn project_dashboard(
        &self,
        project_id: &str,
        today: NaiveDate,
    ) -> ApiResult<ProjectDashboard> {
        let snapshot = self.load(project_id).await?;

        Ok(ProjectDashboard {
            report: self.build_report(&snapshot, today, EvmOptions::default())?,
            summary: self.summary_engine.summarize(&snapshot, today)?,
            timeline: self.projector.project(&snapshot, today)?,
        })
    }

    // ==========================================
    // 项目组合
    // ==========================================

    /// 全部项目的 EVM 报告 (并发计算,任一失败整体失败)
    #[instrument(skip(self), fields(today = %today))]
    pub async fn portfolio_evm(&self, today: NaiveDate) -> ApiResult<PortfolioReport> {
        let ids = self.ledger.list_project_ids().await?;

        let projects = try_join_all(ids.iter().map(|id| self.project_evm(id, today))).await?;

        let (total_budget, total_actual_cost, total_earned_value) =
            projects.iter().fold((0.0, 0.0, 0.0), |(bac, ac, ev), p| {
                (
                    bac + p.evm.budget_at_completion,
                    ac + p.evm.actual_cost,
                    ev + p.evm.earned_value,
                )
            });
        let projects_at_risk = projects
            .iter()
            .filter(|p| p.evm.budget_breach_risk)
            .map(|p| p.project_id.clone())
            .collect();

        tracing::info!(project_count = projects.len(), "项目组合 EVM 计算完成");

        Ok(PortfolioReport {
            evaluated_on: today,
            total_budget,
            total_actual_cost,
            total_earned_value,
            portfolio_cpi: safe_ratio(total_earned_value, total_actual_cost),
            projects_at_risk,
            projects,
        })
    }

    // ==========================================
    // 内部方法
    // ==========================================

    async fn load(&self, project_id: &str) -> ApiResult<LedgerSnapshot> {
        if project_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("project_id 不能为空".to_string()));
        }

        let snapshot = self
            .ledger
            .load_snapshot(project_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Project(id={})不存在", project_id)))?;

        if !snapshot.project.has_valid_schedule() {
            tracing::warn!(
                project_id = %project_id,
                start_date = %snapshot.project.start_date,
                end_date = %snapshot.project.end_date,
                "计划工期无效 (end <= start)，进度按 0 计算"
            );
        }

        Ok(snapshot)
    }

    fn build_report(
        &self,
        snapshot: &LedgerSnapshot,
        today: NaiveDate,
        options: EvmOptions,
    ) -> ApiResult<EvmReport> {
        self.weighting.validate(&snapshot.obligations)?;
        let financials = ProjectFinancials::from_snapshot(snapshot, today);
        let obligations = self.weighting.summarize(&financials.obligations)?;

        let mut input = EvmInput::from_financials(&financials, today, obligations.total_obligations)
            .with_include_obligations(options.include_obligations);
        if let Some(manual) = options.manual_etc_adjusted {
            input = input.with_manual_etc_adjusted(manual);
        }

        let evm = self.calculator.calculate(&input)?;

        if !evm.early_warnings.is_empty() {
            tracing::info!(
                project_id = %snapshot.project.id,
                warnings = ?evm.early_warnings,
                severity = %evm.breach_severity,
                "EVM 预警触发"
            );
        }

        Ok(EvmReport {
            project_id: snapshot.project.id.clone(),
            project_name: snapshot.project.name.clone(),
            evaluated_on: today,
            evm,
            obligations,
        })
    }
}
