// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

#![allow(dead_code)]

use chrono::NaiveDate;
use project_evm::domain::cost_entry::CostEntry;
use project_evm::domain::obligation::Obligation;
use project_evm::domain::project::{CostEstimates, LedgerSnapshot, Phase, Project};
use project_evm::domain::types::{
    ConfidenceLevel, CostEntryStatus, ObligationStatus, PhaseStatus, ProjectStatus,
};

pub fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ==========================================
// Project 构建器
// ==========================================

pub struct ProjectBuilder {
    project: Project,
}

impl ProjectBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            project: Project {
                id: id.to_string(),
                name: format!("Project {}", id),
                description: String::new(),
                total_budget: 100_000.0,
                start_date: ymd(2024, 1, 1),
                end_date: ymd(2024, 12, 31),
                status: ProjectStatus::Active,
                cost_estimates: None,
            },
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.project.name = name.to_string();
        self
    }

    pub fn budget(mut self, budget: f64) -> Self {
        self.project.total_budget = budget;
        self
    }

    pub fn schedule(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.project.start_date = start;
        self.project.end_date = end;
        self
    }

    pub fn estimate(mut self, work_package: &str, amount: f64) -> Self {
        self.project
            .cost_estimates
            .get_or_insert_with(CostEstimates::new)
            .insert(work_package.to_string(), amount);
        self
    }

    pub fn build(self) -> Project {
        self.project
    }

    pub fn snapshot(self) -> LedgerSnapshot {
        LedgerSnapshot::new(self.project)
    }
}

// ==========================================
// CostEntry 构建器
// ==========================================

pub struct CostEntryBuilder {
    entry: CostEntry,
}

impl CostEntryBuilder {
    pub fn new(id: &str, project_id: &str) -> Self {
        Self {
            entry: CostEntry {
                id: id.to_string(),
                project_id: project_id.to_string(),
                phase_id: None,
                category_name: "Labour".to_string(),
                description: String::new(),
                amount: 0.0,
                entry_date: ymd(2024, 1, 15),
                status: CostEntryStatus::Paid,
                due_date: None,
            },
        }
    }

    pub fn amount(mut self, amount: f64) -> Self {
        self.entry.amount = amount;
        self
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.entry.entry_date = date;
        self
    }

    pub fn category(mut self, category: &str) -> Self {
        self.entry.category_name = category.to_string();
        self
    }

    pub fn phase(mut self, phase_id: &str) -> Self {
        self.entry.phase_id = Some(phase_id.to_string());
        self
    }

    pub fn outstanding(mut self, due: Option<NaiveDate>) -> Self {
        self.entry.status = CostEntryStatus::Outstanding;
        self.entry.due_date = due;
        self
    }

    pub fn build(self) -> CostEntry {
        self.entry
    }
}

// ==========================================
// Obligation 构建器
// ==========================================

pub struct ObligationBuilder {
    obligation: Obligation,
}

impl ObligationBuilder {
    pub fn new(id: &str, project_id: &str) -> Self {
        Self {
            obligation: Obligation {
                id: id.to_string(),
                project_id: project_id.to_string(),
                category_name: "Hardware".to_string(),
                description: String::new(),
                amount: 0.0,
                confidence_level: ConfidenceLevel::Medium,
                status: ObligationStatus::Active,
                committed_on: None,
                expected_incur_date: None,
            },
        }
    }

    pub fn amount(mut self, amount: f64) -> Self {
        self.obligation.amount = amount;
        self
    }

    pub fn confidence(mut self, level: ConfidenceLevel) -> Self {
        self.obligation.confidence_level = level;
        self
    }

    pub fn category(mut self, category: &str) -> Self {
        self.obligation.category_name = category.to_string();
        self
    }

    pub fn status(mut self, status: ObligationStatus) -> Self {
        self.obligation.status = status;
        self
    }

    pub fn committed_on(mut self, date: NaiveDate) -> Self {
        self.obligation.committed_on = Some(date);
        self
    }

    pub fn build(self) -> Obligation {
        self.obligation
    }
}

// ==========================================
// Phase 构建
// ==========================================

pub fn phase(
    id: &str,
    project_id: &str,
    name: &str,
    budget: f64,
    start: NaiveDate,
    end: NaiveDate,
    status: PhaseStatus,
) -> Phase {
    Phase {
        id: id.to_string(),
        project_id: project_id.to_string(),
        name: name.to_string(),
        budget_allocation: budget,
        start_date: start,
        end_date: end,
        status,
    }
}
