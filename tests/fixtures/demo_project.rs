// ==========================================
// 演示项目数据工厂
// ==========================================
// 用途: 进行中的演示项目 (集成测试 + seed_demo_ledger 共用)
// 评估日: DEMO_TODAY (2024-07-15)
// ==========================================

#![allow(dead_code)]

use chrono::NaiveDate;
use project_evm::domain::cost_entry::CostEntry;
use project_evm::domain::obligation::Obligation;
use project_evm::domain::project::{CostEstimates, LedgerSnapshot, Phase, Project};
use project_evm::domain::types::{
    ConfidenceLevel, CostEntryStatus, ObligationStatus, PhaseStatus, ProjectStatus,
};

pub const DEMO_PROJECT_ID: &str = "DEMO-NET-2024";

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn demo_today() -> NaiveDate {
    ymd(2024, 7, 15)
}

/// 办公网络升级项目 (预算 250k,工期 2024 全年)
pub fn demo_snapshot() -> LedgerSnapshot {
    let mut estimates = CostEstimates::new();
    estimates.insert("Hardware".to_string(), 95_000.0);
    estimates.insert("Software".to_string(), 40_000.0);
    estimates.insert("Labour".to_string(), 85_000.0);
    estimates.insert("Services".to_string(), 20_000.0);

    let project = Project {
        id: DEMO_PROJECT_ID.to_string(),
        name: "Office Network Upgrade".to_string(),
        description: "Campus-wide switching and Wi-Fi refresh".to_string(),
        total_budget: 250_000.0,
        start_date: ymd(2024, 1, 1),
        end_date: ymd(2024, 12, 31),
        status: ProjectStatus::Active,
        cost_estimates: Some(estimates),
    };

    let phases = vec![
        demo_phase(
            "PH-PLAN",
            "Planning",
            30_000.0,
            ymd(2024, 1, 1),
            ymd(2024, 2, 29),
            PhaseStatus::Completed,
        ),
        demo_phase(
            "PH-IMPL",
            "Implementation",
            170_000.0,
            ymd(2024, 3, 1),
            ymd(2024, 9, 30),
            PhaseStatus::InProgress,
        ),
        demo_phase(
            "PH-TEST",
            "Testing & Handover",
            50_000.0,
            ymd(2024, 10, 1),
            ymd(2024, 12, 31),
            PhaseStatus::NotStarted,
        ),
    ];

    let cost_entries = vec![
        demo_entry("CE-001", "PH-PLAN", "Labour", 12_400.0, ymd(2024, 1, 20), None),
        demo_entry("CE-002", "PH-PLAN", "Services", 8_600.0, ymd(2024, 2, 14), None),
        demo_entry("CE-003", "PH-PLAN", "Labour", 9_800.0, ymd(2024, 2, 27), None),
        demo_entry("CE-004", "PH-IMPL", "Hardware", 38_500.0, ymd(2024, 3, 18), None),
        demo_entry("CE-005", "PH-IMPL", "Labour", 14_200.0, ymd(2024, 4, 10), None),
        demo_entry("CE-006", "PH-IMPL", "Software", 16_000.0, ymd(2024, 4, 25), None),
        demo_entry("CE-007", "PH-IMPL", "Hardware", 21_300.0, ymd(2024, 5, 22), None),
        demo_entry(
            "CE-008",
            "PH-IMPL",
            "Labour",
            15_600.0,
            ymd(2024, 6, 12),
            Some(ymd(2024, 7, 12)),
        ),
        demo_entry(
            "CE-009",
            "PH-IMPL",
            "Services",
            6_900.0,
            ymd(2024, 7, 3),
            Some(ymd(2024, 8, 2)),
        ),
        demo_entry(
            "CE-010",
            "PH-IMPL",
            "Hardware",
            9_200.0,
            ymd(2024, 7, 9),
            Some(ymd(2024, 9, 30)),
        ),
    ];

    let obligations = vec![
        demo_obligation(
            "OB-001",
            "Hardware",
            "Core switch stack (PO issued)",
            42_000.0,
            ConfidenceLevel::High,
            Some(ymd(2024, 5, 2)),
            ObligationStatus::Active,
        ),
        demo_obligation(
            "OB-002",
            "Software",
            "Network monitoring licences",
            18_000.0,
            ConfidenceLevel::Medium,
            Some(ymd(2024, 6, 5)),
            ObligationStatus::Active,
        ),
        demo_obligation(
            "OB-003",
            "Services",
            "Cabling contractor quote",
            12_500.0,
            ConfidenceLevel::Low,
            None,
            ObligationStatus::Active,
        ),
        demo_obligation(
            "OB-004",
            "Hardware",
            "Cancelled spare access points",
            7_500.0,
            ConfidenceLevel::High,
            Some(ymd(2024, 3, 1)),
            ObligationStatus::Cancelled,
        ),
    ];

    LedgerSnapshot {
        project,
        phases,
        cost_entries,
        obligations,
    }
}

fn demo_phase(
    id: &str,
    name: &str,
    budget: f64,
    start: NaiveDate,
    end: NaiveDate,
    status: PhaseStatus,
) -> Phase {
    Phase {
        id: id.to_string(),
        project_id: DEMO_PROJECT_ID.to_string(),
        name: name.to_string(),
        budget_allocation: budget,
        start_date: start,
        end_date: end,
        status,
    }
}

fn demo_entry(
    id: &str,
    phase_id: &str,
    category: &str,
    amount: f64,
    entry_date: NaiveDate,
    due_date: Option<NaiveDate>,
) -> CostEntry {
    CostEntry {
        id: id.to_string(),
        project_id: DEMO_PROJECT_ID.to_string(),
        phase_id: Some(phase_id.to_string()),
        category_name: category.to_string(),
        description: format!("{} spend", category),
        amount,
        entry_date,
        status: if due_date.is_some() {
            CostEntryStatus::Outstanding
        } else {
            CostEntryStatus::Paid
        },
        due_date,
    }
}

fn demo_obligation(
    id: &str,
    category: &str,
    description: &str,
    amount: f64,
    level: ConfidenceLevel,
    committed_on: Option<NaiveDate>,
    status: ObligationStatus,
) -> Obligation {
    Obligation {
        id: id.to_string(),
        project_id: DEMO_PROJECT_ID.to_string(),
        category_name: category.to_string(),
        description: description.to_string(),
        amount,
        confidence_level: level,
        status,
        committed_on,
        expected_incur_date: None,
    }
}
