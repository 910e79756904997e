// ==========================================
// 项目成本挣值管理系统 - SQLite 台账仓储
// ==========================================
// 职责: project / phase / cost_entry / obligation 表读写
// 红线: Repository 不含业务规则，只做数据 CRUD
// 红线: 行数据非法 (日期/状态/置信度) 直接报错
// ==========================================

use crate::db::{configure_sqlite_connection, ensure_schema, open_sqlite_connection};
use crate::domain::cost_entry::CostEntry;
use crate::domain::obligation::Obligation;
use crate::domain::project::{CostEstimates, LedgerSnapshot, Phase, Project};
use crate::domain::types::ObligationStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::ledger_repo::LedgerReader;
use async_trait::async_trait;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::sync::{Arc, Mutex, MutexGuard};

const DATE_FORMAT: &str = "%Y-%m-%d";

// ==========================================
// SqliteLedgerRepository
// ==========================================
pub struct SqliteLedgerRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteLedgerRepository {
    /// 创建新的 Repository 实例 (自动建表)
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        ensure_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            configure_sqlite_connection(&guard)?;
            ensure_schema(&guard)?;
        }
        Ok(Self { conn })
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 写入
    // ==========================================

    pub fn insert_project(&self, project: &Project) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        insert_project_on(&conn, project)
    }

    pub fn insert_phase(&self, phase: &Phase) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        insert_phase_on(&conn, phase)
    }

    pub fn insert_cost_entry(&self, entry: &CostEntry) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        insert_cost_entry_on(&conn, entry)
    }

    pub fn insert_obligation(&self, obligation: &Obligation) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        insert_obligation_on(&conn, obligation)
    }

    /// 批量写入成本条目（事务化）
    ///
    /// # 返回
    /// - Ok(usize): 写入条数
    /// - Err: 任一条失败则整体回滚
    pub fn insert_cost_entries(&self, entries: &[CostEntry]) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        for entry in entries {
            insert_cost_entry_on(&tx, entry)?;
        }
        commit(tx)?;
        Ok(entries.len())
    }

    /// 批量写入承付款（事务化）
    pub fn insert_obligations(&self, obligations: &[Obligation]) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        for obligation in obligations {
            insert_obligation_on(&tx, obligation)?;
        }
        commit(tx)?;
        Ok(obligations.len())
    }

    /// 整体写入台账快照（事务化）
    pub fn insert_snapshot(&self, snapshot: &LedgerSnapshot) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        insert_project_on(&tx, &snapshot.project)?;
        for phase in &snapshot.phases {
            insert_phase_on(&tx, phase)?;
        }
        for entry in &snapshot.cost_entries {
            insert_cost_entry_on(&tx, entry)?;
        }
        for obligation in &snapshot.obligations {
            insert_obligation_on(&tx, obligation)?;
        }

        commit(tx)?;
        tracing::info!(
            project_id = %snapshot.project.id,
            cost_entries = snapshot.cost_entries.len(),
            obligations = snapshot.obligations.len(),
            "台账快照写入完成"
        );
        Ok(())
    }

    /// 更新承付款状态 (取消 / 转为实际成本)
    pub fn update_obligation_status(
        &self,
        obligation_id: &str,
        status: ObligationStatus,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let updated = conn.execute(
            "UPDATE obligation SET status = ?1 WHERE id = ?2",
            params![status.to_db_str(), obligation_id],
        )?;
        if updated == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Obligation".to_string(),
                id: obligation_id.to_string(),
            });
        }
        Ok(())
    }

    // ==========================================
    // 查询
    // ==========================================

    pub fn find_project(&self, project_id: &str) -> RepositoryResult<Option<Project>> {
        let conn = self.get_conn()?;
        let raw = conn
            .query_row(
                r#"
                SELECT id, name, description, total_budget, start_date, end_date, status,
                       cost_estimates
                FROM project
                WHERE id = ?1
                "#,
                params![project_id],
                |row| {
                    Ok(ProjectRow {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        description: row.get(2)?,
                        total_budget: row.get(3)?,
                        start_date: row.get(4)?,
                        end_date: row.get(5)?,
                        status: row.get(6)?,
                        cost_estimates: row.get(7)?,
                    })
                },
            )
            .optional()?;

        raw.map(ProjectRow::into_domain).transpose()
    }

    pub fn list_phases(&self, project_id: &str) -> RepositoryResult<Vec<Phase>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, project_id, name, budget_allocation, start_date, end_date, status
            FROM phase
            WHERE project_id = ?1
            ORDER BY start_date, id
            "#,
        )?;
        let rows = stmt.query_map(params![project_id], |row| {
            Ok(PhaseRow {
                id: row.get(0)?,
                project_id: row.get(1)?,
                name: row.get(2)?,
                budget_allocation: row.get(3)?,
                start_date: row.get(4)?,
                end_date: row.get(5)?,
                status: row.get(6)?,
            })
        })?;

        let mut phases = Vec::new();
        for row in rows {
            phases.push(row?.into_domain()?);
        }
        Ok(phases)
    }

    pub fn list_cost_entries(&self, project_id: &str) -> RepositoryResult<Vec<CostEntry>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, project_id, phase_id, category_name, description, amount, entry_date,
                   status, due_date
            FROM cost_entry
            WHERE project_id = ?1
            ORDER BY entry_date, id
            "#,
        )?;
        let rows = stmt.query_map(params![project_id], |row| {
            Ok(CostEntryRow {
                id: row.get(0)?,
                project_id: row.get(1)?,
                phase_id: row.get(2)?,
                category_name: row.get(3)?,
                description: row.get(4)?,
                amount: row.get(5)?,
                entry_date: row.get(6)?,
                status: row.get(7)?,
                due_date: row.get(8)?,
            })
        })?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?.into_domain()?);
        }
        Ok(entries)
    }

    pub fn list_obligations(&self, project_id: &str) -> RepositoryResult<Vec<Obligation>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, project_id, category_name, description, amount, confidence_level, status,
                   committed_on, expected_incur_date
            FROM obligation
            WHERE project_id = ?1
            ORDER BY id
            "#,
        )?;
        let rows = stmt.query_map(params![project_id], |row| {
            Ok(ObligationRow {
                id: row.get(0)?,
                project_id: row.get(1)?,
                category_name: row.get(2)?,
                description: row.get(3)?,
                amount: row.get(4)?,
                confidence_level: row.get(5)?,
                status: row.get(6)?,
                committed_on: row.get(7)?,
                expected_incur_date: row.get(8)?,
            })
        })?;

        let mut obligations = Vec::new();
        for row in rows {
            obligations.push(row?.into_domain()?);
        }
        Ok(obligations)
    }

    /// 读取台账快照（同步版本）
    pub fn read_snapshot(&self, project_id: &str) -> RepositoryResult<Option<LedgerSnapshot>> {
        let project = match self.find_project(project_id)? {
            Some(p) => p,
            None => return Ok(None),
        };

        Ok(Some(LedgerSnapshot {
            phases: self.list_phases(project_id)?,
            cost_entries: self.list_cost_entries(project_id)?,
            obligations: self.list_obligations(project_id)?,
            project,
        }))
    }

    pub fn project_ids(&self) -> RepositoryResult<Vec<String>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT id FROM project ORDER BY id")?;
        let ids = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }
}

#[async_trait]
impl LedgerReader for SqliteLedgerRepository {
    async fn load_snapshot(&self, project_id: &str) -> RepositoryResult<Option<LedgerSnapshot>> {
        self.read_snapshot(project_id)
    }

    async fn list_project_ids(&self) -> RepositoryResult<Vec<String>> {
        self.project_ids()
    }
}

// ==========================================
// 写入辅助 (连接与事务共用)
// ==========================================

fn commit(tx: Transaction<'_>) -> RepositoryResult<()> {
    tx.commit()
        .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))
}

fn insert_project_on(conn: &Connection, project: &Project) -> RepositoryResult<()> {
    let estimates = project
        .cost_estimates
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;

    conn.execute(
        r#"
        INSERT INTO project (id, name, description, total_budget, start_date, end_date, status,
                             cost_estimates)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
        params![
            project.id,
            project.name,
            project.description,
            project.total_budget,
            project.start_date.format(DATE_FORMAT).to_string(),
            project.end_date.format(DATE_FORMAT).to_string(),
            project.status.to_db_str(),
            estimates,
        ],
    )?;
    Ok(())
}

fn insert_phase_on(conn: &Connection, phase: &Phase) -> RepositoryResult<()> {
    conn.execute(
        r#"
        INSERT INTO phase (id, project_id, name, budget_allocation, start_date, end_date, status)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
        params![
            phase.id,
            phase.project_id,
            phase.name,
            phase.budget_allocation,
            phase.start_date.format(DATE_FORMAT).to_string(),
            phase.end_date.format(DATE_FORMAT).to_string(),
            phase.status.to_db_str(),
        ],
    )?;
    Ok(())
}

fn insert_cost_entry_on(conn: &Connection, entry: &CostEntry) -> RepositoryResult<()> {
    conn.execute(
        r#"
        INSERT INTO cost_entry (id, project_id, phase_id, category_name, description, amount,
                                entry_date, status, due_date)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
        params![
            entry.id,
            entry.project_id,
            entry.phase_id,
            entry.category_name,
            entry.description,
            entry.amount,
            entry.entry_date.format(DATE_FORMAT).to_string(),
            entry.status.to_db_str(),
            entry.due_date.map(|d| d.format(DATE_FORMAT).to_string()),
        ],
    )?;
    Ok(())
}

fn insert_obligation_on(conn: &Connection, obligation: &Obligation) -> RepositoryResult<()> {
    conn.execute(
        r#"
        INSERT INTO obligation (id, project_id, category_name, description, amount,
                                confidence_level, status, committed_on, expected_incur_date)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
        params![
            obligation.id,
            obligation.project_id,
            obligation.category_name,
            obligation.description,
            obligation.amount,
            obligation.confidence_level.to_db_str(),
            obligation.status.to_db_str(),
            obligation.committed_on.map(|d| d.format(DATE_FORMAT).to_string()),
            obligation.expected_incur_date.map(|d| d.format(DATE_FORMAT).to_string()),
        ],
    )?;
    Ok(())
}

// ==========================================
// 行映射 (原始文本 → 领域对象)
// ==========================================

fn parse_date(field: &str, raw: &str) -> RepositoryResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|e| {
        RepositoryError::FieldValueError {
            field: field.to_string(),
            message: format!("日期格式错误 '{}': {}", raw, e),
        }
    })
}

fn parse_optional_date(field: &str, raw: Option<String>) -> RepositoryResult<Option<NaiveDate>> {
    raw.filter(|s| !s.trim().is_empty())
        .map(|s| parse_date(field, &s))
        .transpose()
}

struct ProjectRow {
    id: String,
    name: String,
    description: String,
    total_budget: f64,
    start_date: String,
    end_date: String,
    status: String,
    cost_estimates: Option<String>,
}

impl ProjectRow {
    fn into_domain(self) -> RepositoryResult<Project> {
        let cost_estimates = match self.cost_estimates {
            Some(json) if !json.trim().is_empty() => {
                Some(serde_json::from_str::<CostEstimates>(&json)?)
            }
            _ => None,
        };

        Ok(Project {
            start_date: parse_date("project.start_date", &self.start_date)?,
            end_date: parse_date("project.end_date", &self.end_date)?,
            status: self.status.parse()?,
            id: self.id,
            name: self.name,
            description: self.description,
            total_budget: self.total_budget,
            cost_estimates,
        })
    }
}

struct PhaseRow {
    id: String,
    project_id: String,
    name: String,
    budget_allocation: f64,
    start_date: String,
    end_date: String,
    status: String,
}

impl PhaseRow {
    fn into_domain(self) -> RepositoryResult<Phase> {
        Ok(Phase {
            start_date: parse_date("phase.start_date", &self.start_date)?,
            end_date: parse_date("phase.end_date", &self.end_date)?,
            status: self.status.parse()?,
            id: self.id,
            project_id: self.project_id,
            name: self.name,
            budget_allocation: self.budget_allocation,
        })
    }
}

struct CostEntryRow {
    id: String,
    project_id: String,
    phase_id: Option<String>,
    category_name: String,
    description: String,
    amount: f64,
    entry_date: String,
    status: String,
    due_date: Option<String>,
}

impl CostEntryRow {
    fn into_domain(self) -> RepositoryResult<CostEntry> {
        Ok(CostEntry {
            entry_date: parse_date("cost_entry.entry_date", &self.entry_date)?,
            due_date: parse_optional_date("cost_entry.due_date", self.due_date)?,
            status: self.status.parse()?,
            id: self.id,
            project_id: self.project_id,
            phase_id: self.phase_id,
            category_name: self.category_name,
            description: self.description,
            amount: self.amount,
        })
    }
}

struct ObligationRow {
    id: String,
    project_id: String,
    category_name: String,
    description: String,
    amount: f64,
    confidence_level: String,
    status: String,
    committed_on: Option<String>,
    expected_incur_date: Option<String>,
}

impl ObligationRow {
    fn into_domain(self) -> RepositoryResult<Obligation> {
        Ok(Obligation {
            confidence_level: self.confidence_level.parse()?,
            status: self.status.parse()?,
            committed_on: parse_optional_date("obligation.committed_on", self.committed_on)?,
            expected_incur_date: parse_optional_date(
                "obligation.expected_incur_date",
                self.expected_incur_date,
            )?,
            id: self.id,
            project_id: self.project_id,
            category_name: self.category_name,
            description: self.description,
            amount: self.amount,
        })
    }
}
