// ==========================================
// 项目成本挣值管理系统 - 配置管理器
// ==========================================
// 职责: EVM 参数加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// 规则: 单项缺失 → 默认值; 单项无法解析 → 告警并使用默认值;
//       整体校验失败 → 报错 (不带病运行)
// ==========================================

use crate::config::config_reader::EvmConfigReader;
use crate::config::evm_config::{BreachThresholds, ConfidenceWeights, EvmConfig, TimelineParams};
use crate::db::open_sqlite_connection;
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::error::Error;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

type ConfigError = Box<dyn Error + Send + Sync>;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, ConfigError> {
        let conn = open_sqlite_connection(db_path)?;
        crate::db::ensure_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, ConfigError> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
            crate::db::ensure_schema(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> Result<Option<String>, ConfigError> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        Ok(value)
    }

    /// 读取 global scope 的配置值（公开方法，供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, ConfigError> {
        self.get_config_value(key)
    }

    /// 写入 global scope 的配置值 (UPSERT)
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), ConfigError> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;
        Ok(())
    }

    /// 读取并解析配置项; 缺失或无法解析时返回默认值
    fn get_parsed_or_default<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr + Copy,
    {
        let raw = match self.get_config_value(key)? {
            Some(v) => v,
            None => return Ok(default),
        };

        match raw.trim().parse::<T>() {
            Ok(v) => Ok(v),
            Err(_) => {
                tracing::warn!(
                    config_key = key,
                    raw_value = %raw,
                    "配置值无法解析，使用默认值"
                );
                Ok(default)
            }
        }
    }

    /// 获取所有配置的快照（JSON格式）
    ///
    /// # 用途
    /// - 报表中记录计算口径
    pub fn get_config_snapshot(&self) -> Result<String, ConfigError> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt = conn
            .prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&config_map)?)
    }

    /// 从配置快照恢复配置
    ///
    /// # 返回
    /// - Ok(usize): 恢复的配置项数量
    ///
    /// # 注意
    /// - 此方法会覆盖现有的 global 配置
    pub fn restore_config_from_snapshot(&self, snapshot_json: &str) -> Result<usize, ConfigError> {
        let config_map: BTreeMap<String, String> = serde_json::from_str(snapshot_json)?;

        let mut conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        let tx = conn.transaction()?;

        let mut count = 0;
        for (key, value) in config_map.iter() {
            count += tx.execute(
                "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
                 ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2",
                params![key, value],
            )?;
        }

        tx.commit()?;
        Ok(count)
    }

    fn read_confidence_weights(&self) -> Result<ConfidenceWeights, ConfigError> {
        let d = ConfidenceWeights::default();
        Ok(ConfidenceWeights {
            high: self.get_parsed_or_default(config_keys::WEIGHT_HIGH, d.high)?,
            medium: self.get_parsed_or_default(config_keys::WEIGHT_MEDIUM, d.medium)?,
            low: self.get_parsed_or_default(config_keys::WEIGHT_LOW, d.low)?,
        })
    }

    fn read_breach_thresholds(&self) -> Result<BreachThresholds, ConfigError> {
        let d = BreachThresholds::default();
        Ok(BreachThresholds {
            high_pct: self.get_parsed_or_default(config_keys::BREACH_HIGH_PCT, d.high_pct)?,
            medium_pct: self
                .get_parsed_or_default(config_keys::BREACH_MEDIUM_PCT, d.medium_pct)?,
        })
    }

    fn read_timeline_params(&self) -> Result<TimelineParams, ConfigError> {
        let d = TimelineParams::default();
        Ok(TimelineParams {
            days_per_month: self
                .get_parsed_or_default(config_keys::DAYS_PER_MONTH, d.days_per_month)?,
            lookahead_months: self
                .get_parsed_or_default(config_keys::LOOKAHEAD_MONTHS, d.lookahead_months)?,
            uncertainty_per_month: self.get_parsed_or_default(
                config_keys::UNCERTAINTY_PER_MONTH,
                d.uncertainty_per_month,
            )?,
            overrun_threshold: self
                .get_parsed_or_default(config_keys::OVERRUN_THRESHOLD, d.overrun_threshold)?,
            ..d
        })
    }

    fn read_evm_config(&self) -> Result<EvmConfig, ConfigError> {
        let mut config = EvmConfig {
            confidence: self.read_confidence_weights()?,
            breach: self.read_breach_thresholds()?,
            timeline: self.read_timeline_params()?,
            ..EvmConfig::default()
        };

        let s = config.status;
        config.status.upper = self.get_parsed_or_default(config_keys::STATUS_UPPER, s.upper)?;
        config.status.lower = self.get_parsed_or_default(config_keys::STATUS_LOWER, s.lower)?;
        config.status.adjusted_lower =
            self.get_parsed_or_default(config_keys::STATUS_ADJUSTED_LOWER, s.adjusted_lower)?;

        let f = config.forecast;
        config.forecast.cost_control_cpi =
            self.get_parsed_or_default(config_keys::COST_CONTROL_CPI, f.cost_control_cpi)?;
        config.forecast.formal_change_eac_ratio = self.get_parsed_or_default(
            config_keys::FORMAL_CHANGE_EAC_RATIO,
            f.formal_change_eac_ratio,
        )?;
        config.forecast.etc_buffer =
            self.get_parsed_or_default(config_keys::ETC_BUFFER, f.etc_buffer)?;

        config.validate()?;
        Ok(config)
    }
}

// ==========================================
// EvmConfigReader Trait 实现
// ==========================================
#[async_trait]
impl EvmConfigReader for ConfigManager {
    async fn get_confidence_weights(&self) -> Result<ConfidenceWeights, ConfigError> {
        self.read_confidence_weights()
    }

    async fn get_breach_thresholds(&self) -> Result<BreachThresholds, ConfigError> {
        self.read_breach_thresholds()
    }

    async fn get_timeline_params(&self) -> Result<TimelineParams, ConfigError> {
        self.read_timeline_params()
    }

    async fn load_evm_config(&self) -> Result<EvmConfig, ConfigError> {
        let config = self.read_evm_config()?;
        tracing::debug!(?config, "EVM 配置加载完成");
        Ok(config)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 置信度权重
    pub const WEIGHT_HIGH: &str = "evm.confidence.high";
    pub const WEIGHT_MEDIUM: &str = "evm.confidence.medium";
    pub const WEIGHT_LOW: &str = "evm.confidence.low";

    // 状态标签
    pub const STATUS_UPPER: &str = "evm.status.upper";
    pub const STATUS_LOWER: &str = "evm.status.lower";
    pub const STATUS_ADJUSTED_LOWER: &str = "evm.status.adjusted_lower";

    // 超支严重度
    pub const BREACH_HIGH_PCT: &str = "evm.breach.high_pct";
    pub const BREACH_MEDIUM_PCT: &str = "evm.breach.medium_pct";

    // 预警与预测
    pub const COST_CONTROL_CPI: &str = "evm.forecast.cost_control_cpi";
    pub const FORMAL_CHANGE_EAC_RATIO: &str = "evm.forecast.formal_change_eac_ratio";
    pub const ETC_BUFFER: &str = "evm.forecast.etc_buffer";

    // 时间轴
    pub const DAYS_PER_MONTH: &str = "evm.timeline.days_per_month";
    pub const LOOKAHEAD_MONTHS: &str = "evm.timeline.lookahead_months";
    pub const UNCERTAINTY_PER_MONTH: &str = "evm.timeline.uncertainty_per_month";
    pub const OVERRUN_THRESHOLD: &str = "evm.timeline.overrun_threshold";
}
