// ==========================================
// ConfigManager 集成测试
// ==========================================
// 测试目标: config_kv 覆写 / 默认值回退 / 整体校验 / 快照恢复
// ==========================================


use project_evm::config::{config_keys, ConfigManager, EvmConfig, EvmConfigReader};
use test_helpers::create_test_db;

#[tokio::test]
async fn test_empty_store_yields_defaults() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config_manager = ConfigManager::new(&db_path).expect("Failed to create ConfigManager");

    let config = config_manager.load_evm_config().await.unwrap();
    assert_eq!(config, EvmConfig::default());
}

#[tokio::test]
async fn test_overrides_are_applied() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config_manager = ConfigManager::new(&db_path).unwrap();

    config_manager
        .set_global_config_value(config_keys::WEIGHT_LOW, "0.5")
        .unwrap();
    config_manager
        .set_global_config_value(config_keys::LOOKAHEAD_MONTHS, "6")
        .unwrap();
    config_manager
        .set_global_config_value(config_keys::BREACH_HIGH_PCT, " 15 ")
        .unwrap();

    let weights = config_manager.get_confidence_weights().await.unwrap();
    assert_eq!(weights.low, 0.5);
    assert_eq!(weights.high, 0.95);

    let config = config_manager.load_evm_config().await.unwrap();
    assert_eq!(config.timeline.lookahead_months, 6);
    assert_eq!(config.breach.high_pct, 15.0);
    assert_eq!(config.breach.medium_pct, 5.0);
}

#[tokio::test]
async fn test_unparsable_value_falls_back_to_default() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config_manager = ConfigManager::new(&db_path).unwrap();

    config_manager
        .set_global_config_value(config_keys::DAYS_PER_MONTH, "about thirty")
        .unwrap();

    let params = config_manager.get_timeline_params().await.unwrap();
    assert_eq!(params.days_per_month, 30.44);
}

#[tokio::test]
async fn test_invalid_combination_is_rejected() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config_manager = ConfigManager::new(&db_path).unwrap();

    // 可解析但越界: 权重 > 1
    config_manager
        .set_global_config_value(config_keys::WEIGHT_HIGH, "1.4")
        .unwrap();

    let result = config_manager.load_evm_config().await;
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("confidence.high"));
}

#[tokio::test]
async fn test_upsert_overwrites_previous_value() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config_manager = ConfigManager::new(&db_path).unwrap();

    config_manager
        .set_global_config_value(config_keys::ETC_BUFFER, "1.2")
        .unwrap();
    config_manager
        .set_global_config_value(config_keys::ETC_BUFFER, "1.3")
        .unwrap();

    assert_eq!(
        config_manager
            .get_global_config_value(config_keys::ETC_BUFFER)
            .unwrap()
            .as_deref(),
        Some("1.3")
    );
}

#[tokio::test]
async fn test_snapshot_and_restore() {
    let (_source_file, source_path) = create_test_db().expect("Failed to create test db");
    let source = ConfigManager::new(&source_path).unwrap();
    source
        .set_global_config_value(config_keys::WEIGHT_MEDIUM, "0.7")
        .unwrap();
    source
        .set_global_config_value(config_keys::OVERRUN_THRESHOLD, "0.08")
        .unwrap();

    let snapshot = source.get_config_snapshot().unwrap();
    assert!(snapshot.contains(config_keys::WEIGHT_MEDIUM));

    let (_target_file, target_path) = create_test_db().expect("Failed to create test db");
    let target = ConfigManager::new(&target_path).unwrap();
    assert_eq!(target.restore_config_from_snapshot(&snapshot).unwrap(), 2);

    let restored = target.load_evm_config().await.unwrap();
    assert_eq!(restored.confidence.medium, 0.7);
    assert_eq!(restored.timeline.overrun_threshold, 0.08);
    assert_eq!(restored, source.load_evm_config().await.unwrap());
}

#[tokio::test]
async fn test_malformed_snapshot_is_rejected() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config_manager = ConfigManager::new(&db_path).unwrap();

    assert!(config_manager.restore_config_from_snapshot("not json").is_err());
    assert_eq!(config_manager.get_config_snapshot().unwrap(), "{}");
}
