use chrono::Utc;
use uuid::Uuid;

use crate::{new, MemoryStorage, RtpPacket, Storage, StorageConfig};

fn packet(seq: u16) -> RtpPacket {
    let now = Utc::now();
    RtpPacket {
        id: Uuid::new_v4(),
        src_ip: "10.0.0.1".to_string(),
        dst_ip: "10.0.0.2".to_string(),
        src_port: 5000,
        dst_port: 5004,
        sequence_number: seq,
        timestamp: 90000,
        marker: false,
        ssrc: 0xAABBCCDD,
        created_at: now,
        updated_at: now,
    }
}

#[tokio::test]
async fn test_memory_storage_keeps_insertion_order() {
    let storage = MemoryStorage::new();
    assert!(storage.is_empty().await);

    storage.create_rtp_packet(packet(1)).await.unwrap();
    storage.create_rtp_packet(packet(2)).await.unwrap();

    let packets = storage.packets().await;
    assert_eq!(packets.len(), 2);
    assert_eq!(packets[0].sequence_number, 1);
    assert_eq!(packets[1].sequence_number, 2);
}

#[tokio::test]
async fn test_new_builds_memory_backend() {
    let storage = new(StorageConfig::Memory).await;
    assert!(storage.is_ok(), "Failed to create memory storage");
    storage
        .unwrap()
        .create_rtp_packet(packet(7))
        .await
        .expect("memory storage must accept packets");
}

#[tokio::test]
async fn test_new_rejects_invalid_redis_url() {
    let config = StorageConfig::Redis {
        addr: "not a redis url".to_string(),
        prefix: "test".to_string(),
    };
    assert!(new(config).await.is_err());
}

#[test]
fn test_default_storage_config() {
    match StorageConfig::default() {
        StorageConfig::Stdout => {}
        other => panic!("Expected stdout storage by default, got {:?}", other),
    }
}

#[test]
fn test_storage_config_from_toml() {
    let config: StorageConfig = toml::from_str(
        r#"
        type = "redis"
        addr = "redis://127.0.0.1:6379"
        "#,
    )
    .expect("Failed to deserialize config");

    match config {
        StorageConfig::Redis { addr, prefix } => {
            assert_eq!(addr, "redis://127.0.0.1:6379");
            assert_eq!(prefix, "rtpsniff:packet");
        }
        other => panic!("Storage config type mismatch: {:?}", other),
    }
}

#[test]
fn test_rtp_packet_json_field_names() {
    let packet = packet(42);
    let value = serde_json::to_value(&packet).unwrap();
    assert_eq!(value["sequence_number"], 42);
    assert_eq!(value["ssrc"], 0xAABBCCDDu32);
    assert_eq!(value["src_ip"], "10.0.0.1");

    let back: RtpPacket = serde_json::from_value(value).unwrap();
    assert_eq!(back, packet);
}
