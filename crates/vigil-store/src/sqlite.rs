use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqliteRow};
use sqlx::{Column, Row, TypeInfo, ValueRef};
use std::path::Path;
use tracing::{debug, info};

use crate::model::{FieldValue, MetricRecord, RecordBatch};
use vigil_core::{Result, VigilError};

/// 记录存储读取接口
///
/// 每轮运行一次阻塞式读取，记录按源序返回，不重排。
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn load(&self) -> Result<RecordBatch>;
}

/// SQLite 记录存储
pub struct SqliteStore {
    pool: SqlitePool,
    table: String,
}

impl SqliteStore {
    /// 以只读方式打开存储文件
    ///
    /// 文件缺失返回 `SourceUnavailable`，不做任何后续计算。
    pub async fn open<P: AsRef<Path>>(path: P, table: impl Into<String>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(VigilError::SourceUnavailable(path.display().to_string()));
        }

        let options = SqliteConnectOptions::new().filename(path).read_only(true);
        let pool = SqlitePool::connect_with(options)
            .await
            .map_err(|e| VigilError::SourceUnavailable(format!("{}: {}", path.display(), e)))?;

        info!("Opened record store: {}", path.display());

        Ok(Self {
            pool,
            table: table.into(),
        })
    }

    /// 目标表的列名，顺序与表定义一致
    ///
    /// 表缺失与「零行」是不同条件：前者返回 `ScanFailure`。
    async fn table_columns(&self) -> Result<Vec<String>> {
        let pragma = format!("PRAGMA table_info(\"{}\")", self.table);
        let rows = sqlx::query(&pragma)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| VigilError::ScanFailure(format!("{}: {}", self.table, e)))?;

        if rows.is_empty() {
            return Err(VigilError::ScanFailure(format!(
                "no such table: {}",
                self.table
            )));
        }

        let mut columns = Vec::with_capacity(rows.len());
        for row in &rows {
            let name: String = row
                .try_get("name")
                .map_err(|e| VigilError::ScanFailure(e.to_string()))?;
            columns.push(name);
        }
        Ok(columns)
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn load(&self) -> Result<RecordBatch> {
        let columns = self.table_columns().await?;

        // 不加 ORDER BY：保持源定义的插入顺序
        let sql = format!("SELECT * FROM \"{}\"", self.table);
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| VigilError::ScanFailure(format!("{}: {}", self.table, e)))?;

        let mut batch = RecordBatch::new(columns);
        for (seq, row) in rows.iter().enumerate() {
            let mut values = Vec::with_capacity(row.columns().len());
            for index in 0..row.columns().len() {
                values.push(decode_value(row, index)?);
            }
            batch.records.push(MetricRecord { seq, values });
        }

        debug!(
            "Loaded {} records ({} columns) from {}",
            batch.len(),
            batch.columns.len(),
            self.table
        );

        Ok(batch)
    }
}

/// 按值的实际存储类别解码单元格
///
/// SQLite 逐值动态定型，同一列可能混杂 INTEGER / REAL / TEXT。
fn decode_value(row: &SqliteRow, index: usize) -> Result<FieldValue> {
    let (is_null, type_name) = {
        let raw = row
            .try_get_raw(index)
            .map_err(|e| VigilError::ScanFailure(e.to_string()))?;
        (raw.is_null(), raw.type_info().name().to_string())
    };

    if is_null {
        return Ok(FieldValue::Null);
    }

    let value = match type_name.as_str() {
        "INTEGER" => FieldValue::Integer(
            row.try_get::<i64, _>(index)
                .map_err(|e| VigilError::ScanFailure(e.to_string()))?,
        ),
        "REAL" => FieldValue::Real(
            row.try_get::<f64, _>(index)
                .map_err(|e| VigilError::ScanFailure(e.to_string()))?,
        ),
        "BLOB" => {
            let bytes: Vec<u8> = row
                .try_get(index)
                .map_err(|e| VigilError::ScanFailure(e.to_string()))?;
            FieldValue::Text(String::from_utf8_lossy(&bytes).into_owned())
        }
        _ => FieldValue::Text(
            row.try_get::<String, _>(index)
                .map_err(|e| VigilError::ScanFailure(e.to_string()))?,
        ),
    };

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqliteConnectOptions;
    use std::path::PathBuf;

    async fn seed_store(dir: &Path) -> PathBuf {
        let db_path = dir.join("log.db");
        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await.unwrap();

        sqlx::query(
            r#"
            CREATE TABLE system_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp TEXT,
                cpu REAL,
                memory REAL,
                disk REAL,
                network_status TEXT
            )
            "#,
        )
        .execute(&pool)
        .await
        .unwrap();

        sqlx::query(
            "INSERT INTO system_log (timestamp, cpu, memory, disk, network_status) \
             VALUES ('2026-01-01 00:00:00', 45.5, 60.0, 30.0, 'UP')",
        )
        .execute(&pool)
        .await
        .unwrap();

        // 同一列里混入文本：REAL 列存 'N/A'
        sqlx::query(
            "INSERT INTO system_log (timestamp, cpu, memory, disk, network_status) \
             VALUES ('2026-01-01 00:05:00', 'N/A', 70.0, NULL, 'DOWN-partial')",
        )
        .execute(&pool)
        .await
        .unwrap();

        pool.close().await;
        db_path
    }

    #[tokio::test]
    async fn test_missing_store_file() {
        let result = SqliteStore::open("/nonexistent/log.db", "system_log").await;
        assert!(matches!(result, Err(VigilError::SourceUnavailable(_))));
    }

    #[tokio::test]
    async fn test_missing_table_is_a_distinct_condition() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = seed_store(dir.path()).await;

        let store = SqliteStore::open(&db_path, "no_such_table").await.unwrap();
        let result = store.load().await;
        assert!(matches!(result, Err(VigilError::ScanFailure(_))));
    }

    #[tokio::test]
    async fn test_load_preserves_source_order_and_value_types() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = seed_store(dir.path()).await;

        let store = SqliteStore::open(&db_path, "system_log").await.unwrap();
        let batch = store.load().await.unwrap();

        assert_eq!(
            batch.columns,
            vec!["id", "timestamp", "cpu", "memory", "disk", "network_status"]
        );
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.records[0].seq, 0);
        assert_eq!(batch.records[1].seq, 1);

        // 第一行 cpu 是数值
        assert_eq!(batch.records[0].values[2], FieldValue::Real(45.5));
        // 第二行 cpu 是文本，disk 为 NULL
        assert_eq!(
            batch.records[1].values[2],
            FieldValue::Text("N/A".to_string())
        );
        assert_eq!(batch.records[1].values[4], FieldValue::Null);
    }

    #[tokio::test]
    async fn test_empty_table_is_a_valid_batch() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("empty.db");
        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await.unwrap();
        sqlx::query("CREATE TABLE system_log (id INTEGER, timestamp TEXT, cpu REAL)")
            .execute(&pool)
            .await
            .unwrap();
        pool.close().await;

        let store = SqliteStore::open(&db_path, "system_log").await.unwrap();
        let batch = store.load().await.unwrap();
        assert!(batch.is_empty());
        assert_eq!(batch.columns, vec!["id", "timestamp", "cpu"]);
    }
}
