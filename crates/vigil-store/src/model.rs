use serde::{Deserialize, Serialize};

/// 鸭子类型的字段值
///
/// 记录模式不受控：同一列里可能混杂数字与文本（如 "N/A"），
/// 数值化只能尽力而为，由调用方决定如何计数失败。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl FieldValue {
    /// 空值判定：NULL 或去除首尾空白后为空的文本
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// 尽力数值化：数字直接通过，文本去空白后解析，其余为 None
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Integer(i) => Some(*i as f64),
            FieldValue::Real(f) => Some(*f),
            FieldValue::Text(s) => s.trim().parse().ok(),
            FieldValue::Null => None,
        }
    }

    /// 文本视图，用于状态列的子串匹配
    pub fn as_text(&self) -> Option<String> {
        match self {
            FieldValue::Null => None,
            FieldValue::Integer(i) => Some(i.to_string()),
            FieldValue::Real(f) => Some(f.to_string()),
            FieldValue::Text(s) => Some(s.clone()),
        }
    }
}

/// 一条遥测观测记录
///
/// `seq` 是装载时分配的稳定排序键（扫描位置），装载后不可变，
/// 随本轮运行结束一起丢弃。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricRecord {
    pub seq: usize,
    pub values: Vec<FieldValue>,
}

impl MetricRecord {
    pub fn value(&self, index: usize) -> Option<&FieldValue> {
        self.values.get(index)
    }
}

/// 一次装载得到的记录批：列名 + 按源序排列的记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordBatch {
    pub columns: Vec<String>,
    pub records: Vec<MetricRecord>,
}

impl RecordBatch {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            records: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
