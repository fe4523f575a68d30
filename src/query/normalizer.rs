//! 查询规范化：把原始（坐标, 心情标签）转换为合法的 Query
//!
//! 规则：
//! - 纬度 ∈ [-90, 90]，经度 ∈ [-180, 180]，NaN/无穷同样视为越界
//! - 心情大小写不敏感匹配封闭枚举，输出统一小写
//! - 饮食限制：去空白、小写、去空、去重（保留首次出现顺序）
//!
//! 对已规范化的 Query 再次规范化得到相同结果（幂等）。

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::query::Mood;

/// 越界的坐标分量
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordinateField {
    Latitude,
    Longitude,
}

impl CoordinateField {
    pub fn min(&self) -> f64 {
        match self {
            CoordinateField::Latitude => -90.0,
            CoordinateField::Longitude => -180.0,
        }
    }

    pub fn max(&self) -> f64 {
        match self {
            CoordinateField::Latitude => 90.0,
            CoordinateField::Longitude => 180.0,
        }
    }

    fn check(self, value: f64) -> Result<f64, ValidationError> {
        if (self.min()..=self.max()).contains(&value) {
            Ok(value)
        } else {
            Err(ValidationError::OutOfRange { field: self, value })
        }
    }
}

impl fmt::Display for CoordinateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordinateField::Latitude => f.write_str("latitude"),
            CoordinateField::Longitude => f.write_str("longitude"),
        }
    }
}

/// 规范化失败：永远不会到达网络层
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub enum ValidationError {
    #[error("{field} {value} is out of range [{}, {}]", .field.min(), .field.max())]
    OutOfRange { field: CoordinateField, value: f64 },

    #[error("unknown mood '{0}' (expected one of: happy, sad, energetic, relaxed, hungry)")]
    UnknownMood(String),
}

impl ValidationError {
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, ValidationError::OutOfRange { .. })
    }
}

/// 视图层提交的原始查询（未校验）
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct RawQuery {
    pub latitude: f64,
    pub longitude: f64,
    pub mood: String,
    #[serde(default)]
    pub dietary_restrictions: Vec<String>,
}

impl RawQuery {
    pub fn new(latitude: f64, longitude: f64, mood: impl Into<String>) -> Self {
        Self {
            latitude,
            longitude,
            mood: mood.into(),
            dietary_restrictions: Vec::new(),
        }
    }

    pub fn with_dietary_restrictions<I, S>(mut self, restrictions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dietary_restrictions = restrictions.into_iter().map(Into::into).collect();
        self
    }

    /// 校验并规范化为 Query
    pub fn normalize(&self) -> Result<Query, ValidationError> {
        let mut query = normalize(self.latitude, self.longitude, &self.mood)?;
        query.dietary_restrictions = normalize_restrictions(&self.dietary_restrictions);
        Ok(query)
    }
}

impl From<&Query> for RawQuery {
    fn from(query: &Query) -> Self {
        Self {
            latitude: query.latitude,
            longitude: query.longitude,
            mood: query.mood.as_str().to_string(),
            dietary_restrictions: query.dietary_restrictions.clone(),
        }
    }
}

/// 已校验的不可变查询；只能经由 [`normalize`] / [`RawQuery::normalize`] 构造
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Query {
    latitude: f64,
    longitude: f64,
    mood: Mood,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    dietary_restrictions: Vec<String>,
}

impl Query {
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn mood(&self) -> Mood {
        self.mood
    }

    pub fn dietary_restrictions(&self) -> &[String] {
        &self.dietary_restrictions
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ ({:.4}, {:.4})", self.mood, self.latitude, self.longitude)
    }
}

/// 校验坐标与心情，返回心情已规范为小写的 Query
pub fn normalize(latitude: f64, longitude: f64, mood: &str) -> Result<Query, ValidationError> {
    let latitude = CoordinateField::Latitude.check(latitude)?;
    let longitude = CoordinateField::Longitude.check(longitude)?;
    let mood = mood.parse::<Mood>()?;
    Ok(Query {
        latitude,
        longitude,
        mood,
        dietary_restrictions: Vec::new(),
    })
}

fn normalize_restrictions(raw: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(raw.len());
    for item in raw {
        let item = item.trim().to_lowercase();
        if !item.is_empty() && !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_normalize_canonicalizes_mood() {
        let q = normalize(37.7749, -122.4194, "Hungry").unwrap();
        assert_eq!(q.mood(), Mood::Hungry);
        assert_eq!(q.latitude(), 37.7749);
        assert_eq!(q.longitude(), -122.4194);

        let body = serde_json::to_value(&q).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"latitude": 37.7749, "longitude": -122.4194, "mood": "hungry"})
        );
    }

    #[test]
    fn test_normalize_bounds_are_inclusive() {
        assert!(normalize(90.0, 180.0, "happy").is_ok());
        assert!(normalize(-90.0, -180.0, "sad").is_ok());
    }

    #[test]
    fn test_normalize_out_of_range_latitude() {
        let err = normalize(200.0, 0.0, "Happy").unwrap_err();
        assert_eq!(
            err,
            ValidationError::OutOfRange {
                field: CoordinateField::Latitude,
                value: 200.0
            }
        );
        assert!(err.to_string().contains("[-90, 90]"));
    }

    #[test]
    fn test_normalize_out_of_range_longitude() {
        let err = normalize(0.0, -180.5, "Happy").unwrap_err();
        assert!(matches!(
            err,
            ValidationError::OutOfRange {
                field: CoordinateField::Longitude,
                ..
            }
        ));
    }

    #[test]
    fn test_normalize_rejects_non_finite() {
        assert!(normalize(f64::NAN, 0.0, "happy").unwrap_err().is_out_of_range());
        assert!(normalize(0.0, f64::INFINITY, "happy")
            .unwrap_err()
            .is_out_of_range());
    }

    #[test]
    fn test_range_checked_before_mood() {
        let err = normalize(95.0, 0.0, "bored").unwrap_err();
        assert!(err.is_out_of_range());
    }

    #[test]
    fn test_unknown_mood() {
        let err = normalize(0.0, 0.0, "bored").unwrap_err();
        assert_eq!(err, ValidationError::UnknownMood("bored".to_string()));
    }

    #[test]
    fn test_dietary_restrictions_normalized() {
        let q = RawQuery::new(1.0, 2.0, "relaxed")
            .with_dietary_restrictions([" Vegan", "", "vegan", "Gluten-Free "])
            .normalize()
            .unwrap();
        assert_eq!(q.dietary_restrictions(), ["vegan", "gluten-free"]);

        let body = serde_json::to_value(&q).unwrap();
        assert_eq!(body["dietary_restrictions"], serde_json::json!(["vegan", "gluten-free"]));
    }

    fn mood_token() -> impl Strategy<Value = String> {
        (0usize..Mood::ALL.len(), any::<u8>()).prop_map(|(idx, mask)| {
            Mood::ALL[idx]
                .as_str()
                .chars()
                .enumerate()
                .map(|(i, c)| {
                    if mask & (1 << (i % 8)) != 0 {
                        c.to_ascii_uppercase()
                    } else {
                        c
                    }
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(
            lat in -90.0f64..=90.0,
            lon in -180.0f64..=180.0,
            mood in mood_token(),
            restrictions in prop::collection::vec("[ a-zA-Z-]{0,8}", 0..4),
        ) {
            let first = RawQuery::new(lat, lon, mood)
                .with_dietary_restrictions(restrictions)
                .normalize()
                .unwrap();
            let second = RawQuery::from(&first).normalize().unwrap();
            prop_assert_eq!(&first, &second);

            let plain =
                normalize(first.latitude(), first.longitude(), first.mood().as_str()).unwrap();
            prop_assert_eq!(plain.mood(), first.mood());
        }

        #[test]
        fn prop_out_of_range_latitude_rejected(
            lat in prop_oneof![-1.0e9f64..-90.0001, 90.0001f64..1.0e9],
            lon in -180.0f64..=180.0,
            mood in mood_token(),
        ) {
            let err = normalize(lat, lon, &mood).unwrap_err();
            prop_assert!(err.is_out_of_range());
        }

        #[test]
        fn prop_out_of_range_longitude_rejected(
            lat in -90.0f64..=90.0,
            lon in prop_oneof![-1.0e9f64..-180.0001, 180.0001f64..1.0e9],
            mood in mood_token(),
        ) {
            let err = normalize(lat, lon, &mood).unwrap_err();
            prop_assert!(err.is_out_of_range());
        }
    }
}
