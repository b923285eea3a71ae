// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Open-ended metadata attached to attempts and finalized sessions
//!
//! Modes stash extra facts (blitz duration, gauntlet lives, ...) here. Keys are
//! free-form, values are restricted to a few JSON-compatible kinds.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{DojoError, Result};

/// Map of mode-specific metadata
pub type PayloadMap = BTreeMap<String, PayloadValue>;

/// A single payload value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PayloadValue {
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<PayloadValue>),
}

impl PayloadValue {
    /// Whether every number in this value (lists included) is finite.
    /// JSON has no NaN or infinity; serde_json writes them as `null`.
    pub fn is_finite(&self) -> bool {
        match self {
            PayloadValue::Number(n) => n.is_finite(),
            PayloadValue::List(items) => items.iter().all(PayloadValue::is_finite),
            PayloadValue::Bool(_) | PayloadValue::Text(_) => true,
        }
    }
}

/// Reject payloads holding NaN or infinite numbers.
pub fn validate_payload(payload: &PayloadMap) -> Result<()> {
    match payload.iter().find(|(_, value)| !value.is_finite()) {
        Some((key, value)) => Err(DojoError::InvalidInput(format!(
            "payload value '{}' = {} is not a finite number",
            key, value
        ))),
        None => Ok(()),
    }
}

impl From<bool> for PayloadValue {
    fn from(v: bool) -> Self {
        PayloadValue::Bool(v)
    }
}

impl From<f64> for PayloadValue {
    fn from(v: f64) -> Self {
        PayloadValue::Number(v)
    }
}

impl From<i64> for PayloadValue {
    fn from(v: i64) -> Self {
        PayloadValue::Number(v as f64)
    }
}

impl From<u32> for PayloadValue {
    fn from(v: u32) -> Self {
        PayloadValue::Number(f64::from(v))
    }
}

impl From<&str> for PayloadValue {
    fn from(v: &str) -> Self {
        PayloadValue::Text(v.to_string())
    }
}

impl From<String> for PayloadValue {
    fn from(v: String) -> Self {
        PayloadValue::Text(v)
    }
}

impl<T: Into<PayloadValue>> From<Vec<T>> for PayloadValue {
    fn from(v: Vec<T>) -> Self {
        PayloadValue::List(v.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for PayloadValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadValue::Bool(b) => write!(f, "{}", b),
            PayloadValue::Number(n) => write!(f, "{}", n),
            PayloadValue::Text(s) => write!(f, "{}", s),
            PayloadValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl FromStr for PayloadValue {
    type Err = std::convert::Infallible;

    /// Parse a command-line value: `true`/`false`, numbers, `[a,b,c]` lists,
    /// anything else as text.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(inner) = trimmed
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
        {
            if inner.trim().is_empty() {
                return Ok(PayloadValue::List(Vec::new()));
            }
            let items = inner
                .split(',')
                .map(|item| item.parse::<PayloadValue>())
                .collect::<std::result::Result<Vec<_>, _>>()?;
            return Ok(PayloadValue::List(items));
        }

        match trimmed {
            "true" => return Ok(PayloadValue::Bool(true)),
            "false" => return Ok(PayloadValue::Bool(false)),
            _ => {}
        }

        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(PayloadValue::Number(n)),
            _ => Ok(PayloadValue::Text(trimmed.to_string())),
        }
    }
}

/// Parse a `key=value` pair into a payload entry.
pub fn parse_payload_entry(entry: &str) -> Result<(String, PayloadValue)> {
    let (key, value) = entry.split_once('=').ok_or_else(|| {
        DojoError::InvalidInput(format!("payload entry '{}' is not key=value", entry))
    })?;

    let key = key.trim();
    if key.is_empty() {
        return Err(DojoError::InvalidInput(format!(
            "payload entry '{}' has an empty key",
            entry
        )));
    }

    // FromStr for PayloadValue never fails
    let value = value.parse::<PayloadValue>().unwrap_or_else(|e| match e {});
    Ok((key.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scalars() {
        assert_eq!("true".parse::<PayloadValue>().unwrap(), PayloadValue::Bool(true));
        assert_eq!("42".parse::<PayloadValue>().unwrap(), PayloadValue::Number(42.0));
        assert_eq!("-1.5".parse::<PayloadValue>().unwrap(), PayloadValue::Number(-1.5));
        assert_eq!(
            "hiragana".parse::<PayloadValue>().unwrap(),
            PayloadValue::Text("hiragana".to_string())
        );
    }

    #[test]
    fn test_parse_non_finite_is_text() {
        assert_eq!(
            "NaN".parse::<PayloadValue>().unwrap(),
            PayloadValue::Text("NaN".to_string())
        );
        assert_eq!(
            "inf".parse::<PayloadValue>().unwrap(),
            PayloadValue::Text("inf".to_string())
        );
    }

    #[test]
    fn test_parse_list() {
        let value = "[a, 2, false]".parse::<PayloadValue>().unwrap();
        assert_eq!(
            value,
            PayloadValue::List(vec![
                PayloadValue::Text("a".to_string()),
                PayloadValue::Number(2.0),
                PayloadValue::Bool(false),
            ])
        );
        assert_eq!(
            "[]".parse::<PayloadValue>().unwrap(),
            PayloadValue::List(vec![])
        );
    }

    #[test]
    fn test_parse_payload_entry() {
        let (k, v) = parse_payload_entry("durationSec=60").unwrap();
        assert_eq!(k, "durationSec");
        assert_eq!(v, PayloadValue::Number(60.0));

        let (k, v) = parse_payload_entry("note=a=b").unwrap();
        assert_eq!(k, "note");
        assert_eq!(v, PayloadValue::Text("a=b".to_string()));
    }

    #[test]
    fn test_parse_payload_entry_errors() {
        assert!(parse_payload_entry("novalue").is_err());
        assert!(parse_payload_entry("=1").is_err());
    }

    #[test]
    fn test_payload_json_shape() {
        let mut map = PayloadMap::new();
        map.insert("lives".to_string(), 3u32.into());
        map.insert("sets".to_string(), vec!["a", "ka"].into());
        map.insert("won".to_string(), true.into());

        let json = serde_json::to_value(&map).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"lives": 3.0, "sets": ["a", "ka"], "won": true})
        );

        let back: PayloadMap = serde_json::from_value(json).unwrap();
        assert_eq!(back, map);
    }

    #[test]
    fn test_payload_integer_json_decodes_as_number() {
        let map: PayloadMap = serde_json::from_str(r#"{"score": 1200}"#).unwrap();
        assert_eq!(map["score"], PayloadValue::Number(1200.0));
    }

    #[test]
    fn test_validate_payload_rejects_non_finite() {
        let mut map = PayloadMap::new();
        map.insert("answersPerSecond".to_string(), 1.5f64.into());
        assert!(validate_payload(&map).is_ok());

        map.insert("rate".to_string(), (0.0f64 / 0.0).into());
        let err = validate_payload(&map).unwrap_err();
        assert!(matches!(err, DojoError::InvalidInput(_)));
        assert!(err.to_string().contains("rate"));

        let mut nested = PayloadMap::new();
        nested.insert(
            "splits".to_string(),
            vec![PayloadValue::Number(1.0), PayloadValue::Number(f64::INFINITY)].into(),
        );
        assert!(validate_payload(&nested).is_err());
    }

    #[test]
    fn test_display() {
        let value: PayloadValue = vec![PayloadValue::Number(1.0), "x".into()].into();
        assert_eq!(value.to_string(), "[1,x]");
    }
}
