//! # Miller 指数
//!
//! 整数三元组 (h, k, l)，通过倒格矢 h·a* + k·b* + l·c* 定义一族晶面。
//!
//! ## 依赖关系
//! - 被 `surface/`, `analyzer.rs`, `interface/`, `cli/` 使用
//! - 使用 `models/structure.rs` 的 Lattice

use crate::error::{InterfaceError, Result};
use crate::math::{gcd3, vec3};
use crate::models::Lattice;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Miller 指数 (h, k, l)，不全为零
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MillerIndex {
    pub h: i32,
    pub k: i32,
    pub l: i32,
}

impl MillerIndex {
    /// 创建 Miller 指数，全零时返回 `InvalidOrientation`
    pub fn new(h: i32, k: i32, l: i32) -> Result<Self> {
        if h == 0 && k == 0 && l == 0 {
            return Err(InterfaceError::InvalidOrientation {
                miller: "(0 0 0)".to_string(),
                reason: "Miller index must not be all zero".to_string(),
            });
        }
        Ok(MillerIndex { h, k, l })
    }

    /// 以数组形式返回
    pub fn as_array(&self) -> [i32; 3] {
        [self.h, self.k, self.l]
    }

    /// 除以公约数后的指数，例如 (2 0 0) -> (1 0 0)
    pub fn reduced(&self) -> MillerIndex {
        let g = gcd3(self.h, self.k, self.l).max(1);
        MillerIndex {
            h: self.h / g,
            k: self.k / g,
            l: self.l / g,
        }
    }

    /// 是否已经是约化形式
    pub fn is_reduced(&self) -> bool {
        gcd3(self.h, self.k, self.l) == 1
    }

    /// 整数倍
    pub fn scaled(&self, factor: i32) -> Result<MillerIndex> {
        MillerIndex::new(self.h * factor, self.k * factor, self.l * factor)
    }

    /// 晶面法向（倒空间，不含 2π）
    ///
    /// 晶格奇异时返回 `None`。
    pub fn normal(&self, lattice: &Lattice) -> Option<Vector3<f64>> {
        let r = lattice.reciprocal()?;
        let n = vec3(r.matrix[0]) * self.h as f64
            + vec3(r.matrix[1]) * self.k as f64
            + vec3(r.matrix[2]) * self.l as f64;
        Some(n)
    }

    /// 紧凑表示，用于文件名，例如 `1-10`
    pub fn compact(&self) -> String {
        format!("{}{}{}", self.h, self.k, self.l)
    }
}

impl fmt::Display for MillerIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} {} {})", self.h, self.k, self.l)
    }
}

impl FromStr for MillerIndex {
    type Err = InterfaceError;

    /// 支持 `1,0,0`、`1 0 0`、`(1 0 0)` 和紧凑的 `100` / `1-10`
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || {
            InterfaceError::InvalidArgument(format!(
                "Invalid Miller index '{}' (use e.g. '1,0,0' or '100')",
                s
            ))
        };

        let trimmed = s.trim().trim_start_matches('(').trim_end_matches(')');
        let parts: Vec<&str> = trimmed
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|p| !p.is_empty())
            .collect();

        let values: Vec<i32> = if parts.len() == 3 {
            parts
                .iter()
                .map(|p| p.parse::<i32>().map_err(|_| invalid()))
                .collect::<Result<_>>()?
        } else if parts.len() == 1 {
            // 紧凑形式：每个数字一位，允许负号
            let mut values = Vec::new();
            let mut negative = false;
            for ch in parts[0].chars() {
                match ch {
                    '-' if !negative => negative = true,
                    d if d.is_ascii_digit() => {
                        let v = d.to_digit(10).ok_or_else(invalid)? as i32;
                        values.push(if negative { -v } else { v });
                        negative = false;
                    }
                    _ => return Err(invalid()),
                }
            }
            values
        } else {
            return Err(invalid());
        };

        if values.len() != 3 {
            return Err(invalid());
        }
        MillerIndex::new(values[0], values[1], values[2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_rejected() {
        assert!(matches!(
            MillerIndex::new(0, 0, 0),
            Err(InterfaceError::InvalidOrientation { .. })
        ));
    }

    #[test]
    fn test_reduced() {
        let m = MillerIndex::new(2, 0, -4).unwrap();
        assert_eq!(m.reduced(), MillerIndex::new(1, 0, -2).unwrap());
        assert!(!m.is_reduced());
        assert!(m.reduced().is_reduced());
    }

    #[test]
    fn test_parse_forms() {
        let expected = MillerIndex::new(1, -1, 0).unwrap();
        assert_eq!("1,-1,0".parse::<MillerIndex>().unwrap(), expected);
        assert_eq!("1 -1 0".parse::<MillerIndex>().unwrap(), expected);
        assert_eq!("(1 -1 0)".parse::<MillerIndex>().unwrap(), expected);
        assert_eq!("1-10".parse::<MillerIndex>().unwrap(), expected);
        assert!("12".parse::<MillerIndex>().is_err());
        assert!("000".parse::<MillerIndex>().is_err());
    }

    #[test]
    fn test_normal_cubic() {
        let lattice = Lattice::cubic(2.0);
        let n = MillerIndex::new(1, 1, 1).unwrap().normal(&lattice).unwrap();
        for i in 0..3 {
            assert!((n[i] - 0.5).abs() < 1e-12);
        }
    }

    #[test]
    fn test_display() {
        let m = MillerIndex::new(1, 1, -2).unwrap();
        assert_eq!(m.to_string(), "(1 1 -2)");
        assert_eq!(m.compact(), "11-2");
    }
}
