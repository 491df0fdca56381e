//! # 表面终止面
//!
//! - `SurfaceTermination`: 单侧的切割位置（沿法向的分数 shift）
//! - `Termination`: 薄膜 / 衬底两侧终止面的组合
//! - `TerminationPolicy`: 判断某个终止面是否可用的谓词（例如排除极性表面）
//!
//! ## 依赖关系
//! - 被 `surface/slab.rs`, `interface/builder.rs` 使用
//! - 使用 `surface/slab.rs` 的 Slab

use crate::surface::Slab;

use serde::{Deserialize, Serialize};
use std::fmt;

/// 单侧表面终止面
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceTermination {
    /// 切割位置（取向晶胞分数坐标，量化到 1e-6）
    pub shift: f64,
    /// 标签，例如 `Na2Cl2_1`
    pub label: String,
    /// 切面之下最外层（上表面）的化学式
    pub top_layer: String,
    /// 切面之上最外层（下表面）的化学式
    pub bottom_layer: String,
    /// 被合并到此代表上的对称等价 shift
    pub equivalent_shifts: Vec<f64>,
}

impl fmt::Display for SurfaceTermination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (shift {:.4})", self.label, self.shift)
    }
}

impl SurfaceTermination {
    /// 改用下表面命名（薄膜以下表面与衬底接触），序号不变
    pub fn facing_down(mut self) -> Self {
        let ordinal = self.label.rsplit('_').next().unwrap_or("1").to_string();
        self.label = format!("{}_{}", self.bottom_layer, ordinal);
        self
    }
}

/// 薄膜 / 衬底终止面组合
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Termination {
    pub film: SurfaceTermination,
    pub substrate: SurfaceTermination,
}

impl Termination {
    /// (film_shift, substrate_shift)
    pub fn shifts(&self) -> (f64, f64) {
        (self.film.shift, self.substrate.shift)
    }

    /// 组合标签
    pub fn label(&self) -> String {
        format!("{}/{}", self.film.label, self.substrate.label)
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Film: {} [{} at interface], Substrate: {} [{} at interface]",
            self.film.label, self.film.bottom_layer, self.substrate.label, self.substrate.top_layer
        )
    }
}

/// 终止面筛选谓词
pub trait TerminationPolicy: Send + Sync {
    /// 是否接受由该终止面切出的 slab
    fn accepts(&self, slab: &Slab) -> bool;

    /// 名称（用于日志）
    fn name(&self) -> &str {
        "custom"
    }
}

/// 接受所有终止面
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl TerminationPolicy for AcceptAll {
    fn accepts(&self, _slab: &Slab) -> bool {
        true
    }

    fn name(&self) -> &str {
        "accept-all"
    }
}

/// 只接受非极性终止面：原子层序列从两侧读起相同
#[derive(Debug, Clone, Copy)]
pub struct NonPolar {
    /// 原子层聚类容差（Å）
    pub layer_tolerance: f64,
}

impl Default for NonPolar {
    fn default() -> Self {
        NonPolar {
            layer_tolerance: 0.1,
        }
    }
}

impl TerminationPolicy for NonPolar {
    fn accepts(&self, slab: &Slab) -> bool {
        let layers = slab.layer_sequence(self.layer_tolerance);
        let reversed: Vec<String> = layers.iter().rev().cloned().collect();
        layers == reversed
    }

    fn name(&self) -> &str {
        "non-polar"
    }
}

impl<F> TerminationPolicy for F
where
    F: Fn(&Slab) -> bool + Send + Sync,
{
    fn accepts(&self, slab: &Slab) -> bool {
        self(slab)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{fixtures, MillerIndex};
    use crate::surface::SlabGenerator;

    fn term(label: &str, shift: f64) -> SurfaceTermination {
        SurfaceTermination {
            shift,
            label: label.to_string(),
            top_layer: "Na".to_string(),
            bottom_layer: "Cl".to_string(),
            equivalent_shifts: vec![shift],
        }
    }

    #[test]
    fn test_termination_label_and_shifts() {
        let t = Termination {
            film: term("Cl_1", 0.25),
            substrate: term("Na_2", 0.75),
        };
        assert_eq!(t.shifts(), (0.25, 0.75));
        assert_eq!(t.label(), "Cl_1/Na_2");
        assert!(t.to_string().contains("Substrate: Na_2"));
    }

    #[test]
    fn test_facing_down_names_bottom_layer() {
        let t = term("Na_2", 0.75).facing_down();
        assert_eq!(t.label, "Cl_2");
        assert_eq!(t.top_layer, "Na");
        assert_eq!(t.shift, 0.75);
    }

    #[test]
    fn test_non_polar_rejects_zincblende_111() {
        // 闪锌矿 (111) 是典型的极性表面
        let s = fixtures::zincblende("Si", "C", 4.36);
        let gen = SlabGenerator::new(&s, MillerIndex::new(1, 1, 1).unwrap(), Default::default())
            .unwrap();
        let polar = NonPolar::default();
        for shift in gen.shifts() {
            let slab = gen.build_slab(shift, 2, 10.0).unwrap();
            assert!(!polar.accepts(&slab));
            assert!(AcceptAll.accepts(&slab));
        }
    }

    #[test]
    fn test_non_polar_accepts_rocksalt_100() {
        let s = fixtures::rocksalt("Na", "Cl", 5.64);
        let gen = SlabGenerator::new(&s, MillerIndex::new(1, 0, 0).unwrap(), Default::default())
            .unwrap();
        let shift = gen.shifts()[0];
        let slab = gen.build_slab(shift, 2, 10.0).unwrap();
        assert!(NonPolar::default().accepts(&slab));
    }

    #[test]
    fn test_closure_policy() {
        let s = fixtures::rocksalt("Na", "Cl", 5.64);
        let gen = SlabGenerator::new(&s, MillerIndex::new(1, 0, 0).unwrap(), Default::default())
            .unwrap();
        let slab = gen.build_slab(gen.shifts()[0], 1, 5.0).unwrap();
        let few_atoms = |slab: &Slab| slab.structure.num_sites() < 4;
        assert!(!few_atoms.accepts(&slab));
    }
}
