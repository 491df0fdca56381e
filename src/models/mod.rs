//! # 数据模型模块
//!
//! 定义晶格、晶体结构和 Miller 指数。
//!
//! ## 依赖关系
//! - 被 `parsers/`, `surface/`, `zsl/`, `interface/` 使用
//! - 子模块: structure, miller

pub mod miller;
pub mod structure;

pub use miller::MillerIndex;
pub use structure::{formula_of, Lattice, Site, Structure};

/// 测试用的常见晶体结构
#[cfg(test)]
pub(crate) mod fixtures {
    use super::{Lattice, Site, Structure};

    /// 简单立方，单原子
    pub fn simple_cubic(element: &str, a: f64) -> Structure {
        Structure::new(
            element,
            Lattice::cubic(a),
            vec![Site::new(element, [0.0, 0.0, 0.0])],
        )
    }

    /// 面心立方惯用胞（4 原子）
    pub fn fcc(element: &str, a: f64) -> Structure {
        Structure::new(
            element,
            Lattice::cubic(a),
            vec![
                Site::new(element, [0.0, 0.0, 0.0]),
                Site::new(element, [0.5, 0.5, 0.0]),
                Site::new(element, [0.5, 0.0, 0.5]),
                Site::new(element, [0.0, 0.5, 0.5]),
            ],
        )
    }

    /// 岩盐结构惯用胞（8 原子）
    pub fn rocksalt(cation: &str, anion: &str, a: f64) -> Structure {
        Structure::new(
            format!("{}{}", cation, anion),
            Lattice::cubic(a),
            vec![
                Site::new(cation, [0.0, 0.0, 0.0]),
                Site::new(cation, [0.5, 0.5, 0.0]),
                Site::new(cation, [0.5, 0.0, 0.5]),
                Site::new(cation, [0.0, 0.5, 0.5]),
                Site::new(anion, [0.5, 0.0, 0.0]),
                Site::new(anion, [0.0, 0.5, 0.0]),
                Site::new(anion, [0.0, 0.0, 0.5]),
                Site::new(anion, [0.5, 0.5, 0.5]),
            ],
        )
    }

    /// 闪锌矿结构惯用胞（8 原子），例如 3C-SiC
    pub fn zincblende(cation: &str, anion: &str, a: f64) -> Structure {
        Structure::new(
            format!("{}{}", cation, anion),
            Lattice::cubic(a),
            vec![
                Site::new(cation, [0.0, 0.0, 0.0]),
                Site::new(cation, [0.5, 0.5, 0.0]),
                Site::new(cation, [0.5, 0.0, 0.5]),
                Site::new(cation, [0.0, 0.5, 0.5]),
                Site::new(anion, [0.25, 0.25, 0.25]),
                Site::new(anion, [0.75, 0.75, 0.25]),
                Site::new(anion, [0.75, 0.25, 0.75]),
                Site::new(anion, [0.25, 0.75, 0.75]),
            ],
        )
    }

    /// 六方密堆（2 原子）
    pub fn hcp(element: &str, a: f64, c: f64) -> Structure {
        Structure::new(
            element,
            Lattice::hexagonal(a, c),
            vec![
                Site::new(element, [1.0 / 3.0, 2.0 / 3.0, 0.25]),
                Site::new(element, [2.0 / 3.0, 1.0 / 3.0, 0.75]),
            ],
        )
    }
}
