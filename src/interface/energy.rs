//! # 界面能量排序
//!
//! 可插拔的势能评估接口。核心库不提供具体实现，调用方可以接入
//! 经验势、机器学习势或外部 DFT 计算，对生成的界面做事后排序。
//!
//! ## 依赖关系
//! - 被 `commands/build.rs` 调用（可选）
//! - 使用 `interface/structure.rs`

use crate::error::Result;
use crate::models::Structure;

use super::Interface;

/// 势能评估器
pub trait EnergyEvaluator {
    /// 返回结构的总能量（eV）
    fn evaluate(&self, structure: &Structure) -> Result<f64>;

    fn name(&self) -> &str {
        "custom"
    }
}

impl<F> EnergyEvaluator for F
where
    F: Fn(&Structure) -> Result<f64>,
{
    fn evaluate(&self, structure: &Structure) -> Result<f64> {
        self(structure)
    }
}

/// 带能量的界面
#[derive(Debug, Clone)]
pub struct RankedInterface {
    pub interface: Interface,
    pub energy: f64,
}

impl RankedInterface {
    /// 每平方埃界面面积的能量
    pub fn energy_per_area(&self) -> f64 {
        self.energy / self.interface.match_area
    }
}

/// 逐个评估界面能量并按能量升序排列
///
/// 评估失败或能量非有限值的界面记录警告后丢弃。
pub fn rank_by_energy<I, E, F>(interfaces: I, evaluator: &E, mut progress: F) -> Vec<RankedInterface>
where
    I: IntoIterator<Item = Interface>,
    E: EnergyEvaluator + ?Sized,
    F: FnMut(usize),
{
    let mut ranked = Vec::new();
    for (i, interface) in interfaces.into_iter().enumerate() {
        match evaluator.evaluate(&interface.structure) {
            Ok(energy) if energy.is_finite() => ranked.push(RankedInterface { interface, energy }),
            Ok(energy) => log::warn!(
                "Interface #{} skipped: {} returned non-finite energy {}",
                interface.match_index,
                evaluator.name(),
                energy
            ),
            Err(e) => log::warn!(
                "Interface #{} skipped: {} failed: {}",
                interface.match_index,
                evaluator.name(),
                e
            ),
        }
        progress(i + 1);
    }

    ranked.sort_by(|a, b| {
        a.energy
            .partial_cmp(&b.energy)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InterfaceError;
    use crate::interface::CoherentInterfaceBuilder;
    use crate::models::{fixtures, MillerIndex};

    fn interfaces() -> Vec<Interface> {
        let al = fixtures::fcc("Al", 4.05);
        let sic = fixtures::zincblende("Si", "C", 4.36);
        let m = MillerIndex::new(1, 0, 0).unwrap();
        let builder = CoherentInterfaceBuilder::create(&al, &sic, m, m, 200.0).unwrap();
        let term = builder.terminations()[0].clone();
        builder
            .produce_interfaces(&term, 1, 1, 2.0, Some(3))
            .unwrap()
            .collect()
    }

    #[test]
    fn test_rank_by_site_count() {
        let list = interfaces();
        let n = list.len();
        // 原子越多能量越低
        let evaluator = |s: &Structure| -> Result<f64> { Ok(-(s.num_sites() as f64)) };
        let mut calls = 0;
        let ranked = rank_by_energy(list, &evaluator, |_| calls += 1);
        assert_eq!(ranked.len(), n);
        assert_eq!(calls, n);
        for w in ranked.windows(2) {
            assert!(w[0].energy <= w[1].energy);
            assert!(w[0].interface.structure.num_sites() >= w[1].interface.structure.num_sites());
        }
    }

    #[test]
    fn test_failed_evaluations_are_dropped() {
        let list = interfaces();
        let evaluator = |s: &Structure| -> Result<f64> {
            if s.num_sites() % 2 == 0 {
                Err(InterfaceError::Other("calculator crashed".to_string()))
            } else {
                Ok(f64::NAN)
            }
        };
        assert!(rank_by_energy(list, &evaluator, |_| {}).is_empty());
    }
}
