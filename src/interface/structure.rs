//! # 界面结构
//!
//! 衬底 slab 与形变后的薄膜 slab 沿法向堆叠得到的结构，
//! 附带生成它的终止面、ZSL 匹配和应变信息。
//!
//! ## 依赖关系
//! - 被 `interface/builder.rs`, `interface/energy.rs`, `export.rs` 使用

use crate::models::{Site, Structure};
use crate::surface::Termination;
use crate::zsl::ZslMatch;

use serde::{Deserialize, Serialize};

/// 共格界面
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interface {
    /// 合并后的结构：衬底位点在前，薄膜位点在后
    pub structure: Structure,
    pub termination: Termination,
    pub zsl_match: ZslMatch,
    /// 在匹配列表中的序号（从 0 开始）
    pub match_index: usize,
    pub match_area: f64,
    pub von_mises_strain: f64,
    /// 薄膜层数（d_hkl 为单位）
    pub film_thickness: usize,
    /// 衬底层数
    pub substrate_thickness: usize,
    /// 界面间隙（Å）
    pub gap: f64,
    /// 薄膜上方真空层（Å）
    pub vacuum_over_film: f64,
    pub substrate_site_count: usize,
}

impl Interface {
    pub fn substrate_sites(&self) -> &[Site] {
        &self.structure.sites[..self.substrate_site_count]
    }

    pub fn film_sites(&self) -> &[Site] {
        &self.structure.sites[self.substrate_site_count..]
    }

    fn heights(&self, sites: &[Site]) -> Vec<f64> {
        sites
            .iter()
            .map(|s| self.structure.lattice.frac_to_cart(s.frac_coords)[2])
            .collect()
    }

    /// 薄膜最低原子与衬底最高原子的法向距离
    pub fn interface_separation(&self) -> f64 {
        let sub_top = self
            .heights(self.substrate_sites())
            .into_iter()
            .fold(f64::NEG_INFINITY, f64::max);
        let film_bottom = self
            .heights(self.film_sites())
            .into_iter()
            .fold(f64::INFINITY, f64::min);
        film_bottom - sub_top
    }

    /// 衬底与薄膜原子之间的最短距离（含周期像）
    pub fn min_interface_distance(&self) -> f64 {
        let n = self.substrate_site_count;
        let mut best = f64::INFINITY;
        for i in 0..n {
            for j in n..self.structure.num_sites() {
                best = best.min(self.structure.distance(i, j));
            }
        }
        best
    }
}
