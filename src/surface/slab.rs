//! # Slab 生成器
//!
//! 由体相结构和 Miller 指数生成取向晶胞、枚举终止面并构造 slab。
//!
//! ## 算法概述
//! 1. 取向晶胞（`surface/orient.rs`）：c 轴高度恰为 d_hkl
//! 2. 沿法向对原子高度做周期聚类得到原子层，相邻层中点即候选切割位置 shift
//! 3. 用体相对称操作（换到取向基下、保持法向高度的那部分）合并等价 shift
//! 4. 通过 `TerminationPolicy` 过滤终止面
//! 5. slab = N 个取向晶胞沿法向堆叠 + 真空层，c 轴垂直于表面
//!
//! ## 依赖关系
//! - 被 `analyzer.rs`, `interface/builder.rs`, `commands/` 调用
//! - 使用 `surface/orient.rs`, `surface/symmetry.rs`, `surface/termination.rs`
//! - 使用 `zsl/lattice2d.rs` 的 Lattice2D 表示面内晶格

use crate::error::{InterfaceError, Result};
use crate::math::{quantize, wrap_frac};
use crate::models::{formula_of, Lattice, MillerIndex, Site, Structure};
use crate::surface::orient::{oriented_cell, OrientedCell};
use crate::surface::symmetry::find_symmetry_operations;
use crate::surface::termination::{AcceptAll, SurfaceTermination, TerminationPolicy};
use crate::zsl::Lattice2D;

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// shift 量化步长
const SHIFT_QUANTUM: f64 = 1e-6;

/// 构造终止面候选 slab 时使用的真空层厚度（Å）
const PROBE_VACUUM: f64 = 10.0;

/// Slab 生成参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlabConfig {
    /// 原子层聚类容差（Å）
    pub layer_tolerance: f64,
    /// 对称操作搜索容差（Å）
    pub symprec: f64,
    /// 单个 slab 允许的最大原子数
    pub max_slab_sites: usize,
}

impl Default for SlabConfig {
    fn default() -> Self {
        SlabConfig {
            layer_tolerance: 0.1,
            symprec: 0.01,
            max_slab_sites: 20_000,
        }
    }
}

impl SlabConfig {
    /// 参数检查
    pub fn validate(&self) -> Result<()> {
        if self.layer_tolerance <= 0.0 || self.symprec <= 0.0 {
            return Err(InterfaceError::InvalidArgument(
                "layer_tolerance and symprec must be positive".to_string(),
            ));
        }
        if self.max_slab_sites == 0 {
            return Err(InterfaceError::InvalidArgument(
                "max_slab_sites must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// 表面 slab
#[derive(Debug, Clone)]
pub struct Slab {
    /// slab 结构（c 轴垂直于表面，含真空层）
    pub structure: Structure,
    /// 原始体相结构
    pub bulk: Structure,
    /// 请求的 Miller 指数
    pub miller: MillerIndex,
    /// 切割位置
    pub shift: f64,
    /// 层数（取向晶胞个数，每层厚度 d_hkl）
    pub layers: usize,
    /// 真空层厚度（Å）
    pub vacuum: f64,
    /// 晶面间距 d_hkl（Å）
    pub d_spacing: f64,
}

impl Slab {
    /// 面内晶格
    pub fn in_plane_lattice(&self) -> Lattice2D {
        Lattice2D::from_lattice(&self.structure.lattice)
    }

    /// 面内面积（Å²）
    pub fn surface_area(&self) -> f64 {
        self.in_plane_lattice().area()
    }

    /// 原子沿法向的笛卡尔高度
    pub fn heights(&self) -> Vec<f64> {
        self.structure.cart_coords().iter().map(|c| c[2]).collect()
    }

    /// 原子层的总厚度（最高原子与最低原子之差）
    pub fn thickness(&self) -> f64 {
        let z = self.heights();
        let max = z.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let min = z.iter().cloned().fold(f64::INFINITY, f64::min);
        if z.is_empty() {
            0.0
        } else {
            max - min
        }
    }

    /// 由下至上的原子层化学式序列
    pub fn layer_sequence(&self, tolerance: f64) -> Vec<String> {
        let z = self.heights();
        let mut order: Vec<usize> = (0..z.len()).collect();
        order.sort_by(|&a, &b| z[a].partial_cmp(&z[b]).unwrap_or(std::cmp::Ordering::Equal));

        let mut layers: Vec<Vec<&str>> = Vec::new();
        let mut last_z = f64::NEG_INFINITY;
        for i in order {
            let species = self.structure.sites[i].species.as_str();
            if z[i] - last_z > tolerance || layers.is_empty() {
                layers.push(vec![species]);
            } else if let Some(layer) = layers.last_mut() {
                layer.push(species);
            }
            last_z = z[i];
        }

        layers
            .into_iter()
            .map(|l| formula_of(l.into_iter()))
            .collect()
    }
}

/// Slab 生成器
#[derive(Clone)]
pub struct SlabGenerator {
    bulk: Structure,
    miller: MillerIndex,
    config: SlabConfig,
    oriented: OrientedCell,
    policy: Arc<dyn TerminationPolicy>,
}

impl std::fmt::Debug for SlabGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlabGenerator")
            .field("miller", &self.miller)
            .field("config", &self.config)
            .field("policy", &self.policy.name())
            .finish()
    }
}

impl SlabGenerator {
    /// 创建 slab 生成器
    ///
    /// 体相无原子时返回 `InsufficientBulk`，Miller 指数退化时返回 `InvalidOrientation`。
    pub fn new(bulk: &Structure, miller: MillerIndex, config: SlabConfig) -> Result<Self> {
        config.validate()?;
        if bulk.sites.is_empty() {
            return Err(InterfaceError::InsufficientBulk {
                reason: format!("bulk structure '{}' has no sites", bulk.name),
            });
        }
        let oriented = oriented_cell(bulk, &miller)?;
        Ok(SlabGenerator {
            bulk: bulk.clone(),
            miller,
            config,
            oriented,
            policy: Arc::new(AcceptAll),
        })
    }

    /// 设置终止面筛选策略
    pub fn with_policy<P: TerminationPolicy + 'static>(mut self, policy: P) -> Self {
        self.policy = Arc::new(policy);
        self
    }

    /// 共享的策略对象
    pub fn with_shared_policy(mut self, policy: Arc<dyn TerminationPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn miller(&self) -> MillerIndex {
        self.miller
    }

    pub fn bulk(&self) -> &Structure {
        &self.bulk
    }

    pub fn config(&self) -> &SlabConfig {
        &self.config
    }

    /// 取向晶胞
    pub fn oriented_cell(&self) -> &OrientedCell {
        &self.oriented
    }

    /// 取向晶胞的面内二维晶格（用于 ZSL 匹配）
    pub fn in_plane_lattice(&self) -> Lattice2D {
        Lattice2D::from_lattice(&self.oriented.structure.lattice)
    }

    /// 候选切割位置（取向晶胞分数坐标，升序、去重）
    pub fn shifts(&self) -> Vec<f64> {
        let tol = self.config.layer_tolerance / self.oriented.d_spacing;
        let centers = layer_centers(&self.oriented.structure, tol);

        let mut shifts: Vec<f64> = if centers.len() == 1 {
            vec![wrap_frac(centers[0] + 0.5)]
        } else {
            (0..centers.len())
                .map(|i| {
                    let next = if i + 1 < centers.len() {
                        centers[i + 1]
                    } else {
                        centers[0] + 1.0
                    };
                    wrap_frac(0.5 * (centers[i] + next))
                })
                .collect()
        };

        for s in shifts.iter_mut() {
            *s = quantize(*s, SHIFT_QUANTUM) as f64 * SHIFT_QUANTUM;
            if *s >= 1.0 {
                *s = 0.0;
            }
        }
        shifts.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        shifts.dedup_by_key(|s| quantize(*s, SHIFT_QUANTUM));
        shifts
    }

    /// 枚举对称不等价且被策略接受的终止面
    pub fn generate_terminations(&self, min_layers: usize) -> Result<Vec<SurfaceTermination>> {
        if min_layers == 0 {
            return Err(InterfaceError::InvalidArgument(
                "min_layers must be at least 1".to_string(),
            ));
        }

        let shifts = self.shifts();
        let groups = self.group_equivalent_shifts(&shifts);

        let mut terminations = Vec::new();
        for group in groups {
            let shift = group[0];
            let slab = self.build_slab(shift, min_layers, PROBE_VACUUM)?;
            if !self.policy.accepts(&slab) {
                log::debug!(
                    "{} termination at shift {:.4} rejected by policy '{}'",
                    self.miller,
                    shift,
                    self.policy.name()
                );
                continue;
            }

            let sequence = slab.layer_sequence(self.config.layer_tolerance);
            let top_layer = sequence.last().cloned().unwrap_or_default();
            let bottom_layer = sequence.first().cloned().unwrap_or_default();
            terminations.push(SurfaceTermination {
                shift,
                label: format!("{}_{}", top_layer, terminations.len() + 1),
                top_layer,
                bottom_layer,
                equivalent_shifts: group,
            });
        }

        log::info!(
            "{} {}: {} shift(s), {} distinct termination(s)",
            self.bulk.formula(),
            self.miller,
            shifts.len(),
            terminations.len()
        );
        Ok(terminations)
    }

    /// 构造 slab
    ///
    /// `shift` 为切割位置，`layers` 为取向晶胞个数，`vacuum` 为真空层厚度（Å）。
    pub fn build_slab(&self, shift: f64, layers: usize, vacuum: f64) -> Result<Slab> {
        if layers == 0 {
            return Err(InterfaceError::InvalidArgument(
                "slab thickness must be at least 1 layer".to_string(),
            ));
        }
        if !(vacuum >= 0.0) {
            return Err(InterfaceError::InvalidArgument(format!(
                "vacuum must be non-negative, got {}",
                vacuum
            )));
        }
        let cell = &self.oriented.structure;
        let total_sites = layers.saturating_mul(cell.num_sites());
        if total_sites > self.config.max_slab_sites {
            return Err(InterfaceError::InsufficientBulk {
                reason: format!(
                    "{} layers of {} {} would need {} sites (limit {})",
                    layers,
                    self.bulk.formula(),
                    self.miller,
                    total_sites,
                    self.config.max_slab_sites
                ),
            });
        }

        let d = self.oriented.d_spacing;
        let m = cell.lattice.matrix;
        let height = layers as f64 * d + vacuum;
        let slab_lattice = Lattice::from_vectors([m[0], m[1], [0.0, 0.0, height]]);

        let mut sites = Vec::with_capacity(total_sites);
        for layer in 0..layers {
            for site in &cell.sites {
                let f = site.frac_coords;
                let z = wrap_frac(f[2] - shift) + layer as f64;
                let cart = cell.lattice.frac_to_cart([f[0], f[1], z]);
                let frac = slab_lattice.cart_to_frac(cart).ok_or_else(|| {
                    InterfaceError::Other("singular slab lattice".to_string())
                })?;
                sites.push(Site {
                    species: site.species.clone(),
                    frac_coords: [wrap_frac(frac[0]), wrap_frac(frac[1]), frac[2]],
                    occupancy: site.occupancy,
                });
            }
        }

        let structure = Structure {
            name: format!("{} {} slab", self.bulk.formula(), self.miller),
            lattice: slab_lattice,
            sites,
        };

        Ok(Slab {
            structure,
            bulk: self.bulk.clone(),
            miller: self.miller,
            shift,
            layers,
            vacuum,
            d_spacing: d,
        })
    }

    /// 用保持法向高度的对称操作合并等价 shift
    fn group_equivalent_shifts(&self, shifts: &[f64]) -> Vec<Vec<f64>> {
        let ops = find_symmetry_operations(&self.bulk, self.config.symprec);
        let tz: Vec<f64> = ops
            .iter()
            .filter_map(|op| op.in_basis(&self.oriented.transformation))
            .filter(|op| op.rotation[2] == [0, 0, 1])
            .map(|op| op.translation[2])
            .collect();

        let tol = self.config.layer_tolerance / self.oriented.d_spacing;
        let mut group_of: Vec<Option<usize>> = vec![None; shifts.len()];
        let mut groups: Vec<Vec<f64>> = Vec::new();

        for i in 0..shifts.len() {
            if group_of[i].is_some() {
                continue;
            }
            let g = groups.len();
            group_of[i] = Some(g);
            let mut members = vec![shifts[i]];
            for j in (i + 1)..shifts.len() {
                if group_of[j].is_some() {
                    continue;
                }
                let equivalent = tz.iter().any(|t| {
                    let d = shifts[i] + t - shifts[j];
                    (d - d.round()).abs() < tol
                });
                if equivalent {
                    group_of[j] = Some(g);
                    members.push(shifts[j]);
                }
            }
            groups.push(members);
        }
        groups
    }
}

/// 沿 c 方向对原子分数高度做周期聚类，返回升序的层中心
fn layer_centers(cell: &Structure, tol: f64) -> Vec<f64> {
    let mut z: Vec<f64> = cell.sites.iter().map(|s| wrap_frac(s.frac_coords[2])).collect();
    if z.is_empty() {
        return Vec::new();
    }
    z.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mut clusters: Vec<Vec<f64>> = vec![vec![z[0]]];
    for &v in &z[1..] {
        let last = clusters.last().and_then(|c| c.last()).copied().unwrap_or(v);
        if v - last <= tol {
            if let Some(c) = clusters.last_mut() {
                c.push(v);
            }
        } else {
            clusters.push(vec![v]);
        }
    }

    // 首尾跨越周期边界时合并
    if clusters.len() > 1 {
        let first = clusters[0][0];
        let last = *clusters[clusters.len() - 1].last().unwrap_or(&first);
        if first + 1.0 - last <= tol {
            let tail = clusters.pop().unwrap_or_default();
            let head = &mut clusters[0];
            head.extend(tail.into_iter().map(|v| v - 1.0));
        }
    }

    let mut centers: Vec<f64> = clusters
        .iter()
        .map(|c| wrap_frac(c.iter().sum::<f64>() / c.len() as f64))
        .collect();
    centers.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    centers
}

/// 使用默认参数枚举终止面
pub fn generate_terminations(
    bulk: &Structure,
    miller: MillerIndex,
    min_layers: usize,
) -> Result<Vec<SurfaceTermination>> {
    SlabGenerator::new(bulk, miller, SlabConfig::default())?.generate_terminations(min_layers)
}

/// 使用默认参数构造 slab
pub fn build_slab(
    bulk: &Structure,
    miller: MillerIndex,
    shift: f64,
    layers: usize,
    vacuum: f64,
) -> Result<Slab> {
    SlabGenerator::new(bulk, miller, SlabConfig::default())?.build_slab(shift, layers, vacuum)
}
