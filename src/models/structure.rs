//! # 晶体结构数据模型
//!
//! 周期晶格 + 分数坐标原子位点。所有变换都返回新的 `Structure`，
//! 不修改调用方持有的结构。
//!
//! ## 依赖关系
//! - 被 `parsers/`, `surface/`, `interface/` 使用
//! - 使用 `math.rs` 的 nalgebra 转换

use crate::math::{self, from_columns, min_image_diff, to_columns, vec3, wrap_frac3};
use crate::models::MillerIndex;

use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};

/// 晶格参数表示
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lattice {
    /// 晶格向量矩阵 (3x3)，行向量表示 a, b, c
    /// [[a1, a2, a3], [b1, b2, b3], [c1, c2, c3]]
    pub matrix: [[f64; 3]; 3],
}

impl Lattice {
    /// 从晶格参数 (a, b, c, alpha, beta, gamma) 创建晶格
    /// 角度单位：度
    pub fn from_parameters(a: f64, b: f64, c: f64, alpha: f64, beta: f64, gamma: f64) -> Self {
        let cos_alpha = alpha.to_radians().cos();
        let cos_beta = beta.to_radians().cos();
        let cos_gamma = gamma.to_radians().cos();
        let sin_gamma = gamma.to_radians().sin();

        let a_vec = [a, 0.0, 0.0];
        let b_vec = [b * cos_gamma, b * sin_gamma, 0.0];

        let c1 = c * cos_beta;
        let c2 = c * (cos_alpha - cos_beta * cos_gamma) / sin_gamma;
        let c3 = (c * c - c1 * c1 - c2 * c2).sqrt();

        Lattice {
            matrix: [a_vec, b_vec, [c1, c2, c3]],
        }
    }

    /// 从晶格向量矩阵创建
    pub fn from_vectors(matrix: [[f64; 3]; 3]) -> Self {
        Lattice { matrix }
    }

    /// 立方晶格
    pub fn cubic(a: f64) -> Self {
        Self::from_vectors([[a, 0.0, 0.0], [0.0, a, 0.0], [0.0, 0.0, a]])
    }

    /// 六方晶格
    pub fn hexagonal(a: f64, c: f64) -> Self {
        Self::from_parameters(a, a, c, 90.0, 90.0, 120.0)
    }

    /// 晶格常数 (a, b, c)
    pub fn lengths(&self) -> [f64; 3] {
        let m = &self.matrix;
        [vec3(m[0]).norm(), vec3(m[1]).norm(), vec3(m[2]).norm()]
    }

    /// 晶格夹角 (alpha, beta, gamma)，单位：度
    pub fn angles(&self) -> [f64; 3] {
        let [a, b, c] = [
            vec3(self.matrix[0]),
            vec3(self.matrix[1]),
            vec3(self.matrix[2]),
        ];
        let angle = |u: &nalgebra::Vector3<f64>, v: &nalgebra::Vector3<f64>| {
            (u.dot(v) / (u.norm() * v.norm()))
                .clamp(-1.0, 1.0)
                .acos()
                .to_degrees()
        };
        [angle(&b, &c), angle(&a, &c), angle(&a, &b)]
    }

    /// 获取晶格参数 (a, b, c, alpha, beta, gamma)
    pub fn parameters(&self) -> (f64, f64, f64, f64, f64, f64) {
        let [a, b, c] = self.lengths();
        let [alpha, beta, gamma] = self.angles();
        (a, b, c, alpha, beta, gamma)
    }

    /// 计算晶格体积（带符号，右手系为正）
    pub fn volume(&self) -> f64 {
        to_columns(&self.matrix).determinant()
    }

    /// 度规张量 G = L Lᵀ
    pub fn metric(&self) -> Matrix3<f64> {
        let cols = to_columns(&self.matrix);
        cols.transpose() * cols
    }

    /// 倒格矢（不含 2π 因子），行向量 a*, b*, c*
    ///
    /// 满足 a_i · b*_j = δ_ij。晶格奇异时返回 `None`。
    pub fn reciprocal(&self) -> Option<Lattice> {
        let cols = to_columns(&self.matrix);
        // (Lᵀ)⁻¹ 的行就是倒格矢
        let inv = cols.try_inverse()?;
        Some(Lattice::from_vectors([
            [inv[(0, 0)], inv[(0, 1)], inv[(0, 2)]],
            [inv[(1, 0)], inv[(1, 1)], inv[(1, 2)]],
            [inv[(2, 0)], inv[(2, 1)], inv[(2, 2)]],
        ]))
    }

    /// 倒格矢（含 2π 因子）
    pub fn reciprocal_2pi(&self) -> Option<Lattice> {
        let r = self.reciprocal()?;
        let f = 2.0 * std::f64::consts::PI;
        let mut m = r.matrix;
        for row in m.iter_mut() {
            for x in row.iter_mut() {
                *x *= f;
            }
        }
        Some(Lattice::from_vectors(m))
    }

    /// 晶面间距 d_hkl
    pub fn d_spacing(&self, miller: &MillerIndex) -> Option<f64> {
        let n = miller.normal(self)?;
        let norm = n.norm();
        if norm < math::EPS {
            None
        } else {
            Some(1.0 / norm)
        }
    }

    /// 分数坐标转笛卡尔坐标
    pub fn frac_to_cart(&self, frac: [f64; 3]) -> [f64; 3] {
        let m = &self.matrix;
        [
            frac[0] * m[0][0] + frac[1] * m[1][0] + frac[2] * m[2][0],
            frac[0] * m[0][1] + frac[1] * m[1][1] + frac[2] * m[2][1],
            frac[0] * m[0][2] + frac[1] * m[1][2] + frac[2] * m[2][2],
        ]
    }

    /// 笛卡尔坐标转分数坐标（晶格奇异时返回 `None`）
    pub fn cart_to_frac(&self, cart: [f64; 3]) -> Option<[f64; 3]> {
        let inv = to_columns(&self.matrix).try_inverse()?;
        let f = inv * vec3(cart);
        Some([f.x, f.y, f.z])
    }

    /// 对所有晶格矢量施加形变梯度 F（列向量约定：v' = F v）
    pub fn deformed(&self, deformation: &Matrix3<f64>) -> Lattice {
        let cols = deformation * to_columns(&self.matrix);
        Lattice::from_vectors(from_columns(&cols))
    }

    /// 各向同性缩放
    pub fn scaled(&self, factor: f64) -> Lattice {
        self.deformed(&(Matrix3::identity() * factor))
    }

    /// 缩放到指定体积
    pub fn scaled_to_volume(&self, volume: f64) -> Lattice {
        let factor = (volume / self.volume().abs()).cbrt();
        self.scaled(factor)
    }

    /// 在 tol 内判断两个分数坐标是否互为周期像
    pub fn is_periodic_image(&self, a: [f64; 3], b: [f64; 3], tol: f64) -> bool {
        let d = self.frac_to_cart(min_image_diff(a, b));
        (d[0] * d[0] + d[1] * d[1] + d[2] * d[2]).sqrt() < tol
    }
}

/// 原子位点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    /// 元素符号
    pub species: String,

    /// 分数坐标 [x, y, z]，位于 [0, 1)
    pub frac_coords: [f64; 3],

    /// 可选：占据率
    pub occupancy: Option<f64>,
}

impl Site {
    pub fn new(species: impl Into<String>, frac_coords: [f64; 3]) -> Self {
        Site {
            species: species.into(),
            frac_coords: wrap_frac3(frac_coords),
            occupancy: None,
        }
    }

    pub fn with_occupancy(mut self, occupancy: f64) -> Self {
        self.occupancy = Some(occupancy);
        self
    }
}

/// 晶体结构
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Structure {
    /// 结构名称
    pub name: String,

    /// 晶格
    pub lattice: Lattice,

    /// 原子位点列表
    pub sites: Vec<Site>,
}

impl Structure {
    /// 创建结构，分数坐标会折回 [0, 1)
    pub fn new(name: impl Into<String>, lattice: Lattice, sites: Vec<Site>) -> Self {
        let sites = sites
            .into_iter()
            .map(|mut s| {
                s.frac_coords = wrap_frac3(s.frac_coords);
                s
            })
            .collect();
        Structure {
            name: name.into(),
            lattice,
            sites,
        }
    }

    /// 位点数
    pub fn num_sites(&self) -> usize {
        self.sites.len()
    }

    /// 晶胞体积
    pub fn volume(&self) -> f64 {
        self.lattice.volume().abs()
    }

    /// 计算化学式
    pub fn formula(&self) -> String {
        formula_of(self.sites.iter().map(|s| s.species.as_str()))
    }

    /// 约化化学式，例如 Cl4Na4 -> ClNa
    pub fn reduced_formula(&self) -> String {
        let mut counts: std::collections::BTreeMap<&str, usize> = std::collections::BTreeMap::new();
        for s in &self.sites {
            *counts.entry(s.species.as_str()).or_insert(0) += 1;
        }
        let g = counts
            .values()
            .fold(0, |acc, &n| math::gcd(acc, n as i32))
            .max(1) as usize;
        counts
            .into_iter()
            .map(|(el, n)| {
                if n / g == 1 {
                    el.to_string()
                } else {
                    format!("{}{}", el, n / g)
                }
            })
            .collect()
    }

    /// 全部笛卡尔坐标
    pub fn cart_coords(&self) -> Vec<[f64; 3]> {
        self.sites
            .iter()
            .map(|s| self.lattice.frac_to_cart(s.frac_coords))
            .collect()
    }

    /// 两个位点间的最小像距离
    ///
    /// 对斜晶胞逐个检查 27 个相邻像，保证结果是真正的最短距离。
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        let d = min_image_diff(self.sites[i].frac_coords, self.sites[j].frac_coords);
        let mut best = f64::INFINITY;
        for n0 in -1..=1 {
            for n1 in -1..=1 {
                for n2 in -1..=1 {
                    let f = [d[0] + n0 as f64, d[1] + n1 as f64, d[2] + n2 as f64];
                    let c = self.lattice.frac_to_cart(f);
                    let r = (c[0] * c[0] + c[1] * c[1] + c[2] * c[2]).sqrt();
                    best = best.min(r);
                }
            }
        }
        best
    }

    /// 最近原子间距（少于两个位点时为 `None`）
    pub fn min_interatomic_distance(&self) -> Option<f64> {
        let n = self.sites.len();
        if n < 2 {
            return None;
        }
        let mut best = f64::INFINITY;
        for i in 0..n {
            for j in (i + 1)..n {
                best = best.min(self.distance(i, j));
            }
        }
        Some(best)
    }

    /// 施加形变梯度 F：晶格变形，分数坐标保持不变
    pub fn transformed(&self, deformation: &Matrix3<f64>) -> Structure {
        Structure {
            name: self.name.clone(),
            lattice: self.lattice.deformed(deformation),
            sites: self.sites.clone(),
        }
    }

    /// 各向同性缩放
    pub fn scaled(&self, factor: f64) -> Structure {
        self.transformed(&(Matrix3::identity() * factor))
    }

    /// 整数超胞：新基矢 = T · 原基矢（按行）
    ///
    /// det T = 0，或枚举出的位点数与 |det T| · N 不符时返回 `None`。
    pub fn supercell(&self, t: &[[i32; 3]; 3]) -> Option<Structure> {
        let det = math::int_det(t);
        if det == 0 {
            return None;
        }
        let tm = math::int_matrix(t);
        let new_cols = to_columns(&self.lattice.matrix) * tm.transpose();
        let lattice = Lattice::from_vectors(from_columns(&new_cols));
        // f' = T⁻ᵀ (f + n)
        let inv_t = tm.transpose().try_inverse()?;

        // 超胞顶点在原分数坐标下的包围盒
        let mut lo = [0i32; 3];
        let mut hi = [0i32; 3];
        for mask in 0..8 {
            let mut corner = [0i32; 3];
            for (row, vector) in t.iter().enumerate() {
                if mask & (1 << row) != 0 {
                    for k in 0..3 {
                        corner[k] += vector[k];
                    }
                }
            }
            for k in 0..3 {
                lo[k] = lo[k].min(corner[k]);
                hi[k] = hi[k].max(corner[k]);
            }
        }

        let tol = 1e-8;
        let mut sites = Vec::with_capacity(self.sites.len() * det.unsigned_abs() as usize);
        for site in &self.sites {
            for n0 in lo[0]..=hi[0] {
                for n1 in lo[1]..=hi[1] {
                    for n2 in lo[2]..=hi[2] {
                        let f = site.frac_coords;
                        let g = inv_t * vec3([f[0] + n0 as f64, f[1] + n1 as f64, f[2] + n2 as f64]);
                        if [g.x, g.y, g.z].iter().all(|&x| x >= -tol && x < 1.0 - tol) {
                            sites.push(Site {
                                species: site.species.clone(),
                                frac_coords: wrap_frac3([g.x, g.y, g.z]),
                                occupancy: site.occupancy,
                            });
                        }
                    }
                }
            }
        }

        if sites.len() != self.sites.len() * det.unsigned_abs() as usize {
            log::warn!(
                "Supercell of {} gave {} sites, expected {}",
                self.formula(),
                sites.len(),
                self.sites.len() * det.unsigned_abs() as usize
            );
            return None;
        }

        Some(Structure {
            name: self.name.clone(),
            lattice,
            sites,
        })
    }

    /// 按位点列表判断两结构是否等价（顺序无关，允许周期像）
    pub fn matches_sites(&self, other: &Structure, tol: f64) -> bool {
        if self.sites.len() != other.sites.len() {
            return false;
        }
        self.sites.iter().all(|s| {
            other.sites.iter().any(|o| {
                o.species == s.species
                    && self
                        .lattice
                        .is_periodic_image(s.frac_coords, o.frac_coords, tol)
            })
        })
    }
}

/// 由元素序列生成按字母序排列的化学式
pub fn formula_of<'a>(species: impl Iterator<Item = &'a str>) -> String {
    use std::collections::BTreeMap;
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();

    for el in species {
        *counts.entry(el).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .map(|(el, count)| {
            if count == 1 {
                el.to_string()
            } else {
                format!("{}{}", el, count)
            }
        })
        .collect::<Vec<_>>()
        .join("")
}
