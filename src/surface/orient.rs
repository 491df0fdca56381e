//! # 表面取向晶胞
//!
//! 对给定 Miller 指数构造取向晶胞：a、b 在晶面内，c 沿法向分量最小的格矢。
//!
//! ## 算法概述
//! 1. 约化 Miller 指数，计算法向 n = h·a* + k·b* + l·c*
//! 2. 在整数格点中寻找满足 h·u = 0 的两个向量，要求叉积 = ±(h, k, l)，
//!    保证它们是面内二维子格的本原基
//! 3. 在笛卡尔度规下做 Gauss 约化，得到最短面内基
//! 4. 寻找满足 h·w = 1 的第三个向量（高度恰为一个 d_hkl），并尽量减小其面内分量
//! 5. 变换矩阵 P 的行 (v1, v2, w) 满足 |det P| = 1，晶胞原子数不变
//! 6. 旋转到标准取向：a 沿 x，b 在 xy 面内，法向沿 +z
//!
//! ## 依赖关系
//! - 被 `surface/slab.rs` 调用
//! - 使用 `models/`, `math.rs`

use crate::error::{InterfaceError, Result};
use crate::math::{arr3, int_matrix, vec3, wrap_frac3, EPS};
use crate::models::{Lattice, MillerIndex, Site, Structure};

use nalgebra::{Vector2, Vector3};

/// 取向晶胞
#[derive(Debug, Clone)]
pub struct OrientedCell {
    /// 约化后的 Miller 指数
    pub miller: MillerIndex,
    /// 整数变换矩阵，行向量为体相基下的 (v1, v2, w)
    pub transformation: [[i32; 3]; 3],
    /// 标准取向下的取向晶胞
    pub structure: Structure,
    /// 晶面间距 d_hkl（= 取向晶胞高度）
    pub d_spacing: f64,
}

impl OrientedCell {
    /// 面内二维基矢 (a, b)
    pub fn in_plane_vectors(&self) -> [Vector2<f64>; 2] {
        let m = &self.structure.lattice.matrix;
        [Vector2::new(m[0][0], m[0][1]), Vector2::new(m[1][0], m[1][1])]
    }

    /// 面内原胞面积
    pub fn surface_area(&self) -> f64 {
        let [a, b] = self.in_plane_vectors();
        (a.x * b.y - a.y * b.x).abs()
    }
}

/// 构造取向晶胞
pub fn oriented_cell(bulk: &Structure, miller: &MillerIndex) -> Result<OrientedCell> {
    let reduced = miller.reduced();
    let hkl = reduced.as_array();
    let invalid = |reason: &str| InterfaceError::InvalidOrientation {
        miller: miller.to_string(),
        reason: reason.to_string(),
    };

    let lattice = &bulk.lattice;
    let normal = reduced
        .normal(lattice)
        .ok_or_else(|| invalid("bulk lattice is singular"))?;
    if normal.norm() < EPS {
        return Err(invalid("zero-length surface normal"));
    }
    let d_spacing = 1.0 / normal.norm();

    let to_cart = |u: &[i32; 3]| -> Vector3<f64> {
        let m = &lattice.matrix;
        vec3(m[0]) * u[0] as f64 + vec3(m[1]) * u[1] as f64 + vec3(m[2]) * u[2] as f64
    };

    let max_index = hkl.iter().map(|x| x.abs()).max().unwrap_or(1);

    // 面内本原基
    let (mut v1, mut v2) = find_in_plane_basis(&hkl, max_index, &to_cart)
        .ok_or_else(|| invalid("no primitive in-plane basis found"))?;
    gauss_reduce(&mut v1, &mut v2, &to_cart);

    // 第三个向量
    let mut w = find_out_of_plane(&hkl, max_index)
        .ok_or_else(|| invalid("no lattice vector with unit normal component"))?;
    reduce_in_plane_component(&mut w, &v1, &v2, &to_cart);

    // 手性：det P 与体相晶格手性一致，取向晶胞为右手系
    let cross = int_cross(&v1, &v2);
    let s = if cross == hkl { 1 } else { -1 };
    let bulk_sign = if lattice.volume() > 0.0 { 1 } else { -1 };
    if s != bulk_sign {
        std::mem::swap(&mut v1, &mut v2);
    }

    let transformation = [v1, v2, w];
    let p_t = int_matrix(&transformation).transpose();
    let p_t_inv = p_t
        .try_inverse()
        .ok_or_else(|| invalid("degenerate surface transformation"))?;

    let oriented_lattice = Lattice::from_vectors([
        arr3(&to_cart(&v1)),
        arr3(&to_cart(&v2)),
        arr3(&to_cart(&w)),
    ]);

    // 旋转到标准取向，分数坐标不变
    let (a, b, c, alpha, beta, gamma) = oriented_lattice.parameters();
    let standard = Lattice::from_parameters(a, b, c, alpha, beta, gamma);

    let sites = bulk
        .sites
        .iter()
        .map(|site| {
            let f = p_t_inv * vec3(site.frac_coords);
            Site {
                species: site.species.clone(),
                frac_coords: wrap_frac3([f.x, f.y, f.z]),
                occupancy: site.occupancy,
            }
        })
        .collect();

    let structure = Structure::new(
        format!("{} {}", bulk.formula(), reduced),
        standard,
        sites,
    );

    log::debug!(
        "Oriented cell for {}: P = {:?}, d = {:.4} Å",
        reduced,
        transformation,
        d_spacing
    );

    Ok(OrientedCell {
        miller: reduced,
        transformation,
        structure,
        d_spacing,
    })
}

/// 整数叉积
fn int_cross(a: &[i32; 3], b: &[i32; 3]) -> [i32; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn int_dot(a: &[i32; 3], b: &[i32; 3]) -> i32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// 枚举 [-bound, bound]³ 内满足 h·u = target 的非零整数向量
fn lattice_vectors_with(hkl: &[i32; 3], target: i32, bound: i32) -> Vec<[i32; 3]> {
    let mut out = Vec::new();
    for x in -bound..=bound {
        for y in -bound..=bound {
            for z in -bound..=bound {
                let u = [x, y, z];
                if u == [0, 0, 0] {
                    continue;
                }
                if int_dot(hkl, &u) == target {
                    out.push(u);
                }
            }
        }
    }
    out
}

/// 寻找面内二维子格的本原基（叉积 = ±hkl）
fn find_in_plane_basis<F>(hkl: &[i32; 3], max_index: i32, to_cart: &F) -> Option<([i32; 3], [i32; 3])>
where
    F: Fn(&[i32; 3]) -> Vector3<f64>,
{
    let neg = [-hkl[0], -hkl[1], -hkl[2]];
    // 搜索范围不够时逐步扩大
    for bound in [max_index + 1, 2 * max_index + 1, 3 * max_index + 2] {
        let mut candidates = lattice_vectors_with(hkl, 0, bound);
        candidates.sort_by(|a, b| {
            to_cart(a)
                .norm()
                .partial_cmp(&to_cart(b).norm())
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.cmp(b))
        });

        for (i, v1) in candidates.iter().enumerate() {
            for v2 in candidates.iter().skip(i + 1) {
                let c = int_cross(v1, v2);
                if c == *hkl || c == neg {
                    return Some((*v1, *v2));
                }
            }
        }
    }
    None
}

/// 二维 Gauss（Lagrange）约化，得到最短面内基
fn gauss_reduce<F>(v1: &mut [i32; 3], v2: &mut [i32; 3], to_cart: &F)
where
    F: Fn(&[i32; 3]) -> Vector3<f64>,
{
    loop {
        if to_cart(v2).norm_squared() < to_cart(v1).norm_squared() - EPS {
            std::mem::swap(v1, v2);
        }
        let c1 = to_cart(v1);
        let m = (c1.dot(&to_cart(v2)) / c1.norm_squared()).round() as i32;
        if m == 0 {
            break;
        }
        let mut next = *v2;
        for i in 0..3 {
            next[i] -= m * v1[i];
        }
        // 投影系数为 ±0.5 时（60°/120° 等长基）减法不再缩短，已是约化基
        if to_cart(&next).norm_squared() >= to_cart(v2).norm_squared() - EPS {
            break;
        }
        *v2 = next;
    }
    // 取锐角基，手性在之后统一调整
    if to_cart(v1).dot(&to_cart(v2)) < -EPS {
        for x in v2.iter_mut() {
            *x = -*x;
        }
    }
}

/// 寻找 h·w = 1 的格矢
fn find_out_of_plane(hkl: &[i32; 3], max_index: i32) -> Option<[i32; 3]> {
    for bound in [max_index + 1, 2 * max_index + 1, 3 * max_index + 2] {
        let mut candidates = lattice_vectors_with(hkl, 1, bound);
        candidates.sort_by_key(|u| (u.iter().map(|x| x.abs()).sum::<i32>(), *u));
        if let Some(w) = candidates.first() {
            return Some(*w);
        }
    }
    None
}

/// 减去面内格矢的整数组合，使 w 的面内投影最小
fn reduce_in_plane_component<F>(w: &mut [i32; 3], v1: &[i32; 3], v2: &[i32; 3], to_cart: &F)
where
    F: Fn(&[i32; 3]) -> Vector3<f64>,
{
    let a = to_cart(v1);
    let b = to_cart(v2);
    let c = to_cart(w);

    // 解 Gram 方程得到面内投影的系数
    let g11 = a.dot(&a);
    let g12 = a.dot(&b);
    let g22 = b.dot(&b);
    let det = g11 * g22 - g12 * g12;
    if det.abs() < EPS {
        return;
    }
    let r1 = c.dot(&a);
    let r2 = c.dot(&b);
    let alpha = (r1 * g22 - r2 * g12) / det;
    let beta = (r2 * g11 - r1 * g12) / det;

    // 四舍五入后在 ±1 邻域内挑选最短者
    let (ra, rb) = (alpha.round() as i32, beta.round() as i32);
    let mut best = *w;
    let mut best_len = f64::INFINITY;
    for da in -1..=1 {
        for db in -1..=1 {
            let (ma, mb) = (ra + da, rb + db);
            let cand = [
                w[0] - ma * v1[0] - mb * v2[0],
                w[1] - ma * v1[1] - mb * v2[1],
                w[2] - ma * v1[2] - mb * v2[2],
            ];
            let len = to_cart(&cand).norm();
            if len < best_len - EPS {
                best_len = len;
                best = cand;
            }
        }
    }
    *w = best;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures;

    #[test]
    fn test_cubic_100() {
        let s = fixtures::fcc("Al", 4.05);
        let cell = oriented_cell(&s, &MillerIndex::new(1, 0, 0).unwrap()).unwrap();
        let [a, b] = cell.in_plane_vectors();
        assert!((a.norm() - 4.05).abs() < 1e-9);
        assert!((b.norm() - 4.05).abs() < 1e-9);
        assert!(a.dot(&b).abs() < 1e-9);
        assert!((cell.d_spacing - 4.05).abs() < 1e-9);
        assert_eq!(cell.structure.num_sites(), 4);
    }

    #[test]
    fn test_height_equals_d_spacing() {
        let s = fixtures::fcc("Al", 4.05);
        for m in [(1, 1, 0), (1, 1, 1), (2, 1, 0), (3, 1, 2)] {
            let miller = MillerIndex::new(m.0, m.1, m.2).unwrap();
            let cell = oriented_cell(&s, &miller).unwrap();
            let c = cell.structure.lattice.matrix[2];
            assert!((c[2] - cell.d_spacing).abs() < 1e-8, "{}", miller);
            // 面内向量无 z 分量
            assert!(cell.structure.lattice.matrix[0][2].abs() < 1e-12);
            assert!(cell.structure.lattice.matrix[1][2].abs() < 1e-9);
            assert!((cell.structure.volume() - s.volume()).abs() < 1e-6);
        }
    }

    #[test]
    fn test_cubic_111_hexagonal_in_plane() {
        let cases = [
            (fixtures::fcc("Al", 4.05), 4.05),
            (fixtures::rocksalt("Na", "Cl", 5.64), 5.64),
        ];
        for (bulk, a0) in cases {
            let cell = oriented_cell(&bulk, &MillerIndex::new(1, 1, 1).unwrap()).unwrap();
            let [a, b] = cell.in_plane_vectors();
            assert!((a.norm() - b.norm()).abs() < 1e-9);
            assert!((a.norm() - a0 * 2f64.sqrt()).abs() < 1e-9);
            let angle = (a.dot(&b) / (a.norm() * b.norm())).acos().to_degrees();
            assert!((angle - 60.0).abs() < 1e-6, "angle {}", angle);
            assert!((cell.d_spacing - a0 / 3f64.sqrt()).abs() < 1e-9);
            assert_eq!(cell.structure.num_sites(), bulk.num_sites());
            assert!(cell.structure.lattice.volume() > 0.0);
        }
    }

    #[test]
    fn test_multiple_gives_same_cell() {
        let s = fixtures::rocksalt("Na", "Cl", 5.64);
        let a = oriented_cell(&s, &MillerIndex::new(1, 1, 0).unwrap()).unwrap();
        let b = oriented_cell(&s, &MillerIndex::new(2, 2, 0).unwrap()).unwrap();
        assert_eq!(a.transformation, b.transformation);
        assert!((a.surface_area() - b.surface_area()).abs() < 1e-9);
        assert_eq!(b.miller, MillerIndex::new(1, 1, 0).unwrap());
    }

    #[test]
    fn test_unimodular_transformation() {
        let s = fixtures::hcp("Mg", 3.21, 5.21);
        let cell = oriented_cell(&s, &MillerIndex::new(1, 0, 1).unwrap()).unwrap();
        assert_eq!(crate::math::int_det(&cell.transformation).abs(), 1);
        assert_eq!(cell.structure.num_sites(), 2);
        assert!(cell.structure.lattice.volume() > 0.0);
    }

    #[test]
    fn test_fcc_111_surface_area() {
        let a = 4.05;
        let s = fixtures::fcc("Al", a);
        let cell = oriented_cell(&s, &MillerIndex::new(1, 1, 1).unwrap()).unwrap();
        // 惯用胞基下最短面内向量为 <1-10>，面积 = √3/2 · (√2 a)²
        let expected = 3f64.sqrt() / 2.0 * 2.0 * a * a;
        assert!((cell.surface_area() - expected).abs() < 1e-8);
        assert!((cell.d_spacing - a / 3f64.sqrt()).abs() < 1e-9);
    }
}
