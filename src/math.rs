//! # 数学工具
//!
//! 行向量晶格矩阵 `[[f64; 3]; 3]` 与 `nalgebra` 类型之间的转换，
//! 以及整数 / 周期坐标相关的小工具。
//!
//! ## 约定
//! - 晶格矩阵按行存放 a, b, c
//! - `nalgebra` 矩阵按列存放基矢，即 `to_columns(m) = mᵀ`
//!
//! ## 依赖关系
//! - 被 `models/`, `surface/`, `zsl/`, `interface/` 使用
//! - 使用 `nalgebra`

use nalgebra::{Matrix3, Vector3};

/// 浮点比较的默认容差
pub const EPS: f64 = 1e-8;

/// 行向量矩阵转为列基矢矩阵
pub fn to_columns(m: &[[f64; 3]; 3]) -> Matrix3<f64> {
    Matrix3::new(
        m[0][0], m[1][0], m[2][0], //
        m[0][1], m[1][1], m[2][1], //
        m[0][2], m[1][2], m[2][2],
    )
}

/// 列基矢矩阵转回行向量矩阵
pub fn from_columns(m: &Matrix3<f64>) -> [[f64; 3]; 3] {
    [
        [m[(0, 0)], m[(1, 0)], m[(2, 0)]],
        [m[(0, 1)], m[(1, 1)], m[(2, 1)]],
        [m[(0, 2)], m[(1, 2)], m[(2, 2)]],
    ]
}

/// 数组转 `Vector3`
pub fn vec3(v: [f64; 3]) -> Vector3<f64> {
    Vector3::new(v[0], v[1], v[2])
}

/// `Vector3` 转数组
pub fn arr3(v: &Vector3<f64>) -> [f64; 3] {
    [v.x, v.y, v.z]
}

/// 整数矩阵转浮点 `Matrix3`（按行）
pub fn int_matrix(m: &[[i32; 3]; 3]) -> Matrix3<f64> {
    Matrix3::new(
        m[0][0] as f64,
        m[0][1] as f64,
        m[0][2] as f64,
        m[1][0] as f64,
        m[1][1] as f64,
        m[1][2] as f64,
        m[2][0] as f64,
        m[2][1] as f64,
        m[2][2] as f64,
    )
}

/// 整数 3x3 行列式
pub fn int_det(m: &[[i32; 3]; 3]) -> i32 {
    m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
}

/// 最大公约数（非负）
pub fn gcd(a: i32, b: i32) -> i32 {
    let (mut a, mut b) = (a.abs(), b.abs());
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

/// 三个整数的最大公约数
pub fn gcd3(a: i32, b: i32, c: i32) -> i32 {
    gcd(gcd(a, b), c)
}

/// 分数坐标折回 [0, 1)
pub fn wrap_frac(x: f64) -> f64 {
    let w = x - x.floor();
    // -1e-17 之类的值 floor 后会得到 1.0
    if w >= 1.0 - 1e-12 {
        0.0
    } else {
        w
    }
}

/// 三维分数坐标折回 [0, 1)³
pub fn wrap_frac3(f: [f64; 3]) -> [f64; 3] {
    [wrap_frac(f[0]), wrap_frac(f[1]), wrap_frac(f[2])]
}

/// 最小像差（每个分量落在 [-0.5, 0.5)）
pub fn min_image_diff(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    let mut d = [0.0; 3];
    for i in 0..3 {
        let x = a[i] - b[i];
        d[i] = x - x.round();
    }
    d
}

/// 数值量化，作为去重用的整数键
pub fn quantize(x: f64, step: f64) -> i64 {
    (x / step).round() as i64
}
