//! # VASP POSCAR 格式读写
//!
//! 读取 POSCAR/CONTCAR（VASP 4/5，可选 Selective dynamics，Direct/Cartesian），
//! 以及把 `Structure` 写成 POSCAR 文本。
//!
//! ## POSCAR 格式说明
//! ```text
//! Comment line (structure name)
//! 1.0                    # scaling factor（负值表示目标体积）
//! a1 a2 a3               # lattice vector a
//! b1 b2 b3               # lattice vector b
//! c1 c2 c3               # lattice vector c
//! Element1 Element2 ...  # element symbols (VASP 5+)
//! n1 n2 ...              # number of atoms per element
//! Selective dynamics     # optional
//! Direct/Cartesian       # coordinate type
//! x1 y1 z1               # atom positions
//! ...
//! ```
//!
//! ## 依赖关系
//! - 被 `parsers/mod.rs`, `commands/` 使用
//! - 使用 `models/structure.rs`

use crate::error::{InterfaceError, Result};
use crate::models::{Lattice, Site, Structure};
use std::fs;
use std::path::Path;

/// 解析 POSCAR/CONTCAR 文件
pub fn parse_poscar_file(path: &Path) -> Result<Structure> {
    let content = fs::read_to_string(path).map_err(|e| InterfaceError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_poscar_content(
        &content,
        path.file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown"),
    )
}

/// 从字符串内容解析 POSCAR 格式
pub fn parse_poscar_content(content: &str, default_name: &str) -> Result<Structure> {
    let lines: Vec<&str> = content.lines().collect();
    let error = |reason: String| InterfaceError::ParseError {
        format: "poscar".to_string(),
        path: default_name.to_string(),
        reason,
    };

    if lines.len() < 8 {
        return Err(error("File too short".to_string()));
    }

    // Line 0: Comment/name
    let name = lines[0].trim();
    let name = if name.is_empty() { default_name } else { name };

    // Line 1: Scaling factor
    let scale: f64 = lines[1]
        .split_whitespace()
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| error(format!("Invalid scaling factor '{}'", lines[1].trim())))?;
    if scale == 0.0 {
        return Err(error("Scaling factor must not be zero".to_string()));
    }

    // Lines 2-4: Lattice vectors
    let mut matrix = [[0.0; 3]; 3];
    for (i, row) in matrix.iter_mut().enumerate() {
        let parts: Vec<f64> = lines[2 + i]
            .split_whitespace()
            .filter_map(|s| s.parse().ok())
            .collect();
        if parts.len() < 3 {
            return Err(error(format!("Invalid lattice vector at line {}", 3 + i)));
        }
        *row = [parts[0], parts[1], parts[2]];
    }
    let raw = Lattice::from_vectors(matrix);
    // 负的缩放因子表示晶胞体积
    let factor = if scale > 0.0 {
        scale
    } else {
        (-scale / raw.volume().abs()).cbrt()
    };
    if !factor.is_finite() {
        return Err(error("Degenerate lattice".to_string()));
    }
    let lattice = raw.scaled(factor);

    // Line 5: Element symbols (VASP 5+) or atom counts (VASP 4)
    let line5_parts: Vec<&str> = lines[5].split_whitespace().collect();
    if line5_parts.is_empty() {
        return Err(error("Missing species / count line".to_string()));
    }
    let (elements, counts, atom_line_start) = if line5_parts[0].parse::<usize>().is_ok() {
        // VASP 4：没有元素行，用占位符命名
        let counts = parse_counts(&line5_parts).ok_or_else(|| error("Invalid atom counts".to_string()))?;
        let elements: Vec<String> = (0..counts.len()).map(|i| format!("X{}", i + 1)).collect();
        (elements, counts, 6)
    } else {
        let elements: Vec<String> = line5_parts.iter().map(|s| s.to_string()).collect();
        let count_parts: Vec<&str> = lines[6].split_whitespace().collect();
        let counts = parse_counts(&count_parts).ok_or_else(|| error("Invalid atom counts".to_string()))?;
        (elements, counts, 7)
    };
    if elements.len() != counts.len() {
        return Err(error(format!(
            "{} species but {} counts",
            elements.len(),
            counts.len()
        )));
    }

    let mut coord_line = atom_line_start;
    if lines.len() > coord_line
        && lines[coord_line]
            .trim()
            .to_lowercase()
            .starts_with('s')
    {
        coord_line += 1;
    }
    if lines.len() <= coord_line {
        return Err(error("Missing coordinate type line".to_string()));
    }

    let coord_type = lines[coord_line].trim().to_lowercase();
    let is_cartesian = coord_type.starts_with('c') || coord_type.starts_with('k');

    let mut sites: Vec<Site> = Vec::with_capacity(counts.iter().sum());
    let mut line_idx = coord_line + 1;

    for (elem, &count) in elements.iter().zip(counts.iter()) {
        for _ in 0..count {
            let line = lines.get(line_idx).ok_or_else(|| {
                error(format!(
                    "Expected {} atoms, file ends after {}",
                    counts.iter().sum::<usize>(),
                    sites.len()
                ))
            })?;
            let parts: Vec<f64> = line
                .split_whitespace()
                .take(3)
                .filter_map(|s| s.parse().ok())
                .collect();
            if parts.len() < 3 {
                return Err(error(format!("Invalid position at line {}", line_idx + 1)));
            }
            let position = if is_cartesian {
                let cart = [parts[0] * factor, parts[1] * factor, parts[2] * factor];
                lattice
                    .cart_to_frac(cart)
                    .ok_or_else(|| error("Singular lattice".to_string()))?
            } else {
                [parts[0], parts[1], parts[2]]
            };
            sites.push(Site::new(elem.clone(), position));
            line_idx += 1;
        }
    }

    Ok(Structure::new(name, lattice, sites))
}

fn parse_counts(parts: &[&str]) -> Option<Vec<usize>> {
    parts.iter().map(|s| s.parse().ok()).collect()
}

/// 将 Structure 转换为 POSCAR 格式字符串
///
/// 同种元素的位点按首次出现顺序归为一组。
pub fn to_poscar_string(structure: &Structure) -> String {
    let mut elem_order: Vec<&str> = Vec::new();
    for site in &structure.sites {
        if !elem_order.contains(&site.species.as_str()) {
            elem_order.push(&site.species);
        }
    }

    let mut result = String::new();
    result.push_str(&format!("{}\n", structure.name));
    result.push_str("1.0\n");

    for row in &structure.lattice.matrix {
        result.push_str(&format!(
            "  {:16.10}  {:16.10}  {:16.10}\n",
            row[0], row[1], row[2]
        ));
    }

    result.push_str(&format!("   {}\n", elem_order.join("   ")));
    let counts: Vec<String> = elem_order
        .iter()
        .map(|e| {
            structure
                .sites
                .iter()
                .filter(|s| s.species == *e)
                .count()
                .to_string()
        })
        .collect();
    result.push_str(&format!("   {}\n", counts.join("   ")));
    result.push_str("Direct\n");

    for elem in &elem_order {
        for site in structure.sites.iter().filter(|s| s.species == *elem) {
            let p = site.frac_coords;
            result.push_str(&format!(
                "  {:16.10}  {:16.10}  {:16.10}\n",
                p[0], p[1], p[2]
            ));
        }
    }

    result
}

/// 写出 POSCAR 文件
pub fn write_poscar_file(path: &Path, structure: &Structure) -> Result<()> {
    fs::write(path, to_poscar_string(structure)).map_err(|e| InterfaceError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures;

    #[test]
    fn test_parse_poscar_vasp5() {
        let content = r#"NaCl
1.0
5.64 0.0 0.0
0.0 5.64 0.0
0.0 0.0 5.64
Na Cl
4 4
Direct
0.0 0.0 0.0
0.5 0.5 0.0
0.5 0.0 0.5
0.0 0.5 0.5
0.5 0.0 0.0
0.0 0.5 0.0
0.0 0.0 0.5
0.5 0.5 0.5
"#;
        let s = parse_poscar_content(content, "NaCl").unwrap();
        assert_eq!(s.name, "NaCl");
        assert_eq!(s.num_sites(), 8);
        assert_eq!(s.formula(), "Cl4Na4");
    }

    #[test]
    fn test_parse_poscar_with_scale() {
        let content = r#"Si
2.0
2.0 0.0 0.0
0.0 2.0 0.0
0.0 0.0 2.0
Si
2
Direct
0.0 0.0 0.0
0.5 0.5 0.5
"#;
        let s = parse_poscar_content(content, "Si").unwrap();
        let (a, _, _, _, _, _) = s.lattice.parameters();
        // 2.0 * 2.0 = 4.0
        assert!((a - 4.0).abs() < 1e-10);
    }

    #[test]
    fn test_negative_scale_is_volume() {
        let content = "Po\n-27.0\n1 0 0\n0 1 0\n0 0 1\nPo\n1\nDirect\n0 0 0\n";
        let s = parse_poscar_content(content, "Po").unwrap();
        assert!((s.volume() - 27.0).abs() < 1e-9);
    }

    #[test]
    fn test_cartesian_coordinates() {
        let content = "Fe\n1.0\n2.0 0 0\n0 2.0 0\n0 0 2.0\nFe\n2\nCartesian\n0 0 0\n1.0 1.0 1.0\n";
        let s = parse_poscar_content(content, "Fe").unwrap();
        let f = s.sites[1].frac_coords;
        assert!((f[0] - 0.5).abs() < 1e-12 && (f[2] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_poscar_round_trip() {
        let sic = fixtures::zincblende("Si", "C", 4.36);
        let text = to_poscar_string(&sic);
        let parsed = parse_poscar_content(&text, "round_trip").unwrap();
        assert_eq!(parsed.num_sites(), 8);
        assert_eq!(parsed.formula(), sic.formula());
        assert!(parsed.matches_sites(&sic, 1e-6));
    }

    #[test]
    fn test_parse_poscar_selective_dynamics() {
        let content = r#"Fe with selective
1.0
2.87 0.0 0.0
0.0 2.87 0.0
0.0 0.0 2.87
Fe
2
Selective dynamics
Direct
0.0 0.0 0.0 T T T
0.5 0.5 0.5 F F F
"#;
        let s = parse_poscar_content(content, "Fe").unwrap();
        assert_eq!(s.num_sites(), 2);
    }

    #[test]
    fn test_truncated_file_is_error() {
        let content = "Fe\n1.0\n2 0 0\n0 2 0\n0 0 2\nFe\n3\nDirect\n0 0 0\n";
        assert!(matches!(
            parse_poscar_content(content, "Fe"),
            Err(InterfaceError::ParseError { .. })
        ));
    }
}
