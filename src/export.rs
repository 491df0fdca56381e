//! # 结果导出
//!
//! ## 支持格式
//! - CSV: 筛选结果（取向组合、应变、面积），界面汇总
//! - POSCAR: 每个界面一个 `.vasp` 文件，
//!   命名 `<衬底>_<薄膜>_<衬底hkl>-<薄膜hkl>_interface_<NNN>.vasp`
//!
//! ## 依赖关系
//! - 被 `commands/screen.rs`, `commands/build.rs` 调用
//! - 使用 `analyzer.rs`, `interface/`, `parsers/poscar.rs`
//! - 使用 `csv` 库写入 CSV 文件

use crate::analyzer::ScreeningResult;
use crate::error::{InterfaceError, Result};
use crate::interface::Interface;
use crate::models::{MillerIndex, Structure};
use crate::parsers::poscar;

use std::path::{Path, PathBuf};

/// 导出筛选结果为 CSV
pub fn screening_to_csv(results: &[ScreeningResult], output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;

    wtr.write_record([
        "rank",
        "film_miller",
        "substrate_miller",
        "von_mises_strain",
        "match_area",
        "film_multiplicity",
        "substrate_multiplicity",
        "match_count",
    ])?;

    for (i, r) in results.iter().enumerate() {
        wtr.write_record(&[
            (i + 1).to_string(),
            r.film_miller.compact(),
            r.substrate_miller.compact(),
            format!("{:.6}", r.von_mises_strain),
            format!("{:.4}", r.match_area),
            r.best_match.film_multiplicity().to_string(),
            r.best_match.substrate_multiplicity().to_string(),
            r.match_count.to_string(),
        ])?;
    }

    wtr.flush().map_err(|e| InterfaceError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

/// 导出批量筛选汇总：每个薄膜文件一行（最优取向组合）
pub fn film_ranking_to_csv(rows: &[(String, ScreeningResult)], output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;

    wtr.write_record([
        "rank",
        "film_file",
        "film_miller",
        "substrate_miller",
        "von_mises_strain",
        "match_area",
        "match_count",
    ])?;

    for (i, (file, r)) in rows.iter().enumerate() {
        wtr.write_record(&[
            (i + 1).to_string(),
            file.clone(),
            r.film_miller.compact(),
            r.substrate_miller.compact(),
            format!("{:.6}", r.von_mises_strain),
            format!("{:.4}", r.match_area),
            r.match_count.to_string(),
        ])?;
    }

    wtr.flush().map_err(|e| InterfaceError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

/// 导出界面汇总为 CSV（文件名与 POSCAR 一一对应）
pub fn interfaces_to_csv(rows: &[(String, Interface)], output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;

    wtr.write_record([
        "file",
        "match_index",
        "termination",
        "von_mises_strain",
        "match_area",
        "num_sites",
        "substrate_sites",
        "film_sites",
        "gap",
        "c_length",
    ])?;

    for (file, iface) in rows {
        wtr.write_record(&[
            file.clone(),
            iface.match_index.to_string(),
            iface.termination.label(),
            format!("{:.6}", iface.von_mises_strain),
            format!("{:.4}", iface.match_area),
            iface.structure.num_sites().to_string(),
            iface.substrate_sites().len().to_string(),
            iface.film_sites().len().to_string(),
            format!("{:.3}", iface.gap),
            format!("{:.4}", iface.structure.lattice.lengths()[2]),
        ])?;
    }

    wtr.flush().map_err(|e| InterfaceError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

/// 界面 POSCAR 文件名（`index` 从 0 开始）
pub fn interface_filename(
    substrate: &Structure,
    film: &Structure,
    substrate_miller: &MillerIndex,
    film_miller: &MillerIndex,
    index: usize,
) -> String {
    format!(
        "{}_{}_{}-{}_interface_{:03}.vasp",
        substrate.reduced_formula(),
        film.reduced_formula(),
        substrate_miller.compact(),
        film_miller.compact(),
        index
    )
}

/// 写出一个界面的 POSCAR，返回文件路径
pub fn write_interface(dir: &Path, filename: &str, interface: &Interface) -> Result<PathBuf> {
    let path = dir.join(filename);
    poscar::write_poscar_file(&path, &interface.structure)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures;

    #[test]
    fn test_interface_filename() {
        let al = fixtures::fcc("Al", 4.05);
        let sic = fixtures::zincblende("Si", "C", 4.36);
        let name = interface_filename(
            &al,
            &sic,
            &MillerIndex::new(1, 0, 0).unwrap(),
            &MillerIndex::new(1, -1, 0).unwrap(),
            7,
        );
        assert_eq!(name, "Al_CSi_100-1-10_interface_007.vasp");
    }

    #[test]
    fn test_screening_csv() {
        use crate::analyzer::SubstrateAnalyzer;

        let po = fixtures::simple_cubic("Po", 3.35);
        let results = SubstrateAnalyzer::default()
            .screen(&po, &po, 1, 1, 30.0)
            .unwrap();
        let path = std::env::temp_dir().join(format!("interfacer_screen_{}.csv", std::process::id()));
        screening_to_csv(&results, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert!(lines.next().unwrap().starts_with("rank,film_miller"));
        assert_eq!(lines.count(), results.len());
        std::fs::remove_file(&path).ok();
    }
}
