//! # 共格界面构建器
//!
//! 给定衬底 / 薄膜结构及其 Miller 指数：
//! 1. 为两侧创建 slab 生成器，枚举终止面，组合成 `Termination`
//! 2. 对两侧面内晶格做一次 ZSL 匹配，匹配列表在构建器生命周期内复用
//! 3. `produce_interfaces` 按匹配顺序惰性生成界面：
//!    超胞 → 薄膜形变到衬底超晶格 → 沿法向隔 gap 堆叠 → 合并位点
//!
//! 衬底始终不变形。空结果（无终止面 / 无匹配）通过 `BuilderStatus` 报告，
//! 奇异形变的匹配记录警告后跳过。
//!
//! ## 依赖关系
//! - 被 `commands/build.rs`, `commands/terminations.rs` 调用
//! - 使用 `surface/`, `zsl/`, `interface/structure.rs`

use crate::error::{InterfaceError, Result};
use crate::math::{to_columns, vec3, wrap_frac};
use crate::models::{Lattice, MillerIndex, Site, Structure};
use crate::surface::{
    AcceptAll, Slab, SlabConfig, SlabGenerator, SurfaceTermination, Termination, TerminationPolicy,
};
use crate::zsl::{ZslConfig, ZslGenerator, ZslMatch};

use super::Interface;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// 形变矩阵行列式低于此值视为奇异
const SINGULAR_DET: f64 = 1e-8;

/// 界面堆叠参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterfaceConfig {
    /// 衬底顶层与薄膜底层的法向间距（Å）
    pub gap: f64,
    /// 薄膜上方真空层（Å）
    pub vacuum_over_film: f64,
    /// 薄膜相对衬底的面内平移（衬底超晶格分数坐标）
    pub in_plane_offset: [f64; 2],
}

impl Default for InterfaceConfig {
    fn default() -> Self {
        InterfaceConfig {
            gap: 2.0,
            vacuum_over_film: 20.0,
            in_plane_offset: [0.0, 0.0],
        }
    }
}

impl InterfaceConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.gap > 0.0) || !self.gap.is_finite() {
            return Err(InterfaceError::InvalidArgument(format!(
                "gap must be positive, got {}",
                self.gap
            )));
        }
        if !(self.vacuum_over_film > 0.0) || !self.vacuum_over_film.is_finite() {
            return Err(InterfaceError::InvalidArgument(format!(
                "vacuum_over_film must be positive, got {}",
                self.vacuum_over_film
            )));
        }
        if !self.in_plane_offset.iter().all(|x| x.is_finite()) {
            return Err(InterfaceError::InvalidArgument(
                "in_plane_offset must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

/// 构建器状态：空结果不是错误，而是一种状态
#[derive(Debug, Clone, PartialEq)]
pub enum BuilderStatus {
    Ready,
    NoTerminations { side: String },
    NoMatches { max_area: f64 },
}

impl BuilderStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, BuilderStatus::Ready)
    }

    /// 转成对应的错误（`Ready` 返回 `None`）
    pub fn to_error(&self) -> Option<InterfaceError> {
        match self {
            BuilderStatus::Ready => None,
            BuilderStatus::NoTerminations { side } => {
                Some(InterfaceError::NoTerminations { side: side.clone() })
            }
            BuilderStatus::NoMatches { max_area } => Some(InterfaceError::NoMatches {
                max_area: *max_area,
            }),
        }
    }
}

impl fmt::Display for BuilderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_error() {
            None => write!(f, "ready"),
            Some(e) => write!(f, "{}", e),
        }
    }
}

/// 共格界面构建器
pub struct CoherentInterfaceBuilder {
    substrate: SlabGenerator,
    film: SlabGenerator,
    zsl_config: ZslConfig,
    slab_config: SlabConfig,
    terminations: Vec<Termination>,
    matches: Vec<ZslMatch>,
    status: BuilderStatus,
}

impl CoherentInterfaceBuilder {
    /// 使用默认容差创建
    pub fn create(
        substrate: &Structure,
        film: &Structure,
        substrate_miller: MillerIndex,
        film_miller: MillerIndex,
        max_area: f64,
    ) -> Result<Self> {
        Self::with_config(
            substrate,
            film,
            substrate_miller,
            film_miller,
            ZslConfig::default().with_max_area(max_area),
            SlabConfig::default(),
            Arc::new(AcceptAll),
        )
    }

    /// 指定 ZSL / slab 参数和终止面策略
    pub fn with_config(
        substrate: &Structure,
        film: &Structure,
        substrate_miller: MillerIndex,
        film_miller: MillerIndex,
        zsl: ZslConfig,
        slab: SlabConfig,
        policy: Arc<dyn TerminationPolicy>,
    ) -> Result<Self> {
        let generator = ZslGenerator::new(zsl.clone())?;
        let substrate_gen = SlabGenerator::new(substrate, substrate_miller, slab.clone())?
            .with_shared_policy(policy.clone());
        let film_gen =
            SlabGenerator::new(film, film_miller, slab.clone())?.with_shared_policy(policy);

        let film_terms: Vec<SurfaceTermination> = film_gen
            .generate_terminations(1)?
            .into_iter()
            .map(SurfaceTermination::facing_down)
            .collect();
        let substrate_terms = substrate_gen.generate_terminations(1)?;
        let terminations: Vec<Termination> = film_terms
            .iter()
            .flat_map(|f| {
                substrate_terms.iter().map(move |s| Termination {
                    film: f.clone(),
                    substrate: s.clone(),
                })
            })
            .collect();

        let matches: Vec<ZslMatch> = generator
            .find_matches(&film_gen.in_plane_lattice(), &substrate_gen.in_plane_lattice())
            .collect();

        let status = if film_terms.is_empty() {
            BuilderStatus::NoTerminations {
                side: "film".to_string(),
            }
        } else if substrate_terms.is_empty() {
            BuilderStatus::NoTerminations {
                side: "substrate".to_string(),
            }
        } else if matches.is_empty() {
            BuilderStatus::NoMatches {
                max_area: zsl.max_area,
            }
        } else {
            BuilderStatus::Ready
        };

        log::info!(
            "Interface {} {} / {} {}: {} termination pair(s), {} ZSL match(es)",
            substrate.formula(),
            substrate_gen.miller(),
            film.formula(),
            film_gen.miller(),
            terminations.len(),
            matches.len()
        );
        if !status.is_ready() {
            log::warn!("{}", status);
        }

        Ok(CoherentInterfaceBuilder {
            substrate: substrate_gen,
            film: film_gen,
            zsl_config: zsl,
            slab_config: slab,
            terminations,
            matches,
            status,
        })
    }

    pub fn terminations(&self) -> &[Termination] {
        &self.terminations
    }

    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    /// 按面积、应变排序的匹配列表
    pub fn matches(&self) -> &[ZslMatch] {
        &self.matches
    }

    pub fn status(&self) -> &BuilderStatus {
        &self.status
    }

    pub fn zsl_config(&self) -> &ZslConfig {
        &self.zsl_config
    }

    pub fn substrate_generator(&self) -> &SlabGenerator {
        &self.substrate
    }

    pub fn film_generator(&self) -> &SlabGenerator {
        &self.film
    }

    /// 按组合标签（`film/substrate`）查找终止面
    pub fn find_termination(&self, label: &str) -> Result<&Termination> {
        self.terminations
            .iter()
            .find(|t| t.label() == label)
            .ok_or_else(|| InterfaceError::UnknownTermination(label.to_string()))
    }

    /// 以默认堆叠参数、指定 gap 惰性生成界面
    ///
    /// `max_count` 为 `None` 时遍历全部匹配。
    pub fn produce_interfaces(
        &self,
        termination: &Termination,
        film_thickness: usize,
        substrate_thickness: usize,
        gap: f64,
        max_count: Option<usize>,
    ) -> Result<Interfaces<'_>> {
        let config = InterfaceConfig {
            gap,
            ..InterfaceConfig::default()
        };
        self.produce_interfaces_with(
            termination,
            film_thickness,
            substrate_thickness,
            max_count,
            &config,
        )
    }

    /// 惰性生成界面
    pub fn produce_interfaces_with(
        &self,
        termination: &Termination,
        film_thickness: usize,
        substrate_thickness: usize,
        max_count: Option<usize>,
        config: &InterfaceConfig,
    ) -> Result<Interfaces<'_>> {
        if film_thickness == 0 || substrate_thickness == 0 {
            return Err(InterfaceError::InvalidArgument(format!(
                "thickness must be at least 1 layer (film {}, substrate {})",
                film_thickness, substrate_thickness
            )));
        }
        config.validate()?;
        if !self.terminations.contains(termination) {
            return Err(InterfaceError::UnknownTermination(termination.label()));
        }

        let substrate_slab =
            self.substrate
                .build_slab(termination.substrate.shift, substrate_thickness, 0.0)?;
        let film_slab = self
            .film
            .build_slab(termination.film.shift, film_thickness, 0.0)?;

        let limit = max_count.unwrap_or(usize::MAX);
        Ok(Interfaces {
            builder: self,
            termination: termination.clone(),
            substrate_slab,
            film_slab,
            config: config.clone(),
            next_index: 0,
            limit,
            produced: 0,
            progress: None,
        })
    }
}

/// 界面的惰性序列，每次 `next` 只构造一个界面
pub struct Interfaces<'a> {
    builder: &'a CoherentInterfaceBuilder,
    termination: Termination,
    substrate_slab: Slab,
    film_slab: Slab,
    config: InterfaceConfig,
    next_index: usize,
    limit: usize,
    produced: usize,
    progress: Option<Box<dyn FnMut(usize, usize) + 'a>>,
}

impl<'a> Interfaces<'a> {
    /// 每产出一个界面回调一次 `(produced, expected_total)`
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: FnMut(usize, usize) + 'a,
    {
        self.progress = Some(Box::new(callback));
        self
    }

    /// 预计产出数（上限与匹配数的较小者）
    pub fn expected_total(&self) -> usize {
        self.limit.min(self.builder.match_count())
    }
}

impl Iterator for Interfaces<'_> {
    type Item = Interface;

    fn next(&mut self) -> Option<Interface> {
        let matches = self.builder.matches();
        while self.produced < self.limit && self.next_index < matches.len() {
            let index = self.next_index;
            self.next_index += 1;

            let built = stack_interface(
                &self.substrate_slab,
                &self.film_slab,
                &matches[index],
                index,
                &self.config,
                self.builder.slab_config.max_slab_sites,
            );
            match built {
                Ok(structure) => {
                    let m = &matches[index];
                    let interface = Interface {
                        substrate_site_count: self.substrate_slab.structure.num_sites()
                            * m.substrate_multiplicity() as usize,
                        structure,
                        termination: self.termination.clone(),
                        zsl_match: m.clone(),
                        match_index: index,
                        match_area: m.match_area,
                        von_mises_strain: m.von_mises_strain,
                        film_thickness: self.film_slab.layers,
                        substrate_thickness: self.substrate_slab.layers,
                        gap: self.config.gap,
                        vacuum_over_film: self.config.vacuum_over_film,
                    };
                    self.produced += 1;
                    let total = self.expected_total();
                    if let Some(cb) = self.progress.as_mut() {
                        cb(self.produced, total);
                    }
                    return Some(interface);
                }
                Err(e) => {
                    log::warn!("Skipping match #{}: {}", index, e);
                }
            }
        }
        None
    }
}

/// 构造一个界面结构
fn stack_interface(
    substrate_slab: &Slab,
    film_slab: &Slab,
    m: &ZslMatch,
    index: usize,
    config: &InterfaceConfig,
    max_sites: usize,
) -> Result<Structure> {
    let determinant = m.match_transformation.determinant();
    if !determinant.is_finite() || determinant.abs() < SINGULAR_DET {
        return Err(InterfaceError::SingularDeformation { index, determinant });
    }

    let total_sites = substrate_slab.structure.num_sites() * m.substrate_multiplicity() as usize
        + film_slab.structure.num_sites() * m.film_multiplicity() as usize;
    if total_sites > max_sites {
        return Err(InterfaceError::InsufficientBulk {
            reason: format!(
                "interface would need {} sites (limit {})",
                total_sites, max_sites
            ),
        });
    }

    let supercell_failed = |side: &str| {
        InterfaceError::Other(format!("failed to build {} supercell for match #{}", side, index))
    };
    let substrate = substrate_slab
        .structure
        .supercell(&m.substrate_supercell_matrix())
        .ok_or_else(|| supercell_failed("substrate"))?;
    let film = film_slab
        .structure
        .supercell(&m.film_supercell_matrix())
        .ok_or_else(|| supercell_failed("film"))?;

    // 薄膜形变到衬底超晶格
    let f = m.match_transformation;
    let film_cart: Vec<[f64; 3]> = film
        .cart_coords()
        .into_iter()
        .map(|c| {
            let v = f * vec3(c);
            [v.x, v.y, v.z]
        })
        .collect();
    let substrate_cart = substrate.cart_coords();

    let (sub_min, sub_max) = z_range(&substrate_cart);
    let (film_min, film_max) = z_range(&film_cart);
    let sub_height = sub_max - sub_min;
    let film_height = film_max - film_min;
    let c = sub_height + config.gap + film_height + config.vacuum_over_film;

    let s = m.substrate_sl_vectors;
    let lattice = Lattice::from_vectors([[s.a.x, s.a.y, 0.0], [s.b.x, s.b.y, 0.0], [0.0, 0.0, c]]);
    let inv = to_columns(&lattice.matrix).try_inverse().ok_or_else(|| {
        InterfaceError::SingularDeformation {
            index,
            determinant: lattice.volume(),
        }
    })?;

    let offset = s.a * config.in_plane_offset[0] + s.b * config.in_plane_offset[1];
    let film_dz = sub_height + config.gap - film_min;

    let to_site = |species: &str, occupancy: Option<f64>, cart: [f64; 3]| {
        let fr = inv * vec3(cart);
        Site {
            species: species.to_string(),
            frac_coords: [wrap_frac(fr.x), wrap_frac(fr.y), fr.z],
            occupancy,
        }
    };

    let mut sites = Vec::with_capacity(total_sites);
    for (site, cart) in substrate.sites.iter().zip(&substrate_cart) {
        sites.push(to_site(
            &site.species,
            site.occupancy,
            [cart[0], cart[1], cart[2] - sub_min],
        ));
    }
    for (site, cart) in film.sites.iter().zip(&film_cart) {
        sites.push(to_site(
            &site.species,
            site.occupancy,
            [cart[0] + offset.x, cart[1] + offset.y, cart[2] + film_dz],
        ));
    }

    // 形变后的薄膜面内基矢必须与衬底超晶格重合
    let deformed = film.lattice.deformed(&f);
    for k in 0..2 {
        let target = lattice.matrix[k];
        let got = deformed.matrix[k];
        let diff = (0..3).map(|i| (target[i] - got[i]).abs()).fold(0.0, f64::max);
        if diff > 1e-6 {
            return Err(InterfaceError::Other(format!(
                "deformed film lattice does not coincide with substrate for match #{} (|Δ| = {:.2e})",
                index, diff
            )));
        }
    }

    Ok(Structure {
        name: format!("{} / {} interface", substrate_slab.structure.name, film_slab.structure.name),
        lattice,
        sites,
    })
}

fn z_range(coords: &[[f64; 3]]) -> (f64, f64) {
    coords.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), c| {
        (lo.min(c[2]), hi.max(c[2]))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures;
    use crate::surface::NonPolar;
    use nalgebra::Matrix3;

    fn hundred() -> MillerIndex {
        MillerIndex::new(1, 0, 0).unwrap()
    }

    fn al_sic_builder(max_area: f64) -> CoherentInterfaceBuilder {
        let al = fixtures::fcc("Al", 4.05);
        let sic = fixtures::zincblende("Si", "C", 4.36);
        CoherentInterfaceBuilder::create(&al, &sic, hundred(), hundred(), max_area).unwrap()
    }

    #[test]
    fn test_terminations_are_cross_product() {
        let builder = al_sic_builder(200.0);
        // SiC(100): Si 端和 C 端；Al(100): 一个
        assert_eq!(builder.terminations().len(), 2);
        assert!(builder.status().is_ready());
        assert!(builder.match_count() > 0);
        let label = builder.terminations()[0].label();
        assert_eq!(builder.find_termination(&label).unwrap(), &builder.terminations()[0]);
        assert!(matches!(
            builder.find_termination("nope"),
            Err(InterfaceError::UnknownTermination(_))
        ));
    }

    #[test]
    fn test_film_lattice_coincides_with_substrate() {
        let builder = al_sic_builder(200.0);
        let term = builder.terminations()[0].clone();
        let interfaces: Vec<Interface> = builder
            .produce_interfaces(&term, 2, 2, 2.0, Some(3))
            .unwrap()
            .collect();
        assert!(!interfaces.is_empty());
        for iface in &interfaces {
            let m = &iface.zsl_match;
            let f = m.match_transformation;
            for (fv, sv) in [
                (m.film_sl_vectors.a, m.substrate_sl_vectors.a),
                (m.film_sl_vectors.b, m.substrate_sl_vectors.b),
            ] {
                let mapped = f * nalgebra::Vector3::new(fv.x, fv.y, 0.0);
                assert!((mapped.x - sv.x).abs() < 1e-6);
                assert!((mapped.y - sv.y).abs() < 1e-6);
            }
            let a = iface.structure.lattice.matrix[0];
            assert!((a[0] - m.substrate_sl_vectors.a.x).abs() < 1e-9);
            assert!((a[1] - m.substrate_sl_vectors.a.y).abs() < 1e-9);
        }
    }

    #[test]
    fn test_gap_and_no_overlap() {
        let builder = al_sic_builder(200.0);
        let term = builder.terminations()[1].clone();
        let iface = builder
            .produce_interfaces(&term, 2, 3, 2.5, Some(1))
            .unwrap()
            .next()
            .unwrap();
        assert!((iface.interface_separation() - 2.5).abs() < 1e-6);
        assert!(iface.min_interface_distance() >= 2.5 - 1e-6);

        let m = &iface.zsl_match;
        // Al(100) 取向胞 4 原子 × 3 层；SiC(100) 8 原子 × 2 层
        let expected_sub = 4 * 3 * m.substrate_multiplicity() as usize;
        let expected_film = 8 * 2 * m.film_multiplicity() as usize;
        assert_eq!(iface.substrate_sites().len(), expected_sub);
        assert_eq!(iface.film_sites().len(), expected_film);
        assert!(iface.substrate_sites().iter().all(|s| s.species == "Al"));
    }

    #[test]
    fn test_slabs_keep_bulk_bond_lengths() {
        let al = fixtures::fcc("Al", 4.05);
        let sic = fixtures::zincblende("Si", "C", 4.36);
        let al_bond = al.min_interatomic_distance().unwrap();
        let sic_bond = sic.min_interatomic_distance().unwrap();

        let builder = al_sic_builder(200.0);
        for term in builder.terminations().to_vec() {
            for iface in builder.produce_interfaces(&term, 2, 2, 2.0, Some(3)).unwrap() {
                let n = iface.substrate_site_count;
                let total = iface.structure.num_sites();
                for i in 0..n {
                    for j in (i + 1)..n {
                        assert!(iface.structure.distance(i, j) >= al_bond - 1e-6);
                    }
                }

                // 薄膜受应变，键长下限按最小主伸长缩放
                let stretch = iface
                    .zsl_match
                    .match_transformation
                    .singular_values()
                    .min();
                let film_bound = sic_bond * stretch;
                for i in n..total {
                    for j in (i + 1)..total {
                        assert!(iface.structure.distance(i, j) >= film_bound - 1e-6);
                    }
                }
            }
        }
    }

    #[test]
    fn test_film_label_names_interface_face() {
        let al = fixtures::fcc("Al", 4.05);
        let sic = fixtures::zincblende("Si", "C", 4.36);
        let miller = MillerIndex::new(1, 1, 1).unwrap();
        let builder = CoherentInterfaceBuilder::create(&sic, &al, miller, miller, 100.0).unwrap();
        assert!(!builder.terminations().is_empty());
        for term in builder.terminations() {
            assert!(term.film.label.starts_with(&format!("{}_", term.film.bottom_layer)));
            assert!(term
                .substrate
                .label
                .starts_with(&format!("{}_", term.substrate.top_layer)));
        }
    }

    #[test]
    fn test_unbounded_yields_every_match() {
        let builder = al_sic_builder(120.0);
        let term = builder.terminations()[0].clone();
        let count = builder
            .produce_interfaces(&term, 1, 1, 2.0, None)
            .unwrap()
            .count();
        assert_eq!(count, builder.match_count());
    }

    #[test]
    fn test_production_is_repeatable() {
        let builder = al_sic_builder(200.0);
        let term = builder.terminations()[0].clone();
        let first = builder
            .produce_interfaces(&term, 2, 2, 2.0, Some(1))
            .unwrap()
            .next()
            .unwrap();
        let again = builder
            .produce_interfaces(&term, 2, 2, 2.0, Some(1))
            .unwrap()
            .next()
            .unwrap();
        assert_eq!(first, again);
    }

    #[test]
    fn test_progress_callback() {
        let builder = al_sic_builder(200.0);
        let term = builder.terminations()[0].clone();
        let mut seen = Vec::new();
        let n = builder
            .produce_interfaces(&term, 1, 1, 2.0, Some(2))
            .unwrap()
            .on_progress(|done, total| seen.push((done, total)))
            .count();
        assert_eq!(seen.len(), n);
        assert_eq!(seen.last().map(|p| p.0), Some(n));
    }

    #[test]
    fn test_in_plane_offset_shifts_film() {
        let builder = al_sic_builder(200.0);
        let term = builder.terminations()[0].clone();
        let base = builder
            .produce_interfaces(&term, 1, 1, 2.0, Some(1))
            .unwrap()
            .next()
            .unwrap();
        let config = InterfaceConfig {
            in_plane_offset: [0.25, 0.0],
            ..InterfaceConfig::default()
        };
        let shifted = builder
            .produce_interfaces_with(&term, 1, 1, Some(1), &config)
            .unwrap()
            .next()
            .unwrap();
        let n = base.substrate_site_count;
        assert_eq!(base.substrate_sites(), shifted.substrate_sites());
        let dx = shifted.structure.sites[n].frac_coords[0] - base.structure.sites[n].frac_coords[0];
        assert!((wrap_frac(dx) - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_no_matches_status() {
        let builder = al_sic_builder(10.0);
        assert_eq!(builder.match_count(), 0);
        assert!(matches!(builder.status(), BuilderStatus::NoMatches { .. }));
        assert!(matches!(
            builder.status().to_error(),
            Some(InterfaceError::NoMatches { .. })
        ));
        let term = builder.terminations()[0].clone();
        assert_eq!(
            builder
                .produce_interfaces(&term, 1, 1, 2.0, None)
                .unwrap()
                .count(),
            0
        );
    }

    #[test]
    fn test_no_terminations_status() {
        let al = fixtures::fcc("Al", 4.05);
        let sic = fixtures::zincblende("Si", "C", 4.36);
        let miller = MillerIndex::new(1, 1, 1).unwrap();
        let builder = CoherentInterfaceBuilder::with_config(
            &al,
            &sic,
            miller,
            miller,
            ZslConfig::default(),
            SlabConfig::default(),
            Arc::new(NonPolar::default()),
        )
        .unwrap();
        assert!(builder.terminations().is_empty());
        assert_eq!(
            builder.status(),
            &BuilderStatus::NoTerminations {
                side: "film".to_string()
            }
        );
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        let builder = al_sic_builder(200.0);
        let term = builder.terminations()[0].clone();
        assert!(builder.produce_interfaces(&term, 0, 2, 2.0, None).is_err());
        assert!(builder.produce_interfaces(&term, 2, 2, -1.0, None).is_err());

        let mut foreign = term.clone();
        foreign.film.shift = 0.123;
        assert!(matches!(
            builder.produce_interfaces(&foreign, 2, 2, 2.0, None),
            Err(InterfaceError::UnknownTermination(_))
        ));

        let al = fixtures::fcc("Al", 4.05);
        assert!(CoherentInterfaceBuilder::create(&al, &al, hundred(), hundred(), 0.0).is_err());
    }

    #[test]
    fn test_singular_deformation_is_reported() {
        let builder = al_sic_builder(200.0);
        let term = builder.terminations()[0].clone();
        let sub = builder
            .substrate_generator()
            .build_slab(term.substrate.shift, 1, 0.0)
            .unwrap();
        let film = builder
            .film_generator()
            .build_slab(term.film.shift, 1, 0.0)
            .unwrap();
        let mut m = builder.matches()[0].clone();
        m.match_transformation = Matrix3::zeros();
        let result = stack_interface(&sub, &film, &m, 7, &InterfaceConfig::default(), 20_000);
        assert!(matches!(
            result,
            Err(InterfaceError::SingularDeformation { index: 7, .. })
        ));
    }
}
