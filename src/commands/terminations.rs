//! # terminations 命令实现
//!
//! 为一个取向组合列出终止面组合（供 `build --termination` 选用）和 ZSL 匹配。
//!
//! ## 依赖关系
//! - 使用 `cli/terminations.rs` 定义的参数
//! - 使用 `interface/builder.rs`
//! - 使用 `utils/output.rs`, `utils/progress.rs`

use super::{load_structure, termination_policy};
use crate::cli::terminations::TerminationsArgs;
use crate::error::Result;
use crate::interface::CoherentInterfaceBuilder;
use crate::utils::{output, progress};
use crate::zsl::ZslMatch;

use tabled::{Table, Tabled};

#[derive(Debug, Clone, Tabled)]
struct TerminationRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Film shift")]
    film_shift: String,
    #[tabled(rename = "Film layer at interface")]
    film_layer: String,
    #[tabled(rename = "Substrate shift")]
    substrate_shift: String,
    #[tabled(rename = "Substrate layer at interface")]
    substrate_layer: String,
}

#[derive(Debug, Clone, Tabled)]
pub(crate) struct MatchRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Area (Å²)")]
    area: String,
    #[tabled(rename = "Strain (%)")]
    strain: String,
    #[tabled(rename = "Max length mismatch (%)")]
    mismatch: String,
    #[tabled(rename = "Film cell")]
    film: String,
    #[tabled(rename = "Substrate cell")]
    substrate: String,
}

impl MatchRow {
    pub(crate) fn new(index: usize, m: &ZslMatch) -> Self {
        let t = |m: &[[i32; 2]; 2]| format!("[{},{};{},{}]", m[0][0], m[0][1], m[1][0], m[1][1]);
        MatchRow {
            index,
            area: output::fmt_area(m.match_area),
            strain: output::fmt_strain(m.von_mises_strain),
            mismatch: output::fmt_strain(m.max_length_mismatch()),
            film: format!("{} x{}", t(&m.film_transformation), m.film_multiplicity()),
            substrate: format!(
                "{} x{}",
                t(&m.substrate_transformation),
                m.substrate_multiplicity()
            ),
        }
    }
}

/// 执行 terminations 命令
pub fn execute(args: TerminationsArgs) -> Result<()> {
    output::print_header(&format!(
        "Terminations: film {} on substrate {}",
        args.film_miller, args.substrate_miller
    ));

    let substrate = load_structure("Substrate", &args.substrate)?;
    let film = load_structure("Film", &args.film)?;

    let spinner = progress::create_spinner("Enumerating terminations and ZSL matches");
    let builder = CoherentInterfaceBuilder::with_config(
        &substrate,
        &film,
        args.substrate_miller,
        args.film_miller,
        args.zsl.to_config(),
        args.slab.to_config(),
        termination_policy(args.slab.non_polar),
    );
    spinner.finish_and_clear();
    let builder = builder?;

    let rows: Vec<TerminationRow> = builder
        .terminations()
        .iter()
        .enumerate()
        .map(|(i, t)| TerminationRow {
            index: i,
            label: t.label(),
            film_shift: format!("{:.4}", t.film.shift),
            film_layer: t.film.bottom_layer.clone(),
            substrate_shift: format!("{:.4}", t.substrate.shift),
            substrate_layer: t.substrate.top_layer.clone(),
        })
        .collect();

    if rows.is_empty() {
        output::print_warning("No termination pairs");
    } else {
        output::print_header(&format!("{} Termination Pair(s)", rows.len()));
        println!("{}", Table::new(&rows));
    }

    output::print_info(&format!("{} ZSL match(es)", builder.match_count()));
    if !builder.status().is_ready() {
        output::print_warning(&builder.status().to_string());
        return Ok(());
    }

    if args.show_matches > 0 {
        let rows: Vec<MatchRow> = builder
            .matches()
            .iter()
            .take(args.show_matches)
            .enumerate()
            .map(|(i, m)| MatchRow::new(i, m))
            .collect();
        output::print_header(&format!("First {} Match(es)", rows.len()));
        println!("{}", Table::new(&rows));
    }

    Ok(())
}
