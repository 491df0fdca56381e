//! # slab 命令实现
//!
//! 从体相结构切出表面 slab，每个（或指定的）终止面写出一个 POSCAR。
//!
//! ## 依赖关系
//! - 使用 `cli/slab.rs` 定义的参数
//! - 使用 `surface/slab.rs`, `parsers/poscar.rs`
//! - 使用 `utils/output.rs`

use super::{load_structure, termination_policy};
use crate::cli::slab::SlabArgs;
use crate::error::{InterfaceError, Result};
use crate::parsers::poscar;
use crate::surface::SlabGenerator;
use crate::utils::output;

use std::fs;
use tabled::{Table, Tabled};

#[derive(Debug, Clone, Tabled)]
struct SlabRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Shift")]
    shift: String,
    #[tabled(rename = "Top / bottom layer")]
    layers: String,
    #[tabled(rename = "Equivalent shifts")]
    equivalent: usize,
}

/// 执行 slab 命令
pub fn execute(args: SlabArgs) -> Result<()> {
    output::print_header(&format!("Slab {}", args.miller));

    if args.layers == 0 {
        return Err(InterfaceError::InvalidArgument(
            "--layers must be at least 1".to_string(),
        ));
    }

    let bulk = load_structure("Bulk", &args.input)?;
    let generator = SlabGenerator::new(&bulk, args.miller, args.slab.to_config())?
        .with_shared_policy(termination_policy(args.slab.non_polar));

    let cell = generator.oriented_cell();
    output::print_param("d-spacing", &format!("{:.4} Å", cell.d_spacing));
    output::print_param("Surface area", &format!("{:.3} Å²", cell.surface_area()));
    output::print_param("Sites per layer", &cell.structure.num_sites().to_string());

    let terminations = generator.generate_terminations(1)?;
    if terminations.is_empty() {
        return Err(InterfaceError::NoTerminations {
            side: format!("{} {}", bulk.reduced_formula(), args.miller),
        });
    }

    let rows: Vec<SlabRow> = terminations
        .iter()
        .enumerate()
        .map(|(i, t)| SlabRow {
            index: i,
            label: t.label.clone(),
            shift: format!("{:.4}", t.shift),
            layers: format!("{} / {}", t.top_layer, t.bottom_layer),
            equivalent: t.equivalent_shifts.len(),
        })
        .collect();
    println!("{}", Table::new(&rows));

    let selected: Vec<usize> = match args.termination {
        Some(i) if i < terminations.len() => vec![i],
        Some(i) => {
            return Err(InterfaceError::UnknownTermination(format!(
                "#{} (only {} termination(s))",
                i,
                terminations.len()
            )))
        }
        None => (0..terminations.len()).collect(),
    };

    fs::create_dir_all(&args.output).map_err(|e| InterfaceError::FileWriteError {
        path: args.output.display().to_string(),
        source: e,
    })?;

    for i in selected {
        let term = &terminations[i];
        let mut slab = generator.build_slab(term.shift, args.layers, args.vacuum)?;
        slab.structure.name = format!(
            "{} {} slab, {} layers, termination {}",
            bulk.reduced_formula(),
            args.miller,
            args.layers,
            term.label
        );
        let path = args.output.join(format!(
            "{}_{}_{}_slab.vasp",
            bulk.reduced_formula(),
            args.miller.compact(),
            term.label
        ));
        poscar::write_poscar_file(&path, &slab.structure)?;
        output::print_written(
            &format!("{} ({} sites)", term.label, slab.structure.num_sites()),
            &path,
        );
    }

    output::print_done("Slab generation finished");
    Ok(())
}
