//! # build 命令实现
//!
//! 生成共格界面结构。
//!
//! ## 功能
//! - 选择终止面组合（序号或标签，默认第一个）
//! - 按匹配顺序惰性生成前 N 个（或全部）界面，逐个写出 POSCAR
//! - 写出 `summary.csv` 汇总每个界面的应变、面积、位点数
//!
//! ## 依赖关系
//! - 使用 `cli/build.rs` 定义的参数
//! - 使用 `interface/`, `export.rs`
//! - 使用 `utils/output.rs`, `utils/progress.rs`

use super::{load_structure, termination_policy};
use crate::cli::build::BuildArgs;
use crate::error::{InterfaceError, Result};
use crate::export;
use crate::interface::{CoherentInterfaceBuilder, Interface, InterfaceConfig};
use crate::surface::Termination;
use crate::utils::{output, progress};

use std::fs;
use tabled::{Table, Tabled};

#[derive(Debug, Clone, Tabled)]
struct InterfaceRow {
    #[tabled(rename = "File")]
    file: String,
    #[tabled(rename = "Match")]
    match_index: usize,
    #[tabled(rename = "Strain (%)")]
    strain: String,
    #[tabled(rename = "Area (Å²)")]
    area: String,
    #[tabled(rename = "Sites (s/f)")]
    sites: String,
    #[tabled(rename = "Separation (Å)")]
    separation: String,
}

/// 执行 build 命令
pub fn execute(args: BuildArgs) -> Result<()> {
    output::print_header(&format!(
        "Interface: film {} on substrate {}",
        args.film_miller, args.substrate_miller
    ));

    let config = InterfaceConfig {
        gap: args.gap,
        vacuum_over_film: args.vacuum,
        in_plane_offset: args.offset,
    };
    config.validate()?;

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

    if let Some(err) = builder.status().to_error() {
        return Err(err);
    }

    let termination = select_termination(&builder, args.termination.as_deref())?.clone();
    output::print_param("Termination", &termination.to_string());
    output::print_param("Matches", &builder.match_count().to_string());
    output::print_param(
        "Thickness (layers)",
        &format!(
            "film {}, substrate {}",
            args.film_thickness, args.substrate_thickness
        ),
    );
    output::print_param(
        "Gap / vacuum",
        &format!("{:.2} Å / {:.2} Å", config.gap, config.vacuum_over_film),
    );

    fs::create_dir_all(&args.output).map_err(|e| InterfaceError::FileWriteError {
        path: args.output.display().to_string(),
        source: e,
    })?;

    let interfaces = builder.produce_interfaces_with(
        &termination,
        args.film_thickness,
        args.substrate_thickness,
        args.count.limit(),
        &config,
    )?;
    let pb = progress::create_progress_bar(interfaces.expected_total() as u64, "Building");

    let mut written: Vec<(String, Interface)> = Vec::new();
    let mut skipped = 0;
    for (i, interface) in interfaces.on_progress(progress::bar_callback(&pb)).enumerate() {
        let filename = export::interface_filename(
            &substrate,
            &film,
            &args.substrate_miller,
            &args.film_miller,
            i,
        );
        let path = args.output.join(&filename);
        if path.exists() && !args.overwrite {
            pb.suspend(|| output::print_warning(&format!("Exists, skipping: {}", path.display())));
            skipped += 1;
            continue;
        }
        export::write_interface(&args.output, &filename, &interface)?;
        written.push((filename, interface));
    }
    pb.finish_and_clear();

    if written.is_empty() {
        output::print_warning(&format!(
            "No interfaces written ({} skipped as existing)",
            skipped
        ));
        return Ok(());
    }

    print_interface_table(&written);

    let summary = args.output.join("summary.csv");
    export::interfaces_to_csv(&written, &summary)?;
    output::print_written("Summary CSV", &summary);

    output::print_done(&format!(
        "Wrote {} interface(s) to '{}' ({} skipped)",
        written.len(),
        args.output.display(),
        skipped
    ));
    Ok(())
}

/// 按序号或 `film/substrate` 标签选择终止面
fn select_termination<'a>(
    builder: &'a CoherentInterfaceBuilder,
    selector: Option<&str>,
) -> Result<&'a Termination> {
    let terminations = builder.terminations();
    match selector {
        None => terminations
            .first()
            .ok_or_else(|| InterfaceError::NoTerminations {
                side: "film/substrate".to_string(),
            }),
        Some(s) => match s.parse::<usize>() {
            Ok(i) => terminations.get(i).ok_or_else(|| {
                InterfaceError::UnknownTermination(format!(
                    "#{} (only {} termination pair(s))",
                    i,
                    terminations.len()
                ))
            }),
            Err(_) => builder.find_termination(s),
        },
    }
}

fn print_interface_table(written: &[(String, Interface)]) {
    let rows: Vec<InterfaceRow> = written
        .iter()
        .map(|(file, iface)| InterfaceRow {
            file: file.clone(),
            match_index: iface.match_index,
            strain: output::fmt_strain(iface.von_mises_strain),
            area: output::fmt_area(iface.match_area),
            sites: format!("{}/{}", iface.substrate_sites().len(), iface.film_sites().len()),
            separation: format!("{:.3}", iface.interface_separation()),
        })
        .collect();

    output::print_header(&format!("{} Interface(s)", rows.len()));
    println!("{}", Table::new(&rows));
}
