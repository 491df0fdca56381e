//! # screen 命令实现
//!
//! 取向组合筛选。
//!
//! ## 功能
//! - 单文件模式：一个衬底对一个薄膜，输出排序表格、CSV、散点图
//! - 批量模式：薄膜参数为目录时，并行筛选其中每个结构文件，
//!   每个任务持有自己的分析器，汇总每个薄膜的最优组合
//!
//! ## 依赖关系
//! - 使用 `cli/screen.rs` 定义的参数
//! - 使用 `analyzer.rs`, `batch/`, `export.rs`, `plot.rs`
//! - 使用 `utils/output.rs`, `utils/progress.rs`

use super::load_structure;
use crate::analyzer::{ScreeningResult, SubstrateAnalyzer};
use crate::batch::{BatchRunner, FileCollector, ProcessResult};
use crate::cli::screen::ScreenArgs;
use crate::error::{InterfaceError, Result};
use crate::export;
use crate::models::Structure;
use crate::parsers;
use crate::plot::{self, PlotOptions};
use crate::utils::{output, progress};
use crate::zsl::ZslConfig;

use std::path::PathBuf;
use tabled::{Table, Tabled};

/// 筛选结果行
#[derive(Debug, Clone, Tabled)]
struct ScreenRow {
    #[tabled(rename = "Rank")]
    rank: usize,
    #[tabled(rename = "Film")]
    film: String,
    #[tabled(rename = "Substrate")]
    substrate: String,
    #[tabled(rename = "Strain (%)")]
    strain: String,
    #[tabled(rename = "Area (Å²)")]
    area: String,
    #[tabled(rename = "Cells (f/s)")]
    cells: String,
    #[tabled(rename = "Matches")]
    matches: usize,
}

/// 批量汇总行
#[derive(Debug, Clone, Tabled)]
struct FilmRow {
    #[tabled(rename = "Rank")]
    rank: usize,
    #[tabled(rename = "Film file")]
    file: String,
    #[tabled(rename = "Film")]
    film: String,
    #[tabled(rename = "Substrate")]
    substrate: String,
    #[tabled(rename = "Strain (%)")]
    strain: String,
    #[tabled(rename = "Area (Å²)")]
    area: String,
}

/// 执行 screen 命令
pub fn execute(args: ScreenArgs) -> Result<()> {
    output::print_header("Substrate / Film Orientation Screening");

    let zsl = args.zsl.to_config();
    zsl.validate()?;

    if args.film.is_file() {
        execute_single(&args, zsl)
    } else if args.film.is_dir() {
        execute_batch(&args, zsl)
    } else {
        Err(InterfaceError::FileNotFound {
            path: args.film.display().to_string(),
        })
    }
}

fn print_parameters(args: &ScreenArgs) {
    output::print_param("Film max index", &args.film_max_miller.to_string());
    output::print_param("Substrate max index", &args.substrate_max_miller.to_string());
    output::print_param("Max area", &format!("{:.1} Å²", args.zsl.max_area));
    output::print_param(
        "Tolerances",
        &format!(
            "length {:.3}, angle {:.3}, area ratio {:.3}",
            args.zsl.max_length_tol, args.zsl.max_angle_tol, args.zsl.max_area_ratio_tol
        ),
    );
}

/// 单文件模式
fn execute_single(args: &ScreenArgs, zsl: ZslConfig) -> Result<()> {
    let substrate = load_structure("Substrate", &args.substrate)?;
    let film = load_structure("Film", &args.film)?;
    print_parameters(args);

    let analyzer = SubstrateAnalyzer::new(zsl)?;
    let pb = progress::create_progress_bar(0, "Orientation pairs");
    let results = analyzer.screen_with_progress(
        &substrate,
        &film,
        args.film_max_miller,
        args.substrate_max_miller,
        args.zsl.max_area,
        progress::bar_callback(&pb),
    );
    pb.finish_and_clear();
    let results = results?;

    if results.is_empty() {
        output::print_warning(&format!(
            "No orientation pair matched within {:.1} Å² (try a larger --max-area or looser tolerances)",
            args.zsl.max_area
        ));
        return Ok(());
    }

    output::print_success(&format!(
        "{} orientation pair(s) with at least one match",
        results.len()
    ));
    print_result_table(&results, args.top);

    if let Some(csv_path) = &args.output_csv {
        export::screening_to_csv(&results, csv_path)?;
        output::print_written("Ranking CSV", csv_path);
    }

    if let Some(plot_path) = &args.plot {
        let options = PlotOptions {
            title: format!(
                "{} on {}",
                film.reduced_formula(),
                substrate.reduced_formula()
            ),
            ..PlotOptions::default()
        };
        plot::generate_screening_plot(&results, plot_path, &options)?;
        output::print_written("Plot", plot_path);
    }

    Ok(())
}

/// 批量处理模式
fn execute_batch(args: &ScreenArgs, zsl: ZslConfig) -> Result<()> {
    output::print_info(&format!("Batch mode: directory '{}'", args.film.display()));

    let substrate = load_structure("Substrate", &args.substrate)?;
    print_parameters(args);

    let mut collector = FileCollector::new(args.film.clone()).recursive(args.recursive);
    if let Some(pattern) = &args.pattern {
        collector = collector.with_pattern(pattern)?;
    }
    let files = collector.collect()?;

    if files.is_empty() {
        output::print_warning(&format!(
            "No film structure files found under '{}'",
            args.film.display()
        ));
        return Ok(());
    }

    output::print_info(&format!("Found {} film structures", files.len()));

    let runner = BatchRunner::new(args.jobs);
    output::print_info(&format!("Running on {} thread(s)", runner.jobs()));

    let result = runner.run(files, |file| screen_film(file, &substrate, &zsl, args))?;

    output::print_separator();
    output::print_success(&format!(
        "Batch complete: {} matched, {} without matches, {} failed",
        result.success(),
        result.skipped,
        result.failed()
    ));

    if !result.failures.is_empty() {
        output::print_warning("Failed files:");
        for (path, err) in result.failures.iter().take(10) {
            output::print_error(&format!("  {}: {}", path, err));
        }
        if result.failures.len() > 10 {
            output::print_warning(&format!("  ... and {} more", result.failures.len() - 10));
        }
    }

    let mut ranking = result.outputs;
    ranking.sort_by(|a, b| {
        a.1.von_mises_strain
            .total_cmp(&b.1.von_mises_strain)
            .then(a.1.match_area.total_cmp(&b.1.match_area))
    });

    if ranking.is_empty() {
        return Ok(());
    }
    print_film_table(&ranking, args.top);

    if let Some(csv_path) = &args.output_csv {
        export::film_ranking_to_csv(&ranking, csv_path)?;
        output::print_written("Film ranking CSV", csv_path);
    }

    if let Some(plot_path) = &args.plot {
        let best: Vec<ScreeningResult> = ranking.iter().map(|(_, r)| r.clone()).collect();
        let options = PlotOptions {
            title: format!("Films on {}", substrate.reduced_formula()),
            ..PlotOptions::default()
        };
        plot::generate_screening_plot(&best, plot_path, &options)?;
        output::print_written("Plot", plot_path);
    }

    Ok(())
}

/// 批量模式中的单个薄膜：返回 (文件名, 最优组合)
fn screen_film(
    file: &PathBuf,
    substrate: &Structure,
    zsl: &ZslConfig,
    args: &ScreenArgs,
) -> ProcessResult<(String, ScreeningResult)> {
    let label = file.display().to_string();
    let film = match parsers::parse_structure_file(file) {
        Ok(s) => s,
        Err(e) => return ProcessResult::Failed(label, e.to_string()),
    };

    let analyzer = match SubstrateAnalyzer::new(zsl.clone()) {
        Ok(a) => a,
        Err(e) => return ProcessResult::Failed(label, e.to_string()),
    };

    match analyzer.screen(
        substrate,
        &film,
        args.film_max_miller,
        args.substrate_max_miller,
        args.zsl.max_area,
    ) {
        Ok(results) => match results.into_iter().next() {
            Some(best) => ProcessResult::Success((label, best)),
            None => ProcessResult::Skipped(label),
        },
        Err(e) => ProcessResult::Failed(label, e.to_string()),
    }
}

fn print_result_table(results: &[ScreeningResult], top: usize) {
    let rows: Vec<ScreenRow> = results
        .iter()
        .take(top)
        .enumerate()
        .map(|(i, r)| ScreenRow {
            rank: i + 1,
            film: r.film_miller.to_string(),
            substrate: r.substrate_miller.to_string(),
            strain: output::fmt_strain(r.von_mises_strain),
            area: output::fmt_area(r.match_area),
            cells: format!(
                "{}/{}",
                r.best_match.film_multiplicity(),
                r.best_match.substrate_multiplicity()
            ),
            matches: r.match_count,
        })
        .collect();

    if !rows.is_empty() {
        output::print_header(&format!("Top {} Orientation Pairs", rows.len()));
        println!("{}", Table::new(&rows));
    }
}

fn print_film_table(ranking: &[(String, ScreeningResult)], top: usize) {
    let rows: Vec<FilmRow> = ranking
        .iter()
        .take(top)
        .enumerate()
        .map(|(i, (file, r))| FilmRow {
            rank: i + 1,
            file: file.clone(),
            film: r.film_miller.to_string(),
            substrate: r.substrate_miller.to_string(),
            strain: output::fmt_strain(r.von_mises_strain),
            area: output::fmt_area(r.match_area),
        })
        .collect();

    output::print_header(&format!("Top {} Films", rows.len()));
    println!("{}", Table::new(&rows));
}
