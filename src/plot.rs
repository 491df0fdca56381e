//! # 筛选结果图表
//!
//! 使用 `plotters` 绘制应变-匹配面积散点图，最优的若干组合标注 Miller 指数。
//! 支持 PNG 和 SVG 输出。
//!
//! ## 依赖关系
//! - 被 `commands/screen.rs` 调用
//! - 使用 `analyzer.rs` 的 ScreeningResult
//! - 使用 `plotters` 渲染图表

use crate::analyzer::ScreeningResult;
use crate::error::{InterfaceError, Result};

use plotters::prelude::*;
use std::path::Path;

/// 图表参数
#[derive(Debug, Clone)]
pub struct PlotOptions {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// 标注前 N 个结果
    pub label_count: usize,
}

impl Default for PlotOptions {
    fn default() -> Self {
        PlotOptions {
            title: "Lattice matching".to_string(),
            width: 1200,
            height: 800,
            label_count: 5,
        }
    }
}

/// 生成散点图，扩展名为 `.svg` 时输出 SVG
pub fn generate_screening_plot(
    results: &[ScreeningResult],
    output_path: &Path,
    options: &PlotOptions,
) -> Result<()> {
    let use_svg = output_path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("svg"))
        .unwrap_or(false);

    if use_svg {
        let root = SVGBackend::new(output_path, (options.width, options.height)).into_drawing_area();
        draw_screening_chart(&root, results, options)?;
        root.present()
            .map_err(|e| InterfaceError::PlotError(e.to_string()))?;
    } else {
        let root =
            BitMapBackend::new(output_path, (options.width, options.height)).into_drawing_area();
        draw_screening_chart(&root, results, options)?;
        root.present()
            .map_err(|e| InterfaceError::PlotError(e.to_string()))?;
    }
    Ok(())
}

fn draw_screening_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    results: &[ScreeningResult],
    options: &PlotOptions,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE).map_err(|e| InterfaceError::PlotError(format!("{:?}", e)))?;

    let max_area = results
        .iter()
        .map(|r| r.match_area)
        .fold(0.0, f64::max)
        .max(1.0);
    let max_strain = results
        .iter()
        .map(|r| r.von_mises_strain * 100.0)
        .fold(0.0, f64::max)
        .max(0.1);

    let mut chart = ChartBuilder::on(root)
        .caption(&options.title, ("sans-serif", 28).into_font())
        .margin(30)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..max_area * 1.1, 0.0..max_strain * 1.15)
        .map_err(|e| InterfaceError::PlotError(format!("{:?}", e)))?;

    chart
        .configure_mesh()
        .x_desc("Match area (Å²)")
        .y_desc("von Mises strain (%)")
        .x_label_style(("sans-serif", 16))
        .y_label_style(("sans-serif", 16))
        .axis_desc_style(("sans-serif", 18))
        .draw()
        .map_err(|e| InterfaceError::PlotError(format!("{:?}", e)))?;

    let point_color = RGBColor(0, 102, 204);
    chart
        .draw_series(results.iter().map(|r| {
            Circle::new(
                (r.match_area, r.von_mises_strain * 100.0),
                4,
                point_color.mix(0.7).filled(),
            )
        }))
        .map_err(|e| InterfaceError::PlotError(format!("{:?}", e)))?;

    // 结果已按应变排序，前几个即最优
    let best_color = RGBColor(204, 51, 0);
    for r in results.iter().take(options.label_count) {
        let pos = (r.match_area, r.von_mises_strain * 100.0);
        chart
            .draw_series(std::iter::once(Circle::new(pos, 6, best_color.filled())))
            .map_err(|e| InterfaceError::PlotError(format!("{:?}", e)))?;
        chart
            .draw_series(std::iter::once(Text::new(
                format!("{} / {}", r.film_miller, r.substrate_miller),
                (pos.0, pos.1 + max_strain * 0.03),
                ("sans-serif", 12).into_font().color(&BLACK),
            )))
            .map_err(|e| InterfaceError::PlotError(format!("{:?}", e)))?;
    }

    Ok(())
}
