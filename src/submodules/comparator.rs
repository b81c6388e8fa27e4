use std::path::PathBuf;

use plotters::{
    coord::{ranged1d::{AsRangedCoord, ValueFormatter}, Shift},
    prelude::*,
};

use super::{
    dump::dump_json,
    eps_backend::EpsBackend,
    errors::{ComparatorError, ComparatorResult},
    markers::{marker_radius, DottedPolyline, Marker},
    plot_config::{ComparisonConfig, MissingRunPolicy, RunConfig, RunKind, RunStyle},
    run_data::RunDataset,
    slice_files::latest_slice,
    type_lib::NumericData,
};

type Point = (NumericData, NumericData);

pub struct LoadedRun {
    pub name: String,
    /// `None` for the exact solution, drawn as a solid line.
    pub style: Option<RunStyle>,
    pub data: RunDataset,
}

pub struct ProblemData {
    pub problem: String,
    pub x_max: NumericData,
    pub runs: Vec<LoadedRun>,
}

pub struct ModelComparator {
    pub config: ComparisonConfig,
    pub data_dir: PathBuf,
    pub out_dir: PathBuf,
    pub dump_dir: Option<PathBuf>,
}

impl ModelComparator {
    pub fn new(config: ComparisonConfig, data_dir: impl Into<PathBuf>, out_dir: impl Into<PathBuf>) -> Self {
        ModelComparator {
            config,
            data_dir: data_dir.into(),
            out_dir: out_dir.into(),
            dump_dir: None,
        }
    }

    pub fn with_dump_dir(mut self, dump_dir: impl Into<PathBuf>) -> Self {
        self.dump_dir = Some(dump_dir.into());
        self
    }

    /// Plots every configured problem. Stops at the first failure; figures of
    /// earlier problems stay on disk.
    pub fn run(&self) -> ComparatorResult<Vec<PathBuf>> {
        self.config.validate()?;
        std::fs::create_dir_all(&self.out_dir).map_err(|e| ComparatorError::io(&self.out_dir, e))?;
        if let Some(dir) = &self.dump_dir {
            std::fs::create_dir_all(dir).map_err(|e| ComparatorError::io(dir, e))?;
        }

        let mut written = Vec::new();
        for problem in &self.config.problems {
            log::info!("problem {}", problem);
            let data = self.load_problem(problem)?;
            written.extend(self.save(&data)?);
        }
        Ok(written)
    }

    pub fn load_problem(&self, problem: &str) -> ComparatorResult<ProblemData> {
        let x_max = self.config.x_max_for(problem)?;
        log::info!(
            "{}: loading {} runs from {}, plotting {}",
            problem,
            self.config.runs.len(),
            self.data_dir.display(),
            self.config.variable.to_str()
        );

        let mut runs = Vec::new();
        let mut slice_index = 0;
        for run in &self.config.runs {
            let style = match run.kind {
                RunKind::Exact => None,
                RunKind::Slice => {
                    slice_index += 1;
                    Some(self.config.style_for(slice_index - 1))
                }
            };

            let data = match self.load_run(run, problem) {
                Ok(data) => data,
                Err(e) if run.kind == RunKind::Slice && self.config.missing_runs == MissingRunPolicy::Skip => {
                    log::warn!("skipping run '{}' for {}: {}", run.name, problem, e);
                    continue;
                }
                Err(e) => return Err(e),
            };
            match style {
                Some(style) => log::debug!("{}: {} samples, marker '{}'", run.name, data.len(), style.marker.to_str()),
                None => log::debug!("{}: {} samples", run.name, data.len()),
            }

            if let Some(dir) = &self.dump_dir {
                dump_json(&data, &dir.join(format!("{}-{}.json", problem, run.name)))?;
            }
            runs.push(LoadedRun { name: run.name.clone(), style, data });
        }

        if runs.is_empty() {
            return Err(ComparatorError::Config(format!("no runs could be loaded for {}", problem)));
        }
        Ok(ProblemData { problem: problem.to_string(), x_max, runs })
    }

    fn load_run(&self, run: &RunConfig, problem: &str) -> ComparatorResult<RunDataset> {
        let path = match run.kind {
            RunKind::Exact => run.exact_file(&self.data_dir, problem),
            RunKind::Slice => latest_slice(&run.data_dir(&self.data_dir), problem)?,
        };
        let data = RunDataset::load(&path, &run.column_schema())?;
        check_plottable(&run.name, data.field(&self.config.variable).iter(), self.config.log_y)?;
        Ok(data)
    }

    pub fn output_paths(&self, problem: &str) -> (PathBuf, PathBuf) {
        (
            self.out_dir.join(format!("{}-final.png", problem)),
            self.out_dir.join(format!("{}-final.eps", problem)),
        )
    }

    pub fn save(&self, data: &ProblemData) -> ComparatorResult<Vec<PathBuf>> {
        let size = self.config.figure.pixel_size();
        let (png, eps) = self.output_paths(&data.problem);

        log::info!("writing {}", png.display());
        {
            let root = BitMapBackend::new(&png, size).into_drawing_area();
            self.render(&root, data)?;
            root.present().map_err(ComparatorError::plot)?;
        }

        log::info!("writing {}", eps.display());
        {
            let root = EpsBackend::new(&eps, size, self.config.figure.dpi).into_drawing_area();
            self.render(&root, data)?;
            root.present().map_err(ComparatorError::plot)?;
        }

        Ok(vec![png, eps])
    }

    pub fn render<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>, data: &ProblemData) -> ComparatorResult<()> {
        let (y_lo, y_hi) = self.y_bounds(data);
        if self.config.log_y {
            self.draw_chart(root, data, (y_lo..y_hi).log_scale())
        } else {
            self.draw_chart(root, data, y_lo..y_hi)
        }
    }

    fn y_bounds(&self, data: &ProblemData) -> (NumericData, NumericData) {
        let variable = &self.config.variable;
        let in_range: Vec<NumericData> = data
            .runs
            .iter()
            .flat_map(|run| clip_to_x(&run.data.points(variable), 0.0, data.x_max).into_iter().flatten())
            .map(|(_, y)| y)
            .collect();
        let values: Vec<NumericData> = if in_range.is_empty() {
            data.runs.iter().flat_map(|run| run.data.field(variable).iter().copied()).collect()
        } else {
            in_range
        };
        let lo = values.iter().copied().fold(NumericData::INFINITY, NumericData::min);
        let hi = values.iter().copied().fold(NumericData::NEG_INFINITY, NumericData::max);
        pad_range(lo, hi, self.config.log_y)
    }

    fn draw_chart<DB, Y>(&self, root: &DrawingArea<DB, Shift>, data: &ProblemData, y_spec: Y) -> ComparatorResult<()>
    where
        DB: DrawingBackend,
        Y: AsRangedCoord<Value = NumericData>,
        Y::CoordDescType: ValueFormatter<NumericData>,
    {
        let figure = &self.config.figure;
        let variable = &self.config.variable;
        let font_px = figure.font_px(figure.font_size);
        let legend_px = figure.font_px(figure.legend_font_size);

        root.fill(&WHITE).map_err(ComparatorError::plot)?;

        let mut chart = ChartBuilder::on(root)
            .margin((font_px * 1.5) as u32)
            .x_label_area_size((font_px * 3.5) as u32)
            .y_label_area_size((font_px * 5.0) as u32)
            .build_cartesian_2d(0.0..data.x_max, y_spec)
            .map_err(ComparatorError::plot)?;

        let formatter = figure.x_formatter();
        let exponent = formatter.exponent(0.0, data.x_max);
        let x_label = formatter.axis_label(&self.config.x_label, exponent);
        let x_fmt = |x: &NumericData| formatter.format_tick(*x, exponent);
        let log_y = self.config.log_y;
        let y_fmt = |y: &NumericData| if log_y { format!("{:e}", y) } else { formatter.format_tick(*y, 0) };

        chart
            .configure_mesh()
            .disable_mesh()
            .x_labels(6)
            .y_labels(10)
            .x_label_formatter(&x_fmt)
            .y_label_formatter(&y_fmt)
            .x_desc(x_label)
            .y_desc(variable.axis_label())
            .label_style(("sans-serif", font_px))
            .axis_desc_style(("sans-serif", font_px))
            .draw()
            .map_err(ComparatorError::plot)?;

        // dotted guides go underneath everything else
        for run in &data.runs {
            if let Some(style) = run.style {
                let color = style.rgb().mix(figure.dotted_alpha);
                for piece in clip_to_x(&run.data.points(variable), 0.0, data.x_max) {
                    chart
                        .draw_series(std::iter::once(DottedPolyline::new(piece, 2, 3, color)))
                        .map_err(ComparatorError::plot)?;
                }
            }
        }

        for run in data.runs.iter().filter(|run| run.style.is_none()) {
            let color = figure.exact_rgb();
            let pieces = clip_to_x(&run.data.points(variable), 0.0, data.x_max);
            for (i, piece) in pieces.into_iter().enumerate() {
                let anno = chart
                    .draw_series(LineSeries::new(piece, color.stroke_width(2)))
                    .map_err(ComparatorError::plot)?;
                if i == 0 {
                    anno.label(run.name.as_str())
                        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
                }
            }
        }

        for run in &data.runs {
            let Some(style) = run.style else { continue };
            let color = style.rgb();
            let radius = marker_radius(style.size, figure.dpi);
            let shape = style.marker;
            let inside = run
                .data
                .points(variable)
                .into_iter()
                .filter(|(x, _)| (0.0..=data.x_max).contains(x));
            chart
                .draw_series(inside.map(|point| Marker::new(point, shape, radius, color.filled())))
                .map_err(ComparatorError::plot)?
                .label(run.name.as_str())
                .legend(move |(x, y)| Marker::new((x + 10, y), shape, radius.max(3), color.filled()));
        }

        let (border, background) = if figure.legend_border {
            (BLACK.mix(1.0), WHITE.mix(0.8))
        } else {
            (TRANSPARENT, TRANSPARENT)
        };
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .label_font(("sans-serif", legend_px))
            .border_style(border)
            .background_style(background)
            .draw()
            .map_err(ComparatorError::plot)?;

        Ok(())
    }
}

/// Every plotted value must be finite, and strictly positive on a log axis.
pub fn check_plottable<'a, I: Iterator<Item = &'a NumericData>>(run: &str, values: I, log_y: bool) -> ComparatorResult<()> {
    for (index, &value) in values.enumerate() {
        if !value.is_finite() {
            return Err(ComparatorError::NonFiniteValue { run: run.to_string(), index, value });
        }
        if log_y && value <= 0.0 {
            return Err(ComparatorError::NonPositiveValue { run: run.to_string(), index, value });
        }
    }
    Ok(())
}

fn pad_range(lo: NumericData, hi: NumericData, log: bool) -> (NumericData, NumericData) {
    if log {
        if lo == hi {
            (lo / 2.0, hi * 2.0)
        } else {
            let span = (hi / lo).log10();
            let pad = 10f64.powf(0.05 * span);
            (lo / pad, hi * pad)
        }
    } else if lo == hi {
        (lo - 1.0, hi + 1.0)
    } else {
        let pad = 0.05 * (hi - lo);
        (lo - pad, hi + pad)
    }
}

fn clip_segment(a: Point, b: Point, lo: NumericData, hi: NumericData) -> Option<(Point, Point)> {
    let dx = b.0 - a.0;
    if dx == 0.0 {
        return (lo..=hi).contains(&a.0).then_some((a, b));
    }
    let (t_lo, t_hi) = ((lo - a.0) / dx, (hi - a.0) / dx);
    let (t0, t1) = if dx > 0.0 { (t_lo, t_hi) } else { (t_hi, t_lo) };
    let (t0, t1) = (t0.max(0.0), t1.min(1.0));
    if t0 > t1 {
        return None;
    }
    let at = |t: NumericData| if t == 0.0 { a } else if t == 1.0 { b } else { (a.0 + t * dx, a.1 + t * (b.1 - a.1)) };
    Some((at(t0), at(t1)))
}

/// Splits a polyline into the pieces that fall inside `lo..=hi` on x,
/// interpolating the crossing points.
pub fn clip_to_x(points: &[Point], lo: NumericData, hi: NumericData) -> Vec<Vec<Point>> {
    if let [single] = points {
        return if (lo..=hi).contains(&single.0) { vec![vec![*single]] } else { Vec::new() };
    }

    let mut pieces = Vec::new();
    let mut current: Vec<Point> = Vec::new();
    for pair in points.windows(2) {
        match clip_segment(pair[0], pair[1], lo, hi) {
            Some((start, end)) => {
                if current.last() != Some(&start) {
                    if !current.is_empty() {
                        pieces.push(std::mem::take(&mut current));
                    }
                    current.push(start);
                }
                current.push(end);
            }
            None => {
                if !current.is_empty() {
                    pieces.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}
