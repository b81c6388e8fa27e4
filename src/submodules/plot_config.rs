use std::{collections::BTreeMap, path::{Path, PathBuf}};

use plotters::style::RGBColor;
use serde::{Deserialize, Serialize};

use super::{errors::{ComparatorError, ComparatorResult}, markers::MarkerShape, run_data::{ColumnSchema, PlotVariable}, sci_format::SciFormatter, type_lib::NumericData};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunKind {
    /// `<dir>/<problem>.exact.out`
    Exact,
    /// latest `<dir>/<problem>*plt?????.slice`
    Slice,
}

impl RunKind {
    pub fn schema(&self) -> ColumnSchema {
        match self {
            RunKind::Exact => ColumnSchema::exact(),
            RunKind::Slice => ColumnSchema::slice(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub name: String,
    pub kind: RunKind,
    /// Relative to the data directory. Defaults to `exact` for the exact run
    /// and to the run name otherwise.
    #[serde(default)]
    pub dir: Option<PathBuf>,
    /// Overrides the built-in column layout for this kind of run.
    #[serde(default)]
    pub schema: Option<ColumnSchema>,
}

impl RunConfig {
    pub fn exact() -> Self {
        RunConfig { name: "exact".to_string(), kind: RunKind::Exact, dir: None, schema: None }
    }

    pub fn slice(name: &str) -> Self {
        RunConfig { name: name.to_string(), kind: RunKind::Slice, dir: None, schema: None }
    }

    pub fn data_dir(&self, base: &Path) -> PathBuf {
        match (&self.dir, self.kind) {
            (Some(dir), _) => base.join(dir),
            (None, RunKind::Exact) => base.join("exact"),
            (None, RunKind::Slice) => base.join(&self.name),
        }
    }

    pub fn exact_file(&self, base: &Path, problem: &str) -> PathBuf {
        self.data_dir(base).join(format!("{}.exact.out", problem))
    }

    pub fn column_schema(&self) -> ColumnSchema {
        self.schema.unwrap_or_else(|| self.kind.schema())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunStyle {
    pub marker: MarkerShape,
    pub color: [u8; 3],
    /// Marker area in points^2.
    pub size: NumericData,
}

impl RunStyle {
    pub fn new(marker: MarkerShape, color: [u8; 3], size: NumericData) -> Self {
        RunStyle { marker, color, size }
    }

    pub fn rgb(&self) -> RGBColor {
        RGBColor(self.color[0], self.color[1], self.color[2])
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FigureConfig {
    /// Inches.
    pub width: NumericData,
    pub height: NumericData,
    pub dpi: NumericData,
    /// Points.
    pub font_size: NumericData,
    pub legend_font_size: NumericData,
    pub legend_border: bool,
    pub exact_color: [u8; 3],
    pub dotted_alpha: NumericData,
    pub x_power_limits: (i32, i32),
}

impl Default for FigureConfig {
    fn default() -> Self {
        FigureConfig {
            width: 7.0,
            height: 9.0,
            dpi: 100.0,
            font_size: 12.0,
            legend_font_size: 9.0,
            legend_border: false,
            exact_color: [0, 0, 0],
            dotted_alpha: 0.75,
            x_power_limits: (-3, 3),
        }
    }
}

impl FigureConfig {
    pub fn pixel_size(&self) -> (u32, u32) {
        ((self.width * self.dpi).round() as u32, (self.height * self.dpi).round() as u32)
    }

    /// Font size in pixels for a size given in points.
    pub fn font_px(&self, points: NumericData) -> NumericData {
        points * self.dpi / 72.0
    }

    pub fn x_formatter(&self) -> SciFormatter {
        SciFormatter::new(self.x_power_limits)
    }

    pub fn exact_rgb(&self) -> RGBColor {
        RGBColor(self.exact_color[0], self.exact_color[1], self.exact_color[2])
    }
}

/// What to do when a solver run cannot be loaded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingRunPolicy {
    #[default]
    Abort,
    Skip,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonConfig {
    pub problems: Vec<String>,
    pub runs: Vec<RunConfig>,
    pub palette: Vec<RunStyle>,
    pub x_max: BTreeMap<String, NumericData>,
    pub variable: PlotVariable,
    pub x_label: String,
    pub log_y: bool,
    pub figure: FigureConfig,
    pub missing_runs: MissingRunPolicy,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        let x_max = [("test1", 1.0e6), ("test2", 1.0e5), ("test3", 2.0e5)]
            .into_iter()
            .map(|(p, x)| (p.to_string(), x))
            .collect();

        ComparisonConfig {
            problems: vec!["test1".to_string()],
            runs: vec![
                RunConfig::exact(),
                RunConfig::slice("MC"),
                RunConfig::slice("MC-ev"),
                RunConfig::slice("MC-ppmT-I-ev"),
            ],
            palette: vec![
                RunStyle::new(MarkerShape::Circle, [255, 0, 0], 12.0),
                RunStyle::new(MarkerShape::Cross, [0, 0, 255], 12.0),
                RunStyle::new(MarkerShape::Plus, [191, 0, 191], 25.0),
                RunStyle::new(MarkerShape::Star, [0, 128, 0], 15.0),
                RunStyle::new(MarkerShape::Diamond, [0, 191, 191], 10.0),
                RunStyle::new(MarkerShape::Hexagon, [128, 128, 128], 10.0),
            ],
            x_max,
            variable: PlotVariable::Temperature,
            x_label: "x".to_string(),
            log_y: true,
            figure: FigureConfig::default(),
            missing_runs: MissingRunPolicy::Abort,
        }
    }
}

impl ComparisonConfig {
    pub fn from_json_file(path: &Path) -> ComparatorResult<Self> {
        let file = std::fs::read_to_string(path).map_err(|e| ComparatorError::io(path, e))?;
        let config: ComparisonConfig = serde_json::from_str(&file)
            .map_err(|e| ComparatorError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> ComparatorResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| ComparatorError::Config(e.to_string()))
    }

    pub fn validate(&self) -> ComparatorResult<()> {
        if self.palette.is_empty() {
            return Err(ComparatorError::Config("palette must contain at least one style".into()));
        }
        if self.runs.iter().filter(|run| run.kind == RunKind::Exact).count() > 1 {
            return Err(ComparatorError::Config("at most one exact run is supported".into()));
        }
        for problem in &self.problems {
            let x_max = self.x_max_for(problem)?;
            if !x_max.is_finite() || x_max <= 0.0 {
                return Err(ComparatorError::Config(format!("x_max for {} must be positive, got {}", problem, x_max)));
            }
        }
        let f = &self.figure;
        if f.width <= 0.0 || f.height <= 0.0 || f.dpi <= 0.0 {
            return Err(ComparatorError::Config("figure size and dpi must be positive".into()));
        }
        Ok(())
    }

    pub fn x_max_for(&self, problem: &str) -> ComparatorResult<NumericData> {
        self.x_max
            .get(problem)
            .copied()
            .ok_or_else(|| ComparatorError::UnknownProblem(problem.to_string()))
    }

    /// Style of the `index`-th solver run, cycling through the palette.
    pub fn style_for(&self, index: usize) -> RunStyle {
        self.palette[index % self.palette.len()]
    }
}
