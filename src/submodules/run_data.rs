use std::path::Path;

use ndarray::{Array1, Axis, Zip};
use serde::{Deserialize, Serialize};

use super::{data_read::read_table, errors::{ComparatorError, ComparatorResult}, type_lib::{NumericData, Series, Table}};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VelocityColumn {
    Direct(usize),
    /// Momentum column, divided by density on load.
    Momentum(usize),
}

impl VelocityColumn {
    fn index(&self) -> usize {
        match self {
            VelocityColumn::Direct(i) | VelocityColumn::Momentum(i) => *i,
        }
    }
}

/// Where each physical variable lives in a data file.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub position: usize,
    pub density: usize,
    pub velocity: VelocityColumn,
    pub pressure: usize,
    pub temperature: usize,
}

impl ColumnSchema {
    pub fn exact() -> Self {
        ColumnSchema {
            position: 1,
            density: 2,
            velocity: VelocityColumn::Direct(3),
            pressure: 4,
            temperature: 5,
        }
    }

    pub fn slice() -> Self {
        ColumnSchema {
            position: 0,
            density: 1,
            velocity: VelocityColumn::Momentum(2),
            pressure: 10,
            temperature: 6,
        }
    }

    pub fn required_columns(&self) -> usize {
        [self.position, self.density, self.velocity.index(), self.pressure, self.temperature]
            .into_iter()
            .max()
            .unwrap_or(0)
            + 1
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlotVariable {
    Density,
    Velocity,
    Pressure,
    Temperature,
}

impl PlotVariable {
    pub fn to_str(&self) -> &str {
        match self {
            PlotVariable::Density => "density",
            PlotVariable::Velocity => "velocity",
            PlotVariable::Pressure => "pressure",
            PlotVariable::Temperature => "temperature",
        }
    }

    pub fn axis_label(&self) -> &str {
        match self {
            PlotVariable::Density => "density (g/cm^3)",
            PlotVariable::Velocity => "velocity (cm/s)",
            PlotVariable::Pressure => "pressure (erg/cm^3)",
            PlotVariable::Temperature => "temperature (K)",
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct RunDataset {
    pub x: Series,
    pub rho: Series,
    pub u: Series,
    pub p: Series,
    pub t: Series,
}

impl RunDataset {
    pub fn load(path: &Path, schema: &ColumnSchema) -> ComparatorResult<Self> {
        let table = read_table(path)?;
        RunDataset::from_table(&table, schema, path)
    }

    pub fn from_table(table: &Table, schema: &ColumnSchema, origin: &Path) -> ComparatorResult<Self> {
        let expected = schema.required_columns();
        if table.ncols() < expected {
            return Err(ComparatorError::SchemaMismatch {
                path: origin.to_path_buf(),
                expected,
                found: table.ncols(),
            });
        }

        let column = |i: usize| table.index_axis(Axis(1), i).to_owned();
        let x = column(schema.position);
        if let Some(row) = x.iter().position(|v| !v.is_finite()) {
            return Err(ComparatorError::InvalidValue {
                path: origin.to_path_buf(),
                row,
                message: format!("non-finite position {}", x[row]),
            });
        }
        let rho = column(schema.density);
        let u = match schema.velocity {
            VelocityColumn::Direct(i) => column(i),
            VelocityColumn::Momentum(i) => {
                if let Some(row) = rho.iter().position(|&r| r == 0.0) {
                    return Err(ComparatorError::InvalidValue {
                        path: origin.to_path_buf(),
                        row,
                        message: "zero density, cannot derive velocity from momentum".into(),
                    });
                }
                let mut u = column(i);
                Zip::from(&mut u).and(&rho).for_each(|u, &r| *u /= r);
                u
            }
        };

        Ok(RunDataset {
            x,
            rho,
            u,
            p: column(schema.pressure),
            t: column(schema.temperature),
        })
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn field(&self, variable: &PlotVariable) -> &Array1<NumericData> {
        match variable {
            PlotVariable::Density => &self.rho,
            PlotVariable::Velocity => &self.u,
            PlotVariable::Pressure => &self.p,
            PlotVariable::Temperature => &self.t,
        }
    }

    pub fn points(&self, variable: &PlotVariable) -> Vec<(NumericData, NumericData)> {
        self.x.iter().zip(self.field(variable).iter()).map(|(x, y)| (*x, *y)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    const TOL: NumericData = 1e-12;

    fn slice_table() -> Table {
        // 11 columns: x rho mom . . . T . . . p
        array![
            [0.0, 1.0, 2.0, 0.0, 0.0, 0.0, 1.0e9, 0.0, 0.0, 0.0, 5.0],
            [1.0, 2.0, 4.0, 0.0, 0.0, 0.0, 2.0e9, 0.0, 0.0, 0.0, 6.0],
            [2.0, 4.0, 2.0, 0.0, 0.0, 0.0, 3.0e9, 0.0, 0.0, 0.0, 7.0],
        ]
    }

    #[test]
    fn test_required_columns() {
        assert_eq!(ColumnSchema::exact().required_columns(), 6);
        assert_eq!(ColumnSchema::slice().required_columns(), 11);
    }

    #[test]
    fn test_slice_velocity_is_momentum_over_density() {
        let data = RunDataset::from_table(&slice_table(), &ColumnSchema::slice(), Path::new("mem")).unwrap();
        assert_eq!(data.len(), 3);
        assert!((data.u[0] - 2.0).abs() < TOL);
        assert!((data.u[1] - 2.0).abs() < TOL);
        assert!((data.u[2] - 0.5).abs() < TOL);
        assert!((data.p[1] - 6.0).abs() < TOL);
        assert!((data.t[2] - 3.0e9).abs() < TOL);
    }

    #[test]
    fn test_exact_columns() {
        let table = array![
            [0.0, 0.1, 1.0, 0.3, 10.0, 100.0],
            [1.0, 0.2, 2.0, 0.4, 20.0, 200.0],
        ];
        let data = RunDataset::from_table(&table, &ColumnSchema::exact(), Path::new("mem")).unwrap();
        assert!((data.x[1] - 0.2).abs() < TOL);
        assert!((data.rho[0] - 1.0).abs() < TOL);
        assert!((data.u[0] - 0.3).abs() < TOL);
        assert!((data.p[1] - 20.0).abs() < TOL);
        assert!((data.t[1] - 200.0).abs() < TOL);
    }

    #[test]
    fn test_schema_mismatch() {
        let table = array![[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]];
        let result = RunDataset::from_table(&table, &ColumnSchema::slice(), Path::new("MC/test1_plt00010.slice"));
        match result {
            Err(ComparatorError::SchemaMismatch { expected, found, .. }) => {
                assert_eq!(expected, 11);
                assert_eq!(found, 6);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_zero_density_rejected() {
        let mut table = slice_table();
        table[[1, 1]] = 0.0;
        let result = RunDataset::from_table(&table, &ColumnSchema::slice(), Path::new("mem"));
        assert!(matches!(result, Err(ComparatorError::InvalidValue { row: 1, .. })));
    }

    #[test]
    fn test_non_finite_position_rejected() {
        let mut table = slice_table();
        table[[2, 0]] = NumericData::NAN;
        let result = RunDataset::from_table(&table, &ColumnSchema::slice(), Path::new("mem"));
        assert!(matches!(result, Err(ComparatorError::InvalidValue { row: 2, .. })));

        table[[2, 0]] = NumericData::INFINITY;
        let result = RunDataset::from_table(&table, &ColumnSchema::slice(), Path::new("mem"));
        assert!(matches!(result, Err(ComparatorError::InvalidValue { row: 2, .. })));
    }

    #[test]
    fn test_points_follow_variable() {
        let data = RunDataset::from_table(&slice_table(), &ColumnSchema::slice(), Path::new("mem")).unwrap();
        let points = data.points(&PlotVariable::Density);
        assert_eq!(points, vec![(0.0, 1.0), (1.0, 2.0), (2.0, 4.0)]);
        assert_eq!(PlotVariable::Temperature.axis_label(), "temperature (K)");
    }
}
