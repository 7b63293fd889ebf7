use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MatrixError {
    #[error("Index out of range: ({row}, {col}) must be below ({rows}, {cols})")]
    IndexOutOfRange {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },
    #[error("Dimension mismatch in {operation}: expected {expected}, found {found}")]
    DimensionMismatch {
        operation: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("Row {row} has {found} columns, expected {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// Dense row-major matrix of `f64`
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "RawMatrix")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

/// Unchecked serialized form, `data` must hold `rows * cols` values
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

#[cfg(feature = "serde")]
impl TryFrom<RawMatrix> for Matrix {
    type Error = MatrixError;

    fn try_from(raw: RawMatrix) -> Result<Self, MatrixError> {
        let expected = raw.rows.checked_mul(raw.cols).unwrap_or(usize::MAX);
        if raw.data.len() != expected {
            return Err(MatrixError::DimensionMismatch {
                operation: "matrix data",
                expected,
                found: raw.data.len(),
            });
        }
        Ok(Self {
            rows: raw.rows,
            cols: raw.cols,
            data: raw.data,
        })
    }
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// A single-row matrix
    pub fn row_vector(values: &[f64]) -> Self {
        Self {
            rows: 1,
            cols: values.len(),
            data: values.to_vec(),
        }
    }

    /// Builds a matrix from nested rows. All rows must have the same length.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, MatrixError> {
        let cols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(rows.len() * cols);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(MatrixError::RaggedRows {
                    row: i,
                    expected: cols,
                    found: row.len(),
                });
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            data,
        })
    }

    pub fn num_rows(&self) -> usize {
        self.rows
    }

    pub fn num_cols(&self) -> usize {
        self.cols
    }

    pub fn is_vector(&self) -> bool {
        self.rows == 1 || self.cols == 1
    }

    fn check(&self, row: usize, col: usize) -> Result<usize, MatrixError> {
        if row >= self.rows || col >= self.cols {
            return Err(MatrixError::IndexOutOfRange {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(row * self.cols + col)
    }

    pub fn get(&self, row: usize, col: usize) -> Result<f64, MatrixError> {
        let idx = self.check(row, col)?;
        Ok(self.data[idx])
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) -> Result<(), MatrixError> {
        let idx = self.check(row, col)?;
        self.data[idx] = value;
        Ok(())
    }

    pub fn row(&self, row: usize) -> Result<&[f64], MatrixError> {
        if row >= self.rows {
            return Err(MatrixError::IndexOutOfRange {
                row,
                col: 0,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(&self.data[row * self.cols..(row + 1) * self.cols])
    }

    pub fn column(&self, col: usize) -> Result<Vec<f64>, MatrixError> {
        if col >= self.cols {
            return Err(MatrixError::IndexOutOfRange {
                row: 0,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok((0..self.rows).map(|i| self.data[i * self.cols + col]).collect())
    }

    /// Iterates over the rows as slices
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        (0..self.rows).map(move |i| &self.data[i * self.cols..(i + 1) * self.cols])
    }

    /// Raw row-major storage
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.rows().map(<[f64]>::to_vec).collect()
    }

    /// Appends a row. The matrix is left untouched on a length mismatch.
    pub fn push_row(&mut self, values: &[f64]) -> Result<(), MatrixError> {
        if values.len() != self.cols {
            return Err(MatrixError::DimensionMismatch {
                operation: "push_row",
                expected: self.cols,
                found: values.len(),
            });
        }
        self.data.extend_from_slice(values);
        self.rows += 1;
        Ok(())
    }

    /// Appends a column. The matrix is left untouched on a length mismatch.
    pub fn push_column(&mut self, values: &[f64]) -> Result<(), MatrixError> {
        if values.len() != self.rows {
            return Err(MatrixError::DimensionMismatch {
                operation: "push_column",
                expected: self.rows,
                found: values.len(),
            });
        }
        let new_cols = self.cols + 1;
        let mut data = Vec::with_capacity(self.rows * new_cols);
        for (i, &value) in values.iter().enumerate() {
            data.extend_from_slice(&self.data[i * self.cols..(i + 1) * self.cols]);
            data.push(value);
        }
        self.data = data;
        self.cols = new_cols;
        Ok(())
    }

    pub fn transpose(&self) -> Matrix {
        let mut out = Matrix::zeros(self.cols, self.rows);
        for i in 0..self.rows {
            for j in 0..self.cols {
                out.data[j * self.rows + i] = self.data[i * self.cols + j];
            }
        }
        out
    }

    /// Matrix product `self * other`
    pub fn multiply(&self, other: &Matrix) -> Result<Matrix, MatrixError> {
        if self.cols != other.rows {
            return Err(MatrixError::DimensionMismatch {
                operation: "multiply",
                expected: self.cols,
                found: other.rows,
            });
        }
        let mut out = Matrix::zeros(self.rows, other.cols);
        for i in 0..self.rows {
            for k in 0..self.cols {
                let a = self.data[i * self.cols + k];
                if a == 0.0 {
                    continue;
                }
                for j in 0..other.cols {
                    out.data[i * other.cols + j] += a * other.data[k * other.cols + j];
                }
            }
        }
        Ok(out)
    }

    /// Inner product of two vectors of equal length
    pub fn dot(&self, other: &Matrix) -> Result<f64, MatrixError> {
        if !self.is_vector() || !other.is_vector() || self.data.len() != other.data.len() {
            return Err(MatrixError::DimensionMismatch {
                operation: "dot",
                expected: self.data.len(),
                found: other.data.len(),
            });
        }
        Ok(self.data.iter().zip(&other.data).map(|(a, b)| a * b).sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows_and_get() {
        let m = Matrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(m.num_rows(), 2);
        assert_eq!(m.num_cols(), 2);
        assert_eq!(m.get(1, 0).unwrap(), 3.0);
        assert_eq!(m.row(0).unwrap(), &[1.0, 2.0]);
        assert_eq!(m.column(1).unwrap(), vec![2.0, 4.0]);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let err = Matrix::from_rows(&[vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert_eq!(
            err,
            MatrixError::RaggedRows {
                row: 1,
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn test_index_out_of_range() {
        let mut m = Matrix::zeros(2, 3);
        assert!(m.get(2, 0).is_err());
        assert!(m.get(0, 3).is_err());
        assert!(m.set(5, 5, 1.0).is_err());
        assert!(m.row(2).is_err());
        assert!(m.column(3).is_err());
        // last valid cell is addressable
        m.set(1, 2, 7.0).unwrap();
        assert_eq!(m.get(1, 2).unwrap(), 7.0);
    }

    #[test]
    fn test_push_row_and_column() {
        let mut m = Matrix::zeros(0, 2);
        m.push_row(&[1.0, 2.0]).unwrap();
        m.push_row(&[3.0, 4.0]).unwrap();
        assert_eq!(m.num_rows(), 2);

        m.push_column(&[5.0, 6.0]).unwrap();
        assert_eq!(m.to_rows(), vec![vec![1.0, 2.0, 5.0], vec![3.0, 4.0, 6.0]]);

        // failed appends leave the matrix untouched
        assert!(m.push_row(&[1.0]).is_err());
        assert!(m.push_column(&[1.0]).is_err());
        assert_eq!(m.num_rows(), 2);
        assert_eq!(m.num_cols(), 3);
    }

    #[test]
    fn test_push_column_onto_row_vector() {
        let mut bounds = Matrix::row_vector(&[13.0, 11.0]);
        bounds.push_column(&[2.0]).unwrap();
        assert_eq!(bounds.as_slice(), &[13.0, 11.0, 2.0]);
    }

    #[test]
    fn test_transpose_and_multiply() {
        let a = Matrix::from_rows(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
        let t = a.transpose();
        assert_eq!(t.to_rows(), vec![vec![1.0, 4.0], vec![2.0, 5.0], vec![3.0, 6.0]]);

        let p = a.multiply(&t).unwrap();
        assert_eq!(p.to_rows(), vec![vec![14.0, 32.0], vec![32.0, 77.0]]);

        assert!(a.multiply(&a).is_err());
    }

    #[test]
    fn test_dot() {
        let c = Matrix::row_vector(&[2.0, 3.0]);
        let x = Matrix::row_vector(&[0.0, 2.0]);
        assert_eq!(c.dot(&x).unwrap(), 6.0);
        assert_eq!(c.dot(&x.transpose()).unwrap(), 6.0);
        assert!(c.dot(&Matrix::row_vector(&[1.0])).is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_checks_data_length() {
        let m: Matrix = serde_json::from_str(r#"{"rows": 2, "cols": 2, "data": [1.0, 2.0, 3.0, 4.0]}"#).unwrap();
        assert_eq!(m.get(1, 0).unwrap(), 3.0);

        let err = serde_json::from_str::<Matrix>(r#"{"rows": 2, "cols": 2, "data": [1.0]}"#).unwrap_err();
        assert!(err.to_string().contains("matrix data"), "{}", err);

        let m = Matrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(serde_json::from_str::<Matrix>(&json).unwrap(), m);
    }
}
