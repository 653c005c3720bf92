// Valuation engine: daily values, the sparse value matrix, rolling means and
// lookback window selection.

pub mod daily;
pub mod matrix;
pub mod normalize;
pub mod rolling;
pub mod window;
