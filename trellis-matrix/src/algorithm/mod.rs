pub mod costmatrix;
