pub mod model;

pub use model::{NewProduct, Product, ProductPage, ProductPatch};
