//! # nearthree
//!
//! `nearthree` is a Rust library for exact nearest-neighbour and radius search over
//! sets of 3D points, designed to be used in Rust as well as compiled to WebAssembly
//! (WASM). Reference points can be arranged in any channel shape (for example the
//! geometry of a sensor array), and results keep the shape of the query.
//!
//! ## Features
//!
//! - **Exact search**: k-nearest and radius queries answered by a kd-tree, with
//!   deterministic ordering (distance, then flat index).
//! - **Shaped point sets**: row-major flat ↔ multi-index mapping and results arranged
//!   in the query's channel shape.
//! - **Metrics**: Euclidean, great-circle angle and great-circle arc length.
//! - **Lazy index**: the kd-tree is built on the first query and rebuilt only after the
//!   points change.
//! - **Parallel batches**: large query batches are searched with `rayon`.
//!
//! ## Main Interface
//!
//! The primary entry point is the [`Coordinates`] struct, which owns a [`PointSet`] and
//! its cached [`SpatialIndex`].
//!
//! ```
//! use nearthree::{Coordinates, DistanceMetric, PointSet, WithinOptions};
//!
//! let points: Vec<[f64; 3]> = (0..6).map(|x| [x as f64, 0.0, 0.0]).collect();
//! let coords = Coordinates::new(PointSet::from_points(&points).unwrap());
//!
//! let query = PointSet::single([2.0, 0.0, 0.0]).unwrap();
//! let nearest = coords.find_nearest(&query, 1, DistanceMetric::Euclidean).unwrap();
//! assert_eq!(nearest.nearest().flat(), &[2]);
//!
//! let within = coords.find_within(&query, &WithinOptions::new(1.0)).unwrap();
//! assert_eq!(within.get(0).unwrap(), &[2, 1, 3]);
//! ```

mod bounds;
mod broadcast;
mod config;
mod coordinates;
mod error;
mod index;
mod kdtree;
mod metric;
mod points;
mod result;
mod shape;
pub mod validate;
pub mod wasm;

pub use bounds::BoundingBox;
pub use broadcast::QueryPlan;
pub use config::IndexConfig;
pub use config::WithinOptions;
pub use coordinates::Coordinates;
pub use error::FindError;
pub use error::FindResult;
pub use index::SpatialIndex;
pub use metric::DistanceMetric;
pub use points::PointSet;
pub use points::SnapshotId;
pub use points::POINT_EQ_TOLERANCE;
pub use result::IndexCollection;
pub use result::NeighborResult;
pub use result::ShapedArray;
pub use result::WithinResult;
pub use shape::ChannelShape;
