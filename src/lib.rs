//! Linear and discrete linear programming by the simplex method.
//!
//! This crate solves linear programs over real-valued decision variables
//! and, on top of that, discrete programs by parallel branch and bound:
//! - Two-phase big-M canonicalisation with slack, surplus and artificial
//!   columns; free variables split into non-negative parts
//! - Primal simplex with Bland-rule tie breaking, dual simplex recovery
//!   for sensitivity analysis
//! - Warm restarts on a solved tableau: [`Simplex::change_b`] edits a
//!   right-hand side, [`Simplex::add_constraint`] appends a constraint
//! - [`DiscreteSimplex`] branches over any per-variable discrete sets,
//!   sharing a mutex-guarded incumbent across rayon tasks
//!
//! # Examples
//!
//! ## Solving and re-solving a linear program
//!
//! ```
//! use lp_simplex::{FunctionType, Inequality, SimplexBuilder};
//!
//! let mut simplex = SimplexBuilder::new()
//!     .with_a(vec![vec![-1.0, 1.0], vec![0.0, 1.0], vec![1.0, 0.0]])
//!     .with_b(vec![2.0, 1.0, 3.0])
//!     .with_c(vec![6.0, 10.0])
//!     .with_function_type(FunctionType::Max)
//!     .build()
//!     .unwrap();
//!
//! let answer = simplex.solve().unwrap();
//! assert!((answer.fx() - 28.0).abs() < 1e-6);
//!
//! // Tighten the model without starting over.
//! let answer = simplex.add_constraint(&[1.0, 0.0], Inequality::Lq, 2.0).unwrap();
//! assert!((answer.fx() - 22.0).abs() < 1e-6);
//! ```
//!
//! ## Integer optimisation
//!
//! ```
//! use lp_simplex::{DiscreteSimplex, FunctionType, SimplexBuilder};
//!
//! let builder = SimplexBuilder::new()
//!     .with_a(vec![vec![1.0, 2.0], vec![2.0, 1.0]])
//!     .with_b(vec![6.0, 8.0])
//!     .with_c(vec![3.0, 2.0])
//!     .with_function_type(FunctionType::Max);
//!
//! let answer = DiscreteSimplex::new().solve(&builder).unwrap();
//! assert!((answer.fx() - 12.0).abs() < 1e-6);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod answer;
pub mod builder;
pub mod discrete;
pub mod error;
pub mod fixtures;
pub mod inequality;
pub mod numeric;
pub mod simplex;

pub use answer::Answer;
pub use builder::{FunctionType, SimplexBuilder};
pub use discrete::{DiscreteDomain, DiscreteSimplex, IntegerDomain, StepDomain};
pub use error::{SimplexError, SimplexResult};
pub use inequality::Inequality;
pub use simplex::Simplex;
