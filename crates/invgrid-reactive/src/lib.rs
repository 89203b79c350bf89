#![forbid(unsafe_code)]

//! Reactive cells for invgrid.
//!
//! This crate provides the change-propagation layer GUI components are built
//! on:
//!
//! - [`Observable`]: a shared, version-tracked cell. Roots are created with
//!   [`Observable::new`] (read-write) or [`Observable::constant`]
//!   (read-only).
//! - Derivations: [`Observable::map`], [`Observable::map_bidirectional`],
//!   [`combine2`], [`combine3`], [`combine4`], [`combine_all`] and
//!   [`flatten`].
//! - [`Property`]: the uniform read/write surface consumed by component
//!   setters.
//! - Observer lifecycle: RAII [`Subscription`]s, owner-scoped weak observers
//!   ([`Observable::observe_weak`]), [`BindingScope`] and [`TwoWayBinding`].
//! - Scheduling: [`batch`], [`BatchScope`] and [`schedule_effect`].
//!
//! # Architecture
//!
//! Cells are `Rc`-based and single-threaded. A derived cell holds its sources
//! strongly and each source holds its dependents weakly, so derived cells go
//! away once nothing references them.
//!
//! Propagation is push-invalidate, pull-settle. A write marks every
//! transitive dependent stale, then the runtime settles stale cells and
//! notifies changed cells in ascending height order. A derived cell with
//! several changed sources therefore recomputes once, from settled inputs.
//! Reading a stale derived cell recomputes it on the spot, so a read from any
//! callback is never stale.
//!
//! # Example
//!
//! ```
//! use invgrid_reactive::{Observable, combine2};
//!
//! let name = Observable::new("Ann".to_string());
//! let level = Observable::new(1);
//! let title = combine2(&name, &level, |n, l| format!("{n} Lvl {l}"));
//! assert_eq!(title.get(), "Ann Lvl 1");
//!
//! level.set(2).unwrap();
//! assert_eq!(title.get(), "Ann Lvl 2");
//! assert!(title.set("nope".into()).is_err());
//! ```

pub mod binding;
pub mod combine;
pub mod config;
pub mod derive;
pub mod error;
pub mod flatten;
mod node;
pub mod observable;
pub mod property;
pub mod registry;
pub mod runtime;

pub use binding::{BindingScope, TwoWayBinding};
pub use combine::{combine_all, combine2, combine3, combine4};
pub use config::{ReactiveConfig, config, configure};
pub use error::{ReactiveError, Result};
pub use flatten::flatten;
pub use observable::{Observable, Subscription};
pub use property::Property;
pub use registry::{ObserverKey, unregister};
pub use runtime::{BatchScope, batch, in_batch, is_flushing, schedule_effect};
