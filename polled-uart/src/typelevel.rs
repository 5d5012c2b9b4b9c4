//! Module supporting type-level programming
//!
//! # Introduction
//!
//! A serial driver on a small microcontroller has a handful of build variants:
//! which directions are polled and which are left to an interrupt handler,
//! and which flow control scheme guards the line. Selecting these with
//! runtime flags costs code space and lets invalid combinations reach the
//! target. Instead, this crate lifts them to the type level.
//!
//! ## Type-level enums
//!
//! A value-level enum such as
//!
//! ```ignore
//! enum Directions {
//!     Duplex,
//!     TxPolled,
//!     RxPolled,
//!     InterruptDriven,
//! }
//! ```
//!
//! is mapped to a trait, with one type per variant:
//!
//! ```ignore
//! trait Directions: Sealed {}
//!
//! struct Duplex;
//! struct TxPolled;
//!
//! impl Directions for Duplex {}
//! impl Directions for TxPolled {}
//! ```
//!
//! Further marker traits (`PolledTx`, `PolledRx`) then act as type classes
//! restricting which variants an `impl` block applies to. A method defined in
//! an `impl` block bounded by `M: PolledTx` simply does not exist on a handle
//! whose receive side is interrupt driven, so the mistake is a compile error
//! rather than a runtime branch.
//!
//! ## Sealed traits
//!
//! All type-level enums in this crate are closed: their super trait
//! `Sealed` cannot be named outside the crate, so no downstream crate can
//! add a variant.

mod private {
    /// Super trait used to mark traits with an exhaustive set of
    /// implementations
    pub trait Sealed {}
}

pub(crate) use private::Sealed;
