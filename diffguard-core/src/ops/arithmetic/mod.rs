//! Elementwise arithmetic: add, sub, mul, mul_scalar, neg.

pub mod add;
pub mod mul;
pub mod mul_scalar;
pub mod neg;
pub mod sub;

pub use add::add_op;
pub use mul::mul_op;
pub use mul_scalar::mul_scalar_op;
pub use neg::neg_op;
pub use sub::sub_op;
