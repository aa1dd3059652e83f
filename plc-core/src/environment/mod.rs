pub mod scope;
pub mod ty;
pub mod binding;
pub mod value;

pub mod prelude {
    pub use super::{
        scope::*,
        ty::*,
        binding::*,
        value::*,
    };
}
