pub mod method_comparison;
pub mod sensitivity;
