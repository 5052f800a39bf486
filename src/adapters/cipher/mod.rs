pub mod sealed_box;
