pub mod all_close;

pub use all_close::all_close;
