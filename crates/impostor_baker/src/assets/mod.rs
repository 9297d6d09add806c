//! Asset loading
//!
//! OBJ meshes feed bake sources; PNG helpers move atlases to and from disk.

pub mod image_io;
pub mod obj_loader;

pub use image_io::{decode_png, encode_png, load_png, save_png};
pub use obj_loader::{ObjError, ObjLoader, ObjModel};
