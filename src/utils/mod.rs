pub mod file_operations;

pub use file_operations::{
    classify_extension, copy_with_metadata, decode_text, is_writable_dir, normalize_name,
    split_name, ExtensionClass, ExtensionPolicy, MEDIA_EXTENSIONS, SIDECAR_EXTENSION,
};
