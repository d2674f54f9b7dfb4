//! Reading and writing annotation documents.

pub mod codec;
pub mod file;
pub mod xml;

pub use codec::{decode, encode, from_xml_str, to_xml_string, ANNOTATION_ROOT};
pub use file::{read_annotation_file, write_annotation_file};
