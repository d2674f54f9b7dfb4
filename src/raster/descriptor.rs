//! The type-descriptor file written next to each label mask.
//!
//! ```text
//! <LaneBoundaryTypes imageWidth imageHeight>
//!   <LaneLines LaneLineNum>
//!     <LaneLine id typeShape typeSD typePos typeColor typeBicycle/>*
//!   <BoundaryLines BoundaryLineNum>
//!     <BoundaryLine id typeShape typePos/>*
//! ```

use std::path::Path;

use crate::error::{PersistenceError, Result};
use crate::persistence::file::write_atomically;
use crate::persistence::xml::{self, Element};

use super::classes::{BoundaryClasses, LaneClasses};

/// Root element name of a type-descriptor document.
pub const DESCRIPTOR_ROOT: &str = "LaneBoundaryTypes";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaneTypeRecord {
    pub id: u8,
    pub classes: LaneClasses,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundaryTypeRecord {
    pub id: u8,
    pub classes: BoundaryClasses,
}

/// Per-id classes of every line painted into a mask.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TypeDescriptor {
    pub image_width: u32,
    pub image_height: u32,
    pub lanes: Vec<LaneTypeRecord>,
    pub boundaries: Vec<BoundaryTypeRecord>,
}

impl TypeDescriptor {
    #[must_use]
    pub fn new(image_width: u32, image_height: u32) -> Self {
        Self {
            image_width,
            image_height,
            ..Self::default()
        }
    }

    /// Orders both record lists by id.
    pub fn sort_by_id(&mut self) {
        self.lanes.sort_by_key(|r| r.id);
        self.boundaries.sort_by_key(|r| r.id);
    }

    #[must_use]
    pub fn to_element(&self) -> Element {
        let mut lanes = Element::new("LaneLines").with_attr("LaneLineNum", self.lanes.len());
        for record in &self.lanes {
            let c = &record.classes;
            lanes.push_child(
                Element::new("LaneLine")
                    .with_attr("id", record.id)
                    .with_attr("typeShape", c.shape)
                    .with_attr("typeSD", c.sd)
                    .with_attr("typePos", c.position)
                    .with_attr("typeColor", c.color)
                    .with_attr("typeBicycle", c.bicycle),
            );
        }

        let mut boundaries =
            Element::new("BoundaryLines").with_attr("BoundaryLineNum", self.boundaries.len());
        for record in &self.boundaries {
            boundaries.push_child(
                Element::new("BoundaryLine")
                    .with_attr("id", record.id)
                    .with_attr("typeShape", record.classes.shape)
                    .with_attr("typePos", record.classes.position),
            );
        }

        Element::new(DESCRIPTOR_ROOT)
            .with_attr("imageWidth", self.image_width)
            .with_attr("imageHeight", self.image_height)
            .with_child(lanes)
            .with_child(boundaries)
    }

    /// Reads a descriptor back from its document tree.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::MalformedInput`] when the root, a
    /// collection or a required attribute is missing or invalid.
    pub fn from_element(root: &Element) -> Result<Self> {
        if root.name() != DESCRIPTOR_ROOT {
            return Err(PersistenceError::malformed(format!(
                "expected <{DESCRIPTOR_ROOT}>, found <{}>",
                root.name()
            ))
            .into());
        }
        let mut descriptor = Self::new(root.require_attr("imageWidth")?, root.require_attr("imageHeight")?);

        if let Some(lanes) = root.child("LaneLines") {
            for e in lanes.children_named("LaneLine") {
                descriptor.lanes.push(LaneTypeRecord {
                    id: e.require_attr("id")?,
                    classes: LaneClasses {
                        shape: e.require_attr("typeShape")?,
                        sd: e.require_attr("typeSD")?,
                        position: e.require_attr("typePos")?,
                        color: e.require_attr("typeColor")?,
                        bicycle: e.require_attr("typeBicycle")?,
                    },
                });
            }
        }
        if let Some(boundaries) = root.child("BoundaryLines") {
            for e in boundaries.children_named("BoundaryLine") {
                descriptor.boundaries.push(BoundaryTypeRecord {
                    id: e.require_attr("id")?,
                    classes: BoundaryClasses {
                        shape: e.require_attr("typeShape")?,
                        position: e.require_attr("typePos")?,
                    },
                });
            }
        }
        Ok(descriptor)
    }

    /// # Errors
    ///
    /// Returns [`PersistenceError::Xml`] if serialization fails.
    pub fn to_xml_string(&self) -> Result<String> {
        xml::write(&self.to_element())
    }

    /// # Errors
    ///
    /// Returns an error if the text is not a well-formed descriptor.
    pub fn from_xml_str(text: &str) -> Result<Self> {
        Self::from_element(&xml::parse(text)?)
    }

    /// Writes the descriptor, replacing `path` only once fully written.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::Io`] if writing fails.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let text = self.to_xml_string()?;
        write_atomically(path, text.as_bytes()).map_err(|source| PersistenceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(())
    }
}
