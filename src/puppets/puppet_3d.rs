use std::{collections::BTreeMap, path::Path};

use serde::{Deserialize, Serialize};

use crate::{model::MorphChannels, Logger};

use super::{Error, Puppet, Result};

/// A single blend shape on a mesh and the weight it rests at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlendShape {
    pub name: String,
    #[serde(default)]
    pub value: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshData {
    pub name: String,
    #[serde(default)]
    pub blend_shapes: Vec<BlendShape>,
}

/// The on-disk description of a 3D puppet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PuppetData {
    pub name: String,
    #[serde(default)]
    pub meshes: Vec<MeshData>,
}

/// A 3D puppet, described by the blend shapes on each of its meshes.
///
/// Blend shapes with the same name on different meshes are driven together as one
/// channel, so e.g. a separate teeth mesh follows `jawOpen` on the head.
#[derive(Debug)]
pub struct Puppet3d {
    logger: Logger,

    name: String,
    /// Which channels each mesh exposes, in the order the mesh lists them.
    meshes: BTreeMap<String, Vec<String>>,
    channels: MorphChannels,
}

impl Puppet3d {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;

        Self::from_json(&data)
    }

    pub fn from_json(data: &str) -> Result<Self> {
        let data: PuppetData = serde_json::from_str(data)?;

        Self::from_data(data)
    }

    pub fn from_data(data: PuppetData) -> Result<Self> {
        let logger = Logger::create("Puppet3d");

        let mut baseline: BTreeMap<String, f32> = BTreeMap::new();
        let mut meshes = BTreeMap::new();

        for mesh in data.meshes {
            let mut names: Vec<String> = Vec::with_capacity(mesh.blend_shapes.len());

            for blend_shape in mesh.blend_shapes {
                if !blend_shape.value.is_finite() {
                    return Err(Error::InvalidBaseline {
                        name: blend_shape.name,
                        value: blend_shape.value,
                    });
                }
                if names.contains(&blend_shape.name) {
                    return Err(Error::DuplicateBlendShape {
                        mesh: mesh.name,
                        name: blend_shape.name,
                    });
                }

                match baseline.get(&blend_shape.name) {
                    Some(existing) if *existing != blend_shape.value => {
                        logger.warn(format!(
                            "Blend shape {} on mesh {} rests at {} but was already registered at {existing}, keeping {existing}",
                            blend_shape.name, mesh.name, blend_shape.value
                        ));
                    }
                    Some(_) => {}
                    None => {
                        baseline.insert(blend_shape.name.clone(), blend_shape.value);
                    }
                }

                names.push(blend_shape.name);
            }

            if names.is_empty() {
                logger.debug(format!("Mesh {} has no blend shapes, skipping", mesh.name));
                continue;
            }

            meshes.insert(mesh.name, names);
        }

        if baseline.is_empty() {
            logger.warn(format!("Puppet {} has no blend shapes to animate", data.name));
        } else {
            logger.debug(format!(
                "Loaded puppet {} with {} channels across {} meshes",
                data.name,
                baseline.len(),
                meshes.len()
            ));
        }

        Ok(Self {
            logger,

            name: data.name,
            meshes,
            channels: MorphChannels::from_baseline(baseline),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mesh_names(&self) -> impl Iterator<Item = &str> {
        self.meshes.keys().map(String::as_str)
    }

    /// Displayed weights per mesh, ready to be written to each mesh's blend shapes.
    pub fn mesh_weights(&self) -> BTreeMap<&str, BTreeMap<&str, f32>> {
        self.meshes
            .iter()
            .map(|(mesh, names)| {
                let weights = names
                    .iter()
                    .filter_map(|v| Some((v.as_str(), self.channels.value(v)?)))
                    .collect();
                (mesh.as_str(), weights)
            })
            .collect()
    }

    /// Snap every channel back to its rest pose.
    pub fn reset_pose(&mut self) {
        self.channels.hard_reset();
    }
}

impl Puppet for Puppet3d {
    fn logger(&self) -> &Logger {
        &self.logger
    }

    fn channels(&self) -> &MorphChannels {
        &self.channels
    }

    fn channels_mut(&mut self) -> &mut MorphChannels {
        &mut self.channels
    }
}
