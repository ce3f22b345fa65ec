/// Geo object instances and the scene buffer that owns them.
use glam::{DVec3, Quat, Vec3, Vec4};

use crate::error::{RenderError, Result};
use crate::precision::SplitCoordinate;
use crate::program::{AttributeRecord, AttributeType};

/// One placed copy of a local mesh.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GeoObjectInstance {
    world_position: DVec3,
    position: SplitCoordinate,
    /// Decoration offset from the anchor. Follows the distance scale law but
    /// not the instance scale or rotation.
    pub local_position_offset: Vec3,
    pub scale: Vec3,
    /// Mesh-space offset, scaled along with the mesh.
    pub translate: Vec3,
    /// Unit quaternion.
    pub rotation: Quat,
    pub color: Vec4,
    pub picking_color: Vec3,
    pub disposed: bool,
}

impl Default for GeoObjectInstance {
    fn default() -> Self {
        Self::new(DVec3::ZERO)
    }
}

impl GeoObjectInstance {
    /// Instance at `position`, split against the world origin.
    pub fn new(position: DVec3) -> Self {
        Self {
            world_position: position,
            position: SplitCoordinate::from_dvec3(position),
            local_position_offset: Vec3::ZERO,
            scale: Vec3::ONE,
            translate: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            color: Vec4::ONE,
            picking_color: Vec3::ZERO,
            disposed: false,
        }
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_translate(mut self, translate: Vec3) -> Self {
        self.translate = translate;
        self
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_color(mut self, color: Vec4) -> Self {
        self.color = color;
        self
    }

    pub fn with_picking_color(mut self, picking_color: Vec3) -> Self {
        self.picking_color = picking_color;
        self
    }

    pub fn with_local_position_offset(mut self, offset: Vec3) -> Self {
        self.local_position_offset = offset;
        self
    }

    /// Split position relative to the owning buffer's center.
    #[inline]
    pub fn position(&self) -> &SplitCoordinate {
        &self.position
    }

    pub fn world_position(&self) -> DVec3 {
        self.world_position
    }

    /// Value of the `aDispose` attribute: 0 marks a removed instance.
    #[inline]
    pub fn dispose_flag(&self) -> f32 {
        if self.disposed {
            0.0
        } else {
            1.0
        }
    }

    fn resplit(&mut self, rtc_center: DVec3) {
        self.position = SplitCoordinate::from_dvec3_relative(self.world_position, rtc_center);
    }
}

impl AttributeRecord for GeoObjectInstance {
    const ATTRIBUTES: &'static [(&'static str, AttributeType)] = &[
        ("aRTCPositionHigh", AttributeType::Vec3),
        ("aRTCPositionLow", AttributeType::Vec3),
        ("aLocalPosition", AttributeType::Vec3),
        ("aScale", AttributeType::Vec3),
        ("aTranslate", AttributeType::Vec3),
        ("qRot", AttributeType::Vec4),
        ("aColor", AttributeType::Vec4),
        ("aPickingColor", AttributeType::Vec3),
        ("aDispose", AttributeType::Float),
    ];
}

/// Contiguous per-scene instance storage.
///
/// Removal only marks an instance disposed; storage is never compacted and
/// freed slots are reused by later additions, so slot indices stay stable.
#[derive(Clone, Debug, Default)]
pub struct GeoObjectBuffer {
    rtc_center: DVec3,
    instances: Vec<GeoObjectInstance>,
    free_slots: Vec<usize>,
}

impl GeoObjectBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer whose positions are split relative to `rtc_center`.
    pub fn with_rtc_center(rtc_center: DVec3) -> Self {
        Self {
            rtc_center,
            ..Self::default()
        }
    }

    pub fn rtc_center(&self) -> DVec3 {
        self.rtc_center
    }

    /// Move the relative-to-center origin; every position is split again.
    pub fn set_rtc_center(&mut self, rtc_center: DVec3) {
        self.rtc_center = rtc_center;
        for instance in &mut self.instances {
            instance.resplit(rtc_center);
        }
    }

    /// Store `instance` and return its slot.
    pub fn add(&mut self, mut instance: GeoObjectInstance) -> usize {
        instance.disposed = false;
        instance.resplit(self.rtc_center);
        match self.free_slots.pop() {
            Some(slot) => {
                self.instances[slot] = instance;
                slot
            }
            None => {
                self.instances.push(instance);
                self.instances.len() - 1
            }
        }
    }

    /// Mark the instance in `slot` disposed.
    pub fn remove(&mut self, slot: usize) -> Result<()> {
        let instance = self.live_mut(slot)?;
        instance.disposed = true;
        self.free_slots.push(slot);
        log::trace!("geo object slot {} disposed", slot);
        Ok(())
    }

    pub fn get(&self, slot: usize) -> Option<&GeoObjectInstance> {
        self.instances.get(slot).filter(|i| !i.disposed)
    }

    /// Mutable access to a live instance. Position changes go through
    /// [`GeoObjectBuffer::set_position`].
    pub fn get_mut(&mut self, slot: usize) -> Result<&mut GeoObjectInstance> {
        self.live_mut(slot)
    }

    /// Move an instance; the split is recomputed only when the position
    /// actually changes. Returns whether it changed.
    pub fn set_position(&mut self, slot: usize, position: DVec3) -> Result<bool> {
        let rtc_center = self.rtc_center;
        let instance = self.live_mut(slot)?;
        if instance.world_position == position {
            return Ok(false);
        }
        instance.world_position = position;
        instance.resplit(rtc_center);
        Ok(true)
    }

    /// Every slot, disposed ones included, in slot order. This is the
    /// per-instance stream handed to draws.
    pub fn instances(&self) -> &[GeoObjectInstance] {
        &self.instances
    }

    /// Number of slots, disposed ones included.
    pub fn slot_count(&self) -> usize {
        self.instances.len()
    }

    /// Number of live instances.
    pub fn len(&self) -> usize {
        self.instances.len() - self.free_slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter_live(&self) -> impl Iterator<Item = (usize, &GeoObjectInstance)> {
        self.instances.iter().enumerate().filter(|(_, i)| !i.disposed)
    }

    fn live_mut(&mut self, slot: usize) -> Result<&mut GeoObjectInstance> {
        self.instances
            .get_mut(slot)
            .filter(|i| !i.disposed)
            .ok_or(RenderError::InstanceNotFound(slot))
    }
}
