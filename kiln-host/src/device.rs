//! Device memory backend
//!
//! Assets that the renderer or mixer consume are uploaded once into one of
//! four device regions and never freed. A backend may keep uploads in flight
//! until [`DeviceBackend::fence`]; the host fences exactly once, at seal.

use crate::error::ResourceError;

/// Device memory region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceRegion {
    /// Textures, mesh buffers and font atlases
    Video,
    /// Skeleton inverse bind matrices
    Skeleton,
    /// Decoded keyframe matrices
    Keyframe,
    /// PCM sample data
    Audio,
}

impl DeviceRegion {
    pub const ALL: [DeviceRegion; 4] = [
        DeviceRegion::Video,
        DeviceRegion::Skeleton,
        DeviceRegion::Keyframe,
        DeviceRegion::Audio,
    ];

    pub(crate) fn tag(self) -> u8 {
        match self {
            DeviceRegion::Video => 0,
            DeviceRegion::Skeleton => 1,
            DeviceRegion::Keyframe => 2,
            DeviceRegion::Audio => 3,
        }
    }

    fn index(self) -> usize {
        self.tag() as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            DeviceRegion::Video => "vram",
            DeviceRegion::Skeleton => "skeleton buffer",
            DeviceRegion::Keyframe => "keyframe buffer",
            DeviceRegion::Audio => "audio memory",
        }
    }
}

/// Byte range of one upload inside a region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceLocation {
    pub region: DeviceRegion,
    pub offset: usize,
    pub len: usize,
}

/// Per-region byte budgets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceBudgets {
    pub video: usize,
    pub skeleton: usize,
    pub keyframe: usize,
    pub audio: usize,
}

impl DeviceBudgets {
    pub fn get(&self, region: DeviceRegion) -> usize {
        match region {
            DeviceRegion::Video => self.video,
            DeviceRegion::Skeleton => self.skeleton,
            DeviceRegion::Keyframe => self.keyframe,
            DeviceRegion::Audio => self.audio,
        }
    }
}

impl Default for DeviceBudgets {
    fn default() -> Self {
        Self {
            video: 4 * 1024 * 1024,
            skeleton: 64 * 256 * 48,
            keyframe: 8 * 1024 * 1024,
            audio: 4 * 1024 * 1024,
        }
    }
}

/// Where uploaded asset bytes go
pub trait DeviceBackend: Send {
    /// Reserve space in `region` and start uploading `bytes`
    ///
    /// Fails with `CapacityExceeded` when the region budget would overflow.
    fn upload(&mut self, region: DeviceRegion, bytes: &[u8])
    -> Result<DeviceLocation, ResourceError>;

    /// Block until every upload has landed
    fn fence(&mut self);

    /// Uploads issued but not yet fenced
    fn in_flight(&self) -> usize;

    /// Bytes reserved in a region
    fn used(&self, region: DeviceRegion) -> usize;

    /// Byte budget of a region
    fn budget(&self, region: DeviceRegion) -> usize;

    /// Read back fenced bytes; `None` while the range is still in flight
    fn read(&self, location: DeviceLocation) -> Option<&[u8]>;
}

#[derive(Debug, Default)]
struct RegionMemory {
    data: Vec<u8>,
    reserved: usize,
}

/// CPU-side device used by the headless runner and tests
///
/// Uploads are staged and only become readable after `fence()`.
#[derive(Debug, Default)]
pub struct HeadlessDevice {
    budgets: DeviceBudgets,
    regions: [RegionMemory; 4],
    staged: Vec<(DeviceLocation, Vec<u8>)>,
}

impl HeadlessDevice {
    pub fn new(budgets: DeviceBudgets) -> Self {
        Self {
            budgets,
            ..Self::default()
        }
    }
}

impl DeviceBackend for HeadlessDevice {
    fn upload(
        &mut self,
        region: DeviceRegion,
        bytes: &[u8],
    ) -> Result<DeviceLocation, ResourceError> {
        let budget = self.budgets.get(region);
        let memory = &mut self.regions[region.index()];
        let fits = memory
            .reserved
            .checked_add(bytes.len())
            .is_some_and(|end| end <= budget);
        if !fits {
            return Err(ResourceError::CapacityExceeded {
                what: region.name(),
                limit: budget,
            });
        }

        let location = DeviceLocation {
            region,
            offset: memory.reserved,
            len: bytes.len(),
        };
        memory.reserved += bytes.len();
        self.staged.push((location, bytes.to_vec()));
        tracing::trace!(
            "staged {} bytes to {} at {} ({}/{})",
            location.len,
            region.name(),
            location.offset,
            memory.reserved,
            budget
        );
        Ok(location)
    }

    fn fence(&mut self) {
        if self.staged.is_empty() {
            return;
        }
        let count = self.staged.len();
        // Reservations are contiguous and staged in order
        for (location, bytes) in self.staged.drain(..) {
            let memory = &mut self.regions[location.region.index()];
            debug_assert_eq!(memory.data.len(), location.offset);
            memory.data.extend_from_slice(&bytes);
        }
        tracing::debug!("device fence completed {} uploads", count);
    }

    fn in_flight(&self) -> usize {
        self.staged.len()
    }

    fn used(&self, region: DeviceRegion) -> usize {
        self.regions[region.index()].reserved
    }

    fn budget(&self, region: DeviceRegion) -> usize {
        self.budgets.get(region)
    }

    fn read(&self, location: DeviceLocation) -> Option<&[u8]> {
        let end = location.offset.checked_add(location.len)?;
        self.regions[location.region.index()]
            .data
            .get(location.offset..end)
    }
}
