//! Textures and their GPU residency
//!
//! A [`Texture`] keeps its pixel buffer after upload so it can be pushed
//! again after a `remove`. Textures of [`TextureType::Unknown`] stand for
//! "no texture in this slot" and ignore every GPU operation.
//!
//! Materials share textures through [`Texture::retain`] and
//! [`Texture::release`]; the GPU copy is freed when the last holder releases
//! it or on an explicit [`Texture::remove`].

use bitflags::bitflags;
use slotmap::{new_key_type, SlotMap};

use super::api::{GpuContext, PixelFormat, TextureId, TextureImage};
use super::shader::{TEXTURE_UNIT_BUMP, TEXTURE_UNIT_DIFFUSE, TEXTURE_UNIT_SPECULAR};

new_key_type! {
    /// Generation-checked handle to a texture owned by the resource manager
    pub struct TextureHandle;
}

/// Arena holding every texture the resource manager owns
pub type TextureStore = SlotMap<TextureHandle, Texture>;

bitflags! {
    /// Set of texture types present in a material, uploaded as `valMatFlags`
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct TextureFlags: u32 {
        /// Diffuse map present
        const DIFFUSE = 0x1;
        /// Specular map present
        const SPECULAR = 0x2;
        /// Bump map present
        const BUMP = 0x4;
    }
}

/// Role a texture plays when shading
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TextureType {
    /// Base colour map
    Diffuse,
    /// Specular intensity map
    Specular,
    /// Normal/bump map
    Bump,
    /// No texture for this slot
    #[default]
    Unknown,
}

impl TextureType {
    /// Flag bit for this type (empty for `Unknown`)
    pub fn flag(self) -> TextureFlags {
        match self {
            TextureType::Diffuse => TextureFlags::DIFFUSE,
            TextureType::Specular => TextureFlags::SPECULAR,
            TextureType::Bump => TextureFlags::BUMP,
            TextureType::Unknown => TextureFlags::empty(),
        }
    }

    /// Fixed texture unit sampled for this type
    pub fn unit(self) -> Option<u32> {
        match self {
            TextureType::Diffuse => Some(TEXTURE_UNIT_DIFFUSE),
            TextureType::Specular => Some(TEXTURE_UNIT_SPECULAR),
            TextureType::Bump => Some(TEXTURE_UNIT_BUMP),
            TextureType::Unknown => None,
        }
    }

    /// Lower-case name used in log tags
    pub fn name(self) -> &'static str {
        match self {
            TextureType::Diffuse => "diffuse",
            TextureType::Specular => "specular",
            TextureType::Bump => "bump",
            TextureType::Unknown => "unknown",
        }
    }
}

/// GPU texture object, deleted on drop
#[derive(Debug)]
pub struct GpuTexture {
    gpu: GpuContext,
    id: TextureId,
    unit: u32,
}

impl GpuTexture {
    /// Texture unit this texture binds to
    pub fn unit(&self) -> u32 {
        self.unit
    }

    /// Backend texture handle
    pub fn id(&self) -> TextureId {
        self.id
    }
}

impl Drop for GpuTexture {
    fn drop(&mut self) {
        self.gpu.with(|api| api.delete_texture(self.id));
    }
}

/// CPU pixel buffer plus optional GPU copy
///
/// Moving a texture out with [`Texture::take`] transfers the GPU copy and
/// resets the source. Cloning copies the pixels but never the GPU copy.
#[derive(Debug, Default)]
pub struct Texture {
    texture_type: TextureType,
    data: Vec<u8>,
    width: u32,
    height: u32,
    bits_per_pixel: u8,
    gpu: Option<GpuTexture>,
    holders: u32,
    loaded: bool,
    bound: bool,
}

impl Clone for Texture {
    fn clone(&self) -> Self {
        Self {
            texture_type: self.texture_type,
            data: self.data.clone(),
            width: self.width,
            height: self.height,
            bits_per_pixel: self.bits_per_pixel,
            gpu: None,
            holders: 0,
            loaded: self.loaded,
            bound: false,
        }
    }
}

impl Texture {
    /// Create an unloaded texture
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pixel data and metadata; the GPU is not touched
    pub fn load(
        &mut self,
        texture_type: TextureType,
        data: Vec<u8>,
        width: u32,
        height: u32,
        bits_per_pixel: u8,
    ) {
        self.texture_type = texture_type;
        self.data = data;
        self.width = width;
        self.height = height;
        self.bits_per_pixel = bits_per_pixel;
        self.loaded = true;
    }

    /// Upload the pixels, generate mip levels and record the texture unit
    ///
    /// No-op if not loaded, already resident or of unknown type.
    pub fn push(&mut self, gpu: &GpuContext) {
        if !self.loaded || self.gpu.is_some() {
            return;
        }
        let Some(unit) = self.texture_type.unit() else {
            return;
        };
        let tag = format!("Texture[{}].push", self.texture_type.name());

        let Some(format) = PixelFormat::from_bits_per_pixel(self.bits_per_pixel) else {
            log::warn!("{}: unsupported depth of {} bits", tag, self.bits_per_pixel);
            return;
        };
        let expected = self.width as usize * self.height as usize * format.bytes_per_pixel();
        if self.data.len() < expected {
            log::error!(
                "{}: {} bytes of pixel data for a {}x{} image",
                tag,
                self.data.len(),
                self.width,
                self.height
            );
            return;
        }

        let image = TextureImage {
            width: self.width,
            height: self.height,
            format,
            pixels: &self.data,
        };
        let created = gpu.with(|api| {
            let id = api.create_texture()?;
            api.upload_texture(id, &image);
            Ok::<_, String>(id)
        });
        match created {
            Ok(id) => {
                self.gpu = Some(GpuTexture {
                    gpu: gpu.clone(),
                    id,
                    unit,
                });
            }
            Err(message) => log::error!("{}: {}", tag, message),
        }
        gpu.log_error(&tag);
    }

    /// Bind to the texture's fixed unit; no-op unless resident
    pub fn bind(&mut self) {
        let Some(resident) = &self.gpu else {
            return;
        };
        resident.gpu.with(|api| api.bind_texture(resident.unit, Some(resident.id)));
        resident
            .gpu
            .log_error(&format!("Texture[{}].bind", self.texture_type.name()));
        self.bound = true;
    }

    /// Clear the texture's unit; no-op unless resident
    pub fn unbind(&mut self) {
        let Some(resident) = &self.gpu else {
            return;
        };
        resident.gpu.with(|api| api.bind_texture(resident.unit, None));
        resident
            .gpu
            .log_error(&format!("Texture[{}].unbind", self.texture_type.name()));
        self.bound = false;
    }

    /// Free the GPU copy regardless of holders; no-op unless resident
    pub fn remove(&mut self) {
        self.holders = 0;
        if self.gpu.take().is_some() {
            self.bound = false;
        }
    }

    /// Push if needed and count one more holder of the GPU copy
    ///
    /// Returns false only when the texture should be resident but the
    /// upload failed. Unloaded and `Unknown` textures succeed without a
    /// holder.
    pub fn retain(&mut self, gpu: &GpuContext) -> bool {
        self.push(gpu);
        if self.is_on_gpu() {
            self.holders += 1;
            true
        } else {
            !self.loaded || self.texture_type == TextureType::Unknown
        }
    }

    /// Drop one holder, freeing the GPU copy when none remain
    pub fn release(&mut self) {
        if self.holders == 0 {
            return;
        }
        self.holders -= 1;
        if self.holders == 0 {
            self.remove();
        }
    }

    /// Move the texture out, leaving an unloaded `Unknown` texture behind
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }

    /// Texture role
    pub fn texture_type(&self) -> TextureType {
        self.texture_type
    }

    /// Raw pixel buffer
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bits per pixel of the pixel buffer
    pub fn bits_per_pixel(&self) -> u8 {
        self.bits_per_pixel
    }

    /// Texture unit recorded at push time
    pub fn unit(&self) -> Option<u32> {
        self.gpu.as_ref().map(GpuTexture::unit)
    }

    /// Whether pixel data has been loaded
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Whether the texture is resident on the GPU
    pub fn is_on_gpu(&self) -> bool {
        self.gpu.is_some()
    }

    /// Whether the texture is currently bound
    pub fn is_bound(&self) -> bool {
        self.bound
    }

    /// Number of holders keeping the GPU copy alive
    pub fn holders(&self) -> u32 {
        self.holders
    }
}
