use wgpu::util::DeviceExt;

use crate::sprite::SpriteImage;

/// Mipmapped sprite texture plus the sampler it is read with.
pub struct SpriteTexture {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
}

impl SpriteTexture {
    pub fn upload(device: &wgpu::Device, queue: &wgpu::Queue, sprite: &SpriteImage) -> Self {
        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some("spark sprite texture"),
                size: wgpu::Extent3d {
                    width: sprite.width(),
                    height: sprite.height(),
                    depth_or_array_layers: 1,
                },
                mip_level_count: sprite.mip_level_count(),
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            // Levels are laid out largest first, matching `mip_chain`.
            wgpu::util::TextureDataOrder::LayerMajor,
            &sprite.mip_chain(),
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("spark sprite sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Linear,
            ..Default::default()
        });

        Self {
            _texture: texture,
            view,
            sampler,
        }
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }
}
