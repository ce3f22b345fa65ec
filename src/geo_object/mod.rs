//! Instanced geo objects: scene buffer, local meshes, the per-vertex
//! transform and the colour, picking and depth programs.

pub mod instance;
pub mod material;
pub mod mesh;
pub mod stages;
pub mod transform;

pub use instance::{GeoObjectBuffer, GeoObjectInstance};
pub use material::Material;
pub use mesh::{LocalMesh, MeshVertex};
pub use stages::{
    geo_object, geo_object_depth, geo_object_picking, GeoObjectDepthProgram, GeoObjectPickingProgram,
    GeoObjectProgram, GeoObjectStyle, GeoObjectVarying,
};
pub use transform::{
    clip_position, q_rotate, transform_vertex, InstanceAnchor, TransformedVertex,
    DISPOSED_CLIP_POSITION,
};

use crate::error::Result;
use crate::frame::FrameContext;
use crate::program::{FragmentStage, Program, VertexStage};
use crate::rendering::{DrawStats, Framebuffer, Rasterizer};

/// Draw every slot of `buffer` with `mesh` through any of the geo object
/// programs. Disposed slots are part of the draw and produce no fragments.
pub fn draw_geo_objects<VS, FS>(
    rasterizer: &Rasterizer,
    program: &Program<VS, FS>,
    frame: &FrameContext,
    mesh: &LocalMesh,
    buffer: &GeoObjectBuffer,
    target: &mut Framebuffer,
) -> Result<DrawStats>
where
    VS: VertexStage<Vertex = MeshVertex, Instance = GeoObjectInstance>,
    FS: FragmentStage<VS::Varying>,
{
    log::debug!(
        "drawing {} geo objects ({} slots) with `{}`",
        buffer.len(),
        buffer.slot_count(),
        program.name()
    );
    rasterizer.draw(
        program,
        frame,
        &mesh.vertices,
        buffer.instances(),
        &mesh.indices,
        target,
    )
}
