//! Screen-space thick polylines: vertex windows, the ribbon tessellator,
//! horizon culling and the colour and picking programs.

pub mod geometry;
pub mod order;
pub mod stages;
pub mod tessellator;
pub mod visibility;

pub use geometry::{PolylineBuilder, PolylineGeometry, PolylineVertexWindow};
pub use order::Order;
pub use stages::{
    polyline_picking, polyline_screen, PolylinePickingProgram, PolylineProgram, PolylineStyle,
    PolylineVarying,
};
pub use tessellator::{
    clip_near, get_intersection, glsl_sign, project, resolve_degenerate, resolve_join,
    tessellate_ribbon, tessellate_vertex, Join, JoinKind, TessellatedVertex, TessellationParams,
    COLLINEAR_DOT, NEAR, SHARP_TURN_DOT,
};
pub use visibility::{VisibleSphere, VISIBILITY_DOT_THRESHOLD};
